//! Core library for the conversational to-do backend
//!
//! This crate contains the persistence layer, including:
//! - Task record model and patch types
//! - Task repository trait and file-backed store

pub mod error;
pub mod task;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
