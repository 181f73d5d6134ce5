//! Task operation tools for the conversational to-do backend
//!
//! The callable surface a delegation runtime invokes as tools:
//! - Task CRUD operations over the task store, returning tagged results
//! - A notification stub

pub mod notify;
pub mod ops;
pub mod response;
