//! Tool runtime for the conversational to-do backend
//!
//! Bridges an external delegation runtime to the task tools: reads one JSON
//! tool call per line on stdin and writes one tagged JSON result per line on
//! stdout. Intent handling lives entirely on the other side of the pipe;
//! this binary is transport, not delegation.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use td_core::task::{FileTaskStore, TaskRepository};
use td_tools::response::{ErrorKind, ToolResult};
use td_tools::{notify, ops};

/// A single tool invocation from the delegation runtime
#[derive(Debug, Deserialize)]
#[serde(tag = "tool", content = "args", rename_all = "snake_case")]
enum ToolCall {
    CreateTask(ops::CreateTaskRequest),
    ListTasks {
        #[serde(default)]
        status: Option<String>,
    },
    UpdateTask(ops::UpdateTaskRequest),
    DeleteTask {
        task_id: u64,
    },
    SendNotification {
        subject: String,
        body: String,
    },
}

fn encode<T: Serialize>(result: &ToolResult<T>) -> String {
    serde_json::to_string(result).unwrap_or_else(|e| {
        error!("Failed to encode tool result: {}", e);
        r#"{"status":"error","kind":"storage_failure","error_message":"Failed to encode tool result."}"#
            .to_string()
    })
}

/// Parse one input line and run the matching tool
async fn dispatch(store: &dyn TaskRepository, line: &str) -> String {
    let call: ToolCall = match serde_json::from_str(line) {
        Ok(call) => call,
        Err(e) => {
            let result: ToolResult<()> =
                ToolResult::error(ErrorKind::InvalidInput, format!("Malformed tool call: {}", e));
            return encode(&result);
        }
    };

    match call {
        ToolCall::CreateTask(req) => encode(&ops::create_task(store, req).await),
        ToolCall::ListTasks { status } => {
            encode(&ops::list_tasks(store, status.as_deref()).await)
        }
        ToolCall::UpdateTask(req) => {
            encode(&ops::update_task(store, req.task_id, req.patch).await)
        }
        ToolCall::DeleteTask { task_id } => encode(&ops::delete_task(store, task_id).await),
        ToolCall::SendNotification { subject, body } => {
            encode(&notify::send_notification(subject, body))
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing; logs go to stderr so stdout stays protocol-clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "td_tools=info,td_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine data directory
    let data_dir = std::env::var("TD_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".td-data"));

    tracing::info!("Using data directory: {:?}", data_dir);

    // No operation can proceed without the store, so a failed open is fatal.
    let store = FileTaskStore::new(data_dir.join("tasks.json"))
        .await
        .expect("Failed to initialize task store");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await.expect("Failed to read stdin") {
        if line.trim().is_empty() {
            continue;
        }
        let response = dispatch(&store, &line).await;
        stdout
            .write_all(response.as_bytes())
            .await
            .expect("Failed to write stdout");
        stdout.write_all(b"\n").await.expect("Failed to write stdout");
        stdout.flush().await.expect("Failed to write stdout");
    }
}
