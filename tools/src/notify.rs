//! Notification stub
//!
//! Accepts a subject/body pair and reports success without performing real
//! delivery. A production build would hand the pair to an external transport;
//! only the input/output contract lives here.

use serde::Serialize;
use tracing::info;

use crate::response::ToolResult;

/// Result of a notification request, echoing what would have been sent
#[derive(Debug, Clone, Serialize)]
pub struct NotificationSent {
    pub message: String,
    pub subject: String,
    pub body: String,
}

/// Send a notification to the user.
///
/// Currently a no-op placeholder: the content is logged and acknowledged.
pub fn send_notification(
    subject: impl Into<String>,
    body: impl Into<String>,
) -> ToolResult<NotificationSent> {
    let subject = subject.into();
    let body = body.into();
    info!("Tool send_notification called with subject: {}", subject);

    ToolResult::Success(NotificationSent {
        message: "Notification sent successfully.".to_string(),
        subject,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_notification_echoes_content() {
        let result = send_notification("Your tasks", "1 pending task");
        let ToolResult::Success(sent) = result else {
            panic!("Expected success");
        };

        assert_eq!(sent.subject, "Your tasks");
        assert_eq!(sent.body, "1 pending task");
        assert_eq!(sent.message, "Notification sent successfully.");
    }

    #[test]
    fn test_send_notification_wire_shape() {
        let json: serde_json::Value =
            serde_json::to_value(send_notification("s", "b")).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["subject"], "s");
        assert_eq!(json["body"], "b");
        assert!(json["message"].is_string());
    }
}
