use crate::error::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: i64,
    pub content: String,
    pub delay: u32,
    pub type_: NotificationType,
    pub error: Option<Error>,
}

impl Notification {
    pub fn info(content: impl ToString) -> Self {
        let id = chrono::Utc::now().timestamp_millis();
        Self {
            id,
            content: content.to_string(),
            type_: NotificationType::Info,
            delay: 3000,
            error: None,
        }
    }

    pub fn error(err: Error) -> Self {
        let id = chrono::Utc::now().timestamp_millis();
        Self {
            id,
            content: err.user_message(),
            type_: NotificationType::Error,
            delay: 5000,
            error: Some(err),
        }
    }
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationType {
    #[default]
    Info,
    Error,
}
