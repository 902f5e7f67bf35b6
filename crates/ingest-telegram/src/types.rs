use chrono::{DateTime, Utc};

/// A new-message event as read off the client's update stream, reduced to
/// the fields C5/C6 forward onto the bus. No extra network lookups are
/// performed to fill in the optional handles; they are `None` when the
/// platform didn't already attach them to the event.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub chat_id: i64,
    pub message_id: i32,
    pub text: String,
    pub date: DateTime<Utc>,
    pub sender_id: Option<i64>,
    pub sender_username: Option<String>,
    pub chat_username: Option<String>,
}

/// One entry of an identity's dialog list, used to compute eligibility (C4).
#[derive(Debug, Clone, Copy)]
pub struct DialogChat {
    pub chat_id: i64,
}
