use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pending withdrawal awaiting operator approval. Lives in the pending
/// queue from request until approval removes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawRequest {
    pub user_id: String,
    pub username: String,
    pub amount: i64,
    /// Originating chat reference, used to notify the requester.
    pub chat_id: Option<String>,
    pub requested_at: DateTime<Utc>,
}
