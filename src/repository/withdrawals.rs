use std::sync::{Arc, Mutex};

use crate::domain::withdraw::WithdrawRequest;

/// Pending withdrawal queue, ordered by request time.
#[derive(Clone, Default)]
pub struct WithdrawRepository {
    requests: Arc<Mutex<Vec<WithdrawRequest>>>,
}

impl WithdrawRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, request: WithdrawRequest) {
        self.requests
            .lock()
            .expect("withdraw queue poisoned")
            .push(request);
    }

    /// Removes and returns the oldest pending request for the user, leaving
    /// any other requests in the queue untouched.
    pub fn remove_for_user(&self, user_id: &str) -> Option<WithdrawRequest> {
        let mut requests = self.requests.lock().expect("withdraw queue poisoned");
        let index = requests.iter().position(|r| r.user_id == user_id)?;
        Some(requests.remove(index))
    }

    pub fn pending(&self) -> Vec<WithdrawRequest> {
        self.requests
            .lock()
            .expect("withdraw queue poisoned")
            .clone()
    }
}
