use std::sync::Arc;

use chrono::Utc;
use eyre::{ensure, ContextCompat, Result};
use log::info;

use crate::domain::withdraw::WithdrawRequest;
use crate::error::Error;
use crate::repository::users::UserRepository;
use crate::repository::withdrawals::WithdrawRepository;
use crate::service::notify::Notifier;

#[derive(Clone)]
pub struct WalletService {
    pub user_repository: UserRepository,
    pub withdraw_repository: WithdrawRepository,
    pub notifier: Arc<dyn Notifier>,
}

impl WalletService {
    /// Queues a withdrawal for operator approval. The balance check and the
    /// enqueue happen under the user lock so a concurrent join cannot slip
    /// a debit in between.
    pub fn request_withdraw(
        &self,
        user_id: &str,
        amount: i64,
        chat_id: Option<String>,
    ) -> Result<()> {
        ensure!(amount > 0, Error::InvalidAmount);
        let user = self
            .user_repository
            .get_mut_lock(user_id)
            .wrap_err(Error::UserNotFound)?;
        ensure!(user.balance >= amount, Error::InsufficientBalance);
        self.withdraw_repository.push(WithdrawRequest {
            user_id: user.id.clone(),
            username: user.username.clone(),
            amount,
            chat_id,
            requested_at: Utc::now(),
        });
        self.notifier.notify_operator(&format!(
            "Withdrawal request: {} ({}) asks for {amount}, current balance {}",
            user.username, user.id, user.balance
        ));
        Ok(())
    }

    /// Approves the oldest pending request for the user and notifies the
    /// requester. Other users' requests stay queued.
    pub fn approve_withdraw(&self, user_id: &str) -> Result<WithdrawRequest> {
        let request = self
            .withdraw_repository
            .remove_for_user(user_id)
            .wrap_err(Error::NoPendingRequest)?;
        if let Some(chat_id) = &request.chat_id {
            self.notifier.notify_user(
                chat_id,
                &format!("Your withdrawal of {} coins has been approved!", request.amount),
            );
        }
        info!("approved withdrawal of {} for user {}", request.amount, user_id);
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify_operator(&self, message: &str) {
            self.messages
                .lock()
                .unwrap()
                .push(format!("operator: {message}"));
        }

        fn notify_user(&self, chat_id: &str, message: &str) {
            self.messages
                .lock()
                .unwrap()
                .push(format!("{chat_id}: {message}"));
        }
    }

    fn test_service() -> (WalletService, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let service = WalletService {
            user_repository: UserRepository::new(),
            withdraw_repository: WithdrawRepository::new(),
            notifier: notifier.clone(),
        };
        service.user_repository.upsert_with_username("1", "Alice");
        service.user_repository.upsert_with_username("2", "Bob");
        (service, notifier)
    }

    #[test]
    fn withdraw_queues_request_and_notifies_operator() -> Result<()> {
        let (service, notifier) = test_service();
        service.request_withdraw("1", 20, Some("chat-1".to_string()))?;

        let pending = service.withdraw_repository.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].user_id, "1");
        assert_eq!(pending[0].amount, 20);
        assert!(notifier.messages.lock().unwrap()[0].starts_with("operator:"));
        Ok(())
    }

    #[test]
    fn withdraw_rejected_when_amount_exceeds_balance() {
        let (service, _) = test_service();
        let err = service.request_withdraw("1", 500, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InsufficientBalance)
        ));
        assert!(service.withdraw_repository.pending().is_empty());
    }

    #[test]
    fn withdraw_rejects_non_positive_amount() {
        let (service, _) = test_service();
        for amount in [0, -5] {
            let err = service.request_withdraw("1", amount, None).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<Error>(),
                Some(Error::InvalidAmount)
            ));
        }
        assert!(service.withdraw_repository.pending().is_empty());
    }

    #[test]
    fn withdraw_requires_known_user() {
        let (service, _) = test_service();
        let err = service.request_withdraw("ghost", 10, None).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::UserNotFound)));
    }

    #[test]
    fn approve_removes_only_the_matching_request() -> Result<()> {
        let (service, notifier) = test_service();
        service.request_withdraw("1", 10, Some("chat-1".to_string()))?;
        service.request_withdraw("2", 15, Some("chat-2".to_string()))?;

        let approved = service.approve_withdraw("1")?;
        assert_eq!(approved.amount, 10);

        let pending = service.withdraw_repository.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].user_id, "2");
        assert!(notifier
            .messages
            .lock()
            .unwrap()
            .iter()
            .any(|m| m.starts_with("chat-1:")));
        Ok(())
    }

    #[test]
    fn approve_without_pending_request_fails() {
        let (service, _) = test_service();
        let err = service.approve_withdraw("1").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::NoPendingRequest)
        ));
    }
}
