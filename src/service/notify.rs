use log::info;

/// Outbound messages to the chat transport. The transport itself lives
/// outside this crate; the default implementation only logs.
pub trait Notifier: Send + Sync {
    fn notify_operator(&self, message: &str);
    fn notify_user(&self, chat_id: &str, message: &str);
}

#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_operator(&self, message: &str) {
        info!("[operator] {message}");
    }

    fn notify_user(&self, chat_id: &str, message: &str) {
        info!("[user {chat_id}] {message}");
    }
}
