use feedrelay_notify::TelegramNotifier;

use crate::ServiceError;

pub struct NotifyService {
    notifier: Option<TelegramNotifier>,
}

impl NotifyService {
    #[must_use]
    pub const fn new(notifier: Option<TelegramNotifier>) -> Self {
        Self { notifier }
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.notifier.is_some()
    }

    pub async fn send(&self, message: &str) -> Result<(), ServiceError> {
        if message.trim().is_empty() {
            return Err(ServiceError::InvalidInput("message is empty".to_owned()));
        }
        let notifier = self
            .notifier
            .as_ref()
            .ok_or_else(|| ServiceError::NotConfigured("TELEGRAM_TOKEN is not set".to_owned()))?;
        notifier.send_message(message).await?;
        Ok(())
    }
}
