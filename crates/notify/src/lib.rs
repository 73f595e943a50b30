//! Telegram notifications: message formatting and the Bot API client.

mod error;
mod message;
mod telegram;

pub use error::NotifyError;
pub use message::{escape_markdown, format_download_message};
pub use telegram::TelegramNotifier;
