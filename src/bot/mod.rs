//! Chat bot: command dispatch and delivery.
//!
//! Updates arrive either through long polling ([`run_polling`]) or the webhook
//! server in [`crate::api`]. Both hand them to [`Bot::handle_update`].

pub mod commands;
pub mod telegram;

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use crate::coc::WarDataSource;

pub use commands::{execute, parse_command, BotCommand, Reply};
pub use telegram::{ReplySink, TelegramClient, TelegramError, Update};

/// Pause after a failed `getUpdates` before polling again.
const POLL_ERROR_DELAY: Duration = Duration::from_secs(5);

/// Command handler bound to one clan's data source.
#[derive(Clone)]
pub struct Bot {
    source: Arc<dyn WarDataSource>,
}

impl Bot {
    pub fn new(source: Arc<dyn WarDataSource>) -> Self {
        Self { source }
    }

    /// Run a command for today's date.
    pub async fn run(&self, command: BotCommand) -> Vec<Reply> {
        self.run_on(command, Local::now().date_naive()).await
    }

    pub async fn run_on(&self, command: BotCommand, today: NaiveDate) -> Vec<Reply> {
        execute(command, self.source.as_ref(), today).await
    }

    /// Run `command` and send every reply to `chat_id`.
    ///
    /// Delivery failures are logged and do not stop the remaining replies.
    pub async fn answer(&self, chat_id: i64, command: BotCommand, sink: &dyn ReplySink) {
        for reply in self.run(command).await {
            deliver(sink, chat_id, reply).await;
        }
    }

    /// Handle one update, sending replies through `sink`.
    ///
    /// Returns the command that ran, if the update carried one.
    pub async fn handle_update(
        &self,
        update: &Update,
        sink: &dyn ReplySink,
    ) -> Option<BotCommand> {
        let (chat_id, command) = command_in(update)?;
        self.answer(chat_id, command, sink).await;
        Some(command)
    }
}

/// The command an update carries, with the chat it came from.
pub fn command_in(update: &Update) -> Option<(i64, BotCommand)> {
    let message = update.message.as_ref()?;
    let command = parse_command(message.text.as_deref()?)?;
    Some((message.chat.id, command))
}

/// Send one reply, logging failures.
pub async fn deliver(sink: &dyn ReplySink, chat_id: i64, reply: Reply) {
    let result = match reply {
        Reply::Text(text) => sink.send_text(chat_id, &text).await,
        Reply::Document { file_name, bytes } => {
            sink.send_document(chat_id, &file_name, bytes).await
        }
    };

    if let Err(e) = result {
        warn!("Failed to deliver reply to chat {}: {}", chat_id, e);
    }
}

/// Poll for updates forever, handling them one at a time.
pub async fn run_polling(
    bot: &Bot,
    telegram: &TelegramClient,
    timeout_seconds: u64,
) -> Result<(), TelegramError> {
    telegram.delete_webhook().await?;
    info!("Polling for updates");

    let mut offset: Option<i64> = None;
    loop {
        let updates = match telegram.get_updates(offset, timeout_seconds).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!("getUpdates failed: {}", e);
                tokio::time::sleep(POLL_ERROR_DELAY).await;
                continue;
            }
        };

        for update in updates {
            offset = Some(update.update_id + 1);
            match bot.handle_update(&update, telegram).await {
                Some(command) => debug!("Handled /{} (update {})", command.name(), update.update_id),
                None => debug!("Ignored update {}", update.update_id),
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording [`ReplySink`] for tests.

    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Sent {
        Text(i64, String),
        Document(i64, String),
    }

    #[derive(Default)]
    pub struct RecordingSink {
        pub sent: Mutex<Vec<Sent>>,
    }

    #[async_trait]
    impl ReplySink for RecordingSink {
        async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
            self.sent
                .lock()
                .unwrap()
                .push(Sent::Text(chat_id, text.to_string()));
            Ok(())
        }

        async fn send_document(
            &self,
            chat_id: i64,
            file_name: &str,
            _bytes: Vec<u8>,
        ) -> Result<(), TelegramError> {
            self.sent
                .lock()
                .unwrap()
                .push(Sent::Document(chat_id, file_name.to_string()));
            Ok(())
        }
    }
}
