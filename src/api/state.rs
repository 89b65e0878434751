use std::sync::Arc;

use crate::bot::{Bot, ReplySink};

#[derive(Clone)]
pub struct AppState {
    pub bot: Bot,
    pub sink: Arc<dyn ReplySink>,
    /// Secret path segment; updates posted under any other token are rejected
    pub webhook_token: Arc<str>,
}
