//! Feishu (Lark) custom bot adapter.
//!
//! Posts to `{base}/open-apis/bot/v2/hook/{token}`. Text is the only content
//! kind; the message text must contain the bot's configured keyword if the
//! bot has keyword security enabled.

mod client;
mod message;

pub use client::{FeishuBot, DEFAULT_BASE_URL, ENV_PREFIX, PROVIDER};
pub use message::{FeishuMessage, FeishuResponse, FeishuText};
