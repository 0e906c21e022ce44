//! WeCom (WeChat Work) group bot adapter.
//!
//! Posts to `{base}/cgi-bin/webhook/send?key={key}` with text (optionally
//! mentioning members) or markdown content.

mod client;
mod message;

pub use client::{WecomBot, DEFAULT_BASE_URL, ENV_PREFIX, PROVIDER};
pub use message::{
    WecomMarkdown, WecomMessage, WecomResponse, WecomText, MAX_MARKDOWN_BYTES, MAX_TEXT_BYTES,
    MENTION_ALL,
};
