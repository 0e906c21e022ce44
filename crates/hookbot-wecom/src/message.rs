use hookbot_core::ResponseEnvelope;
use serde::{Deserialize, Serialize};

/// Documented text content limit (UTF-8 bytes).
pub const MAX_TEXT_BYTES: usize = 2048;
/// Documented markdown content limit (UTF-8 bytes).
pub const MAX_MARKDOWN_BYTES: usize = 4096;
/// Mention entry that notifies every member of the group.
pub const MENTION_ALL: &str = "@all";

/// Outbound bot message.
///
/// The variant name becomes `msgtype` and its payload sits under a key of
/// the same name, e.g. `{"msgtype":"markdown","markdown":{...}}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "msgtype", rename_all = "snake_case")]
pub enum WecomMessage {
    Text { text: WecomText },
    Markdown { markdown: WecomMarkdown },
}

impl WecomMessage {
    pub fn text(content: impl Into<String>) -> Self {
        WecomText::new(content).into()
    }

    pub fn markdown(content: impl Into<String>) -> Self {
        WecomMessage::Markdown {
            markdown: WecomMarkdown {
                content: content.into(),
            },
        }
    }

    /// Wire value of `msgtype`.
    pub fn kind(&self) -> &'static str {
        match self {
            WecomMessage::Text { .. } => "text",
            WecomMessage::Markdown { .. } => "markdown",
        }
    }
}

impl From<WecomText> for WecomMessage {
    fn from(text: WecomText) -> Self {
        WecomMessage::Text { text }
    }
}

impl From<WecomMarkdown> for WecomMessage {
    fn from(markdown: WecomMarkdown) -> Self {
        WecomMessage::Markdown { markdown }
    }
}

/// Text payload. Mention lists are left off the wire when empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WecomText {
    pub content: String,
    /// Member user ids to @, or [`MENTION_ALL`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mentioned_list: Vec<String>,
    /// Member phone numbers to @, or [`MENTION_ALL`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mentioned_mobile_list: Vec<String>,
}

impl WecomText {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn mention(mut self, user_id: impl Into<String>) -> Self {
        self.mentioned_list.push(user_id.into());
        self
    }

    pub fn mention_mobile(mut self, mobile: impl Into<String>) -> Self {
        self.mentioned_mobile_list.push(mobile.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WecomMarkdown {
    pub content: String,
}

/// Reply to a bot send. `errcode` is 0 on success.
#[derive(Clone, Debug, Deserialize)]
pub struct WecomResponse {
    #[serde(default)]
    pub errcode: i64,
    #[serde(default)]
    pub errmsg: String,
}

impl ResponseEnvelope for WecomResponse {
    fn is_success(&self) -> bool {
        self.errcode == 0
    }

    fn code(&self) -> i64 {
        self.errcode
    }

    fn message(&self) -> &str {
        &self.errmsg
    }
}
