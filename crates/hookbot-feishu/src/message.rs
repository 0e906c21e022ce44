use hookbot_core::ResponseEnvelope;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Outbound bot message. The variant becomes `msg_type`, its payload `content`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "msg_type", content = "content", rename_all = "snake_case")]
pub enum FeishuMessage {
    Text(FeishuText),
}

impl FeishuMessage {
    pub fn text(text: impl Into<String>) -> Self {
        FeishuMessage::Text(FeishuText { text: text.into() })
    }

    /// Wire value of `msg_type`.
    pub fn kind(&self) -> &'static str {
        match self {
            FeishuMessage::Text(_) => "text",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeishuText {
    pub text: String,
}

/// Reply to a bot send. `code` is 0 on success.
#[derive(Clone, Debug, Deserialize)]
pub struct FeishuResponse<T = serde_json::Value> {
    #[serde(default)]
    pub code: i64,
    pub data: Option<T>,
    #[serde(default)]
    pub msg: String,
}

impl<T: DeserializeOwned> ResponseEnvelope for FeishuResponse<T> {
    fn is_success(&self) -> bool {
        self.code == 0
    }

    fn code(&self) -> i64 {
        self.code
    }

    fn message(&self) -> &str {
        &self.msg
    }
}
