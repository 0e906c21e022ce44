use async_trait::async_trait;

use crate::{context::Context, errors::Error, Result};

/// Which chat platform a notifier posts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Provider {
    Feishu,
    Wecom,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Feishu => "feishu",
            Provider::Wecom => "wecom",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "feishu" | "lark" => Ok(Provider::Feishu),
            "wecom" | "wx" | "wechat-work" => Ok(Provider::Wecom),
            other => Err(Error::Config(format!("unknown provider: {other}"))),
        }
    }
}

/// Content kinds and provider-documented limits.
///
/// Limits are informational; nothing is checked client-side and oversize
/// content comes back as a provider error.
#[derive(Clone, Copy, Debug)]
pub struct NotifierCapabilities {
    pub supports_markdown: bool,
    pub max_text_bytes: Option<usize>,
    pub max_markdown_bytes: Option<usize>,
}

/// Outbound notification port implemented by each provider bot.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn provider(&self) -> Provider;
    fn capabilities(&self) -> NotifierCapabilities;

    async fn send_text(&self, ctx: &Context, content: &str) -> Result<()>;

    async fn send_markdown(&self, ctx: &Context, content: &str) -> Result<()> {
        let _ = (ctx, content);
        Err(Error::Unsupported {
            provider: self.provider().as_str(),
            kind: "markdown",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TextOnly;

    #[async_trait]
    impl Notifier for TextOnly {
        fn provider(&self) -> Provider {
            Provider::Feishu
        }

        fn capabilities(&self) -> NotifierCapabilities {
            NotifierCapabilities {
                supports_markdown: false,
                max_text_bytes: None,
                max_markdown_bytes: None,
            }
        }

        async fn send_text(&self, _ctx: &Context, _content: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn markdown_defaults_to_unsupported() {
        let err = TextOnly
            .send_markdown(&Context::background(), "# hi")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Unsupported {
                provider: "feishu",
                kind: "markdown"
            }
        ));
    }

    #[test]
    fn provider_parses_aliases() {
        assert_eq!("Lark".parse::<Provider>().unwrap(), Provider::Feishu);
        assert_eq!("wx".parse::<Provider>().unwrap(), Provider::Wecom);
        assert!("slack".parse::<Provider>().is_err());
    }
}
