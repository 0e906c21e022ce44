use async_trait::async_trait;
use hookbot_core::{
    config::WebhookConfig, webhook::set_query_param, ClientOptions, Context, Notifier,
    NotifierCapabilities, Provider, Result, WebhookClient,
};

use crate::message::{WecomMessage, WecomResponse, WecomText, MAX_MARKDOWN_BYTES, MAX_TEXT_BYTES};

pub const PROVIDER: &str = "wecom";
pub const DEFAULT_BASE_URL: &str = "https://qyapi.weixin.qq.com";
/// Environment prefix read by [`WecomBot::from_env`].
pub const ENV_PREFIX: &str = "WECOM";

const SEND_PATH: [&str; 3] = ["cgi-bin", "webhook", "send"];

/// WeCom group bot client. Cheap to clone; holds no per-call state.
#[derive(Clone, Debug)]
pub struct WecomBot {
    client: WebhookClient,
}

impl WecomBot {
    /// Bot with default HTTP client, logger and base URL.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        Self::with_options(ClientOptions::new().credential(key))
    }

    pub fn with_options(options: ClientOptions) -> Result<Self> {
        Ok(Self {
            client: options.resolve(PROVIDER, DEFAULT_BASE_URL)?,
        })
    }

    /// Bot configured from `WECOM_TOKEN`, `WECOM_BASE_URL`, `WECOM_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self> {
        Self::with_options(ClientOptions::from_config(WebhookConfig::from_env(
            ENV_PREFIX,
        )?))
    }

    pub fn client(&self) -> &WebhookClient {
        &self.client
    }

    pub async fn send_text(&self, ctx: &Context, content: &str) -> Result<()> {
        self.client
            .scoped(async {
                tracing::info!(provider = PROVIDER, msg = content, "sending text message");
                self.deliver(ctx, &WecomMessage::text(content)).await
            })
            .await
    }

    /// Text that @-mentions members by user id and/or phone number.
    pub async fn send_text_with_mentions(&self, ctx: &Context, text: WecomText) -> Result<()> {
        self.client
            .scoped(async {
                tracing::info!(
                    provider = PROVIDER,
                    msg = %text.content,
                    mentions = text.mentioned_list.len() + text.mentioned_mobile_list.len(),
                    "sending text message"
                );
                let message = WecomMessage::from(text);
                self.deliver(ctx, &message).await
            })
            .await
    }

    pub async fn send_markdown(&self, ctx: &Context, content: &str) -> Result<()> {
        self.client
            .scoped(async {
                tracing::info!(provider = PROVIDER, msg = content, "sending markdown message");
                self.deliver(ctx, &WecomMessage::markdown(content)).await
            })
            .await
    }

    pub async fn send(&self, ctx: &Context, message: &WecomMessage) -> Result<()> {
        self.client
            .scoped(async {
                tracing::info!(provider = PROVIDER, msg_type = message.kind(), "sending message");
                self.deliver(ctx, message).await
            })
            .await
    }

    async fn deliver(&self, ctx: &Context, message: &WecomMessage) -> Result<()> {
        let key = self.client.require_credential()?;

        let mut url = self.client.endpoint(&SEND_PATH)?;
        set_query_param(&mut url, "key", key);

        self.client
            .post::<_, WecomResponse>(ctx, url, message)
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl Notifier for WecomBot {
    fn provider(&self) -> Provider {
        Provider::Wecom
    }

    fn capabilities(&self) -> NotifierCapabilities {
        NotifierCapabilities {
            supports_markdown: true,
            max_text_bytes: Some(MAX_TEXT_BYTES),
            max_markdown_bytes: Some(MAX_MARKDOWN_BYTES),
        }
    }

    async fn send_text(&self, ctx: &Context, content: &str) -> Result<()> {
        WecomBot::send_text(self, ctx, content).await
    }

    async fn send_markdown(&self, ctx: &Context, content: &str) -> Result<()> {
        WecomBot::send_markdown(self, ctx, content).await
    }
}
