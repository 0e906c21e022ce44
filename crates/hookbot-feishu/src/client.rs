use async_trait::async_trait;
use hookbot_core::{
    config::WebhookConfig, ClientOptions, Context, Notifier, NotifierCapabilities, Provider,
    Result, WebhookClient,
};

use crate::message::{FeishuMessage, FeishuResponse};

pub const PROVIDER: &str = "feishu";
pub const DEFAULT_BASE_URL: &str = "https://open.feishu.cn";
/// Environment prefix read by [`FeishuBot::from_env`].
pub const ENV_PREFIX: &str = "FEISHU";

const HOOK_PATH: [&str; 4] = ["open-apis", "bot", "v2", "hook"];

/// Feishu custom bot client. Cheap to clone; holds no per-call state.
#[derive(Clone, Debug)]
pub struct FeishuBot {
    client: WebhookClient,
}

impl FeishuBot {
    /// Bot with default HTTP client, logger and base URL.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_options(ClientOptions::new().credential(token))
    }

    pub fn with_options(options: ClientOptions) -> Result<Self> {
        Ok(Self {
            client: options.resolve(PROVIDER, DEFAULT_BASE_URL)?,
        })
    }

    /// Bot configured from `FEISHU_TOKEN`, `FEISHU_BASE_URL`, `FEISHU_TIMEOUT_MS`.
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
                self.deliver(ctx, &FeishuMessage::text(content)).await
            })
            .await
    }

    pub async fn send(&self, ctx: &Context, message: &FeishuMessage) -> Result<()> {
        self.client
            .scoped(async {
                tracing::info!(provider = PROVIDER, msg_type = message.kind(), "sending message");
                self.deliver(ctx, message).await
            })
            .await
    }

    async fn deliver(&self, ctx: &Context, message: &FeishuMessage) -> Result<()> {
        let token = self.client.require_credential()?;

        let mut segments = HOOK_PATH.to_vec();
        segments.push(token);
        let url = self.client.endpoint(&segments)?;

        self.client
            .post::<_, FeishuResponse>(ctx, url, message)
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl Notifier for FeishuBot {
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

    async fn send_text(&self, ctx: &Context, content: &str) -> Result<()> {
        FeishuBot::send_text(self, ctx, content).await
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use hookbot_core::Error;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, method, path, path_regex},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    const TOKEN: &str = "85d09ddb-5937-46e7-8628-d7959a93e3af";

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn capturing_logger() -> (Capture, tracing::Dispatch) {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        (capture, tracing::Dispatch::new(subscriber))
    }

    fn refused_base_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        format!("http://127.0.0.1:{port}")
    }

    fn json_reply(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body.to_string(), "application/json; charset=utf-8")
    }

    /// Stub that answers like the real hook endpoint, keyed on the token.
    async fn stub_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/open-apis/bot/v2/hook/bad_request"))
            .respond_with(json_reply(r#"{ "code": 9499, "msg": "Bad Request", "data": {} }"#))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/open-apis/bot/v2/hook/[^/]+$"))
            .respond_with(json_reply(
                r#"{ "StatusCode": 0, "StatusMessage": "success", "code": 0, "data": {}, "msg": "success" }"#,
            ))
            .mount(&server)
            .await;
        server
    }

    fn bot(server: &MockServer, token: &str) -> FeishuBot {
        FeishuBot::with_options(
            ClientOptions::new()
                .base_url(server.uri())
                .credential(token),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn send_text_succeeds() {
        let server = stub_server().await;
        bot(&server, TOKEN)
            .send_text(&Context::background(), "测试")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn send_text_posts_documented_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/open-apis/bot/v2/hook/{TOKEN}")))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"msg_type": "text", "content": {"text": "hello"}})))
            .respond_with(json_reply(r#"{"code":0,"data":{},"msg":"success"}"#))
            .expect(1)
            .mount(&server)
            .await;

        bot(&server, TOKEN)
            .send_text(&Context::background(), "hello")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_token_fails_without_a_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(json_reply(r#"{"code":0}"#))
            .expect(0)
            .mount(&server)
            .await;

        let err = bot(&server, "")
            .send_text(&Context::background(), "测试")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingCredential { provider: "feishu" }));
    }

    #[tokio::test]
    async fn provider_error_message_is_surfaced() {
        let server = stub_server().await;
        let err = bot(&server, "bad_request")
            .send(&Context::background(), &FeishuMessage::text("测试"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Provider { code: 9499, .. }));
        assert!(err.to_string().contains("Bad Request"));
    }

    #[tokio::test]
    async fn non_200_is_unexpected_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_raw("{}", "application/json"))
            .mount(&server)
            .await;

        let err = bot(&server, TOKEN)
            .send_text(&Context::background(), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedStatus { code: 503 }));
    }

    #[tokio::test]
    async fn plain_text_reply_is_unexpected_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(r#"{"code":0}"#, "text/plain"),
            )
            .mount(&server)
            .await;

        let err = bot(&server, TOKEN)
            .send_text(&Context::background(), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedContentType { .. }));
    }

    #[tokio::test]
    async fn bad_base_url_is_a_url_error() {
        let bot = FeishuBot::with_options(
            ClientOptions::new()
                .base_url("not a url")
                .credential(TOKEN),
        )
        .unwrap();
        let err = bot
            .send_text(&Context::background(), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Url { .. }));
    }

    #[tokio::test]
    async fn json_array_reply_is_a_decoding_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(json_reply("[]"))
            .mount(&server)
            .await;

        let err = bot(&server, TOKEN)
            .send_text(&Context::background(), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decoding(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn transport_failure_does_not_expose_token() {
        let secret = "SECRET-TOKEN-123";
        let (capture, logger) = capturing_logger();
        let bot = FeishuBot::with_options(
            ClientOptions::new()
                .base_url(refused_base_url())
                .credential(secret)
                .logger(logger),
        )
        .unwrap();

        let err = bot
            .send_text(&Context::background(), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)), "got {err:?}");
        assert!(!err.to_string().contains(secret), "error: {err}");

        let logs = capture.text();
        assert!(logs.contains("request failed"), "logs: {logs}");
        assert!(!logs.contains(secret), "logs: {logs}");
    }

    #[tokio::test]
    async fn provider_rejection_is_logged_without_token() {
        let server = stub_server().await;
        let (capture, logger) = capturing_logger();
        let bot = FeishuBot::with_options(
            ClientOptions::new()
                .base_url(server.uri())
                .credential("bad_request")
                .logger(logger),
        )
        .unwrap();

        let _ = bot.send_text(&Context::background(), "ping").await;
        let logs = capture.text();
        assert!(logs.contains("ERROR"), "logs: {logs}");
        assert!(logs.contains("provider rejected message"), "logs: {logs}");
        assert!(logs.contains("Bad Request"), "logs: {logs}");
        assert!(!logs.contains("bad_request"), "logs: {logs}");
    }

    #[tokio::test]
    async fn injected_logger_receives_send_events() {
        let server = stub_server().await;
        let (capture, logger) = capturing_logger();

        let bot = FeishuBot::with_options(
            ClientOptions::new()
                .base_url(server.uri())
                .credential("")
                .logger(logger),
        )
        .unwrap();

        let _ = bot.send_text(&Context::background(), "ping").await;
        let logs = capture.text();
        assert!(logs.contains("sending text message"), "logs: {logs}");
        assert!(logs.contains("missing credential"), "logs: {logs}");
    }

    #[test]
    fn defaults_to_feishu_origin() {
        let bot = FeishuBot::new(TOKEN).unwrap();
        assert_eq!(bot.client().base_url(), DEFAULT_BASE_URL);
        assert_eq!(bot.provider(), Provider::Feishu);
        assert!(!bot.capabilities().supports_markdown);
    }
}
