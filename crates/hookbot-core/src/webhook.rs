//! Shared webhook transport: URL resolution, JSON POST and response checks.
//!
//! Providers keep their own message and response types; this module only
//! knows that a response envelope carries a status code and a message.

use std::future::Future;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{
    dispatcher,
    instrument::{WithDispatch, WithSubscriber},
    Dispatch,
};
use url::Url;

use crate::{
    context::Context,
    errors::{Error, TransportError},
    Result,
};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Decoded provider response.
pub trait ResponseEnvelope: DeserializeOwned {
    /// Whether the provider status field holds its success sentinel.
    fn is_success(&self) -> bool;
    fn code(&self) -> i64;
    fn message(&self) -> &str;
}

/// Status, content type and fully buffered body of one response.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl RawResponse {
    fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Resolved, immutable webhook client settings shared by every send.
#[derive(Clone, Debug)]
pub struct WebhookClient {
    provider: &'static str,
    http: reqwest::Client,
    logger: Option<Dispatch>,
    base_url: String,
    credential: String,
}

impl WebhookClient {
    pub(crate) fn new(
        provider: &'static str,
        http: reqwest::Client,
        logger: Option<Dispatch>,
        base_url: String,
        credential: String,
    ) -> Self {
        Self {
            provider,
            http,
            logger,
            base_url,
            credential,
        }
    }

    pub fn provider(&self) -> &'static str {
        self.provider
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The configured dispatcher, or the caller's current default.
    pub fn logger(&self) -> Dispatch {
        match &self.logger {
            Some(d) => d.clone(),
            None => dispatcher::get_default(Dispatch::clone),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// Run `fut` with this client's logger as the active dispatcher.
    pub fn scoped<F: Future>(&self, fut: F) -> WithDispatch<F> {
        fut.with_subscriber(self.logger())
    }

    /// The credential, or `MissingCredential` when it is empty.
    pub fn require_credential(&self) -> Result<&str> {
        if self.credential.is_empty() {
            tracing::error!(provider = self.provider, "missing credential");
            return Err(Error::MissingCredential {
                provider: self.provider,
            });
        }
        Ok(&self.credential)
    }

    /// Base URL with `segments` appended to its path. Segments are
    /// percent-encoded, so a credential can be passed as one.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let res = join_path(&self.base_url, segments);
        if let Err(e) = &res {
            tracing::error!(provider = self.provider, error = %e, "url parse failed");
        }
        res
    }

    /// POST `body` as JSON to `url` and interpret the reply as `E`.
    pub async fn post<B, E>(&self, ctx: &Context, url: Url, body: &B) -> Result<E>
    where
        B: Serialize + ?Sized,
        E: ResponseEnvelope,
    {
        let provider = self.provider;

        let payload = serde_json::to_vec(body).map_err(|e| {
            tracing::error!(provider, error = %e, "request encoding failed");
            Error::Encoding(e)
        })?;

        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))
            .body(payload);

        let round_trip = async {
            let resp = request.send().await?;
            let status = resp.status().as_u16();
            let content_type = resp
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            let body = resp.bytes().await?.to_vec();
            Ok::<_, reqwest::Error>(RawResponse {
                status,
                content_type,
                body,
            })
        };

        let raw = match ctx.run(round_trip).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                // The url carries the credential.
                let e = e.without_url();
                tracing::error!(provider, error = %e, "request failed");
                return Err(TransportError::Http(e).into());
            }
            Err(e) => {
                tracing::error!(provider, error = %e, "request interrupted");
                return Err(e.into());
            }
        };

        interpret(provider, &raw)
    }
}

/// Check status, content type and provider code of a buffered response.
pub fn interpret<E: ResponseEnvelope>(provider: &'static str, resp: &RawResponse) -> Result<E> {
    if resp.status != 200 {
        tracing::error!(
            provider,
            status = resp.status,
            body = %resp.body_text(),
            "unexpected response status"
        );
        return Err(Error::UnexpectedStatus { code: resp.status });
    }

    if !resp.content_type.starts_with(JSON_CONTENT_TYPE) {
        tracing::error!(
            provider,
            content_type = %resp.content_type,
            body = %resp.body_text(),
            "unexpected response content type"
        );
        return Err(Error::UnexpectedContentType {
            value: resp.content_type.clone(),
        });
    }

    let envelope: E = decode_object(&resp.body).map_err(|e| {
        tracing::error!(provider, error = %e, body = %resp.body_text(), "response decoding failed");
        Error::Decoding(e)
    })?;

    if !envelope.is_success() {
        tracing::error!(
            provider,
            code = envelope.code(),
            msg = envelope.message(),
            "provider rejected message"
        );
        return Err(Error::Provider {
            provider,
            code: envelope.code(),
            message: envelope.message().to_string(),
        });
    }

    tracing::info!(provider, "message sent");
    Ok(envelope)
}

/// Decode `body` as `E`, accepting only a JSON object at the top level.
fn decode_object<E: DeserializeOwned>(body: &[u8]) -> serde_json::Result<E> {
    match serde_json::from_slice::<serde_json::Value>(body)? {
        obj @ serde_json::Value::Object(_) => serde_json::from_value(obj),
        other => Err(serde::de::Error::invalid_type(
            unexpected(&other),
            &"a json object",
        )),
    }
}

fn unexpected(v: &serde_json::Value) -> serde::de::Unexpected<'_> {
    use serde::de::Unexpected;
    match v {
        serde_json::Value::Null => Unexpected::Unit,
        serde_json::Value::Bool(b) => Unexpected::Bool(*b),
        serde_json::Value::Number(_) => Unexpected::Other("number"),
        serde_json::Value::String(s) => Unexpected::Str(s),
        serde_json::Value::Array(_) => Unexpected::Seq,
        serde_json::Value::Object(_) => Unexpected::Map,
    }
}

/// Append path segments to `base`, dropping a trailing empty segment first.
pub fn join_path(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base).map_err(|e| Error::url(base, e))?;
    url.path_segments_mut()
        .map_err(|_| Error::url(base, "url cannot be a base"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Set `key` in the query string, replacing any existing values for it.
pub fn set_query_param(url: &mut Url, key: &str, value: &str) {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut pairs = url.query_pairs_mut();
    pairs.clear();
    for (k, v) in &kept {
        pairs.append_pair(k, v);
    }
    pairs.append_pair(key, value);
}
