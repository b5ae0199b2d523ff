use async_trait::async_trait;
use geomentor_core::{ChatMessage, ChatOptions, DEFAULT_MODEL, LLMProvider, LLMResponse, Usage};
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::retry::{RetryPolicy, retry_with_backoff};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for OpenAI-compatible `/chat/completions` endpoints.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
    retry: RetryPolicy,
}

impl OpenAiProvider {
    /// An empty key is accepted; the remote side rejects the request later.
    pub fn new(api_key: String) -> Self {
        info!("Creating OpenAiProvider");
        if api_key.trim().is_empty() {
            warn!("No API key configured; requests will be sent unauthenticated");
        }
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            retry: RetryPolicy::none(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_default_model(mut self, model: String) -> Self {
        self.default_model = model;
        self
    }

    /// Replace the HTTP client, e.g. to set timeouts or proxy rules.
    #[must_use]
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Helper method to send a single request
    async fn try_send(&self, request: &Value) -> anyhow::Result<LLMResponse> {
        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(request);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        parse_response(&response)
    }
}

/// Build the JSON body of a chat completion request.
#[must_use]
pub fn build_request(messages: &[ChatMessage], options: &ChatOptions) -> Value {
    let mut request = json!({
        "model": options.model,
        "messages": messages,
        "temperature": options.temperature,
    });
    if let Some(max_tokens) = options.max_tokens {
        request["max_tokens"] = json!(max_tokens);
    }
    request
}

/// Pull the first choice's content and the token usage out of a response body.
pub fn parse_response(response: &Value) -> anyhow::Result<LLMResponse> {
    let content = response["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid response format: missing content"))?
        .to_string();

    // Servers may omit individual counters; a missing one reads as zero.
    let usage = response["usage"].as_object().map(|u| {
        let count = |key: &str| {
            u.get(key)
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0)
        };
        Usage {
            prompt_tokens: count("prompt_tokens"),
            completion_tokens: count("completion_tokens"),
            total_tokens: count("total_tokens"),
        }
    });

    Ok(LLMResponse { content, usage })
}

#[async_trait]
impl LLMProvider for OpenAiProvider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> anyhow::Result<LLMResponse> {
        let request = build_request(messages, options);

        info!(
            "Sending request to chat completions API: model={}, messages={}",
            options.model,
            messages.len()
        );

        let response = retry_with_backoff(|| self.try_send(&request), &self.retry).await?;

        if let Some(usage) = response.usage {
            debug!(
                "Tokens: {} prompt + {} completion = {} total",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }
        info!("Received response from chat completions API");
        Ok(response)
    }

    fn get_default_model(&self) -> &str {
        &self.default_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_messages_in_order() {
        let messages = vec![
            ChatMessage::system("persona"),
            ChatMessage::user("A"),
            ChatMessage::assistant("B"),
            ChatMessage::user("C"),
        ];
        let options = ChatOptions {
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.5,
            max_tokens: None,
        };

        let request = build_request(&messages, &options);

        assert_eq!(request["model"], "gpt-3.5-turbo");
        assert!((request["temperature"].as_f64().unwrap() - 0.5).abs() < f64::EPSILON);
        assert!(request.get("max_tokens").is_none());
        let roles: Vec<&str> = request["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, ["system", "user", "assistant", "user"]);
        assert_eq!(request["messages"][3]["content"], "C");
    }

    #[test]
    fn request_includes_max_tokens_when_set() {
        let options = ChatOptions {
            max_tokens: Some(256),
            ..ChatOptions::default()
        };
        let request = build_request(&[ChatMessage::user("hi")], &options);
        assert_eq!(request["max_tokens"], 256);
    }

    #[test]
    fn parses_content_and_usage() {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "Python."}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        });

        let response = parse_response(&body).unwrap();

        assert_eq!(response.content, "Python.");
        let usage = response.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 12);
        assert_eq!(usage.total_tokens, 15);
    }

    #[test]
    fn usage_is_optional() {
        let body = json!({"choices": [{"message": {"content": "ok"}}]});
        let response = parse_response(&body).unwrap();
        assert!(response.usage.is_none());
    }

    #[test]
    fn partial_usage_reads_missing_counters_as_zero() {
        let body = json!({
            "choices": [{"message": {"content": "ok"}}],
            "usage": {"total_tokens": 5}
        });

        let usage = parse_response(&body).unwrap().usage.unwrap();

        assert_eq!(usage.prompt_tokens, 0);
        assert_eq!(usage.completion_tokens, 0);
        assert_eq!(usage.total_tokens, 5);
    }

    #[test]
    fn missing_content_is_an_error() {
        let body = json!({"error": {"message": "invalid api key"}});
        let err = parse_response(&body).unwrap_err();
        assert!(err.to_string().contains("missing content"));
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let provider = OpenAiProvider::new(String::new())
            .with_base_url("http://localhost:8080/v1/".to_string())
            .with_default_model("local-model".to_string());
        assert_eq!(provider.base_url(), "http://localhost:8080/v1");
        assert_eq!(provider.get_default_model(), "local-model");
    }

    /// Accept one request on a local port, answer it with `status` and `body`,
    /// and hand back the raw request text.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0_u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
                if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    let headers = String::from_utf8_lossy(&request[..end]).to_lowercase();
                    let body_len = headers
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= end + 4 + body_len {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request).into_owned()
        });
        (format!("http://{addr}/v1"), handle)
    }

    fn local_provider(api_key: &str, base_url: String) -> OpenAiProvider {
        let client = Client::builder().no_proxy().build().unwrap();
        OpenAiProvider::new(api_key.to_string())
            .with_base_url(base_url)
            .with_http_client(client)
    }

    const OK_BODY: &str =
        r#"{"choices":[{"message":{"role":"assistant","content":"Python."}}]}"#;

    #[tokio::test]
    async fn chat_posts_with_bearer_auth() {
        let (base_url, server) = serve_once("200 OK", OK_BODY).await;
        let provider = local_provider("sk-test", base_url);

        let response = provider
            .chat(&[ChatMessage::user("Olá")], &ChatOptions::default())
            .await
            .unwrap();

        assert_eq!(response.content, "Python.");
        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1/chat/completions "));
        assert!(request.to_lowercase().contains("authorization: bearer sk-test"));
        assert!(request.contains(r#""content":"Olá""#));
    }

    #[tokio::test]
    async fn empty_key_sends_no_authorization_header() {
        let (base_url, server) = serve_once("200 OK", OK_BODY).await;
        let provider = local_provider("", base_url);

        provider
            .chat(&[ChatMessage::user("hi")], &ChatOptions::default())
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(!request.to_lowercase().contains("authorization:"));
    }

    #[tokio::test]
    async fn unauthorized_status_is_an_error() {
        let (base_url, server) = serve_once(
            "401 Unauthorized",
            r#"{"error":{"message":"Incorrect API key provided"}}"#,
        )
        .await;
        let provider = local_provider("sk-wrong", base_url);

        let err = provider
            .chat(&[ChatMessage::user("hi")], &ChatOptions::default())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("401"));
        server.await.unwrap();
    }
}
