use super::*;

use axum::http::Request;
use serde_json::json;
use superfaktura_provider::ApiError;
use tokio::sync::Mutex;

/// Records every upstream request and answers with a canned result.
pub struct MockGateway {
    response: superfaktura_provider::Result<Value>,
    calls: Mutex<Vec<(UpstreamSession, UpstreamRequest)>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::ok(json!({ "error": 0, "data": {} }))
    }
}

impl MockGateway {
    pub fn ok(value: Value) -> Self {
        Self {
            response: Ok(value),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ApiError) -> Self {
        Self {
            response: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    pub async fn calls_snapshot(&self) -> Vec<(UpstreamSession, UpstreamRequest)> {
        self.calls.lock().await.clone()
    }

    pub async fn last_call(&self) -> Option<(UpstreamSession, UpstreamRequest)> {
        self.calls.lock().await.last().cloned()
    }
}

#[async_trait]
impl InvoicingGateway for MockGateway {
    async fn send(
        &self,
        session: &UpstreamSession,
        request: &UpstreamRequest,
    ) -> superfaktura_provider::Result<Value> {
        self.calls
            .lock()
            .await
            .push((session.clone(), request.clone()));
        self.response.clone()
    }
}

/// Single-tenant configuration: credentials in the environment, default country.
pub fn test_env() -> EnvConfig {
    EnvConfig::from_vars([
        ("SUPERFAKTURA_EMAIL", "env@example.sk"),
        ("SUPERFAKTURA_API_KEY", "env-key"),
    ])
}

pub fn build_server(env: EnvConfig, gateway: Arc<MockGateway>) -> SuperFakturaMcp {
    SuperFakturaMcp::with_gateway(env, gateway)
}

/// Extensions as the streamable HTTP transport populates them.
pub fn http_extensions(headers: &[(&str, &str)]) -> Extensions {
    let mut builder = Request::builder().method("POST").uri("/mcp");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let (parts, ()) = builder.body(()).unwrap().into_parts();
    let mut extensions = Extensions::new();
    extensions.insert(parts);
    extensions
}

/// Text of the first content block.
pub fn result_text(result: &CallToolResult) -> &str {
    result
        .content
        .first()
        .and_then(|c| c.raw.as_text())
        .map(|t| t.text.as_str())
        .unwrap()
}

pub fn result_json(result: &CallToolResult) -> Value {
    serde_json::from_str(result_text(result)).unwrap()
}
