use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

use crate::error::Result;
use crate::http_client::{HttpUtils, create_http_client};
use crate::operations::{Operation, UpstreamRequest};
use crate::resolver::UpstreamSession;

/// Value of the `module` field in the auth header.
pub const MODULE_NAME: &str = "superfaktura-mcp";

/// Executes operations against the SuperFaktura API.
///
/// Holds only the pooled HTTP client; identity and endpoint come with each
/// call as an [`UpstreamSession`], so one instance serves every tenant.
#[derive(Debug, Clone)]
pub struct SuperFakturaClient {
    client: Client,
}

impl SuperFakturaClient {
    /// Client with the default connect and request timeouts.
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: create_http_client()?,
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Validate, translate and send one operation.
    pub async fn execute(&self, session: &UpstreamSession, operation: &Operation) -> Result<Value> {
        operation.validate()?;
        let request = operation.to_request()?;
        self.send(session, &request).await
    }

    /// Send an already translated request.
    pub async fn send(&self, session: &UpstreamSession, request: &UpstreamRequest) -> Result<Value> {
        let url = session.url(&request.path);
        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header(AUTHORIZATION, auth_header(session))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let (status, text) =
            HttpUtils::execute_request(builder, &request.method, &request.path).await?;
        HttpUtils::map_response(status, &text)
    }
}

/// `SFAPI email=...&apikey=...[&company_id=...]&module=...`
pub fn auth_header(session: &UpstreamSession) -> String {
    let mut value = format!(
        "SFAPI email={}&apikey={}",
        urlencoding::encode(session.email()),
        urlencoding::encode(session.api_key())
    );
    if let Some(company_id) = session.company_id() {
        value.push_str("&company_id=");
        value.push_str(&urlencoding::encode(company_id));
    }
    value.push_str("&module=");
    value.push_str(MODULE_NAME);
    value
}
