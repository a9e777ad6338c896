//! MCP Server implementation for SuperFaktura.
//!
//! Exposes one tool per upstream operation. Every call runs the same
//! pipeline: build the operation from typed parameters, validate it, resolve
//! the session from request headers and process configuration, send exactly
//! one upstream request.

use async_trait::async_trait;
use axum::http::request::Parts;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Extensions, Implementation, ProtocolVersion, ServerCapabilities,
        ServerInfo,
    },
    tool, tool_handler, tool_router,
};
use serde_json::Value;
use std::sync::Arc;

use superfaktura_provider::{
    ApiError, EnvConfig, InboundHeaders, Operation, SuperFakturaClient, UpstreamRequest,
    UpstreamSession, resolve,
};

use crate::schemas::{
    ClientIdParams, CreateClientParams, CreateExpenseParams, CreateInvoiceParams, ExpenseIdParams,
    InvoiceIdParams, ListClientsParams, ListExpensesParams, ListInvoicesParams,
    MarkInvoicePaidParams, SendInvoiceParams, UpdateClientParams,
};

/// Sends translated requests upstream.
#[async_trait]
trait InvoicingGateway: Send + Sync {
    async fn send(
        &self,
        session: &UpstreamSession,
        request: &UpstreamRequest,
    ) -> superfaktura_provider::Result<Value>;
}

struct ClientGateway {
    client: SuperFakturaClient,
}

#[async_trait]
impl InvoicingGateway for ClientGateway {
    async fn send(
        &self,
        session: &UpstreamSession,
        request: &UpstreamRequest,
    ) -> superfaktura_provider::Result<Value> {
        self.client.send(session, request).await
    }
}

/// Sanitize error messages to prevent sensitive information leakage.
///
/// Logs the full error to stderr but returns a generic message to the client.
fn sanitize_internal_error(error: impl std::fmt::Display, context: &str) -> McpError {
    tracing::error!("{context} error: {error}");
    McpError::internal_error(
        format!("{context} failed - check server logs for details"),
        None,
    )
}

/// Session headers of the current call. Empty on stdio.
fn inbound_headers(extensions: &Extensions) -> InboundHeaders {
    extensions
        .get::<Parts>()
        .map_or_else(InboundHeaders::new, |parts| {
            InboundHeaders::from_header_map(&parts.headers)
        })
}

/// Tool result carrying the serialized error, flagged `is_error`.
fn tool_error(tool: &str, error: &ApiError) -> Result<CallToolResult, McpError> {
    if error.is_expected() {
        tracing::warn!(tool, "{error}");
    } else {
        tracing::error!(tool, "{error}");
    }

    let json = serde_json::to_string_pretty(error)
        .map_err(|e| sanitize_internal_error(e, &format!("Serialize {tool} error")))?;

    Ok(CallToolResult::error(vec![Content::text(json)]))
}

/// MCP Server for SuperFaktura.
///
/// Cheap to clone: configuration and the HTTP client are shared.
#[derive(Clone)]
pub struct SuperFakturaMcp {
    /// Process configuration captured at startup.
    env: Arc<EnvConfig>,
    /// Upstream transport.
    gateway: Arc<dyn InvoicingGateway>,
    /// Tool router generated by macro.
    tool_router: ToolRouter<Self>,
}

impl SuperFakturaMcp {
    /// Create a new MCP server instance.
    #[must_use]
    pub fn new(env: EnvConfig, client: SuperFakturaClient) -> Self {
        Self::with_gateway(env, Arc::new(ClientGateway { client }))
    }

    fn with_gateway(env: EnvConfig, gateway: Arc<dyn InvoicingGateway>) -> Self {
        Self {
            env: Arc::new(env),
            gateway,
            tool_router: Self::tool_router(),
        }
    }

    /// validate → resolve → translate → send
    async fn dispatch(
        &self,
        headers: &InboundHeaders,
        operation: Result<Operation, ApiError>,
    ) -> Result<Value, ApiError> {
        let operation = operation?;
        operation.validate()?;
        let session = resolve(headers, &self.env)?;
        let request = operation.to_request()?;
        tracing::debug!(
            tool = operation.name(),
            base_url = session.base_url(),
            "{} {}",
            request.method,
            request.path
        );
        self.gateway.send(&session, &request).await
    }

    async fn run_tool(
        &self,
        tool: &str,
        extensions: &Extensions,
        operation: Result<Operation, ApiError>,
    ) -> Result<CallToolResult, McpError> {
        let headers = inbound_headers(extensions);
        match self.dispatch(&headers, operation).await {
            Ok(value) => {
                let json = serde_json::to_string_pretty(&value)
                    .map_err(|e| sanitize_internal_error(e, &format!("Serialize {tool} result")))?;
                Ok(CallToolResult::success(vec![Content::text(json)]))
            }
            Err(e) => tool_error(tool, &e),
        }
    }
}

#[tool_router]
impl SuperFakturaMcp {
    #[tool(description = "Create a new invoice for a client with one or more line items")]
    async fn create_invoice(
        &self,
        Parameters(params): Parameters<CreateInvoiceParams>,
        extensions: Extensions,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("create_invoice", &extensions, params.try_into())
            .await
    }

    #[tool(
        description = "List invoices with pagination and optional filters (status, client, date range, search, sorting)"
    )]
    async fn list_invoices(
        &self,
        Parameters(params): Parameters<ListInvoicesParams>,
        extensions: Extensions,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("list_invoices", &extensions, params.try_into())
            .await
    }

    #[tool(description = "Get full details of an invoice by ID")]
    async fn get_invoice(
        &self,
        Parameters(params): Parameters<InvoiceIdParams>,
        extensions: Extensions,
    ) -> Result<CallToolResult, McpError> {
        let operation = Operation::GetInvoice {
            invoice_id: params.invoice_id,
        };
        self.run_tool("get_invoice", &extensions, Ok(operation))
            .await
    }

    #[tool(description = "Send an invoice by email, optionally to an address other than the client's")]
    async fn send_invoice(
        &self,
        Parameters(params): Parameters<SendInvoiceParams>,
        extensions: Extensions,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("send_invoice", &extensions, Ok(params.into()))
            .await
    }

    #[tool(description = "Record a payment against an invoice")]
    async fn mark_invoice_paid(
        &self,
        Parameters(params): Parameters<MarkInvoicePaidParams>,
        extensions: Extensions,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("mark_invoice_paid", &extensions, params.try_into())
            .await
    }

    #[tool(description = "Delete an invoice by ID")]
    async fn delete_invoice(
        &self,
        Parameters(params): Parameters<InvoiceIdParams>,
        extensions: Extensions,
    ) -> Result<CallToolResult, McpError> {
        let operation = Operation::DeleteInvoice {
            invoice_id: params.invoice_id,
        };
        self.run_tool("delete_invoice", &extensions, Ok(operation))
            .await
    }

    #[tool(description = "Create a new client (customer) with contact and company details")]
    async fn create_client(
        &self,
        Parameters(params): Parameters<CreateClientParams>,
        extensions: Extensions,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("create_client", &extensions, Ok(params.into()))
            .await
    }

    #[tool(description = "List clients with pagination, optional search and sorting")]
    async fn list_clients(
        &self,
        Parameters(params): Parameters<ListClientsParams>,
        extensions: Extensions,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("list_clients", &extensions, params.try_into())
            .await
    }

    #[tool(description = "Get full details of a client by ID")]
    async fn get_client(
        &self,
        Parameters(params): Parameters<ClientIdParams>,
        extensions: Extensions,
    ) -> Result<CallToolResult, McpError> {
        let operation = Operation::GetClient {
            client_id: params.client_id,
        };
        self.run_tool("get_client", &extensions, Ok(operation))
            .await
    }

    #[tool(description = "Update selected fields of an existing client")]
    async fn update_client(
        &self,
        Parameters(params): Parameters<UpdateClientParams>,
        extensions: Extensions,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("update_client", &extensions, Ok(params.into()))
            .await
    }

    #[tool(description = "Record a new expense")]
    async fn create_expense(
        &self,
        Parameters(params): Parameters<CreateExpenseParams>,
        extensions: Extensions,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("create_expense", &extensions, params.try_into())
            .await
    }

    #[tool(description = "List expenses with pagination, optional date range, search and sorting")]
    async fn list_expenses(
        &self,
        Parameters(params): Parameters<ListExpensesParams>,
        extensions: Extensions,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("list_expenses", &extensions, params.try_into())
            .await
    }

    #[tool(description = "Get full details of an expense by ID")]
    async fn get_expense(
        &self,
        Parameters(params): Parameters<ExpenseIdParams>,
        extensions: Extensions,
    ) -> Result<CallToolResult, McpError> {
        let operation = Operation::GetExpense {
            expense_id: params.expense_id,
        };
        self.run_tool("get_expense", &extensions, Ok(operation))
            .await
    }

    #[tool(description = "Delete an expense by ID")]
    async fn delete_expense(
        &self,
        Parameters(params): Parameters<ExpenseIdParams>,
        extensions: Extensions,
    ) -> Result<CallToolResult, McpError> {
        let operation = Operation::DeleteExpense {
            expense_id: params.expense_id,
        };
        self.run_tool("delete_expense", &extensions, Ok(operation))
            .await
    }
}

#[tool_handler]
impl ServerHandler for SuperFakturaMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "SuperFaktura MCP Server - Manage invoices, clients and expenses in SuperFaktura. \
                 Invoice tools: create_invoice, list_invoices, get_invoice, send_invoice, \
                 mark_invoice_paid, delete_invoice. \
                 Client tools: create_client, list_clients, get_client, update_client. \
                 Expense tools: create_expense, list_expenses, get_expense, delete_expense. \
                 Dates use YYYY-MM-DD. Over HTTP, credentials may be supplied per request with the \
                 x-superfaktura-email, x-superfaktura-api-key, x-superfaktura-country and \
                 x-superfaktura-company-id headers; otherwise the server's SUPERFAKTURA_* \
                 environment is used."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
#[path = "test_mocks.rs"]
#[allow(clippy::unwrap_used, clippy::panic)]
pub(crate) mod test_mocks;

#[cfg(test)]
#[path = "server_tests.rs"]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests;

#[cfg(test)]
#[path = "client_integration_tests.rs"]
#[allow(clippy::unwrap_used, clippy::panic)]
mod client_integration_tests;
