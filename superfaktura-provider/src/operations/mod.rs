//! Upstream operation catalog.
//!
//! One [`Operation`] variant per tool. Each variant carries a typed request
//! record that knows how to validate itself and how to translate into exactly
//! one [`UpstreamRequest`]. Translation is pure; nothing here performs I/O.

mod clients;
mod expenses;
mod invoices;

use std::fmt::{self, Display};

use chrono::NaiveDate;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::encoding::encode_url_safe;
use crate::error::{ApiError, Result};

pub use clients::{ClientQuery, ClientUpdate, NewClient};
pub use expenses::{ExpenseQuery, NewExpense};
pub use invoices::{InvoiceItem, InvoicePayment, InvoiceQuery, InvoiceStatus, NewInvoice, SendInvoice};

/// Default page number for list operations.
pub const DEFAULT_PAGE: u32 = 1;
/// Default page size for list operations.
pub const DEFAULT_PER_PAGE: u32 = 50;
/// Largest page size the upstream accepts.
pub const MAX_PER_PAGE: u32 = 100;

/// Date format used by every date field on the wire.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Default payment type when recording a payment.
pub const DEFAULT_PAYMENT_TYPE: &str = "transfer";

/// One HTTP request against the upstream API, relative to the session's
/// base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl UpstreamRequest {
    fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
        }
    }

    fn with_body(method: Method, path: impl Into<String>, body: Value) -> Self {
        Self {
            method,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// Sort direction accepted by list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page selection for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Pagination {
    /// Fill in defaults for omitted values.
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE),
        }
    }

    fn validate(self) -> Result<()> {
        if self.page == 0 {
            return Err(ApiError::validation("page", "must be at least 1"));
        }
        if !(1..=MAX_PER_PAGE).contains(&self.per_page) {
            return Err(ApiError::validation(
                "per_page",
                format!("must be between 1 and {MAX_PER_PAGE}"),
            ));
        }
        Ok(())
    }

    fn write(self, params: &mut PathParams) {
        params.push("page", self.page);
        params.push("per_page", self.per_page);
    }
}

/// Ordering for list endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    fn validate(&self) -> Result<()> {
        let valid = !self.field.is_empty()
            && self
                .field
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid {
            Ok(())
        } else {
            Err(ApiError::validation(
                "order_by",
                "must be a field name made of letters, digits and underscores",
            ))
        }
    }

    fn write(&self, params: &mut PathParams) {
        params.push("order_by", &self.field);
        params.push("direction", self.direction);
    }
}

/// Builder for CakePHP-style named path parameters (`key:value/key:value`).
#[derive(Debug, Default)]
struct PathParams {
    segments: Vec<String>,
}

impl PathParams {
    fn push(&mut self, key: &str, value: impl Display) {
        self.segments.push(format!("{key}:{value}"));
    }

    fn push_opt(&mut self, key: &str, value: Option<impl Display>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    fn push_search(&mut self, search: Option<&str>) {
        self.push_opt("search", search.map(encode_url_safe));
    }

    fn finish(self, base: &str) -> String {
        if self.segments.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{}", self.segments.join("/"))
        }
    }
}

/// Every upstream call the tool surface can make.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    CreateInvoice(NewInvoice),
    ListInvoices(InvoiceQuery),
    GetInvoice { invoice_id: u64 },
    SendInvoice(SendInvoice),
    MarkInvoicePaid(InvoicePayment),
    DeleteInvoice { invoice_id: u64 },
    CreateClient(NewClient),
    ListClients(ClientQuery),
    GetClient { client_id: u64 },
    UpdateClient(ClientUpdate),
    CreateExpense(NewExpense),
    ListExpenses(ExpenseQuery),
    GetExpense { expense_id: u64 },
    DeleteExpense { expense_id: u64 },
}

impl Operation {
    /// Tool name this operation backs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateInvoice(_) => "create_invoice",
            Self::ListInvoices(_) => "list_invoices",
            Self::GetInvoice { .. } => "get_invoice",
            Self::SendInvoice(_) => "send_invoice",
            Self::MarkInvoicePaid(_) => "mark_invoice_paid",
            Self::DeleteInvoice { .. } => "delete_invoice",
            Self::CreateClient(_) => "create_client",
            Self::ListClients(_) => "list_clients",
            Self::GetClient { .. } => "get_client",
            Self::UpdateClient(_) => "update_client",
            Self::CreateExpense(_) => "create_expense",
            Self::ListExpenses(_) => "list_expenses",
            Self::GetExpense { .. } => "get_expense",
            Self::DeleteExpense { .. } => "delete_expense",
        }
    }

    /// Check constraints the type system cannot express.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::CreateInvoice(req) => req.validate(),
            Self::ListInvoices(query) => query.validate(),
            Self::GetInvoice { invoice_id } | Self::DeleteInvoice { invoice_id } => {
                require_id("invoice_id", *invoice_id)
            }
            Self::SendInvoice(req) => req.validate(),
            Self::MarkInvoicePaid(req) => req.validate(),
            Self::CreateClient(req) => req.validate(),
            Self::ListClients(query) => query.validate(),
            Self::GetClient { client_id } => require_id("client_id", *client_id),
            Self::UpdateClient(req) => req.validate(),
            Self::CreateExpense(req) => req.validate(),
            Self::ListExpenses(query) => query.validate(),
            Self::GetExpense { expense_id } | Self::DeleteExpense { expense_id } => {
                require_id("expense_id", *expense_id)
            }
        }
    }

    /// Translate into the single upstream request. Call [`validate`](Self::validate) first.
    pub fn to_request(&self) -> Result<UpstreamRequest> {
        match self {
            Self::CreateInvoice(req) => req.to_request(),
            Self::ListInvoices(query) => Ok(query.to_request()),
            Self::GetInvoice { invoice_id } => {
                Ok(UpstreamRequest::get(format!("invoices/view/{invoice_id}.json")))
            }
            Self::SendInvoice(req) => Ok(req.to_request()),
            Self::MarkInvoicePaid(req) => Ok(req.to_request()),
            Self::DeleteInvoice { invoice_id } => {
                Ok(UpstreamRequest::get(format!("invoices/delete/{invoice_id}")))
            }
            Self::CreateClient(req) => req.to_request(),
            Self::ListClients(query) => Ok(query.to_request()),
            Self::GetClient { client_id } => {
                Ok(UpstreamRequest::get(format!("clients/view/{client_id}.json")))
            }
            Self::UpdateClient(req) => Ok(req.to_request()),
            Self::CreateExpense(req) => Ok(req.to_request()),
            Self::ListExpenses(query) => Ok(query.to_request()),
            Self::GetExpense { expense_id } => {
                Ok(UpstreamRequest::get(format!("expenses/view/{expense_id}.json")))
            }
            Self::DeleteExpense { expense_id } => {
                Ok(UpstreamRequest::get(format!("expenses/delete/{expense_id}")))
            }
        }
    }
}

/// Current local date, used where a date argument defaults to "today".
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Parse a `YYYY-MM-DD` argument.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        ApiError::validation(field, format!("expected a date in YYYY-MM-DD format, got '{value}'"))
    })
}

/// Parse an optional `YYYY-MM-DD` argument.
pub fn parse_opt_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    value.map(|v| parse_date(field, v)).transpose()
}

fn require_id(field: &str, id: u64) -> Result<()> {
    if id == 0 {
        Err(ApiError::validation(field, "must be a positive integer"))
    } else {
        Ok(())
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(ApiError::validation(field, "must not be empty"))
    } else {
        Ok(())
    }
}

fn require_positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ApiError::validation(field, "must be a positive number"))
    }
}

fn require_non_negative(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ApiError::validation(field, "must not be negative"))
    }
}

fn require_date_order(
    from_field: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<()> {
    match (from, to) {
        (Some(from), Some(to)) if from > to => Err(ApiError::validation(
            from_field,
            format!("{from} is after the end date {to}"),
        )),
        _ => Ok(()),
    }
}

fn to_json(value: &impl Serialize) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| ApiError::SerializationError {
        detail: e.to_string(),
    })
}
