use chrono::NaiveDate;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::{
    DATE_FORMAT, Pagination, PathParams, Sort, UpstreamRequest, require_date_order, require_id,
    require_non_negative, require_positive, require_text, to_json,
};
use crate::error::{ApiError, Result};

/// Invoice lifecycle filter for `list_invoices`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    /// Numeric status code the upstream filters on.
    pub fn code(self) -> u8 {
        match self {
            Self::Draft => 1,
            Self::Sent => 2,
            Self::Paid => 3,
            Self::Cancelled => 99,
        }
    }
}

fn default_quantity() -> f64 {
    1.0
}

/// One invoice line, sent to the upstream as-is.
///
/// Fields beyond the typed ones (`unit`, `discount`, `sku`, ...) are kept in
/// `extra` and forwarded unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct InvoiceItem {
    /// Line item name
    pub name: String,
    /// Longer description shown under the name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Price per unit, excluding tax
    pub unit_price: f64,
    /// Number of units (default 1)
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    /// VAT rate in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<f64>,
    /// Other upstream item fields, passed through
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InvoiceItem {
    fn validate(&self, index: usize) -> Result<()> {
        require_text(&format!("invoice_items[{index}].name"), &self.name)?;
        require_positive(&format!("invoice_items[{index}].quantity"), self.quantity)?;
        require_non_negative(&format!("invoice_items[{index}].unit_price"), self.unit_price)?;
        if let Some(tax) = self.tax {
            require_non_negative(&format!("invoice_items[{index}].tax"), tax)?;
        }
        Ok(())
    }
}

/// `create_invoice` request with every date already defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub client_id: u64,
    pub name: String,
    pub issued: NaiveDate,
    pub due: NaiveDate,
    pub variable_symbol: Option<String>,
    pub items: Vec<InvoiceItem>,
}

impl NewInvoice {
    pub(super) fn validate(&self) -> Result<()> {
        require_id("client_id", self.client_id)?;
        require_text("name", &self.name)?;
        if self.items.is_empty() {
            return Err(ApiError::validation(
                "invoice_items",
                "at least one item is required",
            ));
        }
        for (index, item) in self.items.iter().enumerate() {
            item.validate(index)?;
        }
        require_date_order("issued_date", Some(self.issued), Some(self.due))
    }

    pub(super) fn to_request(&self) -> Result<UpstreamRequest> {
        let mut invoice = json!({
            "client_id": self.client_id,
            "name": self.name,
            "issued": self.issued.format(DATE_FORMAT).to_string(),
            "due": self.due.format(DATE_FORMAT).to_string(),
        });
        if let Some(variable) = &self.variable_symbol {
            invoice["variable"] = json!(variable);
        }
        let body = json!({
            "Invoice": invoice,
            "InvoiceItem": to_json(&self.items)?,
        });
        Ok(UpstreamRequest::with_body(Method::POST, "invoices/create", body))
    }
}

/// `list_invoices` filters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InvoiceQuery {
    pub pagination: Pagination,
    pub status: Option<InvoiceStatus>,
    pub client_id: Option<u64>,
    pub created_since: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
    pub search: Option<String>,
    pub sort: Option<Sort>,
}

impl InvoiceQuery {
    pub(super) fn validate(&self) -> Result<()> {
        self.pagination.validate()?;
        if let Some(client_id) = self.client_id {
            require_id("client_id", client_id)?;
        }
        require_date_order("from_date", self.created_since, self.created_to)?;
        self.sort.as_ref().map_or(Ok(()), Sort::validate)
    }

    pub(super) fn to_request(&self) -> UpstreamRequest {
        let mut params = PathParams::default();
        self.pagination.write(&mut params);
        params.push_opt("status", self.status.map(InvoiceStatus::code));
        params.push_opt("client_id", self.client_id);
        params.push_opt("created_since", self.created_since);
        params.push_opt("created_to", self.created_to);
        params.push_search(self.search.as_deref().filter(|s| !s.trim().is_empty()));
        if let Some(sort) = &self.sort {
            sort.write(&mut params);
        }
        UpstreamRequest::get(params.finish("invoices/index.json"))
    }
}

/// `send_invoice` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendInvoice {
    pub invoice_id: u64,
    /// Overrides the client's address on file.
    pub email: Option<String>,
}

impl SendInvoice {
    pub(super) fn validate(&self) -> Result<()> {
        require_id("invoice_id", self.invoice_id)?;
        match self.email.as_deref() {
            Some(email) if !email.contains('@') => Err(ApiError::validation(
                "email",
                format!("'{email}' is not an e-mail address"),
            )),
            _ => Ok(()),
        }
    }

    pub(super) fn to_request(&self) -> UpstreamRequest {
        let mut invoice = json!({ "id": self.invoice_id });
        if let Some(email) = &self.email {
            invoice["email"] = json!(email);
        }
        UpstreamRequest::with_body(Method::POST, "invoices/send", json!({ "Invoice": invoice }))
    }
}

/// `mark_invoice_paid` request.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoicePayment {
    pub invoice_id: u64,
    pub amount: f64,
    pub payment_type: String,
    pub paid_on: NaiveDate,
}

impl InvoicePayment {
    pub(super) fn validate(&self) -> Result<()> {
        require_id("invoice_id", self.invoice_id)?;
        require_positive("amount", self.amount)?;
        require_text("payment_type", &self.payment_type)
    }

    pub(super) fn to_request(&self) -> UpstreamRequest {
        let body = json!({
            "InvoicePayment": {
                "invoice_id": self.invoice_id,
                "amount": self.amount,
                "payment_type": self.payment_type,
                "created": self.paid_on.format(DATE_FORMAT).to_string(),
            }
        });
        UpstreamRequest::with_body(Method::POST, "invoice_payments/add", body)
    }
}
