//! MCP tool parameter schemas
//!
//! One input structure per tool. All structs derive `Debug`, `Deserialize`
//! and `JsonSchema` as required by rmcp; required vs optional is carried by
//! `Option`. Dates are plain `YYYY-MM-DD` strings here and parsed on
//! conversion into an operation.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};
use superfaktura_provider::{InvoiceItem, InvoiceStatus, SortDirection};

// ============ Invoices ============

/// Parameters for `create_invoice` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateInvoiceParams {
    /// ID of the client to invoice.
    #[schemars(description = "ID of the client to invoice")]
    pub client_id: u64,

    /// Invoice name/description.
    #[schemars(description = "Invoice name/description")]
    pub name: String,

    /// Line items.
    #[schemars(
        description = "Invoice line items, each with name, unit_price and optional description, quantity (default 1) and tax (VAT %)"
    )]
    pub invoice_items: Vec<InvoiceItem>,

    /// Issue date (YYYY-MM-DD), defaults to today.
    #[schemars(description = "Issue date (YYYY-MM-DD), defaults to today")]
    pub issued_date: Option<String>,

    /// Due date (YYYY-MM-DD), defaults to the issue date.
    #[schemars(description = "Due date (YYYY-MM-DD), defaults to the issue date")]
    pub due_date: Option<String>,

    /// Variable symbol for payment identification.
    #[schemars(description = "Variable symbol for payment identification")]
    pub variable_symbol: Option<String>,
}

/// Parameters for `list_invoices` tool.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListInvoicesParams {
    /// Page number (1-indexed, default: 1).
    #[schemars(description = "Page number (1-indexed, default: 1)")]
    pub page: Option<u32>,

    /// Items per page (1-100, default: 50).
    #[schemars(description = "Items per page (1-100, default: 50)")]
    pub per_page: Option<u32>,

    /// Invoice status filter.
    #[schemars(description = "Invoice status filter: draft, sent, paid or cancelled")]
    pub status: Option<InvoiceStatus>,

    /// Only invoices of this client.
    #[schemars(description = "Only invoices of this client")]
    pub client_id: Option<u64>,

    /// Created on or after (YYYY-MM-DD).
    #[schemars(description = "Created on or after this date (YYYY-MM-DD)")]
    pub from_date: Option<String>,

    /// Created on or before (YYYY-MM-DD).
    #[schemars(description = "Created on or before this date (YYYY-MM-DD)")]
    pub to_date: Option<String>,

    /// Full-text search.
    #[schemars(description = "Full-text search in invoice fields")]
    pub search: Option<String>,

    /// Field to sort by.
    #[schemars(description = "Field to sort by, e.g. created or id")]
    pub order_by: Option<String>,

    /// Sort direction, requires `order_by`.
    #[schemars(description = "Sort direction (ASC or DESC, default DESC); requires order_by")]
    pub direction: Option<SortDirection>,
}

/// Parameters for `get_invoice` and `delete_invoice` tools.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct InvoiceIdParams {
    /// ID of the invoice.
    #[schemars(description = "ID of the invoice")]
    pub invoice_id: u64,
}

/// Parameters for `send_invoice` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SendInvoiceParams {
    /// ID of the invoice to send.
    #[schemars(description = "ID of the invoice to send")]
    pub invoice_id: u64,

    /// Optional override email address.
    #[schemars(description = "Optional override email address (uses the client's email by default)")]
    pub email: Option<String>,
}

/// Parameters for `mark_invoice_paid` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct MarkInvoicePaidParams {
    /// ID of the invoice.
    #[schemars(description = "ID of the invoice")]
    pub invoice_id: u64,

    /// Payment amount.
    #[schemars(description = "Payment amount")]
    pub amount: f64,

    /// Payment date (YYYY-MM-DD), defaults to today.
    #[schemars(description = "Payment date (YYYY-MM-DD), defaults to today")]
    pub payment_date: Option<String>,

    /// Payment type.
    #[schemars(description = "Payment type, e.g. transfer, cash, card (default: transfer)")]
    pub payment_type: Option<String>,
}

// ============ Clients ============

/// Parameters for `create_client` tool.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct CreateClientParams {
    /// Client or company name.
    #[schemars(description = "Client or company name")]
    pub name: String,

    #[schemars(description = "Contact email")]
    pub email: Option<String>,

    #[schemars(description = "Contact phone")]
    pub phone: Option<String>,

    #[schemars(description = "Street address")]
    pub address: Option<String>,

    #[schemars(description = "City")]
    pub city: Option<String>,

    #[schemars(description = "Postal code")]
    pub zip_code: Option<String>,

    #[schemars(description = "Country name")]
    pub country: Option<String>,

    /// Company ID (IČO).
    #[schemars(description = "Company registration number (IČO)")]
    pub ico: Option<String>,

    /// Tax ID (DIČ).
    #[schemars(description = "Tax identification number (DIČ)")]
    pub dic: Option<String>,

    /// VAT ID (IČ DPH).
    #[schemars(description = "VAT identification number (IČ DPH)")]
    pub ic_dph: Option<String>,
}

/// Parameters for `list_clients` tool.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListClientsParams {
    /// Page number (1-indexed, default: 1).
    #[schemars(description = "Page number (1-indexed, default: 1)")]
    pub page: Option<u32>,

    /// Items per page (1-100, default: 50).
    #[schemars(description = "Items per page (1-100, default: 50)")]
    pub per_page: Option<u32>,

    #[schemars(description = "Full-text search in client fields")]
    pub search: Option<String>,

    #[schemars(description = "Field to sort by, e.g. name or created")]
    pub order_by: Option<String>,

    #[schemars(description = "Sort direction (ASC or DESC, default DESC); requires order_by")]
    pub direction: Option<SortDirection>,
}

/// Parameters for `get_client` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ClientIdParams {
    /// ID of the client.
    #[schemars(description = "ID of the client")]
    pub client_id: u64,
}

/// Parameters for `update_client` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateClientParams {
    /// ID of the client to update.
    #[schemars(description = "ID of the client to update")]
    pub client_id: u64,

    /// Fields to update.
    #[schemars(description = "Client fields to update, e.g. {\"email\": \"new@example.com\"}")]
    pub updates: Map<String, Value>,
}

// ============ Expenses ============

/// Parameters for `create_expense` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateExpenseParams {
    /// Expense name/description.
    #[schemars(description = "Expense name/description")]
    pub name: String,

    /// Expense amount.
    #[schemars(description = "Expense amount")]
    pub amount: f64,

    /// Expense date (YYYY-MM-DD), defaults to today.
    #[schemars(description = "Expense date (YYYY-MM-DD), defaults to today")]
    pub expense_date: Option<String>,

    #[schemars(description = "Expense category")]
    pub category: Option<String>,

    #[schemars(description = "Additional description")]
    pub description: Option<String>,

    #[schemars(description = "Variable symbol")]
    pub variable_symbol: Option<String>,
}

/// Parameters for `list_expenses` tool.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListExpensesParams {
    /// Page number (1-indexed, default: 1).
    #[schemars(description = "Page number (1-indexed, default: 1)")]
    pub page: Option<u32>,

    /// Items per page (1-100, default: 50).
    #[schemars(description = "Items per page (1-100, default: 50)")]
    pub per_page: Option<u32>,

    /// From date (YYYY-MM-DD).
    #[schemars(description = "Expenses on or after this date (YYYY-MM-DD)")]
    pub from_date: Option<String>,

    /// To date (YYYY-MM-DD).
    #[schemars(description = "Expenses on or before this date (YYYY-MM-DD)")]
    pub to_date: Option<String>,

    #[schemars(description = "Full-text search in expense fields")]
    pub search: Option<String>,

    #[schemars(description = "Field to sort by, e.g. created or amount")]
    pub order_by: Option<String>,

    #[schemars(description = "Sort direction (ASC or DESC, default DESC); requires order_by")]
    pub direction: Option<SortDirection>,
}

/// Parameters for `get_expense` and `delete_expense` tools.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExpenseIdParams {
    /// ID of the expense.
    #[schemars(description = "ID of the expense")]
    pub expense_id: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_invoice_params_minimal() {
        let params: CreateInvoiceParams = serde_json::from_value(json!({
            "client_id": 1,
            "name": "Consulting",
            "invoice_items": [{ "name": "Hours", "unit_price": 10 }]
        }))
        .unwrap();
        assert_eq!(params.client_id, 1);
        assert_eq!(params.invoice_items.len(), 1);
        assert!(params.issued_date.is_none());
    }

    #[test]
    fn create_invoice_params_missing_items_rejected() {
        let result: Result<CreateInvoiceParams, _> =
            serde_json::from_value(json!({ "client_id": 1, "name": "x" }));
        assert!(result.is_err());
    }

    #[test]
    fn list_invoices_params_all_optional() {
        let params: ListInvoicesParams = serde_json::from_value(json!({})).unwrap();
        assert!(params.page.is_none());
        assert!(params.status.is_none());
    }

    #[test]
    fn list_invoices_params_rejects_unknown_status() {
        let result: Result<ListInvoicesParams, _> =
            serde_json::from_value(json!({ "status": "overdue" }));
        assert!(result.is_err());
    }

    #[test]
    fn list_clients_params_rejects_lowercase_direction() {
        let result: Result<ListClientsParams, _> =
            serde_json::from_value(json!({ "order_by": "name", "direction": "asc" }));
        assert!(result.is_err());
    }

    #[test]
    fn update_client_params_requires_object() {
        let ok: UpdateClientParams =
            serde_json::from_value(json!({ "client_id": 3, "updates": { "city": "Brno" } }))
                .unwrap();
        assert_eq!(ok.updates.len(), 1);

        let result: Result<UpdateClientParams, _> =
            serde_json::from_value(json!({ "client_id": 3, "updates": "city=Brno" }));
        assert!(result.is_err());
    }

    #[test]
    fn negative_id_rejected_by_type() {
        let result: Result<InvoiceIdParams, _> = serde_json::from_value(json!({ "invoice_id": -1 }));
        assert!(result.is_err());
    }

    #[test]
    fn create_invoice_schema_marks_required_fields() {
        let schema = schemars::schema_for!(CreateInvoiceParams);
        let value = serde_json::to_value(&schema).unwrap();
        let required: Vec<&str> = value["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert!(required.contains(&"client_id"));
        assert!(required.contains(&"name"));
        assert!(required.contains(&"invoice_items"));
        assert!(!required.contains(&"issued_date"));
    }
}
