//! Tool parameters → provider operations.
//!
//! Fills defaults (dates, pagination, payment type) and parses date strings.
//! Range and positivity checks stay with [`Operation::validate`].

use superfaktura_provider::{
    ApiError, ClientQuery, ClientUpdate, DEFAULT_PAYMENT_TYPE, ExpenseQuery, InvoicePayment,
    InvoiceQuery, NewClient, NewExpense, NewInvoice, Operation, Pagination, SendInvoice, Sort,
    SortDirection, parse_date, parse_opt_date, today,
};

use crate::schemas::{
    CreateClientParams, CreateExpenseParams, CreateInvoiceParams, ListClientsParams,
    ListExpensesParams, ListInvoicesParams, MarkInvoicePaidParams, SendInvoiceParams,
    UpdateClientParams,
};

fn sort_from(
    order_by: Option<String>,
    direction: Option<SortDirection>,
) -> Result<Option<Sort>, ApiError> {
    match (order_by, direction) {
        (Some(field), direction) => Ok(Some(Sort {
            field,
            direction: direction.unwrap_or_default(),
        })),
        (None, Some(_)) => Err(ApiError::validation("direction", "requires order_by")),
        (None, None) => Ok(None),
    }
}

impl TryFrom<CreateInvoiceParams> for Operation {
    type Error = ApiError;

    fn try_from(params: CreateInvoiceParams) -> Result<Self, Self::Error> {
        let issued = parse_opt_date("issued_date", params.issued_date.as_deref())?
            .unwrap_or_else(today);
        let due = parse_opt_date("due_date", params.due_date.as_deref())?.unwrap_or(issued);
        Ok(Self::CreateInvoice(NewInvoice {
            client_id: params.client_id,
            name: params.name,
            issued,
            due,
            variable_symbol: params.variable_symbol,
            items: params.invoice_items,
        }))
    }
}

impl TryFrom<ListInvoicesParams> for Operation {
    type Error = ApiError;

    fn try_from(params: ListInvoicesParams) -> Result<Self, Self::Error> {
        Ok(Self::ListInvoices(InvoiceQuery {
            pagination: Pagination::new(params.page, params.per_page),
            status: params.status,
            client_id: params.client_id,
            created_since: parse_opt_date("from_date", params.from_date.as_deref())?,
            created_to: parse_opt_date("to_date", params.to_date.as_deref())?,
            search: params.search,
            sort: sort_from(params.order_by, params.direction)?,
        }))
    }
}

impl From<SendInvoiceParams> for Operation {
    fn from(params: SendInvoiceParams) -> Self {
        Self::SendInvoice(SendInvoice {
            invoice_id: params.invoice_id,
            email: params.email,
        })
    }
}

impl TryFrom<MarkInvoicePaidParams> for Operation {
    type Error = ApiError;

    fn try_from(params: MarkInvoicePaidParams) -> Result<Self, Self::Error> {
        let paid_on = match params.payment_date.as_deref() {
            Some(date) => parse_date("payment_date", date)?,
            None => today(),
        };
        Ok(Self::MarkInvoicePaid(InvoicePayment {
            invoice_id: params.invoice_id,
            amount: params.amount,
            payment_type: params
                .payment_type
                .unwrap_or_else(|| DEFAULT_PAYMENT_TYPE.to_string()),
            paid_on,
        }))
    }
}

impl From<CreateClientParams> for Operation {
    fn from(params: CreateClientParams) -> Self {
        Self::CreateClient(NewClient {
            name: params.name,
            email: params.email,
            phone: params.phone,
            address: params.address,
            city: params.city,
            zip: params.zip_code,
            country: params.country,
            ico: params.ico,
            dic: params.dic,
            ic_dph: params.ic_dph,
        })
    }
}

impl TryFrom<ListClientsParams> for Operation {
    type Error = ApiError;

    fn try_from(params: ListClientsParams) -> Result<Self, Self::Error> {
        Ok(Self::ListClients(ClientQuery {
            pagination: Pagination::new(params.page, params.per_page),
            search: params.search,
            sort: sort_from(params.order_by, params.direction)?,
        }))
    }
}

impl From<UpdateClientParams> for Operation {
    fn from(params: UpdateClientParams) -> Self {
        Self::UpdateClient(ClientUpdate {
            client_id: params.client_id,
            updates: params.updates,
        })
    }
}

impl TryFrom<CreateExpenseParams> for Operation {
    type Error = ApiError;

    fn try_from(params: CreateExpenseParams) -> Result<Self, Self::Error> {
        let date = parse_opt_date("expense_date", params.expense_date.as_deref())?
            .unwrap_or_else(today);
        Ok(Self::CreateExpense(NewExpense {
            name: params.name,
            amount: params.amount,
            date,
            category: params.category,
            description: params.description,
            variable_symbol: params.variable_symbol,
        }))
    }
}

impl TryFrom<ListExpensesParams> for Operation {
    type Error = ApiError;

    fn try_from(params: ListExpensesParams) -> Result<Self, Self::Error> {
        Ok(Self::ListExpenses(ExpenseQuery {
            pagination: Pagination::new(params.page, params.per_page),
            date_from: parse_opt_date("from_date", params.from_date.as_deref())?,
            date_to: parse_opt_date("to_date", params.to_date.as_deref())?,
            search: params.search,
            sort: sort_from(params.order_by, params.direction)?,
        }))
    }
}
