use chrono::NaiveDate;
use reqwest::Method;
use serde_json::json;

use super::{
    DATE_FORMAT, Pagination, PathParams, Sort, UpstreamRequest, require_date_order,
    require_positive, require_text,
};
use crate::error::Result;

/// `create_expense` request with the date already defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub name: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub category: Option<String>,
    pub description: Option<String>,
    pub variable_symbol: Option<String>,
}

impl NewExpense {
    pub(super) fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        require_positive("amount", self.amount)
    }

    pub(super) fn to_request(&self) -> UpstreamRequest {
        let mut expense = json!({
            "name": self.name,
            "amount": self.amount,
            "date": self.date.format(DATE_FORMAT).to_string(),
        });
        for (key, value) in [
            ("category", &self.category),
            ("description", &self.description),
            ("variable", &self.variable_symbol),
        ] {
            if let Some(value) = value {
                expense[key] = json!(value);
            }
        }
        UpstreamRequest::with_body(
            Method::POST,
            "expenses/add",
            json!({ "Expense": expense }),
        )
    }
}

/// `list_expenses` filters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExpenseQuery {
    pub pagination: Pagination,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub search: Option<String>,
    pub sort: Option<Sort>,
}

impl ExpenseQuery {
    pub(super) fn validate(&self) -> Result<()> {
        self.pagination.validate()?;
        require_date_order("from_date", self.date_from, self.date_to)?;
        self.sort.as_ref().map_or(Ok(()), Sort::validate)
    }

    pub(super) fn to_request(&self) -> UpstreamRequest {
        let mut params = PathParams::default();
        self.pagination.write(&mut params);
        params.push_opt("date_from", self.date_from);
        params.push_opt("date_to", self.date_to);
        params.push_search(self.search.as_deref().filter(|s| !s.trim().is_empty()));
        if let Some(sort) = &self.sort {
            sort.write(&mut params);
        }
        UpstreamRequest::get(params.finish("expenses/index.json"))
    }
}
