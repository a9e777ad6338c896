use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value, json};

use super::{Pagination, PathParams, Sort, UpstreamRequest, require_id, require_text, to_json};
use crate::error::{ApiError, Result};

/// `create_client` request. Optional fields are omitted from the body when unset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NewClient {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Company registration number (IČO).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ico: Option<String>,
    /// Tax identification number (DIČ).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dic: Option<String>,
    /// VAT identification number (IČ DPH).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ic_dph: Option<String>,
}

impl NewClient {
    pub(super) fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        match self.email.as_deref() {
            Some(email) if !email.contains('@') => Err(ApiError::validation(
                "email",
                format!("'{email}' is not an e-mail address"),
            )),
            _ => Ok(()),
        }
    }

    pub(super) fn to_request(&self) -> Result<UpstreamRequest> {
        Ok(UpstreamRequest::with_body(
            Method::POST,
            "clients/create",
            json!({ "Client": to_json(self)? }),
        ))
    }
}

/// `list_clients` filters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientQuery {
    pub pagination: Pagination,
    pub search: Option<String>,
    pub sort: Option<Sort>,
}

impl ClientQuery {
    pub(super) fn validate(&self) -> Result<()> {
        self.pagination.validate()?;
        self.sort.as_ref().map_or(Ok(()), Sort::validate)
    }

    pub(super) fn to_request(&self) -> UpstreamRequest {
        let mut params = PathParams::default();
        self.pagination.write(&mut params);
        params.push_search(self.search.as_deref().filter(|s| !s.trim().is_empty()));
        if let Some(sort) = &self.sort {
            sort.write(&mut params);
        }
        params.push("listinfo", 1);
        UpstreamRequest::get(params.finish("clients/index.json"))
    }
}

/// `update_client` request: a partial set of client fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientUpdate {
    pub client_id: u64,
    pub updates: Map<String, Value>,
}

impl ClientUpdate {
    pub(super) fn validate(&self) -> Result<()> {
        require_id("client_id", self.client_id)?;
        if self.updates.is_empty() {
            return Err(ApiError::validation(
                "updates",
                "at least one field to update is required",
            ));
        }
        match self.updates.get("id") {
            Some(id) if id.as_u64() != Some(self.client_id) => Err(ApiError::validation(
                "updates",
                "'id' cannot be changed; pass the target as client_id",
            )),
            _ => Ok(()),
        }
    }

    pub(super) fn to_request(&self) -> UpstreamRequest {
        let mut client = self.updates.clone();
        client.insert("id".to_string(), json!(self.client_id));
        UpstreamRequest::with_body(
            Method::PATCH,
            format!("clients/edit/{}", self.client_id),
            json!({ "Client": client }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::SortDirection;

    #[test]
    fn create_client_omits_unset_fields() {
        let client = NewClient {
            name: "ACME s.r.o.".to_string(),
            ico: Some("12345678".to_string()),
            ..NewClient::default()
        };
        let req = client.to_request().unwrap();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.path, "clients/create");
        assert_eq!(
            req.body.unwrap(),
            json!({ "Client": { "name": "ACME s.r.o.", "ico": "12345678" } })
        );
    }

    #[test]
    fn create_client_requires_name() {
        let client = NewClient::default();
        assert!(matches!(
            client.validate(),
            Err(ApiError::ValidationError { ref field, .. }) if field == "name"
        ));
    }

    #[test]
    fn list_clients_appends_listinfo_last() {
        assert_eq!(
            ClientQuery::default().to_request().path,
            "clients/index.json/page:1/per_page:50/listinfo:1"
        );

        let query = ClientQuery {
            pagination: Pagination::new(Some(3), Some(25)),
            search: Some("abc".to_string()),
            sort: Some(Sort {
                field: "name".to_string(),
                direction: SortDirection::Desc,
            }),
        };
        assert_eq!(
            query.to_request().path,
            "clients/index.json/page:3/per_page:25/search:YWJj/order_by:name/direction:DESC/listinfo:1"
        );
    }

    #[test]
    fn update_client_merges_id_into_body() {
        let mut updates = Map::new();
        updates.insert("email".to_string(), json!("new@example.com"));
        let update = ClientUpdate {
            client_id: 11,
            updates,
        };
        assert!(update.validate().is_ok());

        let req = update.to_request();
        assert_eq!(req.method, Method::PATCH);
        assert_eq!(req.path, "clients/edit/11");
        assert_eq!(
            req.body.unwrap(),
            json!({ "Client": { "id": 11, "email": "new@example.com" } })
        );
    }

    #[test]
    fn update_client_rejects_empty_updates() {
        let update = ClientUpdate {
            client_id: 11,
            updates: Map::new(),
        };
        assert!(matches!(
            update.validate(),
            Err(ApiError::ValidationError { ref field, .. }) if field == "updates"
        ));
    }

    #[test]
    fn update_client_rejects_foreign_id() {
        let mut updates = Map::new();
        updates.insert("id".to_string(), json!(12));
        let update = ClientUpdate {
            client_id: 11,
            updates,
        };
        assert!(update.validate().is_err());

        let mut same = Map::new();
        same.insert("id".to_string(), json!(11));
        same.insert("city".to_string(), json!("Bratislava"));
        let update = ClientUpdate {
            client_id: 11,
            updates: same,
        };
        assert!(update.validate().is_ok());
    }
}
