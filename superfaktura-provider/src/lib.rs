//! # superfaktura-provider
//!
//! Client library for the [SuperFaktura](https://www.superfaktura.sk/) invoicing API.
//!
//! The crate has no knowledge of MCP. It provides:
//!
//! - [`resolve`]: per-call credential and endpoint resolution from inbound
//!   headers with fallback to process configuration ([`EnvConfig`]).
//! - [`Operation`]: the catalog of supported upstream calls, each translating
//!   into exactly one [`UpstreamRequest`].
//! - [`SuperFakturaClient`]: sends a request for a resolved [`UpstreamSession`]
//!   and maps the response into JSON or an [`ApiError`].
//!
//! ## Feature Flags
//!
//! - **`rustls`** *(default)*: use rustls.
//! - **`native-tls`**: use the platform's native TLS implementation.
//! - **`schemars`**: derive `JsonSchema` for argument enums and invoice items.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use superfaktura_provider::{
//!     EnvConfig, InboundHeaders, InvoiceQuery, Operation, SuperFakturaClient, resolve,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let env = EnvConfig::from_env();
//! let session = resolve(&InboundHeaders::new(), &env)?;
//!
//! let client = SuperFakturaClient::new()?;
//! let invoices = client
//!     .execute(&session, &Operation::ListInvoices(InvoiceQuery::default()))
//!     .await?;
//! println!("{invoices:#}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every call returns [`Result<T, ApiError>`](ApiError). Nothing is retried;
//! [`ApiError::is_expected`] separates caller mistakes (validation, missing
//! credentials, upstream 4xx) from infrastructure failures.

mod client;
mod encoding;
mod error;
mod http_client;
mod operations;
mod resolver;
mod utils;

pub use client::{MODULE_NAME, SuperFakturaClient, auth_header};

pub use encoding::{decode_url_safe, encode_url_safe};

pub use error::{ApiError, CredentialField, ResolutionError, Result};

pub use http_client::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS};

pub use operations::{
    ClientQuery, ClientUpdate, DEFAULT_PAGE, DEFAULT_PAYMENT_TYPE, DEFAULT_PER_PAGE,
    ExpenseQuery, InvoiceItem, InvoicePayment, InvoiceQuery, InvoiceStatus, MAX_PER_PAGE,
    NewClient, NewExpense, NewInvoice, Operation, Pagination, SendInvoice, Sort, SortDirection,
    UpstreamRequest, parse_date, parse_opt_date, today,
};

pub use resolver::{
    Country, ENV_API_KEY, ENV_API_URL, ENV_COMPANY_ID, ENV_COUNTRY, ENV_EMAIL, EnvConfig,
    HEADER_API_KEY, HEADER_COMPANY_ID, HEADER_COUNTRY, HEADER_EMAIL, InboundHeaders,
    UpstreamSession, resolve,
};
