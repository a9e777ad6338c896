//! Credential and endpoint resolution.
//!
//! Every tool call resolves its own [`UpstreamSession`] from two inputs: the
//! inbound request headers (multi-tenant HTTP deployments) and the process
//! configuration captured once at startup (single-tenant deployments).
//! Each field falls back from header to environment independently.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use http::HeaderMap;

use crate::error::{CredentialField, ResolutionError};

pub const HEADER_EMAIL: &str = "x-superfaktura-email";
pub const HEADER_API_KEY: &str = "x-superfaktura-api-key";
pub const HEADER_COUNTRY: &str = "x-superfaktura-country";
pub const HEADER_COMPANY_ID: &str = "x-superfaktura-company-id";

pub const ENV_EMAIL: &str = "SUPERFAKTURA_EMAIL";
pub const ENV_API_KEY: &str = "SUPERFAKTURA_API_KEY";
pub const ENV_COUNTRY: &str = "SUPERFAKTURA_COUNTRY";
pub const ENV_COMPANY_ID: &str = "SUPERFAKTURA_COMPANY_ID";
pub const ENV_API_URL: &str = "SUPERFAKTURA_API_URL";

const SESSION_HEADERS: [&str; 4] = [
    HEADER_EMAIL,
    HEADER_API_KEY,
    HEADER_COUNTRY,
    HEADER_COMPANY_ID,
];

/// Regional SuperFaktura deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Country {
    /// Slovakia.
    #[default]
    Sk,
    /// Czech Republic.
    Cz,
    /// Austria.
    At,
    /// Slovak sandbox.
    SandboxSk,
    /// Czech sandbox.
    SandboxCz,
}

impl Country {
    pub const ALL: [Self; 5] = [
        Self::Sk,
        Self::Cz,
        Self::At,
        Self::SandboxSk,
        Self::SandboxCz,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::Sk => "sk",
            Self::Cz => "cz",
            Self::At => "at",
            Self::SandboxSk => "sandbox-sk",
            Self::SandboxCz => "sandbox-cz",
        }
    }

    /// Origin of the regional API.
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Sk => "https://moja.superfaktura.sk",
            Self::Cz => "https://moje.superfaktura.cz",
            Self::At => "https://meine.superfaktura.at",
            Self::SandboxSk => "https://sandbox.superfaktura.sk",
            Self::SandboxCz => "https://sandbox.superfaktura.cz",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Country {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.code() == normalized)
            .ok_or_else(|| ResolutionError::UnsupportedCountry {
                country: s.to_string(),
            })
    }
}

/// Process configuration read from the environment.
///
/// Built once at startup and passed explicitly into [`resolve`] on every call.
/// Empty and whitespace-only values count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    pub email: Option<String>,
    pub api_key: Option<String>,
    pub country: Option<String>,
    pub company_id: Option<String>,
    pub api_url: Option<String>,
}

impl EnvConfig {
    /// Snapshot the `SUPERFAKTURA_*` variables of the current process.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Build from arbitrary key/value pairs. Unrelated keys are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in vars {
            let value = non_empty(value.as_ref());
            match key.as_ref() {
                ENV_EMAIL => config.email = value,
                ENV_API_KEY => config.api_key = value,
                ENV_COUNTRY => config.country = value,
                ENV_COMPANY_ID => config.company_id = value,
                ENV_API_URL => config.api_url = value,
                _ => {}
            }
        }
        config
    }

    /// Whether both identity fields are present, i.e. the server can run
    /// single-tenant without any request headers.
    pub fn has_credentials(&self) -> bool {
        self.email.is_some() && self.api_key.is_some()
    }
}

/// The `x-superfaktura-*` headers of one inbound call, keyed case-insensitively.
///
/// Empty for the stdio transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundHeaders {
    values: HashMap<String, String>,
    /// Session headers that were sent without a usable value.
    unreadable: Vec<String>,
}

impl InboundHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the session headers from an HTTP header map.
    ///
    /// Values are decoded as UTF-8, so non-ASCII e-mail addresses survive.
    /// A header that is blank or not UTF-8 is remembered as unreadable and
    /// makes [`resolve`] fail instead of falling back to the environment.
    pub fn from_header_map(headers: &HeaderMap) -> Self {
        let mut inbound = Self::default();
        for name in SESSION_HEADERS {
            let Some(raw) = headers.get(name) else {
                continue;
            };
            match std::str::from_utf8(raw.as_bytes()).ok().and_then(non_empty) {
                Some(value) => {
                    inbound.values.insert(name.to_string(), value);
                }
                None => inbound.unreadable.push(name.to_string()),
            }
        }
        inbound
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// First session header that was sent without a usable value.
    pub fn first_unreadable(&self) -> Option<&str> {
        self.unreadable.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.unreadable.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for InboundHeaders
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut inbound = Self::default();
        for (key, value) in iter {
            let key = key.as_ref().to_ascii_lowercase();
            match non_empty(value.as_ref()) {
                Some(value) => {
                    inbound.values.insert(key, value);
                }
                None if SESSION_HEADERS.contains(&key.as_str()) => inbound.unreadable.push(key),
                None => {}
            }
        }
        inbound
    }
}

/// Fully resolved identity and endpoint for one upstream request.
///
/// Only [`resolve`] constructs this, so a session always has a non-empty
/// email, API key and base URL.
#[derive(Clone, PartialEq, Eq)]
pub struct UpstreamSession {
    email: String,
    api_key: String,
    base_url: String,
    company_id: Option<String>,
}

impl UpstreamSession {
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn company_id(&self) -> Option<&str> {
        self.company_id.as_deref()
    }

    /// Absolute URL for an API path relative to the base URL.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

// API key stays out of logs.
impl fmt::Debug for UpstreamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamSession")
            .field("email", &self.email)
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("company_id", &self.company_id)
            .finish()
    }
}

/// Resolve the session for one call.
///
/// Pure and synchronous: the result depends only on `headers` and `env`.
/// Header values win over environment values field by field; the base URL
/// comes from `SUPERFAKTURA_API_URL` when set, otherwise from the country
/// table (default `sk`). A session header that was sent but is unreadable
/// fails resolution rather than falling back.
pub fn resolve(
    headers: &InboundHeaders,
    env: &EnvConfig,
) -> Result<UpstreamSession, ResolutionError> {
    if let Some(name) = headers.first_unreadable() {
        return Err(ResolutionError::InvalidHeader {
            name: name.to_string(),
        });
    }

    let pick = |header: &str, fallback: &Option<String>| {
        headers
            .get(header)
            .map(str::to_string)
            .or_else(|| fallback.clone())
    };

    let email = pick(HEADER_EMAIL, &env.email);
    let api_key = pick(HEADER_API_KEY, &env.api_key);
    let country = pick(HEADER_COUNTRY, &env.country);
    let company_id = pick(HEADER_COMPANY_ID, &env.company_id);

    let (email, api_key) = match (email, api_key) {
        (Some(email), Some(api_key)) => (email, api_key),
        (email, api_key) => {
            let mut fields = Vec::with_capacity(2);
            if email.is_none() {
                fields.push(CredentialField::Email);
            }
            if api_key.is_none() {
                fields.push(CredentialField::ApiKey);
            }
            return Err(ResolutionError::MissingCredentials { fields });
        }
    };

    let base_url = match &env.api_url {
        Some(url) => url.clone(),
        None => country
            .as_deref()
            .map_or(Ok(Country::default()), Country::from_str)?
            .base_url()
            .to_string(),
    };

    Ok(UpstreamSession {
        email,
        api_key,
        base_url,
        company_id,
    })
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> EnvConfig {
        EnvConfig::from_vars(pairs.iter().copied())
    }

    fn headers(pairs: &[(&str, &str)]) -> InboundHeaders {
        pairs.iter().copied().collect()
    }

    // ---- Country ----

    #[test]
    fn country_table_has_five_entries() {
        let codes: Vec<_> = Country::ALL.iter().map(|c| c.code()).collect();
        assert_eq!(codes, ["sk", "cz", "at", "sandbox-sk", "sandbox-cz"]);
    }

    #[test]
    fn country_parse_is_case_insensitive() {
        assert_eq!("CZ".parse::<Country>(), Ok(Country::Cz));
        assert_eq!(" Sandbox-SK ".parse::<Country>(), Ok(Country::SandboxSk));
    }

    #[test]
    fn country_parse_rejects_unknown() {
        for code in ["de", "pl", "sandbox-at", ""] {
            assert_eq!(
                code.parse::<Country>(),
                Err(ResolutionError::UnsupportedCountry {
                    country: code.to_string()
                })
            );
        }
    }

    // ---- EnvConfig / InboundHeaders ----

    #[test]
    fn env_config_ignores_blank_values_and_unrelated_keys() {
        let config = env(&[
            (ENV_EMAIL, "  "),
            (ENV_API_KEY, "key"),
            ("PATH", "/usr/bin"),
        ]);
        assert_eq!(config.email, None);
        assert_eq!(config.api_key.as_deref(), Some("key"));
        assert!(!config.has_credentials());
    }

    #[test]
    fn inbound_headers_are_case_insensitive() {
        let h = headers(&[("X-SuperFaktura-Email", "a@b.com")]);
        assert_eq!(h.get(HEADER_EMAIL), Some("a@b.com"));
        assert_eq!(h.get("X-SUPERFAKTURA-EMAIL"), Some("a@b.com"));
    }

    #[test]
    fn inbound_headers_from_header_map_keeps_session_headers_only() {
        let mut map = HeaderMap::new();
        map.insert(
            http::HeaderName::from_bytes(b"X-SuperFaktura-Api-Key").unwrap(),
            "k".parse().unwrap(),
        );
        map.insert("authorization", "Bearer zzz".parse().unwrap());
        map.insert(HEADER_COUNTRY, "".parse().unwrap());

        let h = InboundHeaders::from_header_map(&map);
        assert_eq!(h.get(HEADER_API_KEY), Some("k"));
        assert_eq!(h.get("authorization"), None);
        assert_eq!(h.get(HEADER_COUNTRY), None);
        assert_eq!(h.first_unreadable(), Some(HEADER_COUNTRY));
    }

    #[test]
    fn inbound_headers_decode_non_ascii_values() {
        let mut map = HeaderMap::new();
        map.insert(
            HEADER_EMAIL,
            http::HeaderValue::from_bytes("tenant.jána@firma.sk".as_bytes()).unwrap(),
        );
        let h = InboundHeaders::from_header_map(&map);
        assert_eq!(h.get(HEADER_EMAIL), Some("tenant.jána@firma.sk"));
        assert_eq!(h.first_unreadable(), None);
    }

    #[test]
    fn non_ascii_header_email_beats_env_email() {
        let mut map = HeaderMap::new();
        map.insert(
            HEADER_EMAIL,
            http::HeaderValue::from_bytes("tenant.jána@firma.sk".as_bytes()).unwrap(),
        );
        map.insert(HEADER_API_KEY, "tenant-key".parse().unwrap());

        let session = resolve(
            &InboundHeaders::from_header_map(&map),
            &env(&[(ENV_EMAIL, "operator@host.sk"), (ENV_API_KEY, "operator-key")]),
        )
        .unwrap();
        assert_eq!(session.email(), "tenant.jána@firma.sk");
        assert_eq!(session.api_key(), "tenant-key");
    }

    #[test]
    fn undecodable_header_fails_instead_of_falling_back() {
        let mut map = HeaderMap::new();
        map.insert(HEADER_EMAIL, http::HeaderValue::from_bytes(b"\xff\xfe").unwrap());
        map.insert(HEADER_API_KEY, "tenant-key".parse().unwrap());

        let err = resolve(
            &InboundHeaders::from_header_map(&map),
            &env(&[(ENV_EMAIL, "operator@host.sk"), (ENV_API_KEY, "operator-key")]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ResolutionError::InvalidHeader {
                name: HEADER_EMAIL.to_string()
            }
        );
    }

    #[test]
    fn blank_header_fails_instead_of_falling_back() {
        let err = resolve(
            &headers(&[(HEADER_EMAIL, "   "), (HEADER_API_KEY, "tenant-key")]),
            &env(&[(ENV_EMAIL, "operator@host.sk")]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ResolutionError::InvalidHeader {
                name: HEADER_EMAIL.to_string()
            }
        );
    }

    // ---- resolve ----

    #[test]
    fn env_only_resolves_with_default_country() {
        let session = resolve(
            &InboundHeaders::new(),
            &env(&[(ENV_EMAIL, "a@b.com"), (ENV_API_KEY, "k")]),
        )
        .unwrap();
        assert_eq!(session.email(), "a@b.com");
        assert_eq!(session.api_key(), "k");
        assert_eq!(session.base_url(), "https://moja.superfaktura.sk");
        assert_eq!(session.company_id(), None);
    }

    #[test]
    fn headers_only_resolve_without_environment() {
        let session = resolve(
            &headers(&[
                (HEADER_EMAIL, "h@b.com"),
                (HEADER_API_KEY, "hk"),
                (HEADER_COUNTRY, "at"),
                (HEADER_COMPANY_ID, "42"),
            ]),
            &EnvConfig::default(),
        )
        .unwrap();
        assert_eq!(session.email(), "h@b.com");
        assert_eq!(session.api_key(), "hk");
        assert_eq!(session.base_url(), "https://meine.superfaktura.at");
        assert_eq!(session.company_id(), Some("42"));
    }

    #[test]
    fn header_takes_precedence_over_environment() {
        let session = resolve(
            &headers(&[
                (HEADER_EMAIL, "header@b.com"),
                (HEADER_API_KEY, "header-key"),
                (HEADER_COUNTRY, "cz"),
                (HEADER_COMPANY_ID, "7"),
            ]),
            &env(&[
                (ENV_EMAIL, "env@b.com"),
                (ENV_API_KEY, "env-key"),
                (ENV_COUNTRY, "sk"),
                (ENV_COMPANY_ID, "1"),
            ]),
        )
        .unwrap();
        assert_eq!(session.email(), "header@b.com");
        assert_eq!(session.api_key(), "header-key");
        assert_eq!(session.base_url(), "https://moje.superfaktura.cz");
        assert_eq!(session.company_id(), Some("7"));
    }

    #[test]
    fn fields_resolve_independently_across_sources() {
        let session = resolve(
            &headers(&[(HEADER_EMAIL, "header@b.com")]),
            &env(&[(ENV_API_KEY, "env-key"), (ENV_COMPANY_ID, "9")]),
        )
        .unwrap();
        assert_eq!(session.email(), "header@b.com");
        assert_eq!(session.api_key(), "env-key");
        assert_eq!(session.company_id(), Some("9"));
    }

    #[test]
    fn unknown_country_without_override_fails() {
        let err = resolve(
            &headers(&[(HEADER_COUNTRY, "de")]),
            &env(&[(ENV_EMAIL, "a@b.com"), (ENV_API_KEY, "k")]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ResolutionError::UnsupportedCountry {
                country: "de".to_string()
            }
        );
    }

    #[test]
    fn url_override_wins_even_for_unknown_country() {
        let session = resolve(
            &headers(&[(HEADER_COUNTRY, "de")]),
            &env(&[
                (ENV_EMAIL, "a@b.com"),
                (ENV_API_KEY, "k"),
                (ENV_API_URL, "https://proxy.example.com/sf/"),
            ]),
        )
        .unwrap();
        assert_eq!(session.base_url(), "https://proxy.example.com/sf/");
        assert_eq!(
            session.url("invoices/create"),
            "https://proxy.example.com/sf/invoices/create"
        );
    }

    #[test]
    fn missing_only_api_key_names_only_api_key() {
        let err = resolve(
            &InboundHeaders::new(),
            &env(&[(ENV_EMAIL, "a@b.com")]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ResolutionError::MissingCredentials {
                fields: vec![CredentialField::ApiKey]
            }
        );
    }

    #[test]
    fn missing_only_email_names_only_email() {
        let err = resolve(&headers(&[(HEADER_API_KEY, "k")]), &EnvConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            ResolutionError::MissingCredentials {
                fields: vec![CredentialField::Email]
            }
        );
    }

    #[test]
    fn missing_credentials_reported_before_bad_country() {
        let err = resolve(
            &headers(&[(HEADER_COUNTRY, "xx")]),
            &EnvConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ResolutionError::MissingCredentials { .. }));
    }

    #[test]
    fn resolution_is_idempotent() {
        let h = headers(&[(HEADER_COUNTRY, "sandbox-cz")]);
        let e = env(&[(ENV_EMAIL, "a@b.com"), (ENV_API_KEY, "k")]);
        assert_eq!(resolve(&h, &e), resolve(&h, &e));
    }

    #[test]
    fn debug_output_masks_api_key() {
        let session = resolve(
            &InboundHeaders::new(),
            &env(&[(ENV_EMAIL, "a@b.com"), (ENV_API_KEY, "super-secret")]),
        )
        .unwrap();
        let debug = format!("{session:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("a@b.com"));
    }

    // ---- end-to-end ----

    #[test]
    fn header_country_combines_with_env_credentials() {
        let session = resolve(
            &headers(&[("x-superfaktura-country", "cz")]),
            &env(&[(ENV_EMAIL, "a@b.com"), (ENV_API_KEY, "k")]),
        )
        .unwrap();
        assert_eq!(session.email(), "a@b.com");
        assert_eq!(session.api_key(), "k");
        assert_eq!(session.base_url(), "https://moje.superfaktura.cz");
        assert_eq!(session.company_id(), None);
    }

    #[test]
    fn env_url_override_replaces_default_country() {
        let session = resolve(
            &InboundHeaders::new(),
            &env(&[
                (ENV_API_URL, "https://sandbox.superfaktura.sk"),
                (ENV_EMAIL, "x@y.com"),
                (ENV_API_KEY, "z"),
            ]),
        )
        .unwrap();
        assert_eq!(session.base_url(), "https://sandbox.superfaktura.sk");
    }

    #[test]
    fn no_credentials_anywhere_names_both_fields() {
        let err = resolve(&InboundHeaders::new(), &EnvConfig::default()).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::MissingCredentials {
                fields: vec![CredentialField::Email, CredentialField::ApiKey]
            }
        );
        assert_eq!(err.to_string(), "Missing credentials: email, api_key");
    }
}
