//! Shared test helpers.

#![allow(dead_code)]

use superfaktura_provider::{EnvConfig, InboundHeaders, SuperFakturaClient, UpstreamSession, resolve};

pub const TEST_EMAIL: &str = "api@example.sk";
pub const TEST_API_KEY: &str = "test-key";

/// Skip the test when any of the given environment variables is missing.
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("skipping: missing environment variable {}", $var);
                return;
            }
        )+
    };
}

/// Assert `Option` is `Some` and unwrap it.
#[macro_export]
macro_rules! require_some {
    ($expr:expr $(,)?) => {{
        let opt = $expr;
        assert!(opt.is_some(), "expected Some(..), got None");
        let Some(val) = opt else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// Assert `Result` is `Ok` and unwrap it.
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// Session pointing at an arbitrary base URL.
pub fn session_for(api_url: &str) -> UpstreamSession {
    let env = EnvConfig::from_vars([
        ("SUPERFAKTURA_EMAIL", TEST_EMAIL),
        ("SUPERFAKTURA_API_KEY", TEST_API_KEY),
        ("SUPERFAKTURA_API_URL", api_url),
    ]);
    match resolve(&InboundHeaders::new(), &env) {
        Ok(session) => session,
        Err(e) => unreachable!("test env is complete: {e}"),
    }
}

/// Mock upstream plus a client and session aimed at it.
pub struct TestContext {
    pub server: mockito::ServerGuard,
    pub client: SuperFakturaClient,
    pub session: UpstreamSession,
}

impl TestContext {
    pub async fn new() -> Option<Self> {
        let server = mockito::Server::new_async().await;
        let session = session_for(&server.url());
        let client = SuperFakturaClient::new().ok()?;
        Some(Self {
            server,
            client,
            session,
        })
    }

    /// Expected `Authorization` value for [`TEST_EMAIL`] / [`TEST_API_KEY`].
    pub fn auth_header() -> String {
        format!("SFAPI email=api%40example.sk&apikey={TEST_API_KEY}&module=superfaktura-mcp")
    }
}
