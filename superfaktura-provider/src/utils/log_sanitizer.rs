//! Log sanitization utilities
//!
//! Upstream responses carry client addresses, tax ids and invoice totals;
//! debug and error logs only ever see a bounded prefix of them.

use std::borrow::Cow;

/// Maximum number of characters kept in log output.
const TRUNCATE_LIMIT: usize = 256;

/// Truncate a response body for logging.
///
/// Bodies within the limit are borrowed unchanged. Longer ones keep the first
/// `TRUNCATE_LIMIT` characters and note the full byte length.
pub fn truncate_for_log(s: &str) -> Cow<'_, str> {
    match s.char_indices().nth(TRUNCATE_LIMIT) {
        None => Cow::Borrowed(s),
        Some((cut, _)) => Cow::Owned(format!(
            "{}... [truncated, total {} bytes]",
            &s[..cut],
            s.len()
        )),
    }
}
