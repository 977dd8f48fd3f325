//! Query-string paging shared by the admin and storefront lists.

use crate::error::ApiError;

/// Parse a `skip`/`take` value. Absent or empty means `default`.
pub(crate) fn parse_count(name: &str, raw: Option<&str>, default: u64) -> Result<u64, ApiError> {
  match raw.map(str::trim) {
    None | Some("") => Ok(default),
    Some(raw) => raw
      .parse()
      .map_err(|_| ApiError::BadRequest(format!("`{name}` must be a non-negative integer"))),
  }
}
