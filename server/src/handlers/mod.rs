pub mod auth;
pub mod customers;
pub mod drivers;
pub mod reservations;
pub mod vehicles;

use crate::error::ApiError;

/// Path ids arrive as strings so that a malformed id produces the
/// API's own 400 JSON body instead of a framework rejection.
pub(crate) fn parse_id(raw: &str, label: &str) -> Result<i32, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid {label} ID")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_numbers() {
        assert_eq!(parse_id("17", "customer").unwrap(), 17);
    }

    #[test]
    fn parse_id_rejects_garbage() {
        let err = parse_id("seventeen", "vehicle").unwrap_err();
        assert_eq!(err.to_string(), "Invalid vehicle ID");
    }
}
