//! Query parameter parsing shared by the read endpoints.

use std::collections::HashMap;

use chain_clients_mnee::validate_address;

use super::generic::ApiError;

/// Parses the comma-separated `addresses` query parameter.
///
/// Elements are trimmed and empty ones dropped; every remaining address must
/// validate and is returned in canonical form.
pub fn parse_addresses(query: &HashMap<String, String>) -> Result<Vec<String>, ApiError> {
    let raw = match query.get("addresses") {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(ApiError::bad_request("addresses query parameter is required")),
    };

    let mut addresses = Vec::new();
    for candidate in raw.split(',').map(str::trim).filter(|a| !a.is_empty()) {
        let address = validate_address(candidate)
            .map_err(|_| ApiError::bad_request(format!("Invalid wallet address: {}", candidate)))?;
        addresses.push(address);
    }

    if addresses.is_empty() {
        return Err(ApiError::bad_request("No valid addresses provided"));
    }
    Ok(addresses)
}

fn parse_int(query: &HashMap<String, String>, name: &str) -> Result<Option<i64>, ApiError> {
    match query.get(name).map(String::as_str) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ApiError::bad_request(format!("{} must be a valid integer", name))),
    }
}

/// Integer parameter that must be greater than zero (`page`, `size`).
pub fn parse_positive(
    query: &HashMap<String, String>,
    name: &str,
    default: u32,
) -> Result<u32, ApiError> {
    match parse_int(query, name)? {
        None => Ok(default),
        Some(value) if value <= 0 => Err(ApiError::bad_request(format!(
            "{} must be greater than 0",
            name
        ))),
        Some(value) => u32::try_from(value)
            .map_err(|_| ApiError::bad_request(format!("{} must be a valid integer", name))),
    }
}

/// Integer parameter that must not be negative (`fromScore`, `limit`).
pub fn parse_non_negative(
    query: &HashMap<String, String>,
    name: &str,
    default: u64,
) -> Result<u64, ApiError> {
    match parse_int(query, name)? {
        None => Ok(default),
        Some(value) if value < 0 => Err(ApiError::bad_request(format!(
            "{} must not be negative",
            name
        ))),
        Some(value) => Ok(value as u64),
    }
}
