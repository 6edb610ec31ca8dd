//! Destination URL validation.
//!
//! Destinations are validated at create/update time. The validated string is
//! stored as given (after trimming and scheme defaulting) rather than
//! re-serialized, so a link created with `https://example.com/page`
//! redirects to exactly that string.

use url::Url;

/// Longest destination accepted.
pub const MAX_DESTINATION_LEN: usize = 2048;

/// Errors that can occur during destination validation.
#[derive(Debug, thiserror::Error)]
pub enum DestinationError {
    #[error("URL must not be empty")]
    Empty,

    #[error("URL is longer than {MAX_DESTINATION_LEN} characters")]
    TooLong,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,
}

/// Prefixes `https://` when the input carries no http(s) scheme.
pub fn ensure_protocol(input: &str) -> String {
    let lower = input.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        input.to_string()
    } else if input.contains("://") {
        // Explicit foreign scheme, left for the protocol check to reject.
        input.to_string()
    } else {
        format!("https://{input}")
    }
}

/// Validates a destination URL and returns the string to store.
///
/// # Rules
///
/// 1. Surrounding whitespace is trimmed
/// 2. A missing scheme defaults to `https://`
/// 3. Must parse as an absolute URL
/// 4. Only `http` and `https` are accepted
/// 5. A host is required
///
/// Rejects `javascript:`, `data:`, `file:` and other non-web schemes.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(validate_destination("example.com/a").unwrap(), "https://example.com/a");
/// assert!(validate_destination("javascript:alert(1)").is_err());
/// ```
pub fn validate_destination(input: &str) -> Result<String, DestinationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DestinationError::Empty);
    }
    if trimmed.len() > MAX_DESTINATION_LEN {
        return Err(DestinationError::TooLong);
    }

    let candidate = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        ensure_protocol(trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| DestinationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(DestinationError::UnsupportedProtocol),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(DestinationError::MissingHost),
    }

    Ok(candidate)
}

/// True when the input starts with an RFC 3986 scheme followed by `:`.
///
/// `localhost:8080` is treated as host:port, not as a scheme.
fn has_scheme(input: &str) -> bool {
    let Some(colon) = input.find(':') else {
        return false;
    };
    let scheme = &input[..colon];
    let rest = &input[colon + 1..];

    let looks_like_scheme = scheme
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));

    let looks_like_port = rest
        .split(['/', '?', '#'])
        .next()
        .is_some_and(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));

    looks_like_scheme && !looks_like_port
}
