//! Minimal `Cookie` / `Set-Cookie` helpers.

use axum::http::{HeaderMap, HeaderValue, header::COOKIE};

/// Returns the value of cookie `name` from the request `Cookie` headers.
///
/// Handles several cookies per header and several `Cookie` headers.
pub fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookie_str| cookie_str.split(';'))
        .find_map(|cookie| {
            let mut parts = cookie.trim().splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(key), Some(value)) if key == name => Some(value.trim().to_string()),
                _ => None,
            }
        })
}

/// Attributes of a `Set-Cookie` header.
#[derive(Debug, Clone)]
pub struct SetCookie<'a> {
    pub name: &'a str,
    pub value: &'a str,
    pub max_age_secs: i64,
    pub secure: bool,
}

impl SetCookie<'_> {
    /// Renders the header value. Always `Path=/`, `HttpOnly`, `SameSite=Lax`.
    pub fn to_header_value(&self) -> Option<HeaderValue> {
        let mut cookie = format!(
            "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
            self.name, self.value, self.max_age_secs
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_cookie_among_many() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("a=1; qr_visited_Ab3xYz=1767268800; session_id=xyz"),
        );

        assert_eq!(
            find_cookie(&headers, "qr_visited_Ab3xYz").as_deref(),
            Some("1767268800")
        );
        assert_eq!(find_cookie(&headers, "session_id").as_deref(), Some("xyz"));
        assert!(find_cookie(&headers, "missing").is_none());
    }

    #[test]
    fn test_find_cookie_multiple_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1"));
        headers.append(COOKIE, HeaderValue::from_static("b=2"));

        assert_eq!(find_cookie(&headers, "b").as_deref(), Some("2"));
    }

    #[test]
    fn test_prefix_is_not_a_match() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("qr_visited_Ab3=1"));

        assert!(find_cookie(&headers, "qr_visited_Ab").is_none());
    }

    #[test]
    fn test_set_cookie_rendering() {
        let value = SetCookie {
            name: "qr_visited_Ab3xYz",
            value: "1767268800",
            max_age_secs: 3600,
            secure: false,
        }
        .to_header_value()
        .unwrap();

        assert_eq!(
            value,
            "qr_visited_Ab3xYz=1767268800; Max-Age=3600; Path=/; HttpOnly; SameSite=Lax"
        );
    }

    #[test]
    fn test_set_cookie_secure() {
        let value = SetCookie {
            name: "session_id",
            value: "",
            max_age_secs: 0,
            secure: true,
        }
        .to_header_value()
        .unwrap();

        assert!(value.to_str().unwrap().ends_with("; Secure"));
    }
}
