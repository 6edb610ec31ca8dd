//! Helper functions shared across layers.
//!
//! - [`url_normalizer`] - destination URL validation
//! - [`cookies`] - cookie parsing and `Set-Cookie` rendering
//! - [`extract_domain`] - public base URL resolution

pub mod cookies;
pub mod extract_domain;
pub mod url_normalizer;
