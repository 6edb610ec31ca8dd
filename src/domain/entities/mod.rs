//! Core domain entities.
//!
//! - [`ShortLink`] - a token bound to a destination URL
//! - [`User`] - a dashboard account that owns links
//! - [`Session`] - a login session for a user
//!
//! Creation inputs use separate `New*` structs.

pub mod session;
pub mod short_link;
pub mod user;

pub use session::{NewSession, Session};
pub use short_link::{NewShortLink, OwnerSummary, ShortLink, ShortLinkPatch};
pub use user::{NewUser, OwnerContext, User};
