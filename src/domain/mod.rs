//! Domain layer: entities, repository interfaces and the visit marker.
//!
//! - [`entities`] - core data structures
//! - [`repositories`] - data access trait definitions
//! - [`visit_marker`] - the time-boxed client-held dedup flag
//!
//! The domain layer does not depend on infrastructure or presentation code.

pub mod entities;
pub mod repositories;
pub mod visit_marker;
