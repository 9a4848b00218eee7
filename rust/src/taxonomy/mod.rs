//! Taxonomy Browser
//!
//! Read-only faceted search over the published intervention taxonomy.
//!
//! The catalog is plain data: loaded once (built-in YAML or a file named by
//! configuration) and handed to whoever needs it, typically the HTTP router
//! as `Arc<TaxonomyCatalog>`. Nothing mutates it after load.
//!
//! # Query model
//!
//! ```text
//! search text  ── case-insensitive substring over type / description /
//!                  considerations / tradeoffs
//! facets       ── focus, driver, userJourney, scope, platform
//!                  OR within a facet, AND across facets
//! ```
//!
//! Browser entries use their own vocabulary (`Virality/Behavior/Appearance`,
//! `User/Platform`). It is intentionally not mapped onto the contribution
//! enums in `intervention_types`.

mod catalog;
mod query;
mod references;

pub use catalog::{TaxonomyCatalog, TaxonomyEntry};
pub use query::{Facet, TaxonomyQuery};
pub use references::{citation_for, parse_references, Reference};
