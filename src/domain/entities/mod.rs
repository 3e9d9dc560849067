//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without business logic.
//!
//! # Entity Types
//!
//! - [`RoutingInfo`] / [`RoutingRule`] - Geo-routing configuration for a link
//! - [`NewClick`] - A click record in its persisted form
//!
//! Links and accounts are owned by an external management collaborator; this
//! service only reads routing configuration and writes click records.

pub mod click;
pub mod link;

pub use click::NewClick;
pub use link::{RoutingInfo, RoutingRule};
