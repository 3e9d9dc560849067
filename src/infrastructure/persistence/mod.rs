//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx prepared
//! statements.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - routing configuration lookups
//! - [`PgClickRepository`] - idempotent click record storage
//! - [`PgCounterRepository`] - live counter snapshots

pub mod pg_click_repository;
pub mod pg_counter_repository;
pub mod pg_link_repository;

pub use pg_click_repository::PgClickRepository;
pub use pg_counter_repository::PgCounterRepository;
pub use pg_link_repository::PgLinkRepository;
