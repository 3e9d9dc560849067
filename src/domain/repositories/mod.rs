//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; implementations live in
//! `crate::infrastructure`. Each collaborator is injected where it is used,
//! never reached through ambient global state, so tests can substitute the
//! in-memory fakes or the generated `mockall` mocks.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - routing configuration lookups
//! - [`ClickRepository`] - idempotent click record persistence
//! - [`CounterSnapshotRepository`] - live counter baselines and snapshots

pub mod click_repository;
pub mod counter_repository;
pub mod link_repository;

pub use click_repository::ClickRepository;
pub use counter_repository::CounterSnapshotRepository;
pub use link_repository::LinkRepository;

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use counter_repository::MockCounterSnapshotRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
