//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and collaborator hand-offs. Services consume repository traits
//! and provide a clean API for HTTP handlers and the delivery pipeline.
//!
//! # Available Services
//!
//! - [`services::resolver::LinkResolver`] - routing configuration lookups
//! - [`services::producer::ClickProducer`] - fire-and-forget event dispatch
//! - [`services::consumer::ClickConsumer`] - queue drain, persistence, fan-out
//! - [`services::evaluation::EvaluationScheduler`] - cool-down gated health evaluation

pub mod services;
