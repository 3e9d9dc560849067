//! Business logic services for the application layer.

pub mod consumer;
pub mod evaluation;
pub mod producer;
pub mod resolver;

pub use consumer::ClickConsumer;
pub use evaluation::EvaluationScheduler;
pub use producer::ClickProducer;
pub use resolver::LinkResolver;
