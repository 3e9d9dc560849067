//! HTTP request handlers.
//!
//! Each handler module corresponds to one externally visible endpoint.

pub mod click_stream;
pub mod health;
pub mod redirect;

pub use click_stream::click_stream_handler;
pub use health::health_handler;
pub use redirect::redirect_handler;
