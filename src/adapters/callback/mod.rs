//! Callback delivery adapters.

pub mod http;

pub use http::HttpCallbackSender;
