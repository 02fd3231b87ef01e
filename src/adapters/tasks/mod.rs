//! Analysis queue adapters.

pub mod http;

pub use http::HttpAnalysisQueue;
