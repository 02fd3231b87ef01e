//! Adapters: concrete implementations of the ports.

pub mod archive;
pub mod callback;
pub mod http;
pub mod llm;
pub mod store;
pub mod tasks;
