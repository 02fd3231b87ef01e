//! Archive sink adapters.

pub mod jsonl;

pub use jsonl::JsonlArchiveSink;
