//! Domain layer: pure screening logic, no I/O.

pub mod foundation;
pub mod screening;
