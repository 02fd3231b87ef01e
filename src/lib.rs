//! Asthma Scout - Conversational Pediatric Asthma Screening
//!
//! This crate implements a multi-turn screening dialogue that collects
//! structured symptom indicators from a guardian's chat answers and
//! evaluates them against the asthma predictive index.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
