//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate host reads/writes into review use-case APIs.
//! - Keep CLI and embedding layers decoupled from storage details.

pub mod review_service;
