//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and schedule calls into use-case level APIs.
//! - Keep UI layers decoupled from storage and projection details.

pub mod task_service;
