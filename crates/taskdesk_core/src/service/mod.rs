//! Core use-case services.
//!
//! # Responsibility
//! - Turn user actions into repository calls.
//! - Keep the view decoupled from storage details.

pub mod task_controller;
