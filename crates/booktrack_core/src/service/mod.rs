//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate identity resolution, existence checks, lifecycle
//!   transitions and repository writes into command-level APIs.
//! - Keep the command surface decoupled from storage details.

pub mod book_service;
