//! Repository layer contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the storage collaborator used by the book service.
//! - Isolate SQLite query details from identity/lifecycle logic.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `Duplicate`) in
//!   addition to DB transport errors.

pub mod book_repo;
