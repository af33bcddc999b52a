//! Domain model for tracked books.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own the frozen mapping between domain enums and persisted values.
//!
//! # Invariants
//! - A `BookIdentity` is always normalized (cleaned ISBN or lower-cased
//!   title/author pair).
//! - `ReadingState` ordinals are fixed once at the storage boundary.

pub mod book;
pub mod genres;
