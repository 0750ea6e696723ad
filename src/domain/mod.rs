//! Core domain types and logic.

pub mod snapshot;
pub mod sleeve;
pub mod screen;
pub mod score;
pub mod selection;
pub mod portfolio;
pub mod universe;
pub mod rationale;
pub mod config_validation;
pub mod error;
