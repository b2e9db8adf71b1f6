//! Classifier patching common types and errors.
//!
//! This crate provides the foundational types shared by the patching crates:
//! - Records, schemas and datasets (the unit of supervised learning)
//! - The `wrong`/`right` correctness domain used by the redefined problem
//! - The unified error type with stable codes and categories

pub mod dataset;
pub mod error;
pub mod record;

pub use dataset::{Dataset, Schema};
pub use error::{ErrorCategory, PatchError, Result};
pub use record::{Correctness, Label, Record, RegionId};
