//! Common types, traits, and error definitions for predictive_control
//!
//! This module provides the foundational building blocks shared by the
//! plant model, the optimizer and the closed-loop orchestrator.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
