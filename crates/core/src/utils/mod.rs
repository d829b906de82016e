//! Small shared helpers

pub mod serde_helpers;
