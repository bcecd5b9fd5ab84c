//! Quill Common
//!
//! Shared utilities for the Quill serializer stack:
//! - Component-based structured logging with a scope label

pub mod logging;

pub use logging::{Component, Logger};
