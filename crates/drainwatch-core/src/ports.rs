//! Port trait definitions
//!
//! These traits define the external collaborators the workflow calls into.

pub mod file_store;
pub mod notifier;

pub use file_store::{FileStore, Upload};
pub use notifier::Notifier;
