//! Run profiles
//!
//! A run profile is a JSON file holding default settings for a conversion
//! run, so an album's options can be kept next to its files instead of
//! being retyped on every invocation. Command-line flags take precedence
//! over profile values.

mod storage;
mod types;

pub use storage::{load_profile, save_profile};
pub use types::RunProfile;
