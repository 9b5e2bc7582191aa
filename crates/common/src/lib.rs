//! Common utility functions shared across the StashDB storage engine.
//!
//! This crate provides the pure building blocks used when records are
//! written to and read back from disk: a comma-separated field codec, a
//! millisecond timestamp codec, and validators for client-supplied names
//! and paths.
//!
//! # Design Principles
//!
//! - **Pure functions only** - no side effects, no I/O
//! - **Total where possible** - CSV decoding and the validators never fail;
//!   only the timestamp codec and the validated newtypes return errors
//! - **Thread safe** - no shared state, every call owns its result

pub mod csv;
pub mod datetime;
pub mod error;
pub mod names;
pub mod path;

// Re-export commonly used functions at crate root for convenience
pub use csv::{merge_fields, merge_fields_with, merge_pair, split_fields};
pub use datetime::{format_timestamp, parse_timestamp, Timestamp};
pub use error::CommonError;
pub use names::{is_valid_db_name, DbName};
pub use path::{is_downward_path, is_valid_filename, Filename};
