//! Key template files.
//!
//! A key file is a plain-text signature of one decoded remote control
//! button: a few `#` metadata lines followed by one `<level> <duration>`
//! line per edge.
//!
//! ```text
//! #@2024-03-01T18:22:05
//! #!desc=TV power
//! #!delta=3.2%
//! 1 560
//! 0 1690
//! ...
//! ```
//!
//! This crate provides:
//! - `KeyTemplate`: the canonical template produced by the extractor, and its rendering
//! - Two-pass parsing of key files into `KeyFile`
//! - Directory loading into an immutable `KeySet`, skipping unparseable files

mod error;
mod loader;
mod parser;
mod template;

pub use error::{KeyError, KeyResult};
pub use loader::{load_dir, load_file, new_key_file_name, save_template, KeySet, LoadResult};
pub use parser::{parse_key_content, KeyFile, KeySummary};
pub use template::KeyTemplate;

/// File extension of key files.
pub const KEY_FILE_EXTENSION: &str = "key";
