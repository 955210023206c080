//! Low-level `.vox` container format.
//!
//! MagicaVoxel files are a RIFF-style container of tagged chunks:
//!
//! ```text
//! +------------------+
//! | Magic: "VOX "    |  4 bytes
//! +------------------+
//! | Version          |  4 bytes (i32 LE, must be 150)
//! +------------------+
//! | MAIN chunk       |  wraps all other chunks as children
//! +------------------+
//!
//! Chunk = tag (4 bytes ASCII)
//!       + content length (i32 LE)
//!       + children length (i32 LE)
//!       + content bytes
//!       + children bytes
//! ```
//!
//! This module provides the cursor, the string-keyed DICT payload, and the
//! chunk grammar that decodes a whole file into a [`crate::Document`].

mod cursor;
mod dict;
mod format;
mod parser;

pub use cursor::ByteCursor;
pub use dict::Dict;
pub use format::*;
pub use parser::{parse, parse_file};
