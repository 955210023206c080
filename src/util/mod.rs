//! Basic types shared across the crate: errors and the encoded rotation
//! algebra.

pub mod error;
pub mod rotation;

pub use error::{Error, Result};
pub use rotation::Rotation;
