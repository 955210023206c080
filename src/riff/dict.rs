//! The string-keyed DICT payload embedded in several chunk kinds.
//!
//! Accessors never return an error directly. A value that fails to parse
//! latches a single error which the chunk decoder collects with
//! [`Dict::check`] once all expected keys have been read; keys nobody asked
//! for are reported by [`Dict::expect_no_unread`].

use std::collections::{HashMap, HashSet};

use glam::IVec3;

use crate::riff::cursor::ByteCursor;
use crate::util::{Error, Result, Rotation};

/// The one latched dict error, kept small so the dict itself stays cheap to
/// move around; it is turned into an [`Error`] only at the checkpoint.
enum DictError {
    /// The underlying cursor ran out of bytes while reading the dict.
    Truncated,
    /// A value was present but not parsable as the requested type.
    Value {
        kind: &'static str,
        key: String,
        value: String,
    },
}

/// A decoded DICT: string keys to string values, with per-key read tracking.
pub struct Dict {
    entries: HashMap<String, String>,
    read: HashSet<String>,
    err: Option<DictError>,
}

impl Dict {
    /// Read a DICT from the cursor: an i32 pair count, then key and value
    /// STRINGs. A truncated payload is latched into the dict rather than the
    /// caller having to check the cursor here.
    pub fn parse(cur: &mut ByteCursor<'_>) -> Dict {
        let mut entries = HashMap::new();
        let n = cur.read_i32();
        for _ in 0..n {
            if !cur.ok() {
                break;
            }
            let key = cur.read_string();
            let value = cur.read_string();
            entries.insert(key, value);
        }
        Dict {
            entries,
            read: HashSet::new(),
            err: if cur.ok() { None } else { Some(DictError::Truncated) },
        }
    }

    /// Raw lookup with read marking; returns `None` both for an absent key
    /// and after an error has been latched.
    fn fetch(&mut self, key: &str) -> Option<&str> {
        self.read.insert(key.to_string());
        if self.err.is_some() {
            return None;
        }
        self.entries.get(key).map(String::as_str)
    }

    /// String value for `key`, or `default` when absent.
    pub fn read_str(&mut self, key: &str, default: &str) -> String {
        self.fetch(key).unwrap_or(default).to_string()
    }

    /// Float value for `key`, or `default` when absent.
    pub fn read_f32(&mut self, key: &str, default: f32) -> f32 {
        let Some(raw) = self.fetch(key) else {
            return default;
        };
        match raw.parse::<f32>() {
            Ok(f) => f,
            Err(_) => {
                self.err = Some(DictError::Value {
                    kind: "float",
                    key: key.to_string(),
                    value: raw.to_string(),
                });
                default
            }
        }
    }

    /// Boolean value for `key`: stored as a number, anything non-zero is
    /// true.
    pub fn read_bool(&mut self, key: &str, default: bool) -> bool {
        self.read_f32(key, if default { 1.0 } else { 0.0 }) != 0.0
    }

    /// Integer 3-vector for `key`, stored as three comma-joined decimal
    /// integers.
    pub fn read_vec3(&mut self, key: &str, default: IVec3) -> IVec3 {
        let Some(raw) = self.fetch(key) else {
            return default;
        };
        let parts: Vec<_> = raw.split(',').map(|p| p.trim().parse::<i32>()).collect();
        match (parts.len(), parts.iter().all(|p| p.is_ok())) {
            (3, true) => {
                let mut it = parts.into_iter().flatten();
                // Length checked above.
                IVec3::new(
                    it.next().unwrap_or(0),
                    it.next().unwrap_or(0),
                    it.next().unwrap_or(0),
                )
            }
            _ => {
                self.err = Some(DictError::Value {
                    kind: "int32x3",
                    key: key.to_string(),
                    value: raw.to_string(),
                });
                default
            }
        }
    }

    /// Encoded rotation for `key`, stored as the code byte in decimal. An
    /// invalid code latches an error.
    pub fn read_rotation(&mut self, key: &str, default: Rotation) -> Rotation {
        let Some(raw) = self.fetch(key) else {
            return default;
        };
        match raw.parse::<u8>().ok().and_then(Rotation::from_code) {
            Some(r) => r,
            None => {
                self.err = Some(DictError::Value {
                    kind: "rotation",
                    key: key.to_string(),
                    value: raw.to_string(),
                });
                default
            }
        }
    }

    /// Collect the latched error, if any, tagged with the chunk name.
    pub fn check(&self, chunk: &str) -> Result<()> {
        match &self.err {
            None => Ok(()),
            Some(DictError::Truncated) => Err(Error::ChunkTruncated(chunk.to_string())),
            Some(DictError::Value { kind, key, value }) => Err(Error::DictValue {
                kind: *kind,
                key: key.clone(),
                value: value.clone(),
            }),
        }
    }

    /// Error if any key was never read: an attribute the decoder does not
    /// know about makes the whole dict malformed.
    pub fn expect_no_unread(&self, chunk: &str) -> Result<()> {
        let mut unread: Vec<_> = self
            .entries
            .keys()
            .filter(|k| !self.read.contains(*k))
            .map(String::as_str)
            .collect();
        if unread.is_empty() {
            return Ok(());
        }
        unread.sort_unstable();
        Err(Error::UnknownField {
            chunk: chunk.to_string(),
            keys: unread.join(", "),
        })
    }
}
