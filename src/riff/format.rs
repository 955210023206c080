//! Container constants and chunk tags.

use std::fmt;

/// Magic bytes at the start of a .vox file.
pub const MAGIC: &[u8; 4] = b"VOX ";

/// The only supported format version.
pub const VERSION: i32 = 150;

/// Fixed size of the palette carried by an RGBA chunk.
pub const PALETTE_LEN: usize = 256;

/// A four-byte chunk tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    pub const MAIN: Tag = Tag(*b"MAIN");
    pub const PACK: Tag = Tag(*b"PACK");
    pub const SIZE: Tag = Tag(*b"SIZE");
    pub const XYZI: Tag = Tag(*b"XYZI");
    pub const RGBA: Tag = Tag(*b"RGBA");
    pub const MATL: Tag = Tag(*b"MATL");
    pub const NTRN: Tag = Tag(*b"nTRN");
    pub const NGRP: Tag = Tag(*b"nGRP");
    pub const NSHP: Tag = Tag(*b"nSHP");
    pub const LAYR: Tag = Tag(*b"LAYR");
    /// Renderer settings written by the editor; skipped without notice.
    pub const ROBJ: Tag = Tag(*b"rOBJ");
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Tags are nominally ASCII, but a corrupt file can put anything here.
        write!(f, "{}", self.0.escape_ascii())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({self})")
    }
}
