//! Error types for the magicavox library.

use std::path::PathBuf;

use glam::IVec3;
use thiserror::Error;

/// Main error type for parsing and materialization.
///
/// Every error is fatal to the call that produced it; there is no
/// partial-result recovery.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Invalid magic bytes at start of file
    #[error("Not a MagicaVoxel file: expected \"VOX \" magic bytes")]
    InvalidMagic,

    /// Unsupported file format version
    #[error("Unsupported .vox version: expected 150, got {0}")]
    UnsupportedVersion(i32),

    /// A chunk declared more content than the input holds
    #[error("Unexpected end of input while reading {0}")]
    ChunkTruncated(String),

    /// A chunk decoder consumed less than the declared content length
    #[error("Trailing bytes after {0} content")]
    TrailingBytes(String),

    /// The top-level MAIN chunk is absent
    #[error("Missing MAIN chunk")]
    MissingMain,

    /// MAIN must carry all payload in its child section
    #[error("Unexpected MAIN chunk contents")]
    MainNotEmpty,

    /// A chunk appeared outside its legal position in the ordering
    #[error("Misplaced {0} chunk")]
    MisplacedChunk(String),

    /// Only MAIN may carry child chunks
    #[error("Unexpected child chunks of chunk {0:?}")]
    UnexpectedChildChunks(String),

    /// Model count disagrees with the declared PACK count
    #[error("Expected {expected} models, but got {found}")]
    ModelCountMismatch { expected: i32, found: i32 },

    /// A reserved field did not hold its fixed sentinel
    #[error("Reserved field in {chunk} chunk must be -1, got {value}")]
    ReservedField { chunk: &'static str, value: i32 },

    /// Multi-frame animation is unsupported
    #[error("Transform must have exactly one frame, got {0}")]
    UnsupportedFrameCount(i32),

    /// A dict value was present but not parsable as the expected type
    #[error("Cannot parse {kind} {value:?} in field {key:?}")]
    DictValue {
        kind: &'static str,
        key: String,
        value: String,
    },

    /// A dict key that no decoder consumed
    #[error("Unknown field[s] in {chunk} dict: {keys}")]
    UnknownField { chunk: String, keys: String },

    /// Two scene-graph chunks share one node id
    #[error("Node {0} appears twice")]
    DuplicateNodeId(i32),

    /// Two LAYR chunks share one layer id
    #[error("Two LAYR chunks have id {0}")]
    DuplicateLayerId(i32),

    /// A child reference names a node that was never parsed
    #[error("Node {parent} has child {child}, but no such node exists")]
    MissingNode { parent: i32, child: i32 },

    /// A shape references a model index that was never parsed
    #[error("Shape node refers to missing model id {0}")]
    MissingModel(i32),

    /// A transform references a layer id that was never parsed
    #[error("Node {node} refers to missing layer {layer}")]
    MissingLayer { node: i32, layer: i32 },

    /// More than one transform node sits on layer -1
    #[error("Scene has two root nodes")]
    TwoRoots,

    /// No transform node sits on layer -1
    #[error("Failed to find root node in the scene graph")]
    NoRoot,

    /// Transform nodes hold exactly one child
    #[error("Cannot attach a second child to transform node {0}")]
    TransformArity(i32),

    /// Shape nodes are leaves
    #[error("Cannot attach children to shape node {0}")]
    ShapeArity(i32),

    /// A node is reachable along two paths from the root
    #[error("Cycle in the scene graph at node {0}")]
    SceneCycle(i32),

    /// Some parsed nodes are not reachable from the root
    #[error("Scene graph has {total} nodes, but only {reachable} reachable from the root")]
    DisconnectedNodes { total: usize, reachable: usize },

    /// Material ids address palette slots 0..=255
    #[error("Material index {0} out of range")]
    MaterialIdOutOfRange(i32),

    /// Material `_type` label outside the recognized set
    #[error("Unknown material type {0:?}")]
    UnknownMaterialType(String),

    /// The palette must hold exactly 256 entries
    #[error("Expected 256 palette entries, but found {0}")]
    PaletteSize(usize),

    /// A cuboid with max < min on some axis
    #[error("The upper bound {max} of the cuboid must be at least as large as the lower bound {min}")]
    DegenerateCuboid { min: IVec3, max: IVec3 },

    /// A rotated voxel landed outside the computed world cuboid
    #[error("Voxel at {0} falls outside the world cuboid")]
    VoxelOutOfBounds(IVec3),

    /// Memory mapping failed
    #[error("Memory mapping failed: {0}")]
    MmapFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for magicavox operations.
pub type Result<T> = std::result::Result<T, Error>;
