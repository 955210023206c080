//! # magicavox
//!
//! Parser for MagicaVoxel `.vox` scene files.
//!
//! The `.vox` format and editor are developed by ephtracy; this is an
//! independent implementation of the published format notes, matching the
//! editor's behavior where the notes are silent.
//!
//! A file decodes into a [`Document`]: the voxel models, the 256-entry
//! palette, the material table and a validated scene graph of
//! transform/group/shape nodes. [`materialize`] then places one oriented
//! model into a dense world-space grid.
//!
//! ## Modules
//!
//! - [`util`] - Errors and the encoded rotation algebra
//! - [`riff`] - Low-level chunk container and grammar
//! - [`scene`] - Scene graph types and assembly
//! - [`world`] - Dense world-space voxel grids
//!
//! ## Example
//!
//! ```ignore
//! use magicavox::prelude::*;
//!
//! let doc = magicavox::parse_file("castle.vox")?;
//! println!("{} models, {} layers", doc.models.len(), doc.scene.layers.len());
//!
//! let tf = doc.scene.root.transform;
//! let world = magicavox::materialize(tf.rotation, tf.translation, &doc.models[0])?;
//! ```

pub mod document;
pub mod riff;
pub mod scene;
pub mod util;
pub mod world;

// Re-export commonly used types
pub use document::{Document, Material, MaterialKind, Model, Rgba, Voxel};
pub use riff::{parse, parse_file};
pub use scene::{GroupNode, Layer, Scene, SceneNode, ShapeNode, Transform, TransformNode};
pub use util::{Error, Result, Rotation};
pub use world::{materialize, DenseWorld};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::document::{Document, Material, MaterialKind, Model, Rgba, Voxel};
    pub use crate::scene::{
        GroupNode, Layer, Scene, SceneNode, ShapeNode, Transform, TransformNode,
    };
    pub use crate::util::{Error, Result, Rotation};
    pub use crate::world::{materialize, DenseWorld};
    pub use crate::{parse, parse_file};
}
