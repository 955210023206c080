//! The decoded contents of a .vox file: models, palette, materials and the
//! scene graph.

use glam::IVec3;

use crate::scene::Scene;
use crate::util::{Error, Result};

/// An RGBA palette color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// A single voxel in a model, in local model coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Voxel {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    /// Palette/material index; 0 means empty.
    pub color_index: u8,
}

/// One model: its bounding size and its voxel list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Model {
    pub size: IVec3,
    pub voxels: Vec<Voxel>,
}

/// The nature of a material.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MaterialKind {
    #[default]
    Diffuse,
    Metal,
    Glass,
    Emissive,
}

impl MaterialKind {
    /// Map the `_type` label used in MATL dicts.
    pub fn from_label(label: &str) -> Result<Self> {
        match label {
            "_diffuse" => Ok(Self::Diffuse),
            "_metal" => Ok(Self::Metal),
            "_glass" => Ok(Self::Glass),
            "_emit" => Ok(Self::Emissive),
            _ => Err(Error::UnknownMaterialType(label.to_string())),
        }
    }
}

/// A material. Index 0 is reserved; materials are addressed 1..=255 and take
/// their color from palette entry index-1.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Material {
    pub kind: MaterialKind,
    pub color: Rgba,
    /// Blend between this material type and pure diffuse, scaled to 0..=100.
    pub weight: f32,
    pub roughness: f32,
    pub specular: f32,
    pub ior: f32,
    pub attenuation: f32,
    pub flux: f32,
    pub plastic: bool,
    pub ldr: f32,
}

/// A fully parsed .vox file.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub models: Vec<Model>,
    /// The raw 256-entry palette.
    pub palette: Vec<Rgba>,
    /// 256 materials; entry 0 is unused.
    pub materials: Vec<Material>,
    pub scene: Scene,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_kind_labels() {
        assert_eq!(MaterialKind::from_label("_diffuse").unwrap(), MaterialKind::Diffuse);
        assert_eq!(MaterialKind::from_label("_metal").unwrap(), MaterialKind::Metal);
        assert_eq!(MaterialKind::from_label("_glass").unwrap(), MaterialKind::Glass);
        assert_eq!(MaterialKind::from_label("_emit").unwrap(), MaterialKind::Emissive);
        assert!(matches!(
            MaterialKind::from_label("<missing>"),
            Err(Error::UnknownMaterialType(s)) if s == "<missing>"
        ));
    }

    #[test]
    fn test_material_default_is_zeroed() {
        let m = Material::default();
        assert_eq!(m.kind, MaterialKind::Diffuse);
        assert_eq!(m.weight, 0.0);
        assert!(!m.plastic);
    }
}
