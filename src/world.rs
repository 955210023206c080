//! Dense world-space voxel grids.
//!
//! [`materialize`] places one oriented model into an axis-aligned
//! [`DenseWorld`]: the minimal cuboid enclosing the rotated model, centered
//! on the translation point with the extra unit of odd sizes biased toward
//! the positive axes. The centering matches the editor's placement
//! convention, so materialized voxel positions line up with reference files.

use glam::IVec3;

use crate::document::Model;
use crate::util::{Error, Result, Rotation};

/// An arbitrarily sized, axis-aligned voxel grid in world coordinates.
///
/// Cells hold a material index; 0 means empty. Storage is a flat array in
/// x, y, z order of significance over the inclusive `[min, max]` cuboid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DenseWorld {
    min: IVec3,
    max: IVec3,
    voxels: Vec<u8>,
}

impl DenseWorld {
    /// Create an empty world covering the inclusive cuboid `[min, max]`.
    pub fn new(min: IVec3, max: IVec3) -> Result<Self> {
        if max.cmplt(min).any() {
            return Err(Error::DegenerateCuboid { min, max });
        }
        let size = max - min + IVec3::ONE;
        let len = size.x as usize * size.y as usize * size.z as usize;
        Ok(Self {
            min,
            max,
            voxels: vec![0; len],
        })
    }

    /// The world's inclusive bounds.
    pub fn cuboid(&self) -> (IVec3, IVec3) {
        (self.min, self.max)
    }

    fn index(&self, c: IVec3) -> Option<usize> {
        let size = self.max - self.min + IVec3::ONE;
        let p = c - self.min;
        if p.cmplt(IVec3::ZERO).any() || p.cmpge(size).any() {
            return None;
        }
        Some((p.z as usize * size.y as usize + p.y as usize) * size.x as usize + p.x as usize)
    }

    /// The material index at `c`, or `None` outside the cuboid.
    pub fn get(&self, c: IVec3) -> Option<u8> {
        self.index(c).map(|i| self.voxels[i])
    }

    /// Set the material index at `c`, reporting whether `c` was inside the
    /// cuboid.
    pub fn set(&mut self, c: IVec3, material: u8) -> bool {
        match self.index(c) {
            Some(i) => {
                self.voxels[i] = material;
                true
            }
            None => false,
        }
    }

    /// Number of non-empty cells.
    pub fn occupied(&self) -> usize {
        self.voxels.iter().filter(|&&m| m != 0).count()
    }

    /// Reallocate for a new cuboid, copying voxels where the regions
    /// overlap. This walks every cell of the old world.
    pub fn resize(&mut self, min: IVec3, max: IVec3) -> Result<()> {
        if min == self.min && max == self.max {
            return Ok(());
        }
        let mut next = DenseWorld::new(min, max)?;
        let size = self.max - self.min + IVec3::ONE;
        for (i, &m) in self.voxels.iter().enumerate() {
            if m == 0 {
                continue;
            }
            let x = i % size.x as usize;
            let y = (i / size.x as usize) % size.y as usize;
            let z = i / (size.x as usize * size.y as usize);
            next.set(self.min + IVec3::new(x as i32, y as i32, z as i32), m);
        }
        *self = next;
        Ok(())
    }
}

/// Materialize `model` under `rotation` and `translation` into a dense grid.
///
/// The cuboid is the rotated bounding box centered on `translation`; every
/// voxel is rotated and shifted so the model's minimum rotated corner lands
/// on the cuboid's minimum corner. A voxel falling outside the cuboid means
/// the model lied about its size and is fatal.
pub fn materialize(rotation: Rotation, translation: IVec3, model: &Model) -> Result<DenseWorld> {
    // Rotated extents, minus one to make the bounds inclusive.
    let extent = rotation.apply(model.size).abs() - IVec3::ONE;
    let min = -(extent / 2) + translation;
    let max = extent + min;

    // The corner of the model that rotates onto the minimum world corner.
    let span = model.size - IVec3::ONE;
    let mut min_corner = IVec3::ZERO;
    for i in 0..2 {
        for j in 0..2 {
            for k in 0..2 {
                let corner =
                    rotation.apply(IVec3::new(i * span.x, j * span.y, k * span.z));
                if corner.cmple(min_corner).all() {
                    min_corner = corner;
                }
            }
        }
    }
    let shift = min - min_corner;

    let mut world = DenseWorld::new(min, max)?;
    for v in &model.voxels {
        let p = rotation.apply(IVec3::new(v.x as i32, v.y as i32, v.z as i32)) + shift;
        if !world.set(p, v.color_index) {
            return Err(Error::VoxelOutOfBounds(p));
        }
    }
    Ok(world)
}
