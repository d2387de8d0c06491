//! # Voxel Models
//!
//! A voxel's visual shape is data: an ordered list of box elements, each
//! with an optional texture per face. Full cubes, slabs and multi-box
//! shapes all go through the same extraction code.
//!
//! Element bounds are in 1/16 voxel units, so `[0, 0, 0]..[16, 16, 16]` is
//! the full cell.

use std::collections::HashMap;
use std::fmt;

use cubeworld_core::{Direction, VoxelCatalog, VoxelTypeId};

use crate::error::{MeshError, MeshResult};

/// Units per voxel edge in element coordinates.
pub const ELEMENT_UNITS: u8 = 16;

/// Interned texture name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureId(u32);

impl TextureId {
    /// Raw table index.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tex#{}", self.0)
    }
}

/// One axis-aligned box of a model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelElement {
    from: [u8; 3],
    to: [u8; 3],
    faces: [Option<TextureId>; 6],
}

impl ModelElement {
    /// Creates an element; `faces` is indexed by `Direction as usize` and
    /// `None` leaves that face undrawn.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::MalformedElement`] unless `from < to <= 16` on
    /// every axis.
    pub fn new(from: [u8; 3], to: [u8; 3], faces: [Option<TextureId>; 6]) -> MeshResult<Self> {
        let valid = (0..3).all(|axis| from[axis] < to[axis] && to[axis] <= ELEMENT_UNITS);
        if !valid {
            return Err(MeshError::MalformedElement { from, to });
        }
        Ok(Self { from, to, faces })
    }

    /// The whole cell with the given faces.
    #[must_use]
    pub const fn full(faces: [Option<TextureId>; 6]) -> Self {
        Self {
            from: [0; 3],
            to: [ELEMENT_UNITS; 3],
            faces,
        }
    }

    /// Minimum corner.
    #[inline]
    #[must_use]
    pub const fn from(&self) -> [u8; 3] {
        self.from
    }

    /// Maximum corner.
    #[inline]
    #[must_use]
    pub const fn to(&self) -> [u8; 3] {
        self.to
    }

    /// Texture of the face pointing in `direction`.
    #[inline]
    #[must_use]
    pub const fn face(&self, direction: Direction) -> Option<TextureId> {
        self.faces[direction.index()]
    }

    /// Bounds in voxel units (`0.0..=1.0`).
    #[must_use]
    pub fn bounds(&self) -> ([f32; 3], [f32; 3]) {
        let unit = f32::from(ELEMENT_UNITS);
        (
            self.from.map(|v| f32::from(v) / unit),
            self.to.map(|v| f32::from(v) / unit),
        )
    }
}

/// The visual shape of a voxel type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelModel {
    elements: Vec<ModelElement>,
}

impl VoxelModel {
    /// Full cube, same texture on every face.
    #[must_use]
    pub fn cube(texture: TextureId) -> Self {
        Self {
            elements: vec![ModelElement::full([Some(texture); 6])],
        }
    }

    /// Full cube with separate top, bottom and side textures.
    #[must_use]
    pub fn cube_with_faces(top: TextureId, bottom: TextureId, side: TextureId) -> Self {
        let mut faces = [Some(side); 6];
        faces[Direction::Up.index()] = Some(top);
        faces[Direction::Down.index()] = Some(bottom);
        Self {
            elements: vec![ModelElement::full(faces)],
        }
    }

    /// Lower half of the cell.
    #[must_use]
    pub fn slab(texture: TextureId) -> Self {
        Self {
            elements: vec![ModelElement {
                from: [0, 0, 0],
                to: [ELEMENT_UNITS, ELEMENT_UNITS / 2, ELEMENT_UNITS],
                faces: [Some(texture); 6],
            }],
        }
    }

    /// Any list of validated elements, drawn in order.
    #[must_use]
    pub fn from_elements(elements: Vec<ModelElement>) -> Self {
        Self { elements }
    }

    /// Elements in draw order.
    #[inline]
    #[must_use]
    pub fn elements(&self) -> &[ModelElement] {
        &self.elements
    }
}

/// Texture table plus the model of every voxel type.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    texture_names: Vec<String>,
    texture_ids: HashMap<String, TextureId>,
    /// Indexed by `VoxelTypeId::raw`.
    models: Vec<Option<VoxelModel>>,
}

impl ModelRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `name`, returning the existing id if already present.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::TextureTableFull`] past `u32::MAX` textures.
    pub fn texture(&mut self, name: &str) -> MeshResult<TextureId> {
        if let Some(&id) = self.texture_ids.get(name) {
            return Ok(id);
        }
        let raw = u32::try_from(self.texture_names.len())
            .map_err(|_| MeshError::TextureTableFull(name.to_owned()))?;
        let id = TextureId(raw);
        self.texture_names.push(name.to_owned());
        self.texture_ids.insert(name.to_owned(), id);
        Ok(id)
    }

    /// Name an id was interned from.
    #[must_use]
    pub fn texture_name(&self, id: TextureId) -> Option<&str> {
        self.texture_names.get(id.0 as usize).map(String::as_str)
    }

    /// Number of interned textures.
    #[must_use]
    pub fn texture_count(&self) -> usize {
        self.texture_names.len()
    }

    /// Sets the model of `voxel`, replacing any previous one.
    pub fn insert(&mut self, voxel: VoxelTypeId, model: VoxelModel) {
        let index = usize::from(voxel.raw());
        if self.models.len() <= index {
            self.models.resize(index + 1, None);
        }
        self.models[index] = Some(model);
    }

    /// Model of `voxel`, if registered.
    #[inline]
    #[must_use]
    pub fn model(&self, voxel: VoxelTypeId) -> Option<&VoxelModel> {
        self.models.get(usize::from(voxel.raw()))?.as_ref()
    }

    /// Number of voxel types with a model.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.iter().flatten().count()
    }

    /// True if no model is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A full cube for every solid catalog type, textured `<domain>_<name>`.
    /// Grass gets its own top, bottom and side textures.
    ///
    /// # Errors
    ///
    /// Only if the texture table overflows.
    pub fn standard(catalog: &VoxelCatalog) -> MeshResult<Self> {
        let mut registry = Self::new();
        for (id, voxel) in catalog.iter().filter(|(_, voxel)| voxel.is_solid()) {
            let base = format!("{}_{}", voxel.domain(), voxel.name());
            let model = if voxel.name() == "grass" {
                VoxelModel::cube_with_faces(
                    registry.texture(&format!("{base}_top"))?,
                    registry.texture(&format!("{base}_bottom"))?,
                    registry.texture(&format!("{base}_side"))?,
                )
            } else {
                VoxelModel::cube(registry.texture(&base)?)
            };
            registry.insert(id, model);
        }

        tracing::debug!(
            models = registry.len(),
            textures = registry.texture_count(),
            "standard model registry built"
        );
        Ok(registry)
    }
}
