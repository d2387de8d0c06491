//! # Voxel Type Catalog
//!
//! Immutable registry of voxel kinds, built once at startup and passed by
//! reference (usually behind an `Arc`) into generation and meshing.
//!
//! ## Handles
//!
//! Hot paths never copy a [`VoxelType`]. They carry a [`VoxelTypeId`], a
//! 16-bit index into the catalog. Handle 0 is always air: the builder
//! registers it before anything else, so [`VoxelTypeId::AIR`] is a valid
//! sentinel for every catalog.

use std::collections::HashMap;
use std::fmt;

use crate::error::{CoreError, CoreResult};

/// Domain used by the built-in voxel types.
pub const DEFAULT_DOMAIN: &str = "cube_game";

/// Maximum number of types a catalog can address.
pub const MAX_VOXEL_TYPES: usize = u16::MAX as usize;

/// Handle to a voxel type inside a [`VoxelCatalog`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VoxelTypeId(u16);

impl VoxelTypeId {
    /// The air sentinel (always index 0).
    pub const AIR: Self = Self(0);

    /// Creates a handle from a raw index.
    #[inline]
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw index.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Returns true for the air sentinel.
    #[inline]
    #[must_use]
    pub const fn is_air(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for VoxelTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Behaviour flags of a voxel type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct VoxelFlags(u8);

impl VoxelFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Empty space.
    pub const AIR: Self = Self(1 << 0);
    /// Occupies its cell (collides, gets faces).
    pub const SOLID: Self = Self(1 << 1);
    /// Neighbouring faces stay visible through it.
    pub const TRANSPARENT: Self = Self(1 << 2);
    /// Can be destroyed by the player.
    pub const BREAKABLE: Self = Self(1 << 3);

    /// Flags for an ordinary opaque block.
    pub const BLOCK: Self = Self(Self::SOLID.0 | Self::BREAKABLE.0);

    /// Returns true if every flag in `other` is set.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of both flag sets.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl std::ops::BitOr for VoxelFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// A kind of voxel.
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelType {
    domain: String,
    name: String,
    flags: VoxelFlags,
    hardness: f32,
}

impl VoxelType {
    /// Creates an ordinary solid, opaque, breakable type.
    #[must_use]
    pub fn new(domain: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
            flags: VoxelFlags::BLOCK,
            hardness: 1.0,
        }
    }

    /// Creates the air type.
    #[must_use]
    pub fn air() -> Self {
        Self::new(DEFAULT_DOMAIN, "air")
            .with_flags(VoxelFlags::AIR | VoxelFlags::TRANSPARENT)
            .with_hardness(0.0)
    }

    /// Replaces the flag set.
    #[must_use]
    pub fn with_flags(mut self, flags: VoxelFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the hardness.
    #[must_use]
    pub fn with_hardness(mut self, hardness: f32) -> Self {
        self.hardness = hardness;
        self
    }

    /// Namespace of this type.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Name within the namespace.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registry key, `domain:name`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}:{}", self.domain, self.name)
    }

    /// Flag set.
    #[inline]
    #[must_use]
    pub const fn flags(&self) -> VoxelFlags {
        self.flags
    }

    /// How long the type takes to break.
    #[inline]
    #[must_use]
    pub const fn hardness(&self) -> f32 {
        self.hardness
    }

    /// Empty space.
    #[inline]
    #[must_use]
    pub const fn is_air(&self) -> bool {
        self.flags.contains(VoxelFlags::AIR)
    }

    /// Occupies its cell.
    #[inline]
    #[must_use]
    pub const fn is_solid(&self) -> bool {
        self.flags.contains(VoxelFlags::SOLID)
    }

    /// Faces behind it remain visible.
    #[inline]
    #[must_use]
    pub const fn is_transparent(&self) -> bool {
        self.flags.contains(VoxelFlags::TRANSPARENT)
    }

    /// Can be destroyed.
    #[inline]
    #[must_use]
    pub const fn is_breakable(&self) -> bool {
        self.flags.contains(VoxelFlags::BREAKABLE)
    }

    /// Solid and not transparent: hides whatever face touches it.
    #[inline]
    #[must_use]
    pub const fn is_opaque(&self) -> bool {
        self.is_solid() && !self.is_transparent() && !self.is_air()
    }
}

/// Collects voxel types before freezing them into a [`VoxelCatalog`].
#[derive(Debug)]
pub struct CatalogBuilder {
    types: Vec<VoxelType>,
    by_key: HashMap<String, VoxelTypeId>,
}

impl CatalogBuilder {
    /// Creates a builder with air pre-registered at [`VoxelTypeId::AIR`].
    #[must_use]
    pub fn new() -> Self {
        let air = VoxelType::air();
        let mut by_key = HashMap::new();
        by_key.insert(air.key(), VoxelTypeId::AIR);
        Self {
            types: vec![air],
            by_key,
        }
    }

    /// Registers a type and returns its handle.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DuplicateVoxelType`] if the key is taken, or
    /// [`CoreError::CatalogFull`] once the handle space is exhausted.
    pub fn register(&mut self, voxel: VoxelType) -> CoreResult<VoxelTypeId> {
        let key = voxel.key();
        if self.by_key.contains_key(&key) {
            return Err(CoreError::DuplicateVoxelType(key));
        }
        if self.types.len() >= MAX_VOXEL_TYPES {
            return Err(CoreError::CatalogFull {
                capacity: MAX_VOXEL_TYPES,
            });
        }

        let id = VoxelTypeId::new(self.types.len() as u16);
        self.by_key.insert(key, id);
        self.types.push(voxel);
        Ok(id)
    }

    /// Freezes the builder.
    #[must_use]
    pub fn build(self) -> VoxelCatalog {
        tracing::info!(types = self.types.len(), "voxel catalog built");
        VoxelCatalog {
            types: self.types,
            by_key: self.by_key,
        }
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable registry of voxel types.
#[derive(Debug)]
pub struct VoxelCatalog {
    types: Vec<VoxelType>,
    by_key: HashMap<String, VoxelTypeId>,
}

impl VoxelCatalog {
    /// Starts a new catalog.
    #[must_use]
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// The built-in block set.
    #[must_use]
    pub fn standard() -> Self {
        let solid = |name: &str, hardness: f32| {
            VoxelType::new(DEFAULT_DOMAIN, name).with_hardness(hardness)
        };

        let types = [
            solid("dirt", 1.0),
            solid("stone", 5.0),
            solid("brick", 2.0),
            solid("grass", 1.2),
            solid("cobblestone", 1.8),
            solid("metal", 2.4),
            solid("glass", 1.8).with_flags(VoxelFlags::BLOCK | VoxelFlags::TRANSPARENT),
        ];

        let mut builder = CatalogBuilder::new();
        for voxel in types {
            // Keys above are distinct and far below the handle limit.
            if let Err(err) = builder.register(voxel) {
                tracing::warn!(%err, "skipping built-in voxel type");
            }
        }
        builder.build()
    }

    /// Looks up a type by handle.
    #[inline]
    #[must_use]
    pub fn get(&self, id: VoxelTypeId) -> Option<&VoxelType> {
        self.types.get(usize::from(id.raw()))
    }

    /// Looks up a type by handle, failing on foreign handles.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidVoxelType`] if `id` is not in this catalog.
    pub fn resolve(&self, id: VoxelTypeId) -> CoreResult<&VoxelType> {
        self.get(id).ok_or(CoreError::InvalidVoxelType(id))
    }

    /// Looks up a handle by `domain:name` key.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<VoxelTypeId> {
        self.by_key.get(key).copied()
    }

    /// Looks up a handle by domain and name.
    #[must_use]
    pub fn id_of(&self, domain: &str, name: &str) -> Option<VoxelTypeId> {
        self.lookup(&format!("{domain}:{name}"))
    }

    /// Looks up a handle by key, failing if it is not registered.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownVoxelType`] if no type has this key.
    pub fn require(&self, key: &str) -> CoreResult<VoxelTypeId> {
        self.lookup(key)
            .ok_or_else(|| CoreError::UnknownVoxelType(key.to_owned()))
    }

    /// Number of registered types, air included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Always false: air is registered in every catalog.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterates over `(handle, type)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (VoxelTypeId, &VoxelType)> + '_ {
        self.types
            .iter()
            .enumerate()
            .map(|(index, voxel)| (VoxelTypeId::new(index as u16), voxel))
    }

    /// True if `id` hides faces that touch it.
    #[inline]
    #[must_use]
    pub fn is_opaque(&self, id: VoxelTypeId) -> bool {
        self.get(id).is_some_and(VoxelType::is_opaque)
    }

    /// True if `id` gets faces of its own.
    #[inline]
    #[must_use]
    pub fn is_solid(&self, id: VoxelTypeId) -> bool {
        self.get(id).is_some_and(VoxelType::is_solid)
    }

    /// True if a face next to `id` must be drawn (air or transparent).
    ///
    /// Unknown handles count as see-through so nothing is hidden wrongly.
    #[inline]
    #[must_use]
    pub fn is_visible_through(&self, id: VoxelTypeId) -> bool {
        self.get(id)
            .map_or(true, |voxel| voxel.is_air() || voxel.is_transparent())
    }
}

impl Default for VoxelCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_air_is_always_first() {
        let catalog = VoxelCatalog::builder().build();
        let air = catalog.get(VoxelTypeId::AIR).unwrap();

        assert!(air.is_air(), "Handle 0 must be air");
        assert!(!air.is_solid());
        assert!(air.is_transparent());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_standard_catalog_flags() {
        let catalog = VoxelCatalog::standard();

        let stone = catalog.id_of(DEFAULT_DOMAIN, "stone").unwrap();
        let glass = catalog.id_of(DEFAULT_DOMAIN, "glass").unwrap();

        assert!(catalog.is_opaque(stone));
        assert!(catalog.is_solid(glass), "Glass is solid");
        assert!(!catalog.is_opaque(glass), "Glass is not opaque");
        assert!(catalog.is_visible_through(glass));
        assert!(catalog.is_visible_through(VoxelTypeId::AIR));
        assert!(!catalog.is_visible_through(stone));

        let stone_type = catalog.get(stone).unwrap();
        assert!((stone_type.hardness() - 5.0).abs() < f32::EPSILON);
        assert_eq!(stone_type.key(), "cube_game:stone");
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut builder = VoxelCatalog::builder();
        builder.register(VoxelType::new("mod", "ore")).unwrap();

        let err = builder.register(VoxelType::new("mod", "ore")).unwrap_err();
        assert_eq!(err, CoreError::DuplicateVoxelType("mod:ore".into()));
    }

    #[test]
    fn test_same_name_different_domain() {
        let mut builder = VoxelCatalog::builder();
        let a = builder.register(VoxelType::new("a", "ore")).unwrap();
        let b = builder.register(VoxelType::new("b", "ore")).unwrap();
        assert_ne!(a, b, "Identity is domain + name");
    }

    #[test]
    fn test_unknown_handles() {
        let catalog = VoxelCatalog::standard();
        let bogus = VoxelTypeId::new(999);

        assert!(catalog.get(bogus).is_none());
        assert_eq!(
            catalog.resolve(bogus).unwrap_err(),
            CoreError::InvalidVoxelType(bogus)
        );
        assert!(catalog.require("cube_game:lava").is_err());
        assert!(!catalog.is_opaque(bogus));
    }
}
