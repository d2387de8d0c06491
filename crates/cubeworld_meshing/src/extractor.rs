//! # Face Extractor
//!
//! Turns a chunk into material-grouped quads.
//!
//! ## Visibility Rule
//!
//! A solid voxel shows its face in a direction iff the voxel on that side
//! is air or transparent. Glass next to stone leaves the stone face visible.
//!
//! ## Whole-Voxel Shortcut
//!
//! When all six neighbours are opaque no face can pass the rule, so the
//! voxel is skipped before any model work. The check reads the same six
//! neighbours the per-face rule reads, so it cannot change the output.
//!
//! The same holds a level up: a fully opaque chunk whose six face
//! neighbours are loaded and fully opaque has no visible face at all, so
//! every voxel is counted as culled without reading any of them.

use std::sync::Arc;
use std::time::Instant;

use cubeworld_core::{Chunk, Direction, VoxelCatalog, VoxelTypeId, CHUNK_SIZE_I32};

use crate::error::{MeshError, MeshResult};
use crate::mesh::{ChunkMesh, MaterialKey};
use crate::model::ModelRegistry;
use crate::neighbor::NeighborLookup;
use crate::quad::Quad;

/// Stateless extractor; share it freely between threads.
#[derive(Clone, Debug)]
pub struct FaceExtractor {
    catalog: Arc<VoxelCatalog>,
    models: Arc<ModelRegistry>,
}

impl FaceExtractor {
    /// Creates an extractor over a catalog and its models.
    #[must_use]
    pub fn new(catalog: Arc<VoxelCatalog>, models: Arc<ModelRegistry>) -> Self {
        Self { catalog, models }
    }

    /// The voxel catalog.
    #[must_use]
    pub fn catalog(&self) -> &VoxelCatalog {
        &self.catalog
    }

    /// The model registry.
    #[must_use]
    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    /// Extracts the visible faces of `chunk`. Voxels outside the chunk are
    /// read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::UnknownVoxelType`] for a handle the catalog does
    /// not know and [`MeshError::MissingModel`] for a solid voxel type with
    /// no model.
    pub fn extract(&self, chunk: &Chunk, lookup: &impl NeighborLookup) -> MeshResult<ChunkMesh> {
        self.extract_with(chunk, lookup, true)
    }

    pub(crate) fn extract_with(
        &self,
        chunk: &Chunk,
        lookup: &impl NeighborLookup,
        shortcut: bool,
    ) -> MeshResult<ChunkMesh> {
        let start = Instant::now();
        let mut mesh = ChunkMesh::empty(chunk.coord());
        if chunk.is_empty() {
            return Ok(mesh);
        }
        if shortcut && self.is_enclosed(chunk, lookup) {
            mesh.note_culled_voxels(chunk.non_air_count());
            tracing::trace!(coord = %chunk.coord(), "enclosed chunk skipped");
            return Ok(mesh);
        }

        let origin = chunk.coord().origin();
        for (local, id) in chunk.iter_voxels() {
            if id.is_air() {
                continue;
            }
            let voxel = self
                .catalog
                .get(id)
                .ok_or(MeshError::UnknownVoxelType(id))?;
            if !voxel.is_solid() {
                continue;
            }

            let local = local.map(|v| v as i32);
            let neighbors = Direction::ALL.map(|dir| neighbor(chunk, origin, local, dir, lookup));

            if shortcut && neighbors.iter().all(|&n| self.catalog.is_opaque(n)) {
                mesh.note_culled_voxels(1);
                continue;
            }

            let model = self.models.model(id).ok_or(MeshError::MissingModel(id))?;
            let base = [
                (origin[0] + local[0]) as f32,
                (origin[1] + local[1]) as f32,
                (origin[2] + local[2]) as f32,
            ];
            for dir in Direction::ALL {
                if !self.catalog.is_visible_through(neighbors[dir.index()]) {
                    continue;
                }
                for element in model.elements() {
                    if let Some(texture) = element.face(dir) {
                        let key = MaterialKey { voxel: id, texture };
                        mesh.push(key, Quad::build(dir, base, element));
                    }
                }
            }
        }

        tracing::trace!(
            coord = %chunk.coord(),
            faces = mesh.face_count(),
            batches = mesh.batch_count(),
            culled = mesh.culled_voxels(),
            micros = start.elapsed().as_micros() as u64,
            "chunk faces extracted"
        );
        Ok(mesh)
    }

    /// True if `chunk` and the six loaded chunks around it are all fully
    /// opaque. Unknown handles never count as opaque, so they still reach
    /// the per-voxel error path.
    fn is_enclosed(&self, chunk: &Chunk, lookup: &impl NeighborLookup) -> bool {
        chunk.is_fully_opaque(&self.catalog)
            && Direction::ALL.iter().all(|&dir| {
                lookup
                    .face_neighbor(dir)
                    .is_some_and(|neighbor| neighbor.is_fully_opaque(&self.catalog))
            })
    }
}

/// Voxel next to `local` in `dir`, reading the chunk directly when the
/// neighbour is inside it.
#[inline]
fn neighbor(
    chunk: &Chunk,
    origin: [i32; 3],
    local: [i32; 3],
    dir: Direction,
    lookup: &impl NeighborLookup,
) -> VoxelTypeId {
    let offset = dir.offset();
    let n = [
        local[0] + offset[0],
        local[1] + offset[1],
        local[2] + offset[2],
    ];
    if n.iter().all(|v| (0..CHUNK_SIZE_I32).contains(v)) {
        chunk.get_voxel(n[0], n[1], n[2])
    } else {
        lookup.voxel_at([origin[0] + n[0], origin[1] + n[1], origin[2] + n[2]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::model::VoxelModel;
    use crate::neighbor::ChunkNeighborhood;
    use cubeworld_core::{ChunkCoord, CHUNK_SIZE};

    fn extractor() -> FaceExtractor {
        let catalog = Arc::new(VoxelCatalog::standard());
        let models = Arc::new(ModelRegistry::standard(&catalog).unwrap());
        FaceExtractor::new(catalog, models)
    }

    fn id(extractor: &FaceExtractor, name: &str) -> VoxelTypeId {
        extractor.catalog().require(&format!("cube_game:{name}")).unwrap()
    }

    fn air(_: [i32; 3]) -> VoxelTypeId {
        VoxelTypeId::AIR
    }

    #[test]
    fn test_isolated_solid_chunk_emits_boundary_faces() {
        let ex = extractor();
        let chunk = Chunk::filled(ChunkCoord::new(0, 0, 0), id(&ex, "stone"));
        let mesh = ex.extract(&chunk, &air).unwrap();

        assert_eq!(mesh.face_count(), 6 * CHUNK_SIZE * CHUNK_SIZE);
        assert_eq!(mesh.batch_count(), 1, "One material, one batch");
        assert_eq!(mesh.culled_voxels(), 14 * 14 * 14, "Interior voxels take the shortcut");
    }

    #[test]
    fn test_enclosed_solid_chunk_emits_nothing() {
        let ex = extractor();
        let stone = id(&ex, "stone");
        let chunk = Chunk::filled(ChunkCoord::new(0, 0, 0), stone);
        let mesh = ex.extract(&chunk, &|_| stone).unwrap();
        assert!(mesh.is_empty());
        assert_eq!(mesh.batch_count(), 0);
    }

    #[test]
    fn test_air_chunk_emits_nothing() {
        let ex = extractor();
        let chunk = Chunk::new(ChunkCoord::new(3, -1, 2));
        assert!(chunk.is_empty());
        assert!(ex.extract(&chunk, &air).unwrap().is_empty());
    }

    #[test]
    fn test_face_behind_glass_is_visible() {
        let ex = extractor();
        let stone = id(&ex, "stone");
        let glass = id(&ex, "glass");

        let mut chunk = Chunk::new(ChunkCoord::new(0, 0, 0));
        // Stone at (5,5,5) wrapped in stone except for glass on top.
        for dir in Direction::ALL {
            let [dx, dy, dz] = dir.offset();
            let wall = if dir == Direction::Up { glass } else { stone };
            chunk.set_voxel(5 + dx, 5 + dy, 5 + dz, wall).unwrap();
        }
        chunk.set_voxel(5, 5, 5, stone).unwrap();

        let mesh = ex.extract(&chunk, &air).unwrap();
        let stone_top = mesh
            .batches()
            .filter(|(key, _)| key.voxel == stone)
            .flat_map(|(_, quads)| quads.iter())
            .filter(|q| q.direction == Direction::Up)
            .any(|q| {
                q.corners.iter().all(|c| {
                    (5.0..=6.0).contains(&c[0])
                        && (5.0..=6.0).contains(&c[2])
                        && (c[1] - 6.0).abs() < f32::EPSILON
                })
            });
        assert!(stone_top, "Stone face under glass must be emitted");
    }

    /// Answers through a neighbourhood and counts single-voxel reads.
    struct CountingLookup<'a> {
        hood: ChunkNeighborhood<'a>,
        reads: Cell<usize>,
    }

    impl NeighborLookup for CountingLookup<'_> {
        fn voxel_at(&self, world: [i32; 3]) -> VoxelTypeId {
            self.reads.set(self.reads.get() + 1);
            self.hood.voxel_at(world)
        }

        fn face_neighbor(&self, direction: Direction) -> Option<&Chunk> {
            self.hood.face_neighbor(direction)
        }
    }

    #[test]
    fn test_enclosed_chunk_skips_voxel_reads() {
        let ex = extractor();
        let stone = id(&ex, "stone");
        let coord = ChunkCoord::new(2, -1, 0);
        let center = Chunk::filled(coord, stone);
        let around: Vec<_> = Direction::ALL
            .iter()
            .map(|&dir| Chunk::filled(coord.neighbor(dir), stone))
            .collect();
        let mut hood = ChunkNeighborhood::new(&center);
        for (dir, chunk) in Direction::ALL.iter().zip(&around) {
            hood = hood.with_neighbor(*dir, chunk);
        }
        let lookup = CountingLookup { hood, reads: Cell::new(0) };

        let fast = ex.extract_with(&center, &lookup, true).unwrap();
        assert_eq!(lookup.reads.get(), 0, "Enclosed chunk must not be scanned voxel by voxel");

        let slow = ex.extract_with(&center, &lookup, false).unwrap();
        assert!(lookup.reads.get() > 0);
        assert_eq!(fast.face_count(), 0);
        assert_eq!(fast.face_count(), slow.face_count());
        assert_eq!(fast.culled_voxels(), CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE);
    }

    #[test]
    fn test_missing_neighbour_is_not_enclosure() {
        let ex = extractor();
        let stone = id(&ex, "stone");
        let coord = ChunkCoord::new(0, 0, 0);
        let center = Chunk::filled(coord, stone);
        let around: Vec<_> = Direction::ALL
            .iter()
            .map(|&dir| Chunk::filled(coord.neighbor(dir), stone))
            .collect();
        let mut hood = ChunkNeighborhood::new(&center);
        for (dir, chunk) in Direction::ALL.iter().zip(&around) {
            if *dir != Direction::Up {
                hood = hood.with_neighbor(*dir, chunk);
            }
        }

        // Nothing loaded above, so the top layer is open to air.
        let mesh = ex.extract(&center, &hood).unwrap();
        assert_eq!(mesh.face_count(), CHUNK_SIZE * CHUNK_SIZE);
        assert!(mesh.batches().all(|(_, quads)| quads.iter().all(|q| q.direction == Direction::Up)));
    }

    #[test]
    fn test_shortcut_never_changes_output() {
        let ex = extractor();
        let stone = id(&ex, "stone");
        let glass = id(&ex, "glass");
        let dirt = id(&ex, "dirt");

        let mut chunk = Chunk::new(ChunkCoord::new(-1, 0, 2));
        for y in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    let hash = (x * 7 + y * 13 + z * 31) % 11;
                    let voxel = match hash {
                        0 => VoxelTypeId::AIR,
                        1 => glass,
                        2 | 3 => dirt,
                        _ => stone,
                    };
                    chunk.set_local([x, y, z], voxel).unwrap();
                }
            }
        }
        let world = |p: [i32; 3]| if p[1] < 0 { stone } else { VoxelTypeId::AIR };

        let fast = ex.extract_with(&chunk, &world, true).unwrap();
        let slow = ex.extract_with(&chunk, &world, false).unwrap();
        assert!(fast.culled_voxels() > 0, "Pattern should exercise the shortcut");
        assert_eq!(slow.culled_voxels(), 0);
        assert_eq!(fast.face_count(), slow.face_count());
        assert!(fast.batches().eq(slow.batches()), "Shortcut changed the face set");
    }

    #[test]
    fn test_batches_by_material() {
        let ex = extractor();
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0, 0));
        chunk.set_voxel(0, 0, 0, id(&ex, "stone")).unwrap();
        chunk.set_voxel(4, 0, 0, id(&ex, "stone")).unwrap();
        chunk.set_voxel(8, 0, 0, id(&ex, "grass")).unwrap();

        let mesh = ex.extract(&chunk, &air).unwrap();
        // stone, plus grass top, bottom and side.
        assert_eq!(mesh.batch_count(), 4);
        assert_eq!(mesh.face_count(), 18);

        let buffers = mesh.to_buffers();
        let total_vertices: usize = buffers.iter().map(|(_, v, _)| v.len()).sum();
        assert_eq!(total_vertices, 18 * 4);
    }

    #[test]
    fn test_quads_are_in_world_space() {
        let ex = extractor();
        let mut chunk = Chunk::new(ChunkCoord::new(2, -1, 0));
        chunk.set_voxel(1, 2, 3, id(&ex, "brick")).unwrap();

        let mesh = ex.extract(&chunk, &air).unwrap();
        for (_, quads) in mesh.batches() {
            for quad in quads {
                for c in quad.corners {
                    assert!((33.0..=34.0).contains(&c[0]), "x {c:?}");
                    assert!((-14.0..=-13.0).contains(&c[1]), "y {c:?}");
                    assert!((3.0..=4.0).contains(&c[2]), "z {c:?}");
                }
            }
        }
    }

    #[test]
    fn test_border_uses_neighbour_chunk() {
        let ex = extractor();
        let stone = id(&ex, "stone");
        let center = Chunk::filled(ChunkCoord::new(0, 0, 0), stone);
        let east = Chunk::filled(ChunkCoord::new(1, 0, 0), stone);

        let alone = ex.extract(&center, &ChunkNeighborhood::new(&center)).unwrap();
        let hood = ChunkNeighborhood::new(&center).with_neighbor(Direction::East, &east);
        let joined = ex.extract(&center, &hood).unwrap();
        assert_eq!(alone.face_count() - joined.face_count(), CHUNK_SIZE * CHUNK_SIZE);
    }

    #[test]
    fn test_unknown_and_unmodelled_types() {
        let ex = extractor();
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0, 0));
        chunk.set_voxel(0, 0, 0, VoxelTypeId::new(999)).unwrap();
        assert_eq!(
            ex.extract(&chunk, &air).unwrap_err(),
            MeshError::UnknownVoxelType(VoxelTypeId::new(999))
        );

        let catalog = Arc::new(VoxelCatalog::standard());
        let bare = FaceExtractor::new(Arc::clone(&catalog), Arc::new(ModelRegistry::new()));
        let stone = catalog.require("cube_game:stone").unwrap();
        let chunk = Chunk::filled(ChunkCoord::new(0, 0, 0), stone);
        assert_eq!(bare.extract(&chunk, &air).unwrap_err(), MeshError::MissingModel(stone));
    }

    #[test]
    fn test_multi_element_model() {
        let catalog = Arc::new(VoxelCatalog::standard());
        let metal = catalog.require("cube_game:metal").unwrap();
        let mut models = ModelRegistry::new();
        let tex = models.texture("metal").unwrap();
        let faces = [Some(tex); 6];
        let post = VoxelModel::from_elements(vec![
            crate::model::ModelElement::new([0, 0, 0], [16, 2, 16], faces).unwrap(),
            crate::model::ModelElement::new([6, 2, 6], [10, 16, 10], faces).unwrap(),
        ]);
        models.insert(metal, post);
        let ex = FaceExtractor::new(catalog, Arc::new(models));

        let mut chunk = Chunk::new(ChunkCoord::new(0, 0, 0));
        chunk.set_voxel(4, 4, 4, metal).unwrap();
        assert_eq!(ex.extract(&chunk, &air).unwrap().face_count(), 12);
    }
}
