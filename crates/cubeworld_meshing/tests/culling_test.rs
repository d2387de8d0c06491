//! # Culling Integration Tests
//!
//! Face counts for whole chunks with and without neighbours, and culling
//! against transparent voxels across a chunk border.

use std::sync::Arc;

use cubeworld_core::{Chunk, ChunkCoord, Direction, VoxelCatalog, VoxelTypeId, CHUNK_SIZE};
use cubeworld_meshing::{ChunkNeighborhood, FaceExtractor, ModelRegistry};

fn setup() -> (FaceExtractor, VoxelTypeId, VoxelTypeId) {
    let catalog = Arc::new(VoxelCatalog::standard());
    let stone = catalog.require("cube_game:stone").unwrap();
    let glass = catalog.require("cube_game:glass").unwrap();
    let models = Arc::new(ModelRegistry::standard(&catalog).unwrap());
    (FaceExtractor::new(catalog, models), stone, glass)
}

#[test]
fn test_solid_chunk_without_neighbours() {
    let (extractor, stone, _) = setup();
    let chunk = Chunk::filled(ChunkCoord::new(0, 0, 0), stone);

    let mesh = extractor
        .extract(&chunk, &ChunkNeighborhood::new(&chunk))
        .unwrap();
    assert_eq!(mesh.face_count(), 6 * CHUNK_SIZE * CHUNK_SIZE);

    // Every face sits on the chunk boundary.
    for (_, quads) in mesh.batches() {
        for quad in quads {
            let axis = quad.direction.axis();
            let plane = if quad.direction.is_positive() { 16.0 } else { 0.0 };
            assert!(quad.corners.iter().all(|c| (c[axis] - plane).abs() < f32::EPSILON));
        }
    }
}

#[test]
fn test_solid_chunk_with_solid_neighbours() {
    let (extractor, stone, _) = setup();
    let center_coord = ChunkCoord::new(0, 0, 0);
    let center = Chunk::filled(center_coord, stone);
    let neighbours: Vec<_> = Direction::ALL
        .iter()
        .map(|&dir| Chunk::filled(center_coord.neighbor(dir), stone))
        .collect();

    let mut hood = ChunkNeighborhood::new(&center);
    for (dir, chunk) in Direction::ALL.iter().zip(&neighbours) {
        hood = hood.with_neighbor(*dir, chunk);
    }

    let mesh = extractor.extract(&center, &hood).unwrap();
    assert_eq!(mesh.face_count(), 0);
    assert_eq!(mesh.culled_voxels(), CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE);
}

#[test]
fn test_glass_neighbour_chunk_keeps_border_faces() {
    let (extractor, stone, glass) = setup();
    let center_coord = ChunkCoord::new(0, 0, 0);
    let center = Chunk::filled(center_coord, stone);
    let neighbours: Vec<_> = Direction::ALL
        .iter()
        .map(|&dir| {
            let fill = if dir == Direction::North { glass } else { stone };
            Chunk::filled(center_coord.neighbor(dir), fill)
        })
        .collect();

    let mut hood = ChunkNeighborhood::new(&center);
    for (dir, chunk) in Direction::ALL.iter().zip(&neighbours) {
        hood = hood.with_neighbor(*dir, chunk);
    }

    let mesh = extractor.extract(&center, &hood).unwrap();
    assert_eq!(mesh.face_count(), CHUNK_SIZE * CHUNK_SIZE, "North wall behind glass stays");
    assert!(mesh
        .batches()
        .all(|(_, quads)| quads.iter().all(|q| q.direction == Direction::North)));
}

#[test]
fn test_glass_chunk_faces() {
    // Glass next to glass is transparent on both sides, so every voxel keeps
    // all six faces.
    let (extractor, _, glass) = setup();
    let mut chunk = Chunk::new(ChunkCoord::new(0, 0, 0));
    chunk.set_voxel(0, 0, 0, glass).unwrap();
    chunk.set_voxel(1, 0, 0, glass).unwrap();

    let mesh = extractor
        .extract(&chunk, &ChunkNeighborhood::new(&chunk))
        .unwrap();
    assert_eq!(mesh.face_count(), 12);
}
