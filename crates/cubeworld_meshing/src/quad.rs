//! # Quads
//!
//! One visible face of one model element, in world space.

use bytemuck::{Pod, Zeroable};
use cubeworld_core::Direction;

use crate::model::{ModelElement, ELEMENT_UNITS};

/// Two triangles over the four corners of a [`Quad`].
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

// =============================================================================
// VERTEX FORMAT
// =============================================================================

/// Vertex layout for renderer buffers.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    /// World position.
    pub position: [f32; 3],
    /// Outward face normal.
    pub normal: [f32; 3],
    /// Texture coordinates inside the face's texture.
    pub uv: [f32; 2],
}

// =============================================================================
// QUAD
// =============================================================================

/// A face ready for the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    /// Direction the face points.
    pub direction: Direction,
    /// Corners, counter-clockwise seen from outside.
    pub corners: [[f32; 3]; 4],
    /// Texture coordinates per corner.
    pub uvs: [[f32; 2]; 4],
}

impl Quad {
    /// The `direction` face of `element`, placed at voxel position `base`.
    #[must_use]
    pub fn build(direction: Direction, base: [f32; 3], element: &ModelElement) -> Self {
        let (min, max) = element.bounds();
        let info = direction.info();
        let (u_axis, v_axis) = tangent_axes(direction);
        let unit = f32::from(ELEMENT_UNITS);

        let mut corners = [[0.0; 3]; 4];
        let mut uvs = [[0.0; 2]; 4];
        for (i, select) in info.corners.iter().enumerate() {
            for axis in 0..3 {
                let offset = if select[axis] { max[axis] } else { min[axis] };
                corners[i][axis] = base[axis] + offset;
            }
            let pick = |axis: usize| {
                let units = if select[axis] {
                    element.to()[axis]
                } else {
                    element.from()[axis]
                };
                f32::from(units) / unit
            };
            uvs[i] = [pick(u_axis), pick(v_axis)];
        }

        Self {
            direction,
            corners,
            uvs,
        }
    }

    /// Outward normal.
    #[inline]
    #[must_use]
    pub fn normal(&self) -> [f32; 3] {
        self.direction.normal()
    }

    /// The four vertices in corner order.
    #[must_use]
    pub fn vertices(&self) -> [QuadVertex; 4] {
        let normal = self.normal();
        [0, 1, 2, 3].map(|i| QuadVertex {
            position: self.corners[i],
            normal,
            uv: self.uvs[i],
        })
    }
}

/// Texture axes of a face: `u` runs horizontally, `v` up where possible.
const fn tangent_axes(direction: Direction) -> (usize, usize) {
    match direction.axis() {
        0 => (2, 1),
        1 => (0, 2),
        _ => (0, 1),
    }
}

/// Flattens quads into vertex and index buffers.
#[must_use]
pub fn quad_buffers(quads: &[Quad]) -> (Vec<QuadVertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(quads.len() * 4);
    let mut indices = Vec::with_capacity(quads.len() * 6);
    for quad in quads {
        let base = vertices.len() as u32;
        vertices.extend_from_slice(&quad.vertices());
        indices.extend(QUAD_INDICES.iter().map(|i| base + i));
    }
    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TextureId;

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    fn element() -> ModelElement {
        ModelElement::full([None::<TextureId>; 6])
    }

    #[test]
    fn test_winding_matches_normal() {
        for direction in Direction::ALL {
            let quad = Quad::build(direction, [3.0, -2.0, 7.0], &element());
            let c = quad.corners;
            let n = cross(sub(c[1], c[0]), sub(c[2], c[0]));
            let normal = quad.normal();
            let dot = n[0] * normal[0] + n[1] * normal[1] + n[2] * normal[2];
            assert!(dot > 0.0, "{direction:?} is not counter-clockwise");
        }
    }

    #[test]
    fn test_face_lies_on_element_boundary() {
        let slab = ModelElement::new([0, 0, 0], [16, 8, 16], [None; 6]).unwrap();
        let top = Quad::build(Direction::Up, [0.0, 10.0, 0.0], &slab);
        assert!(top.corners.iter().all(|c| (c[1] - 10.5).abs() < f32::EPSILON));

        let west = Quad::build(Direction::West, [4.0, 0.0, 0.0], &slab);
        assert!(west.corners.iter().all(|c| (c[0] - 4.0).abs() < f32::EPSILON));
    }

    #[test]
    fn test_buffers() {
        let quads = [
            Quad::build(Direction::Up, [0.0; 3], &element()),
            Quad::build(Direction::Down, [0.0; 3], &element()),
        ];
        let (vertices, indices) = quad_buffers(&quads);
        assert_eq!(vertices.len(), 8);
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
        assert_eq!(vertices[4].normal, [0.0, -1.0, 0.0]);
        assert_eq!(bytemuck::cast_slice::<QuadVertex, u8>(&vertices).len(), 8 * 32);
    }
}
