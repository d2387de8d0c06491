//! # Face Directions
//!
//! The six axis-aligned directions as a closed enum plus one lookup table.
//! Everything direction-dependent (neighbour offset, normal, corner winding)
//! is read from [`DIRECTION_TABLE`] instead of being branched on.

use std::fmt;

/// One of the six axis-aligned directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Direction {
    /// +X
    East = 0,
    /// −X
    West = 1,
    /// +Y
    Up = 2,
    /// −Y
    Down = 3,
    /// +Z
    South = 4,
    /// −Z
    North = 5,
}

/// Static data for one direction.
#[derive(Clone, Copy, Debug)]
pub struct DirectionInfo {
    /// Step to the neighbouring cell.
    pub offset: [i32; 3],
    /// Outward unit normal.
    pub normal: [f32; 3],
    /// Face name as used in texture and model data.
    pub name: &'static str,
    /// The direction pointing the other way.
    pub opposite: Direction,
    /// Quad corners as min/max selectors per axis (`true` = max side of the
    /// box), counter-clockwise when viewed from outside along the normal.
    pub corners: [[bool; 3]; 4],
}

const L: bool = false;
const H: bool = true;

/// Lookup table indexed by `Direction as usize`.
pub static DIRECTION_TABLE: [DirectionInfo; 6] = [
    DirectionInfo {
        offset: [1, 0, 0],
        normal: [1.0, 0.0, 0.0],
        name: "east",
        opposite: Direction::West,
        corners: [[H, L, H], [H, L, L], [H, H, L], [H, H, H]],
    },
    DirectionInfo {
        offset: [-1, 0, 0],
        normal: [-1.0, 0.0, 0.0],
        name: "west",
        opposite: Direction::East,
        corners: [[L, L, L], [L, L, H], [L, H, H], [L, H, L]],
    },
    DirectionInfo {
        offset: [0, 1, 0],
        normal: [0.0, 1.0, 0.0],
        name: "top",
        opposite: Direction::Down,
        corners: [[L, H, L], [L, H, H], [H, H, H], [H, H, L]],
    },
    DirectionInfo {
        offset: [0, -1, 0],
        normal: [0.0, -1.0, 0.0],
        name: "bottom",
        opposite: Direction::Up,
        corners: [[L, L, L], [H, L, L], [H, L, H], [L, L, H]],
    },
    DirectionInfo {
        offset: [0, 0, 1],
        normal: [0.0, 0.0, 1.0],
        name: "south",
        opposite: Direction::North,
        corners: [[L, L, H], [H, L, H], [H, H, H], [L, H, H]],
    },
    DirectionInfo {
        offset: [0, 0, -1],
        normal: [0.0, 0.0, -1.0],
        name: "north",
        opposite: Direction::South,
        corners: [[H, L, L], [L, L, L], [L, H, L], [H, H, L]],
    },
];

impl Direction {
    /// All six directions in table order.
    pub const ALL: [Self; 6] = [
        Self::East,
        Self::West,
        Self::Up,
        Self::Down,
        Self::South,
        Self::North,
    ];

    /// Position in [`DIRECTION_TABLE`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Table entry for this direction.
    #[inline]
    #[must_use]
    pub fn info(self) -> &'static DirectionInfo {
        &DIRECTION_TABLE[self as usize]
    }

    /// Step to the neighbouring cell.
    #[inline]
    #[must_use]
    pub fn offset(self) -> [i32; 3] {
        self.info().offset
    }

    /// Outward unit normal.
    #[inline]
    #[must_use]
    pub fn normal(self) -> [f32; 3] {
        self.info().normal
    }

    /// The reverse direction.
    #[inline]
    #[must_use]
    pub fn opposite(self) -> Self {
        self.info().opposite
    }

    /// Face name (`top`, `bottom`, `north`, `south`, `west`, `east`).
    #[inline]
    #[must_use]
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Axis this direction runs along (0 = X, 1 = Y, 2 = Z).
    #[inline]
    #[must_use]
    pub const fn axis(self) -> usize {
        (self as usize) / 2
    }

    /// True for +X, +Y and +Z.
    #[inline]
    #[must_use]
    pub const fn is_positive(self) -> bool {
        (self as usize) % 2 == 0
    }

    /// Parses a face name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|dir| dir.name() == name)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner(selector: [bool; 3]) -> [f32; 3] {
        selector.map(|high| if high { 1.0 } else { 0.0 })
    }

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

    #[test]
    fn test_table_order_matches_enum() {
        for (index, dir) in Direction::ALL.into_iter().enumerate() {
            assert_eq!(dir.index(), index);
        }
    }

    #[test]
    fn test_opposites_cancel() {
        for dir in Direction::ALL {
            let a = dir.offset();
            let b = dir.opposite().offset();
            assert_eq!([a[0] + b[0], a[1] + b[1], a[2] + b[2]], [0, 0, 0]);
            assert_eq!(dir.opposite().opposite(), dir);
            assert_eq!(dir.opposite().axis(), dir.axis());
        }
    }

    #[test]
    fn test_winding_is_counter_clockwise() {
        for dir in Direction::ALL {
            let c = dir.info().corners.map(corner);
            let n = cross(sub(c[1], c[0]), sub(c[2], c[0]));
            let normal = dir.normal();
            let dot = n[0] * normal[0] + n[1] * normal[1] + n[2] * normal[2];
            assert!(dot > 0.0, "{dir} corners wind clockwise");

            // Every corner lies on the face plane.
            let axis = dir.axis();
            let plane = if dir.is_positive() { 1.0 } else { 0.0 };
            for point in c {
                assert!((point[axis] - plane).abs() < f32::EPSILON, "{dir} corner off plane");
            }
        }
    }

    #[test]
    fn test_face_names_round_trip() {
        for dir in Direction::ALL {
            assert_eq!(Direction::from_name(dir.name()), Some(dir));
        }
        assert_eq!(Direction::from_name("sideways"), None);
        assert_eq!(Direction::North.offset(), [0, 0, -1]);
        assert_eq!(Direction::West.offset(), [-1, 0, 0]);
    }
}
