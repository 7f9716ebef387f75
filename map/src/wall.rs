use nalgebra_glm as glm;

use crate::world::SectorId;

/// A stable reference to a single wall: the sector that owns it plus its
/// index within that sector's wall array. Cheap to copy, and unlike a raw
/// index into another sector's `Vec`, stays valid across a `push` onto that
/// array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WallRef {
    pub sector: SectorId,
    pub wall: u32,
}

impl WallRef {
    pub fn new(sector: SectorId, wall: u32) -> Self {
        Self { sector, wall }
    }
}

/// A directed edge of a sector's boundary polygon (a "LineDef").
#[derive(Debug, Clone)]
pub struct Wall {
    pub start: glm::Vec2,

    /// Index of the next wall in this sector's cycle.
    pub next: u32,
    /// Index of the previous wall in this sector's cycle.
    pub prev: u32,

    /// Cached outward-facing plane `(nx, ny, 0, d)`, `d = n . start`.
    /// Recomputed whenever `start` or `next` changes; see
    /// [`recalc_plane`](crate::world::PortalWorld::recalc_wall_plane).
    pub plane: glm::Vec4,

    /// The wall on the other side of this edge, in a different sector.
    pub portal: Option<WallRef>,
}

impl Wall {
    pub fn new(start: glm::Vec2) -> Self {
        Self {
            start,
            next: 0,
            prev: 0,
            plane: glm::vec4(0.0, 0.0, 0.0, 0.0),
            portal: None,
        }
    }

    pub fn has_portal(&self) -> bool {
        self.portal.is_some()
    }
}

/// Recompute the outward plane of a wall given its own start and the start
/// of its successor. Free function (rather than a method taking `&mut
/// self`) because both endpoints live in the same `walls` array and Rust
/// won't let us borrow two elements of it mutably at once from a method on
/// `Wall`.
pub fn plane_from_endpoints(start: glm::Vec2, next_start: glm::Vec2) -> glm::Vec4 {
    let normal = glm::vec2(-(next_start.y - start.y), next_start.x - start.x).normalize();
    let d = normal.dot(&start);
    glm::vec4(normal.x, normal.y, 0.0, d)
}
