use nalgebra_glm as glm;

use crate::wall::Wall;

/// A vertical slab within a sector: floor/ceiling heights, no horizontal
/// extent of its own (that comes from the sector's polygon).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubSector {
    pub floor_height: f32,
    pub ceiling_height: f32,
}

impl SubSector {
    pub const DEFAULT: SubSector = SubSector {
        floor_height: 0.0,
        ceiling_height: 3.0,
    };
}

/// A closed 2D polygon extruded into one or more [`SubSector`] slabs.
#[derive(Debug, Clone)]
pub struct Sector {
    pub walls: Vec<Wall>,
    pub subsectors: Vec<SubSector>,
}

impl Sector {
    /// A single-wall draft sector, as created by the editor's new-sector
    /// operation. Not yet a valid sector (I3 requires `num_walls >= 3`);
    /// callers keep appending walls until the draft is closed.
    pub fn draft(start: glm::Vec2) -> Self {
        Self {
            walls: vec![Wall::new(start)],
            subsectors: vec![SubSector::DEFAULT],
        }
    }

    pub fn num_walls(&self) -> usize {
        self.walls.len()
    }

    /// Points of the sector's boundary, in wall order, for use by the
    /// geometry kernel's polygon predicates.
    pub fn polygon(&self) -> Vec<glm::Vec2> {
        self.walls.iter().map(|w| w.start).collect()
    }

    /// Signed area sum used by the winding check (I2): `<= 0` for CCW.
    pub fn signed_area_sum(&self) -> f32 {
        let mut sum = 0.0f32;
        for wall in &self.walls {
            let next = &self.walls[wall.next as usize];
            sum += (next.start.x - wall.start.x) * (next.start.y + wall.start.y);
        }
        sum
    }

    /// Reverse winding by swapping every wall's `next`/`prev`. Used to
    /// correct a CreateSector draft that was drawn clockwise.
    pub fn reverse_winding(&mut self) {
        for wall in &mut self.walls {
            std::mem::swap(&mut wall.next, &mut wall.prev);
        }
    }

    pub fn get_subsector(&self, z: f32) -> usize {
        let mut result = 0;
        for (i, sub) in self.subsectors.iter().enumerate() {
            if z < sub.floor_height {
                return result;
            }
            result = i;
        }
        result
    }
}
