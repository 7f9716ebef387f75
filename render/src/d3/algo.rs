//! Support data structures for the portal-flood renderer: the fixed-size
//! sector BFS queue and 3D Sutherland-Hodgman polygon clipping.

use std::collections::VecDeque;

use heapless::Vec as HVec;
use nalgebra_glm as glm;

use crate::camera::Frustum;
use map::world::SectorId;

/// Hard cap on in-flight BFS entries. Overflow is a render-time
/// degradation (the entry is dropped), never a panic.
pub const SECTOR_QUEUE_SIZE: usize = 128;

/// Scratch-buffer capacity for clipped polygon vertices.
pub const CLIP_CAPACITY: usize = 32;

pub struct QueueEntry {
    pub sector: SectorId,
    pub subsector: usize,
    pub frustum: Frustum,
    /// True only for the camera's own seed entry; suppresses the frustum's
    /// near plane so geometry right at the camera isn't clipped away.
    pub first: bool,
}

/// Ring-buffered BFS queue over portal-connected sectors.
pub struct SectorQueue {
    entries: VecDeque<QueueEntry>,
    overflowed: bool,
}

impl SectorQueue {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(SECTOR_QUEUE_SIZE),
            overflowed: false,
        }
    }

    pub fn push(&mut self, entry: QueueEntry) {
        if self.entries.len() >= SECTOR_QUEUE_SIZE {
            self.overflowed = true;
            return;
        }
        self.entries.push_back(entry);
    }

    pub fn pop(&mut self) -> Option<QueueEntry> {
        self.entries.pop_front()
    }

    pub fn overflowed(&self) -> bool {
        self.overflowed
    }
}

/// Clip a convex polygon against every plane of `planes` in turn, ping-ponging
/// between two fixed-capacity buffers. A point is "in" when
/// `plane.xyz . v - plane.w >= 0`. Stops early once nothing survives.
pub fn clip_polygon(polygon: &[glm::Vec3], planes: &[glm::Vec4]) -> HVec<glm::Vec3, CLIP_CAPACITY> {
    let mut current: HVec<glm::Vec3, CLIP_CAPACITY> = HVec::new();
    for &v in polygon {
        if current.push(v).is_err() {
            break;
        }
    }

    for plane in planes {
        if current.is_empty() {
            break;
        }

        let mut output: HVec<glm::Vec3, CLIP_CAPACITY> = HVec::new();
        let input = current.as_slice();
        let n = input.len();

        for i in 0..n {
            let curr = input[i];
            let prev = input[(i + n - 1) % n];
            let curr_in = inside(plane, curr);
            let prev_in = inside(plane, prev);

            if curr_in {
                if !prev_in {
                    if let Some(p) = intersect(plane, prev, curr) {
                        let _ = output.push(p);
                    }
                }
                let _ = output.push(curr);
            } else if prev_in {
                if let Some(p) = intersect(plane, prev, curr) {
                    let _ = output.push(p);
                }
            }
        }

        current = output;
    }

    current
}

fn inside(plane: &glm::Vec4, v: glm::Vec3) -> bool {
    let normal = glm::vec3(plane.x, plane.y, plane.z);
    normal.dot(&v) - plane.w >= 0.0
}

fn intersect(plane: &glm::Vec4, a: glm::Vec3, b: glm::Vec3) -> Option<glm::Vec3> {
    map::geometry::intersect_segment_plane([a, b], *plane).map(|t| a + (b - a) * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32, z: f32) -> glm::Vec3 {
        glm::vec3(x, y, z)
    }

    #[test]
    fn clip_against_single_plane_halves_a_square() {
        let square = [v(-1.0, -1.0, 0.0), v(1.0, -1.0, 0.0), v(1.0, 1.0, 0.0), v(-1.0, 1.0, 0.0)];
        // keep x >= 0
        let plane = glm::vec4(1.0, 0.0, 0.0, 0.0);
        let clipped = clip_polygon(&square, &[plane]);
        assert_eq!(clipped.len(), 4);
        assert!(clipped.iter().all(|p| p.x >= -1e-5));
    }

    #[test]
    fn clip_against_opposing_plane_empties_a_square() {
        let square = [v(-1.0, -1.0, 0.0), v(1.0, -1.0, 0.0), v(1.0, 1.0, 0.0), v(-1.0, 1.0, 0.0)];
        // keep x >= 10: nothing survives
        let plane = glm::vec4(1.0, 0.0, 0.0, 10.0);
        let clipped = clip_polygon(&square, &[plane]);
        assert!(clipped.is_empty());
    }

    #[test]
    fn queue_drops_entries_past_capacity() {
        let mut world = map::PortalWorld::new();
        let id = world.insert(map::Sector::draft(glm::vec2(0.0, 0.0)));

        let mut queue = SectorQueue::new();
        for _ in 0..SECTOR_QUEUE_SIZE + 4 {
            queue.push(QueueEntry {
                sector: id,
                subsector: 0,
                frustum: Frustum { planes: Vec::new() },
                first: false,
            });
        }
        assert!(queue.overflowed());
    }
}
