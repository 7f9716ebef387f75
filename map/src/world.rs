use log::warn;
use nalgebra_glm as glm;

use crate::geometry;
use crate::sector::Sector;
use crate::wall::{plane_from_endpoints, WallRef};

/// Stable identity for a sector. Indexes into [`PortalWorld`]'s arena;
/// survives inserts and removals of *other* sectors, which a plain `Vec`
/// index into a compacting vector would not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectorId(usize);

/// An unordered collection of sectors with stable identity. Removing a
/// sector leaves a tombstone rather than shifting every later id down.
#[derive(Debug, Default)]
pub struct PortalWorld {
    sectors: Vec<Option<Sector>>,
}

impl PortalWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sector: Sector) -> SectorId {
        self.sectors.push(Some(sector));
        SectorId(self.sectors.len() - 1)
    }

    pub fn remove(&mut self, id: SectorId) -> Option<Sector> {
        self.sectors.get_mut(id.0).and_then(|slot| slot.take())
    }

    pub fn get(&self, id: SectorId) -> Option<&Sector> {
        self.sectors.get(id.0).and_then(|slot| slot.as_ref())
    }

    pub fn get_mut(&mut self, id: SectorId) -> Option<&mut Sector> {
        self.sectors.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    pub fn contains(&self, id: SectorId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SectorId, &Sector)> {
        self.sectors
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|s| (SectorId(i), s)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SectorId, &mut Sector)> {
        self.sectors
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|s| (SectorId(i), s)))
    }

    pub fn len(&self) -> usize {
        self.sectors.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Recompute `wall`'s plane from its own start and its successor's.
    pub fn recalc_wall_plane(&mut self, id: SectorId, wall: u32) {
        let sector = match self.get_mut(id) {
            Some(s) => s,
            None => return,
        };
        let w = &sector.walls[wall as usize];
        let next_start = sector.walls[w.next as usize].start;
        let start = sector.walls[wall as usize].start;
        sector.walls[wall as usize].plane = plane_from_endpoints(start, next_start);
    }

    /// Even-odd point-in-sector test. `bias` rejects points that land
    /// exactly on an edge (the renderer/editor treat that as "outside").
    pub fn point_in_sector(&self, id: SectorId, point: glm::Vec2, bias: f32) -> bool {
        let sector = match self.get(id) {
            Some(s) => s,
            None => return false,
        };
        let ray = [point, point - glm::vec2(1.0, 0.0)];
        let mut crossings = 0u32;

        for wall in &sector.walls {
            let line = [wall.start, sector.walls[wall.next as usize].start];
            if let Some((t, u)) = geometry::intersect_segment_ray(line, ray) {
                if u < bias {
                    return false;
                }
                if t != 0.0 && t != 1.0 {
                    crossings += 1;
                } else if t == 1.0 && line[0].y > ray[0].y {
                    crossings += 1;
                } else if line[1].y > ray[0].y {
                    crossings += 1;
                }
            }
        }

        crossings % 2 == 1
    }

    /// First sector (in insertion order) containing `point`, if any.
    pub fn get_sector(&self, point: glm::Vec2) -> Option<SectorId> {
        self.iter()
            .map(|(id, _)| id)
            .find(|&id| self.point_in_sector(id, point, 0.0))
    }

    /// Largest sub-sector index whose floor is at or below `z`.
    pub fn get_subsector(&self, id: SectorId, z: f32) -> usize {
        self.get(id).map(|s| s.get_subsector(z)).unwrap_or(0)
    }

    /// Link two walls as a portal pair, symmetrically. Does not validate
    /// coincidence; callers (auto-portal, world load) are expected to have
    /// checked I6 already.
    pub fn link_portal(&mut self, a: WallRef, b: WallRef) {
        if let Some(sector) = self.get_mut(a.sector) {
            sector.walls[a.wall as usize].portal = Some(b);
        }
        if let Some(sector) = self.get_mut(b.sector) {
            sector.walls[b.wall as usize].portal = Some(a);
        }
    }

    /// Tear down the portal on `w`, and on its partner if still present.
    pub fn unlink_portal(&mut self, w: WallRef) {
        let partner = self
            .get(w.sector)
            .and_then(|s| s.walls[w.wall as usize].portal);
        if let Some(sector) = self.get_mut(w.sector) {
            sector.walls[w.wall as usize].portal = None;
        }
        if let Some(partner) = partner {
            if let Some(sector) = self.get_mut(partner.sector) {
                sector.walls[partner.wall as usize].portal = None;
            }
        }
    }

    /// Tear down every portal that references `id`, from the other side.
    /// Called when `id` is about to be removed.
    pub fn unlink_portals_to(&mut self, id: SectorId) {
        let partners: Vec<WallRef> = self
            .get(id)
            .map(|s| s.walls.iter().filter_map(|w| w.portal).collect())
            .unwrap_or_default();
        for partner in partners {
            if let Some(sector) = self.get_mut(partner.sector) {
                if let Some(wall) = sector.walls.get_mut(partner.wall as usize) {
                    wall.portal = None;
                }
            } else {
                warn!("unlinking portal that pointed at an already-tombstoned sector");
            }
        }
    }

    /// `true` if `w` and its portal partner still satisfy the coincidence
    /// predicate (I6). `false` if there is no portal at all.
    pub fn portal_still_coincident(&self, w: WallRef) -> bool {
        let sector = match self.get(w.sector) {
            Some(s) => s,
            None => return false,
        };
        let wall = &sector.walls[w.wall as usize];
        let partner = match wall.portal {
            Some(p) => p,
            None => return false,
        };
        let partner_sector = match self.get(partner.sector) {
            Some(s) => s,
            None => return false,
        };
        let partner_wall = &partner_sector.walls[partner.wall as usize];

        let w_next = sector.walls[wall.next as usize].start;
        let p_next = partner_sector.walls[partner_wall.next as usize].start;

        geometry::distance_squared(wall.start, p_next) <= geometry::AUTO_PORTAL_EPSILON
            && geometry::distance_squared(w_next, partner_wall.start) <= geometry::AUTO_PORTAL_EPSILON
    }
}
