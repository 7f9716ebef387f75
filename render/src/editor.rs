//! The 2D map editor's state machine and geometric mutation operations
//! (C4): point/sector selection, sector creation by closing a polyline,
//! auto-portal linking of coincident walls, line splitting, and dragging,
//! all addressed through the stable `(SectorId, wall_index)` scheme rather
//! than raw pointers.

use log::debug;
use nalgebra_glm as glm;

use map::wall::{plane_from_endpoints, WallRef};
use map::world::SectorId;
use map::{geometry, PortalWorld, Sector};

pub const MIN_ZOOM: f32 = 0.001;
pub const MAX_ZOOM: f32 = 1.0;
pub const MAX_GRID: f32 = 256.0;
pub const MIN_GRID: f32 = 1.0 / 32.0;
pub const POINT_RENDER_RADIUS: f32 = 4.0;
pub const LINE_SELECTION_RADIUS: f32 = 3.0;

/// An in-progress drag of the selected walls' start points.
#[derive(Debug)]
pub struct MoveSession {
    pub select_point_index: usize,
    /// World-space positions of every selected wall's `start` at the
    /// moment the drag began; restored verbatim on cancel.
    pub origin: Vec<glm::Vec2>,
}

/// An in-progress rubber-band selection box.
#[derive(Debug)]
pub struct BoxSession {
    pub pivot: glm::Vec2,
    pub low: glm::Vec2,
    pub high: glm::Vec2,
}

/// The editor's current mode. Each variant that needs per-frame state
/// carries its own payload rather than sharing side-table fields.
#[derive(Debug)]
pub enum EditorState {
    Idle,
    CreateSector(Sector),
    MovePoints(MoveSession),
    SelectionBox(BoxSession),
}

/// Outcome of a mutation request, for the caller to log or otherwise
/// surface without the library itself treating a rejected invariant as an
/// error.
#[derive(Debug, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    Rejected(&'static str),
}

pub struct Editor {
    pub state: EditorState,
    pub selected: Vec<WallRef>,
    pub specter_select: bool,

    pub grid_active: bool,
    pub grid_size: f32,

    pub cam_pos: glm::Vec2,
    pub cam_rot: u32,
    zoom_t: f32,
}

impl Default for Editor {
    fn default() -> Self {
        Self {
            state: EditorState::Idle,
            selected: Vec::new(),
            specter_select: false,
            grid_active: true,
            grid_size: 1.0,
            cam_pos: glm::Vec2::zeros(),
            cam_rot: 0,
            zoom_t: 0.5,
        }
    }
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom(&self) -> f32 {
        MIN_ZOOM * (MAX_ZOOM / MIN_ZOOM).powf(self.zoom_t)
    }

    pub fn zoom_by(&mut self, dt: f32) {
        self.zoom_t = (self.zoom_t + dt).max(0.0).min(1.0);
    }

    pub fn toggle_grid(&mut self) {
        self.grid_active = !self.grid_active;
    }

    pub fn toggle_specter(&mut self) {
        self.specter_select = !self.specter_select;
    }

    pub fn grow_grid(&mut self) {
        self.grid_size = (self.grid_size * 2.0).min(MAX_GRID);
    }

    pub fn shrink_grid(&mut self) {
        self.grid_size = (self.grid_size * 0.5).max(MIN_GRID);
    }

    pub fn rotate_left(&mut self) {
        self.cam_rot = (self.cam_rot + 3) % 4;
    }

    pub fn rotate_right(&mut self) {
        self.cam_rot = (self.cam_rot + 1) % 4;
    }

    /// Snap a raw world position to the grid, or pass it through unchanged
    /// when the grid is off.
    pub fn snap(&self, p: glm::Vec2) -> glm::Vec2 {
        if self.grid_active {
            glm::vec2(
                (p.x / self.grid_size).round() * self.grid_size,
                (p.y / self.grid_size).round() * self.grid_size,
            )
        } else {
            p
        }
    }

    /// Convert a screen-pixel hit-test radius into the equivalent
    /// world-space radius at the current zoom. `to_screen`'s scale factor
    /// is `1/zoom`, so a pixel radius maps back to `pixels * zoom` world
    /// units.
    fn world_radius(&self, pixel_radius: f32) -> f32 {
        pixel_radius * self.zoom()
    }

    // ---------------------------------------------------------------
    // Idle transitions
    // ---------------------------------------------------------------

    pub fn begin_new_sector(&mut self, cursor: glm::Vec2) {
        debug!("editor: new sector at {:?}", cursor);
        self.selected.clear();
        self.state = EditorState::CreateSector(Sector::draft(self.snap(cursor)));
    }

    /// `CreateSector` per-frame update on the "new-sector" key: either
    /// closes the draft (if the cursor hits the first vertex), ignores a
    /// hit on the most-recently-added vertex, or appends a new point.
    pub fn create_sector_update(&mut self, world: &mut PortalWorld, cursor: glm::Vec2) {
        let state = std::mem::replace(&mut self.state, EditorState::Idle);
        let mut draft = match state {
            EditorState::CreateSector(draft) => draft,
            other => {
                self.state = other;
                return;
            }
        };

        let cursor = self.snap(cursor);
        let radius_sq = self.world_radius(POINT_RENDER_RADIUS).powi(2);
        let first = draft.walls[0].start;
        let last = draft.walls[draft.num_walls() - 1].start;

        if geometry::distance_squared(cursor, first) <= radius_sq && draft.num_walls() > 2 {
            close_draft_sector(&mut draft);
            let id = world.insert(draft);
            debug!("editor: closed sector {:?}", id);
            self.state = EditorState::Idle;
        } else if geometry::distance_squared(cursor, last) <= radius_sq {
            // hitting the most recent vertex again: no-op, avoids duplicates
            self.state = EditorState::CreateSector(draft);
        } else {
            let n = draft.num_walls() as u32;
            let mut wall = map::Wall::new(cursor);
            wall.prev = n - 1;
            draft.walls[(n - 1) as usize].next = n;
            draft.walls.push(wall);
            self.state = EditorState::CreateSector(draft);
        }
    }

    /// Delete every currently selected wall. Sectors that would drop below
    /// three walls are removed outright instead.
    pub fn delete_points(&mut self, world: &mut PortalWorld) {
        let mut by_sector: Vec<(SectorId, Vec<u32>)> = Vec::new();
        for wall_ref in &self.selected {
            match by_sector.iter_mut().find(|(id, _)| *id == wall_ref.sector) {
                Some((_, indices)) => indices.push(wall_ref.wall),
                None => by_sector.push((wall_ref.sector, vec![wall_ref.wall])),
            }
        }

        for (sector_id, mut indices) in by_sector {
            let num_walls = match world.get(sector_id) {
                Some(s) => s.num_walls(),
                None => continue,
            };

            if num_walls.saturating_sub(indices.len()) < 3 {
                debug!("editor: deleting sector {:?} (below 3 walls)", sector_id);
                world.unlink_portals_to(sector_id);
                world.remove(sector_id);
                self.selected.retain(|w| w.sector != sector_id);
                continue;
            }

            // remove highest index first so earlier indices stay valid
            indices.sort_unstable();
            indices.dedup();
            for wall_index in indices.into_iter().rev() {
                delete_single_wall(world, sector_id, wall_index);
                self.selected.retain(|w| !(w.sector == sector_id && w.wall == wall_index));
                for w in self.selected.iter_mut() {
                    if w.sector == sector_id && w.wall > wall_index {
                        w.wall -= 1;
                    }
                }
            }
        }
    }

    /// Split every selected-or-nearby wall at its closest point to the
    /// cursor, preserving any portal on the *other* half of the split.
    pub fn split_line(&mut self, world: &mut PortalWorld, cursor: glm::Vec2) {
        let radius_sq = self.world_radius(LINE_SELECTION_RADIUS).powi(2);
        let hits = self.find_nearby_walls(world, cursor, radius_sq);
        for wall_ref in hits {
            split_wall(world, wall_ref, cursor);
        }
    }

    /// Link or unlink a portal at the wall nearest the cursor.
    pub fn auto_portal(&mut self, world: &mut PortalWorld, cursor: glm::Vec2) -> MutationOutcome {
        let radius_sq = self.world_radius(LINE_SELECTION_RADIUS).powi(2);
        let nearest = match self.find_nearest_wall(world, cursor, radius_sq) {
            Some(w) => w,
            None => return MutationOutcome::Rejected("no wall near cursor"),
        };

        let has_portal = world
            .get(nearest.sector)
            .map(|s| s.walls[nearest.wall as usize].has_portal())
            .unwrap_or(false);

        if has_portal {
            debug!("editor: tearing down portal at {:?}", nearest);
            world.unlink_portal(nearest);
            return MutationOutcome::Applied;
        }

        if let Some(partner) = find_portal_partner(world, nearest) {
            debug!("editor: auto-portal {:?} <-> {:?}", nearest, partner);
            world.link_portal(nearest, partner);
            MutationOutcome::Applied
        } else {
            MutationOutcome::Rejected("no coincident wall in another sector")
        }
    }

    pub fn begin_selection_box(&mut self, cursor: glm::Vec2) {
        let cursor = self.snap(cursor);
        self.state = EditorState::SelectionBox(BoxSession {
            pivot: cursor,
            low: cursor,
            high: cursor,
        });
    }

    pub fn selection_box_update(&mut self, cursor: glm::Vec2) {
        let cursor = self.snap(cursor);
        if let EditorState::SelectionBox(session) = &mut self.state {
            session.low = glm::vec2(session.pivot.x.min(cursor.x), session.pivot.y.min(cursor.y));
            session.high = glm::vec2(session.pivot.x.max(cursor.x), session.pivot.y.max(cursor.y));
        }
    }

    pub fn selection_box_confirm(&mut self, world: &PortalWorld) {
        let state = std::mem::replace(&mut self.state, EditorState::Idle);
        let session = match state {
            EditorState::SelectionBox(session) => session,
            other => {
                self.state = other;
                return;
            }
        };

        let inflate = POINT_RENDER_RADIUS * self.zoom();
        let low = session.low - glm::vec2(inflate, inflate);
        let high = session.high + glm::vec2(inflate, inflate);

        for (id, sector) in world.iter() {
            for (index, wall) in sector.walls.iter().enumerate() {
                let p = wall.start;
                if p.x >= low.x && p.x <= high.x && p.y >= low.y && p.y <= high.y {
                    let wall_ref = WallRef::new(id, index as u32);
                    if !self.selected.contains(&wall_ref) {
                        self.selected.push(wall_ref);
                    }
                }
            }
        }

        self.state = EditorState::Idle;
    }

    /// Toggle a vertex under the cursor in or out of the selection
    /// (subject to `specter_select`).
    pub fn multi_select_point(&mut self, world: &PortalWorld, cursor: glm::Vec2) {
        let radius_sq = self.world_radius(POINT_RENDER_RADIUS).powi(2);

        if let Some(existing) = self.selected_vertex_near(world, cursor, radius_sq) {
            self.selected.retain(|w| *w != existing);
            return;
        }

        for (id, sector) in world.iter() {
            for (index, wall) in sector.walls.iter().enumerate() {
                if geometry::distance_squared(wall.start, cursor) <= radius_sq {
                    let wall_ref = WallRef::new(id, index as u32);
                    if !self.selected.contains(&wall_ref) {
                        self.selected.push(wall_ref);
                    }
                    if !self.specter_select {
                        return;
                    }
                }
            }
        }
    }

    /// Either enters `MovePoints` on an already-selected vertex, or
    /// replaces the selection with the single vertex hit.
    pub fn select_point(&mut self, world: &PortalWorld, cursor: glm::Vec2) {
        let radius_sq = self.world_radius(POINT_RENDER_RADIUS).powi(2);

        if let Some(existing) = self.selected_vertex_near(world, cursor, radius_sq) {
            let index = self.selected.iter().position(|w| *w == existing).unwrap();
            self.begin_move(world, index);
            return;
        }

        for (id, sector) in world.iter() {
            for (index, wall) in sector.walls.iter().enumerate() {
                if geometry::distance_squared(wall.start, cursor) <= radius_sq {
                    self.selected.clear();
                    self.selected.push(WallRef::new(id, index as u32));
                    self.begin_move(world, 0);
                    return;
                }
            }
        }
    }

    pub fn select_sector(&mut self, world: &PortalWorld, cursor: glm::Vec2) {
        self.selected.clear();
        self.multi_select_sector(world, cursor);
    }

    pub fn multi_select_sector(&mut self, world: &PortalWorld, cursor: glm::Vec2) {
        if let Some(id) = world.get_sector(cursor) {
            let sector = world.get(id).unwrap();
            for index in 0..sector.num_walls() {
                let wall_ref = WallRef::new(id, index as u32);
                if !self.selected.contains(&wall_ref) {
                    self.selected.push(wall_ref);
                }
            }
        }
    }

    fn begin_move(&mut self, world: &PortalWorld, select_point_index: usize) {
        let origin = self
            .selected
            .iter()
            .map(|w| world.get(w.sector).unwrap().walls[w.wall as usize].start)
            .collect();
        self.state = EditorState::MovePoints(MoveSession {
            select_point_index,
            origin,
        });
    }

    // ---------------------------------------------------------------
    // MovePoints
    // ---------------------------------------------------------------

    pub fn move_points_update(&mut self, world: &mut PortalWorld, cursor: glm::Vec2) {
        let cursor = self.snap(cursor);
        let (anchor_index, origin) = match &self.state {
            EditorState::MovePoints(session) => (session.select_point_index, session.origin.clone()),
            _ => return,
        };
        let delta = cursor - origin[anchor_index];

        for (wall_ref, original) in self.selected.clone().into_iter().zip(origin.iter()) {
            if let Some(sector) = world.get_mut(wall_ref.sector) {
                sector.walls[wall_ref.wall as usize].start = original + delta;
            }
        }
    }

    pub fn move_points_cancel(&mut self, world: &mut PortalWorld) {
        let state = std::mem::replace(&mut self.state, EditorState::Idle);
        if let EditorState::MovePoints(session) = state {
            for (wall_ref, original) in self.selected.clone().into_iter().zip(session.origin.iter()) {
                if let Some(sector) = world.get_mut(wall_ref.sector) {
                    sector.walls[wall_ref.wall as usize].start = *original;
                }
            }
        }
        self.state = EditorState::Idle;
    }

    pub fn move_points_release(&mut self, world: &mut PortalWorld) {
        self.state = EditorState::Idle;
        for wall_ref in self.selected.clone() {
            for candidate in [wall_ref, prev_ref(world, wall_ref)] {
                if let Some(candidate) = candidate {
                    if world.get(candidate.sector).map_or(false, |s| {
                        s.walls[candidate.wall as usize].has_portal()
                    }) && !world.portal_still_coincident(candidate)
                    {
                        debug!("editor: portal broken by move at {:?}", candidate);
                        world.unlink_portal(candidate);
                    }
                    world.recalc_wall_plane(candidate.sector, candidate.wall);
                }
            }
        }
    }
}

fn prev_ref(world: &PortalWorld, wall_ref: WallRef) -> Option<WallRef> {
    world.get(wall_ref.sector).map(|s| {
        let prev = s.walls[wall_ref.wall as usize].prev;
        WallRef::new(wall_ref.sector, prev)
    })
}

impl Editor {
    fn selected_vertex_near(
        &self,
        world: &PortalWorld,
        cursor: glm::Vec2,
        radius_sq: f32,
    ) -> Option<WallRef> {
        self.selected
            .iter()
            .copied()
            .find(|w| {
                world
                    .get(w.sector)
                    .map(|s| geometry::distance_squared(s.walls[w.wall as usize].start, cursor) <= radius_sq)
                    .unwrap_or(false)
            })
    }

    fn find_nearby_walls(
        &self,
        world: &PortalWorld,
        cursor: glm::Vec2,
        radius_sq: f32,
    ) -> Vec<WallRef> {
        let mut hits = Vec::new();
        for (id, sector) in world.iter() {
            for (index, wall) in sector.walls.iter().enumerate() {
                let next = sector.walls[wall.next as usize].start;
                let closest = geometry::closest_point_on_segment(wall.start, next, cursor);
                if geometry::distance_squared(closest, cursor) <= radius_sq {
                    hits.push(WallRef::new(id, index as u32));
                    if !self.specter_select {
                        return hits;
                    }
                }
            }
        }
        hits
    }

    fn find_nearest_wall(
        &self,
        world: &PortalWorld,
        cursor: glm::Vec2,
        radius_sq: f32,
    ) -> Option<WallRef> {
        let mut best: Option<(WallRef, f32)> = None;
        for (id, sector) in world.iter() {
            for (index, wall) in sector.walls.iter().enumerate() {
                let next = sector.walls[wall.next as usize].start;
                let closest = geometry::closest_point_on_segment(wall.start, next, cursor);
                let d = geometry::distance_squared(closest, cursor);
                if d <= radius_sq && best.map_or(true, |(_, best_d)| d < best_d) {
                    best = Some((WallRef::new(id, index as u32), d));
                }
            }
        }
        best.map(|(w, _)| w)
    }
}

fn close_draft_sector(draft: &mut Sector) {
    let n = draft.num_walls();
    draft.walls[n - 1].next = 0;
    draft.walls[0].prev = (n - 1) as u32;

    if draft.signed_area_sum() > 0.0 {
        draft.reverse_winding();
    }

    for i in 0..n {
        let start = draft.walls[i].start;
        let next_start = draft.walls[draft.walls[i].next as usize].start;
        draft.walls[i].plane = plane_from_endpoints(start, next_start);
    }
}

/// Splice `wall_index` out of `sector_id`'s cycle, swap-remove it from the
/// backing array, and fix up whatever ends up pointing at the moved slot.
fn delete_single_wall(world: &mut PortalWorld, sector_id: SectorId, wall_index: u32) {
    world.unlink_portal(WallRef::new(sector_id, wall_index));

    let (prev, next) = {
        let sector = world.get_mut(sector_id).unwrap();
        let wall = &sector.walls[wall_index as usize];
        (wall.prev, wall.next)
    };
    world.unlink_portal(WallRef::new(sector_id, prev));

    {
        let sector = world.get_mut(sector_id).unwrap();
        sector.walls[prev as usize].next = next;
        sector.walls[next as usize].prev = prev;
    }
    world.recalc_wall_plane(sector_id, prev);

    let last_index = {
        let sector = world.get_mut(sector_id).unwrap();
        let last_index = (sector.walls.len() - 1) as u32;
        sector.walls.swap_remove(wall_index as usize);
        last_index
    };

    if last_index != wall_index {
        rebase_wall_index(world, sector_id, last_index, wall_index);
    }
}

/// After a `swap_remove` moved the wall at `from` down to `to`, fix up the
/// moved wall's neighbors and any portal pointing at it.
fn rebase_wall_index(world: &mut PortalWorld, sector_id: SectorId, from: u32, to: u32) {
    let (prev, next, portal) = {
        let sector = world.get(sector_id).unwrap();
        let wall = &sector.walls[to as usize];
        (wall.prev, wall.next, wall.portal)
    };

    let sector = world.get_mut(sector_id).unwrap();
    if prev != from {
        sector.walls[prev as usize].next = to;
    } else {
        sector.walls[to as usize].next = to;
    }
    if next != from {
        sector.walls[next as usize].prev = to;
    } else {
        sector.walls[to as usize].prev = to;
    }

    if let Some(partner) = portal {
        if let Some(partner_sector) = world.get_mut(partner.sector) {
            if let Some(partner_wall) = partner_sector.walls.get_mut(partner.wall as usize) {
                partner_wall.portal = Some(WallRef::new(sector_id, to));
            }
        }
    }
}

/// Split `wall_ref` at its closest point to `cursor`, inheriting the split
/// wall's plane (the new point lies on the same line) and tearing down the
/// portal of the half that used to carry it.
fn split_wall(world: &mut PortalWorld, wall_ref: WallRef, cursor: glm::Vec2) {
    world.unlink_portal(wall_ref);

    let (start, next_start, next_index, plane) = {
        let sector = world.get(wall_ref.sector).unwrap();
        let wall = &sector.walls[wall_ref.wall as usize];
        let next = &sector.walls[wall.next as usize];
        (wall.start, next.start, wall.next, wall.plane)
    };
    let split_point = geometry::closest_point_on_segment(start, next_start, cursor);

    let sector = world.get_mut(wall_ref.sector).unwrap();
    let new_index = sector.walls.len() as u32;
    let mut new_wall = map::Wall::new(split_point);
    new_wall.plane = plane;
    new_wall.next = next_index;
    new_wall.prev = wall_ref.wall;
    sector.walls.push(new_wall);

    sector.walls[wall_ref.wall as usize].next = new_index;
    sector.walls[next_index as usize].prev = new_index;
}

#[cfg(test)]
mod tests {
    use super::*;
    use map::SubSector;

    fn square(offset: f32) -> Sector {
        let mut sector = Sector {
            walls: vec![
                map::Wall::new(glm::vec2(offset, 0.0)),
                map::Wall::new(glm::vec2(offset + 10.0, 0.0)),
                map::Wall::new(glm::vec2(offset + 10.0, 10.0)),
                map::Wall::new(glm::vec2(offset, 10.0)),
            ],
            subsectors: vec![SubSector::DEFAULT],
        };
        for i in 0..4 {
            sector.walls[i].next = ((i + 1) % 4) as u32;
            sector.walls[i].prev = ((i + 3) % 4) as u32;
            let next = sector.walls[sector.walls[i].next as usize].start;
            sector.walls[i].plane = plane_from_endpoints(sector.walls[i].start, next);
        }
        sector
    }

    fn triangle() -> Sector {
        let mut sector = Sector {
            walls: vec![
                map::Wall::new(glm::vec2(0.0, 0.0)),
                map::Wall::new(glm::vec2(10.0, 0.0)),
                map::Wall::new(glm::vec2(5.0, 10.0)),
            ],
            subsectors: vec![SubSector::DEFAULT],
        };
        for i in 0..3 {
            sector.walls[i].next = ((i + 1) % 3) as u32;
            sector.walls[i].prev = ((i + 2) % 3) as u32;
        }
        sector
    }

    #[test]
    fn clicking_four_corners_then_the_first_again_closes_a_square() {
        let mut world = PortalWorld::new();
        let mut editor = Editor::new();

        editor.begin_new_sector(glm::vec2(0.0, 0.0));
        editor.create_sector_update(&mut world, glm::vec2(10.0, 0.0));
        editor.create_sector_update(&mut world, glm::vec2(10.0, 10.0));
        editor.create_sector_update(&mut world, glm::vec2(0.0, 10.0));
        editor.create_sector_update(&mut world, glm::vec2(0.0, 0.0));

        assert!(matches!(editor.state, EditorState::Idle));
        assert_eq!(world.len(), 1);
        let (_, sector) = world.iter().next().unwrap();
        assert_eq!(sector.num_walls(), 4);
    }

    #[test]
    fn auto_portal_links_the_coincident_edge_of_two_adjacent_squares() {
        let mut world = PortalWorld::new();
        let mut editor = Editor::new();
        let a = world.insert(square(0.0));
        let b = world.insert(square(10.0));

        let outcome = editor.auto_portal(&mut world, glm::vec2(10.0, 5.0));
        assert_eq!(outcome, MutationOutcome::Applied);

        let partner = world.get(a).unwrap().walls[1].portal;
        assert_eq!(partner, Some(WallRef::new(b, 3)));
        let back = world.get(b).unwrap().walls[3].portal;
        assert_eq!(back, Some(WallRef::new(a, 1)));
    }

    #[test]
    fn splitting_a_portaled_wall_tears_the_portal_down_on_both_sides() {
        let mut world = PortalWorld::new();
        let mut editor = Editor::new();
        let a = world.insert(square(0.0));
        let b = world.insert(square(10.0));
        world.link_portal(WallRef::new(a, 1), WallRef::new(b, 3));

        editor.split_line(&mut world, glm::vec2(10.0, 5.0));

        let sector_a = world.get(a).unwrap();
        assert_eq!(sector_a.num_walls(), 5);
        assert!(!sector_a.walls[1].has_portal());
        assert!(!world.get(b).unwrap().walls[3].has_portal());
    }

    #[test]
    fn moving_a_portal_endpoint_away_breaks_the_portal() {
        let mut world = PortalWorld::new();
        let mut editor = Editor::new();
        let a = world.insert(square(0.0));
        let b = world.insert(square(10.0));
        world.link_portal(WallRef::new(a, 1), WallRef::new(b, 3));

        editor.select_point(&world, glm::vec2(10.0, 0.0));
        assert!(matches!(editor.state, EditorState::MovePoints(_)));

        editor.move_points_update(&mut world, glm::vec2(10.0, -5.0));
        editor.move_points_release(&mut world);

        assert!(matches!(editor.state, EditorState::Idle));
        assert!(!world.get(a).unwrap().walls[1].has_portal());
        assert!(!world.get(b).unwrap().walls[3].has_portal());
    }

    #[test]
    fn deleting_a_vertex_of_a_triangle_removes_the_whole_sector() {
        let mut world = PortalWorld::new();
        let mut editor = Editor::new();
        let id = world.insert(triangle());
        editor.selected.push(WallRef::new(id, 0));

        editor.delete_points(&mut world);

        assert_eq!(world.len(), 0);
        assert!(editor.selected.is_empty());
    }
}

/// Scan every wall in every other sector for the first one that satisfies
/// the portal coincidence predicate (I6) against `wall_ref`.
fn find_portal_partner(world: &PortalWorld, wall_ref: WallRef) -> Option<WallRef> {
    let (start, next_start) = {
        let sector = world.get(wall_ref.sector)?;
        let wall = &sector.walls[wall_ref.wall as usize];
        (wall.start, sector.walls[wall.next as usize].start)
    };

    for (id, sector) in world.iter() {
        if id == wall_ref.sector {
            continue;
        }
        for (index, wall) in sector.walls.iter().enumerate() {
            let wall_next_start = sector.walls[wall.next as usize].start;
            if geometry::distance_squared(start, wall_next_start) <= geometry::AUTO_PORTAL_EPSILON
                && geometry::distance_squared(next_start, wall.start) <= geometry::AUTO_PORTAL_EPSILON
            {
                return Some(WallRef::new(id, index as u32));
            }
        }
    }
    None
}
