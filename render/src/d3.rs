//! Portal-flood 3D renderer (C6): breadth-first sector traversal with
//! per-portal clipped view frustums, back-face culling, and 3D
//! Sutherland-Hodgman polygon clipping. Draws wall, step, and portal-opening
//! outlines only — no surface fill.

use crate::{
    camera::{Camera, Frustum},
    d3::algo::{QueueEntry, SectorQueue, SECTOR_QUEUE_SIZE},
    frame::{self, EGFrame, Frame},
    util,
};
use embedded_graphics::{pixelcolor::Rgb888, prelude::*, primitives::Line, style::PrimitiveStyle};
use log::warn;
use map::{wall::WallRef, PortalWorld, SubSector, Wall};
use nalgebra_glm as glm;

mod algo;

const WALL_COLOR: Rgb888 = Rgb888::new(0x88, 0x88, 0x88);
const STEP_COLOR: Rgb888 = Rgb888::new(0x44, 0x44, 0x88);

pub fn render(frame: &mut Frame, world: &PortalWorld, camera: &Camera) {
    let sector = match camera.sector {
        Some(id) => id,
        None => return,
    };

    let mut queue = SectorQueue::new();
    queue.push(QueueEntry {
        sector,
        subsector: camera.subsector,
        frustum: camera.frustum.clone(),
        first: true,
    });

    while let Some(entry) = queue.pop() {
        render_sector(frame, world, camera, &entry, &mut queue);
    }

    if queue.overflowed() {
        warn!("portal-flood queue overflowed (cap {})", SECTOR_QUEUE_SIZE);
    }
}

fn render_sector(
    frame: &mut Frame,
    world: &PortalWorld,
    camera: &Camera,
    entry: &QueueEntry,
    queue: &mut SectorQueue,
) {
    let sector = match world.get(entry.sector) {
        Some(s) => s,
        None => return,
    };
    let sub = match sector.subsectors.get(entry.subsector) {
        Some(s) => *s,
        None => return,
    };

    for wall in &sector.walls {
        if !facing_camera(wall, camera.pos) {
            continue;
        }
        let next = sector.walls[wall.next as usize].start;

        match wall.portal {
            None => render_solid_wall(frame, camera, entry, wall.start, next, &sub),
            Some(partner) => {
                render_portal_wall(frame, world, camera, entry, wall.start, next, partner, &sub, queue)
            }
        }
    }
}

fn facing_camera(wall: &Wall, cam_pos: glm::Vec3) -> bool {
    let normal = glm::vec3(wall.plane.x, wall.plane.y, wall.plane.z);
    normal.dot(&cam_pos) >= wall.plane.w
}

fn clip_planes(entry: &QueueEntry) -> &[glm::Vec4] {
    if entry.first && !entry.frustum.planes.is_empty() {
        &entry.frustum.planes[1..]
    } else {
        &entry.frustum.planes[..]
    }
}

fn render_solid_wall(
    frame: &mut Frame,
    camera: &Camera,
    entry: &QueueEntry,
    p0: glm::Vec2,
    p1: glm::Vec2,
    sub: &SubSector,
) {
    render_quad(frame, camera, entry, p0, p1, sub.floor_height, sub.ceiling_height, WALL_COLOR);
}

fn render_portal_wall(
    frame: &mut Frame,
    world: &PortalWorld,
    camera: &Camera,
    entry: &QueueEntry,
    p0: glm::Vec2,
    p1: glm::Vec2,
    partner: WallRef,
    cur: &SubSector,
    queue: &mut SectorQueue,
) {
    let neighbor_sector = match world.get(partner.sector) {
        Some(s) => s,
        None => return,
    };

    let mut step_bottom = cur.floor_height;
    let mut max_ceiling = cur.floor_height;

    for (sub_index, neighbor) in neighbor_sector.subsectors.iter().enumerate() {
        if !(neighbor.ceiling_height > cur.floor_height && neighbor.floor_height < cur.ceiling_height) {
            continue;
        }

        if step_bottom < neighbor.floor_height {
            render_quad(frame, camera, entry, p0, p1, step_bottom, neighbor.floor_height, STEP_COLOR);
        }

        let opening_floor = cur.floor_height.max(neighbor.floor_height);
        let opening_ceiling = cur.ceiling_height.min(neighbor.ceiling_height);
        let opening = [
            glm::vec3(p0.x, p0.y, opening_floor),
            glm::vec3(p0.x, p0.y, opening_ceiling),
            glm::vec3(p1.x, p1.y, opening_ceiling),
            glm::vec3(p1.x, p1.y, opening_floor),
        ];
        let clipped = algo::clip_polygon(&opening, clip_planes(entry));

        if clipped.len() >= 3 {
            let portal_frustum = Frustum::from_polygon(&clipped, camera.pos);
            queue.push(QueueEntry {
                sector: partner.sector,
                subsector: sub_index,
                frustum: portal_frustum,
                first: false,
            });
        }

        step_bottom = neighbor.ceiling_height;
        max_ceiling = max_ceiling.max(neighbor.ceiling_height);
    }

    if cur.ceiling_height > max_ceiling {
        render_quad(frame, camera, entry, p0, p1, max_ceiling, cur.ceiling_height, STEP_COLOR);
    }
}

fn render_quad(
    frame: &mut Frame,
    camera: &Camera,
    entry: &QueueEntry,
    p0: glm::Vec2,
    p1: glm::Vec2,
    floor: f32,
    ceiling: f32,
    color: Rgb888,
) {
    let quad = [
        glm::vec3(p0.x, p0.y, floor),
        glm::vec3(p0.x, p0.y, ceiling),
        glm::vec3(p1.x, p1.y, ceiling),
        glm::vec3(p1.x, p1.y, floor),
    ];
    let clipped = algo::clip_polygon(&quad, clip_planes(entry));
    draw_polygon_outline(frame, camera, &clipped, color);
}

fn draw_polygon_outline(frame: &mut Frame, camera: &Camera, points: &[glm::Vec3], color: Rgb888) {
    if points.len() < 3 {
        return;
    }

    let screen: Vec<glm::Vec2> = points
        .iter()
        .map(|p| {
            let clip = camera.vp_mat * glm::vec4(p.x, p.y, p.z, 1.0);
            let ndc = util::perspective_divide(clip);
            util::ndc_to_screen(ndc, frame::WIDTH as f32, frame::HEIGHT as f32)
        })
        .collect();

    for i in 0..screen.len() {
        let j = (i + 1) % screen.len();
        Line::new(to_point(screen[i]), to_point(screen[j]))
            .into_styled(PrimitiveStyle::with_stroke(color, 1))
            .draw(&mut EGFrame(frame))
            .unwrap();
    }
}

fn to_point(p: glm::Vec2) -> Point {
    Point::new(p.x as i32, p.y as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use map::{Sector, SubSector};

    fn square(offset: f32) -> Sector {
        let mut sector = Sector {
            walls: vec![
                Wall::new(glm::vec2(offset, 0.0)),
                Wall::new(glm::vec2(offset + 10.0, 0.0)),
                Wall::new(glm::vec2(offset + 10.0, 10.0)),
                Wall::new(glm::vec2(offset, 10.0)),
            ],
            subsectors: vec![SubSector::DEFAULT],
        };
        for i in 0..4 {
            sector.walls[i].next = ((i + 1) % 4) as u32;
            sector.walls[i].prev = ((i + 3) % 4) as u32;
            let next = sector.walls[sector.walls[i].next as usize].start;
            sector.walls[i].plane = map::wall::plane_from_endpoints(sector.walls[i].start, next);
        }
        sector
    }

    #[test]
    fn portal_flood_draws_into_the_neighboring_sector() {
        let mut world = PortalWorld::new();
        let a = world.insert(square(0.0));
        let b = world.insert(square(10.0));
        world.link_portal(WallRef::new(a, 1), WallRef::new(b, 3));

        let mut camera = Camera::new(frame::WIDTH as f32 / frame::HEIGHT as f32);
        camera.enter_from_2d(&world, glm::vec2(5.0, 5.0), 1);
        assert_eq!(camera.sector, Some(a));

        let mut buffer: Frame = [[0u32; frame::WIDTH]; frame::HEIGHT];
        render(&mut buffer, &world, &camera);

        assert!(buffer.iter().flatten().any(|&px| px != 0));
    }
}
