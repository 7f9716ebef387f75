//! 2D editor view renderer: grid, sector wall/normal outlines colored by
//! portal presence, selection highlights, in-progress draft sector, the
//! rubber-band selection box, and a small HUD line.

use crate::{
    editor::{BoxSession, Editor, EditorState},
    frame::{self, EGFrame, Frame},
    util,
};
use embedded_graphics::{
    fonts::{Font6x6, Text},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Circle, Line, Rectangle},
    style::{PrimitiveStyle, TextStyle},
};
use map::{world::SectorId, PortalWorld, Sector, WallRef};
use nalgebra_glm as glm;

const GRID_COLOR: Rgb888 = Rgb888::new(0x22, 0x22, 0x22);
const WALL_COLOR: Rgb888 = Rgb888::GREEN;
const PORTAL_COLOR: Rgb888 = Rgb888::CYAN;
const SELECTED_COLOR: Rgb888 = Rgb888::YELLOW;
const DRAFT_COLOR: Rgb888 = Rgb888::WHITE;
const BOX_COLOR: Rgb888 = Rgb888::new(0xaa, 0xaa, 0x00);
const HUD_COLOR: Rgb888 = Rgb888::WHITE;

const TICK_PIXELS: f32 = 6.0;
const MAX_GRID_LINES: u32 = 512;

pub fn render(frame: &mut Frame, world: &PortalWorld, editor: &Editor) {
    let viewport = glm::vec2(frame::WIDTH as f32, frame::HEIGHT as f32);
    let (to_screen, to_world) = util::view_matrices(viewport, editor.cam_pos, editor.cam_rot, editor.zoom());

    draw_grid(frame, &to_screen, &to_world, viewport, editor);
    draw_origin(frame, &to_screen);

    for (id, sector) in world.iter() {
        draw_sector(frame, &to_screen, editor.zoom(), id, sector, &editor.selected);
    }

    match &editor.state {
        EditorState::CreateSector(draft) => draw_draft(frame, &to_screen, draft),
        EditorState::SelectionBox(session) => draw_selection_box(frame, &to_screen, session),
        _ => {}
    }

    draw_hud(frame, editor);
}

fn draw_grid(frame: &mut Frame, to_screen: &glm::Mat4, to_world: &glm::Mat4, viewport: glm::Vec2, editor: &Editor) {
    if !editor.grid_active {
        return;
    }
    let grid = editor.grid_size;
    let corner_a = util::transform_point(to_world, glm::vec2(0.0, 0.0));
    let corner_b = util::transform_point(to_world, viewport);
    let min_x = corner_a.x.min(corner_b.x);
    let max_x = corner_a.x.max(corner_b.x);
    let min_y = corner_a.y.min(corner_b.y);
    let max_y = corner_a.y.max(corner_b.y);

    let mut x = (min_x / grid).floor() * grid;
    for _ in 0..MAX_GRID_LINES {
        if x > max_x {
            break;
        }
        let p0 = util::transform_point(to_screen, glm::vec2(x, min_y));
        let p1 = util::transform_point(to_screen, glm::vec2(x, max_y));
        draw_line(frame, p0, p1, GRID_COLOR, 1);
        x += grid;
    }

    let mut y = (min_y / grid).floor() * grid;
    for _ in 0..MAX_GRID_LINES {
        if y > max_y {
            break;
        }
        let p0 = util::transform_point(to_screen, glm::vec2(min_x, y));
        let p1 = util::transform_point(to_screen, glm::vec2(max_x, y));
        draw_line(frame, p0, p1, GRID_COLOR, 1);
        y += grid;
    }
}

fn draw_origin(frame: &mut Frame, to_screen: &glm::Mat4) {
    let center = util::transform_point(to_screen, glm::vec2(0.0, 0.0));
    let right = util::transform_point(to_screen, glm::vec2(1.0, 0.0));
    let up = util::transform_point(to_screen, glm::vec2(0.0, 1.0));
    draw_line(frame, center, right, Rgb888::RED, 1);
    draw_line(frame, center, up, Rgb888::new(0, 0x88, 0));
}

fn draw_sector(
    frame: &mut Frame,
    to_screen: &glm::Mat4,
    zoom: f32,
    id: SectorId,
    sector: &Sector,
    selected: &[WallRef],
) {
    for (index, wall) in sector.walls.iter().enumerate() {
        let next = &sector.walls[wall.next as usize];
        let wall_ref = WallRef::new(id, index as u32);
        let is_selected = selected.contains(&wall_ref);

        let p0 = util::transform_point(to_screen, wall.start);
        let p1 = util::transform_point(to_screen, next.start);
        let color = if wall.has_portal() { PORTAL_COLOR } else { WALL_COLOR };
        draw_line(frame, p0, p1, color, if is_selected { 2 } else { 1 });

        let mid_world = (wall.start + next.start) * 0.5;
        let tick_world = mid_world + glm::vec2(wall.plane.x, wall.plane.y) * (TICK_PIXELS * zoom);
        let mid_screen = util::transform_point(to_screen, mid_world);
        let tick_screen = util::transform_point(to_screen, tick_world);
        draw_line(frame, mid_screen, tick_screen, color, 1);

        if is_selected {
            draw_point_marker(frame, p0, SELECTED_COLOR);
        }
    }
}

fn draw_draft(frame: &mut Frame, to_screen: &glm::Mat4, draft: &Sector) {
    for pair in draft.walls.windows(2) {
        let p0 = util::transform_point(to_screen, pair[0].start);
        let p1 = util::transform_point(to_screen, pair[1].start);
        draw_line(frame, p0, p1, DRAFT_COLOR, 1);
    }
    for wall in &draft.walls {
        let p = util::transform_point(to_screen, wall.start);
        draw_point_marker(frame, p, DRAFT_COLOR);
    }
}

fn draw_selection_box(frame: &mut Frame, to_screen: &glm::Mat4, session: &BoxSession) {
    let p0 = util::transform_point(to_screen, session.low);
    let p1 = util::transform_point(to_screen, session.high);
    Rectangle::new(to_point(p0), to_point(p1))
        .into_styled(PrimitiveStyle::with_stroke(BOX_COLOR, 1))
        .draw(&mut EGFrame(frame))
        .unwrap();
}

fn draw_hud(frame: &mut Frame, editor: &Editor) {
    let text = format!(
        "pos {:.2},{:.2}  zoom {:.4}  grid {:.3}{}  sel {}",
        editor.cam_pos.x,
        editor.cam_pos.y,
        editor.zoom(),
        editor.grid_size,
        if editor.grid_active { "" } else { " (off)" },
        editor.selected.len(),
    );
    Text::new(&text, Point::new(4, 4))
        .into_styled(TextStyle::new(Font6x6, HUD_COLOR))
        .draw(&mut EGFrame(frame))
        .unwrap();
}

fn draw_point_marker(frame: &mut Frame, p: glm::Vec2, color: Rgb888) {
    Circle::new(to_point(p), crate::editor::POINT_RENDER_RADIUS as u32)
        .into_styled(PrimitiveStyle::with_stroke(color, 1))
        .draw(&mut EGFrame(frame))
        .unwrap();
}

fn draw_line(frame: &mut Frame, a: glm::Vec2, b: glm::Vec2, color: Rgb888, stroke: u32) {
    Line::new(to_point(a), to_point(b))
        .into_styled(PrimitiveStyle::with_stroke(color, stroke))
        .draw(&mut EGFrame(frame))
        .unwrap();
}

fn to_point(p: glm::Vec2) -> Point {
    Point::new(p.x as i32, p.y as i32)
}
