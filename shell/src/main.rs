//! Host shell (C7): a `minifb` window, a `bindings.toml`-driven
//! `InputResolver`, and the per-frame glue between raw input and the
//! editor/camera/renderer libraries in `render` and `map`.

use std::collections::HashSet;
use std::time::Instant;

use log::{error, warn};
use minifb::{Key, MouseButton, MouseMode, Window, WindowOptions};
use nalgebra_glm as glm;

use map::PortalWorld;
use render::camera::Camera;
use render::controller::{self, Action, BindingTable, InputResolver, InputState, Modifiers};
use render::editor::{Editor, EditorState, MutationOutcome};
use render::frame::{self, Frame};
use render::{d2, d3};

const BINDINGS_PATH: &str = "bindings.toml";
const WORLD_PATH: &str = "world.lwbb";

const PAN_PIXELS_PER_FRAME: f32 = 12.0;
const MOVE_UNITS_PER_FRAME: f32 = 0.12;
const YAW_RADIANS_PER_FRAME: f32 = 0.035;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViewMode {
    Editor2D,
    Viewer3D,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let bindings = load_bindings();
    let mut resolver = InputResolver::new(bindings);

    let mut window = Window::new(
        "lightware-editor",
        frame::WIDTH,
        frame::HEIGHT,
        WindowOptions::default(),
    )
    .map_err(|err| {
        error!("failed to open window: {}", err);
        err
    })?;
    window.limit_update_rate(Some(std::time::Duration::from_micros(16_667)));

    let mut world = PortalWorld::new();
    let mut editor = Editor::new();
    let mut camera = Camera::new(frame::WIDTH as f32 / frame::HEIGHT as f32);
    let mut mode = ViewMode::Editor2D;
    let mut frame_buffer: Box<Frame> = Box::new([[0u32; frame::WIDTH]; frame::HEIGHT]);
    let mut last_frame = Instant::now();

    while window.is_open() {
        let _dt = last_frame.elapsed();
        last_frame = Instant::now();

        let input = gather_input(&window);
        let cursor = cursor_world(&window, &editor);

        update(&resolver, &input, cursor, &mut world, &mut editor, &mut camera, &mut mode);
        resolver.end_frame(input);

        for row in frame_buffer.iter_mut() {
            row.iter_mut().for_each(|px| *px = 0);
        }
        match mode {
            ViewMode::Editor2D => d2::render(&mut frame_buffer, &world, &editor),
            ViewMode::Viewer3D => d3::render(&mut frame_buffer, &world, &camera),
        }

        let buffer: Vec<u32> = frame_buffer.iter().flatten().copied().collect();
        window.update_with_buffer(&buffer, frame::WIDTH, frame::HEIGHT)?;
    }

    Ok(())
}

fn load_bindings() -> BindingTable {
    match std::fs::read_to_string(BINDINGS_PATH) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(table) => table,
            Err(err) => {
                warn!("couldn't parse {}: {}, falling back to defaults", BINDINGS_PATH, err);
                controller::default_bindings()
            }
        },
        Err(_) => {
            warn!("{} not found, using default bindings", BINDINGS_PATH);
            controller::default_bindings()
        }
    }
}

const TRACKED_KEYS: &[Key] = &[
    Key::W, Key::A, Key::S, Key::D,
    Key::Up, Key::Down, Key::Left, Key::Right,
    Key::Q, Key::E, Key::G, Key::P, Key::N, Key::X, Key::F,
    Key::LeftBracket, Key::RightBracket, Key::Delete,
    Key::Escape, Key::Tab,
    Key::LeftShift, Key::RightShift, Key::LeftCtrl, Key::RightCtrl, Key::LeftAlt, Key::RightAlt,
    Key::O,
];

fn gather_input(window: &Window) -> InputState {
    let mut keys = HashSet::new();
    for &key in TRACKED_KEYS {
        if window.is_key_down(key) {
            keys.insert(format!("{:?}", key));
        }
    }

    let mut mouse_buttons = HashSet::new();
    for (button, name) in [
        (MouseButton::Left, "Left"),
        (MouseButton::Right, "Right"),
        (MouseButton::Middle, "Middle"),
    ] {
        if window.get_mouse_down(button) {
            mouse_buttons.insert(name.to_owned());
        }
    }

    let modifiers = Modifiers {
        shift: keys.contains("LeftShift") || keys.contains("RightShift"),
        ctrl: keys.contains("LeftCtrl") || keys.contains("RightCtrl"),
        alt: keys.contains("LeftAlt") || keys.contains("RightAlt"),
    };

    InputState { keys, mouse_buttons, modifiers }
}

/// The cursor's world-space position under the 2D editor view, or `None`
/// when the pointer has left the window (pixel-to-world conversion needs
/// `editor`'s current view transform, not just the raw mouse position).
fn cursor_world(window: &Window, editor: &Editor) -> Option<glm::Vec2> {
    let (x, y) = window.get_mouse_pos(MouseMode::Discard)?;
    let viewport = glm::vec2(frame::WIDTH as f32, frame::HEIGHT as f32);
    let (_, to_world) = render::util::view_matrices(viewport, editor.cam_pos, editor.cam_rot, editor.zoom());
    Some(render::util::transform_point(&to_world, glm::vec2(x, y)))
}

fn update(
    resolver: &InputResolver,
    input: &InputState,
    cursor: Option<glm::Vec2>,
    world: &mut PortalWorld,
    editor: &mut Editor,
    camera: &mut Camera,
    mode: &mut ViewMode,
) {
    if resolver.fired(Action::SwapView, input) {
        *mode = match *mode {
            ViewMode::Editor2D => {
                if let Some(cursor) = cursor {
                    camera.enter_from_2d(world, cursor, editor.cam_rot);
                }
                ViewMode::Viewer3D
            }
            ViewMode::Viewer3D => ViewMode::Editor2D,
        };
    }

    if resolver.fired(Action::Save, input) {
        match world.save_to_path(WORLD_PATH) {
            Ok(()) => log::debug!("saved world to {}", WORLD_PATH),
            Err(err) => warn!("failed to save world: {}", err),
        }
    }
    if resolver.fired(Action::Open, input) {
        match PortalWorld::load_from_path(WORLD_PATH) {
            Ok(loaded) => {
                *world = loaded;
                editor.selected.clear();
            }
            Err(err) => warn!("failed to load {}: {}", WORLD_PATH, err),
        }
    }

    match mode {
        ViewMode::Editor2D => update_editor(resolver, input, cursor, world, editor),
        ViewMode::Viewer3D => update_camera(resolver, input, camera, world),
    }
}

fn update_editor(
    resolver: &InputResolver,
    input: &InputState,
    cursor: Option<glm::Vec2>,
    world: &mut PortalWorld,
    editor: &mut Editor,
) {
    if resolver.fired(Action::PanUp, input) { editor.cam_pos.y -= PAN_PIXELS_PER_FRAME * editor.zoom(); }
    if resolver.fired(Action::PanDown, input) { editor.cam_pos.y += PAN_PIXELS_PER_FRAME * editor.zoom(); }
    if resolver.fired(Action::PanLeft, input) { editor.cam_pos.x -= PAN_PIXELS_PER_FRAME * editor.zoom(); }
    if resolver.fired(Action::PanRight, input) { editor.cam_pos.x += PAN_PIXELS_PER_FRAME * editor.zoom(); }
    if resolver.fired(Action::RotateLeft, input) { editor.rotate_left(); }
    if resolver.fired(Action::RotateRight, input) { editor.rotate_right(); }
    if resolver.fired(Action::ToggleGrid, input) { editor.toggle_grid(); }
    if resolver.fired(Action::GrowGrid, input) { editor.grow_grid(); }
    if resolver.fired(Action::ShrinkGrid, input) { editor.shrink_grid(); }
    if resolver.fired(Action::ToggleSpecter, input) { editor.toggle_specter(); }

    let cursor = match cursor {
        Some(c) => c,
        None => return,
    };

    if resolver.fired(Action::Cancel, input) {
        match editor.state {
            EditorState::MovePoints(_) => editor.move_points_cancel(world),
            EditorState::CreateSector(_) | EditorState::SelectionBox(_) => {
                editor.state = EditorState::Idle;
            }
            EditorState::Idle => {}
        }
        return;
    }

    match editor.state {
        EditorState::MovePoints(_) => {
            editor.move_points_update(world, cursor);
            if !input.mouse_buttons.contains("Left") {
                editor.move_points_release(world);
            }
            return;
        }
        EditorState::SelectionBox(_) => {
            editor.selection_box_update(cursor);
            if !input.mouse_buttons.contains("Middle") {
                editor.selection_box_confirm(world);
            }
            return;
        }
        EditorState::CreateSector(_) => {
            if resolver.fired(Action::NewSector, input) {
                editor.create_sector_update(world, cursor);
            }
            return;
        }
        EditorState::Idle => {}
    }

    if resolver.fired(Action::NewSector, input) { editor.begin_new_sector(cursor); }
    if resolver.fired(Action::DeletePoints, input) { editor.delete_points(world); }
    if resolver.fired(Action::SplitLine, input) { editor.split_line(world, cursor); }
    if resolver.fired(Action::AutoPortal, input) {
        if let MutationOutcome::Rejected(reason) = editor.auto_portal(world, cursor) {
            log::debug!("auto-portal rejected: {}", reason);
        }
    }
    if resolver.fired(Action::SelectionBox, input) { editor.begin_selection_box(cursor); }
    if resolver.fired(Action::MultiSelect, input) { editor.multi_select_point(world, cursor); }
    if resolver.fired(Action::SelectPoint, input) { editor.select_point(world, cursor); }
    if resolver.fired(Action::SelectSector, input) { editor.select_sector(world, cursor); }
    if resolver.fired(Action::MultiSelectSector, input) { editor.multi_select_sector(world, cursor); }
}

fn update_camera(resolver: &InputResolver, input: &InputState, camera: &mut Camera, world: &PortalWorld) {
    // Matches the forward/right axes `Frustum::from_camera` derives from
    // `rot_mat` (rotate_z(-yaw) applied to the local +y/+x axes).
    let forward = glm::vec3(camera.yaw.sin(), camera.yaw.cos(), 0.0);
    let right = glm::vec3(camera.yaw.cos(), -camera.yaw.sin(), 0.0);
    let mut delta = glm::Vec3::zeros();

    if resolver.fired(Action::MoveForward, input) { delta += forward; }
    if resolver.fired(Action::MoveBack, input) { delta -= forward; }
    if resolver.fired(Action::MoveRight, input) { delta += right; }
    if resolver.fired(Action::MoveLeft, input) { delta -= right; }
    if resolver.fired(Action::RotateLeft, input) { camera.yaw += YAW_RADIANS_PER_FRAME; }
    if resolver.fired(Action::RotateRight, input) { camera.yaw -= YAW_RADIANS_PER_FRAME; }

    if delta.norm_squared() > 0.0 {
        camera.pos += delta.normalize() * MOVE_UNITS_PER_FRAME;
    }

    camera.relocate(world);
    camera.recalc();
}
