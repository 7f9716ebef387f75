//! Action-binding table and edge-detection input resolution (C7).
//!
//! Neither the editor (C4) nor the camera (C5) read a raw key or mouse
//! button: they ask an [`InputResolver`] whether a named [`Action`] fired
//! this frame. Key/button identity is carried as the string form of the
//! host shell's key enum (`format!("{:?}", key)` on `minifb::Key` happens
//! to equal the variant name, so `bindings.toml` and the shell's own enum
//! never have to agree through a third translation table).

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    MoveForward,
    MoveBack,
    MoveLeft,
    MoveRight,
    PanUp,
    PanDown,
    PanLeft,
    PanRight,
    RotateLeft,
    RotateRight,
    ToggleGrid,
    GrowGrid,
    ShrinkGrid,
    ToggleSpecter,
    NewSector,
    DeletePoints,
    SplitLine,
    AutoPortal,
    SelectionBox,
    MultiSelect,
    SelectPoint,
    SelectSector,
    MultiSelectSector,
    Cancel,
    SwapView,
    Save,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    Key,
    Button,
}

/// Held/pressed/released, resolved against the previous frame's snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Held,
    Pressed,
    Released,
}

impl Default for Edge {
    fn default() -> Self {
        Edge::Pressed
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    fn satisfied_by(&self, current: &Modifiers) -> bool {
        (!self.shift || current.shift) && (!self.ctrl || current.ctrl) && (!self.alt || current.alt)
    }

    fn violated_by(&self, current: &Modifiers) -> bool {
        (self.shift && current.shift) || (self.ctrl && current.ctrl) || (self.alt && current.alt)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Binding {
    pub kind: ControlKind,
    pub code: String,
    #[serde(default)]
    pub edge: Edge,
    #[serde(default)]
    pub required: Modifiers,
    #[serde(default)]
    pub disallowed: Modifiers,
}

pub type BindingTable = HashMap<Action, Binding>;

fn key(code: &str, edge: Edge) -> Binding {
    Binding {
        kind: ControlKind::Key,
        code: code.to_owned(),
        edge,
        required: Modifiers::default(),
        disallowed: Modifiers::default(),
    }
}

fn button(code: &str, edge: Edge, required: Modifiers) -> Binding {
    Binding {
        kind: ControlKind::Button,
        code: code.to_owned(),
        edge,
        required,
        disallowed: Modifiers::default(),
    }
}

/// The listed defaults from the external-interfaces section: WASD/arrows for
/// movement and panning, bracket keys for grid size, mouse buttons (plain
/// and shift-modified) for the selection family, ctrl+S / ctrl+O for
/// persistence.
pub fn default_bindings() -> BindingTable {
    let mut table = BindingTable::new();
    table.insert(Action::MoveForward, key("W", Edge::Held));
    table.insert(Action::MoveBack, key("S", Edge::Held));
    table.insert(Action::MoveLeft, key("A", Edge::Held));
    table.insert(Action::MoveRight, key("D", Edge::Held));
    table.insert(Action::PanUp, key("Up", Edge::Held));
    table.insert(Action::PanDown, key("Down", Edge::Held));
    table.insert(Action::PanLeft, key("Left", Edge::Held));
    table.insert(Action::PanRight, key("Right", Edge::Held));
    table.insert(Action::RotateLeft, key("Q", Edge::Pressed));
    table.insert(Action::RotateRight, key("E", Edge::Pressed));
    table.insert(Action::ToggleGrid, key("G", Edge::Pressed));
    table.insert(Action::GrowGrid, key("RightBracket", Edge::Pressed));
    table.insert(Action::ShrinkGrid, key("LeftBracket", Edge::Pressed));
    table.insert(Action::ToggleSpecter, key("P", Edge::Pressed));
    table.insert(Action::NewSector, key("N", Edge::Pressed));
    table.insert(Action::DeletePoints, key("Delete", Edge::Pressed));
    table.insert(Action::SplitLine, key("X", Edge::Pressed));
    table.insert(Action::AutoPortal, key("F", Edge::Pressed));
    table.insert(
        Action::SelectionBox,
        button("Middle", Edge::Pressed, Modifiers::default()),
    );
    table.insert(
        Action::MultiSelect,
        button(
            "Left",
            Edge::Pressed,
            Modifiers { shift: true, ctrl: false, alt: false },
        ),
    );
    table.insert(
        Action::SelectPoint,
        button("Left", Edge::Pressed, Modifiers::default()),
    );
    table.insert(
        Action::SelectSector,
        button("Right", Edge::Pressed, Modifiers::default()),
    );
    table.insert(
        Action::MultiSelectSector,
        button(
            "Right",
            Edge::Pressed,
            Modifiers { shift: true, ctrl: false, alt: false },
        ),
    );
    table.insert(Action::Cancel, key("Escape", Edge::Pressed));
    table.insert(Action::SwapView, key("Tab", Edge::Pressed));
    table.insert(
        Action::Save,
        Binding {
            required: Modifiers { shift: false, ctrl: true, alt: false },
            ..key("S", Edge::Pressed)
        },
    );
    table.insert(
        Action::Open,
        Binding {
            required: Modifiers { shift: false, ctrl: true, alt: false },
            ..key("O", Edge::Pressed)
        },
    );
    table
}

/// One frame's worth of raw control state, as reported by the host shell.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub keys: HashSet<String>,
    pub mouse_buttons: HashSet<String>,
    pub modifiers: Modifiers,
}

/// Resolves [`Action`]s against a [`BindingTable`] plus the last two frames
/// of raw input, so "pressed"/"released" distinguish edges rather than
/// duplicating near-identical query functions.
pub struct InputResolver {
    bindings: BindingTable,
    previous: InputState,
}

impl InputResolver {
    pub fn new(bindings: BindingTable) -> Self {
        Self {
            bindings,
            previous: InputState::default(),
        }
    }

    pub fn fired(&self, action: Action, current: &InputState) -> bool {
        let binding = match self.bindings.get(&action) {
            Some(b) => b,
            None => return false,
        };
        if !binding.required.satisfied_by(&current.modifiers) {
            return false;
        }
        if binding.disallowed.violated_by(&current.modifiers) {
            return false;
        }

        let is_down = control_down(binding, current);
        let was_down = control_down(binding, &self.previous);

        match binding.edge {
            Edge::Held => is_down,
            Edge::Pressed => is_down && !was_down,
            Edge::Released => !is_down && was_down,
        }
    }

    /// Advance the edge-detection window; call once per frame after every
    /// `fired` query for that frame has been made.
    pub fn end_frame(&mut self, current: InputState) {
        self.previous = current;
    }
}

fn control_down(binding: &Binding, state: &InputState) -> bool {
    match binding.kind {
        ControlKind::Key => state.keys.contains(&binding.code),
        ControlKind::Button => state.mouse_buttons.contains(&binding.code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(keys: &[&str], ctrl: bool) -> InputState {
        InputState {
            keys: keys.iter().map(|s| s.to_string()).collect(),
            mouse_buttons: HashSet::new(),
            modifiers: Modifiers { shift: false, ctrl, alt: false },
        }
    }

    #[test]
    fn pressed_edge_fires_once() {
        let mut resolver = InputResolver::new(default_bindings());
        assert!(resolver.fired(Action::ToggleGrid, &state(&["G"], false)));
        resolver.end_frame(state(&["G"], false));
        assert!(!resolver.fired(Action::ToggleGrid, &state(&["G"], false)));
    }

    #[test]
    fn save_requires_ctrl_modifier() {
        let resolver = InputResolver::new(default_bindings());
        assert!(!resolver.fired(Action::Save, &state(&["S"], false)));
        assert!(resolver.fired(Action::Save, &state(&["S"], true)));
    }

    #[test]
    fn held_edge_fires_every_frame() {
        let mut resolver = InputResolver::new(default_bindings());
        assert!(resolver.fired(Action::MoveForward, &state(&["W"], false)));
        resolver.end_frame(state(&["W"], false));
        assert!(resolver.fired(Action::MoveForward, &state(&["W"], false)));
    }
}
