//! Shared matrix helpers for the 2D editor view and the 3D camera.

use nalgebra_glm as glm;

/// World-to-screen and screen-to-world transforms for the 2D editor view,
/// rebuilt every frame from `position`/`rotation_index`/`zoom` rather than
/// cached behind a shared mutable global.
pub fn view_matrices(
    viewport: glm::Vec2,
    position: glm::Vec2,
    rotation_index: u32,
    zoom: f32,
) -> (glm::Mat4, glm::Mat4) {
    let angle = (rotation_index % 4) as f32 * std::f32::consts::FRAC_PI_2;

    let mut to_screen = glm::Mat4::identity();
    to_screen = glm::translate(&to_screen, &glm::vec3(viewport.x * 0.5, viewport.y * 0.5, 0.0));
    to_screen = glm::scale(&to_screen, &glm::vec3(1.0 / zoom, -1.0 / zoom, 1.0));
    to_screen = glm::rotate_z(&to_screen, angle);
    to_screen = glm::translate(&to_screen, &glm::vec3(-position.x, -position.y, 0.0));

    let to_world = glm::inverse(&to_screen);
    (to_screen, to_world)
}

pub fn transform_point(mat: &glm::Mat4, p: glm::Vec2) -> glm::Vec2 {
    let v = mat * glm::vec4(p.x, p.y, 0.0, 1.0);
    glm::vec2(v.x, v.y)
}

/// Map a clip-space NDC point (`x, y` in `[-1, 1]`) to frame pixel
/// coordinates, flipping `y` so +1 is the top of the screen.
pub fn ndc_to_screen(ndc: glm::Vec2, width: f32, height: f32) -> glm::Vec2 {
    glm::vec2(
        (ndc.x * 0.5 + 0.5) * (width - 1.0),
        (-ndc.y * 0.5 + 0.5) * (height - 1.0),
    )
}

/// Perspective-divide a clip-space point; `w <= 0` (behind the eye) maps to
/// an inverse-w of zero rather than dividing.
pub fn perspective_divide(clip: glm::Vec4) -> glm::Vec2 {
    let inv_w = if clip.w > 0.0 { 1.0 / clip.w } else { 0.0 };
    glm::vec2(clip.x * inv_w, clip.z * inv_w)
}
