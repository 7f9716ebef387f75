//! Point/segment/plane predicates used by the portal world and the editor.
//!
//! Every function here is a pure, allocation-free numerical test; none of
//! them know anything about sectors or walls.

use nalgebra_glm as glm;

/// Squared distance threshold under which two portal-adjacent vertices are
/// considered coincident.
pub const AUTO_PORTAL_EPSILON: f32 = 0.003;

/// Even-odd point-in-polygon test. `polygon` must be closed (the last vertex
/// implicitly connects back to the first). Casts a ray in the -x direction
/// from `point` and counts crossings; a crossing exactly on a vertex counts
/// only if the other endpoint of that edge lies above the ray.
pub fn point_in_polygon(polygon: &[glm::Vec2], point: glm::Vec2) -> bool {
    let ray = [point, point - glm::vec2(1.0, 0.0)];
    let mut crossings = 0u32;

    for i in 0..polygon.len() {
        let j = (i + 1) % polygon.len();
        let line = [polygon[i], polygon[j]];

        if let Some((t, u)) = intersect_segment_ray(line, ray) {
            if u < 0.0 {
                continue;
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

/// Convex point-in-polygon test: the point must lie on the inner side of
/// every edge (CCW winding). Fails fast on the first violating edge.
pub fn point_in_convex_polygon(polygon: &[glm::Vec2], point: glm::Vec2) -> bool {
    for i in 0..polygon.len() {
        let j = (i + 1) % polygon.len();
        let edge = polygon[j] - polygon[i];
        let to_point = point - polygon[i];
        if edge.x * to_point.y - edge.y * to_point.x < 0.0 {
            return false;
        }
    }
    true
}

/// Intersect segment `a` against segment `b`. Returns `(t, u)`, the
/// parametric position along `a` and along `b` respectively, only when both
/// fall within `[0, 1]`.
pub fn intersect_segment_segment(a: [glm::Vec2; 2], b: [glm::Vec2; 2]) -> Option<(f32, f32)> {
    let (t, u, denom) = line_params(a, b);
    if denom == 0.0 {
        return None;
    }
    let (t, u) = sign_correct(t, u, denom);
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some((t, u))
    } else {
        None
    }
}

/// Intersect segment `a` against the infinite line through `b`. Only `t`
/// (the parameter along `a`) is range-checked.
pub fn intersect_segment_line(a: [glm::Vec2; 2], b: [glm::Vec2; 2]) -> Option<(f32, f32)> {
    let (t, u, denom) = line_params(a, b);
    if denom == 0.0 {
        return None;
    }
    let (t, u) = sign_correct(t, u, denom);
    if (0.0..=1.0).contains(&t) {
        Some((t, u))
    } else {
        None
    }
}

/// Intersect segment `a` against the ray `b` (origin `b[0]`, direction
/// `b[1] - b[0]`, unbounded). `t` (along `a`) is range-checked; `u` (along
/// the ray) must be non-negative.
pub fn intersect_segment_ray(a: [glm::Vec2; 2], b: [glm::Vec2; 2]) -> Option<(f32, f32)> {
    let (t, u, denom) = line_params(a, b);
    if denom == 0.0 {
        return None;
    }
    let (t, u) = sign_correct(t, u, denom);
    if (0.0..=1.0).contains(&t) && u >= 0.0 {
        Some((t, u))
    } else {
        None
    }
}

fn line_params(a: [glm::Vec2; 2], b: [glm::Vec2; 2]) -> (f32, f32, f32) {
    let (p0, p1) = (a[0], a[1]);
    let (p2, p3) = (b[0], b[1]);

    let denom = (p3.x - p2.x) * (p1.y - p0.y) - (p3.y - p2.y) * (p1.x - p0.x);
    let t = (p3.x - p2.x) * (p0.y - p2.y) - (p3.y - p2.y) * (p0.x - p2.x);
    let u = (p1.x - p0.x) * (p0.y - p2.y) - (p1.y - p0.y) * (p0.x - p2.x);
    (t, u, denom)
}

fn sign_correct(mut t: f32, mut u: f32, mut denom: f32) -> (f32, f32) {
    if denom < 0.0 {
        t = -t;
        u = -u;
        denom = -denom;
    }
    (t / denom, u / denom)
}

/// Intersect a 3D segment against a plane `(nx, ny, nz, d)`. Returns the
/// parameter `t` along the segment where it crosses the plane.
pub fn intersect_segment_plane(segment: [glm::Vec3; 2], plane: glm::Vec4) -> Option<f32> {
    let normal = glm::vec4(plane.x, plane.y, plane.z, 0.0);
    let d0 = normal.dot(&to_vec4(segment[0])) - plane.w;
    let d1 = normal.dot(&to_vec4(segment[1])) - plane.w;
    let denom = d0 - d1;
    if denom == 0.0 {
        return None;
    }
    let t = d0 / denom;
    if (0.0..=1.0).contains(&t) {
        Some(t)
    } else {
        None
    }
}

fn to_vec4(v: glm::Vec3) -> glm::Vec4 {
    glm::vec4(v.x, v.y, v.z, 1.0)
}

/// Plane through three points, outward normal `(p1-p0) x (p2-p0)`.
pub fn plane_from_points(p0: glm::Vec3, p1: glm::Vec3, p2: glm::Vec3) -> glm::Vec4 {
    let normal = (p1 - p0).cross(&(p2 - p0)).normalize();
    let d = normal.dot(&p0);
    glm::vec4(normal.x, normal.y, normal.z, d)
}

/// Closest point to `point` on the segment `[a, b]`, clamped to the segment.
pub fn closest_point_on_segment(a: glm::Vec2, b: glm::Vec2, point: glm::Vec2) -> glm::Vec2 {
    let ab = b - a;
    let len_sq = ab.dot(&ab);
    if len_sq == 0.0 {
        return a;
    }
    let t = ((point - a).dot(&ab) / len_sq).max(0.0).min(1.0);
    a + ab * t
}

/// Squared distance between two points; the coincidence test everywhere
/// else in this crate compares against [`AUTO_PORTAL_EPSILON`].
pub fn distance_squared(a: glm::Vec2, b: glm::Vec2) -> f32 {
    (b - a).norm_squared()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32) -> glm::Vec2 {
        glm::vec2(x, y)
    }

    #[test]
    fn square_contains_center() {
        let square = [v(0.0, 0.0), v(10.0, 0.0), v(10.0, 10.0), v(0.0, 10.0)];
        assert!(point_in_polygon(&square, v(5.0, 5.0)));
        assert!(!point_in_polygon(&square, v(15.0, 5.0)));
    }

    #[test]
    fn convex_test_matches_even_odd_for_convex_input() {
        let square = [v(0.0, 0.0), v(10.0, 0.0), v(10.0, 10.0), v(0.0, 10.0)];
        assert!(point_in_convex_polygon(&square, v(5.0, 5.0)));
        assert!(!point_in_convex_polygon(&square, v(15.0, 5.0)));
    }

    #[test]
    fn segment_segment_crossing() {
        let a = [v(0.0, 0.0), v(10.0, 10.0)];
        let b = [v(0.0, 10.0), v(10.0, 0.0)];
        let (t, u) = intersect_segment_segment(a, b).unwrap();
        assert!((t - 0.5).abs() < 1e-5);
        assert!((u - 0.5).abs() < 1e-5);
    }

    #[test]
    fn segment_segment_parallel_misses() {
        let a = [v(0.0, 0.0), v(10.0, 0.0)];
        let b = [v(0.0, 1.0), v(10.0, 1.0)];
        assert!(intersect_segment_segment(a, b).is_none());
    }

    #[test]
    fn plane_from_three_points_is_normalized() {
        let plane = plane_from_points(v3(0.0, 0.0, 0.0), v3(1.0, 0.0, 0.0), v3(0.0, 1.0, 0.0));
        let n = glm::vec3(plane.x, plane.y, plane.z);
        assert!((n.norm() - 1.0).abs() < 1e-5);
        assert!((plane.z - 1.0).abs() < 1e-5);
    }

    fn v3(x: f32, y: f32, z: f32) -> glm::Vec3 {
        glm::vec3(x, y, z)
    }
}
