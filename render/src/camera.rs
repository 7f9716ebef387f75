//! 3D camera pose, projection, and view-frustum construction (C5).
//!
//! Builds six planes from cross products of the camera basis for the full
//! view frustum, and `num_verts + 1` planes (one per portal-opening edge
//! plus a biased near plane) for a frustum re-derived at a portal.

use nalgebra_glm as glm;

use map::world::SectorId;

/// An ordered set of outward-facing half-spaces; a point is "inside" the
/// frustum iff `plane.xyz . point >= plane.w` for every plane.
#[derive(Debug, Clone)]
pub struct Frustum {
    pub planes: Vec<glm::Vec4>,
}

impl Frustum {
    /// The full six-plane view frustum (near, far, left, right, top,
    /// bottom) derived from `cam`'s pose and projection parameters.
    pub fn from_camera(cam: &Camera) -> Self {
        let half_v = cam.far * (cam.fov * 0.5).tan();
        let half_h = half_v * cam.aspect;

        let cam_right = transform_dir(&cam.rot_mat, glm::vec3(1.0, 0.0, 0.0));
        let cam_front = transform_dir(&cam.rot_mat, glm::vec3(0.0, 1.0, 0.0));
        let cam_up = transform_dir(&cam.rot_mat, glm::vec3(0.0, 0.0, 1.0));
        let cam_front_far = cam_front * cam.far;

        let mut planes = vec![glm::Vec4::zeros(); 6];
        planes[0] = to_plane(cam_front, 0.0);
        planes[1] = to_plane(-cam_front, 0.0);
        planes[2] = to_plane((cam_front_far - cam_right * half_h).cross(&cam_up), 0.0);
        planes[3] = to_plane(cam_up.cross(&(cam_front_far + cam_right * half_h)), 0.0);
        planes[4] = to_plane(cam_right.cross(&(cam_front_far - cam_up * half_v)), 0.0);
        planes[5] = to_plane((cam_front_far + cam_up * half_v).cross(&cam_right), 0.0);

        for plane in &mut planes {
            let normal = glm::vec3(plane.x, plane.y, plane.z).normalize();
            let d = normal.dot(&cam.pos);
            *plane = glm::vec4(normal.x, normal.y, normal.z, d);
        }
        planes[0].w += cam.near;
        planes[1].w += -cam.far;

        Self { planes }
    }

    /// The narrowed frustum at a portal opening: one plane per edge of
    /// `polygon` through `view_point`, plus a near plane from the
    /// polygon's own plane. Every plane is offset by `-0.003` to avoid
    /// flicker at edges shared with the portal opening itself.
    pub fn from_polygon(polygon: &[glm::Vec3], view_point: glm::Vec3) -> Self {
        assert!(polygon.len() >= 3);
        let mut planes = Vec::with_capacity(polygon.len() + 1);

        planes.push(biased(map::geometry::plane_from_points(
            polygon[0], polygon[2], polygon[1],
        )));

        for i in 0..polygon.len() {
            let j = (i + 1) % polygon.len();
            planes.push(biased(map::geometry::plane_from_points(
                view_point, polygon[j], polygon[i],
            )));
        }

        Self { planes }
    }
}

const PORTAL_FRUSTUM_BIAS: f32 = 0.003;

fn biased(mut plane: glm::Vec4) -> glm::Vec4 {
    plane.w -= PORTAL_FRUSTUM_BIAS;
    plane
}

fn to_plane(normal: glm::Vec3, d: f32) -> glm::Vec4 {
    glm::vec4(normal.x, normal.y, normal.z, d)
}

fn transform_dir(rot: &glm::Mat4, v: glm::Vec3) -> glm::Vec3 {
    let r = rot * glm::vec4(v.x, v.y, v.z, 0.0);
    glm::vec3(r.x, r.y, r.z)
}

/// First-person camera pose plus its derived matrices and frustum.
#[derive(Debug, Clone)]
pub struct Camera {
    pub pos: glm::Vec3,
    pub yaw: f32,
    pub pitch: f32,

    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    pub rot_mat: glm::Mat4,
    pub view_mat: glm::Mat4,
    pub proj_mat: glm::Mat4,
    pub vp_mat: glm::Mat4,
    pub frustum: Frustum,

    pub sector: Option<SectorId>,
    pub subsector: usize,
}

pub const CAMERA_3D_HEIGHT: f32 = 1.6;

impl Camera {
    pub fn new(aspect: f32) -> Self {
        let mut cam = Self {
            pos: glm::Vec3::zeros(),
            yaw: 0.0,
            pitch: 0.0,
            fov: std::f32::consts::FRAC_PI_2 * 0.9,
            aspect,
            near: 0.1,
            far: 200.0,
            rot_mat: glm::Mat4::identity(),
            view_mat: glm::Mat4::identity(),
            proj_mat: glm::Mat4::identity(),
            vp_mat: glm::Mat4::identity(),
            frustum: Frustum { planes: Vec::new() },
            sector: None,
            subsector: 0,
        };
        cam.recalc_projection();
        cam.recalc();
        cam
    }

    pub fn recalc_projection(&mut self) {
        self.proj_mat = glm::perspective(self.aspect, self.fov, self.near, self.far);
    }

    /// Recompute rotation/view/vp matrices and the frustum from the
    /// current pose. Called once per frame; there is no cached global.
    pub fn recalc(&mut self) {
        let rot_yaw = glm::rotate_z(&glm::Mat4::identity(), -self.yaw);
        let rot_pitch = glm::rotate_x(&glm::Mat4::identity(), -self.pitch);
        self.rot_mat = rot_yaw * rot_pitch;

        let translation = glm::translate(&glm::Mat4::identity(), &-self.pos);
        let rot_yaw_fwd = glm::rotate_z(&glm::Mat4::identity(), self.yaw);
        let rot_pitch_fwd = glm::rotate_x(&glm::Mat4::identity(), self.pitch);
        let rotation = rot_pitch_fwd * rot_yaw_fwd;

        self.view_mat = rotation * translation;
        self.vp_mat = self.proj_mat * self.view_mat;
        self.frustum = Frustum::from_camera(self);
    }

    /// Reposition the camera at a 2D editor cursor on entering 3D view,
    /// mapping the editor's 90°-multiple rotation index to yaw.
    pub fn enter_from_2d(
        &mut self,
        world: &map::PortalWorld,
        cursor: glm::Vec2,
        rotation_index: u32,
    ) {
        self.yaw = match rotation_index % 4 {
            0 => 0.0,
            1 => std::f32::consts::FRAC_PI_2,
            2 => std::f32::consts::PI,
            _ => -std::f32::consts::FRAC_PI_2,
        };
        self.pitch = 0.0;

        self.sector = world.get_sector(cursor);
        let z = self
            .sector
            .and_then(|id| world.get(id))
            .map(|s| s.subsectors[0].floor_height + CAMERA_3D_HEIGHT)
            .unwrap_or(CAMERA_3D_HEIGHT);
        self.pos = glm::vec3(cursor.x, cursor.y, z);
        self.subsector = self
            .sector
            .map(|id| world.get_subsector(id, z))
            .unwrap_or(0);

        self.recalc();
    }

    /// Refresh `sector`/`subsector` from the current position; called
    /// every 3D-mode frame after movement is applied.
    pub fn relocate(&mut self, world: &map::PortalWorld) {
        self.sector = world.get_sector(glm::vec2(self.pos.x, self.pos.y));
        self.subsector = self
            .sector
            .map(|id| world.get_subsector(id, self.pos.z))
            .unwrap_or(0);
    }
}
