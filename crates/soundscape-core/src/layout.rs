//! Floor tile layout and picking.
//!
//! The renderer owns how tiles look; the engine only needs the tile id to
//! position mapping and a way to turn a pointer ray into a tile id.

use crate::constants::{GRID_SIZE, TILE_GAP, TILE_HEIGHT, TILE_SIZE};
use glam::{Mat4, Vec3, Vec4};

/// Maps tile ids to world positions and back.
pub trait TileLayout {
    fn tile_count(&self) -> usize;

    /// Centre of the tile, or `None` for an id outside the layout.
    fn tile_position(&self, tile: usize) -> Option<Vec3>;

    /// Tile whose top face contains `point` (y is ignored).
    fn tile_at(&self, point: Vec3) -> Option<usize>;
}

/// Square grid of tiles centred on the origin, row-major along +x then +z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    pub size: usize,
    pub tile_size: f32,
    pub gap: f32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            size: GRID_SIZE,
            tile_size: TILE_SIZE,
            gap: TILE_GAP,
        }
    }
}

impl GridLayout {
    #[inline]
    fn pitch(&self) -> f32 {
        self.tile_size + self.gap
    }

    #[inline]
    fn half(&self) -> i64 {
        (self.size / 2) as i64
    }

    fn axis_index(&self, coord: f32) -> Option<usize> {
        if !coord.is_finite() {
            return None;
        }
        let pitch = self.pitch();
        let cell = (coord / pitch).round() as i64;
        // points in the gap between tiles hit nothing
        if (coord - cell as f32 * pitch).abs() > self.tile_size * 0.5 {
            return None;
        }
        let idx = cell + self.half();
        (0..self.size as i64).contains(&idx).then_some(idx as usize)
    }
}

impl TileLayout for GridLayout {
    fn tile_count(&self) -> usize {
        self.size * self.size
    }

    fn tile_position(&self, tile: usize) -> Option<Vec3> {
        if tile >= self.tile_count() {
            return None;
        }
        let col = (tile % self.size) as i64 - self.half();
        let row = (tile / self.size) as i64 - self.half();
        Some(Vec3::new(
            col as f32 * self.pitch(),
            0.0,
            row as f32 * self.pitch(),
        ))
    }

    fn tile_at(&self, point: Vec3) -> Option<usize> {
        let col = self.axis_index(point.x)?;
        let row = self.axis_index(point.z)?;
        Some(row * self.size + col)
    }
}

/// Distance along the ray to the horizontal plane at `plane_y`.
#[inline]
pub fn ray_plane_y(ray_origin: Vec3, ray_dir: Vec3, plane_y: f32) -> Option<f32> {
    if ray_dir.y.abs() < 1e-6 {
        return None;
    }
    let t = (plane_y - ray_origin.y) / ray_dir.y;
    (t >= 0.0).then_some(t)
}

/// Tile under a world-space pointer ray, tested against the tiles' top face.
pub fn pick_tile(layout: &impl TileLayout, ray_origin: Vec3, ray_dir: Vec3) -> Option<usize> {
    let top = TILE_HEIGHT * 0.5;
    let t = ray_plane_y(ray_origin, ray_dir, top)?;
    layout.tile_at(ray_origin + ray_dir * t)
}

/// Right-handed perspective camera looking at the floor.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 25.0, 35.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 16.0 / 9.0,
            fovy_radians: 75f32.to_radians(),
            znear: 0.1,
            zfar: 1000.0,
        }
    }
}

impl Camera {
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// World-space ray through normalized device coordinates (-1..1, y up).
    ///
    /// Returns `(ray_origin, ray_direction)`.
    pub fn ray_from_ndc(&self, ndc_x: f32, ndc_y: f32) -> (Vec3, Vec3) {
        let inv = (self.projection_matrix() * self.view_matrix()).inverse();
        let p_far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let p1: Vec3 = p_far.truncate() / p_far.w;
        (self.eye, (p1 - self.eye).normalize())
    }
}

/// Pixel coordinates inside a `width` x `height` viewport to NDC.
#[inline]
pub fn screen_to_ndc(x: f32, y: f32, width: f32, height: f32) -> (f32, f32) {
    let w = width.max(1.0);
    let h = height.max(1.0);
    ((x / w) * 2.0 - 1.0, 1.0 - (y / h) * 2.0)
}
