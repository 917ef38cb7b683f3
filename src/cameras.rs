//! Cameras and configs for cameras
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TracerError};
use crate::utils::{self, SerdeVector};
use crate::{Point, Ray, Vec3};

/// Camera Config
///
/// The aspect ratio comes from the image settings rather than from here
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    pub look_from: SerdeVector,
    pub look_at: SerdeVector,
    pub v_up: SerdeVector,
    pub vertical_fov_deg: f64,
    pub aperture: f64,
    pub focus_distance: f64,
    /// Shutter open
    #[serde(default)]
    pub time0: f64,
    /// Shutter close
    #[serde(default)]
    pub time1: f64,
}

/// A thin lens camera with a shutter
#[derive(Debug, Clone)]
pub struct Camera {
    origin: Point,
    lower_left_corner: Point,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    lens_radius: f64,
    time0: f64,
    time1: f64,
}
impl Camera {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        look_from: Point,
        look_at: Point,
        v_up: Vec3,
        vertical_fov_deg: f64,
        aspect_ratio: f64,
        aperture: f64,
        focus_dist: f64,
        time0: f64,
        time1: f64,
    ) -> Result<Self> {
        let invalid = |msg: String| -> Result<Self> { Err(TracerError::InvalidCamera(msg)) };
        let finite = |p: &Vec3| p.iter().all(|c| c.is_finite());
        if !(finite(&look_from) && finite(&look_at) && finite(&v_up)) {
            return invalid("camera vectors must be finite".into());
        }
        if !(vertical_fov_deg > 0.0 && vertical_fov_deg < 180.0) {
            return invalid(format!(
                "vertical fov must be inside (0, 180), got {vertical_fov_deg}"
            ));
        }
        if !(aspect_ratio.is_finite() && aspect_ratio > 0.0) {
            return invalid(format!("aspect ratio must be positive, got {aspect_ratio}"));
        }
        if !(focus_dist.is_finite() && focus_dist > 0.0) {
            return invalid(format!("focus distance must be positive, got {focus_dist}"));
        }
        if !(aperture.is_finite() && aperture >= 0.0) {
            return invalid(format!("aperture must not be negative, got {aperture}"));
        }
        if !(time0.is_finite() && time1.is_finite()) {
            return invalid(format!("shutter times must be finite, got [{time0}, {time1}]"));
        }

        // Establish the viewport
        let theta = vertical_fov_deg.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = aspect_ratio * viewport_height;

        // Calculate the viewing vectors
        let view = look_from - look_at;
        if view.norm_squared() < 1e-12 {
            return invalid("look_from and look_at are the same point".into());
        }
        let w = view.normalize();
        let side = v_up.cross(&w);
        if side.norm_squared() < 1e-12 {
            return invalid("v_up is parallel to the view direction".into());
        }
        let u = side.normalize();
        let v = w.cross(&u);

        let origin = look_from;
        let horizontal = focus_dist * viewport_width * u;
        let vertical = focus_dist * viewport_height * v;
        let lower_left_corner = origin - horizontal / 2.0 - vertical / 2.0 - focus_dist * w;

        let lens_radius = aperture / 2.0;

        Ok(Self {
            origin,
            lower_left_corner,
            horizontal,
            vertical,
            u,
            v,
            lens_radius,
            time0,
            time1,
        })
    }

    pub fn from_config(config: CameraConfig, aspect_ratio: f64) -> Result<Self> {
        Self::new(
            config.look_from.into(),
            config.look_at.into(),
            config.v_up.into(),
            config.vertical_fov_deg,
            aspect_ratio,
            config.aperture,
            config.focus_distance,
            config.time0,
            config.time1,
        )
    }

    /// Primary ray through the normalized image-plane coordinates `(s, t)`
    ///
    /// The origin is jittered across the lens and the time is drawn from the shutter interval.
    pub fn get_ray<R: Rng + ?Sized>(&self, s: f64, t: f64, rng: &mut R) -> Ray {
        let rd = self.lens_radius * utils::random_in_unit_disk(rng);
        let offset = self.u * rd[0] + self.v * rd[1];
        let time = self.time0 + (self.time1 - self.time0) * rng.gen::<f64>();

        Ray::new(
            self.origin + offset,
            self.lower_left_corner + s * self.horizontal + t * self.vertical - self.origin - offset,
            time,
        )
    }
}
