//! Ray Tracing Library
//!
//! A small path tracer over spheres, moving spheres and three materials

use nalgebra::Vector3;
use rand::Rng;

pub mod cameras;
pub mod error;
pub mod materials;
pub mod objects;
pub mod output;
pub mod render;
pub mod scene;
pub mod utils;

use objects::Hittable;

pub type Vec3 = Vector3<f64>;
pub type Point = Vec3;
pub type Color = Vec3;

/// Prelude
pub mod prelude {
    pub use crate::cameras::{Camera, CameraConfig};
    pub use crate::error::{Result, TracerError};
    pub use crate::materials::{Material, MaterialConfig, ScatterResult};
    pub use crate::objects::{HitRecord, Hittable, HittableList, MovingSphere, Object, Sphere};
    pub use crate::render::{RenderSettings, RenderedImage, Renderer};
    pub use crate::scene::Scene;
    pub use crate::{ray_color, Color, Point, Ray, Vec3};
}

/// Put a minimum on the hit interval to reduce shadow acne
pub const T_MIN: f64 = 0.001;

/// The ray in ray tracing
#[derive(Debug, Clone)]
pub struct Ray {
    pub orig: Point,
    pub dir: Vec3,
    pub time: f64,
}
impl Ray {
    pub fn new(orig: Point, dir: Vec3, time: f64) -> Self {
        Self { orig, dir, time }
    }

    pub fn get(&self, t: f64) -> Point {
        self.orig + t * self.dir
    }
}

/// Linearly blends white and blue depending on height of y
pub fn background(ray: &Ray) -> Color {
    let unit_direction = ray.dir.normalize();
    let t = 0.5 * (unit_direction[1] + 1.0);
    (1.0 - t) * Color::new(1.0, 1.0, 1.0) + t * Color::new(0.5, 0.7, 1.0)
}

/// Estimate the light arriving along `ray`
///
/// Bounces are followed in a loop rather than by recursion. Every scatter multiplies its
/// attenuation into the running throughput and spends one unit of `depth`. Running out of
/// depth or being absorbed gathers no light.
pub fn ray_color<R: Rng + ?Sized>(
    ray: &Ray,
    world: &impl Hittable,
    depth: u32,
    rng: &mut R,
) -> Color {
    let mut throughput = Color::new(1.0, 1.0, 1.0);
    let mut current = ray.clone();

    for _ in 0..depth {
        let Some(hr) = world.try_hit(&current, T_MIN, f64::INFINITY) else {
            return throughput.component_mul(&background(&current));
        };
        match hr.material.scatter(&current, &hr, rng) {
            Some(sr) => {
                throughput = throughput.component_mul(&sr.attenuation);
                current = sr.scattered;
            }
            None => return Color::zeros(),
        }
    }

    // If we have exceeded the ray bounce limit, no more light is gathered
    Color::zeros()
}
