//! Utils

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::Vec3;

/// Compute a random vector inside the unit sphere
///
/// Randomly generate vectors in the surrounding cube. If the norm is < 1, it is inside the unit
/// sphere.
pub fn random_in_unit_sphere<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let p = gen_random(rng, -1.0, 1.0);
        if p.norm_squared() < 1.0 {
            return p;
        }
    }
}

/// A random direction, used for Lambertian scattering
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let p = random_in_unit_sphere(rng);
        // A point this close to the center has no usable direction
        if p.norm_squared() > 1e-160 {
            return p.normalize();
        }
    }
}

/// Generate a random vector inside a unit disk in the xy plane
///
/// This simulates defocus blur
pub fn random_in_unit_disk<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let p = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), 0.0);
        if p.norm_squared() < 1.0 {
            return p;
        }
    }
}

/// Generate a random vector with every component in `[min, max)`
pub fn gen_random<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> Vec3 {
    Vec3::new(
        rng.gen_range(min..max),
        rng.gen_range(min..max),
        rng.gen_range(min..max),
    )
}

/// Whether the vector is close to zero in all dimensions
pub fn near_zero(v: &Vec3) -> bool {
    const S: f64 = 1e-8;
    v.iter().all(|c| c.abs() < S)
}

/// Mirror `v` about the plane with normal `n`
pub fn reflect(v: &Vec3, n: &Vec3) -> Vec3 {
    *v - 2.0 * v.dot(n) * *n
}

/// Bend the unit vector `uv` through a surface with unit normal `n` by Snell's law
///
/// `n` must face against `uv`. Callers handle total internal reflection beforehand; the square
/// root is clamped so grazing angles never produce NaN.
pub fn refract(uv: &Vec3, n: &Vec3, etai_over_etat: f64) -> Vec3 {
    let cos_theta = (-*uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (*uv + cos_theta * *n);
    let r_out_parallel = -(1.0 - r_out_perp.norm_squared()).max(0.0).sqrt() * *n;
    r_out_perp + r_out_parallel
}

/// Plain `[x, y, z]` vector for config files
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SerdeVector(pub [f64; 3]);
impl From<SerdeVector> for Vec3 {
    fn from(value: SerdeVector) -> Self {
        let [x, y, z] = value.0;
        Vec3::new(x, y, z)
    }
}
impl From<Vec3> for SerdeVector {
    fn from(value: Vec3) -> Self {
        Self([value[0], value[1], value[2]])
    }
}
