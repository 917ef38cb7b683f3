//! Implementation of materials

use log::warn;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    objects::HitRecord,
    utils::{self, SerdeVector},
    Color, Ray,
};

/// Anything that can turn an incoming ray into a scattered one
pub trait Scatterable {
    /// `None` means the ray was absorbed
    fn try_scatter<R: Rng + ?Sized>(
        &self,
        ray_in: &Ray,
        hit_record: &HitRecord,
        rng: &mut R,
    ) -> Option<ScatterResult>;
}

/// Scatter Result
#[derive(Debug, Clone)]
pub struct ScatterResult {
    /// Attenuation Color
    pub attenuation: Color,
    /// Resulting Scattered Ray
    pub scattered: Ray,
}

/// Every surface material the tracer knows about
///
/// Materials are immutable once built and are shared between objects behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Lambertian(Lambertian),
    Metal(Metal),
    Dielectric(Dielectric),
}
impl Material {
    pub fn lambertian(albedo: Color) -> Self {
        Self::Lambertian(Lambertian::new(albedo))
    }

    pub fn metal(albedo: Color, fuzz: f64) -> Self {
        Self::Metal(Metal::new(albedo, fuzz))
    }

    pub fn dielectric(ir: f64) -> Self {
        Self::Dielectric(Dielectric::new(ir))
    }

    pub fn from_config(config: MaterialConfig) -> Self {
        match config {
            MaterialConfig::Lambertian(c) => Self::Lambertian(Lambertian::from_config(c)),
            MaterialConfig::Metal(c) => Self::Metal(Metal::from_config(c)),
            MaterialConfig::Dielectric(c) => Self::Dielectric(Dielectric::from_config(c)),
        }
    }

    pub fn scatter<R: Rng + ?Sized>(
        &self,
        ray_in: &Ray,
        hit_record: &HitRecord,
        rng: &mut R,
    ) -> Option<ScatterResult> {
        match self {
            Self::Lambertian(m) => m.try_scatter(ray_in, hit_record, rng),
            Self::Metal(m) => m.try_scatter(ray_in, hit_record, rng),
            Self::Dielectric(m) => m.try_scatter(ray_in, hit_record, rng),
        }
    }
}

/// Config for materials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MaterialConfig {
    Lambertian(LambertianConfig),
    Metal(MetalConfig),
    Dielectric(DielectricConfig),
}

/// Lambertian Scatterer
#[derive(Debug, Clone, PartialEq)]
pub struct Lambertian {
    albedo: Color,
}
impl Lambertian {
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }

    pub fn from_config(config: LambertianConfig) -> Self {
        Self::new(config.albedo.into())
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }
}
impl Scatterable for Lambertian {
    fn try_scatter<R: Rng + ?Sized>(
        &self,
        ray_in: &Ray,
        hit_record: &HitRecord,
        rng: &mut R,
    ) -> Option<ScatterResult> {
        let mut scatter_direction = hit_record.normal + utils::random_unit_vector(rng);

        // The normal and the random vector can cancel out, fall back to the normal itself
        if utils::near_zero(&scatter_direction) {
            scatter_direction = hit_record.normal;
        }
        let scattered = Ray::new(hit_record.p, scatter_direction, ray_in.time);
        Some(ScatterResult {
            attenuation: self.albedo,
            scattered,
        })
    }
}

/// Lambertian Config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LambertianConfig {
    pub albedo: SerdeVector,
}

/// Metal Scatterer
#[derive(Debug, Clone, PartialEq)]
pub struct Metal {
    albedo: Color,
    fuzz: f64,
}
impl Metal {
    /// `fuzz` is clamped into `[0, 1]`
    pub fn new(albedo: Color, fuzz: f64) -> Self {
        let clamped = if fuzz.is_nan() { 0.0 } else { fuzz.clamp(0.0, 1.0) };
        if clamped != fuzz {
            warn!("metal fuzz {fuzz} outside [0, 1], using {clamped}");
        }
        Self {
            albedo,
            fuzz: clamped,
        }
    }

    pub fn from_config(config: MetalConfig) -> Self {
        Self::new(config.albedo.into(), config.fuzz)
    }

    pub fn fuzz(&self) -> f64 {
        self.fuzz
    }
}
impl Scatterable for Metal {
    /// A polished metal (`fuzz == 0`) draws nothing from `rng`
    fn try_scatter<R: Rng + ?Sized>(
        &self,
        ray_in: &Ray,
        hit_record: &HitRecord,
        rng: &mut R,
    ) -> Option<ScatterResult> {
        let reflected = utils::reflect(&ray_in.dir.normalize(), &hit_record.normal);
        let direction = if self.fuzz > 0.0 {
            reflected + self.fuzz * utils::random_in_unit_sphere(rng)
        } else {
            reflected
        };
        if direction.dot(&hit_record.normal) <= 0.0 {
            return None;
        }
        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(hit_record.p, direction, ray_in.time),
        })
    }
}

/// Metal Config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetalConfig {
    pub albedo: SerdeVector,
    #[serde(default)]
    pub fuzz: f64,
}

/// A Dielectric is a refractive material, such as glass
#[derive(Debug, Clone, PartialEq)]
pub struct Dielectric {
    ir: f64,
}
impl Dielectric {
    pub fn new(ir: f64) -> Self {
        Self { ir }
    }

    pub fn from_config(config: DielectricConfig) -> Self {
        Self::new(config.ir)
    }

    fn reflectance(cosine: f64, ref_idx: f64) -> f64 {
        // Use Schlick's approximation for reflectance
        let r0 = ((1.0 - ref_idx) / (1.0 + ref_idx)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}
impl Scatterable for Dielectric {
    fn try_scatter<R: Rng + ?Sized>(
        &self,
        ray_in: &Ray,
        hit_record: &HitRecord,
        rng: &mut R,
    ) -> Option<ScatterResult> {
        let attenuation = Color::new(1.0, 1.0, 1.0);
        let refraction_ratio = if hit_record.front_face {
            1.0 / self.ir
        } else {
            self.ir
        };

        let unit_direction = ray_in.dir.normalize();
        let cos_theta = (-unit_direction).dot(&hit_record.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta.powi(2)).max(0.0).sqrt();

        let cannot_refract = refraction_ratio * sin_theta > 1.0;

        let direction = if cannot_refract
            || Self::reflectance(cos_theta, refraction_ratio) > rng.gen::<f64>()
        {
            utils::reflect(&unit_direction, &hit_record.normal)
        } else {
            utils::refract(&unit_direction, &hit_record.normal, refraction_ratio)
        };

        let scattered = Ray::new(hit_record.p, direction, ray_in.time);
        Some(ScatterResult {
            attenuation,
            scattered,
        })
    }
}

/// Dielectric Config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DielectricConfig {
    pub ir: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Point, Vec3};
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    fn record<'a>(material: &'a Material, ray: &Ray, outward_normal: Vec3) -> HitRecord<'a> {
        HitRecord::new(Point::zeros(), 1.0, ray, &outward_normal, material)
    }

    #[test]
    fn test_lambertian_always_scatters_with_albedo() {
        let albedo = Color::new(0.2, 0.4, 0.6);
        let material = Material::lambertian(albedo);
        let ray = Ray::new(Point::new(0.0, 1.0, 0.0), Vec3::new(0.2, -1.0, 0.0), 0.25);
        let hr = record(&material, &ray, Vec3::new(0.0, 1.0, 0.0));
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let sr = material.scatter(&ray, &hr, &mut rng).unwrap();
            assert_eq!(sr.attenuation, albedo);
            assert_eq!(sr.scattered.time, 0.25);
            assert!(!utils::near_zero(&sr.scattered.dir));
        }
    }

    /// Replays a fixed cycle of words
    struct FixedRng {
        words: Vec<u64>,
        next: usize,
    }
    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            (self.next_u64() >> 32) as u32
        }

        fn next_u64(&mut self) -> u64 {
            let word = self.words[self.next % self.words.len()];
            self.next += 1;
            word
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for chunk in dest.chunks_mut(8) {
                let bytes = self.next_u64().to_le_bytes();
                chunk.copy_from_slice(&bytes[..chunk.len()]);
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    #[test]
    fn test_lambertian_cancelled_direction_falls_back_to_normal() {
        // gen_range(-1.0..1.0) maps the top mantissa bit to 0.0 and the next one to -0.5,
        // so the unit sphere sample is (0, -0.5, 0) and normalizes to exactly -normal
        const ZERO: u64 = 1 << 63;
        const MINUS_HALF: u64 = 1 << 62;
        let mut rng = FixedRng {
            words: vec![ZERO, MINUS_HALF, ZERO],
            next: 0,
        };
        assert_eq!(
            utils::random_unit_vector(&mut rng),
            Vec3::new(0.0, -1.0, 0.0)
        );

        let material = Material::lambertian(Color::new(0.3, 0.3, 0.3));
        let ray = Ray::new(Point::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0), 0.5);
        let hr = record(&material, &ray, Vec3::new(0.0, 1.0, 0.0));
        for _ in 0..3 {
            let sr = material.scatter(&ray, &hr, &mut rng).unwrap();
            assert_eq!(sr.scattered.dir, hr.normal);
            assert_eq!(sr.scattered.orig, hr.p);
            assert_eq!(sr.scattered.time, 0.5);
        }
    }

    #[test]
    fn test_polished_metal_draws_no_randomness() {
        let material = Material::metal(Color::new(0.9, 0.9, 0.9), 0.0);
        let ray = Ray::new(Point::new(0.0, 1.0, 0.0), Vec3::new(0.5, -1.0, 0.0), 0.0);
        let hr = record(&material, &ray, Vec3::new(0.0, 1.0, 0.0));
        let mut rng = StdRng::seed_from_u64(12);
        material.scatter(&ray, &hr, &mut rng).unwrap();
        assert_eq!(rng.next_u64(), StdRng::seed_from_u64(12).next_u64());
    }

    #[test]
    fn test_metal_fuzz_is_clamped() {
        assert_eq!(Metal::new(Color::zeros(), 3.0).fuzz(), 1.0);
        assert_eq!(Metal::new(Color::zeros(), -0.5).fuzz(), 0.0);
        assert_eq!(Metal::new(Color::zeros(), 0.3).fuzz(), 0.3);
    }

    #[test]
    fn test_polished_metal_is_mirror() {
        let material = Material::metal(Color::new(0.8, 0.8, 0.8), 0.0);
        let dir = Vec3::new(1.0, -2.0, 0.5);
        let ray = Ray::new(Point::new(-1.0, 2.0, -0.5), dir, 0.0);
        let hr = record(&material, &ray, Vec3::new(0.0, 1.0, 0.0));
        let mut rng = StdRng::seed_from_u64(5);
        let sr = material.scatter(&ray, &hr, &mut rng).unwrap();

        let unit = dir.normalize();
        let expected = Vec3::new(unit[0], -unit[1], unit[2]);
        assert!((sr.scattered.dir - expected).norm() < 1e-12);
        assert_eq!(sr.attenuation, Color::new(0.8, 0.8, 0.8));
    }

    #[test]
    fn test_metal_absorbs_rays_scattered_below_surface() {
        let material = Material::metal(Color::new(1.0, 1.0, 1.0), 0.0);
        // Grazing ray from inside the surface side reflects into the surface
        let ray = Ray::new(Point::zeros(), Vec3::new(1.0, 0.0, 0.0), 0.0);
        let hr = record(&material, &ray, Vec3::new(0.0, 1.0, 0.0));
        let mut rng = StdRng::seed_from_u64(5);
        assert!(material.scatter(&ray, &hr, &mut rng).is_none());
    }

    #[test]
    fn test_matched_dielectric_passes_straight_through() {
        let material = Material::dielectric(1.0);
        let mut rng = StdRng::seed_from_u64(9);
        for dir in [Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.1, -1.0, 0.2)] {
            for normal in [Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0)] {
                let ray = Ray::new(Point::new(0.0, 1.0, 0.0), dir, 0.0);
                let hr = record(&material, &ray, normal);
                let sr = material.scatter(&ray, &hr, &mut rng).unwrap();
                assert!((sr.scattered.dir - dir.normalize()).norm() < 1e-9);
                assert_eq!(sr.attenuation, Color::new(1.0, 1.0, 1.0));
            }
        }
    }

    #[test]
    fn test_total_internal_reflection() {
        let material = Material::dielectric(1.5);
        // Leaving glass at a shallow angle to the surface
        let dir = Vec3::new(1.0, 0.3, 0.0);
        let ray = Ray::new(Point::zeros(), dir, 0.0);
        // Outward normal points along the ray, so the record is a back face
        let hr = record(&material, &ray, Vec3::new(0.0, 1.0, 0.0));
        assert!(!hr.front_face);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let sr = material.scatter(&ray, &hr, &mut rng).unwrap();
            let unit = dir.normalize();
            let expected = Vec3::new(unit[0], -unit[1], unit[2]);
            assert!((sr.scattered.dir - expected).norm() < 1e-12);
        }
    }

    #[test]
    fn test_scatter_deterministic_with_seed() {
        let material = Material::metal(Color::new(0.5, 0.5, 0.5), 0.7);
        let ray = Ray::new(Point::new(0.0, 1.0, 0.0), Vec3::new(0.3, -1.0, 0.0), 0.0);
        let hr = record(&material, &ray, Vec3::new(0.0, 1.0, 0.0));
        let a = material.scatter(&ray, &hr, &mut StdRng::seed_from_u64(3));
        let b = material.scatter(&ray, &hr, &mut StdRng::seed_from_u64(3));
        assert_eq!(a.map(|s| s.scattered.dir), b.map(|s| s.scattered.dir));
    }

    #[test]
    fn test_material_config() {
        let cfg: MaterialConfig =
            serde_yaml::from_str("{type: Metal, albedo: [0.7, 0.6, 0.5], fuzz: 0.1}").unwrap();
        assert_eq!(
            Material::from_config(cfg),
            Material::metal(Color::new(0.7, 0.6, 0.5), 0.1)
        );
    }
}
