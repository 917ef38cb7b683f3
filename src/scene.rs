//! Scenes: a world, a camera and the settings to render them with
//!
//! Scenes are either built in code or loaded from YAML, e.g.
//!
//! ```yaml
//! image: { width: 400, aspect_ratio: 1.7778, samples_per_pixel: 50, max_depth: 50 }
//! camera: { look_from: [13, 2, 3], look_at: [0, 0, 0], v_up: [0, 1, 0],
//!           vertical_fov_deg: 20, aperture: 0.1, focus_distance: 10, time0: 0, time1: 1 }
//! materials:
//!   ground: { type: Lambertian, albedo: [0.5, 0.5, 0.5] }
//! objects:
//!   - { type: Sphere, center: [0, -1000, 0], radius: 1000, material: ground }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    cameras::{Camera, CameraConfig},
    error::Result,
    materials::{Material, MaterialConfig},
    objects::{HittableList, MovingSphere, Object, ObjectConfig, Sphere},
    render::RenderSettings,
    utils, Color, Point, Vec3,
};

/// Scene file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    pub image: RenderSettings,
    pub camera: CameraConfig,
    pub materials: BTreeMap<String, MaterialConfig>,
    pub objects: Vec<ObjectConfig>,
}

pub struct Scene {
    pub world: HittableList,
    pub camera: Camera,
    pub settings: RenderSettings,
}
impl Scene {
    pub fn from_config(config: SceneConfig) -> Result<Self> {
        config.image.validate()?;
        let materials: BTreeMap<String, Arc<Material>> = config
            .materials
            .into_iter()
            .map(|(name, cfg)| (name, Arc::new(Material::from_config(cfg))))
            .collect();

        let mut world = HittableList::default();
        for obj_cfg in config.objects {
            world.add(Object::from_config(obj_cfg, |name| {
                materials.get(name).cloned()
            })?);
        }
        debug!(
            "Loaded {} materials and {} objects",
            materials.len(),
            world.len()
        );

        Ok(Self {
            world,
            camera: Camera::from_config(config.camera, config.image.aspect_ratio)?,
            settings: config.image,
        })
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Self::from_config(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// The random field of spheres, seen by the default camera
    pub fn random<R: Rng + ?Sized>(settings: RenderSettings, rng: &mut R) -> Result<Self> {
        Ok(Self {
            world: random_scene(rng)?,
            camera: default_camera(settings.aspect_ratio)?,
            settings,
        })
    }
}

/// Looking at the origin from (13, 2, 3) with a narrow field of view
pub fn default_camera(aspect_ratio: f64) -> Result<Camera> {
    Camera::new(
        Point::new(13.0, 2.0, 3.0),
        Point::zeros(),
        Vec3::new(0.0, 1.0, 0.0),
        20.0,
        aspect_ratio,
        0.1,
        10.0,
        0.0,
        1.0,
    )
}

fn ground() -> Object {
    let ground_material = Arc::new(Material::lambertian(Color::new(0.5, 0.5, 0.5)));
    Sphere::new(Point::new(0.0, -1000.0, 0.0), 1000.0, ground_material).into()
}

/// A gray ground with one glass ball resting on it
pub fn two_sphere_scene() -> HittableList {
    let mut world = HittableList::default();
    world.add(ground());
    let glass = Arc::new(Material::dielectric(1.5));
    world.add(Sphere::new(Point::new(0.0, 1.0, 0.0), 1.0, glass).into());
    world
}

/// A grid of small random spheres around three large ones
///
/// Diffuse balls also get a bouncing twin that rises during the shutter interval.
pub fn random_scene<R: Rng + ?Sized>(rng: &mut R) -> Result<HittableList> {
    let mut world = HittableList::default();
    world.add(ground());

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat: f64 = rng.gen();
            let center = Point::new(
                a as f64 + 0.9 * rng.gen::<f64>(),
                0.2,
                b as f64 + 0.9 * rng.gen::<f64>(),
            );

            if (center - Point::new(4.0, 0.2, 0.0)).norm() <= 0.9 {
                continue;
            }

            if choose_mat < 0.8 {
                // Diffuse
                let albedo = utils::gen_random(rng, 0.0, 1.0)
                    .component_mul(&utils::gen_random(rng, 0.0, 1.0));
                let material = Arc::new(Material::lambertian(albedo));
                world.add(Sphere::new(center, 0.2, material.clone()).into());

                let center2 = center + Vec3::new(0.0, rng.gen_range(0.0..0.5), 0.0);
                world.add(MovingSphere::new(center, center2, 0.0, 1.0, 0.2, material)?.into());
            } else if choose_mat < 0.95 {
                // Metal
                let albedo = utils::gen_random(rng, 0.5, 1.0);
                let fuzz = rng.gen_range(0.0..0.5);
                let material = Arc::new(Material::metal(albedo, fuzz));
                world.add(Sphere::new(center, 0.2, material).into());
            } else {
                // Glass
                let material = Arc::new(Material::dielectric(1.5));
                world.add(Sphere::new(center, 0.2, material).into());
            }
        }
    }

    let material1 = Arc::new(Material::dielectric(1.5));
    world.add(Sphere::new(Point::new(0.0, 1.0, 0.0), 1.0, material1).into());

    let material2 = Arc::new(Material::lambertian(Color::new(0.4, 0.2, 0.1)));
    world.add(Sphere::new(Point::new(-4.0, 1.0, 0.0), 1.0, material2).into());

    let material3 = Arc::new(Material::metal(Color::new(0.7, 0.6, 0.5), 0.0));
    world.add(Sphere::new(Point::new(4.0, 1.0, 0.0), 1.0, material3).into());

    Ok(world)
}
