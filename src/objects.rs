//! Objects
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, TracerError},
    materials::Material,
    utils::SerdeVector,
    Point, Ray, Vec3,
};

pub trait Hittable {
    /// Nearest intersection with `t` strictly inside `(t_min, t_max)`
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>>;
}

/// Represents a hit
#[derive(Debug, Clone)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Point,
    /// Unit normal, always facing against the incoming ray
    pub normal: Vec3,
    /// Ray parameter of the intersection
    pub t: f64,
    /// Whether the ray hit the outside of the surface
    pub front_face: bool,
    /// Material
    pub material: &'a Material,
}
impl<'a> HitRecord<'a> {
    pub fn new(
        p: Point,
        t: f64,
        ray: &Ray,
        outward_normal: &Vec3,
        material: &'a Material,
    ) -> Self {
        let front_face = ray.dir.dot(outward_normal) < 0.0;
        let normal = if front_face {
            *outward_normal
        } else {
            -*outward_normal
        };
        Self {
            p,
            normal,
            t,
            front_face,
            material,
        }
    }
}

/// Shared quadratic solve for spheres, static or not
fn hit_sphere<'a>(
    center: Point,
    radius: f64,
    material: &'a Material,
    ray: &Ray,
    t_min: f64,
    t_max: f64,
) -> Option<HitRecord<'a>> {
    let oc = ray.orig - center;
    let a = ray.dir.norm_squared();
    let half_b = oc.dot(&ray.dir);
    let c = oc.norm_squared() - radius.powi(2);
    let discriminant = half_b.powi(2) - a * c;
    if discriminant < 0.0 {
        return None;
    }

    // Find the nearest root that lies in the acceptable range
    let sqrtd = discriminant.sqrt();
    let in_range = |root: f64| t_min < root && root < t_max;
    let mut root = (-half_b - sqrtd) / a;
    if !in_range(root) {
        root = (-half_b + sqrtd) / a;
        if !in_range(root) {
            return None;
        }
    }

    let p = ray.get(root);
    let outward_normal = (p - center) / radius;
    Some(HitRecord::new(p, root, ray, &outward_normal, material))
}

#[derive(Debug, Clone)]
pub struct Sphere {
    pub center: Point,
    pub radius: f64,
    pub material: Arc<Material>,
}
impl Sphere {
    pub fn new(center: Point, radius: f64, material: Arc<Material>) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }
}
impl Hittable for Sphere {
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        hit_sphere(self.center, self.radius, &self.material, ray, t_min, t_max)
    }
}

/// Moving Sphere
///
/// The center travels in a straight line, passing `initial_center` at `initial_time` and
/// `final_center` at `final_time`.
#[derive(Debug, Clone)]
pub struct MovingSphere {
    initial_center: Point,
    final_center: Point,
    initial_time: f64,
    final_time: f64,
    radius: f64,
    material: Arc<Material>,
}
impl MovingSphere {
    pub fn new(
        initial_center: Point,
        final_center: Point,
        initial_time: f64,
        final_time: f64,
        radius: f64,
        material: Arc<Material>,
    ) -> Result<Self> {
        if initial_time == final_time || !initial_time.is_finite() || !final_time.is_finite() {
            return Err(TracerError::DegenerateTimeInterval {
                time0: initial_time,
                time1: final_time,
            });
        }
        Ok(Self {
            initial_center,
            final_center,
            initial_time,
            final_time,
            radius,
            material,
        })
    }

    pub fn center(&self, time: f64) -> Point {
        self.initial_center
            + ((time - self.initial_time) / (self.final_time - self.initial_time))
                * (self.final_center - self.initial_center)
    }
}
impl Hittable for MovingSphere {
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        hit_sphere(
            self.center(ray.time),
            self.radius,
            &self.material,
            ray,
            t_min,
            t_max,
        )
    }
}

/// Every primitive the tracer can intersect
#[derive(Debug, Clone)]
pub enum Object {
    Sphere(Sphere),
    MovingSphere(MovingSphere),
}
impl Hittable for Object {
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        match self {
            Object::Sphere(s) => s.try_hit(ray, t_min, t_max),
            Object::MovingSphere(s) => s.try_hit(ray, t_min, t_max),
        }
    }
}
impl Object {
    pub fn material(&self) -> &Arc<Material> {
        match self {
            Object::Sphere(s) => &s.material,
            Object::MovingSphere(s) => &s.material,
        }
    }
}
impl From<Sphere> for Object {
    fn from(value: Sphere) -> Self {
        Object::Sphere(value)
    }
}
impl From<MovingSphere> for Object {
    fn from(value: MovingSphere) -> Self {
        Object::MovingSphere(value)
    }
}

/// Flat, unordered collection of objects
#[derive(Debug, Clone, Default)]
pub struct HittableList(pub Vec<Object>);
impl HittableList {
    pub fn add(&mut self, obj: Object) {
        self.0.push(obj)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
impl Hittable for HittableList {
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let mut closest_so_far = t_max;
        let mut hr_final = None;

        for obj in &self.0 {
            if let Some(hr) = obj.try_hit(ray, t_min, closest_so_far) {
                closest_so_far = hr.t;
                hr_final = Some(hr)
            }
        }
        hr_final
    }
}

/// Object config, materials are referenced by name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectConfig {
    Sphere(SphereConfig),
    MovingSphere(MovingSphereConfig),
}

/// Sphere config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SphereConfig {
    pub center: SerdeVector,
    pub radius: f64,
    pub material: String,
}

/// Moving sphere config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovingSphereConfig {
    pub center0: SerdeVector,
    pub center1: SerdeVector,
    pub time0: f64,
    pub time1: f64,
    pub radius: f64,
    pub material: String,
}

impl Object {
    /// Build an object, looking up its material with `lookup`
    pub fn from_config<F>(config: ObjectConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<Arc<Material>>,
    {
        let find =
            |name: &str| lookup(name).ok_or_else(|| TracerError::UnknownMaterial(name.into()));
        Ok(match config {
            ObjectConfig::Sphere(c) => {
                Sphere::new(c.center.into(), c.radius, find(&c.material)?).into()
            }
            ObjectConfig::MovingSphere(c) => MovingSphere::new(
                c.center0.into(),
                c.center1.into(),
                c.time0,
                c.time1,
                c.radius,
                find(&c.material)?,
            )?
            .into(),
        })
    }
}
