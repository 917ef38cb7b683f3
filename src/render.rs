//! Rendering: turning a scene into an image of averaged linear colors
//!
//! Rows are traced in parallel on the rayon pool. Each row owns its random number generator
//! and its pixel buffer, so the shared scene is only ever read.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    cameras::Camera,
    error::{Result, TracerError},
    objects::HittableList,
    ray_color, Color,
};

/// Numeric parameters of a render
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    pub width: usize,
    pub aspect_ratio: f64,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
}
impl RenderSettings {
    pub fn new(
        width: usize,
        aspect_ratio: f64,
        samples_per_pixel: u32,
        max_depth: u32,
    ) -> Result<Self> {
        let settings = Self {
            width,
            aspect_ratio,
            samples_per_pixel,
            max_depth,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check the settings describe a renderable image
    pub fn validate(&self) -> Result<()> {
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(TracerError::InvalidImage(format!(
                "aspect ratio must be positive, got {}",
                self.aspect_ratio
            )));
        }
        if self.width < 2 || self.height() < 2 {
            return Err(TracerError::InvalidImage(format!(
                "image must be at least 2x2, got {}x{}",
                self.width,
                self.height()
            )));
        }
        if self.samples_per_pixel == 0 {
            return Err(TracerError::InvalidImage(
                "need at least one sample per pixel".into(),
            ));
        }
        Ok(())
    }

    pub fn height(&self) -> usize {
        (self.width as f64 / self.aspect_ratio).round() as usize
    }
}
impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 400,
            aspect_ratio: 16.0 / 9.0,
            samples_per_pixel: 50,
            max_depth: 50,
        }
    }
}

/// Averaged linear colors, row-major with the top row first
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
}
impl RenderedImage {
    pub fn pixel(&self, x: usize, y: usize) -> Color {
        self.pixels[y * self.width + x]
    }
}

pub struct Renderer {
    settings: RenderSettings,
    seed: Option<u64>,
    cancel: Arc<AtomicBool>,
    show_progress: bool,
}
impl Renderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            seed: None,
            cancel: Arc::new(AtomicBool::new(false)),
            show_progress: false,
        }
    }

    /// Seed every row's generator from `seed`, making the render reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Token that stops the render when set
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Trace one jittered sample through pixel `(i, j)`, `j` counted from the bottom row
    pub fn sample<R: Rng + ?Sized>(
        &self,
        camera: &Camera,
        world: &HittableList,
        i: usize,
        j: usize,
        rng: &mut R,
    ) -> Color {
        let width = self.settings.width;
        let height = self.settings.height();
        let u = (i as f64 + rng.gen::<f64>()) / (width - 1) as f64;
        let v = (j as f64 + rng.gen::<f64>()) / (height - 1) as f64;
        let ray = camera.get_ray(u, v, rng);
        ray_color(&ray, world, self.settings.max_depth, rng)
    }

    fn row_rng(&self, row: usize) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(row as u64)),
            None => StdRng::from_entropy(),
        }
    }

    /// Render a row, `row` counted from the top
    fn render_row(&self, camera: &Camera, world: &HittableList, row: usize) -> Result<Vec<Color>> {
        let width = self.settings.width;
        let j = self.settings.height() - 1 - row;
        let mut rng = self.row_rng(row);
        let scale = 1.0 / self.settings.samples_per_pixel as f64;

        let mut pixels = Vec::with_capacity(width);
        for i in 0..width {
            if self.cancel.load(Ordering::Relaxed) {
                return Err(TracerError::Cancelled);
            }
            let sum = (0..self.settings.samples_per_pixel)
                .map(|_| self.sample(camera, world, i, j, &mut rng))
                .fold(Color::zeros(), |acc, c| acc + c);
            pixels.push(sum * scale);
        }
        Ok(pixels)
    }

    fn progress_bar(&self, rows: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(rows as u64);
        let template = "{elapsed_precise} [{bar:40}] {pos}/{len} rows";
        if let Ok(style) = ProgressStyle::with_template(template) {
            bar.set_style(style);
        }
        bar
    }

    pub fn render(&self, world: &HittableList, camera: &Camera) -> Result<RenderedImage> {
        self.settings.validate()?;
        let width = self.settings.width;
        let height = self.settings.height();
        info!(
            "Rendering {width}x{height}, {} samples per pixel, max depth {}",
            self.settings.samples_per_pixel, self.settings.max_depth
        );
        debug!("Scene has {} objects", world.len());

        let start = Instant::now();
        let bar = self.progress_bar(height);
        let rows: Result<Vec<Vec<Color>>> = (0..height)
            .into_par_iter()
            .map(|row| {
                let pixels = self.render_row(camera, world, row);
                bar.inc(1);
                pixels
            })
            .collect();

        let rows = match rows {
            Ok(rows) => rows,
            Err(e) => {
                bar.abandon();
                warn!("Render stopped: {e}");
                return Err(e);
            }
        };
        bar.finish();
        info!("Render finished in {:.2?}", start.elapsed());

        Ok(RenderedImage {
            width,
            height,
            pixels: rows.into_iter().flatten().collect(),
        })
    }
}
