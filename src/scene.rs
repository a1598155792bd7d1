//! Scene orchestration
//!
//! One generation run owns a fresh `SeededRandom`, the `GradientNoise` built
//! from it and a transparent `Canvas`, then runs the fixed layer pipeline.
//! Nothing is shared between runs, so a preview and an export of the same
//! seed can be produced independently (and concurrently).

use crate::canvas::{Canvas, PixelBuffer};
use crate::layers::{
    AtmosphericDust, Background, DrawContext, Embers, Explosion, Layer, Smoke, Terrain,
};
use crate::noise::GradientNoise;
use crate::util::SeededRandom;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Compositing order. Later layers paint over earlier ones.
pub const LAYERS: [&dyn Layer; 6] = [
    &Background,
    &Explosion,
    &Smoke,
    &Embers,
    &Terrain,
    &AtmosphericDust,
];

/// Points recorded along the horizon in `Landmarks::horizon`
pub const HORIZON_SAMPLES: usize = 33;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("invalid dimensions {width}x{height}: both must be positive")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("could not allocate a {width}x{height} drawing surface")]
    SurfaceUnavailable { width: u32, height: u32 },

    #[error("generation cancelled after {completed_layers} layers")]
    Cancelled { completed_layers: usize },
}

/// One fireball, relative to the canvas: x and radius as fractions of the
/// width, y as a fraction of the height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fireball {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

/// Structural features of a generated scene, independent of resolution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmarks {
    pub fireballs: Vec<Fireball>,
    /// Relative horizon y at `HORIZON_SAMPLES` evenly spaced columns
    pub horizon: Vec<f64>,
    pub smoke_layers: usize,
    pub embers: usize,
    pub structures: usize,
    pub dust: usize,
}

impl Landmarks {
    /// The largest fireball
    pub fn dominant_fireball(&self) -> Option<&Fireball> {
        self.fireballs
            .iter()
            .max_by(|a, b| a.radius.total_cmp(&b.radius))
    }

    /// Mean relative horizon height
    pub fn mean_horizon(&self) -> Option<f64> {
        if self.horizon.is_empty() {
            return None;
        }
        Some(self.horizon.iter().sum::<f64>() / self.horizon.len() as f64)
    }
}

/// Result of one generation run
#[derive(Debug, Clone)]
pub struct Rendering {
    pub seed: u32,
    pub image: PixelBuffer,
    pub landmarks: Landmarks,
}

/// Cooperative cancellation flag, checked between layers
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Generate the scene for `seed` at `width` x `height` and return its pixels
pub fn generate(width: i32, height: i32, seed: u32) -> Result<PixelBuffer, SceneError> {
    render(width, height, seed).map(|r| r.image)
}

/// Generate the scene and its landmarks
pub fn render(width: i32, height: i32, seed: u32) -> Result<Rendering, SceneError> {
    render_cancellable(width, height, seed, &CancelToken::new())
}

/// Generate the scene, giving up between layers once `cancel` is set.
/// A cancelled run never hands out its partially composited canvas.
pub fn render_cancellable(
    width: i32,
    height: i32,
    seed: u32,
    cancel: &CancelToken,
) -> Result<Rendering, SceneError> {
    render_layers(width, height, seed, &LAYERS, cancel)
}

/// Run `layers` in order on a fresh canvas
pub(crate) fn render_layers(
    width: i32,
    height: i32,
    seed: u32,
    layers: &[&dyn Layer],
    cancel: &CancelToken,
) -> Result<Rendering, SceneError> {
    if width <= 0 || height <= 0 {
        return Err(SceneError::InvalidDimensions { width, height });
    }
    let (w, h) = (width as u32, height as u32);
    let started = Instant::now();

    let mut canvas =
        Canvas::new(w, h).ok_or(SceneError::SurfaceUnavailable { width: w, height: h })?;
    let mut random = SeededRandom::new(seed);
    let noise = GradientNoise::new(&mut random);
    let mut landmarks = Landmarks::default();
    canvas.clear();

    let mut ctx = DrawContext {
        canvas: &mut canvas,
        width: f64::from(w),
        height: f64::from(h),
        random: &mut random,
        noise: &noise,
        landmarks: &mut landmarks,
    };

    for (completed_layers, layer) in layers.iter().enumerate() {
        if cancel.is_cancelled() {
            warn!(seed, completed_layers, "generation cancelled");
            return Err(SceneError::Cancelled { completed_layers });
        }
        let layer_started = Instant::now();
        layer.paint(&mut ctx);
        debug!(
            layer = layer.name(),
            elapsed_ms = layer_started.elapsed().as_secs_f64() * 1000.0,
            "layer composited"
        );
    }

    info!(
        seed,
        width = w,
        height = h,
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "scene generated"
    );
    Ok(Rendering {
        seed,
        image: canvas.into_buffer(),
        landmarks,
    })
}
