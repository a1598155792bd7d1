//! Deterministic, seed-driven war scene generator
//!
//! A scene is a pure function of `(width, height, seed)`: one run owns a
//! mulberry32 stream, a Perlin noise field shuffled from it and a software
//! canvas, and composites six layers in a fixed order.
//!
//! ```no_run
//! let image = warscene::generate(1920, 1080, 42)?;
//! assert_eq!(image.as_bytes().len(), 1920 * 1080 * 4);
//! # Ok::<(), warscene::scene::SceneError>(())
//! ```

pub mod canvas;
pub mod config;
#[cfg(feature = "preview")]
pub mod display;
pub mod export;
pub mod geometry;
pub mod layers;
pub mod noise;
pub mod scene;
pub mod util;

pub use canvas::PixelBuffer;
pub use scene::{generate, render, Landmarks, Rendering, SceneError};
