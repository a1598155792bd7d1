//! Image export
//!
//! Writes a rendered scene to disk as JPEG or PNG, plus a JSON sidecar with
//! the scene landmarks. `ExportJob` runs a full export on a worker thread so
//! an interactive preview keeps running while the large render completes.

use crate::canvas::PixelBuffer;
use crate::config::RenderConfig;
use crate::scene::{render_cancellable, CancelToken, Landmarks, SceneError};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("export i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encoding: {0}")]
    Image(#[from] image::ImageError),

    #[error("landmarks sidecar: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported output format for {0}")]
    UnsupportedFormat(PathBuf),

    #[error("export worker exited without reporting")]
    JobLost,
}

/// File format, picked from the output path's extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }
}

/// Name of the exported image for `seed`
pub fn export_file_name(seed: u32) -> String {
    format!("war-scene-{seed}.jpg")
}

/// Name of the landmarks sidecar for `seed`
pub fn sidecar_file_name(seed: u32) -> String {
    format!("war-scene-{seed}.json")
}

/// Encode as baseline JPEG. The buffer is always opaque, so alpha is dropped.
pub fn write_jpeg(image: &PixelBuffer, path: &Path, quality: u8) -> Result<(), ExportError> {
    let rgb: Vec<u8> = image
        .as_bytes()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    let writer = BufWriter::new(File::create(path)?);
    JpegEncoder::new_with_quality(writer, quality.clamp(1, 100)).write_image(
        &rgb,
        image.width(),
        image.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(())
}

pub fn write_png(image: &PixelBuffer, path: &Path) -> Result<(), ExportError> {
    let writer = BufWriter::new(File::create(path)?);
    PngEncoder::new(writer).write_image(
        image.as_bytes(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(())
}

/// Write `image` to `path`, choosing the encoder from the extension
pub fn write_image(image: &PixelBuffer, path: &Path, jpeg_quality: u8) -> Result<(), ExportError> {
    match ImageFormat::from_path(path) {
        Some(ImageFormat::Jpeg) => write_jpeg(image, path, jpeg_quality),
        Some(ImageFormat::Png) => write_png(image, path),
        None => Err(ExportError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Contents of the JSON sidecar
#[derive(Debug, Serialize)]
struct Sidecar<'a> {
    seed: u32,
    width: u32,
    height: u32,
    landmarks: &'a Landmarks,
}

/// Files produced by one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub seed: u32,
    pub width: u32,
    pub height: u32,
    pub image_path: PathBuf,
    pub sidecar_path: PathBuf,
}

/// Render `seed` at the configured export resolution and write
/// `war-scene-<seed>.jpg` and its sidecar into `output_dir`
pub fn export_scene(config: &RenderConfig, seed: u32) -> Result<ExportOutcome, ExportError> {
    export_scene_cancellable(config, seed, &CancelToken::new())
}

pub fn export_scene_cancellable(
    config: &RenderConfig,
    seed: u32,
    cancel: &CancelToken,
) -> Result<ExportOutcome, ExportError> {
    let started = Instant::now();
    let width = i32::try_from(config.export_width).unwrap_or(i32::MAX);
    let height = i32::try_from(config.export_height).unwrap_or(i32::MAX);
    let rendering = render_cancellable(width, height, seed, cancel)?;

    fs::create_dir_all(&config.output_dir)?;
    let image_path = config.output_dir.join(export_file_name(seed));
    let sidecar_path = config.output_dir.join(sidecar_file_name(seed));

    write_jpeg(&rendering.image, &image_path, config.jpeg_quality)?;
    let sidecar = Sidecar {
        seed,
        width: rendering.image.width(),
        height: rendering.image.height(),
        landmarks: &rendering.landmarks,
    };
    fs::write(&sidecar_path, serde_json::to_string_pretty(&sidecar)?)?;

    info!(
        seed,
        path = %image_path.display(),
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "export written"
    );
    Ok(ExportOutcome {
        seed,
        width: rendering.image.width(),
        height: rendering.image.height(),
        image_path,
        sidecar_path,
    })
}

/// Export running on a worker thread
pub struct ExportJob {
    seed: u32,
    cancel: CancelToken,
    receiver: Receiver<Result<ExportOutcome, ExportError>>,
    _worker: thread::JoinHandle<()>,
}

impl ExportJob {
    pub fn spawn(config: RenderConfig, seed: u32) -> Result<Self, ExportError> {
        Self::spawn_with_token(config, seed, CancelToken::new())
    }

    /// Spawn with a caller-provided token, e.g. one shared by several jobs
    pub fn spawn_with_token(
        config: RenderConfig,
        seed: u32,
        cancel: CancelToken,
    ) -> Result<Self, ExportError> {
        let (sender, receiver) = mpsc::channel();
        let token = cancel.clone();
        let worker = thread::Builder::new()
            .name(format!("export-{seed}"))
            .spawn(move || {
                let result = export_scene_cancellable(&config, seed, &token);
                if let Err(e) = &result {
                    warn!(seed, error = %e, "export failed");
                }
                // Receiver may already be gone if the job was dropped
                let _ = sender.send(result);
            })?;

        Ok(Self {
            seed,
            cancel,
            receiver,
            _worker: worker,
        })
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Ask the worker to stop at the next layer boundary
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Result of the job if it has finished (non-blocking)
    pub fn poll(&self) -> Option<Result<ExportOutcome, ExportError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ExportError::JobLost)),
        }
    }

    /// Block until the job finishes
    pub fn wait(self) -> Result<ExportOutcome, ExportError> {
        self.receiver.recv().map_err(|_| ExportError::JobLost)?
    }
}
