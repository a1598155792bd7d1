//! Drawing surface: a software 2D canvas over a `PixelBuffer`
//!
//! Provides the primitive set the scene layers paint with: filled paths and
//! rectangles with solid or gradient paint, source-over / additive
//! compositing, global alpha and an affine transform stack scoped by
//! `save` / `restore`.

mod paint;
mod path;
mod pixel_buffer;

pub use paint::{Color, ColorStop, Gradient, LinearGradient, Paint, RadialGradient};
pub use path::Path;
pub use pixel_buffer::{BlendMode, PixelBuffer};

use crate::geometry::{Transform, Vec2};

/// Vertical samples per pixel row used for anti-aliasing
const SUBSAMPLES: usize = 4;

/// State captured by `save` and restored by `restore`
#[derive(Debug, Clone, Copy)]
struct DrawState {
    transform: Transform,
    global_alpha: f32,
    blend: BlendMode,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Transform::IDENTITY,
            global_alpha: 1.0,
            blend: BlendMode::SourceOver,
        }
    }
}

/// Non-horizontal polygon edge, stored top to bottom
#[derive(Debug, Clone, Copy)]
struct Edge {
    x_top: f64,
    y_top: f64,
    y_bottom: f64,
    /// dx / dy
    slope: f64,
    /// +1 when the original edge pointed down, -1 when up
    winding: i32,
}

impl Edge {
    fn new(p0: Vec2, p1: Vec2) -> Option<Self> {
        if p0.y == p1.y || !p0.y.is_finite() || !p1.y.is_finite() {
            return None;
        }
        let (top, bottom, winding) = if p0.y < p1.y {
            (p0, p1, 1)
        } else {
            (p1, p0, -1)
        };
        Some(Self {
            x_top: top.x,
            y_top: top.y,
            y_bottom: bottom.y,
            slope: (bottom.x - top.x) / (bottom.y - top.y),
            winding,
        })
    }

    #[inline]
    fn x_at(&self, y: f64) -> f64 {
        self.x_top + (y - self.y_top) * self.slope
    }
}

/// Software canvas. Owns its pixel buffer exclusively.
pub struct Canvas {
    buffer: PixelBuffer,
    state: DrawState,
    stack: Vec<DrawState>,
    // Scratch buffers reused across fills
    coverage: Vec<f32>,
    crossings: Vec<(f64, i32)>,
}

impl Canvas {
    /// Create a transparent canvas. Returns None if the pixel buffer cannot
    /// be allocated.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        let buffer = PixelBuffer::try_with_size(width, height)?;
        Some(Self {
            buffer,
            state: DrawState::default(),
            stack: Vec::new(),
            coverage: Vec::new(),
            crossings: Vec::new(),
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    #[cfg(test)]
    pub(crate) fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> PixelBuffer {
        self.buffer
    }

    /// Clear every pixel to fully transparent and reset the drawing state
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = DrawState::default();
        self.stack.clear();
    }

    // ========================================================================
    // State
    // ========================================================================

    pub fn save(&mut self) {
        self.stack.push(self.state);
    }

    /// Pop the last saved state. Unbalanced restores are ignored.
    pub fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    pub fn translate(&mut self, tx: f64, ty: f64) {
        self.state.transform = self.state.transform.translate(tx, ty);
    }

    pub fn rotate(&mut self, angle: f64) {
        self.state.transform = self.state.transform.rotate(angle);
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.state.transform = self.state.transform.scale(sx, sy);
    }

    pub fn transform(&self) -> Transform {
        self.state.transform
    }

    pub fn set_global_alpha(&mut self, alpha: f32) {
        if alpha.is_finite() {
            self.state.global_alpha = alpha.clamp(0.0, 1.0);
        }
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.blend = mode;
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.state.blend
    }

    // ========================================================================
    // Fills
    // ========================================================================

    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: &Paint) {
        let mut path = Path::new();
        path.rect(x, y, w, h);
        self.fill_path(&path, paint);
    }

    /// Fill a path with the non-zero winding rule, anti-aliased
    pub fn fill_path(&mut self, path: &Path, paint: &Paint) {
        if self.state.global_alpha <= 0.0 {
            return;
        }
        let transform = self.state.transform;
        let polygons = path.flatten(&transform);
        if polygons.is_empty() {
            return;
        }
        // Gradients are evaluated in user space
        let Some(inverse) = transform.invert() else {
            return;
        };
        self.rasterize(&polygons, paint, &inverse);
    }

    /// Scanline rasterizer with an active edge list. Each pixel row is sampled
    /// at `SUBSAMPLES` heights; along a sample line, span ends contribute
    /// their exact fractional horizontal coverage.
    fn rasterize(&mut self, polygons: &[Vec<Vec2>], paint: &Paint, inverse: &Transform) {
        let width = self.buffer.width();
        let height = self.buffer.height();
        if width == 0 || height == 0 {
            return;
        }

        let mut edges: Vec<Edge> = polygons
            .iter()
            .flat_map(|poly| {
                poly.iter()
                    .zip(poly.iter().cycle().skip(1))
                    .filter_map(|(&p0, &p1)| Edge::new(p0, p1))
            })
            .collect();
        if edges.is_empty() {
            return;
        }
        edges.sort_by(|a, b| a.y_top.total_cmp(&b.y_top));

        let (mut min_x, mut max_x, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for poly in polygons {
            for p in poly {
                min_x = min_x.min(p.x);
                max_x = max_x.max(p.x);
                max_y = max_y.max(p.y);
            }
        }
        let min_y = edges[0].y_top;

        let x_start = min_x.floor().max(0.0);
        let x_end = max_x.ceil().min(f64::from(width));
        let y_start = min_y.floor().max(0.0);
        let y_end = max_y.ceil().min(f64::from(height));
        if !(x_start < x_end && y_start < y_end) {
            return;
        }
        let x_start = x_start as u32;
        let x_end = x_end as u32;
        let span = (x_end - x_start) as usize;

        let mut coverage = std::mem::take(&mut self.coverage);
        let mut crossings = std::mem::take(&mut self.crossings);
        coverage.clear();
        coverage.resize(span, 0.0);

        let solid = paint.solid_color();
        let alpha = self.state.global_alpha;
        let mode = self.state.blend;
        let weight = 1.0 / SUBSAMPLES as f32;

        let mut active: Vec<Edge> = Vec::new();
        let mut next_edge = 0;

        for py in y_start as u32..y_end as u32 {
            let mut touched = false;
            for s in 0..SUBSAMPLES {
                let sy = f64::from(py) + (s as f64 + 0.5) / SUBSAMPLES as f64;

                while next_edge < edges.len() && edges[next_edge].y_top <= sy {
                    active.push(edges[next_edge]);
                    next_edge += 1;
                }
                active.retain(|e| e.y_bottom > sy);

                crossings.clear();
                crossings.extend(
                    active
                        .iter()
                        .filter(|e| e.y_top <= sy)
                        .map(|e| (e.x_at(sy), e.winding)),
                );
                crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

                let mut winding = 0;
                let mut span_start = 0.0;
                for &(x, dir) in crossings.iter() {
                    let before = winding;
                    winding += dir;
                    if before == 0 && winding != 0 {
                        span_start = x;
                    } else if before != 0 && winding == 0 {
                        touched |= add_span(
                            &mut coverage,
                            span_start - f64::from(x_start),
                            x - f64::from(x_start),
                            weight,
                        );
                    }
                }
            }
            if !touched {
                continue;
            }

            // Composite contiguous covered runs
            let mut x = 0;
            while x < span {
                if coverage[x] <= 0.0 {
                    x += 1;
                    continue;
                }
                let run_start = x;
                while x < span && coverage[x] > 0.0 {
                    x += 1;
                }
                let row_y = f64::from(py) + 0.5;
                let colors = (run_start..x).map(|i| {
                    let cov = coverage[i].min(1.0);
                    let mut color = solid.unwrap_or_else(|| {
                        let px = f64::from(x_start) + i as f64 + 0.5;
                        paint.color_at(inverse.apply(Vec2::new(px, row_y)))
                    });
                    color[3] *= cov * alpha;
                    color
                });
                self.buffer
                    .blend_run(x_start + run_start as u32, py, colors, mode);
            }
            coverage.fill(0.0);
        }

        self.coverage = coverage;
        self.crossings = crossings;
    }
}

/// Accumulate horizontal coverage for the span [xa, xb) (pixel units relative
/// to the coverage row). Returns true if any pixel was touched.
fn add_span(coverage: &mut [f32], xa: f64, xb: f64, weight: f32) -> bool {
    let limit = coverage.len() as f64;
    let xa = xa.clamp(0.0, limit);
    let xb = xb.clamp(0.0, limit);
    if xb <= xa {
        return false;
    }
    let ia = xa.floor() as usize;
    let ib = xb.floor() as usize;
    if ia == ib {
        coverage[ia] += (xb - xa) as f32 * weight;
        return true;
    }
    coverage[ia] += (ia as f64 + 1.0 - xa) as f32 * weight;
    for c in &mut coverage[ia + 1..ib] {
        *c += weight;
    }
    if ib < coverage.len() {
        coverage[ib] += (xb - ib as f64) as f32 * weight;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas(w: u32, h: u32) -> Canvas {
        Canvas::new(w, h).unwrap()
    }

    fn pixel(c: &Canvas, x: i32, y: i32) -> (u8, u8, u8, u8) {
        c.buffer().get_pixel_rgba(x, y).unwrap()
    }

    #[test]
    fn test_pixel_aligned_rect_is_exact() {
        let mut c = canvas(8, 8);
        c.fill_rect(2.0, 2.0, 3.0, 2.0, &Color::rgb(255, 0, 0).into());
        assert_eq!(pixel(&c, 2, 2), (255, 0, 0, 255));
        assert_eq!(pixel(&c, 4, 3), (255, 0, 0, 255));
        assert_eq!(pixel(&c, 5, 3), (0, 0, 0, 0));
        assert_eq!(pixel(&c, 2, 4), (0, 0, 0, 0));
        assert_eq!(pixel(&c, 1, 2), (0, 0, 0, 0));
    }

    #[test]
    fn test_half_pixel_edge_is_antialiased() {
        let mut c = canvas(4, 1);
        c.fill_rect(0.0, 0.0, 1.5, 1.0, &Color::rgb(255, 255, 255).into());
        assert_eq!(pixel(&c, 0, 0).3, 255);
        assert_eq!(pixel(&c, 1, 0).3, 128);
        assert_eq!(pixel(&c, 2, 0).3, 0);
    }

    #[test]
    fn test_translate_and_restore() {
        let mut c = canvas(10, 10);
        let red: Paint = Color::rgb(255, 0, 0).into();
        c.save();
        c.translate(5.0, 5.0);
        c.fill_rect(0.0, 0.0, 1.0, 1.0, &red);
        c.restore();
        c.fill_rect(0.0, 0.0, 1.0, 1.0, &red);
        assert_eq!(pixel(&c, 5, 5).0, 255);
        assert_eq!(pixel(&c, 0, 0).0, 255);
        assert_eq!(pixel(&c, 1, 1).3, 0);
        assert_eq!(c.transform(), Transform::IDENTITY);
    }

    #[test]
    fn test_unbalanced_restore_is_ignored() {
        let mut c = canvas(2, 2);
        c.translate(1.0, 0.0);
        c.restore();
        assert_eq!(c.transform(), Transform::IDENTITY.translate(1.0, 0.0));
    }

    #[test]
    fn test_rotated_rect_covers_rotated_area() {
        let mut c = canvas(20, 20);
        c.translate(10.0, 10.0);
        c.rotate(std::f64::consts::FRAC_PI_2);
        // After a quarter turn, +x in user space points down the screen
        c.fill_rect(0.0, -1.0, 8.0, 2.0, &Color::rgb(0, 255, 0).into());
        assert_eq!(pixel(&c, 10, 15).1, 255);
        assert_eq!(pixel(&c, 15, 10).3, 0);
    }

    #[test]
    fn test_circle_fill() {
        let mut c = canvas(40, 40);
        let mut path = Path::new();
        path.circle(20.0, 20.0, 10.0);
        c.fill_path(&path, &Color::rgb(0, 0, 255).into());
        assert_eq!(pixel(&c, 20, 20), (0, 0, 255, 255));
        assert_eq!(pixel(&c, 20, 12).3, 255);
        assert_eq!(pixel(&c, 3, 3).3, 0);
        assert_eq!(pixel(&c, 20, 35).3, 0);
    }

    #[test]
    fn test_nonzero_winding_overlap_fills_once() {
        let mut c = canvas(10, 10);
        let mut path = Path::new();
        path.rect(0.0, 0.0, 6.0, 6.0);
        path.rect(3.0, 3.0, 6.0, 6.0);
        c.fill_path(&path, &Color::rgba(255, 255, 255, 0.5).into());
        // The overlap is inside both subpaths but is painted a single time
        assert_eq!(pixel(&c, 4, 4).3, pixel(&c, 1, 1).3);
        assert_eq!(pixel(&c, 1, 1).3, 128);
    }

    #[test]
    fn test_global_alpha_and_blend_mode() {
        let mut c = canvas(2, 1);
        c.fill_rect(0.0, 0.0, 2.0, 1.0, &Color::rgb(100, 100, 100).into());
        c.save();
        c.set_global_alpha(0.5);
        c.set_blend_mode(BlendMode::Lighter);
        c.fill_rect(0.0, 0.0, 1.0, 1.0, &Color::rgb(200, 0, 0).into());
        c.restore();
        assert_eq!(pixel(&c, 0, 0), (200, 100, 100, 255));
        assert_eq!(pixel(&c, 1, 0), (100, 100, 100, 255));
        assert_eq!(c.blend_mode(), BlendMode::SourceOver);
    }

    #[test]
    fn test_linear_gradient_follows_transform() {
        let mut c = canvas(10, 10);
        let gradient = Gradient::new()
            .stop(0.0, Color::rgb(0, 0, 0))
            .stop(1.0, Color::rgb(250, 250, 250));
        c.translate(0.0, 5.0);
        // Gradient runs along user x from 0 to 10
        c.fill_rect(0.0, 0.0, 10.0, 1.0, &Paint::linear(0.0, 0.0, 10.0, 0.0, gradient));
        let left = pixel(&c, 0, 5).0;
        let right = pixel(&c, 9, 5).0;
        assert!(left < 20, "left = {left}");
        assert!(right > 230, "right = {right}");
        assert_eq!(pixel(&c, 5, 0).3, 0);
    }

    #[test]
    fn test_clear_resets_pixels_and_state() {
        let mut c = canvas(3, 3);
        c.fill_rect(0.0, 0.0, 3.0, 3.0, &Color::rgb(1, 2, 3).into());
        c.save();
        c.scale(2.0, 2.0);
        c.clear();
        assert!(c.buffer().as_bytes().iter().all(|&b| b == 0));
        assert_eq!(c.transform(), Transform::IDENTITY);
    }

    #[test]
    fn test_offscreen_fill_is_noop() {
        let mut c = canvas(4, 4);
        c.fill_rect(-10.0, -10.0, 5.0, 5.0, &Color::rgb(255, 255, 255).into());
        c.fill_rect(10.0, 10.0, 5.0, 5.0, &Color::rgb(255, 255, 255).into());
        assert!(c.buffer().as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_add_span_partial_pixels() {
        let mut cov = vec![0.0f32; 4];
        assert!(add_span(&mut cov, 0.5, 2.25, 1.0));
        assert_eq!(cov, vec![0.5, 1.0, 0.25, 0.0]);
        assert!(!add_span(&mut cov, 3.0, 3.0, 1.0));
    }
}
