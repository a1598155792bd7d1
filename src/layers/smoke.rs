use super::palette::{SMOKE_HIGH, SMOKE_LOW};
use super::{DrawContext, Layer};
use crate::canvas::{Color, Paint, Path};
use crate::util::lerp_color;

pub const SMOKE_LAYERS: usize = 16;

/// Noise samples across the width of each smoke bank
const CURVE_STEPS: usize = 192;

/// Banks of drifting smoke; each bank is a noise-shaped curve filled down to
/// the bottom edge, fainter with depth
pub struct Smoke;

impl Smoke {
    fn opacity(layer: usize) -> f32 {
        0.25 - 0.01 * layer as f32
    }

    fn color(layer: usize) -> Color {
        let t = layer as f32 / (SMOKE_LAYERS - 1) as f32;
        let (r, g, b) = lerp_color(SMOKE_HIGH, SMOKE_LOW, t);
        Color::rgba(r, g, b, Self::opacity(layer))
    }
}

impl Layer for Smoke {
    fn name(&self) -> &'static str {
        "smoke"
    }

    fn paint(&self, ctx: &mut DrawContext<'_>) {
        let (w, h) = (ctx.width, ctx.height);

        for layer in 0..SMOKE_LAYERS {
            let offset = ctx.random() * 1000.0;
            let base = h * (0.55 + 0.012 * layer as f64);
            let row = layer as f64 * 0.25 + offset * 0.01;

            let mut path = Path::new();
            path.move_to(0.0, h);
            for step in 0..=CURVE_STEPS {
                let x = w * step as f64 / CURVE_STEPS as f64;
                let n = ctx.noise.sample(ctx.reference(x) * 0.002 + offset, row);
                path.line_to(x, base - n * 0.22 * h);
            }
            path.line_to(w, h).close();

            ctx.canvas.fill_path(&path, &Paint::Solid(Self::color(layer)));
        }
        ctx.landmarks.smoke_layers = SMOKE_LAYERS;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opacity_ramp() {
        assert!((Smoke::opacity(0) - 0.25).abs() < 1e-6);
        assert!((Smoke::opacity(15) - 0.10).abs() < 1e-6);
        for layer in 1..SMOKE_LAYERS {
            assert!(Smoke::opacity(layer) < Smoke::opacity(layer - 1));
        }
    }

    #[test]
    fn test_color_carries_opacity() {
        assert_eq!(Smoke::color(3).a, Smoke::opacity(3));
    }
}
