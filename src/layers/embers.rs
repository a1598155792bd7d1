use super::palette::{EMBER_CORE, EMBER_MID, EMBER_TAIL};
use super::{DrawContext, Layer};
use crate::canvas::{Gradient, Paint};
use std::f64::consts::FRAC_PI_2;

/// Candidates per pixel of canvas width
const DENSITY: f64 = 0.7;
/// Candidates in noise valleys below this are dropped
const NOISE_THRESHOLD: f64 = 0.45;
const NOISE_FREQUENCY: f64 = 0.03;

/// One ember streak in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spark {
    x: f64,
    y: f64,
    length: f64,
    thickness: f64,
    angle: f64,
}

/// Glowing sparks clustered in bright noise regions above the ground
pub struct Embers;

impl Embers {
    fn candidates(width: f64) -> usize {
        (width * DENSITY).floor() as usize
    }

    fn streak() -> Gradient {
        Gradient::new()
            .stop(0.0, EMBER_CORE)
            .stop(0.35, EMBER_MID.with_alpha(0.85))
            .stop(1.0, EMBER_TAIL.with_alpha(0.0))
    }

    fn heat(ctx: &DrawContext<'_>, x: f64, y: f64) -> f64 {
        ctx.noise.sample(
            ctx.reference(x) * NOISE_FREQUENCY,
            ctx.reference(y) * NOISE_FREQUENCY,
        )
    }

    /// Draw candidate positions and keep those over bright noise. Rejected
    /// candidates consume only their two position draws.
    fn scatter(ctx: &mut DrawContext<'_>) -> Vec<Spark> {
        let (w, h) = (ctx.width, ctx.height);
        let scale = ctx.scale();
        let mut sparks = Vec::new();

        for _ in 0..Self::candidates(w) {
            let x = ctx.random() * w;
            let y = h * (0.4 + ctx.random() * 0.45);
            if Self::heat(ctx, x, y) < NOISE_THRESHOLD {
                continue;
            }

            let length = (3.0 + ctx.random() * 9.0) * scale;
            let thickness = (1.2 + ctx.random() * 1.2) * scale;
            // Mostly upward, drifting with the heat
            let angle = -FRAC_PI_2 + (ctx.random() - 0.5) * 1.2;
            sparks.push(Spark {
                x,
                y,
                length,
                thickness,
                angle,
            });
        }
        sparks
    }
}

impl Layer for Embers {
    fn name(&self) -> &'static str {
        "embers"
    }

    fn paint(&self, ctx: &mut DrawContext<'_>) {
        let sparks = Self::scatter(ctx);
        for spark in &sparks {
            ctx.canvas.save();
            ctx.canvas.translate(spark.x, spark.y);
            ctx.canvas.rotate(spark.angle);
            let paint = Paint::linear(0.0, 0.0, spark.length, 0.0, Self::streak());
            ctx.canvas.fill_rect(
                0.0,
                -spark.thickness / 2.0,
                spark.length,
                spark.thickness,
                &paint,
            );
            ctx.canvas.restore();
        }
        ctx.landmarks.embers = sparks.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::with_context;

    #[test]
    fn test_sparks_sit_over_bright_noise() {
        with_context(640, 360, 77, |ctx| {
            let sparks = Embers::scatter(ctx);
            assert!(!sparks.is_empty());
            assert!(sparks.len() < Embers::candidates(ctx.width));
            for s in &sparks {
                assert!(Embers::heat(ctx, s.x, s.y) >= NOISE_THRESHOLD);
                assert!(s.y >= ctx.height * 0.4 && s.y < ctx.height * 0.85);
            }
        });
    }

    #[test]
    fn test_spark_size_scales_with_width() {
        with_context(960, 540, 3, |ctx| {
            for s in Embers::scatter(ctx) {
                assert!((1.5..6.0).contains(&s.length), "length {}", s.length);
                assert!((0.6..1.2).contains(&s.thickness), "thickness {}", s.thickness);
            }
        });
    }

    #[test]
    fn test_paint_records_survivors() {
        let landmarks = with_context(640, 360, 77, |ctx| {
            Embers.paint(ctx);
            ctx.landmarks.clone()
        });
        let expected = with_context(640, 360, 77, |ctx| Embers::scatter(ctx).len());
        assert_eq!(landmarks.embers, expected);
    }
}
