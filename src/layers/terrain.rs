use super::palette::{GROUND, HAZE, WRECKAGE};
use super::{DrawContext, Layer};
use crate::canvas::{BlendMode, Gradient, Paint, Path};
use crate::noise::GradientNoise;
use crate::scene::HORIZON_SAMPLES;

const HORIZON: f64 = 0.68;
const HORIZON_RELIEF: f64 = 0.18;
const HORIZON_FREQUENCY: f64 = 0.003;
/// Fixed noise row for the horizon profile
const HORIZON_ROW: f64 = 20.0;
const HORIZON_STEPS: usize = 240;

/// Wreckage outline as (x, y) fractions of its footprint; y is height above
/// the base. The five top points get individual jitter.
const WRECKAGE_OUTLINE: [(f64, f64); 7] = [
    (-0.5, 0.0),
    (-0.45, 0.55),
    (-0.2, 0.8),
    (0.0, 0.6),
    (0.15, 1.0),
    (0.4, 0.45),
    (0.5, 0.0),
];

/// Ground silhouette, ruined structures and a glowing haze on the horizon
pub struct Terrain;

impl Terrain {
    /// Horizon y in pixels for a column given in reference-frame units
    fn horizon_y(noise: &GradientNoise, x_reference: f64, h: f64) -> f64 {
        let n = noise.sample(x_reference * HORIZON_FREQUENCY, HORIZON_ROW);
        h * HORIZON - (n - 0.5) * HORIZON_RELIEF * h
    }

    fn ground(ctx: &mut DrawContext<'_>) {
        let (w, h) = (ctx.width, ctx.height);
        let mut path = Path::new();
        path.move_to(0.0, h);
        for step in 0..=HORIZON_STEPS {
            let x = w * step as f64 / HORIZON_STEPS as f64;
            path.line_to(x, Self::horizon_y(ctx.noise, ctx.reference(x), h));
        }
        path.line_to(w, h).close();
        ctx.canvas.fill_path(&path, &Paint::Solid(GROUND));

        let profile = (0..HORIZON_SAMPLES)
            .map(|i| {
                let x = w * i as f64 / (HORIZON_SAMPLES - 1) as f64;
                Self::horizon_y(ctx.noise, ctx.reference(x), h) / h
            })
            .collect();
        ctx.landmarks.horizon = profile;
    }

    fn structures(ctx: &mut DrawContext<'_>) {
        let (w, h) = (ctx.width, ctx.height);
        let count = 12 + (ctx.random() * 6.0).floor() as usize;
        let spacing = w / count as f64;

        for i in 0..count {
            let x = spacing * (i as f64 + 0.5) + (ctx.random() - 0.5) * spacing * 0.6;
            let base = Self::horizon_y(ctx.noise, ctx.reference(x), h) + ctx.random() * 0.02 * h;
            let footprint = w * (0.02 + ctx.random() * 0.04);
            let height = h * (0.03 + ctx.random() * 0.09);
            let stretch = 0.7 + ctx.random() * 0.6;

            let last = WRECKAGE_OUTLINE.len() - 1;
            let mut path = Path::new();
            for (k, &(fx, fy)) in WRECKAGE_OUTLINE.iter().enumerate() {
                let y = if k == 0 || k == last {
                    // Base sinks slightly below the ground line
                    h * 0.01
                } else {
                    -fy * height * (0.75 + ctx.random() * 0.5)
                };
                if k == 0 {
                    path.move_to(fx * footprint, y);
                } else {
                    path.line_to(fx * footprint, y);
                }
            }
            path.close();

            ctx.canvas.save();
            ctx.canvas.translate(x, base);
            ctx.canvas.scale(1.0, stretch);
            ctx.canvas.fill_path(&path, &Paint::Solid(WRECKAGE));
            ctx.canvas.restore();
        }
        ctx.landmarks.structures = count;
    }

    fn haze(ctx: &mut DrawContext<'_>) {
        let (w, h) = (ctx.width, ctx.height);
        let top = h * (HORIZON - 0.1);
        let bottom = h * (HORIZON + 0.1);
        let band = Gradient::new()
            .stop(0.0, HAZE.with_alpha(0.0))
            .stop(0.5, HAZE.with_alpha(0.16))
            .stop(1.0, HAZE.with_alpha(0.0));

        ctx.canvas.save();
        ctx.canvas.set_blend_mode(BlendMode::Lighter);
        ctx.canvas.fill_rect(
            0.0,
            top,
            w,
            bottom - top,
            &Paint::linear(0.0, top, 0.0, bottom, band),
        );
        ctx.canvas.restore();
    }
}

impl Layer for Terrain {
    fn name(&self) -> &'static str {
        "terrain"
    }

    fn paint(&self, ctx: &mut DrawContext<'_>) {
        Self::ground(ctx);
        Self::structures(ctx);
        Self::haze(ctx);
    }
}
