use super::palette::{FIRE_GLOW, SKY_HIGH, SKY_HORIZON, SKY_LOW, SKY_ZENITH};
use super::{DrawContext, Layer};
use crate::canvas::{Gradient, Paint};

/// Fraction of the height covered by the ground-level fire glow
const GLOW_BAND: f64 = 0.45;

/// Night sky over a burning horizon
pub struct Background;

impl Layer for Background {
    fn name(&self) -> &'static str {
        "background"
    }

    fn paint(&self, ctx: &mut DrawContext<'_>) {
        let (w, h) = (ctx.width, ctx.height);

        let sky = Gradient::new()
            .stop(0.0, SKY_ZENITH)
            .stop(0.35, SKY_HIGH)
            .stop(0.7, SKY_LOW)
            .stop(1.0, SKY_HORIZON);
        ctx.canvas
            .fill_rect(0.0, 0.0, w, h, &Paint::linear(0.0, 0.0, 0.0, h, sky));

        let top = h * (1.0 - GLOW_BAND);
        let glow = Gradient::new()
            .stop(0.0, FIRE_GLOW.with_alpha(0.0))
            .stop(0.5, FIRE_GLOW.with_alpha(0.18))
            .stop(1.0, FIRE_GLOW.with_alpha(0.35));
        ctx.canvas
            .fill_rect(0.0, top, w, h - top, &Paint::linear(0.0, top, 0.0, h, glow));
    }
}
