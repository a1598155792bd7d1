use super::palette::DUST;
use super::{DrawContext, Layer};
use crate::canvas::Paint;

/// Grains per pixel of canvas width
const DENSITY: f64 = 3.6;
/// Largest grain edge in reference-frame pixels
const MAX_SIZE: f64 = 2.0;

/// Fine warm grain over the whole frame
pub struct AtmosphericDust;

impl Layer for AtmosphericDust {
    fn name(&self) -> &'static str {
        "atmospheric-dust"
    }

    fn paint(&self, ctx: &mut DrawContext<'_>) {
        let (w, h) = (ctx.width, ctx.height);
        let scale = ctx.scale();
        let count = (w * DENSITY).floor() as usize;
        let grain = Paint::Solid(DUST);

        for _ in 0..count {
            let x = ctx.random() * w;
            let y = ctx.random() * h;
            let size = ctx.random() * MAX_SIZE * scale;
            let alpha = 0.02 + ctx.random() * 0.04;
            ctx.canvas.save();
            ctx.canvas.set_global_alpha(alpha as f32);
            ctx.canvas.fill_rect(x, y, size, size, &grain);
            ctx.canvas.restore();
        }
        ctx.landmarks.dust = count;
    }
}
