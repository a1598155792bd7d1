use super::palette::{DEEP_RED, ORANGE, SOOT_RED, WHITE_HOT, YELLOW_HOT};
use super::{DrawContext, Layer};
use crate::canvas::{Gradient, Paint, Path};
use crate::scene::Fireball;

/// Overlapping radial fireballs near the lower middle of the frame
pub struct Explosion;

impl Explosion {
    fn fireball_gradient() -> Gradient {
        Gradient::new()
            .stop(0.0, WHITE_HOT)
            .stop(0.15, YELLOW_HOT.with_alpha(0.95))
            .stop(0.4, ORANGE.with_alpha(0.85))
            .stop(0.7, DEEP_RED.with_alpha(0.45))
            .stop(1.0, SOOT_RED.with_alpha(0.0))
    }
}

impl Layer for Explosion {
    fn name(&self) -> &'static str {
        "explosion"
    }

    fn paint(&self, ctx: &mut DrawContext<'_>) {
        let (w, h) = (ctx.width, ctx.height);
        let count = 3 + (ctx.random() * 2.0).floor() as usize;

        for _ in 0..count {
            let cx = w * (0.38 + ctx.random() * 0.24);
            let cy = h * (0.62 + ctx.random() * 0.06);
            let radius = w * (0.12 + ctx.random() * 0.08);

            let mut path = Path::new();
            path.circle(cx, cy, radius);
            let paint = Paint::radial(cx, cy, 0.0, radius, Self::fireball_gradient());
            ctx.canvas.fill_path(&path, &paint);

            ctx.landmarks.fireballs.push(Fireball {
                x: cx / w,
                y: cy / h,
                radius: radius / w,
            });
        }
    }
}
