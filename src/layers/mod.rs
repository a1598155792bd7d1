mod background;
mod dust;
mod embers;
mod explosion;
mod smoke;
mod terrain;

pub use background::Background;
pub use dust::AtmosphericDust;
pub use embers::Embers;
pub use explosion::Explosion;
pub use smoke::Smoke;
pub use terrain::Terrain;

use crate::canvas::Canvas;
use crate::noise::GradientNoise;
use crate::scene::Landmarks;
use crate::util::SeededRandom;

/// Canvas width at which the noise frequencies and pixel sizes are tuned
pub const REFERENCE_WIDTH: f64 = 1920.0;

/// Shared resources of one generation run, handed to every layer in turn
pub struct DrawContext<'a> {
    pub canvas: &'a mut Canvas,
    pub width: f64,
    pub height: f64,
    pub random: &'a mut SeededRandom,
    pub noise: &'a GradientNoise,
    pub landmarks: &'a mut Landmarks,
}

impl DrawContext<'_> {
    /// Canvas size relative to the reference frame
    #[inline]
    pub fn scale(&self) -> f64 {
        self.width / REFERENCE_WIDTH
    }

    /// Convert a pixel coordinate to reference-frame units
    #[inline]
    pub fn reference(&self, v: f64) -> f64 {
        v / self.scale()
    }

    /// Next draw from the run's random stream
    #[inline]
    pub fn random(&mut self) -> f64 {
        self.random.next_f64()
    }
}

/// One compositing pass of the scene
pub trait Layer: Sync {
    /// Layer name for logging
    fn name(&self) -> &'static str;

    /// Paint onto the shared canvas, consuming randomness in a fixed order
    fn paint(&self, ctx: &mut DrawContext<'_>);
}

/// Run `f` against a fresh context: transparent canvas, stream seeded with
/// `seed` and the noise field built from it, as a generation run sets up
#[cfg(test)]
pub(crate) fn with_context<R>(
    width: u32,
    height: u32,
    seed: u32,
    f: impl FnOnce(&mut DrawContext<'_>) -> R,
) -> R {
    let mut canvas = Canvas::new(width, height).unwrap();
    let mut random = SeededRandom::new(seed);
    let noise = GradientNoise::new(&mut random);
    let mut landmarks = Landmarks::default();
    let mut ctx = DrawContext {
        canvas: &mut canvas,
        width: f64::from(width),
        height: f64::from(height),
        random: &mut random,
        noise: &noise,
        landmarks: &mut landmarks,
    };
    f(&mut ctx)
}

/// Scene palette
pub mod palette {
    use crate::canvas::Color;

    pub const SKY_ZENITH: Color = Color::rgb(6, 8, 20);
    pub const SKY_HIGH: Color = Color::rgb(22, 20, 38);
    pub const SKY_LOW: Color = Color::rgb(70, 34, 30);
    pub const SKY_HORIZON: Color = Color::rgb(122, 54, 22);

    pub const FIRE_GLOW: Color = Color::rgb(255, 96, 24);

    pub const WHITE_HOT: Color = Color::rgb(255, 250, 232);
    pub const YELLOW_HOT: Color = Color::rgb(255, 214, 120);
    pub const ORANGE: Color = Color::rgb(255, 138, 28);
    pub const DEEP_RED: Color = Color::rgb(196, 48, 12);
    pub const SOOT_RED: Color = Color::rgb(90, 20, 10);

    pub const SMOKE_HIGH: (u8, u8, u8) = (30, 26, 30);
    pub const SMOKE_LOW: (u8, u8, u8) = (62, 40, 32);

    pub const EMBER_CORE: Color = Color::rgb(255, 214, 90);
    pub const EMBER_MID: Color = Color::rgb(255, 140, 40);
    pub const EMBER_TAIL: Color = Color::rgb(200, 60, 10);

    pub const GROUND: Color = Color::rgb(10, 8, 10);
    pub const WRECKAGE: Color = Color::rgb(14, 10, 11);
    pub const HAZE: Color = Color::rgb(255, 112, 40);

    pub const DUST: Color = Color::rgb(255, 196, 148);
}
