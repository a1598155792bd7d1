//! Gradient Noise
//!
//! Classic 2D Perlin noise over a shuffled permutation table. The table is
//! built once per generation run from the run's `SeededRandom`, so the field
//! is fully determined by the seed.

use crate::util::{lerp, SeededRandom};

/// Quintic smoothstep (Ken Perlin's improved fade): 6t⁵ - 15t⁴ + 10t³
/// Zero first and second derivatives at the lattice points.
#[inline]
pub fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Gradient contribution of a lattice corner at offset (x, y).
/// Hashes 0 and 1 keep the axes as (x, y), 2 and 3 swap them to (y, x);
/// bit 0 negates the first term and bit 1 the second.
#[inline]
fn grad(hash: u8, x: f64, y: f64) -> f64 {
    let h = hash & 3;
    let (u, v) = if h < 2 { (x, y) } else { (y, x) };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

/// Largest value strictly below 1.0; the upper bound of `sample`
const BELOW_ONE: f64 = 1.0 - f64::EPSILON;

/// 2D Perlin noise field. Immutable after construction.
#[derive(Clone)]
pub struct GradientNoise {
    perm: [u8; 512],
}

impl GradientNoise {
    /// Build the permutation table with a Fisher–Yates shuffle driven by `random`.
    /// Consumes exactly 255 draws from the stream.
    pub fn new(random: &mut SeededRandom) -> Self {
        let mut base = [0u8; 256];
        for (i, slot) in base.iter_mut().enumerate() {
            *slot = i as u8;
        }
        for i in (1..256).rev() {
            let j = random.index(i + 1);
            base.swap(i, j);
        }

        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = base[i & 255];
        }
        Self { perm }
    }

    /// The 256-entry base permutation
    pub fn permutation(&self) -> &[u8] {
        &self.perm[..256]
    }

    /// Sample the field at (x, y). Returns a value in [0.0, 1.0).
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let fx = x.floor();
        let fy = y.floor();
        let xi = (fx as i64 & 255) as usize;
        let yi = (fy as i64 & 255) as usize;
        let xf = x - fx;
        let yf = y - fy;

        let u = fade(xf);
        let v = fade(yf);

        let p = &self.perm;
        let aa = p[p[xi] as usize + yi];
        let ab = p[p[xi] as usize + yi + 1];
        let ba = p[p[xi + 1] as usize + yi];
        let bb = p[p[xi + 1] as usize + yi + 1];

        let x1 = lerp(grad(aa, xf, yf), grad(ba, xf - 1.0, yf), u);
        let x2 = lerp(grad(ab, xf, yf - 1.0), grad(bb, xf - 1.0, yf - 1.0), u);
        let value = lerp(x1, x2, v);

        ((value + 1.0) / 2.0).clamp(0.0, BELOW_ONE)
    }
}
