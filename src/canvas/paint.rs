//! Fill styles: solid colors and multi-stop gradients

use crate::geometry::Vec2;

/// Straight-alpha color: 8-bit RGB plus alpha in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0.0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    #[inline]
    fn to_array(self) -> [f32; 4] {
        [
            f32::from(self.r),
            f32::from(self.g),
            f32::from(self.b),
            self.a.clamp(0.0, 1.0),
        ]
    }
}

/// A color stop at `offset` in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Color,
}

/// Ordered list of color stops, sampled with linear interpolation and
/// clamped to the first/last stop outside their range
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gradient {
    stops: Vec<ColorStop>,
}

impl Gradient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style stop insertion. Stops keep insertion order for equal offsets.
    pub fn stop(mut self, offset: f32, color: Color) -> Self {
        let offset = offset.clamp(0.0, 1.0);
        let at = self.stops.partition_point(|s| s.offset <= offset);
        self.stops.insert(at, ColorStop { offset, color });
        self
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Color at parameter `t`, as straight RGB (0..255) + alpha (0..1)
    pub fn sample(&self, t: f32) -> [f32; 4] {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return Color::TRANSPARENT.to_array();
        };
        if t <= first.offset {
            return first.color.to_array();
        }
        if t >= last.offset {
            return last.color.to_array();
        }
        let next = self.stops.partition_point(|s| s.offset <= t);
        let lo = self.stops[next - 1];
        let hi = self.stops[next];
        let span = hi.offset - lo.offset;
        let k = if span > 0.0 { (t - lo.offset) / span } else { 1.0 };
        let a = lo.color.to_array();
        let b = hi.color.to_array();
        [
            a[0] + (b[0] - a[0]) * k,
            a[1] + (b[1] - a[1]) * k,
            a[2] + (b[2] - a[2]) * k,
            a[3] + (b[3] - a[3]) * k,
        ]
    }
}

/// Linear gradient along the segment `start` → `end` (user space)
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub start: Vec2,
    pub end: Vec2,
    pub gradient: Gradient,
}

/// Concentric radial gradient: offset 0 at `inner` radius, 1 at `outer`
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub center: Vec2,
    pub inner: f64,
    pub outer: f64,
    pub gradient: Gradient,
}

/// Fill style for `Canvas::fill_path` / `Canvas::fill_rect`
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    Linear(LinearGradient),
    Radial(RadialGradient),
}

impl Paint {
    pub fn linear(x0: f64, y0: f64, x1: f64, y1: f64, gradient: Gradient) -> Self {
        Self::Linear(LinearGradient {
            start: Vec2::new(x0, y0),
            end: Vec2::new(x1, y1),
            gradient,
        })
    }

    pub fn radial(cx: f64, cy: f64, inner: f64, outer: f64, gradient: Gradient) -> Self {
        Self::Radial(RadialGradient {
            center: Vec2::new(cx, cy),
            inner,
            outer,
            gradient,
        })
    }

    /// Color at a user-space point
    pub fn color_at(&self, p: Vec2) -> [f32; 4] {
        match self {
            Self::Solid(color) => color.to_array(),
            Self::Linear(lin) => {
                let axis = lin.end - lin.start;
                let len_sq = axis.dot(axis);
                if len_sq <= f64::EPSILON {
                    // Degenerate gradients paint nothing
                    return Color::TRANSPARENT.to_array();
                }
                let t = (p - lin.start).dot(axis) / len_sq;
                lin.gradient.sample(t as f32)
            },
            Self::Radial(rad) => {
                let span = rad.outer - rad.inner;
                if span <= f64::EPSILON {
                    return Color::TRANSPARENT.to_array();
                }
                let t = ((p - rad.center).length() - rad.inner) / span;
                rad.gradient.sample(t as f32)
            },
        }
    }

    /// Solid paints need no per-pixel evaluation
    pub fn solid_color(&self) -> Option<[f32; 4]> {
        match self {
            Self::Solid(color) => Some(color.to_array()),
            _ => None,
        }
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Self::Solid(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Gradient {
        Gradient::new()
            .stop(0.0, Color::rgb(0, 0, 0))
            .stop(1.0, Color::rgba(200, 100, 50, 0.0))
    }

    #[test]
    fn test_gradient_endpoints_and_midpoint() {
        let g = ramp();
        assert_eq!(g.sample(-1.0), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(g.sample(2.0), [200.0, 100.0, 50.0, 0.0]);
        assert_eq!(g.sample(0.5), [100.0, 50.0, 25.0, 0.5]);
    }

    #[test]
    fn test_stops_are_sorted() {
        let g = Gradient::new()
            .stop(1.0, Color::rgb(255, 255, 255))
            .stop(0.0, Color::rgb(0, 0, 0))
            .stop(0.5, Color::rgb(10, 10, 10));
        let offsets: Vec<f32> = g.stops().iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_empty_gradient_is_transparent() {
        assert_eq!(Gradient::new().sample(0.3)[3], 0.0);
    }

    #[test]
    fn test_linear_projection() {
        let paint = Paint::linear(0.0, 10.0, 0.0, 20.0, ramp());
        assert_eq!(paint.color_at(Vec2::new(99.0, 15.0)), [100.0, 50.0, 25.0, 0.5]);
        assert_eq!(paint.color_at(Vec2::new(0.0, 0.0))[3], 1.0);
    }

    #[test]
    fn test_radial_distance() {
        let paint = Paint::radial(5.0, 5.0, 0.0, 10.0, ramp());
        assert_eq!(paint.color_at(Vec2::new(5.0, 5.0))[3], 1.0);
        assert_eq!(paint.color_at(Vec2::new(11.0, 13.0))[3], 0.0);
        assert_eq!(paint.color_at(Vec2::new(5.0, 10.0)), [100.0, 50.0, 25.0, 0.5]);
    }

    #[test]
    fn test_degenerate_linear_is_transparent() {
        let paint = Paint::linear(3.0, 3.0, 3.0, 3.0, ramp());
        assert_eq!(paint.color_at(Vec2::new(3.0, 3.0))[3], 0.0);
    }
}
