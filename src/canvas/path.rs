//! Path construction and flattening
//!
//! Paths are recorded in user space and flattened to polylines when filled,
//! so arcs can be tessellated for the transform in effect at fill time.

use crate::geometry::{Transform, Vec2};
use std::f64::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Segment {
    MoveTo(Vec2),
    LineTo(Vec2),
    Arc {
        center: Vec2,
        radius: f64,
        start: f64,
        end: f64,
    },
    Close,
}

/// A sequence of closed or open subpaths. Open subpaths are closed
/// implicitly when filled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.segments.push(Segment::MoveTo(Vec2::new(x, y)));
        self
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.segments.push(Segment::LineTo(Vec2::new(x, y)));
        self
    }

    /// Clockwise arc (screen space) from `start` to `end` radians. Like a
    /// canvas arc, it connects to the current point with a straight line.
    pub fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64) -> &mut Self {
        self.segments.push(Segment::Arc {
            center: Vec2::new(cx, cy),
            radius: radius.max(0.0),
            start,
            end,
        });
        self
    }

    /// Full circle as its own subpath
    pub fn circle(&mut self, cx: f64, cy: f64, radius: f64) -> &mut Self {
        self.move_to(cx + radius, cy);
        self.arc(cx, cy, radius, 0.0, TAU);
        self.close()
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> &mut Self {
        self.move_to(x, y)
            .line_to(x + w, y)
            .line_to(x + w, y + h)
            .line_to(x, y + h)
            .close()
    }

    pub fn close(&mut self) -> &mut Self {
        self.segments.push(Segment::Close);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Flatten to device-space polygons under `transform`.
    /// Subpaths with fewer than three points are dropped.
    pub fn flatten(&self, transform: &Transform) -> Vec<Vec<Vec2>> {
        let mut polygons = Vec::new();
        let mut current: Vec<Vec2> = Vec::new();
        let scale = transform.mean_scale();

        let mut finish = |poly: &mut Vec<Vec2>| {
            if poly.len() >= 3 {
                polygons.push(std::mem::take(poly));
            } else {
                poly.clear();
            }
        };

        for segment in &self.segments {
            match *segment {
                Segment::MoveTo(p) => {
                    finish(&mut current);
                    current.push(transform.apply(p));
                },
                Segment::LineTo(p) => current.push(transform.apply(p)),
                Segment::Arc {
                    center,
                    radius,
                    start,
                    end,
                } => {
                    let sweep = end - start;
                    let steps = arc_steps(sweep, radius * scale);
                    for i in 0..=steps {
                        let angle = start + sweep * (i as f64 / steps as f64);
                        let p = Vec2::new(
                            center.x + radius * angle.cos(),
                            center.y + radius * angle.sin(),
                        );
                        current.push(transform.apply(p));
                    }
                },
                Segment::Close => {
                    // Canvas semantics: the next segment starts where this subpath began
                    let first = current.first().copied();
                    finish(&mut current);
                    if let Some(first) = first {
                        current.push(first);
                    }
                },
            }
        }
        finish(&mut current);
        polygons
    }
}

/// Number of chords for an arc; keeps the chord error well under a pixel
fn arc_steps(sweep: f64, device_radius: f64) -> usize {
    let n = (sweep.abs() * device_radius.max(1.0).sqrt() * 1.5).ceil();
    (n as usize).clamp(8, 2048)
}
