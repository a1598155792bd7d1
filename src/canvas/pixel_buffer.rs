// ============================================================================
// Blend Mode
// ============================================================================

/// Compositing operator used when a fill lands on the buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlendMode {
    /// Standard source-over alpha compositing
    #[default]
    SourceOver,
    /// Additive ("lighter"): premultiplied src + dst, saturating
    Lighter,
}

// ============================================================================
// Utility Functions
// ============================================================================

/// Quantize a 0..255 float channel
#[inline]
fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Composite a straight-alpha source color onto a straight-alpha RGBA pixel.
/// `src` holds r, g, b in 0..255 and alpha in 0..1 (coverage already applied).
#[inline]
fn composite_pixel(dest: &mut [u8], src: [f32; 4], mode: BlendMode) {
    let sa = src[3];
    if sa <= 0.0 {
        return;
    }
    let da = f32::from(dest[3]) / 255.0;

    let (out_a, premul) = match mode {
        BlendMode::SourceOver => {
            let keep = da * (1.0 - sa);
            let out_a = sa + keep;
            (
                out_a,
                [
                    src[0] * sa + f32::from(dest[0]) * keep,
                    src[1] * sa + f32::from(dest[1]) * keep,
                    src[2] * sa + f32::from(dest[2]) * keep,
                ],
            )
        },
        BlendMode::Lighter => (
            (sa + da).min(1.0),
            [
                (src[0] * sa + f32::from(dest[0]) * da).min(255.0),
                (src[1] * sa + f32::from(dest[1]) * da).min(255.0),
                (src[2] * sa + f32::from(dest[2]) * da).min(255.0),
            ],
        ),
    };

    if out_a <= 0.0 {
        dest.copy_from_slice(&[0, 0, 0, 0]);
        return;
    }
    dest[0] = to_u8(premul[0] / out_a);
    dest[1] = to_u8(premul[1] / out_a);
    dest[2] = to_u8(premul[2] / out_a);
    dest[3] = to_u8(out_a * 255.0);
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// RGBA8 raster with straight (non-premultiplied) alpha, row-major,
/// byte order R, G, B, A. This is the output artifact of a generation run.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Largest surface handed out, 16384 x 16384 pixels. Overcommitting
/// allocators accept far larger reservations and fail only on first touch.
pub const MAX_PIXELS: u64 = 16_384 * 16_384;

impl PixelBuffer {
    /// Allocate a fully transparent buffer. Returns None above `MAX_PIXELS`,
    /// when the byte size overflows or when the allocator refuses the request.
    pub fn try_with_size(width: u32, height: u32) -> Option<Self> {
        if u64::from(width) * u64::from(height) > MAX_PIXELS {
            return None;
        }
        let len = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len).ok()?;
        pixels.resize(len, 0);
        Some(Self {
            pixels,
            width,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check if coordinates are within bounds
    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Calculate byte offset for pixel at (x, y)
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Clear to a solid color with custom alpha
    #[cfg(test)]
    fn clear_rgba(&mut self, r: u8, g: u8, b: u8, a: u8) {
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[r, g, b, a]);
        }
    }

    /// Clear to fully transparent black
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Read all 4 channels of a pixel (bounds checked)
    /// Returns (r, g, b, a) or None if out of bounds
    #[inline]
    pub fn get_pixel_rgba(&self, x: i32, y: i32) -> Option<(u8, u8, u8, u8)> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            Some((
                self.pixels[idx],
                self.pixels[idx + 1],
                self.pixels[idx + 2],
                self.pixels[idx + 3],
            ))
        } else {
            None
        }
    }

    /// Composite one pixel. `src` is straight RGB in 0..255 plus alpha in 0..1.
    #[cfg(test)]
    fn blend_pixel(&mut self, x: i32, y: i32, src: [f32; 4], mode: BlendMode) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            composite_pixel(&mut self.pixels[idx..idx + 4], src, mode);
        }
    }

    /// Composite a horizontal run starting at (x, y), one source color per pixel.
    /// The caller guarantees the run lies inside the buffer.
    pub(crate) fn blend_run(
        &mut self,
        x: u32,
        y: u32,
        colors: impl Iterator<Item = [f32; 4]>,
        mode: BlendMode,
    ) {
        let mut idx = self.pixel_index(x, y);
        for src in colors {
            composite_pixel(&mut self.pixels[idx..idx + 4], src, mode);
            idx += 4;
        }
    }

    /// One row of raw RGBA bytes
    pub fn row(&self, y: u32) -> &[u8] {
        let start = self.pixel_index(0, y);
        &self.pixels[start..start + self.width as usize * 4]
    }

    /// Raw RGBA bytes (for texture upload and image encoding)
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(w: u32, h: u32) -> PixelBuffer {
        PixelBuffer::try_with_size(w, h).unwrap()
    }

    #[test]
    fn test_new_buffer_is_transparent() {
        let buf = buffer(4, 3);
        assert_eq!(buf.as_bytes().len(), 4 * 3 * 4);
        assert!(buf.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_oversized_allocation_fails() {
        assert!(PixelBuffer::try_with_size(u32::MAX, u32::MAX).is_none());
        assert!(PixelBuffer::try_with_size(16_385, 16_384).is_none());
        assert!(PixelBuffer::try_with_size(1, 300_000_000).is_none());
    }

    #[test]
    fn test_export_sizes_fit_under_limit() {
        assert!(7680 * 4320 <= MAX_PIXELS);
        assert!(PixelBuffer::try_with_size(16_384, 1).is_some());
    }

    #[test]
    fn test_source_over_opaque_replaces() {
        let mut buf = buffer(2, 2);
        buf.clear_rgba(10, 20, 30, 255);
        buf.blend_pixel(1, 1, [200.0, 100.0, 50.0, 1.0], BlendMode::SourceOver);
        assert_eq!(buf.get_pixel_rgba(1, 1), Some((200, 100, 50, 255)));
        assert_eq!(buf.get_pixel_rgba(0, 0), Some((10, 20, 30, 255)));
    }

    #[test]
    fn test_source_over_half_alpha() {
        let mut buf = buffer(1, 1);
        buf.clear_rgba(0, 0, 0, 255);
        buf.blend_pixel(0, 0, [200.0, 100.0, 50.0, 0.5], BlendMode::SourceOver);
        assert_eq!(buf.get_pixel_rgba(0, 0), Some((100, 50, 25, 255)));
    }

    #[test]
    fn test_source_over_on_transparent_keeps_color() {
        let mut buf = buffer(1, 1);
        buf.blend_pixel(0, 0, [200.0, 100.0, 50.0, 0.5], BlendMode::SourceOver);
        assert_eq!(buf.get_pixel_rgba(0, 0), Some((200, 100, 50, 128)));
    }

    #[test]
    fn test_lighter_adds_and_saturates() {
        let mut buf = buffer(2, 1);
        buf.clear_rgba(100, 100, 100, 255);
        buf.blend_pixel(0, 0, [50.0, 200.0, 0.0, 1.0], BlendMode::Lighter);
        buf.blend_pixel(1, 0, [100.0, 100.0, 100.0, 0.5], BlendMode::Lighter);
        assert_eq!(buf.get_pixel_rgba(0, 0), Some((150, 255, 100, 255)));
        assert_eq!(buf.get_pixel_rgba(1, 0), Some((150, 150, 150, 255)));
    }

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let mut buf = buffer(2, 2);
        buf.blend_pixel(-1, 0, [255.0, 0.0, 0.0, 1.0], BlendMode::SourceOver);
        buf.blend_pixel(0, 2, [255.0, 0.0, 0.0, 1.0], BlendMode::SourceOver);
        assert!(buf.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(buf.get_pixel_rgba(2, 0), None);
    }

    #[test]
    fn test_row_slices() {
        let mut buf = buffer(3, 2);
        buf.blend_pixel(2, 1, [9.0, 8.0, 7.0, 1.0], BlendMode::SourceOver);
        assert_eq!(buf.row(1).len(), 12);
        assert_eq!(&buf.row(1)[8..12], &[9, 8, 7, 255]);
        assert!(buf.row(0).iter().all(|&b| b == 0));
    }
}
