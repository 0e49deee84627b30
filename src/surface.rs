//! Drawable surface the camera renders into.

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const BLUE: Self = Self::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Darkens every channel by `amount`, stopping at 0.
    pub fn darken(self, amount: u8) -> Self {
        Self::new(
            self.r.saturating_sub(amount),
            self.g.saturating_sub(amount),
            self.b.saturating_sub(amount),
        )
    }

    /// 0RGB packing expected by softbuffer.
    #[inline]
    pub fn pack(self) -> u32 {
        // BGRA8 in little-endian memory, alpha at 0
        (self.b as u32) | ((self.g as u32) << 8) | ((self.r as u32) << 16)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

pub trait Surface {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    /// Paints the whole surface.
    fn fill(&mut self, color: Rgb);

    /// Paints a `w` x `h` rectangle at `(x, y)`, clipped to the surface.
    fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgb);
}

/// Row-major packed pixel buffer.
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    /// Reallocates only when the size actually changes.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.pixels = vec![0; width * height];
        }
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }
}

/// Clips the span `[start, start + len)` to `[0, limit)`.
fn clip_span(start: i32, len: u32, limit: usize) -> Option<(usize, usize)> {
    let lo = i64::from(start).max(0);
    let hi = (i64::from(start) + i64::from(len)).min(limit as i64);
    (lo < hi).then(|| (lo as usize, hi as usize))
}

impl Surface for FrameBuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn fill(&mut self, color: Rgb) {
        self.pixels.fill(color.pack());
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgb) {
        let (Some((x0, x1)), Some((y0, y1))) =
            (clip_span(x, w, self.width), clip_span(y, h, self.height))
        else {
            return;
        };

        let packed = color.pack();
        for row in y0..y1 {
            let start = row * self.width;
            self.pixels[start + x0..start + x1].fill(packed);
        }
    }
}
