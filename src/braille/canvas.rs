/// Braille Unicode canvas for high-resolution terminal graphics.
/// Each character cell covers a 2x4 dot grid (U+2800..U+28FF), so a
/// canvas of `width x height` characters has `width*2 x height*4`
/// addressable pixels.
pub struct BrailleCanvas {
    width: usize,   // characters
    height: usize,  // characters
    cells: Vec<u8>, // dot bitmask per character, row-major
}

/// Dot bit for a pixel within its character cell.
/// Layout per character:
/// ```text
/// (0,0) (1,0)   bits: 0x01 0x08
/// (0,1) (1,1)   bits: 0x02 0x10
/// (0,2) (1,2)   bits: 0x04 0x20
/// (0,3) (1,3)   bits: 0x40 0x80
/// ```
#[inline(always)]
fn dot_bit(x: usize, y: usize) -> u8 {
    match (x % 2, y % 4) {
        (0, 0) => 0x01,
        (1, 0) => 0x08,
        (0, 1) => 0x02,
        (1, 1) => 0x10,
        (0, 2) => 0x04,
        (1, 2) => 0x20,
        (0, 3) => 0x40,
        _ => 0x80,
    }
}

impl BrailleCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0u8; width * height],
        }
    }

    pub fn set_pixel(&mut self, x: usize, y: usize) {
        let cx = x / 2;
        let cy = y / 4;
        if cx >= self.width || cy >= self.height {
            return;
        }
        self.cells[cy * self.width + cx] |= dot_bit(x, y);
    }

    /// Set a pixel using signed coordinates (negative values ignored).
    pub fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize);
        }
    }

    /// Set every pixel of a horizontal pixel span (used by polygon fill).
    pub fn fill_span(&mut self, x0: i32, x1: i32, y: i32) {
        if y < 0 {
            return;
        }
        for x in x0.max(0)..=x1 {
            self.set_pixel(x as usize, y as usize);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&b| b == 0)
    }

    #[cfg(test)]
    pub fn pixel_set(&self, x: usize, y: usize) -> bool {
        let cx = x / 2;
        let cy = y / 4;
        cx < self.width && cy < self.height && self.cells[cy * self.width + cx] & dot_bit(x, y) != 0
    }

    fn row_to_string(&self, row: usize) -> String {
        self.cells[row * self.width..(row + 1) * self.width]
            .iter()
            .map(|&b| char::from_u32(0x2800 + b as u32).unwrap_or(' '))
            .collect()
    }

    /// Rows of Braille characters, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.height).map(|i| self.row_to_string(i))
    }

    #[cfg(test)]
    pub fn render_string(&self) -> String {
        self.rows().collect::<Vec<_>>().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pixel() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.set_pixel(0, 0);
        assert_eq!(canvas.render_string(), "⠁"); // U+2801
    }

    #[test]
    fn test_all_dots() {
        let mut canvas = BrailleCanvas::new(1, 1);
        for x in 0..2 {
            for y in 0..4 {
                canvas.set_pixel(x, y);
            }
        }
        assert_eq!(canvas.render_string(), "⣿"); // U+28FF
    }

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut canvas = BrailleCanvas::new(2, 2);
        canvas.set_pixel(100, 100);
        canvas.set_pixel_signed(-1, 0);
        assert!(canvas.is_empty());
    }

    #[test]
    fn test_fill_span() {
        let mut canvas = BrailleCanvas::new(3, 1);
        canvas.fill_span(-2, 5, 0);
        for x in 0..=5usize {
            assert!(canvas.pixel_set(x, 0));
        }
        assert!(!canvas.pixel_set(0, 1));
    }
}
