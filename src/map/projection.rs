/// Axis-aligned bounds of district geometry in map units (EPSG:5179
/// meters, northing increasing upward).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    pub fn extend(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn merge(&mut self, other: &Bounds) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Projection that fits planar map-unit geometry into a pixel viewport,
/// preserving aspect ratio and centering the slack axis. Y is reflected:
/// map northing grows up, screen rows grow down.
#[derive(Clone, Debug)]
pub struct FitProjection {
    bounds: Bounds,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    pub width: usize,
    pub height: usize,
}

impl FitProjection {
    /// Fit `bounds` into a `width x height` pixel viewport with a pixel
    /// margin on every side.
    pub fn fit(bounds: Bounds, width: usize, height: usize, margin: usize) -> Self {
        let inner_w = (width.saturating_sub(margin * 2)).max(1) as f64;
        let inner_h = (height.saturating_sub(margin * 2)).max(1) as f64;

        let scale_x = inner_w / bounds.width().max(f64::EPSILON);
        let scale_y = inner_h / bounds.height().max(f64::EPSILON);
        let scale = scale_x.min(scale_y);

        // Center the axis with slack
        let offset_x = margin as f64 + (inner_w - bounds.width() * scale) / 2.0;
        let offset_y = margin as f64 + (inner_h - bounds.height() * scale) / 2.0;

        Self {
            bounds,
            scale,
            offset_x,
            offset_y,
            width,
            height,
        }
    }

    /// Project a map-unit coordinate to pixel coordinates.
    pub fn project(&self, x: f64, y: f64) -> (i32, i32) {
        let px = (x - self.bounds.min_x) * self.scale + self.offset_x;
        let py = (self.bounds.max_y - y) * self.scale + self.offset_y;
        (px.round() as i32, py.round() as i32)
    }

    /// Invert a pixel coordinate back to map units (for hit testing).
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let x = (px as f64 - self.offset_x) / self.scale + self.bounds.min_x;
        let y = self.bounds.max_y - (py as f64 - self.offset_y) / self.scale;
        (x, y)
    }

    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= 0 && px < self.width as i32 && py >= 0 && py < self.height as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Bounds {
        let mut b = Bounds::empty();
        b.extend(100.0, 200.0);
        b.extend(300.0, 400.0);
        b
    }

    #[test]
    fn test_fit_corners() {
        let proj = FitProjection::fit(square(), 100, 100, 0);
        // Min x / max y is the top-left corner after Y reflection
        assert_eq!(proj.project(100.0, 400.0), (0, 0));
        assert_eq!(proj.project(300.0, 200.0), (100, 100));
    }

    #[test]
    fn test_round_trip() {
        let proj = FitProjection::fit(square(), 200, 120, 4);
        let (px, py) = proj.project(170.0, 310.0);
        let (x, y) = proj.unproject(px, py);
        assert!((x - 170.0).abs() < 2.0);
        assert!((y - 310.0).abs() < 2.0);
    }

    #[test]
    fn test_aspect_preserved() {
        // A wide viewport must not stretch the square horizontally
        let proj = FitProjection::fit(square(), 400, 100, 0);
        let (left, _) = proj.project(100.0, 300.0);
        let (right, _) = proj.project(300.0, 300.0);
        let (_, top) = proj.project(200.0, 400.0);
        let (_, bottom) = proj.project(200.0, 200.0);
        assert_eq!(right - left, bottom - top);
    }

    #[test]
    fn test_bounds_extend() {
        let mut b = Bounds::empty();
        b.extend(5.0, -3.0);
        b.extend(-2.0, 7.0);
        assert_eq!(b.width(), 7.0);
        assert_eq!(b.height(), 10.0);
        assert!(b.contains(0.0, 0.0));
        assert!(!b.contains(6.0, 0.0));
    }
}
