use crate::braille::BrailleCanvas;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Draw a closed ring outline (last vertex connected back to the first).
pub fn draw_ring(canvas: &mut BrailleCanvas, ring: &[(i32, i32)]) {
    if ring.len() < 2 {
        return;
    }
    for pair in ring.windows(2) {
        draw_line(canvas, pair[0].0, pair[0].1, pair[1].0, pair[1].1);
    }
    let first = ring[0];
    let last = ring[ring.len() - 1];
    if first != last {
        draw_line(canvas, last.0, last.1, first.0, first.1);
    }
}

/// Scanline-fill a projected polygon ring. For each pixel row, collect
/// edge crossings, sort them, and fill between alternating pairs.
pub fn fill_ring(canvas: &mut BrailleCanvas, ring: &[(i32, i32)]) {
    if ring.len() < 3 {
        return;
    }

    let min_y = ring.iter().map(|p| p.1).min().unwrap_or(0);
    let max_y = ring.iter().map(|p| p.1).max().unwrap_or(0);

    let mut crossings: Vec<i32> = Vec::with_capacity(8);
    for y in min_y..=max_y {
        crossings.clear();

        let n = ring.len();
        for i in 0..n {
            let (x0, y0) = ring[i];
            let (x1, y1) = ring[(i + 1) % n];
            if y0 == y1 {
                continue;
            }
            // Half-open rule: a vertex counts for the edge it starts
            let (lo, hi, lx, hx) = if y0 < y1 {
                (y0, y1, x0, x1)
            } else {
                (y1, y0, x1, x0)
            };
            if y >= lo && y < hi {
                let t = (y - lo) as f64 / (hi - lo) as f64;
                crossings.push((lx as f64 + t * (hx - lx) as f64).round() as i32);
            }
        }

        crossings.sort_unstable();
        for pair in crossings.chunks(2) {
            if let [a, b] = pair {
                canvas.fill_span(*a, *b, y);
            }
        }
    }
}

/// Ray-cast point-in-polygon test in map units.
pub fn point_in_ring(ring: &[(f64, f64)], x: f64, y: f64) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Area-weighted centroid of a ring (shoelace). Falls back to the vertex
/// mean for degenerate rings.
pub fn ring_centroid(ring: &[(f64, f64)]) -> (f64, f64) {
    let n = ring.len();
    if n < 3 {
        let (sx, sy) = ring.iter().fold((0.0, 0.0), |(ax, ay), (x, y)| (ax + x, ay + y));
        let count = n.max(1) as f64;
        return (sx / count, sy / count);
    }

    let mut area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let (x0, y0) = ring[i];
        let (x1, y1) = ring[(i + 1) % n];
        let cross = x0 * y1 - x1 * y0;
        area += cross;
        cx += (x0 + x1) * cross;
        cy += (y0 + y1) * cross;
    }
    if area.abs() < f64::EPSILON {
        let (sx, sy) = ring.iter().fold((0.0, 0.0), |(ax, ay), (x, y)| (ax + x, ay + y));
        return (sx / n as f64, sy / n as f64);
    }
    area *= 0.5;
    (cx / (6.0 * area), cy / (6.0 * area))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0);
        for x in 0..10usize {
            assert!(canvas.pixel_set(x, 0));
        }
    }

    #[test]
    fn test_fill_square() {
        let mut canvas = BrailleCanvas::new(4, 2);
        let ring = [(1, 1), (6, 1), (6, 6), (1, 6)];
        fill_ring(&mut canvas, &ring);
        assert!(canvas.pixel_set(3, 3));
        assert!(canvas.pixel_set(1, 1));
        assert!(!canvas.pixel_set(7, 7));
        assert!(!canvas.pixel_set(0, 0));
    }

    #[test]
    fn test_fill_concave() {
        // U shape: the notch between the prongs must stay empty
        let mut canvas = BrailleCanvas::new(6, 3);
        let ring = [(0, 0), (3, 0), (3, 6), (6, 6), (6, 0), (9, 0), (9, 9), (0, 9)];
        fill_ring(&mut canvas, &ring);
        assert!(canvas.pixel_set(1, 3));
        assert!(canvas.pixel_set(8, 3));
        assert!(!canvas.pixel_set(5, 3));
        assert!(canvas.pixel_set(5, 8));
    }

    #[test]
    fn test_point_in_ring() {
        let ring = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        assert!(point_in_ring(&ring, 5.0, 5.0));
        assert!(!point_in_ring(&ring, 15.0, 5.0));
        assert!(!point_in_ring(&ring, -1.0, -1.0));
    }

    #[test]
    fn test_ring_centroid() {
        let ring = [(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)];
        let (cx, cy) = ring_centroid(&ring);
        assert!((cx - 2.0).abs() < 1e-9);
        assert!((cy - 2.0).abs() < 1e-9);
    }
}
