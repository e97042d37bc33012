use ratatui::style::Color;

use crate::braille::BrailleCanvas;
use crate::map::geometry::{draw_ring, fill_ring, point_in_ring, ring_centroid};
use crate::map::projection::{Bounds, FitProjection};

/// A district polygon in map units (EPSG:5179). Multi-part districts
/// carry one ring per part; interior rings are not modeled.
pub struct District {
    pub name: String,
    pub rings: Vec<Vec<(f64, f64)>>,
    pub bbox: Bounds,
    pub centroid: (f64, f64),
}

impl District {
    pub fn new(name: String, rings: Vec<Vec<(f64, f64)>>) -> Self {
        let mut bbox = Bounds::empty();
        for ring in &rings {
            for &(x, y) in ring {
                bbox.extend(x, y);
            }
        }
        // Centroid of the largest ring keeps labels off small islands
        let centroid = rings
            .iter()
            .max_by(|a, b| a.len().cmp(&b.len()))
            .map(|ring| ring_centroid(ring))
            .unwrap_or((0.0, 0.0));
        Self {
            name,
            rings,
            bbox,
            centroid,
        }
    }

    /// Point-in-polygon test in map units, bbox pre-checked.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.bbox.contains(x, y) && self.rings.iter().any(|ring| point_in_ring(ring, x, y))
    }
}

/// One filled district layer: a Braille canvas plus the color the UI
/// should paint it with.
pub struct DistrictLayer {
    pub name: String,
    pub color: Color,
    pub canvas: BrailleCanvas,
}

/// Rendered output for a single frame.
pub struct MapLayers {
    pub fills: Vec<DistrictLayer>,
    pub outlines: BrailleCanvas,
    /// Character-cell label positions: (x, y, text)
    pub labels: Vec<(u16, u16, String)>,
}

/// Renders district polygons filled by caller-supplied colors.
pub struct DistrictMap {
    districts: Vec<District>,
    bounds: Bounds,
    pub show_labels: bool,
}

impl DistrictMap {
    pub fn new(districts: Vec<District>) -> Self {
        let mut bounds = Bounds::empty();
        for d in &districts {
            bounds.merge(&d.bbox);
        }
        Self {
            districts,
            bounds,
            show_labels: true,
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn districts(&self) -> &[District] {
        &self.districts
    }

    pub fn has_data(&self) -> bool {
        !self.districts.is_empty()
    }

    pub fn toggle_labels(&mut self) {
        self.show_labels = !self.show_labels;
    }

    /// Name of the district under a map-unit coordinate.
    pub fn district_at(&self, x: f64, y: f64) -> Option<&str> {
        self.districts
            .iter()
            .find(|d| d.contains(x, y))
            .map(|d| d.name.as_str())
    }

    /// Render all districts to per-district fill canvases plus a shared
    /// outline canvas. `width`/`height` are character cells; the
    /// projection must target the matching pixel grid (2x4 per cell).
    pub fn render<F>(
        &self,
        width: usize,
        height: usize,
        proj: &FitProjection,
        fill_color: F,
    ) -> MapLayers
    where
        F: Fn(&str) -> Color,
    {
        let mut outlines = BrailleCanvas::new(width, height);
        let mut fills = Vec::with_capacity(self.districts.len());
        let mut labels = Vec::new();

        for district in &self.districts {
            let mut canvas = BrailleCanvas::new(width, height);

            for ring in &district.rings {
                let projected: Vec<(i32, i32)> = ring
                    .iter()
                    .map(|&(x, y)| proj.project(x, y))
                    .collect();
                fill_ring(&mut canvas, &projected);
                draw_ring(&mut outlines, &projected);
            }

            fills.push(DistrictLayer {
                name: district.name.clone(),
                color: fill_color(&district.name),
                canvas,
            });

            if self.show_labels {
                let (px, py) = proj.project(district.centroid.0, district.centroid.1);
                if proj.is_visible(px, py) {
                    // Braille pixel to character cell, label centered on it
                    let half = (district.name.chars().count() / 2) as i32;
                    let cx = (px / 2 - half).max(0) as u16;
                    let cy = (py / 4) as u16;
                    labels.push((cx, cy, district.name.clone()));
                }
            }
        }

        MapLayers {
            fills,
            outlines,
            labels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(name: &str) -> District {
        District::new(
            name.to_string(),
            vec![vec![(0.0, 0.0), (10.0, 0.0), (5.0, 10.0)]],
        )
    }

    #[test]
    fn test_district_contains() {
        let d = triangle("중구");
        assert!(d.contains(5.0, 2.0));
        assert!(!d.contains(0.5, 9.0));
        assert!(!d.contains(20.0, 2.0));
    }

    #[test]
    fn test_district_at() {
        let map = DistrictMap::new(vec![
            triangle("중구"),
            District::new(
                "종로구".to_string(),
                vec![vec![(20.0, 0.0), (30.0, 0.0), (30.0, 10.0), (20.0, 10.0)]],
            ),
        ]);
        assert_eq!(map.district_at(25.0, 5.0), Some("종로구"));
        assert_eq!(map.district_at(5.0, 2.0), Some("중구"));
        assert_eq!(map.district_at(15.0, 5.0), None);
    }

    #[test]
    fn test_render_layers() {
        let map = DistrictMap::new(vec![triangle("중구")]);
        let proj = FitProjection::fit(map.bounds(), 40, 40, 0);
        let layers = map.render(20, 10, &proj, |_| Color::Red);
        assert_eq!(layers.fills.len(), 1);
        assert_eq!(layers.fills[0].color, Color::Red);
        assert!(!layers.fills[0].canvas.is_empty());
        assert!(!layers.outlines.is_empty());
        assert_eq!(layers.labels.len(), 1);
    }

    #[test]
    fn test_labels_toggle() {
        let mut map = DistrictMap::new(vec![triangle("중구")]);
        map.toggle_labels();
        let proj = FitProjection::fit(map.bounds(), 40, 40, 0);
        let layers = map.render(20, 10, &proj, |_| Color::Gray);
        assert!(layers.labels.is_empty());
    }
}
