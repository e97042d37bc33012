use std::collections::HashMap;

use chrono::{DateTime, Local};
use ratatui::layout::Rect;
use ratatui::style::Color;

use crate::gauge::{GaugeCache, GaugeUpdate};
use crate::map::{DistrictMap, FitProjection};
use crate::risk::{self, RiverGroup};

/// Application state
pub struct App {
    pub map: DistrictMap,
    projection: Option<FitProjection>,
    /// Inner map area of the last drawn frame, in terminal cells
    map_inner: Rect,
    pub risk_scores: HashMap<String, f64>,
    cache: GaugeCache,
    pub selected: Option<String>,
    pub hovered: Option<String>,
    /// Detail-panel content for the selected district
    pub detail: Vec<RiverGroup>,
    pub detail_scroll: u16,
    pub loading: bool,
    pub last_updated: Option<DateTime<Local>>,
    pub should_quit: bool,
    /// Current mouse position for the cursor marker
    pub mouse_pos: Option<(u16, u16)>,
}

impl App {
    pub fn new(map: DistrictMap) -> Self {
        Self {
            map,
            projection: None,
            map_inner: Rect::default(),
            risk_scores: HashMap::new(),
            cache: GaugeCache::new(),
            selected: None,
            hovered: None,
            detail: Vec::new(),
            detail_scroll: 0,
            loading: true,
            last_updated: None,
            should_quit: false,
            mouse_pos: None,
        }
    }

    /// Refit the projection when the map area changes (first frame,
    /// resize, detail panel opening/closing). Braille gives 2x4 pixels
    /// per character cell.
    pub fn fit_to(&mut self, inner: Rect) -> &FitProjection {
        if self.map_inner != inner {
            self.projection = None;
            self.map_inner = inner;
        }
        let bounds = self.map.bounds();
        let pixel_w = inner.width as usize * 2;
        let pixel_h = inner.height as usize * 4;
        self.projection
            .get_or_insert_with(|| FitProjection::fit(bounds, pixel_w, pixel_h, 2))
    }

    /// Apply a completed fetch cycle: replace the cache wholesale and
    /// recompute every district score.
    pub fn apply_update(&mut self, update: GaugeUpdate) {
        self.cache = update.cache;
        self.risk_scores = risk::compute_risk_scores(&self.cache);
        self.last_updated = Some(update.fetched_at);
        self.loading = false;
        if let Some(district) = &self.selected {
            self.detail = risk::district_readings(&self.cache, district);
        }
    }

    pub fn mark_loading(&mut self) {
        self.loading = true;
    }

    /// District under a terminal cell, if it lies inside the map area.
    fn district_at_cell(&self, col: u16, row: u16) -> Option<String> {
        let inner = self.map_inner;
        let proj = self.projection.as_ref()?;
        if col < inner.x
            || row < inner.y
            || col >= inner.x + inner.width
            || row >= inner.y + inner.height
        {
            return None;
        }
        // Sample the center of the cell's pixel block
        let px = (col - inner.x) as i32 * 2 + 1;
        let py = (row - inner.y) as i32 * 4 + 2;
        let (x, y) = proj.unproject(px, py);
        self.map.district_at(x, y).map(str::to_string)
    }

    pub fn hover_at(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
        self.hovered = self.district_at_cell(col, row);
    }

    pub fn select_at(&mut self, col: u16, row: u16) {
        if let Some(district) = self.district_at_cell(col, row) {
            self.select(district);
        }
    }

    fn select(&mut self, district: String) {
        self.detail = risk::district_readings(&self.cache, &district);
        self.detail_scroll = 0;
        self.selected = Some(district);
    }

    /// Move the selection through districts in boundary-file order.
    pub fn cycle_selection(&mut self, forward: bool) {
        let names: Vec<&str> = self.map.districts().iter().map(|d| d.name.as_str()).collect();
        if names.is_empty() {
            return;
        }
        let next = match self.selected.as_deref().and_then(|s| names.iter().position(|n| *n == s)) {
            Some(idx) if forward => (idx + 1) % names.len(),
            Some(idx) => (idx + names.len() - 1) % names.len(),
            None if forward => 0,
            None => names.len() - 1,
        };
        self.select(names[next].to_string());
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.detail.clear();
        self.detail_scroll = 0;
    }

    pub fn scroll_detail(&mut self, delta: i16) {
        self.detail_scroll = self.detail_scroll.saturating_add_signed(delta);
    }

    /// Fill color for a district given current scores and interaction.
    pub fn fill_for(&self, district: &str) -> Color {
        risk::fill_color(
            self.risk_scores.get(district).copied(),
            self.selected.as_deref() == Some(district),
            self.hovered.as_deref() == Some(district),
        )
    }

    /// Mouse position relative to the map area, for the cursor marker.
    pub fn cursor_in_map(&self) -> Option<(u16, u16)> {
        let (col, row) = self.mouse_pos?;
        let inner = self.map_inner;
        if col >= inner.x
            && row >= inner.y
            && col < inner.x + inner.width
            && row < inner.y + inner.height
        {
            Some((col - inner.x, row - inner.y))
        } else {
            None
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}
