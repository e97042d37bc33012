//! Flood-risk aggregation: maps districts to their monitored rivers and
//! reduces per-station readings to one score per district.

use std::collections::HashMap;

use ratatui::style::Color;

use crate::gauge::{GaugeCache, StationReading};

/// Rivers monitored per district. Districts without a mapped river
/// always score 0 (rendered as no-data).
pub const DISTRICT_RIVERS: &[(&str, &[&str])] = &[
    ("강남구", &["탄천"]),
    ("강동구", &[]),
    ("강북구", &[]),
    ("강서구", &["안양천"]),
    ("관악구", &["도림천"]),
    ("광진구", &["중랑천"]),
    ("구로구", &["안양천", "도림천", "목감천"]),
    ("금천구", &["안양천"]),
    ("노원구", &["우이천", "중랑천"]),
    ("도봉구", &["방학천", "중랑천", "우이천"]),
    ("동대문구", &["중랑천"]),
    ("동작구", &["한강"]),
    ("마포구", &["홍제천"]),
    ("서대문구", &["불광천"]),
    ("서초구", &["탄천"]),
    ("성동구", &["중랑천", "청계천"]),
    ("성북구", &[]),
    ("송파구", &["탄천"]),
    ("양천구", &["안양천"]),
    ("영등포구", &["안양천"]),
    ("용산구", &["한강"]),
    ("은평구", &["한강"]),
    ("종로구", &["청계천"]),
    ("중구", &["청계천"]),
    ("중랑구", &["중랑천"]),
];

/// Every river referenced by the district mapping, fetched once per cycle.
pub const ALL_RIVERS: &[&str] = &[
    "탄천", "안양천", "도림천", "중랑천", "목감천", "우이천", "방학천", "한강", "홍제천",
    "불광천", "청계천",
];

/// Risk band thresholds on the current/planned-flood-level ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RiskBand {
    Danger,   // >= 95%
    Alert,    // >= 85%
    Caution,  // >= 70%
    Advisory, // >= 30%
    NoData,
}

impl RiskBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.95 {
            RiskBand::Danger
        } else if score >= 0.85 {
            RiskBand::Alert
        } else if score >= 0.7 {
            RiskBand::Caution
        } else if score >= 0.3 {
            RiskBand::Advisory
        } else {
            RiskBand::NoData
        }
    }

    pub fn color(self) -> Color {
        match self {
            RiskBand::Danger => Color::Rgb(220, 38, 38),
            RiskBand::Alert => Color::Rgb(252, 211, 77),
            RiskBand::Caution => Color::Rgb(253, 186, 116),
            RiskBand::Advisory => Color::Rgb(64, 192, 87),
            RiskBand::NoData => Color::Rgb(156, 163, 175),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskBand::Danger => "danger",
            RiskBand::Alert => "alert",
            RiskBand::Caution => "caution",
            RiskBand::Advisory => "advisory",
            RiskBand::NoData => "no data",
        }
    }
}

/// Fill color for a district given its score and interaction state.
/// Selection darkens the band color, hover brightens it; districts
/// without a score use neutral grays like the original palette.
pub fn fill_color(score: Option<f64>, selected: bool, hovered: bool) -> Color {
    let has_data = score.map(|s| s > 0.0).unwrap_or(false);
    if !has_data {
        return if selected || hovered {
            Color::Rgb(209, 213, 219)
        } else {
            Color::Rgb(229, 231, 235)
        };
    }
    let base = RiskBand::from_score(score.unwrap_or(0.0)).color();
    if selected {
        shade(base, 0.7)
    } else if hovered {
        shade(base, 1.2)
    } else {
        base
    }
}

fn shade(color: Color, factor: f64) -> Color {
    match color {
        Color::Rgb(r, g, b) => {
            let scale = |c: u8| ((c as f64 * factor).round().clamp(0.0, 255.0)) as u8;
            Color::Rgb(scale(r), scale(g), scale(b))
        }
        other => other,
    }
}

/// Ratio of current level to planned flood level, when both are usable.
pub fn station_ratio(reading: &StationReading) -> Option<f64> {
    match (reading.current_level, reading.planned_flood_level) {
        (Some(current), Some(flood)) if flood > 0.0 => Some(current / flood),
        _ => None,
    }
}

/// Per-district mean of station ratios across the district's mapped
/// rivers. Recomputed wholesale from each cache snapshot.
pub fn compute_risk_scores(cache: &GaugeCache) -> HashMap<String, f64> {
    let mut scores = HashMap::with_capacity(DISTRICT_RIVERS.len());

    for &(district, rivers) in DISTRICT_RIVERS {
        let mut sum = 0.0;
        let mut count = 0usize;

        for &river in rivers {
            let Some(readings) = cache.get(river) else {
                continue;
            };
            for reading in readings.iter().filter(|r| r.district == district) {
                if let Some(ratio) = station_ratio(reading) {
                    sum += ratio;
                    count += 1;
                }
            }
        }

        let score = if count > 0 { sum / count as f64 } else { 0.0 };
        scores.insert(district.to_string(), score);
    }

    scores
}

/// Stations of one river within the selected district.
pub struct RiverGroup {
    pub river: String,
    pub stations: Vec<StationReading>,
}

/// Detail-panel grouping: the selected district's readings per mapped
/// river, rivers without matching stations omitted.
pub fn district_readings(cache: &GaugeCache, district: &str) -> Vec<RiverGroup> {
    let rivers = DISTRICT_RIVERS
        .iter()
        .find(|(name, _)| *name == district)
        .map(|(_, rivers)| *rivers)
        .unwrap_or(&[]);

    rivers
        .iter()
        .filter_map(|&river| {
            let stations: Vec<StationReading> = cache
                .get(river)?
                .iter()
                .filter(|r| r.district == district)
                .cloned()
                .collect();
            if stations.is_empty() {
                None
            } else {
                Some(RiverGroup {
                    river: river.to_string(),
                    stations,
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(district: &str, station: &str, current: f64, flood: f64) -> StationReading {
        StationReading {
            district: district.to_string(),
            station: station.to_string(),
            current_level: Some(current),
            planned_flood_level: Some(flood),
            observed_at: None,
        }
    }

    #[test]
    fn test_mapping_covers_all_25_districts() {
        assert_eq!(DISTRICT_RIVERS.len(), 25);
        for &(_, rivers) in DISTRICT_RIVERS {
            for &river in rivers {
                assert!(ALL_RIVERS.contains(&river), "unknown river {river}");
            }
        }
    }

    #[test]
    fn test_band_thresholds() {
        assert_eq!(RiskBand::from_score(0.95), RiskBand::Danger);
        assert_eq!(RiskBand::from_score(0.949), RiskBand::Alert);
        assert_eq!(RiskBand::from_score(0.85), RiskBand::Alert);
        assert_eq!(RiskBand::from_score(0.7), RiskBand::Caution);
        assert_eq!(RiskBand::from_score(0.3), RiskBand::Advisory);
        assert_eq!(RiskBand::from_score(0.29), RiskBand::NoData);
        assert_eq!(RiskBand::from_score(0.0), RiskBand::NoData);
    }

    #[test]
    fn test_score_is_mean_of_valid_stations() {
        let mut cache = GaugeCache::new();
        cache.insert(
            "탄천".to_string(),
            vec![
                reading("강남구", "대곡교", 2.0, 4.0), // 0.5
                reading("강남구", "탄천2교", 3.0, 4.0), // 0.75
                reading("서초구", "기타", 4.0, 4.0),   // other district, ignored
                StationReading {
                    district: "강남구".to_string(),
                    station: "결측".to_string(),
                    current_level: None,
                    planned_flood_level: Some(4.0),
                    observed_at: None,
                },
            ],
        );

        let scores = compute_risk_scores(&cache);
        let gangnam = scores["강남구"];
        assert!((gangnam - 0.625).abs() < 1e-9);
    }

    #[test]
    fn test_no_rivers_or_stations_scores_zero() {
        let cache = GaugeCache::new();
        let scores = compute_risk_scores(&cache);
        assert_eq!(scores["강동구"], 0.0); // no mapped rivers
        assert_eq!(scores["강남구"], 0.0); // mapped river absent from cache
    }

    #[test]
    fn test_nonpositive_flood_level_skipped() {
        let mut cache = GaugeCache::new();
        cache.insert(
            "청계천".to_string(),
            vec![reading("중구", "모전교", 1.0, 0.0)],
        );
        let scores = compute_risk_scores(&cache);
        assert_eq!(scores["중구"], 0.0);
    }

    #[test]
    fn test_district_readings_groups_by_river() {
        let mut cache = GaugeCache::new();
        cache.insert(
            "안양천".to_string(),
            vec![reading("구로구", "고척교", 1.0, 5.0)],
        );
        cache.insert("도림천".to_string(), vec![]);
        cache.insert(
            "목감천".to_string(),
            vec![reading("광명시", "목감교", 1.0, 5.0)],
        );

        let groups = district_readings(&cache, "구로구");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].river, "안양천");
        assert_eq!(groups[0].stations.len(), 1);
    }

    #[test]
    fn test_fill_color_states() {
        assert_eq!(fill_color(None, false, false), Color::Rgb(229, 231, 235));
        assert_eq!(fill_color(Some(0.0), false, true), Color::Rgb(209, 213, 219));
        assert_eq!(fill_color(Some(0.96), false, false), Color::Rgb(220, 38, 38));
        // Selection darkens, hover brightens
        assert_eq!(fill_color(Some(0.96), true, false), Color::Rgb(154, 27, 27));
        assert_ne!(
            fill_color(Some(0.5), false, true),
            fill_color(Some(0.5), false, false)
        );
    }
}
