//! Client for the Seoul open-data river stage API
//! (`ListRiverStageService`) and the background refresh worker that
//! keeps a name-keyed cache of per-river readings.

use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime};
use rayon::prelude::*;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Latest readings per river name. Replaced wholesale on every fetch
/// cycle; stale readings are overwritten, never merged.
pub type GaugeCache = HashMap<String, Vec<StationReading>>;

/// One gauge station reading, decoded and normalized.
#[derive(Clone, Debug)]
pub struct StationReading {
    /// District office name (구), used to group stations by district
    pub district: String,
    pub station: String,
    /// Current water level in meters; `None` when the feed is blank
    pub current_level: Option<f64>,
    /// Planned flood level in meters
    pub planned_flood_level: Option<f64>,
    pub observed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Error)]
pub enum GaugeError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api error {code}: {message}")]
    Api { code: String, message: String },
    #[error("response carried no ListRiverStageService payload")]
    MissingPayload,
}

/// Raw row as the API sends it: every field is a string.
#[derive(Debug, Deserialize)]
struct RiverStageRow {
    #[serde(rename = "GU_OFC_NM", default)]
    district: String,
    #[serde(rename = "WATG_NM", default)]
    station: String,
    #[serde(rename = "RLTM_RVR_WATL_CNT", default)]
    current_level: String,
    #[serde(rename = "PLAN_FLDE", default)]
    planned_flood_level: String,
    #[serde(rename = "DTRSM_DATA_CLCT_TM", default)]
    collected_at: String,
}

#[derive(Debug, Deserialize)]
struct ApiResult {
    #[serde(rename = "CODE")]
    code: String,
    #[serde(rename = "MESSAGE", default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ServicePayload {
    #[serde(rename = "RESULT")]
    result: Option<ApiResult>,
    #[serde(default)]
    row: Vec<RiverStageRow>,
}

/// Success wraps the payload under the service name; errors (bad key,
/// unknown service) surface a top-level RESULT instead.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "ListRiverStageService")]
    service: Option<ServicePayload>,
    #[serde(rename = "RESULT")]
    result: Option<ApiResult>,
}

fn parse_level(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

fn parse_observed(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }
    None
}

impl From<RiverStageRow> for StationReading {
    fn from(row: RiverStageRow) -> Self {
        Self {
            district: row.district.trim().to_string(),
            station: row.station.trim().to_string(),
            current_level: parse_level(&row.current_level),
            planned_flood_level: parse_level(&row.planned_flood_level),
            observed_at: parse_observed(&row.collected_at),
        }
    }
}

/// Blocking client for `ListRiverStageService`.
pub struct RiverStageClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    page_size: u32,
}

impl RiverStageClient {
    pub fn new(base_url: String, api_key: String, page_size: u32) -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            page_size,
        })
    }

    /// Fetch current readings for one river.
    pub fn fetch_river(&self, river: &str) -> Result<Vec<StationReading>, GaugeError> {
        let url = format!(
            "{}/{}/json/ListRiverStageService/1/{}/{}",
            self.base_url, self.api_key, self.page_size, river
        );
        let envelope: Envelope = self.http.get(&url).send()?.error_for_status()?.json()?;
        decode_envelope(envelope)
    }

    /// Fetch all rivers in parallel, fan-in into a name-keyed cache.
    /// A failed river logs a warning and yields an empty entry so one
    /// flaky upstream never sinks the whole cycle.
    pub fn fetch_all(&self, rivers: &[String]) -> GaugeCache {
        rivers
            .par_iter()
            .map(|river| {
                let readings = match self.fetch_river(river) {
                    Ok(readings) => {
                        debug!(river = %river, stations = readings.len(), "fetched river stage");
                        readings
                    }
                    Err(err) => {
                        warn!(river = %river, error = %err, "river stage fetch failed");
                        Vec::new()
                    }
                };
                (river.clone(), readings)
            })
            .collect()
    }
}

fn decode_envelope(envelope: Envelope) -> Result<Vec<StationReading>, GaugeError> {
    if let Some(payload) = envelope.service {
        if let Some(result) = &payload.result {
            if result.code != "INFO-000" {
                return Err(GaugeError::Api {
                    code: result.code.clone(),
                    message: result.message.clone(),
                });
            }
        }
        return Ok(payload.row.into_iter().map(StationReading::from).collect());
    }

    match envelope.result {
        // INFO-200: no rows matched the query, which is data, not failure
        Some(result) if result.code == "INFO-200" => Ok(Vec::new()),
        Some(result) => Err(GaugeError::Api {
            code: result.code,
            message: result.message,
        }),
        None => Err(GaugeError::MissingPayload),
    }
}

/// One completed fetch cycle.
pub struct GaugeUpdate {
    pub cache: GaugeCache,
    pub fetched_at: DateTime<Local>,
}

/// Spawn the refresh worker. It fetches immediately, then again every
/// `interval` or whenever a unit arrives on the returned trigger
/// channel. The worker exits when either channel is dropped.
pub fn spawn_worker(
    client: RiverStageClient,
    rivers: Vec<String>,
    interval: Duration,
) -> (mpsc::Sender<()>, mpsc::Receiver<GaugeUpdate>) {
    let (trigger_tx, trigger_rx) = mpsc::channel::<()>();
    let (update_tx, update_rx) = mpsc::channel::<GaugeUpdate>();

    thread::spawn(move || loop {
        let cache = client.fetch_all(&rivers);
        let update = GaugeUpdate {
            cache,
            fetched_at: Local::now(),
        };
        if update_tx.send(update).is_err() {
            break;
        }

        match trigger_rx.recv_timeout(interval) {
            Ok(()) | Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    });

    (trigger_tx, update_rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OK_BODY: &str = r#"{
        "ListRiverStageService": {
            "list_total_count": 2,
            "RESULT": {"CODE": "INFO-000", "MESSAGE": "정상 처리되었습니다"},
            "row": [
                {
                    "GU_OFC_NM": "강남구",
                    "WATG_NM": "대곡교",
                    "RLTM_RVR_WATL_CNT": "1.52",
                    "PLAN_FLDE": "7.10",
                    "DTRSM_DATA_CLCT_TM": "2026-08-29 10:40:00"
                },
                {
                    "GU_OFC_NM": "송파구",
                    "WATG_NM": "탄천2교",
                    "RLTM_RVR_WATL_CNT": "",
                    "PLAN_FLDE": "6.00",
                    "DTRSM_DATA_CLCT_TM": "2026-08-29 10:40"
                }
            ]
        }
    }"#;

    #[test]
    fn test_decode_rows() {
        let envelope: Envelope = serde_json::from_str(OK_BODY).unwrap();
        let readings = decode_envelope(envelope).unwrap();
        assert_eq!(readings.len(), 2);

        assert_eq!(readings[0].district, "강남구");
        assert_eq!(readings[0].station, "대곡교");
        assert_eq!(readings[0].current_level, Some(1.52));
        assert_eq!(readings[0].planned_flood_level, Some(7.10));
        assert!(readings[0].observed_at.is_some());

        // Blank level stays None, the reading itself is kept
        assert_eq!(readings[1].current_level, None);
        assert!(readings[1].observed_at.is_some());
    }

    #[test]
    fn test_decode_no_rows_is_empty() {
        let body = r#"{"RESULT": {"CODE": "INFO-200", "MESSAGE": "해당하는 데이터가 없습니다"}}"#;
        let envelope: Envelope = serde_json::from_str(body).unwrap();
        assert!(decode_envelope(envelope).unwrap().is_empty());
    }

    #[test]
    fn test_decode_api_error() {
        let body = r#"{"RESULT": {"CODE": "INFO-100", "MESSAGE": "인증키가 유효하지 않습니다"}}"#;
        let envelope: Envelope = serde_json::from_str(body).unwrap();
        match decode_envelope(envelope) {
            Err(GaugeError::Api { code, .. }) => assert_eq!(code, "INFO-100"),
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_nested_error_code() {
        let body = r#"{
            "ListRiverStageService": {
                "RESULT": {"CODE": "ERROR-500", "MESSAGE": "서버 오류"},
                "row": []
            }
        }"#;
        let envelope: Envelope = serde_json::from_str(body).unwrap();
        assert!(matches!(
            decode_envelope(envelope),
            Err(GaugeError::Api { .. })
        ));
    }

    #[test]
    fn test_parse_level_lenient() {
        assert_eq!(parse_level(" 1.5 "), Some(1.5));
        assert_eq!(parse_level(""), None);
        assert_eq!(parse_level("-"), None);
    }

    #[test]
    fn test_parse_observed_formats() {
        assert!(parse_observed("2026-08-29 10:40:00").is_some());
        assert!(parse_observed("2026-08-29 10:40").is_some());
        assert!(parse_observed("2026-08-29T10:40:00").is_some());
        assert!(parse_observed("not a time").is_none());
    }
}
