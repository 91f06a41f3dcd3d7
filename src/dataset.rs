//! The currently displayed fetch result and the sequencing that guards it.

use crate::model::{BoundingBox, Measurement, Pollutant, Station};
use std::collections::{HashMap, HashSet};

/// One consistent snapshot of a region: stations inside `bbox` and the latest
/// reading of each pollutant per station. Replaced wholesale, never merged.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    bbox: BoundingBox,
    stations: Vec<Station>,
    measurements: Vec<Measurement>,
    truncated: bool,
}

impl Dataset {
    pub fn new(bbox: BoundingBox, stations: Vec<Station>, measurements: Vec<Measurement>) -> Self {
        let mut seen = HashSet::new();
        let stations: Vec<Station> = stations
            .into_iter()
            .filter(|s| bbox.contains(&s.coordinates) && seen.insert(s.id))
            .collect();

        let mut latest: HashMap<(u64, Pollutant), Measurement> = HashMap::new();
        for m in measurements {
            if !seen.contains(&m.station_id) {
                continue;
            }
            match latest.get(&(m.station_id, m.pollutant)) {
                Some(kept) if kept.timestamp >= m.timestamp => {}
                _ => {
                    latest.insert((m.station_id, m.pollutant), m);
                }
            }
        }

        // Station order, then pollutant order, so projections are stable.
        let order: HashMap<u64, usize> = stations
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id, i))
            .collect();
        let mut measurements: Vec<Measurement> = latest.into_values().collect();
        measurements.sort_by_key(|m| (order.get(&m.station_id).copied(), m.pollutant));

        Self {
            bbox,
            stations,
            measurements,
            truncated: false,
        }
    }

    pub fn empty(bbox: BoundingBox) -> Self {
        Self::new(bbox, Vec::new(), Vec::new())
    }

    /// Marks the dataset as cut off by the page cap.
    pub fn with_truncated(mut self, truncated: bool) -> Self {
        self.truncated = truncated;
        self
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn station(&self, id: u64) -> Option<&Station> {
        self.stations.iter().find(|s| s.id == id)
    }

    pub fn latest(&self, station_id: u64, pollutant: Pollutant) -> Option<&Measurement> {
        self.measurements
            .iter()
            .find(|m| m.station_id == station_id && m.pollutant == pollutant)
    }
}

/// Hands out increasing sequence numbers; only the newest one may be applied.
#[derive(Debug, Default, Clone)]
pub struct FetchSequencer {
    latest: u64,
}

impl FetchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }

    /// True when `seq` is the most recently issued number.
    pub fn is_current(&self, seq: u64) -> bool {
        seq != 0 && seq == self.latest
    }
}
