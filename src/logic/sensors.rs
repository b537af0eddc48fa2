//! Sensor Table - static sensor-id → feature-type mapping
//!
//! Road-side stations report readings keyed by numeric sensor id.
//! The risk model only knows feature *types* (W, L, T, ...), so readings
//! are grouped by type and averaged before they enter a feature vector.
//!
//! Ids that are not in the table are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// SENSOR KINDS
// ============================================================================

/// Feature type a sensor contributes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    Water,
    Light,
    Temperature,
    Noise,
    Humidity,
    WindDirection,
    WindStrength,
    AirPressure,
}

impl SensorKind {
    pub const ALL: [SensorKind; 8] = [
        SensorKind::Water,
        SensorKind::Light,
        SensorKind::Temperature,
        SensorKind::Noise,
        SensorKind::Humidity,
        SensorKind::WindDirection,
        SensorKind::WindStrength,
        SensorKind::AirPressure,
    ];

    /// Column name used by the training pipeline
    pub fn code(&self) -> &'static str {
        match self {
            SensorKind::Water => "W",
            SensorKind::Light => "L",
            SensorKind::Temperature => "T",
            SensorKind::Noise => "N",
            SensorKind::Humidity => "H",
            SensorKind::WindDirection => "WD",
            SensorKind::WindStrength => "WS",
            SensorKind::AirPressure => "AP",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }

    /// Look up the kind for a sensor id
    pub fn from_sensor_id(id: i64) -> Option<Self> {
        SENSOR_TABLE
            .iter()
            .find(|(_, ids)| ids.contains(&id))
            .map(|(kind, _)| *kind)
    }
}

/// Authoritative sensor table
pub const SENSOR_TABLE: &[(SensorKind, &[i64])] = &[
    (SensorKind::Water, &[1, 8, 11]),
    (SensorKind::Light, &[2, 9, 12]),
    (SensorKind::Temperature, &[7, 15, 16, 18]),
    (SensorKind::Noise, &[3, 10]),
    (SensorKind::Humidity, &[4]),
    (SensorKind::WindDirection, &[5, 13]),
    (SensorKind::WindStrength, &[6, 14]),
    (SensorKind::AirPressure, &[17]),
];

/// Canonical ids used when only the three user-facing sensors are known
pub const CANONICAL_WATER_SENSOR: i64 = 1;
pub const CANONICAL_LIGHT_SENSOR: i64 = 2;
pub const CANONICAL_TEMPERATURE_SENSOR: i64 = 7;

// ============================================================================
// TABLE VALIDATION
// ============================================================================

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SensorTableError {
    #[error("sensor id {id} is mapped to both {first:?} and {second:?}")]
    DuplicateId { id: i64, first: SensorKind, second: SensorKind },

    #[error("sensor kind {0:?} has no sensor ids")]
    EmptyKind(SensorKind),

    #[error("sensor kind {0:?} is missing from the table")]
    MissingKind(SensorKind),
}

/// Validate a sensor table. Run once at startup against [`SENSOR_TABLE`].
pub fn validate_table(table: &[(SensorKind, &[i64])]) -> Result<(), SensorTableError> {
    let mut seen: BTreeMap<i64, SensorKind> = BTreeMap::new();

    for kind in SensorKind::ALL {
        if !table.iter().any(|(k, _)| *k == kind) {
            return Err(SensorTableError::MissingKind(kind));
        }
    }

    for (kind, ids) in table {
        if ids.is_empty() {
            return Err(SensorTableError::EmptyKind(*kind));
        }
        for id in ids.iter() {
            if let Some(first) = seen.insert(*id, *kind) {
                return Err(SensorTableError::DuplicateId {
                    id: *id,
                    first,
                    second: *kind,
                });
            }
        }
    }

    Ok(())
}

// ============================================================================
// SPARSE READINGS
// ============================================================================

/// Raw readings keyed by sensor id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SparseReading(pub BTreeMap<i64, f64>);

impl SparseReading {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sensor_id: i64, value: f64) -> Self {
        self.0.insert(sensor_id, value);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reduce readings to the arithmetic mean per sensor kind.
    /// Kinds without a reading are absent from the result.
    pub fn reduce(&self) -> BTreeMap<SensorKind, f64> {
        let mut sums: BTreeMap<SensorKind, (f64, usize)> = BTreeMap::new();

        for (id, value) in &self.0 {
            let Some(kind) = SensorKind::from_sensor_id(*id) else {
                continue;
            };
            let entry = sums.entry(kind).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }

        sums.into_iter()
            .map(|(kind, (sum, count))| (kind, sum / count as f64))
            .collect()
    }
}

impl From<BTreeMap<i64, f64>> for SparseReading {
    fn from(map: BTreeMap<i64, f64>) -> Self {
        Self(map)
    }
}

// ============================================================================
// TESTS
// ============================================================================
