//! Trip record sources

pub mod batch_source;
pub mod csv_source;

pub use batch_source::BatchTripSource;
pub use csv_source::CsvTripSource;

use serde::{Deserialize, Serialize};
use xf_core::TripRow;

use crate::DataError;

/// Column names shared by every source, matching the trip query output
pub mod columns {
    pub const DAY_OF_WEEK: &str = "pickup_day_of_week";
    pub const HOUR: &str = "pickup_hour";
    pub const DISTANCE: &str = "trip_distance";
    pub const TIP: &str = "tip_amount";
    pub const PASSENGERS: &str = "passenger_count";
    pub const ZONE: &str = "PULocationID";
    pub const PAYMENT_TYPE: &str = "payment_type";
}

/// Trait for trip sources.
///
/// Loading is the only asynchronous step of the dashboard and finishes before
/// the cross-filter engine sees any record.
#[async_trait::async_trait]
pub trait TripSource: Send + Sync {
    /// Load every accepted row
    async fn load(&self) -> Result<Vec<TripRow>, DataError>;

    /// Get the source name/path
    fn source_name(&self) -> &str;
}

/// Row acceptance rules applied during ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestFilter {
    /// Exclusive upper bound on trip distance, `None` for no limit.
    /// Distance must also be positive.
    pub max_distance: Option<f64>,
    /// Exclusive upper bound on tip, `None` for no limit.
    /// Tip must be non-negative.
    pub max_tip: Option<f64>,
    /// Drop rows without a positive passenger count
    pub require_passengers: bool,
    /// Drop rows without a pickup zone
    pub require_zone: bool,
}

impl Default for IngestFilter {
    fn default() -> Self {
        Self {
            max_distance: Some(50.0),
            max_tip: Some(100.0),
            require_passengers: true,
            require_zone: true,
        }
    }
}

impl IngestFilter {
    /// Only the sign checks on distance and tip remain
    pub fn permissive() -> Self {
        Self {
            max_distance: None,
            max_tip: None,
            require_passengers: false,
            require_zone: false,
        }
    }

    pub fn accepts(&self, row: &TripRow) -> bool {
        let distance_ok = row.distance > 0.0 && self.max_distance.map_or(true, |max| row.distance < max);
        let tip_ok = row.tip >= 0.0 && self.max_tip.map_or(true, |max| row.tip < max);
        let passengers_ok = !self.require_passengers || row.passengers.map_or(false, |p| p > 0);
        let zone_ok = !self.require_zone || row.zone.is_some();
        distance_ok && tip_ok && passengers_ok && zone_ok
    }
}

/// Loosely typed values of one input row before validation
#[derive(Debug, Clone, Default)]
pub(crate) struct RawTrip {
    pub day_of_week: Option<f64>,
    pub hour: Option<f64>,
    pub distance: Option<f64>,
    pub tip: Option<f64>,
    pub passengers: Option<f64>,
    pub zone: Option<u32>,
    pub payment_type: Option<f64>,
}

impl RawTrip {
    /// Validate field domains. Rows with a missing or out-of-range required
    /// field are rejected.
    pub(crate) fn into_row(self) -> Option<TripRow> {
        let day_of_week: u8 = integral(self.day_of_week?)?;
        let hour: u8 = integral(self.hour?)?;
        if day_of_week > 6 || hour > 23 {
            return None;
        }
        let distance = self.distance.filter(|d| d.is_finite())?;
        let tip = self.tip.filter(|t| t.is_finite())?;

        Some(TripRow {
            distance,
            tip,
            day_of_week,
            hour,
            payment_type: integral(self.payment_type?)?,
            passengers: self.passengers.and_then(integral),
            zone: self.zone,
        })
    }
}

/// Convert a whole-number float into a narrower integer type
pub(crate) fn integral<T: TryFrom<i64>>(value: f64) -> Option<T> {
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    T::try_from(value as i64).ok()
}

/// Validate and filter a batch of raw rows, logging how many were dropped
pub(crate) fn accept_rows(
    raw: impl IntoIterator<Item = RawTrip>,
    filter: &IngestFilter,
    source: &str,
) -> Vec<TripRow> {
    let mut malformed = 0usize;
    let mut filtered = 0usize;
    let mut rows = Vec::new();

    for trip in raw {
        match trip.into_row() {
            Some(row) if filter.accepts(&row) => rows.push(row),
            Some(_) => filtered += 1,
            None => malformed += 1,
        }
    }

    if malformed > 0 {
        tracing::warn!("{}: skipped {} malformed rows", source, malformed);
    }
    tracing::info!(
        "{}: accepted {} rows ({} excluded by ingest filter)",
        source,
        rows.len(),
        filtered
    );
    rows
}
