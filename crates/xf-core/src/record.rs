//! Trip records and the immutable record store

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::view::FilteredView;

/// Filterable dimensions of a trip record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Trip distance in miles
    Distance,
    /// Tip amount
    Tip,
    /// Pickup day of week, 0 = Sunday
    DayOfWeek,
    /// Pickup hour of day
    Hour,
    /// Payment type code
    PaymentType,
    /// Passenger count
    Passengers,
    /// Pickup zone identifier
    Zone,
}

/// Legal value range of a field. Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDomain {
    Continuous { min: f64, max: f64 },
    Discrete { min: i64, max: i64 },
}

impl Field {
    pub fn domain(self) -> FieldDomain {
        match self {
            Field::Distance | Field::Tip => FieldDomain::Continuous { min: 0.0, max: f64::INFINITY },
            Field::DayOfWeek => FieldDomain::Discrete { min: 0, max: 6 },
            Field::Hour => FieldDomain::Discrete { min: 0, max: 23 },
            Field::PaymentType => FieldDomain::Discrete { min: 0, max: u8::MAX as i64 },
            Field::Passengers | Field::Zone => FieldDomain::Discrete { min: 0, max: u32::MAX as i64 },
        }
    }

    pub fn is_discrete(self) -> bool {
        matches!(self.domain(), FieldDomain::Discrete { .. })
    }

    /// Human readable axis name
    pub fn display_name(self) -> &'static str {
        match self {
            Field::Distance => "Trip distance",
            Field::Tip => "Tip amount",
            Field::DayOfWeek => "Day of week",
            Field::Hour => "Hour",
            Field::PaymentType => "Payment type",
            Field::Passengers => "Passengers",
            Field::Zone => "Pickup zone",
        }
    }
}

impl FieldDomain {
    pub fn min(&self) -> f64 {
        match *self {
            FieldDomain::Continuous { min, .. } => min,
            FieldDomain::Discrete { min, .. } => min as f64,
        }
    }

    pub fn max(&self) -> f64 {
        match *self {
            FieldDomain::Continuous { max, .. } => max,
            FieldDomain::Discrete { max, .. } => max as f64,
        }
    }

    /// Clamp a continuous bound into the domain. NaN is returned unchanged,
    /// callers decide which edge it widens to.
    pub fn clamp_f64(&self, value: f64) -> f64 {
        if value.is_nan() {
            return value;
        }
        value.clamp(self.min(), self.max())
    }

    /// Clamp an integer bound into the domain
    pub fn clamp_i64(&self, value: i64) -> i64 {
        match *self {
            FieldDomain::Discrete { min, max } => value.clamp(min, max),
            // Float to int casts saturate, so an infinite edge maps to i64::MIN/MAX
            FieldDomain::Continuous { min, max } => value.clamp(min.ceil() as i64, max.floor() as i64),
        }
    }
}

/// A trip row as produced by ingestion, before label derivation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRow {
    pub distance: f64,
    pub tip: f64,
    pub day_of_week: u8,
    pub hour: u8,
    pub payment_type: u8,
    pub passengers: Option<u32>,
    pub zone: Option<u32>,
}

/// An immutable trip record held by the [`RecordStore`]
#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    distance: f64,
    tip: f64,
    day_of_week: u8,
    hour: u8,
    payment_type: u8,
    passengers: Option<u32>,
    zone: Option<u32>,
    payment_label: Arc<str>,
}

impl TripRecord {
    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn tip(&self) -> f64 {
        self.tip
    }

    pub fn day_of_week(&self) -> u8 {
        self.day_of_week
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn payment_type(&self) -> u8 {
        self.payment_type
    }

    pub fn passengers(&self) -> Option<u32> {
        self.passengers
    }

    pub fn zone(&self) -> Option<u32> {
        self.zone
    }

    /// Display label derived from the payment code at load time
    pub fn payment_label(&self) -> &str {
        &self.payment_label
    }

    /// Numeric value of a field, `None` when an optional field is absent
    pub fn value(&self, field: Field) -> Option<f64> {
        match field {
            Field::Distance => Some(self.distance),
            Field::Tip => Some(self.tip),
            Field::DayOfWeek => Some(self.day_of_week as f64),
            Field::Hour => Some(self.hour as f64),
            Field::PaymentType => Some(self.payment_type as f64),
            Field::Passengers => self.passengers.map(|p| p as f64),
            Field::Zone => self.zone.map(|z| z as f64),
        }
    }

    /// Integer value of a field. Continuous fields are floored; a non-finite
    /// value has no integer bucket.
    pub fn discrete(&self, field: Field) -> Option<i64> {
        match field {
            Field::Distance | Field::Tip => self
                .value(field)
                .filter(|v| v.is_finite())
                .map(|v| v.floor() as i64),
            Field::DayOfWeek => Some(self.day_of_week as i64),
            Field::Hour => Some(self.hour as i64),
            Field::PaymentType => Some(self.payment_type as i64),
            Field::Passengers => self.passengers.map(i64::from),
            Field::Zone => self.zone.map(i64::from),
        }
    }
}

/// Fixed `code -> label` lookup with a fallback for unknown codes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryLabels {
    pub labels: BTreeMap<u8, String>,
    pub fallback: String,
}

impl CategoryLabels {
    pub fn new(labels: BTreeMap<u8, String>, fallback: impl Into<String>) -> Self {
        Self {
            labels,
            fallback: fallback.into(),
        }
    }

    /// Payment type names used by the taxi trip records
    pub fn payment_types() -> Self {
        let labels = [
            (1, "Credit card"),
            (2, "Cash"),
            (3, "No charge"),
            (4, "Dispute"),
            (5, "Unknown"),
            (6, "Voided trip"),
        ]
        .into_iter()
        .map(|(code, label)| (code, label.to_string()))
        .collect();
        Self::new(labels, "Other")
    }

    pub fn label(&self, code: u8) -> &str {
        self.labels.get(&code).map(String::as_str).unwrap_or(&self.fallback)
    }
}

impl Default for CategoryLabels {
    fn default() -> Self {
        Self::payment_types()
    }
}

/// Loaded-once, read-only collection of trip records
#[derive(Debug, Clone)]
pub struct RecordStore {
    records: Arc<[TripRecord]>,
}

impl RecordStore {
    /// Build the store from ingested rows, attaching the payment label to
    /// every record. This is the only derivation applied to the rows.
    pub fn new(rows: Vec<TripRow>, labels: &CategoryLabels) -> Self {
        let mut interned: HashMap<u8, Arc<str>> = HashMap::new();

        let records: Vec<TripRecord> = rows
            .into_iter()
            .map(|row| {
                let payment_label = interned
                    .entry(row.payment_type)
                    .or_insert_with(|| Arc::from(labels.label(row.payment_type)))
                    .clone();
                TripRecord {
                    distance: row.distance,
                    tip: row.tip,
                    day_of_week: row.day_of_week,
                    hour: row.hour,
                    payment_type: row.payment_type,
                    passengers: row.passengers,
                    zone: row.zone,
                    payment_label,
                }
            })
            .collect();

        tracing::info!("Record store built with {} rows", records.len());

        Self {
            records: records.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&TripRecord> {
        self.records.get(index)
    }

    /// Unfiltered view over every record
    pub fn full_view(&self) -> FilteredView<'_> {
        FilteredView::all(self)
    }
}
