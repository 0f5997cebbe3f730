//! Trip source over an Arrow record batch produced by a columnar query engine

use arrow::array::{Array, ArrayRef, Float64Array};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use xf_core::TripRow;

use super::{accept_rows, columns, IngestFilter, RawTrip, TripSource};
use crate::zones::zone_id_from_f64;
use crate::DataError;

/// Trip source wrapping query results already materialized as a batch
pub struct BatchTripSource {
    batch: RecordBatch,
    name: String,
    filter: IngestFilter,
}

impl BatchTripSource {
    pub fn new(name: impl Into<String>, batch: RecordBatch) -> Self {
        Self {
            batch,
            name: name.into(),
            filter: IngestFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: IngestFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Convert the batch into trip rows
    pub fn rows(&self) -> Result<Vec<TripRow>, DataError> {
        batch_to_rows(&self.batch, &self.filter, &self.name)
    }
}

#[async_trait::async_trait]
impl TripSource for BatchTripSource {
    async fn load(&self) -> Result<Vec<TripRow>, DataError> {
        self.rows()
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

/// Cast a named column to Float64 so integer, float and numeric string
/// columns are read the same way
fn float_column(batch: &RecordBatch, name: &str) -> Result<Float64Array, DataError> {
    let column: &ArrayRef = batch
        .column_by_name(name)
        .ok_or_else(|| DataError::MissingColumn(name.to_string()))?;

    let casted = arrow::compute::cast(column, &DataType::Float64)?;
    casted
        .as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .ok_or_else(|| DataError::Other(format!("column '{}' did not cast to Float64", name)))
}

fn value_at(array: &Float64Array, index: usize) -> Option<f64> {
    if array.is_null(index) {
        None
    } else {
        Some(array.value(index))
    }
}

/// Convert a record batch with the trip query columns into rows
pub fn batch_to_rows(batch: &RecordBatch, filter: &IngestFilter, source: &str) -> Result<Vec<TripRow>, DataError> {
    let day = float_column(batch, columns::DAY_OF_WEEK)?;
    let hour = float_column(batch, columns::HOUR)?;
    let distance = float_column(batch, columns::DISTANCE)?;
    let tip = float_column(batch, columns::TIP)?;
    let passengers = float_column(batch, columns::PASSENGERS)?;
    let zone = float_column(batch, columns::ZONE)?;
    let payment = float_column(batch, columns::PAYMENT_TYPE)?;

    tracing::debug!("Converting batch '{}' with {} rows", source, batch.num_rows());

    let raw = (0..batch.num_rows()).map(|i| RawTrip {
        day_of_week: value_at(&day, i),
        hour: value_at(&hour, i),
        distance: value_at(&distance, i),
        tip: value_at(&tip, i),
        passengers: value_at(&passengers, i),
        zone: value_at(&zone, i).and_then(zone_id_from_f64),
        payment_type: value_at(&payment, i),
    });

    Ok(accept_rows(raw, filter, source))
}
