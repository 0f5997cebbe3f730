//! CSV trip source

use std::io::Read;
use std::path::PathBuf;

use serde::Deserialize;
use xf_core::TripRow;

use super::{accept_rows, columns, IngestFilter, RawTrip, TripSource};
use crate::zones::normalize_zone_id;
use crate::DataError;

/// One CSV record. Numeric columns are read as floats since exports often
/// write integer columns as `1.0`; unparseable cells become `None`.
#[derive(Debug, Deserialize)]
struct CsvTrip {
    #[serde(rename = "pickup_day_of_week", default, deserialize_with = "csv::invalid_option")]
    day_of_week: Option<f64>,
    #[serde(rename = "pickup_hour", default, deserialize_with = "csv::invalid_option")]
    hour: Option<f64>,
    #[serde(rename = "trip_distance", default, deserialize_with = "csv::invalid_option")]
    distance: Option<f64>,
    #[serde(rename = "tip_amount", default, deserialize_with = "csv::invalid_option")]
    tip: Option<f64>,
    #[serde(rename = "passenger_count", default, deserialize_with = "csv::invalid_option")]
    passengers: Option<f64>,
    #[serde(rename = "PULocationID", default)]
    zone: Option<String>,
    #[serde(rename = "payment_type", default, deserialize_with = "csv::invalid_option")]
    payment_type: Option<f64>,
}

impl From<CsvTrip> for RawTrip {
    fn from(trip: CsvTrip) -> Self {
        RawTrip {
            day_of_week: trip.day_of_week,
            hour: trip.hour,
            distance: trip.distance,
            tip: trip.tip,
            passengers: trip.passengers,
            zone: trip.zone.as_deref().and_then(normalize_zone_id),
            payment_type: trip.payment_type,
        }
    }
}

/// Trip source backed by a CSV file with a header row
pub struct CsvTripSource {
    path: PathBuf,
    name: String,
    filter: IngestFilter,
}

impl CsvTripSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown.csv")
            .to_string();
        Self {
            path,
            name,
            filter: IngestFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: IngestFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Read rows from any reader
    pub fn read_from<R: Read>(reader: R, filter: &IngestFilter, source: &str) -> Result<Vec<TripRow>, DataError> {
        let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        for required in [
            columns::DAY_OF_WEEK,
            columns::HOUR,
            columns::DISTANCE,
            columns::TIP,
            columns::PAYMENT_TYPE,
        ] {
            if !headers.iter().any(|h| h == required) {
                return Err(DataError::MissingColumn(required.to_string()));
            }
        }

        let mut raw = Vec::new();
        for record in csv_reader.deserialize::<CsvTrip>() {
            raw.push(RawTrip::from(record?));
        }

        Ok(accept_rows(raw, filter, source))
    }
}

#[async_trait::async_trait]
impl TripSource for CsvTripSource {
    async fn load(&self) -> Result<Vec<TripRow>, DataError> {
        let path = self.path.clone();
        let filter = self.filter.clone();
        let name = self.name.clone();

        tokio::task::spawn_blocking(move || {
            let file = std::fs::File::open(&path)?;
            CsvTripSource::read_from(std::io::BufReader::new(file), &filter, &name)
        })
        .await?
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
pickup_day_of_week,pickup_hour,trip_distance,tip_amount,passenger_count,PULocationID,payment_type,fare_amount
1,8,2.5,1.0,1,132,1,12.0
2,9,0,0,1,132,2,3.0
3,23,4.25,2.5,2.0,\"7\",1.0,20.0
4,10,1.5,0,,48,2,8.0
x,10,1.5,0,1,48,2,8.0
";

    #[test]
    fn test_read_with_default_filter() {
        let rows = CsvTripSource::read_from(SAMPLE.as_bytes(), &IngestFilter::default(), "sample").unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].zone, Some(132));
        assert_eq!(rows[1].zone, Some(7));
        assert_eq!(rows[1].passengers, Some(2));
        assert_eq!(rows[1].payment_type, 1);
    }

    #[test]
    fn test_read_permissive_keeps_missing_passengers() {
        let rows = CsvTripSource::read_from(SAMPLE.as_bytes(), &IngestFilter::permissive(), "sample").unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].passengers, None);
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "pickup_hour,trip_distance\n1,2\n";
        let err = CsvTripSource::read_from(csv.as_bytes(), &IngestFilter::default(), "bad").unwrap_err();

        assert!(matches!(err, DataError::MissingColumn(ref c) if c == "pickup_day_of_week"));
    }

    #[tokio::test]
    async fn test_async_load_missing_file() {
        let source = CsvTripSource::new("/nonexistent/trips.csv");
        assert_eq!(source.source_name(), "trips.csv");

        let result = source.load().await;
        assert!(matches!(result, Err(DataError::Io(_))));
    }
}
