//! Filter descriptors and their compiled predicates

use serde::{Deserialize, Serialize};

use crate::record::{Field, TripRecord};

/// A boolean function of one row
pub type Predicate = Box<dyn Fn(&TripRecord) -> bool>;

/// Serializable description of one widget's active selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterDescriptor {
    /// Continuous rectangular brush, both dimensions must pass
    #[serde(rename = "range_2d")]
    Range2D {
        dim1: Field,
        lo1: f64,
        hi1: f64,
        dim2: Field,
        lo2: f64,
        hi2: f64,
    },

    /// Inclusive integer bucket range on one field
    DiscreteBucket { dim: Field, lo: i64, hi: i64 },

    /// Single-value toggle
    DiscreteEquals { dim: Field, value: i64 },

    /// Inclusive integer window over two fields (day/hour brush)
    BucketGrid {
        dim1: Field,
        lo1: i64,
        hi1: i64,
        dim2: Field,
        lo2: i64,
        hi2: i64,
    },
}

impl FilterDescriptor {
    /// Clamp bounds into each field's domain. Reversed bounds are swapped and
    /// NaN bounds widen to the domain edge, so the result is always usable.
    pub fn normalized(self) -> Self {
        match self {
            FilterDescriptor::Range2D { dim1, lo1, hi1, dim2, lo2, hi2 } => {
                let (lo1, hi1) = continuous_bounds(dim1, lo1, hi1);
                let (lo2, hi2) = continuous_bounds(dim2, lo2, hi2);
                FilterDescriptor::Range2D { dim1, lo1, hi1, dim2, lo2, hi2 }
            }
            FilterDescriptor::DiscreteBucket { dim, lo, hi } => {
                let (lo, hi) = discrete_bounds(dim, lo, hi);
                FilterDescriptor::DiscreteBucket { dim, lo, hi }
            }
            FilterDescriptor::DiscreteEquals { dim, value } => FilterDescriptor::DiscreteEquals {
                dim,
                value: dim.domain().clamp_i64(value),
            },
            FilterDescriptor::BucketGrid { dim1, lo1, hi1, dim2, lo2, hi2 } => {
                let (lo1, hi1) = discrete_bounds(dim1, lo1, hi1);
                let (lo2, hi2) = discrete_bounds(dim2, lo2, hi2);
                FilterDescriptor::BucketGrid { dim1, lo1, hi1, dim2, lo2, hi2 }
            }
        }
    }

    /// Test one row. An absent optional field never matches.
    pub fn matches(&self, record: &TripRecord) -> bool {
        match *self {
            FilterDescriptor::Range2D { dim1, lo1, hi1, dim2, lo2, hi2 } => {
                in_range(record.value(dim1), lo1, hi1) && in_range(record.value(dim2), lo2, hi2)
            }
            FilterDescriptor::DiscreteBucket { dim, lo, hi } => in_bucket(record.discrete(dim), lo, hi),
            FilterDescriptor::DiscreteEquals { dim, value } => record.discrete(dim) == Some(value),
            FilterDescriptor::BucketGrid { dim1, lo1, hi1, dim2, lo2, hi2 } => {
                in_bucket(record.discrete(dim1), lo1, hi1) && in_bucket(record.discrete(dim2), lo2, hi2)
            }
        }
    }

    /// Compile into a standalone predicate closure
    pub fn compile(&self) -> Predicate {
        let descriptor = self.clone();
        Box::new(move |record| descriptor.matches(record))
    }
}

fn in_range(value: Option<f64>, lo: f64, hi: f64) -> bool {
    value.map_or(false, |v| lo <= v && v <= hi)
}

fn in_bucket(value: Option<i64>, lo: i64, hi: i64) -> bool {
    value.map_or(false, |v| lo <= v && v <= hi)
}

fn continuous_bounds(dim: Field, lo: f64, hi: f64) -> (f64, f64) {
    let domain = dim.domain();
    let lo = if lo.is_nan() { domain.min() } else { domain.clamp_f64(lo) };
    let hi = if hi.is_nan() { domain.max() } else { domain.clamp_f64(hi) };
    if lo <= hi {
        (lo, hi)
    } else {
        (hi, lo)
    }
}

fn discrete_bounds(dim: Field, lo: i64, hi: i64) -> (i64, i64) {
    let domain = dim.domain();
    let (lo, hi) = (domain.clamp_i64(lo), domain.clamp_i64(hi));
    (lo.min(hi), lo.max(hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::row;
    use crate::record::{CategoryLabels, RecordStore};

    #[test]
    fn test_normalize_swaps_and_clamps() {
        let descriptor = FilterDescriptor::BucketGrid {
            dim1: Field::Hour,
            lo1: 30,
            hi1: 5,
            dim2: Field::DayOfWeek,
            lo2: -2,
            hi2: 3,
        }
        .normalized();

        assert_eq!(
            descriptor,
            FilterDescriptor::BucketGrid {
                dim1: Field::Hour,
                lo1: 5,
                hi1: 23,
                dim2: Field::DayOfWeek,
                lo2: 0,
                hi2: 3,
            }
        );
    }

    #[test]
    fn test_normalize_widens_nan_bounds() {
        let descriptor = FilterDescriptor::Range2D {
            dim1: Field::Distance,
            lo1: f64::NAN,
            hi1: 4.0,
            dim2: Field::Tip,
            lo2: 2.0,
            hi2: f64::NAN,
        }
        .normalized();

        match descriptor {
            FilterDescriptor::Range2D { lo1, hi1, lo2, hi2, .. } => {
                assert_eq!((lo1, hi1), (0.0, 4.0));
                assert_eq!(lo2, 2.0);
                assert!(hi2.is_infinite());
            }
            other => panic!("unexpected descriptor {:?}", other),
        }
    }

    #[test]
    fn test_missing_optional_field_never_matches() {
        let mut trip = row(1, 1);
        trip.zone = None;
        let store = RecordStore::new(vec![trip], &CategoryLabels::default());
        let record = &store.records()[0];

        let any_zone = FilterDescriptor::DiscreteBucket {
            dim: Field::Zone,
            lo: 0,
            hi: u32::MAX as i64,
        };
        assert!(!any_zone.matches(record));
    }

    #[test]
    fn test_descriptor_json_is_tagged() {
        let descriptor = FilterDescriptor::DiscreteEquals {
            dim: Field::DayOfWeek,
            value: 1,
        };
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["kind"], "discrete_equals");
        assert_eq!(json["dim"], "day_of_week");

        let back: FilterDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(back, descriptor);
    }
}
