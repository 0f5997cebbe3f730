//! Pure grouping functions over row sequences
//!
//! Every function accepts any iterator of records so the same code serves the
//! full store and filtered views. Empty input yields empty maps.

use std::collections::BTreeMap;

use crate::record::{Field, TripRecord};

/// Count rows per key. Rows whose key is `None` are skipped.
pub fn count_by<'r, I, K, F>(rows: I, key: F) -> BTreeMap<K, usize>
where
    I: IntoIterator<Item = &'r TripRecord>,
    K: Ord,
    F: Fn(&TripRecord) -> Option<K>,
{
    let mut counts = BTreeMap::new();
    for record in rows {
        if let Some(k) = key(record) {
            *counts.entry(k).or_insert(0) += 1;
        }
    }
    counts
}

/// Count rows per pair of keys
pub fn count_by2<'r, I, K1, K2, F1, F2>(rows: I, key1: F1, key2: F2) -> BTreeMap<(K1, K2), usize>
where
    I: IntoIterator<Item = &'r TripRecord>,
    K1: Ord,
    K2: Ord,
    F1: Fn(&TripRecord) -> Option<K1>,
    F2: Fn(&TripRecord) -> Option<K2>,
{
    count_by(rows, |record| Some((key1(record)?, key2(record)?)))
}

/// Sum a value per key
pub fn sum_by<'r, I, K, F, V>(rows: I, key: F, value: V) -> BTreeMap<K, f64>
where
    I: IntoIterator<Item = &'r TripRecord>,
    K: Ord,
    F: Fn(&TripRecord) -> Option<K>,
    V: Fn(&TripRecord) -> f64,
{
    let mut sums = BTreeMap::new();
    for record in rows {
        if let Some(k) = key(record) {
            *sums.entry(k).or_insert(0.0) += value(record);
        }
    }
    sums
}

/// Row counts per integer value of a field
pub fn count_by_field<'r, I>(rows: I, field: Field) -> BTreeMap<i64, usize>
where
    I: IntoIterator<Item = &'r TripRecord>,
{
    count_by(rows, |record| record.discrete(field))
}

/// Largest finite value of a field, `None` for empty input
pub fn max_value<'r, I>(rows: I, field: Field) -> Option<f64>
where
    I: IntoIterator<Item = &'r TripRecord>,
{
    rows.into_iter()
        .filter_map(|record| record.value(field))
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
}

/// Largest count in a grouping, zero when empty
pub fn max_count<K>(counts: &BTreeMap<K, usize>) -> usize {
    counts.values().copied().max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::row;
    use crate::record::{CategoryLabels, RecordStore};

    fn day_store() -> RecordStore {
        let days = [0, 0, 1, 1, 1, 2, 3, 3, 3, 3];
        RecordStore::new(days.iter().map(|&d| row(d, 12)).collect(), &CategoryLabels::default())
    }

    #[test]
    fn test_count_by_day() {
        let store = day_store();
        let counts = count_by_field(store.records(), Field::DayOfWeek);

        let expected: BTreeMap<i64, usize> = [(0, 2), (1, 3), (2, 1), (3, 4)].into_iter().collect();
        assert_eq!(counts, expected);
        assert_eq!(max_count(&counts), 4);
    }

    #[test]
    fn test_count_by_two_keys() {
        let rows = vec![row(1, 8), row(1, 8), row(1, 9), row(2, 8)];
        let store = RecordStore::new(rows, &CategoryLabels::default());

        let grid = count_by2(
            store.records(),
            |r| Some(r.day_of_week()),
            |r| Some(r.hour()),
        );

        assert_eq!(grid.get(&(1, 8)), Some(&2));
        assert_eq!(grid.get(&(1, 9)), Some(&1));
        assert_eq!(grid.get(&(2, 8)), Some(&1));
        assert_eq!(grid.len(), 3);
    }

    #[test]
    fn test_sum_by_label() {
        let store = day_store();
        let tips = sum_by(store.records(), |r| Some(r.payment_label().to_string()), |r| r.tip());

        assert_eq!(tips.get("Credit card"), Some(&5.0));
    }

    #[test]
    fn test_empty_input() {
        let empty: Vec<TripRecord> = Vec::new();

        assert!(count_by_field(&empty, Field::Hour).is_empty());
        assert_eq!(max_value(&empty, Field::Distance), None);
        assert_eq!(max_count(&BTreeMap::<i64, usize>::new()), 0);
    }
}
