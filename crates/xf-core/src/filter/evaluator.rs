use crate::record::RecordStore;
use crate::view::FilteredView;

use super::descriptor::Predicate;
use super::registry::FilterRegistry;

/// Evaluate the conjunction of every active descriptor over the store.
///
/// An empty registry yields the whole store unchanged. Rows are tested
/// independently and rejected on the first failing predicate; the result keeps
/// store order and does not depend on the registry's iteration order.
pub fn evaluate<'a>(store: &'a RecordStore, registry: &FilterRegistry) -> FilteredView<'a> {
    if registry.is_empty() {
        return store.full_view();
    }

    let predicates: Vec<Predicate> = registry.iter().map(|(_, descriptor)| descriptor.compile()).collect();

    let rows: Vec<usize> = store
        .records()
        .iter()
        .enumerate()
        .filter(|&(_, record)| predicates.iter().all(|predicate| predicate(record)))
        .map(|(index, _)| index)
        .collect();

    tracing::debug!(
        "Evaluated {} filters: {} of {} rows match",
        predicates.len(),
        rows.len(),
        store.len()
    );

    FilteredView::from_indices(store, rows)
}
