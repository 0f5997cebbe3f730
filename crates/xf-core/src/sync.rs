//! Recompute loop coordinating the registry and every registered widget

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::FilterError;
use crate::filter::{evaluate, FilterDescriptor, FilterHandle, FilterRegistry, OwnerKey};
use crate::record::RecordStore;
use crate::widget::{FilterWidget, Gesture, GestureOutcome};

/// Result of one recompute pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    /// Rows passing every active filter
    pub matched: usize,
    /// Rows in the store
    pub total: usize,
    /// Number of active registry entries
    pub active_filters: usize,
}

/// The cross-filter engine.
///
/// Owns the record store, the filter registry and the widgets. Every
/// registry change goes through this type and is followed by exactly one
/// evaluation and one render of every widget.
pub struct CrossFilter<W: ?Sized + FilterWidget = dyn FilterWidget> {
    store: Option<RecordStore>,
    registry: Arc<RwLock<FilterRegistry>>,
    widgets: Vec<Box<W>>,
    last_pass: Option<PassSummary>,
}

impl<W: ?Sized + FilterWidget> CrossFilter<W> {
    pub fn new() -> Self {
        Self {
            store: None,
            registry: Arc::new(RwLock::new(FilterRegistry::new())),
            widgets: Vec::new(),
            last_pass: None,
        }
    }

    /// Read-only registry handle to pass to widgets at construction
    pub fn filter_handle(&self) -> FilterHandle {
        FilterHandle::new(self.registry.clone())
    }

    /// Add a widget. Owner keys must be unique.
    pub fn register(&mut self, widget: Box<W>) -> Result<(), FilterError> {
        if self.widgets.iter().any(|w| w.owner() == widget.owner()) {
            return Err(FilterError::DuplicateWidget(widget.owner().clone()));
        }
        tracing::debug!("Registered widget '{}'", widget.owner());
        self.widgets.push(widget);
        Ok(())
    }

    /// Install a fresh dataset. The registry is emptied and every widget is
    /// rendered from the new store.
    pub fn load(&mut self, store: RecordStore) -> PassSummary {
        tracing::info!("Loading {} records into cross-filter", store.len());
        self.registry.write().clear_all();
        self.store = Some(store);
        self.run_pass()
    }

    pub fn is_loaded(&self) -> bool {
        self.store.is_some()
    }

    pub fn store(&self) -> Option<&RecordStore> {
        self.store.as_ref()
    }

    /// Route a gesture to its owner and recompute if the registry changed.
    /// Returns `None` when the widget ignored the gesture.
    pub fn handle_gesture(&mut self, owner: &OwnerKey, gesture: &Gesture) -> Result<Option<PassSummary>, FilterError> {
        if self.store.is_none() {
            return Err(FilterError::StoreNotLoaded);
        }

        let widget = self
            .widgets
            .iter_mut()
            .find(|w| w.owner() == owner)
            .ok_or_else(|| FilterError::UnknownWidget(owner.clone()))?;

        match widget.on_gesture(gesture) {
            GestureOutcome::Set(descriptor) => {
                self.registry.write().set(owner.clone(), descriptor);
            }
            GestureOutcome::Clear => {
                self.registry.write().clear(owner);
            }
            GestureOutcome::Ignore => return Ok(None),
        }

        Ok(Some(self.run_pass()))
    }

    /// Set a filter directly on behalf of an owner, then recompute
    pub fn set_filter(&mut self, owner: OwnerKey, descriptor: FilterDescriptor) -> Result<PassSummary, FilterError> {
        if self.store.is_none() {
            return Err(FilterError::StoreNotLoaded);
        }
        self.registry.write().set(owner, descriptor);
        Ok(self.run_pass())
    }

    /// Clear one owner's filter, then recompute
    pub fn clear_filter(&mut self, owner: &OwnerKey) -> Result<PassSummary, FilterError> {
        if self.store.is_none() {
            return Err(FilterError::StoreNotLoaded);
        }
        self.registry.write().clear(owner);
        Ok(self.run_pass())
    }

    /// Drop every filter and redraw from the full store
    pub fn reset(&mut self) -> Result<PassSummary, FilterError> {
        if self.store.is_none() {
            return Err(FilterError::StoreNotLoaded);
        }
        tracing::info!("Resetting all filters");
        self.registry.write().clear_all();
        Ok(self.run_pass())
    }

    /// Re-render without a registry change, e.g. after a resize
    pub fn recompute(&mut self) -> Result<PassSummary, FilterError> {
        if self.store.is_none() {
            return Err(FilterError::StoreNotLoaded);
        }
        Ok(self.run_pass())
    }

    pub fn last_pass(&self) -> Option<PassSummary> {
        self.last_pass
    }

    /// Rows that passed the latest pass, zero before the first load
    pub fn filtered_len(&self) -> usize {
        self.last_pass.map_or(0, |pass| pass.matched)
    }

    pub fn widgets(&self) -> impl Iterator<Item = &W> {
        self.widgets.iter().map(|w| w.as_ref())
    }

    pub fn widget(&self, owner: &OwnerKey) -> Option<&W> {
        self.widgets.iter().find(|w| w.owner() == owner).map(|w| w.as_ref())
    }

    pub fn widget_mut(&mut self, owner: &OwnerKey) -> Option<&mut W> {
        self.widgets.iter_mut().find(|w| w.owner() == owner).map(|w| w.as_mut())
    }

    fn run_pass(&mut self) -> PassSummary {
        let Some(store) = self.store.as_ref() else {
            return PassSummary {
                matched: 0,
                total: 0,
                active_filters: 0,
            };
        };

        // The lock is released before widgets render so they can read it
        let (filtered, active_filters) = {
            let registry = self.registry.read();
            (evaluate(store, &registry), registry.len())
        };
        let full = store.full_view();

        for widget in self.widgets.iter_mut() {
            let source = if widget.self_excluding() { &full } else { &filtered };
            widget.render(source);
        }

        let summary = PassSummary {
            matched: filtered.len(),
            total: store.len(),
            active_filters,
        };
        tracing::debug!(
            "Recompute pass: {} / {} rows, {} active filters, {} widgets",
            summary.matched,
            summary.total,
            summary.active_filters,
            self.widgets.len()
        );
        self.last_pass = Some(summary);
        summary
    }
}

impl<W: ?Sized + FilterWidget> Default for CrossFilter<W> {
    fn default() -> Self {
        Self::new()
    }
}
