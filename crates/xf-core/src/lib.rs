//! Core cross-filter engine for the trip dashboard
//!
//! This crate owns the loaded trip records, the per-widget filter registry,
//! predicate evaluation and the recompute loop that re-renders every widget
//! after a gesture. Drawing lives in `xf-views`; ingestion in `xf-data`.

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod record;
pub mod sync;
pub mod view;
pub mod widget;

// Re-export commonly used types
pub use error::FilterError;
pub use filter::{evaluate, FilterDescriptor, FilterHandle, FilterRegistry, OwnerKey, Predicate};
pub use record::{CategoryLabels, Field, FieldDomain, RecordStore, TripRecord, TripRow};
pub use sync::{CrossFilter, PassSummary};
pub use view::{FilteredView, Rows};
pub use widget::{FilterWidget, Gesture, GestureOutcome};
