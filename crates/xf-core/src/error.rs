use thiserror::Error;

use crate::filter::OwnerKey;

/// Errors reported by the cross-filter engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("record store has not been loaded")]
    StoreNotLoaded,

    #[error("no widget registered for owner '{0}'")]
    UnknownWidget(OwnerKey),

    #[error("a widget is already registered for owner '{0}'")]
    DuplicateWidget(OwnerKey),
}
