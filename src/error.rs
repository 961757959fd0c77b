//! Error types for the multi-map and its weight-bounded box.

use crate::item::Item;
use thiserror::Error;

/// Returned by extraction when no stored value matches the key (and
/// predicate, when one is supplied).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum ExtractError {
    #[error("no stored value matches the requested key")]
    NotFound,
}

/// Errors raised by [`WeightBox`](crate::WeightBox).
///
/// Variants that reject an insertion hand the item back so the caller keeps
/// ownership of it; see [`BoxError::into_item`].
#[derive(Debug, PartialEq, Error)]
pub enum BoxError {
    #[error("item {item} would exceed capacity ({current} of {max} in use)")]
    CapacityExceeded { item: Item, current: f32, max: f32 },

    #[error("item {item} rejected: {reason}")]
    InvalidItem { item: Item, reason: &'static str },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    NotFound(#[from] ExtractError),
}

impl BoxError {
    /// Recover the item carried by a rejected insertion.
    pub fn into_item(self) -> Option<Item> {
        match self {
            BoxError::CapacityExceeded { item, .. } | BoxError::InvalidItem { item, .. } => {
                Some(item)
            }
            BoxError::InvalidArgument(_) | BoxError::NotFound(_) => None,
        }
    }
}
