//! WeightBox: a container that refuses items beyond a weight budget.
//!
//! The box tracks the total weight of its contents and checks the budget
//! before handing an item to its storage. The weight lock is held across the
//! storage call, so at any quiescent point the tracked weight is the sum of
//! the stored items' weights. Predicates passed to `extract_where` run under
//! that lock and must not call back into the same box.

use crate::error::BoxError;
use crate::item::{Item, ItemId};
use crate::reentrancy::DebugReentrancy;
use crate::shared::SharedMultiMap;
use crate::storage::Storage;
use parking_lot::RwLock;

/// How the maximum weight bounds the total.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum WeightLimit {
    /// The total may reach the maximum exactly.
    #[default]
    Inclusive,
    /// The total must stay strictly below the maximum.
    Exclusive,
}

impl WeightLimit {
    fn admits(self, total: f32, max: f32) -> bool {
        match self {
            WeightLimit::Inclusive => total <= max,
            WeightLimit::Exclusive => total < max,
        }
    }
}

/// Weight budget of a [`WeightBox`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoxConfig {
    pub max_weight: f32,
    pub limit: WeightLimit,
}

impl BoxConfig {
    pub const DEFAULT_MAX_WEIGHT: f32 = 100.0;

    pub fn with_max_weight(mut self, max_weight: f32) -> Self {
        self.max_weight = max_weight;
        self
    }

    pub fn with_limit(mut self, limit: WeightLimit) -> Self {
        self.limit = limit;
        self
    }

    pub fn validate(&self) -> Result<(), BoxError> {
        if !self.max_weight.is_finite() || self.max_weight < 0.0 {
            return Err(BoxError::InvalidArgument(format!(
                "max_weight must be finite and non-negative, got {}",
                self.max_weight
            )));
        }
        Ok(())
    }
}

impl Default for BoxConfig {
    fn default() -> Self {
        Self {
            max_weight: Self::DEFAULT_MAX_WEIGHT,
            limit: WeightLimit::default(),
        }
    }
}

/// Items keyed by id, stored in `S` as long as their total weight fits the
/// configured budget.
pub struct WeightBox<S = SharedMultiMap<ItemId, Item>> {
    storage: S,
    config: BoxConfig,
    weight: RwLock<f32>,
    reentrancy: DebugReentrancy,
}

impl WeightBox {
    /// A box backed by a fresh [`SharedMultiMap`].
    pub fn new(config: BoxConfig) -> Result<Self, BoxError> {
        Self::with_storage(SharedMultiMap::new(), config)
    }
}

impl<S> WeightBox<S>
where
    S: Storage<ItemId, Item>,
{
    /// A box over caller-supplied storage. The storage must be empty: the
    /// facade cannot enumerate existing items to seed the tracked weight.
    pub fn with_storage(storage: S, config: BoxConfig) -> Result<Self, BoxError> {
        config.validate()?;
        let stored = storage.count();
        if stored != 0 {
            return Err(BoxError::InvalidArgument(format!(
                "storage must be empty, holds {} items",
                stored
            )));
        }
        Ok(Self {
            storage,
            config,
            weight: RwLock::new(0.0),
            reentrancy: DebugReentrancy::new(),
        })
    }

    pub fn config(&self) -> &BoxConfig {
        &self.config
    }

    pub fn max_weight(&self) -> f32 {
        self.config.max_weight
    }

    pub fn current_weight(&self) -> f32 {
        let _g = self.reentrancy.enter();
        *self.weight.read()
    }

    pub fn count(&self) -> usize {
        let _g = self.reentrancy.enter();
        self.storage.count()
    }

    fn admits(&self, current: f32, item: &Item) -> bool {
        self.config
            .limit
            .admits(current + item.weight(), self.config.max_weight)
    }

    /// Whether `item` would fit right now. A later `insert` may still fail if
    /// another thread fills the box in between.
    pub fn can_insert(&self, item: &Item) -> bool {
        let _g = self.reentrancy.enter();
        let current = self.weight.read();
        self.admits(*current, item)
    }

    /// Store `item` under its id. On rejection the item is returned inside
    /// the error and the box is unchanged.
    pub fn insert(&self, item: Item) -> Result<(), BoxError> {
        if let Some(reason) = rejection_reason(&item) {
            return Err(BoxError::InvalidItem { item, reason });
        }

        let _g = self.reentrancy.enter();
        let mut current = self.weight.write();
        if !self.admits(*current, &item) {
            tracing::warn!(
                id = item.id(),
                weight = item.weight(),
                current = *current,
                max = self.config.max_weight,
                "box rejected item over capacity"
            );
            return Err(BoxError::CapacityExceeded {
                item,
                current: *current,
                max: self.config.max_weight,
            });
        }

        *current += item.weight();
        self.storage.insert(item.id(), item);
        tracing::debug!(weight = *current, "item stored in box");
        Ok(())
    }

    pub fn contains(&self, id: ItemId) -> bool {
        let _g = self.reentrancy.enter();
        self.storage.contains(&id)
    }

    pub fn can_extract(&self, id: ItemId) -> bool {
        self.contains(id)
    }

    pub fn extract(&self, id: ItemId) -> Result<Item, BoxError> {
        self.extract_where(id, |_| true)
    }

    /// Remove the most recently stored item with `id` that satisfies `pred`.
    ///
    /// `pred` runs while the box is locked and must not call back into this
    /// box; debug builds panic if it does.
    pub fn extract_where<F>(&self, id: ItemId, mut pred: F) -> Result<Item, BoxError>
    where
        F: FnMut(&Item) -> bool,
    {
        let _g = self.reentrancy.enter();
        let mut current = self.weight.write();
        let item = self.storage.extract_where(&id, &mut pred)?;
        *current -= item.weight();
        if *current < 0.0 || self.storage.count() == 0 {
            // Absorb float drift once the box is empty.
            *current = 0.0;
        }
        tracing::debug!(weight = *current, "item taken from box");
        Ok(item)
    }
}

fn rejection_reason(item: &Item) -> Option<&'static str> {
    if !item.is_valid() {
        Some("item has been invalidated")
    } else if !item.weight().is_finite() || item.weight() < 0.0 {
        Some("weight must be finite and non-negative")
    } else {
        None
    }
}
