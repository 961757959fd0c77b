//! Item: the sellable value stored in boxes.
//!
//! Items are move-only. They deliberately implement neither `Clone` nor
//! `Copy`; handing one to a container consumes the binding. Where a slot has
//! to be vacated in place (a struct field, a `Vec` element), `Item::take`
//! moves the item out and leaves an invalidated husk behind.

use core::fmt;

/// Identifies an item category. Several stored items may share an id.
pub type ItemId = i32;

#[derive(Debug)]
pub struct Item {
    id: ItemId,
    weight: f32,
    large: bool,
}

impl Item {
    /// Id carried by an item whose contents were moved out with `take`.
    pub const INVALID_ID: ItemId = -1;

    pub fn new(id: ItemId, weight: f32) -> Self {
        Self::with_size(id, weight, false)
    }

    pub fn with_size(id: ItemId, weight: f32, large: bool) -> Self {
        Self { id, weight, large }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Items flagged large may need special handling when moved around.
    pub fn is_large(&self) -> bool {
        self.large
    }

    pub fn is_valid(&self) -> bool {
        self.id != Self::INVALID_ID
    }

    /// Transfer the item out of `self`, leaving `self` invalidated.
    pub fn take(&mut self) -> Item {
        let taken = Item {
            id: self.id,
            weight: self.weight,
            large: self.large,
        };
        self.id = Self::INVALID_ID;
        taken
    }
}

/// Items compare equal when their ids match; weight and size are ignored.
impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({} kg", self.id, self.weight)?;
        if self.large {
            f.write_str(", large")?;
        }
        f.write_str(")")
    }
}
