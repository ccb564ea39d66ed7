//! Inventory view logic: visibility, filtering, stock badges and the
//! dashboard summary. No I/O; the page controllers feed these functions.

#[cfg(test)]
#[path = "inventory_test.rs"]
mod inventory_test;

use std::fmt;

use crate::net::types::{Item, ItemInput};

/// Items below this quantity count as low stock on the dashboard.
pub const LOW_STOCK_THRESHOLD: i64 = 10;
/// Items below this quantity (but in stock) get the warning badge.
pub const WARNING_THRESHOLD: i64 = 5;
/// Type filter value meaning "no type filter".
pub const ALL_TYPES: &str = "all";

pub const ADD_REQUIRES_ADMIN: &str = "Only admins can add items.";
pub const NAME_AND_TYPE_REQUIRED: &str = "Name and Type are required.";
pub const QUANTITY_TOO_LOW: &str = "Quantity must be at least 1.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    OutOfStock,
    Warning,
    Low,
}

impl StockStatus {
    pub fn of(quantity: i64) -> Self {
        match quantity {
            q if q <= 0 => Self::OutOfStock,
            q if q < WARNING_THRESHOLD => Self::Warning,
            _ => Self::Low,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::OutOfStock => "Out of Stock",
            Self::Warning => "Warning",
            Self::Low => "Low Stock",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Items a user may see. Non-admins never see out-of-stock items.
pub fn visible_items(items: &[Item], is_admin: bool) -> Vec<Item> {
    items.iter().filter(|item| is_admin || item.quantity > 0).cloned().collect()
}

/// Filter state of the inventory list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFilter {
    pub kind: String,
    pub search: String,
}

impl Default for ItemFilter {
    fn default() -> Self {
        Self { kind: ALL_TYPES.to_owned(), search: String::new() }
    }
}

impl ItemFilter {
    pub fn matches(&self, item: &Item) -> bool {
        let kind_ok = self.kind == ALL_TYPES || item.kind == self.kind;
        let needle = self.search.to_lowercase();
        kind_ok && (needle.is_empty() || item.name.to_lowercase().contains(&needle))
    }

    pub fn apply(&self, items: &[Item]) -> Vec<Item> {
        items.iter().filter(|item| self.matches(item)).cloned().collect()
    }
}

/// Distinct non-empty item types, in first-seen order.
pub fn unique_types(items: &[Item]) -> Vec<String> {
    let mut types: Vec<String> = Vec::new();
    for item in items {
        if !item.kind.is_empty() && !types.contains(&item.kind) {
            types.push(item.kind.clone());
        }
    }
    types
}

/// Check a new-item form before it is sent. Returns the trimmed input, or
/// the message to show the user.
///
/// # Errors
///
/// Returns one of [`ADD_REQUIRES_ADMIN`], [`NAME_AND_TYPE_REQUIRED`] or
/// [`QUANTITY_TOO_LOW`].
pub fn validate_new_item(input: &ItemInput, is_admin: bool) -> Result<ItemInput, &'static str> {
    if !is_admin {
        return Err(ADD_REQUIRES_ADMIN);
    }
    let name = input.name.trim();
    let kind = input.kind.trim();
    if name.is_empty() || kind.is_empty() {
        return Err(NAME_AND_TYPE_REQUIRED);
    }
    if input.quantity < 1 {
        return Err(QUANTITY_TOO_LOW);
    }
    Ok(ItemInput { name: name.to_owned(), kind: kind.to_owned(), quantity: input.quantity })
}

/// Figures shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSummary {
    pub total_items: usize,
    pub low_stock: Vec<Item>,
    /// Only populated for admins.
    pub total_users: Option<usize>,
}

impl DashboardSummary {
    pub fn from_items(items: &[Item]) -> Self {
        Self {
            total_items: items.len(),
            low_stock: items.iter().filter(|item| item.quantity < LOW_STOCK_THRESHOLD).cloned().collect(),
            total_users: None,
        }
    }
}
