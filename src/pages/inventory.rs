//! Inventory list, item detail, and the admin add/edit/delete flows.

#[cfg(test)]
#[path = "inventory_test.rs"]
mod inventory_test;

use super::{PageContext, PageError, failure_message};
use crate::nav::View;
use crate::net::api::{self, ImageUpload};
use crate::net::types::{Item, ItemInput};
use crate::state::inventory::{self, ItemFilter};

pub const LOAD_FAILED: &str = "Failed to load inventory data";
pub const ITEM_ADDED: &str = "Item added successfully";
pub const ADD_FAILED: &str = "Failed to add item";
pub const ITEM_DELETED: &str = "Item deleted successfully";
pub const DELETE_FAILED: &str = "Failed to delete item";
pub const ITEM_LOAD_FAILED: &str = "Failed to load item data";
pub const ITEM_UPDATED: &str = "Item updated successfully";
pub const UPDATE_FAILED: &str = "Failed to update item";

pub struct InventoryPage {
    ctx: PageContext,
    items: Vec<Item>,
    pub filter: ItemFilter,
}

impl InventoryPage {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx, items: Vec::new(), filter: ItemFilter::default() }
    }

    /// Every loaded row, before visibility rules.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Rows this user may see, after the type and search filters.
    pub fn visible(&self) -> Vec<Item> {
        self.filter.apply(&inventory::visible_items(&self.items, self.ctx.session.is_admin()))
    }

    /// Options for the type filter.
    pub fn types(&self) -> Vec<String> {
        inventory::unique_types(&self.items)
    }

    /// # Errors
    ///
    /// Returns the API failure after toasting it.
    pub async fn load(&mut self) -> Result<(), PageError> {
        match api::list_items(&self.ctx.api).await {
            Ok(items) => {
                tracing::debug!(count = items.len(), "inventory loaded");
                self.items = items;
                Ok(())
            }
            Err(error) => {
                tracing::error!(%error, "inventory failed to load");
                self.ctx.notifier.error(LOAD_FAILED);
                Err(error.into())
            }
        }
    }

    /// Validate and create an item, optionally with an image, then reload.
    ///
    /// # Errors
    ///
    /// [`PageError::Invalid`] when the form is rejected locally, otherwise the
    /// API failure. Both are toasted.
    pub async fn add(&mut self, input: &ItemInput, image: Option<ImageUpload>) -> Result<(), PageError> {
        let input = match inventory::validate_new_item(input, self.ctx.session.is_admin()) {
            Ok(input) => input,
            Err(message) => {
                self.ctx.notifier.error(message);
                return Err(PageError::Invalid(message));
            }
        };

        let created = match image {
            Some(image) => api::create_item_with_image(&self.ctx.api, &input, image).await,
            None => api::create_item(&self.ctx.api, &input).await,
        };
        match created {
            Ok(envelope) => {
                tracing::info!(name = %input.name, "item added");
                self.ctx.notifier.success(envelope.message().unwrap_or(ITEM_ADDED));
            }
            Err(error) => {
                tracing::error!(%error, "adding item failed");
                self.ctx.notifier.error(&failure_message(&error, ADD_FAILED));
                return Err(error.into());
            }
        }
        self.load().await
    }

    /// # Errors
    ///
    /// Returns the API failure after toasting it; the row is kept.
    pub async fn delete(&mut self, id: u64) -> Result<(), PageError> {
        match api::delete_item(&self.ctx.api, id).await {
            Ok(_) => {
                self.items.retain(|item| item.id != id);
                tracing::info!(id, "item deleted");
                self.ctx.notifier.success(ITEM_DELETED);
                Ok(())
            }
            Err(error) => {
                tracing::error!(%error, id, "deleting item failed");
                self.ctx.notifier.error(&error.message_or(DELETE_FAILED));
                Err(error.into())
            }
        }
    }
}

/// Load one item for the detail or edit view. On failure the user is sent
/// back to the inventory list.
///
/// # Errors
///
/// Returns the API failure after toasting it and navigating.
pub async fn load_item(ctx: &PageContext, id: u64) -> Result<Item, PageError> {
    match api::get_item(&ctx.api, id).await {
        Ok(item) => Ok(item),
        Err(error) => {
            tracing::error!(%error, id, "item failed to load");
            ctx.notifier.error(&error.message_or(ITEM_LOAD_FAILED));
            ctx.navigator.navigate(View::Inventory);
            Err(error.into())
        }
    }
}

/// Save an edited item and show its detail view.
///
/// # Errors
///
/// Returns the API failure after toasting it. The view does not change.
pub async fn save_item(ctx: &PageContext, id: u64, input: &ItemInput) -> Result<(), PageError> {
    match api::update_item(&ctx.api, id, input).await {
        Ok(envelope) => {
            tracing::info!(id, "item updated");
            ctx.notifier.success(envelope.message().unwrap_or(ITEM_UPDATED));
            ctx.navigator.navigate(View::Item(id));
            Ok(())
        }
        Err(error) => {
            tracing::error!(%error, id, "updating item failed");
            ctx.notifier.error(&failure_message(&error, UPDATE_FAILED));
            Err(error.into())
        }
    }
}
