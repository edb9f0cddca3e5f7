//! Menu Item Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{CategorySummary, Identified, Ref, string_enum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Availability {
    #[default]
    Available,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

string_enum!(Availability, "availability", {
    Available => "Available",
    OutOfStock => "Out of Stock",
});

impl Availability {
    pub fn toggled(&self) -> Availability {
        match self {
            Availability::Available => Availability::OutOfStock,
            Availability::OutOfStock => Availability::Available,
        }
    }
}

/// Menu item entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Ref<CategorySummary>>,
    #[serde(default)]
    pub availability_status: Availability,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl MenuItem {
    pub fn is_available(&self) -> bool {
        self.availability_status == Availability::Available
    }

    pub fn summary(&self) -> MenuItemSummary {
        MenuItemSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
        }
    }
}

impl Identified for MenuItem {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Menu item reference as embedded in order items and cart lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItemSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: Decimal,
}

impl Identified for MenuItemSummary {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Create or replace a menu item (JSON form; image upload is not supported)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemUpsert {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub price: Decimal,
    /// Category id
    #[validate(length(min = 1, message = "category is required"))]
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_status: Option<Availability>,
}

/// `PATCH /menu/:id/availability`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityUpdate {
    pub availability_status: Availability,
}
