//! QR ordering page data
//!
//! `GET /qr/order/table/:id` and `GET /qr/order/table-number/:n` return the
//! table plus the menu grouped by category.

use serde::{Deserialize, Serialize};

use super::{CategorySummary, MenuItem, Ref, TableSummary};

/// A category with its menu items nested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuSection {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderingPage {
    pub table: TableSummary,
    #[serde(default)]
    pub menu: Vec<MenuSection>,
}

impl OrderingPage {
    pub fn categories(&self) -> Vec<CategorySummary> {
        self.menu
            .iter()
            .map(|s| CategorySummary {
                id: s.id.clone(),
                name: s.name.clone(),
            })
            .collect()
    }

    /// Flattened menu; items without a category inherit their section's
    pub fn menu_items(&self) -> Vec<MenuItem> {
        self.menu
            .iter()
            .flat_map(|section| {
                section.items.iter().cloned().map(move |mut item| {
                    if item.category.is_none() {
                        item.category = Some(Ref::Id(section.id.clone()));
                    }
                    item
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_items_inherit_section() {
        let page: OrderingPage = serde_json::from_str(
            r#"{
                "table": {"_id": "t7", "tableNumber": 7},
                "menu": [
                    {"_id": "c1", "name": "Starters", "items": [
                        {"_id": "m1", "name": "Momo", "price": 250}
                    ]}
                ]
            }"#,
        )
        .unwrap();
        let items = page.menu_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category.as_ref().map(|c| c.id()), Some("c1"));
        assert_eq!(page.categories()[0].name, "Starters");
    }
}
