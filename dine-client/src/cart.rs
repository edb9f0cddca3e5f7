//! Customer cart for QR ordering
//!
//! Lines are keyed by menu item: adding an item that is already in the cart
//! adds to its quantity. The cart only empties on explicit `clear` or after
//! the backend accepted the order.

use rust_decimal::Decimal;
use shared::models::{MenuItemSummary, NewOrderItem, PublicOrderCreate};
use shared::Order;
use validator::Validate;

use crate::api::OrdersApi;
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub menu_item: MenuItemSummary,
    pub quantity: u32,
    pub notes: Option<String>,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.menu_item.price * Decimal::from(self.quantity)
    }
}

/// The table the order is for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartTable {
    pub id: String,
    pub number: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
    table: Option<CartTable>,
    customer_name: String,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, menu_item_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.menu_item.id == menu_item_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn table(&self) -> Option<&CartTable> {
        self.table.as_ref()
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    /// Add `quantity` of an item; an existing line keeps its notes and grows
    pub fn add_item(&mut self, menu_item: MenuItemSummary, quantity: u32, notes: Option<String>) {
        if quantity == 0 {
            return;
        }
        match self
            .lines
            .iter_mut()
            .find(|l| l.menu_item.id == menu_item.id)
        {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLine {
                menu_item,
                quantity,
                notes: notes.filter(|n| !n.trim().is_empty()),
            }),
        }
    }

    /// Set a line's quantity; zero or below removes the line
    pub fn update_quantity(&mut self, menu_item_id: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(menu_item_id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(line) = self.lines.iter_mut().find(|l| l.menu_item.id == menu_item_id) {
            line.quantity = quantity;
        }
    }

    pub fn remove_item(&mut self, menu_item_id: &str) {
        self.lines.retain(|l| l.menu_item.id != menu_item_id);
    }

    pub fn update_notes(&mut self, menu_item_id: &str, notes: Option<String>) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.menu_item.id == menu_item_id) {
            line.notes = notes.filter(|n| !n.trim().is_empty());
        }
    }

    /// Empty the lines and forget the name; the table stays
    pub fn clear(&mut self) {
        self.lines.clear();
        self.customer_name.clear();
    }

    pub fn set_table(&mut self, id: impl Into<String>, number: u32) {
        self.table = Some(CartTable {
            id: id.into(),
            number,
        });
    }

    pub fn set_customer_name(&mut self, name: impl Into<String>) {
        self.customer_name = name.into();
    }

    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Units across all lines
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |count, l| count.saturating_add(l.quantity))
    }

    /// The order body, or why the cart cannot be submitted yet
    pub fn submission(&self) -> ClientResult<PublicOrderCreate> {
        let customer_name = self.customer_name.trim();
        if customer_name.is_empty() {
            return Err(ClientError::Validation("Please enter your name".into()));
        }
        if self.lines.is_empty() {
            return Err(ClientError::Validation("Your cart is empty".into()));
        }
        let Some(table) = &self.table else {
            return Err(ClientError::Validation("No table selected".into()));
        };

        let order = PublicOrderCreate {
            table_id: table.id.clone(),
            customer_name: customer_name.to_string(),
            items: self
                .lines
                .iter()
                .map(|l| NewOrderItem {
                    menu_item: l.menu_item.id.clone(),
                    quantity: l.quantity,
                    notes: l.notes.clone(),
                })
                .collect(),
        };
        order.validate()?;
        Ok(order)
    }

    /// Place the order; the cart is cleared only if the backend accepts it
    pub async fn submit(&mut self, orders: &OrdersApi) -> ClientResult<Order> {
        let body = self.submission()?;
        let order = orders.create_public(&body).await?;
        tracing::info!(order_id = %order.id, items = body.items.len(), "Order placed");
        self.clear();
        Ok(order)
    }
}
