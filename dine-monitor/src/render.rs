//! Plain-text rendering of view snapshots

use dine_client::views::{KitchenSnapshot, KitchenTicket, TrackedOrder, TrackingStep, WaiterSnapshot};
use shared::Order;
use shared::models::RealTimeStats;
use std::fmt::Write;

pub fn kitchen(snapshot: &KitchenSnapshot) -> String {
    let counts = &snapshot.counts;
    let mut out = format!(
        "pending {} | cooking {} | ready {} | served {}\n",
        counts.pending, counts.cooking, counts.ready, counts.served
    );
    for ticket in &snapshot.tickets {
        out.push_str(&ticket_block(ticket));
    }
    out
}

fn ticket_block(ticket: &KitchenTicket) -> String {
    let table = ticket
        .table_number
        .map(|n| format!("table {n}"))
        .unwrap_or_else(|| "no table".into());
    let mut out = format!("#{} {} [{}]", ticket.short_id, table, ticket.status);
    if let Some(name) = &ticket.customer_name {
        let _ = write!(out, " {name}");
    }
    if ticket.all_ready {
        out.push_str(" ALL READY");
    }
    out.push('\n');

    for item in &ticket.items {
        let _ = write!(out, "  {}x {} ({})", item.quantity, item.name, item.status);
        if let Some(next) = item.action {
            let _ = write!(out, " -> {next}");
        }
        if let Some(notes) = &item.notes {
            let _ = write!(out, " \"{notes}\"");
        }
        out.push('\n');
    }
    out
}

pub fn tracked_orders(orders: &[TrackedOrder]) -> String {
    let mut out = String::new();
    for order in orders {
        let _ = writeln!(out, "Order {} [{}] total {}", order.order_id, order.status, order.total);
        match order.step {
            Some(step) => {
                let line: Vec<String> = TrackingStep::ALL
                    .iter()
                    .map(|s| {
                        let mark = if s.reached_by(step) { "x" } else { " " };
                        format!("[{mark}] {}", s.label())
                    })
                    .collect();
                let _ = writeln!(out, "  {}", line.join("  "));
            }
            None => out.push_str("  cancelled\n"),
        }
        for item in &order.items {
            let _ = writeln!(out, "  {}x {} ({})", item.quantity, item.name, item.status);
        }
    }
    out
}

pub fn order(order: &Order) -> String {
    let mut out = format!("Order {} [{}] due {}\n", order.short_id(), order.status, order.amount_due());
    if let Some(reason) = &order.cancellation_reason {
        let _ = writeln!(out, "  cancelled: {reason}");
    }
    for item in &order.items {
        let _ = writeln!(out, "  {} {}x {} ({})", item.id, item.quantity, item.name(), item.status);
    }
    out
}

pub fn stats(stats: &RealTimeStats) -> String {
    format!(
        "active {} | pending {} | kitchen {} | tables {}/{} | revenue {} | staff {}",
        stats.active_orders,
        stats.pending_orders,
        stats.kitchen_queue,
        stats.occupied_tables,
        stats.occupied_tables + stats.available_tables,
        stats.total_revenue,
        stats.staff_on_duty,
    )
}

pub fn waiter(snapshot: &WaiterSnapshot) -> String {
    let numbers = |tables: &[shared::models::DiningTable]| -> String {
        tables
            .iter()
            .map(|t| t.table_number.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "my tables: {} | occupied: [{}] | available: [{}] | pending orders {} | ready {}",
        snapshot.my_tables.len(),
        numbers(&snapshot.occupied),
        numbers(&snapshot.available),
        snapshot.pending_orders.len(),
        snapshot.ready_orders.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn orders(value: serde_json::Value) -> Vec<Order> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_kitchen_ticket_lines() {
        let orders = orders(json!([{
            "_id": "665f00000000000000000abc",
            "table": {"_id": "t7", "tableNumber": 7},
            "customerName": "Asha",
            "status": "Pending",
            "items": [
                {"_id": "i1", "menuItem": {"_id": "m1", "name": "Momo", "price": 250}, "quantity": 2, "status": "Pending", "notes": "less chilli"},
                {"_id": "i2", "menuItem": {"_id": "m2", "name": "Thukpa", "price": 300}, "quantity": 1, "status": "Ready"}
            ]
        }]));
        let text = kitchen(&KitchenSnapshot::from_orders(&orders));

        assert!(text.starts_with("pending 1 | cooking 0 | ready 1 | served 0\n"));
        assert!(text.contains("table 7 [Pending] Asha"));
        assert!(text.contains("  2x Momo (Pending) -> Cooking \"less chilli\""));
        assert!(text.contains("  1x Thukpa (Ready)\n"));
    }

    #[test]
    fn test_tracked_order_progress() {
        let orders = orders(json!([
            {"_id": "o1", "status": "InKitchen", "totalAmount": 500, "items": []},
            {"_id": "o2", "status": "Cancelled", "totalAmount": 120, "items": []}
        ]));
        let tracked: Vec<TrackedOrder> = orders.iter().map(TrackedOrder::from).collect();
        let text = tracked_orders(&tracked);

        assert!(text.contains("[x] Order Received  [x] Preparing  [ ] Served"));
        assert!(text.contains("  cancelled\n"));
    }
}
