//! Plain-text rendering of the client views

use std::fmt::Write;

use chrono::{DateTime, Local, Utc};
use order_client::kitchen::{self, BoardCounts};
use order_client::tracking::StageProgress;
use order_client::{CartSession, MenuCatalog, PollState, TrackingView};
use shared::Order;
use shared::money::format_amount;

pub fn menu(catalog: &MenuCatalog) -> String {
    if catalog.is_empty() {
        return "The menu is empty\n".to_string();
    }
    let mut out = String::new();
    for (category, items) in catalog.sections() {
        let _ = writeln!(out, "{} {}", category.icon(), category.label());
        for item in items {
            let _ = writeln!(
                out,
                "  [{:>3}] {:<28} {:>8}",
                item.id,
                item.name,
                format_amount(item.price)
            );
            if let Some(desc) = item.description.as_deref().filter(|d| !d.is_empty()) {
                let _ = writeln!(out, "        {desc}");
            }
        }
    }
    out
}

pub fn cart(session: &CartSession) -> String {
    let mut out = String::new();
    match session.table_id {
        Some(table) => {
            let _ = writeln!(out, "Table {table}");
        }
        None => out.push_str("No table selected\n"),
    }
    if session.is_empty() {
        out.push_str("Your cart is empty\n");
        return out;
    }
    for (i, line) in session.items.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {} x{} @ {} = {}",
            i + 1,
            line.name,
            line.quantity,
            format_amount(line.unit_price),
            format_amount(line.line_total())
        );
        if !line.special_instructions.is_empty() {
            let _ = writeln!(out, "     note: {}", line.special_instructions);
        }
    }
    let _ = writeln!(out, "{} items", session.total_items());
    let _ = writeln!(out, "{}", session.checkout_label());
    out
}

pub fn tracking(view: &TrackingView) -> String {
    let mut out = String::new();
    match view {
        TrackingView::Loading => out.push_str("Loading order...\n"),
        TrackingView::NotFound { message } => {
            let _ = writeln!(out, "{message}");
        }
        TrackingView::Unavailable { message } => {
            let _ = writeln!(out, "Unable to load order: {message} (retrying)");
        }
        TrackingView::Tracking {
            order,
            stages,
            stale,
        } => {
            order_heading(&mut out, order);
            for (stage, progress) in stages {
                let mark = match progress {
                    StageProgress::Completed => "[x]",
                    StageProgress::Current => "[>]",
                    StageProgress::Upcoming => "[ ]",
                };
                let _ = writeln!(out, "  {mark} {} - {}", stage.label, stage.description);
            }
            order_lines(&mut out, order);
            if let Some(e) = stale {
                let _ = writeln!(out, "  (refresh failed: {e})");
            }
        }
    }
    out
}

pub fn kitchen(state: &PollState<Vec<Order>>, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let Some(orders) = &state.data else {
        return match &state.error {
            Some(e) => format!("Unable to load orders: {e}\n"),
            None => "Loading orders...\n".to_string(),
        };
    };

    let counts = BoardCounts::of(orders);
    let _ = writeln!(
        out,
        "Kitchen Display | New: {} | Cooking: {} | Total: {}",
        counts.new, counts.cooking, counts.total
    );
    if let Some(at) = state.last_updated {
        let _ = writeln!(out, "Updated {}", at.with_timezone(&Local).format("%H:%M:%S"));
    }
    if let Some(e) = &state.error {
        let _ = writeln!(out, "(refresh failed, showing last known orders: {e})");
    }

    let (new, cooking) = kitchen::columns(orders);
    for (title, column) in [("NEW ORDERS", new), ("COOKING", cooking)] {
        let _ = writeln!(out, "\n== {title} ({}) ==", column.len());
        if column.is_empty() {
            out.push_str("  (none)\n");
        }
        for order in column {
            order_card(&mut out, order, now);
        }
    }
    out
}

fn order_heading(out: &mut String, order: &Order) {
    let _ = write!(out, "Order #{}", order.id);
    if let Some(table) = order.table_id {
        let _ = write!(out, " (Table {table})");
    }
    if let Some(total) = order.total_amount {
        let _ = write!(out, " {}", format_amount(total));
    }
    out.push('\n');
}

fn order_lines(out: &mut String, order: &Order) {
    for line in &order.items {
        let _ = write!(
            out,
            "    - {}x {} [{}]",
            line.quantity,
            line.name(),
            line.item_status
        );
        if let Some(note) = line.instructions() {
            let _ = write!(out, " ({note})");
        }
        out.push('\n');
    }
    if let Some(notes) = order.customer_notes.as_deref().filter(|n| !n.is_empty()) {
        let _ = writeln!(out, "    notes: {notes}");
    }
}

fn order_card(out: &mut String, order: &Order, now: DateTime<Utc>) {
    out.push_str("  ");
    order_heading(out, order);
    if let Some(age) = kitchen::order_age(order, now) {
        let _ = writeln!(out, "    {age}");
    }
    order_lines(out, order);
    if let Some(action) = kitchen::offered_action(order) {
        let _ = writeln!(out, "    -> {}", action.label());
    }
}
