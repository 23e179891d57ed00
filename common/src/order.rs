use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::SiteSettings;
use crate::storage::{get_json, set_json, KeyValueStore, StoreError};
use crate::username;

/// Storage key for the order list.
pub const ORDERS_KEY: &str = "star_orders";

/// How the customer intends to pay. The tag is what gets stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Sbp,
    YuKassa,
    Card,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] =
        [PaymentMethod::Sbp, PaymentMethod::YuKassa, PaymentMethod::Card];

    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Sbp => "SBP",
            PaymentMethod::YuKassa => "YuKassa",
            PaymentMethod::Card => "Bank card",
        }
    }
}

/// Order lifecycle status. Any status may move to any other; there is no
/// transition restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    New,
    Processing,
    Done,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::New,
        OrderStatus::Processing,
        OrderStatus::Done,
        OrderStatus::Cancelled,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::New => "New",
            OrderStatus::Processing => "Processing",
            OrderStatus::Done => "Done",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// New and Processing orders count as pending in the stats overview.
    pub fn is_pending(self) -> bool {
        matches!(self, OrderStatus::New | OrderStatus::Processing)
    }

    pub fn is_completed(self) -> bool {
        matches!(self, OrderStatus::Done)
    }
}

/// A star purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Millisecond timestamp at creation; doubles as the display id.
    pub id: u64,
    /// Telegram handle the stars go to, without the leading `@`.
    pub username: String,
    pub star_count: u32,
    pub payment_method: PaymentMethod,
    pub total_kopecks: u64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    /// Email of the account that placed the order.
    pub customer_email: String,
}

/// Aggregates for the admin stats overview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderStats {
    pub total: usize,
    pub revenue_kopecks: u64,
    pub pending: usize,
    pub completed: usize,
}

/// Pure aggregation over an order list.
pub fn compute_stats(orders: &[Order]) -> OrderStats {
    let mut stats = OrderStats::default();
    for order in orders {
        stats.total += 1;
        stats.revenue_kopecks += order.total_kopecks;
        if order.status.is_pending() {
            stats.pending += 1;
        }
        if order.status.is_completed() {
            stats.completed += 1;
        }
    }
    stats
}

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("telegram username must be 5-32 letters, digits, or underscores")]
    InvalidUsername,
    #[error("star count must be between {min} and {max}")]
    QuantityOutOfRange { min: u32, max: u32 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The order list and its operations over the key-value store.
pub struct OrderBook<S> {
    store: S,
}

impl<S: KeyValueStore> OrderBook<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Validate and append a new order with status [`OrderStatus::New`].
    pub fn submit(
        &mut self,
        username: &str,
        star_count: u32,
        payment_method: PaymentMethod,
        customer_email: &str,
        settings: &SiteSettings,
    ) -> Result<Order, OrderError> {
        let handle = username::normalize(username);
        if !username::is_valid(handle) {
            return Err(OrderError::InvalidUsername);
        }
        if !settings.quantity_in_range(star_count) {
            return Err(OrderError::QuantityOutOfRange {
                min: settings.min_stars,
                max: settings.max_stars,
            });
        }

        let mut orders = self.all()?;
        let now = Utc::now();
        // Timestamp-derived id, bumped past the last order if two submissions
        // land in the same millisecond.
        let mut id = now.timestamp_millis() as u64;
        if let Some(last) = orders.last() {
            if id <= last.id {
                id = last.id + 1;
            }
        }
        let order = Order {
            id,
            username: handle.to_string(),
            star_count,
            payment_method,
            total_kopecks: settings.total_kopecks(star_count),
            status: OrderStatus::New,
            created_at: now,
            customer_email: customer_email.to_string(),
        };

        orders.push(order.clone());
        self.save(&orders)?;
        Ok(order)
    }

    /// All orders in insertion order, optionally filtered by status.
    pub fn list(&self, filter: Option<OrderStatus>) -> Result<Vec<Order>, StoreError> {
        let orders = self.all()?;
        Ok(match filter {
            None => orders,
            Some(status) => orders.into_iter().filter(|o| o.status == status).collect(),
        })
    }

    /// Replace the status of the matching order in place. Idempotent.
    /// Returns whether an order with `id` existed.
    pub fn update_status(&mut self, id: u64, status: OrderStatus) -> Result<bool, StoreError> {
        let mut orders = self.all()?;
        let mut found = false;
        for order in orders.iter_mut() {
            if order.id == id {
                order.status = status;
                found = true;
            }
        }
        if found {
            self.save(&orders)?;
        }
        Ok(found)
    }

    pub fn stats(&self) -> Result<OrderStats, StoreError> {
        Ok(compute_stats(&self.all()?))
    }

    /// Empty the order list unconditionally. The confirmation prompt is the
    /// UI layer's responsibility.
    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        self.save(&[])
    }

    fn all(&self) -> Result<Vec<Order>, StoreError> {
        Ok(get_json(&self.store, ORDERS_KEY)?.unwrap_or_default())
    }

    fn save(&mut self, orders: &[Order]) -> Result<(), StoreError> {
        set_json(&mut self.store, ORDERS_KEY, &orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn book() -> OrderBook<MemoryStore> {
        OrderBook::new(MemoryStore::new())
    }

    fn settings() -> SiteSettings {
        SiteSettings::default()
    }

    #[test]
    fn submit_computes_total_from_unit_price() {
        let mut book = book();
        // 100 stars at 1.72 each
        let order = book
            .submit("star_buyer", 100, PaymentMethod::Sbp, "a@b.com", &settings())
            .unwrap();
        assert_eq!(order.total_kopecks, 17200);
        assert_eq!(crate::currency::format_kopecks(order.total_kopecks), "172.00");
        assert_eq!(order.status, OrderStatus::New);
    }

    #[test]
    fn submit_totals_hold_across_the_whole_range() {
        let s = settings();
        let mut book = book();
        for q in [s.min_stars, 120, 333, s.max_stars] {
            let order = book
                .submit("star_buyer", q, PaymentMethod::Card, "a@b.com", &s)
                .unwrap();
            assert_eq!(order.total_kopecks, u64::from(q) * s.star_price_kopecks);
        }
    }

    #[test]
    fn submit_strips_leading_at_sign() {
        let mut book = book();
        let order = book
            .submit("@durov", 50, PaymentMethod::Card, "a@b.com", &settings())
            .unwrap();
        assert_eq!(order.username, "durov");
    }

    #[test]
    fn submit_rejects_bad_usernames() {
        let mut book = book();
        for bad in ["", "abc", "has space", "dash-ed"] {
            let err = book
                .submit(bad, 100, PaymentMethod::Sbp, "a@b.com", &settings())
                .unwrap_err();
            assert!(matches!(err, OrderError::InvalidUsername), "{bad:?}");
        }
    }

    #[test]
    fn submit_rejects_out_of_range_quantities() {
        let mut book = book();
        for q in [0, 49, 501] {
            let err = book
                .submit("star_buyer", q, PaymentMethod::Sbp, "a@b.com", &settings())
                .unwrap_err();
            assert!(matches!(err, OrderError::QuantityOutOfRange { min: 50, max: 500 }));
        }
        assert!(book.list(None).unwrap().is_empty());
    }

    #[test]
    fn list_filters_by_status() {
        let mut book = book();
        let a = book
            .submit("buyer_one", 50, PaymentMethod::Sbp, "a@b.com", &settings())
            .unwrap();
        book.submit("buyer_two", 60, PaymentMethod::Card, "a@b.com", &settings())
            .unwrap();
        book.update_status(a.id, OrderStatus::Done).unwrap();

        assert_eq!(book.list(None).unwrap().len(), 2);
        let done = book.list(Some(OrderStatus::Done)).unwrap();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, a.id);
    }

    #[test]
    fn update_status_is_idempotent() {
        let mut book = book();
        let order = book
            .submit("star_buyer", 100, PaymentMethod::Sbp, "a@b.com", &settings())
            .unwrap();

        assert!(book.update_status(order.id, OrderStatus::Processing).unwrap());
        let first = book.list(None).unwrap();
        assert!(book.update_status(order.id, OrderStatus::Processing).unwrap());
        let second = book.list(None).unwrap();
        assert_eq!(first, second);

        assert!(!book.update_status(order.id + 1, OrderStatus::Done).unwrap());
    }

    #[test]
    fn stats_over_empty_book_are_all_zero() {
        assert_eq!(book().stats().unwrap(), OrderStats::default());
    }

    #[test]
    fn stats_split_pending_and_completed() {
        let mut book = book();
        let s = settings();
        let a = book.submit("buyer_one", 50, PaymentMethod::Sbp, "a@b.com", &s).unwrap();
        let b = book.submit("buyer_two", 100, PaymentMethod::Card, "a@b.com", &s).unwrap();
        book.submit("buyer_three", 60, PaymentMethod::YuKassa, "a@b.com", &s)
            .unwrap();
        book.update_status(a.id, OrderStatus::Done).unwrap();
        book.update_status(b.id, OrderStatus::Cancelled).unwrap();

        let stats = book.stats().unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.revenue_kopecks, (50u64 + 100 + 60) * 172);
        // Cancelled counts as neither pending nor completed
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.completed, 1);
    }

    #[test]
    fn clear_all_empties_the_list() {
        let mut book = book();
        book.submit("star_buyer", 100, PaymentMethod::Sbp, "a@b.com", &settings())
            .unwrap();
        book.clear_all().unwrap();
        assert!(book.list(None).unwrap().is_empty());
        assert_eq!(book.stats().unwrap(), OrderStats::default());
    }
}
