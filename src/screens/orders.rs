//! Orders screen

use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::view::{CollectionView, FieldMap, FieldValue, Record};
use crate::{Order, OrderStatus, PaymentStatus};

pub const PATH: &str = "/api/admins/orders";

impl Record for Order {
    fn id(&self) -> Uuid { self.id }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        Some(match name {
            "order_number" => FieldValue::text(&self.order_number),
            "customer_name" => FieldValue::text(&self.customer_name),
            "customer_email" => FieldValue::text(&self.customer_email),
            "status" => FieldValue::text(self.status.as_str()),
            "payment_status" => FieldValue::text(self.payment_status.as_str()),
            "payment_method" => FieldValue::text(&self.payment_method),
            "total" => self.total.into(),
            "item_count" => self.item_count.into(),
            "created_at" => self.created_at.into(),
            _ => return None,
        })
    }
}

fn pending(o: &Order, _: DateTime<Utc>) -> bool { o.status == OrderStatus::Pending }
fn shipping(o: &Order, _: DateTime<Utc>) -> bool { o.status == OrderStatus::Shipping }
fn delivered(o: &Order, _: DateTime<Utc>) -> bool { o.status == OrderStatus::Delivered }
fn cancelled(o: &Order, _: DateTime<Utc>) -> bool { o.status == OrderStatus::Cancelled }
fn unpaid(o: &Order, _: DateTime<Utc>) -> bool { o.payment_status == PaymentStatus::Unpaid }

pub fn view() -> CollectionView<Order> {
    CollectionView::new(
        FieldMap::new()
            .search(["order_number", "customer_name", "customer_email"])
            .filter_eq("status", "status")
            .filter_eq("payment_status", "payment_status")
            .filter_eq("payment_method", "payment_method")
            .sort(["order_number", "customer_name", "total", "item_count", "created_at"])
            .stat("pending", pending)
            .stat("shipping", shipping)
            .stat("delivered", delivered)
            .stat("cancelled", cancelled)
            .stat("unpaid", unpaid),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{SortOrder, ViewQuery};
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;
    use std::num::NonZeroUsize;

    fn order(number: &str, status: OrderStatus, total: i64, age_days: i64) -> Order {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        Order {
            id: Uuid::new_v4(), order_number: number.into(), customer_name: "Nguyễn Văn A".into(),
            customer_email: "a@example.com".into(), status, payment_status: PaymentStatus::Paid,
            payment_method: "cod".into(), total: Decimal::new(total, 0), item_count: 1,
            created_at: now - Duration::days(age_days),
        }
    }

    #[test]
    fn test_newest_first_within_status() {
        let orders = vec![
            order("DH001", OrderStatus::Delivered, 500, 3),
            order("DH002", OrderStatus::Pending, 200, 2),
            order("DH003", OrderStatus::Delivered, 900, 1),
        ];
        let q = ViewQuery::new(NonZeroUsize::new(10).unwrap())
            .filter("status", "delivered")
            .sort_by("created_at", SortOrder::Desc);
        let page = view().apply(&orders, &q, Utc::now()).unwrap();
        assert_eq!(page.items.iter().map(|o| o.order_number.as_str()).collect::<Vec<_>>(), vec!["DH003", "DH001"]);
        assert_eq!(page.stats.get("delivered"), Some(&2));
        assert_eq!(page.stats.get("pending"), Some(&0));
    }

    #[test]
    fn test_search_matches_customer_name() {
        let orders = vec![order("DH001", OrderStatus::Pending, 1, 1)];
        let q = ViewQuery::new(NonZeroUsize::new(10).unwrap()).search("văn");
        assert_eq!(view().apply(&orders, &q, Utc::now()).unwrap().total_items, 1);
    }
}
