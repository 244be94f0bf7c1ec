//! Notifications screen

use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::view::{CollectionView, FieldMap, FieldValue, Predicate, Record};
use crate::Notification;

pub const PATH: &str = "/api/admins/notifications";

impl Record for Notification {
    fn id(&self) -> Uuid { self.id }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        Some(match name {
            "title" => FieldValue::text(&self.title),
            "message" => FieldValue::text(&self.message),
            "kind" => FieldValue::text(self.kind.as_str()),
            "is_read" => self.is_read.into(),
            "created_at" => self.created_at.into(),
            _ => return None,
        })
    }
}

fn read(n: &Notification, _: DateTime<Utc>) -> bool { n.is_read }
fn unread(n: &Notification, _: DateTime<Utc>) -> bool { !n.is_read }

pub fn view() -> CollectionView<Notification> {
    CollectionView::new(
        FieldMap::new()
            .search(["title", "message"])
            .filter_eq("kind", "kind")
            .filter_named("read", [("read", read as Predicate<Notification>), ("unread", unread)])
            .sort(["title", "kind", "is_read", "created_at"])
            .stat("unread", unread),
    )
}
