//! Transportation orders.
//!
//! An `Order` carries the money fields of a trip. `balance_amount_minor` is
//! derived: it is recomputed from total and advance every time the order is
//! saved, never written directly.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError,
    util::{choice_enum, parse_optional_uuid, parse_uuid},
};

/// Prefix of every generated order code.
pub const ORDER_CODE_PREFIX: &str = "TRANS";

choice_enum!(
    /// Lifecycle status of an order.
    OrderStatus, "status" {
        Pending => ("pending", "Pending"),
        Assigned => ("assigned", "Assigned"),
        InTransit => ("in_transit", "In Transit"),
        Delivered => ("delivered", "Delivered"),
        Cancelled => ("cancelled", "Cancelled"),
    }
);

impl OrderStatus {
    /// Statuses counted as "active" by the dashboards.
    pub const ACTIVE: [OrderStatus; 3] = [Self::Pending, Self::Assigned, Self::InTransit];

    /// Delivered and cancelled are terminal by convention only; leaving them
    /// is not rejected.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

choice_enum!(
    /// Document slots of an order.
    OrderDocument, "document kind" {
        Waybill => ("waybill", "Waybill"),
        LrCopy => ("lr_copy", "LR Copy"),
        Other => ("other", "Other Document"),
    }
);

/// One end of a trip.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stop {
    pub location: String,
    pub contact: String,
    pub phone: String,
}

impl Stop {
    #[must_use]
    pub fn new(
        location: impl Into<String>,
        contact: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            contact: contact.into(),
            phone: phone.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDocuments {
    pub waybill: Option<String>,
    pub lr_copy: Option<String>,
    pub other: Option<String>,
}

impl OrderDocuments {
    pub(crate) fn set(&mut self, kind: OrderDocument, key: String) {
        let slot = match kind {
            OrderDocument::Waybill => &mut self.waybill,
            OrderDocument::LrCopy => &mut self.lr_copy,
            OrderDocument::Other => &mut self.other,
        };
        *slot = Some(key);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    /// External order code (`TRANS` + 6 digits), assigned once at creation.
    pub code: String,
    pub description: String,
    pub pickup: Stop,
    pub delivery: Stop,
    pub pickup_date: DateTime<Utc>,
    pub estimated_delivery_date: DateTime<Utc>,
    pub actual_delivery_date: Option<DateTime<Utc>>,
    pub load_type: String,
    pub weight_kg: i64,
    pub volume_litres: Option<i64>,
    pub total_amount_minor: i64,
    pub advance_amount_minor: i64,
    pub balance_amount_minor: i64,
    pub status: OrderStatus,
    pub truck_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub owner_id: Uuid,
    pub created_by: Uuid,
    pub documents: OrderDocuments,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub(crate) fn recompute_balance(&mut self) {
        self.balance_amount_minor = self.total_amount_minor - self.advance_amount_minor;
    }

    /// Moves the order to `status`.
    ///
    /// The first transition into `Delivered` stamps `actual_delivery_date`;
    /// later ones keep the original stamp. Returns the previous status.
    pub(crate) fn transition(&mut self, status: OrderStatus, now: DateTime<Utc>) -> OrderStatus {
        let previous = self.status;
        self.status = status;
        if status == OrderStatus::Delivered && self.actual_delivery_date.is_none() {
            self.actual_delivery_date = Some(now);
        }
        self.updated_at = now;
        previous
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub code: String,
    pub description: String,
    pub pickup_location: String,
    pub pickup_contact: String,
    pub pickup_phone: String,
    pub delivery_location: String,
    pub delivery_contact: String,
    pub delivery_phone: String,
    pub pickup_date: DateTimeUtc,
    pub estimated_delivery_date: DateTimeUtc,
    pub actual_delivery_date: Option<DateTimeUtc>,
    pub load_type: String,
    pub weight_kg: i64,
    pub volume_litres: Option<i64>,
    pub total_amount_minor: i64,
    pub advance_amount_minor: i64,
    pub balance_amount_minor: i64,
    pub status: String,
    pub truck_id: Option<String>,
    pub driver_id: Option<String>,
    pub owner_id: String,
    pub created_by: String,
    pub waybill_document: Option<String>,
    pub lr_document: Option<String>,
    pub other_document: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Order> for ActiveModel {
    fn from(order: &Order) -> Self {
        Self {
            id: ActiveValue::Set(order.id.to_string()),
            code: ActiveValue::Set(order.code.clone()),
            description: ActiveValue::Set(order.description.clone()),
            pickup_location: ActiveValue::Set(order.pickup.location.clone()),
            pickup_contact: ActiveValue::Set(order.pickup.contact.clone()),
            pickup_phone: ActiveValue::Set(order.pickup.phone.clone()),
            delivery_location: ActiveValue::Set(order.delivery.location.clone()),
            delivery_contact: ActiveValue::Set(order.delivery.contact.clone()),
            delivery_phone: ActiveValue::Set(order.delivery.phone.clone()),
            pickup_date: ActiveValue::Set(order.pickup_date),
            estimated_delivery_date: ActiveValue::Set(order.estimated_delivery_date),
            actual_delivery_date: ActiveValue::Set(order.actual_delivery_date),
            load_type: ActiveValue::Set(order.load_type.clone()),
            weight_kg: ActiveValue::Set(order.weight_kg),
            volume_litres: ActiveValue::Set(order.volume_litres),
            total_amount_minor: ActiveValue::Set(order.total_amount_minor),
            advance_amount_minor: ActiveValue::Set(order.advance_amount_minor),
            balance_amount_minor: ActiveValue::Set(order.balance_amount_minor),
            status: ActiveValue::Set(order.status.as_str().to_string()),
            truck_id: ActiveValue::Set(order.truck_id.map(|id| id.to_string())),
            driver_id: ActiveValue::Set(order.driver_id.map(|id| id.to_string())),
            owner_id: ActiveValue::Set(order.owner_id.to_string()),
            created_by: ActiveValue::Set(order.created_by.to_string()),
            waybill_document: ActiveValue::Set(order.documents.waybill.clone()),
            lr_document: ActiveValue::Set(order.documents.lr_copy.clone()),
            other_document: ActiveValue::Set(order.documents.other.clone()),
            created_at: ActiveValue::Set(order.created_at),
            updated_at: ActiveValue::Set(order.updated_at),
        }
    }
}

impl TryFrom<Model> for Order {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "order")?,
            code: model.code,
            description: model.description,
            pickup: Stop {
                location: model.pickup_location,
                contact: model.pickup_contact,
                phone: model.pickup_phone,
            },
            delivery: Stop {
                location: model.delivery_location,
                contact: model.delivery_contact,
                phone: model.delivery_phone,
            },
            pickup_date: model.pickup_date,
            estimated_delivery_date: model.estimated_delivery_date,
            actual_delivery_date: model.actual_delivery_date,
            load_type: model.load_type,
            weight_kg: model.weight_kg,
            volume_litres: model.volume_litres,
            total_amount_minor: model.total_amount_minor,
            advance_amount_minor: model.advance_amount_minor,
            balance_amount_minor: model.balance_amount_minor,
            status: OrderStatus::try_from(model.status.as_str())?,
            truck_id: parse_optional_uuid(model.truck_id.as_deref(), "truck")?,
            driver_id: parse_optional_uuid(model.driver_id.as_deref(), "driver")?,
            owner_id: parse_uuid(&model.owner_id, "owner")?,
            created_by: parse_uuid(&model.created_by, "user")?,
            documents: OrderDocuments {
                waybill: model.waybill_document,
                lr_copy: model.lr_document,
                other: model.other_document,
            },
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
