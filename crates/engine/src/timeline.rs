//! Timeline primitives.
//!
//! A `TimelineEvent` is an audit record written as a side effect of ledger
//! operations. Events are never updated; they only disappear with their order.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError,
    util::{choice_enum, parse_optional_uuid, parse_uuid},
};

choice_enum!(
    EventKind, "event type" {
        OrderCreated => ("order_created", "Order Created"),
        OrderAssigned => ("order_assigned", "Order Assigned"),
        OrderStatusChanged => ("order_status_changed", "Order Status Changed"),
        ExpenseAdded => ("expense_added", "Expense Added"),
        MoneyTransferred => ("money_transferred", "Money Transferred"),
        DocumentUploaded => ("document_uploaded", "Document Uploaded"),
        TripStarted => ("trip_started", "Trip Started"),
        TripCompleted => ("trip_completed", "Trip Completed"),
    }
);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: Uuid,
    /// `None` for truck-level events.
    pub order_id: Option<Uuid>,
    pub kind: EventKind,
    pub title: String,
    pub description: String,
    pub related_expense_id: Option<Uuid>,
    pub related_transfer_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// An event about to be recorded.
#[derive(Clone, Debug)]
pub(crate) struct NewEvent {
    pub order_id: Option<Uuid>,
    pub kind: EventKind,
    pub title: String,
    pub description: String,
    pub related_expense_id: Option<Uuid>,
    pub related_transfer_id: Option<Uuid>,
}

impl NewEvent {
    pub(crate) fn new(
        order_id: Option<Uuid>,
        kind: EventKind,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            order_id,
            kind,
            title: title.into(),
            description: description.into(),
            related_expense_id: None,
            related_transfer_id: None,
        }
    }

    pub(crate) fn expense(mut self, expense_id: Uuid) -> Self {
        self.related_expense_id = Some(expense_id);
        self
    }

    pub(crate) fn transfer(mut self, transfer_id: Uuid) -> Self {
        self.related_transfer_id = Some(transfer_id);
        self
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "timeline_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub order_id: Option<String>,
    pub event_type: String,
    pub title: String,
    pub description: String,
    pub related_expense_id: Option<String>,
    pub related_transfer_id: Option<String>,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&TimelineEvent> for ActiveModel {
    fn from(event: &TimelineEvent) -> Self {
        Self {
            id: ActiveValue::Set(event.id.to_string()),
            order_id: ActiveValue::Set(event.order_id.map(|id| id.to_string())),
            event_type: ActiveValue::Set(event.kind.as_str().to_string()),
            title: ActiveValue::Set(event.title.clone()),
            description: ActiveValue::Set(event.description.clone()),
            related_expense_id: ActiveValue::Set(event.related_expense_id.map(|id| id.to_string())),
            related_transfer_id: ActiveValue::Set(
                event.related_transfer_id.map(|id| id.to_string()),
            ),
            created_by: ActiveValue::Set(event.created_by.to_string()),
            created_at: ActiveValue::Set(event.created_at),
        }
    }
}

impl TryFrom<Model> for TimelineEvent {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "timeline event")?,
            order_id: parse_optional_uuid(model.order_id.as_deref(), "order")?,
            kind: EventKind::try_from(model.event_type.as_str())?,
            title: model.title,
            description: model.description,
            related_expense_id: parse_optional_uuid(
                model.related_expense_id.as_deref(),
                "expense",
            )?,
            related_transfer_id: parse_optional_uuid(
                model.related_transfer_id.as_deref(),
                "transfer",
            )?,
            created_by: parse_uuid(&model.created_by, "user")?,
            created_at: model.created_at,
        })
    }
}
