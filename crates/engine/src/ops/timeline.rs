use chrono::Utc;
use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    EventKind, Principal, ResultEngine, TimelineEvent,
    timeline::{self, NewEvent},
};

use super::{Engine, access::timeline_scope, listing};

/// Filters for listing timeline events. Newest first.
#[derive(Clone, Debug, Default)]
pub struct TimelineListFilter {
    pub kind: Option<EventKind>,
    pub order_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub limit: Option<u64>,
}

impl Engine {
    /// Appends an event. Runs inside the caller's transaction so the event
    /// lives and dies with the mutation that produced it.
    pub(super) async fn record<C>(
        &self,
        db: &C,
        actor: &Principal,
        event: NewEvent,
    ) -> ResultEngine<TimelineEvent>
    where
        C: ConnectionTrait,
    {
        let event = TimelineEvent {
            id: Uuid::new_v4(),
            order_id: event.order_id,
            kind: event.kind,
            title: event.title,
            description: event.description,
            related_expense_id: event.related_expense_id,
            related_transfer_id: event.related_transfer_id,
            created_by: actor.user_id,
            created_at: Utc::now(),
        };
        let model: timeline::ActiveModel = (&event).into();
        model.insert(db).await?;
        tracing::debug!(kind = event.kind.as_str(), order = ?event.order_id, "timeline event recorded");
        Ok(event)
    }

    pub async fn list_timeline(
        &self,
        principal: &Principal,
        filter: &TimelineListFilter,
    ) -> ResultEngine<Vec<TimelineEvent>> {
        let mut select = timeline::Entity::find().filter(timeline_scope(principal));
        if let Some(kind) = filter.kind {
            select = select.filter(timeline::Column::EventType.eq(kind.as_str()));
        }
        if let Some(order_id) = filter.order_id {
            select = select.filter(timeline::Column::OrderId.eq(order_id.to_string()));
        }
        if let Some(user_id) = filter.created_by {
            select = select.filter(timeline::Column::CreatedBy.eq(user_id.to_string()));
        }
        listing::limit(select.order_by_desc(timeline::Column::CreatedAt), filter.limit)
            .all(&self.database)
            .await?
            .into_iter()
            .map(TimelineEvent::try_from)
            .collect()
    }

    pub async fn timeline_event(
        &self,
        principal: &Principal,
        event_id: Uuid,
    ) -> ResultEngine<TimelineEvent> {
        let model = self
            .require_event(&self.database, principal, event_id)
            .await?;
        TimelineEvent::try_from(model)
    }

    /// Events of one order, newest first. The order itself must be visible.
    pub async fn order_timeline(
        &self,
        principal: &Principal,
        order_id: Uuid,
    ) -> ResultEngine<Vec<TimelineEvent>> {
        self.require_order(&self.database, principal, order_id)
            .await?;
        self.list_timeline(
            principal,
            &TimelineListFilter {
                order_id: Some(order_id),
                ..TimelineListFilter::default()
            },
        )
        .await
    }
}
