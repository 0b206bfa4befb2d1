use api_types::{
    Listing,
    timeline::{TimelineEventView, TimelineListQuery},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use engine::{EventKind, Principal, TimelineListFilter};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

pub async fn list(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Query(query): Query<TimelineListQuery>,
) -> Result<Json<Listing<TimelineEventView>>, ServerError> {
    let filter = TimelineListFilter {
        kind: views::choice::<EventKind>(query.event_type.as_deref())?,
        order_id: query.order,
        created_by: query.created_by,
        limit: query.limit,
    };
    let events = state.engine.list_timeline(&principal, &filter).await?;
    Ok(Json(
        events.into_iter().map(views::event).collect::<Vec<_>>().into(),
    ))
}

pub async fn get(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<TimelineEventView>, ServerError> {
    let event = state.engine.timeline_event(&principal, event_id).await?;
    Ok(Json(views::event(event)))
}
