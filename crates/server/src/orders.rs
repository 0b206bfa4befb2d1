//! Orders API endpoints, including the per-order timeline and ledger views.

use api_types::{
    Listing,
    expense::ExpenseView,
    order::{DocumentAttach, OrderListQuery, OrderNew, OrderUpdate, OrderView, StatusUpdate},
    timeline::TimelineEventView,
    transfer::TransferView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{
    Action, EntityKind, NewOrder, OrderDocument, OrderListFilter, OrderStatus, Principal, Role,
};
use uuid::Uuid;

use crate::{ServerError, authorize, server::ServerState, views};

pub async fn list(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Listing<OrderView>>, ServerError> {
    let filter = OrderListFilter {
        status: views::choice::<OrderStatus>(query.status.as_deref())?,
        owner_id: query.owner,
        driver_id: query.driver,
        truck_id: query.truck,
        search: query.search,
        ordering: query.ordering,
        limit: query.limit,
    };
    let orders = state.engine.list_orders(&principal, &filter).await?;
    Ok(Json(
        orders.into_iter().map(views::order).collect::<Vec<_>>().into(),
    ))
}

pub async fn create(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<OrderNew>,
) -> Result<(StatusCode, Json<OrderView>), ServerError> {
    authorize(&principal, EntityKind::Order, Action::Create)?;
    let owner_id = match (payload.owner_id, principal.role) {
        (Some(owner_id), _) => owner_id,
        (None, Role::Owner) => principal.user_id,
        (None, _) => return Err(ServerError::Generic("owner_id is required".to_string())),
    };
    let mut cmd = NewOrder::new(
        owner_id,
        views::stop_from_body(payload.pickup),
        views::stop_from_body(payload.delivery),
        payload.pickup_date,
        payload.estimated_delivery_date,
    )
    .load(payload.load_type, payload.weight_kg)
    .amounts(payload.total_amount_minor, payload.advance_amount_minor);
    cmd.description = payload.description;
    cmd.volume_litres = payload.volume_litres;
    cmd.truck_id = payload.truck_id;
    cmd.driver_id = payload.driver_id;

    let order = state.engine.create_order(&principal, cmd).await?;
    Ok((StatusCode::CREATED, Json(views::order(order))))
}

pub async fn get(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderView>, ServerError> {
    let order = state.engine.order(&principal, order_id).await?;
    Ok(Json(views::order(order)))
}

pub async fn update(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<OrderUpdate>,
) -> Result<Json<OrderView>, ServerError> {
    let update = engine::OrderUpdate {
        owner_id: payload.owner_id,
        description: payload.description,
        pickup: payload.pickup.map(views::stop_from_body),
        delivery: payload.delivery.map(views::stop_from_body),
        pickup_date: payload.pickup_date,
        estimated_delivery_date: payload.estimated_delivery_date,
        load_type: payload.load_type,
        weight_kg: payload.weight_kg,
        volume_litres: payload.volume_litres,
        total_amount_minor: payload.total_amount_minor,
        advance_amount_minor: payload.advance_amount_minor,
        truck_id: payload.truck_id,
        driver_id: payload.driver_id,
    };
    let order = state.engine.update_order(&principal, order_id, update).await?;
    Ok(Json(views::order(order)))
}

pub async fn update_status(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<StatusUpdate>,
) -> Result<Json<OrderView>, ServerError> {
    let order = state
        .engine
        .update_order_status(&principal, order_id, &payload.status)
        .await?;
    Ok(Json(views::order(order)))
}

pub async fn attach_document(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<DocumentAttach>,
) -> Result<Json<OrderView>, ServerError> {
    let kind = OrderDocument::try_from(payload.kind.trim())?;
    let order = state
        .engine
        .attach_order_document(&principal, order_id, kind, &payload.key)
        .await?;
    Ok(Json(views::order(order)))
}

pub async fn delete(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(order_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_order(&principal, order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn timeline(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Listing<TimelineEventView>>, ServerError> {
    let events = state.engine.order_timeline(&principal, order_id).await?;
    Ok(Json(
        events.into_iter().map(views::event).collect::<Vec<_>>().into(),
    ))
}

pub async fn expenses(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Listing<ExpenseView>>, ServerError> {
    let expenses = state.engine.order_expenses(&principal, order_id).await?;
    Ok(Json(
        expenses.into_iter().map(views::expense).collect::<Vec<_>>().into(),
    ))
}

pub async fn transfers(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Listing<TransferView>>, ServerError> {
    let transfers = state.engine.order_transfers(&principal, order_id).await?;
    Ok(Json(
        transfers.into_iter().map(views::transfer).collect::<Vec<_>>().into(),
    ))
}
