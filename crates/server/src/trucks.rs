//! Trucks API endpoints.

use api_types::{
    Listing,
    truck::{AssignDriver, TruckListQuery, TruckNew, TruckUpdate, TruckView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Action, EntityKind, NewTruck, Principal, TruckListFilter, TruckStatus};
use uuid::Uuid;

use crate::{ServerError, authorize, server::ServerState, views};

pub async fn list(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Query(query): Query<TruckListQuery>,
) -> Result<Json<Listing<TruckView>>, ServerError> {
    let filter = TruckListFilter {
        status: views::choice::<TruckStatus>(query.status.as_deref())?,
        owner_id: query.owner,
        driver_id: query.driver,
        search: query.search,
        ordering: query.ordering,
        limit: query.limit,
    };
    let trucks = state.engine.list_trucks(&principal, &filter).await?;
    Ok(Json(
        trucks.into_iter().map(views::truck).collect::<Vec<_>>().into(),
    ))
}

pub async fn create(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<TruckNew>,
) -> Result<(StatusCode, Json<TruckView>), ServerError> {
    authorize(&principal, EntityKind::Truck, Action::Create)?;
    let mut cmd = NewTruck::new(
        payload.number,
        payload.owner_id,
        payload.rc_expiry,
        payload.insurance_expiry,
        payload.pollution_expiry,
    )
    .vehicle(payload.make, payload.model, payload.year)
    .axle_count(payload.axle_count)
    .capacity_kg(payload.capacity_kg)
    .current_mileage_km(payload.current_mileage_km);
    cmd.fuel_type = payload.fuel_type;
    cmd.rc_document = payload.rc_document;
    cmd.insurance_document = payload.insurance_document;
    cmd.pollution_document = payload.pollution_document;
    cmd.status = views::choice::<TruckStatus>(payload.status.as_deref())?;
    cmd.assigned_driver_id = payload.assigned_driver_id;

    let truck = state.engine.create_truck(&principal, cmd).await?;
    Ok((StatusCode::CREATED, Json(views::truck(truck))))
}

pub async fn get(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(truck_id): Path<Uuid>,
) -> Result<Json<TruckView>, ServerError> {
    let truck = state.engine.truck(&principal, truck_id).await?;
    Ok(Json(views::truck(truck)))
}

pub async fn update(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(truck_id): Path<Uuid>,
    Json(payload): Json<TruckUpdate>,
) -> Result<Json<TruckView>, ServerError> {
    authorize(&principal, EntityKind::Truck, Action::Update)?;
    let update = engine::TruckUpdate {
        status: views::choice::<TruckStatus>(payload.status.as_deref())?,
        make: payload.make,
        model: payload.model,
        year: payload.year,
        axle_count: payload.axle_count,
        capacity_kg: payload.capacity_kg,
        fuel_type: payload.fuel_type,
        current_mileage_km: payload.current_mileage_km,
        rc_expiry: payload.rc_expiry,
        insurance_expiry: payload.insurance_expiry,
        pollution_expiry: payload.pollution_expiry,
        rc_document: payload.rc_document,
        insurance_document: payload.insurance_document,
        pollution_document: payload.pollution_document,
    };
    let truck = state.engine.update_truck(&principal, truck_id, update).await?;
    Ok(Json(views::truck(truck)))
}

pub async fn assign_driver(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(truck_id): Path<Uuid>,
    Json(payload): Json<AssignDriver>,
) -> Result<Json<TruckView>, ServerError> {
    let truck = state
        .engine
        .assign_driver(&principal, truck_id, payload.driver_id)
        .await?;
    Ok(Json(views::truck(truck)))
}

pub async fn delete(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(truck_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_truck(&principal, truck_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
