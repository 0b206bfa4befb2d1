//! Dashboard API endpoints.

use api_types::dashboard::{OwnerDashboard, OwnerQuery, Stats};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use engine::Principal;

use crate::{ServerError, server::ServerState, views};

pub async fn stats(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
) -> Result<Json<Stats>, ServerError> {
    let stats = state.engine.stats(&principal).await?;
    Ok(Json(views::stats(stats)))
}

pub async fn owner(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<OwnerDashboard>, ServerError> {
    let dashboard = state
        .engine
        .owner_dashboard(&principal, query.owner_id)
        .await?;
    Ok(Json(views::owner_dashboard(dashboard)))
}
