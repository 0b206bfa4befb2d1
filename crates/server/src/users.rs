//! User API endpoints.

use api_types::{
    Listing,
    user::{UserListQuery, UserNew, UserView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Action, EntityKind, NewUser, Principal, Role};
use uuid::Uuid;

use crate::{ServerError, authorize, server::ServerState, views};

pub async fn create(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    authorize(&principal, EntityKind::User, Action::Create)?;
    let role = Role::try_from(payload.role.trim())?;
    if payload.password.is_empty() {
        return Err(ServerError::Generic(
            "password must not be empty".to_string(),
        ));
    }

    let cost = state.password_cost;
    let password = payload.password;
    let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|err| ServerError::Internal(format!("hashing task failed: {err}")))?
        .map_err(|err| ServerError::Internal(format!("failed to hash password: {err}")))?;

    let cmd = NewUser::new(payload.email, role, password_hash)
        .name(payload.first_name, payload.last_name)
        .phone(payload.phone);
    let user = state.engine.create_user(&principal, cmd).await?;

    state.notifier.welcome(&user);
    Ok((StatusCode::CREATED, Json(views::user(user))))
}

pub async fn list(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Listing<UserView>>, ServerError> {
    let role = views::choice::<Role>(query.role.as_deref())?;
    let users = state.engine.list_users(&principal, role).await?;
    Ok(Json(
        users.into_iter().map(views::user).collect::<Vec<_>>().into(),
    ))
}

pub async fn profile(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
) -> Result<Json<UserView>, ServerError> {
    let user = state.engine.profile(&principal).await?;
    Ok(Json(views::user(user)))
}

pub async fn drivers(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
) -> Result<Json<Listing<UserView>>, ServerError> {
    let users = state.engine.drivers(&principal).await?;
    Ok(Json(
        users.into_iter().map(views::user).collect::<Vec<_>>().into(),
    ))
}

pub async fn owners(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
) -> Result<Json<Listing<UserView>>, ServerError> {
    let users = state.engine.owners(&principal).await?;
    Ok(Json(
        users.into_iter().map(views::user).collect::<Vec<_>>().into(),
    ))
}

pub async fn delete(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_user(&principal, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
