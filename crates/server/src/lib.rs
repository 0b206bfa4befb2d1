use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::{Action, EngineError, EntityKind, Principal, can_mutate};

use serde::Serialize;
pub use notify::WelcomeNotifier;
pub use server::{ServerState, router, run_with_listener, spawn_with_listener};

mod dashboard;
mod expenses;
mod notify;
mod orders;
mod server;
mod timeline;
mod transfers;
mod trucks;
mod users;
mod views;

pub mod types {
    pub use api_types::{
        Listing, dashboard, expense, order, timeline, transfer, truck, user,
    };
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
    Internal(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) | EngineError::InvalidId(_) => StatusCode::BAD_REQUEST,
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) | EngineError::InUse(_) => StatusCode::CONFLICT,
        EngineError::OrderCodeExhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Validation(msg)
        | EngineError::Forbidden(msg)
        | EngineError::KeyNotFound(msg)
        | EngineError::InUse(msg)
        | EngineError::InvalidId(msg) => msg,
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
            ServerError::Internal(err) => {
                tracing::error!("internal error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(Error { error })).into_response()
    }
}

/// Role gate for handlers that validate or transform the payload before
/// calling the engine. Object-level checks still happen in the engine.
pub(crate) fn authorize(
    principal: &Principal,
    kind: EntityKind,
    action: Action,
) -> Result<(), ServerError> {
    if can_mutate(Some(principal), kind, action) {
        return Ok(());
    }
    Err(ServerError::Engine(EngineError::Forbidden(
        "you do not have permission to perform this action".to_string(),
    )))
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_validation_maps_to_400() {
        let res = ServerError::from(EngineError::Validation("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res = ServerError::from(EngineError::Forbidden("forbidden".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflicts_map_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let res = ServerError::from(EngineError::InUse("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn exhausted_order_codes_map_to_503() {
        let res = ServerError::from(EngineError::OrderCodeExhausted(16)).into_response();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn database_errors_are_hidden() {
        let err = EngineError::Database(sea_orm::DbErr::Custom("disk on fire".to_string()));
        assert_eq!(message_for_engine_error(err), "internal server error");
    }

    #[test]
    fn authorize_rejects_roles_before_payload_checks() {
        let driver = Principal::new(uuid::Uuid::new_v4(), engine::Role::Driver);
        let res = authorize(&driver, EntityKind::Order, Action::Create)
            .unwrap_err()
            .into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let admin = Principal::new(uuid::Uuid::new_v4(), engine::Role::Admin);
        assert!(authorize(&admin, EntityKind::User, Action::Create).is_ok());
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
