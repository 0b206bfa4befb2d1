use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::sync::Arc;

use crate::{
    dashboard, expenses, notify::WelcomeNotifier, orders, timeline, transfers, trucks, users,
};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub notifier: WelcomeNotifier,
    /// bcrypt cost used when hashing new passwords.
    pub password_cost: u32,
}

impl ServerState {
    pub fn new(engine: Engine, notifier: WelcomeNotifier) -> Self {
        Self {
            engine: Arc::new(engine),
            notifier,
            password_cost: bcrypt::DEFAULT_COST,
        }
    }

    #[must_use]
    pub fn password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }
}

/// Resolves the Basic credentials into a [`engine::Principal`] stored in the
/// request extensions.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let credentials = match state.engine.user_credentials(auth_header.username()).await {
        Ok(Some(credentials)) => credentials,
        Ok(None) => return Err(StatusCode::UNAUTHORIZED),
        // Stored role outside the known set.
        Err(EngineError::Validation(err)) => {
            tracing::warn!("rejecting user with unreadable record: {err}");
            return Err(StatusCode::UNAUTHORIZED);
        }
        Err(err) => {
            tracing::error!("failed to load credentials: {err}");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };
    if !credentials.user.is_active {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let password = auth_header.password().to_string();
    let hash = credentials.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .unwrap_or(false);
    if !verified {
        return Err(StatusCode::UNAUTHORIZED);
    }

    request.extensions_mut().insert(credentials.user.principal());
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/trucks", get(trucks::list).post(trucks::create))
        .route(
            "/trucks/{id}",
            get(trucks::get)
                .patch(trucks::update)
                .delete(trucks::delete),
        )
        .route("/trucks/{id}/assign_driver", post(trucks::assign_driver))
        .route("/orders", get(orders::list).post(orders::create))
        .route(
            "/orders/{id}",
            get(orders::get)
                .patch(orders::update)
                .delete(orders::delete),
        )
        .route("/orders/{id}/status", post(orders::update_status))
        .route("/orders/{id}/documents", post(orders::attach_document))
        .route("/orders/{id}/timeline", get(orders::timeline))
        .route("/orders/{id}/expenses", get(orders::expenses))
        .route("/orders/{id}/transfers", get(orders::transfers))
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route(
            "/expenses/{id}",
            get(expenses::get).delete(expenses::delete),
        )
        .route("/transfers", get(transfers::list).post(transfers::create))
        .route(
            "/transfers/{id}",
            get(transfers::get).delete(transfers::delete),
        )
        .route("/timeline", get(timeline::list))
        .route("/timeline/{id}", get(timeline::get))
        .route("/dashboard/stats", get(dashboard::stats))
        .route("/dashboard/owner", get(dashboard::owner))
        .route("/users", get(users::list).post(users::create))
        .route("/users/profile", get(users::profile))
        .route("/users/drivers", get(users::drivers))
        .route("/users/owners", get(users::owners))
        .route("/users/{id}", axum::routing::delete(users::delete))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
