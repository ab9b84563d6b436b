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
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{appeals, donations, fulfillment, stats, user, wallets};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(auth_header) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Username.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(engine: Arc<Engine>, db: DatabaseConnection) -> Router {
    let state = ServerState { engine, db };

    Router::new()
        .route("/appeals", post(appeals::submit).get(appeals::list))
        .route("/appeals/{id}", get(appeals::get))
        .route("/appeals/{id}/approve", post(appeals::approve))
        .route("/appeals/{id}/reject", post(appeals::reject))
        .route("/appeals/{id}/cancel", post(appeals::cancel))
        .route(
            "/appeals/{id}/reject-withdrawal",
            post(wallets::reject_withdrawal),
        )
        .route("/wallet", get(wallets::own_wallet))
        .route("/wallet/transactions", get(wallets::own_transactions))
        .route("/wallet/stats", get(wallets::own_stats))
        .route("/wallets/{username}", get(wallets::wallet))
        .route("/wallets/{username}/credit", post(wallets::credit))
        .route("/wallets/{username}/debit", post(wallets::debit))
        .route("/wallets/{username}/adjust", post(wallets::adjust))
        .route("/wallets/{username}/refund", post(wallets::refund))
        .route(
            "/donations",
            post(donations::submit).get(donations::list),
        )
        .route("/fulfillment/run", post(fulfillment::run))
        .route("/fulfillment/expire", post(fulfillment::expire))
        .route(
            "/system-wallet",
            get(fulfillment::system_wallet).post(fulfillment::fund),
        )
        .route("/stats/overview", get(stats::overview))
        .route("/stats/recipients", get(stats::recipients))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(Arc::new(engine), db)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
