use axum::{
    Router,
    extract::{MatchedPath, Request},
    http::HeaderValue,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use std::{net::SocketAddr, sync::Arc};

use crate::{bank_accounts, budgets, categories, health, reports, transactions, users};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Allows the given frontend origins, with credentials.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

fn trace_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http().make_span_with(|req: &Request| {
        let method = req.method();
        let uri = req.uri();

        let matched_path = req
            .extensions()
            .get::<MatchedPath>()
            .map(|matched_path| matched_path.as_str());

        tracing::debug_span!("request", %method, %uri, matched_path)
    });

    router.layer(tracing_layer)
}

/// Builds the HTTP API over `state`.
///
/// List and create answer on both `/api/x` and `/api/x/`.
pub fn router(state: ServerState, cors_origins: &[String]) -> Router {
    let router = Router::new()
        .route("/", get(health::root))
        .route("/api/health", get(health::health))
        .route("/api/categories", get(categories::list).post(categories::create))
        .route("/api/categories/", get(categories::list).post(categories::create))
        .route(
            "/api/categories/{id}",
            get(categories::get)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route("/api/budgets", get(budgets::list).post(budgets::create))
        .route("/api/budgets/", get(budgets::list).post(budgets::create))
        .route("/api/budgets/status", get(budgets::statuses))
        .route(
            "/api/budgets/{id}",
            get(budgets::get).put(budgets::update).delete(budgets::delete),
        )
        .route("/api/budgets/{id}/status", get(budgets::status))
        .route("/api/users", get(users::list).post(users::create))
        .route("/api/users/", get(users::list).post(users::create))
        .route(
            "/api/users/{id}",
            get(users::get).put(users::update).delete(users::delete),
        )
        .route(
            "/api/bank-accounts",
            get(bank_accounts::list).post(bank_accounts::create),
        )
        .route(
            "/api/bank-accounts/",
            get(bank_accounts::list).post(bank_accounts::create),
        )
        .route(
            "/api/bank-accounts/balance-check",
            get(bank_accounts::balance_check),
        )
        .route("/api/bank-accounts/recompute", post(bank_accounts::recompute))
        .route(
            "/api/bank-accounts/{id}",
            get(bank_accounts::get)
                .put(bank_accounts::update)
                .delete(bank_accounts::delete),
        )
        .route(
            "/api/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/api/transactions/",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/api/transactions/{id}",
            get(transactions::get)
                .put(transactions::update)
                .delete(transactions::delete),
        )
        .route("/api/summary", get(reports::summary))
        .layer(cors_layer(cors_origins))
        .with_state(state);

    trace_layer(router)
}

pub async fn run(engine: Engine, addr: SocketAddr, cors_origins: Vec<String>) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener, cors_origins).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
    cors_origins: Vec<String>,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state, &cors_origins)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
    cors_origins: Vec<String>,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener, cors_origins).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
