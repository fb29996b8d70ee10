//! Storefront Dashboard - back-office revenue reporting service

use anyhow::Result;
use axum::{extract::{Query, State}, http::StatusCode, routing::{get, post}, Json, Router};
use chrono::Local;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast::error::RecvError, RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_dashboard::client::OrderApiClient;
use storefront_dashboard::DashboardError;
use storefront_dashboard::domain::events::{EventBus, OrderEvent};
use storefront_dashboard::domain::order::OrderRecord;
use storefront_dashboard::report::{aggregate, Locale, RevenueReport, TimeRange};

#[derive(Clone)]
struct AppState {
    client: OrderApiClient,
    events: EventBus,
    snapshot: Arc<RwLock<Option<Snapshot>>>,
    snapshot_ttl: Duration,
}

struct Snapshot {
    fetched_at: Instant,
    orders: Vec<OrderRecord>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let order_api_url = std::env::var("ORDER_API_URL")
        .map_err(|_| DashboardError::Config("ORDER_API_URL is required".into()))?;
    let ttl_secs: u64 = std::env::var("SNAPSHOT_TTL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(30);
    let state = AppState {
        client: OrderApiClient::new(order_api_url),
        events: EventBus::default(),
        snapshot: Arc::new(RwLock::new(None)),
        snapshot_ttl: Duration::from_secs(ttl_secs),
    };

    // Order-change events drop the cached snapshot so the next stats
    // request refetches.
    let mut rx = state.events.subscribe();
    let snapshot = state.snapshot.clone();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    tracing::info!(?event, "Order change announced; dropping cached snapshot");
                    *snapshot.write().await = None;
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });

    let app = Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "storefront-dashboard"})) }))
        .route("/api/v1/dashboard/stats", get(dashboard_stats))
        .route("/api/v1/events", post(publish_event))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8084".to_string());
    tracing::info!("Storefront dashboard listening on 0.0.0.0:{}", port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?, app).await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct StatsParams {
    range: TimeRange,
    #[serde(default = "default_locale")]
    locale: Locale,
}

fn default_locale() -> Locale {
    Locale::Vi
}

async fn dashboard_stats(State(s): State<AppState>, Query(p): Query<StatsParams>) -> Result<Json<RevenueReport>, (StatusCode, String)> {
    let orders = current_orders(&s).await.map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))?;
    // One clock read per pass; the whole aggregation sees the same "now".
    let now = Local::now().naive_local();
    Ok(Json(aggregate(&orders, p.range, p.locale, now)))
}

async fn current_orders(s: &AppState) -> storefront_dashboard::Result<Vec<OrderRecord>> {
    {
        let guard = s.snapshot.read().await;
        if let Some(snap) = guard.as_ref() {
            if snap.fetched_at.elapsed() < s.snapshot_ttl {
                return Ok(snap.orders.clone());
            }
        }
    }
    let orders = s.client.fetch_orders().await?;
    *s.snapshot.write().await = Some(Snapshot { fetched_at: Instant::now(), orders: orders.clone() });
    Ok(orders)
}

async fn publish_event(State(s): State<AppState>, Json(event): Json<OrderEvent>) -> StatusCode {
    s.events.publish(event);
    StatusCode::ACCEPTED
}
