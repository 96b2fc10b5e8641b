use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, Json},
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stockcast_core::{ErrorKind, ForecastContext, ForecastResponse};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::ApiConfig;

/// Shared read-only pipeline state.
pub type ApiState = Arc<ForecastContext>;

const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head><title>Consumption Forecast</title></head>
<body>
  <h1>Consumption Forecast</h1>
  <form action="/predict" method="post">
    <label for="consumption">Today's consumption</label>
    <input type="text" id="consumption" name="consumption" required>
    <button type="submit">Predict</button>
  </form>
</body>
</html>
"#;

// Response types
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Serialize)]
pub struct InfoResponse {
    model: String,
    window_size: usize,
    history_rows: usize,
    prefix_len: usize,
}

#[derive(Deserialize)]
pub struct PredictForm {
    /// Absent field behaves like an empty submission.
    #[serde(default)]
    consumption: String,
}

// Handlers
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn get_info(State(ctx): State<ApiState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        model: ctx.model_kind().as_str().to_string(),
        window_size: ctx.window_size(),
        history_rows: ctx.history().source_rows(),
        prefix_len: ctx.history().prefix().len(),
    })
}

async fn predict(
    State(ctx): State<ApiState>,
    Form(form): Form<PredictForm>,
) -> (StatusCode, Json<ForecastResponse>) {
    let outcome = ctx.respond(&form.consumption);
    let status = match &outcome {
        Ok(forecast) => {
            info!(
                input = forecast.input,
                prediction = forecast.prediction,
                "Forecast served"
            );
            StatusCode::OK
        }
        Err(kind) => status_for(*kind),
    };
    (status, Json(ForecastResponse::from(outcome)))
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Inference | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn router(state: ApiState, cors: bool) -> Router {
    let app = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/api/info", get(get_info))
        .with_state(state);

    if cors {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        app
    }
}

pub async fn run_api_server(state: ApiState, config: &ApiConfig) -> anyhow::Result<()> {
    let app = router(state, config.cors);

    let addr = config.bind_addr();
    info!(addr = %addr, "API server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
