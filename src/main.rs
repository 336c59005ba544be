//! Moodboard Studio: upload one or two images, generate an annotated mood
//! board through a multimodal generation service, then click elements for
//! structured details, grounded shopping links, upscaling and composites.

mod gemini;
mod marker;
mod models;
mod page;
mod parse;
mod prompts;
mod session;

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use gemini::{GatewayError, GeminiClient};
use models::{ImageCategory, UploadedImage};
use session::{OpKind, Session};

struct AppState {
    gateway: GeminiClient,
    session: Mutex<Session>,
}

impl AppState {
    // The lock is never held across an await; a poisoned session is still
    // structurally sound, so recover it instead of propagating the panic.
    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }
}

struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: err.to_string(),
        }
    }
}

type ApiResult = Result<Json<Value>, AppError>;

fn view(session: &Session) -> Result<Value, AppError> {
    serde_json::to_value(session).map_err(|e| AppError::internal(e.to_string()))
}

fn state_reply(session: &Session) -> ApiResult {
    Ok(Json(json!({ "state": view(session)? })))
}

async fn index() -> Html<&'static str> {
    Html(page::INDEX_HTML)
}

async fn get_state(State(app): State<Arc<AppState>>) -> ApiResult {
    let session = app.session();
    Ok(Json(view(&session)?))
}

#[derive(Deserialize)]
struct UploadQuery {
    slot: Option<String>,
}

async fn upload(
    State(app): State<Arc<AppState>>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> ApiResult {
    let slot = query.slot.as_deref().unwrap_or("primary").to_string();

    let mut stored = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("invalid upload: {e}")))?
    {
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(format!("invalid upload: {e}")))?;
        if data.is_empty() {
            continue;
        }
        let mime = models::sniff_mime(&data)
            .map_err(|e| AppError::bad_request(e.to_string()))?
            .to_string();
        stored = Some(UploadedImage {
            bytes: data.to_vec(),
            mime,
        });
        break;
    }
    let image = stored.ok_or_else(|| AppError::bad_request("no image in upload"))?;

    let mut session = app.session();
    match slot.as_str() {
        "primary" => session.set_primary(image),
        "secondary" => {
            if !session.category.requires_secondary() {
                return Err(AppError::bad_request(
                    "the current category uses a single image",
                ));
            }
            session.set_secondary(image);
        }
        other => return Err(AppError::bad_request(format!("unknown slot: {other}"))),
    }
    tracing::info!(slot, "image uploaded");
    state_reply(&session)
}

#[derive(Deserialize)]
struct CategoryRequest {
    category: ImageCategory,
}

async fn set_category(
    State(app): State<Arc<AppState>>,
    Json(req): Json<CategoryRequest>,
) -> ApiResult {
    let mut session = app.session();
    session.set_category(req.category);
    state_reply(&session)
}

#[derive(Deserialize, Default)]
struct InstructionsRequest {
    instructions: Option<String>,
}

async fn generate_moodboard(
    State(app): State<Arc<AppState>>,
    Json(req): Json<InstructionsRequest>,
) -> ApiResult {
    let (image, prompt, token) = {
        let mut session = app.session();
        let image = session
            .primary
            .clone()
            .ok_or_else(|| AppError::bad_request("upload an image first"))?;
        let prompt = prompts::moodboard_prompt(session.category, req.instructions.as_deref());
        let token = session.begin(OpKind::Moodboard);
        (image, prompt, token)
    };

    let outcome = app.gateway.generate_moodboard(&image, &prompt).await;

    let mut session = app.session();
    match outcome {
        Ok(board) => {
            session.settle_moodboard(token, Ok(board));
            state_reply(&session)
        }
        Err(err) => {
            tracing::warn!(error = %err, "mood board generation failed");
            session.settle_moodboard(token, Err(err.to_string()));
            Err(err.into())
        }
    }
}

#[derive(Deserialize)]
struct SelectRequest {
    x: f64,
    y: f64,
    display_width: f64,
    display_height: f64,
}

async fn select_element(
    State(app): State<Arc<AppState>>,
    Json(req): Json<SelectRequest>,
) -> ApiResult {
    let (marked, token) = {
        let mut session = app.session();
        let board = session
            .moodboard
            .result
            .as_ref()
            .ok_or_else(|| AppError::bad_request("generate a mood board first"))?;
        let (_, bytes) = models::decode_data_uri(&board.image)
            .ok_or_else(|| AppError::internal("mood board image is not a data URI"))?;
        let marked = marker::mark_click(&bytes, req.x, req.y, req.display_width, req.display_height)
            .map_err(|e| AppError::bad_request(e.to_string()))?;
        let token = session.begin(OpKind::Details);
        (
            UploadedImage {
                bytes: marked,
                mime: "image/png".to_string(),
            },
            token,
        )
    };

    let outcome = app
        .gateway
        .get_element_details(&marked, prompts::ELEMENT_DETAILS_TEMPLATE)
        .await;

    let mut session = app.session();
    match outcome {
        Ok(report) => {
            session.settle_details(token, Ok(report));
            state_reply(&session)
        }
        Err(err) => {
            tracing::warn!(error = %err, "element analysis failed");
            session.settle_details(token, Err(err.to_string()));
            Err(err.into())
        }
    }
}

async fn enhance(State(app): State<Arc<AppState>>) -> ApiResult {
    let (image, token) = {
        let mut session = app.session();
        let board = session
            .moodboard
            .result
            .as_ref()
            .ok_or_else(|| AppError::bad_request("generate a mood board first"))?;
        let (mime, bytes) = models::decode_data_uri(&board.image)
            .ok_or_else(|| AppError::internal("mood board image is not a data URI"))?;
        let token = session.begin(OpKind::Enhance);
        (UploadedImage { bytes, mime }, token)
    };

    let outcome = app
        .gateway
        .enhance_resolution(&image, prompts::ENHANCE_TEMPLATE)
        .await;

    let mut session = app.session();
    match outcome {
        Ok(uri) => {
            session.settle_enhanced(token, Ok(uri));
            state_reply(&session)
        }
        Err(err) => {
            tracing::warn!(error = %err, "resolution enhancement failed");
            session.settle_enhanced(token, Err(err.to_string()));
            Err(err.into())
        }
    }
}

async fn find_similar(State(app): State<Arc<AppState>>) -> ApiResult {
    let (query, token) = {
        let mut session = app.session();
        let report = session
            .details
            .result
            .as_ref()
            .ok_or_else(|| AppError::bad_request("select an element first"))?;
        let query = prompts::similar_items_query(&report.details);
        let token = session.begin(OpKind::Similar);
        (query, token)
    };

    let outcome = app.gateway.find_similar_items(&query).await;

    let mut session = app.session();
    match outcome {
        Ok(items) => {
            session.settle_similar(token, Ok(items));
            state_reply(&session)
        }
        Err(err) => {
            tracing::warn!(error = %err, "similar item search failed");
            session.settle_similar(token, Err(err.to_string()));
            Err(err.into())
        }
    }
}

async fn generate_composite(
    State(app): State<Arc<AppState>>,
    Json(req): Json<InstructionsRequest>,
) -> ApiResult {
    let (first, second, prompt, token) = {
        let mut session = app.session();
        let first = session
            .primary
            .clone()
            .ok_or_else(|| AppError::bad_request("upload the main image first"))?;
        let second = session
            .secondary
            .clone()
            .ok_or_else(|| AppError::bad_request("upload the second image first"))?;
        let prompt = prompts::composite_prompt(session.category, req.instructions.as_deref());
        let token = session.begin(OpKind::Composite);
        (first, second, prompt, token)
    };

    let outcome = app.gateway.generate_composite(&first, &second, &prompt).await;

    let mut session = app.session();
    match outcome {
        Ok(composite) => {
            session.settle_composite(token, Ok(composite));
            state_reply(&session)
        }
        Err(err) => {
            tracing::warn!(error = %err, "composite generation failed");
            session.settle_composite(token, Err(err.to_string()));
            Err(err.into())
        }
    }
}

async fn download(
    State(app): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> Result<Response, AppError> {
    let uri = {
        let session = app.session();
        match kind.as_str() {
            "moodboard" => session.moodboard.result.as_ref().map(|r| r.image.clone()),
            "enhanced" => session.enhanced.result.clone(),
            "composite" => session.composite.result.as_ref().map(|r| r.image.clone()),
            other => {
                return Err(AppError::bad_request(format!(
                    "unknown download kind: {other}"
                )))
            }
        }
    }
    .ok_or_else(|| AppError::not_found(format!("no {kind} image available yet")))?;

    let (mime, bytes) = models::decode_data_uri(&uri)
        .ok_or_else(|| AppError::internal("stored image is not a data URI"))?;
    let filename = models::download_filename(&kind, &mime, chrono::Utc::now());
    Ok((
        [
            (header::CONTENT_TYPE, mime),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moodboard_studio=info,tower_http=info".into()),
        )
        .init();

    let api_key =
        std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY must be set (see .env)")?;

    let state = Arc::new(AppState {
        gateway: GeminiClient::new(api_key),
        session: Mutex::new(Session::default()),
    });

    let app = Router::new()
        .route("/", get(index))
        .route("/api/state", get(get_state))
        .route("/api/upload", post(upload))
        .route("/api/category", post(set_category))
        .route("/api/moodboard", post(generate_moodboard))
        .route("/api/select", post(select_element))
        .route("/api/enhance", post(enhance))
        .route("/api/similar", post(find_similar))
        .route("/api/composite", post(generate_composite))
        .route("/api/download/:kind", get(download))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "moodboard studio listening");

    axum::serve(listener, app).await?;
    Ok(())
}
