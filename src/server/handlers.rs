use super::INDEX_HTML;
use crate::{
    error::BrewError,
    gemini::data_uri,
    models::{AspectRatio, GenerateOutcome, SessionSnapshot, SkipReason},
    session::GenerationSession,
};
use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Image {0} not found in history")]
    NotFound(Uuid),
    #[error(transparent)]
    Internal(#[from] BrewError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Internal(e) = self {
            log::error!("Request failed: {}", e);
        }
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string(),
        }))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    pub prompt: String,
    #[serde(default)]
    pub aspect_ratio: Option<AspectRatio>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub outcome: GenerateOutcome,
    pub session: SessionSnapshot,
}

pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(INDEX_HTML)
}

pub async fn aspect_ratios() -> HttpResponse {
    HttpResponse::Ok().json(AspectRatio::ALL)
}

pub async fn session(session: web::Data<GenerationSession>) -> HttpResponse {
    HttpResponse::Ok().json(session.snapshot())
}

pub async fn generate(
    session: web::Data<GenerationSession>,
    body: web::Json<GenerateBody>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    if body.prompt.trim().is_empty() {
        return Ok(skipped(&session, SkipReason::BlankPrompt));
    }
    if !session.update_input(body.prompt, body.aspect_ratio) {
        return Ok(skipped(&session, SkipReason::InFlight));
    }

    // Runs detached so a client hanging up cannot leave the session generating.
    let task_session = session.clone();
    let outcome = actix_web::rt::spawn(async move { task_session.generate().await })
        .await
        .map_err(|e| BrewError::ServerError(format!("Generation task failed: {}", e)))?;

    let status = match &outcome {
        GenerateOutcome::Completed { .. } | GenerateOutcome::Failed { .. } => StatusCode::OK,
        GenerateOutcome::Skipped {
            reason: SkipReason::BlankPrompt,
        } => StatusCode::BAD_REQUEST,
        GenerateOutcome::Skipped {
            reason: SkipReason::InFlight,
        } => StatusCode::CONFLICT,
    };

    Ok(HttpResponse::build(status).json(GenerateResponse {
        outcome,
        session: session.snapshot(),
    }))
}

fn skipped(session: &GenerationSession, reason: SkipReason) -> HttpResponse {
    let status = match reason {
        SkipReason::BlankPrompt => StatusCode::BAD_REQUEST,
        SkipReason::InFlight => StatusCode::CONFLICT,
    };
    HttpResponse::build(status).json(GenerateResponse {
        outcome: GenerateOutcome::Skipped { reason },
        session: session.snapshot(),
    })
}

pub async fn select(
    session: web::Data<GenerationSession>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if !session.select(id) {
        return Err(ApiError::NotFound(id));
    }
    Ok(HttpResponse::Ok().json(session.snapshot()))
}

pub async fn download(
    session: web::Data<GenerationSession>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let image = session.image(id).ok_or(ApiError::NotFound(id))?;
    let (mime_type, bytes) = data_uri::decode(&image.url)?;

    Ok(HttpResponse::Ok()
        .content_type(mime_type)
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", image.download_file_name()),
        ))
        .body(bytes))
}
