use std::convert::Infallible;

use bytes::Bytes;
use log::{debug, error};
use serde::Serialize;
use warp::{http::StatusCode, reject, reply, reply::Response, Filter, Rejection, Reply};

use super::templates::{render_gallery, render_index, static_file};
use super::types::*;
use crate::error_handling::types::HandoffError;
use crate::screenshot_channel::ScreenshotUpload;

/// Status code reported for each core outcome.
pub fn status_for(err: &HandoffError) -> StatusCode {
    match err {
        HandoffError::AuthMissing => StatusCode::BAD_REQUEST,
        HandoffError::AuthInvalid => StatusCode::FORBIDDEN,
        HandoffError::ValidationError(_) => StatusCode::BAD_REQUEST,
        HandoffError::StateConflict => StatusCode::FORBIDDEN,
        HandoffError::NotFound => StatusCode::NOT_FOUND,
        HandoffError::ProcessingError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_reply(err: &HandoffError) -> Response {
    reply::with_status(
        reply::json(&ApiError {
            message: err.to_string(),
        }),
        status_for(err),
    )
    .into_response()
}

fn json_ok<T: Serialize>(body: &T) -> Response {
    reply::with_status(reply::json(body), StatusCode::OK).into_response()
}

fn html_or_error(page: Option<String>) -> Response {
    match page {
        Some(html) => reply::html(html).into_response(),
        None => {
            error!("Page template missing from embedded assets");
            reply::with_status(
                reply::json(&ApiError {
                    message: "Template not found".to_string(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
            .into_response()
        }
    }
}

fn respond(result: Result<Response, HandoffError>) -> Result<Response, Rejection> {
    Ok(result.unwrap_or_else(|e| error_reply(&e)))
}

/// Turns framework rejections (unknown path, wrong method, body limits,
/// malformed query or form) into the same JSON error body as core errors.
pub async fn handle_rejection(rejection: Rejection) -> Result<Response, Infallible> {
    let (status, message) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if rejection.find::<reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else if rejection.find::<reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Payload too large".to_string())
    } else if rejection.find::<reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "Content-Length required".to_string())
    } else if rejection.find::<reject::UnsupportedMediaType>().is_some() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "Unsupported media type".to_string())
    } else if let Some(e) = rejection.find::<reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, format!("Invalid query: {}", e))
    } else if let Some(e) = rejection.find::<warp::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("Invalid form body: {}", e))
    } else {
        error!("Unhandled rejection: {:?}", rejection);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
    };
    debug!("Request rejected with {}: {}", status, message);

    Ok(reply::with_status(reply::json(&ApiError { message }), status).into_response())
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

// Handlers. Each checks the credential first, then calls exactly one core
// operation.

fn handle_submit(state: &AppState, form: SubmitForm) -> Result<Response, HandoffError> {
    let (key, content) = match (form.key.as_deref(), form.content.as_deref()) {
        (Some(key), Some(content)) if !key.is_empty() && !content.trim().is_empty() => {
            (key, content)
        }
        _ => return Err(HandoffError::ValidationError("key or content".to_string())),
    };
    state.auth.authenticate(Some(key))?;
    let position = state.queue.submit(content)?;
    Ok(json_ok(&SubmitResponse {
        message: format!(
            "Content stored successfully. Queue position: {}. Waiting for typing acknowledgement.",
            position
        ),
        position,
    }))
}

fn handle_latest(state: &AppState, query: KeyQuery) -> Result<Response, HandoffError> {
    state.auth.authenticate(query.key.as_deref())?;
    let item = state.queue.peek_latest()?;
    Ok(reply::with_status(item.content, StatusCode::OK).into_response())
}

fn handle_acknowledge(state: &AppState, form: KeyForm) -> Result<Response, HandoffError> {
    state.auth.authenticate(form.key.as_deref())?;
    let consumed = state.queue.acknowledge().is_some();
    Ok(json_ok(&ReleaseResponse {
        message: "Acknowledgement received. New submissions allowed.".to_string(),
        consumed,
    }))
}

fn handle_interrupt(state: &AppState, form: KeyForm) -> Result<Response, HandoffError> {
    state.auth.authenticate(form.key.as_deref())?;
    let consumed = state.queue.interrupt().is_some();
    Ok(json_ok(&ReleaseResponse {
        message: "Interrupted. Content discarded, new submissions allowed.".to_string(),
        consumed,
    }))
}

fn handle_force_unlock(state: &AppState, form: KeyForm) -> Result<Response, HandoffError> {
    state.auth.authenticate_opaque(form.key.as_deref())?;
    state.queue.force_unlock();
    Ok(json_ok(&ApiMessage {
        message: "Submissions unlocked.".to_string(),
    }))
}

fn handle_clear_queue(state: &AppState, form: KeyForm) -> Result<Response, HandoffError> {
    state.auth.authenticate_opaque(form.key.as_deref())?;
    let removed = state.queue.clear_queue();
    Ok(json_ok(&ClearResponse {
        message: "Queue cleared.".to_string(),
        removed,
    }))
}

fn handle_status(state: &AppState, query: KeyQuery) -> Result<Response, HandoffError> {
    state.auth.authenticate_opaque(query.key.as_deref())?;
    Ok(json_ok(&state.queue.status()))
}

fn handle_request_capture(state: &AppState, form: KeyForm) -> Result<Response, HandoffError> {
    state.auth.authenticate_opaque(form.key.as_deref())?;
    state.screenshots.request_capture();
    Ok(json_ok(&ApiMessage {
        message: "Screenshot capture requested.".to_string(),
    }))
}

fn handle_poll_capture(state: &AppState, query: KeyQuery) -> Result<Response, HandoffError> {
    state.auth.authenticate_opaque(query.key.as_deref())?;
    Ok(json_ok(&PollResponse {
        capture_requested: state.screenshots.poll_and_clear_capture_request(),
    }))
}

fn handle_upload(state: &AppState, body: &[u8]) -> Result<Response, HandoffError> {
    let upload: UploadBody = serde_json::from_slice(body).map_err(|e| {
        debug!("Rejected screenshot upload body: {}", e);
        HandoffError::ProcessingError(format!("malformed upload body: {}", e))
    })?;
    state.auth.authenticate(upload.key.as_deref())?;
    let image = upload
        .image
        .ok_or_else(|| HandoffError::ValidationError("image payload".to_string()))?;

    let artifact = state.screenshots.upload(ScreenshotUpload {
        image,
        timestamp: upload.timestamp,
    })?;
    Ok(json_ok(&UploadResponse {
        message: "Screenshot stored.".to_string(),
        id: artifact.id.to_string(),
        size: artifact.size,
        captured_at: artifact.captured_at.to_rfc3339(),
    }))
}

fn handle_list_screenshots(state: &AppState, query: GalleryQuery) -> Result<Response, HandoffError> {
    state.auth.authenticate_opaque(query.key.as_deref())?;
    let limit = query.limit.unwrap_or(state.gallery_size);
    Ok(json_ok(&state.screenshots.recent(limit)))
}

fn handle_clear_screenshots(state: &AppState, form: KeyForm) -> Result<Response, HandoffError> {
    state.auth.authenticate_opaque(form.key.as_deref())?;
    let removed = state.screenshots.clear_all();
    Ok(json_ok(&ClearResponse {
        message: "Screenshots cleared.".to_string(),
        removed,
    }))
}

fn handle_gallery(state: &AppState, query: GalleryQuery) -> Result<Response, HandoffError> {
    state.auth.authenticate_opaque(query.key.as_deref())?;
    let limit = query.limit.unwrap_or(state.gallery_size);
    Ok(html_or_error(render_gallery(&state.screenshots.recent(limit))))
}

/// GET /
pub fn index_route(state: AppState) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path::end()
        .and(warp::get())
        .and(with_state(state))
        .and_then(|state: AppState| async move {
            Ok::<_, Rejection>(html_or_error(render_index(&state.queue.status())))
        })
}

/// GET /static/:file
pub fn static_route() -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("static" / String)
        .and(warp::get())
        .and_then(|name: String| async move {
            match static_file(&name) {
                Some(file) => Ok::<_, Rejection>(
                    reply::with_header(file.body, "Content-Type", file.mime_type).into_response(),
                ),
                None => Ok::<_, Rejection>(
                    reply::with_status(
                        reply::json(&ApiError {
                            message: "Not found".to_string(),
                        }),
                        StatusCode::NOT_FOUND,
                    )
                    .into_response(),
                ),
            }
        })
}

/// POST /submit
pub fn submit_route(state: AppState) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("submit")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::form::<SubmitForm>())
        .and(with_state(state))
        .and_then(|form: SubmitForm, state: AppState| async move {
            respond(handle_submit(&state, form))
        })
}

/// GET /latest?key=
pub fn latest_route(state: AppState) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("latest")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<KeyQuery>())
        .and(with_state(state))
        .and_then(|query: KeyQuery, state: AppState| async move {
            respond(handle_latest(&state, query))
        })
}

/// POST /acknowledge
pub fn acknowledge_route(
    state: AppState,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("acknowledge")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::form::<KeyForm>())
        .and(with_state(state))
        .and_then(|form: KeyForm, state: AppState| async move {
            respond(handle_acknowledge(&state, form))
        })
}

/// POST /interrupt
pub fn interrupt_route(state: AppState) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("interrupt")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::form::<KeyForm>())
        .and(with_state(state))
        .and_then(|form: KeyForm, state: AppState| async move {
            respond(handle_interrupt(&state, form))
        })
}

/// POST /unlock
pub fn force_unlock_route(
    state: AppState,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("unlock")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::form::<KeyForm>())
        .and(with_state(state))
        .and_then(|form: KeyForm, state: AppState| async move {
            respond(handle_force_unlock(&state, form))
        })
}

/// POST /clear
pub fn clear_queue_route(
    state: AppState,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("clear")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::form::<KeyForm>())
        .and(with_state(state))
        .and_then(|form: KeyForm, state: AppState| async move {
            respond(handle_clear_queue(&state, form))
        })
}

/// GET /status?key=
pub fn status_route(state: AppState) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("status")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<KeyQuery>())
        .and(with_state(state))
        .and_then(|query: KeyQuery, state: AppState| async move {
            respond(handle_status(&state, query))
        })
}

/// POST /screenshot/request
pub fn request_capture_route(
    state: AppState,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("screenshot" / "request")
        .and(warp::post())
        .and(warp::body::form::<KeyForm>())
        .and(with_state(state))
        .and_then(|form: KeyForm, state: AppState| async move {
            respond(handle_request_capture(&state, form))
        })
}

/// GET /screenshot/poll?key=
pub fn poll_capture_route(
    state: AppState,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("screenshot" / "poll")
        .and(warp::get())
        .and(warp::query::<KeyQuery>())
        .and(with_state(state))
        .and_then(|query: KeyQuery, state: AppState| async move {
            respond(handle_poll_capture(&state, query))
        })
}

/// POST /screenshot/upload (JSON body)
pub fn upload_route(state: AppState) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let limit = state.max_upload_bytes;
    warp::path!("screenshot" / "upload")
        .and(warp::post())
        .and(warp::body::content_length_limit(limit))
        .and(warp::body::bytes())
        .and(with_state(state))
        .and_then(|body: Bytes, state: AppState| async move {
            respond(handle_upload(&state, &body))
        })
}

/// GET /screenshots?key=&limit=
pub fn list_screenshots_route(
    state: AppState,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("screenshots")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<GalleryQuery>())
        .and(with_state(state))
        .and_then(|query: GalleryQuery, state: AppState| async move {
            respond(handle_list_screenshots(&state, query))
        })
}

/// POST /screenshots/clear
pub fn clear_screenshots_route(
    state: AppState,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("screenshots" / "clear")
        .and(warp::post())
        .and(warp::body::form::<KeyForm>())
        .and(with_state(state))
        .and_then(|form: KeyForm, state: AppState| async move {
            respond(handle_clear_screenshots(&state, form))
        })
}

/// GET /gallery?key=&limit=
pub fn gallery_route(state: AppState) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("gallery")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<GalleryQuery>())
        .and(with_state(state))
        .and_then(|query: GalleryQuery, state: AppState| async move {
            respond(handle_gallery(&state, query))
        })
}
