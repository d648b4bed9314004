use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};
use odoolink_core::AppError;
use tracing::{error, warn};

use crate::dto::{ContactMessageListQuery, ContactMessageRequest, ContactMessageResponse};
use crate::error::ApiResult;
use crate::state::AppState;
use crate::views;

const DEFAULT_LIST_LIMIT: usize = 20;
const MAX_LIST_LIMIT: usize = 100;

pub async fn contact_form_handler() -> Html<String> {
    Html(views::contact_page(&ContactMessageRequest::default(), None))
}

/// Handles the HTML form post.
///
/// Invalid input re-renders the form with the message and the typed values;
/// storage failures render the error page.
pub async fn submit_contact_form_handler(
    State(state): State<AppState>,
    Form(payload): Form<ContactMessageRequest>,
) -> Response {
    match state
        .contact_message_service
        .submit(payload.clone().into())
        .await
    {
        Ok(_) => Html(views::thanks_page()).into_response(),
        Err(AppError::Validation(message)) => {
            warn!(error = %message, "contact form rejected");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(views::contact_page(&payload, Some(message.as_str()))),
            )
                .into_response()
        }
        Err(failure) => {
            error!(error = %failure, "failed to store contact message");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(views::error_page(failure.to_string().as_str())),
            )
                .into_response()
        }
    }
}

pub async fn create_contact_message_handler(
    State(state): State<AppState>,
    Json(payload): Json<ContactMessageRequest>,
) -> ApiResult<(StatusCode, Json<ContactMessageResponse>)> {
    let message = state
        .contact_message_service
        .submit(payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(ContactMessageResponse::from(message))))
}

pub async fn list_contact_messages_handler(
    State(state): State<AppState>,
    Query(query): Query<ContactMessageListQuery>,
) -> ApiResult<Json<Vec<ContactMessageResponse>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    let messages = state
        .contact_message_service
        .recent_messages(limit)
        .await?;

    Ok(Json(
        messages
            .into_iter()
            .map(ContactMessageResponse::from)
            .collect(),
    ))
}
