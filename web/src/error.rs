use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use todo_model::{TodoError, ValidationError};

use crate::templates;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("todo {0} not found")]
    NotFound(u64),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("template rendering failed: {0}")]
    Render(#[from] tera::Error),
}

impl From<TodoError> for PageError {
    fn from(err: TodoError) -> Self {
        match err {
            TodoError::NotFound(id) => Self::NotFound(id),
            TodoError::Validation(err) => Self::Validation(err),
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(id) => {
                let mut context = tera::Context::new();
                context.insert("id", &id);

                match templates::render("not_found.html", &context) {
                    Ok(html) => (StatusCode::NOT_FOUND, html).into_response(),
                    Err(err) => {
                        tracing::error!("Failed to render 404 page: {:?}", err);
                        (StatusCode::NOT_FOUND, "TODO not found").into_response()
                    }
                }
            }
            // form handlers catch validation before the store does, so this
            // only surfaces for requests bypassing the forms
            Self::Validation(err) => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()).into_response()
            }
            Self::Render(err) => {
                tracing::error!("Failed to render template: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
