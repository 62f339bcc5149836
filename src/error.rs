use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("{0}")]
  Validation(String),
  #[error("{0}")]
  Extraction(String),
  #[error("failed to extract formats")]
  NoUsableFormat,
  #[error("io error: {0}")]
  IO(#[from] std::io::Error),
  #[error("invalid extractor output: {0}")]
  Json(#[from] serde_json::Error),
  #[error("extraction task failed: {0}")]
  Task(#[from] tokio::task::JoinError),
  #[error("invalid configuration: {0}")]
  Config(String),
  #[error("server error: {0}")]
  Server(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  pub fn validation(msg: impl Into<String>) -> Self {
    Error::Validation(msg.into())
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Error::Validation(_) => StatusCode::BAD_REQUEST,
      Error::NoUsableFormat => StatusCode::UNPROCESSABLE_ENTITY,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = json!({ "ok": false, "error": self.to_string() });
    (status, Json(body)).into_response()
  }
}
