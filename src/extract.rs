use std::{collections::HashMap, sync::Arc};

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::{
  cookies::{CookieDomains, CookieFile},
  extractor::{ExtractJob, Extractor},
  selection::{select_or_direct, PickItem, SelectionPolicy},
  Error, Result,
};

#[derive(Clone)]
pub struct AppState {
  extractor: Arc<dyn Extractor>,
  policy: SelectionPolicy,
  cookie_domains: Arc<CookieDomains>,
}

impl AppState {
  pub fn new(
    extractor: Arc<dyn Extractor>,
    policy: SelectionPolicy,
    cookie_domains: CookieDomains,
  ) -> Self {
    Self {
      extractor,
      policy,
      cookie_domains: Arc::new(cookie_domains),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractRequest {
  pub app_name: String,
  pub name: String,
  pub url: String,
  pub headers: HashMap<String, String>,
  pub cookies: Option<String>,
}

impl ExtractRequest {
  pub fn from_payload(payload: Value) -> Result<Self> {
    let Value::Object(mut payload) = payload else {
      return Err(Error::validation("request body must be a JSON object"));
    };

    let app_name = required_str(&payload, "app_name")
      .ok_or_else(|| Error::validation("app_name is required"))?;
    let name = required_str(&payload, "name")
      .ok_or_else(|| Error::validation("name is required"))?;
    let url = required_str(&payload, "url")
      .filter(|url| url.starts_with("http://") || url.starts_with("https://"))
      .ok_or_else(|| {
        Error::validation("url is required and must start with http/https")
      })?;

    let headers = match payload.remove("headers") {
      None | Some(Value::Null) => HashMap::new(),
      Some(Value::Object(headers)) => headers
        .into_iter()
        .map(|(key, value)| match value {
          Value::String(value) => Ok((key, value)),
          _ => Err(Error::validation("header values must be strings")),
        })
        .collect::<Result<_>>()?,
      Some(_) => return Err(Error::validation("headers must be an object")),
    };

    let cookies = match payload.remove("cookies") {
      None | Some(Value::Null) => None,
      Some(Value::String(cookies)) => Some(cookies),
      Some(_) => return Err(Error::validation("cookies must be a string")),
    };

    Ok(Self {
      app_name,
      name,
      url,
      headers,
      cookies,
    })
  }
}

fn required_str(payload: &Map<String, Value>, key: &str) -> Option<String> {
  payload
    .get(key)
    .and_then(Value::as_str)
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
}

#[derive(Debug, Serialize)]
pub struct ExtractItem {
  #[serde(flatten)]
  item: PickItem,
  name: String,
}

pub async fn extract(
  State(state): State<AppState>,
  payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Vec<ExtractItem>>> {
  let Json(payload) =
    payload.map_err(|rejection| Error::validation(rejection.body_text()))?;
  let req = ExtractRequest::from_payload(payload)?;

  let items = resolve(&state, &req).await.map_err(|e| {
    warn!(app = %req.app_name, url = %req.url, "extraction failed: {}", e);
    e
  })?;

  info!(
    app = %req.app_name,
    url = %req.url,
    qualities = items.len(),
    "extracted"
  );

  let items = items
    .into_iter()
    .map(|item| ExtractItem {
      item,
      name: req.name.clone(),
    })
    .collect();

  Ok(Json(items))
}

async fn resolve(
  state: &AppState,
  req: &ExtractRequest,
) -> Result<Vec<PickItem>> {
  let cookie_file = match req.cookies.as_deref() {
    Some(cookies)
      if !cookies.trim().is_empty() && state.cookie_domains.matches(&req.url) =>
    {
      Some(CookieFile::create(cookies)?)
    }
    _ => None,
  };

  let job = ExtractJob {
    url: req.url.clone(),
    headers: req.headers.clone(),
    cookie_file: cookie_file.as_ref().and_then(CookieFile::path_buf),
  };

  // the task owns the cookie file, so it is released once extraction ends
  // even if this request is abandoned
  let extractor = state.extractor.clone();
  let info = tokio::spawn(async move {
    let info = extractor.extract(&job).await;
    drop(cookie_file);
    info
  })
  .await??;

  let items = select_or_direct(&req.url, &info.formats, state.policy);
  if items.is_empty() {
    return Err(Error::NoUsableFormat);
  }

  Ok(items)
}
