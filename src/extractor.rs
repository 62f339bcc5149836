mod ytdlp;

use std::{collections::HashMap, path::PathBuf};

use async_trait::async_trait;

use crate::{format::InfoDict, Result};

pub use ytdlp::Ytdlp;

/// Everything the extraction engine needs to resolve one page.
#[derive(Debug, Clone, Default)]
pub struct ExtractJob {
  pub url: String,
  pub headers: HashMap<String, String>,
  pub cookie_file: Option<PathBuf>,
}

#[async_trait]
pub trait Extractor: Send + Sync {
  async fn extract(&self, job: &ExtractJob) -> Result<InfoDict>;
}
