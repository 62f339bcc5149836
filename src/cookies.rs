use std::{
  io::Write,
  path::{Path, PathBuf},
  str::FromStr,
};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::{Error, Result};

/// Domains for which caller-supplied cookies are handed to the extractor.
///
/// An entry `.facebook.com` (or `facebook.com`) matches `facebook.com` and
/// every subdomain of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieDomains(Vec<String>);

impl CookieDomains {
  pub fn new<I, S>(domains: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let domains = domains
      .into_iter()
      .map(|d| d.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
      .filter(|d| !d.is_empty())
      .collect();
    Self(domains)
  }

  pub fn matches(&self, page_url: &str) -> bool {
    let Ok(url) = url::Url::parse(page_url) else {
      return false;
    };
    let Some(host) = url.host_str() else {
      return false;
    };
    let host = host.to_ascii_lowercase();

    self.0.iter().any(|domain| {
      host == *domain
        || host
          .strip_suffix(domain.as_str())
          .is_some_and(|prefix| prefix.ends_with('.'))
    })
  }
}

impl Default for CookieDomains {
  fn default() -> Self {
    Self::new([".facebook.com"])
  }
}

impl FromStr for CookieDomains {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Ok(Self::new(s.split(',')))
  }
}

/// Cookie jar contents written to a private temporary file for the
/// duration of one extraction. The file is removed when this is dropped.
pub struct CookieFile {
  file: Option<NamedTempFile>,
}

impl CookieFile {
  pub fn create(contents: &str) -> Result<Self> {
    let mut file = tempfile::Builder::new()
      .prefix("cookies-")
      .suffix(".txt")
      .tempfile()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;

    debug!("wrote cookie file {}", file.path().display());
    Ok(Self { file: Some(file) })
  }

  pub fn path(&self) -> Option<&Path> {
    self.file.as_ref().map(NamedTempFile::path)
  }

  pub fn path_buf(&self) -> Option<PathBuf> {
    self.path().map(Path::to_path_buf)
  }
}

impl Drop for CookieFile {
  fn drop(&mut self) {
    let Some(file) = self.file.take() else {
      return;
    };

    let path = file.path().to_path_buf();
    match file.close() {
      Ok(()) => debug!("deleted cookie file {}", path.display()),
      Err(e) => {
        warn!("failed to delete cookie file {}: {}", path.display(), e)
      }
    }
  }
}
