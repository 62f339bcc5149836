use std::{net::SocketAddr, str::FromStr};

use crate::{
  cookies::CookieDomains,
  quality::QualityMode,
  selection::{MergePolicy, SelectionPolicy},
  Error, Result,
};

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct Config {
  pub listen_addr: SocketAddr,
  pub policy: SelectionPolicy,
  pub cookie_domains: CookieDomains,
  pub ytdlp_path: String,
  pub ytdlp_concurrency: usize,
  pub ytdlp_proxy: Option<String>,
}

impl Config {
  pub fn from_env() -> Result<Self> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let listen_addr =
      var("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.into());
    let listen_addr = parse::<SocketAddr>(&listen_addr)
      .map_err(|e| Error::Config(format!("LISTEN_ADDR: {e}")))?;

    let quality_mode = match var("QUALITY_MODE") {
      Some(s) => s.parse::<QualityMode>()?,
      None => QualityMode::default(),
    };

    let merge = match var("MERGE_POLICY") {
      Some(s) => s.parse::<MergePolicy>()?,
      None => MergePolicy::default(),
    };

    let cookie_domains = match var("COOKIE_DOMAINS") {
      Some(s) => s.parse::<CookieDomains>()?,
      None => CookieDomains::default(),
    };

    let ytdlp_concurrency = match var("YTDLP_CONCURRENCY") {
      Some(s) => parse::<usize>(&s)
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| {
          Error::Config(format!("YTDLP_CONCURRENCY: invalid value {s:?}"))
        })?,
      None => std::thread::available_parallelism()
        .map(usize::from)
        .unwrap_or(4),
    };

    Ok(Self {
      listen_addr,
      policy: SelectionPolicy {
        quality_mode,
        merge,
      },
      cookie_domains,
      ytdlp_path: var("YTDLP_PATH").unwrap_or_else(|| "yt-dlp".into()),
      ytdlp_concurrency,
      ytdlp_proxy: var("YTDLP_PROXY"),
    })
  }
}

fn parse<T: FromStr>(s: &str) -> std::result::Result<T, T::Err> {
  s.trim().parse()
}
