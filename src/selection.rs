use std::{collections::HashMap, str::FromStr};

use serde::Serialize;
use tracing::debug;

use crate::{
  format::{FormatDescriptor, StreamKind},
  quality::{sort_items, QualityLabel, QualityMode},
  Error,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
  /// Resolve each quality independently: self-contained, then manifest,
  /// then video-only.
  #[default]
  PerQuality,
  /// Drop every video-only quality as soon as any self-contained or
  /// manifest candidate exists in the catalog.
  Strict,
}

impl FromStr for MergePolicy {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "merge" | "per_quality" => Ok(MergePolicy::PerQuality),
      "strict" | "filter" => Ok(MergePolicy::Strict),
      other => Err(Error::Config(format!("unknown merge policy: {other}"))),
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionPolicy {
  pub quality_mode: QualityMode,
  pub merge: MergePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickItem {
  pub quality: QualityLabel,
  pub url: String,
}

// first url seen for one quality, per stream kind
#[derive(Debug, Default)]
struct Tiers {
  self_contained: Option<String>,
  manifest: Option<String>,
  fallback: Option<String>,
}

impl Tiers {
  fn slot(&mut self, kind: StreamKind) -> &mut Option<String> {
    match kind {
      StreamKind::SelfContained => &mut self.self_contained,
      StreamKind::Manifest => &mut self.manifest,
      StreamKind::Fallback => &mut self.fallback,
    }
  }

  fn has_preferred(&self) -> bool {
    self.self_contained.is_some() || self.manifest.is_some()
  }

  fn resolve(self, merge: MergePolicy, any_preferred: bool) -> Option<String> {
    let preferred = self.self_contained.or(self.manifest);
    match merge {
      MergePolicy::Strict if any_preferred => preferred,
      _ => preferred.or(self.fallback),
    }
  }
}

/// Picks one url per quality from the catalog, highest quality first.
pub fn select(
  formats: &[FormatDescriptor],
  policy: SelectionPolicy,
) -> Vec<PickItem> {
  let mut order: Vec<QualityLabel> = Vec::new();
  let mut by_quality: HashMap<QualityLabel, Tiers> = HashMap::new();

  for format in formats {
    let Some(kind) = format.stream_kind() else {
      continue;
    };
    let Some(quality) = policy.quality_mode.classify(format) else {
      continue;
    };
    let Some(url) = format.url.as_deref() else {
      continue;
    };

    let tiers = by_quality.entry(quality.clone()).or_insert_with(|| {
      order.push(quality);
      Tiers::default()
    });
    tiers.slot(kind).get_or_insert_with(|| url.to_owned());
  }

  let any_preferred = by_quality.values().any(Tiers::has_preferred);

  let mut items: Vec<PickItem> = order
    .into_iter()
    .filter_map(|quality| {
      let tiers = by_quality.remove(&quality)?;
      let url = tiers.resolve(policy.merge, any_preferred)?;
      Some(PickItem { quality, url })
    })
    .collect();

  sort_items(&mut items, |item| &item.quality);

  debug!(
    candidates = formats.len(),
    selected = items.len(),
    "selected formats"
  );

  items
}

/// Whether the url path itself names a media file or manifest.
pub fn is_direct_media(page_url: &str) -> bool {
  let path = match url::Url::parse(page_url) {
    Ok(url) => url.path().to_ascii_lowercase(),
    Err(_) => return false,
  };

  [".mp4", ".m3u8", ".mpd"]
    .iter()
    .any(|ext| path.ends_with(ext))
}

/// Like [`select`], falling back to the page url itself when nothing was
/// selectable and it points at media directly.
pub fn select_or_direct(
  page_url: &str,
  formats: &[FormatDescriptor],
  policy: SelectionPolicy,
) -> Vec<PickItem> {
  let items = select(formats, policy);
  if items.is_empty() && is_direct_media(page_url) {
    return vec![PickItem {
      quality: QualityLabel::direct(),
      url: page_url.to_owned(),
    }];
  }
  items
}
