use std::{fmt, str::FromStr};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::{format::FormatDescriptor, Error};

/// Label a result is bucketed under, e.g. `720p`, or `direct`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct QualityLabel(String);

impl QualityLabel {
  pub fn direct() -> Self {
    Self("direct".to_owned())
  }

  pub fn from_height(height: i64) -> Self {
    Self(format!("{height}p"))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// The number embedded in labels like `1080p`, if any.
  pub fn magnitude(&self) -> Option<u32> {
    static MAGNITUDE_REGEX: Lazy<Regex> =
      Lazy::new(|| Regex::new(r"(\d{3,4})p").unwrap());

    MAGNITUDE_REGEX
      .captures(self.as_str())
      .and_then(|caps| caps[1].parse().ok())
  }
}

impl fmt::Display for QualityLabel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl From<&str> for QualityLabel {
  fn from(s: &str) -> Self {
    Self(s.to_owned())
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QualityMode {
  /// literal observed height, `713` becomes `713p`
  #[default]
  HeightBucket,
  /// nearest standard tier at or below the observed size
  ResolutionTier,
}

impl FromStr for QualityMode {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "height" | "height_bucket" => Ok(QualityMode::HeightBucket),
      "resolution" | "resolution_tier" => Ok(QualityMode::ResolutionTier),
      other => Err(Error::Config(format!("unknown quality mode: {other}"))),
    }
  }
}

// (minimum width, minimum height, tier), checked top-down
const TIERS: [(i64, i64, i64); 5] = [
  (1920, 1080, 1080),
  (1280, 720, 720),
  (854, 480, 480),
  (640, 360, 360),
  (426, 240, 240),
];
const LOWEST_TIER: i64 = 144;

impl QualityMode {
  pub fn classify(self, format: &FormatDescriptor) -> Option<QualityLabel> {
    match self {
      QualityMode::HeightBucket => format
        .height
        .filter(|h| *h > 0)
        .map(QualityLabel::from_height),
      QualityMode::ResolutionTier => {
        let tier = match format.dimensions() {
          (Some(width), _) => tier_for(width, |(w, _, _)| w),
          (None, Some(height)) => tier_for(height, |(_, h, _)| h),
          (None, None) => return None,
        };
        Some(QualityLabel::from_height(tier))
      }
    }
  }
}

fn tier_for(size: i64, threshold: impl Fn((i64, i64, i64)) -> i64) -> i64 {
  TIERS
    .iter()
    .find(|t| size >= threshold(**t))
    .map(|(_, _, tier)| *tier)
    .unwrap_or(LOWEST_TIER)
}

/// Labels with a magnitude come first, largest first; the rest keep their
/// relative order after them.
pub fn sort_key(label: &QualityLabel) -> (u8, i64) {
  match label.magnitude() {
    Some(n) => (0, -i64::from(n)),
    None => (1, 0),
  }
}

/// Stable sort, highest quality first.
pub fn sort_items<T>(items: &mut [T], label: impl Fn(&T) -> &QualityLabel) {
  items.sort_by_key(|item| sort_key(label(item)));
}
