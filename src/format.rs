use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Output of the extraction engine for a single page. Only the format list
/// is consumed.
#[derive(Debug, Default, Deserialize)]
pub struct InfoDict {
  #[serde(default, deserialize_with = "lenient_formats")]
  pub formats: Vec<FormatDescriptor>,
}

/// One candidate stream as reported by the extraction engine.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FormatDescriptor {
  #[serde(default, deserialize_with = "lenient_string")]
  pub url: Option<String>,
  #[serde(default, rename = "vcodec", deserialize_with = "lenient_string")]
  pub video_codec: Option<String>,
  #[serde(default, rename = "acodec", deserialize_with = "lenient_string")]
  pub audio_codec: Option<String>,
  #[serde(default, rename = "ext", deserialize_with = "lenient_string")]
  pub extension: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub protocol: Option<String>,
  #[serde(default, deserialize_with = "lenient_int")]
  pub height: Option<i64>,
  #[serde(default, deserialize_with = "lenient_int")]
  pub width: Option<i64>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub resolution: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
  /// carries both audio and video
  SelfContained,
  /// HLS or DASH playlist
  Manifest,
  /// video track only
  Fallback,
}

impl FormatDescriptor {
  /// Classifies the descriptor, or returns `None` when it can never be
  /// selected (no url, or explicitly no video track).
  pub fn stream_kind(&self) -> Option<StreamKind> {
    self.url.as_deref().filter(|url| !url.is_empty())?;

    if self.video_codec.as_deref() == Some("none") {
      return None;
    }

    if has_track(&self.video_codec) && has_track(&self.audio_codec) {
      return Some(StreamKind::SelfContained);
    }

    if self.is_manifest() {
      return Some(StreamKind::Manifest);
    }

    Some(StreamKind::Fallback)
  }

  fn is_manifest(&self) -> bool {
    let ext = lowercase(&self.extension);
    if ext == "m3u8" || ext == "mpd" {
      return true;
    }

    let protocol = lowercase(&self.protocol);
    if protocol.contains("m3u8") || protocol.contains("dash") {
      return true;
    }

    // last resort for manifests reported without metadata
    lowercase(&self.url).contains(".m3u8")
  }

  /// Width and height in pixels. Explicit dimensions take precedence over
  /// the `WxH` resolution string; non-positive values count as unknown.
  pub fn dimensions(&self) -> (Option<i64>, Option<i64>) {
    let (parsed_width, parsed_height) = self
      .resolution
      .as_deref()
      .and_then(parse_resolution)
      .unzip();

    let width = positive(self.width).or(parsed_width);
    let height = positive(self.height).or(parsed_height);
    (width, height)
  }
}

fn has_track(codec: &Option<String>) -> bool {
  matches!(codec.as_deref(), Some(c) if !c.is_empty() && c != "none")
}

fn lowercase(field: &Option<String>) -> String {
  field.as_deref().unwrap_or_default().to_ascii_lowercase()
}

fn positive(n: Option<i64>) -> Option<i64> {
  n.filter(|n| *n > 0)
}

fn parse_resolution(s: &str) -> Option<(i64, i64)> {
  let (w, h) = s.trim().split_once(['x', 'X'])?;
  let w = positive(w.trim().parse().ok())?;
  let h = positive(h.trim().parse().ok())?;
  Some((w, h))
}

// The engine output is loosely typed. A malformed entry or field must not
// fail the whole page, so these treat anything unexpected as absent.

fn lenient_formats<'de, D>(de: D) -> Result<Vec<FormatDescriptor>, D::Error>
where
  D: Deserializer<'de>,
{
  let Value::Array(entries) = Value::deserialize(de)? else {
    return Ok(Vec::new());
  };
  let formats = entries
    .into_iter()
    .filter(Value::is_object)
    .filter_map(|entry| serde_json::from_value(entry).ok())
    .collect();
  Ok(formats)
}

fn lenient_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  match Value::deserialize(de)? {
    Value::String(s) => Ok(Some(s)),
    _ => Ok(None),
  }
}

fn lenient_int<'de, D>(de: D) -> Result<Option<i64>, D::Error>
where
  D: Deserializer<'de>,
{
  match Value::deserialize(de)? {
    Value::Number(n) => Ok(n.as_i64()),
    _ => Ok(None),
  }
}
