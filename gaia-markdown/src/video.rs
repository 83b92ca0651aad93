//! Bare video links → responsive iframes.
//!
//! Only YouTube and Vimeo are recognised, and only when the extracted ID
//! passes a strict allow-list pattern. Anything else is left as text.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

static BARE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)(^|\s)(https?://\S+)").expect("invalid bare url regex"));
static YOUTUBE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https?://(?:www\.|m\.)?(?:youtube\.com/watch\?v=([^&#\s]+)(?:[&#]\S*)?|youtu\.be/([^?#\s]+)(?:[?#]\S*)?)$",
    )
    .expect("invalid youtube regex")
});
static VIMEO_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(?:www\.)?vimeo\.com/([^?#\s]+)(?:[?#]\S*)?$")
        .expect("invalid vimeo regex")
});

/// A validated embeddable video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", content = "id", rename_all = "lowercase")]
pub enum VideoEmbed {
    YouTube(String),
    Vimeo(String),
}

impl VideoEmbed {
    pub fn embed_url(&self) -> String {
        match self {
            VideoEmbed::YouTube(id) => format!("https://www.youtube.com/embed/{id}"),
            VideoEmbed::Vimeo(id) => format!("https://player.vimeo.com/video/{id}"),
        }
    }

    pub fn to_html(&self) -> String {
        format!(
            "<div class=\"gaia-video\" style=\"position: relative; padding-bottom: 56.25%; height: 0; overflow: hidden;\">\
<iframe src=\"{}\" width=\"560\" height=\"315\" loading=\"lazy\" \
style=\"position: absolute; top: 0; left: 0; width: 100%; height: 100%; border: 0;\" \
allow=\"accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture\" \
allowfullscreen></iframe></div>",
            self.embed_url()
        )
    }
}

/// YouTube IDs are exactly 11 characters of `[A-Za-z0-9_-]`.
pub fn is_valid_youtube_id(id: &str) -> bool {
    id.len() == 11
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Vimeo IDs are 1 to 10 ASCII digits.
pub fn is_valid_vimeo_id(id: &str) -> bool {
    (1..=10).contains(&id.len()) && id.bytes().all(|b| b.is_ascii_digit())
}

/// Classify a URL.
///
/// Returns `None` when it is not shaped like a YouTube/Vimeo link,
/// `Some(Err(candidate))` when it is but the ID fails validation.
pub fn inspect_video_url(url: &str) -> Option<Result<VideoEmbed, String>> {
    if let Some(caps) = YOUTUBE_URL.captures(url) {
        let id = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map_or("", |m| m.as_str());
        return Some(if is_valid_youtube_id(id) {
            Ok(VideoEmbed::YouTube(id.to_string()))
        } else {
            Err(id.to_string())
        });
    }
    if let Some(caps) = VIMEO_URL.captures(url) {
        let id = &caps[1];
        return Some(if is_valid_vimeo_id(id) {
            Ok(VideoEmbed::Vimeo(id.to_string()))
        } else {
            Err(id.to_string())
        });
    }
    None
}

/// Parse a URL into a validated embed, if it is one.
pub fn parse_video_url(url: &str) -> Option<VideoEmbed> {
    inspect_video_url(url).and_then(Result::ok)
}

/// Every whitespace-delimited `http(s)` URL with its 1-based line number.
pub fn bare_urls(input: &str) -> Vec<(usize, String)> {
    BARE_URL
        .captures_iter(input)
        .filter_map(|caps| {
            let url = caps.get(2)?;
            let line = input[..url.start()].matches('\n').count() + 1;
            Some((line, url.as_str().to_string()))
        })
        .collect()
}

/// Pipeline step 4: embed bare, valid video links.
pub(crate) fn embed_videos(input: &str) -> String {
    BARE_URL
        .replace_all(input, |caps: &Captures| match inspect_video_url(&caps[2]) {
            Some(Ok(video)) => format!("{}{}", &caps[1], video.to_html()),
            Some(Err(id)) => {
                tracing::warn!(id = %id, "rejected video link with invalid id");
                caps[0].to_string()
            }
            None => caps[0].to_string(),
        })
        .into_owned()
}
