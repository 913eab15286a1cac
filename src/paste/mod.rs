//! Clipboard content to editor content.

mod dom;

pub(crate) use dom::handle_paste;

use std::sync::LazyLock;

use base64ct::{Base64, Encoding};
use regex::Regex;

static VIDEO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/)([\w-]+)").expect("video url regex")
});

static IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://\S+\.(?:png|jpg|jpeg|gif)").expect("image url regex")
});

const VIDEO_EMBED_URL: &str = "https://www.youtube-nocookie.com/embed/";

/// What a paste turns into. First match wins, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Paste {
    /// Index of the first `image/*` clipboard item.
    Image(usize),
    Video(String),
    ImageUrl(String),
    Text(String),
}

pub(crate) fn classify(item_types: &[String], text: &str) -> Paste {
    if let Some(index) = item_types.iter().position(|t| t.starts_with("image/")) {
        return Paste::Image(index);
    }
    if let Some(id) = VIDEO_URL.captures(text).and_then(|c| c.get(1)) {
        return Paste::Video(id.as_str().to_string());
    }
    if let Some(url) = IMAGE_URL.find(text) {
        return Paste::ImageUrl(url.as_str().to_string());
    }
    Paste::Text(text.to_string())
}

pub(crate) fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub(crate) fn image_markup(src: &str) -> String {
    format!(r#"<img src="{}">"#, escape_attr(src))
}

pub(crate) fn video_markup(id: &str) -> String {
    let src = format!("{VIDEO_EMBED_URL}{id}?modestbranding=1&rel=0&playsinline=1");
    format!(
        r#"<div class="video"><iframe src="{}" frameborder="0" allowfullscreen></iframe></div>"#,
        escape_attr(&src)
    )
}

pub(crate) fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", Base64::encode_string(bytes))
}

impl Paste {
    /// Markup to insert; `None` for plain text, which is inserted as text.
    pub fn markup(&self) -> Option<String> {
        match self {
            Paste::Video(id) => Some(video_markup(id)),
            Paste::ImageUrl(url) => Some(image_markup(url)),
            Paste::Image(_) | Paste::Text(_) => None,
        }
    }
}
