//! Pure text heuristics for turning mention text into artifact fields.
//!
//! Four ordered rules, first match wins. Rule 3's joiner behavior (fragments
//! keep their leading whitespace, the joiner supplies `". "`) is pinned by
//! test — see `sentence_split_fallback`.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use mintloom_common::{MediaKind, Mention, MintError};

static RE_TAG_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)#title\s+([^\n#]+)").unwrap());
static RE_TAG_DESC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)#description\s+([^\n#]+)").unwrap());
static RE_LABELED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)title:\s*([^|]+)\|\s*description:\s*(.+)").unwrap());

/// Longest title produced by the whole-text fallback before truncation.
const MAX_FALLBACK_TITLE: usize = 50;

/// Extracted artifact fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub title: String,
    pub description: String,
}

/// Mention text parser bound to the platform handle it must strip.
pub struct MentionParser {
    handle_re: Regex,
}

impl MentionParser {
    pub fn new(handle: &str) -> Self {
        // The handle is escaped, so the pattern always compiles.
        let handle_re = Regex::new(&format!(r"(?i)@{}", regex::escape(handle))).unwrap();
        Self { handle_re }
    }

    /// Strip every `@handle` token (case-insensitive) and trim.
    pub fn clean(&self, raw: &str) -> String {
        self.handle_re.replace_all(raw, "").trim().to_string()
    }

    /// Extract title and description. Deterministic and side-effect-free.
    ///
    /// Rules, in order:
    /// 1. `#title <text>` + `#description <text>` tags (both required)
    /// 2. `Title: <text> | Description: <text>` labels
    /// 3. sentence split on `.` `!` `?` when it yields ≥2 fragments
    /// 4. whole text, title truncated to 50 chars
    pub fn parse(&self, raw: &str) -> Result<Parsed, MintError> {
        let clean = self.clean(raw);
        if clean.is_empty() {
            return Err(MintError::Parse(
                "mention text is empty after cleaning".to_string(),
            ));
        }

        if let (Some(title), Some(desc)) =
            (RE_TAG_TITLE.captures(&clean), RE_TAG_DESC.captures(&clean))
        {
            return Ok(Parsed {
                title: title[1].trim().to_string(),
                description: desc[1].trim().to_string(),
            });
        }

        if let Some(caps) = RE_LABELED.captures(&clean) {
            return Ok(Parsed {
                title: caps[1].trim().to_string(),
                description: caps[2].trim().to_string(),
            });
        }

        // Fragments keep their surrounding whitespace here; only the final
        // title/description are trimmed. The pinned joiner is `". "`.
        let fragments: Vec<&str> = clean
            .split(['.', '!', '?'])
            .filter(|s| !s.trim().is_empty())
            .collect();
        if fragments.len() >= 2 {
            return Ok(Parsed {
                title: fragments[0].trim().to_string(),
                description: fragments[1..].join(". ").trim().to_string(),
            });
        }

        let title = if clean.chars().count() > MAX_FALLBACK_TITLE {
            let head: String = clean.chars().take(MAX_FALLBACK_TITLE).collect();
            format!("{head}...")
        } else {
            clean.clone()
        };
        Ok(Parsed {
            title,
            description: clean,
        })
    }
}

/// Pick the image for a mention, or `None` if it has no usable one.
///
/// Attached photo media wins over linked URLs; a linked URL counts only if
/// its path (not query) ends in an image suffix. Mentions without an image
/// are skipped by the pipeline — an artifact without an image is never
/// created.
pub fn resolve_image(mention: &Mention) -> Option<String> {
    if let Some(photo) = mention.media.iter().find(|m| m.kind == MediaKind::Photo) {
        if let Some(url) = photo.url.clone().or_else(|| photo.preview_url.clone()) {
            return Some(url);
        }
    }

    mention
        .linked_urls
        .iter()
        .find(|raw| has_image_suffix(raw))
        .cloned()
}

fn has_image_suffix(raw: &str) -> bool {
    let Ok(url) = Url::parse(raw) else {
        return false;
    };
    let path = url.path().to_ascii_lowercase();
    path.ends_with(".jpg") || path.ends_with(".jpeg") || path.ends_with(".png")
}
