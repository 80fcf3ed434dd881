use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::constants::DEFAULT_SLUG;

static NON_SLUG_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^0-9A-Za-z_\x{00C0}-\x{024F}\x{4E00}-\x{9FFF}]+").expect("valid slug pattern")
});

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

const HASH_HEX_DIGITS: usize = 6;

/// Upper bound on the name part of a slug, leaving room for the hash, a
/// registry suffix and `.html` within a 255-byte file name
pub const MAX_NAME_BYTES: usize = 200;

/// How a clinic slug is derived. One strategy applies to a whole dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlugStrategy {
    /// Percent-encoded name plus a short hash of name and address
    #[default]
    Hashed,
    /// Readable lowercase name with punctuation collapsed to hyphens
    Slugify,
}

impl SlugStrategy {
    pub fn derive(&self, name: &str, address: &str) -> String {
        match self {
            SlugStrategy::Hashed => hashed_slug(name, address),
            SlugStrategy::Slugify => slugify(name),
        }
    }
}

impl FromStr for SlugStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hashed" => Ok(SlugStrategy::Hashed),
            "slugify" => Ok(SlugStrategy::Slugify),
            other => Err(format!("unknown slug strategy '{}' (expected hashed or slugify)", other)),
        }
    }
}

impl fmt::Display for SlugStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlugStrategy::Hashed => write!(f, "hashed"),
            SlugStrategy::Slugify => write!(f, "slugify"),
        }
    }
}

/// Lowercase the name and collapse everything but word characters, Latin letters and
/// CJK ideographs into single hyphens
pub fn slugify(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let slug = NON_SLUG_CHARS.replace_all(&lowered, "-");
    let slug = truncate_to_boundary(slug.trim_matches('-'), MAX_NAME_BYTES).trim_end_matches('-');
    if slug.is_empty() {
        DEFAULT_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// `<encoded name>-<6 hex digits>` where the digits come from the name and address
pub fn hashed_slug(name: &str, address: &str) -> String {
    let base = format!("{}-{}", name, address).trim().to_lowercase();
    let digest = format!("{:x}", i64::from(polynomial_hash(&base)).abs());
    let digest: String = digest.chars().take(HASH_HEX_DIGITS).collect();

    let readable = WHITESPACE_RUN.replace_all(name.trim(), "-");
    let encoded = encode_bounded(&readable, MAX_NAME_BYTES);
    if encoded.is_empty() {
        format!("{}-{}", DEFAULT_SLUG, digest)
    } else {
        format!("{}-{}", encoded, digest)
    }
}

/// 32-bit wrapping `h * 31 + unit` over UTF-16 code units
pub fn polynomial_hash(text: &str) -> i32 {
    text.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Percent-encode the way `encodeURIComponent` does: unreserved characters and
/// `! ' ( ) *` pass through, every other byte becomes `%XX`
pub fn encode_component(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'~'
            | b'!'
            | b'\''
            | b'('
            | b')'
            | b'*' => out.push(byte as char),
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}

/// Encode whole characters until the next one would push past `limit` bytes
fn encode_bounded(text: &str, limit: usize) -> String {
    let mut out = String::new();
    let mut buf = [0u8; 4];
    for ch in text.chars() {
        let piece = encode_component(ch.encode_utf8(&mut buf));
        if out.len() + piece.len() > limit {
            break;
        }
        out.push_str(&piece);
    }
    out
}

fn truncate_to_boundary(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Hands out dataset-unique slugs, suffixing repeats with `-2`, `-3`, ...
#[derive(Debug, Default)]
pub struct SlugRegistry {
    taken: HashSet<String>,
}

impl SlugRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, slug: String) -> String {
        if self.taken.insert(slug.clone()) {
            return slug;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}-{}", slug, n);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.taken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }
}
