use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

pub const PUBLISH_MIN_TAGS: usize = 3;
pub const PUBLISH_MAX_TAGS: usize = 7;

const EXCERPT_MAX_CHARS: usize = 160;
const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub author_id: i64,
    /// Snapshot of the author at creation time; never updated retroactively.
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub liked_by: BTreeSet<i64>,
    pub views: u64,
    pub published: bool,
}

impl Post {
    /// Like count is always the size of the liker set; there is no second
    /// counter field to drift out of sync.
    pub fn likes(&self) -> usize {
        self.liked_by.len()
    }

    pub fn read_time_minutes(&self) -> u32 {
        let words = strip_tags(&self.content).split_whitespace().count();
        (words.div_ceil(WORDS_PER_MINUTE)).max(1) as u32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub published: bool,
}

impl PostDraft {
    pub fn validate(self) -> Result<Self, DomainError> {
        let title = normalize_title(&self.title)?;
        let content = normalize_content(&self.content)?;
        let category = normalize_category(&self.category)?;
        let tags = normalize_tags(self.tags);
        if self.published {
            validate_publish_tags(&tags)?;
        }
        Ok(Self {
            title,
            content,
            excerpt: self.excerpt.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()),
            category,
            tags,
            image_url: self.image_url,
            published: self.published,
        })
    }
}

/// Partial post edit; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image_url: Option<String>,
}

impl PostPatch {
    pub fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: self.title.as_deref().map(normalize_title).transpose()?,
            content: self.content.as_deref().map(normalize_content).transpose()?,
            excerpt: self.excerpt.map(|e| e.trim().to_string()),
            category: self.category.as_deref().map(normalize_category).transpose()?,
            tags: self.tags.map(normalize_tags),
            image_url: self.image_url,
        })
    }
}

pub(crate) fn validate_publish_tags(tags: &[String]) -> Result<(), DomainError> {
    if tags.len() < PUBLISH_MIN_TAGS || tags.len() > PUBLISH_MAX_TAGS {
        return Err(DomainError::Validation {
            field: "tags",
            message: "published posts must carry 3..7 tags",
        });
    }
    Ok(())
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.len() > 255 {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 1..255 chars",
        });
    }
    Ok(title.to_string())
}

fn normalize_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::Validation {
            field: "content",
            message: "must not be empty",
        });
    }
    Ok(content.to_string())
}

fn normalize_category(category: &str) -> Result<String, DomainError> {
    let category = category.trim();
    if category.is_empty() || category.len() > 64 {
        return Err(DomainError::Validation {
            field: "category",
            message: "must be 1..64 chars",
        });
    }
    Ok(category.to_string())
}

pub(crate) fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(tag.to_lowercase()))
        .collect()
}

/// Lookup slug: lowercased title with non-alphanumeric runs collapsed to
/// single hyphens, plus a zero-padded numeric disambiguator. Collisions are
/// avoided by the disambiguator, never by failing the write.
pub(crate) fn slugify(title: &str, disambiguator: i64) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        return format!("post-{disambiguator:04}");
    }
    format!("{slug}-{disambiguator:04}")
}

/// Author-supplied excerpt wins; otherwise the first sentence-ish chunk of
/// the tag-stripped content.
pub(crate) fn derive_excerpt(content: &str, supplied: Option<String>) -> String {
    if let Some(excerpt) = supplied {
        return excerpt;
    }
    let text = strip_tags(content);
    let mut excerpt: String = text.chars().take(EXCERPT_MAX_CHARS).collect();
    if text.chars().count() > EXCERPT_MAX_CHARS {
        excerpt = excerpt.trim_end().to_string();
        excerpt.push('…');
    }
    excerpt
}

fn strip_tags(content: &str) -> String {
    let mut text = String::with_capacity(content.len());
    let mut in_tag = false;
    for ch in content.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
