//! Post sources: scraper exports (JSON) and manual paste (one post per line)

use mindscan_core::{Error, RawPost, Result};
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

/// Load posts from a file
///
/// `.json` files must hold an array of `{text, date?, id?}` objects; any other
/// file is read as pasted text with one post per non-blank line. Scalar fields
/// are coerced to strings, and items that are not objects or carry a
/// structured `text` are skipped.
pub fn load_posts(path: impl AsRef<Path>) -> Result<Vec<RawPost>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::collaborator(format!("Failed to read posts {}: {}", path.display(), e))
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let posts = if is_json {
        parse_json(&content)
            .map_err(|e| Error::config(format!("Malformed posts file {}: {}", path.display(), e)))?
    } else {
        parse_pasted(&content)
    };

    info!(path = %path.display(), posts = posts.len(), "Posts loaded");
    Ok(posts)
}

/// Parse a scraper export, converting each item on its own
pub fn parse_json(content: &str) -> Result<Vec<RawPost>> {
    let items: Vec<Value> = serde_json::from_str(content)?;

    let mut posts = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match post_from_value(item) {
            Some(post) => posts.push(post),
            None => warn!(index, "Unusable post in export, skipping"),
        }
    }
    Ok(posts)
}

fn post_from_value(item: &Value) -> Option<RawPost> {
    let fields = item.as_object()?;

    let text = match fields.get("text") {
        None | Some(Value::Null) => None,
        Some(value) => Some(scalar_to_string(value)?),
    };

    Some(RawPost {
        text,
        date: fields.get("date").and_then(scalar_to_string),
        id: fields.get("id").and_then(scalar_to_string),
    })
}

/// String form of a JSON scalar; `None` for null, arrays and objects
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Split pasted text into posts, one per non-blank line
pub fn parse_pasted(text: &str) -> Vec<RawPost> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(RawPost::new)
        .collect()
}
