// Helpers shared by the public and admin handlers

use serde::{Deserialize, Deserializer};

use crate::error::{AppError, Result};

/// Shortens an origin address to its first two dotted segments.
///
/// IPv4-mapped IPv6 addresses are unwrapped first and the loopback `::1` is
/// shown as `127.0`. Anything without dots becomes `?.?.?.?`.
pub fn mask_address(ip: &str) -> String {
    if ip.is_empty() {
        return "(?.?.?.?)".to_string();
    }

    let ip = match ip {
        "::1" => "127.0.0.1",
        other => other.strip_prefix("::ffff:").unwrap_or(other),
    };

    let mut parts = ip.split('.');
    match (parts.next(), parts.next()) {
        (Some(first), Some(second)) => format!("{first}.{second}"),
        _ => "?.?.?.?".to_string(),
    }
}

/// An id that clients may send either as a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdInput {
    Number(i64),
    Text(String),
}

impl IdInput {
    /// Returns the id if it is a positive integer.
    pub fn positive(&self) -> Option<i64> {
        let id = match self {
            IdInput::Number(n) => *n,
            IdInput::Text(s) => s.trim().parse().ok()?,
        };
        (id >= 1).then_some(id)
    }
}

/// Deserializes `null`, `""` and absent fields alike as `None`.
pub fn empty_id_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<IdInput>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<IdInput>::deserialize(deserializer)?;
    Ok(match value {
        Some(IdInput::Text(s)) if s.trim().is_empty() => None,
        Some(IdInput::Number(0)) => None,
        other => other,
    })
}

/// Reads `page`/`limit` style counts leniently: leading digits are used and
/// anything else, zero included, counts as absent so the default applies.
pub fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(leading_count))
}

fn leading_count(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let end = raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len());
    raw[..end].parse::<u32>().ok().filter(|n| *n > 0)
}

/// Query flag that is on for `true` or `1`, off for anything else.
pub fn lenient_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(matches!(
        raw.as_deref().map(str::trim),
        Some(v) if v == "1" || v.eq_ignore_ascii_case("true")
    ))
}

/// Parses a positive integer id out of a path segment.
pub fn parse_id(raw: &str, what: &str) -> Result<i64> {
    IdInput::Text(raw.to_string())
        .positive()
        .ok_or_else(|| AppError::BadRequest(format!("Invalid {what} ID")))
}

/// Normalised page/limit pair shared by the listing endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: u32,
    pub limit: u32,
}

impl Paging {
    pub fn new(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, 100),
        }
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }
}
