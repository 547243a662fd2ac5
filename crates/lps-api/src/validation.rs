use std::{collections::HashSet, sync::LazyLock};

use lps_core::{ItemType, review::DEFAULT_PAGE_SIZE};
use regex::Regex;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;

/// Most ids a client may exclude in one `next` call
const MAX_EXCLUDED_IDS: usize = 500;

static SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]{0,127}$").expect("slug pattern is valid"));

/// Parse a practice domain from a path segment.
///
/// # Examples
/// ```
/// use lps_api::validation::parse_domain;
/// use lps_core::ItemType;
///
/// assert_eq!(parse_domain("word").unwrap(), ItemType::Word);
/// assert!(parse_domain("grammar").is_err());
/// ```
pub fn parse_domain(domain: &str) -> Result<ItemType, ApiError> {
    domain.parse().map_err(|_| {
        ApiError::Validation(format!(
            "Invalid domain: '{domain}'. Must be one of 'word', 'sentence', 'shadowing'"
        ))
    })
}

/// Offset pagination as it arrives in a query string
#[derive(Debug, Clone, Copy, Default, Deserialize, Validate)]
pub struct PageParams {
    pub offset: Option<u64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
}

impl PageParams {
    /// Validated `(offset, limit)` with defaults applied
    pub fn resolve(&self) -> Result<(u64, u32), ApiError> {
        self.validate()
            .map_err(|e| ApiError::Validation(e.to_string()))?;
        Ok((self.offset.unwrap_or(0), self.limit.unwrap_or(DEFAULT_PAGE_SIZE)))
    }
}

/// Parse a comma separated list of item ids.
pub fn parse_exclude(raw: Option<&str>) -> Result<HashSet<Uuid>, ApiError> {
    let Some(raw) = raw else {
        return Ok(HashSet::new());
    };

    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s)
                .map_err(|_| ApiError::Validation(format!("Invalid item id in exclude: '{s}'")))
        })
        .collect::<Result<HashSet<_>, _>>()?;

    if ids.len() > MAX_EXCLUDED_IDS {
        return Err(ApiError::Validation(format!(
            "Too many excluded ids, at most {MAX_EXCLUDED_IDS} are allowed"
        )));
    }

    Ok(ids)
}

/// A set addressed either by id or by slug
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetRef {
    Id(Uuid),
    Slug(String),
}

impl SetRef {
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        if let Ok(id) = Uuid::parse_str(raw) {
            return Ok(Self::Id(id));
        }
        if SLUG.is_match(raw) {
            return Ok(Self::Slug(raw.to_string()));
        }
        Err(ApiError::Validation(format!("Invalid set reference: '{raw}'")))
    }
}
