//! # Post Query Planner
//!
//! Turns raw listing parameters into a [`PostQuery`].
//!
//! Mode selection:
//! - any of `bank`, `category`, `search` present → [`ListingMode::Filtered`]: active posts
//!   only, soonest-to-expire first. Expired posts are invisible once a filter is applied.
//! - none present → [`ListingMode::Unfiltered`]: active posts first, then expired posts.
//!
//! A parameter is present only if it has a non-blank value. `bank` and `category`
//! are comma-separated lists; blank entries are dropped, so `bank=,` counts as absent.

use chrono::NaiveDate;
use domains::{DomainError, ListingMode, Page, PostFilters, PostQuery, Result};
use serde::Deserialize;

use crate::input::non_blank;

/// Query string of `GET /posts`. Kept as raw strings so bad numbers become field errors.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListPostsParams {
    pub bank: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

pub fn plan(params: &ListPostsParams, today: NaiveDate) -> Result<PostQuery> {
    let filters = PostFilters {
        banks: split_list(params.bank.as_deref()),
        categories: split_list(params.category.as_deref()),
        search: non_blank(params.search.as_deref()),
    };

    let mode = if filters.is_empty() {
        ListingMode::Unfiltered
    } else {
        ListingMode::Filtered(filters)
    };

    let defaults = Page::default();
    let page = Page {
        limit: parse_count("limit", params.limit.as_deref(), defaults.limit)?,
        offset: parse_count("offset", params.offset.as_deref(), defaults.offset)?,
    };

    Ok(PostQuery { mode, today, page })
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_owned)
            .collect()
    })
    .unwrap_or_default()
}

fn parse_count(field: &str, raw: Option<&str>, default: i64) -> Result<i64> {
    let Some(value) = non_blank(raw) else {
        return Ok(default);
    };
    match value.parse::<i64>() {
        Ok(n) if n >= 0 => Ok(n),
        _ => Err(DomainError::validation(format!("{field} must be a non-negative integer"))),
    }
}
