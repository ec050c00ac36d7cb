//! Custom Askama template filters.
//!
//! Page templates bring these into scope with `use crate::filters;`.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the content hash for main.css.
///
/// The hash is computed at build time from the CSS file content.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

/// Renders an optional value, or a dash when absent.
///
/// Usage in templates: `{{ user.phone|or_dash }}`
#[askama::filter_fn]
pub fn or_dash<T: Display>(
    value: &Option<T>,
    _env: &dyn askama::Values,
) -> askama::Result<String> {
    Ok(value
        .as_ref()
        .map_or_else(|| "—".to_owned(), ToString::to_string))
}
