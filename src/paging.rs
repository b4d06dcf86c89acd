//! Request assembly for paged listings.
//!
//! A listing either starts from its canonical path or continues from an
//! href the server returned (`next`, `prev`, `first`, `last`). In the second
//! case the href's own query is kept and only `limit` and `embed` are
//! overridden.

use crate::connection::Fields;
use crate::embed::EmbedFlags;
use crate::error::{O3vError, Result};

/// Path and parameters of the request for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub path: String,
    pub fields: Fields,
}

pub(crate) fn check_limit(limit: Option<u32>) -> Result<()> {
    match limit {
        Some(0) => Err(O3vError::InvalidArgument(
            "limit must be greater than zero".to_string(),
        )),
        _ => Ok(()),
    }
}

pub(crate) fn require<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    if value.trim().is_empty() {
        Err(O3vError::InvalidArgument(format!("{} must not be empty", name)))
    } else {
        Ok(value)
    }
}

/// First page: `fields` carries the operation specific parameters, to which
/// `limit` and `embed` are added when supplied.
pub fn first_page(
    path: String,
    mut fields: Fields,
    limit: Option<u32>,
    embed: &EmbedFlags,
) -> PageRequest {
    fields.insert_opt("limit", limit);
    fields.insert_opt("embed", embed.to_param());

    PageRequest { path, fields }
}

/// Continuation of a server supplied `href`.
pub fn continuation(href: &str, limit: Option<u32>, embed: &EmbedFlags) -> PageRequest {
    let href = href.split_once('#').map_or(href, |(before, _)| before);
    let (path, query) = href.split_once('?').unwrap_or((href, ""));

    let mut fields: Fields = url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();

    fields.insert_opt("limit", limit);

    let embed = embed.override_param(fields.get("embed"));

    match embed {
        Some(value) => fields.insert("embed", value),
        None => fields.remove("embed"),
    }

    PageRequest {
        path: path.to_string(),
        fields,
    }
}
