//! Metadata operations. Metadata is arbitrary JSON attached to a bundle.

use crate::api_structs::{Metadata, Reference};
use crate::connection::{Connection, Fields};
use crate::error::Result;
use crate::paging::require;

pub async fn get_metadata(connection: &Connection, href: &str) -> Result<Metadata> {
    let href = require("href", href)?;

    connection.get(href, &Fields::new()).await?.into_json()
}

/// Replaces the metadata at `href` with `data`.
///
/// `data` is sent as a JSON string in the `data` field. When `version` is
/// given it must match the current version or the API answers 409.
pub async fn update_metadata(
    connection: &Connection,
    href: &str,
    data: &serde_json::Value,
    version: Option<u64>,
) -> Result<Reference> {
    let href = require("href", href)?;
    let mut fields = Fields::new();

    fields.insert_opt("version", version);
    fields.insert("data", data);

    connection.put(href, &fields).await?.into_json()
}

pub async fn delete_metadata(connection: &Connection, href: &str) -> Result<()> {
    let href = require("href", href)?;

    connection
        .delete(href, &Fields::new())
        .await?
        .into_no_content()
}
