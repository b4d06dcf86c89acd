//! Bundle operations.

use crate::api_structs::{
    Bundle, BundleList, BundleListParams, BundleUpdate, NewBundle, Reference,
};
use crate::connection::{Connection, Fields};
use crate::embed::process_embed;
use crate::error::Result;
use crate::paging::{self, check_limit, require};

pub const BUNDLES_PATH: &str = "bundles";

/// Gets a page of bundles.
///
/// Without `params.href` the first page is requested. With it, the href is
/// followed and `limit` and `embed` override whatever the href carries.
pub async fn get_bundle_list(
    connection: &Connection,
    params: &BundleListParams,
) -> Result<BundleList> {
    check_limit(params.limit)?;

    let request = match params.href.as_deref() {
        Some(href) => {
            paging::continuation(require("href", href)?, params.limit, &params.embed)
        }
        None => paging::first_page(
            Connection::resource_path(BUNDLES_PATH),
            Fields::new(),
            params.limit,
            &params.embed,
        ),
    };

    connection
        .get(&request.path, &request.fields)
        .await?
        .into_json()
}

/// Creates a bundle. Only the supplied fields are sent.
pub async fn create_bundle(connection: &Connection, bundle: &NewBundle) -> Result<Reference> {
    let mut fields = Fields::new();

    fields.insert_opt("name", bundle.name.as_deref());
    fields.insert_opt("media_url", bundle.media_url.as_deref());
    fields.insert_opt("audio_channel", bundle.audio_channel);
    // The API expects metadata as a JSON encoded string
    fields.insert_opt("metadata", bundle.metadata.as_ref());
    fields.insert_opt("notify_url", bundle.notify_url.as_deref());

    connection
        .post(&Connection::resource_path(BUNDLES_PATH), &fields)
        .await?
        .into_json()
}

/// Gets a bundle, optionally with its tracks and metadata embedded.
pub async fn get_bundle(
    connection: &Connection,
    href: &str,
    embed_tracks: bool,
    embed_metadata: bool,
) -> Result<Bundle> {
    let href = require("href", href)?;
    let mut fields = Fields::new();

    fields.insert_opt("embed", process_embed(false, embed_tracks, embed_metadata));

    connection.get(href, &fields).await?.into_json()
}

/// Updates a bundle's name and notification URL.
pub async fn update_bundle(
    connection: &Connection,
    href: &str,
    update: &BundleUpdate,
) -> Result<Reference> {
    let href = require("href", href)?;
    let mut fields = Fields::new();

    fields.insert_opt("name", update.name.as_deref());
    fields.insert_opt("notify_url", update.notify_url.as_deref());
    fields.insert_opt("version", update.version);

    connection.put(href, &fields).await?.into_json()
}

/// Deletes a bundle. The API answers 204 on success.
pub async fn delete_bundle(connection: &Connection, href: &str) -> Result<()> {
    let href = require("href", href)?;

    connection
        .delete(href, &Fields::new())
        .await?
        .into_no_content()
}
