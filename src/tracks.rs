//! Track operations. `href` is always the track list of a bundle, found
//! under the bundle's `o3v:tracks` link.

use crate::api_structs::{NewTrack, Reference, TrackList, TrackUpdate};
use crate::connection::{Connection, Fields};
use crate::error::Result;
use crate::paging::require;

/// Adds a track to the bundle. The API limits how many tracks a bundle holds.
pub async fn create_track(
    connection: &Connection,
    href: &str,
    track: &NewTrack,
) -> Result<Reference> {
    let href = require("href", href)?;
    let mut fields = Fields::new();

    fields.insert("media_url", require("media_url", &track.media_url)?);
    fields.insert_opt("label", track.label.as_deref());
    fields.insert_opt("audio_channel", track.audio_channel);
    fields.insert_opt("source", track.source.as_deref());

    connection.post(href, &fields).await?.into_json()
}

/// Replaces the track at index `update.track`.
pub async fn update_track(
    connection: &Connection,
    href: &str,
    update: &TrackUpdate,
) -> Result<Reference> {
    let href = require("href", href)?;
    let mut fields = Fields::new();

    fields.insert_opt("track", update.track);
    fields.insert("media_url", require("media_url", &update.media_url)?);
    fields.insert_opt("label", update.label.as_deref());
    fields.insert_opt("audio_channel", update.audio_channel);
    fields.insert_opt("source", update.source.as_deref());
    fields.insert_opt("version", update.version);

    connection.put(href, &fields).await?.into_json()
}

pub async fn get_track_list(connection: &Connection, href: &str) -> Result<TrackList> {
    let href = require("href", href)?;

    connection.get(href, &Fields::new()).await?.into_json()
}

/// Deletes the track at index `track`, or every track when `track` is `None`.
pub async fn delete_track(connection: &Connection, href: &str, track: Option<u32>) -> Result<()> {
    let href = require("href", href)?;
    let mut fields = Fields::new();

    fields.insert_opt("track", track);

    connection.delete(href, &fields).await?.into_no_content()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::O3vError;

    #[test]
    fn media_url_is_required() {
        let connection = Connection::with_key("key");
        let track = NewTrack::default();

        let result = tokio_test::block_on(create_track(
            &connection,
            "/v1/bundles/abc/tracks",
            &track,
        ));

        match result {
            Err(O3vError::InvalidArgument(message)) => assert!(message.contains("media_url")),
            other => panic!("Expected InvalidArgument, got {:?}", other),
        }
    }
}
