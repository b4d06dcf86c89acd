use crate::embed::EmbedFlags;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const REL_SELF: &str = "self";
pub const REL_NEXT: &str = "next";
pub const REL_PREV: &str = "prev";
pub const REL_FIRST: &str = "first";
pub const REL_LAST: &str = "last";
pub const REL_BUNDLE: &str = "o3v:bundle";
pub const REL_ITEMS: &str = "o3v:items";
pub const REL_TRACKS: &str = "o3v:tracks";
pub const REL_METADATA: &str = "o3v:metadata";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Link {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A HAL relation holds either one link or a list of them.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LinkRelation {
    One(Link),
    Many(Vec<Link>),
}

impl LinkRelation {
    pub fn first(&self) -> Option<&Link> {
        match self {
            LinkRelation::One(link) => Some(link),
            LinkRelation::Many(links) => links.first(),
        }
    }

    pub fn all(&self) -> Vec<&Link> {
        match self {
            LinkRelation::One(link) => vec![link],
            LinkRelation::Many(links) => links.iter().collect(),
        }
    }
}

/// The `_links` section of a resource. Relations set to `null` are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Links(pub BTreeMap<String, LinkRelation>);

impl<'de> Deserialize<'de> for Links {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let relations = BTreeMap::<String, Option<LinkRelation>>::deserialize(deserializer)?;

        Ok(Links(
            relations
                .into_iter()
                .filter_map(|(rel, relation)| relation.map(|r| (rel, r)))
                .collect(),
        ))
    }
}

impl Links {
    /// The href of the first link under `rel`.
    pub fn href(&self, rel: &str) -> Option<&str> {
        self.0
            .get(rel)
            .and_then(LinkRelation::first)
            .map(|link| link.href.as_str())
    }

    /// Every href under `rel`.
    pub fn hrefs(&self, rel: &str) -> Vec<&str> {
        self.0
            .get(rel)
            .map(|relation| relation.all().into_iter().map(|l| l.href.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn self_href(&self) -> Option<&str> {
        self.href(REL_SELF)
    }

    pub fn next_href(&self) -> Option<&str> {
        self.href(REL_NEXT)
    }

    pub fn prev_href(&self) -> Option<&str> {
        self.href(REL_PREV)
    }
}

/// Response to a create or update: links to the affected resource.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Reference {
    #[serde(rename = "_links", default)]
    pub links: Links,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Metadata {
    #[serde(rename = "_links", default)]
    pub links: Links,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Track {
    /// Position of the track within its bundle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TrackList {
    #[serde(rename = "_links", default)]
    pub links: Links,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BundleEmbedded {
    #[serde(rename = "o3v:tracks", default, skip_serializing_if = "Option::is_none")]
    pub tracks: Option<TrackList>,
    #[serde(rename = "o3v:metadata", default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Bundle {
    #[serde(rename = "_links", default)]
    pub links: Links,
    #[serde(rename = "_embedded", default, skip_serializing_if = "Option::is_none")]
    pub embedded: Option<BundleEmbedded>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

impl Bundle {
    pub fn tracks(&self) -> Option<&TrackList> {
        self.embedded.as_ref().and_then(|e| e.tracks.as_ref())
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.embedded.as_ref().and_then(|e| e.metadata.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BundleListEmbedded {
    #[serde(rename = "o3v:items", default)]
    pub items: Vec<Bundle>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BundleList {
    #[serde(rename = "_links", default)]
    pub links: Links,
    #[serde(rename = "_embedded", default, skip_serializing_if = "Option::is_none")]
    pub embedded: Option<BundleListEmbedded>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl BundleList {
    /// Embedded bundles, empty unless items were embedded.
    pub fn items(&self) -> &[Bundle] {
        self.embedded
            .as_ref()
            .map(|e| e.items.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SearchItemEmbedded {
    #[serde(rename = "o3v:bundle", default, skip_serializing_if = "Option::is_none")]
    pub bundle: Option<Bundle>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SearchItem {
    #[serde(rename = "_links", default)]
    pub links: Links,
    #[serde(rename = "_embedded", default, skip_serializing_if = "Option::is_none")]
    pub embedded: Option<SearchItemEmbedded>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SearchCollectionEmbedded {
    #[serde(rename = "o3v:items", default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SearchCollection {
    #[serde(rename = "_links", default)]
    pub links: Links,
    #[serde(rename = "_embedded", default, skip_serializing_if = "Option::is_none")]
    pub embedded: Option<SearchCollectionEmbedded>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl SearchCollection {
    pub fn items(&self) -> &[SearchItem] {
        self.embedded
            .as_ref()
            .map(|e| e.items.as_slice())
            .unwrap_or(&[])
    }
}

/// Which channel of a stereo file to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AudioChannel {
    Left,
    Right,
    Split,
}

impl AudioChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioChannel::Left => "left",
            AudioChannel::Right => "right",
            AudioChannel::Split => "split",
        }
    }
}

impl fmt::Display for AudioChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BundleListParams {
    /// A `next`/`prev`/`first`/`last` href to continue from
    pub href: Option<String>,
    pub limit: Option<u32>,
    pub embed: EmbedFlags,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewBundle {
    pub name: Option<String>,
    pub media_url: Option<String>,
    pub audio_channel: Option<AudioChannel>,
    /// Sent as a JSON string, not as nested form fields
    pub metadata: Option<serde_json::Value>,
    pub notify_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BundleUpdate {
    pub name: Option<String>,
    pub notify_url: Option<String>,
    /// Must match the bundle's current version or the update is rejected with 409
    pub version: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTrack {
    pub media_url: String,
    pub label: Option<String>,
    pub audio_channel: Option<AudioChannel>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackUpdate {
    /// Index of the track to replace; the API default applies when absent
    pub track: Option<u32>,
    pub media_url: String,
    pub label: Option<String>,
    pub audio_channel: Option<AudioChannel>,
    pub source: Option<String>,
    pub version: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams {
    /// A `next`/`prev`/`first`/`last` href to continue from
    pub href: Option<String>,
    pub query: String,
    pub query_field: Option<String>,
    pub filter: Option<String>,
    pub limit: Option<u32>,
    pub embed: EmbedFlags,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        SearchParams {
            query: query.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bundle_decodes_embedded_resources() {
        let bundle: Bundle = serde_json::from_value(json!({
            "_links": {
                "self": { "href": "/v1/bundles/abc" },
                "o3v:tracks": { "href": "/v1/bundles/abc/tracks" },
                "o3v:metadata": { "href": "/v1/bundles/abc/metadata" },
                "curies": [{ "href": "/docs/rels/{rel}", "name": "o3v", "templated": true }]
            },
            "_embedded": {
                "o3v:metadata": {
                    "_links": { "self": { "href": "/v1/bundles/abc/metadata" } },
                    "created": "2014-05-01T12:00:00Z",
                    "data": { "wife": "Medea", "husband": "Jason" }
                },
                "o3v:tracks": {
                    "tracks": [{ "track": 0, "media_url": "http://x/a.wav", "label": "A" }]
                }
            },
            "name": "md test",
            "version": 3,
            "unexpected": [1, 2, 3]
        }))
        .unwrap();

        assert_eq!(bundle.links.self_href(), Some("/v1/bundles/abc"));
        assert_eq!(bundle.links.href(REL_METADATA), Some("/v1/bundles/abc/metadata"));
        assert_eq!(bundle.links.hrefs("curies"), vec!["/docs/rels/{rel}"]);
        assert_eq!(bundle.name.as_deref(), Some("md test"));
        assert_eq!(bundle.version, Some(3));
        assert_eq!(
            bundle.metadata().and_then(|m| m.data.clone()),
            Some(json!({ "wife": "Medea", "husband": "Jason" }))
        );
        assert_eq!(bundle.tracks().map(|t| t.tracks.len()), Some(1));
        assert_eq!(bundle.tracks().unwrap().tracks[0].track, Some(0));
    }

    #[test]
    fn bundle_list_without_embedded_items() {
        let list: BundleList = serde_json::from_value(json!({
            "_links": {
                "self": { "href": "/v1/bundles?limit=2" },
                "next": { "href": "/v1/bundles?limit=2&iter=xyz" },
                "o3v:items": [
                    { "href": "/v1/bundles/1" },
                    { "href": "/v1/bundles/2" }
                ]
            },
            "total": 2,
            "limit": 2
        }))
        .unwrap();

        assert!(list.items().is_empty());
        assert_eq!(list.links.next_href(), Some("/v1/bundles?limit=2&iter=xyz"));
        assert_eq!(list.links.prev_href(), None);
        assert_eq!(
            list.links.hrefs(REL_ITEMS),
            vec!["/v1/bundles/1", "/v1/bundles/2"]
        );
        assert_eq!(list.total, Some(2));
    }

    #[test]
    fn null_link_relations_are_skipped() {
        let list: BundleList = serde_json::from_str(
            r#"{"_links":{"self":{"href":"/v1/bundles"},"prev":null},"total":0}"#,
        )
        .unwrap();

        assert_eq!(list.links.self_href(), Some("/v1/bundles"));
        assert_eq!(list.links.prev_href(), None);
        assert!(!list.links.0.contains_key(REL_PREV));
        assert_eq!(list.total, Some(0));
    }

    #[test]
    fn empty_links_section_decodes() {
        let bundle: Bundle = serde_json::from_str(r#"{"_links":{},"name":"n"}"#).unwrap();

        assert!(bundle.links.0.is_empty());
        assert_eq!(bundle.name.as_deref(), Some("n"));
    }

    #[test]
    fn reference_tolerates_missing_fields() {
        let reference: Reference = serde_json::from_str("{}").unwrap();

        assert_eq!(reference, Reference::default());
    }

    #[test]
    fn mistyped_field_is_rejected() {
        let result = serde_json::from_value::<Bundle>(json!({ "version": "three" }));

        assert!(result.is_err());
    }

    #[test]
    fn search_collection_items() {
        let collection: SearchCollection = serde_json::from_value(json!({
            "_embedded": {
                "o3v:items": [{
                    "_links": { "o3v:bundle": { "href": "/v1/bundles/abc" } },
                    "score": 0.75
                }]
            },
            "total": 1
        }))
        .unwrap();

        assert_eq!(collection.items().len(), 1);
        assert_eq!(collection.items()[0].score, Some(0.75));
        assert_eq!(
            collection.items()[0].links.href(REL_BUNDLE),
            Some("/v1/bundles/abc")
        );
    }

    #[test]
    fn audio_channel_names() {
        assert_eq!(AudioChannel::Left.to_string(), "left");
        assert_eq!(AudioChannel::Split.as_str(), "split");
    }
}
