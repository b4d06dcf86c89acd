//! Composition of the `embed` request parameter.
//!
//! The API inlines sub-resources named in a comma separated `embed`
//! parameter. Tokens are always emitted in the order `items`, `tracks`,
//! `metadata`.

pub const EMBED_ITEMS: &str = "items";
pub const EMBED_TRACKS: &str = "tracks";
pub const EMBED_METADATA: &str = "metadata";

/// Builds the `embed` value for the flags that are set, or `None` when no
/// flag is set.
pub fn process_embed(items: bool, tracks: bool, metadata: bool) -> Option<String> {
    let tokens: Vec<&str> = [
        (items, EMBED_ITEMS),
        (tracks, EMBED_TRACKS),
        (metadata, EMBED_METADATA),
    ]
    .into_iter()
    .filter_map(|(set, token)| set.then_some(token))
    .collect();

    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(","))
    }
}

/// Recomputes the `embed` value of a pagination href.
///
/// Each flag starts from whether its token appears in `href_embed`. An
/// override of `Some(true)` sets the flag, `Some(false)` clears it even when
/// the href had it, and `None` keeps what the href said.
pub fn process_embed_override(
    href_embed: Option<&str>,
    items: Option<bool>,
    tracks: Option<bool>,
    metadata: Option<bool>,
) -> Option<String> {
    let has = |token: &str| {
        href_embed
            .map(|embed| embed.split(',').any(|t| t.trim() == token))
            .unwrap_or(false)
    };

    process_embed(
        items.unwrap_or_else(|| has(EMBED_ITEMS)),
        tracks.unwrap_or_else(|| has(EMBED_TRACKS)),
        metadata.unwrap_or_else(|| has(EMBED_METADATA)),
    )
}

/// Tri-state embed selection used by the list and search operations.
///
/// On a first page an unset flag means "do not embed"; on a continuation
/// page it means "keep whatever the href asked for".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmbedFlags {
    pub items: Option<bool>,
    pub tracks: Option<bool>,
    pub metadata: Option<bool>,
}

impl EmbedFlags {
    pub fn new(items: Option<bool>, tracks: Option<bool>, metadata: Option<bool>) -> Self {
        EmbedFlags {
            items,
            tracks,
            metadata,
        }
    }

    /// The `embed` value for a first page request.
    pub fn to_param(&self) -> Option<String> {
        process_embed(
            self.items.unwrap_or(false),
            self.tracks.unwrap_or(false),
            self.metadata.unwrap_or(false),
        )
    }

    /// The `embed` value for a continuation of an href carrying `href_embed`.
    pub fn override_param(&self, href_embed: Option<&str>) -> Option<String> {
        process_embed_override(href_embed, self.items, self.tracks, self.metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: [Option<bool>; 3] = [None, Some(true), Some(false)];

    #[test]
    fn process_embed_all_combinations() {
        assert_eq!(process_embed(false, false, false), None);
        assert_eq!(process_embed(true, false, false).as_deref(), Some("items"));
        assert_eq!(process_embed(false, true, false).as_deref(), Some("tracks"));
        assert_eq!(
            process_embed(false, false, true).as_deref(),
            Some("metadata")
        );
        assert_eq!(
            process_embed(true, true, false).as_deref(),
            Some("items,tracks")
        );
        assert_eq!(
            process_embed(true, false, true).as_deref(),
            Some("items,metadata")
        );
        assert_eq!(
            process_embed(false, true, true).as_deref(),
            Some("tracks,metadata")
        );
        assert_eq!(
            process_embed(true, true, true).as_deref(),
            Some("items,tracks,metadata")
        );
    }

    #[test]
    fn override_explicit_false_clears_unset_keeps() {
        assert_eq!(
            process_embed_override(Some("items,tracks"), Some(false), None, Some(true)).as_deref(),
            Some("tracks,metadata")
        );
    }

    #[test]
    fn override_without_href_embed() {
        assert_eq!(process_embed_override(None, None, None, None), None);
        assert_eq!(
            process_embed_override(None, Some(true), Some(false), None).as_deref(),
            Some("items")
        );
    }

    #[test]
    fn override_clearing_everything_yields_none() {
        assert_eq!(
            process_embed_override(
                Some("items,tracks,metadata"),
                Some(false),
                Some(false),
                Some(false)
            ),
            None
        );
    }

    #[test]
    fn override_matches_whole_tokens_only() {
        assert_eq!(process_embed_override(Some("itemsx"), None, None, None), None);
        assert_eq!(
            process_embed_override(Some(" tracks , metadata"), None, None, None).as_deref(),
            Some("tracks,metadata")
        );
    }

    // Every {unset, true, false} override for each flag, against every
    // combination of tokens already present in the href.
    #[test]
    fn override_full_matrix() {
        for href_items in [false, true] {
            for href_tracks in [false, true] {
                for href_metadata in [false, true] {
                    let href_embed = process_embed(href_items, href_tracks, href_metadata);

                    for items in STATES {
                        for tracks in STATES {
                            for metadata in STATES {
                                let expected = process_embed(
                                    items.unwrap_or(href_items),
                                    tracks.unwrap_or(href_tracks),
                                    metadata.unwrap_or(href_metadata),
                                );
                                let actual = process_embed_override(
                                    href_embed.as_deref(),
                                    items,
                                    tracks,
                                    metadata,
                                );

                                assert_eq!(
                                    actual, expected,
                                    "href {:?} overrides {:?} {:?} {:?}",
                                    href_embed, items, tracks, metadata
                                );
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn embed_flags_first_page_treats_unset_as_false() {
        let flags = EmbedFlags::new(Some(true), None, Some(false));

        assert_eq!(flags.to_param().as_deref(), Some("items"));
        assert_eq!(EmbedFlags::default().to_param(), None);
    }

    #[test]
    fn embed_flags_continuation_inherits_unset() {
        let flags = EmbedFlags::new(None, None, Some(true));

        assert_eq!(
            flags.override_param(Some("items")).as_deref(),
            Some("items,metadata")
        );
    }
}
