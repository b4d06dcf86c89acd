//! Client for the OP3Nvoice audio bundle API.
//!
//! Bundles are named collections of audio tracks with attached metadata.
//! Every operation maps onto a single HTTP request:
//!
//! ```no_run
//! use op3nvoice::{create_bundle, get_bundle, Connection, NewBundle};
//! use serde_json::json;
//!
//! # async fn example() -> op3nvoice::Result<()> {
//! let connection = Connection::with_key("my-api-key");
//! let reference = create_bundle(
//!     &connection,
//!     &NewBundle {
//!         name: Some("md test".to_string()),
//!         metadata: Some(json!({ "wife": "Medea", "husband": "Jason" })),
//!         ..Default::default()
//!     },
//! )
//! .await?;
//!
//! if let Some(href) = reference.links.self_href() {
//!     let bundle = get_bundle(&connection, href, false, true).await?;
//!     println!("{:?}", bundle.metadata());
//! }
//! # Ok(())
//! # }
//! ```

#[macro_use]
mod log_macros;

pub mod api_structs;
mod bundles;
pub mod connection;
pub mod embed;
mod error;
mod metadata;
pub mod paging;
mod search;
mod tracks;

pub use api_structs::{
    AudioChannel, Bundle, BundleList, BundleListParams, BundleUpdate, Link, LinkRelation, Links,
    Metadata, NewBundle, NewTrack, Reference, SearchCollection, SearchItem, SearchParams, Track,
    TrackList, TrackUpdate,
};
pub use bundles::{
    create_bundle, delete_bundle, get_bundle, get_bundle_list, update_bundle, BUNDLES_PATH,
};
pub use connection::{Connection, Fields, RawResponse, DEFAULT_API_URL};
pub use embed::{process_embed, process_embed_override, EmbedFlags};
pub use error::{ApiError, O3vError, Result};
pub use metadata::{delete_metadata, get_metadata, update_metadata};
pub use search::{search, SEARCH_PATH};
pub use tracks::{create_track, delete_track, get_track_list, update_track};

use clap::{Args, Parser, Subcommand};
use core::fmt::Arguments;
use easy_error::{self, ResultExt};
use serde::Serialize;
use std::{error::Error, path::PathBuf, result::Result as StdResult};
use yansi::Paint;

pub trait O3vLog {
    fn output(self: &Self, args: Arguments);
    fn warning(self: &Self, args: Arguments);
    fn error(self: &Self, args: Arguments);
}

pub struct O3vTool<'a> {
    log: &'a dyn O3vLog,
}

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Disable colors in output
    #[arg(long = "no-color", env = "NO_CLI_COLOR")]
    no_color: bool,

    /// OP3Nvoice API key
    #[arg(
        short = 'k',
        long = "api-key",
        env = "O3V_API_KEY",
        value_name = "KEY",
        hide_env_values = true
    )]
    api_key: Option<String>,

    /// OP3Nvoice API base URL
    #[arg(long = "api-url", env = "O3V_API_URL", value_name = "URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct EmbedArgs {
    /// Embed bundles in the listing (omit to keep the href's setting)
    #[arg(long, value_name = "BOOL")]
    embed_items: Option<bool>,
    /// Embed tracks in each bundle (omit to keep the href's setting)
    #[arg(long, value_name = "BOOL")]
    embed_tracks: Option<bool>,
    /// Embed metadata in each bundle (omit to keep the href's setting)
    #[arg(long, value_name = "BOOL")]
    embed_metadata: Option<bool>,
}

impl From<&EmbedArgs> for EmbedFlags {
    fn from(args: &EmbedArgs) -> Self {
        EmbedFlags::new(args.embed_items, args.embed_tracks, args.embed_metadata)
    }
}

#[derive(Args)]
#[group(multiple = false)]
struct MetadataArgs {
    /// Metadata as a JSON document
    #[arg(short = 'm', long = "metadata", value_name = "JSON")]
    metadata: Option<String>,
    /// File containing the metadata JSON document
    #[arg(long = "metadata-file", value_name = "JSON-FILE", value_hint = clap::ValueHint::FilePath)]
    metadata_file: Option<PathBuf>,
}

impl MetadataArgs {
    fn load(&self) -> StdResult<Option<serde_json::Value>, Box<dyn Error>> {
        let text = match (&self.metadata, &self.metadata_file) {
            (Some(text), _) => text.clone(),
            (None, Some(path)) => std::fs::read_to_string(path).context(format!(
                "Unable to read metadata file '{}'",
                path.to_string_lossy()
            ))?,
            (None, None) => return Ok(None),
        };

        let value = serde_json::from_str(&text).context("Metadata is not valid JSON")?;

        Ok(Some(value))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List bundles, or continue a listing from a pagination href
    ListBundles {
        /// A next/prev/first/last href from a previous listing
        #[arg(short = 'r', long)]
        href: Option<String>,
        /// The maximum number of bundles to return
        #[arg(short = 'l', long)]
        limit: Option<u32>,
        #[command(flatten)]
        embed: EmbedArgs,
    },
    /// Get a bundle
    GetBundle {
        #[arg(short = 'r', long)]
        href: String,
        /// Embed the bundle's tracks
        #[arg(long)]
        embed_tracks: bool,
        /// Embed the bundle's metadata
        #[arg(long)]
        embed_metadata: bool,
    },
    /// Create a bundle
    CreateBundle {
        #[arg(short = 'n', long)]
        name: Option<String>,
        /// Public URL of the media file
        #[arg(short = 'u', long)]
        media_url: Option<String>,
        #[arg(long, value_enum)]
        audio_channel: Option<AudioChannel>,
        #[command(flatten)]
        metadata: MetadataArgs,
        /// URL notified when processing completes
        #[arg(long)]
        notify_url: Option<String>,
    },
    /// Update a bundle's name or notification URL
    UpdateBundle {
        #[arg(short = 'r', long)]
        href: String,
        #[arg(short = 'n', long)]
        name: Option<String>,
        #[arg(long)]
        notify_url: Option<String>,
        /// Version the bundle must currently have
        #[arg(long = "expected-version", value_name = "VERSION")]
        version: Option<u64>,
    },
    /// Delete a bundle
    DeleteBundle {
        #[arg(short = 'r', long)]
        href: String,
    },
    /// Get a bundle's metadata
    GetMetadata {
        #[arg(short = 'r', long)]
        href: String,
    },
    /// Replace a bundle's metadata
    UpdateMetadata {
        #[arg(short = 'r', long)]
        href: String,
        #[command(flatten)]
        metadata: MetadataArgs,
        /// Version the metadata must currently have
        #[arg(long = "expected-version", value_name = "VERSION")]
        version: Option<u64>,
    },
    /// Delete a bundle's metadata
    DeleteMetadata {
        #[arg(short = 'r', long)]
        href: String,
    },
    /// Add a track to a bundle
    CreateTrack {
        /// The bundle's track list href
        #[arg(short = 'r', long)]
        href: String,
        #[arg(short = 'u', long)]
        media_url: String,
        #[arg(long)]
        label: Option<String>,
        #[arg(long, value_enum)]
        audio_channel: Option<AudioChannel>,
        #[arg(long)]
        source: Option<String>,
    },
    /// Replace a track in a bundle
    UpdateTrack {
        /// The bundle's track list href
        #[arg(short = 'r', long)]
        href: String,
        /// Index of the track to replace
        #[arg(short = 't', long)]
        track: Option<u32>,
        #[arg(short = 'u', long)]
        media_url: String,
        #[arg(long)]
        label: Option<String>,
        #[arg(long, value_enum)]
        audio_channel: Option<AudioChannel>,
        #[arg(long)]
        source: Option<String>,
        /// Version the track list must currently have
        #[arg(long = "expected-version", value_name = "VERSION")]
        version: Option<u64>,
    },
    /// List the tracks of a bundle
    ListTracks {
        /// The bundle's track list href
        #[arg(short = 'r', long)]
        href: String,
    },
    /// Delete one track, or every track, of a bundle
    DeleteTrack {
        /// The bundle's track list href
        #[arg(short = 'r', long)]
        href: String,
        /// Index of the track to delete; all tracks when omitted
        #[arg(short = 't', long)]
        track: Option<u32>,
    },
    /// Search bundle metadata
    Search {
        /// The search query
        #[arg(short = 'q', long)]
        query: String,
        /// A next/prev/first/last href from a previous search
        #[arg(short = 'r', long)]
        href: Option<String>,
        /// Restrict the search to one field
        #[arg(long)]
        query_field: Option<String>,
        /// Filter expression
        #[arg(long)]
        filter: Option<String>,
        /// The maximum number of results to return
        #[arg(short = 'l', long)]
        limit: Option<u32>,
        #[command(flatten)]
        embed: EmbedArgs,
    },
}

impl<'a> O3vTool<'a> {
    pub fn new(log: &'a dyn O3vLog) -> O3vTool {
        O3vTool { log }
    }

    pub async fn run(
        self: &mut Self,
        args: impl IntoIterator<Item = std::ffi::OsString>,
    ) -> StdResult<(), Box<dyn Error>> {
        let cli = match Cli::try_parse_from(args) {
            Ok(m) => m,
            Err(err) => {
                output!(self.log, "{}", err.to_string());
                return Ok(());
            }
        };

        if cli.no_color {
            Paint::disable();
        }

        let mut connection = Connection::with_base_url(&cli.api_url)?;

        if let Some(key) = cli.api_key {
            connection.set_key(key);
        }

        match &cli.command {
            Some(command) => self.run_command(&connection, command).await,
            None => Ok(()),
        }
    }

    async fn run_command(
        &self,
        connection: &Connection,
        command: &Commands,
    ) -> StdResult<(), Box<dyn Error>> {
        match command {
            Commands::ListBundles { href, limit, embed } => {
                let params = BundleListParams {
                    href: href.clone(),
                    limit: *limit,
                    embed: embed.into(),
                };
                let list = get_bundle_list(connection, &params).await?;

                self.print(&list)?;

                if let Some(next) = list.links.next_href() {
                    output!(self.log, "Next page: {}", next);
                }
            }
            Commands::GetBundle {
                href,
                embed_tracks,
                embed_metadata,
            } => {
                let bundle = get_bundle(connection, href, *embed_tracks, *embed_metadata).await?;

                self.print(&bundle)?;
            }
            Commands::CreateBundle {
                name,
                media_url,
                audio_channel,
                metadata,
                notify_url,
            } => {
                let bundle = NewBundle {
                    name: name.clone(),
                    media_url: media_url.clone(),
                    audio_channel: *audio_channel,
                    metadata: metadata.load()?,
                    notify_url: notify_url.clone(),
                };

                self.print(&create_bundle(connection, &bundle).await?)?;
            }
            Commands::UpdateBundle {
                href,
                name,
                notify_url,
                version,
            } => {
                let update = BundleUpdate {
                    name: name.clone(),
                    notify_url: notify_url.clone(),
                    version: *version,
                };

                self.print(&update_bundle(connection, href, &update).await?)?;
            }
            Commands::DeleteBundle { href } => {
                delete_bundle(connection, href).await?;
                output!(self.log, "Deleted bundle {}", href);
            }
            Commands::GetMetadata { href } => {
                self.print(&get_metadata(connection, href).await?)?;
            }
            Commands::UpdateMetadata {
                href,
                metadata,
                version,
            } => {
                let data = metadata
                    .load()?
                    .ok_or("Provide metadata with --metadata or --metadata-file")?;

                self.print(&update_metadata(connection, href, &data, *version).await?)?;
            }
            Commands::DeleteMetadata { href } => {
                delete_metadata(connection, href).await?;
                output!(self.log, "Deleted metadata {}", href);
            }
            Commands::CreateTrack {
                href,
                media_url,
                label,
                audio_channel,
                source,
            } => {
                let track = NewTrack {
                    media_url: media_url.clone(),
                    label: label.clone(),
                    audio_channel: *audio_channel,
                    source: source.clone(),
                };

                self.print(&create_track(connection, href, &track).await?)?;
            }
            Commands::UpdateTrack {
                href,
                track,
                media_url,
                label,
                audio_channel,
                source,
                version,
            } => {
                let update = TrackUpdate {
                    track: *track,
                    media_url: media_url.clone(),
                    label: label.clone(),
                    audio_channel: *audio_channel,
                    source: source.clone(),
                    version: *version,
                };

                self.print(&update_track(connection, href, &update).await?)?;
            }
            Commands::ListTracks { href } => {
                self.print(&get_track_list(connection, href).await?)?;
            }
            Commands::DeleteTrack { href, track } => {
                if track.is_none() {
                    warning!(self.log, "No track index given, deleting every track");
                }

                delete_track(connection, href, *track).await?;

                match track {
                    Some(index) => output!(self.log, "Deleted track {}", index),
                    None => output!(self.log, "Deleted all tracks"),
                }
            }
            Commands::Search {
                query,
                href,
                query_field,
                filter,
                limit,
                embed,
            } => {
                let params = SearchParams {
                    href: href.clone(),
                    query: query.clone(),
                    query_field: query_field.clone(),
                    filter: filter.clone(),
                    limit: *limit,
                    embed: embed.into(),
                };
                let results = search(connection, &params).await?;

                self.print(&results)?;

                if let Some(next) = results.links.next_href() {
                    output!(self.log, "Next page: {}", next);
                }
            }
        }

        Ok(())
    }

    fn print<T: Serialize>(&self, value: &T) -> StdResult<(), Box<dyn Error>> {
        output!(self.log, "{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}
