//! Text search over bundle metadata.

use crate::api_structs::{SearchCollection, SearchParams};
use crate::connection::{Connection, Fields};
use crate::error::Result;
use crate::paging::{self, check_limit, require};

pub const SEARCH_PATH: &str = "search";

/// Searches bundles, paging the same way as the bundle list.
///
/// `query` must not be empty. When continuing from `params.href`, query,
/// field and filter come from the href; only `limit` and `embed` override it.
pub async fn search(connection: &Connection, params: &SearchParams) -> Result<SearchCollection> {
    let query = require("query", &params.query)?;
    check_limit(params.limit)?;

    let request = match params.href.as_deref() {
        Some(href) => {
            paging::continuation(require("href", href)?, params.limit, &params.embed)
        }
        None => {
            let mut fields = Fields::new();

            fields.insert("query", query);
            fields.insert_opt("query_field", params.query_field.as_deref());
            fields.insert_opt("filter", params.filter.as_deref());

            paging::first_page(
                Connection::resource_path(SEARCH_PATH),
                fields,
                params.limit,
                &params.embed,
            )
        }
    };

    connection
        .get(&request.path, &request.fields)
        .await?
        .into_json()
}
