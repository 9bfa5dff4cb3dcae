//! # Todo listing engine
//!
//! Turns the loosely-typed query string of a listing request into a deterministic,
//! bounded, sorted page plus pagination metadata.
//!
//! The work is split in two steps:
//!
//! 1. [`TodoQuery::from_params`] parses a [`ListParams`] bag into a typed query:
//!    a [`TodoFilter`] (predicate), a [`SortSpec`] and a [`PageRequest`]. This step is
//!    pure and is where caller input errors are raised.
//! 2. [`execute`] issues the count and the page read against a [`TodoStore`]
//!    concurrently, each bounded by the configured timeout, and wraps the result
//!    in a [`Paginated`] envelope.
//!
//! "List all" and "list mine" share both steps; the only difference is the owner
//! predicate.

pub mod filter;
pub mod pagination;
pub mod sort;

use serde::Deserialize;

use crate::config::QuerySettings;
use crate::error::AppError;
use crate::models::Todo;
use crate::store::{bounded, TodoStore};

pub use filter::{DateRange, TodoFilter};
pub use pagination::{PageRequest, Paginated, Pagination, DEFAULT_LIMIT, DEFAULT_PAGE};
pub use sort::{SortDirection, SortField, SortSpec};

/// Raw listing parameters exactly as they appear in the query string.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// A fully resolved listing query.
#[derive(Debug, Clone, PartialEq)]
pub struct TodoQuery {
    pub filter: TodoFilter,
    pub sort: SortSpec,
    pub page: PageRequest,
}

impl TodoQuery {
    /// Resolves raw parameters. `owner` is set for "my todos" and `None` for "all todos".
    pub fn from_params(
        params: &ListParams,
        owner: Option<String>,
        max_page_size: u64,
    ) -> Result<Self, AppError> {
        let filter = TodoFilter::normalize(
            owner,
            params.status.as_deref(),
            params.priority.as_deref(),
            params.start_date.as_deref(),
            params.end_date.as_deref(),
        )?;
        let sort = SortSpec::resolve(params.sort_by.as_deref(), params.order.as_deref())?;
        let page = PageRequest::resolve(
            params.page.as_deref(),
            params.limit.as_deref(),
            max_page_size,
        );

        Ok(Self { filter, sort, page })
    }
}

/// Runs `query` against `store` and assembles the listing envelope.
pub async fn execute<S>(
    store: &S,
    query: &TodoQuery,
    settings: &QuerySettings,
) -> Result<Paginated<Todo>, AppError>
where
    S: TodoStore + ?Sized,
{
    let items = bounded(
        settings.timeout,
        store.find_todos(&query.filter, &query.sort, query.page.skip, query.page.limit),
    );
    let total = bounded(settings.timeout, store.count_todos(&query.filter));
    let (items, total) = futures::try_join!(items, total)?;

    log::debug!(
        "listed {} of {} todos (page {}, limit {}, sort {} {:?})",
        items.len(),
        total,
        query.page.page,
        query.page.limit,
        query.sort.field,
        query.sort.direction
    );

    Ok(Paginated::assemble(items, total, &query.page))
}
