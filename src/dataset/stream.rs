//! Lazy paginated dataset listing

use super::backend::DatasetBackend;
use super::model::{Dataset, ListDatasetsOptions};
use super::reference::ProjectReference;
use crate::error::Result;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::VecDeque;

/// Forward-only, non-restartable sequence of datasets
///
/// Pages are fetched on demand as the stream is polled. A failed page is
/// yielded once as an error and ends the stream.
pub type DatasetStream<'a> = BoxStream<'a, Result<Dataset>>;

struct ListState<'a, B: ?Sized> {
    backend: &'a B,
    project: ProjectReference,
    options: ListDatasetsOptions,
    buffered: VecDeque<Dataset>,
    page_token: Option<String>,
    exhausted: bool,
}

pub(crate) fn list_stream<'a, B>(
    backend: &'a B,
    project: ProjectReference,
    options: ListDatasetsOptions,
) -> DatasetStream<'a>
where
    B: DatasetBackend + ?Sized,
{
    let state = ListState {
        backend,
        project,
        options,
        buffered: VecDeque::new(),
        page_token: None,
        exhausted: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(dataset) = state.buffered.pop_front() {
                return Some((Ok(dataset), state));
            }
            if state.exhausted {
                return None;
            }

            let page = state
                .backend
                .list_datasets_page(&state.project, &state.options, state.page_token.as_deref())
                .await;

            match page {
                Ok(page) => {
                    state.buffered.extend(page.datasets);
                    state.page_token = page.next_page_token;
                    state.exhausted = state.page_token.is_none();
                }
                Err(err) => {
                    state.exhausted = true;
                    return Some((Err(err), state));
                }
            }
        }
    })
    .boxed()
}
