//! Background tasks that talk to the feed API.
//!
//! Each spawn helper runs one API call on the tokio runtime and reports the
//! outcome as an `AppEvent`. Panics inside a task are caught and reported as
//! `AppEvent::TaskPanicked` instead of silently killing the task.

use crate::api::{await_ingest, FeedApi, IngestPolicy};
use crate::app::AppEvent;
use crate::model::{FeedId, ItemQuery};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Run `future`, turning a panic into `Err(message)`.
pub(crate) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future).catch_unwind().await.map_err(|panic| {
        if let Some(s) = panic.downcast_ref::<&'static str>() {
            s.to_string()
        } else if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        }
    })
}

/// Spawn `work`, forwarding the event it produces (or a panic report).
fn spawn_reporting<F>(task: &'static str, tx: mpsc::Sender<AppEvent>, work: F) -> JoinHandle<()>
where
    F: Future<Output = AppEvent> + Send + 'static,
{
    tokio::spawn(async move {
        let event = match catch_task_panic(work).await {
            Ok(event) => event,
            Err(error) => {
                tracing::error!(task, error = %error, "Background task panicked");
                AppEvent::TaskPanicked { task, error }
            }
        };
        if tx.send(event).await.is_err() {
            tracing::debug!(task, "Event receiver dropped, discarding result");
        }
    })
}

pub(crate) fn spawn_feeds_fetch(
    api: Arc<dyn FeedApi>,
    seq: u64,
    tx: mpsc::Sender<AppEvent>,
) -> JoinHandle<()> {
    spawn_reporting("list_feeds", tx, async move {
        let result = api.list_feeds().await;
        AppEvent::FeedsLoaded { seq, result }
    })
}

pub(crate) fn spawn_items_fetch(
    api: Arc<dyn FeedApi>,
    seq: u64,
    query: ItemQuery,
    tx: mpsc::Sender<AppEvent>,
) -> JoinHandle<()> {
    spawn_reporting("list_items", tx, async move {
        let result = api.list_items(query).await;
        AppEvent::ItemsLoaded { seq, query, result }
    })
}

pub(crate) fn spawn_create_feed(
    api: Arc<dyn FeedApi>,
    url: String,
    tx: mpsc::Sender<AppEvent>,
) -> JoinHandle<()> {
    spawn_reporting("create_feed", tx, async move {
        let result = api.create_feed(&url).await;
        AppEvent::FeedCreated { url, result }
    })
}

pub(crate) fn spawn_delete_feed(
    api: Arc<dyn FeedApi>,
    feed_id: FeedId,
    tx: mpsc::Sender<AppEvent>,
) -> JoinHandle<()> {
    spawn_reporting("delete_feed", tx, async move {
        let result = api.delete_feed(feed_id).await;
        AppEvent::FeedDeleted { feed_id, result }
    })
}

pub(crate) fn spawn_ingest_poll(
    api: Arc<dyn FeedApi>,
    url: String,
    policy: IngestPolicy,
    tx: mpsc::Sender<AppEvent>,
) -> JoinHandle<()> {
    spawn_reporting("ingest_poll", tx, async move {
        let outcome = await_ingest(api.as_ref(), &url, policy).await;
        AppEvent::IngestSettled { url, outcome }
    })
}
