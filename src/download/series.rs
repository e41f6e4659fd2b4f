//! Series jobs: planning, the bounded batch pool and progress updates.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;

use crate::api::Fetcher;
use crate::config::DownloadOptions;
use crate::download::batch::save_batch;
use crate::download::plan::plan_series;
use crate::download::state::{BatchReport, BatchStatus, GlobalState, SeriesState};
use crate::episode::{is_viewer_url, parse_series_url, EpisodeBatch, SeriesInfo};
use crate::error::{Error, Result};
use crate::fs::{ensure_dir, get_output_path, get_series_folder};
use crate::output::{create_batch_bar, create_spinner};
use crate::store::{ProgressRecord, ProgressStore};

/// Run every batch of one series, at most `episode_concurrency` at a time.
///
/// Each batch runs in its own task. An error or a panic inside a batch is
/// logged and reported as [`BatchStatus::Failed`]; sibling batches carry on.
/// Returns once every batch has finished, in completion order.
pub async fn run_batches(
    fetcher: Arc<dyn Fetcher>,
    options: Arc<DownloadOptions>,
    series: &SeriesInfo,
    batches: Vec<EpisodeBatch>,
) -> Vec<BatchReport> {
    let bar = if options.show_progress {
        create_batch_bar(batches.len() as u64, &series.name)
    } else {
        ProgressBar::hidden()
    };

    let reports: Vec<BatchReport> = stream::iter(batches)
        .map(|batch| {
            let fetcher = fetcher.clone();
            let options = options.clone();
            let series = series.clone();
            let bar = bar.clone();
            async move {
                let report = run_batch_job(fetcher, options, series, batch).await;
                bar.inc(1);
                report
            }
        })
        .buffer_unordered(options.episode_concurrency.max(1))
        .collect()
        .await;

    bar.finish_and_clear();
    reports
}

async fn run_batch_job(
    fetcher: Arc<dyn Fetcher>,
    options: Arc<DownloadOptions>,
    series: SeriesInfo,
    batch: EpisodeBatch,
) -> BatchReport {
    let (min_episode, max_episode) = (batch.min_episode, batch.max_episode);

    let path = match get_output_path(&options.download_directory, &series, &batch, options.format)
    {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!(
                "{} episodes {}-{}: no usable output path: {}",
                series.name,
                min_episode,
                max_episode,
                e
            );
            return BatchReport {
                min_episode,
                max_episode,
                path: options.download_directory.clone(),
                status: BatchStatus::Failed(e.to_string()),
            };
        }
    };

    let job_path = path.clone();
    let job_series = series.clone();
    let handle = tokio::spawn(async move {
        save_batch(fetcher.as_ref(), &options, &job_series, &batch, &job_path).await
    });

    let status = match handle.await {
        Ok(Ok(status)) => status,
        Ok(Err(e)) => {
            tracing::warn!(
                "{} episodes {}-{} failed: {}",
                series.name,
                min_episode,
                max_episode,
                e
            );
            BatchStatus::Failed(e.to_string())
        }
        Err(e) => {
            tracing::error!(
                "{} episodes {}-{} crashed: {}",
                series.name,
                min_episode,
                max_episode,
                e
            );
            BatchStatus::Failed(Error::Worker(e.to_string()).to_string())
        }
    };

    BatchReport {
        min_episode,
        max_episode,
        path,
        status,
    }
}

/// Download one series end to end and record its progress.
///
/// Planning errors (bad URL, empty range, changed page layout, unreachable
/// episode page) fail the whole series. Batch errors do not; they show up in
/// the returned state. Progress is written for listing URLs only, up to the
/// last episode of the leading run of complete batches.
pub async fn download_series(
    fetcher: Arc<dyn Fetcher>,
    store: Option<Arc<dyn ProgressStore>>,
    options: Arc<DownloadOptions>,
) -> Result<SeriesState> {
    let series = parse_series_url(&options.series_url)?;
    ensure_dir(&get_series_folder(&options.download_directory, &series)?)?;

    tracing::info!("Downloading {} ({})", series.name, series.lang);

    let spinner = options
        .show_progress
        .then(|| create_spinner(&format!("Looking up episodes of {}...", series.name)));
    let planned = plan_series(fetcher.as_ref(), &options).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let batches = planned?;

    tracing::info!("{}: {} files to produce", series.name, batches.len());

    let mut state = SeriesState::new(&series.name, &series.lang);
    for report in run_batches(fetcher, options.clone(), &series, batches).await {
        state.record(report);
    }

    if let Some(store) = store {
        record_progress(store.as_ref(), &options, &series, &state).await;
    }

    Ok(state)
}

/// Continue a stored series, treating an empty episode range as nothing left
/// to do.
///
/// Returns `None` when the series has no episode past `options.min_episode`.
pub async fn resume_series(
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn ProgressStore>,
    options: Arc<DownloadOptions>,
) -> Result<Option<SeriesState>> {
    let from = options.min_episode;
    match download_series(fetcher, Some(store), options).await {
        Ok(state) => Ok(Some(state)),
        Err(Error::NoEpisodesInRange { .. }) => {
            tracing::info!("No episode from {} onwards, nothing to resume", from);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

async fn record_progress(
    store: &dyn ProgressStore,
    options: &DownloadOptions,
    series: &SeriesInfo,
    state: &SeriesState,
) {
    if is_viewer_url(&options.series_url) {
        tracing::debug!("Single episode run, progress left unchanged");
        return;
    }

    let Some(last_chapter) = state.last_completed_episode() else {
        tracing::debug!("No leading batch completed for {}, progress left unchanged", series.name);
        return;
    };

    let record = ProgressRecord {
        series: series.name.clone(),
        lang: series.lang.clone(),
        url: options.series_url.clone(),
        last_chapter,
        episodes_per_file: options.episodes_per_file,
        format: options.format,
        updated_at: Utc::now(),
    };

    match store.upsert(&record).await {
        Ok(()) => tracing::debug!("{} progress saved at episode {}", series.name, last_chapter),
        Err(e) => tracing::warn!("Could not save progress of {}: {}", series.name, e),
    }
}

type SeriesOutcome = std::result::Result<Result<SeriesState>, tokio::task::JoinError>;

/// Download every series stored in the progress store, continuing each from
/// its last recorded episode with its stored preferences.
///
/// At most `series_concurrency` series run at once, or all of them when
/// `unbounded` is set. A failing or crashing series is logged and counted;
/// the others keep going. A fatal error (page layout) stops every series
/// that has not started yet; the running ones finish, then the run ends with
/// that error.
pub async fn download_all_series(
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn ProgressStore>,
    base: &DownloadOptions,
    series_concurrency: usize,
    unbounded: bool,
) -> Result<GlobalState> {
    let records = store.list().await?;
    let mut global = GlobalState::default();

    if records.is_empty() {
        tracing::info!("No series stored in the progress database");
        return Ok(global);
    }

    let limit = if unbounded {
        records.len()
    } else {
        series_concurrency.max(1)
    };
    tracing::info!(
        "Updating {} series, {} at a time",
        records.len(),
        limit
    );

    let halted = Arc::new(AtomicBool::new(false));
    let results: Vec<(ProgressRecord, Option<SeriesOutcome>)> = stream::iter(records)
        .map(|record| {
            let fetcher = fetcher.clone();
            let store = store.clone();
            let halted = halted.clone();
            let mut options = base.for_series(
                record.url.clone(),
                record.last_chapter.saturating_add(1),
                record.episodes_per_file,
                record.format,
            );
            options.show_progress = base.show_progress && limit == 1;
            async move {
                if halted.load(Ordering::SeqCst) {
                    return (record, None);
                }
                let result =
                    tokio::spawn(download_series(fetcher, Some(store), Arc::new(options))).await;
                if matches!(&result, Ok(Err(e)) if e.is_fatal()) {
                    halted.store(true, Ordering::SeqCst);
                }
                (record, Some(result))
            }
        })
        .buffer_unordered(limit)
        .collect()
        .await;

    let mut fatal: Option<Error> = None;
    for (record, result) in results {
        let Some(result) = result else {
            tracing::info!(
                "{} ({}) not started, run halted",
                record.series,
                record.lang
            );
            continue;
        };
        match result {
            Ok(Ok(state)) => {
                tracing::info!(
                    "{} ({}): {} saved, {} skipped, {} failed",
                    record.series,
                    record.lang,
                    state.saved_count(),
                    state.skipped_count(),
                    state.failed_count()
                );
                global.add_series_stats(&state);
            }
            Ok(Err(Error::NoEpisodesInRange { .. })) => {
                tracing::info!(
                    "{} ({}) is up to date at episode {}",
                    record.series,
                    record.lang,
                    record.last_chapter
                );
                global.mark_series_up_to_date();
            }
            Ok(Err(e)) => {
                tracing::warn!("{} ({}) failed: {}", record.series, record.lang, e);
                global.mark_series_failed();
                if e.is_fatal() && fatal.is_none() {
                    fatal = Some(e);
                }
            }
            Err(e) => {
                tracing::error!("{} ({}) crashed: {}", record.series, record.lang, e);
                global.mark_series_failed();
            }
        }
    }

    match fatal {
        Some(e) => Err(e),
        None => Ok(global),
    }
}
