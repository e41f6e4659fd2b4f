//! Webtoon Downloader - CLI entry point.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use webtoon_downloader::{
    api::{Fetcher, WebtoonClient},
    cli::Args,
    config::{validate_config, Config, DownloadOptions},
    download::{download_all_series, download_series, resume_series, GlobalState},
    episode::parse_series_url,
    error::{exit_codes, Error, ErrorKind, Result},
    output::{
        print_banner, print_config_summary, print_error, print_global_stats, print_info,
        print_series_stats, print_success, print_warning,
    },
    store::{ProgressStore, SqliteProgressStore},
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            ExitCode::from(exit_code(&e) as u8)
        }
    }
}

fn exit_code(error: &Error) -> i32 {
    match error {
        Error::Config(_)
        | Error::ConfigValidation { .. }
        | Error::MissingConfig(_)
        | Error::TomlParse(_) => exit_codes::CONFIG_ERROR,
        _ => match error.kind() {
            ErrorKind::User => exit_codes::USER_ERROR,
            ErrorKind::Structural => exit_codes::LAYOUT_ERROR,
            ErrorKind::Transient | ErrorKind::Encoding => exit_codes::DOWNLOAD_ERROR,
            ErrorKind::Internal => exit_codes::UNEXPECTED_ERROR,
        },
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    // Print banner
    print_banner();

    // Load configuration
    let config_path = args.config.clone();
    let mut config = if config_path.exists() {
        Config::load(&config_path)?
    } else {
        print_info(&format!(
            "Configuration file not found: {}, using defaults",
            config_path.display()
        ));
        Config::default()
    };

    let url = args.url.clone();
    let db_mode = args.db;
    let resume = args.resume;
    let save_config = args.save_config;
    let explicit = args.explicit_settings();

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);

    // Validate configuration
    validate_config(&config)?;

    if save_config {
        config.save(&config_path)?;
        print_info(&format!("Configuration saved to {}", config_path.display()));
    }

    let fetcher: Arc<dyn Fetcher> = Arc::new(WebtoonClient::new(&config.http.user_agent)?);
    let store: Arc<dyn ProgressStore> =
        Arc::new(SqliteProgressStore::open(&config.options.database_path).await?);

    if db_mode {
        return run_database(fetcher, store, &config).await;
    }

    let url = url.ok_or_else(|| Error::MissingConfig("series URL".into()))?;
    let mut options = DownloadOptions::from_config(&config, url.trim());

    if resume {
        let series = parse_series_url(&options.series_url)?;
        match store.get(&series.name, &series.lang).await? {
            Some(record) => {
                explicit.apply_progress(&mut options, &record);
                print_info(&format!(
                    "Resuming {} after episode {}",
                    series.name, record.last_chapter
                ));
            }
            None => print_warning(&format!(
                "No saved progress for {} ({}), starting from episode {}",
                series.name, series.lang, options.min_episode
            )),
        }
    }

    print_config_summary(
        &options.series_url,
        &episode_range(options.min_episode, options.max_episode),
        &format!(
            "{}, {} episode(s) per file",
            options.format, options.episodes_per_file
        ),
        &options.download_directory.display().to_string(),
    );

    let state = if resume {
        let name = parse_series_url(&options.series_url)?.name;
        match resume_series(fetcher, store, Arc::new(options)).await? {
            Some(state) => state,
            None => {
                print_success(&format!("{} is already up to date", name));
                return Ok(());
            }
        }
    } else {
        download_series(fetcher, Some(store), Arc::new(options)).await?
    };
    print_series_stats(&state);

    let mut global = GlobalState::default();
    global.add_series_stats(&state);
    finish(&global)
}

/// Update every series stored in the progress database.
async fn run_database(
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn ProgressStore>,
    config: &Config,
) -> Result<()> {
    let base = DownloadOptions::from_config(config, "");

    print_config_summary(
        &format!("every series in {}", config.options.database_path.display()),
        "from last recorded episode",
        "stored per series",
        &base.download_directory.display().to_string(),
    );

    let global = download_all_series(
        fetcher,
        store,
        &base,
        config.options.series_concurrency,
        config.options.max_series_concurrency,
    )
    .await?;

    print_global_stats(&global);
    finish(&global)
}

fn finish(global: &GlobalState) -> Result<()> {
    if global.all_failed() {
        return Err(Error::Download(format!(
            "nothing could be downloaded ({} file(s) failed)",
            global.batches_failed
        )));
    }

    if global.batches_failed > 0 || global.series_failed > 0 {
        print_warning("Finished with failures, see the log above");
    } else {
        print_success("All done");
    }
    Ok(())
}

fn episode_range(min: u32, max: u32) -> String {
    if max == u32::MAX {
        format!("{} onwards", min)
    } else {
        format!("{} to {}", min, max)
    }
}
