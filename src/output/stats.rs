//! Statistics reporting.

use console::style;

use crate::download::{BatchStatus, GlobalState, SeriesState};

/// Print statistics for a single series.
pub fn print_series_stats(state: &SeriesState) {
    println!();
    println!(
        "{}",
        style(format!(
            "Statistics for {} ({}):",
            state.series_name, state.lang
        ))
        .bold()
    );
    println!("  Saved:    {} files", state.saved_count());
    println!("  Skipped:  {} (already on disk)", state.skipped_count());
    if state.failed_count() > 0 {
        println!("  Failed:   {}", style(state.failed_count()).red());
        for report in &state.reports {
            if let BatchStatus::Failed(reason) = &report.status {
                println!(
                    "    episodes {}-{}: {}",
                    report.min_episode,
                    report.max_episode,
                    style(reason).dim()
                );
            }
        }
    }
    println!("  Pages:    {} written", state.pages_written());
    if state.animated_skipped() > 0 {
        println!("  Animated: {} left out", state.animated_skipped());
    }
}

/// Print global statistics across all series.
pub fn print_global_stats(state: &GlobalState) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Global Statistics:").bold());
    println!("  Series processed: {}", state.series_processed);
    println!("  Series up to date: {}", state.series_up_to_date);
    if state.series_failed > 0 {
        println!("  Series failed:    {}", style(state.series_failed).red());
    }
    println!("  Files saved:   {}", state.batches_saved);
    println!("  Files skipped: {}", state.batches_skipped);
    if state.batches_failed > 0 {
        println!("  Files failed:  {}", style(state.batches_failed).red());
    }
    println!("  Pages written: {}", state.pages_written);
    println!("{}", style("═".repeat(50)).dim());
}
