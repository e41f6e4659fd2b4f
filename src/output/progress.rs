//! Progress bar utilities.

use indicatif::{ProgressBar, ProgressStyle};

/// Create a spinner for long-running operations.
pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}

/// Create a progress bar counting finished batches of a series.
pub fn create_batch_bar(total: u64, series_name: &str) -> ProgressBar {
    let bar = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} files ({eta})")
    {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar.set_message(series_name.to_string());
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_bar_length() {
        let bar = create_batch_bar(7, "tower-of-god");
        assert_eq!(bar.length(), Some(7));
        bar.inc(2);
        assert_eq!(bar.position(), 2);
    }

    #[test]
    fn test_batch_bar_braces_in_name() {
        let bar = create_batch_bar(1, "{weird}");
        assert_eq!(bar.length(), Some(1));
    }
}
