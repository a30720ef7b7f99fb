//! Progress reporting for CLI

use indicatif::{ProgressBar, ProgressStyle};

/// Progress reporter using indicatif
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Creates a progress bar counting `total` sectors
    pub fn for_sectors(total: u64, message: &str) -> Self {
        let bar = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} sectors ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        bar.set_message(message.to_string());

        Self { bar }
    }

    /// Advances by `sectors`
    pub fn advance(&self, sectors: u32) {
        self.bar.inc(sectors as u64);
    }

    /// Finishes with a message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}
