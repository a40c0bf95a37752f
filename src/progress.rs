//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche di ingestione.
//!
//! ## Responsabilità:
//! - Progress bar visual con `indicatif` per feedback real-time
//! - Tracking statistiche per tipo di asset (immagini, media, rifiutati, errori)
//! - Calcolo byte in ingresso/uscita e percentuale di riduzione
//! - Riepilogo finale su una singola riga
//!
//! ## Componenti principali:
//! - `ProgressManager`: Gestisce progress bar principale (nascosta in modalità JSON)
//! - `IngestStats`: Traccia statistiche cumulative del batch
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:03] [========================================] 12/12 (100%) photo.png -> 3F2A9C01B7DE.jpg
//! ```

use crate::file_manager::FileManager;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

/// Manages progress reporting for a batch
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// A manager that draws nothing (JSON mode, tests)
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Run `f` with the bar cleared so log lines are not overdrawn
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.bar.suspend(f)
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Statistics tracker for one ingestion run
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct IngestStats {
    pub files_found: usize,
    pub images_optimized: usize,
    pub media_copied: usize,
    pub files_rejected: usize,
    pub errors: usize,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl IngestStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_image(&mut self, original_size: u64, new_size: u64) {
        self.images_optimized += 1;
        self.bytes_in += original_size;
        self.bytes_out += new_size;
    }

    pub fn add_media(&mut self, size: u64) {
        self.media_copied += 1;
        self.bytes_in += size;
        self.bytes_out += size;
    }

    pub fn add_rejected(&mut self) {
        self.files_rejected += 1;
    }

    pub fn add_error(&mut self) {
        self.errors += 1;
    }

    /// Number of assets now living in the export directory
    pub fn exported(&self) -> usize {
        self.images_optimized + self.media_copied
    }

    pub fn overall_reduction_percent(&self) -> f64 {
        FileManager::calculate_reduction(self.bytes_in, self.bytes_out)
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Found: {} files | Images: {} | Media: {} | Unsupported: {} | Errors: {} | {} -> {} ({:.2}% saved)",
            self.files_found,
            self.images_optimized,
            self.media_copied,
            self.files_rejected,
            self.errors,
            FileManager::format_size(self.bytes_in),
            FileManager::format_size(self.bytes_out),
            self.overall_reduction_percent()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_accumulate() {
        let mut stats = IngestStats::new();
        stats.files_found = 4;
        stats.add_image(1000, 250);
        stats.add_media(500);
        stats.add_rejected();
        stats.add_error();

        assert_eq!(stats.exported(), 2);
        assert_eq!(stats.bytes_in, 1500);
        assert_eq!(stats.bytes_out, 750);
        assert_eq!(stats.overall_reduction_percent(), 50.0);
    }

    #[test]
    fn test_summary_mentions_counts() {
        let mut stats = IngestStats::new();
        stats.files_found = 1;
        stats.add_media(2048);
        let summary = stats.format_summary();
        assert!(summary.contains("Media: 1"));
        assert!(summary.contains("2.00 KB"));
    }

    #[test]
    fn test_hidden_progress_does_not_panic() {
        let progress = ProgressManager::hidden();
        progress.update("a.png");
        progress.suspend(|| ());
        progress.finish("done");
    }
}
