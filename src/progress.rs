use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use indicatif::{HumanDuration, ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::controller::RefreshOutcome;

/// Spinner on stderr while the feed reloads. A no-op when disabled.
pub struct Progress {
    enabled: bool,
    start: Instant,
    bar: ProgressBar,
    loaded: AtomicU64,
    failed: AtomicU64,
}

impl Progress {
    pub fn new(enabled: bool) -> Self {
        let bar = if enabled {
            let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
            let style = ProgressStyle::with_template("{spinner} {msg}  [{elapsed_precise}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner());
            bar.set_style(style);
            bar
        } else {
            ProgressBar::hidden()
        };

        Self {
            enabled,
            start: Instant::now(),
            bar,
            loaded: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    pub fn loading(&self) {
        if !self.enabled {
            return;
        }
        self.bar.enable_steady_tick(Duration::from_millis(80));
        self.bar.set_message("loading posts");
    }

    pub fn record(&self, outcome: RefreshOutcome) {
        match outcome {
            RefreshOutcome::Loaded(_) => {
                self.loaded.fetch_add(1, Ordering::Relaxed);
            }
            RefreshOutcome::Failed => {
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
            RefreshOutcome::Skipped => {}
        }
        if !self.enabled {
            return;
        }
        self.bar.disable_steady_tick();
        let label = match outcome {
            RefreshOutcome::Loaded(count) => format!("{count} posts"),
            RefreshOutcome::Failed => "load failed".to_string(),
            RefreshOutcome::Skipped => "reload in flight".to_string(),
        };
        self.bar.set_message(format!(
            "{label} | reloads ok {} failed {}",
            self.loaded.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed),
        ));
        self.bar.tick();
    }

    pub fn finish(&self) {
        if !self.enabled {
            return;
        }
        self.bar.finish_and_clear();
        self.bar.println(format!(
            "Done in {}",
            HumanDuration(self.start.elapsed())
        ));
    }
}
