//! Terminal progress bars for bundle downloads.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use skyport::progress::{Indicator, IndicatorFactory};

/// Creates one byte-styled bar per downloading bundle, stacked under a
/// shared [`MultiProgress`].
pub struct BarFactory {
    multi: MultiProgress,
}

impl BarFactory {
    /// Create a factory rendering to stderr.
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:24} {bar:32.cyan/blue} {bytes:>10}/{total_bytes:10}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }
}

impl Default for BarFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorFactory for BarFactory {
    fn create(&self, name: &str, total: u64, downloaded: u64) -> Box<dyn Indicator> {
        let bar = self.multi.add(ProgressBar::new(total));
        bar.set_style(Self::style());
        bar.set_message(name.to_string());
        bar.set_position(downloaded);
        Box::new(Bar(bar))
    }
}

struct Bar(ProgressBar);

impl Indicator for Bar {
    fn update(&self, downloaded: u64) {
        self.0.set_position(downloaded);
    }

    fn finish(&self) {
        self.0.finish_and_clear();
    }
}
