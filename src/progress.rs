use indicatif::{ProgressBar, ProgressStyle};

pub struct StressProgress {
    bar: ProgressBar,
    enabled: bool,
}

impl StressProgress {
    pub fn new(enabled: bool, total: u64) -> Self {
        if !enabled {
            return Self {
                bar: ProgressBar::hidden(),
                enabled: false,
            };
        }

        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        Self { bar, enabled: true }
    }

    pub fn update(&self, inserted: u64, threads: usize) {
        if self.enabled {
            self.bar.set_position(inserted);
            self.bar.set_message(format!("inserts across {} threads", threads));
        }
    }

    pub fn finish(&self) {
        if self.enabled {
            // Updates are batched, so the last partial batch never lands.
            self.bar.set_position(self.bar.length().unwrap_or(0));
            self.bar.finish_and_clear();
        }
    }
}
