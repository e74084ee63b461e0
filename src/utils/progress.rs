use std::sync::{Arc, Mutex};

use indicatif::{ProgressBar, ProgressStyle};
use progress_io::{self, Progress, ReaderOption};

pub type SharedBar = Arc<Mutex<ProgressBar>>;

pub fn progress_bar(name: &str, total: u64) -> SharedBar {
    let bar = ProgressBar::new(total);
    bar.set_message(name);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg:>12.cyan.bold} {bytes} / {total_bytes} [{wide_bar}] {percent}%  ")
            .progress_chars("=>-"),
    );
    Arc::new(Mutex::new(bar))
}

pub fn observe_with_bar(bar: SharedBar) -> ReaderOption {
    progress_io::with_func(move |progress: Progress| {
        if let Ok(bar) = bar.lock() {
            bar.set_position(progress.read);
        }
    })
}

pub fn finish_bar(bar: &SharedBar) {
    if let Ok(bar) = bar.lock() {
        bar.finish_and_clear();
    }
}
