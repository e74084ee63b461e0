use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use log::Level;

/// A single progress report, produced for every observed read.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub name: String,
    pub read: u64,
    /// Total size of the source, `0` when unknown.
    pub size: u64,
    /// `read / size * 100`, not clamped. `0` when the size is unknown.
    pub progress: f64,
}

impl Progress {
    pub fn is_size_known(&self) -> bool {
        self.size > 0
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let width = digits(self.size);
        write!(
            f,
            "{}: {:06.2}({:>w$} / {:>w$})",
            self.name,
            self.progress,
            self.read,
            self.size,
            w = width
        )
    }
}

pub fn percentage(read: u64, size: u64) -> f64 {
    if size == 0 {
        return 0.0;
    }
    read as f64 / size as f64 * 100.0
}

fn digits(size: u64) -> usize {
    if size == 0 {
        return 1;
    }
    (1.0 + (size as f64).log10()) as usize
}

/// Read accounting shared between a reader and whoever holds its counter.
#[derive(Debug)]
pub struct Counter {
    name: String,
    read: Arc<AtomicU64>,
    size: u64,
}

impl Counter {
    pub fn new(name: String, size: u64) -> Counter {
        Counter {
            name,
            read: Arc::new(AtomicU64::new(0)),
            size,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn read(&self) -> u64 {
        self.read.load(Ordering::SeqCst)
    }

    pub fn handle(&self) -> Arc<AtomicU64> {
        self.read.clone()
    }

    pub fn advance(&self, delta: u64) -> Progress {
        let read = self.read.fetch_add(delta, Ordering::SeqCst) + delta;
        self.snapshot(read)
    }

    pub fn set(&self, position: u64) -> Progress {
        self.store(position);
        self.snapshot(position)
    }

    pub fn store(&self, position: u64) {
        self.read.store(position, Ordering::SeqCst);
    }

    fn snapshot(&self, read: u64) -> Progress {
        Progress {
            name: self.name.clone(),
            read,
            size: self.size,
            progress: percentage(read, self.size),
        }
    }
}

/// A line oriented sink for formatted progress reports.
pub trait Logger {
    fn printf(&self, args: fmt::Arguments);
}

impl Logger for Level {
    fn printf(&self, args: fmt::Arguments) {
        log!(*self, "{}", args);
    }
}

impl<W: Write> Logger for Mutex<W> {
    fn printf(&self, args: fmt::Arguments) {
        if let Ok(mut w) = self.lock() {
            let _ = writeln!(w, "{}", args);
        }
    }
}

impl<'a, L: Logger + ?Sized> Logger for &'a L {
    fn printf(&self, args: fmt::Arguments) {
        (**self).printf(args)
    }
}

impl<L: Logger + ?Sized> Logger for Arc<L> {
    fn printf(&self, args: fmt::Arguments) {
        (**self).printf(args)
    }
}
