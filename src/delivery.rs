use std::io;
use std::sync::mpsc::{self, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use progress::Progress;

pub type ProgressFn = Arc<dyn Fn(Progress) + Send + Sync>;

/// Snapshots queued ahead of the worker before readers start to block.
pub const QUEUE_CAPACITY: usize = 10;

pub enum Delivery {
    /// The callback runs on the reading thread.
    Sync(ProgressFn),
    /// The callback runs on a dedicated worker fed by a bounded queue.
    Async {
        sender: Option<SyncSender<Progress>>,
        worker: Option<JoinHandle<()>>,
    },
}

impl Delivery {
    pub fn sync(on_progress: ProgressFn) -> Delivery {
        Delivery::Sync(on_progress)
    }

    pub fn spawn(name: &str, on_progress: ProgressFn) -> io::Result<Delivery> {
        let (sender, receiver) = mpsc::sync_channel::<Progress>(QUEUE_CAPACITY);
        let worker = thread::Builder::new()
            .name(format!("progress {}", name.replace('\0', "")))
            .spawn(move || {
                for progress in receiver {
                    on_progress(progress);
                }
                trace!("progress queue closed");
            })?;
        Ok(Delivery::Async {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    pub fn is_async(&self) -> bool {
        match *self {
            Delivery::Sync(_) => false,
            Delivery::Async { .. } => true,
        }
    }

    /// Hands a snapshot to the callback, blocking while the queue is full.
    pub fn deliver(&self, progress: Progress) {
        match *self {
            Delivery::Sync(ref on_progress) => on_progress(progress),
            Delivery::Async {
                sender: Some(ref sender),
                ..
            } => {
                if sender.send(progress).is_err() {
                    debug!("progress worker is gone, snapshot discarded");
                }
            }
            Delivery::Async { sender: None, .. } => {
                trace!("progress queue already closed, snapshot discarded");
            }
        }
    }

    /// Closes the queue and waits for the worker to drain it.
    pub fn shutdown(&mut self) -> io::Result<()> {
        if let Delivery::Async {
            ref mut sender,
            ref mut worker,
        } = *self
        {
            drop(sender.take());
            if let Some(worker) = worker.take() {
                if worker.join().is_err() {
                    return Err(io::Error::new(
                        io::ErrorKind::Other,
                        "progress callback panicked",
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Drop for Delivery {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn snapshot(read: u64) -> Progress {
        Progress {
            name: "test".into(),
            read,
            size: 0,
            progress: 0.0,
        }
    }

    #[test]
    fn async_delivery_drains_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut delivery = Delivery::spawn(
            "test",
            Arc::new(move |p: Progress| sink.lock().unwrap().push(p.read)),
        ).unwrap();
        assert!(delivery.is_async());

        for read in 1..(QUEUE_CAPACITY as u64 * 3) {
            delivery.deliver(snapshot(read));
        }
        delivery.shutdown().unwrap();

        let seen = seen.lock().unwrap();
        let expected: Vec<u64> = (1..(QUEUE_CAPACITY as u64 * 3)).collect();
        assert_eq!(*seen, expected);
    }

    #[test]
    fn full_queue_blocks_instead_of_dropping() {
        let (release, gate) = mpsc::channel::<()>();
        let gate = Mutex::new(gate);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let delivery = Delivery::spawn(
            "test",
            Arc::new(move |p: Progress| {
                gate.lock().unwrap().recv().unwrap();
                sink.lock().unwrap().push(p.read);
            }),
        ).unwrap();

        let total = QUEUE_CAPACITY as u64 * 2;
        let pushed = Arc::new(AtomicUsize::new(0));
        let counter = pushed.clone();
        let producer = thread::spawn(move || {
            for read in 1..(total + 1) {
                delivery.deliver(snapshot(read));
                counter.fetch_add(1, Ordering::SeqCst);
            }
            delivery
        });

        // One snapshot held by the blocked callback, the rest queued.
        thread::sleep(Duration::from_millis(300));
        assert_eq!(pushed.load(Ordering::SeqCst), QUEUE_CAPACITY + 1);
        assert!(seen.lock().unwrap().is_empty());

        for _ in 0..total {
            release.send(()).unwrap();
        }
        let mut delivery = producer.join().unwrap();
        delivery.shutdown().unwrap();

        let expected: Vec<u64> = (1..(total + 1)).collect();
        assert_eq!(*seen.lock().unwrap(), expected);
    }

    #[test]
    fn nul_in_name_does_not_break_spawn() {
        let mut delivery = Delivery::spawn("a\0b", Arc::new(|_: Progress| {})).unwrap();
        delivery.deliver(snapshot(1));
        delivery.shutdown().unwrap();
    }

    #[test]
    fn delivery_after_shutdown_is_discarded() {
        let seen = Arc::new(Mutex::new(0));
        let sink = seen.clone();
        let mut delivery = Delivery::spawn(
            "test",
            Arc::new(move |_: Progress| *sink.lock().unwrap() += 1),
        ).unwrap();
        delivery.deliver(snapshot(1));
        delivery.shutdown().unwrap();
        delivery.deliver(snapshot(2));
        delivery.shutdown().unwrap();
        assert_eq!(*seen.lock().unwrap(), 1);
    }

    #[test]
    fn panicking_callback_is_reported_on_shutdown() {
        let mut delivery = Delivery::spawn(
            "test",
            Arc::new(|_: Progress| panic!("boom")),
        ).unwrap();
        delivery.deliver(snapshot(1));
        assert!(delivery.shutdown().is_err());
    }
}
