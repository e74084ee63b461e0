use std::any;
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use failure::Error;
use log::Level;

use capability::{self, Close, ReadAt, ReadByte, Source};
use delivery::{Delivery, ProgressFn};
use progress::{Counter, Logger, Progress};

/// Settings applied, in order, while a `Reader` is being built.
pub struct Options {
    pub name: String,
    pub on_progress: ProgressFn,
    pub async_progress: bool,
}

pub type ReaderOption = Box<dyn FnOnce(&mut Options) -> Result<(), Error>>;

pub fn with_name<N: Into<String>>(name: N) -> ReaderOption {
    let name = name.into();
    Box::new(move |opts: &mut Options| {
        opts.name = name;
        Ok(())
    })
}

pub fn with_async() -> ReaderOption {
    Box::new(|opts: &mut Options| {
        opts.async_progress = true;
        Ok(())
    })
}

pub fn with_func<F>(f: F) -> ReaderOption
where
    F: Fn(Progress) + Send + Sync + 'static,
{
    Box::new(move |opts: &mut Options| {
        opts.on_progress = Arc::new(f);
        Ok(())
    })
}

/// Reports every snapshot as `name: percent(read / size)` through `logger`.
pub fn with_logger<L>(logger: L) -> ReaderOption
where
    L: Logger + Send + Sync + 'static,
{
    with_func(move |progress: Progress| logger.printf(format_args!("{}", progress)))
}

/// Like `with_logger`, logging through the `log` facade at info level.
pub fn with_default_logger() -> ReaderOption {
    with_logger(Level::Info)
}

static SEQUENCE: AtomicUsize = AtomicUsize::new(0);

fn default_name<S>() -> String {
    let type_name = any::type_name::<S>();
    let short = type_name
        .split('<')
        .next()
        .and_then(|path| path.rsplit("::").next())
        .unwrap_or(type_name);
    format!("{}#{}", short, SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

/// Wraps a source and reports how far it has been read.
///
/// The data returned by every operation is exactly what the wrapped source
/// returns. Operations the source does not support fail with an error
/// recognised by `capability::is_not_supported`.
pub struct Reader<S: Source> {
    src: S,
    counter: Counter,
    delivery: Delivery,
}

impl<S: Source> Reader<S> {
    pub fn new<I>(src: S, options: I) -> Result<Reader<S>, Error>
    where
        I: IntoIterator<Item = ReaderOption>,
    {
        let (detected_name, size) = capability::detect(&src)?;

        let mut opts = Options {
            name: detected_name.unwrap_or_else(default_name::<S>),
            on_progress: Arc::new(|_: Progress| {}),
            async_progress: false,
        };
        for option in options {
            option(&mut opts)?;
        }

        let delivery = if opts.async_progress {
            Delivery::spawn(&opts.name, opts.on_progress)?
        } else {
            Delivery::sync(opts.on_progress)
        };
        debug!(
            "reading {} (size {}, async {})",
            opts.name,
            size,
            delivery.is_async()
        );

        Ok(Reader {
            src,
            counter: Counter::new(opts.name, size),
            delivery,
        })
    }

    pub fn name(&self) -> &str {
        self.counter.name()
    }

    /// Total size found when the reader was built, `0` if unknown.
    pub fn size(&self) -> u64 {
        self.counter.size()
    }

    pub fn position(&self) -> u64 {
        self.counter.read()
    }

    /// Shared handle to the read counter, usable from other threads.
    pub fn bytes_read(&self) -> Arc<AtomicU64> {
        self.counter.handle()
    }

    pub fn is_async(&self) -> bool {
        self.delivery.is_async()
    }

    pub fn get_ref(&self) -> &S {
        &self.src
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.src
    }

    /// Positional read. The counter is set to `offset + n`, not added to.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let ra = match self.src.as_read_at() {
            Some(ra) => ra,
            None => return Err(capability::not_supported("read_at")),
        };
        let n = ra.read_at(buf, offset)?;
        self.emit(self.counter.set(offset.saturating_add(n as u64)));
        Ok(n)
    }

    pub fn read_byte(&mut self) -> io::Result<u8> {
        let native = match self.src.as_read_byte() {
            Some(br) => Some(br.read_byte()?),
            None => None,
        };
        match native {
            Some(b) => {
                self.emit(self.counter.advance(1));
                Ok(b)
            }
            None => {
                let mut buf = [0u8; 1];
                match self.read(&mut buf)? {
                    0 => Err(io::ErrorKind::UnexpectedEof.into()),
                    _ => Ok(buf[0]),
                }
            }
        }
    }

    /// Stops progress delivery, waiting for queued snapshots, then closes
    /// the source if it can be closed.
    pub fn close(&mut self) -> io::Result<()> {
        debug!("closing {} at {}", self.name(), self.position());
        let drained = self.delivery.shutdown();
        if let Some(closer) = self.src.as_close() {
            closer.close()?;
        }
        drained
    }

    fn emit(&self, progress: Progress) {
        trace!("{}", progress);
        self.delivery.deliver(progress);
    }
}

impl<S: Source> Read for Reader<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.src.read(buf)?;
        self.emit(self.counter.advance(n as u64));
        Ok(n)
    }
}

/// Moves the counter to the new position without reporting progress.
impl<S: Source> Seek for Reader<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let position = match self.src.as_seek() {
            Some(seeker) => seeker.seek(pos)?,
            None => return Err(capability::not_supported("seek")),
        };
        self.counter.store(position);
        Ok(position)
    }
}

impl<S: Source> ReadAt for Reader<S> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        Reader::read_at(self, buf, offset)
    }
}

impl<S: Source> ReadByte for Reader<S> {
    fn read_byte(&mut self) -> io::Result<u8> {
        Reader::read_byte(self)
    }
}

impl<S: Source> Close for Reader<S> {
    fn close(&mut self) -> io::Result<()> {
        Reader::close(self)
    }
}

impl<S: Source> Source for Reader<S> {
    fn as_read_at(&self) -> Option<&dyn ReadAt> {
        Some(self)
    }

    fn as_seek(&mut self) -> Option<&mut dyn Seek> {
        Some(self)
    }

    fn as_read_byte(&mut self) -> Option<&mut dyn ReadByte> {
        Some(self)
    }

    fn as_close(&mut self) -> Option<&mut dyn Close> {
        Some(self)
    }
}

impl<S: Source> fmt::Debug for Reader<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Reader")
            .field("name", &self.name())
            .field("read", &self.position())
            .field("size", &self.size())
            .field("async", &self.is_async())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capability::ReadOnly;
    use std::io::Cursor;

    #[test]
    fn default_name_is_short_type_name() {
        let reader = Reader::new(ReadOnly(&b"abc"[..]), Vec::new()).unwrap();
        assert!(reader.name().starts_with("ReadOnly#"), "{}", reader.name());
    }

    #[test]
    fn options_apply_in_order() {
        let reader = Reader::new(
            Cursor::new(Vec::new()),
            vec![with_name("first"), with_name("second")],
        ).unwrap();
        assert_eq!(reader.name(), "second");
        assert!(!reader.is_async());
    }

    #[test]
    fn default_logger_does_not_alter_data() {
        let mut reader = Reader::new(&b"abc"[..], vec![with_default_logger()]).unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"abc");
        assert_eq!(reader.position(), 3);
    }
}
