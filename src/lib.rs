extern crate failure;
#[macro_use]
extern crate log;

pub mod capability;
pub mod delivery;
pub mod progress;
mod reader;

pub use capability::{is_not_supported, Close, Length, NamedFile, NotSupported, ReadAt, ReadByte,
                     ReadOnly, Source, SourceInfo, Stat};
pub use delivery::{ProgressFn, QUEUE_CAPACITY};
pub use progress::{Logger, Progress};
pub use reader::{with_async, with_default_logger, with_func, with_logger, with_name, Options,
                 Reader, ReaderOption};
