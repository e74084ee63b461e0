use std::collections::VecDeque;
use std::error;
use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

/// Stat-like metadata of a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    pub name: Option<String>,
    pub len: u64,
}

pub trait Stat {
    fn stat(&self) -> io::Result<SourceInfo>;
}

/// Number of bytes still available from the source.
pub trait Length {
    fn len(&self) -> u64;
}

/// Positional read that does not move any cursor.
pub trait ReadAt {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize>;
}

/// Reads exactly one byte. End of stream is reported as `UnexpectedEof`.
pub trait ReadByte {
    fn read_byte(&mut self) -> io::Result<u8>;
}

pub trait Close {
    fn close(&mut self) -> io::Result<()>;
}

/// A readable stream together with the optional capabilities it exposes.
///
/// Every query defaults to `None`, so a minimal source only needs
/// `impl Source for MyReader {}` on top of its `Read` impl.
pub trait Source: Read {
    fn as_stat(&self) -> Option<&dyn Stat> {
        None
    }

    fn as_length(&self) -> Option<&dyn Length> {
        None
    }

    fn as_read_at(&self) -> Option<&dyn ReadAt> {
        None
    }

    fn as_seek(&mut self) -> Option<&mut dyn Seek> {
        None
    }

    fn as_read_byte(&mut self) -> Option<&mut dyn ReadByte> {
        None
    }

    fn as_close(&mut self) -> Option<&mut dyn Close> {
        None
    }
}

/// Probes a source for its name and total size.
///
/// Stat-like metadata wins over a plain length. Only a failing `stat`
/// is an error; missing capabilities yield `(None, 0)`.
pub fn detect<S: Source + ?Sized>(src: &S) -> io::Result<(Option<String>, u64)> {
    if let Some(stat) = src.as_stat() {
        let info = stat.stat()?;
        return Ok((info.name, info.len));
    }
    if let Some(length) = src.as_length() {
        return Ok((None, length.len()));
    }
    Ok((None, 0))
}

/// Inner error of the `io::Error` returned for an operation the wrapped
/// source cannot perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotSupported {
    operation: &'static str,
}

impl NotSupported {
    pub fn operation(&self) -> &'static str {
        self.operation
    }
}

impl fmt::Display for NotSupported {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: not implemented by the wrapped source", self.operation)
    }
}

impl error::Error for NotSupported {}

pub fn not_supported(operation: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, NotSupported { operation })
}

pub fn is_not_supported(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::Unsupported
        && err
            .get_ref()
            .map(|inner| inner.is::<NotSupported>())
            .unwrap_or(false)
}

fn read_one<R: Read + ?Sized>(r: &mut R) -> io::Result<u8> {
    let mut buf = [0u8; 1];
    match r.read(&mut buf)? {
        0 => Err(io::ErrorKind::UnexpectedEof.into()),
        _ => Ok(buf[0]),
    }
}

impl<T: AsRef<[u8]>> Length for Cursor<T> {
    fn len(&self) -> u64 {
        let total = self.get_ref().as_ref().len() as u64;
        total.saturating_sub(self.position())
    }
}

impl<T: AsRef<[u8]>> ReadAt for Cursor<T> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let data = self.get_ref().as_ref();
        if offset >= data.len() as u64 {
            return Ok(0);
        }
        let tail = &data[offset as usize..];
        let n = tail.len().min(buf.len());
        buf[..n].copy_from_slice(&tail[..n]);
        Ok(n)
    }
}

impl<T: AsRef<[u8]>> ReadByte for Cursor<T> {
    fn read_byte(&mut self) -> io::Result<u8> {
        read_one(self)
    }
}

impl<T: AsRef<[u8]>> Source for Cursor<T> {
    fn as_length(&self) -> Option<&dyn Length> {
        Some(self)
    }

    fn as_read_at(&self) -> Option<&dyn ReadAt> {
        Some(self)
    }

    fn as_seek(&mut self) -> Option<&mut dyn Seek> {
        Some(self)
    }

    fn as_read_byte(&mut self) -> Option<&mut dyn ReadByte> {
        Some(self)
    }
}

impl Length for VecDeque<u8> {
    fn len(&self) -> u64 {
        VecDeque::len(self) as u64
    }
}

impl ReadByte for VecDeque<u8> {
    fn read_byte(&mut self) -> io::Result<u8> {
        self.pop_front()
            .ok_or_else(|| io::ErrorKind::UnexpectedEof.into())
    }
}

impl Source for VecDeque<u8> {
    fn as_length(&self) -> Option<&dyn Length> {
        Some(self)
    }

    fn as_read_byte(&mut self) -> Option<&mut dyn ReadByte> {
        Some(self)
    }
}

impl<'a> Length for &'a [u8] {
    fn len(&self) -> u64 {
        <[u8]>::len(*self) as u64
    }
}

impl<'a> ReadByte for &'a [u8] {
    fn read_byte(&mut self) -> io::Result<u8> {
        read_one(self)
    }
}

impl<'a> Source for &'a [u8] {
    fn as_length(&self) -> Option<&dyn Length> {
        Some(self)
    }

    fn as_read_byte(&mut self) -> Option<&mut dyn ReadByte> {
        Some(self)
    }
}

impl Stat for File {
    fn stat(&self) -> io::Result<SourceInfo> {
        let metadata = self.metadata()?;
        Ok(SourceInfo {
            name: None,
            len: metadata.len(),
        })
    }
}

#[cfg(unix)]
impl ReadAt for File {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        ::std::os::unix::fs::FileExt::read_at(self, buf, offset)
    }
}

impl Source for File {
    fn as_stat(&self) -> Option<&dyn Stat> {
        Some(self)
    }

    #[cfg(unix)]
    fn as_read_at(&self) -> Option<&dyn ReadAt> {
        Some(self)
    }

    fn as_seek(&mut self) -> Option<&mut dyn Seek> {
        Some(self)
    }
}

/// A file that remembers the base name it was opened under.
#[derive(Debug)]
pub struct NamedFile {
    file: File,
    name: String,
}

impl NamedFile {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<NamedFile> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let name = path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Ok(NamedFile { file, name })
    }

    pub fn from_parts<N: Into<String>>(file: File, name: N) -> NamedFile {
        NamedFile {
            file,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn into_file(self) -> File {
        self.file
    }
}

impl Read for NamedFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for NamedFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl Stat for NamedFile {
    fn stat(&self) -> io::Result<SourceInfo> {
        let metadata = self.file.metadata()?;
        Ok(SourceInfo {
            name: Some(self.name.clone()),
            len: metadata.len(),
        })
    }
}

impl Source for NamedFile {
    fn as_stat(&self) -> Option<&dyn Stat> {
        Some(self)
    }

    #[cfg(unix)]
    fn as_read_at(&self) -> Option<&dyn ReadAt> {
        Some(&self.file)
    }

    fn as_seek(&mut self) -> Option<&mut dyn Seek> {
        Some(self)
    }
}

/// Exposes nothing but `Read` of the inner reader.
#[derive(Debug)]
pub struct ReadOnly<R>(pub R);

impl<R: Read> Read for ReadOnly<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<R: Read> Source for ReadOnly<R> {}

impl<S: Source + ?Sized> Source for Box<S> {
    fn as_stat(&self) -> Option<&dyn Stat> {
        (**self).as_stat()
    }

    fn as_length(&self) -> Option<&dyn Length> {
        (**self).as_length()
    }

    fn as_read_at(&self) -> Option<&dyn ReadAt> {
        (**self).as_read_at()
    }

    fn as_seek(&mut self) -> Option<&mut dyn Seek> {
        (**self).as_seek()
    }

    fn as_read_byte(&mut self) -> Option<&mut dyn ReadByte> {
        (**self).as_read_byte()
    }

    fn as_close(&mut self) -> Option<&mut dyn Close> {
        (**self).as_close()
    }
}
