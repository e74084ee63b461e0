extern crate console;
extern crate env_logger;
#[macro_use]
extern crate failure;
extern crate indicatif;
#[macro_use]
extern crate log;
extern crate progress_io;
extern crate sha1;
extern crate structopt;

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Mutex;

use console::style;
use failure::Error;
use progress_io::{NamedFile, Reader, Stat};
use structopt::StructOpt;

mod utils;
use utils::hasher::WriteHasher;
use utils::progress::{finish_bar, observe_with_bar, progress_bar, SharedBar};

/// Copy a file to stdout while reporting read progress on stderr.
#[derive(StructOpt)]
#[structopt(name = "progress-cat", author = "")]
struct Opts {
    /// Name shown in progress reports, defaults to the file name
    #[structopt(long = "name")]
    name: Option<String>,
    /// Deliver progress from a background thread
    #[structopt(long = "async")]
    async_progress: bool,
    /// Bytes copied per step
    #[structopt(long = "chunk-size", default_value = "100")]
    chunk_size: u64,
    /// Draw a progress bar instead of progress lines
    #[structopt(long = "bar")]
    bar: bool,
    /// Print the SHA-1 of the content instead of the content
    #[structopt(long = "sha1")]
    sha1: bool,
    #[structopt(name = "FILE", parse(from_os_str))]
    file: PathBuf,
}

fn main() {
    env_logger::init();

    if let Err(err) = command(Opts::from_args()) {
        eprintln!("{} {}", style("error:").red().bold(), err);
        process::exit(1);
    }
}

fn command(opts: Opts) -> Result<(), Error> {
    if opts.chunk_size == 0 {
        bail!("--chunk-size must be greater than zero");
    }

    let file = NamedFile::open(&opts.file)
        .map_err(|err| format_err!("could not open {}: {}", opts.file.display(), err))?;
    let name = opts.name
        .clone()
        .unwrap_or_else(|| file.name().to_owned());

    let mut options = vec![progress_io::with_name(name.clone())];
    if opts.async_progress {
        options.push(progress_io::with_async());
    }
    let bar = if opts.bar {
        let bar = progress_bar(&name, file.stat()?.len);
        options.push(observe_with_bar(bar.clone()));
        Some(bar)
    } else {
        options.push(progress_io::with_logger(Mutex::new(io::stderr())));
        None
    };

    let mut reader = Reader::new(file, options)?;
    debug!("{:?}", reader);

    if opts.sha1 {
        let mut hasher = WriteHasher::new();
        copy_chunked(&mut reader, &mut hasher, opts.chunk_size)?;
        finish(reader, bar)?;
        println!("{}", hasher.digest_hex());
    } else {
        let mut buffer = Vec::new();
        copy_chunked(&mut reader, &mut buffer, opts.chunk_size)?;
        finish(reader, bar)?;
        let stdout = io::stdout();
        let mut out = stdout.lock();
        out.write_all(&buffer)?;
        out.flush()?;
    }

    Ok(())
}

fn copy_chunked<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    chunk_size: u64,
) -> Result<u64, Error> {
    let mut total = 0;
    loop {
        let n = io::copy(&mut reader.by_ref().take(chunk_size), writer)?;
        if n == 0 {
            return Ok(total);
        }
        total += n;
    }
}

fn finish(mut reader: Reader<NamedFile>, bar: Option<SharedBar>) -> Result<(), Error> {
    reader
        .close()
        .map_err(|err| format_err!("could not close {}: {}", reader.name(), err))?;
    if let Some(bar) = bar {
        finish_bar(&bar);
    }
    Ok(())
}
