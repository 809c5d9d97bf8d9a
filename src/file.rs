//! Append targets
//!
//! The durable destination a [`LogWriter`](crate::log::LogWriter) frames
//! records into. The writer owns its target exclusively for its lifetime.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// An append-only byte sink
///
/// Failures are opaque I/O errors; callers never interpret them.
pub trait WritableFile {
    /// Append `data` at the end of the target
    fn append(&mut self, data: &[u8]) -> io::Result<()>;

    /// Push buffered bytes down to the OS
    fn flush(&mut self) -> io::Result<()>;

    /// Force appended bytes to stable storage
    fn sync(&mut self) -> io::Result<()> {
        self.flush()
    }
}

/// In-memory target, mostly useful for tests and for staging records
impl WritableFile for Vec<u8> {
    fn append(&mut self, data: &[u8]) -> io::Result<()> {
        self.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W: WritableFile + ?Sized> WritableFile for &mut W {
    fn append(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).append(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn sync(&mut self) -> io::Result<()> {
        (**self).sync()
    }
}

/// A buffered file opened in append mode
pub struct FileSink {
    /// Path the sink was opened from
    path: PathBuf,
    /// Buffered writer for performance
    writer: BufWriter<File>,
}

impl FileSink {
    /// Open or create `path` for appending
    ///
    /// Returns the sink together with the file's current length, which a log
    /// writer needs to resume inside a partially filled block.
    pub fn open(path: &Path) -> io::Result<(Self, u64)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        let length = file.metadata()?.len();

        Ok((
            Self {
                path: path.to_path_buf(),
                writer: BufWriter::new(file),
            },
            length,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WritableFile for FileSink {
    fn append(&mut self, data: &[u8]) -> io::Result<()> {
        self.writer.write_all(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn sync(&mut self) -> io::Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_data()
    }
}
