//! Journal writer implementation.

use crate::errors::JournalError;
use crate::frame::{FrameKind, JournalHeader, RecordFrame, HEADER_SIZE};
use crate::record::JournalRecord;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Options for journal writing.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Whether to fsync after each append (default: true).
    pub sync: bool,
    /// Whether to create the file if it doesn't exist (default: true).
    pub create: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            sync: true,
            create: true,
        }
    }
}

/// Appends framed records to a journal file.
///
/// The writer does not check chain linkage; callers build records with
/// [`ChainHead`](crate::ChainHead). A failed append truncates the file back
/// to where the frame started, so a reader never sees half a record from
/// this writer.
///
/// # Example
///
/// ```rust,no_run
/// use verireg_canonical::{Canonicalizer, Identity};
/// use verireg_core::LedgerEntry;
/// use verireg_journal::{ChainHead, JournalWriter, WriteOptions};
///
/// let canonicalizer = Canonicalizer::new();
/// let genesis = LedgerEntry::Genesis { owner: Identity::parse("human:owner")? };
/// let record = ChainHead::new().seal(genesis, &canonicalizer)?;
///
/// let mut writer = JournalWriter::open("registry.vrj", WriteOptions::default())?;
/// writer.append_record(&record)?;
/// writer.finish()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct JournalWriter {
    file: File,
    sync: bool,
    len: u64,
}

impl JournalWriter {
    /// Opens or creates a journal file for appending.
    ///
    /// A new or empty file gets a header. An existing file must start with a
    /// valid header; writing continues at its end.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError`] if the file cannot be opened, is shorter than
    /// a header but not empty, or carries an invalid header.
    pub fn open<P: AsRef<Path>>(path: P, options: WriteOptions) -> Result<Self, JournalError> {
        let file = OpenOptions::new()
            .create(options.create)
            .read(true)
            .write(true)
            .open(path.as_ref())?;

        let mut writer = Self {
            file,
            sync: options.sync,
            len: 0,
        };

        let existing = writer.file.metadata()?.len();
        if existing == 0 {
            writer.write_header()?;
        } else if existing < HEADER_SIZE as u64 {
            return Err(JournalError::FileNotEmpty);
        } else {
            let mut header = [0u8; HEADER_SIZE];
            writer.file.seek(SeekFrom::Start(0))?;
            writer.file.read_exact(&mut header)?;
            JournalHeader::from_bytes(&header)?;
            writer.len = writer.file.seek(SeekFrom::End(0))?;
        }
        tracing::debug!(path = %path.as_ref().display(), len = writer.len, "journal opened for append");

        Ok(writer)
    }

    fn write_header(&mut self) -> Result<(), JournalError> {
        self.file.write_all(&JournalHeader::new().to_bytes())?;
        self.file.flush()?;
        if self.sync {
            self.file.sync_all()?;
        }
        self.len = HEADER_SIZE as u64;
        Ok(())
    }

    /// Current file length, i.e. the offset the next frame starts at.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// True when the journal holds a header and no frames.
    pub fn is_empty(&self) -> bool {
        self.len == HEADER_SIZE as u64
    }

    /// Appends one record as a `LedgerRecord` frame.
    pub fn append_record(&mut self, record: &JournalRecord) -> Result<(), JournalError> {
        let payload = serde_json::to_vec(record)?;
        self.append_raw(FrameKind::LedgerRecord, &payload)?;
        tracing::debug!(seq = record.seq, kind = %record.entry.kind(), "journal record appended");
        Ok(())
    }

    /// Appends a raw frame with the given kind and payload.
    pub fn append_raw(&mut self, kind: FrameKind, payload: &[u8]) -> Result<(), JournalError> {
        let frame = RecordFrame::new(kind, payload.len())?;
        let start = self.len;

        let written = self.write_frame(&frame, payload);
        if let Err(err) = written {
            // Never leave half a frame behind.
            if let Err(rollback) = self.truncate(start) {
                tracing::warn!(offset = start, error = %rollback, "failed to roll back partial frame");
            }
            return Err(err);
        }
        self.len = start + frame.total_len();
        Ok(())
    }

    fn write_frame(&mut self, frame: &RecordFrame, payload: &[u8]) -> Result<(), JournalError> {
        self.file.write_all(&frame.to_bytes())?;
        self.file.write_all(payload)?;
        self.file.flush()?;
        if self.sync {
            self.file.sync_data()?;
        }
        Ok(())
    }

    /// Cuts the file back to `len` bytes, dropping everything after it.
    ///
    /// Used to discard a torn tail found by a permissive read. `len` must not
    /// cut into the header.
    pub fn truncate(&mut self, len: u64) -> Result<(), JournalError> {
        if len < HEADER_SIZE as u64 {
            return Err(JournalError::InvalidHeader(format!(
                "cannot truncate to {} bytes, header is {}",
                len, HEADER_SIZE
            )));
        }
        self.file.set_len(len)?;
        self.file.seek(SeekFrom::Start(len))?;
        if self.sync {
            self.file.sync_all()?;
        }
        self.len = len;
        Ok(())
    }

    /// Flushes and closes the file.
    pub fn finish(mut self) -> Result<(), JournalError> {
        self.file.flush()?;
        if self.sync {
            self.file.sync_all()?;
        }
        Ok(())
    }
}

impl Drop for JournalWriter {
    fn drop(&mut self) {
        let _ = self.file.flush();
    }
}
