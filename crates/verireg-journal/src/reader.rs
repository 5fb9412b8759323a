//! Journal reader implementation.

use crate::errors::JournalError;
use crate::frame::{FrameKind, JournalHeader, RecordFrame, FRAME_HEADER_SIZE, HEADER_SIZE};
use crate::record::JournalRecord;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// How the reader treats an incomplete final frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Truncated frames are errors.
    Strict,
    /// A truncated tail is treated as end-of-file.
    Permissive,
}

/// Sequential reader over a journal file.
///
/// [`position`](Self::position) only moves past complete frames, so after a
/// permissive read stops at a torn tail it is the length of the valid prefix.
///
/// # Example
///
/// ```rust,no_run
/// use verireg_journal::{JournalReader, ReadMode};
///
/// let mut reader = JournalReader::open("registry.vrj", ReadMode::Strict)?;
/// while let Some(record) = reader.read_record()? {
///     println!("{} {}", record.seq, record.entry.kind());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct JournalReader {
    input: BufReader<File>,
    mode: ReadMode,
    position: u64,
    file_len: u64,
}

impl JournalReader {
    /// Opens a journal and validates its header.
    pub fn open<P: AsRef<Path>>(path: P, mode: ReadMode) -> Result<Self, JournalError> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        let mut input = BufReader::new(file);

        let mut header = [0u8; HEADER_SIZE];
        input.read_exact(&mut header).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => {
                JournalError::InvalidHeader(format!("header too short: {} bytes", file_len))
            }
            _ => JournalError::Io(e),
        })?;
        JournalHeader::from_bytes(&header)?;

        Ok(Self {
            input,
            mode,
            position: HEADER_SIZE as u64,
            file_len,
        })
    }

    /// Offset just past the last complete frame read.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// File length observed when the reader was opened.
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// Reads the next frame.
    ///
    /// Returns `Ok(None)` at end-of-file, or at a torn tail in permissive mode.
    pub fn read_frame(&mut self) -> Result<Option<(FrameKind, Vec<u8>)>, JournalError> {
        if self.position >= self.file_len {
            return Ok(None);
        }
        let offset = self.position;

        let mut header = [0u8; FRAME_HEADER_SIZE];
        if !self.fill(&mut header)? {
            return self.truncated(offset);
        }
        let frame = RecordFrame::from_bytes(&header, offset)?;

        let mut payload = vec![0u8; frame.len as usize];
        if !self.fill(&mut payload)? {
            return self.truncated(offset);
        }

        self.position = offset + frame.total_len();
        Ok(Some((frame.kind, payload)))
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<bool, JournalError> {
        match self.input.read_exact(buf) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn truncated<T>(&mut self, offset: u64) -> Result<Option<T>, JournalError> {
        match self.mode {
            ReadMode::Permissive => {
                tracing::warn!(offset, "truncated journal tail ignored");
                // Nothing after a torn frame is trustworthy.
                self.file_len = offset;
                Ok(None)
            }
            ReadMode::Strict => Err(JournalError::TruncatedFrame { offset }),
        }
    }

    /// Reads the next ledger record, skipping unknown frame kinds.
    ///
    /// Linkage is not checked here; see [`verify_chain`](crate::verify_chain)
    /// and [`ChainHead::check`](crate::ChainHead::check).
    pub fn read_record(&mut self) -> Result<Option<JournalRecord>, JournalError> {
        loop {
            match self.read_frame()? {
                None => return Ok(None),
                Some((FrameKind::LedgerRecord, payload)) => {
                    let record: JournalRecord = serde_json::from_slice(&payload)?;
                    return Ok(Some(record));
                }
                Some((FrameKind::Unknown(kind), _)) => {
                    tracing::debug!(kind, offset = self.position, "skipping unknown frame kind");
                }
            }
        }
    }

    /// Reads every remaining record.
    pub fn read_all(&mut self) -> Result<Vec<JournalRecord>, JournalError> {
        let mut records = Vec::new();
        while let Some(record) = self.read_record()? {
            records.push(record);
        }
        Ok(records)
    }
}
