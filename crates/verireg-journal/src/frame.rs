use crate::errors::JournalError;

/// Journal file magic bytes: `b"VRJ1"`.
pub const MAGIC: &[u8; 4] = b"VRJ1";

/// Current journal format version.
pub const VERSION: u16 = 0x0001;

/// File header size in bytes.
pub const HEADER_SIZE: usize = 16;

/// Frame header size in bytes.
pub const FRAME_HEADER_SIZE: usize = 8;

/// Largest payload a single frame may carry: 1 MiB.
pub const MAX_PAYLOAD_SIZE: u32 = 1024 * 1024;

/// Frame kind byte for a JSON-encoded `JournalRecord`.
pub const FRAME_KIND_LEDGER_RECORD: u8 = 0x01;

/// Journal file header.
///
/// Layout: magic (4) | version u16 LE (2) | flags u16 LE (2) | reserved (8).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalHeader {
    /// Format version.
    pub version: u16,
    /// Reserved flags, always 0 in this version.
    pub flags: u16,
}

impl JournalHeader {
    /// Header for the current format version.
    pub fn new() -> Self {
        Self {
            version: VERSION,
            flags: 0,
        }
    }

    /// Encodes the header.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(MAGIC);
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.flags.to_le_bytes());
        bytes
    }

    /// Decodes and validates a header.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, JournalError> {
        if bytes.len() < HEADER_SIZE {
            return Err(JournalError::InvalidHeader(format!(
                "header too short: {} bytes",
                bytes.len()
            )));
        }
        if &bytes[0..4] != MAGIC {
            return Err(JournalError::InvalidHeader(format!(
                "invalid magic: {:?}, expected {:?}",
                &bytes[0..4],
                MAGIC
            )));
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != VERSION {
            return Err(JournalError::InvalidHeader(format!(
                "unsupported version: 0x{:04x}, expected 0x{:04x}",
                version, VERSION
            )));
        }
        let flags = u16::from_le_bytes([bytes[6], bytes[7]]);
        if flags != 0 {
            return Err(JournalError::InvalidHeader(format!(
                "non-zero flags: 0x{:04x}",
                flags
            )));
        }
        if bytes[8..HEADER_SIZE].iter().any(|b| *b != 0) {
            return Err(JournalError::InvalidHeader(
                "non-zero reserved bytes".to_string(),
            ));
        }

        Ok(Self { version, flags })
    }
}

impl Default for JournalHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Record frame kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// UTF-8 JSON `JournalRecord`.
    LedgerRecord,
    /// Kind this version does not understand; readers skip it.
    Unknown(u8),
}

impl FrameKind {
    /// Decodes a kind byte.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            FRAME_KIND_LEDGER_RECORD => FrameKind::LedgerRecord,
            other => FrameKind::Unknown(other),
        }
    }

    /// Encodes the kind byte.
    pub fn to_byte(self) -> u8 {
        match self {
            FrameKind::LedgerRecord => FRAME_KIND_LEDGER_RECORD,
            FrameKind::Unknown(b) => b,
        }
    }
}

/// Record frame header.
///
/// Layout: kind (1) | reserved zeros (3) | payload length u32 LE (4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordFrame {
    /// Frame kind.
    pub kind: FrameKind,
    /// Payload length in bytes.
    pub len: u32,
}

impl RecordFrame {
    /// Builds a frame header for a payload of `len` bytes.
    pub fn new(kind: FrameKind, len: usize) -> Result<Self, JournalError> {
        match u32::try_from(len) {
            Ok(len) if len <= MAX_PAYLOAD_SIZE => Ok(Self { kind, len }),
            _ => Err(JournalError::PayloadTooLarge {
                size: len,
                max: MAX_PAYLOAD_SIZE,
            }),
        }
    }

    /// Encodes the frame header.
    pub fn to_bytes(&self) -> [u8; FRAME_HEADER_SIZE] {
        let mut bytes = [0u8; FRAME_HEADER_SIZE];
        bytes[0] = self.kind.to_byte();
        bytes[4..8].copy_from_slice(&self.len.to_le_bytes());
        bytes
    }

    /// Decodes a frame header found at `offset` in the file.
    pub fn from_bytes(bytes: &[u8; FRAME_HEADER_SIZE], offset: u64) -> Result<Self, JournalError> {
        if bytes[1..4] != [0u8; 3] {
            return Err(JournalError::InvalidFrame {
                offset,
                reason: "non-zero reserved bytes".to_string(),
            });
        }
        let len = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if len > MAX_PAYLOAD_SIZE {
            return Err(JournalError::InvalidFrame {
                offset,
                reason: format!("payload size {} exceeds maximum {}", len, MAX_PAYLOAD_SIZE),
            });
        }

        Ok(Self {
            kind: FrameKind::from_byte(bytes[0]),
            len,
        })
    }

    /// Total on-disk size of this frame, header included.
    pub fn total_len(&self) -> u64 {
        FRAME_HEADER_SIZE as u64 + u64::from(self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout() {
        let bytes = JournalHeader::new().to_bytes();
        assert_eq!(&bytes[0..4], b"VRJ1");
        assert_eq!(&bytes[4..6], &[0x01, 0x00]);
        assert_eq!(JournalHeader::from_bytes(&bytes).unwrap(), JournalHeader::new());
    }

    #[test]
    fn header_rejects_bad_fields() {
        let good = JournalHeader::new().to_bytes();

        let mut bad_magic = good;
        bad_magic[0] = b'N';
        assert!(JournalHeader::from_bytes(&bad_magic).is_err());

        let mut bad_version = good;
        bad_version[4] = 0x02;
        let err = JournalHeader::from_bytes(&bad_version).unwrap_err();
        assert!(err.to_string().contains("version"));

        let mut bad_flags = good;
        bad_flags[6] = 0x01;
        assert!(JournalHeader::from_bytes(&bad_flags).is_err());

        let mut bad_reserved = good;
        bad_reserved[15] = 0x01;
        assert!(JournalHeader::from_bytes(&bad_reserved).is_err());

        assert!(JournalHeader::from_bytes(&good[..10]).is_err());
    }

    #[test]
    fn frame_header_layout() {
        let frame = RecordFrame::new(FrameKind::LedgerRecord, 300).unwrap();
        let bytes = frame.to_bytes();
        assert_eq!(bytes, [0x01, 0, 0, 0, 0x2c, 0x01, 0, 0]);
        assert_eq!(RecordFrame::from_bytes(&bytes, 16).unwrap(), frame);
        assert_eq!(frame.total_len(), 308);
    }

    #[test]
    fn frame_limits() {
        assert!(RecordFrame::new(FrameKind::LedgerRecord, MAX_PAYLOAD_SIZE as usize).is_ok());
        assert!(matches!(
            RecordFrame::new(FrameKind::LedgerRecord, MAX_PAYLOAD_SIZE as usize + 1),
            Err(JournalError::PayloadTooLarge { .. })
        ));

        let mut bytes = RecordFrame::new(FrameKind::LedgerRecord, 4).unwrap().to_bytes();
        bytes[2] = 0xff;
        match RecordFrame::from_bytes(&bytes, 40) {
            Err(JournalError::InvalidFrame { offset, .. }) => assert_eq!(offset, 40),
            other => panic!("expected InvalidFrame, got {:?}", other),
        }
    }

    #[test]
    fn unknown_kind_survives() {
        assert_eq!(FrameKind::from_byte(0x7f), FrameKind::Unknown(0x7f));
        assert_eq!(FrameKind::Unknown(0x7f).to_byte(), 0x7f);
    }
}
