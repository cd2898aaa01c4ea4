//! 80-byte record framing.
//!
//! A transport file is a sequence of 80-byte physical records. Header
//! records occupy whole records; NAMESTR entries and observation data
//! straddle record boundaries freely, and each block is padded out to the
//! next boundary. [`RecordWriter`] accumulates bytes and emits complete
//! records; [`RecordReader`] hands out records with one record of
//! lookahead so the caller can tell whether the record in hand is the
//! final one of the stream. A file that does not end on a record boundary
//! yields one final short [`RawRecord`]; whether that is tolerable is the
//! caller's call (it never is inside the header block).

use std::io::{self, BufReader, BufWriter, Read, Write};

/// The length of a single physical record in bytes.
pub const RECORD_LEN: usize = 80;

/// ASCII space, the trailing-padding byte for header and observation
/// blocks.
pub const PAD_BYTE: u8 = 0x20;

/// A writer that produces 80-byte records.
#[derive(Debug)]
pub struct RecordWriter<W: Write> {
    inner: BufWriter<W>,
    buffer: Vec<u8>,
}

impl<W: Write> RecordWriter<W> {
    /// Creates a record writer over `sink`.
    pub fn new(sink: W) -> Self {
        Self {
            inner: BufWriter::new(sink),
            buffer: Vec::with_capacity(RECORD_LEN),
        }
    }

    /// Appends raw bytes, emitting records as they fill.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if writing fails.
    pub fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        let mut rest = data;
        while !rest.is_empty() {
            let room = RECORD_LEN - self.buffer.len();
            let take = room.min(rest.len());
            self.buffer.extend_from_slice(&rest[..take]);
            rest = &rest[take..];
            if self.buffer.len() == RECORD_LEN {
                self.flush_buffer()?;
            }
        }
        Ok(())
    }

    /// Writes one complete 80-byte record.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if writing fails.
    ///
    /// # Panics
    ///
    /// Panics if called while a record is partially filled; blocks are
    /// padded to a boundary before the next whole record is written.
    pub fn write_record(&mut self, record: &[u8; RECORD_LEN]) -> io::Result<()> {
        assert!(
            self.buffer.is_empty(),
            "whole records start on a record boundary"
        );
        self.inner.write_all(record)
    }

    /// Pads any partial record out to the 80-byte boundary with `fill`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if writing fails.
    pub fn pad_to_boundary(&mut self, fill: u8) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        self.buffer.resize(RECORD_LEN, fill);
        self.flush_buffer()
    }

    /// Flushes buffered output to the sink. Any partial record stays
    /// buffered until [`pad_to_boundary`](Self::pad_to_boundary).
    ///
    /// # Errors
    ///
    /// Returns an I/O error if flushing fails.
    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    fn flush_buffer(&mut self) -> io::Result<()> {
        self.inner.write_all(&self.buffer)?;
        self.buffer.clear();
        Ok(())
    }
}

/// One physical record, possibly short at end of file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord {
    /// Record content, zero-filled past `len`.
    pub bytes: [u8; RECORD_LEN],
    /// Number of bytes actually read, at most [`RECORD_LEN`].
    pub len: usize,
}

impl RawRecord {
    /// Returns `true` for a complete 80-byte record.
    pub fn is_full(&self) -> bool {
        self.len == RECORD_LEN
    }

    /// The bytes actually read.
    pub fn data(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// A reader that hands out records with one record of lookahead.
#[derive(Debug)]
pub struct RecordReader<R: Read> {
    inner: BufReader<R>,
    lookahead: Option<Option<RawRecord>>,
}

impl<R: Read> RecordReader<R> {
    /// Creates a record reader over `source`.
    pub fn new(source: R) -> Self {
        Self {
            inner: BufReader::new(source),
            lookahead: None,
        }
    }

    /// Reads the next record. Returns `Ok(None)` at end of file; the final
    /// record of a stream that is not record-aligned comes back short.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error unchanged.
    pub fn next_record(&mut self) -> io::Result<Option<RawRecord>> {
        if let Some(pending) = self.lookahead.take() {
            return Ok(pending);
        }
        self.fetch()
    }

    /// Peeks at the next record without consuming it.
    ///
    /// # Errors
    ///
    /// Same conditions as [`next_record`](Self::next_record).
    pub fn peek_record(&mut self) -> io::Result<Option<&RawRecord>> {
        if self.lookahead.is_none() {
            let fetched = self.fetch()?;
            self.lookahead = Some(fetched);
        }
        match &self.lookahead {
            Some(Some(record)) => Ok(Some(record)),
            _ => Ok(None),
        }
    }

    /// Returns `true` if at least one more record (full or short) can be
    /// read.
    ///
    /// # Errors
    ///
    /// Same conditions as [`next_record`](Self::next_record).
    pub fn has_more(&mut self) -> io::Result<bool> {
        Ok(self.peek_record()?.is_some())
    }

    fn fetch(&mut self) -> io::Result<Option<RawRecord>> {
        let mut bytes = [0u8; RECORD_LEN];
        let mut filled = 0;
        while filled < RECORD_LEN {
            match self.inner.read(&mut bytes[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        if filled == 0 {
            return Ok(None);
        }
        Ok(Some(RawRecord { bytes, len: filled }))
    }
}
