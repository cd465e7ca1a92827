//! 80-column record reader/writer
//!
//! Every IGES record is 80 printable columns: 72 content columns, the
//! section letter in column 73, and a right-justified sequence number in
//! columns 74-80. Sections must appear in S, G, D, P, T order and records
//! are numbered contiguously from 1 within each section.

use crate::error::{IgesError, Result};
use std::io::Read;

pub const RECORD_LEN: usize = 80;
pub const CONTENT_LEN: usize = 72;
/// Parameter-data records reserve columns 65-72 for the DE back-pointer.
pub const PD_CONTENT_LEN: usize = 64;

/// File section tag (column 73)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Section {
    Start,
    Global,
    Directory,
    Parameter,
    Terminate,
}

impl Section {
    pub fn from_letter(letter: u8) -> Option<Section> {
        match letter {
            b'S' => Some(Section::Start),
            b'G' => Some(Section::Global),
            b'D' => Some(Section::Directory),
            b'P' => Some(Section::Parameter),
            b'T' => Some(Section::Terminate),
            _ => None,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Section::Start => 'S',
            Section::Global => 'G',
            Section::Directory => 'D',
            Section::Parameter => 'P',
            Section::Terminate => 'T',
        }
    }
}

/// One decoded 80-column record
#[derive(Debug, Clone)]
pub struct Record {
    /// Columns 1-72
    pub content: String,
    /// Column 73
    pub section: Section,
    /// Columns 74-80, 1-based within the section
    pub sequence: u32,
}

/// Section record counts, as carried by the terminator record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectionCounts {
    pub start: u32,
    pub global: u32,
    pub directory: u32,
    pub parameter: u32,
}

/// Reads 80-byte chunks, tolerating CR/LF between chunks, and enforces the
/// section-letter and sequence-number discipline.
pub struct RecordReader {
    data: Vec<u8>,
    pos: usize,
    current_section: Option<Section>,
    expected_sequence: u32,
}

impl RecordReader {
    pub fn new<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(RecordReader {
            data,
            pos: 0,
            current_section: None,
            expected_sequence: 1,
        })
    }

    /// Read the next record, or `None` at end of input.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        while self.pos < self.data.len()
            && (self.data[self.pos] == b'\n' || self.data[self.pos] == b'\r')
        {
            self.pos += 1;
        }
        if self.pos >= self.data.len() {
            return Ok(None);
        }
        if self.pos + RECORD_LEN > self.data.len() {
            return Err(IgesError::Record(format!(
                "short record: {} bytes remain, 80 required",
                self.data.len() - self.pos
            )));
        }
        let chunk = &self.data[self.pos..self.pos + RECORD_LEN];
        self.pos += RECORD_LEN;

        let content = std::str::from_utf8(&chunk[..CONTENT_LEN])
            .map_err(|_| IgesError::Record("non-ASCII record content".into()))?
            .to_string();
        let section = Section::from_letter(chunk[CONTENT_LEN]).ok_or_else(|| {
            IgesError::Record(format!(
                "bad section letter '{}'",
                chunk[CONTENT_LEN] as char
            ))
        })?;
        let seq_text = std::str::from_utf8(&chunk[CONTENT_LEN + 1..])
            .map_err(|_| IgesError::Record("non-ASCII sequence number".into()))?;
        let sequence: u32 = seq_text.trim().parse().map_err(|_| {
            IgesError::Record(format!("bad sequence number '{}'", seq_text.trim()))
        })?;
        if sequence == 0 {
            return Err(IgesError::Record("sequence numbers are 1-based".into()));
        }

        match self.current_section {
            Some(current) if current == section => {
                if sequence != self.expected_sequence {
                    return Err(IgesError::Record(format!(
                        "sequence gap in section {}: expected {}, found {}",
                        section.letter(),
                        self.expected_sequence,
                        sequence
                    )));
                }
            }
            Some(current) => {
                if section < current {
                    return Err(IgesError::Record(format!(
                        "section {} after section {}",
                        section.letter(),
                        current.letter()
                    )));
                }
                if sequence != 1 {
                    return Err(IgesError::Record(format!(
                        "section {} does not start at sequence 1",
                        section.letter()
                    )));
                }
                self.current_section = Some(section);
                self.expected_sequence = 1;
            }
            None => {
                if sequence != 1 {
                    return Err(IgesError::Record(format!(
                        "section {} does not start at sequence 1",
                        section.letter()
                    )));
                }
                self.current_section = Some(section);
            }
        }
        self.expected_sequence = sequence + 1;

        Ok(Some(Record {
            content,
            section,
            sequence,
        }))
    }
}

/// Parse a terminator record's `S...G...D...P...` counts.
pub fn parse_terminator(content: &str) -> Result<SectionCounts> {
    let bytes = content.as_bytes();
    if bytes.len() < 32 {
        return Err(IgesError::Record("terminator record too short".into()));
    }
    let field = |offset: usize, letter: u8| -> Result<u32> {
        if bytes[offset] != letter {
            return Err(IgesError::Record(format!(
                "terminator record missing '{}' count",
                letter as char
            )));
        }
        let text = std::str::from_utf8(&bytes[offset + 1..offset + 8]).unwrap();
        text.trim()
            .parse()
            .map_err(|_| IgesError::Record(format!("bad terminator count '{}'", text.trim())))
    };
    Ok(SectionCounts {
        start: field(0, b'S')?,
        global: field(8, b'G')?,
        directory: field(16, b'D')?,
        parameter: field(24, b'P')?,
    })
}

/// Format a terminator record's content columns.
pub fn format_terminator(counts: &SectionCounts) -> String {
    format!(
        "S{:7}G{:7}D{:7}P{:7}",
        counts.start, counts.global, counts.directory, counts.parameter
    )
}

/// Pads content to 72 columns and appends the section letter and a
/// per-section running sequence number.
pub struct RecordWriter<W: std::io::Write> {
    inner: W,
    counts: SectionCounts,
}

impl<W: std::io::Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        RecordWriter {
            inner,
            counts: SectionCounts::default(),
        }
    }

    /// Section record counts written so far.
    pub fn counts(&self) -> SectionCounts {
        self.counts
    }

    /// Emit one record; returns its sequence number.
    pub fn write_record(&mut self, content: &str, section: Section) -> Result<u32> {
        if content.len() > CONTENT_LEN {
            return Err(IgesError::Format(format!(
                "record content {} columns, at most 72 allowed",
                content.len()
            )));
        }
        let sequence = match section {
            Section::Start => {
                self.counts.start += 1;
                self.counts.start
            }
            Section::Global => {
                self.counts.global += 1;
                self.counts.global
            }
            Section::Directory => {
                self.counts.directory += 1;
                self.counts.directory
            }
            Section::Parameter => {
                self.counts.parameter += 1;
                self.counts.parameter
            }
            Section::Terminate => 1,
        };
        if sequence > 9_999_999 {
            return Err(IgesError::Format("sequence number overflow".into()));
        }
        writeln!(
            self.inner,
            "{:<72}{}{:7}",
            content,
            section.letter(),
            sequence
        )?;
        Ok(sequence)
    }

    /// Emit the single terminator record.
    pub fn write_terminator(&mut self) -> Result<()> {
        let content = format_terminator(&self.counts);
        self.write_record(&content, Section::Terminate)?;
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}
