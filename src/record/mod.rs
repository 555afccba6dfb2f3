//! Record codec for the ASP record stream
//!
//! Every record starts with a single type byte: the low nibble is the record
//! type and the high nibble is the 4-bit code of the reference base (only
//! meaningful for reference-only and detailed records).
//!
//! Only position records store a chromosome and position. Every other record
//! inherits them from a running [`Locus`] that advances by one per record, so
//! the stream can only be decoded sequentially from the last position record.

mod detailed;
mod pileup;
mod ref_only;

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

pub use detailed::{DetailedRecord, PileupBase};
pub use pileup::Pileup;
pub use ref_only::RefOnlyRecord;

use crate::{
    error::{ReadError, Result},
    Error,
};

/// Mask of the record type within the type byte
const REC_TYPE_MASK: u8 = 0xF;

/// Shift of the reference base code within the type byte
const BASE_SHIFT: u8 = 4;

/// The four record types and their on-disk tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RecordKind {
    Empty = 0x0,
    Position = 0x1,
    RefOnly = 0x2,
    Detailed = 0x3,
}
impl RecordKind {
    /// Parses the low nibble of a type byte
    #[must_use]
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag & REC_TYPE_MASK {
            0x0 => Some(Self::Empty),
            0x1 => Some(Self::Position),
            0x2 => Some(Self::RefOnly),
            0x3 => Some(Self::Detailed),
            _ => None,
        }
    }

    #[must_use]
    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// A chromosome id and 0-based position
///
/// Loci order by chromosome id first, then by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Locus {
    pub chrom_id: i32,
    pub pos: i32,
}
impl Locus {
    /// The cursor before any position record has been read
    pub const UNSET: Self = Self {
        chrom_id: -1,
        pos: -1,
    };

    #[must_use]
    pub fn new(chrom_id: i32, pos: i32) -> Self {
        Self { chrom_id, pos }
    }

    /// The locus of the record that follows this one
    #[must_use]
    pub fn next(self) -> Self {
        Self {
            chrom_id: self.chrom_id,
            pos: self.pos.saturating_add(1),
        }
    }
}
impl Default for Locus {
    fn default() -> Self {
        Self::UNSET
    }
}

/// One record of the ASP stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AspRecord {
    /// No data at the implicit position
    Empty,
    /// Explicit chromosome/position anchor
    Position(Locus),
    /// Summary-only pileup data
    RefOnly(RefOnlyRecord),
    /// Full pileup data
    Detailed(DetailedRecord),
}
impl AspRecord {
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Empty => RecordKind::Empty,
            Self::Position(_) => RecordKind::Position,
            Self::RefOnly(_) => RecordKind::RefOnly,
            Self::Detailed(_) => RecordKind::Detailed,
        }
    }

    /// Whether this is a reference-only or detailed record
    #[must_use]
    pub fn is_data(&self) -> bool {
        matches!(self, Self::RefOnly(_) | Self::Detailed(_))
    }

    /// Returns the reference base of a data record
    #[must_use]
    pub fn ref_base(&self) -> Option<u8> {
        match self {
            Self::RefOnly(record) => Some(record.ref_base()),
            Self::Detailed(record) => Some(record.ref_base()),
            Self::Empty | Self::Position(_) => None,
        }
    }

    /// Returns the number of bases of a data record (0 for the other kinds)
    #[must_use]
    pub fn num_bases(&self) -> usize {
        match self {
            Self::RefOnly(record) => record.num_bases() as usize,
            Self::Detailed(record) => record.num_bases(),
            Self::Empty | Self::Position(_) => 0,
        }
    }

    /// Returns the likelihood of the genotype made of the two given bases
    ///
    /// Only reference-only records carry likelihoods. Detailed records return
    /// `None`: deriving a genotype likelihood from the individual bases is not
    /// implemented.
    #[must_use]
    pub fn likelihood(&self, base1: u8, base2: u8) -> Option<u8> {
        match self {
            Self::RefOnly(record) => Some(record.likelihood(base1, base2)),
            Self::Empty | Self::Position(_) | Self::Detailed(_) => None,
        }
    }

    #[must_use]
    pub fn as_ref_only(&self) -> Option<&RefOnlyRecord> {
        match self {
            Self::RefOnly(record) => Some(record),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_detailed(&self) -> Option<&DetailedRecord> {
        match self {
            Self::Detailed(record) => Some(record),
            _ => None,
        }
    }

    /// Whether encoding this record produces any bytes
    ///
    /// Data records without a single non-`N` base are never written.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        match self {
            Self::Empty | Self::Position(_) => true,
            Self::RefOnly(record) => record.num_bases() > 0,
            Self::Detailed(record) => record.num_non_n_bases() > 0,
        }
    }

    fn type_byte(&self) -> u8 {
        let ref_code = match self {
            Self::RefOnly(record) => record.ref_code(),
            Self::Detailed(record) => record.ref_code(),
            Self::Empty | Self::Position(_) => 0,
        };
        (ref_code << BASE_SHIFT) | self.kind().tag()
    }

    /// Encodes the record to a writer
    ///
    /// # Returns
    ///
    /// * `Ok(true)` if the record was written
    /// * `Ok(false)` if the record was skipped because it holds no non-`N` bases
    /// * `Err(Error)` if writing to the writer failed
    pub fn write_bytes<W: Write>(&self, writer: &mut W) -> Result<bool> {
        if !self.is_writable() {
            return Ok(false);
        }
        writer.write_u8(self.type_byte())?;
        match self {
            Self::Empty => {}
            Self::Position(locus) => {
                writer.write_i32::<LittleEndian>(locus.chrom_id)?;
                writer.write_i32::<LittleEndian>(locus.pos)?;
            }
            Self::RefOnly(record) => record.write_payload(writer)?,
            Self::Detailed(record) => record.write_payload(writer)?,
        }
        Ok(true)
    }
}

/// A decoded record together with its (possibly implicit) locus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedRecord {
    pub locus: Locus,
    pub record: AspRecord,
}
impl LocatedRecord {
    #[must_use]
    pub fn chrom_id(&self) -> i32 {
        self.locus.chrom_id
    }

    #[must_use]
    pub fn pos(&self) -> i32 {
        self.locus.pos
    }

    /// Decodes the next record from a reader
    ///
    /// `cursor` is the locus the next record inherits. A position record
    /// replaces the cursor with its own locus, so the record following it
    /// shares the anchored position; every other record advances it by one.
    ///
    /// # Returns
    ///
    /// * `Ok(Some((record, cursor)))` - The decoded record and the updated cursor
    /// * `Ok(None)` - The reader is at the end of the stream
    /// * `Err(Error)` - The stream is truncated mid-record or has an unknown record type
    pub fn read_from<R: Read>(reader: &mut R, cursor: Locus) -> Result<Option<(Self, Locus)>> {
        let Some(type_byte) = read_type_byte(reader)? else {
            return Ok(None);
        };
        let Some(kind) = RecordKind::from_tag(type_byte) else {
            return Err(ReadError::InvalidRecordType(type_byte).into());
        };
        let ref_code = type_byte >> BASE_SHIFT;

        let mut locus = cursor;
        let mut next = cursor.next();
        let record = match kind {
            RecordKind::Empty => AspRecord::Empty,
            RecordKind::Position => {
                let chrom_id = reader
                    .read_i32::<LittleEndian>()
                    .map_err(|e| stream_error("position chromosome id", e))?;
                let pos = reader
                    .read_i32::<LittleEndian>()
                    .map_err(|e| stream_error("position", e))?;
                locus = Locus::new(chrom_id, pos);
                next = locus;
                AspRecord::Position(locus)
            }
            RecordKind::RefOnly => {
                RefOnlyRecord::read_payload(reader, ref_code).map(AspRecord::RefOnly)?
            }
            RecordKind::Detailed => {
                DetailedRecord::read_payload(reader, ref_code).map(AspRecord::Detailed)?
            }
        };
        Ok(Some((Self { locus, record }, next)))
    }
}

/// Number of records of each kind read or written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordCounts {
    pub empty: usize,
    pub position: usize,
    pub ref_only: usize,
    pub detailed: usize,
}
impl RecordCounts {
    pub(crate) fn update(&mut self, kind: RecordKind) {
        match kind {
            RecordKind::Empty => self.empty += 1,
            RecordKind::Position => self.position += 1,
            RecordKind::RefOnly => self.ref_only += 1,
            RecordKind::Detailed => self.detailed += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.empty + self.position + self.ref_only + self.detailed
    }
}

/// Reads the type byte of the next record, `None` at a clean end of stream
fn read_type_byte<R: Read>(reader: &mut R) -> Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
}

/// Classifies an error raised inside a record
///
/// A short read mid-record means the stream is corrupt; anything else is a plain I/O error.
pub(crate) fn stream_error(field: &'static str, source: io::Error) -> Error {
    if source.kind() == io::ErrorKind::UnexpectedEof {
        ReadError::CorruptStream { field, source }.into()
    } else {
        source.into()
    }
}

pub(crate) fn read_field<R: Read>(
    reader: &mut R,
    buffer: &mut [u8],
    field: &'static str,
) -> Result<()> {
    reader
        .read_exact(buffer)
        .map_err(|e| stream_error(field, e))
}
