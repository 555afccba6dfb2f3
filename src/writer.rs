//! Sequential writer for ASP files
//!
//! The writer turns `(record, chromosome, position)` triples into the implicit
//! position stream. Small forward gaps are filled with one-byte empty records,
//! while chromosome changes and gaps wider than the configured gap size get a
//! position record instead.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::{
    error::{Result, WriteError},
    record::{AspRecord, Locus, RecordCounts},
    AspHeader, DEFAULT_GAP_SIZE,
};

/// Builder for creating configured [`AspWriter`] instances
///
/// # Examples
///
/// ```
/// # use aspfile::{AspHeader, AspWriterBuilder, Result};
/// # fn main() -> Result<()> {
/// let header = AspHeader::from_reference_contigs(["1", "2"]);
/// let writer = AspWriterBuilder::default()
///     .header(header)
///     .gap_size(20)
///     .build(Vec::new())?;
/// assert_eq!(writer.gap_size(), 20);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct AspWriterBuilder {
    /// Required chromosome header
    header: Option<AspHeader>,
    /// Largest gap filled with empty records instead of a position record
    gap_size: Option<u32>,
}
impl AspWriterBuilder {
    #[must_use]
    pub fn header(mut self, header: AspHeader) -> Self {
        self.header = Some(header);
        self
    }

    #[must_use]
    pub fn gap_size(mut self, gap_size: u32) -> Self {
        self.gap_size = Some(gap_size);
        self
    }

    /// Builds the writer and writes the header to `inner`
    pub fn build<W: Write>(self, inner: W) -> Result<AspWriter<W>> {
        let Some(header) = self.header else {
            return Err(WriteError::MissingHeader.into());
        };
        AspWriter::new(inner, header, self.gap_size.unwrap_or(DEFAULT_GAP_SIZE))
    }

    /// Creates the file at `path` and builds a buffered writer on it
    pub fn build_path<P: AsRef<Path>>(self, path: P) -> Result<AspWriter<BufWriter<File>>> {
        if self.header.is_none() {
            return Err(WriteError::MissingHeader.into());
        }
        let file = File::create(path)?;
        self.build(BufWriter::new(file))
    }
}

/// Writer for ASP files
///
/// Positions must be written in strictly increasing order within a
/// chromosome. Chromosomes may be written in any order.
///
/// # Type Parameters
///
/// * `W` - The underlying writer type that implements `Write`
pub struct AspWriter<W: Write> {
    inner: W,
    header: AspHeader,
    gap_size: u32,

    /// Locus of the last record written, `Locus::UNSET` before the first one
    last: Locus,
    /// Name of the chromosome of `last`, saves a header lookup per record
    last_chrom: String,

    counts: RecordCounts,
}
impl<W: Write> AspWriter<W> {
    /// Creates a new writer and writes the header
    ///
    /// Prefer [`AspWriterBuilder`], which fills in the default gap size.
    ///
    /// # Arguments
    ///
    /// * `inner` - The underlying writer to write to
    /// * `header` - The chromosome header
    /// * `gap_size` - The largest gap bridged with empty records
    pub fn new(mut inner: W, header: AspHeader, gap_size: u32) -> Result<Self> {
        header.write_bytes(&mut inner)?;
        log::debug!(
            "Wrote ASP header with {} chromosomes (gap size {gap_size})",
            header.len()
        );
        Ok(Self {
            inner,
            header,
            gap_size,
            last: Locus::UNSET,
            last_chrom: String::new(),
            counts: RecordCounts::default(),
        })
    }

    #[must_use]
    pub fn header(&self) -> &AspHeader {
        &self.header
    }

    #[must_use]
    pub fn gap_size(&self) -> u32 {
        self.gap_size
    }

    /// Number of records of each kind written so far, including generated
    /// position and empty records
    #[must_use]
    pub fn counts(&self) -> RecordCounts {
        self.counts
    }

    fn resolve_chrom(&self, chrom: &str) -> Result<i32> {
        if self.last.chrom_id >= 0 && self.last_chrom == chrom {
            return Ok(self.last.chrom_id);
        }
        self.header
            .chrom_id(chrom)
            .ok_or_else(|| WriteError::UnknownChromosome(chrom.to_string()).into())
    }

    fn emit(&mut self, record: &AspRecord) -> Result<()> {
        if record.write_bytes(&mut self.inner)? {
            self.counts.update(record.kind());
        }
        Ok(())
    }

    /// Writes a data record at a 0-based position on a chromosome
    ///
    /// A position record is emitted first when the chromosome changes or when
    /// the position is more than `gap_size` past the last one. Otherwise the
    /// positions in between are filled with empty records.
    ///
    /// # Arguments
    ///
    /// * `record` - The record to write (empty, reference-only or detailed)
    /// * `chrom` - The chromosome name, which must be in the header
    /// * `pos` - The 0-based position
    ///
    /// # Returns
    ///
    /// * `Ok(true)` if the record was written
    /// * `Ok(false)` if the record holds no non-`N` bases; nothing is written
    ///   and the writer state is unchanged
    ///
    /// # Errors
    ///
    /// Fails without writing anything if the chromosome is unknown, the
    /// position is negative or not after the last one on the same chromosome,
    /// or the record is a position record.
    pub fn write(&mut self, record: &AspRecord, chrom: &str, pos: i32) -> Result<bool> {
        if matches!(record, AspRecord::Position(_)) {
            return Err(WriteError::UnexpectedRecordKind.into());
        }
        if pos < 0 {
            return Err(WriteError::InvalidPosition(pos).into());
        }
        let chrom_id = self.resolve_chrom(chrom)?;

        let same_chrom = chrom_id == self.last.chrom_id;
        let pos_diff = i64::from(pos) - i64::from(self.last.pos);
        if same_chrom && pos_diff <= 0 {
            return Err(WriteError::OutOfOrder {
                chrom: chrom.to_string(),
                last: self.last.pos,
                pos,
            }
            .into());
        }
        if !record.is_writable() {
            return Ok(false);
        }

        let locus = Locus::new(chrom_id, pos);
        if !same_chrom || pos_diff > i64::from(self.gap_size) {
            log::trace!("Anchoring at {chrom}:{pos}");
            self.emit(&AspRecord::Position(locus))?;
        } else {
            for _ in 1..pos_diff {
                self.emit(&AspRecord::Empty)?;
            }
        }
        self.emit(record)?;

        if !same_chrom {
            self.last_chrom.clear();
            self.last_chrom.push_str(chrom);
        }
        self.last = locus;
        Ok(true)
    }

    /// Consumes the writer and returns the underlying writer
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Gets a mutable reference to the underlying writer
    pub fn by_ref(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Flushes any buffered data to the underlying writer
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}
