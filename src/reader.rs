//! Sequential reader for ASP files
//!
//! Records only carry their chromosome and position implicitly, so the reader
//! keeps a running [`Locus`] and decodes strictly forward. Point queries scan
//! ahead from the current record and never rewind.

use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::{
    error::Result,
    record::{AspRecord, DetailedRecord, LocatedRecord, Locus, RecordCounts, RefOnlyRecord},
    AspHeader,
};

/// Outcome of a positional query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// A data record exists at the requested position
    Found(&'a LocatedRecord),
    /// No data record at the requested position, or the reader had already passed it
    NotFound,
    /// The requested chromosome is not in the header
    UnknownChromosome,
}
impl<'a> Lookup<'a> {
    /// Returns the found record, if any
    #[must_use]
    pub fn found(self) -> Option<&'a LocatedRecord> {
        match self {
            Self::Found(record) => Some(record),
            Self::NotFound | Self::UnknownChromosome => None,
        }
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// What to do with the record currently held while scanning towards a target
enum Step {
    Read,
    Found,
    Passed,
}

/// Reader for ASP files
///
/// # Examples
///
/// ```
/// use aspfile::{AspHeader, AspReader, AspWriterBuilder, Pileup};
///
/// let header = AspHeader::from_reference_contigs(["1"]);
/// let mut writer = AspWriterBuilder::default().header(header).build(Vec::new())?;
///
/// let mut pileup = Pileup::new(b'C');
/// pileup.add(b'C', b'?', 3, false, 60);
/// writer.write(&pileup.to_detailed_record(), "1", 41)?;
///
/// let bytes = writer.into_inner();
/// let mut reader = AspReader::new(bytes.as_slice())?;
/// let record = reader.advance_to_position("1", 41)?.found().unwrap();
/// assert_eq!(record.record.num_bases(), 1);
/// # Ok::<(), aspfile::Error>(())
/// ```
#[derive(Debug)]
pub struct AspReader<R: BufRead> {
    inner: R,
    header: AspHeader,
    /// Locus inherited by the next record
    cursor: Locus,
    /// Most recently decoded record
    current: Option<LocatedRecord>,
    counts: RecordCounts,
}
impl AspReader<BufReader<File>> {
    /// Opens an ASP file and reads its header
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}
impl<R: BufRead> AspReader<R> {
    /// Creates a reader and reads the header from the start of `inner`
    pub fn new(mut inner: R) -> Result<Self> {
        let header = AspHeader::from_reader(&mut inner)?;
        log::debug!("Loaded ASP header with {} chromosomes", header.len());
        Ok(Self {
            inner,
            header,
            cursor: Locus::UNSET,
            current: None,
            counts: RecordCounts::default(),
        })
    }

    #[must_use]
    pub fn header(&self) -> &AspHeader {
        &self.header
    }

    /// Returns the name of a chromosome id
    #[must_use]
    pub fn chrom_name(&self, chrom_id: i32) -> Option<&str> {
        self.header.chrom_name(chrom_id)
    }

    /// Number of records of each kind decoded so far
    #[must_use]
    pub fn counts(&self) -> RecordCounts {
        self.counts
    }

    /// Whether the underlying stream has no more bytes
    pub fn is_eof(&mut self) -> Result<bool> {
        Ok(self.inner.fill_buf()?.is_empty())
    }

    /// Decodes one record into `self.current`, returning `false` at end of stream
    fn read_next(&mut self) -> Result<bool> {
        match LocatedRecord::read_from(&mut self.inner, self.cursor)? {
            Some((record, cursor)) => {
                self.counts.update(record.record.kind());
                self.cursor = cursor;
                self.current = Some(record);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Returns the next record of any kind
    ///
    /// # Returns
    ///
    /// * `Ok(Some(record))` - The next record and its locus
    /// * `Ok(None)` - End of stream
    /// * `Err(Error)` - The stream is corrupt
    pub fn next_record(&mut self) -> Result<Option<&LocatedRecord>> {
        if self.read_next()? {
            Ok(self.current.as_ref())
        } else {
            Ok(None)
        }
    }

    /// Returns the next reference-only or detailed record, skipping empty and position records
    pub fn next_data_record(&mut self) -> Result<Option<&LocatedRecord>> {
        loop {
            if !self.read_next()? {
                return Ok(None);
            }
            if self.current.as_ref().is_some_and(|r| r.record.is_data()) {
                return Ok(self.current.as_ref());
            }
        }
    }

    /// Advances past the next position record that starts a new chromosome
    ///
    /// The following [`next_data_record`](Self::next_data_record) returns data on that chromosome.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(name))` - The name of the chromosome that was reached
    /// * `Ok(None)` - End of stream, no further chromosome
    pub fn advance_to_next_chromosome(&mut self) -> Result<Option<&str>> {
        let start = self.cursor.chrom_id;
        loop {
            if !self.read_next()? {
                return Ok(None);
            }
            if let Some(LocatedRecord {
                record: AspRecord::Position(locus),
                ..
            }) = self.current
            {
                if locus.chrom_id != start {
                    let name = self.header.chrom_name(locus.chrom_id);
                    if name.is_none() {
                        log::warn!(
                            "Position record refers to unknown chromosome id {}",
                            locus.chrom_id
                        );
                    }
                    return Ok(name);
                }
            }
        }
    }

    /// Advances to the given chromosome and 0-based position
    ///
    /// Records are decoded until the reader reaches or passes the target. The
    /// reader never moves backwards: querying a position that was already passed
    /// returns [`Lookup::NotFound`].
    ///
    /// The returned record stays valid until the next record is read.
    pub fn advance_to_position(&mut self, chrom: &str, pos: i32) -> Result<Lookup<'_>> {
        let Some(chrom_id) = self.header.chrom_id(chrom) else {
            return Ok(Lookup::UnknownChromosome);
        };
        let target = Locus::new(chrom_id, pos);

        loop {
            let step = match &self.current {
                None => Step::Read,
                Some(current) => match current.locus.cmp(&target) {
                    Ordering::Less => Step::Read,
                    Ordering::Equal if current.record.is_data() => Step::Found,
                    // empty and position records at the target may still be
                    // followed by data at the same locus
                    Ordering::Equal => Step::Read,
                    Ordering::Greater => Step::Passed,
                },
            };
            match step {
                Step::Read => {
                    if !self.read_next()? {
                        return Ok(Lookup::NotFound);
                    }
                }
                Step::Found => break,
                Step::Passed => return Ok(Lookup::NotFound),
            }
        }
        let current = self.current.as_ref();
        Ok(current.map_or(Lookup::NotFound, Lookup::Found))
    }

    /// Returns the reference-only record at the given position, if there is one
    pub fn ref_only_at(&mut self, chrom: &str, pos: i32) -> Result<Option<&RefOnlyRecord>> {
        Ok(self
            .advance_to_position(chrom, pos)?
            .found()
            .and_then(|r| r.record.as_ref_only()))
    }

    /// Returns the detailed record at the given position, if there is one
    pub fn detailed_at(&mut self, chrom: &str, pos: i32) -> Result<Option<&DetailedRecord>> {
        Ok(self
            .advance_to_position(chrom, pos)?
            .found()
            .and_then(|r| r.record.as_detailed()))
    }

    /// Returns the likelihood of the genotype `base1`/`base2` at the given position
    ///
    /// `None` if the position has no reference-only record.
    pub fn likelihood_at(
        &mut self,
        chrom: &str,
        pos: i32,
        base1: u8,
        base2: u8,
    ) -> Result<Option<u8>> {
        Ok(self
            .advance_to_position(chrom, pos)?
            .found()
            .and_then(|r| r.record.likelihood(base1, base2)))
    }

    /// Returns the number of bases at the given position (0 without data)
    pub fn num_bases_at(&mut self, chrom: &str, pos: i32) -> Result<usize> {
        Ok(self
            .advance_to_position(chrom, pos)?
            .found()
            .map_or(0, |r| r.record.num_bases()))
    }

    /// Consumes the reader and returns the underlying stream
    pub fn into_inner(self) -> R {
        self.inner
    }
}
