//! Header module for the aspfile library
//!
//! The header maps chromosome names to the numeric ids used by position records.
//! Ids are assigned in order, starting at 0, and the header is stored in id order:
//!
//! | Size (bytes) | Name       | Description                               | Type  |
//! | ------------ | ---------- | ----------------------------------------- | ----- |
//! | 4            | count      | Number of chromosomes                     | int32 |
//! | 4            | name_len   | Length of the name including its nul byte | int32 |
//! | name_len     | name       | Chromosome name followed by a nul byte    | bytes |
//!
//! The `name_len`/`name` pair is repeated `count` times.

use std::collections::HashMap;
use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{HeaderError, Result};

/// Bidirectional mapping between chromosome names and ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AspHeader {
    names: Vec<String>,
    ids: HashMap<String, i32>,
}
impl AspHeader {
    /// Creates a header from the contig names of a reference, in id order
    ///
    /// # Examples
    ///
    /// ```
    /// use aspfile::AspHeader;
    ///
    /// let header = AspHeader::from_reference_contigs(["1", "2", "X"]);
    /// assert_eq!(header.chrom_id("X"), Some(2));
    /// assert_eq!(header.chrom_name(0), Some("1"));
    /// ```
    pub fn from_reference_contigs<I, S>(contigs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut header = Self::default();
        for name in contigs {
            header.push(name.into());
        }
        header
    }

    fn push(&mut self, name: String) {
        let id = self.names.len() as i32;
        if let Some(previous) = self.ids.insert(name.clone(), id) {
            log::warn!(
                "Duplicate chromosome {name} in header (ids {previous} and {id}), using {id}"
            );
        }
        self.names.push(name);
    }

    /// Returns the id of a chromosome name
    #[must_use]
    pub fn chrom_id(&self, name: &str) -> Option<i32> {
        self.ids.get(name).copied()
    }

    /// Returns the name of a chromosome id
    #[must_use]
    pub fn chrom_name(&self, id: i32) -> Option<&str> {
        usize::try_from(id)
            .ok()
            .and_then(|index| self.names.get(index))
            .map(String::as_str)
    }

    /// Number of chromosomes in the header
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates over the chromosome names in id order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Writes the header to a writer
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or if the number of chromosomes
    /// (or the length of a name) does not fit in an `i32`.
    pub fn write_bytes<W: Write>(&self, writer: &mut W) -> Result<()> {
        let count = i32::try_from(self.names.len())
            .map_err(|_| HeaderError::TooManyChromosomes(self.names.len()))?;
        writer.write_i32::<LittleEndian>(count)?;
        for name in &self.names {
            writer.write_i32::<LittleEndian>(name_len_field(name.len())?)?;
            writer.write_all(name.as_bytes())?;
            writer.write_u8(0)?;
        }
        Ok(())
    }

    /// Reads a header from a reader positioned at the start of an ASP file
    ///
    /// Names are read up to their first nul byte. A name that appears twice
    /// maps to its last id.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The header is truncated
    /// * The chromosome count or a name length is invalid
    /// * A name is not valid UTF-8
    pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self> {
        let count = reader
            .read_i32::<LittleEndian>()
            .map_err(|e| HeaderError::Truncated("chromosome count", e))?;
        let Ok(count) = usize::try_from(count) else {
            return Err(HeaderError::InvalidChromosomeCount(count).into());
        };

        let mut header = Self::default();
        let mut buffer = Vec::new();
        for index in 0..count {
            let len = reader
                .read_i32::<LittleEndian>()
                .map_err(|e| HeaderError::Truncated("chromosome name length", e))?;
            let name_len = match usize::try_from(len) {
                Ok(name_len) if name_len > 0 => name_len,
                _ => return Err(HeaderError::InvalidNameLength { index, len }.into()),
            };

            // name_len is untrusted, never allocate more than the stream holds
            buffer.clear();
            reader
                .by_ref()
                .take(name_len as u64)
                .read_to_end(&mut buffer)
                .map_err(|e| HeaderError::Truncated("chromosome name", e))?;
            if buffer.len() < name_len {
                let short_read = io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("expected {name_len} bytes, found {}", buffer.len()),
                );
                return Err(HeaderError::Truncated("chromosome name", short_read).into());
            }

            let end = buffer.iter().position(|&b| b == 0).unwrap_or(name_len);
            let name = std::str::from_utf8(&buffer[..end])
                .map_err(|e| HeaderError::InvalidName(index, e))?;
            header.push(name.to_string());
        }
        Ok(header)
    }
}

/// Length field of a name, which counts the terminating nul
fn name_len_field(len: usize) -> Result<i32> {
    let field = len
        .checked_add(1)
        .and_then(|n| i32::try_from(n).ok())
        .ok_or(HeaderError::NameTooLong(len))?;
    Ok(field)
}

#[cfg(feature = "sam")]
impl From<&noodles_sam::Header> for AspHeader {
    /// Builds the header from the reference sequences (`@SQ` lines) of a SAM header
    fn from(header: &noodles_sam::Header) -> Self {
        Self::from_reference_contigs(header.reference_sequences().keys().map(ToString::to_string))
    }
}

#[cfg(test)]
mod testing {
    use super::*;
    use crate::Error;

    #[test]
    fn test_layout() -> Result<()> {
        let header = AspHeader::from_reference_contigs(["1", "chr22"]);
        let mut bytes = Vec::new();
        header.write_bytes(&mut bytes)?;

        let mut expected = vec![2, 0, 0, 0];
        expected.extend_from_slice(&[2, 0, 0, 0]);
        expected.extend_from_slice(b"1\0");
        expected.extend_from_slice(&[6, 0, 0, 0]);
        expected.extend_from_slice(b"chr22\0");
        assert_eq!(bytes, expected);

        let decoded = AspHeader::from_reader(&mut bytes.as_slice())?;
        assert_eq!(decoded, header);
        Ok(())
    }

    #[test]
    fn test_lookup() {
        let header = AspHeader::from_reference_contigs(vec!["1".to_string(), "2".to_string()]);
        assert_eq!(header.len(), 2);
        assert_eq!(header.chrom_id("2"), Some(1));
        assert_eq!(header.chrom_id("3"), None);
        assert_eq!(header.chrom_name(1), Some("2"));
        assert_eq!(header.chrom_name(2), None);
        assert_eq!(header.chrom_name(-1), None);
        assert_eq!(header.names().collect::<Vec<_>>(), vec!["1", "2"]);
    }

    #[test]
    fn test_empty_header() -> Result<()> {
        let header = AspHeader::default();
        let mut bytes = Vec::new();
        header.write_bytes(&mut bytes)?;
        assert_eq!(bytes, vec![0, 0, 0, 0]);
        assert!(AspHeader::from_reader(&mut bytes.as_slice())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_duplicate_names_overwrite() -> Result<()> {
        let mut bytes = vec![2, 0, 0, 0];
        for _ in 0..2 {
            bytes.extend_from_slice(&[2, 0, 0, 0]);
            bytes.extend_from_slice(b"7\0");
        }
        let header = AspHeader::from_reader(&mut bytes.as_slice())?;
        assert_eq!(header.len(), 2);
        assert_eq!(header.chrom_id("7"), Some(1));
        assert_eq!(header.chrom_name(0), Some("7"));
        Ok(())
    }

    #[test]
    fn test_truncated_header() {
        let bytes = [1, 0, 0, 0, 4, 0, 0, 0, b'c', b'h'];
        let err = AspHeader::from_reader(&mut bytes.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            Error::HeaderError(HeaderError::Truncated("chromosome name", _))
        ));

        let bytes = [1u8, 0];
        let err = AspHeader::from_reader(&mut bytes.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            Error::HeaderError(HeaderError::Truncated("chromosome count", _))
        ));
    }

    #[test]
    fn test_invalid_counts() {
        let bytes = (-1i32).to_le_bytes();
        let err = AspHeader::from_reader(&mut bytes.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            Error::HeaderError(HeaderError::InvalidChromosomeCount(-1))
        ));

        let bytes = [1, 0, 0, 0, 0, 0, 0, 0];
        let err = AspHeader::from_reader(&mut bytes.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            Error::HeaderError(HeaderError::InvalidNameLength { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_name_too_long() -> Result<()> {
        assert_eq!(name_len_field(4)?, 5);
        let longest = i32::MAX as usize - 1;
        assert_eq!(name_len_field(longest)?, i32::MAX);
        let err = name_len_field(longest + 1).unwrap_err();
        assert!(matches!(
            err,
            Error::HeaderError(HeaderError::NameTooLong(len)) if len == longest + 1
        ));
        Ok(())
    }

    #[test]
    fn test_oversized_name_length() {
        let bytes = [1, 0, 0, 0, 0xff, 0xff, 0xff, 0x7f, b'x'];
        let err = AspHeader::from_reader(&mut bytes.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            Error::HeaderError(HeaderError::Truncated("chromosome name", _))
        ));
    }

    #[cfg(feature = "sam")]
    #[test]
    fn test_from_sam_header() -> anyhow::Result<()> {
        use std::num::NonZeroUsize;

        use noodles_sam::{
            self as sam,
            header::record::value::{map::ReferenceSequence, Map},
        };

        let sam_header = sam::Header::builder()
            .add_reference_sequence(
                "sq0",
                Map::<ReferenceSequence>::new(NonZeroUsize::try_from(8)?),
            )
            .add_reference_sequence(
                "sq1",
                Map::<ReferenceSequence>::new(NonZeroUsize::try_from(13)?),
            )
            .build();

        let header = AspHeader::from(&sam_header);
        assert_eq!(header.chrom_id("sq0"), Some(0));
        assert_eq!(header.chrom_id("sq1"), Some(1));
        Ok(())
    }
}
