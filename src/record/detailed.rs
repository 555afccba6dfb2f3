use std::io::{Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt};

use super::{read_field, stream_error};
use crate::{
    error::Result,
    utils::{
        ascii_from_phred, decode_base, packed_bases_len, packed_strands_len, N_CODE,
        UNKNOWN_QUALITY,
    },
};

/// A single base observation stored in a detailed record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PileupBase {
    /// Base character (`A`, `C`, `G`, `T`, `N` or the deletion marker `D`)
    pub base: u8,
    /// Phred quality, `None` if unknown
    pub phred: Option<u8>,
    /// Sequencing cycle of the base within its read
    pub cycle: u8,
    /// `true` for the reverse strand
    pub strand: bool,
    /// Mapping quality of the read
    pub mq: u8,
}

/// Full pileup data for one reference position
///
/// Per-base fields are stored exactly as they appear on disk:
/// - bases are packed two per byte, the earlier base in the upper nibble
/// - strands are packed eight per byte, the earliest strand in the most significant bit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailedRecord {
    /// 4-bit code of the reference base
    ref_code: u8,
    bases: Vec<u8>,
    quals: Vec<u8>,
    cycles: Vec<u8>,
    strands: Vec<u8>,
    mqs: Vec<u8>,
}
impl DetailedRecord {
    pub(crate) fn with_ref_code(ref_code: u8) -> Self {
        Self {
            ref_code: ref_code & 0xF,
            ..Self::default()
        }
    }

    /// Clears all bases and sets a new reference base code
    pub(crate) fn clear(&mut self, ref_code: u8) {
        self.ref_code = ref_code & 0xF;
        self.bases.clear();
        self.quals.clear();
        self.cycles.clear();
        self.strands.clear();
        self.mqs.clear();
    }

    /// Appends one base. The caller enforces the per-record base limit.
    pub(crate) fn push(&mut self, code: u8, phred: u8, cycle: u8, strand: bool, mq: u8) {
        let index = self.num_bases();
        if index.is_multiple_of(2) {
            self.bases.push((code & 0xF) << 4);
        } else if let Some(last) = self.bases.last_mut() {
            *last |= code & 0xF;
        }

        let bit = 0x80 >> (index % 8);
        if index.is_multiple_of(8) {
            self.strands.push(if strand { bit } else { 0 });
        } else if let Some(last) = self.strands.last_mut() {
            if strand {
                *last |= bit;
            }
        }

        self.quals.push(phred);
        self.cycles.push(cycle);
        self.mqs.push(mq);
    }

    pub(crate) fn ref_code(&self) -> u8 {
        self.ref_code
    }

    /// Returns the reference base character
    #[must_use]
    pub fn ref_base(&self) -> u8 {
        decode_base(self.ref_code)
    }

    /// Returns the number of bases in the record
    #[must_use]
    pub fn num_bases(&self) -> usize {
        self.quals.len()
    }

    /// Returns the number of bases that are not `N`
    #[must_use]
    pub fn num_non_n_bases(&self) -> usize {
        (0..self.num_bases())
            .filter_map(|index| self.code(index))
            .filter(|&code| code != N_CODE)
            .count()
    }

    fn code(&self, index: usize) -> Option<u8> {
        if index >= self.num_bases() {
            return None;
        }
        let pair = self.bases[index / 2];
        let code = if index.is_multiple_of(2) {
            pair >> 4
        } else {
            pair & 0xF
        };
        Some(code)
    }

    /// Returns the base at the given index
    ///
    /// Deletions are reported as [`DELETION_BASE`](crate::DELETION_BASE).
    #[must_use]
    pub fn base(&self, index: usize) -> Option<u8> {
        self.code(index).map(decode_base)
    }

    /// Returns the phred quality at the given index
    ///
    /// `None` if the index is out of range or the quality is unknown.
    #[must_use]
    pub fn phred_qual(&self, index: usize) -> Option<u8> {
        self.quals
            .get(index)
            .copied()
            .filter(|&phred| phred != UNKNOWN_QUALITY)
    }

    /// Returns the printable quality character at the given index
    #[must_use]
    pub fn char_qual(&self, index: usize) -> Option<u8> {
        self.quals.get(index).copied().and_then(ascii_from_phred)
    }

    #[must_use]
    pub fn cycle(&self, index: usize) -> Option<u8> {
        self.cycles.get(index).copied()
    }

    /// Returns the strand at the given index (`true` is the reverse strand)
    #[must_use]
    pub fn strand(&self, index: usize) -> Option<bool> {
        if index >= self.num_bases() {
            return None;
        }
        Some((self.strands[index / 8] >> (7 - index % 8)) & 1 == 1)
    }

    #[must_use]
    pub fn mq(&self, index: usize) -> Option<u8> {
        self.mqs.get(index).copied()
    }

    /// Iterates over every base observation in the record
    pub fn iter(&self) -> impl Iterator<Item = PileupBase> + '_ {
        (0..self.num_bases()).map(|index| PileupBase {
            base: decode_base(self.code(index).unwrap_or(N_CODE)),
            phred: self.phred_qual(index),
            cycle: self.cycles[index],
            strand: self.strand(index).unwrap_or(false),
            mq: self.mqs[index],
        })
    }

    pub(crate) fn write_payload<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.num_bases() as u8)?;
        writer.write_all(&self.bases)?;
        writer.write_all(&self.quals)?;
        writer.write_all(&self.cycles)?;
        writer.write_all(&self.strands)?;
        writer.write_all(&self.mqs)?;
        Ok(())
    }

    pub(crate) fn read_payload<R: Read>(reader: &mut R, ref_code: u8) -> Result<Self> {
        let num_bases = reader
            .read_u8()
            .map_err(|e| stream_error("detailed base count", e))? as usize;

        let mut bases = vec![0; packed_bases_len(num_bases)];
        read_field(reader, &mut bases, "detailed bases")?;
        let mut quals = vec![0; num_bases];
        read_field(reader, &mut quals, "detailed qualities")?;
        let mut cycles = vec![0; num_bases];
        read_field(reader, &mut cycles, "detailed cycles")?;
        let mut strands = vec![0; packed_strands_len(num_bases)];
        read_field(reader, &mut strands, "detailed strands")?;
        let mut mqs = vec![0; num_bases];
        read_field(reader, &mut mqs, "detailed mapping qualities")?;

        Ok(Self {
            ref_code: ref_code & 0xF,
            bases,
            quals,
            cycles,
            strands,
            mqs,
        })
    }
}

#[cfg(test)]
mod testing {
    use super::*;
    use crate::utils::{encode_base, DELETION_BASE};

    fn record_from(bases: &[u8]) -> DetailedRecord {
        let mut record = DetailedRecord::with_ref_code(encode_base(b'A'));
        for (index, &base) in bases.iter().enumerate() {
            record.push(encode_base(base), 30, index as u8, index % 3 == 0, 60);
        }
        record
    }

    #[test]
    fn test_base_packing() {
        let record = record_from(b"ACGT*");
        assert_eq!(record.bases, vec![0x01, 0x23, 0x50]);
        assert_eq!(record.base(0), Some(b'A'));
        assert_eq!(record.base(1), Some(b'C'));
        assert_eq!(record.base(3), Some(b'T'));
        assert_eq!(record.base(4), Some(DELETION_BASE));
        assert_eq!(record.base(5), None);
    }

    #[test]
    fn test_strand_bits_are_independent() {
        for set in 0..8 {
            let mut record = DetailedRecord::with_ref_code(0);
            for index in 0..8 {
                record.push(0, 30, 0, index == set, 0);
            }
            assert_eq!(record.strands, vec![0x80 >> set]);
            for index in 0..8 {
                assert_eq!(record.strand(index), Some(index == set));
            }
        }
    }

    #[test]
    fn test_strand_spills_into_second_byte() {
        let mut record = DetailedRecord::with_ref_code(0);
        for index in 0..9 {
            record.push(0, 30, 0, index == 8, 0);
        }
        assert_eq!(record.strands, vec![0x00, 0x80]);
        assert_eq!(record.strand(8), Some(true));
        assert_eq!(record.strand(9), None);
    }

    #[test]
    fn test_accessors_out_of_range() {
        let record = record_from(b"A");
        assert_eq!(record.phred_qual(1), None);
        assert_eq!(record.char_qual(1), None);
        assert_eq!(record.cycle(1), None);
        assert_eq!(record.mq(1), None);
        assert_eq!(record.char_qual(0), Some(b'?'));
    }

    #[test]
    fn test_unknown_quality() {
        let mut record = DetailedRecord::with_ref_code(0);
        record.push(0, UNKNOWN_QUALITY, 1, false, 20);
        assert_eq!(record.phred_qual(0), None);
        assert_eq!(record.char_qual(0), None);
    }

    #[test]
    fn test_num_non_n_bases() {
        let record = record_from(b"ANNC*");
        assert_eq!(record.num_bases(), 5);
        assert_eq!(record.num_non_n_bases(), 3);
    }

    #[test]
    fn test_iter() {
        let record = record_from(b"GT");
        let bases: Vec<_> = record.iter().collect();
        assert_eq!(bases.len(), 2);
        assert_eq!(
            bases[1],
            PileupBase {
                base: b'T',
                phred: Some(30),
                cycle: 1,
                strand: false,
                mq: 60,
            }
        );
    }
}
