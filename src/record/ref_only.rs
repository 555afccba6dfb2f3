use std::io::{Read, Write};

use byteorder::ReadBytesExt;

use super::stream_error;
use crate::{
    error::Result,
    utils::{decode_base, encode_base},
};

/// Summary pileup data for one reference position
///
/// Holds the number of non-`N` bases and two genotype likelihoods:
/// `glh` for the heterozygous-reference genotype and `gla` for genotypes
/// that do not contain the reference base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefOnlyRecord {
    ref_code: u8,
    num_bases: u8,
    glh: u8,
    gla: u8,
}
impl RefOnlyRecord {
    #[must_use]
    pub fn new(ref_base: u8, num_bases: u8, glh: u8, gla: u8) -> Self {
        Self {
            ref_code: encode_base(ref_base),
            num_bases,
            glh,
            gla,
        }
    }

    pub(crate) fn ref_code(self) -> u8 {
        self.ref_code
    }

    /// Returns the reference base character
    #[must_use]
    pub fn ref_base(self) -> u8 {
        decode_base(self.ref_code)
    }

    #[must_use]
    pub fn num_bases(self) -> u8 {
        self.num_bases
    }

    #[must_use]
    pub fn glh(self) -> u8 {
        self.glh
    }

    #[must_use]
    pub fn gla(self) -> u8 {
        self.gla
    }

    /// Returns the likelihood of the genotype made of the two given bases
    ///
    /// * homozygous reference: `0`
    /// * one base matches the reference: `glh`
    /// * neither base matches the reference: `gla`
    ///
    /// Bases are compared case-insensitively.
    #[must_use]
    pub fn likelihood(self, base1: u8, base2: u8) -> u8 {
        let ref_base = self.ref_base();
        let base1 = base1.to_ascii_uppercase();
        let base2 = base2.to_ascii_uppercase();
        if base1 == ref_base || base2 == ref_base {
            if base1 == base2 {
                0
            } else {
                self.glh
            }
        } else {
            self.gla
        }
    }

    pub(crate) fn write_payload<W: Write>(self, writer: &mut W) -> Result<()> {
        writer.write_all(&[self.num_bases, self.glh, self.gla])?;
        Ok(())
    }

    pub(crate) fn read_payload<R: Read>(reader: &mut R, ref_code: u8) -> Result<Self> {
        let num_bases = reader
            .read_u8()
            .map_err(|e| stream_error("reference-only base count", e))?;
        let glh = reader
            .read_u8()
            .map_err(|e| stream_error("reference-only GLH", e))?;
        let gla = reader
            .read_u8()
            .map_err(|e| stream_error("reference-only GLA", e))?;
        Ok(Self {
            ref_code: ref_code & 0xF,
            num_bases,
            glh,
            gla,
        })
    }
}

#[cfg(test)]
mod testing {
    use super::*;

    #[test]
    fn test_likelihood() {
        let record = RefOnlyRecord::new(b'A', 4, 12, 140);
        assert_eq!(record.likelihood(b'A', b'A'), 0);
        assert_eq!(record.likelihood(b'A', b'G'), 12);
        assert_eq!(record.likelihood(b'G', b'A'), 12);
        assert_eq!(record.likelihood(b'G', b'T'), 140);
        assert_eq!(record.likelihood(b'G', b'G'), 140);
        assert_eq!(record.likelihood(b'a', b'g'), 12);
    }

    #[test]
    fn test_payload_layout() -> Result<()> {
        let record = RefOnlyRecord::new(b'T', 7, 21, 99);
        let mut bytes = Vec::new();
        record.write_payload(&mut bytes)?;
        assert_eq!(bytes, vec![7, 21, 99]);

        let decoded = RefOnlyRecord::read_payload(&mut bytes.as_slice(), record.ref_code())?;
        assert_eq!(decoded, record);
        Ok(())
    }

    #[test]
    fn test_ref_base_is_normalized() {
        let record = RefOnlyRecord::new(b'c', 1, 3, 37);
        assert_eq!(record.ref_base(), b'C');
    }
}
