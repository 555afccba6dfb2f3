//! Base and quality encoding tables shared by the record codec.

/// Maximum number of bases a single record can hold
pub const MAX_NUM_BASES: usize = 255;

/// Character reported for a deletion in a detailed record
pub const DELETION_BASE: u8 = b'D';

/// 4-bit code of an ambiguous (`N`) base
pub const N_CODE: u8 = 4;

/// 4-bit code of a deletion
pub const DELETION_CODE: u8 = 5;

/// Stored phred value of a base whose quality is unknown
pub const UNKNOWN_QUALITY: u8 = 0xFF;

/// Quality character that marks an unknown quality
pub const UNKNOWN_QUALITY_CHAR: u8 = b' ';

/// Offset between a phred value and its printable quality character
pub const PHRED_OFFSET: u8 = 33;

/// Decoding table for the 4-bit base codes
///
/// Codes above the deletion code are never produced by the encoder and decode as `N`.
const CODE_TO_BASE: [u8; 16] = *b"ACGTNDNNNNNNNNNN";

/// Converts a base character to its 4-bit code
#[must_use]
pub fn encode_base(base: u8) -> u8 {
    match base {
        b'A' | b'a' => 0,
        b'C' | b'c' => 1,
        b'G' | b'g' => 2,
        b'T' | b't' => 3,
        b'-' | b'*' | b'D' | b'd' => DELETION_CODE,
        _ => N_CODE,
    }
}

/// Converts a 4-bit code back to its base character
///
/// Only the low nibble of `code` is considered.
#[must_use]
pub fn decode_base(code: u8) -> u8 {
    CODE_TO_BASE[(code & 0xF) as usize]
}

/// Converts a printable quality character to a phred value
///
/// The unknown-quality character maps to [`UNKNOWN_QUALITY`].
#[must_use]
pub fn phred_from_ascii(qual: u8) -> u8 {
    if qual == UNKNOWN_QUALITY_CHAR {
        UNKNOWN_QUALITY
    } else {
        qual.saturating_sub(PHRED_OFFSET)
    }
}

/// Converts a phred value to its printable quality character
///
/// Returns `None` for the unknown-quality sentinel.
#[must_use]
pub fn ascii_from_phred(phred: u8) -> Option<u8> {
    if phred == UNKNOWN_QUALITY {
        None
    } else {
        Some(phred.saturating_add(PHRED_OFFSET))
    }
}

/// Number of bytes holding `num_bases` packed 4-bit bases
#[must_use]
pub fn packed_bases_len(num_bases: usize) -> usize {
    num_bases.div_ceil(2)
}

/// Number of bytes holding `num_bases` packed strand bits
#[must_use]
pub fn packed_strands_len(num_bases: usize) -> usize {
    num_bases.div_ceil(8)
}

#[cfg(test)]
mod testing {
    use super::*;

    #[test]
    fn test_base_table() {
        for &base in b"ACGTN" {
            assert_eq!(decode_base(encode_base(base)), base);
            assert_eq!(decode_base(encode_base(base.to_ascii_lowercase())), base);
        }
        assert_eq!(decode_base(encode_base(b'*')), DELETION_BASE);
        assert_eq!(decode_base(encode_base(b'-')), DELETION_BASE);
        assert_eq!(encode_base(b'R'), N_CODE);
        assert_eq!(decode_base(0xF), b'N');
    }

    #[test]
    fn test_quality_conversion() {
        assert_eq!(phred_from_ascii(b'?'), 30);
        assert_eq!(phred_from_ascii(b'!'), 0);
        assert_eq!(phred_from_ascii(b' '), UNKNOWN_QUALITY);
        assert_eq!(ascii_from_phred(30), Some(b'?'));
        assert_eq!(ascii_from_phred(UNKNOWN_QUALITY), None);
    }

    #[test]
    fn test_packed_sizes() {
        assert_eq!(packed_bases_len(0), 0);
        assert_eq!(packed_bases_len(1), 1);
        assert_eq!(packed_bases_len(2), 1);
        assert_eq!(packed_bases_len(3), 2);
        assert_eq!(packed_bases_len(255), 128);
        assert_eq!(packed_strands_len(0), 0);
        assert_eq!(packed_strands_len(8), 1);
        assert_eq!(packed_strands_len(9), 2);
        assert_eq!(packed_strands_len(255), 32);
    }
}
