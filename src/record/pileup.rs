use super::{AspRecord, DetailedRecord, RefOnlyRecord};
use crate::{
    policy::NPolicy,
    utils::{encode_base, phred_from_ascii, MAX_NUM_BASES, N_CODE, UNKNOWN_QUALITY},
};

/// Minimum phred quality (exclusive) for a base to contribute to the likelihoods
const MIN_LIKELIHOOD_QUAL: u8 = 13;

/// Amount added to GLH for every contributing base
const GLH_INCREMENT: u8 = 3;

/// Constant part of the GLA increment, added to the phred quality of every contributing base
const GLA_INCREMENT: f64 = 4.77;

/// Accumulates the bases observed at one reference position
///
/// A pileup fills both record flavours at once: the detailed record keeps every
/// base (subject to the [`NPolicy`]), while the reference-only summary counts
/// non-`N` bases and accumulates the genotype likelihoods.
///
/// ```
/// use aspfile::Pileup;
///
/// let mut pileup = Pileup::new(b'A');
/// pileup.add(b'A', b'?', 1, false, 40);
/// pileup.add(b'G', b'5', 7, true, 40);
///
/// assert_eq!(pileup.num_bases(), 2);
/// assert_eq!(pileup.glh(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct Pileup {
    detailed: DetailedRecord,
    policy: NPolicy,
    num_non_n: usize,
    over_max: u32,
    glh: u8,
    gla: f64,
}
impl Pileup {
    /// Creates an empty pileup at a position with the given reference base
    #[must_use]
    pub fn new(ref_base: u8) -> Self {
        Self::with_policy(ref_base, NPolicy::default())
    }

    /// Creates an empty pileup with a specific `N` handling policy
    #[must_use]
    pub fn with_policy(ref_base: u8, policy: NPolicy) -> Self {
        Self {
            detailed: DetailedRecord::with_ref_code(encode_base(ref_base)),
            policy,
            num_non_n: 0,
            over_max: 0,
            glh: 0,
            gla: 0.0,
        }
    }

    /// Clears the pileup for reuse at a new position, keeping the policy
    pub fn reset(&mut self, ref_base: u8) {
        self.detailed.clear(encode_base(ref_base));
        self.num_non_n = 0;
        self.over_max = 0;
        self.glh = 0;
        self.gla = 0.0;
    }

    #[must_use]
    pub fn policy(&self) -> NPolicy {
        self.policy
    }

    /// Adds one base observation
    ///
    /// # Arguments
    ///
    /// * `base` - The base character (`*`, `-` or `D` for a deletion)
    /// * `qual` - The printable quality character (space for unknown)
    /// * `cycle` - The sequencing cycle of the base
    /// * `strand` - `true` for the reverse strand
    /// * `mq` - The mapping quality of the read
    ///
    /// # Returns
    ///
    /// `true` if the base was stored, `false` if it was dropped by the policy
    /// or because the record already holds the maximum number of bases.
    pub fn add(&mut self, base: u8, qual: u8, cycle: u8, strand: bool, mq: u8) -> bool {
        let code = encode_base(base);
        if !self.policy.keep(code) {
            return false;
        }
        if self.detailed.num_bases() >= MAX_NUM_BASES {
            self.over_max = self.over_max.saturating_add(1);
            return false;
        }

        let phred = phred_from_ascii(qual);
        self.detailed.push(code, phred, cycle, strand, mq);

        if code != N_CODE {
            self.num_non_n += 1;
            if phred > MIN_LIKELIHOOD_QUAL && phred != UNKNOWN_QUALITY {
                self.glh = self.glh.saturating_add(GLH_INCREMENT);
                self.gla += GLA_INCREMENT + f64::from(phred);
            }
        }
        true
    }

    /// Returns the reference base character
    #[must_use]
    pub fn ref_base(&self) -> u8 {
        self.detailed.ref_base()
    }

    /// Number of bases stored in the detailed record
    #[must_use]
    pub fn num_bases(&self) -> usize {
        self.detailed.num_bases()
    }

    #[must_use]
    pub fn num_non_n_bases(&self) -> usize {
        self.num_non_n
    }

    /// Number of bases dropped because the record was full
    #[must_use]
    pub fn num_over_max_bases(&self) -> u32 {
        self.over_max
    }

    #[must_use]
    pub fn glh(&self) -> u8 {
        self.glh
    }

    /// Truncated value of the alternate likelihood accumulator
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn gla(&self) -> u8 {
        self.gla.min(f64::from(u8::MAX)) as u8
    }

    #[must_use]
    pub fn as_detailed(&self) -> &DetailedRecord {
        &self.detailed
    }

    /// Builds the detailed record for this pileup
    #[must_use]
    pub fn to_detailed_record(&self) -> AspRecord {
        AspRecord::Detailed(self.detailed.clone())
    }

    /// Builds the reference-only summary for this pileup
    #[must_use]
    pub fn to_ref_only_record(&self) -> AspRecord {
        let summary = RefOnlyRecord::new(
            self.ref_base(),
            self.num_non_n as u8,
            self.glh,
            self.gla(),
        );
        AspRecord::RefOnly(summary)
    }
}

#[cfg(test)]
mod testing {
    use super::*;

    #[test]
    fn test_likelihood_accumulation() {
        let mut pileup = Pileup::new(b'A');
        // phred 30 contributes
        assert!(pileup.add(b'A', b'?', 1, false, 40));
        // phred 13 does not
        assert!(pileup.add(b'C', b'.', 2, false, 40));
        // unknown quality does not
        assert!(pileup.add(b'G', b' ', 3, false, 40));
        // N never contributes
        assert!(pileup.add(b'N', b'?', 4, false, 40));

        assert_eq!(pileup.num_bases(), 4);
        assert_eq!(pileup.num_non_n_bases(), 3);
        assert_eq!(pileup.glh(), 3);
        assert_eq!(pileup.gla(), 34);

        assert!(pileup.add(b'T', b'?', 5, true, 40));
        assert_eq!(pileup.glh(), 6);
        // 2 * (4.77 + 30) = 69.54
        assert_eq!(pileup.gla(), 69);
    }

    #[test]
    fn test_likelihoods_saturate() {
        let mut pileup = Pileup::new(b'C');
        for _ in 0..200 {
            pileup.add(b'C', b'I', 1, false, 60);
        }
        assert_eq!(pileup.glh(), u8::MAX);
        assert_eq!(pileup.gla(), u8::MAX);
    }

    #[test]
    fn test_max_bases() {
        let mut pileup = Pileup::new(b'G');
        for _ in 0..MAX_NUM_BASES {
            assert!(pileup.add(b'G', b'?', 1, false, 60));
        }
        assert!(!pileup.add(b'G', b'?', 1, false, 60));
        assert!(!pileup.add(b'T', b'?', 1, false, 60));
        assert_eq!(pileup.num_bases(), MAX_NUM_BASES);
        assert_eq!(pileup.num_over_max_bases(), 2);
    }

    #[test]
    fn test_n_policy() {
        let mut pileup = Pileup::with_policy(b'T', NPolicy::Exclude);
        assert!(!pileup.add(b'N', b'?', 1, false, 60));
        assert!(pileup.add(b'T', b'?', 1, false, 60));
        assert_eq!(pileup.num_bases(), 1);
        assert_eq!(pileup.num_over_max_bases(), 0);

        let mut pileup = Pileup::new(b'T');
        assert!(pileup.add(b'N', b'?', 1, false, 60));
        assert_eq!(pileup.num_bases(), 1);
        assert_eq!(pileup.num_non_n_bases(), 0);
    }

    #[test]
    fn test_ref_only_summary() {
        let mut pileup = Pileup::new(b'A');
        pileup.add(b'A', b'?', 1, false, 40);
        pileup.add(b'N', b'?', 2, false, 40);
        pileup.add(b'G', b'?', 3, true, 40);

        let AspRecord::RefOnly(summary) = pileup.to_ref_only_record() else {
            panic!("expected a reference-only record");
        };
        assert_eq!(summary.ref_base(), b'A');
        assert_eq!(summary.num_bases(), 2);
        assert_eq!(summary.glh(), 6);
        assert_eq!(summary.gla(), 69);
    }

    #[test]
    fn test_reset() {
        let mut pileup = Pileup::with_policy(b'A', NPolicy::Exclude);
        pileup.add(b'A', b'?', 1, false, 40);
        pileup.reset(b'C');
        assert_eq!(pileup.num_bases(), 0);
        assert_eq!(pileup.glh(), 0);
        assert_eq!(pileup.gla(), 0);
        assert_eq!(pileup.ref_base(), b'C');
        assert_eq!(pileup.policy(), NPolicy::Exclude);
    }
}
