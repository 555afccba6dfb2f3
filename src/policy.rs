use crate::utils::N_CODE;

/// Policy for handling ambiguous (`N`) bases added to a pileup
///
/// `N` bases never count towards reference-only summaries or likelihoods.
/// The policy only decides whether they are kept in detailed records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NPolicy {
    /// Keep `N` bases in detailed records
    #[default]
    IncludeInDetailed,
    /// Drop `N` bases entirely
    Exclude,
}
impl NPolicy {
    /// Decide whether a base with the given 4-bit code should be stored
    ///
    /// # Arguments
    /// * `code` - The 4-bit code of the base being added
    #[must_use]
    pub fn keep(&self, code: u8) -> bool {
        match self {
            Self::IncludeInDetailed => true,
            Self::Exclude => code != N_CODE,
        }
    }
}

#[cfg(test)]
mod testing {
    use super::*;
    use crate::utils::encode_base;

    #[test]
    fn test_include_keeps_everything() {
        let policy = NPolicy::default();
        assert!(policy.keep(encode_base(b'N')));
        assert!(policy.keep(encode_base(b'A')));
    }

    #[test]
    fn test_exclude_drops_n() {
        let policy = NPolicy::Exclude;
        assert!(!policy.keep(encode_base(b'N')));
        assert!(!policy.keep(encode_base(b'X')));
        assert!(policy.keep(encode_base(b'*')));
    }
}
