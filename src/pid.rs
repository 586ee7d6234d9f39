//! IFCB ROI identifiers.
//!
//! A pid names one region of interest inside one bin: `<bin>_<target>`, for
//! example `D20170512T092752_IFCB010_319`. Bin names contain underscores
//! themselves, so the target number is whatever follows the last `_`.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Largest target number that fits the five-digit key scheme.
pub const MAX_TARGET_INDEX: u32 = 99_999;

/// A parsed ROI identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pid {
    bin_identifier: String,
    target_index: u32,
}

impl Pid {
    /// Parse a raw pid string.
    ///
    /// This is the only validation applied to identifiers coming from clients;
    /// every failure is reported as [`Error::InvalidIdentifier`].
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::InvalidIdentifier("empty pid".to_string()));
        }

        let (bin, target) = raw
            .rsplit_once('_')
            .ok_or_else(|| Error::InvalidIdentifier(format!("missing target separator: {}", raw)))?;

        if bin.is_empty() {
            return Err(Error::InvalidIdentifier(format!("missing bin identifier: {}", raw)));
        }

        if bin.contains(['/', '\\']) {
            return Err(Error::InvalidIdentifier(format!(
                "bin identifier contains a path separator: {}",
                raw
            )));
        }

        if target.is_empty() || !target.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidIdentifier(format!("target is not a number: {}", raw)));
        }

        let target_index: u32 = target
            .parse()
            .ok()
            .filter(|n| *n <= MAX_TARGET_INDEX)
            .ok_or_else(|| {
                Error::InvalidIdentifier(format!(
                    "target {} exceeds maximum {}",
                    target, MAX_TARGET_INDEX
                ))
            })?;

        Ok(Self {
            bin_identifier: bin.to_string(),
            target_index,
        })
    }

    pub fn bin_identifier(&self) -> &str {
        &self.bin_identifier
    }

    pub fn target_index(&self) -> u32 {
        self.target_index
    }

    /// Whether the bin follows the `DYYYYMMDDTHHMMSS_<instrument>` naming scheme.
    pub fn is_dated(&self) -> bool {
        is_dated_bin(&self.bin_identifier)
    }
}

impl FromStr for Pid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Pid::parse(s)
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.bin_identifier, self.target_index)
    }
}

/// `D` + 8-digit date + `T` + 6-digit time + `_` + non-empty instrument tag.
pub fn is_dated_bin(bin: &str) -> bool {
    let b = bin.as_bytes();
    b.len() > 17
        && b[0] == b'D'
        && b[1..9].iter().all(u8::is_ascii_digit)
        && b[9] == b'T'
        && b[10..16].iter().all(u8::is_ascii_digit)
        && b[16] == b'_'
}

/// Year partition for a bin: the four year digits of a dated bin, `legacy` otherwise.
pub fn year_token(bin: &str) -> &str {
    if is_dated_bin(bin) { &bin[1..5] } else { "legacy" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dated_pid() {
        let pid = Pid::parse("D20170512T092752_IFCB010_319").unwrap();
        assert_eq!(pid.bin_identifier(), "D20170512T092752_IFCB010");
        assert_eq!(pid.target_index(), 319);
        assert!(pid.is_dated());
    }

    #[test]
    fn test_parse_padded_target() {
        let pid: Pid = "D20170512T092752_IFCB010_00319".parse().unwrap();
        assert_eq!(pid.target_index(), 319);
        assert_eq!(pid.to_string(), "D20170512T092752_IFCB010_319");
    }

    #[test]
    fn test_parse_legacy_pid() {
        let pid = Pid::parse("IFCB5_2010_264_120337_00042").unwrap();
        assert_eq!(pid.bin_identifier(), "IFCB5_2010_264_120337");
        assert_eq!(pid.target_index(), 42);
        assert!(!pid.is_dated());
    }

    #[test]
    fn test_parse_zero_and_max() {
        assert_eq!(Pid::parse("bin_0").unwrap().target_index(), 0);
        assert_eq!(Pid::parse("bin_99999").unwrap().target_index(), MAX_TARGET_INDEX);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for raw in [
            "",
            "not-a-valid-pid",
            "_12",
            "bin_",
            "bin_-1",
            "bin_+1",
            "bin_12a",
            "bin_1.5",
            "bin_ 1",
            "bin_100000",
            "bin_99999999999999999999",
            "a/b_1",
            "2017/D20170512T092752_IFCB010_1",
            "..\\D20170512T092752_IFCB010_1",
        ] {
            let err = Pid::parse(raw).unwrap_err();
            assert!(
                matches!(err, Error::InvalidIdentifier(_)),
                "{:?} should be rejected, got {:?}",
                raw,
                err
            );
        }
    }

    #[test]
    fn test_dated_bin_predicate() {
        assert!(is_dated_bin("D20170512T092752_IFCB010"));
        assert!(is_dated_bin("D20240101T000000_X"));
        assert!(!is_dated_bin("D20170512T092752_"));
        assert!(!is_dated_bin("D2017051T092752_IFCB010"));
        assert!(!is_dated_bin("D20170512X092752_IFCB010"));
        assert!(!is_dated_bin("D2017a512T092752_IFCB010"));
        assert!(!is_dated_bin("IFCB5_2010_264_120337"));
        assert!(!is_dated_bin("Dummy"));
        assert!(!is_dated_bin(""));
    }

    #[test]
    fn test_year_token() {
        assert_eq!(year_token("D20170512T092752_IFCB010"), "2017");
        assert_eq!(year_token("IFCB5_2010_264_120337"), "legacy");
        assert_eq!(year_token("Dlegacy"), "legacy");
    }
}
