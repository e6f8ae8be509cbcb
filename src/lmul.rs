use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Vector register group multiplier.
/// Ordering follows the multiplier, so `M1` is the smallest and is the baseline for all ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Lmul {
    M1,
    M2,
    M4,
    M8,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown LMUL `{0}`, expected one of m1, m2, m4, m8")]
pub struct ParseLmulError(pub String);

impl Lmul {
    /// All configurations, ascending.
    pub const ALL: [Lmul; 4] = [Lmul::M1, Lmul::M2, Lmul::M4, Lmul::M8];
    pub const BASELINE: Lmul = Lmul::M1;
    pub const LARGEST: Lmul = Lmul::M8;

    pub fn multiplier(self) -> u32 {
        match self {
            Lmul::M1 => 1,
            Lmul::M2 => 2,
            Lmul::M4 => 4,
            Lmul::M8 => 8,
        }
    }
    /// Speedup a perfectly linear scaling would give over the baseline.
    pub fn theoretical_scaling(self) -> f64 {
        self.multiplier() as f64
    }
    pub fn label(self) -> &'static str {
        match self {
            Lmul::M1 => "m1",
            Lmul::M2 => "m2",
            Lmul::M4 => "m4",
            Lmul::M8 => "m8",
        }
    }
    pub fn index(self) -> usize {
        match self {
            Lmul::M1 => 0,
            Lmul::M2 => 1,
            Lmul::M4 => 2,
            Lmul::M8 => 3,
        }
    }
}

impl fmt::Display for Lmul {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Lmul {
    type Err = ParseLmulError;
    fn from_str(s: &str) -> Result<Lmul, ParseLmulError> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('m')
            .or_else(|| trimmed.strip_prefix('M'))
            .unwrap_or(trimmed);
        match digits {
            "1" => Ok(Lmul::M1),
            "2" => Ok(Lmul::M2),
            "4" => Ok(Lmul::M4),
            "8" => Ok(Lmul::M8),
            _ => Err(ParseLmulError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Lmul {
    type Error = ParseLmulError;
    fn try_from(s: String) -> Result<Lmul, ParseLmulError> {
        s.parse()
    }
}

impl From<Lmul> for String {
    fn from(lmul: Lmul) -> String {
        lmul.label().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{Lmul, ParseLmulError};

    #[test]
    fn parse_labels() {
        assert_eq!("m1".parse::<Lmul>(), Ok(Lmul::M1));
        assert_eq!("M4".parse::<Lmul>(), Ok(Lmul::M4));
        assert_eq!(" m8 ".parse::<Lmul>(), Ok(Lmul::M8));
        assert_eq!("2".parse::<Lmul>(), Ok(Lmul::M2));
        assert_eq!(
            "m3".parse::<Lmul>(),
            Err(ParseLmulError("m3".to_string()))
        );
        assert!("".parse::<Lmul>().is_err());
        assert!("mf2".parse::<Lmul>().is_err());
    }
    #[test]
    fn ordered_by_multiplier() {
        let mut shuffled = vec![Lmul::M4, Lmul::M1, Lmul::M8, Lmul::M2];
        shuffled.sort();
        assert_eq!(shuffled, Lmul::ALL.to_vec());
        for (i, lmul) in Lmul::ALL.iter().enumerate() {
            assert_eq!(lmul.index(), i);
            assert_eq!(lmul.multiplier(), 1 << i);
        }
        assert_eq!(Lmul::BASELINE.theoretical_scaling(), 1.0);
    }
    #[test]
    fn serde_as_label() {
        let json = serde_json::to_string(&Lmul::M2).unwrap();
        assert_eq!(json, "\"m2\"");
        let back: Lmul = serde_json::from_str("\"m8\"").unwrap();
        assert_eq!(back, Lmul::M8);
        assert!(serde_json::from_str::<Lmul>("\"m16\"").is_err());
    }
}
