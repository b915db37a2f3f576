use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::error::InputRangeError;
use super::framework::{GradingFramework, Letter, PointTable};

/// A grade token exactly as the form collected it ("A", "7", ...).
///
/// Deserializes from strings, integers or whole-valued floats so YAML like
/// `[1, 3, 7]`, `[3.0]` and `{1: 2}` works alongside `["A", "B"]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RawGrade(pub String);

impl RawGrade {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RawGrade {
    fn from(s: &str) -> Self {
        RawGrade(s.to_string())
    }
}

impl From<String> for RawGrade {
    fn from(s: String) -> Self {
        RawGrade(s)
    }
}

impl From<u32> for RawGrade {
    fn from(n: u32) -> Self {
        RawGrade(n.to_string())
    }
}

impl fmt::Display for RawGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

struct RawGradeVisitor;

impl<'de> Visitor<'de> for RawGradeVisitor {
    type Value = RawGrade;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a grade letter such as \"B\" or a whole number such as 3")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RawGrade, E> {
        Ok(RawGrade(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<RawGrade, E> {
        Ok(RawGrade(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<RawGrade, E> {
        Ok(RawGrade(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<RawGrade, E> {
        Ok(RawGrade(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<RawGrade, E> {
        if v.is_finite() && v.fract() == 0.0 && v >= 0.0 && v <= u32::MAX as f64 {
            Ok(RawGrade((v as u32).to_string()))
        } else {
            Err(E::invalid_value(Unexpected::Float(v), &self))
        }
    }
}

impl<'de> Deserialize<'de> for RawGrade {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawGradeVisitor)
    }
}

/// Per-subject grade selections, either one token per subject or a
/// token → count histogram. Both describe the same multiset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GradeEntry {
    Sequence(Vec<RawGrade>),
    Histogram(BTreeMap<RawGrade, u32>),
}

impl GradeEntry {
    pub fn sequence<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RawGrade>,
    {
        GradeEntry::Sequence(tokens.into_iter().map(Into::into).collect())
    }

    /// Build a histogram; repeated tokens accumulate, saturating at
    /// `u32::MAX` so an oversized bucket stays oversized.
    pub fn histogram<I, T>(buckets: I) -> Self
    where
        I: IntoIterator<Item = (T, u32)>,
        T: Into<RawGrade>,
    {
        let mut map: BTreeMap<RawGrade, u32> = BTreeMap::new();
        for (token, count) in buckets {
            let slot = map.entry(token.into()).or_insert(0);
            *slot = slot.saturating_add(count);
        }
        GradeEntry::Histogram(map)
    }

    /// Number of subjects described.
    pub fn count(&self) -> u64 {
        match self {
            GradeEntry::Sequence(tokens) => tokens.len() as u64,
            GradeEntry::Histogram(map) => map.values().map(|c| u64::from(*c)).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Resolve each token once against the framework's point table, keeping
    /// its multiplicity. Zero-count buckets are dropped. Nothing is expanded,
    /// so the cost follows the number of distinct tokens, not the count.
    pub fn resolve(
        &self,
        framework: &GradingFramework,
    ) -> Result<Vec<(Grade, u32)>, InputRangeError> {
        match self {
            GradeEntry::Sequence(tokens) => tokens
                .iter()
                .map(|t| Grade::resolve(t, framework).map(|g| (g, 1)))
                .collect(),
            GradeEntry::Histogram(map) => map
                .iter()
                .filter(|(_, count)| **count > 0)
                .map(|(token, count)| Grade::resolve(token, framework).map(|g| (g, *count)))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradeToken {
    Numeric(u32),
    Letter(Letter),
}

/// A validated grade and its point value under one framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Grade {
    pub token: GradeToken,
    pub points: u32,
}

impl Grade {
    pub fn resolve(raw: &RawGrade, framework: &GradingFramework) -> Result<Self, InputRangeError> {
        let invalid = || InputRangeError::InvalidGrade {
            framework: framework.id,
            token: raw.to_string(),
        };

        match framework.points {
            PointTable::Numeric { min, max } => {
                let digits = raw.as_str().trim();
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                let value: u32 = digits.parse().map_err(|_| invalid())?;
                if value < min || value > max {
                    return Err(invalid());
                }
                Ok(Grade {
                    token: GradeToken::Numeric(value),
                    points: value,
                })
            }
            PointTable::Letters(_) => {
                let letter = Letter::parse(raw.as_str()).ok_or_else(invalid)?;
                let points = framework.points.points_for(letter).ok_or_else(invalid)?;
                Ok(Grade {
                    token: GradeToken::Letter(letter),
                    points,
                })
            }
        }
    }
}
