use serde::Serialize;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use super::error::EngineError;

/// Examination level a framework grades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Level {
    #[serde(rename = "OLEVEL")]
    OLevel,
    #[serde(rename = "ALEVEL")]
    ALevel,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::OLevel => write!(f, "O-Level"),
            Level::ALevel => write!(f, "A-Level"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FrameworkId {
    #[serde(rename = "OLEVEL_NUMERIC")]
    OLevelNumeric,
    #[serde(rename = "ALEVEL_LEGACY_25")]
    ALevelLegacy25,
    #[serde(rename = "ALEVEL_CLASSIC_18")]
    ALevelClassic18,
    #[serde(rename = "ALEVEL_COMPETENCY_60")]
    ALevelCompetency60,
}

impl FrameworkId {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameworkId::OLevelNumeric => "OLEVEL_NUMERIC",
            FrameworkId::ALevelLegacy25 => "ALEVEL_LEGACY_25",
            FrameworkId::ALevelClassic18 => "ALEVEL_CLASSIC_18",
            FrameworkId::ALevelCompetency60 => "ALEVEL_COMPETENCY_60",
        }
    }

    /// Parse a framework id. Accepts the canonical form plus short aliases
    /// in any case, with `-` or spaces in place of `_`.
    pub fn parse(s: &str) -> Result<Self, EngineError> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();

        match normalized.as_str() {
            "OLEVEL_NUMERIC" | "OLEVEL" | "O_LEVEL" | "UCE" => Ok(FrameworkId::OLevelNumeric),
            "ALEVEL_LEGACY_25" | "LEGACY_25" | "LEGACY" => Ok(FrameworkId::ALevelLegacy25),
            "ALEVEL_CLASSIC_18" | "CLASSIC_18" | "CLASSIC" => Ok(FrameworkId::ALevelClassic18),
            "ALEVEL_COMPETENCY_60" | "COMPETENCY_60" | "COMPETENCY" => {
                Ok(FrameworkId::ALevelCompetency60)
            }
            _ => Err(EngineError::UnknownFramework(s.to_string())),
        }
    }
}

impl FromStr for FrameworkId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FrameworkId::parse(s)
    }
}

impl fmt::Display for FrameworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A-Level letter grades, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Letter {
    A,
    B,
    C,
    D,
    E,
    O,
    F,
}

impl Letter {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Letter::A),
            "B" => Some(Letter::B),
            "C" => Some(Letter::C),
            "D" => Some(Letter::D),
            "E" => Some(Letter::E),
            "O" => Some(Letter::O),
            "F" => Some(Letter::F),
            _ => None,
        }
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Inclusive range of counted subjects a framework allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubjectBounds {
    pub min: usize,
    pub max: usize,
}

impl SubjectBounds {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, count: usize) -> bool {
        count >= self.min && count <= self.max
    }

    /// Constrain a growable input at write time. The aggregator never clamps;
    /// it rejects counts outside the bounds.
    pub fn clamp(&self, count: usize) -> usize {
        count.clamp(self.min, self.max)
    }

    /// Subject counts a student may pick from.
    pub fn choices(&self) -> RangeInclusive<usize> {
        self.min..=self.max
    }
}

impl fmt::Display for SubjectBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "exactly {}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointTable {
    /// Grade tokens are integers taken as their own point value.
    Numeric { min: u32, max: u32 },
    Letters(&'static [(Letter, u32)]),
}

impl PointTable {
    pub fn points_for(&self, letter: Letter) -> Option<u32> {
        match self {
            PointTable::Numeric { .. } => None,
            PointTable::Letters(table) => table
                .iter()
                .find(|(l, _)| *l == letter)
                .map(|(_, points)| *points),
        }
    }
}

/// Classification cut-offs.
///
/// O-Level grades run 1 (best) to 9, so distinctions sit at the low end.
/// A-Level bands are defined on letters because O (subsidiary pass) scores
/// below D on every table yet is not a weak grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thresholds {
    Numeric {
        distinction_max: u32,
        credit: (u32, u32),
        weak_min: u32,
    },
    Letters {
        distinction: &'static [Letter],
        weak: &'static [Letter],
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradingFramework {
    pub id: FrameworkId,
    pub level: Level,
    pub label: &'static str,
    pub points: PointTable,
    pub subject_bounds: SubjectBounds,
    pub thresholds: Thresholds,
}

const ALEVEL_DISTINCTION: &[Letter] = &[Letter::A];
const ALEVEL_WEAK: &[Letter] = &[Letter::D, Letter::E, Letter::F];

static OLEVEL_NUMERIC: GradingFramework = GradingFramework {
    id: FrameworkId::OLevelNumeric,
    level: Level::OLevel,
    label: "UCE numeric grades (D1-F9)",
    points: PointTable::Numeric { min: 1, max: 9 },
    subject_bounds: SubjectBounds::new(6, 10),
    // Grade 6 is both a credit and a weak grade.
    thresholds: Thresholds::Numeric {
        distinction_max: 2,
        credit: (3, 6),
        weak_min: 6,
    },
};

static ALEVEL_LEGACY_25: GradingFramework = GradingFramework {
    id: FrameworkId::ALevelLegacy25,
    level: Level::ALevel,
    label: "Legacy 25-point scale (4 principals)",
    points: PointTable::Letters(&[
        (Letter::A, 9),
        (Letter::B, 8),
        (Letter::C, 7),
        (Letter::D, 6),
        (Letter::E, 5),
        (Letter::O, 1),
        (Letter::F, 0),
    ]),
    subject_bounds: SubjectBounds::new(4, 4),
    thresholds: Thresholds::Letters {
        distinction: ALEVEL_DISTINCTION,
        weak: ALEVEL_WEAK,
    },
};

static ALEVEL_CLASSIC_18: GradingFramework = GradingFramework {
    id: FrameworkId::ALevelClassic18,
    level: Level::ALevel,
    label: "Classic 18-point scale (3 principals)",
    points: PointTable::Letters(&[
        (Letter::A, 6),
        (Letter::B, 5),
        (Letter::C, 4),
        (Letter::D, 3),
        (Letter::E, 2),
        (Letter::O, 1),
        (Letter::F, 0),
    ]),
    subject_bounds: SubjectBounds::new(3, 3),
    thresholds: Thresholds::Letters {
        distinction: ALEVEL_DISTINCTION,
        weak: ALEVEL_WEAK,
    },
};

static ALEVEL_COMPETENCY_60: GradingFramework = GradingFramework {
    id: FrameworkId::ALevelCompetency60,
    level: Level::ALevel,
    label: "Competency-based 60-point scale (2-3 principals)",
    points: PointTable::Letters(&[
        (Letter::A, 20),
        (Letter::B, 15),
        (Letter::C, 10),
        (Letter::D, 5),
        (Letter::E, 2),
        (Letter::O, 1),
        (Letter::F, 0),
    ]),
    subject_bounds: SubjectBounds::new(2, 3),
    thresholds: Thresholds::Letters {
        distinction: ALEVEL_DISTINCTION,
        weak: ALEVEL_WEAK,
    },
};

/// Every framework, oldest scheme first within each level.
static REGISTRY: [&GradingFramework; 4] = [
    &OLEVEL_NUMERIC,
    &ALEVEL_LEGACY_25,
    &ALEVEL_CLASSIC_18,
    &ALEVEL_COMPETENCY_60,
];

pub fn get_framework(id: FrameworkId) -> &'static GradingFramework {
    match id {
        FrameworkId::OLevelNumeric => &OLEVEL_NUMERIC,
        FrameworkId::ALevelLegacy25 => &ALEVEL_LEGACY_25,
        FrameworkId::ALevelClassic18 => &ALEVEL_CLASSIC_18,
        FrameworkId::ALevelCompetency60 => &ALEVEL_COMPETENCY_60,
    }
}

/// Frameworks for a level in chronological order.
pub fn list_frameworks(level: Level) -> Vec<&'static GradingFramework> {
    REGISTRY
        .iter()
        .copied()
        .filter(|fw| fw.level == level)
        .collect()
}
