use std::fmt;

use serde::{Deserialize, Serialize};

/// Case difficulty band. `easy`/`moderate`/`high` are accepted as aliases for
/// the first three levels; anything else lands in `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Complexity {
    Basic,
    Intermediate,
    Advanced,
    Expert,
    Unknown,
}

impl Complexity {
    pub const KNOWN: [Complexity; 4] = [
        Complexity::Basic,
        Complexity::Intermediate,
        Complexity::Advanced,
        Complexity::Expert,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Complexity::Basic => "basic",
            Complexity::Intermediate => "intermediate",
            Complexity::Advanced => "advanced",
            Complexity::Expert => "expert",
            Complexity::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "basic" | "easy" | "beginner" => Self::Basic,
            "intermediate" | "moderate" => Self::Intermediate,
            "advanced" | "high" => Self::Advanced,
            "expert" => Self::Expert,
            _ => Self::Unknown,
        }
    }

    /// Ordinal used for sequencing; unknown sorts with basic.
    pub const fn rank(self) -> u8 {
        match self {
            Complexity::Basic | Complexity::Unknown => 0,
            Complexity::Intermediate => 1,
            Complexity::Advanced => 2,
            Complexity::Expert => 3,
        }
    }
}

impl From<String> for Complexity {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum AgeGroup {
    Child,
    Adolescent,
    Adult,
    OlderAdult,
    Unknown,
}

impl AgeGroup {
    pub const fn as_str(self) -> &'static str {
        match self {
            AgeGroup::Child => "child",
            AgeGroup::Adolescent => "adolescent",
            AgeGroup::Adult => "adult",
            AgeGroup::OlderAdult => "older_adult",
            AgeGroup::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "child" | "children" | "pediatric" => Self::Child,
            "adolescent" | "teen" | "adolescents" => Self::Adolescent,
            "adult" | "adults" => Self::Adult,
            "older_adult" | "geriatric" | "elderly" => Self::OlderAdult,
            _ => Self::Unknown,
        }
    }
}

impl From<String> for AgeGroup {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
