use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Criticality {
    A,
    #[default]
    B,
    C,
}

impl Criticality {
    pub const ALL: [Criticality; 3] = [Criticality::A, Criticality::B, Criticality::C];

    pub const fn as_str(self) -> &'static str {
        match self {
            Criticality::A => "A",
            Criticality::B => "B",
            Criticality::C => "C",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "A" => Some(Criticality::A),
            "B" => Some(Criticality::B),
            "C" => Some(Criticality::C),
            _ => None,
        }
    }

    pub fn from_label_or_default(s: &str) -> Self {
        Self::from_label(s).unwrap_or_default()
    }
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Criticality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| format!("criticidad inválida: {} (A|B|C)", s.trim()))
    }
}
