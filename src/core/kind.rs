use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FindingType {
    #[serde(rename = "LDA")]
    Lda,
    #[serde(rename = "FC")]
    Fc,
}

impl FindingType {
    pub const ALL: [FindingType; 2] = [FindingType::Lda, FindingType::Fc];

    pub const fn as_str(self) -> &'static str {
        match self {
            FindingType::Lda => "LDA",
            FindingType::Fc => "FC",
        }
    }
}

impl fmt::Display for FindingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FindingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_uppercase().as_str() {
            "LDA" => Ok(FindingType::Lda),
            "FC" => Ok(FindingType::Fc),
            _ => Err(format!("tipo inválido: {s} (LDA|FC)")),
        }
    }
}
