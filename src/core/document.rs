use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum DocumentKind {
    #[default]
    #[serde(rename = "SIN DOC")]
    None,
    #[serde(rename = "LUP")]
    Lup,
    #[serde(rename = "LILA")]
    Lila,
    #[serde(rename = "POE")]
    Poe,
    #[serde(rename = "ACR")]
    Acr,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 5] = [
        DocumentKind::None,
        DocumentKind::Lup,
        DocumentKind::Lila,
        DocumentKind::Poe,
        DocumentKind::Acr,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            DocumentKind::None => "SIN DOC",
            DocumentKind::Lup => "LUP",
            DocumentKind::Lila => "LILA",
            DocumentKind::Poe => "POE",
            DocumentKind::Acr => "ACR",
        }
    }

    pub const fn is_none(self) -> bool {
        matches!(self, DocumentKind::None)
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "SIN DOC" => Some(DocumentKind::None),
            "LUP" => Some(DocumentKind::Lup),
            "LILA" => Some(DocumentKind::Lila),
            "POE" => Some(DocumentKind::Poe),
            "ACR" => Some(DocumentKind::Acr),
            _ => None,
        }
    }

    pub fn from_label_or_default(s: &str) -> Self {
        Self::from_label(s).unwrap_or_default()
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(['_', '-'], " ");
        Self::from_label(&normalized).ok_or_else(|| {
            format!(
                "documento inválido: {} (SIN DOC|LUP|LILA|POE|ACR)",
                s.trim()
            )
        })
    }
}
