use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Variant order is the display and renumbering precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Zone {
    Pope,
    Secado,
    Formacion,
    Clarificacion,
}

impl Zone {
    pub const ALL: [Zone; 4] = [Zone::Pope, Zone::Secado, Zone::Formacion, Zone::Clarificacion];

    pub const fn as_str(self) -> &'static str {
        match self {
            Zone::Pope => "Pope",
            Zone::Secado => "Secado",
            Zone::Formacion => "Formacion",
            Zone::Clarificacion => "Clarificacion",
        }
    }

    pub const fn precedence(self) -> u8 {
        match self {
            Zone::Pope => 1,
            Zone::Secado => 2,
            Zone::Formacion => 3,
            Zone::Clarificacion => 4,
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|z| *z == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|z| *z == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Zone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let folded: String = s
            .chars()
            .map(|c| match c {
                'ó' | 'Ó' => 'o',
                'á' | 'Á' => 'a',
                other => other.to_ascii_lowercase(),
            })
            .collect();
        match folded.as_str() {
            "pope" => Ok(Zone::Pope),
            "secado" => Ok(Zone::Secado),
            "formacion" => Ok(Zone::Formacion),
            "clarificacion" => Ok(Zone::Clarificacion),
            _ => Err(format!(
                "zona inválida: {s} (Pope|Secado|Formacion|Clarificacion)"
            )),
        }
    }
}
