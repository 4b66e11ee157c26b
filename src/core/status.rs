use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Status {
    #[serde(rename = "EJECUTADO")]
    Executed,
    #[default]
    #[serde(rename = "EN PROCESO")]
    InProgress,
    /// Still counted by the statistics and accepted from snapshots, but no
    /// write path offers it.
    #[serde(rename = "PENDIENTE")]
    Pending,
    #[serde(rename = "ATRASADO")]
    Overdue,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Executed,
        Status::InProgress,
        Status::Pending,
        Status::Overdue,
    ];

    pub const SELECTABLE: [Status; 3] = [Status::Executed, Status::InProgress, Status::Overdue];

    pub const fn as_str(self) -> &'static str {
        match self {
            Status::Executed => "EJECUTADO",
            Status::InProgress => "EN PROCESO",
            Status::Pending => "PENDIENTE",
            Status::Overdue => "ATRASADO",
        }
    }

    pub const fn is_selectable(self) -> bool {
        !matches!(self, Status::Pending)
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "EJECUTADO" => Some(Status::Executed),
            "EN PROCESO" => Some(Status::InProgress),
            "PENDIENTE" => Some(Status::Pending),
            "ATRASADO" => Some(Status::Overdue),
            _ => None,
        }
    }

    pub fn selectable_or_default(s: &str) -> Self {
        Self::from_label(s)
            .filter(|status| status.is_selectable())
            .unwrap_or_default()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(['_', '-'], " ");
        Self::from_label(&normalized).ok_or_else(|| {
            format!(
                "estado inválido: {} (EJECUTADO|EN PROCESO|ATRASADO|PENDIENTE)",
                s.trim()
            )
        })
    }
}
