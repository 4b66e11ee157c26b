use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

const MAX_DETAIL_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationLog {
    pub schema_version: String,
    pub tool_version: String,
    pub command: String,
    pub at: String,
    pub status: String,
    pub data_path: String,
    #[serde(default)]
    pub affected: Vec<String>,
    #[serde(default)]
    pub detail: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub file: String,
    #[serde(flatten)]
    pub log: MutationLog,
}

pub fn logs_dir(home_dir: &Path) -> PathBuf {
    crate::config::config_dir(home_dir).join("logs")
}

pub fn write_mutation_log(
    home_dir: &Path,
    command: &str,
    at: OffsetDateTime,
    status: &str,
    data_path: &Path,
    affected: &[String],
    detail: serde_json::Value,
) -> Result<PathBuf> {
    let dir = logs_dir(home_dir);
    std::fs::create_dir_all(&dir).with_context(|| {
        format!(
            "no se pudo crear el directorio de registros: {}",
            dir.display()
        )
    })?;

    let pid = std::process::id();
    let ts = at.unix_timestamp_nanos();
    let file_name = format!("{}-{pid}-{ts}.json", command.replace(' ', "-"));
    let path = dir.join(file_name);

    let log = MutationLog {
        schema_version: "1.0".to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        command: command.to_string(),
        at: at.format(&Rfc3339).unwrap_or_else(|_| "unknown".to_string()),
        status: status.to_string(),
        data_path: mask_home(data_path, home_dir),
        affected: affected.to_vec(),
        detail: cap_detail(detail),
    };

    let buf = serde_json::to_vec_pretty(&log)
        .context("no se pudo serializar el registro de auditoría (JSON)")?;
    std::fs::write(&path, buf)
        .with_context(|| format!("no se pudo escribir el registro: {}", path.display()))?;
    Ok(path)
}

pub fn list_logs(home_dir: &Path, limit: usize) -> Result<Vec<LogEntry>> {
    let dir = logs_dir(home_dir);
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for item in std::fs::read_dir(&dir)
        .with_context(|| format!("no se pudo leer: {}", dir.display()))?
    {
        let item = item?;
        let path = item.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Ok(bytes) = std::fs::read(&path) else {
            continue;
        };
        let Ok(log) = serde_json::from_slice::<MutationLog>(&bytes) else {
            continue;
        };
        entries.push(LogEntry {
            file: item.file_name().to_string_lossy().into_owned(),
            log,
        });
    }

    entries.sort_by(|a, b| {
        parse_at(&b.log.at)
            .cmp(&parse_at(&a.log.at))
            .then_with(|| b.file.cmp(&a.file))
    });
    entries.truncate(limit);
    Ok(entries)
}

fn parse_at(s: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(s, &Rfc3339).ok()
}

fn mask_home(path: &Path, home_dir: &Path) -> String {
    let Ok(stripped) = path.strip_prefix(home_dir) else {
        return path.display().to_string();
    };
    let stripped = stripped.display().to_string();
    if stripped.is_empty() {
        "~".to_string()
    } else {
        format!("~/{stripped}")
    }
}

fn cap_detail(detail: serde_json::Value) -> serde_json::Value {
    let size = serde_json::to_vec(&detail).map(|b| b.len()).unwrap_or(0);
    if size <= MAX_DETAIL_BYTES {
        return detail;
    }
    serde_json::json!({ "truncated": true, "bytes": size })
}
