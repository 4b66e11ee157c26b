use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PASSCODE: &str = "112358";

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub ui: UiConfig,
    pub store: StoreConfig,
    pub admin: AdminConfig,
    pub export: ExportConfig,
    pub logs: LogsConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UiConfig {
    pub color: bool,
    pub max_table_rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminConfig {
    #[serde(skip_serializing)]
    pub passcode: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportConfig {
    pub sheet_name: String,
    pub xlsx_file: String,
    pub csv_file: String,
    pub json_file: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogsConfig {
    pub enabled: bool,
}

impl EffectiveConfig {
    pub fn defaults(home_dir: &Path) -> Self {
        Self {
            ui: UiConfig {
                color: true,
                max_table_rows: 50,
            },
            store: StoreConfig {
                path: config_dir(home_dir).join("data_riesgos.json"),
            },
            admin: AdminConfig {
                passcode: DEFAULT_PASSCODE.to_string(),
            },
            export: ExportConfig {
                sheet_name: "Riesgos".to_string(),
                xlsx_file: "Reporte_Riesgos_MP1.xlsx".to_string(),
                csv_file: "Reporte_Riesgos_MP1.csv".to_string(),
                json_file: "data_riesgos.json".to_string(),
            },
            logs: LogsConfig { enabled: true },
            config_path: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    ui: Option<RawUiConfig>,
    store: Option<RawStoreConfig>,
    admin: Option<RawAdminConfig>,
    export: Option<RawExportConfig>,
    logs: Option<RawLogsConfig>,
}

#[derive(Debug, Deserialize)]
struct RawUiConfig {
    color: Option<bool>,
    max_table_rows: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawStoreConfig {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAdminConfig {
    passcode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawExportConfig {
    sheet_name: Option<String>,
    xlsx_file: Option<String>,
    csv_file: Option<String>,
    json_file: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLogsConfig {
    enabled: Option<bool>,
}

pub fn home_dir() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("la variable de entorno HOME no está definida"))
}

pub fn config_dir(home_dir: &Path) -> PathBuf {
    home_dir.join(".config/hallazgos")
}

pub fn default_config_path(home_dir: &Path) -> PathBuf {
    config_dir(home_dir).join("config.toml")
}

pub fn load(config_path: Option<&Path>, home_dir: &Path) -> Result<EffectiveConfig> {
    let mut cfg = EffectiveConfig::defaults(home_dir);

    let path = config_path
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| default_config_path(home_dir));

    if path.exists() {
        let s = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "no se pudo leer el archivo de configuración: {}",
                path.display()
            )
        })?;
        let raw: RawConfig =
            toml::from_str(&s).context("no se pudo interpretar la configuración (TOML)")?;
        apply_raw_config(&mut cfg, raw, home_dir);
        cfg.config_path = Some(path.display().to_string());
    }

    apply_env_overrides(&mut cfg, home_dir)?;

    if cfg.export.sheet_name.trim().is_empty() {
        return Err(anyhow!("export.sheet_name no puede estar vacío"));
    }

    Ok(cfg)
}

fn apply_raw_config(cfg: &mut EffectiveConfig, raw: RawConfig, home_dir: &Path) {
    if let Some(ui) = raw.ui {
        if let Some(color) = ui.color {
            cfg.ui.color = color;
        }
        if let Some(max_table_rows) = ui.max_table_rows {
            cfg.ui.max_table_rows = max_table_rows;
        }
    }

    if let Some(store) = raw.store {
        if let Some(path) = store.path {
            cfg.store.path = expand_home(&path, home_dir);
        }
    }

    if let Some(admin) = raw.admin {
        if let Some(passcode) = admin.passcode {
            cfg.admin.passcode = passcode;
        }
    }

    if let Some(export) = raw.export {
        if let Some(sheet_name) = export.sheet_name {
            cfg.export.sheet_name = sheet_name;
        }
        if let Some(xlsx_file) = export.xlsx_file {
            cfg.export.xlsx_file = xlsx_file;
        }
        if let Some(csv_file) = export.csv_file {
            cfg.export.csv_file = csv_file;
        }
        if let Some(json_file) = export.json_file {
            cfg.export.json_file = json_file;
        }
    }

    if let Some(logs) = raw.logs {
        if let Some(enabled) = logs.enabled {
            cfg.logs.enabled = enabled;
        }
    }
}

fn apply_env_overrides(cfg: &mut EffectiveConfig, home_dir: &Path) -> Result<()> {
    if let Ok(v) = std::env::var("HALLAZGOS_UI_COLOR") {
        cfg.ui.color = parse_bool(&v).with_context(|| "HALLAZGOS_UI_COLOR")?;
    }
    if let Ok(v) = std::env::var("HALLAZGOS_UI_MAX_TABLE_ROWS") {
        cfg.ui.max_table_rows = v
            .trim()
            .parse::<usize>()
            .with_context(|| "HALLAZGOS_UI_MAX_TABLE_ROWS")?;
    }
    if let Ok(v) = std::env::var("HALLAZGOS_STORE_PATH") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.store.path = expand_home(v, home_dir);
        }
    }
    if let Ok(v) = std::env::var("HALLAZGOS_ADMIN_PASSCODE") {
        if !v.is_empty() {
            cfg.admin.passcode = v;
        }
    }
    if let Ok(v) = std::env::var("HALLAZGOS_EXPORT_SHEET_NAME") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.export.sheet_name = v.to_string();
        }
    }
    if let Ok(v) = std::env::var("HALLAZGOS_LOGS_ENABLED") {
        cfg.logs.enabled = parse_bool(&v).with_context(|| "HALLAZGOS_LOGS_ENABLED")?;
    }

    Ok(())
}

pub fn expand_home(s: &str, home_dir: &Path) -> PathBuf {
    if s == "~" {
        return home_dir.to_path_buf();
    }
    match s.strip_prefix("~/") {
        Some(rest) => home_dir.join(rest),
        None => PathBuf::from(s),
    }
}

fn parse_bool(s: &str) -> Result<bool> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow!(
            "valor booleano inválido: {s} (true|false|1|0|yes|no|on|off)"
        )),
    }
}
