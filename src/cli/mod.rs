use std::io;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::config::EffectiveConfig;
use crate::core::{
    Criticality, DocumentKind, Finding, FindingInput, FindingPatch, FindingType, Status, Zone,
};
use crate::store::{Resolve, Store};
use crate::ui::UiConfig;
use crate::view::DashboardFilter;

mod interactive;

#[derive(Debug, Parser)]
#[command(
    name = "hallazgos",
    version,
    about = "Registro de hallazgos de inspección (LDA/FC) por zona de planta: altas, carga masiva, estadísticas y exportación"
)]
pub struct Cli {
    #[arg(long, global = true)]
    pub json: bool,
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
    #[arg(long, global = true)]
    pub verbose: bool,
    #[arg(long, global = true)]
    pub quiet: bool,
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,
    #[arg(long, global = true)]
    pub pass: Option<String>,
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    List(ListArgs),
    Show(ShowArgs),
    Stats(StatsArgs),
    Add(AddArgs),
    Edit(EditArgs),
    Delete(DeleteArgs),
    Clear(ClearArgs),
    Renumber,
    Bulk(BulkArgs),
    Export(ExportArgs),
    Import(ImportArgs),
    Logs(LogsArgs),
    Ui(UiArgs),
    Completion(CompletionArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, default_value = "Pope")]
    pub zone: Zone,
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// uuid, uuid prefix, or `"LDA 3@Pope"`.
    pub key: String,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[arg(long)]
    pub zone: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub crit: Option<String>,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub zone: Zone,
    #[arg(long)]
    pub tipo: FindingType,
    #[arg(long)]
    pub desc: String,
    #[command(flatten)]
    pub fields: DetailFields,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    pub key: String,
    #[arg(long)]
    pub zone: Option<Zone>,
    #[arg(long)]
    pub tipo: Option<FindingType>,
    #[arg(long)]
    pub desc: Option<String>,
    #[command(flatten)]
    pub fields: DetailFields,
}

#[derive(Debug, Args)]
pub struct DetailFields {
    #[arg(long)]
    pub crit: Option<Criticality>,
    #[arg(long)]
    pub status: Option<Status>,
    #[arg(long)]
    pub doc: Option<DocumentKind>,
    #[arg(long = "cod-doc")]
    pub cod_doc: Option<String>,
    #[arg(long)]
    pub fecha: Option<String>,
    #[arg(long)]
    pub obs: Option<String>,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub key: String,
    #[arg(long)]
    pub yes: bool,
}

#[derive(Debug, Args)]
pub struct ClearArgs {
    #[arg(long)]
    pub yes: bool,
}

#[derive(Debug, Args)]
pub struct BulkArgs {
    #[arg(long)]
    pub zone: Zone,
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Xlsx,
    Csv,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[arg(value_enum)]
    pub format: ExportFormat,
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct LogsArgs {
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct UiArgs {}

#[derive(Debug, Args)]
pub struct CompletionArgs {
    pub shell: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[arg(long)]
    pub show: bool,
}

struct Session {
    home_dir: PathBuf,
    cfg: EffectiveConfig,
    ui: UiConfig,
    data_path: PathBuf,
    json: bool,
    dry_run: bool,
    pass: Option<String>,
}

#[derive(Debug, Serialize)]
struct ZoneCount {
    zone: Zone,
    count: usize,
}

#[derive(Debug, Serialize)]
struct ListOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    zone: Option<Zone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
    counts: Vec<ZoneCount>,
    lda: &'a [&'a Finding],
    fc: &'a [&'a Finding],
}

#[derive(Debug, Serialize)]
struct StatsOutput<'a> {
    filter: &'a DashboardFilter,
    summary: &'a crate::stats::Summary,
}

#[derive(Debug, Serialize)]
struct MutationOutput<'a> {
    command: &'a str,
    dry_run: bool,
    affected: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    finding: Option<&'a Finding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<serde_json::Value>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let stdin_is_tty = io::stdin().is_terminal();
    let stdout_is_tty = io::stdout().is_terminal();
    let stderr_is_tty = io::stderr().is_terminal();

    let home_dir = crate::config::home_dir()?;

    let env_config_path = std::env::var_os("HALLAZGOS_CONFIG").map(PathBuf::from);
    let cfg = crate::config::load(
        cli.config.as_deref().or(env_config_path.as_deref()),
        &home_dir,
    )
    .map_err(crate::exit::invalid_args_err)?;

    let color = stdout_is_tty && cfg.ui.color && !cli.no_color;

    let ui_cfg = UiConfig {
        color,
        stdin_is_tty,
        stdout_is_tty,
        stderr_is_tty,
        max_table_rows: cfg.ui.max_table_rows,
        quiet: cli.quiet,
        verbose: cli.verbose,
    };

    let data_path = match &cli.data {
        Some(p) => crate::config::expand_home(&p.to_string_lossy(), &home_dir),
        None => cfg.store.path.clone(),
    };
    if ui_cfg.verbose {
        eprintln!("datos: {}", data_path.display());
    }

    let pass = cli
        .pass
        .clone()
        .or_else(|| std::env::var("HALLAZGOS_PASS").ok())
        .filter(|p| !p.is_empty());

    let session = Session {
        home_dir,
        cfg,
        ui: ui_cfg,
        data_path,
        json: cli.json,
        dry_run: cli.dry_run,
        pass,
    };

    match cli.command {
        Commands::List(args) => cmd_list(&session, args),
        Commands::Show(args) => cmd_show(&session, args),
        Commands::Stats(args) => cmd_stats(&session, args),
        Commands::Add(args) => cmd_add(&session, args),
        Commands::Edit(args) => cmd_edit(&session, args),
        Commands::Delete(args) => cmd_delete(&session, args),
        Commands::Clear(args) => cmd_clear(&session, args),
        Commands::Renumber => cmd_renumber(&session),
        Commands::Bulk(args) => cmd_bulk(&session, args),
        Commands::Export(args) => cmd_export(&session, args),
        Commands::Import(args) => cmd_import(&session, args),
        Commands::Logs(args) => {
            let entries = crate::logs::list_logs(&session.home_dir, args.limit)?;
            if session.json {
                write_json(&entries)
            } else {
                crate::ui::print_logs(&entries, &session.ui);
                Ok(())
            }
        }
        Commands::Ui(_args) => {
            if session.json {
                return Err(crate::exit::invalid_args("ui no admite --json"));
            }
            if !(session.ui.stdin_is_tty && session.ui.stdout_is_tty) {
                return Err(crate::exit::invalid_args(
                    "ui requiere una terminal (stdin + stdout)",
                ));
            }
            let store = load_store(&session)?;
            crate::tui::run(store, session.ui.color)
        }
        Commands::Completion(args) => {
            let shell = parse_shell(&args.shell)?;
            let mut cmd = Cli::command();
            let mut out = std::io::stdout().lock();
            clap_complete::generate(shell, &mut cmd, "hallazgos", &mut out);
            Ok(())
        }
        Commands::Config(args) => {
            if args.show {
                if session.json {
                    write_json(&session.cfg)?;
                } else {
                    println!("{}", toml::to_string_pretty(&session.cfg)?);
                }
            } else if !session.ui.quiet {
                eprintln!("config: use `hallazgos config --show`");
            }
            Ok(())
        }
    }
}

fn cmd_list(s: &Session, args: ListArgs) -> Result<()> {
    let store = load_store(s)?;
    let term = args.search.as_deref().map(str::trim).unwrap_or("");
    let listing = crate::view::search(store.findings(), args.zone, term);
    let counts = crate::view::zone_counts(store.findings());
    let active = term.is_empty().then_some(args.zone);

    if s.json {
        return write_json(&ListOutput {
            zone: active,
            search: (!term.is_empty()).then_some(term),
            counts: counts
                .iter()
                .map(|&(zone, count)| ZoneCount { zone, count })
                .collect(),
            lda: &listing.lda,
            fc: &listing.fc,
        });
    }

    crate::ui::print_zone_tabs(&counts, active, &s.ui);
    let heading = match active {
        Some(zone) => format!("Zona {zone}"),
        None => format!("Búsqueda \"{term}\" en todas las zonas"),
    };
    crate::ui::print_listing(&listing, &heading, &s.ui);
    Ok(())
}

fn cmd_show(s: &Session, args: ShowArgs) -> Result<()> {
    let store = load_store(s)?;
    let finding = resolve_key(&store, &args.key, &s.ui)?;
    if s.json {
        write_json(finding)
    } else {
        crate::ui::print_finding(finding, &s.ui);
        Ok(())
    }
}

fn cmd_stats(s: &Session, args: StatsArgs) -> Result<()> {
    let filter = DashboardFilter {
        zone: parse_filter(args.zone.as_deref(), "zona")?,
        status: parse_filter(args.status.as_deref(), "estado")?,
        criticality: parse_filter(args.crit.as_deref(), "criticidad")?,
    };

    let store = load_store(s)?;
    let visible = filter.apply(store.findings());
    let summary = crate::stats::summarize(&visible);

    if s.json {
        write_json(&StatsOutput {
            filter: &filter,
            summary: &summary,
        })
    } else {
        crate::ui::print_summary(&summary, &filter, &s.ui);
        Ok(())
    }
}

fn cmd_add(s: &Session, args: AddArgs) -> Result<()> {
    require_admin(s.pass.as_deref(), &s.cfg.admin.passcode)?;

    let mut input = FindingInput::new(args.zone, args.tipo, args.desc);
    let fields = args.fields;
    if let Some(crit) = fields.crit {
        input.criticality = crit;
    }
    if let Some(status) = fields.status {
        input.status = selectable_status(status)?;
    }
    if let Some(doc) = fields.doc {
        input.document = doc;
    }
    if let Some(code) = fields.cod_doc {
        input.document_code = code.trim().to_string();
    }
    if let Some(fecha) = fields.fecha {
        input.closing_date =
            crate::dates::normalize_cli_date(&fecha).map_err(crate::exit::invalid_args_err)?;
    }
    if let Some(obs) = fields.obs {
        input.remarks = obs.trim().to_string();
    }

    let mut store = load_store(s)?;
    let created = store.create(input)?.clone();
    commit(
        s,
        &store,
        "add",
        std::slice::from_ref(&created.uuid),
        serde_json::json!({ "codigo": created.code(), "zona": created.zone }),
    )?;

    if s.json {
        return write_json(&MutationOutput {
            command: "add",
            dry_run: s.dry_run,
            affected: 1,
            finding: Some(&created),
            detail: None,
        });
    }
    if !s.ui.quiet {
        println!("Registro creado: {} ({})", created.code(), created.zone);
    }
    if s.ui.verbose {
        crate::ui::print_finding(&created, &s.ui);
    }
    Ok(())
}

fn cmd_edit(s: &Session, args: EditArgs) -> Result<()> {
    require_admin(s.pass.as_deref(), &s.cfg.admin.passcode)?;

    let patch = build_patch(&args)?;
    if patch.is_empty() {
        return Err(crate::exit::invalid_args(
            "edit: no se indicó ningún campo para modificar",
        ));
    }

    let mut store = load_store(s)?;
    let uuid = resolve_key(&store, &args.key, &s.ui)?.uuid.clone();
    let Some(updated) = store.update(&uuid, patch)? else {
        return Err(crate::exit::invalid_args(format!(
            "registro no encontrado: {}",
            args.key
        )));
    };
    let updated = updated.clone();
    commit(
        s,
        &store,
        "edit",
        std::slice::from_ref(&updated.uuid),
        serde_json::json!({ "codigo": updated.code(), "zona": updated.zone }),
    )?;

    if s.json {
        return write_json(&MutationOutput {
            command: "edit",
            dry_run: s.dry_run,
            affected: 1,
            finding: Some(&updated),
            detail: None,
        });
    }
    if !s.ui.quiet {
        println!("Registro actualizado: {} ({})", updated.code(), updated.zone);
    }
    if s.ui.verbose {
        crate::ui::print_finding(&updated, &s.ui);
    }
    Ok(())
}

fn cmd_delete(s: &Session, args: DeleteArgs) -> Result<()> {
    require_admin(s.pass.as_deref(), &s.cfg.admin.passcode)?;

    let mut store = load_store(s)?;
    let target = resolve_key(&store, &args.key, &s.ui)?.clone();

    if !args.yes {
        if !(s.ui.stdin_is_tty && s.ui.stderr_is_tty) {
            return Err(crate::exit::invalid_args(
                "delete sin terminal requiere --yes",
            ));
        }
        let prompt = format!(
            "¿Eliminar {} ({})? Escriba 'si' para confirmar: ",
            target.code(),
            target.zone
        );
        if !confirm_exact(&prompt, "si")? {
            if !s.ui.quiet {
                eprintln!("Cancelado.");
            }
            return Ok(());
        }
    }

    let Some(removed) = store.delete(&target.uuid) else {
        return Err(crate::exit::invalid_args(format!(
            "registro no encontrado: {}",
            args.key
        )));
    };
    commit(
        s,
        &store,
        "delete",
        std::slice::from_ref(&removed.uuid),
        serde_json::json!({ "codigo": removed.code(), "zona": removed.zone }),
    )?;

    if s.json {
        return write_json(&MutationOutput {
            command: "delete",
            dry_run: s.dry_run,
            affected: 1,
            finding: Some(&removed),
            detail: None,
        });
    }
    if !s.ui.quiet {
        println!("Registro eliminado: {} ({})", removed.code(), removed.zone);
    }
    Ok(())
}

fn cmd_clear(s: &Session, args: ClearArgs) -> Result<()> {
    require_admin(s.pass.as_deref(), &s.cfg.admin.passcode)?;

    let mut store = load_replaceable(s);
    if !args.yes {
        if !(s.ui.stdin_is_tty && s.ui.stderr_is_tty) {
            return Err(crate::exit::invalid_args("clear sin terminal requiere --yes"));
        }
        let prompt = format!(
            "Se borrarán los {} registros. Escriba 'borrar' para confirmar: ",
            store.len()
        );
        if !confirm_exact(&prompt, "borrar")? {
            if !s.ui.quiet {
                eprintln!("Cancelado.");
            }
            return Ok(());
        }
    }

    let affected: Vec<String> = store.findings().iter().map(|f| f.uuid.clone()).collect();
    let n = store.clear();
    commit(
        s,
        &store,
        "clear",
        &affected,
        serde_json::json!({ "borrados": n }),
    )?;

    if s.json {
        return write_json(&MutationOutput {
            command: "clear",
            dry_run: s.dry_run,
            affected: n,
            finding: None,
            detail: None,
        });
    }
    if !s.ui.quiet {
        println!("Se borraron {n} registros.");
    }
    Ok(())
}

fn cmd_renumber(s: &Session) -> Result<()> {
    require_admin(s.pass.as_deref(), &s.cfg.admin.passcode)?;

    let mut store = load_store(s)?;
    let before: Vec<(String, String)> = store
        .findings()
        .iter()
        .map(|f| (f.uuid.clone(), f.code()))
        .collect();
    store.renumber();

    let changed: Vec<serde_json::Value> = store
        .findings()
        .iter()
        .filter_map(|f| {
            let old = before.iter().find(|(u, _)| *u == f.uuid)?;
            (old.1 != f.code()).then(|| {
                serde_json::json!({ "uuid": f.uuid, "antes": old.1, "despues": f.code() })
            })
        })
        .collect();
    let affected: Vec<String> = changed
        .iter()
        .filter_map(|c| c.get("uuid").and_then(|u| u.as_str()).map(str::to_string))
        .collect();
    let detail = serde_json::json!({ "renumerados": changed });
    commit(s, &store, "renumber", &affected, detail.clone())?;

    if s.json {
        return write_json(&MutationOutput {
            command: "renumber",
            dry_run: s.dry_run,
            affected: affected.len(),
            finding: None,
            detail: Some(detail),
        });
    }
    if !s.ui.quiet {
        println!(
            "Renumeración completa: {} registros, {} códigos cambiados.",
            store.len(),
            affected.len()
        );
    }
    Ok(())
}

fn cmd_bulk(s: &Session, args: BulkArgs) -> Result<()> {
    require_admin(s.pass.as_deref(), &s.cfg.admin.passcode)?;

    let text = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("no se pudo leer: {}", path.display()))
            .map_err(crate::exit::invalid_args_err)?,
        None => {
            if s.ui.stdin_is_tty {
                return Err(crate::exit::invalid_args(
                    "bulk requiere --file o el bloque por stdin",
                ));
            }
            let mut buf = String::new();
            io::stdin()
                .lock()
                .read_to_string(&mut buf)
                .context("no se pudo leer stdin")?;
            buf
        }
    };

    let parse = crate::bulk::parse(&text, args.zone);
    let findings = parse.clone().into_findings()?;

    let mut store = load_store(s)?;
    let uuids: Vec<String> = findings.iter().map(|f| f.uuid.clone()).collect();
    let inserted = store.bulk_insert(findings);
    let detail = serde_json::json!({
        "zona": args.zone,
        "cargados": inserted,
        "omitidas": parse.rejected,
    });
    commit(s, &store, "bulk", &uuids, detail.clone())?;

    if s.json {
        return write_json(&MutationOutput {
            command: "bulk",
            dry_run: s.dry_run,
            affected: inserted,
            finding: None,
            detail: Some(detail),
        });
    }
    crate::ui::print_bulk_result(&parse, args.zone, &s.ui);
    Ok(())
}

fn cmd_export(s: &Session, args: ExportArgs) -> Result<()> {
    let store = load_store(s)?;
    let findings = store.findings();

    if args.format == ExportFormat::Json && args.out.as_deref() == Some(Path::new("-")) {
        let buf = crate::export::to_json_string(findings)?;
        return write_stdout(buf.as_bytes());
    }

    let out = args.out.unwrap_or_else(|| {
        PathBuf::from(match args.format {
            ExportFormat::Json => &s.cfg.export.json_file,
            ExportFormat::Xlsx => &s.cfg.export.xlsx_file,
            ExportFormat::Csv => &s.cfg.export.csv_file,
        })
    });

    if s.dry_run {
        if !s.ui.quiet {
            println!(
                "dry-run: se exportarían {} registros a {}",
                findings.len(),
                out.display()
            );
        }
        return Ok(());
    }

    match args.format {
        ExportFormat::Json => crate::export::write_json(&out, findings)?,
        ExportFormat::Xlsx => {
            crate::export::write_xlsx(&out, &s.cfg.export.sheet_name, findings)?
        }
        ExportFormat::Csv => crate::export::write_csv(&out, findings)?,
    }

    if s.json {
        return write_json(&serde_json::json!({
            "format": format!("{:?}", args.format).to_lowercase(),
            "path": out.display().to_string(),
            "records": findings.len(),
        }));
    }
    if !s.ui.quiet {
        println!("Exportados {} registros a {}", findings.len(), out.display());
    }
    Ok(())
}

fn cmd_import(s: &Session, args: ImportArgs) -> Result<()> {
    require_admin(s.pass.as_deref(), &s.cfg.admin.passcode)?;

    let mut store = Store::default();
    let n = crate::export::import_json(&mut store, &args.file)?;
    let replaced = load_replaceable(s).len();
    let affected: Vec<String> = store.findings().iter().map(|f| f.uuid.clone()).collect();
    let detail = serde_json::json!({
        "origen": args.file.display().to_string(),
        "reemplazados": replaced,
        "importados": n,
    });
    commit(s, &store, "import", &affected, detail.clone())?;

    if s.json {
        return write_json(&MutationOutput {
            command: "import",
            dry_run: s.dry_run,
            affected: n,
            finding: None,
            detail: Some(detail),
        });
    }
    if !s.ui.quiet {
        println!("Importados {n} registros (reemplazan {replaced}).");
    }
    Ok(())
}

// Records read without a uuid get one here, and it is written back right away
// so every later command sees the same key. `--dry-run` leaves the file alone.
fn load_store(s: &Session) -> Result<Store> {
    let (store, filled) = Store::load_normalized(&s.data_path)?;
    if filled > 0 && !s.dry_run {
        store.save(&s.data_path)?;
        if s.ui.verbose {
            eprintln!("datos: uuid asignado a {filled} registros");
        }
    }
    Ok(store)
}

// For commands that overwrite the whole file: an unreadable working file
// counts as empty instead of blocking the replacement.
fn load_replaceable(s: &Session) -> Store {
    match Store::load(&s.data_path) {
        Ok(store) => store,
        Err(e) => {
            if s.ui.verbose {
                eprintln!("aviso: se reemplaza un archivo de datos ilegible: {e:#}");
            }
            Store::default()
        }
    }
}

fn commit(
    s: &Session,
    store: &Store,
    command: &str,
    affected: &[String],
    detail: serde_json::Value,
) -> Result<()> {
    if s.dry_run {
        if !s.ui.quiet && !s.json {
            eprintln!("dry-run: no se guardaron cambios en {}", s.data_path.display());
        }
        return Ok(());
    }

    store.save(&s.data_path)?;

    if !s.cfg.logs.enabled {
        return Ok(());
    }
    let at = time::OffsetDateTime::now_utc();
    let log_path = crate::logs::write_mutation_log(
        &s.home_dir,
        command,
        at,
        "ok",
        &s.data_path,
        affected,
        detail,
    )
    .map_err(|e| {
        anyhow!("{command}: los datos se guardaron, pero falló el registro de auditoría: {e}")
    })?;
    if s.ui.verbose {
        eprintln!("registro: {}", log_path.display());
    }
    Ok(())
}

fn require_admin(pass: Option<&str>, expected: &str) -> Result<()> {
    match pass {
        None => Err(crate::exit::admin_required(
            "esta operación requiere modo administrador (--pass o $HALLAZGOS_PASS)",
        )),
        Some(p) if p == expected => Ok(()),
        Some(_) => Err(crate::exit::admin_required("Contraseña incorrecta")),
    }
}

fn resolve_key<'a>(store: &'a Store, key: &str, ui: &UiConfig) -> Result<&'a Finding> {
    match store.resolve(key) {
        Resolve::Found(f) => Ok(f),
        Resolve::NotFound => Err(crate::exit::invalid_args(format!(
            "registro no encontrado: {key}"
        ))),
        Resolve::Ambiguous(candidates) => {
            if ui.stdin_is_tty && ui.stderr_is_tty {
                match interactive::prompt_candidate(&candidates)
                    .map_err(crate::exit::invalid_args_err)?
                {
                    Some(idx) => Ok(candidates[idx]),
                    None => Err(crate::exit::invalid_args("selección cancelada")),
                }
            } else {
                let codes: Vec<String> = candidates
                    .iter()
                    .map(|f| format!("{}@{} ({})", f.code(), f.zone, f.uuid))
                    .collect();
                Err(crate::exit::invalid_args(format!(
                    "la clave {key} coincide con {} registros: {}",
                    candidates.len(),
                    codes.join(", ")
                )))
            }
        }
    }
}

fn build_patch(args: &EditArgs) -> Result<FindingPatch> {
    let f = &args.fields;
    Ok(FindingPatch {
        zone: args.zone,
        kind: args.tipo,
        description: args.desc.clone(),
        criticality: f.crit,
        status: f.status.map(selectable_status).transpose()?,
        document: f.doc,
        document_code: f.cod_doc.as_ref().map(|c| c.trim().to_string()),
        closing_date: f
            .fecha
            .as_deref()
            .map(crate::dates::normalize_cli_date)
            .transpose()
            .map_err(crate::exit::invalid_args_err)?,
        remarks: f.obs.as_ref().map(|o| o.trim().to_string()),
    })
}

fn selectable_status(status: Status) -> Result<Status> {
    if status.is_selectable() {
        return Ok(status);
    }
    Err(crate::exit::invalid_args(format!(
        "estado no seleccionable: {status} (EJECUTADO|EN PROCESO|ATRASADO)"
    )))
}

fn parse_filter<T>(raw: Option<&str>, what: &str) -> Result<Option<T>>
where
    T: std::str::FromStr<Err = String>,
{
    let Some(raw) = raw.map(str::trim) else {
        return Ok(None);
    };
    if raw.is_empty() || raw.eq_ignore_ascii_case("TODAS") || raw.eq_ignore_ascii_case("TODOS") {
        return Ok(None);
    }
    raw.parse::<T>()
        .map(Some)
        .map_err(|e| crate::exit::invalid_args(format!("filtro de {what}: {e}")))
}

fn write_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut buf = serde_json::to_vec_pretty(value)?;
    buf.push(b'\n');
    write_stdout(&buf)
}

fn write_stdout(buf: &[u8]) -> Result<()> {
    use std::io::Write;

    let mut stdout = std::io::stdout().lock();
    match stdout.write_all(buf) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn confirm_exact(prompt: &str, expected: &str) -> Result<bool> {
    use std::io::{BufRead, Write};

    let mut stderr = std::io::stderr().lock();
    write!(stderr, "{prompt}")?;
    stderr.flush()?;

    let mut input = String::new();
    let mut stdin = std::io::stdin().lock();
    let n = stdin.read_line(&mut input)?;
    if n == 0 {
        return Ok(false);
    }
    Ok(input.trim().eq_ignore_ascii_case(expected))
}

fn parse_shell(s: &str) -> Result<clap_complete::Shell> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "bash" => Ok(clap_complete::Shell::Bash),
        "zsh" => Ok(clap_complete::Shell::Zsh),
        "fish" => Ok(clap_complete::Shell::Fish),
        other => Err(crate::exit::invalid_args(format!(
            "shell no soportada: {other} (bash|zsh|fish)"
        ))),
    }
}
