use anyhow::Error;
use std::io::{self, Write};
use unicode_width::UnicodeWidthChar;

use crate::bulk::BulkParse;
use crate::core::{Criticality, Finding, Status, Zone};
use crate::logs::LogEntry;
use crate::stats::Summary;
use crate::view::{DashboardFilter, Listing};

const DESC_MAX_CHARS: usize = 60;
const BAR_WIDTH: usize = 24;

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub color: bool,
    pub stdin_is_tty: bool,
    pub stdout_is_tty: bool,
    pub stderr_is_tty: bool,
    pub max_table_rows: usize,
    pub quiet: bool,
    pub verbose: bool,
}

pub fn eprintln_error(err: &Error) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "Error:");
    let _ = writeln!(stderr, "  {err}");

    let mut causes = err.chain().skip(1).peekable();
    if causes.peek().is_some() {
        let _ = writeln!(stderr, "Causa:");
        for cause in causes {
            let _ = writeln!(stderr, "  - {cause}");
        }
    }

    let _ = writeln!(stderr, "Siguiente paso:");
    let _ = writeln!(
        stderr,
        "  - Consulte los comandos y opciones disponibles con `hallazgos --help`"
    );
}

pub fn print_zone_tabs(counts: &[(Zone, usize)], active: Option<Zone>, cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    let mut out = io::stdout().lock();
    let tabs: Vec<String> = counts
        .iter()
        .map(|(z, n)| {
            if Some(*z) == active {
                bold(&format!("[{z} ({n})]"), cfg.color)
            } else {
                format!(" {z} ({n}) ")
            }
        })
        .collect();
    let _ = writeln!(out, "{}", tabs.join(" "));
}

pub fn print_listing(listing: &Listing<'_>, heading: &str, cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "{heading}");

    if listing.is_empty() {
        let _ = writeln!(out, "Sin registros.");
        return;
    }

    for (title, rows) in [("LDA", &listing.lda), ("FC", &listing.fc)] {
        let _ = writeln!(out);
        let shown = rows.len().min(cfg.max_table_rows.max(1));
        if rows.len() > shown {
            let _ = writeln!(out, "{title} ({shown} de {}):", rows.len());
        } else {
            let _ = writeln!(out, "{title} ({}):", rows.len());
        }
        if rows.is_empty() {
            let _ = writeln!(out, "  (vacío)");
            continue;
        }
        print_findings_table(&mut out, &rows[..shown], cfg);
    }
}

pub fn print_finding(f: &Finding, cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "{}  [{}]", bold(&f.code(), cfg.color), f.zone);
    let _ = writeln!(out, "  Descripción:   {}", f.description);
    let _ = writeln!(
        out,
        "  Criticidad:    {}",
        format_criticality(f.criticality, cfg.color)
    );
    let _ = writeln!(out, "  Estado:        {}", format_status(f.status, cfg.color));
    let _ = writeln!(
        out,
        "  F. Cierre:     {}",
        or_dash(&crate::dates::format_display(&f.closing_date))
    );
    if f.document.is_none() {
        let _ = writeln!(out, "  Documento:     {}", f.document);
    } else {
        let _ = writeln!(
            out,
            "  Documento:     {} {}",
            f.document,
            or_dash(&f.document_code)
        );
    }
    let _ = writeln!(out, "  Observaciones: {}", or_dash(&f.remarks));
    if cfg.verbose {
        let _ = writeln!(out, "  uuid:          {}", f.uuid);
    }
}

pub fn print_summary(summary: &Summary, filter: &DashboardFilter, cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    let mut out = io::stdout().lock();

    let scope = |v: Option<String>| v.unwrap_or_else(|| "TODAS".to_string());
    let _ = writeln!(
        out,
        "Filtros: zona={}  estado={}  criticidad={}",
        scope(filter.zone.map(|z| z.to_string())),
        scope(filter.status.map(|s| s.to_string())),
        scope(filter.criticality.map(|c| c.to_string())),
    );

    let t = &summary.totals;
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Total: {}  LDA: {}  FC: {}  Ejecutados: {} ({}%)",
        t.total, t.lda, t.fc, t.executed, t.executed_pct
    );
    let _ = writeln!(out, "Avance  {}", bar(t.executed_pct, BAR_WIDTH));

    let _ = writeln!(out);
    let _ = writeln!(out, "Ejecución por criticidad:");
    for c in &summary.by_criticality {
        let label = format_criticality(c.criticality, cfg.color);
        let _ = writeln!(
            out,
            "  {label}  {}  {:>3}%  ({}/{})",
            bar(c.pct, BAR_WIDTH),
            c.pct,
            c.executed,
            c.total
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Zona / tipo:");
    let zone_w = Zone::ALL
        .iter()
        .map(|z| visible_width_ansi(z.as_str()))
        .max()
        .unwrap_or(0);
    let _ = writeln!(out, "  {}  {:>5}  {:>5}", pad_end_ansi("Zona", zone_w), "LDA", "FC");
    for z in &summary.zone_types {
        let _ = writeln!(
            out,
            "  {}  {:>5}  {:>5}",
            pad_end_ansi(z.zone.as_str(), zone_w),
            z.lda,
            z.fc
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Criticidad / estado:");
    let _ = writeln!(
        out,
        "  {}  {:>9}  {:>10}  {:>9}  {:>8}",
        pad_end_ansi("Crit", 4),
        Status::Executed.as_str(),
        Status::InProgress.as_str(),
        Status::Pending.as_str(),
        Status::Overdue.as_str()
    );
    for c in &summary.criticality_status {
        let _ = writeln!(
            out,
            "  {}  {:>9}  {:>10}  {:>9}  {:>8}",
            pad_end_ansi(&format_criticality(c.criticality, cfg.color), 4),
            c.executed,
            c.in_progress,
            c.pending,
            c.overdue
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Pareto por zona:");
    let max = summary.pareto.iter().map(|p| p.count).max().unwrap_or(0);
    for p in &summary.pareto {
        let _ = writeln!(
            out,
            "  {}  {:>4}  {}  acum. {:>3}%",
            pad_end_ansi(p.zone.as_str(), zone_w),
            p.count,
            pad_end_ansi(&scaled_bar(p.count, max, BAR_WIDTH), BAR_WIDTH),
            p.cumulative_pct
        );
    }
}

pub fn print_bulk_result(parse: &BulkParse, zone: Zone, cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "{} registros cargados en {zone}", parse.parsed());
    if parse.rejected.is_empty() {
        return;
    }
    let _ = writeln!(out, "Líneas omitidas ({}):", parse.rejected.len());
    let shown = if cfg.verbose {
        parse.rejected.len()
    } else {
        parse.rejected.len().min(5)
    };
    for r in parse.rejected.iter().take(shown) {
        let _ = writeln!(
            out,
            "  - línea {}: {} ({})",
            r.line,
            r.reason.label(),
            truncate_end(&r.text, DESC_MAX_CHARS)
        );
    }
    if parse.rejected.len() > shown {
        let _ = writeln!(out, "  - ... ({} más)", parse.rejected.len() - shown);
    }
}

pub fn print_logs(entries: &[LogEntry], cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    let mut out = io::stdout().lock();
    if entries.is_empty() {
        let _ = writeln!(out, "Sin registros de auditoría.");
        return;
    }
    for e in entries {
        let n = e.log.affected.len();
        let _ = writeln!(
            out,
            "{}  {:<9}  {:<6}  {n} afectados",
            e.log.at, e.log.command, e.log.status
        );
        if cfg.verbose {
            let _ = writeln!(out, "  archivo: {}", e.file);
        }
    }
}

fn print_findings_table(out: &mut dyn Write, rows: &[&Finding], cfg: &UiConfig) {
    let label_code = "Código";
    let label_zone = "Zona";
    let label_crit = "Crit";
    let label_status = "Estado";
    let label_desc = "Descripción";

    let code_w = rows
        .iter()
        .map(|f| visible_width_ansi(&f.code()))
        .max()
        .unwrap_or(0)
        .max(visible_width_ansi(label_code));
    let zone_w = rows
        .iter()
        .map(|f| visible_width_ansi(f.zone.as_str()))
        .max()
        .unwrap_or(0)
        .max(visible_width_ansi(label_zone));
    let crit_w = visible_width_ansi(label_crit);
    let status_w = Status::ALL
        .iter()
        .map(|s| visible_width_ansi(s.as_str()))
        .max()
        .unwrap_or(0);

    let _ = writeln!(
        out,
        "  {}  {}  {}  {}  {}",
        pad_end_ansi(label_code, code_w),
        pad_end_ansi(label_zone, zone_w),
        pad_end_ansi(label_crit, crit_w),
        pad_end_ansi(label_status, status_w),
        label_desc
    );
    let _ = writeln!(
        out,
        "  {}  {}  {}  {}  {}",
        "-".repeat(code_w),
        "-".repeat(zone_w),
        "-".repeat(crit_w),
        "-".repeat(status_w),
        "-".repeat(visible_width_ansi(label_desc))
    );

    for f in rows {
        let _ = writeln!(
            out,
            "  {}  {}  {}  {}  {}",
            pad_end_ansi(&f.code(), code_w),
            pad_end_ansi(f.zone.as_str(), zone_w),
            pad_end_ansi(&format_criticality(f.criticality, cfg.color), crit_w),
            pad_end_ansi(&format_status(f.status, cfg.color), status_w),
            truncate_end(&f.description, DESC_MAX_CHARS)
        );
    }
}

pub fn format_status(status: Status, color: bool) -> String {
    let s = status.as_str();
    if !color {
        return s.to_string();
    }
    let code = match status {
        Status::Executed => "32",
        Status::InProgress => "34",
        Status::Pending => "33",
        Status::Overdue => "31",
    };
    format!("\x1b[{code}m{s}\x1b[0m")
}

pub fn format_criticality(c: Criticality, color: bool) -> String {
    let s = c.as_str();
    if !color {
        return s.to_string();
    }
    let code = match c {
        Criticality::A => "31",
        Criticality::B => "33",
        Criticality::C => "32",
    };
    format!("\x1b[{code}m{s}\x1b[0m")
}

fn bold(s: &str, color: bool) -> String {
    if color {
        format!("\x1b[1m{s}\x1b[0m")
    } else {
        s.to_string()
    }
}

fn or_dash(s: &str) -> &str {
    if s.trim().is_empty() { "-" } else { s }
}

pub fn bar(pct: u32, width: usize) -> String {
    let filled = (pct.min(100) as usize * width + 50) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn scaled_bar(value: usize, max: usize, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let filled = (value * width + max / 2) / max;
    "█".repeat(filled.min(width))
}

fn truncate_end(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{head}...")
}

fn pad_end_ansi(s: &str, width: usize) -> String {
    let w = visible_width_ansi(s);
    if w >= width {
        return s.to_string();
    }
    format!("{s}{}", " ".repeat(width - w))
}

fn visible_width_ansi(s: &str) -> usize {
    let mut width: usize = 0;
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            let _ = chars.next();
            for ch2 in chars.by_ref() {
                if ch2 == 'm' {
                    break;
                }
            }
            continue;
        }
        width = width.saturating_add(UnicodeWidthChar::width(ch).unwrap_or(0));
    }
    width
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_width_skips_ansi_sequences() {
        assert_eq!(visible_width_ansi(&format_status(Status::Overdue, true)), 8);
        assert_eq!(visible_width_ansi("Código"), 6);
    }

    #[test]
    fn colored_cells_pad_to_visible_width() {
        let cell = pad_end_ansi(&format_criticality(Criticality::A, true), 4);
        assert_eq!(visible_width_ansi(&cell), 4);
        assert!(cell.starts_with("\x1b[31m"));
    }

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(bar(0, 4), "░░░░");
        assert_eq!(bar(50, 4), "██░░");
        assert_eq!(bar(100, 4), "████");
        assert_eq!(bar(250, 4), "████");
        assert_eq!(scaled_bar(3, 6, 4), "██");
        assert_eq!(scaled_bar(0, 0, 4), "");
    }

    #[test]
    fn truncate_end_keeps_short_text() {
        assert_eq!(truncate_end("corto", 10), "corto");
        assert_eq!(truncate_end("descripción larga", 8), "descr...");
    }
}
