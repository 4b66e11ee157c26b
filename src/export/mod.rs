use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};
use serde_json::Value;

use crate::core::{Finding, FindingError, new_uuid};
use crate::store::Store;

pub const SHEET_HEADERS: [&str; 9] = [
    "ZONA",
    "Código",
    "Descripción",
    "Criticidad",
    "F. Cierre",
    "Estado",
    "Documento",
    "Cód. Doc",
    "Observaciones",
];

pub fn sheet_row(f: &Finding) -> [String; 9] {
    [
        f.zone.to_string(),
        f.code(),
        f.description.clone(),
        f.criticality.to_string(),
        crate::dates::format_display(&f.closing_date),
        f.status.to_string(),
        f.document.to_string(),
        f.document_code.clone(),
        f.remarks.clone(),
    ]
}

pub fn to_sheet_rows(findings: &[Finding]) -> Vec<[String; 9]> {
    findings.iter().map(sheet_row).collect()
}

pub fn write_xlsx(path: &Path, sheet_name: &str, findings: &[Finding]) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet
        .set_name(sheet_name)
        .with_context(|| format!("nombre de hoja inválido: {sheet_name}"))?;

    for (col, title) in SHEET_HEADERS.iter().enumerate() {
        let col = u16::try_from(col).context("demasiadas columnas")?;
        sheet.write_string_with_format(0, col, *title, &header)?;
    }
    for (idx, row) in to_sheet_rows(findings).iter().enumerate() {
        let r = u32::try_from(idx + 1).context("demasiadas filas para una hoja")?;
        for (col, value) in row.iter().enumerate() {
            let col = u16::try_from(col).context("demasiadas columnas")?;
            sheet.write_string(r, col, value)?;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("no se pudo escribir el Excel: {}", path.display()))?;
    Ok(())
}

pub fn write_csv(path: &Path, findings: &[Finding]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("no se pudo crear el CSV: {}", path.display()))?;
    wtr.write_record(SHEET_HEADERS)?;
    for row in to_sheet_rows(findings) {
        wtr.write_record(&row)?;
    }
    wtr.flush()
        .with_context(|| format!("no se pudo escribir el CSV: {}", path.display()))?;
    Ok(())
}

pub fn to_json_string(findings: &[Finding]) -> Result<String> {
    serde_json::to_string_pretty(findings).context("no se pudo serializar los registros (JSON)")
}

pub fn write_json(path: &Path, findings: &[Finding]) -> Result<()> {
    let buf = to_json_string(findings)?;
    std::fs::write(path, buf)
        .with_context(|| format!("no se pudo escribir el JSON: {}", path.display()))?;
    Ok(())
}

pub fn parse_json_snapshot(text: &str) -> Result<Vec<Finding>, FindingError> {
    parse_json_snapshot_counted(text).map(|(findings, _)| findings)
}

pub fn parse_json_snapshot_counted(text: &str) -> Result<(Vec<Finding>, usize), FindingError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| FindingError::ImportFormat(format!("JSON no válido ({e})")))?;
    let Value::Array(items) = value else {
        return Err(FindingError::ImportFormat(
            "el contenido no es un arreglo de registros".to_string(),
        ));
    };

    let mut findings = Vec::with_capacity(items.len());
    let mut filled = 0;
    for (idx, item) in items.into_iter().enumerate() {
        let mut f: Finding = serde_json::from_value(item).map_err(|e| {
            FindingError::ImportFormat(format!("registro #{}: {e}", idx + 1))
        })?;
        if f.uuid.trim().is_empty() {
            f.uuid = new_uuid();
            filled += 1;
        }
        f.enforce_document_code();
        findings.push(f);
    }
    Ok((findings, filled))
}

pub fn import_json(store: &mut Store, path: &Path) -> Result<usize> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("no se pudo leer: {}", path.display()))?;
    let findings = parse_json_snapshot(&text)?;
    let n = findings.len();
    store.replace_all(findings);
    Ok(n)
}
