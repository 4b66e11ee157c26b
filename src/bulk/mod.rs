use serde::Serialize;

use crate::core::{
    Criticality, DocumentKind, Finding, FindingError, FindingType, Status, Zone, new_uuid,
};

// Longer "document codes" with no remarks column are shifted remarks.
const SHIFTED_REMARKS_MIN_CHARS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    MissingCode,
    InvalidNumber,
}

impl RejectReason {
    pub const fn label(&self) -> &'static str {
        match self {
            RejectReason::MissingCode => "el primer campo no es un código LDA/FC",
            RejectReason::InvalidNumber => "el número del código no es válido",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedLine {
    pub line: usize,
    pub reason: RejectReason,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkParse {
    pub findings: Vec<Finding>,
    pub rejected: Vec<RejectedLine>,
}

impl BulkParse {
    pub fn parsed(&self) -> usize {
        self.findings.len()
    }

    pub fn into_findings(self) -> Result<Vec<Finding>, FindingError> {
        if self.findings.is_empty() {
            return Err(FindingError::NoParsedLines);
        }
        Ok(self.findings)
    }
}

// code, desc, crit, fecha, estado, doc, código doc, obs; tab or " - " separated.
pub fn parse(text: &str, zone: Zone) -> BulkParse {
    let mut out = BulkParse::default();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line, zone) {
            Ok(finding) => out.findings.push(finding),
            Err(reason) => out.rejected.push(RejectedLine {
                line: idx + 1,
                reason,
                text: line.trim().to_string(),
            }),
        }
    }
    out
}

fn parse_line(line: &str, zone: Zone) -> Result<Finding, RejectReason> {
    let mut parts: Vec<&str> = line.split('\t').collect();
    if parts.len() < 2 {
        parts = line.split(" - ").collect();
    }
    let parts: Vec<&str> = parts.into_iter().map(str::trim).collect();
    let field = |i: usize| parts.get(i).copied().unwrap_or("");

    let (kind, id) = match_code(field(0)).ok_or(RejectReason::MissingCode)??;

    let criticality = Criticality::from_label_or_default(field(2));
    let mut closing_date = field(3).to_string();
    if closing_date.contains('/') {
        closing_date = crate::dates::parse_import_date(&closing_date);
    }
    let status = Status::selectable_or_default(field(4));
    let document = DocumentKind::from_label_or_default(field(5));
    let mut document_code = field(6).to_string();
    let mut remarks = field(7).to_string();

    if document.is_none()
        && remarks.is_empty()
        && document_code.chars().count() > SHIFTED_REMARKS_MIN_CHARS
    {
        remarks = std::mem::take(&mut document_code);
    }

    let mut finding = Finding {
        uuid: new_uuid(),
        id,
        zone,
        kind,
        description: field(1).to_string(),
        criticality,
        status,
        document,
        document_code,
        closing_date,
        remarks,
    };
    finding.enforce_document_code();
    Ok(finding)
}

pub fn parse_code(s: &str) -> Option<(FindingType, u32)> {
    match_code(s.trim())?.ok()
}

/// Outer `None`: no code prefix at all. Inner `Err`: prefix present but the
/// digits are not a usable id.
fn match_code(s: &str) -> Option<Result<(FindingType, u32), RejectReason>> {
    let (kind, rest) = strip_kind(s)?;
    let rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '-' || c == '.');
    let digits: &str = &rest[..rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len())];
    if digits.is_empty() {
        return None;
    }
    Some(match digits.parse::<u32>() {
        Ok(id) if id > 0 => Ok((kind, id)),
        _ => Err(RejectReason::InvalidNumber),
    })
}

fn strip_kind(s: &str) -> Option<(FindingType, &str)> {
    for kind in FindingType::ALL {
        let tag = kind.as_str();
        if let Some(head) = s.get(..tag.len()) {
            if head.eq_ignore_ascii_case(tag) {
                return Some((kind, &s[tag.len()..]));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_separated_line_maps_every_column() {
        let text = "LDA 1 - Bandeja de goma centro - A - 25/04/25 - EJECUTADO - LILA - LILA-FA-MP-006 - Acceso limitado";
        let out = parse(text, Zone::Pope);
        assert_eq!(out.parsed(), 1);
        assert!(out.rejected.is_empty());

        let f = &out.findings[0];
        assert_eq!(f.kind, FindingType::Lda);
        assert_eq!(f.id, 1);
        assert_eq!(f.zone, Zone::Pope);
        assert_eq!(f.description, "Bandeja de goma centro");
        assert_eq!(f.criticality, Criticality::A);
        assert_eq!(f.closing_date, "2025-04-25");
        assert_eq!(f.status, Status::Executed);
        assert_eq!(f.document, DocumentKind::Lila);
        assert_eq!(f.document_code, "LILA-FA-MP-006");
        assert_eq!(f.remarks, "Acceso limitado");
        assert!(!f.uuid.is_empty());
    }

    #[test]
    fn tab_separated_line_relocates_shifted_remarks() {
        let text = "FC 2\tUna descripcion cualquiera\tB\t\tEN PROCESO\tSIN DOC\tEsta es una observacion bastante larga de mas de quince caracteres";
        let out = parse(text, Zone::Secado);
        assert_eq!(out.parsed(), 1);

        let f = &out.findings[0];
        assert_eq!(f.kind, FindingType::Fc);
        assert_eq!(f.id, 2);
        assert_eq!(f.closing_date, "");
        assert_eq!(f.document, DocumentKind::None);
        assert_eq!(f.document_code, "");
        assert_eq!(
            f.remarks,
            "Esta es una observacion bastante larga de mas de quince caracteres"
        );
    }

    #[test]
    fn short_code_without_document_is_dropped() {
        let out = parse("FC 3\tdesc\tC\t2024\tATRASADO\tSIN DOC\tCOD-1", Zone::Pope);
        let f = &out.findings[0];
        assert_eq!(f.closing_date, "2024");
        assert_eq!(f.status, Status::Overdue);
        assert_eq!(f.document_code, "");
        assert_eq!(f.remarks, "");
    }

    #[test]
    fn invalid_enum_values_fall_back_to_defaults() {
        let out = parse("lda-4\tx\tZ\t\tPENDIENTE\tMANUAL\tABC", Zone::Formacion);
        let f = &out.findings[0];
        assert_eq!(f.kind, FindingType::Lda);
        assert_eq!(f.id, 4);
        assert_eq!(f.criticality, Criticality::B);
        assert_eq!(f.status, Status::InProgress);
        assert_eq!(f.document, DocumentKind::None);
        assert_eq!(f.document_code, "");
    }

    #[test]
    fn lowercase_values_are_upper_cased() {
        let out = parse("FC.9\ty\tc\t\tejecutado\tpoe\tpoe-22", Zone::Pope);
        let f = &out.findings[0];
        assert_eq!(f.criticality, Criticality::C);
        assert_eq!(f.status, Status::Executed);
        assert_eq!(f.document, DocumentKind::Poe);
        assert_eq!(f.document_code, "poe-22");
    }

    #[test]
    fn malformed_lines_are_reported_not_thrown() {
        let text = "no code here\n\n   \nLDA 5 - ok\nFC - sin numero\nLDA 99999999999 - grande";
        let out = parse(text, Zone::Pope);
        assert_eq!(out.parsed(), 1);
        assert_eq!(out.findings[0].id, 5);

        let rejected: Vec<(usize, RejectReason)> = out
            .rejected
            .iter()
            .map(|r| (r.line, r.reason.clone()))
            .collect();
        assert_eq!(
            rejected,
            vec![
                (1, RejectReason::MissingCode),
                (5, RejectReason::MissingCode),
                (6, RejectReason::InvalidNumber),
            ]
        );
    }

    #[test]
    fn only_malformed_lines_fail_the_block() {
        let out = parse("no code here", Zone::Pope);
        assert_eq!(out.parsed(), 0);
        assert_eq!(out.into_findings(), Err(FindingError::NoParsedLines));
        assert_eq!(
            parse("", Zone::Pope).into_findings(),
            Err(FindingError::NoParsedLines)
        );
    }

    #[test]
    fn missing_fields_default() {
        let out = parse("LDA 7", Zone::Clarificacion);
        let f = &out.findings[0];
        assert_eq!(f.description, "");
        assert_eq!(f.criticality, Criticality::B);
        assert_eq!(f.status, Status::InProgress);
        assert_eq!(f.document, DocumentKind::None);
    }

    #[test]
    fn parse_code_accepts_separator_runs_and_trailing_text() {
        assert_eq!(parse_code("LDA 12"), Some((FindingType::Lda, 12)));
        assert_eq!(parse_code("fc-.- 3"), Some((FindingType::Fc, 3)));
        assert_eq!(parse_code("LDA7b"), Some((FindingType::Lda, 7)));
        assert_eq!(parse_code("LDAX 7"), None);
        assert_eq!(parse_code("XLDA 7"), None);
        assert_eq!(parse_code("LDA 0"), None);
    }
}
