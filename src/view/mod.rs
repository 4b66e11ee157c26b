use serde::Serialize;

use crate::core::{Criticality, Finding, FindingType, Status, Zone};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Listing<'a> {
    pub lda: Vec<&'a Finding>,
    pub fc: Vec<&'a Finding>,
}

impl Listing<'_> {
    pub fn len(&self) -> usize {
        self.lda.len() + self.fc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// A non-empty term ignores `active_zone` and searches every zone.
pub fn search<'a>(findings: &'a [Finding], active_zone: Zone, term: &str) -> Listing<'a> {
    let term = term.trim().to_lowercase();
    let visible: Vec<&Finding> = if term.is_empty() {
        findings.iter().filter(|f| f.zone == active_zone).collect()
    } else {
        findings.iter().filter(|f| matches_term(f, &term)).collect()
    };
    split_by_kind(visible)
}

fn matches_term(f: &Finding, term: &str) -> bool {
    f.description.to_lowercase().contains(term)
        || (!f.document_code.is_empty() && f.document_code.to_lowercase().contains(term))
        || f.code().to_lowercase().contains(term)
}

pub fn split_by_kind(visible: Vec<&Finding>) -> Listing<'_> {
    let (mut lda, mut fc): (Vec<&Finding>, Vec<&Finding>) =
        visible.into_iter().partition(|f| f.kind == FindingType::Lda);
    lda.sort_by_key(|f| (f.zone.precedence(), f.id));
    fc.sort_by_key(|f| (f.zone.precedence(), f.id));
    Listing { lda, fc }
}

pub fn zone_counts(findings: &[Finding]) -> Vec<(Zone, usize)> {
    Zone::ALL
        .iter()
        .map(|&z| (z, findings.iter().filter(|f| f.zone == z).count()))
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardFilter {
    pub zone: Option<Zone>,
    pub status: Option<Status>,
    pub criticality: Option<Criticality>,
}

impl DashboardFilter {
    pub fn matches(&self, f: &Finding) -> bool {
        self.zone.is_none_or(|z| f.zone == z)
            && self.status.is_none_or(|s| f.status == s)
            && self.criticality.is_none_or(|c| f.criticality == c)
    }

    pub fn apply<'a>(&self, findings: &'a [Finding]) -> Vec<&'a Finding> {
        findings.iter().filter(|f| self.matches(f)).collect()
    }

    pub fn is_all(&self) -> bool {
        *self == DashboardFilter::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DocumentKind;

    fn f(uuid: &str, zone: Zone, kind: FindingType, id: u32, desc: &str, code: &str) -> Finding {
        Finding {
            uuid: uuid.to_string(),
            id,
            zone,
            kind,
            description: desc.to_string(),
            criticality: Criticality::B,
            status: Status::InProgress,
            document: if code.is_empty() {
                DocumentKind::None
            } else {
                DocumentKind::Lila
            },
            document_code: code.to_string(),
            closing_date: String::new(),
            remarks: String::new(),
        }
    }

    fn sample() -> Vec<Finding> {
        vec![
            f("p-lda-2", Zone::Pope, FindingType::Lda, 2, "Bandeja de GOMA centro", ""),
            f("s-lda-1", Zone::Secado, FindingType::Lda, 1, "Escalera", "LILA-FA-MP-006"),
            f("p-lda-1", Zone::Pope, FindingType::Lda, 1, "Ducto", ""),
            f("s-fc-4", Zone::Secado, FindingType::Fc, 4, "Fuga de aceite", ""),
            f("c-fc-1", Zone::Clarificacion, FindingType::Fc, 1, "Goma en piso", ""),
        ]
    }

    fn uuids(v: &[&Finding]) -> Vec<String> {
        v.iter().map(|f| f.uuid.clone()).collect()
    }

    #[test]
    fn empty_term_scopes_to_active_zone_sorted_by_id() {
        let data = sample();
        let l = search(&data, Zone::Pope, "   ");
        assert_eq!(uuids(&l.lda), vec!["p-lda-1", "p-lda-2"]);
        assert!(l.fc.is_empty());
    }

    #[test]
    fn search_overrides_zone_scope() {
        let data = sample();
        let l = search(&data, Zone::Secado, "goma");
        assert_eq!(uuids(&l.lda), vec!["p-lda-2"]);
        assert_eq!(uuids(&l.fc), vec!["c-fc-1"]);
    }

    #[test]
    fn search_matches_document_code_and_finding_code() {
        let data = sample();
        let l = search(&data, Zone::Pope, "fa-mp");
        assert_eq!(uuids(&l.lda), vec!["s-lda-1"]);

        let l = search(&data, Zone::Pope, "FC 4");
        assert_eq!(uuids(&l.fc), vec!["s-fc-4"]);
        assert!(l.lda.is_empty());

        let l = search(&data, Zone::Pope, "lda 1");
        assert_eq!(uuids(&l.lda), vec!["p-lda-1", "s-lda-1"]);
    }

    #[test]
    fn zone_counts_follow_plant_order() {
        let data = sample();
        assert_eq!(
            zone_counts(&data),
            vec![
                (Zone::Pope, 2),
                (Zone::Secado, 2),
                (Zone::Formacion, 0),
                (Zone::Clarificacion, 1),
            ]
        );
    }

    #[test]
    fn dashboard_filter_combines_conditions() {
        let mut data = sample();
        data[3].status = Status::Executed;
        data[3].criticality = Criticality::A;

        assert_eq!(DashboardFilter::default().apply(&data).len(), 5);

        let only = DashboardFilter {
            zone: Some(Zone::Secado),
            status: Some(Status::Executed),
            criticality: None,
        };
        assert_eq!(uuids(&only.apply(&data)), vec!["s-fc-4"]);

        let none = DashboardFilter {
            criticality: Some(Criticality::C),
            ..DashboardFilter::default()
        };
        assert!(none.apply(&data).is_empty());
    }
}
