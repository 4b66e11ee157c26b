use serde::Serialize;

use crate::core::{Criticality, Finding, FindingType, Status, Zone};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub totals: Totals,
    pub by_criticality: Vec<CriticalityExecution>,
    pub zone_types: Vec<ZoneTypeCounts>,
    pub criticality_status: Vec<CriticalityStatusCounts>,
    pub pareto: Vec<ParetoEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub total: usize,
    pub lda: usize,
    pub fc: usize,
    pub executed: usize,
    pub executed_pct: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriticalityExecution {
    pub criticality: Criticality,
    pub total: usize,
    pub executed: usize,
    pub pct: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneTypeCounts {
    pub zone: Zone,
    pub lda: usize,
    pub fc: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriticalityStatusCounts {
    pub criticality: Criticality,
    pub executed: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub overdue: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParetoEntry {
    pub zone: Zone,
    pub count: usize,
    pub cumulative: usize,
    pub cumulative_pct: u32,
}

/// `round(100 * part / total)` with halves rounded up; 0 for an empty total.
pub fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let part = part as u128;
    let total = total as u128;
    let pct = (200 * part + total) / (2 * total);
    u32::try_from(pct).unwrap_or(u32::MAX)
}

pub fn summarize(findings: &[&Finding]) -> Summary {
    let total = findings.len();
    let count = |pred: &dyn Fn(&Finding) -> bool| findings.iter().filter(|f| pred(f)).count();

    let executed = count(&|f| f.status == Status::Executed);
    let totals = Totals {
        total,
        lda: count(&|f| f.kind == FindingType::Lda),
        fc: count(&|f| f.kind == FindingType::Fc),
        executed,
        executed_pct: percent(executed, total),
    };

    let by_criticality = Criticality::ALL
        .iter()
        .map(|&c| {
            let bucket = count(&|f| f.criticality == c);
            let done = count(&|f| f.criticality == c && f.status == Status::Executed);
            CriticalityExecution {
                criticality: c,
                total: bucket,
                executed: done,
                pct: percent(done, bucket),
            }
        })
        .collect();

    let zone_types = Zone::ALL
        .iter()
        .map(|&z| ZoneTypeCounts {
            zone: z,
            lda: count(&|f| f.zone == z && f.kind == FindingType::Lda),
            fc: count(&|f| f.zone == z && f.kind == FindingType::Fc),
        })
        .collect();

    let criticality_status = Criticality::ALL
        .iter()
        .map(|&c| {
            let of = |s: Status| count(&|f| f.criticality == c && f.status == s);
            CriticalityStatusCounts {
                criticality: c,
                executed: of(Status::Executed),
                in_progress: of(Status::InProgress),
                pending: of(Status::Pending),
                overdue: of(Status::Overdue),
            }
        })
        .collect();

    Summary {
        totals,
        by_criticality,
        zone_types,
        criticality_status,
        pareto: pareto(findings),
    }
}

pub fn pareto(findings: &[&Finding]) -> Vec<ParetoEntry> {
    let total = findings.len();
    let mut counts: Vec<(Zone, usize)> = Zone::ALL
        .iter()
        .map(|&z| (z, findings.iter().filter(|f| f.zone == z).count()))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let mut cumulative = 0;
    counts
        .into_iter()
        .map(|(zone, count)| {
            cumulative += count;
            ParetoEntry {
                zone,
                count,
                cumulative,
                cumulative_pct: percent(cumulative, total),
            }
        })
        .collect()
}
