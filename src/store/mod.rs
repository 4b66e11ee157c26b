use std::path::Path;

use anyhow::{Context, Result};

use crate::core::{Finding, FindingError, FindingInput, FindingPatch, FindingType, Zone, new_uuid};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Store {
    findings: Vec<Finding>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolve<'a> {
    Found(&'a Finding),
    NotFound,
    Ambiguous(Vec<&'a Finding>),
}

impl Store {
    pub fn new(findings: Vec<Finding>) -> Self {
        Self { findings }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::load_normalized(path).map(|(store, _)| store)
    }

    // Missing file or blank content is an empty store. The count is how many
    // records were missing a uuid and got one assigned on this read.
    pub fn load_normalized(path: &Path) -> Result<(Self, usize)> {
        if !path.exists() {
            return Ok((Self::default(), 0));
        }
        let s = std::fs::read_to_string(path).with_context(|| {
            format!(
                "no se pudo leer el archivo de datos: {}",
                path.display()
            )
        })?;
        if s.trim().is_empty() {
            return Ok((Self::default(), 0));
        }
        let (findings, filled) = crate::export::parse_json_snapshot_counted(&s)
            .with_context(|| format!("archivo de datos inválido: {}", path.display()))?;
        Ok((Self::new(findings), filled))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("no se pudo crear el directorio: {}", parent.display())
                })?;
            }
        }
        let buf = crate::export::to_json_string(&self.findings)?;
        let tmp = path.with_extension(format!("tmp-{}", std::process::id()));
        std::fs::write(&tmp, buf)
            .with_context(|| format!("no se pudo escribir: {}", tmp.display()))?;
        std::fs::rename(&tmp, path).with_context(|| {
            format!(
                "no se pudo reemplazar el archivo de datos: {}",
                path.display()
            )
        })?;
        Ok(())
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn get(&self, uuid: &str) -> Option<&Finding> {
        self.findings.iter().find(|f| f.uuid == uuid)
    }

    pub fn next_id(&self, kind: FindingType) -> u32 {
        self.findings
            .iter()
            .filter(|f| f.kind == kind)
            .map(|f| f.id)
            .max()
            .map_or(1, |max| max.saturating_add(1))
    }

    pub fn create(&mut self, input: FindingInput) -> Result<&Finding, FindingError> {
        let description = input.description.trim();
        if description.is_empty() {
            return Err(FindingError::EmptyDescription);
        }

        let mut finding = Finding {
            uuid: new_uuid(),
            id: self.next_id(input.kind),
            zone: input.zone,
            kind: input.kind,
            description: description.to_string(),
            criticality: input.criticality,
            status: input.status,
            document: input.document,
            document_code: input.document_code,
            closing_date: input.closing_date,
            remarks: input.remarks,
        };
        finding.enforce_document_code();
        self.findings.push(finding);
        Ok(&self.findings[self.findings.len() - 1])
    }

    /// Merges `patch` over the record with `uuid`. An unknown uuid is a no-op
    /// and yields `Ok(None)`.
    pub fn update(
        &mut self,
        uuid: &str,
        patch: FindingPatch,
    ) -> Result<Option<&Finding>, FindingError> {
        let Some(idx) = self.findings.iter().position(|f| f.uuid == uuid) else {
            return Ok(None);
        };

        let mut next = self.findings[idx].clone();
        if let Some(zone) = patch.zone {
            next.zone = zone;
        }
        if let Some(kind) = patch.kind {
            next.kind = kind;
        }
        if let Some(description) = patch.description {
            next.description = description;
        }
        if let Some(criticality) = patch.criticality {
            next.criticality = criticality;
        }
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(document) = patch.document {
            next.document = document;
        }
        if let Some(document_code) = patch.document_code {
            next.document_code = document_code;
        }
        if let Some(closing_date) = patch.closing_date {
            next.closing_date = closing_date;
        }
        if let Some(remarks) = patch.remarks {
            next.remarks = remarks;
        }

        let description = next.description.trim();
        if description.is_empty() {
            return Err(FindingError::EmptyDescription);
        }
        next.description = description.to_string();
        next.enforce_document_code();

        self.findings[idx] = next;
        Ok(Some(&self.findings[idx]))
    }

    pub fn delete(&mut self, uuid: &str) -> Option<Finding> {
        let idx = self.findings.iter().position(|f| f.uuid == uuid)?;
        Some(self.findings.remove(idx))
    }

    pub fn clear(&mut self) -> usize {
        let n = self.findings.len();
        self.findings.clear();
        n
    }

    pub fn renumber(&mut self) {
        let mut out = Vec::with_capacity(self.findings.len());
        for kind in FindingType::ALL {
            let mut part: Vec<Finding> = self
                .findings
                .iter()
                .filter(|f| f.kind == kind)
                .cloned()
                .collect();
            part.sort_by_key(|f| (f.zone.precedence(), f.id));
            for (idx, mut f) in part.into_iter().enumerate() {
                f.id = u32::try_from(idx + 1).unwrap_or(u32::MAX);
                out.push(f);
            }
        }
        self.findings = out;
    }

    pub fn bulk_insert(&mut self, findings: Vec<Finding>) -> usize {
        let n = findings.len();
        self.findings.extend(findings);
        n
    }

    pub fn replace_all(&mut self, findings: Vec<Finding>) {
        self.findings = findings;
    }

    pub fn resolve(&self, key: &str) -> Resolve<'_> {
        let key = key.trim();
        if key.is_empty() {
            return Resolve::NotFound;
        }
        if let Some(f) = self.get(key) {
            return Resolve::Found(f);
        }

        if let Some((code, zone)) = key.split_once('@') {
            let Ok(zone) = zone.parse::<Zone>() else {
                return Resolve::NotFound;
            };
            let Some((kind, id)) = crate::bulk::parse_code(code) else {
                return Resolve::NotFound;
            };
            let matches: Vec<&Finding> = self
                .findings
                .iter()
                .filter(|f| f.zone == zone && f.kind == kind && f.id == id)
                .collect();
            return pick(matches);
        }

        if key.chars().count() < 4 {
            return Resolve::NotFound;
        }
        let lower = key.to_ascii_lowercase();
        let matches: Vec<&Finding> = self
            .findings
            .iter()
            .filter(|f| f.uuid.to_ascii_lowercase().starts_with(&lower))
            .collect();
        pick(matches)
    }
}

fn pick(matches: Vec<&Finding>) -> Resolve<'_> {
    match matches.len() {
        0 => Resolve::NotFound,
        1 => Resolve::Found(matches[0]),
        _ => Resolve::Ambiguous(matches),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Criticality, DocumentKind, Status};

    fn input(zone: Zone, kind: FindingType, desc: &str) -> FindingInput {
        FindingInput::new(zone, kind, desc)
    }

    fn finding(uuid: &str, zone: Zone, kind: FindingType, id: u32) -> Finding {
        Finding {
            uuid: uuid.to_string(),
            id,
            zone,
            kind,
            description: format!("{kind} {id} en {zone}"),
            criticality: Criticality::B,
            status: Status::InProgress,
            document: DocumentKind::None,
            document_code: String::new(),
            closing_date: String::new(),
            remarks: String::new(),
        }
    }

    #[test]
    fn create_assigns_next_id_per_kind() {
        let mut store = Store::default();
        let a = store.create(input(Zone::Pope, FindingType::Lda, "a")).unwrap().id;
        let b = store.create(input(Zone::Secado, FindingType::Lda, "b")).unwrap().id;
        let c = store.create(input(Zone::Pope, FindingType::Fc, "c")).unwrap().id;
        assert_eq!((a, b, c), (1, 2, 1));

        store.replace_all(vec![finding("x", Zone::Pope, FindingType::Lda, 9)]);
        let d = store.create(input(Zone::Pope, FindingType::Lda, "d")).unwrap().id;
        assert_eq!(d, 10);
    }

    #[test]
    fn create_rejects_blank_description_without_change() {
        let mut store = Store::default();
        let err = store
            .create(input(Zone::Pope, FindingType::Lda, "   \t"))
            .unwrap_err();
        assert_eq!(err, FindingError::EmptyDescription);
        assert!(store.is_empty());
    }

    #[test]
    fn create_trims_description_and_clears_code_without_document() {
        let mut store = Store::default();
        let mut i = input(Zone::Pope, FindingType::Fc, "  goma  ");
        i.document = DocumentKind::None;
        i.document_code = "LILA-FA-MP-006".to_string();
        let f = store.create(i).unwrap();
        assert_eq!(f.description, "goma");
        assert_eq!(f.document_code, "");

        let mut i = input(Zone::Pope, FindingType::Fc, "otra");
        i.document = DocumentKind::Lila;
        i.document_code = "LILA-FA-MP-006".to_string();
        let f = store.create(i).unwrap();
        assert_eq!(f.document_code, "LILA-FA-MP-006");
    }

    #[test]
    fn update_preserves_uuid_and_merges_fields() {
        let mut store = Store::default();
        let uuid = store
            .create(input(Zone::Pope, FindingType::Lda, "a"))
            .unwrap()
            .uuid
            .clone();

        let patch = FindingPatch {
            zone: Some(Zone::Secado),
            document: Some(DocumentKind::Poe),
            document_code: Some("POE-1".to_string()),
            ..FindingPatch::default()
        };
        let updated = store.update(&uuid, patch).unwrap().expect("found");
        assert_eq!(updated.uuid, uuid);
        assert_eq!(updated.zone, Zone::Secado);
        assert_eq!(updated.description, "a");
        assert_eq!(updated.document_code, "POE-1");

        let patch = FindingPatch {
            document: Some(DocumentKind::None),
            ..FindingPatch::default()
        };
        let updated = store.update(&uuid, patch).unwrap().expect("found");
        assert_eq!(updated.uuid, uuid);
        assert_eq!(updated.document_code, "");
    }

    #[test]
    fn update_unknown_uuid_is_noop() {
        let mut store = Store::new(vec![finding("u1", Zone::Pope, FindingType::Lda, 1)]);
        let before = store.clone();
        let res = store.update("nope", FindingPatch::default()).unwrap();
        assert!(res.is_none());
        assert_eq!(store, before);
    }

    #[test]
    fn update_blank_description_leaves_record() {
        let mut store = Store::new(vec![finding("u1", Zone::Pope, FindingType::Lda, 1)]);
        let before = store.clone();
        let patch = FindingPatch {
            description: Some("  ".to_string()),
            zone: Some(Zone::Secado),
            ..FindingPatch::default()
        };
        assert_eq!(
            store.update("u1", patch).unwrap_err(),
            FindingError::EmptyDescription
        );
        assert_eq!(store, before);
    }

    #[test]
    fn delete_removes_only_target() {
        let mut store = Store::new(vec![
            finding("u1", Zone::Pope, FindingType::Lda, 1),
            finding("u2", Zone::Pope, FindingType::Lda, 2),
            finding("u3", Zone::Secado, FindingType::Fc, 1),
        ]);
        let removed = store.delete("u2").expect("removed");
        assert_eq!(removed.uuid, "u2");
        let left: Vec<&str> = store.findings().iter().map(|f| f.uuid.as_str()).collect();
        assert_eq!(left, vec!["u1", "u3"]);
        assert!(store.delete("u2").is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn clear_empties_store() {
        let mut store = Store::new(vec![
            finding("u1", Zone::Pope, FindingType::Lda, 1),
            finding("u2", Zone::Pope, FindingType::Fc, 2),
        ]);
        assert_eq!(store.clear(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn renumber_orders_by_zone_then_id_per_kind() {
        let mut store = Store::new(vec![
            finding("fc-clar", Zone::Clarificacion, FindingType::Fc, 2),
            finding("lda-sec-7", Zone::Secado, FindingType::Lda, 7),
            finding("lda-pope-5", Zone::Pope, FindingType::Lda, 5),
            finding("lda-sec-3", Zone::Secado, FindingType::Lda, 3),
            finding("fc-pope", Zone::Pope, FindingType::Fc, 9),
        ]);
        store.renumber();

        let got: Vec<(&str, u32)> = store
            .findings()
            .iter()
            .map(|f| (f.uuid.as_str(), f.id))
            .collect();
        assert_eq!(
            got,
            vec![
                ("lda-pope-5", 1),
                ("lda-sec-3", 2),
                ("lda-sec-7", 3),
                ("fc-pope", 1),
                ("fc-clar", 2),
            ]
        );
    }

    #[test]
    fn renumber_is_idempotent() {
        let mut store = Store::new(vec![
            finding("a", Zone::Formacion, FindingType::Lda, 4),
            finding("b", Zone::Pope, FindingType::Lda, 4),
            finding("c", Zone::Secado, FindingType::Fc, 1),
            finding("d", Zone::Pope, FindingType::Fc, 8),
        ]);
        store.renumber();
        let once = store.clone();
        store.renumber();
        assert_eq!(store, once);
    }

    #[test]
    fn resolve_by_uuid_prefix_and_code() {
        let store = Store::new(vec![
            finding("abcd-1111", Zone::Pope, FindingType::Lda, 1),
            finding("abcd-2222", Zone::Secado, FindingType::Lda, 1),
            finding("ffff-0000", Zone::Secado, FindingType::Fc, 3),
        ]);
        assert!(matches!(store.resolve("ffff"), Resolve::Found(f) if f.uuid == "ffff-0000"));
        assert!(matches!(store.resolve("abcd"), Resolve::Ambiguous(v) if v.len() == 2));
        assert!(matches!(store.resolve("abc"), Resolve::NotFound));
        assert!(
            matches!(store.resolve("LDA 1@secado"), Resolve::Found(f) if f.uuid == "abcd-2222")
        );
        assert!(matches!(store.resolve("fc-3@Secado"), Resolve::Found(f) if f.uuid == "ffff-0000"));
        assert!(matches!(store.resolve("FC 3@Pope"), Resolve::NotFound));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = std::env::temp_dir().join(format!(
            "hallazgos-store-test-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("data.json");

        let store = Store::new(vec![
            finding("u1", Zone::Pope, FindingType::Lda, 1),
            finding("u2", Zone::Clarificacion, FindingType::Fc, 4),
        ]);
        store.save(&path).expect("save");
        let loaded = Store::load(&path).expect("load");
        assert_eq!(loaded, store);

        assert!(Store::load(&dir.join("missing.json")).unwrap().is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_reports_backfilled_uuids() {
        let dir = std::env::temp_dir().join(format!(
            "hallazgos-store-uuid-test-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).expect("mkdir");
        let path = dir.join("data.json");
        std::fs::write(
            &path,
            r#"[{"id":1,"zona":"Pope","tipo":"LDA","desc":"Bandeja de goma"}]"#,
        )
        .expect("write");

        let (store, filled) = Store::load_normalized(&path).expect("load");
        assert_eq!(filled, 1);
        store.save(&path).expect("save");

        let (again, filled) = Store::load_normalized(&path).expect("reload");
        assert_eq!(filled, 0);
        assert_eq!(again.findings()[0].uuid, store.findings()[0].uuid);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
