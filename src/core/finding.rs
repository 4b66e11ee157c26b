use crate::core::{Criticality, DocumentKind, FindingType, Status, Zone};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(default, deserialize_with = "lenient::text")]
    pub uuid: String,
    #[serde(deserialize_with = "lenient::id")]
    pub id: u32,
    #[serde(rename = "zona", deserialize_with = "lenient::zone")]
    pub zone: Zone,
    #[serde(rename = "tipo", deserialize_with = "lenient::kind")]
    pub kind: FindingType,
    #[serde(rename = "desc", default, deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(rename = "criticidad", default, deserialize_with = "lenient::criticality")]
    pub criticality: Criticality,
    #[serde(rename = "estado", default, deserialize_with = "lenient::status")]
    pub status: Status,
    #[serde(rename = "documento", default, deserialize_with = "lenient::document")]
    pub document: DocumentKind,
    #[serde(rename = "codigoDoc", default, deserialize_with = "lenient::text")]
    pub document_code: String,
    #[serde(rename = "fechaCierre", default, deserialize_with = "lenient::text")]
    pub closing_date: String,
    #[serde(rename = "observaciones", default, deserialize_with = "lenient::text")]
    pub remarks: String,
}

impl Finding {
    pub fn code(&self) -> String {
        format!("{} {}", self.kind, self.id)
    }

    pub fn enforce_document_code(&mut self) {
        if self.document.is_none() {
            self.document_code.clear();
        }
    }
}

pub fn new_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindingInput {
    pub zone: Zone,
    pub kind: FindingType,
    pub description: String,
    pub criticality: Criticality,
    pub status: Status,
    pub document: DocumentKind,
    pub document_code: String,
    pub closing_date: String,
    pub remarks: String,
}

impl FindingInput {
    pub fn new(zone: Zone, kind: FindingType, description: impl Into<String>) -> Self {
        Self {
            zone,
            kind,
            description: description.into(),
            criticality: Criticality::default(),
            status: Status::default(),
            document: DocumentKind::default(),
            document_code: String::new(),
            closing_date: String::new(),
            remarks: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindingPatch {
    pub zone: Option<Zone>,
    pub kind: Option<FindingType>,
    pub description: Option<String>,
    pub criticality: Option<Criticality>,
    pub status: Option<Status>,
    pub document: Option<DocumentKind>,
    pub document_code: Option<String>,
    pub closing_date: Option<String>,
    pub remarks: Option<String>,
}

impl FindingPatch {
    pub fn is_empty(&self) -> bool {
        *self == FindingPatch::default()
    }
}

mod lenient {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use crate::core::{Criticality, DocumentKind, FindingType, Status, Zone};

    pub(super) fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Ok(String::new()),
            Value::String(s) => Ok(s),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(D::Error::custom(format!(
                "se esperaba texto, se recibió: {other}"
            ))),
        }
    }

    pub(super) fn id<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        let v = Value::deserialize(d)?;
        let parsed = match &v {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse::<u32>().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| D::Error::custom(format!("id inválido: {v}")))
    }

    pub(super) fn zone<'de, D: Deserializer<'de>>(d: D) -> Result<Zone, D::Error> {
        text(d)?.parse::<Zone>().map_err(D::Error::custom)
    }

    pub(super) fn kind<'de, D: Deserializer<'de>>(d: D) -> Result<FindingType, D::Error> {
        text(d)?.parse::<FindingType>().map_err(D::Error::custom)
    }

    pub(super) fn criticality<'de, D: Deserializer<'de>>(d: D) -> Result<Criticality, D::Error> {
        Ok(Criticality::from_label_or_default(&text(d)?))
    }

    pub(super) fn status<'de, D: Deserializer<'de>>(d: D) -> Result<Status, D::Error> {
        Ok(Status::from_label(&text(d)?).unwrap_or_default())
    }

    pub(super) fn document<'de, D: Deserializer<'de>>(d: D) -> Result<DocumentKind, D::Error> {
        Ok(DocumentKind::from_label_or_default(&text(d)?))
    }
}
