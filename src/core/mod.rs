mod criticality;
mod document;
mod error;
mod finding;
mod kind;
mod status;
mod zone;

pub use criticality::Criticality;
pub use document::DocumentKind;
pub use error::FindingError;
pub use finding::{Finding, FindingInput, FindingPatch, new_uuid};
pub use kind::FindingType;
pub use status::Status;
pub use zone::Zone;
