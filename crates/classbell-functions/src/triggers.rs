//! Change-trigger payloads delivered by the function host.

use classbell_core::types::ClassDoc;
use serde::{Deserialize, Serialize};

/// Before/after snapshots for an update to `classes/{class_id}`.
/// The class id itself travels as a path parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassChange {
    pub before: ClassDoc,
    pub after: ClassDoc,
}
