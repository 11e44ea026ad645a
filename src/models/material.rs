use serde::{Deserialize, Serialize};

use super::Identified;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase", default)]
pub struct RawMaterial {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(alias = "materialCode")]
    pub code: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub description: Option<String>,
}

wire_record!(RawMaterial);

impl Identified for RawMaterial {
    fn id(&self) -> &str {
        &self.id
    }
}

impl RawMaterial {
    /// Name with the material code appended when known.
    pub fn label(&self) -> String {
        match self.code.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(code) => format!("{} ({})", self.name, code),
            None => self.name.clone(),
        }
    }
}
