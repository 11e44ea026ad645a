use serde::{Deserialize, Serialize};

/// Records that carry an API identifier.
pub trait Identified {
    fn id(&self) -> &str;
}

/// A foreign key that the API sends either as a bare id or populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference<T> {
    Id(String),
    Populated(T),
}

impl<T: Identified> Reference<T> {
    pub fn id(&self) -> &str {
        match self {
            Reference::Id(id) => id,
            Reference::Populated(record) => record.id(),
        }
    }

    pub fn record(&self) -> Option<&T> {
        match self {
            Reference::Id(_) => None,
            Reference::Populated(record) => Some(record),
        }
    }

    /// Replaces a bare id with the matching record from `candidates`.
    pub fn resolve<'a, I>(&self, candidates: I) -> Option<&'a T>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let id = self.id();
        candidates.into_iter().find(|candidate| candidate.id() == id)
    }
}

impl<T> From<String> for Reference<T> {
    fn from(id: String) -> Self {
        Reference::Id(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Supplier;
    use serde_json::json;

    #[test]
    fn accepts_both_shapes() {
        let bare: Reference<Supplier> = serde_json::from_value(json!("64f0c0ffee")).unwrap();
        assert_eq!(bare.id(), "64f0c0ffee");
        assert!(bare.record().is_none());

        let populated: Reference<Supplier> =
            serde_json::from_value(json!({"_id": "64f0c0ffee", "name": "Hindalco"})).unwrap();
        assert_eq!(populated.id(), "64f0c0ffee");
        assert_eq!(populated.record().unwrap().name, "Hindalco");
    }

    #[test]
    fn resolves_against_loaded_records() {
        let suppliers: Vec<Supplier> = serde_json::from_value(json!([
            {"_id": "a", "name": "Alpha Alloys"},
            {"_id": "b", "name": "Bharat Copper"}
        ]))
        .unwrap();
        let reference: Reference<Supplier> = Reference::Id("b".into());
        assert_eq!(reference.resolve(&suppliers).unwrap().name, "Bharat Copper");
    }
}
