// 🩹 Patch - tri-state field for partial updates
//
// A plain Option cannot tell "field omitted" (keep) from "field sent as null" (clear).
// JSON mapping, with `#[serde(default)]` on the containing field:
//   omitted        → Patch::Unset
//   null           → Patch::Clear
//   "some text"    → Patch::Set("some text")

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    /// Field not supplied: leave the stored value alone
    Unset,
    /// Field supplied as null/empty: remove the stored value
    Clear,
    /// Field supplied with a value: overwrite
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Unset
    }
}

impl<T> Patch<T> {
    /// The supplied value, if any (for validation)
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            _ => None,
        }
    }

    /// Merge into an optional stored field
    pub fn apply_to(self, target: &mut Option<T>) {
        match self {
            Patch::Unset => {}
            Patch::Clear => *target = None,
            Patch::Set(value) => *target = Some(value),
        }
    }
}

impl Patch<String> {
    /// Treat an explicit empty string the same as null
    pub fn empty_as_clear(self) -> Patch<String> {
        match self {
            Patch::Set(value) if value.is_empty() => Patch::Clear,
            other => other,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_set().map(String::as_str)
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Patch::Set(value),
            None => Patch::Clear,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default)]
        description: Patch<String>,
    }

    fn probe(json: &str) -> Patch<String> {
        serde_json::from_str::<Probe>(json).unwrap().description
    }

    #[test]
    fn test_omitted_null_and_value_are_distinct() {
        assert_eq!(probe("{}"), Patch::Unset);
        assert_eq!(probe(r#"{"description": null}"#), Patch::Clear);
        assert_eq!(
            probe(r#"{"description": "cold storage"}"#),
            Patch::Set("cold storage".to_string())
        );
    }

    #[test]
    fn test_empty_string_clears() {
        assert_eq!(probe(r#"{"description": ""}"#).empty_as_clear(), Patch::Clear);
    }

    #[test]
    fn test_apply_to() {
        let mut stored = Some("old".to_string());

        Patch::Unset.apply_to(&mut stored);
        assert_eq!(stored.as_deref(), Some("old"));

        Patch::Set("new".to_string()).apply_to(&mut stored);
        assert_eq!(stored.as_deref(), Some("new"));

        Patch::Clear.apply_to(&mut stored);
        assert_eq!(stored, None);
    }
}
