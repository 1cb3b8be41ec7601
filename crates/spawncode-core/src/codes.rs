use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::debug;

use crate::manifest::VehicleEntry;

/// Marker left at the end of a code prefix where the group number goes.
pub const PLACEHOLDER: char = '#';

/// Strips one trailing placeholder; a prefix without one is its own group key.
pub fn base_group_key(prefix: &str) -> &str {
    prefix.strip_suffix(PLACEHOLDER).unwrap_or(prefix)
}

/// Next free number per group key. Counters start at 1 on first sight of a key.
#[derive(Debug, Default)]
pub struct GroupCounters {
    next: HashMap<String, u32>,
}

impl GroupCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_code(&mut self, key: &str) -> String {
        let counter = self.next.entry(key.to_string()).or_insert(1);
        let code = format!("{}{}", key, counter);
        *counter += 1;
        code
    }
}

/// Original identifier to generated spawn code, in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnCodeMapping {
    codes: IndexMap<String, String>,
}

impl SpawnCodeMapping {
    pub fn generate(vehicles: &IndexMap<String, VehicleEntry>) -> Self {
        Self::generate_with(vehicles, &mut GroupCounters::new())
    }

    pub fn generate_with(
        vehicles: &IndexMap<String, VehicleEntry>,
        counters: &mut GroupCounters,
    ) -> Self {
        let mut codes = IndexMap::with_capacity(vehicles.len());

        for (original, entry) in vehicles {
            let code = counters.next_code(base_group_key(&entry.code));
            debug!("Spawn code: '{}' -> '{}'", original, code);
            codes.insert(original.clone(), code);
        }

        Self { codes }
    }

    /// Case-insensitive lookup returning the manifest's spelling of the
    /// identifier together with its new code.
    pub fn lookup(&self, identifier: &str) -> Option<(&str, &str)> {
        let identifier = identifier.trim();
        self.codes
            .get_key_value(identifier)
            .or_else(|| self.codes.get_key_value(identifier.to_lowercase().as_str()))
            .or_else(|| {
                self.codes
                    .iter()
                    .find(|(original, _)| original.eq_ignore_ascii_case(identifier))
            })
            .map(|(original, code)| (original.as_str(), code.as_str()))
    }

    pub fn code_for(&self, identifier: &str) -> Option<&str> {
        self.lookup(identifier).map(|(_, code)| code)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.codes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Manifest;

    fn vehicles(entries: &[(&str, &str)]) -> IndexMap<String, VehicleEntry> {
        entries
            .iter()
            .map(|(name, code)| {
                (
                    name.to_string(),
                    VehicleEntry {
                        code: code.to_string(),
                        data: "default".to_string(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_single_vehicle() {
        let mapping = SpawnCodeMapping::generate(&vehicles(&[("oldcar", "ABC#")]));

        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.code_for("oldcar"), Some("ABC1"));
    }

    #[test]
    fn test_shared_prefix_counts_in_order() {
        let mapping = SpawnCodeMapping::generate(&vehicles(&[("carA", "XYZ#"), ("carB", "XYZ#")]));

        assert_eq!(mapping.code_for("carA"), Some("XYZ1"));
        assert_eq!(mapping.code_for("carB"), Some("XYZ2"));
    }

    #[test]
    fn test_prefix_without_marker() {
        let mapping = SpawnCodeMapping::generate(&vehicles(&[("one", "ABC"), ("two", "ABC")]));

        assert_eq!(mapping.code_for("one"), Some("ABC1"));
        assert_eq!(mapping.code_for("two"), Some("ABC2"));
    }

    #[test]
    fn test_marker_and_plain_prefix_share_group() {
        let mapping = SpawnCodeMapping::generate(&vehicles(&[("one", "ABC#"), ("two", "ABC")]));

        assert_eq!(mapping.code_for("two"), Some("ABC2"));
    }

    #[test]
    fn test_empty_vehicles() {
        let mapping = SpawnCodeMapping::generate(&IndexMap::new());
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_groups_are_contiguous_and_distinct() {
        let entries = [
            ("a1", "SPT#"),
            ("b1", "MSC#"),
            ("a2", "SPT#"),
            ("c1", "OFF#"),
            ("b2", "MSC#"),
            ("a3", "SPT#"),
        ];
        let mapping = SpawnCodeMapping::generate(&vehicles(&entries));

        let codes: Vec<&str> = mapping.iter().map(|(_, code)| code).collect();
        let unique: std::collections::HashSet<&str> = codes.iter().copied().collect();
        assert_eq!(unique.len(), entries.len());

        for group in ["SPT", "MSC", "OFF"] {
            let numbers: Vec<u32> = codes
                .iter()
                .filter_map(|code| code.strip_prefix(group))
                .map(|n| n.parse().unwrap())
                .collect();
            let expected: Vec<u32> = (1..=numbers.len() as u32).collect();
            assert_eq!(numbers, expected, "group {} is not contiguous", group);
        }
    }

    #[test]
    fn test_shared_counters_continue_numbering() {
        let mut counters = GroupCounters::new();
        let first = SpawnCodeMapping::generate_with(&vehicles(&[("one", "ABC#")]), &mut counters);
        let second = SpawnCodeMapping::generate_with(&vehicles(&[("two", "ABC#")]), &mut counters);

        assert_eq!(first.code_for("one"), Some("ABC1"));
        assert_eq!(second.code_for("two"), Some("ABC2"));
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let mapping = SpawnCodeMapping::generate(&vehicles(&[("oldcar", "ABC#")]));

        assert_eq!(mapping.lookup("OldCar"), Some(("oldcar", "ABC1")));
        assert_eq!(mapping.lookup(" OLDCAR "), Some(("oldcar", "ABC1")));
        assert_eq!(mapping.lookup("newcar"), None);
    }

    #[test]
    fn test_generate_from_manifest() {
        let manifest = Manifest::from_yaml_str(
            "data:\n  d:\n    handling: H\n    audio: a\nvehicles:\n  oldcar:\n    code: \"ABC#\"\n    data: d\n",
        )
        .unwrap();
        let mapping = SpawnCodeMapping::generate(&manifest.vehicles);

        assert_eq!(mapping.iter().collect::<Vec<_>>(), vec![("oldcar", "ABC1")]);
    }
}
