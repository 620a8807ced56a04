//! Analysis record returned by the model, and the deterministic cleanup
//! applied to it before display.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::constants::DEPARTMENT_UNSPECIFIED;

/// Substrings that mark an action as filler. Matched case-sensitively.
const GENERIC_ACTION_TERMS: &[&str] = &["have", "want", "tell", "need", "you to"];

/// Keyword table for department inference, checked in order against the
/// lowercased command. First match wins.
const DEPARTMENT_RULES: &[(&[&str], &str)] = &[
    (&["selling", "sales"], "Sales"),
    (&["market"], "Marketing"),
    (&["engineer", "technical"], "Engineering"),
    (&["finance", "accounting"], "Finance"),
    (&["customer"], "Customer Support"),
];

const MAX_INSTRUCTIONS: usize = 1;
const MAX_ACTIONS: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub instructions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resolved_entities: BTreeMap<String, Entity>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One value under `resolved_entities`. Objects become records; anything
/// else is carried along untouched and ignored by cleanup and display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entity {
    Record(EntityRecord),
    Malformed(Value),
}

impl Entity {
    pub fn as_record(&self) -> Option<&EntityRecord> {
        match self {
            Entity::Record(record) => Some(record),
            Entity::Malformed(_) => None,
        }
    }
}

impl From<Value> for Entity {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Entity::Record(EntityRecord::from_map(map)),
            other => Entity::Malformed(other),
        }
    }
}

impl<'de> Deserialize<'de> for Entity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Entity::from(Value::deserialize(deserializer)?))
    }
}

/// Person (or other named item) details. Every field is optional. A known
/// field holding the wrong JSON type reads as absent but its raw value stays
/// in `extra`, as do unknown keys. Non-string traits are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traits: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl EntityRecord {
    fn from_map(mut map: Map<String, Value>) -> Self {
        let name = take_string(&mut map, "name");
        let department = take_string(&mut map, "department");
        let position = take_string(&mut map, "position");
        let traits = match map.remove("traits") {
            Some(Value::Array(items)) => Some(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            Some(other) => {
                map.insert("traits".to_string(), other);
                None
            }
            None => None,
        };

        Self {
            name,
            department,
            position,
            traits,
            extra: map.into_iter().collect(),
        }
    }

    /// Name to show, falling back to the entity's key.
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(key)
    }

    pub fn display_department(&self) -> &str {
        self.department.as_deref().unwrap_or(DEPARTMENT_UNSPECIFIED)
    }

    fn needs_department(&self) -> bool {
        match self.department.as_deref() {
            None => true,
            Some(dept) => dept.is_empty() || dept.contains("unspecified"),
        }
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key)? {
        Value::String(s) => Some(s),
        other => {
            map.insert(key.to_string(), other);
            None
        }
    }
}

/// Apply the cleanup rules to a freshly parsed analysis:
/// keep the first instruction only, drop generic and duplicate actions and
/// cap them at two, and fill in missing departments from keywords in
/// `original_input`. Running it on its own output changes nothing.
pub fn normalize(mut analysis: AnalysisResult, original_input: &str) -> AnalysisResult {
    analysis.instructions.truncate(MAX_INSTRUCTIONS);

    let mut seen = HashSet::new();
    let actions = std::mem::take(&mut analysis.actions);
    analysis.actions = actions
        .into_iter()
        .filter(|action| !is_generic_action(action) && seen.insert(action.clone()))
        .take(MAX_ACTIONS)
        .collect();

    let inferred = infer_department(original_input);
    for entity in analysis.resolved_entities.values_mut() {
        if let Entity::Record(record) = entity {
            if record.needs_department() {
                if let Some(dept) = inferred {
                    record.department = Some(dept.to_string());
                    record.extra.remove("department");
                }
            }
        }
    }

    analysis
}

pub fn is_generic_action(action: &str) -> bool {
    GENERIC_ACTION_TERMS.iter().any(|term| action.contains(term))
}

/// Guess a department from keywords in the command text.
pub fn infer_department(input: &str) -> Option<&'static str> {
    let lower = input.to_lowercase();
    DEPARTMENT_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(_, dept)| *dept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(department: Option<&str>) -> Entity {
        Entity::Record(EntityRecord {
            name: Some("Alice".to_string()),
            department: department.map(str::to_string),
            ..Default::default()
        })
    }

    fn department_of(analysis: &AnalysisResult, key: &str) -> Option<String> {
        analysis.resolved_entities[key]
            .as_record()
            .and_then(|r| r.department.clone())
    }

    #[test]
    fn test_instruction_truncation() {
        let raw = AnalysisResult {
            instructions: vec!["do X".to_string(), "do Y".to_string()],
            ..Default::default()
        };
        assert_eq!(normalize(raw, "").instructions, vec!["do X"]);
    }

    #[test]
    fn test_empty_instructions_stay_empty() {
        let normalized = normalize(AnalysisResult::default(), "anything");
        assert!(normalized.instructions.is_empty());
        assert!(normalized.actions.is_empty());
    }

    #[test]
    fn test_action_filtering() {
        let raw = AnalysisResult {
            actions: vec![
                "I want to ship".to_string(),
                "ship the report".to_string(),
                "ship the report".to_string(),
                "need approval".to_string(),
            ],
            ..Default::default()
        };
        assert_eq!(normalize(raw, "").actions, vec!["ship the report"]);
    }

    #[test]
    fn test_actions_capped_at_two_in_order() {
        let raw = AnalysisResult {
            actions: vec![
                "draft memo".to_string(),
                "tell Bob".to_string(),
                "send memo".to_string(),
                "file memo".to_string(),
            ],
            ..Default::default()
        };
        assert_eq!(normalize(raw, "").actions, vec!["draft memo", "send memo"]);
    }

    #[test]
    fn test_generic_filter_is_case_sensitive_substring() {
        assert!(is_generic_action("behave politely")); // "have" inside a word
        assert!(is_generic_action("ask you to sign"));
        assert!(!is_generic_action("Have lunch"));
        assert!(!is_generic_action("Need approval"));
    }

    #[test]
    fn test_department_backfill_from_input() {
        let mut raw = AnalysisResult::default();
        raw.resolved_entities.insert("Alice".to_string(), record(Some("")));

        let normalized = normalize(raw, "talk to the selling target about pricing");
        assert_eq!(department_of(&normalized, "Alice").as_deref(), Some("Sales"));
    }

    #[test]
    fn test_explicit_department_is_kept() {
        let mut raw = AnalysisResult::default();
        raw.resolved_entities.insert("Alice".to_string(), record(Some("Legal")));

        let normalized = normalize(raw, "ask Alice about sales numbers");
        assert_eq!(department_of(&normalized, "Alice").as_deref(), Some("Legal"));
    }

    #[test]
    fn test_placeholder_and_missing_departments_are_backfilled() {
        let mut raw = AnalysisResult::default();
        raw.resolved_entities
            .insert("A".to_string(), record(Some(DEPARTMENT_UNSPECIFIED)));
        raw.resolved_entities.insert("B".to_string(), record(None));

        let normalized = normalize(raw, "Loop in the Technical lead");
        assert_eq!(department_of(&normalized, "A").as_deref(), Some("Engineering"));
        assert_eq!(department_of(&normalized, "B").as_deref(), Some("Engineering"));
    }

    #[test]
    fn test_no_keyword_leaves_department_alone() {
        let mut raw = AnalysisResult::default();
        raw.resolved_entities.insert("A".to_string(), record(Some("")));
        raw.resolved_entities
            .insert("B".to_string(), record(Some("Department unspecified")));

        let normalized = normalize(raw, "call Alice tomorrow");
        assert_eq!(department_of(&normalized, "A").as_deref(), Some(""));
        assert_eq!(
            department_of(&normalized, "B").as_deref(),
            Some("Department unspecified")
        );
    }

    #[test]
    fn test_non_string_department_is_backfilled() {
        let raw: AnalysisResult = serde_json::from_value(json!({
            "resolved_entities": {
                "Alice": { "name": "Alice", "department": 7, "position": "Rep" }
            }
        }))
        .unwrap();

        let normalized = normalize(raw, "Alice owns the Sales pipeline");
        let alice = normalized.resolved_entities["Alice"].as_record().unwrap();
        assert_eq!(alice.department.as_deref(), Some("Sales"));
        assert!(!alice.extra.contains_key("department"));
        assert_eq!(alice.position.as_deref(), Some("Rep"));

        let value = serde_json::to_value(&normalized.resolved_entities).unwrap();
        assert_eq!(
            value,
            json!({ "Alice": { "name": "Alice", "department": "Sales", "position": "Rep" } })
        );
    }

    #[test]
    fn test_non_string_department_kept_when_nothing_inferred() {
        let raw: AnalysisResult = serde_json::from_value(json!({
            "resolved_entities": {
                "Alice": { "name": "Alice", "department": 7, "traits": "quiet" }
            }
        }))
        .unwrap();

        let normalized = normalize(raw, "call Alice tomorrow");
        let alice = normalized.resolved_entities["Alice"].as_record().unwrap();
        assert_eq!(alice.department, None);
        assert_eq!(alice.display_department(), DEPARTMENT_UNSPECIFIED);
        assert_eq!(alice.traits, None);

        let value = serde_json::to_value(&normalized.resolved_entities).unwrap();
        assert_eq!(
            value,
            json!({ "Alice": { "name": "Alice", "department": 7, "traits": "quiet" } })
        );
    }

    #[test]
    fn test_department_rule_order() {
        assert_eq!(infer_department("sales and marketing sync"), Some("Sales"));
        assert_eq!(infer_department("MARKETING budget"), Some("Marketing"));
        assert_eq!(infer_department("the engineering team"), Some("Engineering"));
        assert_eq!(infer_department("accounting close"), Some("Finance"));
        assert_eq!(infer_department("customer escalation"), Some("Customer Support"));
        assert_eq!(infer_department("lunch"), None);
    }

    #[test]
    fn test_malformed_entities_are_skipped() {
        let raw: AnalysisResult = serde_json::from_value(json!({
            "instructions": ["x"],
            "actions": [],
            "resolved_entities": { "Bob": "just a string", "Eve": ["a", "b"] }
        }))
        .unwrap();

        let normalized = normalize(raw, "sales call");
        assert_eq!(
            normalized.resolved_entities["Bob"],
            Entity::Malformed(json!("just a string"))
        );
        assert_eq!(
            normalized.resolved_entities["Eve"],
            Entity::Malformed(json!(["a", "b"]))
        );
    }

    #[test]
    fn test_lenient_entity_fields() {
        let raw: AnalysisResult = serde_json::from_value(json!({
            "resolved_entities": {
                "Bob": {
                    "name": 42,
                    "department": null,
                    "position": "Lead",
                    "traits": ["calm", 7, "direct"],
                    "email": "bob@example.com"
                }
            }
        }))
        .unwrap();

        let bob = raw.resolved_entities["Bob"].as_record().unwrap();
        assert_eq!(bob.name, None);
        assert_eq!(bob.department, None);
        assert_eq!(bob.position.as_deref(), Some("Lead"));
        assert_eq!(
            bob.traits,
            Some(vec!["calm".to_string(), "direct".to_string()])
        );
        assert_eq!(bob.extra["email"], json!("bob@example.com"));
        assert_eq!(bob.extra["name"], json!(42));
        assert_eq!(bob.extra["department"], Value::Null);
        assert_eq!(bob.display_name("Bob"), "Bob");
        assert_eq!(bob.display_department(), DEPARTMENT_UNSPECIFIED);
    }

    #[test]
    fn test_null_top_level_fields_default() {
        let raw: AnalysisResult = serde_json::from_str(
            r#"{"instructions":null,"actions":null,"resolved_entities":null}"#,
        )
        .unwrap();
        assert_eq!(raw, AnalysisResult::default());

        let raw: AnalysisResult = serde_json::from_str("{}").unwrap();
        assert_eq!(raw, AnalysisResult::default());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw: AnalysisResult = serde_json::from_value(json!({
            "instructions": ["ship report", "celebrate"],
            "actions": ["draft report", "draft report", "want cake", "send report", "file report"],
            "resolved_entities": {
                "Alice": { "name": "Alice", "department": "", "traits": ["quick"] },
                "Bob": { "name": "Bob", "department": "Legal" },
                "Junk": 3
            }
        }))
        .unwrap();

        let input = "Alice needs to finish the finance report";
        let once = normalize(raw, input);
        let twice = normalize(once.clone(), input);
        assert_eq!(once, twice);
        assert_eq!(once.actions, vec!["draft report", "send report"]);
    }

    #[test]
    fn test_entity_serializes_known_and_extra_fields() {
        let raw: AnalysisResult = serde_json::from_value(json!({
            "resolved_entities": {
                "Alice": { "name": "Alice", "department": "Sales", "team": "EMEA" }
            }
        }))
        .unwrap();

        let value = serde_json::to_value(&raw.resolved_entities).unwrap();
        assert_eq!(
            value,
            json!({ "Alice": { "name": "Alice", "department": "Sales", "team": "EMEA" } })
        );
    }
}
