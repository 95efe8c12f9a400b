//! Map loosely-typed candidates onto the canonical record
//!
//! Two tables drive normalization:
//!
//! - per field, an ordered list of key paths where the model may have put it
//! - an ordered list of coercion rules, each a pure total function from a JSON
//!   value to `Option<String>`; the first rule that yields wins
//!
//! Normalization never fails. Anything the candidate cannot supply becomes the
//! empty string.

use crate::parser::ParsedRecordCandidate;
use intake_domain::{FeatureRequestRecord, RecordField};
use serde_json::{Map, Value};

/// Turns a value into text, or declines so the next rule can try
pub type CoercionRule = fn(&Value) -> Option<String>;

/// Coercion rules in priority order
pub const COERCION_RULES: [CoercionRule; 4] =
    [verbatim_string, join_array, probe_object, scalar_text];

/// Sub-keys probed, in order, when a field value is an object
pub const PROBE_KEYS: [&str; 3] = ["text", "content", "value"];

/// Key paths for each canonical field, most specific first
///
/// Keys match exactly first, then case-insensitively. A path that another
/// path of the same field descends into (such as `User` for `User.Name`)
/// only counts when it holds a plain string.
pub fn field_aliases(field: RecordField) -> &'static [&'static [&'static str]] {
    match field {
        RecordField::Customer => &[
            &["Пользователь", "Имя"],
            &["User", "Name"],
            &["Пользователь", "Почта"],
            &["User", "Email"],
            &["Пользователь"],
            &["User"],
            &["customer"],
        ],
        RecordField::When => &[
            &["When (контекст/триггер)"],
            &["When (context/trigger)"],
            &["when"],
        ],
        RecordField::Want => &[
            &["Want (желаемый результат)"],
            &["Want (desired outcome)"],
            &["want"],
        ],
        RecordField::How => &[
            &["How (критерии успеха)"],
            &["How (success criteria)"],
            &["how"],
        ],
        RecordField::SoThat => &[
            &["So that (глобальная цель)"],
            &["So that (global goal)"],
            &["So that"],
            &["soThat"],
        ],
        RecordField::FeatureRequests => &[&["Feature requests"], &["featureRequests"]],
    }
}

/// Normalize a candidate into the canonical record
///
/// # Examples
///
/// ```
/// use intake_extractor::normalize;
/// use serde_json::json;
///
/// let record = normalize(&json!({
///     "User": {"Name": "Dana"},
///     "Feature requests": ["vacation plans", "export"],
///     "How (success criteria)": {"content": "one click"},
/// }));
/// assert_eq!(record.customer, "Dana");
/// assert_eq!(record.feature_requests, "vacation plans\nexport");
/// assert_eq!(record.how, "one click");
/// assert_eq!(record.want, "");
/// ```
pub fn normalize(candidate: &ParsedRecordCandidate) -> FeatureRequestRecord {
    let mut record = FeatureRequestRecord::default();
    for field in RecordField::ALL {
        *record.field_mut(field) = normalize_value(lookup(candidate, field));
    }
    record
}

/// Apply the coercion rules to a possibly-absent value
pub fn normalize_value(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(value) => coerce(value),
    }
}

fn coerce(value: &Value) -> String {
    COERCION_RULES
        .iter()
        .find_map(|rule| rule(value))
        .unwrap_or_default()
}

/// First non-null value found along the field's alias paths
fn lookup(candidate: &Value, field: RecordField) -> Option<&Value> {
    let object = candidate.as_object()?;
    let aliases = field_aliases(field);
    aliases
        .iter()
        .filter_map(|path| {
            resolve_path(object, path)
                .filter(|v| v.is_string() || !is_container_path(aliases, path))
        })
        .find(|v| !v.is_null())
}

fn is_container_path(aliases: &[&[&str]], path: &[&str]) -> bool {
    aliases
        .iter()
        .any(|other| other.len() > path.len() && other.starts_with(path))
}

fn resolve_path<'a>(object: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let value = get_key(object, first)?;
    if rest.is_empty() {
        Some(value)
    } else {
        resolve_path(value.as_object()?, rest)
    }
}

fn get_key<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).or_else(|| {
        let wanted = key.to_lowercase();
        object
            .iter()
            .find(|(k, _)| k.trim().to_lowercase() == wanted)
            .map(|(_, v)| v)
    })
}

/// Strings are used verbatim
pub fn verbatim_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

/// Arrays become one line per element
pub fn join_array(value: &Value) -> Option<String> {
    let items = value.as_array()?;
    Some(items.iter().map(coerce).collect::<Vec<_>>().join("\n"))
}

/// Objects yield their first non-empty probe key, else their JSON text
pub fn probe_object(value: &Value) -> Option<String> {
    let object = value.as_object()?;
    let probed = PROBE_KEYS
        .iter()
        .filter_map(|key| object.get(*key))
        .map(coerce)
        .find(|text| !text.is_empty());

    Some(probed.unwrap_or_else(|| {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    }))
}

/// Null is empty; numbers and booleans use their JSON spelling
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scenario_russian_keys() {
        let record = normalize(&json!({
            "When (контекст/триггер)": "busy season",
            "Want (желаемый результат)": "faster export",
        }));
        assert_eq!(record.when, "busy season");
        assert_eq!(record.want, "faster export");
        assert_eq!(record.how, "");
        assert_eq!(record.so_that, "");
        assert_eq!(record.feature_requests, "");
        assert_eq!(record.customer, "");
    }

    #[test]
    fn test_array_joined_with_newlines() {
        assert_eq!(normalize_value(Some(&json!(["pain A", "pain B"]))), "pain A\npain B");
    }

    #[test]
    fn test_object_content_probe() {
        assert_eq!(
            normalize_value(Some(&json!({"content": "needs dark mode"}))),
            "needs dark mode"
        );
    }

    #[test]
    fn test_probe_order_text_first() {
        let value = json!({"value": "v", "content": "c", "text": "t"});
        assert_eq!(normalize_value(Some(&value)), "t");
    }

    #[test]
    fn test_empty_probe_key_is_skipped() {
        let value = json!({"text": "", "value": "v"});
        assert_eq!(normalize_value(Some(&value)), "v");
    }

    #[test]
    fn test_object_without_probe_keys_is_json() {
        let value = json!({"pain": "slow"});
        assert_eq!(normalize_value(Some(&value)), "{\n  \"pain\": \"slow\"\n}");
    }

    #[test]
    fn test_absent_and_null_are_empty() {
        assert_eq!(normalize_value(None), "");
        assert_eq!(normalize_value(Some(&Value::Null)), "");
    }

    #[test]
    fn test_scalars() {
        assert_eq!(normalize_value(Some(&json!(42))), "42");
        assert_eq!(normalize_value(Some(&json!(1.5))), "1.5");
        assert_eq!(normalize_value(Some(&json!(true))), "true");
    }

    #[test]
    fn test_array_elements_are_coerced() {
        let value = json!(["a", {"text": "b"}, null, 3]);
        assert_eq!(normalize_value(Some(&value)), "a\nb\n\n3");
    }

    #[test]
    fn test_customer_from_nested_user() {
        let record = normalize(&json!({"Пользователь": {"Имя": "Дана", "Почта": "d@x.io"}}));
        assert_eq!(record.customer, "Дана");

        let record = normalize(&json!({"User": {"Name": "Dana", "Email": "d@x.io"}}));
        assert_eq!(record.customer, "Dana");
    }

    #[test]
    fn test_customer_falls_back_to_email_then_string() {
        let record = normalize(&json!({"User": {"Email": "d@x.io"}}));
        assert_eq!(record.customer, "d@x.io");

        let record = normalize(&json!({"User": "Dana, d@x.io"}));
        assert_eq!(record.customer, "Dana, d@x.io");
    }

    #[test]
    fn test_null_alias_falls_through() {
        let record = normalize(&json!({"User": {"Name": null}, "customer": "Dana"}));
        assert_eq!(record.customer, "Dana");

        let record = normalize(&json!({"When (context/trigger)": null, "when": "Mondays"}));
        assert_eq!(record.when, "Mondays");
    }

    #[test]
    fn test_user_object_without_name_is_blank() {
        let record = normalize(&json!({"User": {"Name": null}}));
        assert_eq!(record.customer, "");

        let record = normalize(&json!({"Пользователь": {"Роль": "admin"}}));
        assert_eq!(record.customer, "");

        let record = normalize(&json!({"User": ["Dana"]}));
        assert_eq!(record.customer, "");
    }

    #[test]
    fn test_keys_match_case_insensitively() {
        let record = normalize(&json!({
            "feature requests": "export",
            "WANT (DESIRED OUTCOME)": "speed",
            "user": {"name": "Ann"},
        }));
        assert_eq!(record.feature_requests, "export");
        assert_eq!(record.want, "speed");
        assert_eq!(record.customer, "Ann");
    }

    #[test]
    fn test_english_template_keys() {
        let record = normalize(&json!({
            "User": {"Name": "Ann", "Email": "ann@x.io"},
            "When (context/trigger)": "quarter planning",
            "Want (desired outcome)": "see capacity",
            "How (success criteria)": ["per person", "per week"],
            "So that (global goal)": "avoid burnout",
            "Feature requests": ["vacation plans"],
        }));
        assert_eq!(
            record,
            FeatureRequestRecord {
                customer: "Ann".into(),
                when: "quarter planning".into(),
                want: "see capacity".into(),
                how: "per person\nper week".into(),
                so_that: "avoid burnout".into(),
                feature_requests: "vacation plans".into(),
            }
        );
    }

    #[test]
    fn test_non_object_candidate_is_blank() {
        assert!(normalize(&json!("just text")).is_blank());
        assert!(normalize(&json!([1, 2])).is_blank());
        assert!(normalize(&Value::Null).is_blank());
    }

    #[test]
    fn test_canonical_record_is_unchanged() {
        let record = FeatureRequestRecord {
            customer: "Ann".into(),
            when: "w".into(),
            want: "x".into(),
            how: "".into(),
            so_that: "goal".into(),
            feature_requests: "a\nb".into(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(normalize(&value), record);
    }
}
