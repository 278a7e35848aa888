//! Rule evaluator: pure logic over loosely-typed JSON records.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use url::Url;
use validator::ValidateUrl;

use super::path::FieldPath;
use super::result::{RuleViolation, ValidationResult};
use super::rules::{
    Constraint, FieldSchema, FormSchema, Mode, Presence, RuleKind, ValidationRule,
    ValueType,
};

/// 24-hour `HH:MM`.
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").expect("valid regex"));

/// Evaluate `input` against every field of `schema`.
///
/// A non-object `input` is evaluated as an empty record, so each required
/// field reports its `required` message. Never fails: mistyped values are
/// reported as violations of the rule they break.
pub fn validate(input: &Value, schema: &FormSchema, mode: Mode) -> ValidationResult {
    let empty = Map::new();
    let record = input.as_object().unwrap_or(&empty);

    let mut violations = Vec::new();
    evaluate_shape(record, schema, &FieldPath::root(), mode, &mut violations);

    tracing::debug!(
        %mode,
        fields = schema.len(),
        violations = violations.len(),
        "Evaluated form input"
    );
    ValidationResult::from_violations(violations)
}

fn evaluate_shape(
    record: &Map<String, Value>,
    schema: &FormSchema,
    prefix: &FieldPath,
    mode: Mode,
    out: &mut Vec<RuleViolation>,
) {
    for (name, field) in schema.fields() {
        evaluate_field(record.get(name), field, &prefix.field(name), mode, out);
    }
}

fn evaluate_field(
    value: Option<&Value>,
    schema: &FieldSchema,
    path: &FieldPath,
    mode: Mode,
    out: &mut Vec<RuleViolation>,
) {
    let value = match (value, &schema.presence) {
        (None | Some(Value::Null), Presence::Required(message)) => {
            push(out, path, RuleKind::Required, message.clone());
            return;
        }
        (Some(Value::String(s)), Presence::Required(message)) if s.is_empty() => {
            push(out, path, RuleKind::Required, message.clone());
            return;
        }
        (None | Some(Value::Null), Presence::Nullable) | (None, Presence::Optional) => return,
        (Some(Value::Null), Presence::Optional) => {
            push(out, path, RuleKind::Required, format!("{path} cannot be null"));
            return;
        }
        (Some(value), _) => value,
    };

    let mut failed = false;
    for rule in &schema.rules {
        if !rule_passes(rule, value) {
            push(out, path, rule.kind(), rule.message.clone());
            failed = true;
            if mode == Mode::FailFast {
                break;
            }
        }
    }

    if let Some(items) = &schema.items {
        match value.as_array() {
            Some(elements) => {
                for (index, element) in elements.iter().enumerate() {
                    evaluate_field(Some(element), items, &path.index(index), mode, out);
                }
            }
            None if failed && mode == Mode::FailFast => {}
            None => {
                push(out, path, RuleKind::NestedSchema, format!("{path} must be an array"));
                failed = true;
            }
        }
    }

    if let Some(shape) = &schema.shape {
        match value.as_object() {
            Some(record) => evaluate_shape(record, shape, path, mode, out),
            None if failed && mode == Mode::FailFast => {}
            None => push(out, path, RuleKind::NestedSchema, format!("{path} must be an object")),
        }
    }
}

fn push(out: &mut Vec<RuleViolation>, path: &FieldPath, kind: RuleKind, message: String) {
    tracing::trace!(path = %path, kind = %kind, "Rule violated");
    out.push(RuleViolation {
        path: path.to_string(),
        kind,
        message,
    });
}

fn rule_passes(rule: &ValidationRule, value: &Value) -> bool {
    match &rule.constraint {
        Constraint::NumericMin(min) => as_number(value).is_some_and(|n| n >= *min),
        Constraint::NumericMax(max) => as_number(value).is_some_and(|n| n <= *max),
        Constraint::StringPattern(re) => as_text(value).is_some_and(|s| re.is_match(&s)),
        Constraint::StringLength(min) => as_text(value).is_some_and(|s| s.chars().count() >= *min),
        Constraint::ArrayMinLength(min) => value.as_array().is_some_and(|a| a.len() >= *min),
        Constraint::ArrayMaxLength(max) => value.as_array().is_some_and(|a| a.len() <= *max),
        Constraint::FileSize(max) => file_size(value).is_some_and(|size| size <= *max as f64),
        Constraint::FileFormat(accepted) => {
            file_subtype(value).is_some_and(|sub| accepted.iter().any(|a| a == sub))
        }
        Constraint::UrlFormat => as_text(value).is_some_and(|s| is_url(&s)),
        Constraint::TimeFormat => as_text(value).is_some_and(|s| TIME_RE.is_match(&s)),
        Constraint::TypeCheck(expected) => has_type(value, *expected),
    }
}

/// Numbers as-is; numeric strings are cast the way form inputs arrive.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Strings as-is; numbers are read as their decimal text.
fn as_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        _ => None,
    }
}

fn has_type(value: &Value, expected: ValueType) -> bool {
    match expected {
        ValueType::String => value.is_string(),
        ValueType::Number => as_number(value).is_some(),
        ValueType::Boolean => value.is_boolean(),
        ValueType::Array => value.is_array(),
        ValueType::Object => value.is_object(),
    }
}

/// Web and ftp links only; `mailto:`, `javascript:` and other schemes fail.
fn is_url(text: &str) -> bool {
    if !text.validate_url() {
        return false;
    }
    Url::parse(text).is_ok_and(|url| {
        matches!(url.scheme(), "http" | "https" | "ftp")
            && url.host_str().is_some_and(|host| !host.is_empty())
    })
}

/// `size` of a file descriptor object, in bytes.
fn file_size(value: &Value) -> Option<f64> {
    value
        .get("size")
        .and_then(Value::as_f64)
        .filter(|size| size.is_finite())
}

/// MIME subtype of a file descriptor: `image/png` -> `png`.
fn file_subtype(value: &Value) -> Option<&str> {
    value
        .get("type")
        .and_then(Value::as_str)
        .and_then(|mime| mime.split('/').nth(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn single(field: FieldSchema) -> FormSchema {
        FormSchema::new().field("test_field", field)
    }

    fn run(field: FieldSchema, value: Value) -> ValidationResult {
        validate(&json!({ "test_field": value }), &single(field), Mode::CollectAll)
    }

    fn messages(result: &ValidationResult, path: &str) -> Vec<String> {
        result
            .errors()
            .map(|e| e.messages(path).into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }

    #[test]
    fn required_fails_missing_field() {
        let schema = single(FieldSchema::required("Field is required"));
        let result = validate(&json!({}), &schema, Mode::CollectAll);
        assert_eq!(messages(&result, "test_field"), vec!["Field is required"]);
        assert_eq!(result.errors().unwrap().violations()[0].kind, RuleKind::Required);
    }

    #[test]
    fn required_fails_null_and_empty_string() {
        let field = FieldSchema::required("Field is required");
        assert!(!run(field.clone(), Value::Null).is_valid());
        assert!(!run(field, json!("")).is_valid());
    }

    #[test]
    fn required_stops_further_rules() {
        let field = FieldSchema::required("Field is required")
            .rule(ValidationRule::min_length(3, "too short"));
        let result = run(field, json!(""));
        assert_eq!(messages(&result, "test_field"), vec!["Field is required"]);
    }

    #[test]
    fn nullable_skips_rules_for_null() {
        let field = FieldSchema::nullable().rule(ValidationRule::max(5.0, "too big"));
        assert!(run(field.clone(), Value::Null).is_valid());
        let result = validate(&json!({}), &single(field), Mode::CollectAll);
        assert!(result.is_valid());
    }

    #[test]
    fn optional_allows_absent_but_reports_null() {
        let field = FieldSchema::optional().rule(ValidationRule::min_items(1, "need one"));
        let absent = validate(&json!({}), &single(field.clone()), Mode::CollectAll);
        assert!(absent.is_valid());
        let null = run(field, Value::Null);
        assert_eq!(messages(&null, "test_field"), vec!["test_field cannot be null"]);
    }

    #[test]
    fn numeric_bounds_are_inclusive() {
        let field = FieldSchema::nullable()
            .rule(ValidationRule::min(1.0, "too small"))
            .rule(ValidationRule::max(5.0, "too big"));
        assert!(run(field.clone(), json!(1)).is_valid());
        assert!(run(field.clone(), json!(5)).is_valid());
        assert_eq!(messages(&run(field.clone(), json!(0)), "test_field"), vec!["too small"]);
        assert_eq!(messages(&run(field, json!(5.5)), "test_field"), vec!["too big"]);
    }

    #[test]
    fn numeric_strings_are_cast() {
        let field = FieldSchema::nullable().rule(ValidationRule::min(1.0, "too small"));
        assert!(run(field.clone(), json!("3")).is_valid());
        assert!(!run(field, json!("0")).is_valid());
    }

    #[test]
    fn non_numbers_fail_numeric_rules() {
        let field = FieldSchema::nullable()
            .rule(ValidationRule::min(1.0, "too small"))
            .rule(ValidationRule::max(5.0, "too big"));
        let result = run(field, json!("three"));
        assert_eq!(messages(&result, "test_field"), vec!["too small", "too big"]);
        let field = FieldSchema::nullable().rule(ValidationRule::max(5.0, "too big"));
        assert!(!run(field.clone(), json!(true)).is_valid());
        assert!(!run(field, json!([1])).is_valid());
    }

    #[test]
    fn pattern_requires_full_match() {
        let field = FieldSchema::nullable().rule(ValidationRule::pattern("[a-z]+", "lower").unwrap());
        assert!(run(field.clone(), json!("hello")).is_valid());
        assert!(!run(field, json!("Hello123")).is_valid());
    }

    #[test]
    fn numbers_are_read_as_text_for_string_rules() {
        let field =
            FieldSchema::nullable().rule(ValidationRule::pattern("[0-9]{5}", "five digits").unwrap());
        assert!(run(field.clone(), json!(12345)).is_valid());
        assert!(!run(field, json!({ "zip": "12345" })).is_valid());
    }

    #[test]
    fn string_length_counts_characters() {
        let field = FieldSchema::nullable().rule(ValidationRule::min_length(4, "too short"));
        assert!(run(field.clone(), json!("čaša")).is_valid());
        assert!(!run(field, json!("abc")).is_valid());
    }

    #[test]
    fn array_length_bounds() {
        let field = FieldSchema::nullable()
            .rule(ValidationRule::min_items(2, "too few"))
            .rule(ValidationRule::max_items(3, "too many"));
        assert!(run(field.clone(), json!([1, 2])).is_valid());
        assert!(run(field.clone(), json!([1, 2, 3])).is_valid());
        assert_eq!(messages(&run(field.clone(), json!([1])), "test_field"), vec!["too few"]);
        assert_eq!(
            messages(&run(field, json!([1, 2, 3, 4])), "test_field"),
            vec!["too many"]
        );
    }

    #[test]
    fn file_size_and_format() {
        let field = FieldSchema::required("Image is required")
            .rule(ValidationRule::max_file_size(100, "too large"))
            .rule(ValidationRule::file_format(&["png", "jpg"], "bad format"));
        assert!(run(field.clone(), json!({ "size": 100, "type": "image/png" })).is_valid());
        assert_eq!(
            messages(&run(field.clone(), json!({ "size": 101, "type": "image/bmp" })), "test_field"),
            vec!["too large", "bad format"]
        );
        assert_eq!(
            messages(&run(field.clone(), json!({ "type": "png" })), "test_field"),
            vec!["too large", "bad format"]
        );
        assert!(!run(field, json!("photo.png")).is_valid());
    }

    #[test]
    fn url_format() {
        let field = FieldSchema::nullable().rule(ValidationRule::url("bad url"));
        assert!(run(field.clone(), json!("https://maps.example.com/place?id=1")).is_valid());
        assert!(!run(field.clone(), json!("not a url")).is_valid());
        assert!(!run(field.clone(), json!("/relative/path")).is_valid());
        assert!(run(field.clone(), json!("ftp://files.example.com/brochure.pdf")).is_valid());
        for bad in [
            "javascript:alert(1)",
            "mailto:a@b.com",
            "foo:bar",
            "data:text/plain,hi",
            "file:///etc/passwd",
        ] {
            assert!(!run(field.clone(), json!(bad)).is_valid(), "{bad} should fail");
        }
    }

    #[test]
    fn file_size_accepts_fractional_bytes() {
        let field = FieldSchema::required("Image is required")
            .rule(ValidationRule::max_file_size(1_000, "too large"));
        assert!(run(field.clone(), json!({ "size": 500.0 })).is_valid());
        assert!(run(field.clone(), json!({ "size": 1000.0 })).is_valid());
        assert!(!run(field.clone(), json!({ "size": 1000.5 })).is_valid());
        assert!(!run(field, json!({ "size": "500" })).is_valid());
    }

    #[test]
    fn type_check_string_elements() {
        let field = FieldSchema::nullable().items(
            FieldSchema::optional().rule(ValidationRule::type_check(ValueType::String, "not text")),
        );
        assert!(run(field.clone(), json!(["Pool", "Wifi"])).is_valid());
        let result = run(field, json!([{ "x": 1 }, "Pool", [1, 2], true, 24]));
        let errors = result.errors().unwrap();
        assert_eq!(
            errors.paths(),
            vec!["test_field[0]", "test_field[2]", "test_field[3]", "test_field[4]"]
        );
        assert_eq!(errors.violations()[0].kind, RuleKind::TypeCheck);
        assert_eq!(errors.first("test_field[3]"), Some("not text"));
    }

    #[test]
    fn type_check_other_shapes() {
        let check = |expected, value: Value| {
            run(
                FieldSchema::nullable().rule(ValidationRule::type_check(expected, "wrong type")),
                value,
            )
            .is_valid()
        };
        assert!(check(ValueType::Number, json!("12")));
        assert!(!check(ValueType::Number, json!("twelve")));
        assert!(check(ValueType::Boolean, json!(false)));
        assert!(!check(ValueType::Boolean, json!("false")));
        assert!(check(ValueType::Array, json!([])));
        assert!(!check(ValueType::Object, json!([])));
    }

    #[test]
    fn time_format() {
        let field = FieldSchema::nullable().rule(ValidationRule::time("bad time"));
        for ok in ["00:00", "09:30", "23:59"] {
            assert!(run(field.clone(), json!(ok)).is_valid(), "{ok} should pass");
        }
        for bad in ["24:00", "25:00", "12:60", "9:30", "09:30:00", ""] {
            assert!(!run(field.clone(), json!(bad)).is_valid(), "{bad} should fail");
        }
    }

    #[test]
    fn fail_fast_stops_at_first_failing_rule() {
        let field = FieldSchema::required("required")
            .rule(ValidationRule::pattern("[a-z]*", "lowercase only").unwrap())
            .rule(ValidationRule::min_length(8, "too short"));
        let schema = single(field);
        let input = json!({ "test_field": "ABC" });

        let all = validate(&input, &schema, Mode::CollectAll);
        assert_eq!(messages(&all, "test_field"), vec!["lowercase only", "too short"]);

        let fast = validate(&input, &schema, Mode::FailFast);
        assert_eq!(messages(&fast, "test_field"), vec!["lowercase only"]);
    }

    #[test]
    fn fail_fast_does_not_skip_other_fields() {
        let schema = FormSchema::new()
            .field("a", FieldSchema::required("A is required"))
            .field("b", FieldSchema::required("B is required"));
        let result = validate(&json!({}), &schema, Mode::FailFast);
        let errors = result.errors().unwrap();
        assert_eq!(errors.paths(), vec!["a", "b"]);
    }

    #[test]
    fn array_elements_report_indexed_paths() {
        let field = FieldSchema::nullable()
            .items(FieldSchema::optional().rule(ValidationRule::min(1.0, "must be positive")));
        let result = run(field, json!([3, 0, 2, -1]));
        let errors = result.errors().unwrap();
        assert_eq!(errors.paths(), vec!["test_field[1]", "test_field[3]"]);
        assert_eq!(errors.first("test_field[1]"), Some("must be positive"));
    }

    #[test]
    fn object_elements_report_dotted_paths() {
        let shape = FormSchema::new()
            .field("price", FieldSchema::required("Price is required"))
            .field("name", FieldSchema::required("Name is required"));
        let field = FieldSchema::required("required").items(FieldSchema::optional().shape(shape));
        let result = run(field, json!([{ "price": 10, "name": "x" }, { "name": "y" }]));
        let errors = result.errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first("test_field[1].price"), Some("Price is required"));
    }

    #[test]
    fn non_array_with_item_schema_is_reported() {
        let field = FieldSchema::nullable().items(FieldSchema::optional());
        let result = run(field, json!("not a list"));
        let errors = result.errors().unwrap();
        assert_eq!(errors.violations()[0].kind, RuleKind::NestedSchema);
        assert_eq!(errors.first("test_field"), Some("test_field must be an array"));
    }

    #[test]
    fn non_object_element_is_reported() {
        let shape = FormSchema::new().field("price", FieldSchema::required("Price is required"));
        let field = FieldSchema::nullable().items(FieldSchema::optional().shape(shape));
        let result = run(field, json!([42]));
        assert_eq!(
            result.errors().unwrap().first("test_field[0]"),
            Some("test_field[0] must be an object")
        );
    }

    #[test]
    fn fail_fast_skips_container_check_after_rule_failure() {
        let field = FieldSchema::nullable()
            .rule(ValidationRule::min_items(1, "need one"))
            .items(FieldSchema::optional());
        let schema = single(field);
        let input = json!({ "test_field": 7 });
        let fast = validate(&input, &schema, Mode::FailFast);
        assert_eq!(messages(&fast, "test_field"), vec!["need one"]);
        let all = validate(&input, &schema, Mode::CollectAll);
        assert_eq!(
            messages(&all, "test_field"),
            vec!["need one", "test_field must be an array"]
        );
    }

    #[test]
    fn non_object_input_is_an_empty_record() {
        let schema = single(FieldSchema::required("Field is required"));
        let result = validate(&json!([1, 2, 3]), &schema, Mode::CollectAll);
        assert_eq!(messages(&result, "test_field"), vec!["Field is required"]);
    }

    #[test]
    fn empty_schema_is_always_valid() {
        let result = validate(&json!({ "anything": 1 }), &FormSchema::new(), Mode::FailFast);
        assert!(result.is_valid());
    }
}
