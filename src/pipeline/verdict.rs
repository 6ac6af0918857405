use regex::Regex;
use serde_json::{Map, Value};

/// The parsed safety judgment from the validation model's free-form reply.
pub type Verdict = Map<String, Value>;

/// Best-effort extraction of a JSON object from free-form model output.
///
/// Takes the greedy span from the first `{` to the last `}` and tries to
/// parse it. Returns `None` when no braces are found, the span is not valid
/// JSON, or the object is empty. The upstream text is unstructured model
/// output, so false negatives (and, with adversarial brace placement, false
/// positives) are accepted by contract; callers must treat the result as a
/// hint, not a guarantee.
pub fn extract_verdict(raw: &str) -> Option<Verdict> {
    let span = Regex::new(r"(?s)\{.*\}").unwrap().find(raw)?;
    let object = serde_json::from_str::<Value>(span.as_str())
        .ok()?
        .as_object()
        .cloned()?;
    if object.is_empty() {
        // An empty object carries no verdict.
        return None;
    }
    Some(object)
}

/// Reads the `safe_to_run` field, defaulting to "no" when absent or not a
/// string.
pub fn safe_to_run(verdict: &Verdict) -> bool {
    verdict.get("safe_to_run").and_then(Value::as_str) == Some("yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_object_surrounded_by_prose() {
        let verdict =
            extract_verdict(r#"Here is the result: {"safe_to_run": "yes"} thanks"#).unwrap();
        assert_eq!(
            verdict.get("safe_to_run").and_then(Value::as_str),
            Some("yes")
        );
        assert!(safe_to_run(&verdict));
    }

    #[test]
    fn no_braces_is_none() {
        assert!(extract_verdict("no braces here").is_none());
    }

    #[test]
    fn malformed_json_is_none() {
        assert!(extract_verdict(r#"{"safe_to_run": yes}"#).is_none());
    }

    #[test]
    fn empty_object_is_none() {
        assert!(extract_verdict("the answer is {}").is_none());
    }

    #[test]
    fn greedy_span_collapses_disjoint_objects() {
        // Two objects with text between them make one unparsable span; the
        // contract accepts this as a parse failure.
        assert!(extract_verdict(r#"{"a": 1} and {"b": 2}"#).is_none());
    }

    #[test]
    fn missing_field_means_not_safe() {
        let verdict = extract_verdict(r#"{"something_else": true}"#).unwrap();
        assert!(!safe_to_run(&verdict));
    }

    #[test]
    fn explicit_no_means_not_safe() {
        let verdict = extract_verdict(r#"{"safe_to_run": "no"}"#).unwrap();
        assert!(!safe_to_run(&verdict));
    }
}
