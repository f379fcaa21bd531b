//! Declarative field validation
//!
//! A [`RuleSet`] is an ordered table of `(field, rule, message)` entries.
//! Rules for a field run in declaration order and the first failure is that
//! field's error; later rules for the same field are not evaluated.

use super::field::FieldValue;
use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

/// Current field-name-to-value snapshot of a form
pub type FormValues = IndexMap<String, FieldValue>;

/// Field-name-to-message map; empty means the form is valid
pub type FieldErrors = IndexMap<String, String>;

/// Loose email shape: something, an `@`, a dotted domain, no whitespace.
///
/// # Panics
///
/// Panics if the hard-coded regex literal is invalid (impossible in practice).
#[allow(clippy::expect_used)]
static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex literal"));

/// What a rule checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    /// Text must contain something other than whitespace
    Required,
    /// At least this many characters
    MinLength(usize),
    /// At most this many characters
    MaxLength(usize),
    /// Looks like an email address
    Email,
    /// Only ASCII digits, between `min` and `max` of them
    Digits { min: usize, max: usize },
    /// Same text as another field
    EqualsField(String),
    /// Checkbox must be ticked
    MustBeTrue,
}

/// A predicate paired with the message shown when it fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub kind: RuleKind,
    pub message: String,
}

impl Rule {
    fn new(kind: RuleKind, message: &str) -> Self {
        Self {
            kind,
            message: message.to_string(),
        }
    }

    pub fn required(message: &str) -> Self {
        Self::new(RuleKind::Required, message)
    }

    pub fn min_len(min: usize, message: &str) -> Self {
        Self::new(RuleKind::MinLength(min), message)
    }

    pub fn max_len(max: usize, message: &str) -> Self {
        Self::new(RuleKind::MaxLength(max), message)
    }

    pub fn email(message: &str) -> Self {
        Self::new(RuleKind::Email, message)
    }

    /// Exactly `count` digits
    pub fn digits(count: usize, message: &str) -> Self {
        Self::digits_between(count, count, message)
    }

    pub fn digits_between(min: usize, max: usize, message: &str) -> Self {
        Self::new(RuleKind::Digits { min, max }, message)
    }

    pub fn equals_field(other: &str, message: &str) -> Self {
        Self::new(RuleKind::EqualsField(other.to_string()), message)
    }

    pub fn must_be_true(message: &str) -> Self {
        Self::new(RuleKind::MustBeTrue, message)
    }

    /// Evaluate against `value` (the field's own value) within `values`.
    ///
    /// Length, email and digit rules accept an empty value so optional
    /// fields stay valid; pair them with `required` to reject blanks.
    pub fn passes(&self, value: Option<&FieldValue>, values: &FormValues) -> bool {
        let text = value.and_then(FieldValue::as_text).unwrap_or("");
        match &self.kind {
            RuleKind::Required => match value {
                Some(FieldValue::Text(s)) => !s.trim().is_empty(),
                Some(FieldValue::Flag(_)) => true,
                None => false,
            },
            RuleKind::MinLength(min) => text.is_empty() || text.chars().count() >= *min,
            RuleKind::MaxLength(max) => text.chars().count() <= *max,
            RuleKind::Email => text.is_empty() || EMAIL_SHAPE.is_match(text),
            RuleKind::Digits { min, max } => {
                text.is_empty()
                    || (text.chars().all(|c| c.is_ascii_digit())
                        && (*min..=*max).contains(&text.len()))
            }
            RuleKind::EqualsField(other) => {
                let other = values.get(other).and_then(FieldValue::as_text).unwrap_or("");
                text == other
            }
            RuleKind::MustBeTrue => value.and_then(FieldValue::as_flag).unwrap_or(false),
        }
    }
}

/// Ordered validation table for one form
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    fields: Vec<(String, Vec<Rule>)>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the rules for `name`, evaluated in the given order
    pub fn field(mut self, name: &str, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.fields.push((name.to_string(), rules.into_iter().collect()));
        self
    }

    /// Compute the error map for `values`. Pure; recomputed from scratch.
    pub fn validate(&self, values: &FormValues) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for (name, rules) in &self.fields {
            let value = values.get(name);
            if let Some(failed) = rules.iter().find(|rule| !rule.passes(value, values)) {
                errors.insert(name.clone(), failed.message.clone());
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, FieldValue)]) -> FormValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn password_rules() -> RuleSet {
        RuleSet::new()
            .field(
                "email",
                [
                    Rule::required("Email is required"),
                    Rule::email("Invalid email"),
                ],
            )
            .field(
                "password",
                [
                    Rule::required("Password is required"),
                    Rule::min_len(6, "Password is at least 6 characters"),
                    Rule::max_len(20, "Password must not pass 20 characters"),
                ],
            )
    }

    mod rule_kinds {
        use super::*;

        #[test]
        fn test_required_rejects_blank_and_missing() {
            let rule = Rule::required("req");
            let empty = FormValues::new();
            assert!(!rule.passes(None, &empty));
            assert!(!rule.passes(Some(&"".into()), &empty));
            assert!(!rule.passes(Some(&"   ".into()), &empty));
            assert!(rule.passes(Some(&"x".into()), &empty));
        }

        #[test]
        fn test_length_counts_characters_not_bytes() {
            let empty = FormValues::new();
            assert!(Rule::min_len(3, "m").passes(Some(&"äöü".into()), &empty));
            assert!(Rule::max_len(3, "m").passes(Some(&"äöü".into()), &empty));
            assert!(!Rule::max_len(2, "m").passes(Some(&"äöü".into()), &empty));
        }

        #[test]
        fn test_email_shape() {
            let rule = Rule::email("bad");
            let empty = FormValues::new();
            for good in ["a@b.com", "first.last@sub.example.org"] {
                assert!(rule.passes(Some(&good.into()), &empty), "{good}");
            }
            for bad in ["a@b", "ab.com", "a b@c.com", "@b.com", "a@@b.com"] {
                assert!(!rule.passes(Some(&bad.into()), &empty), "{bad}");
            }
        }

        #[test]
        fn test_fixed_digit_count() {
            let rule = Rule::digits(10, "phone");
            let empty = FormValues::new();
            assert!(rule.passes(Some(&"0123456789".into()), &empty));
            assert!(!rule.passes(Some(&"12345".into()), &empty));
            assert!(!rule.passes(Some(&"01234567890".into()), &empty));
            assert!(!rule.passes(Some(&"012345678a".into()), &empty));
        }

        #[test]
        fn test_digit_range() {
            let rule = Rule::digits_between(10, 15, "phone");
            let empty = FormValues::new();
            assert!(rule.passes(Some(&"123456789012345".into()), &empty));
            assert!(!rule.passes(Some(&"1234567890123456".into()), &empty));
            assert!(!rule.passes(Some(&"123456789".into()), &empty));
        }

        #[test]
        fn test_must_be_true() {
            let rule = Rule::must_be_true("consent");
            let empty = FormValues::new();
            assert!(rule.passes(Some(&true.into()), &empty));
            assert!(!rule.passes(Some(&false.into()), &empty));
            assert!(!rule.passes(None, &empty));
            assert!(!rule.passes(Some(&"true".into()), &empty));
        }

        #[test]
        fn test_optional_rules_accept_empty_text() {
            let empty = FormValues::new();
            assert!(Rule::min_len(3, "m").passes(Some(&"".into()), &empty));
            assert!(Rule::email("e").passes(Some(&"".into()), &empty));
            assert!(Rule::digits(10, "d").passes(None, &empty));
        }
    }

    mod rule_sets {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_valid_values_produce_no_errors() {
            let errors = password_rules().validate(&values(&[
                ("email", "a@b.com".into()),
                ("password", "secret1".into()),
            ]));
            assert!(errors.is_empty());
        }

        #[test]
        fn test_short_password_message() {
            let errors = password_rules().validate(&values(&[
                ("email", "a@b.com".into()),
                ("password", "ab".into()),
            ]));
            assert_eq!(errors.len(), 1);
            assert_eq!(errors["password"], "Password is at least 6 characters");
        }

        #[test]
        fn test_missing_required_reports_only_required_message() {
            let errors = password_rules().validate(&values(&[("password", "".into())]));
            assert_eq!(errors["email"], "Email is required");
            assert_eq!(errors["password"], "Password is required");
        }

        #[test]
        fn test_first_failing_rule_wins() {
            let rules = RuleSet::new().field(
                "code",
                [Rule::min_len(5, "too short"), Rule::digits(5, "digits only")],
            );
            let errors = rules.validate(&values(&[("code", "ab".into())]));
            assert_eq!(errors["code"], "too short");
        }

        #[test]
        fn test_errors_follow_declaration_order() {
            let errors = password_rules().validate(&FormValues::new());
            let names: Vec<_> = errors.keys().map(String::as_str).collect();
            assert_eq!(names, vec!["email", "password"]);
        }

        #[test]
        fn test_confirmation_errors_iff_values_differ() {
            let rules = RuleSet::new().field(
                "confirm_password",
                [
                    Rule::required("Please confirm your password"),
                    Rule::equals_field("password", "Passwords must match"),
                ],
            );
            let cases = [
                ("secret1", "secret1", false),
                ("secret1", "secret2", true),
                ("secret1", "secret", true),
                ("", "secret1", true),
                ("Secret1", "secret1", true),
            ];
            for (password, confirm, expect_error) in cases {
                let errors = rules.validate(&values(&[
                    ("password", password.into()),
                    ("confirm_password", confirm.into()),
                ]));
                assert_eq!(
                    errors.contains_key("confirm_password"),
                    expect_error,
                    "password={password:?} confirm={confirm:?}"
                );
            }
        }

        #[test]
        fn test_confirmation_tracks_current_password() {
            let rules = RuleSet::new().field(
                "confirm_password",
                [Rule::equals_field("password", "Passwords must match")],
            );
            let mut form = values(&[
                ("password", "secret1".into()),
                ("confirm_password", "secret1".into()),
            ]);
            assert!(rules.validate(&form).is_empty());

            form.insert("password".into(), "changed1".into());
            assert_eq!(
                rules.validate(&form)["confirm_password"],
                "Passwords must match"
            );
        }
    }
}
