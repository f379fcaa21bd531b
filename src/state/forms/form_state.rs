//! Form state management and form definitions

use super::field::{FieldValue, FormField};
use super::submission::{SubmitDecision, SubmitPhase, Submission};
use super::validation::{FieldErrors, FormValues, Rule, RuleSet};
use indexmap::IndexSet;

/// Trait for common form operations
pub trait Form {
    fn field_count(&self) -> usize;
    fn active_field(&self) -> usize;
    fn set_active_field(&mut self, index: usize);
    fn next_field(&mut self) {
        let count = self.field_count();
        let current = self.active_field();
        self.set_active_field((current + 1) % count);
    }
    fn prev_field(&mut self) {
        let count = self.field_count();
        let current = self.active_field();
        if current == 0 {
            self.set_active_field(count - 1);
        } else {
            self.set_active_field(current - 1);
        }
    }
    fn get_active_field_mut(&mut self) -> Option<&mut FormField>;
    fn get_field(&self, index: usize) -> Option<&FormField>;
}

/// The forms the application knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    SignIn,
    SignUp,
    Employee,
}

impl FormKind {
    pub fn title(&self) -> &'static str {
        match self {
            Self::SignIn => "Welcome Back",
            Self::SignUp => "Create an account",
            Self::Employee => "Employee Information",
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            Self::SignIn => "Sign in with your email and password",
            Self::SignUp => "Fill in your details to get started",
            Self::Employee => "Fill in the employee details below.",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self {
            Self::SignIn => "Login",
            Self::SignUp => "Sign up",
            Self::Employee => "Submit",
        }
    }

    fn fields(&self) -> Vec<FormField> {
        match self {
            Self::SignIn => vec![
                FormField::text("email", "Email", "Email"),
                FormField::secret("password", "Password", "Password"),
            ],
            Self::SignUp => vec![
                FormField::text("full_name", "Full Name", "Enter full name"),
                FormField::text("username", "Username", "Pick a username"),
                FormField::text("email", "Email", "Enter email address"),
                FormField::text("phone", "Phone", "10 digit phone number"),
                FormField::secret("password", "Password", "Password"),
                FormField::secret("confirm_password", "Confirm Password", "Repeat password"),
                FormField::checkbox("accept_terms", "I accept the terms and conditions"),
            ],
            Self::Employee => vec![
                FormField::text("employee_name", "Employee Name", "Enter full name"),
                FormField::text("email", "Email", "Enter email address"),
                FormField::text("phone", "Phone", "Enter phone number"),
                FormField::text("department", "Department", "e.g. HR, IT, Finance"),
                FormField::text("position", "Position", "e.g. Manager, Developer"),
                FormField::text("employee_id", "Employee ID", "e.g. EMP001"),
                FormField::checkbox(
                    "accept_terms",
                    "I confirm the above employee information is accurate.",
                ),
            ],
        }
    }

    /// Validation table for this form
    pub fn rules(&self) -> RuleSet {
        match self {
            Self::SignIn => RuleSet::new()
                .field(
                    "email",
                    [
                        Rule::required("Email is required"),
                        Rule::email("Invalid email"),
                    ],
                )
                .field("password", password_rules()),
            Self::SignUp => RuleSet::new()
                .field(
                    "full_name",
                    [
                        Rule::required("Full name is required"),
                        Rule::min_len(2, "Name must be at least 2 characters"),
                    ],
                )
                .field(
                    "username",
                    [
                        Rule::required("Username is required"),
                        Rule::min_len(3, "Username must be at least 3 characters"),
                        Rule::max_len(20, "Username must not pass 20 characters"),
                    ],
                )
                .field(
                    "email",
                    [
                        Rule::required("Email is required"),
                        Rule::email("Invalid email"),
                    ],
                )
                .field(
                    "phone",
                    [
                        Rule::required("Phone number is required"),
                        Rule::digits(10, "Phone number must be exactly 10 digits"),
                    ],
                )
                .field("password", password_rules())
                .field(
                    "confirm_password",
                    [
                        Rule::required("Please confirm your password"),
                        Rule::equals_field("password", "Passwords must match"),
                    ],
                )
                .field(
                    "accept_terms",
                    [Rule::must_be_true("You must accept the terms and conditions")],
                ),
            Self::Employee => RuleSet::new()
                .field(
                    "employee_name",
                    [
                        Rule::required("Employee name is required"),
                        Rule::min_len(2, "Name must be at least 2 characters"),
                    ],
                )
                .field(
                    "email",
                    [
                        Rule::required("Email is required"),
                        Rule::email("Invalid Email"),
                    ],
                )
                .field(
                    "phone",
                    [
                        Rule::required("Phone number is required"),
                        Rule::digits_between(10, 15, "Enter a valid phone number"),
                    ],
                )
                .field(
                    "department",
                    [
                        Rule::required("Department is required"),
                        Rule::min_len(2, "Please enter a department"),
                    ],
                )
                .field(
                    "position",
                    [
                        Rule::required("Position is required"),
                        Rule::min_len(2, "Please enter a job position"),
                    ],
                )
                .field(
                    "employee_id",
                    [
                        Rule::required("Employee ID is required"),
                        Rule::min_len(3, "Employee ID must be at least 3 characters"),
                    ],
                )
                .field(
                    "accept_terms",
                    [Rule::must_be_true("You must accept the company policies")],
                ),
        }
    }
}

fn password_rules() -> [Rule; 3] {
    [
        Rule::required("Password is required"),
        Rule::min_len(6, "Password is at least 6 characters"),
        Rule::max_len(20, "Password must not pass 20 characters"),
    ]
}

/// A mounted form: field values, touched set, computed errors and the
/// submission state machine
#[derive(Debug, Clone)]
pub struct FormModel {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    /// Focus index; `fields.len()` is the submit button row
    pub active_field_index: usize,
    rules: RuleSet,
    touched: IndexSet<String>,
    errors: FieldErrors,
    submission: Submission,
}

impl FormModel {
    pub fn new(kind: FormKind) -> Self {
        let mut form = Self {
            kind,
            fields: kind.fields(),
            active_field_index: 0,
            rules: kind.rules(),
            touched: IndexSet::new(),
            errors: FieldErrors::new(),
            submission: Submission::default(),
        };
        form.revalidate();
        form
    }

    /// Snapshot of the current values
    pub fn values(&self) -> FormValues {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect()
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Text value of `name`, empty if missing
    pub fn text(&self, name: &str) -> &str {
        self.field(name).map(FormField::as_text).unwrap_or("")
    }

    /// Replace a field's value (prefill, tests). Recomputes errors.
    pub fn set_value(&mut self, name: &str, value: impl Into<FieldValue>) {
        if let Some(field) = self.fields.iter_mut().find(|f| f.name == name) {
            field.value = value.into();
            self.revalidate();
        }
    }

    /// Every current error, touched or not
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Error to display for `name`: only once the field has been touched
    pub fn visible_error(&self, name: &str) -> Option<&str> {
        if self.touched.contains(name) {
            self.errors.get(name).map(String::as_str)
        } else {
            None
        }
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.touched.contains(name)
    }

    /// Mark a field as interacted with (blur)
    pub fn touch(&mut self, name: &str) {
        if self.field(name).is_some() {
            self.touched.insert(name.to_string());
            self.revalidate();
        }
    }

    fn touch_all(&mut self) {
        for field in &self.fields {
            self.touched.insert(field.name.clone());
        }
    }

    fn revalidate(&mut self) {
        self.errors = self.rules.validate(&self.values());
    }

    /// Whether focus is on the submit button row
    pub fn is_submit_row_active(&self) -> bool {
        self.active_field_index == self.fields.len()
    }

    /// Type a character into the focused field
    pub fn input_char(&mut self, c: char) {
        if self.submission.is_submitting() {
            return;
        }
        if let Some(field) = self.get_active_field_mut() {
            field.push_char(c);
            self.revalidate();
        }
    }

    /// Delete the last character of the focused field
    pub fn backspace(&mut self) {
        if self.submission.is_submitting() {
            return;
        }
        if let Some(field) = self.get_active_field_mut() {
            field.pop_char();
            self.revalidate();
        }
    }

    /// Toggle the focused checkbox. Toggling counts as touching it.
    pub fn toggle_active(&mut self) {
        if self.submission.is_submitting() {
            return;
        }
        let Some(field) = self.get_active_field_mut() else {
            return;
        };
        if field.is_checkbox() {
            field.toggle();
            let name = field.name.clone();
            self.touch(&name);
        }
    }

    pub fn phase(&self) -> SubmitPhase {
        self.submission.phase()
    }

    pub fn is_submitting(&self) -> bool {
        self.submission.is_submitting()
    }

    /// Top-level error from the collaborator
    pub fn submit_error(&self) -> Option<&str> {
        self.submission.error()
    }

    pub fn submit_attempts(&self) -> u32 {
        self.submission.attempts()
    }

    /// Explicit submit: touch everything, validate, and hand back the values
    /// if they are clean. Re-entrant calls while submitting are ignored.
    pub fn begin_submit(&mut self) -> SubmitDecision {
        if !self.submission.start_validation() {
            tracing::debug!(form = ?self.kind, "submit ignored: already submitting");
            return SubmitDecision::Ignored;
        }

        self.touch_all();
        self.revalidate();

        if !self.errors.is_empty() {
            self.submission.reject();
            tracing::debug!(
                form = ?self.kind,
                fields = ?self.errors.keys().collect::<Vec<_>>(),
                "submit blocked by validation"
            );
            return SubmitDecision::Invalid(self.errors.len());
        }

        self.submission.start_submitting();
        SubmitDecision::Ready(self.values())
    }

    /// Record the collaborator outcome. Field values are left untouched.
    /// Returns false if no submission was in flight.
    pub fn finish_submit(&mut self, outcome: Result<(), String>) -> bool {
        self.submission.finish(outcome)
    }
}

impl Form for FormModel {
    fn field_count(&self) -> usize {
        self.fields.len() + 1 // fields + submit button
    }
    fn active_field(&self) -> usize {
        self.active_field_index
    }
    fn set_active_field(&mut self, index: usize) {
        let index = index.min(self.fields.len());
        if index != self.active_field_index {
            // Leaving a field is a blur
            if let Some(name) = self.get_field(self.active_field_index).map(|f| f.name.clone()) {
                self.touch(&name);
            }
        }
        self.active_field_index = index;
    }
    fn get_active_field_mut(&mut self) -> Option<&mut FormField> {
        self.fields.get_mut(self.active_field_index)
    }
    fn get_field(&self, index: usize) -> Option<&FormField> {
        self.fields.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_into(form: &mut FormModel, text: &str) {
        for c in text.chars() {
            form.input_char(c);
        }
    }

    fn filled_sign_up() -> FormModel {
        let mut form = FormModel::new(FormKind::SignUp);
        form.set_value("full_name", "Ada Lovelace");
        form.set_value("username", "ada");
        form.set_value("email", "ada@example.com");
        form.set_value("phone", "0123456789");
        form.set_value("password", "secret1");
        form.set_value("confirm_password", "secret1");
        form.set_value("accept_terms", true);
        form
    }

    fn filled_employee() -> FormModel {
        let mut form = FormModel::new(FormKind::Employee);
        form.set_value("employee_name", "Grace Hopper");
        form.set_value("email", "grace@navy.mil");
        form.set_value("phone", "123456789012");
        form.set_value("department", "IT");
        form.set_value("position", "Admiral");
        form.set_value("employee_id", "EMP001");
        form.set_value("accept_terms", true);
        form
    }

    mod navigation {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_field_count_includes_submit_row() {
            let form = FormModel::new(FormKind::SignIn);
            assert_eq!(form.field_count(), 3);
        }

        #[test]
        fn test_next_field_cycles() {
            let mut form = FormModel::new(FormKind::SignIn);
            for _ in 0..3 {
                form.next_field();
            }
            assert_eq!(form.active_field_index, 0);
        }

        #[test]
        fn test_prev_field_wraps_to_submit_row() {
            let mut form = FormModel::new(FormKind::SignIn);
            form.prev_field();
            assert!(form.is_submit_row_active());
            assert!(form.get_active_field_mut().is_none());
        }

        #[test]
        fn test_set_active_field_clamps() {
            let mut form = FormModel::new(FormKind::Employee);
            form.set_active_field(100);
            assert_eq!(form.active_field_index, 7);
        }

        #[test]
        fn test_leaving_a_field_touches_it() {
            let mut form = FormModel::new(FormKind::SignIn);
            assert!(!form.is_touched("email"));
            form.next_field();
            assert!(form.is_touched("email"));
            assert!(!form.is_touched("password"));
        }
    }

    mod display_rules {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_errors_computed_but_hidden_until_touched() {
            let form = FormModel::new(FormKind::SignIn);
            assert_eq!(form.errors()["email"], "Email is required");
            assert!(form.visible_error("email").is_none());
        }

        #[test]
        fn test_error_visible_after_blur() {
            let mut form = FormModel::new(FormKind::SignIn);
            type_into(&mut form, "not-an-email");
            form.next_field();
            assert_eq!(form.visible_error("email"), Some("Invalid email"));
        }

        #[test]
        fn test_errors_recomputed_on_every_keystroke() {
            let mut form = FormModel::new(FormKind::SignIn);
            form.set_active_field(1);
            type_into(&mut form, "abcde");
            assert_eq!(form.errors()["password"], "Password is at least 6 characters");
            form.input_char('f');
            assert!(!form.errors().contains_key("password"));
            form.backspace();
            assert!(form.errors().contains_key("password"));
        }

        #[test]
        fn test_toggling_checkbox_touches_it() {
            let mut form = FormModel::new(FormKind::Employee);
            form.set_active_field(6);
            form.toggle_active();
            assert!(form.is_touched("accept_terms"));
            assert!(form.visible_error("accept_terms").is_none());
            form.toggle_active();
            assert_eq!(
                form.visible_error("accept_terms"),
                Some("You must accept the company policies")
            );
        }
    }

    mod rule_tables {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_complete_forms_are_valid() {
            assert!(filled_sign_up().errors().is_empty());
            assert!(filled_employee().errors().is_empty());

            let mut sign_in = FormModel::new(FormKind::SignIn);
            sign_in.set_value("email", "a@b.com");
            sign_in.set_value("password", "secret1");
            assert!(sign_in.errors().is_empty());
        }

        #[test]
        fn test_each_required_field_reports_required_message() {
            let cases = [
                ("full_name", "Full name is required"),
                ("username", "Username is required"),
                ("email", "Email is required"),
                ("phone", "Phone number is required"),
                ("password", "Password is required"),
                ("confirm_password", "Please confirm your password"),
            ];
            for (name, message) in cases {
                let mut form = filled_sign_up();
                form.set_value(name, "");
                let errors = form.errors();
                assert_eq!(errors.get(name).map(String::as_str), Some(message), "{name}");
            }
        }

        #[test]
        fn test_sign_up_phone_requires_exactly_ten_digits() {
            let mut form = filled_sign_up();
            form.set_value("phone", "12345");
            assert_eq!(
                form.errors()["phone"],
                "Phone number must be exactly 10 digits"
            );
        }

        #[test]
        fn test_employee_phone_accepts_ten_to_fifteen_digits() {
            let mut form = filled_employee();
            form.set_value("phone", "12345");
            assert_eq!(form.errors()["phone"], "Enter a valid phone number");
            form.set_value("phone", "123456789012345");
            assert!(form.errors().is_empty());
        }

        #[test]
        fn test_sign_up_password_mismatch() {
            let mut form = filled_sign_up();
            form.set_value("confirm_password", "secret2");
            assert_eq!(form.errors()["confirm_password"], "Passwords must match");
            form.set_value("password", "secret2");
            assert!(form.errors().is_empty());
        }

        #[test]
        fn test_sign_up_requires_terms() {
            let mut form = filled_sign_up();
            form.set_value("accept_terms", false);
            assert_eq!(
                form.errors()["accept_terms"],
                "You must accept the terms and conditions"
            );
        }

        #[test]
        fn test_password_length_bounds() {
            let mut form = FormModel::new(FormKind::SignIn);
            form.set_value("email", "a@b.com");
            form.set_value("password", "a".repeat(21));
            assert_eq!(
                form.errors()["password"],
                "Password must not pass 20 characters"
            );
            form.set_value("password", "a".repeat(20));
            assert!(form.errors().is_empty());
        }
    }

    mod submit {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_valid_sign_in_is_ready() {
            let mut form = FormModel::new(FormKind::SignIn);
            form.set_value("email", "a@b.com");
            form.set_value("password", "secret1");

            match form.begin_submit() {
                SubmitDecision::Ready(values) => {
                    assert_eq!(values["email"], FieldValue::from("a@b.com"));
                    assert_eq!(values["password"], FieldValue::from("secret1"));
                }
                other => panic!("expected Ready, got {other:?}"),
            }
            assert_eq!(form.phase(), SubmitPhase::Submitting);
            assert_eq!(form.submit_attempts(), 1);
        }

        #[test]
        fn test_invalid_submit_touches_all_and_stays_idle() {
            let mut form = FormModel::new(FormKind::SignIn);
            form.set_value("email", "a@b.com");
            form.set_value("password", "ab");

            assert_eq!(form.begin_submit(), SubmitDecision::Invalid(1));
            assert_eq!(form.phase(), SubmitPhase::Idle);
            assert!(form.is_touched("email"));
            assert_eq!(
                form.visible_error("password"),
                Some("Password is at least 6 characters")
            );
            assert!(form.submit_error().is_none());
            assert_eq!(form.submit_attempts(), 0);
        }

        #[test]
        fn test_resubmit_while_submitting_is_ignored() {
            let mut form = filled_employee();
            assert!(matches!(form.begin_submit(), SubmitDecision::Ready(_)));
            assert_eq!(form.begin_submit(), SubmitDecision::Ignored);
            assert_eq!(form.submit_attempts(), 1);
        }

        #[test]
        fn test_input_is_frozen_while_submitting() {
            let mut form = filled_employee();
            form.begin_submit();
            form.input_char('x');
            form.backspace();
            assert_eq!(form.text("employee_name"), "Grace Hopper");
        }

        #[test]
        fn test_failure_keeps_values_and_sets_error() {
            let mut form = FormModel::new(FormKind::SignIn);
            form.set_value("email", "a@b.com");
            form.set_value("password", "secret1");
            form.begin_submit();

            assert!(form.finish_submit(Err("wrong password".into())));
            assert_eq!(form.submit_error(), Some("wrong password"));
            assert_eq!(form.phase(), SubmitPhase::Idle);
            assert_eq!(form.text("email"), "a@b.com");
            assert_eq!(form.text("password"), "secret1");

            // The user can correct and try again
            assert!(matches!(form.begin_submit(), SubmitDecision::Ready(_)));
            assert!(form.submit_error().is_none());
        }

        #[test]
        fn test_finish_without_submission_is_stale() {
            let mut form = FormModel::new(FormKind::SignIn);
            assert!(!form.finish_submit(Ok(())));
        }
    }
}
