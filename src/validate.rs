use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

/// A single failed rule, reported back to the client as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Per-route field validation. Rules run in the order they are declared
/// and failures accumulate across fields; nothing short-circuits, so the
/// client always sees the full list.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    /// Character-counted length bounds, inclusive.
    pub fn length(
        &mut self,
        field: &str,
        value: &str,
        min: usize,
        max: usize,
        message: &str,
    ) -> &mut Self {
        let len = value.chars().count();
        if len < min || len > max {
            self.fail(field, message);
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        if !EMAIL_RE.is_match(value) {
            self.fail(field, message);
        }
        self
    }

    pub fn required(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        if value.is_empty() {
            self.fail(field, message);
        }
        self
    }

    pub fn equals(&mut self, field: &str, value: &str, other: &str, message: &str) -> &mut Self {
        self.custom(field, message, || value == other)
    }

    /// Arbitrary predicate, for rules the other combinators do not cover.
    pub fn custom<F>(&mut self, field: &str, message: &str, pred: F) -> &mut Self
    where
        F: FnOnce() -> bool,
    {
        if !pred() {
            self.fail(field, message);
        }
        self
    }

    pub fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_input_passes() {
        let mut v = Validator::new();
        v.length("name", "Alice", 2, 25, "bad name")
            .email("email", "alice@example.com", "bad email");
        assert!(v.finish().is_ok());
    }

    #[test]
    fn failures_accumulate_in_declaration_order() {
        let mut v = Validator::new();
        v.length("name", "A", 2, 25, "bad name")
            .email("email", "not-an-email", "bad email")
            .length("password", "abc", 5, 20, "bad password");
        let errors = v.finish().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].field, "name");
        assert_eq!(errors[1].field, "email");
        assert_eq!(errors[2].field, "password");
    }

    #[test]
    fn length_bounds_are_inclusive_and_char_counted() {
        let mut v = Validator::new();
        v.length("name", "Al", 2, 25, "bad")
            .length("name", &"x".repeat(25), 2, 25, "bad");
        assert!(v.finish().is_ok());

        let mut v = Validator::new();
        v.length("name", "A", 2, 25, "bad")
            .length("name", &"x".repeat(26), 2, 25, "bad")
            .length("name", "éé", 2, 25, "bad"); // two chars, four bytes
        assert_eq!(v.finish().unwrap_err().len(), 2);
    }

    #[test]
    fn email_grammar() {
        let mut v = Validator::new();
        v.email("email", "a@x.com", "bad");
        assert!(v.finish().is_ok());

        for bad in ["", "a@x", "a x@y.com", "@x.com", "a@.com "] {
            let mut v = Validator::new();
            v.email("email", bad, "bad");
            assert!(v.finish().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn required_rejects_only_empty() {
        let mut v = Validator::new();
        v.required("password", "x", "blank");
        assert!(v.finish().is_ok());

        let mut v = Validator::new();
        v.required("password", "", "blank");
        let errors = v.finish().unwrap_err();
        assert_eq!(errors[0].message, "blank");
    }

    #[test]
    fn equals_carries_custom_message() {
        let mut v = Validator::new();
        v.equals("cpassword", "abcde", "abcdf", "passwords do not match");
        let errors = v.finish().unwrap_err();
        assert_eq!(
            errors[0],
            FieldError {
                field: "cpassword".into(),
                message: "passwords do not match".into(),
            }
        );
    }
}
