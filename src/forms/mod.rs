//! Declarative form definitions and their validation.
//!
//! A [`FormSpec`] is a static list of fields. Validating submitted values
//! leaves the definition untouched; it returns a [`ValidationResult`] holding the
//! submitted values (for re-display) and the per-field error lists.

use std::collections::{BTreeMap, HashMap};

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const READ_ONLY_MESSAGE: &str = "This form is read-only.";
pub const CSRF_MESSAGE: &str = "The CSRF token is missing or invalid.";

/// Key for errors that belong to the form rather than one of its fields.
pub const FORM_ERROR_KEY: &str = "_form";
/// Hidden field carrying the per-session CSRF token.
pub const CSRF_FIELD: &str = "csrf_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Password,
    TextArea,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Maximum length in characters, mirroring the column width.
    pub max_len: Option<usize>,
    pub readonly: bool,
}

impl FieldSpec {
    const fn required(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: true,
            max_len: None,
            readonly: false,
        }
    }

    const fn max_len(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    const fn display(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Text,
            required: false,
            max_len: None,
            readonly: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormSpec {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
    pub submittable: bool,
}

pub const REGISTER_FORM: FormSpec = FormSpec {
    name: "register",
    fields: &[
        FieldSpec::required("username", "Username", FieldKind::Text).max_len(20),
        FieldSpec::required("password", "Password", FieldKind::Password),
        FieldSpec::required("email", "Email", FieldKind::Email).max_len(50),
        FieldSpec::required("first_name", "First Name", FieldKind::Text).max_len(30),
        FieldSpec::required("last_name", "Last Name", FieldKind::Text).max_len(20),
    ],
    submittable: true,
};

pub const LOGIN_FORM: FormSpec = FormSpec {
    name: "login",
    fields: &[
        FieldSpec::required("username", "Username", FieldKind::Text),
        FieldSpec::required("password", "Password", FieldKind::Password),
    ],
    submittable: true,
};

pub const FEEDBACK_FORM: FormSpec = FormSpec {
    name: "feedback",
    fields: &[
        FieldSpec::required("title", "Title", FieldKind::Text).max_len(100),
        FieldSpec::required("content", "Content", FieldKind::TextArea),
    ],
    submittable: true,
};

pub const PROFILE_FORM: FormSpec = FormSpec {
    name: "profile",
    fields: &[
        FieldSpec::display("username", "Username"),
        FieldSpec::display("email", "Email"),
        FieldSpec::display("first_name", "First Name"),
        FieldSpec::display("last_name", "Last Name"),
    ],
    submittable: false,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    values: BTreeMap<String, String>,
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationResult {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Submitted (or prefilled) value, empty when absent.
    #[must_use]
    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map_or("", String::as_str)
    }

    #[must_use]
    pub const fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    #[must_use]
    pub fn field_errors(&self, field: &str) -> &[String] {
        self.errors.get(field).map_or(&[], Vec::as_slice)
    }

    /// Appends an error found after the declarative pass, e.g. a uniqueness
    /// conflict reported by the store.
    #[must_use]
    pub fn with_error(mut self, field: &str, message: impl Into<String>) -> Self {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
        self
    }
}

impl FormSpec {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Checks presence and length of every field. Text values are trimmed;
    /// passwords are kept byte-for-byte.
    #[must_use]
    pub fn validate(&self, submitted: &HashMap<String, String>) -> ValidationResult {
        let mut result = ValidationResult::default();

        if !self.submittable {
            return result.with_error(FORM_ERROR_KEY, READ_ONLY_MESSAGE);
        }

        for field in self.fields {
            let raw = submitted.get(field.name).map_or("", String::as_str);
            let value = if field.kind == FieldKind::Password {
                raw.to_string()
            } else {
                raw.trim().to_string()
            };

            if field.required && value.trim().is_empty() {
                result = result.with_error(field.name, REQUIRED_MESSAGE);
            } else if let Some(max) = field.max_len
                && value.chars().count() > max
            {
                result = result.with_error(
                    field.name,
                    format!("Field cannot be longer than {max} characters."),
                );
            }

            result.values.insert(field.name.to_string(), value);
        }

        result
    }

    /// A result with no errors, for rendering a form on GET.
    #[must_use]
    pub fn prefill<'a, I>(&self, values: I) -> ValidationResult
    where
        I: IntoIterator<Item = (&'a str, String)>,
    {
        let mut result = ValidationResult::default();
        for (name, value) in values {
            if self.field(name).is_some() {
                result.values.insert(name.to_string(), value);
            }
        }
        result
    }

    #[must_use]
    pub fn blank(&self) -> ValidationResult {
        ValidationResult::default()
    }

    /// Flattens field definitions and result into what templates iterate over.
    #[must_use]
    pub fn view(&self, result: &ValidationResult) -> FormView {
        let fields = self
            .fields
            .iter()
            .map(|field| FieldView {
                name: field.name,
                label: field.label,
                kind: field.kind,
                value: if field.kind == FieldKind::Password {
                    String::new()
                } else {
                    result.value(field.name).to_string()
                },
                errors: result.field_errors(field.name).to_vec(),
                required: field.required,
                readonly: field.readonly,
                max_len: field.max_len.unwrap_or(0),
            })
            .collect();

        let form_errors = result
            .errors()
            .iter()
            .filter(|(key, _)| self.field(key).is_none())
            .flat_map(|(_, messages)| messages.iter().cloned())
            .collect();

        FormView {
            fields,
            form_errors,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub value: String,
    pub errors: Vec<String>,
    pub required: bool,
    pub readonly: bool,
    /// Zero when unbounded.
    pub max_len: usize,
}

impl FieldView {
    #[must_use]
    pub const fn input_type(&self) -> &'static str {
        match self.kind {
            FieldKind::Text | FieldKind::TextArea => "text",
            FieldKind::Email => "email",
            FieldKind::Password => "password",
        }
    }

    #[must_use]
    pub fn is_textarea(&self) -> bool {
        self.kind == FieldKind::TextArea
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub fields: Vec<FieldView>,
    /// Errors not tied to a visible field (CSRF, read-only submissions).
    pub form_errors: Vec<String>,
}
