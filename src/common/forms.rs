use std::collections::BTreeMap;

use serde::Serialize;

/// Per-field validation messages, keyed by form field name.
#[derive(Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flattened messages in the `path: message` shape used by error responses.
    pub fn details(&self) -> Vec<String> {
        self.0
            .iter()
            .flat_map(|(field, messages)| {
                messages.iter().map(move |message| format!("{field}: {message}"))
            })
            .collect()
    }
}

impl From<garde::Errors> for FormErrors {
    fn from(errors: garde::Errors) -> Self {
        let mut form_errors = FormErrors::default();

        for (path, error) in errors.flatten() {
            // garde roots every path at `value`
            let field = path.strip_prefix("value.").unwrap_or(&path);
            form_errors.add(field, error.to_string());
        }

        form_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_messages_per_field() {
        let mut errors = FormErrors::default();
        assert!(errors.is_empty());

        errors.add("group", "select a valid choice");
        errors.add("group", "another");
        errors.add("text", "required");

        assert_eq!(errors.field("group").len(), 2);
        assert!(errors.field("missing").is_empty());
        assert_eq!(
            errors.details(),
            vec![
                "group: select a valid choice".to_string(),
                "group: another".to_string(),
                "text: required".to_string(),
            ]
        );
    }

    #[derive(garde::Validate)]
    struct Named {
        #[garde(length(min = 1))]
        name: String,
    }

    #[test]
    fn garde_errors_are_keyed_by_field_name() {
        use garde::Validate;

        let errors: FormErrors = Named {
            name: String::new(),
        }
        .validate(&())
        .unwrap_err()
        .into();

        assert_eq!(errors.field("name").len(), 1);
        assert!(errors.field("value.name").is_empty());
        assert!(errors.details()[0].starts_with("name: "));
    }

    #[test]
    fn serializes_as_plain_map() {
        let mut errors = FormErrors::default();
        errors.add("text", "required");

        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({ "text": ["required"] })
        );
    }
}
