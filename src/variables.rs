//! Scenario variables and `{NAME}` placeholder resolution.

use indexmap::IndexMap;

use crate::error::StepError;

/// Name → value mapping used to carry output from one step into later ones.
///
/// Names are uppercase ASCII letters, digits and underscores and may not
/// start with a digit. Values are stored verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableStore {
    values: IndexMap<String, String>,
}

/// Returns `true` if `name` is a valid variable name.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

impl VariableStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `name`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::InvalidVariableName`] if `name` is not a valid
    /// variable name.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<(), StepError> {
        if !is_valid_name(name) {
            return Err(StepError::InvalidVariableName(name.to_string()));
        }
        self.values.insert(name.to_string(), value.into());
        Ok(())
    }

    /// Looks up a stored value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Replaces every `{NAME}` whose name is stored with its value.
    ///
    /// The text is scanned once, left to right. Substituted values are
    /// copied into the result without being scanned again, so a value that
    /// itself contains `{OTHER}` keeps it literally. Placeholders for names
    /// that are not stored are left as written.
    #[must_use]
    pub fn resolve(&self, text: &str) -> String {
        if self.values.is_empty() {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}').and_then(|close| Some((close, self.get(&after[..close])?))) {
                Some((close, value)) => {
                    out.push_str(value);
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Removes every variable.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Number of stored variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no variables are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
