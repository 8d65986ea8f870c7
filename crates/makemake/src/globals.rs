//! placeholder substitution
//!
//! Every document owns one [Globals] table. A placeholder `$(name)` in any string is replaced by
//! the value registered under `name`; unknown placeholders stay as they are.
//!
//! Expansion is a single pass in registration order. Values are expanded when they are
//! registered, so `$(b)` inside `a` only resolves if `b` was registered before `a`.
use crate::value::Value;
use crate::visit::VisitStringsMut;
use indexmap::IndexMap;

/// Placeholder token for a global, `$(name)`
pub fn placeholder(name: &str) -> String {
    format!("$({name})")
}

/// Ordered table of fully expanded globals
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct Globals {
    table: IndexMap<String, String>,
}

impl Globals {
    /// Expands `value` against the current table before storing it under `name`
    ///
    /// Re-registering a name replaces its value but keeps its original position.
    pub fn add(&mut self, name: impl Into<String>, value: &str) {
        let name = name.into();
        let value = self.expand(value);
        tracing::trace!(%name, %value, "add global");
        self.table.insert(name, value);
    }

    /// Replaces every known placeholder in `text`
    pub fn expand(&self, text: &str) -> String {
        let mut text = text.to_string();
        for (name, value) in &self.table {
            if !text.contains("$(") {
                break;
            }
            text = text.replace(&placeholder(name), value);
        }
        text
    }

    /// Expands all strings of `target` in place
    ///
    /// When `target` is an object and a `category` is given, each expanded string value is also
    /// registered as `<category>.<key>`. Registration happens key by key, so a later key can
    /// reference an earlier one of the same section.
    ///
    /// # Panic
    /// Panics if `target` contains anything other than strings, arrays and objects.
    pub fn apply(&mut self, target: &mut Value, category: Option<&str>) {
        match (target, category) {
            (Value::Object(section), Some(category)) => self.apply_section(section, category),
            (target, _) => self.expand_in_place(target),
        }
    }

    /// Expands a section and registers its string fields as `<category>.<key>`
    pub fn apply_section(&mut self, section: &mut IndexMap<String, Value>, category: &str) {
        for (key, value) in section.iter_mut() {
            self.expand_in_place(value);
            if let Value::String(expanded) = value {
                let name = format!("{category}.{key}");
                tracing::trace!(%name, value=%expanded, "add global");
                self.table.insert(name, expanded.clone());
            }
        }
    }

    /// Expands all strings of `target` in place, without registering anything
    pub fn expand_in_place<T: VisitStringsMut + ?Sized>(&self, target: &mut T) {
        target.visit_strings_mut(&mut |text: &mut String| *text = self.expand(text));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.table.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.table.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl<K: Into<String>, V: AsRef<str>> FromIterator<(K, V)> for Globals {
    /// Registers each pair in order with [Globals::add]
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut globals = Globals::default();
        for (name, value) in iter {
            globals.add(name, value.as_ref());
        }
        globals
    }
}
