//! visitor over the string leaves of a [Value]
//!
//! Substitution only ever rewrites strings, so this is the one traversal the crate needs.
use crate::value::Value;

/// Visitor that receives its subjects mutably
pub trait VisitMut<T> {
    fn visit_mut(&mut self, value: &mut T);
}

impl<T, F> VisitMut<T> for F
where
    F: FnMut(&mut T),
{
    fn visit_mut(&mut self, value: &mut T) {
        self(value)
    }
}

/// Recursively visit all strings mutably
///
/// Arrays are visited element by element and objects value by value (keys are left alone).
///
/// # Panic
/// Panics when a null, boolean or number is reached. Callers validate shapes before they
/// expand, so reaching one is a bug in the caller and not a user error.
pub trait VisitStringsMut {
    fn visit_strings_mut(&mut self, visitor: &mut dyn VisitMut<String>);
}

impl VisitStringsMut for Value {
    fn visit_strings_mut(&mut self, visitor: &mut dyn VisitMut<String>) {
        match self {
            Value::String(string) => visitor.visit_mut(string),
            Value::Array(array) => {
                for element in array {
                    element.visit_strings_mut(visitor);
                }
            }
            Value::Object(object) => {
                for value in object.values_mut() {
                    value.visit_strings_mut(visitor);
                }
            }
            other => panic!(
                "{} reached substitution. This should never happen. Please report this.",
                other.kind()
            ),
        }
    }
}

impl VisitStringsMut for String {
    fn visit_strings_mut(&mut self, visitor: &mut dyn VisitMut<String>) {
        visitor.visit_mut(self)
    }
}

impl<T: VisitStringsMut> VisitStringsMut for Vec<T> {
    fn visit_strings_mut(&mut self, visitor: &mut dyn VisitMut<String>) {
        for element in self {
            element.visit_strings_mut(visitor);
        }
    }
}
