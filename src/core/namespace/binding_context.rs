//! Translator bindings with lexical scopes.
//!
//! Tracks names bound to translation functions (`const t = useTranslations("common")`)
//! through nested function and arrow function bodies.

use std::collections::HashMap;

/// What a name in scope refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// A translator, qualified by the namespace its hook declared.
    Translator { namespace: Option<String> },
    /// A local that hides an outer translator or translation function.
    Shadowed,
}

/// A stack of scopes, innermost last.
///
/// ```ignore
/// const t = useTranslations("common");  // scope 0: t -> Translator("common")
/// function Inner(t) {                   // scope 1: t -> Shadowed
///     t("key");                         // not a translation call
/// }
/// ```
pub struct BindingContext {
    scopes: Vec<HashMap<String, Binding>>,
}

impl Default for BindingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingContext {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Leave the innermost scope. The module scope is never popped.
    pub fn exit_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn insert_binding(&mut self, name: String, binding: Binding) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, binding);
        }
    }

    /// Innermost binding of `name`.
    pub fn get_binding(&self, name: &str) -> Option<&Binding> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn is_in_current_scope(&self, name: &str) -> bool {
        self.scopes
            .last()
            .is_some_and(|scope| scope.contains_key(name))
    }
}
