//! Translatable dialog text.
//!
//! Dialog titles and bodies are built as small trees over a closed set of
//! node kinds and resolved against a string table at display time:
//! literals, key lookups with a fallback chain, and templates whose
//! `{token}` placeholders are substituted after resolution. Resolution is
//! depth-guarded so a malformed table with circular fallbacks degrades to
//! the deepest literal instead of looping.

use std::collections::HashMap;

/// Hard bound on fallback-chain depth during resolution.
const MAX_RESOLVE_DEPTH: usize = 100;

/// One piece of user-facing text, resolved lazily against a [`StringTable`].
#[derive(Debug, Clone, PartialEq)]
pub enum Translatable {
    /// Literal text shown as-is.
    Text(String),
    /// Table lookup, falling back to another node when the key is missing.
    Key {
        key: String,
        fallback: Box<Translatable>,
    },
    /// A base node whose resolved text has `{token}` placeholders replaced
    /// by resolved substitution values.
    Template {
        base: Box<Translatable>,
        substitutions: Vec<(String, Translatable)>,
    },
}

impl Translatable {
    pub fn text(s: impl Into<String>) -> Self {
        Translatable::Text(s.into())
    }

    /// Key lookup with a literal fallback.
    pub fn key(key: impl Into<String>, fallback: impl Into<String>) -> Self {
        Translatable::Key {
            key: key.into(),
            fallback: Box::new(Translatable::Text(fallback.into())),
        }
    }

    /// Wrap this node in a template with the given substitutions.
    pub fn with(self, substitutions: Vec<(&str, Translatable)>) -> Self {
        Translatable::Template {
            base: Box::new(self),
            substitutions: substitutions
                .into_iter()
                .map(|(token, value)| (token.to_string(), value))
                .collect(),
        }
    }
}

/// Flat key → text table, typically one per language.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    entries: HashMap<String, String>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(key.into(), text.into());
    }

    /// Resolve a translatable tree to display text.
    pub fn resolve(&self, node: &Translatable) -> String {
        self.resolve_depth(node, 0)
    }

    fn resolve_depth(&self, node: &Translatable, depth: usize) -> String {
        if depth >= MAX_RESOLVE_DEPTH {
            // Malformed table (circular fallback); degrade to the nearest
            // printable thing rather than recursing further.
            return match node {
                Translatable::Text(s) => s.clone(),
                Translatable::Key { key, .. } => key.clone(),
                Translatable::Template { .. } => String::new(),
            };
        }

        match node {
            Translatable::Text(s) => s.clone(),
            Translatable::Key { key, fallback } => match self.entries.get(key) {
                Some(text) => text.clone(),
                None => self.resolve_depth(fallback, depth + 1),
            },
            Translatable::Template {
                base,
                substitutions,
            } => {
                let mut text = self.resolve_depth(base, depth + 1);
                for (token, value) in substitutions {
                    let needle = format!("{{{token}}}");
                    if text.contains(&needle) {
                        let replacement = self.resolve_depth(value, depth + 1);
                        text = text.replace(&needle, &replacement);
                    }
                }
                text
            }
        }
    }
}
