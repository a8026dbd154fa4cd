//! Locale string collaborator.
//!
//! Text-bearing controls pull their strings through a [`StringSource`]
//! during populate, keyed `UI.{Name}.{property}` with a fallback walk over
//! the kind chain (`UI.{Kind}.{property}`). A miss keeps whatever the
//! config or code set, so untranslated controls degrade gracefully.

use rustc_hash::FxHashMap;

use crate::kind::ControlKind;

pub trait StringSource {
    fn lookup(&self, key: &str) -> Option<&str>;
}

/// Two-layer string table: a main (current locale) map over a fallback
/// (default locale) map. [`StringTable::get`] hands the key back verbatim
/// when both miss, which keeps raw keys visible in UIs instead of blanks.
#[derive(Default)]
pub struct StringTable {
    main: FxHashMap<String, String>,
    fallback: FxHashMap<String, String>,
}

impl StringTable {
    pub fn new() -> Self {
        StringTable::default()
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.main.insert(key.to_string(), value.to_string());
    }

    pub fn insert_fallback(&mut self, key: &str, value: &str) {
        self.fallback.insert(key.to_string(), value.to_string());
    }

    /// The value for `key`, or `key` itself when unresolved.
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        self.lookup(key).unwrap_or(key)
    }
}

impl StringSource for StringTable {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.main
            .get(key)
            .or_else(|| self.fallback.get(key))
            .map(String::as_str)
    }
}

/// Looks up a UI string for a control: the name key first, then each kind
/// in the chain.
pub(crate) fn ui_string<'a>(
    strings: &'a dyn StringSource,
    name: Option<&str>,
    kind: &'static ControlKind,
    property: &str,
) -> Option<&'a str> {
    if let Some(name) = name {
        if let Some(value) = strings.lookup(&format!("UI.{name}.{property}")) {
            return Some(value);
        }
    }
    for ancestor in kind.chain() {
        if let Some(value) = strings.lookup(&format!("UI.{}.{property}", ancestor.name)) {
            return Some(value);
        }
    }
    None
}
