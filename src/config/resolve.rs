//! Cascading path resolution with the append-only cache.
//!
//! Resolution receives a control's scope chain (root first) and a property
//! name, generates candidate config paths in precedence order, and decodes
//! the first one that exists. Precedence:
//!
//! 1. The fully-literal name chain, then its suffixes obtained by dropping
//!    names from the root side one at a time.
//! 2. Kind substitution, one level at a time starting at the leaf: the
//!    level's name is replaced with each entry of its kind chain (most
//!    derived first) while every other level stays literal, again with the
//!    suffixes that still contain the substituted level.
//! 3. The bare property at the config root.
//!
//! Existence decides selection and decoding decides success: if the first
//! existing candidate fails to decode, the lookup is a miss rather than a
//! fall-through to later candidates.
//!
//! Successful lookups are cached by (scope, property, semantic) for the
//! resolver's lifetime. Hot-reloading configuration means building a fresh
//! resolver.

use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

use super::convert::{decode, FromConfig, Semantic, Value};
use super::ConfigNode;
use crate::kind::ControlKind;

/// One level of a control's scope chain.
#[derive(Debug, Clone)]
pub struct ScopeLevel {
    /// Unnamed levels contribute no literal path segment but still take
    /// part in kind substitution.
    pub name: Option<String>,
    pub kind: &'static ControlKind,
}

impl ScopeLevel {
    pub fn named(name: impl Into<String>, kind: &'static ControlKind) -> Self {
        ScopeLevel {
            name: Some(name.into()),
            kind,
        }
    }

    pub fn anonymous(kind: &'static ControlKind) -> Self {
        ScopeLevel { name: None, kind }
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    scope: String,
    property: String,
    semantic: Semantic,
}

pub struct ConfigResolver {
    root: ConfigNode,
    cache: FxHashMap<CacheKey, Value>,
}

impl ConfigResolver {
    pub fn new(root: ConfigNode) -> Self {
        ConfigResolver {
            root,
            cache: FxHashMap::default(),
        }
    }

    pub fn config(&self) -> &ConfigNode {
        &self.root
    }

    /// Number of cached resolutions, for diagnostics.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Resolves `property` for the given scope chain as `semantic`.
    pub fn resolve_value(
        &mut self,
        chain: &[ScopeLevel],
        property: &str,
        semantic: Semantic,
    ) -> Option<Value> {
        let key = CacheKey {
            scope: scope_key(chain),
            property: property.to_string(),
            semantic,
        };
        if let Some(hit) = self.cache.get(&key) {
            return Some(hit.clone());
        }

        let candidates = candidate_keys(chain, property);
        let root = &self.root;
        let found = candidates
            .iter()
            .find_map(|candidate| root.string_at(candidate).map(|raw| (candidate.as_str(), raw)));

        let Some((path, raw)) = found else {
            debug!(
                "config miss: {}.{} ({} candidates)",
                key.scope,
                property,
                candidates.len()
            );
            return None;
        };
        match decode(raw, semantic) {
            Some(value) => {
                debug!("config hit: {}.{} via {path}", key.scope, property);
                self.cache.insert(key, value.clone());
                Some(value)
            }
            None => {
                debug!("config value at {path} does not decode as {semantic:?}");
                None
            }
        }
    }

    /// Typed resolution; integer widths are range-checked.
    pub fn resolve<T: FromConfig>(&mut self, chain: &[ScopeLevel], property: &str) -> Option<T> {
        self.resolve_value(chain, property, T::SEMANTIC)
            .and_then(T::from_value)
    }
}

/// Cache key segment for a chain. Unnamed levels get a kind marker so two
/// differently-kinded anonymous siblings do not share an entry.
fn scope_key(chain: &[ScopeLevel]) -> String {
    let parts: Vec<String> = chain
        .iter()
        .map(|level| match &level.name {
            Some(name) => name.clone(),
            None => format!("<{}>", level.kind.name),
        })
        .collect();
    parts.join(".")
}

/// All candidate config keys for (chain, property), most specific first.
pub(crate) fn candidate_keys(chain: &[ScopeLevel], property: &str) -> Vec<String> {
    fn push(
        keys: &mut Vec<String>,
        seen: &mut FxHashSet<String>,
        segments: &[Option<&str>],
        from: usize,
        property: &str,
    ) {
        let mut parts: Vec<&str> = segments[from..].iter().flatten().copied().collect();
        parts.push(property);
        let key = parts.join(".");
        if seen.insert(key.clone()) {
            keys.push(key);
        }
    }

    let mut keys = Vec::new();
    let mut seen = FxHashSet::default();
    let literal: Vec<Option<&str>> = chain.iter().map(|level| level.name.as_deref()).collect();

    for from in 0..chain.len() {
        push(&mut keys, &mut seen, &literal, from, property);
    }

    for level in (0..chain.len()).rev() {
        for kind in chain[level].kind.chain() {
            let mut segments = literal.clone();
            segments[level] = Some(kind.name);
            for from in 0..=level {
                push(&mut keys, &mut seen, &segments, from, property);
            }
        }
    }

    // The bare property at the config root always comes last.
    push(&mut keys, &mut seen, &[], 0, property);
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::kind::CONTROL;

    static PANEL: ControlKind = ControlKind {
        name: "Panel",
        base: Some(&CONTROL),
    };
    static BUTTON: ControlKind = ControlKind {
        name: "Button",
        base: Some(&CONTROL),
    };

    fn ok_btn_chain() -> Vec<ScopeLevel> {
        vec![
            ScopeLevel::named("root", &PANEL),
            ScopeLevel::named("sidebar", &PANEL),
            ScopeLevel::named("okBtn", &BUTTON),
        ]
    }

    #[test]
    fn test_candidate_order_is_literal_then_leaf_substitution() {
        let keys = candidate_keys(&ok_btn_chain(), "TextColor");
        let expected = vec![
            "root.sidebar.okBtn.TextColor",
            "sidebar.okBtn.TextColor",
            "okBtn.TextColor",
            "root.sidebar.Button.TextColor",
            "sidebar.Button.TextColor",
            "Button.TextColor",
            "root.sidebar.Control.TextColor",
            "sidebar.Control.TextColor",
            "Control.TextColor",
            "root.Panel.okBtn.TextColor",
            "Panel.okBtn.TextColor",
            "root.Control.okBtn.TextColor",
            "Control.okBtn.TextColor",
            "Panel.sidebar.okBtn.TextColor",
            "Control.sidebar.okBtn.TextColor",
            "TextColor",
        ];
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_unnamed_levels_skip_literal_segments() {
        let chain = vec![
            ScopeLevel::named("root", &PANEL),
            ScopeLevel::anonymous(&PANEL),
            ScopeLevel::named("okBtn", &BUTTON),
        ];
        let keys = candidate_keys(&chain, "X");
        assert_eq!(keys[0], "root.okBtn.X");
        // The anonymous level still substitutes its kind.
        assert!(keys.contains(&"root.Panel.okBtn.X".to_string()));
    }

    #[test]
    fn test_bare_kind_path_matches() {
        // Only "Button.TextColor" exists; the leaf-level substitution must
        // still find it.
        let mut config = ConfigNode::mapping();
        config.set("Button.TextColor", "#ff0000");
        let mut resolver = ConfigResolver::new(config);

        let color: Option<Color> = resolver.resolve(&ok_btn_chain(), "TextColor");
        assert_eq!(color, Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn test_literal_beats_substitution() {
        let mut config = ConfigNode::mapping();
        config.set("Button.TextColor", "#00ff00");
        config.set("okBtn.TextColor", "#ff0000");
        let mut resolver = ConfigResolver::new(config);

        let color: Option<Color> = resolver.resolve(&ok_btn_chain(), "TextColor");
        assert_eq!(color, Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn test_leaf_substitution_beats_parent_substitution() {
        let mut config = ConfigNode::mapping();
        config.set("Panel.okBtn.TextColor", "#0000ff");
        config.set("Button.TextColor", "#ff0000");
        let mut resolver = ConfigResolver::new(config);

        let color: Option<Color> = resolver.resolve(&ok_btn_chain(), "TextColor");
        assert_eq!(color, Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn test_empty_path_is_last_resort() {
        let mut config = ConfigNode::mapping();
        config.set("TextColor", "#112233");
        let mut resolver = ConfigResolver::new(config);

        let color: Option<Color> = resolver.resolve(&ok_btn_chain(), "TextColor");
        assert_eq!(color, Some(Color::rgb(0x11, 0x22, 0x33)));
    }

    #[test]
    fn test_cache_appends_and_repeats() {
        let mut config = ConfigNode::mapping();
        config.set("okBtn.Width", "120");
        let mut resolver = ConfigResolver::new(config);
        let chain = ok_btn_chain();

        assert_eq!(resolver.resolve::<i32>(&chain, "Width"), Some(120));
        assert_eq!(resolver.cache_len(), 1);
        assert_eq!(resolver.resolve::<i32>(&chain, "Width"), Some(120));
        assert_eq!(resolver.cache_len(), 1);

        assert_eq!(resolver.resolve::<i32>(&chain, "Height"), None);
        assert_eq!(resolver.cache_len(), 1);
    }

    #[test]
    fn test_existence_decides_selection() {
        // The leaf-most existing candidate does not decode; the lookup
        // fails instead of falling through to "Button.Width".
        let mut config = ConfigNode::mapping();
        config.set("okBtn.Width", "wide");
        config.set("Button.Width", "120");
        let mut resolver = ConfigResolver::new(config);

        assert_eq!(resolver.resolve::<i32>(&ok_btn_chain(), "Width"), None);
        assert_eq!(resolver.cache_len(), 0);
    }

    #[test]
    fn test_narrowing_failure_is_a_miss_but_cached() {
        let mut config = ConfigNode::mapping();
        config.set("okBtn.Pad", "300");
        let mut resolver = ConfigResolver::new(config);
        let chain = ok_btn_chain();

        // The decoded UInt(300) caches; the u8 narrow still misses, and
        // does so identically on repeat lookups.
        assert_eq!(resolver.resolve::<u8>(&chain, "Pad"), None);
        assert_eq!(resolver.resolve::<u8>(&chain, "Pad"), None);
        assert_eq!(resolver.resolve::<i32>(&chain, "Pad"), Some(300));
    }

    #[test]
    fn test_anonymous_siblings_of_different_kinds_do_not_collide() {
        let mut config = ConfigNode::mapping();
        config.set("Button.Tint", "#ff0000");
        config.set("Panel.Tint", "#00ff00");
        let mut resolver = ConfigResolver::new(config);

        let button_chain = vec![
            ScopeLevel::named("root", &PANEL),
            ScopeLevel::anonymous(&BUTTON),
        ];
        let panel_chain = vec![
            ScopeLevel::named("root", &PANEL),
            ScopeLevel::anonymous(&PANEL),
        ];

        let a: Option<Color> = resolver.resolve(&button_chain, "Tint");
        let b: Option<Color> = resolver.resolve(&panel_chain, "Tint");
        assert_eq!(a, Some(Color::rgb(255, 0, 0)));
        assert_eq!(b, Some(Color::rgb(0, 255, 0)));
    }
}
