//! Static control-kind descriptors.
//!
//! A kind names what a control is ("Button", "Panel") and points at the
//! kind it specializes. The resulting chains drive the config resolver's
//! type-fallback substitution and locale string lookup. Kinds are plain
//! statics compared by address, so behaviors declare theirs once and hand
//! out `&'static` references.

/// Descriptor for one control kind.
#[derive(Debug)]
pub struct ControlKind {
    pub name: &'static str,
    pub base: Option<&'static ControlKind>,
}

/// The root kind every chain ends in.
pub static CONTROL: ControlKind = ControlKind {
    name: "Control",
    base: None,
};

impl ControlKind {
    /// Iterates the chain from this kind (most derived) to the root.
    pub fn chain(&'static self) -> KindChain {
        KindChain { next: Some(self) }
    }

    /// Whether `other` appears in this kind's chain.
    pub fn is(&'static self, other: &'static ControlKind) -> bool {
        self.chain().any(|kind| std::ptr::eq(kind, other))
    }
}

impl PartialEq for ControlKind {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for ControlKind {}

pub struct KindChain {
    next: Option<&'static ControlKind>,
}

impl Iterator for KindChain {
    type Item = &'static ControlKind;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.base;
        Some(current)
    }
}
