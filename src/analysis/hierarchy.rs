//! Type hierarchy queries against well-known types.
//!
//! Detectors describe the framework types they care about with [`KnownType`]
//! and ask the semantic model whether a symbol derives from or implements
//! them. Nothing here needs the known type to be declared in the program.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

use super::semantic::{SemanticModel, SpecialType, SymbolId};

/// Upper bound on the base-type chain walk. Well-formed programs never get
/// close; a malformed symbol graph could cycle.
pub const MAX_HIERARCHY_DEPTH: usize = 64;

/// A type identified by builtin tag or fully qualified display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KnownType {
    Special(SpecialType),
    Named(Cow<'static, str>),
}

impl KnownType {
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        KnownType::Named(name.into())
    }

    pub const fn special(special: SpecialType) -> Self {
        KnownType::Special(special)
    }

    /// Name match; never true for builtin known types.
    pub fn matches_name(&self, display_name: &str) -> bool {
        matches!(self, KnownType::Named(name) if name == display_name)
    }

    /// Builtin match; never true for named known types.
    pub fn matches_special(&self, special: SpecialType) -> bool {
        matches!(self, KnownType::Special(s) if *s != SpecialType::None && *s == special)
    }
}

impl fmt::Display for KnownType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnownType::Special(s) => write!(f, "{:?}", s),
            KnownType::Named(name) => write!(f, "{}", name),
        }
    }
}

impl SemanticModel {
    /// Whether the symbol itself is the known type.
    ///
    /// Compares the symbol and its original definition by builtin tag and by
    /// display name.
    pub fn is(&self, symbol: Option<SymbolId>, known: &KnownType) -> bool {
        let Some(id) = symbol else {
            return false;
        };
        let Some(sym) = self.symbol(id) else {
            return false;
        };
        let original = self
            .symbol(self.original_definition(id))
            .unwrap_or(sym);

        known.matches_special(sym.special)
            || known.matches_special(original.special)
            || known.matches_name(&sym.display_name)
            || known.matches_name(&original.display_name)
    }

    /// Whether the symbol is the known type or derives from it through its
    /// base-type chain.
    pub fn is_subtype_of(&self, symbol: Option<SymbolId>, known: &KnownType) -> bool {
        let mut current = symbol;
        let mut visited: HashSet<SymbolId> = HashSet::new();

        for _ in 0..MAX_HIERARCHY_DEPTH {
            let Some(id) = current else {
                return false;
            };
            if !visited.insert(id) {
                return false;
            }
            if self.is(Some(id), known) {
                return true;
            }
            current = self
                .symbol(id)
                .and_then(|s| s.base_type)
                .map(|base| self.original_definition(base));
        }

        false
    }

    /// Whether any interface in the symbol's transitive interface set is the
    /// known type.
    pub fn implements(&self, symbol: Option<SymbolId>, known: &KnownType) -> bool {
        let Some(sym) = symbol.and_then(|id| self.symbol(id)) else {
            return false;
        };
        sym.all_interfaces
            .iter()
            .any(|&iface| self.is(Some(self.original_definition(iface)), known))
    }
}
