//! Semantic model: resolved type symbols and their relations.
//!
//! Symbols live in an arena owned by [`SemanticModel`] and are addressed by
//! [`SymbolId`]. The model is read-only once built; build it with
//! [`SemanticModelBuilder`], which also pre-flattens every type's transitive
//! interface set.

use std::collections::{HashMap, HashSet};
use std::fmt;

use super::syntax::{SyntaxNode, TreeId};

/// Index into the symbol arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// Builtin type tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SpecialType {
    #[default]
    None,
    Object,
    Void,
    Boolean,
    Char,
    Int32,
    Int64,
    Double,
    Decimal,
    String,
    Attribute,
}

impl SpecialType {
    /// Map a C# keyword or fully qualified system name to its builtin tag.
    pub fn from_name(name: &str) -> SpecialType {
        match name {
            "object" | "System.Object" => SpecialType::Object,
            "void" | "System.Void" => SpecialType::Void,
            "bool" | "System.Boolean" => SpecialType::Boolean,
            "char" | "System.Char" => SpecialType::Char,
            "int" | "System.Int32" => SpecialType::Int32,
            "long" | "System.Int64" => SpecialType::Int64,
            "double" | "System.Double" => SpecialType::Double,
            "decimal" | "System.Decimal" => SpecialType::Decimal,
            "string" | "System.String" => SpecialType::String,
            "System.Attribute" => SpecialType::Attribute,
            _ => SpecialType::None,
        }
    }
}

/// Kind of a type symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
    Struct,
    Record,
    Enum,
    /// Referenced but not declared anywhere the binder could see.
    Unresolved,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Struct => "struct",
            TypeKind::Record => "record",
            TypeKind::Enum => "enum",
            TypeKind::Unresolved => "unresolved",
        };
        write!(f, "{}", s)
    }
}

/// Kind of a member symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Method,
    Constructor,
}

/// Reference to the syntax that declares a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyntaxRef {
    pub tree: TreeId,
    pub start_byte: usize,
    pub end_byte: usize,
}

impl SyntaxRef {
    pub fn new(tree: TreeId, node: &SyntaxNode) -> Self {
        Self {
            tree,
            start_byte: node.span.start_byte,
            end_byte: node.span.end_byte,
        }
    }
}

/// An attribute applied to a type or member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeData {
    /// Name as written in source (e.g. `HttpGet`).
    pub name: String,
    /// Resolved attribute class, if the binder found one.
    pub class: Option<SymbolId>,
}

impl AttributeData {
    pub fn new(name: impl Into<String>, class: Option<SymbolId>) -> Self {
        Self {
            name: name.into(),
            class,
        }
    }
}

/// A method or constructor of a type.
#[derive(Debug, Clone)]
pub struct MemberSymbol {
    pub name: String,
    pub kind: MemberKind,
    pub attributes: Vec<AttributeData>,
    pub declaring_syntax: Option<SyntaxRef>,
}

impl MemberSymbol {
    pub fn new(name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            name: name.into(),
            kind,
            attributes: Vec::new(),
            declaring_syntax: None,
        }
    }

    pub fn with_attribute(mut self, attribute: AttributeData) -> Self {
        self.attributes.push(attribute);
        self
    }
}

/// A resolved named type.
#[derive(Debug, Clone)]
pub struct TypeSymbol {
    pub id: SymbolId,
    /// Simple name (e.g. `GeoController`).
    pub name: String,
    /// Fully qualified display name (e.g. `Shop.Api.GeoController`, `Foo.Bar<T>`).
    pub display_name: String,
    pub kind: TypeKind,
    pub special: SpecialType,
    pub base_type: Option<SymbolId>,
    /// Directly implemented interfaces.
    pub interfaces: Vec<SymbolId>,
    /// Transitive interface set, filled by [`SemanticModelBuilder::build`].
    pub all_interfaces: Vec<SymbolId>,
    /// Unconstructed definition of a constructed generic type.
    pub original_definition: Option<SymbolId>,
    pub attributes: Vec<AttributeData>,
    pub members: Vec<MemberSymbol>,
    /// Partial declarations may span several files.
    pub declaring_syntax: Vec<SyntaxRef>,
}

impl TypeSymbol {
    /// The first declaring syntax reference, if any.
    pub fn first_declaration(&self) -> Option<SyntaxRef> {
        self.declaring_syntax.first().copied()
    }
}

/// Read-only view of all resolved symbols of a program.
#[derive(Debug, Clone, Default)]
pub struct SemanticModel {
    symbols: Vec<TypeSymbol>,
    by_name: HashMap<String, SymbolId>,
    by_syntax: HashMap<SyntaxRef, SymbolId>,
}

impl SemanticModel {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&TypeSymbol> {
        self.symbols.get(id.0 as usize)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &TypeSymbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Look up a type by its fully qualified display name.
    pub fn lookup(&self, display_name: &str) -> Option<SymbolId> {
        self.by_name.get(display_name).copied()
    }

    /// The type declared by a syntax node, if any.
    pub fn declared_symbol(&self, tree: TreeId, node: &SyntaxNode) -> Option<SymbolId> {
        self.by_syntax.get(&SyntaxRef::new(tree, node)).copied()
    }

    /// The original (unconstructed) definition of a type, or the type itself.
    pub fn original_definition(&self, id: SymbolId) -> SymbolId {
        self.symbol(id)
            .and_then(|s| s.original_definition)
            .unwrap_or(id)
    }
}

/// Incrementally builds a [`SemanticModel`].
#[derive(Debug, Default)]
pub struct SemanticModelBuilder {
    model: SemanticModel,
}

impl SemanticModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type, or return the existing one with the same display name.
    pub fn add_type(&mut self, display_name: &str, kind: TypeKind) -> SymbolId {
        if let Some(id) = self.model.lookup(display_name) {
            return id;
        }

        let id = SymbolId(self.model.symbols.len() as u32);
        let name = simple_name(display_name).to_string();
        self.model.symbols.push(TypeSymbol {
            id,
            name,
            display_name: display_name.to_string(),
            kind,
            special: SpecialType::from_name(display_name),
            base_type: None,
            interfaces: Vec::new(),
            all_interfaces: Vec::new(),
            original_definition: None,
            attributes: Vec::new(),
            members: Vec::new(),
            declaring_syntax: Vec::new(),
        });
        self.model.by_name.insert(display_name.to_string(), id);
        id
    }

    /// Mutable access to a symbol being built.
    pub fn symbol_mut(&mut self, id: SymbolId) -> Option<&mut TypeSymbol> {
        self.model.symbols.get_mut(id.0 as usize)
    }

    pub fn lookup(&self, display_name: &str) -> Option<SymbolId> {
        self.model.lookup(display_name)
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&TypeSymbol> {
        self.model.symbol(id)
    }

    pub fn set_base(&mut self, id: SymbolId, base: SymbolId) {
        if let Some(s) = self.symbol_mut(id) {
            s.base_type = Some(base);
        }
    }

    pub fn add_interface(&mut self, id: SymbolId, interface: SymbolId) {
        if let Some(s) = self.symbol_mut(id) {
            if !s.interfaces.contains(&interface) {
                s.interfaces.push(interface);
            }
        }
    }

    pub fn set_original_definition(&mut self, id: SymbolId, original: SymbolId) {
        if let Some(s) = self.symbol_mut(id) {
            s.original_definition = Some(original);
        }
    }

    pub fn add_attribute(&mut self, id: SymbolId, attribute: AttributeData) {
        if let Some(s) = self.symbol_mut(id) {
            s.attributes.push(attribute);
        }
    }

    pub fn add_member(&mut self, id: SymbolId, member: MemberSymbol) {
        if let Some(s) = self.symbol_mut(id) {
            s.members.push(member);
        }
    }

    /// Record that `node` in `tree` declares `id`.
    pub fn add_declaration(&mut self, id: SymbolId, tree: TreeId, node: &SyntaxNode) {
        let syntax = SyntaxRef::new(tree, node);
        if let Some(s) = self.symbol_mut(id) {
            s.declaring_syntax.push(syntax);
        }
        self.model.by_syntax.insert(syntax, id);
    }

    /// Finish building: flatten interface sets and freeze the model.
    pub fn build(mut self) -> SemanticModel {
        let flattened: Vec<Vec<SymbolId>> = (0..self.model.symbols.len())
            .map(|i| flatten_interfaces(&self.model, SymbolId(i as u32)))
            .collect();

        for (symbol, all) in self.model.symbols.iter_mut().zip(flattened) {
            symbol.all_interfaces = all;
        }

        self.model
    }
}

/// Collect every interface reachable from a type through its own interface
/// list, its interfaces' bases and its base types.
fn flatten_interfaces(model: &SemanticModel, id: SymbolId) -> Vec<SymbolId> {
    let mut result = Vec::new();
    let mut seen: HashSet<SymbolId> = HashSet::new();
    let mut visited_types: HashSet<SymbolId> = HashSet::new();
    let mut pending = vec![id];

    while let Some(current) = pending.pop() {
        if !visited_types.insert(current) {
            continue;
        }
        let Some(symbol) = model.symbol(current) else {
            continue;
        };

        for &iface in &symbol.interfaces {
            if iface != id && seen.insert(iface) {
                result.push(iface);
            }
            pending.push(iface);
        }

        if let Some(base) = symbol.base_type {
            pending.push(base);
        }
    }

    result
}

/// `Foo.Bar.Baz<T>` -> `Baz<T>`.
fn simple_name(display_name: &str) -> &str {
    let plain = display_name.split('<').next().unwrap_or(display_name);
    match plain.rfind('.') {
        Some(pos) => &display_name[pos + 1..],
        None => display_name,
    }
}
