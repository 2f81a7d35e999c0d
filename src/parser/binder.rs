//! Declaration binder: builds a [`SemanticModel`] from parsed C# files.
//!
//! Binding runs in two passes. The first declares every type of every file
//! (so forward and cross-file references resolve). The second resolves base
//! lists, attributes and members. Names are resolved the way C# looks them
//! up, minus overload and accessibility rules:
//! enclosing types, then the namespace chain, then the global namespace,
//! then `using` imports, then the implicit `System` namespace. Framework
//! types come from the [`catalog`](super::catalog). Anything else becomes an
//! unresolved symbol, which ends every hierarchy walk.

use std::collections::HashMap;

use tracing::debug;

use crate::analysis::{
    AttributeData, MemberKind, MemberSymbol, NodeKind, SemanticModel, SemanticModelBuilder,
    SymbolId, SyntaxNode, SyntaxRef, TreeId, TypeKind,
};

use super::catalog::{framework_type, IMPLICIT_NAMESPACES};
use super::ParsedFile;

/// Bind every file into one semantic model. Tree ids follow slice order.
pub fn bind(files: &[ParsedFile]) -> SemanticModel {
    let mut binder = Binder::default();

    for (i, file) in files.iter().enumerate() {
        let scope = Scope {
            namespace: String::new(),
            enclosing: Vec::new(),
            usings: &file.usings,
        };
        binder.declare(&file.tree.root, TreeId(i as u32), &scope);
    }

    let declared = std::mem::take(&mut binder.declared);
    for decl in &declared {
        binder.resolve(decl);
    }
    binder.default_bases(&declared);

    debug!(
        files = files.len(),
        types = declared.len(),
        "bound declarations"
    );
    binder.builder.build()
}

#[derive(Debug, Clone)]
struct Scope<'a> {
    namespace: String,
    /// Display names of enclosing types, outermost first.
    enclosing: Vec<String>,
    usings: &'a [String],
}

impl Scope<'_> {
    /// Fully qualified names `name` could refer to, most specific first.
    fn candidates(&self, name: &str) -> Vec<String> {
        let mut out = Vec::new();

        for enclosing in self.enclosing.iter().rev() {
            out.push(format!("{}.{}", strip_type_args(enclosing), name));
        }

        let mut ns = self.namespace.as_str();
        while !ns.is_empty() {
            out.push(format!("{}.{}", ns, name));
            ns = ns.rfind('.').map(|i| &ns[..i]).unwrap_or("");
        }

        out.push(name.to_string());
        out.extend(self.usings.iter().map(|u| format!("{}.{}", u, name)));
        out.extend(IMPLICIT_NAMESPACES.iter().map(|u| format!("{}.{}", u, name)));
        out
    }
}

struct Declared<'a> {
    id: SymbolId,
    kind: NodeKind,
    tree: TreeId,
    node: &'a SyntaxNode,
    scope: Scope<'a>,
}

#[derive(Default)]
struct Binder<'a> {
    builder: SemanticModelBuilder,
    /// Generic definitions keyed by display name without type parameters.
    generics: HashMap<String, SymbolId>,
    declared: Vec<Declared<'a>>,
}

impl<'a> Binder<'a> {
    /// First pass: register declared types, recursing into namespaces and
    /// type bodies.
    fn declare(&mut self, node: &'a SyntaxNode, tree: TreeId, scope: &Scope<'a>) {
        // A file-scoped namespace changes the scope of the siblings after it.
        let mut scope = scope.clone();

        for child in &node.children {
            match child.kind {
                NodeKind::NamespaceDeclaration => {
                    let Some(name) = child.identifier() else {
                        continue;
                    };
                    let qualified = qualify(&scope.namespace, name);
                    if is_file_scoped(child) {
                        scope.namespace = qualified;
                        // Some grammars nest the rest of the file under it.
                        self.declare(child, tree, &scope);
                    } else {
                        let inner = Scope {
                            namespace: qualified,
                            enclosing: Vec::new(),
                            usings: scope.usings,
                        };
                        self.declare(child, tree, &inner);
                    }
                }
                kind if kind.is_type_declaration() => {
                    let Some(name) = child.identifier() else {
                        continue;
                    };
                    let container = scope
                        .enclosing
                        .last()
                        .map(|e| strip_type_args(e).to_string())
                        .unwrap_or_else(|| scope.namespace.clone());
                    let display = format!("{}{}", qualify(&container, name), type_parameters(child));

                    let id = self.builder.add_type(&display, type_kind(kind));
                    self.builder.add_declaration(id, tree, child);
                    if display.contains('<') {
                        self.generics.insert(strip_type_args(&display).to_string(), id);
                    }

                    self.declared.push(Declared {
                        id,
                        kind,
                        tree,
                        node: child,
                        scope: scope.clone(),
                    });

                    let mut inner = scope.clone();
                    inner.enclosing.push(display);
                    self.declare(child, tree, &inner);
                }
                NodeKind::Token => {}
                _ => self.declare(child, tree, &scope),
            }
        }
    }

    /// Second pass: bases, attributes and members of one declaration.
    fn resolve(&mut self, decl: &Declared<'a>) {
        let mut inner = decl.scope.clone();
        if let Some(display) = self.builder.symbol(decl.id).map(|s| s.display_name.clone()) {
            inner.enclosing.push(display);
        }

        if let Some(base_list) = decl.node.child(NodeKind::BaseList) {
            let entries: Vec<String> = base_list
                .children
                .iter()
                .filter_map(type_text)
                .filter(|t| t != ":" && t != ",")
                .collect();

            for (i, text) in entries.iter().enumerate() {
                let target = self.resolve_type(text, &inner);
                let target_kind = self.builder.symbol(target).map(|s| s.kind);
                let is_base = match (decl.kind, target_kind) {
                    (NodeKind::ClassDeclaration | NodeKind::RecordDeclaration, Some(kind)) => {
                        match kind {
                            TypeKind::Class | TypeKind::Record => true,
                            TypeKind::Unresolved => i == 0 && !looks_like_interface(text),
                            _ => false,
                        }
                    }
                    _ => false,
                };

                if is_base {
                    self.builder.set_base(decl.id, target);
                } else if decl.kind != NodeKind::EnumDeclaration {
                    self.builder.add_interface(decl.id, target);
                }
            }
        }

        for attribute in attributes_of(decl.node) {
            let data = self.bind_attribute(attribute, &inner);
            self.builder.add_attribute(decl.id, data);
        }

        for member in members_of(decl.node) {
            let kind = match member.kind {
                NodeKind::ConstructorDeclaration => MemberKind::Constructor,
                _ => MemberKind::Method,
            };
            let mut symbol = MemberSymbol::new(member.identifier().unwrap_or_default(), kind);
            symbol.declaring_syntax = Some(SyntaxRef::new(decl.tree, member));
            for attribute in attributes_of(member) {
                let data = self.bind_attribute(attribute, &inner);
                symbol = symbol.with_attribute(data);
            }
            self.builder.add_member(decl.id, symbol);
        }
    }

    /// Classes and records without an explicit base derive from `object`.
    fn default_bases(&mut self, declared: &[Declared<'a>]) {
        let Some(object) = self.ensure_framework("System.Object") else {
            return;
        };
        for decl in declared {
            let needs_base = matches!(
                decl.kind,
                NodeKind::ClassDeclaration | NodeKind::RecordDeclaration
            ) && self
                .builder
                .symbol(decl.id)
                .is_some_and(|s| s.base_type.is_none() && s.id != object);
            if needs_base {
                self.builder.set_base(decl.id, object);
            }
        }
    }

    fn bind_attribute(&mut self, attribute: &SyntaxNode, scope: &Scope<'a>) -> AttributeData {
        let name = attribute.identifier().unwrap_or_default().to_string();
        let class = if name.is_empty() {
            None
        } else {
            let suffixed = (!name.ends_with("Attribute"))
                .then(|| format!("{}Attribute", name))
                .and_then(|s| self.try_resolve(&s, scope));
            Some(
                suffixed
                    .or_else(|| self.try_resolve(&name, scope))
                    .unwrap_or_else(|| self.builder.add_type(&name, TypeKind::Unresolved)),
            )
        };

        AttributeData::new(name, class)
    }

    fn resolve_type(&mut self, text: &str, scope: &Scope<'a>) -> SymbolId {
        self.try_resolve(text, scope)
            .unwrap_or_else(|| self.builder.add_type(normalize(text).as_str(), TypeKind::Unresolved))
    }

    fn try_resolve(&mut self, text: &str, scope: &Scope<'a>) -> Option<SymbolId> {
        let text = normalize(text);
        let plain = strip_type_args(&text);
        let args = &text[plain.len()..];

        for candidate in scope.candidates(plain) {
            if args.is_empty() {
                if let Some(id) = self.builder.lookup(&candidate) {
                    if self.builder.symbol(id).map(|s| s.kind) != Some(TypeKind::Unresolved) {
                        return Some(id);
                    }
                }
                if let Some(id) = self.ensure_framework(&candidate) {
                    return Some(id);
                }
            } else if let Some(&definition) = self.generics.get(&candidate) {
                let kind = self
                    .builder
                    .symbol(definition)
                    .map(|s| s.kind)
                    .unwrap_or(TypeKind::Class);
                let constructed = self.builder.add_type(&format!("{}{}", candidate, args), kind);
                if constructed != definition {
                    self.builder.set_original_definition(constructed, definition);
                }
                return Some(constructed);
            }
        }
        None
    }

    /// Materialize a catalog type and everything it derives from.
    fn ensure_framework(&mut self, name: &str) -> Option<SymbolId> {
        let ty = framework_type(name)?;
        if let Some(id) = self.builder.lookup(name) {
            return Some(id);
        }

        let id = self.builder.add_type(name, ty.kind);
        if let Some(base) = ty.base.and_then(|b| self.ensure_framework(b)) {
            self.builder.set_base(id, base);
        }
        for iface in ty.interfaces {
            if let Some(i) = self.ensure_framework(iface) {
                self.builder.add_interface(id, i);
            }
        }
        Some(id)
    }
}

fn type_kind(kind: NodeKind) -> TypeKind {
    match kind {
        NodeKind::InterfaceDeclaration => TypeKind::Interface,
        NodeKind::StructDeclaration => TypeKind::Struct,
        NodeKind::RecordDeclaration => TypeKind::Record,
        NodeKind::EnumDeclaration => TypeKind::Enum,
        _ => TypeKind::Class,
    }
}

fn qualify(container: &str, name: &str) -> String {
    if container.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", container, name)
    }
}

fn is_file_scoped(namespace: &SyntaxNode) -> bool {
    namespace
        .children_of_kind(NodeKind::Token)
        .any(|t| t.name.as_deref() == Some(";"))
}

/// `<T, U>` of a generic declaration, whitespace removed; empty otherwise.
fn type_parameters(node: &SyntaxNode) -> String {
    node.child(NodeKind::TypeParameterList)
        .and_then(|l| l.name.as_deref())
        .map(|t| t.chars().filter(|c| !c.is_whitespace()).collect())
        .unwrap_or_default()
}

/// Source text of a type reference inside a base list.
fn type_text(node: &SyntaxNode) -> Option<String> {
    node.name.clone().or_else(|| {
        node.descendants()
            .find(|n| n.kind == NodeKind::Token)
            .and_then(|t| t.name.clone())
    })
}

/// `global::A.B<int?>` -> `A.B<int?>`, whitespace removed.
fn normalize(text: &str) -> String {
    let text: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    text.strip_prefix("global::").unwrap_or(&text).to_string()
}

fn strip_type_args(name: &str) -> &str {
    name.split('<').next().unwrap_or(name)
}

/// C# naming convention: `IFoo` is an interface.
fn looks_like_interface(name: &str) -> bool {
    let simple = strip_type_args(name).rsplit('.').next().unwrap_or(name);
    let mut chars = simple.chars();
    chars.next() == Some('I') && chars.next().is_some_and(|c| c.is_ascii_uppercase())
}

/// Attributes applied directly to a declaration.
fn attributes_of(node: &SyntaxNode) -> impl Iterator<Item = &SyntaxNode> {
    node.children_of_kind(NodeKind::AttributeList)
        .flat_map(|list| list.children_of_kind(NodeKind::Attribute))
}

/// Methods and constructors of a type body, not descending into nested
/// types or member bodies.
fn members_of(node: &SyntaxNode) -> Vec<&SyntaxNode> {
    let mut members = Vec::new();
    let mut stack: Vec<&SyntaxNode> = node.children.iter().rev().collect();

    while let Some(current) = stack.pop() {
        match current.kind {
            NodeKind::MethodDeclaration | NodeKind::ConstructorDeclaration => members.push(current),
            kind if kind.is_type_declaration() => {}
            NodeKind::Other => stack.extend(current.children.iter().rev()),
            _ => {}
        }
    }
    members
}
