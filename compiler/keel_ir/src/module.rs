//! The module arena: allocates and exclusively owns every node of one
//! compilation unit.
//!
//! # Index Spaces
//!
//! - `kinds`/`spans`: parallel arrays indexed by [`NodeId`]
//! - `builtins`: canonical builtin-binding placeholders, keyed by
//!   identifier, one instance per module
//! - `member_names`: named top-level members, for duplicate detection
//!
//! A node, once allocated, is never structurally mutated. The only
//! post-construction writes are the set-once back-links that close
//! definitional cycles: [`Module::set_definer`],
//! [`Module::set_struct_impl`], and [`Module::set_impl_target`].

use std::fmt;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::ast::{Node, NodeKind};
use crate::{Name, NodeId, SharedInterner, Span};

/// Convert a length to u32, panicking with context on overflow.
///
/// Arena indices are u32 by design; exceeding them means the input is
/// beyond anything the frontend supports.
fn to_u32(len: usize, what: &str) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("{what} exceeded u32 index space: {len}"))
}

/// Policy for inserting a top-level member whose name is already taken.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum OnDuplicate {
    /// Reject the insertion with [`ModuleError::DuplicateName`].
    Error,
    /// Append the member anyway; the first mapping for the name wins.
    Ignore,
}

/// Errors from module-level arena operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleError {
    /// A top-level member's name collides with an existing member.
    DuplicateName { ident: String },
}

impl fmt::Display for ModuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleError::DuplicateName { ident } => {
                write!(f, "module already has a member named `{ident}`")
            }
        }
    }
}

impl std::error::Error for ModuleError {}

/// One compilation unit: the owning arena for its syntax tree.
///
/// Layout follows the struct-of-arrays pattern: node kinds and spans live
/// in parallel arrays indexed by [`NodeId`]. The unit's top-level member
/// list is itself a node ([`NodeKind::Module`]) so that whole-unit
/// operations can address the unit by `NodeId` like any other subtree.
pub struct Module {
    name: String,
    path: Option<PathBuf>,
    interner: SharedInterner,
    /// Node kinds (parallel with spans).
    kinds: Vec<NodeKind>,
    /// Source spans (parallel with kinds).
    spans: Vec<Span>,
    /// The unit's `NodeKind::Module` container node.
    root: NodeId,
    /// Named top-level members, first mapping wins.
    member_names: FxHashMap<Name, NodeId>,
    /// Canonical builtin bindings, keyed by identifier, created lazily.
    builtins: FxHashMap<Name, NodeId>,
}

impl Module {
    /// Create an empty module. The whole-unit container node is allocated
    /// immediately so the unit is addressable as a root.
    pub fn new(name: impl Into<String>, path: Option<PathBuf>, interner: SharedInterner) -> Self {
        let mut module = Module {
            name: name.into(),
            path,
            interner,
            kinds: Vec::new(),
            spans: Vec::new(),
            root: NodeId::INVALID,
            member_names: FxHashMap::default(),
            builtins: FxHashMap::default(),
        };
        module.root = module.alloc(Node::new(
            NodeKind::Module {
                members: Vec::new(),
            },
            Span::DUMMY,
        ));
        module
    }

    /// Unit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source path of the unit, when known.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The interner shared by this unit (and any unit cloned from it).
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// The unit's whole-module container node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Allocate a node, returning its identity.
    ///
    /// Identities are never reused; distinct allocations get distinct
    /// `NodeId`s even for structurally equal nodes.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId::new(to_u32(self.kinds.len(), "module nodes"));
        self.kinds.push(node.kind);
        self.spans.push(node.span);
        id
    }

    /// Get the kind of a node.
    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.kinds[id.index()]
    }

    /// Get the source span of a node.
    #[inline]
    pub fn span(&self, id: NodeId) -> Span {
        self.spans[id.index()]
    }

    /// Number of allocated nodes.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Returns `true` if the module holds no nodes beyond its container.
    pub fn is_empty(&self) -> bool {
        self.kinds.len() <= 1
    }

    /// Top-level members in declaration order.
    pub fn members(&self) -> &[NodeId] {
        match self.kind(self.root) {
            NodeKind::Module { members } => members,
            _ => unreachable!("module root is always a Module node"),
        }
    }

    /// Look up a named top-level member.
    pub fn member_named(&self, name: Name) -> Option<NodeId> {
        self.member_names.get(&name).copied()
    }

    /// Append a top-level member, in order.
    ///
    /// Members that introduce a top-level name (functions, structs,
    /// enums, actors, aliases, constants, imports) are also recorded in
    /// the name table; `on_duplicate` decides what a collision does.
    pub fn push_member(
        &mut self,
        member: NodeId,
        on_duplicate: OnDuplicate,
    ) -> Result<(), ModuleError> {
        if let Some(name) = self.member_name(member) {
            if self.member_names.contains_key(&name) {
                match on_duplicate {
                    OnDuplicate::Error => {
                        return Err(ModuleError::DuplicateName {
                            ident: self.interner.resolve(name).to_owned(),
                        });
                    }
                    OnDuplicate::Ignore => {}
                }
            } else {
                self.member_names.insert(name, member);
            }
        }
        match &mut self.kinds[self.root.index()] {
            NodeKind::Module { members } => members.push(member),
            _ => unreachable!("module root is always a Module node"),
        }
        Ok(())
    }

    /// The top-level name a member introduces, if any.
    pub fn member_name(&self, member: NodeId) -> Option<Name> {
        let binding = match self.kind(member) {
            NodeKind::Function { binding, .. }
            | NodeKind::ConstDef { binding, .. }
            | NodeKind::StructDef { binding, .. }
            | NodeKind::EnumDef { binding, .. }
            | NodeKind::TypeAlias { binding, .. }
            | NodeKind::ActorDef { binding, .. }
            | NodeKind::Import { binding, .. } => *binding,
            _ => return None,
        };
        match self.kind(binding) {
            NodeKind::Binding { ident, .. } | NodeKind::BuiltinBinding { ident } => Some(*ident),
            _ => None,
        }
    }

    /// Get or create the canonical builtin binding for an identifier.
    ///
    /// One instance per module: repeated requests for the same identifier
    /// return the same node.
    pub fn builtin(&mut self, ident: Name) -> NodeId {
        if let Some(&id) = self.builtins.get(&ident) {
            return id;
        }
        let id = self.alloc(Node::new(NodeKind::BuiltinBinding { ident }, Span::DUMMY));
        self.builtins.insert(ident, id);
        id
    }

    // ── Set-once back-links ─────────────────────────────────────────
    //
    // These close the definitional cycles (binding ↔ definer,
    // struct ↔ impl). Each writes a field that must still be unset.

    /// Set a binding's definer to the construct that declares it.
    ///
    /// # Panics
    /// Panics if `binding` is not a `Binding` node or its definer is
    /// already set.
    pub fn set_definer(&mut self, binding: NodeId, definer: NodeId) {
        match &mut self.kinds[binding.index()] {
            NodeKind::Binding { definer: slot, .. } => {
                debug_assert!(!slot.is_valid(), "definer set twice");
                *slot = definer;
            }
            other => panic!("set_definer on a {} node", other.kind_name()),
        }
    }

    /// Read a binding's definer (`NodeId::INVALID` if unset).
    pub fn definer(&self, binding: NodeId) -> NodeId {
        match self.kind(binding) {
            NodeKind::Binding { definer, .. } => *definer,
            _ => NodeId::INVALID,
        }
    }

    /// Link a struct definition to its impl block.
    ///
    /// # Panics
    /// Panics if `struct_def` is not a `StructDef` or already linked.
    pub fn set_struct_impl(&mut self, struct_def: NodeId, impl_block: NodeId) {
        match &mut self.kinds[struct_def.index()] {
            NodeKind::StructDef { impl_block: slot, .. } => {
                debug_assert!(!slot.is_valid(), "impl link set twice");
                *slot = impl_block;
            }
            other => panic!("set_struct_impl on a {} node", other.kind_name()),
        }
    }

    /// Set an impl block's target type annotation.
    ///
    /// # Panics
    /// Panics if `impl_block` is not an `Impl` or already has a target.
    pub fn set_impl_target(&mut self, impl_block: NodeId, target_ty: NodeId) {
        match &mut self.kinds[impl_block.index()] {
            NodeKind::Impl { target_ty: slot, .. } => {
                debug_assert!(!slot.is_valid(), "impl target set twice");
                *slot = target_ty;
            }
            other => panic!("set_impl_target on a {} node", other.kind_name()),
        }
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("nodes", &self.kinds.len())
            .field("members", &self.members().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StringInterner;
    use std::sync::Arc;

    fn test_module() -> Module {
        Module::new("m", None, Arc::new(StringInterner::new()))
    }

    #[test]
    fn test_alloc_identity() {
        let mut m = test_module();
        let a = m.alloc(Node::new(NodeKind::Wildcard, Span::DUMMY));
        let b = m.alloc(Node::new(NodeKind::Wildcard, Span::DUMMY));
        assert_ne!(a, b, "structurally equal nodes get distinct identities");
    }

    #[test]
    fn test_builtin_dedup() {
        let mut m = test_module();
        let ident = m.interner().intern("u32");
        let a = m.builtin(ident);
        let b = m.builtin(ident);
        assert_eq!(a, b);
    }

    #[test]
    fn test_duplicate_member_rejected() {
        let mut m = test_module();
        let ident = m.interner().intern("f");
        let b1 = m.alloc(Node::new(
            NodeKind::Binding { ident, definer: NodeId::INVALID },
            Span::DUMMY,
        ));
        let body = m.alloc(Node::new(
            NodeKind::Block { stmts: Vec::new(), trailing_semi: false },
            Span::DUMMY,
        ));
        let f1 = m.alloc(Node::new(
            NodeKind::Function {
                binding: b1,
                type_params: Vec::new(),
                params: Vec::new(),
                return_ty: None,
                body,
                is_public: false,
            },
            Span::DUMMY,
        ));
        assert_eq!(m.push_member(f1, OnDuplicate::Error), Ok(()));
        assert_eq!(
            m.push_member(f1, OnDuplicate::Error),
            Err(ModuleError::DuplicateName { ident: "f".into() })
        );
        assert_eq!(m.push_member(f1, OnDuplicate::Ignore), Ok(()));
        assert_eq!(m.members().len(), 2);
    }

    #[test]
    fn test_set_definer_once() {
        let mut m = test_module();
        let ident = m.interner().intern("x");
        let binding = m.alloc(Node::new(
            NodeKind::Binding { ident, definer: NodeId::INVALID },
            Span::DUMMY,
        ));
        assert!(!m.definer(binding).is_valid());
        m.set_definer(binding, m.root());
        assert_eq!(m.definer(binding), m.root());
    }
}
