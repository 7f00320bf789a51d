//! Tree duplication with reference remapping.
//!
//! The cloner walks a subtree post-order (children before parents),
//! allocating a fresh node in the destination arena for every node it
//! visits and recording each `old → new` pair in a per-operation identity
//! map. The map serves three purposes at once:
//!
//! - **memoization**: a shared subtree is cloned once
//! - **cycle breaking**: a node already mapped is never re-entered
//! - **reference remapping**: every child edge of a fresh node is
//!   resolved through it
//!
//! Non-owning cross-references (`NameRef`/`TypeRef` targets, `PathRef`
//! subjects, struct-literal type annotations, builtin bindings, impl
//! target types) are invisible to generic child enumeration and handled
//! explicitly per kind. Definitional cycles (binding ↔ definer,
//! struct ↔ impl) are broken by constructing one side with an unset
//! back-link and finalizing it once the other side's clone exists.

use rustc_hash::FxHashMap;
use tracing::debug;

use keel_ir::{EnumVariant, FieldInit, Module, Node, NodeId, NodeKind, OnDuplicate, StructMember};

use crate::error::CloneError;
use crate::replace::Replacer;

/// Clone a node and its descendants within its owning module.
///
/// The clone lives in the same arena as the original; references whose
/// targets lie outside the cloned subtree keep pointing at the original
/// nodes. `replacer` is consulted before generic handling of every node,
/// including `root` itself.
///
/// A whole-unit container root is rejected with
/// [`CloneError::InvalidRoot`]; unit-level metadata requires
/// [`clone_module`].
pub fn clone_node(
    module: &mut Module,
    root: NodeId,
    replacer: &mut dyn Replacer,
) -> Result<NodeId, CloneError> {
    if matches!(module.kind(root), NodeKind::Module { .. }) {
        return Err(CloneError::InvalidRoot);
    }
    debug!(root = ?root, nodes = module.len(), "cloning subtree");
    let mut cloner = Cloner::same_arena(module);
    cloner.visit(root, replacer)?;
    cloner.mapped(root)
}

/// Clone a whole compilation unit into a fresh arena.
///
/// The new module carries the same unit name, source path, and shared
/// interner as the original. Top-level members are cloned in declaration
/// order; a duplicate top-level name is rejected by the destination
/// arena's insertion policy.
pub fn clone_module(module: &Module, replacer: &mut dyn Replacer) -> Result<Module, CloneError> {
    let mut dest = Module::new(
        module.name(),
        module.path().map(std::path::Path::to_path_buf),
        std::sync::Arc::clone(module.interner()),
    );
    debug!(
        unit = module.name(),
        members = module.members().len(),
        "cloning module"
    );
    let mut cloner = Cloner::cross_arena(module, &mut dest);
    cloner.handle(module.root(), replacer)?;
    Ok(dest)
}

/// State for one clone operation.
///
/// Holds a read view of the source tree, the destination arena being
/// populated, and the identity map. One `Cloner` serves exactly one
/// operation; the map is discarded with it.
pub struct Cloner<'a> {
    /// Source module when it differs from the destination
    /// (`clone_module`); `None` when cloning within one arena.
    src: Option<&'a Module>,
    /// Destination arena; owns every node the operation creates.
    dest: &'a mut Module,
    /// Identity map: original node → its clone.
    map: FxHashMap<NodeId, NodeId>,
}

impl<'a> Cloner<'a> {
    fn same_arena(module: &'a mut Module) -> Self {
        Cloner {
            src: None,
            dest: module,
            map: FxHashMap::default(),
        }
    }

    fn cross_arena(src: &'a Module, dest: &'a mut Module) -> Self {
        Cloner {
            src: Some(src),
            dest,
            map: FxHashMap::default(),
        }
    }

    /// Read view of the tree being cloned.
    pub fn source(&self) -> &Module {
        match self.src {
            Some(module) => module,
            None => self.dest,
        }
    }

    /// The arena that owns the clone. Replacement hooks allocate their
    /// substitute nodes here.
    pub fn dest(&mut self) -> &mut Module {
        self.dest
    }

    /// Consult the replacer, then fall back to generic handling.
    ///
    /// A node already in the identity map is skipped entirely: this
    /// memoizes shared subtrees and breaks cycles.
    pub(crate) fn visit(
        &mut self,
        id: NodeId,
        replacer: &mut dyn Replacer,
    ) -> Result<(), CloneError> {
        if self.map.contains_key(&id) {
            return Ok(());
        }
        if let Some(replacement) = replacer.replace(self, id)? {
            self.map.insert(id, replacement);
            return Ok(());
        }
        self.handle(id, replacer)
    }

    /// Visit every structural child not yet mapped, in order.
    fn visit_children(
        &mut self,
        id: NodeId,
        replacer: &mut dyn Replacer,
    ) -> Result<(), CloneError> {
        for child in self.source().children(id, true) {
            if !self.map.contains_key(&child) {
                self.visit(child, replacer)?;
            }
        }
        Ok(())
    }

    /// Resolve a reference that must already have been cloned.
    pub(crate) fn mapped(&self, id: NodeId) -> Result<NodeId, CloneError> {
        self.map
            .get(&id)
            .copied()
            .ok_or_else(|| CloneError::MissingMapping {
                text: self.source().render(id),
                kind: self.source().kind(id).kind_name(),
            })
    }

    fn mapped_opt(&self, id: Option<NodeId>) -> Result<Option<NodeId>, CloneError> {
        id.map(|id| self.mapped(id)).transpose()
    }

    fn mapped_all(&self, ids: &[NodeId]) -> Result<Vec<NodeId>, CloneError> {
        ids.iter().map(|&id| self.mapped(id)).collect()
    }

    /// Allocate the clone of `old` in the destination and record the
    /// mapping. The span is carried over verbatim.
    fn alloc(&mut self, old: NodeId, kind: NodeKind) -> NodeId {
        let span = self.source().span(old);
        let new = self.dest.alloc(Node::new(kind, span));
        self.map.insert(old, new);
        new
    }

    /// Generic per-kind handling: clone children, then rebuild the node
    /// with every reference remapped.
    ///
    /// One arm per kind, exhaustively: adding a node kind without
    /// deciding its clone policy is a compile-time error.
    pub(crate) fn handle(
        &mut self,
        id: NodeId,
        r: &mut dyn Replacer,
    ) -> Result<(), CloneError> {
        let kind = self.source().kind(id).clone();
        match kind {
            // ── Leaves copied verbatim ──────────────────────────────
            NodeKind::Str { text } => {
                self.alloc(id, NodeKind::Str { text });
            }
            NodeKind::Raw { text } => {
                self.alloc(id, NodeKind::Raw { text });
            }
            NodeKind::Wildcard => {
                self.alloc(id, NodeKind::Wildcard);
            }
            NodeKind::Rest => {
                self.alloc(id, NodeKind::Rest);
            }

            // ── Bindings ────────────────────────────────────────────
            // The definer is left unset here; the declaring construct
            // sets it on its own fresh binding clone. Setting it here
            // would re-enter the declarer and loop.
            NodeKind::Binding { ident, .. } => {
                self.alloc(
                    id,
                    NodeKind::Binding {
                        ident,
                        definer: NodeId::INVALID,
                    },
                );
            }

            // Builtin bindings resolve through the destination's
            // canonical cache instead of structural cloning.
            NodeKind::BuiltinBinding { ident } => {
                let new = self.dest.builtin(ident);
                self.map.insert(id, new);
            }

            // ── References ──────────────────────────────────────────
            // A reference to a binding inside the cloned region points
            // at the clone; one outside the region keeps the original
            // target. The target is never visited from here.
            NodeKind::NameRef { ident, target } => {
                let target = self.map.get(&target).copied().unwrap_or(target);
                self.alloc(id, NodeKind::NameRef { ident, target });
            }

            // The subject is a cross-reference, invisible to child
            // enumeration; visit it explicitly.
            NodeKind::PathRef { subject, member } => {
                self.visit(subject, r)?;
                let subject = self.mapped(subject)?;
                self.alloc(id, NodeKind::PathRef { subject, member });
            }

            // ── Literals and aggregates ─────────────────────────────
            NodeKind::Number { text, kind, ty } => {
                self.visit_children(id, r)?;
                let ty = self.mapped_opt(ty)?;
                self.alloc(id, NodeKind::Number { text, kind, ty });
            }
            NodeKind::Array {
                elems,
                has_fill,
                ty,
            } => {
                self.visit_children(id, r)?;
                let elems = self.mapped_all(&elems)?;
                let ty = self.mapped_opt(ty)?;
                self.alloc(
                    id,
                    NodeKind::Array {
                        elems,
                        has_fill,
                        ty,
                    },
                );
            }
            NodeKind::Tuple {
                elems,
                trailing_comma,
            } => {
                self.visit_children(id, r)?;
                let elems = self.mapped_all(&elems)?;
                self.alloc(
                    id,
                    NodeKind::Tuple {
                        elems,
                        trailing_comma,
                    },
                );
            }

            // ── Operators ───────────────────────────────────────────
            // The parenthesized flag is syntax trivia and is carried
            // onto the clone.
            NodeKind::Binary {
                op,
                lhs,
                rhs,
                parens,
            } => {
                self.visit_children(id, r)?;
                let lhs = self.mapped(lhs)?;
                let rhs = self.mapped(rhs)?;
                self.alloc(
                    id,
                    NodeKind::Binary {
                        op,
                        lhs,
                        rhs,
                        parens,
                    },
                );
            }
            NodeKind::Unary {
                op,
                operand,
                parens,
            } => {
                self.visit_children(id, r)?;
                let operand = self.mapped(operand)?;
                self.alloc(
                    id,
                    NodeKind::Unary {
                        op,
                        operand,
                        parens,
                    },
                );
            }

            // ── Access and application ──────────────────────────────
            NodeKind::FieldAccess { base, field } => {
                self.visit_children(id, r)?;
                let base = self.mapped(base)?;
                self.alloc(id, NodeKind::FieldAccess { base, field });
            }
            NodeKind::TupleIndex { base, index } => {
                self.visit_children(id, r)?;
                let base = self.mapped(base)?;
                let index = self.mapped(index)?;
                self.alloc(id, NodeKind::TupleIndex { base, index });
            }
            NodeKind::Index { base, rhs } => {
                self.visit_children(id, r)?;
                let base = self.mapped(base)?;
                let rhs = self.mapped(rhs)?;
                self.alloc(id, NodeKind::Index { base, rhs });
            }
            NodeKind::Slice { start, limit } => {
                self.visit_children(id, r)?;
                let start = self.mapped_opt(start)?;
                let limit = self.mapped_opt(limit)?;
                self.alloc(id, NodeKind::Slice { start, limit });
            }
            NodeKind::WidthSlice { start, width } => {
                self.visit_children(id, r)?;
                let start = self.mapped(start)?;
                let width = self.mapped(width)?;
                self.alloc(id, NodeKind::WidthSlice { start, width });
            }
            NodeKind::Call {
                callee,
                args,
                type_args,
            } => {
                self.visit_children(id, r)?;
                let callee = self.mapped(callee)?;
                let args = self.mapped_all(&args)?;
                let type_args = self.mapped_all(&type_args)?;
                self.alloc(
                    id,
                    NodeKind::Call {
                        callee,
                        args,
                        type_args,
                    },
                );
            }
            NodeKind::Cast { expr, ty } => {
                self.visit_children(id, r)?;
                let expr = self.mapped(expr)?;
                let ty = self.mapped(ty)?;
                self.alloc(id, NodeKind::Cast { expr, ty });
            }

            // ── Struct literals ─────────────────────────────────────
            // The struct type annotation is not a child; visit it
            // explicitly so it is cloned (or preserved by a hook).
            NodeKind::StructLit { ty, fields } => {
                self.visit_children(id, r)?;
                self.visit(ty, r)?;
                let ty = self.mapped(ty)?;
                let fields = self.clone_field_inits(&fields)?;
                self.alloc(id, NodeKind::StructLit { ty, fields });
            }
            NodeKind::StructUpdate { ty, fields, base } => {
                self.visit_children(id, r)?;
                self.visit(ty, r)?;
                let ty = self.mapped(ty)?;
                let fields = self.clone_field_inits(&fields)?;
                let base = self.mapped(base)?;
                self.alloc(id, NodeKind::StructUpdate { ty, fields, base });
            }

            // ── Control flow ────────────────────────────────────────
            NodeKind::Match { scrutinee, arms } => {
                self.visit_children(id, r)?;
                let scrutinee = self.mapped(scrutinee)?;
                let arms = self.mapped_all(&arms)?;
                self.alloc(id, NodeKind::Match { scrutinee, arms });
            }
            NodeKind::Arm { patterns, body } => {
                self.visit_children(id, r)?;
                let patterns = self.mapped_all(&patterns)?;
                let body = self.mapped(body)?;
                self.alloc(id, NodeKind::Arm { patterns, body });
            }
            NodeKind::If {
                cond,
                then_body,
                else_body,
            } => {
                self.visit_children(id, r)?;
                let cond = self.mapped(cond)?;
                let then_body = self.mapped(then_body)?;
                let else_body = self.mapped(else_body)?;
                self.alloc(
                    id,
                    NodeKind::If {
                        cond,
                        then_body,
                        else_body,
                    },
                );
            }
            NodeKind::For {
                pattern,
                ty,
                iterable,
                body,
                init,
            } => {
                self.visit_children(id, r)?;
                let pattern = self.mapped(pattern)?;
                let ty = self.mapped_opt(ty)?;
                let iterable = self.mapped(iterable)?;
                let body = self.mapped(body)?;
                let init = self.mapped(init)?;
                self.alloc(
                    id,
                    NodeKind::For {
                        pattern,
                        ty,
                        iterable,
                        body,
                        init,
                    },
                );
            }
            NodeKind::Range { start, end } => {
                self.visit_children(id, r)?;
                let start = self.mapped(start)?;
                let end = self.mapped(end)?;
                self.alloc(id, NodeKind::Range { start, end });
            }

            // ── Statements ──────────────────────────────────────────
            // A statement whose clone is an empty verbatim placeholder
            // is dropped from the rebuilt sequence. The trailing
            // separator flag is copied as-is.
            NodeKind::Block {
                stmts,
                trailing_semi,
            } => {
                self.visit_children(id, r)?;
                let mut new_stmts = Vec::with_capacity(stmts.len());
                for stmt in stmts {
                    let new_stmt = self.mapped(stmt)?;
                    if let NodeKind::Raw { text } = self.dest.kind(new_stmt) {
                        if self.dest.interner().resolve(*text).is_empty() {
                            continue;
                        }
                    }
                    new_stmts.push(new_stmt);
                }
                self.alloc(
                    id,
                    NodeKind::Block {
                        stmts: new_stmts,
                        trailing_semi,
                    },
                );
            }
            NodeKind::Let {
                pattern,
                ty,
                value,
                is_const,
            } => {
                self.visit_children(id, r)?;
                let pattern = self.mapped(pattern)?;
                let ty = self.mapped_opt(ty)?;
                let value = self.mapped(value)?;
                self.alloc(
                    id,
                    NodeKind::Let {
                        pattern,
                        ty,
                        value,
                        is_const,
                    },
                );
            }
            NodeKind::StaticAssert { condition } => {
                self.visit_children(id, r)?;
                let condition = self.mapped(condition)?;
                self.alloc(id, NodeKind::StaticAssert { condition });
            }

            // ── Patterns ────────────────────────────────────────────
            NodeKind::PatternTuple { items } => {
                self.visit_children(id, r)?;
                let items = self.mapped_all(&items)?;
                self.alloc(id, NodeKind::PatternTuple { items });
            }

            // ── Type annotations ────────────────────────────────────
            // The builtin binding is a cross-reference resolved through
            // the destination's canonical cache.
            NodeKind::BuiltinType { kind, def } => {
                self.visit(def, r)?;
                let def = self.mapped(def)?;
                self.alloc(id, NodeKind::BuiltinType { kind, def });
            }
            NodeKind::ArrayType { elem, size } => {
                self.visit_children(id, r)?;
                let elem = self.mapped(elem)?;
                let size = self.mapped(size)?;
                self.alloc(id, NodeKind::ArrayType { elem, size });
            }
            NodeKind::TupleType { members } => {
                self.visit_children(id, r)?;
                let members = self.mapped_all(&members)?;
                self.alloc(id, NodeKind::TupleType { members });
            }

            // The defining declaration is a cross-reference; visit it
            // explicitly so in-region declarations are cloned with
            // their uses.
            NodeKind::TypeRef { target } => {
                self.visit(target, r)?;
                let target = self.mapped(target)?;
                self.alloc(id, NodeKind::TypeRef { target });
            }
            NodeKind::NamedType {
                type_ref,
                type_args,
            } => {
                self.visit_children(id, r)?;
                let type_ref = self.mapped(type_ref)?;
                let type_args = self.mapped_all(&type_args)?;
                self.alloc(
                    id,
                    NodeKind::NamedType {
                        type_ref,
                        type_args,
                    },
                );
            }

            // ── Declarations ────────────────────────────────────────
            NodeKind::Function {
                binding,
                type_params,
                params,
                return_ty,
                body,
                is_public,
            } => {
                self.visit_children(id, r)?;
                let binding = self.mapped(binding)?;
                let type_params = self.mapped_all(&type_params)?;
                let params = self.mapped_all(&params)?;
                let return_ty = self.mapped_opt(return_ty)?;
                let body = self.mapped(body)?;
                let new = self.alloc(
                    id,
                    NodeKind::Function {
                        binding,
                        type_params,
                        params,
                        return_ty,
                        body,
                        is_public,
                    },
                );
                self.dest.set_definer(binding, new);
            }
            NodeKind::Param { binding, ty } => {
                self.visit_children(id, r)?;
                let binding = self.mapped(binding)?;
                let ty = self.mapped(ty)?;
                self.alloc(id, NodeKind::Param { binding, ty });
            }
            NodeKind::TypeParam {
                binding,
                ty,
                default,
            } => {
                self.visit_children(id, r)?;
                let binding = self.mapped(binding)?;
                let ty = self.mapped(ty)?;
                let default = self.mapped_opt(default)?;
                self.alloc(
                    id,
                    NodeKind::TypeParam {
                        binding,
                        ty,
                        default,
                    },
                );
            }
            NodeKind::ConstDef {
                binding,
                ty,
                value,
                is_public,
            } => {
                self.visit_children(id, r)?;
                let binding = self.mapped(binding)?;
                let ty = self.mapped_opt(ty)?;
                let value = self.mapped(value)?;
                self.alloc(
                    id,
                    NodeKind::ConstDef {
                        binding,
                        ty,
                        value,
                        is_public,
                    },
                );
            }
            NodeKind::StructDef {
                binding,
                type_params,
                members,
                impl_block,
                is_public,
            } => {
                self.visit_children(id, r)?;
                let binding = self.mapped(binding)?;
                let type_params = self.mapped_all(&type_params)?;
                let members = members
                    .iter()
                    .map(|m| {
                        Ok(StructMember {
                            name: m.name,
                            name_span: m.name_span,
                            ty: self.mapped(m.ty)?,
                        })
                    })
                    .collect::<Result<Vec<_>, CloneError>>()?;
                let new = self.alloc(
                    id,
                    NodeKind::StructDef {
                        binding,
                        type_params,
                        members,
                        impl_block: NodeId::INVALID,
                        is_public,
                    },
                );
                // The impl references this struct through its target
                // type, so the struct must be mapped before the impl is
                // visited.
                if impl_block.is_valid() {
                    self.visit(impl_block, r)?;
                    let new_impl = self.mapped(impl_block)?;
                    self.dest.set_struct_impl(new, new_impl);
                }
                self.dest.set_definer(binding, new);
            }
            NodeKind::EnumDef {
                binding,
                ty,
                variants,
                is_public,
            } => {
                self.visit_children(id, r)?;
                let binding = self.mapped(binding)?;
                let ty = self.mapped_opt(ty)?;
                let variants = variants
                    .iter()
                    .map(|v| {
                        Ok(EnumVariant {
                            binding: self.mapped(v.binding)?,
                            value: self.mapped(v.value)?,
                        })
                    })
                    .collect::<Result<Vec<_>, CloneError>>()?;
                let new = self.alloc(
                    id,
                    NodeKind::EnumDef {
                        binding,
                        ty,
                        variants,
                        is_public,
                    },
                );
                self.dest.set_definer(binding, new);
            }
            NodeKind::TypeAlias {
                binding,
                ty,
                is_public,
            } => {
                self.visit_children(id, r)?;
                let binding = self.mapped(binding)?;
                let ty = self.mapped(ty)?;
                let new = self.alloc(
                    id,
                    NodeKind::TypeAlias {
                        binding,
                        ty,
                        is_public,
                    },
                );
                self.dest.set_definer(binding, new);
            }
            NodeKind::Impl {
                target_ty,
                members,
                is_public,
            } => {
                self.visit_children(id, r)?;
                let members = self.mapped_all(&members)?;
                let new = self.alloc(
                    id,
                    NodeKind::Impl {
                        target_ty: NodeId::INVALID,
                        members,
                        is_public,
                    },
                );
                // The target type leads back to the struct that owns
                // this impl; visiting it after the impl is mapped keeps
                // the cycle from re-entering.
                self.visit(target_ty, r)?;
                let new_target = self.mapped(target_ty)?;
                self.dest.set_impl_target(new, new_target);
            }
            NodeKind::ActorDef {
                binding,
                type_params,
                members,
                fns,
                is_public,
            } => {
                self.visit_children(id, r)?;
                let binding = self.mapped(binding)?;
                let type_params = self.mapped_all(&type_params)?;
                let members = self.mapped_all(&members)?;
                let fns = self.mapped_all(&fns)?;
                let new = self.alloc(
                    id,
                    NodeKind::ActorDef {
                        binding,
                        type_params,
                        members,
                        fns,
                        is_public,
                    },
                );
                self.dest.set_definer(binding, new);
            }
            NodeKind::StateMember { binding, ty } => {
                self.visit_children(id, r)?;
                let binding = self.mapped(binding)?;
                let ty = self.mapped(ty)?;
                self.alloc(id, NodeKind::StateMember { binding, ty });
            }
            NodeKind::Import { path, binding } => {
                self.visit_children(id, r)?;
                let binding = self.mapped(binding)?;
                self.alloc(id, NodeKind::Import { path, binding });
            }
            NodeKind::Test { func } => {
                self.visit_children(id, r)?;
                let func = self.mapped(func)?;
                self.alloc(id, NodeKind::Test { func });
            }
            NodeKind::Check { func, cases } => {
                self.visit_children(id, r)?;
                let func = self.mapped(func)?;
                self.alloc(id, NodeKind::Check { func, cases });
            }

            // ── Whole-unit container ────────────────────────────────
            // Members are cloned (or replaced) in declaration order and
            // appended through the destination's ordered insertion;
            // name-collision policy belongs to the arena.
            NodeKind::Module { members } => {
                for member in members {
                    self.visit(member, r)?;
                    let new_member = self.mapped(member)?;
                    self.dest.push_member(new_member, OnDuplicate::Error)?;
                }
            }
        }
        Ok(())
    }

    fn clone_field_inits(&self, fields: &[FieldInit]) -> Result<Vec<FieldInit>, CloneError> {
        fields
            .iter()
            .map(|f| {
                Ok(FieldInit {
                    name: f.name,
                    value: self.mapped(f.value)?,
                })
            })
            .collect()
    }
}
