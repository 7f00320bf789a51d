//! Structural-child enumeration.
//!
//! Children are listed depth-first, left-to-right, in declaration order;
//! for declaration kinds the introduced bindings come before the bodies
//! that may reference them. Generic traversals (cloning, flattening)
//! rebuild exactly these edges.
//!
//! Non-owning cross-references are NOT enumerated here: `NameRef` and
//! `TypeRef` targets, `PathRef` subjects, `BuiltinType` builtin bindings,
//! struct-literal type annotations, and `Impl` target types are a
//! separate, explicitly handled category, as are the `definer` and
//! `impl_block` back-links that close cycles.

use smallvec::SmallVec;

use crate::ast::NodeKind;
use crate::{Module, NodeId};

/// Child buffer sized for the common case.
pub type ChildVec = SmallVec<[NodeId; 8]>;

impl Module {
    /// Enumerate the structural children of a node, in order.
    ///
    /// `include_types` gates the expression-to-type-annotation boundary
    /// edges (e.g. a number's width annotation, a parameter's type).
    /// Children *inside* type annotations are always enumerated.
    pub fn children(&self, id: NodeId, include_types: bool) -> ChildVec {
        let mut out = ChildVec::new();
        let ty_edge = |out: &mut ChildVec, ty: &Option<NodeId>| {
            if include_types {
                if let Some(ty) = ty {
                    out.push(*ty);
                }
            }
        };

        match self.kind(id) {
            // Leaves: literal text, bindings, markers, cross-reference-only
            // kinds.
            NodeKind::Str { .. }
            | NodeKind::Raw { .. }
            | NodeKind::Binding { .. }
            | NodeKind::BuiltinBinding { .. }
            | NodeKind::Wildcard
            | NodeKind::Rest
            | NodeKind::NameRef { .. }
            | NodeKind::PathRef { .. }
            | NodeKind::TypeRef { .. }
            | NodeKind::BuiltinType { .. } => {}

            NodeKind::Number { ty, .. } => ty_edge(&mut out, ty),

            NodeKind::Array { elems, ty, .. } => {
                out.extend(elems.iter().copied());
                ty_edge(&mut out, ty);
            }

            NodeKind::Tuple { elems, .. } | NodeKind::TupleType { members: elems } => {
                out.extend(elems.iter().copied());
            }

            NodeKind::Binary { lhs, rhs, .. } => {
                out.push(*lhs);
                out.push(*rhs);
            }

            NodeKind::Unary { operand, .. } => out.push(*operand),

            NodeKind::FieldAccess { base, .. } => out.push(*base),

            NodeKind::TupleIndex { base, index } => {
                out.push(*base);
                out.push(*index);
            }

            NodeKind::Index { base, rhs } => {
                out.push(*base);
                out.push(*rhs);
            }

            NodeKind::Slice { start, limit } => {
                out.extend(start.iter().copied());
                out.extend(limit.iter().copied());
            }

            NodeKind::WidthSlice { start, width } => {
                out.push(*start);
                if include_types {
                    out.push(*width);
                }
            }

            NodeKind::Call {
                callee,
                args,
                type_args,
            } => {
                out.push(*callee);
                out.extend(type_args.iter().copied());
                out.extend(args.iter().copied());
            }

            NodeKind::Cast { expr, ty } => {
                out.push(*expr);
                if include_types {
                    out.push(*ty);
                }
            }

            // Struct-literal type annotations are cross-references, so
            // only the field values (and splat base) are children.
            NodeKind::StructLit { fields, .. } => {
                out.extend(fields.iter().map(|f| f.value));
            }
            NodeKind::StructUpdate { fields, base, .. } => {
                out.extend(fields.iter().map(|f| f.value));
                out.push(*base);
            }

            NodeKind::Match { scrutinee, arms } => {
                out.push(*scrutinee);
                out.extend(arms.iter().copied());
            }

            NodeKind::Arm { patterns, body } => {
                out.extend(patterns.iter().copied());
                out.push(*body);
            }

            NodeKind::If {
                cond,
                then_body,
                else_body,
            } => {
                out.push(*cond);
                out.push(*then_body);
                out.push(*else_body);
            }

            NodeKind::For {
                pattern,
                ty,
                iterable,
                body,
                init,
            } => {
                out.push(*pattern);
                ty_edge(&mut out, ty);
                out.push(*iterable);
                out.push(*body);
                out.push(*init);
            }

            NodeKind::Range { start, end } => {
                out.push(*start);
                out.push(*end);
            }

            NodeKind::Block { stmts, .. } => out.extend(stmts.iter().copied()),

            NodeKind::Let {
                pattern,
                ty,
                value,
                ..
            } => {
                out.push(*pattern);
                ty_edge(&mut out, ty);
                out.push(*value);
            }

            NodeKind::StaticAssert { condition } => out.push(*condition),

            NodeKind::PatternTuple { items } => out.extend(items.iter().copied()),

            NodeKind::ArrayType { elem, size } => {
                out.push(*elem);
                out.push(*size);
            }

            NodeKind::NamedType {
                type_ref,
                type_args,
            } => {
                out.push(*type_ref);
                out.extend(type_args.iter().copied());
            }

            NodeKind::Function {
                binding,
                type_params,
                params,
                return_ty,
                body,
                ..
            } => {
                out.push(*binding);
                out.extend(type_params.iter().copied());
                out.extend(params.iter().copied());
                ty_edge(&mut out, return_ty);
                out.push(*body);
            }

            NodeKind::Param { binding, ty } | NodeKind::StateMember { binding, ty } => {
                out.push(*binding);
                if include_types {
                    out.push(*ty);
                }
            }

            NodeKind::TypeParam {
                binding,
                ty,
                default,
            } => {
                out.push(*binding);
                if include_types {
                    out.push(*ty);
                }
                out.extend(default.iter().copied());
            }

            NodeKind::ConstDef {
                binding, ty, value, ..
            } => {
                out.push(*binding);
                ty_edge(&mut out, ty);
                out.push(*value);
            }

            // The impl back-link is not a child; it would close the
            // struct ↔ impl cycle.
            NodeKind::StructDef {
                binding,
                type_params,
                members,
                ..
            } => {
                out.push(*binding);
                out.extend(type_params.iter().copied());
                if include_types {
                    out.extend(members.iter().map(|m| m.ty));
                }
            }

            NodeKind::EnumDef {
                binding,
                ty,
                variants,
                ..
            } => {
                out.push(*binding);
                ty_edge(&mut out, ty);
                for v in variants {
                    out.push(v.binding);
                    out.push(v.value);
                }
            }

            NodeKind::TypeAlias { binding, ty, .. } => {
                out.push(*binding);
                if include_types {
                    out.push(*ty);
                }
            }

            // The target type is a cross-reference; members are children.
            NodeKind::Impl { members, .. } => out.extend(members.iter().copied()),

            NodeKind::ActorDef {
                binding,
                type_params,
                members,
                fns,
                ..
            } => {
                out.push(*binding);
                out.extend(type_params.iter().copied());
                out.extend(members.iter().copied());
                out.extend(fns.iter().copied());
            }

            NodeKind::Import { binding, .. } => out.push(*binding),

            NodeKind::Test { func } | NodeKind::Check { func, .. } => out.push(*func),

            NodeKind::Module { members } => out.extend(members.iter().copied()),
        }

        out
    }
}
