//! Compact textual rendering of nodes.
//!
//! Diagnostics attach the offending node's source-like form. This is a
//! rendering for error messages, not a formatter: it reconstructs a
//! readable approximation from the tree, keeping literal text verbatim.

use crate::ast::NodeKind;
use crate::{Module, NodeId};

impl Module {
    /// Render a node to a source-like string.
    pub fn render(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.render_into(id, &mut out);
        out
    }

    fn render_list(&self, ids: &[NodeId], sep: &str, out: &mut String) {
        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                out.push_str(sep);
            }
            self.render_into(*id, out);
        }
    }

    /// The declared name behind a reference target, for rendering
    /// `TypeRef` without recursing into the whole declaration.
    fn target_name(&self, target: NodeId, out: &mut String) {
        match self.kind(target) {
            NodeKind::Function { binding, .. }
            | NodeKind::ConstDef { binding, .. }
            | NodeKind::StructDef { binding, .. }
            | NodeKind::EnumDef { binding, .. }
            | NodeKind::TypeAlias { binding, .. }
            | NodeKind::ActorDef { binding, .. }
            | NodeKind::Import { binding, .. } => self.render_into(*binding, out),
            NodeKind::Binding { ident, .. } | NodeKind::BuiltinBinding { ident } => {
                out.push_str(self.interner().resolve(*ident));
            }
            NodeKind::PathRef { .. } => self.render_into(target, out),
            other => out.push_str(other.kind_name()),
        }
    }

    fn render_into(&self, id: NodeId, out: &mut String) {
        if !id.is_valid() {
            out.push_str("<unset>");
            return;
        }
        let resolve = |name| self.interner().resolve(name);
        match self.kind(id) {
            NodeKind::Number { text, ty, .. } => {
                if let Some(ty) = ty {
                    self.render_into(*ty, out);
                    out.push(':');
                }
                out.push_str(resolve(*text));
            }
            NodeKind::Str { text } => {
                out.push('"');
                out.push_str(resolve(*text));
                out.push('"');
            }
            NodeKind::Array { elems, has_fill, ty } => {
                if let Some(ty) = ty {
                    self.render_into(*ty, out);
                    out.push(':');
                }
                out.push('[');
                self.render_list(elems, ", ", out);
                if *has_fill {
                    out.push_str(", ...");
                }
                out.push(']');
            }
            NodeKind::Tuple { elems, trailing_comma } => {
                out.push('(');
                self.render_list(elems, ", ", out);
                if *trailing_comma {
                    out.push(',');
                }
                out.push(')');
            }
            NodeKind::Binary { op, lhs, rhs, parens } => {
                if *parens {
                    out.push('(');
                }
                self.render_into(*lhs, out);
                out.push(' ');
                out.push_str(op.as_symbol());
                out.push(' ');
                self.render_into(*rhs, out);
                if *parens {
                    out.push(')');
                }
            }
            NodeKind::Unary { op, operand, parens } => {
                if *parens {
                    out.push('(');
                }
                out.push_str(op.as_symbol());
                self.render_into(*operand, out);
                if *parens {
                    out.push(')');
                }
            }
            NodeKind::NameRef { ident, .. } | NodeKind::Binding { ident, .. }
            | NodeKind::BuiltinBinding { ident } => out.push_str(resolve(*ident)),
            NodeKind::PathRef { subject, member } => {
                self.render_into(*subject, out);
                out.push_str("::");
                out.push_str(resolve(*member));
            }
            NodeKind::FieldAccess { base, field } => {
                self.render_into(*base, out);
                out.push('.');
                out.push_str(resolve(*field));
            }
            NodeKind::TupleIndex { base, index } => {
                self.render_into(*base, out);
                out.push('.');
                self.render_into(*index, out);
            }
            NodeKind::Index { base, rhs } => {
                self.render_into(*base, out);
                out.push('[');
                self.render_into(*rhs, out);
                out.push(']');
            }
            NodeKind::Slice { start, limit } => {
                if let Some(start) = start {
                    self.render_into(*start, out);
                }
                out.push(':');
                if let Some(limit) = limit {
                    self.render_into(*limit, out);
                }
            }
            NodeKind::WidthSlice { start, width } => {
                self.render_into(*start, out);
                out.push_str(" +: ");
                self.render_into(*width, out);
            }
            NodeKind::Call { callee, args, type_args } => {
                self.render_into(*callee, out);
                if !type_args.is_empty() {
                    out.push('<');
                    self.render_list(type_args, ", ", out);
                    out.push('>');
                }
                out.push('(');
                self.render_list(args, ", ", out);
                out.push(')');
            }
            NodeKind::Cast { expr, ty } => {
                self.render_into(*expr, out);
                out.push_str(" as ");
                self.render_into(*ty, out);
            }
            NodeKind::StructLit { ty, fields } => {
                self.render_into(*ty, out);
                out.push_str(" { ");
                for (i, f) in fields.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(resolve(f.name));
                    out.push_str(": ");
                    self.render_into(f.value, out);
                }
                out.push_str(" }");
            }
            NodeKind::StructUpdate { ty, fields, base } => {
                self.render_into(*ty, out);
                out.push_str(" { ");
                for f in fields {
                    out.push_str(resolve(f.name));
                    out.push_str(": ");
                    self.render_into(f.value, out);
                    out.push_str(", ");
                }
                out.push_str("..");
                self.render_into(*base, out);
                out.push_str(" }");
            }
            NodeKind::Match { scrutinee, arms } => {
                out.push_str("match ");
                self.render_into(*scrutinee, out);
                out.push_str(" { ");
                self.render_list(arms, ", ", out);
                out.push_str(" }");
            }
            NodeKind::Arm { patterns, body } => {
                self.render_list(patterns, " | ", out);
                out.push_str(" => ");
                self.render_into(*body, out);
            }
            NodeKind::If { cond, then_body, else_body } => {
                out.push_str("if ");
                self.render_into(*cond, out);
                out.push(' ');
                self.render_into(*then_body, out);
                out.push_str(" else ");
                self.render_into(*else_body, out);
            }
            NodeKind::For { pattern, ty, iterable, body, init } => {
                out.push_str("for ");
                self.render_into(*pattern, out);
                if let Some(ty) = ty {
                    out.push_str(": ");
                    self.render_into(*ty, out);
                }
                out.push_str(" in ");
                self.render_into(*iterable, out);
                out.push(' ');
                self.render_into(*body, out);
                out.push('(');
                self.render_into(*init, out);
                out.push(')');
            }
            NodeKind::Range { start, end } => {
                self.render_into(*start, out);
                out.push_str("..");
                self.render_into(*end, out);
            }
            NodeKind::Block { stmts, trailing_semi } => {
                out.push_str("{ ");
                self.render_list(stmts, "; ", out);
                if *trailing_semi {
                    out.push(';');
                }
                out.push_str(" }");
            }
            NodeKind::Let { pattern, ty, value, is_const } => {
                out.push_str(if *is_const { "const " } else { "let " });
                self.render_into(*pattern, out);
                if let Some(ty) = ty {
                    out.push_str(": ");
                    self.render_into(*ty, out);
                }
                out.push_str(" = ");
                self.render_into(*value, out);
            }
            NodeKind::StaticAssert { condition } => {
                out.push_str("static_assert!(");
                self.render_into(*condition, out);
                out.push(')');
            }
            NodeKind::Raw { text } => out.push_str(resolve(*text)),
            NodeKind::PatternTuple { items } => {
                out.push('(');
                self.render_list(items, ", ", out);
                out.push(')');
            }
            NodeKind::Wildcard => out.push('_'),
            NodeKind::Rest => out.push_str(".."),
            NodeKind::BuiltinType { kind, .. } => out.push_str(kind.ident()),
            NodeKind::ArrayType { elem, size } => {
                self.render_into(*elem, out);
                out.push('[');
                self.render_into(*size, out);
                out.push(']');
            }
            NodeKind::TupleType { members } => {
                out.push('(');
                self.render_list(members, ", ", out);
                out.push(')');
            }
            NodeKind::TypeRef { target } => self.target_name(*target, out),
            NodeKind::NamedType { type_ref, type_args } => {
                self.render_into(*type_ref, out);
                if !type_args.is_empty() {
                    out.push('<');
                    self.render_list(type_args, ", ", out);
                    out.push('>');
                }
            }
            NodeKind::Function { binding, type_params, params, return_ty, body, is_public } => {
                if *is_public {
                    out.push_str("pub ");
                }
                out.push_str("fn ");
                self.render_into(*binding, out);
                if !type_params.is_empty() {
                    out.push('<');
                    self.render_list(type_params, ", ", out);
                    out.push('>');
                }
                out.push('(');
                self.render_list(params, ", ", out);
                out.push(')');
                if let Some(ret) = return_ty {
                    out.push_str(" -> ");
                    self.render_into(*ret, out);
                }
                out.push(' ');
                self.render_into(*body, out);
            }
            NodeKind::Param { binding, ty } | NodeKind::StateMember { binding, ty } => {
                self.render_into(*binding, out);
                out.push_str(": ");
                self.render_into(*ty, out);
            }
            NodeKind::TypeParam { binding, ty, default } => {
                self.render_into(*binding, out);
                out.push_str(": ");
                self.render_into(*ty, out);
                if let Some(default) = default {
                    out.push_str(" = ");
                    self.render_into(*default, out);
                }
            }
            NodeKind::ConstDef { binding, ty, value, is_public } => {
                if *is_public {
                    out.push_str("pub ");
                }
                out.push_str("const ");
                self.render_into(*binding, out);
                if let Some(ty) = ty {
                    out.push_str(": ");
                    self.render_into(*ty, out);
                }
                out.push_str(" = ");
                self.render_into(*value, out);
                out.push(';');
            }
            NodeKind::StructDef { binding, type_params, members, is_public, .. } => {
                if *is_public {
                    out.push_str("pub ");
                }
                out.push_str("struct ");
                self.render_into(*binding, out);
                if !type_params.is_empty() {
                    out.push('<');
                    self.render_list(type_params, ", ", out);
                    out.push('>');
                }
                out.push_str(" { ");
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(resolve(m.name));
                    out.push_str(": ");
                    self.render_into(m.ty, out);
                }
                out.push_str(" }");
            }
            NodeKind::EnumDef { binding, ty, variants, is_public } => {
                if *is_public {
                    out.push_str("pub ");
                }
                out.push_str("enum ");
                self.render_into(*binding, out);
                if let Some(ty) = ty {
                    out.push_str(": ");
                    self.render_into(*ty, out);
                }
                out.push_str(" { ");
                for (i, v) in variants.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.render_into(v.binding, out);
                    out.push_str(" = ");
                    self.render_into(v.value, out);
                }
                out.push_str(" }");
            }
            NodeKind::TypeAlias { binding, ty, is_public } => {
                if *is_public {
                    out.push_str("pub ");
                }
                out.push_str("type ");
                self.render_into(*binding, out);
                out.push_str(" = ");
                self.render_into(*ty, out);
                out.push(';');
            }
            NodeKind::Impl { target_ty, members, .. } => {
                out.push_str("impl ");
                self.render_into(*target_ty, out);
                out.push_str(" { ");
                self.render_list(members, " ", out);
                out.push_str(" }");
            }
            NodeKind::ActorDef { binding, type_params, members, fns, is_public } => {
                if *is_public {
                    out.push_str("pub ");
                }
                out.push_str("actor ");
                self.render_into(*binding, out);
                if !type_params.is_empty() {
                    out.push('<');
                    self.render_list(type_params, ", ", out);
                    out.push('>');
                }
                out.push_str(" { ");
                self.render_list(members, "; ", out);
                if !members.is_empty() && !fns.is_empty() {
                    out.push_str("; ");
                }
                self.render_list(fns, " ", out);
                out.push_str(" }");
            }
            NodeKind::Import { path, binding: _ } => {
                out.push_str("import ");
                for (i, seg) in path.iter().enumerate() {
                    if i > 0 {
                        out.push('.');
                    }
                    out.push_str(resolve(*seg));
                }
            }
            NodeKind::Test { func } => {
                out.push_str("test ");
                self.render_into(*func, out);
            }
            NodeKind::Check { func, cases } => {
                out.push_str("check");
                if let Some(cases) = cases {
                    out.push('(');
                    out.push_str(&cases.to_string());
                    out.push(')');
                }
                out.push(' ');
                self.render_into(*func, out);
            }
            NodeKind::Module { .. } => out.push_str("module"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Node, NodeKind, NumberKind};
    use crate::{BinaryOp, Module, Span, StringInterner};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn test_module() -> Module {
        Module::new("m", None, Arc::new(StringInterner::new()))
    }

    fn num(m: &mut Module, text: &str) -> crate::NodeId {
        let text = m.interner().intern(text);
        m.alloc(Node::new(
            NodeKind::Number {
                text,
                kind: NumberKind::Dec,
                ty: None,
            },
            Span::DUMMY,
        ))
    }

    #[test]
    fn test_render_binary() {
        let mut m = test_module();
        let lhs = num(&mut m, "1");
        let rhs = num(&mut m, "2");
        let add = m.alloc(Node::new(
            NodeKind::Binary {
                op: BinaryOp::Add,
                lhs,
                rhs,
                parens: true,
            },
            Span::DUMMY,
        ));
        assert_eq!(m.render(add), "(1 + 2)");
    }

    #[test]
    fn test_render_array_literal() {
        let mut m = test_module();
        let a = num(&mut m, "1");
        let b = num(&mut m, "2");
        let arr = m.alloc(Node::new(
            NodeKind::Array {
                elems: vec![a, b],
                has_fill: false,
                ty: None,
            },
            Span::DUMMY,
        ));
        assert_eq!(m.render(arr), "[1, 2]");
    }
}
