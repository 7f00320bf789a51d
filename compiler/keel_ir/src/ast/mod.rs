//! Flat AST types using arena allocation.
//!
//! Every clonable entity (expressions, patterns, type annotations,
//! declarations, the module root) is a [`Node`] in one arena, referenced
//! by [`NodeId`]. This keeps node identity uniform: a pass that must map
//! "any node" to "any node" (cloning, inlining, specialization) works with
//! a single `NodeId → NodeId` table instead of one table per node family.
//!
//! # Module Structure
//!
//! - `operators`: binary and unary operators
//! - `collections`: side-table entry types (`FieldInit`, `StructMember`,
//!   `EnumVariant`) and literal/builtin classifiers

mod collections;
mod operators;

pub use collections::{BuiltinTypeKind, EnumVariant, FieldInit, NumberKind, StructMember};
pub use operators::{BinaryOp, UnaryOp};

use crate::{Name, NodeId, Span};

/// Syntax tree node: a kind plus its source span.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Node { kind, span }
    }
}

/// Node kinds.
///
/// A closed sum type: consumers (child enumeration, rendering, the clone
/// pass) match exhaustively, so adding a kind without a handler is a
/// compile-time error.
///
/// # Reference edges
///
/// Children are `NodeId` indices. Two categories of edge exist:
///
/// - **Structural children**: enumerated by
///   [`Module::children`](crate::Module::children); these are the edges
///   generic traversals rebuild.
/// - **Non-owning cross-references**: `NameRef::target`,
///   `PathRef::subject`, `TypeRef::target`, `BuiltinType::def`,
///   `StructLit`/`StructUpdate` struct type, `Impl::target_ty`. Invisible
///   to child enumeration; passes that rewrite trees must handle each
///   explicitly.
///
/// Back-links that close definitional cycles (`Binding::definer`,
/// `StructDef::impl_block`, `Impl::target_ty`) use `NodeId::INVALID` until
/// set, once, by the arena's finalize operations.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeKind {
    // ── Literals and aggregates ─────────────────────────────────────

    /// Number literal. The text is kept verbatim (never reformatted);
    /// an optional type annotation gives it a concrete width.
    Number {
        text: Name,
        kind: NumberKind,
        ty: Option<NodeId>,
    },

    /// String literal.
    Str { text: Name },

    /// Array literal: `[1, 2, 3]`, optionally `[0, ...]` with a trailing
    /// fill marker repeating the last element.
    Array {
        elems: Vec<NodeId>,
        has_fill: bool,
        ty: Option<NodeId>,
    },

    /// Tuple literal: `(a, b)`. The trailing-comma flag is syntax trivia
    /// preserved for rendering.
    Tuple {
        elems: Vec<NodeId>,
        trailing_comma: bool,
    },

    // ── Operators ───────────────────────────────────────────────────

    /// Binary operation. `parens` records explicit source parentheses.
    Binary {
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
        parens: bool,
    },

    /// Unary operation.
    Unary {
        op: UnaryOp,
        operand: NodeId,
        parens: bool,
    },

    // ── References ──────────────────────────────────────────────────

    /// Read-use of a binding. `target` is a `Binding` or
    /// `BuiltinBinding`; this edge is a non-owning cross-reference and
    /// may legitimately point outside any subtree being rewritten.
    NameRef { ident: Name, target: NodeId },

    /// Qualified reference: `subject::member`. The subject (a `NameRef`
    /// or nested `PathRef`) is a non-owning cross-reference.
    PathRef { subject: NodeId, member: Name },

    // ── Access and application ──────────────────────────────────────

    /// Struct field access: `base.field`.
    FieldAccess { base: NodeId, field: Name },

    /// Tuple element access: `base.0`. The index is a `Number` node.
    TupleIndex { base: NodeId, index: NodeId },

    /// Index operation: `base[rhs]` where `rhs` is an expression, a
    /// `Slice`, or a `WidthSlice`.
    Index { base: NodeId, rhs: NodeId },

    /// Range slice in index position: `[start:limit]`, both optional.
    Slice {
        start: Option<NodeId>,
        limit: Option<NodeId>,
    },

    /// Width slice in index position: `[start +: Type]`. Starts at an
    /// expression and spans the width of a type annotation.
    WidthSlice { start: NodeId, width: NodeId },

    /// Call: `callee(args)` with optional explicit type arguments
    /// `callee<T, N>(args)`. Type arguments are expressions or type
    /// annotations.
    Call {
        callee: NodeId,
        args: Vec<NodeId>,
        type_args: Vec<NodeId>,
    },

    /// Cast: `expr as Type`.
    Cast { expr: NodeId, ty: NodeId },

    // ── Struct literals ─────────────────────────────────────────────

    /// Struct literal: `Point { x: 1, y: 2 }`. `ty` is the struct's type
    /// annotation, a non-owning cross-reference to the type's
    /// declaration side.
    StructLit { ty: NodeId, fields: Vec<FieldInit> },

    /// Struct literal with base splat: `Point { x: 1, ..base }`.
    StructUpdate {
        ty: NodeId,
        fields: Vec<FieldInit>,
        base: NodeId,
    },

    // ── Control flow ────────────────────────────────────────────────

    /// Match expression.
    Match { scrutinee: NodeId, arms: Vec<NodeId> },

    /// One match arm: one or more alternative patterns and a body.
    Arm { patterns: Vec<NodeId>, body: NodeId },

    /// Conditional. `else_body` is a `Block` or another `If` (else-if
    /// chain).
    If {
        cond: NodeId,
        then_body: NodeId,
        else_body: NodeId,
    },

    /// Counted loop with an explicit accumulator:
    /// `for pat: Ty in iterable { body }(init)`.
    For {
        pattern: NodeId,
        ty: Option<NodeId>,
        iterable: NodeId,
        body: NodeId,
        init: NodeId,
    },

    /// Range expression: `start..end`.
    Range { start: NodeId, end: NodeId },

    // ── Statements ──────────────────────────────────────────────────

    /// Statement sequence. `trailing_semi` records whether the final
    /// statement carried a non-semantic trailing separator.
    Block {
        stmts: Vec<NodeId>,
        trailing_semi: bool,
    },

    /// Binding statement: `let pat: Ty = value;` (`const` when
    /// `is_const`).
    Let {
        pattern: NodeId,
        ty: Option<NodeId>,
        value: NodeId,
        is_const: bool,
    },

    /// Compile-time assertion statement.
    StaticAssert { condition: NodeId },

    /// Inert verbatim text placeholder. Carries raw source text that
    /// later phases pass through untouched; an empty one is semantically
    /// nothing.
    Raw { text: Name },

    // ── Bindings and patterns ───────────────────────────────────────

    /// Name-introducing binding. `definer` back-references the declaring
    /// construct and is `NodeId::INVALID` until the owner sets it.
    Binding { ident: Name, definer: NodeId },

    /// Canonical placeholder binding for a builtin name. One instance
    /// per module per identifier, owned by the module's builtin cache.
    BuiltinBinding { ident: Name },

    /// Destructuring pattern: `(a, (b, _))`. Items are bindings,
    /// wildcards, rests, nested `PatternTuple`s, or constant patterns
    /// (`Number`, `NameRef`, `PathRef`).
    PatternTuple { items: Vec<NodeId> },

    /// Wildcard pattern: `_`.
    Wildcard,

    /// Rest-of-tuple pattern: `..`.
    Rest,

    // ── Type annotations ────────────────────────────────────────────

    /// Builtin scalar type annotation. `def` is the canonical
    /// `BuiltinBinding` for the type's identifier, a non-owning
    /// cross-reference resolved through the module's builtin cache.
    BuiltinType { kind: BuiltinTypeKind, def: NodeId },

    /// Array type annotation: `Elem[size]`.
    ArrayType { elem: NodeId, size: NodeId },

    /// Tuple type annotation: `(A, B)`.
    TupleType { members: Vec<NodeId> },

    /// Use of a declared type. `target` is the defining declaration
    /// (`StructDef`, `EnumDef`, `TypeAlias`, `ActorDef`, or a `PathRef`
    /// into an import), a non-owning cross-reference.
    TypeRef { target: NodeId },

    /// Type annotation naming a declared type, with optional explicit
    /// type arguments: `Foo<u8, N>`.
    NamedType {
        type_ref: NodeId,
        type_args: Vec<NodeId>,
    },

    // ── Declarations ────────────────────────────────────────────────

    /// Function definition. Sets itself as its binding's definer.
    Function {
        binding: NodeId,
        type_params: Vec<NodeId>,
        params: Vec<NodeId>,
        return_ty: Option<NodeId>,
        body: NodeId,
        is_public: bool,
    },

    /// Function parameter: `name: Type`.
    Param { binding: NodeId, ty: NodeId },

    /// Parametric binding: `<N: u32 = 8>`. A compile-time parameter
    /// with a type and an optional default expression.
    TypeParam {
        binding: NodeId,
        ty: NodeId,
        default: Option<NodeId>,
    },

    /// Constant definition. Does not set a definer on its binding.
    ConstDef {
        binding: NodeId,
        ty: Option<NodeId>,
        value: NodeId,
        is_public: bool,
    },

    /// Struct definition. Sets itself as its binding's definer.
    /// `impl_block` back-links to the struct's `Impl`
    /// (`NodeId::INVALID` when none), the other half of the
    /// struct ↔ impl cycle.
    StructDef {
        binding: NodeId,
        type_params: Vec<NodeId>,
        members: Vec<StructMember>,
        impl_block: NodeId,
        is_public: bool,
    },

    /// Enum definition. Sets itself as its binding's definer; each
    /// variant's binding stays definer-less.
    EnumDef {
        binding: NodeId,
        ty: Option<NodeId>,
        variants: Vec<EnumVariant>,
        is_public: bool,
    },

    /// Type alias. Sets itself as its binding's definer.
    TypeAlias {
        binding: NodeId,
        ty: NodeId,
        is_public: bool,
    },

    /// Implementation block for a struct. `target_ty` is the struct's
    /// type annotation, a non-owning cross-reference, and
    /// `NodeId::INVALID` until finalized. Members are `ConstDef`s and
    /// `Function`s.
    Impl {
        target_ty: NodeId,
        members: Vec<NodeId>,
        is_public: bool,
    },

    /// Process-like declaration: state members plus member functions.
    /// Sets itself as its binding's definer.
    ActorDef {
        binding: NodeId,
        type_params: Vec<NodeId>,
        members: Vec<NodeId>,
        fns: Vec<NodeId>,
        is_public: bool,
    },

    /// State member of an actor: `name: Type`.
    StateMember { binding: NodeId, ty: NodeId },

    /// Import declaration. Introduces a binding for the imported unit;
    /// the binding stays definer-less.
    Import { path: Vec<Name>, binding: NodeId },

    /// Unit test wrapping a function.
    Test { func: NodeId },

    /// Property check wrapping a function, with an optional case count.
    Check { func: NodeId, cases: Option<u64> },

    /// Whole-unit container. Top-level members in declaration order.
    /// Exactly one per module, created by the module itself.
    Module { members: Vec<NodeId> },
}

impl NodeKind {
    /// Short name of this kind, for diagnostics.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            NodeKind::Number { .. } => "number",
            NodeKind::Str { .. } => "string",
            NodeKind::Array { .. } => "array",
            NodeKind::Tuple { .. } => "tuple",
            NodeKind::Binary { .. } => "binary op",
            NodeKind::Unary { .. } => "unary op",
            NodeKind::NameRef { .. } => "name ref",
            NodeKind::PathRef { .. } => "path ref",
            NodeKind::FieldAccess { .. } => "field access",
            NodeKind::TupleIndex { .. } => "tuple index",
            NodeKind::Index { .. } => "index",
            NodeKind::Slice { .. } => "slice",
            NodeKind::WidthSlice { .. } => "width slice",
            NodeKind::Call { .. } => "call",
            NodeKind::Cast { .. } => "cast",
            NodeKind::StructLit { .. } => "struct literal",
            NodeKind::StructUpdate { .. } => "struct update",
            NodeKind::Match { .. } => "match",
            NodeKind::Arm { .. } => "match arm",
            NodeKind::If { .. } => "if",
            NodeKind::For { .. } => "for",
            NodeKind::Range { .. } => "range",
            NodeKind::Block { .. } => "block",
            NodeKind::Let { .. } => "let",
            NodeKind::StaticAssert { .. } => "static assert",
            NodeKind::Raw { .. } => "raw",
            NodeKind::Binding { .. } => "binding",
            NodeKind::BuiltinBinding { .. } => "builtin binding",
            NodeKind::PatternTuple { .. } => "pattern tuple",
            NodeKind::Wildcard => "wildcard",
            NodeKind::Rest => "rest",
            NodeKind::BuiltinType { .. } => "builtin type",
            NodeKind::ArrayType { .. } => "array type",
            NodeKind::TupleType { .. } => "tuple type",
            NodeKind::TypeRef { .. } => "type ref",
            NodeKind::NamedType { .. } => "named type",
            NodeKind::Function { .. } => "function",
            NodeKind::Param { .. } => "param",
            NodeKind::TypeParam { .. } => "type param",
            NodeKind::ConstDef { .. } => "const",
            NodeKind::StructDef { .. } => "struct",
            NodeKind::EnumDef { .. } => "enum",
            NodeKind::TypeAlias { .. } => "type alias",
            NodeKind::Impl { .. } => "impl",
            NodeKind::ActorDef { .. } => "actor",
            NodeKind::StateMember { .. } => "state member",
            NodeKind::Import { .. } => "import",
            NodeKind::Test { .. } => "test",
            NodeKind::Check { .. } => "check",
            NodeKind::Module { .. } => "module",
        }
    }
}

#[cfg(test)]
mod tests;
