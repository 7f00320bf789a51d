//! Side-table entry types carried inside node kinds.
//!
//! These are plain data, not nodes: they have no identity of their own.
//! Any `NodeId` they carry is a structural child of the node that holds
//! them.

use crate::{Name, NodeId, Span};

/// Radix/class of a number literal. The literal text itself is kept
/// verbatim so cloning and rendering never reformat it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NumberKind {
    /// Decimal literal: `42`
    Dec,
    /// Hex literal: `0x2a`
    Hex,
    /// Binary literal: `0b101010`
    Bin,
    /// Character literal: `'a'` (value kept as its text form)
    Char,
    /// Boolean literal: `true` / `false`
    Bool,
}

/// Builtin scalar types with canonical per-module binding placeholders.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BuiltinTypeKind {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
}

impl BuiltinTypeKind {
    /// Source-level identifier of the builtin, used as the key into the
    /// module's builtin-binding cache.
    pub const fn ident(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
        }
    }
}

/// Field initializer in a struct literal: `name: value`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct FieldInit {
    pub name: Name,
    pub value: NodeId,
}

/// Field declaration in a struct definition: `name: Type`.
///
/// The name span is kept separately so diagnostics can point at the
/// field name rather than the whole declaration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct StructMember {
    pub name: Name,
    pub name_span: Span,
    pub ty: NodeId,
}

/// Variant declaration in an enum definition: `Name = value`.
///
/// `binding` introduces the variant name; `value` is its constant
/// expression.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct EnumVariant {
    pub binding: NodeId,
    pub value: NodeId,
}
