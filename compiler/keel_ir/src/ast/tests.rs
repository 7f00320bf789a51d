use super::*;
use crate::{Name, Span};

#[test]
fn test_node_kind_hash() {
    use std::collections::HashSet;
    let mut set = HashSet::new();

    set.insert(NodeKind::Wildcard);
    set.insert(NodeKind::Wildcard);
    set.insert(NodeKind::Rest);

    assert_eq!(set.len(), 2);
}

#[test]
fn test_binary_op_symbol() {
    assert_eq!(BinaryOp::Add.as_symbol(), "+");
    assert_eq!(BinaryOp::Concat.as_symbol(), "++");
    assert_eq!(UnaryOp::BitNot.as_symbol(), "!");
}

#[test]
fn test_builtin_type_ident() {
    assert_eq!(BuiltinTypeKind::U32.ident(), "u32");
    assert_eq!(BuiltinTypeKind::Bool.ident(), "bool");
}

#[test]
fn test_kind_name() {
    let kind = NodeKind::Str { text: Name::EMPTY };
    assert_eq!(kind.kind_name(), "string");
    assert_eq!(NodeKind::Wildcard.kind_name(), "wildcard");
}

#[test]
fn test_node_spanned() {
    let node = Node::new(NodeKind::Rest, Span::new(3, 5));
    assert_eq!(node.span.start, 3);
    assert_eq!(node.span.end, 5);
}
