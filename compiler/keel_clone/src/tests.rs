use std::sync::Arc;

use pretty_assertions::assert_eq;

use keel_ir::{
    BinaryOp, BuiltinTypeKind, FieldInit, Module, Node, NodeId, NodeKind, NumberKind, OnDuplicate,
    Span, StringInterner, StructMember,
};

use crate::{
    clone_module, clone_node, flatten_to_set, verify_clone, Chain, CloneError, Cloner, NoReplacer,
    PreserveTypeDecls, Replacer, SubstituteRef,
};

// ── Fixture helpers ─────────────────────────────────────────────────

fn test_module() -> Module {
    Module::new("unit", None, Arc::new(StringInterner::new()))
}

fn ok<T>(result: Result<T, CloneError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => panic!("unexpected clone error: {e}"),
    }
}

/// Funnel a closure into the `Replacer` blanket impl.
fn as_replacer<F>(f: F) -> F
where
    F: FnMut(&mut Cloner<'_>, NodeId) -> Result<Option<NodeId>, CloneError>,
{
    f
}

fn num(m: &mut Module, text: &str) -> NodeId {
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

fn binding(m: &mut Module, ident: &str) -> NodeId {
    let ident = m.interner().intern(ident);
    m.alloc(Node::new(
        NodeKind::Binding {
            ident,
            definer: NodeId::INVALID,
        },
        Span::DUMMY,
    ))
}

fn name_ref(m: &mut Module, ident: &str, target: NodeId) -> NodeId {
    let ident = m.interner().intern(ident);
    m.alloc(Node::new(NodeKind::NameRef { ident, target }, Span::DUMMY))
}

fn block(m: &mut Module, stmts: Vec<NodeId>, trailing_semi: bool) -> NodeId {
    m.alloc(Node::new(
        NodeKind::Block {
            stmts,
            trailing_semi,
        },
        Span::DUMMY,
    ))
}

fn u32_annotation(m: &mut Module) -> NodeId {
    let ident = m.interner().intern(BuiltinTypeKind::U32.ident());
    let def = m.builtin(ident);
    m.alloc(Node::new(
        NodeKind::BuiltinType {
            kind: BuiltinTypeKind::U32,
            def,
        },
        Span::DUMMY,
    ))
}

/// Build `fn name(x: u32) { x }` with the definer back-link set, the way
/// the parser would.
fn identity_fn(m: &mut Module, name: &str) -> NodeId {
    let fn_binding = binding(m, name);
    let x_binding = binding(m, "x");
    let ty = u32_annotation(m);
    let param = m.alloc(Node::new(
        NodeKind::Param {
            binding: x_binding,
            ty,
        },
        Span::DUMMY,
    ));
    let x_use = name_ref(m, "x", x_binding);
    let body = block(m, vec![x_use], false);
    let func = m.alloc(Node::new(
        NodeKind::Function {
            binding: fn_binding,
            type_params: Vec::new(),
            params: vec![param],
            return_ty: None,
            body,
            is_public: false,
        },
        Span::DUMMY,
    ));
    m.set_definer(fn_binding, func);
    func
}

/// Structural shape equality: same kind and same child shape, position
/// by position.
fn same_shape(src: &Module, a: NodeId, dest: &Module, b: NodeId) -> bool {
    if src.kind(a).kind_name() != dest.kind(b).kind_name() {
        return false;
    }
    let ca = src.children(a, true);
    let cb = dest.children(b, true);
    ca.len() == cb.len()
        && ca
            .iter()
            .zip(cb.iter())
            .all(|(&x, &y)| same_shape(src, x, dest, y))
}

// ── Scenario A: hook-free array clone ───────────────────────────────

#[test]
fn clone_array_literal() {
    let mut m = test_module();
    let one = num(&mut m, "1");
    let two = num(&mut m, "2");
    let array = m.alloc(Node::new(
        NodeKind::Array {
            elems: vec![one, two],
            has_fill: false,
            ty: None,
        },
        Span::DUMMY,
    ));

    let new_array = ok(clone_node(&mut m, array, &mut NoReplacer));

    assert_ne!(new_array, array);
    assert!(same_shape(&m, array, &m, new_array));
    let NodeKind::Array { elems, .. } = m.kind(new_array) else {
        panic!("clone is not an array");
    };
    assert_eq!(elems.len(), 2);
    assert_ne!(elems[0], one);
    assert_ne!(elems[1], two);
    assert_eq!(m.render(new_array), "[1, 2]");
    ok(verify_clone(&m, array, new_array));
}

#[test]
fn clone_preserves_literal_text_and_flags() {
    let mut m = test_module();
    let hex_text = m.interner().intern("0x2a");
    let lhs = m.alloc(Node::new(
        NodeKind::Number {
            text: hex_text,
            kind: NumberKind::Hex,
            ty: None,
        },
        Span::DUMMY,
    ));
    let rhs = num(&mut m, "7");
    let binary = m.alloc(Node::new(
        NodeKind::Binary {
            op: BinaryOp::Shl,
            lhs,
            rhs,
            parens: true,
        },
        Span::new(3, 12),
    ));

    let new_binary = ok(clone_node(&mut m, binary, &mut NoReplacer));

    assert_eq!(m.span(new_binary), Span::new(3, 12));
    let NodeKind::Binary { op, lhs: l, parens, .. } = m.kind(new_binary) else {
        panic!("clone is not a binary op");
    };
    assert_eq!(*op, BinaryOp::Shl);
    assert!(*parens, "parenthesized flag copied verbatim");
    let NodeKind::Number { text, kind, .. } = m.kind(*l) else {
        panic!("lhs clone is not a number");
    };
    assert_eq!(m.interner().resolve(*text), "0x2a");
    assert_eq!(*kind, NumberKind::Hex);
}

// ── Scenario B: out-of-region reference preserved ───────────────────

#[test]
fn out_of_region_reference_keeps_original_target() {
    let mut m = test_module();
    let outer = binding(&mut m, "limit");
    let use_of_outer = name_ref(&mut m, "limit", outer);
    let one = num(&mut m, "1");
    let sum = m.alloc(Node::new(
        NodeKind::Binary {
            op: BinaryOp::Add,
            lhs: use_of_outer,
            rhs: one,
            parens: false,
        },
        Span::DUMMY,
    ));

    let new_sum = ok(clone_node(&mut m, sum, &mut NoReplacer));

    let NodeKind::Binary { lhs, .. } = m.kind(new_sum) else {
        panic!("clone is not a binary op");
    };
    let NodeKind::NameRef { target, .. } = m.kind(*lhs) else {
        panic!("lhs clone is not a name ref");
    };
    assert_eq!(*target, outer, "reference outside the region is unmapped");
    assert_ne!(*lhs, use_of_outer, "the reference node itself is fresh");
}

// ── Scenario C: whole-unit root rejected ────────────────────────────

#[test]
fn module_root_rejected_by_clone_node() {
    let mut m = test_module();
    let root = m.root();
    let err = clone_node(&mut m, root, &mut NoReplacer);
    assert!(matches!(err, Err(CloneError::InvalidRoot)));
}

// ── Scenario D: identity function, cycle safety ─────────────────────

#[test]
fn clone_identity_function() {
    let mut m = test_module();
    let func = identity_fn(&mut m, "f");

    let new_func = ok(clone_node(&mut m, func, &mut NoReplacer));

    let NodeKind::Function { binding: new_fn_binding, params, body, .. } = m.kind(new_func) else {
        panic!("clone is not a function");
    };
    let (new_fn_binding, params, body) = (*new_fn_binding, params.clone(), *body);

    // The function's own binding: fresh, and its definer points at the
    // CLONED function, not the original.
    assert_eq!(m.definer(new_fn_binding), new_func);

    // The parameter binding and the body's trailing reference are
    // mutually consistent clones.
    let NodeKind::Param { binding: new_x, .. } = m.kind(params[0]) else {
        panic!("param clone is not a param");
    };
    let new_x = *new_x;
    let NodeKind::Block { stmts, .. } = m.kind(body) else {
        panic!("body clone is not a block");
    };
    let NodeKind::NameRef { target, .. } = m.kind(stmts[0]) else {
        panic!("trailing statement is not a name ref");
    };
    assert_eq!(*target, new_x, "in-region reference follows its clone");

    // Parameter bindings stay definer-less, like the original.
    assert!(!m.definer(new_x).is_valid());

    // Zero original identities reachable from the result.
    ok(verify_clone(&m, func, new_func));
    let old_nodes = flatten_to_set(&m, func);
    for id in flatten_to_set(&m, new_func) {
        assert!(!old_nodes.contains(&id));
    }
}

// ── Memoization ─────────────────────────────────────────────────────

#[test]
fn shared_subtree_cloned_once() {
    let mut m = test_module();
    let shared = num(&mut m, "9");
    let tuple = m.alloc(Node::new(
        NodeKind::Tuple {
            elems: vec![shared, shared],
            trailing_comma: false,
        },
        Span::DUMMY,
    ));

    let new_tuple = ok(clone_node(&mut m, tuple, &mut NoReplacer));

    let NodeKind::Tuple { elems, .. } = m.kind(new_tuple) else {
        panic!("clone is not a tuple");
    };
    assert_eq!(elems[0], elems[1], "shared child cloned exactly once");
    assert_ne!(elems[0], shared);
}

// ── Builtin bindings ────────────────────────────────────────────────

#[test]
fn builtin_binding_resolved_through_cache() {
    let mut m = test_module();
    let x = binding(&mut m, "x");
    let ty = u32_annotation(&mut m);
    let param = m.alloc(Node::new(NodeKind::Param { binding: x, ty }, Span::DUMMY));

    let first = ok(clone_node(&mut m, param, &mut NoReplacer));
    let second = ok(clone_node(&mut m, param, &mut NoReplacer));

    let def_of = |m: &Module, p: NodeId| {
        let NodeKind::Param { ty, .. } = m.kind(p) else {
            panic!("not a param");
        };
        let NodeKind::BuiltinType { def, .. } = m.kind(*ty) else {
            panic!("not a builtin type");
        };
        *def
    };
    // One canonical builtin binding per arena: both clones and the
    // original share it.
    assert_eq!(def_of(&m, first), def_of(&m, param));
    assert_eq!(def_of(&m, second), def_of(&m, param));
}

// ── Statement containers ────────────────────────────────────────────

#[test]
fn empty_raw_statement_dropped_from_cloned_block() {
    let mut m = test_module();
    let empty = m.interner().intern("");
    let marker = m.interner().intern("// keep");
    let empty_raw = m.alloc(Node::new(NodeKind::Raw { text: empty }, Span::DUMMY));
    let kept_raw = m.alloc(Node::new(NodeKind::Raw { text: marker }, Span::DUMMY));
    let one = num(&mut m, "1");
    let body = block(&mut m, vec![empty_raw, kept_raw, one], true);

    let new_body = ok(clone_node(&mut m, body, &mut NoReplacer));

    let NodeKind::Block { stmts, trailing_semi } = m.kind(new_body) else {
        panic!("clone is not a block");
    };
    assert_eq!(stmts.len(), 2, "empty placeholder dropped, others kept");
    assert!(matches!(m.kind(stmts[0]), NodeKind::Raw { .. }));
    assert!(*trailing_semi, "trailing separator flag copied");
}

// ── Hook override ───────────────────────────────────────────────────

/// Replace one exact node with a pre-allocated substitute.
struct ReplaceExact {
    from: NodeId,
    to: NodeId,
}

impl Replacer for ReplaceExact {
    fn replace(
        &mut self,
        _cloner: &mut Cloner<'_>,
        node: NodeId,
    ) -> Result<Option<NodeId>, CloneError> {
        Ok((node == self.from).then_some(self.to))
    }
}

#[test]
fn hook_replaces_node_and_skips_its_children() {
    let mut m = test_module();
    let ty = u32_annotation(&mut m);
    let text = m.interner().intern("1");
    let annotated = m.alloc(Node::new(
        NodeKind::Number {
            text,
            kind: NumberKind::Dec,
            ty: Some(ty),
        },
        Span::DUMMY,
    ));
    let other = num(&mut m, "2");
    let array = m.alloc(Node::new(
        NodeKind::Array {
            elems: vec![annotated, other],
            has_fill: false,
            ty: None,
        },
        Span::DUMMY,
    ));
    let substitute = num(&mut m, "42");

    let before = m.len();
    let new_array = ok(clone_node(
        &mut m,
        array,
        &mut ReplaceExact {
            from: annotated,
            to: substitute,
        },
    ));

    let NodeKind::Array { elems, .. } = m.kind(new_array) else {
        panic!("clone is not an array");
    };
    assert_eq!(elems[0], substitute, "replacement used verbatim in place");
    assert_ne!(elems[1], other, "siblings still clone generically");
    // The replaced node's type annotation was never cloned: only the
    // array and the sibling number were allocated.
    assert_eq!(m.len(), before + 2);
}

#[test]
fn closure_hook_replaces_root() {
    let mut m = test_module();
    let original = num(&mut m, "3");
    let substitute = num(&mut m, "4");

    let mut hook = as_replacer(move |_cloner, node| Ok((node == original).then_some(substitute)));
    let result = ok(clone_node(&mut m, original, &mut hook));
    assert_eq!(result, substitute, "hook applies to the root itself");
}

// ── Substitute-reference policy ─────────────────────────────────────

#[test]
fn substitute_ref_rewrites_one_binding() {
    let mut m = test_module();
    let n_binding = binding(&mut m, "n");
    let other_binding = binding(&mut m, "k");
    let use_n = name_ref(&mut m, "n", n_binding);
    let use_k = name_ref(&mut m, "k", other_binding);
    let sum = m.alloc(Node::new(
        NodeKind::Binary {
            op: BinaryOp::Add,
            lhs: use_n,
            rhs: use_k,
            parens: false,
        },
        Span::DUMMY,
    ));
    let replacement = num(&mut m, "8");

    let new_sum = ok(clone_node(
        &mut m,
        sum,
        &mut SubstituteRef {
            def: n_binding,
            replacement,
        },
    ));

    let NodeKind::Binary { lhs, rhs, .. } = m.kind(new_sum) else {
        panic!("clone is not a binary op");
    };
    assert_eq!(*lhs, replacement, "use of `n` inlined");
    let NodeKind::NameRef { target, .. } = m.kind(*rhs) else {
        panic!("rhs clone is not a name ref");
    };
    assert_eq!(*target, other_binding, "other references untouched");
}

// ── Preserve-type-definitions policy ────────────────────────────────

/// Build `struct S { a: u32 }` plus a literal `S { a: 1 }` whose type
/// annotation goes through a `TypeRef` to the declaration.
fn struct_and_literal(m: &mut Module) -> (NodeId, NodeId) {
    let s_binding = binding(m, "S");
    let a_ty = u32_annotation(m);
    let a_name = m.interner().intern("a");
    let struct_def = m.alloc(Node::new(
        NodeKind::StructDef {
            binding: s_binding,
            type_params: Vec::new(),
            members: vec![StructMember {
                name: a_name,
                name_span: Span::DUMMY,
                ty: a_ty,
            }],
            impl_block: NodeId::INVALID,
            is_public: false,
        },
        Span::DUMMY,
    ));
    m.set_definer(s_binding, struct_def);

    let type_ref = m.alloc(Node::new(NodeKind::TypeRef { target: struct_def }, Span::DUMMY));
    let named = m.alloc(Node::new(
        NodeKind::NamedType {
            type_ref,
            type_args: Vec::new(),
        },
        Span::DUMMY,
    ));
    let one = num(m, "1");
    let literal = m.alloc(Node::new(
        NodeKind::StructLit {
            ty: named,
            fields: vec![FieldInit {
                name: a_name,
                value: one,
            }],
        },
        Span::DUMMY,
    ));
    (struct_def, literal)
}

#[test]
fn preserve_type_decls_keeps_original_declaration() {
    let mut m = test_module();
    let (struct_def, literal) = struct_and_literal(&mut m);

    let new_literal = ok(clone_node(&mut m, literal, &mut PreserveTypeDecls));

    let NodeKind::StructLit { ty, .. } = m.kind(new_literal) else {
        panic!("clone is not a struct literal");
    };
    let NodeKind::NamedType { type_ref, .. } = m.kind(*ty) else {
        panic!("type annotation clone is not a named type");
    };
    let NodeKind::TypeRef { target } = m.kind(*type_ref) else {
        panic!("inner node is not a type ref");
    };
    assert_eq!(
        *target, struct_def,
        "type use still targets the ORIGINAL declaration"
    );
    ok(verify_clone(&m, literal, new_literal));
}

#[test]
fn generic_clone_pulls_declaration_into_region() {
    let mut m = test_module();
    let (struct_def, literal) = struct_and_literal(&mut m);

    let new_literal = ok(clone_node(&mut m, literal, &mut NoReplacer));

    let NodeKind::StructLit { ty, .. } = m.kind(new_literal) else {
        panic!("clone is not a struct literal");
    };
    let NodeKind::NamedType { type_ref, .. } = m.kind(*ty) else {
        panic!("type annotation clone is not a named type");
    };
    let NodeKind::TypeRef { target } = m.kind(*type_ref) else {
        panic!("inner node is not a type ref");
    };
    assert_ne!(
        *target, struct_def,
        "without the policy the declaration is cloned too"
    );
    let NodeKind::StructDef { binding, .. } = m.kind(*target) else {
        panic!("cloned target is not a struct");
    };
    assert_eq!(m.definer(*binding), *target, "cloned struct re-links its binding");
}

// ── Struct ↔ impl cycle ─────────────────────────────────────────────

#[test]
fn struct_impl_cycle_clones_without_recursion() {
    let mut m = test_module();
    let (struct_def, _) = struct_and_literal(&mut m);
    let type_ref = m.alloc(Node::new(NodeKind::TypeRef { target: struct_def }, Span::DUMMY));
    let named = m.alloc(Node::new(
        NodeKind::NamedType {
            type_ref,
            type_args: Vec::new(),
        },
        Span::DUMMY,
    ));
    let width_binding = binding(&mut m, "WIDTH");
    let eight = num(&mut m, "8");
    let width = m.alloc(Node::new(
        NodeKind::ConstDef {
            binding: width_binding,
            ty: None,
            value: eight,
            is_public: false,
        },
        Span::DUMMY,
    ));
    let impl_block = m.alloc(Node::new(
        NodeKind::Impl {
            target_ty: named,
            members: vec![width],
            is_public: false,
        },
        Span::DUMMY,
    ));
    m.set_struct_impl(struct_def, impl_block);

    let new_struct = ok(clone_node(&mut m, struct_def, &mut NoReplacer));

    let NodeKind::StructDef { impl_block: new_impl, binding, .. } = m.kind(new_struct) else {
        panic!("clone is not a struct");
    };
    let (new_impl, new_binding) = (*new_impl, *binding);
    assert!(new_impl.is_valid(), "impl link patched onto the clone");
    assert_ne!(new_impl, impl_block);
    assert_eq!(m.definer(new_binding), new_struct);

    // The cloned impl's target type resolves back to the CLONED struct.
    let NodeKind::Impl { target_ty, .. } = m.kind(new_impl) else {
        panic!("impl clone is not an impl");
    };
    let NodeKind::NamedType { type_ref, .. } = m.kind(*target_ty) else {
        panic!("impl target is not a named type");
    };
    let NodeKind::TypeRef { target } = m.kind(*type_ref) else {
        panic!("impl target inner is not a type ref");
    };
    assert_eq!(*target, new_struct);
}

// ── Hook composition ────────────────────────────────────────────────

#[test]
fn chain_takes_first_non_empty_result() {
    let mut m = test_module();
    let one = num(&mut m, "1");
    let two = num(&mut m, "2");
    let pair = m.alloc(Node::new(
        NodeKind::Tuple {
            elems: vec![one, two],
            trailing_comma: false,
        },
        Span::DUMMY,
    ));
    let from_first = num(&mut m, "100");
    let from_second = num(&mut m, "200");

    let mut chain = Chain::new()
        .with(ReplaceExact {
            from: one,
            to: from_first,
        })
        .with(ReplaceAnyNumber { to: from_second });
    let new_pair = ok(clone_node(&mut m, pair, &mut chain));

    let NodeKind::Tuple { elems, .. } = m.kind(new_pair) else {
        panic!("clone is not a tuple");
    };
    assert_eq!(elems[0], from_first, "first policy wins for `1`");
    assert_eq!(elems[1], from_second, "second policy catches the rest");
}

/// Replace every number literal with one substitute node.
struct ReplaceAnyNumber {
    to: NodeId,
}

impl Replacer for ReplaceAnyNumber {
    fn replace(
        &mut self,
        cloner: &mut Cloner<'_>,
        node: NodeId,
    ) -> Result<Option<NodeId>, CloneError> {
        Ok(matches!(cloner.source().kind(node), NodeKind::Number { .. }).then_some(self.to))
    }
}

// ── Whole-unit cloning ──────────────────────────────────────────────

#[test]
fn clone_module_carries_metadata_and_order() {
    let mut m = Module::new(
        "counter",
        Some(std::path::PathBuf::from("hw/counter.kl")),
        Arc::new(StringInterner::new()),
    );
    let max_binding = binding(&mut m, "MAX");
    let seven = num(&mut m, "7");
    let max_def = m.alloc(Node::new(
        NodeKind::ConstDef {
            binding: max_binding,
            ty: None,
            value: seven,
            is_public: true,
        },
        Span::DUMMY,
    ));
    ok(m.push_member(max_def, OnDuplicate::Error).map_err(CloneError::from));
    let func = identity_fn(&mut m, "step");
    ok(m.push_member(func, OnDuplicate::Error).map_err(CloneError::from));

    let new_m = ok(clone_module(&m, &mut NoReplacer));

    assert_eq!(new_m.name(), "counter");
    assert_eq!(
        new_m.path().map(std::path::Path::to_path_buf),
        Some(std::path::PathBuf::from("hw/counter.kl"))
    );
    assert!(
        Arc::ptr_eq(m.interner(), new_m.interner()),
        "clone shares the original's interner"
    );
    assert_eq!(new_m.members().len(), 2);
    assert!(matches!(new_m.kind(new_m.members()[0]), NodeKind::ConstDef { .. }));
    assert!(matches!(new_m.kind(new_m.members()[1]), NodeKind::Function { .. }));
    assert!(same_shape(&m, m.members()[1], &new_m, new_m.members()[1]));

    // The member name table is rebuilt in the new arena.
    let max_name = m.interner().intern("MAX");
    assert_eq!(new_m.member_named(max_name), Some(new_m.members()[0]));
}

#[test]
fn clone_module_remaps_references_between_members() {
    let mut m = test_module();
    let max_binding = binding(&mut m, "MAX");
    let seven = num(&mut m, "7");
    let max_def = m.alloc(Node::new(
        NodeKind::ConstDef {
            binding: max_binding,
            ty: None,
            value: seven,
            is_public: false,
        },
        Span::DUMMY,
    ));
    ok(m.push_member(max_def, OnDuplicate::Error).map_err(CloneError::from));

    // fn limit() { MAX }
    let fn_binding = binding(&mut m, "limit");
    let max_use = name_ref(&mut m, "MAX", max_binding);
    let body = block(&mut m, vec![max_use], false);
    let func = m.alloc(Node::new(
        NodeKind::Function {
            binding: fn_binding,
            type_params: Vec::new(),
            params: Vec::new(),
            return_ty: None,
            body,
            is_public: false,
        },
        Span::DUMMY,
    ));
    m.set_definer(fn_binding, func);
    ok(m.push_member(func, OnDuplicate::Error).map_err(CloneError::from));

    let new_m = ok(clone_module(&m, &mut NoReplacer));

    let NodeKind::ConstDef { binding: new_max_binding, .. } = new_m.kind(new_m.members()[0])
    else {
        panic!("first member is not a const");
    };
    let NodeKind::Function { body, .. } = new_m.kind(new_m.members()[1]) else {
        panic!("second member is not a function");
    };
    let NodeKind::Block { stmts, .. } = new_m.kind(*body) else {
        panic!("function body is not a block");
    };
    let NodeKind::NameRef { target, .. } = new_m.kind(stmts[0]) else {
        panic!("statement is not a name ref");
    };
    assert_eq!(
        *target, *new_max_binding,
        "cross-member reference follows the cloned binding"
    );
}

#[test]
fn clone_module_rejects_duplicate_names() {
    let mut m = test_module();
    let f1 = identity_fn(&mut m, "f");
    let f2 = identity_fn(&mut m, "f");
    ok(m.push_member(f1, OnDuplicate::Error).map_err(CloneError::from));
    // Build-side permissive insertion lets the collision exist...
    ok(m.push_member(f2, OnDuplicate::Ignore).map_err(CloneError::from));

    // ...and the strict whole-unit clone surfaces it.
    let err = clone_module(&m, &mut NoReplacer);
    assert!(matches!(err, Err(CloneError::Module(_))));
}

// ── Invariant failure reporting ─────────────────────────────────────

#[test]
fn nested_unit_container_reports_missing_mapping() {
    let mut m = test_module();
    // A malformed tree: the whole-unit container in expression position.
    // Its handler never records an identity mapping, so the parent's
    // lookup must fail loudly rather than alias the source tree.
    let root = m.root();
    let one = num(&mut m, "1");
    let weird = m.alloc(Node::new(
        NodeKind::Binary {
            op: BinaryOp::Add,
            lhs: root,
            rhs: one,
            parens: false,
        },
        Span::DUMMY,
    ));

    let err = clone_node(&mut m, weird, &mut NoReplacer);
    match err {
        Err(CloneError::MissingMapping { kind, .. }) => assert_eq!(kind, "module"),
        other => panic!("expected MissingMapping, got {other:?}"),
    }
}
