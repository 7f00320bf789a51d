//! Post-clone verification.
//!
//! An independent, purely structural check that a clone shares no node
//! identity with its source. Linear in tree size and off the cloning hot
//! path; intended as a hard guarantee after a risky or hook-heavy clone.

use rustc_hash::FxHashSet;

use keel_ir::{Module, NodeId};

use crate::error::CloneError;

/// Flatten the tree under `root` into the set of reachable identities.
///
/// Uses the same child enumeration as cloning (type-annotation children
/// included). Cross-references are not followed: a preserved
/// out-of-region target is not part of the tree.
pub fn flatten_to_set(module: &Module, root: NodeId) -> FxHashSet<NodeId> {
    let mut set = FxHashSet::default();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if set.insert(id) {
            stack.extend(module.children(id, true));
        }
    }
    set
}

/// Verify that `new_root`'s tree shares no node with `old_root`'s.
///
/// Both roots must be owned by `module`: a whole-unit clone lives in a
/// fresh arena and is identity-disjoint by construction, so this check
/// is for same-arena subtree clones.
pub fn verify_clone(
    module: &Module,
    old_root: NodeId,
    new_root: NodeId,
) -> Result<(), CloneError> {
    let old_nodes = flatten_to_set(module, old_root);
    let new_nodes = flatten_to_set(module, new_root);
    for id in &new_nodes {
        if old_nodes.contains(id) {
            return Err(CloneError::CloneOverlap {
                text: module.render(*id),
                span: module.span(*id),
                kind: module.kind(*id).kind_name(),
            });
        }
    }
    Ok(())
}
