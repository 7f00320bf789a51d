//! Replacement hooks: pluggable node-level substitution.
//!
//! A [`Replacer`] is consulted before generic handling of every node. A
//! returned replacement is recorded verbatim in the identity map and the
//! node's children are not cloned through the generic path; the
//! replacement is trusted to be well-formed and owned by the destination
//! arena.
//!
//! Policies compose: [`Chain`] tries a sequence in order and takes the
//! first non-empty result. Ad hoc policies can be plain closures via the
//! blanket `FnMut` impl.

use keel_ir::{Node, NodeId, NodeKind};

use crate::cloner::Cloner;
use crate::error::CloneError;

/// Node-level substitution policy consulted during cloning.
///
/// Implementations read the tree being cloned through
/// [`Cloner::source`] and allocate substitute nodes in
/// [`Cloner::dest`].
pub trait Replacer {
    /// Return `Some(replacement)` to override cloning of `node`, or
    /// `None` to let generic handling proceed.
    fn replace(
        &mut self,
        cloner: &mut Cloner<'_>,
        node: NodeId,
    ) -> Result<Option<NodeId>, CloneError>;
}

/// Closures are replacers.
impl<F> Replacer for F
where
    F: FnMut(&mut Cloner<'_>, NodeId) -> Result<Option<NodeId>, CloneError>,
{
    fn replace(
        &mut self,
        cloner: &mut Cloner<'_>,
        node: NodeId,
    ) -> Result<Option<NodeId>, CloneError> {
        self(cloner, node)
    }
}

/// The no-op policy: every node clones generically.
pub struct NoReplacer;

impl Replacer for NoReplacer {
    fn replace(
        &mut self,
        _cloner: &mut Cloner<'_>,
        _node: NodeId,
    ) -> Result<Option<NodeId>, CloneError> {
        Ok(None)
    }
}

/// Keep type-use nodes pointing at their ORIGINAL defining declarations.
///
/// Every `TypeRef` is re-allocated in the destination with the original
/// target preserved, so the declarations themselves are never pulled
/// into the cloned region. Used when the destination intentionally
/// shares type declarations that live outside the subtree being cloned.
pub struct PreserveTypeDecls;

impl Replacer for PreserveTypeDecls {
    fn replace(
        &mut self,
        cloner: &mut Cloner<'_>,
        node: NodeId,
    ) -> Result<Option<NodeId>, CloneError> {
        let target = match cloner.source().kind(node) {
            NodeKind::TypeRef { target } => *target,
            _ => return Ok(None),
        };
        let span = cloner.source().span(node);
        let new = cloner
            .dest()
            .alloc(Node::new(NodeKind::TypeRef { target }, span));
        Ok(Some(new))
    }
}

/// Replace every read-use of one binding with a caller-supplied
/// expression.
///
/// `replacement` must already be owned by the destination arena; it is
/// substituted for each `NameRef` whose target is `def`, while every
/// other node clones generically. This is the inlining/specialization
/// workhorse.
pub struct SubstituteRef {
    /// The binding whose uses are rewritten.
    pub def: NodeId,
    /// The expression substituted at each use.
    pub replacement: NodeId,
}

impl Replacer for SubstituteRef {
    fn replace(
        &mut self,
        cloner: &mut Cloner<'_>,
        node: NodeId,
    ) -> Result<Option<NodeId>, CloneError> {
        match cloner.source().kind(node) {
            NodeKind::NameRef { target, .. } if *target == self.def => Ok(Some(self.replacement)),
            _ => Ok(None),
        }
    }
}

/// Try a sequence of policies in order; the first non-empty result wins.
pub struct Chain<'p> {
    policies: Vec<Box<dyn Replacer + 'p>>,
}

impl<'p> Chain<'p> {
    /// An empty chain behaves like [`NoReplacer`].
    pub fn new() -> Self {
        Chain {
            policies: Vec::new(),
        }
    }

    /// Append a policy to the end of the chain.
    #[must_use]
    pub fn with(mut self, policy: impl Replacer + 'p) -> Self {
        self.policies.push(Box::new(policy));
        self
    }
}

impl Default for Chain<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Replacer for Chain<'_> {
    fn replace(
        &mut self,
        cloner: &mut Cloner<'_>,
        node: NodeId,
    ) -> Result<Option<NodeId>, CloneError> {
        for policy in &mut self.policies {
            if let Some(replacement) = policy.replace(cloner, node)? {
                return Ok(Some(replacement));
            }
        }
        Ok(None)
    }
}
