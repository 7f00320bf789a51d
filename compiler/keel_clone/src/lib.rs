//! AST cloning for the Keel compiler.
//!
//! This crate produces structurally isomorphic, freshly allocated copies
//! of syntax trees: a single subtree within its owning module
//! ([`clone_node`]) or a whole compilation unit into a fresh arena
//! ([`clone_module`]). Every internal reference edge is remapped to the
//! corresponding clone; references whose targets lie outside the cloned
//! region are preserved as-is.
//!
//! # Pipeline Position
//!
//! ```text
//! Source → Lex → Parse → **Clone/Specialize** → Type Check → Codegen
//! ```
//!
//! Downstream passes (inlining, specialization, monomorphization) request
//! independent copies of declarations or expressions here, optionally
//! substituting nodes through a [`Replacer`] policy.
//!
//! # What Cloning Guarantees
//!
//! 1. **Isomorphism**: the copy has the same kind shape as the source
//! 2. **Identity disjointness**: no source node appears in the result
//!    (checkable after the fact with [`verify_clone`])
//! 3. **In-region remap, out-of-region preservation**: references into
//!    the cloned region follow their targets' clones; references out of
//!    it keep the original targets
//! 4. **Cycle safety**: binding ↔ definer and struct ↔ impl cycles are
//!    broken by two-phase construction, never by recursion
//!
//! One clone is one synchronous call: no I/O, no suspension points, no
//! state shared across operations. It either fully succeeds or fails
//! atomically with a [`CloneError`].

mod cloner;
mod error;
mod replace;
mod verify;

pub use cloner::{clone_module, clone_node, Cloner};
pub use error::CloneError;
pub use replace::{Chain, NoReplacer, PreserveTypeDecls, Replacer, SubstituteRef};
pub use verify::{flatten_to_set, verify_clone};

#[cfg(test)]
mod tests;
