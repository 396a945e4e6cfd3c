//!
//! This crate contains common types shared between the Opal tools: the
//! string interner and the source AST that the parser front end produces
//! and the runtime's compiler consumes.
//!

/// The Opal source AST definitions: the common parser output.
pub mod ast;
/// Facilities for string interning.
pub mod interner;
