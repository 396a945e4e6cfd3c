//! Lowering of parsed method definitions into the executable tree.

pub mod compile;
pub mod inliner;

pub use compile::{compile_method, MethodCompiler};

/// How a `^` occurring inside a true block is lowered. Chosen per
/// universe, at compile time; the evaluator supports both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnwindPolicy {
    /// The returned value travels outward as a tagged ordinary return,
    /// unwrapped by the method activation owning the home context.
    #[default]
    Lightweight,
    /// The returned value is raised as a signal, caught by a handler
    /// compiled into the home method's root body.
    Signal,
}
