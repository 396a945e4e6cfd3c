use thiserror::Error;

/// The runtime error taxonomy.
///
/// Contract violations and configuration errors are fatal and propagate
/// with no recovery; they indicate a bug in the surrounding compiler or an
/// ill-formed class library, not a program-level condition.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RuntimeError {
    /// A call site was invoked with a shape the binder was not built for.
    /// Internal error: binders are only usable from compiled method bodies
    /// with the expected calling convention.
    #[error("binding contract violation for '{selector}': expected {expected} arguments, got {got}")]
    BindingContract {
        selector: String,
        expected: usize,
        got: usize,
    },

    /// No `doesNotUnderstand:arguments:` anywhere in a class's chain. Every
    /// class must inherit one from the root class; its absence is a fatal
    /// configuration error of the class library.
    #[error("class '{class}' has no doesNotUnderstand:arguments: handler")]
    MissingDnuHandler { class: String },

    /// The root does-not-understand handler was reached.
    #[error("'{class}' does not understand #{selector}")]
    MessageNotUnderstood { class: String, selector: String },

    /// A mutation of a frozen method dictionary.
    #[error("class '{class}' is frozen; cannot install #{selector}")]
    FrozenClass { class: String, selector: String },

    /// A `^` executed in a block whose home activation has already
    /// completed.
    #[error("non-local return from #{selector} escaped its home activation")]
    EscapedBlockReturn { selector: String },

    /// Anything else the language semantics surface as an error.
    #[error("{0}")]
    Msg(String),
}

impl RuntimeError {
    pub fn msg(text: impl Into<String>) -> Self {
        Self::Msg(text.into())
    }
}
