use static_assertions::assert_eq_size;

/// A sequence of expressions, evaluated in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Body {
    pub exprs: Vec<Expression>,
}

/// An expression, as produced by the parser front end.
///
/// Variable accesses are already resolved to `(scope, index)` coordinates,
/// where scope counts lexical block nestings upward (0 is the current
/// scope) and argument 0 of a method scope is `self`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A read of a global binding, by name.
    GlobalRead(String),
    /// A read of an argument, as (scope, index).
    ArgRead(usize, usize),
    /// A read of a local variable in the current scope.
    LocalVarRead(usize),
    /// A read of a local variable in an enclosing scope, as (scope, index).
    NonLocalVarRead(usize, usize),
    /// A read of a field of `self`.
    FieldRead(usize),
    /// A write to a local variable in the current scope.
    LocalVarWrite(usize, Box<Expression>),
    /// A write to a local variable in an enclosing scope.
    NonLocalVarWrite(usize, usize, Box<Expression>),
    /// A write to an argument, as (scope, index).
    ArgWrite(usize, usize, Box<Expression>),
    /// A write to a field of `self`.
    FieldWrite(usize, Box<Expression>),
    /// A message send.
    Message(Box<Message>),
    /// A literal value.
    Literal(Literal),
    /// A block literal.
    Block(Box<Block>),
    /// A `^` return. It always targets the lexically enclosing method
    /// activation; how far that is from the executing scope is for the
    /// compiler to work out.
    Exit(Box<Expression>),
}

/// A message send: a receiver, a selector and zero or more arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub receiver: Expression,
    pub selector: String,
    pub values: Vec<Expression>,
}

/// A block literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub nbr_params: usize,
    pub nbr_locals: usize,
    pub body: Body,
}

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Double(f64),
    Boolean(bool),
    String(String),
    Symbol(String),
    Array(Vec<Literal>),
    Nil,
}

/// A method definition, before compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDef {
    /// The method's selector (eg. `increment`, `at:put:` or `==`).
    pub selector: String,
    /// Number of declared local variables.
    pub nbr_locals: usize,
    /// The method's body.
    pub body: Body,
}

impl MethodDef {
    /// The number of arguments implied by the selector (`:` count for
    /// keyword selectors, 1 for binary operator selectors, 0 otherwise).
    pub fn nbr_params(&self) -> usize {
        let colons = self.selector.chars().filter(|c| *c == ':').count();
        if colons != 0 {
            colons
        } else if self.selector.chars().all(|c| !c.is_alphanumeric()) {
            1
        } else {
            0
        }
    }
}

assert_eq_size!(Expression, [usize; 4]);
