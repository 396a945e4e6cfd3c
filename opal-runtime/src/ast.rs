use std::rc::Rc;

use crate::binder::CallSite;
use opal_core::interner::Interned;

/// A lowered sequence of expressions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AstBody {
    pub exprs: Vec<AstExpression>,
}

/// A lowered expression, as executed by the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum AstExpression {
    GlobalRead(Interned),
    LocalVarRead(u8),
    NonLocalVarRead(u8, u8),
    ArgRead(u8, u8),
    FieldRead(u8),
    LocalVarWrite(u8, Box<AstExpression>),
    NonLocalVarWrite(u8, u8, Box<AstExpression>),
    ArgWrite(u8, u8, Box<AstExpression>),
    FieldWrite(u8, Box<AstExpression>),
    Literal(AstLiteral),
    Block(Rc<AstBlock>),
    /// A `^` targeting the executing method activation itself.
    LocalExit(Box<AstExpression>),
    /// A `^` in a true block under the lightweight unwind policy: tags the
    /// value with the home context found `scope` lexical frames up.
    NonLocalExit(Box<AstExpression>, u8),
    /// A `^` in a true block under the signal unwind policy: raises the
    /// tagged value instead of returning it.
    RaiseExit(Box<AstExpression>, u8),
    /// The handler a root context wraps its body in under the signal
    /// policy: catches a raised non-local return, unwraps it if the
    /// identity tag matches this activation's home, re-raises otherwise.
    UnwindHandler(Box<AstBody>),
    /// A message send through a binder-backed call site.
    Dispatch(Box<AstDispatch>),
    /// A super send: the receiver is always the current self.
    SuperDispatch(Box<AstSuperDispatch>),
    /// A call to an inlined control construct (no dispatch).
    InlinedCall(Box<InlinedNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AstDispatch {
    pub site: CallSite,
    pub receiver: AstExpression,
    pub values: Vec<AstExpression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AstSuperDispatch {
    pub site: CallSite,
    pub values: Vec<AstExpression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AstLiteral {
    Integer(i64),
    Double(f64),
    Boolean(bool),
    String(Rc<String>),
    Symbol(Interned),
    Array(Rc<Vec<AstLiteral>>),
    Nil,
}

/// A lowered block body. `nbr_locals` includes locals merged in from
/// inlined control constructs.
#[derive(Debug, Clone, PartialEq)]
pub struct AstBlock {
    pub nbr_params: u8,
    pub nbr_locals: u8,
    pub body: AstBody,
}

/// A lowered method body.
#[derive(Debug, Clone, PartialEq)]
pub struct AstMethodDef {
    /// The method's selector (eg. `increment`, `at:put:` or `==`).
    pub selector: String,
    pub nbr_params: u8,
    pub nbr_locals: u8,
    /// Whether activations of this method materialize a home context:
    /// true only if a `^` occurs inside a true block in the body.
    pub needs_home: bool,
    pub body: AstBody,
}

/// An inlined control construct. The bodies run in the enclosing frame;
/// no block value is created and no dispatch happens.
#[derive(Debug, Clone, PartialEq)]
pub enum InlinedNode {
    If(IfInlinedNode),
    IfTrueIfFalse(IfTrueIfFalseInlinedNode),
    While(WhileInlinedNode),
    And(AndInlinedNode),
    Or(OrInlinedNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfInlinedNode {
    pub expected_bool: bool,
    pub cond_expr: AstExpression,
    pub body_instrs: AstBody,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfTrueIfFalseInlinedNode {
    pub expected_bool: bool,
    pub cond_expr: AstExpression,
    pub body_1_instrs: AstBody,
    pub body_2_instrs: AstBody,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileInlinedNode {
    pub expected_bool: bool,
    pub cond_instrs: AstBody,
    pub body_instrs: AstBody,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AndInlinedNode {
    pub first: AstExpression,
    pub second_instrs: AstBody,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrInlinedNode {
    pub first: AstExpression,
    pub second_instrs: AstBody,
}
