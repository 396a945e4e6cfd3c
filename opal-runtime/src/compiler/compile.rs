use std::rc::Rc;

use crate::ast::{AstBlock, AstBody, AstDispatch, AstExpression, AstLiteral, AstMethodDef, AstSuperDispatch};
use crate::binder::{CallSite, CallSiteDescriptor, SendKindDesc};
use crate::compiler::inliner::MessageInliner;
use crate::compiler::UnwindPolicy;
use crate::universe::Universe;
use opal_core::ast::{Block, Body, Expression, Literal, Message, MethodDef};

/// Compile a parsed method definition into its executable form, in the
/// context of the named holder class.
pub fn compile_method(universe: &mut Universe, holder_name: &str, policy: UnwindPolicy, def: &MethodDef) -> AstMethodDef {
    let mut compiler = MethodCompiler {
        universe,
        holder_name: holder_name.to_string(),
        policy,
        scopes: vec![ScopeCtxt {
            kind: ScopeKind::Root,
            nbr_locals: def.nbr_locals,
        }],
        needs_home: false,
    };

    let body = compiler.compile_body(&def.body);
    let root = compiler.scopes.pop().unwrap();
    let needs_home = compiler.needs_home;

    // Under the signal policy the root body catches raised non-local
    // returns itself; a method without any has nothing to catch.
    let body = if needs_home && policy == UnwindPolicy::Signal {
        AstBody {
            exprs: vec![AstExpression::UnwindHandler(Box::new(body))],
        }
    } else {
        body
    };

    AstMethodDef {
        selector: def.selector.clone(),
        nbr_params: def.nbr_params() as u8,
        nbr_locals: root.nbr_locals as u8,
        needs_home,
        body,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ScopeKind {
    /// The method scope itself.
    Root,
    /// A true block scope: gets its own frame at runtime.
    Block,
    /// An inlined block scope: its locals were merged into the owning
    /// frame starting at `base_offset`.
    Inline { base_offset: usize },
}

#[derive(Debug)]
struct ScopeCtxt {
    kind: ScopeKind,
    /// For frame-owning scopes, the running local count, inlined-in
    /// locals included. Unused for inline scopes.
    nbr_locals: usize,
}

impl ScopeCtxt {
    fn is_inline(&self) -> bool {
        matches!(self.kind, ScopeKind::Inline { .. })
    }
}

/// Compiles one method, tracking the lexical scope stack so that source
/// coordinates survive block inlining.
pub struct MethodCompiler<'a> {
    universe: &'a mut Universe,
    holder_name: String,
    policy: UnwindPolicy,
    scopes: Vec<ScopeCtxt>,
    needs_home: bool,
}

impl MethodCompiler<'_> {
    pub(crate) fn compile_body(&mut self, body: &Body) -> AstBody {
        AstBody {
            exprs: body.exprs.iter().map(|expr| self.compile_expression(expr)).collect(),
        }
    }

    pub(crate) fn compile_expression(&mut self, expr: &Expression) -> AstExpression {
        match expr {
            Expression::GlobalRead(name) => AstExpression::GlobalRead(self.universe.intern_symbol(name)),
            Expression::ArgRead(up, idx) => {
                let (frames_back, _) = self.resolve_scope(*up);
                AstExpression::ArgRead(frames_back, *idx as u8)
            }
            Expression::LocalVarRead(idx) => self.lower_local_read(0, *idx),
            Expression::NonLocalVarRead(up, idx) => self.lower_local_read(*up, *idx),
            Expression::FieldRead(idx) => AstExpression::FieldRead(*idx as u8),
            Expression::LocalVarWrite(idx, value) => self.lower_local_write(0, *idx, value),
            Expression::NonLocalVarWrite(up, idx, value) => self.lower_local_write(*up, *idx, value),
            Expression::ArgWrite(up, idx, value) => {
                let value = Box::new(self.compile_expression(value));
                let (frames_back, _) = self.resolve_scope(*up);
                AstExpression::ArgWrite(frames_back, *idx as u8, value)
            }
            Expression::FieldWrite(idx, value) => AstExpression::FieldWrite(*idx as u8, Box::new(self.compile_expression(value))),
            Expression::Message(message) => self.compile_message(message),
            Expression::Literal(literal) => AstExpression::Literal(self.compile_literal(literal)),
            Expression::Block(block) => self.compile_block(block),
            Expression::Exit(value) => self.compile_exit(value),
        }
    }

    /// Map a source coordinate (scopes up from the current one) to a
    /// runtime coordinate: how many frames to walk back, and the offset
    /// at which the target scope's locals live in that frame.
    fn resolve_scope(&self, up: usize) -> (u8, usize) {
        let target = self.scopes.len() - 1 - up;
        let mut owner = target;
        while self.scopes[owner].is_inline() {
            owner -= 1;
        }
        let offset = match self.scopes[target].kind {
            ScopeKind::Inline { base_offset } => base_offset,
            _ => 0,
        };
        let frames_back = self.scopes[owner + 1..].iter().filter(|scope| !scope.is_inline()).count();
        (frames_back as u8, offset)
    }

    fn lower_local_read(&self, up: usize, idx: usize) -> AstExpression {
        let (frames_back, offset) = self.resolve_scope(up);
        let idx = (idx + offset) as u8;
        if frames_back == 0 {
            AstExpression::LocalVarRead(idx)
        } else {
            AstExpression::NonLocalVarRead(frames_back, idx)
        }
    }

    fn lower_local_write(&mut self, up: usize, idx: usize, value: &Expression) -> AstExpression {
        let value = Box::new(self.compile_expression(value));
        let (frames_back, offset) = self.resolve_scope(up);
        let idx = (idx + offset) as u8;
        if frames_back == 0 {
            AstExpression::LocalVarWrite(idx, value)
        } else {
            AstExpression::NonLocalVarWrite(frames_back, idx, value)
        }
    }

    /// Lower a `^`. Inside the method scope (inlined blocks included)
    /// it exits the executing activation directly; inside a true block
    /// it targets the home activation per the unwind policy.
    fn compile_exit(&mut self, value: &Expression) -> AstExpression {
        let value = Box::new(self.compile_expression(value));
        let frames_back = self.scopes.iter().filter(|scope| scope.kind == ScopeKind::Block).count() as u8;
        if frames_back == 0 {
            return AstExpression::LocalExit(value);
        }
        self.needs_home = true;
        match self.policy {
            UnwindPolicy::Lightweight => AstExpression::NonLocalExit(value, frames_back),
            UnwindPolicy::Signal => AstExpression::RaiseExit(value, frames_back),
        }
    }

    fn compile_message(&mut self, message: &Message) -> AstExpression {
        if let Some(inlined) = message.inline_if_possible(self) {
            return inlined;
        }

        let nargs = message.values.len() as u8;

        if matches!(&message.receiver, Expression::GlobalRead(name) if name == "super") {
            let site = self.make_site(CallSiteDescriptor {
                selector: message.selector.clone(),
                native_hint: None,
                nargs,
                kind: SendKindDesc::Super {
                    scope: self.holder_name.clone(),
                },
            });
            let values = message.values.iter().map(|value| self.compile_expression(value)).collect();
            return AstExpression::SuperDispatch(Box::new(AstSuperDispatch { site, values }));
        }

        let kind = if message.selector == "class" && message.values.is_empty() {
            SendKindDesc::ClassGet
        } else if matches!(message.receiver, Expression::Literal(_)) {
            SendKindDesc::Constant
        } else {
            SendKindDesc::Normal
        };

        let receiver = self.compile_expression(&message.receiver);
        let values = message.values.iter().map(|value| self.compile_expression(value)).collect();
        let site = self.make_site(CallSiteDescriptor {
            selector: message.selector.clone(),
            native_hint: None,
            nargs,
            kind,
        });
        AstExpression::Dispatch(Box::new(AstDispatch { site, receiver, values }))
    }

    fn make_site(&mut self, desc: CallSiteDescriptor) -> CallSite {
        CallSite::from_descriptor(self.universe, &desc)
    }

    fn compile_literal(&mut self, literal: &Literal) -> AstLiteral {
        match literal {
            Literal::Integer(value) => AstLiteral::Integer(*value),
            Literal::Double(value) => AstLiteral::Double(*value),
            Literal::Boolean(value) => AstLiteral::Boolean(*value),
            Literal::String(value) => AstLiteral::String(Rc::new(value.clone())),
            Literal::Symbol(value) => AstLiteral::Symbol(self.universe.intern_symbol(value)),
            Literal::Array(values) => AstLiteral::Array(Rc::new(values.iter().map(|value| self.compile_literal(value)).collect())),
            Literal::Nil => AstLiteral::Nil,
        }
    }

    fn compile_block(&mut self, block: &Block) -> AstExpression {
        self.scopes.push(ScopeCtxt {
            kind: ScopeKind::Block,
            nbr_locals: block.nbr_locals,
        });
        let body = self.compile_body(&block.body);
        let scope = self.scopes.pop().unwrap();
        AstExpression::Block(Rc::new(AstBlock {
            nbr_params: block.nbr_params as u8,
            nbr_locals: scope.nbr_locals as u8,
            body,
        }))
    }

    /// Compile an inlined block's body in the enclosing frame, merging
    /// its locals in at the owner's current local count.
    pub(crate) fn inline_block_body(&mut self, block: &Block) -> AstBody {
        let owner = self.scopes.iter().rposition(|scope| !scope.is_inline()).unwrap();
        let base_offset = self.scopes[owner].nbr_locals;
        self.scopes[owner].nbr_locals += block.nbr_locals;
        self.scopes.push(ScopeCtxt {
            kind: ScopeKind::Inline { base_offset },
            nbr_locals: block.nbr_locals,
        });
        let body = self.compile_body(&block.body);
        self.scopes.pop();
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::InlinedNode;

    fn block(nbr_params: usize, nbr_locals: usize, exprs: Vec<Expression>) -> Expression {
        Expression::Block(Box::new(Block {
            nbr_params,
            nbr_locals,
            body: Body { exprs },
        }))
    }

    fn compile(policy: UnwindPolicy, def: &MethodDef) -> AstMethodDef {
        let mut universe = Universe::new(policy);
        compile_method(&mut universe, "Thing", policy, def)
    }

    #[test]
    fn method_without_blocks_needs_no_home() {
        let def = MethodDef {
            selector: "answer".to_string(),
            nbr_locals: 0,
            body: Body {
                exprs: vec![Expression::Exit(Box::new(Expression::Literal(Literal::Integer(42))))],
            },
        };
        let compiled = compile(UnwindPolicy::Lightweight, &def);
        assert!(!compiled.needs_home);
        assert_eq!(
            compiled.body.exprs[0],
            AstExpression::LocalExit(Box::new(AstExpression::Literal(AstLiteral::Integer(42))))
        );
    }

    #[test]
    fn block_without_exit_needs_no_home() {
        let def = MethodDef {
            selector: "run".to_string(),
            nbr_locals: 0,
            body: Body {
                exprs: vec![block(0, 0, vec![Expression::Literal(Literal::Integer(1))])],
            },
        };
        let compiled = compile(UnwindPolicy::Lightweight, &def);
        assert!(!compiled.needs_home);
    }

    #[test]
    fn exit_in_block_lowers_to_non_local_exit() {
        let def = MethodDef {
            selector: "run".to_string(),
            nbr_locals: 0,
            body: Body {
                exprs: vec![block(
                    0,
                    0,
                    vec![Expression::Exit(Box::new(Expression::Literal(Literal::Nil)))],
                )],
            },
        };
        let compiled = compile(UnwindPolicy::Lightweight, &def);
        assert!(compiled.needs_home);
        let AstExpression::Block(ast_block) = &compiled.body.exprs[0] else {
            panic!("expected a block literal");
        };
        assert_eq!(
            ast_block.body.exprs[0],
            AstExpression::NonLocalExit(Box::new(AstExpression::Literal(AstLiteral::Nil)), 1)
        );
    }

    #[test]
    fn signal_policy_raises_and_wraps_the_root_body() {
        let def = MethodDef {
            selector: "run".to_string(),
            nbr_locals: 0,
            body: Body {
                exprs: vec![block(
                    0,
                    0,
                    vec![Expression::Exit(Box::new(Expression::Literal(Literal::Nil)))],
                )],
            },
        };
        let compiled = compile(UnwindPolicy::Signal, &def);
        assert!(compiled.needs_home);
        let AstExpression::UnwindHandler(inner) = &compiled.body.exprs[0] else {
            panic!("expected the root body to be wrapped in an unwind handler");
        };
        let AstExpression::Block(ast_block) = &inner.exprs[0] else {
            panic!("expected a block literal");
        };
        assert!(matches!(ast_block.body.exprs[0], AstExpression::RaiseExit(_, 1)));
    }

    #[test]
    fn if_true_with_literal_block_is_inlined() {
        let def = MethodDef {
            selector: "run".to_string(),
            nbr_locals: 1,
            body: Body {
                exprs: vec![Expression::Message(Box::new(Message {
                    receiver: Expression::Literal(Literal::Boolean(true)),
                    selector: "ifTrue:".to_string(),
                    values: vec![block(0, 1, vec![Expression::LocalVarRead(0)])],
                }))],
            },
        };
        let compiled = compile(UnwindPolicy::Lightweight, &def);
        // The block's local merges in after the method's own.
        assert_eq!(compiled.nbr_locals, 2);
        let AstExpression::InlinedCall(node) = &compiled.body.exprs[0] else {
            panic!("expected an inlined call");
        };
        let InlinedNode::If(node) = node.as_ref() else {
            panic!("expected an if node");
        };
        assert!(node.expected_bool);
        assert_eq!(node.body_instrs.exprs[0], AstExpression::LocalVarRead(1));
    }

    #[test]
    fn if_true_with_non_block_argument_stays_a_dispatch() {
        let def = MethodDef {
            selector: "run".to_string(),
            nbr_locals: 0,
            body: Body {
                exprs: vec![Expression::Message(Box::new(Message {
                    receiver: Expression::Literal(Literal::Boolean(true)),
                    selector: "ifTrue:".to_string(),
                    values: vec![Expression::GlobalRead("thunk".to_string())],
                }))],
            },
        };
        let compiled = compile(UnwindPolicy::Lightweight, &def);
        assert!(matches!(compiled.body.exprs[0], AstExpression::Dispatch(_)));
    }

    #[test]
    fn outer_variable_reads_from_an_inlined_block_keep_their_frame() {
        // A true block whose inlined ifTrue: body reads a method local:
        // the read still crosses exactly one frame.
        let def = MethodDef {
            selector: "run".to_string(),
            nbr_locals: 1,
            body: Body {
                exprs: vec![block(
                    0,
                    0,
                    vec![Expression::Message(Box::new(Message {
                        receiver: Expression::Literal(Literal::Boolean(true)),
                        selector: "ifTrue:".to_string(),
                        values: vec![block(0, 0, vec![Expression::NonLocalVarRead(2, 0)])],
                    }))],
                )],
            },
        };
        let compiled = compile(UnwindPolicy::Lightweight, &def);
        let AstExpression::Block(ast_block) = &compiled.body.exprs[0] else {
            panic!("expected a block literal");
        };
        let AstExpression::InlinedCall(node) = &ast_block.body.exprs[0] else {
            panic!("expected an inlined call");
        };
        let InlinedNode::If(node) = node.as_ref() else {
            panic!("expected an if node");
        };
        assert_eq!(node.body_instrs.exprs[0], AstExpression::NonLocalVarRead(1, 0));
    }

    #[test]
    fn while_with_literal_blocks_is_inlined() {
        let def = MethodDef {
            selector: "run".to_string(),
            nbr_locals: 0,
            body: Body {
                exprs: vec![Expression::Message(Box::new(Message {
                    receiver: block(0, 0, vec![Expression::Literal(Literal::Boolean(false))]),
                    selector: "whileTrue:".to_string(),
                    values: vec![block(0, 0, vec![Expression::Literal(Literal::Nil)])],
                }))],
            },
        };
        let compiled = compile(UnwindPolicy::Lightweight, &def);
        let AstExpression::InlinedCall(node) = &compiled.body.exprs[0] else {
            panic!("expected an inlined call");
        };
        assert!(matches!(node.as_ref(), InlinedNode::While(node) if node.expected_bool));
    }

    #[test]
    fn class_selector_compiles_to_a_class_get_site() {
        let def = MethodDef {
            selector: "run".to_string(),
            nbr_locals: 0,
            body: Body {
                exprs: vec![Expression::Message(Box::new(Message {
                    receiver: Expression::ArgRead(0, 0),
                    selector: "class".to_string(),
                    values: vec![],
                }))],
            },
        };
        let compiled = compile(UnwindPolicy::Lightweight, &def);
        let AstExpression::Dispatch(dispatch) = &compiled.body.exprs[0] else {
            panic!("expected a dispatch");
        };
        assert_eq!(dispatch.site.binder.kind, crate::binder::SendKind::ClassGet);
    }
}
