use crate::ast::{
    AndInlinedNode, AstExpression, IfInlinedNode, IfTrueIfFalseInlinedNode, InlinedNode, OrInlinedNode, WhileInlinedNode,
};
use crate::compiler::MethodCompiler;
use opal_core::ast::{Block, Expression, Message};

/// Inlining of the control-flow selectors.
///
/// A send is only inlined when every block involved is a zero-parameter
/// literal; any other shape goes through normal dispatch and gets the
/// library definition of the selector.
pub trait MessageInliner {
    fn inline_if_possible(&self, compiler: &mut MethodCompiler) -> Option<AstExpression>;
    fn inline_if(&self, compiler: &mut MethodCompiler, expected_bool: bool) -> Option<AstExpression>;
    fn inline_if_true_if_false(&self, compiler: &mut MethodCompiler, expected_bool: bool) -> Option<AstExpression>;
    fn inline_while(&self, compiler: &mut MethodCompiler, expected_bool: bool) -> Option<AstExpression>;
    fn inline_and_or(&self, compiler: &mut MethodCompiler, is_and: bool) -> Option<AstExpression>;
}

fn as_inlinable_block(expr: &Expression) -> Option<&Block> {
    match expr {
        Expression::Block(block) if block.nbr_params == 0 => Some(block),
        _ => None,
    }
}

impl MessageInliner for Message {
    fn inline_if_possible(&self, compiler: &mut MethodCompiler) -> Option<AstExpression> {
        match self.selector.as_str() {
            "ifTrue:" => self.inline_if(compiler, true),
            "ifFalse:" => self.inline_if(compiler, false),
            "ifTrue:ifFalse:" => self.inline_if_true_if_false(compiler, true),
            "ifFalse:ifTrue:" => self.inline_if_true_if_false(compiler, false),
            "whileTrue:" => self.inline_while(compiler, true),
            "whileFalse:" => self.inline_while(compiler, false),
            "and:" => self.inline_and_or(compiler, true),
            "or:" => self.inline_and_or(compiler, false),
            _ => None,
        }
    }

    fn inline_if(&self, compiler: &mut MethodCompiler, expected_bool: bool) -> Option<AstExpression> {
        let block = as_inlinable_block(self.values.first()?)?;
        let cond_expr = compiler.compile_expression(&self.receiver);
        let body_instrs = compiler.inline_block_body(block);
        Some(AstExpression::InlinedCall(Box::new(InlinedNode::If(IfInlinedNode {
            expected_bool,
            cond_expr,
            body_instrs,
        }))))
    }

    fn inline_if_true_if_false(&self, compiler: &mut MethodCompiler, expected_bool: bool) -> Option<AstExpression> {
        let block_1 = as_inlinable_block(self.values.first()?)?;
        let block_2 = as_inlinable_block(self.values.get(1)?)?;
        let cond_expr = compiler.compile_expression(&self.receiver);
        let body_1_instrs = compiler.inline_block_body(block_1);
        let body_2_instrs = compiler.inline_block_body(block_2);
        Some(AstExpression::InlinedCall(Box::new(InlinedNode::IfTrueIfFalse(
            IfTrueIfFalseInlinedNode {
                expected_bool,
                cond_expr,
                body_1_instrs,
                body_2_instrs,
            },
        ))))
    }

    fn inline_while(&self, compiler: &mut MethodCompiler, expected_bool: bool) -> Option<AstExpression> {
        let cond_block = as_inlinable_block(&self.receiver)?;
        let body_block = as_inlinable_block(self.values.first()?)?;
        let cond_instrs = compiler.inline_block_body(cond_block);
        let body_instrs = compiler.inline_block_body(body_block);
        Some(AstExpression::InlinedCall(Box::new(InlinedNode::While(WhileInlinedNode {
            expected_bool,
            cond_instrs,
            body_instrs,
        }))))
    }

    fn inline_and_or(&self, compiler: &mut MethodCompiler, is_and: bool) -> Option<AstExpression> {
        let block = as_inlinable_block(self.values.first()?)?;
        let first = compiler.compile_expression(&self.receiver);
        let second_instrs = compiler.inline_block_body(block);
        let node = if is_and {
            InlinedNode::And(AndInlinedNode { first, second_instrs })
        } else {
            InlinedNode::Or(OrInlinedNode { first, second_instrs })
        };
        Some(AstExpression::InlinedCall(Box::new(node)))
    }
}
