use std::fmt;
use std::rc::Rc;

use crate::ast::AstBlock;
use crate::universe::Universe;
use crate::vm_objects::class::Class;
use crate::vm_objects::frame::Frame;
use crate::ObjRef;

/// Represents an executable block: a lowered block body together with the
/// activation it was created in.
#[derive(Clone)]
pub struct Block {
    /// Block definition from the lowered tree.
    pub ast: Rc<AstBlock>,
    /// Reference to the captured stack frame.
    pub frame: ObjRef<Frame>,
}

impl Block {
    /// Get the block's class.
    pub fn class(&self, universe: &Universe) -> ObjRef<Class> {
        universe.core.block_class.clone()
    }

    /// Retrieve the number of parameters this block accepts.
    pub fn nbr_params(&self) -> u8 {
        self.ast.nbr_params
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Block").field("nbr_params", &self.ast.nbr_params).finish()
    }
}
