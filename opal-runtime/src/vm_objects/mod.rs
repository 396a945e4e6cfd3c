pub mod block;
pub mod class;
pub mod frame;
pub mod instance;
pub mod method;
pub mod pool;
