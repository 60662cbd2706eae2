pub mod engine;
pub mod export;
pub mod ranking;

pub use engine::*;
pub use export::*;
pub use ranking::*;
