//! Built-in passes.

mod peephole;
mod translation;

pub use peephole::PeepholeOptimization;
pub use translation::BasisTranslation;
