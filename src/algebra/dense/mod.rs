mod cholesky;
mod core;
mod decomposition;
mod lu;

pub use self::core::*;
pub use cholesky::*;
pub use decomposition::*;
pub use lu::*;
