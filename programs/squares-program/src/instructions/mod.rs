pub mod claim;
pub mod initialize;
pub mod numbers;
pub mod pool_controls;
pub mod score;
pub mod session;

pub use claim::*;
pub use initialize::*;
pub use numbers::*;
pub use pool_controls::*;
pub use score::*;
pub use session::*;
