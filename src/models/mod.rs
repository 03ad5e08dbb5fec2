pub mod summary;
pub mod trade;

pub use summary::*;
pub use trade::*;
