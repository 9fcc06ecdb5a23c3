pub mod raw;
pub mod summary;

pub use raw::*;
pub use summary::*;
