
pub use strategies::*;
