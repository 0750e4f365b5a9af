pub mod color;
pub mod enums;
pub mod test_result;

pub use color::*;
pub use enums::*;
pub use test_result::*;
