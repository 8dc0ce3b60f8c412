pub mod protocol;
pub mod catalog;
pub mod token;
pub mod status;

pub use protocol::*;
pub use catalog::*;
pub use token::*;
pub use status::*;
