pub mod block;
pub mod question;
pub mod record;

pub use block::*;
pub use question::*;
pub use record::*;

/// Option letters in display order.
pub const OPTION_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

pub const FORMAT_VERSION: &str = "2.0";
