pub mod batch;
pub mod code;
pub mod size_ratio;

pub use batch::{BatchHeader, CodeSource, Container, EntryFlow, EntryMode, UnitCode};
pub use code::{CodeValue, CODE_LEN};
