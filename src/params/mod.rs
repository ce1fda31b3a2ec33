pub mod param_map;
pub use param_map::*;

pub mod placeholder;
pub use placeholder::*;
