pub mod clause;
pub use clause::*;

pub mod join_kind;
pub use join_kind::*;

pub mod composer_error;
pub use composer_error::*;

pub mod query_node;
pub use query_node::*;

pub mod query_composer;
pub use query_composer::*;

pub mod operation;
pub use operation::*;
