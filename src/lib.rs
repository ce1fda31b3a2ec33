pub mod composer;
pub use composer::{
    ClauseKind, ComposerError, ComposerResult, Condition, JoinKind, Limit, Operation, QueryComposer, QueryNode,
};

pub mod database;
pub use database::{ComposerConfig, Connection, Detached, FetchMode, Quote};

pub mod params;
pub use params::{ParamMap, Substitution, SubstitutionObserver};

pub use serde_json;
