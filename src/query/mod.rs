pub mod compiler;
pub mod filters;
pub mod flatten;
pub mod node;

pub use compiler::QueryCompiler;
pub use flatten::{flatten_fields, FieldMap, FlatValue};
pub use node::{BoolOp, Predicate, QueryNode};
