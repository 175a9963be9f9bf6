//! Search condition compilation.
//!
//! - [`ColumnTypeRegistry`] - picks the compilation rules for a column
//! - [`PredicateCompiler`] - turns submitted values into predicates
//! - [`ConditionAggregator`] - merges conditions from every source
//! - [`SearchSessionStore`] - remembers submitted values between requests

mod compiler;
mod conditions;
pub mod handlers;
mod registry;
mod session;

pub use compiler::{PredicateCompiler, tokenize};
pub use conditions::{ConditionAggregator, ConditionSet, ConditionSource};
pub use registry::{BuiltinHandler, ColumnTypeRegistry, HandlerFn, Resolved};
pub use session::{InMemorySearchSession, SearchSessionStore};
