//! Built-in predicate handlers.
//!
//! Each handler knows how to turn one shape of search value into SQL for its
//! family of column types.

mod date;
mod equality;
mod number;
mod select;
mod string;

pub use date::{CalendarDateHandler, DateHandler};
pub use equality::{BooleanHandler, ExactHandler};
pub use number::{NUMERIC_COMPARATORS, NumberHandler};
pub use select::SelectHandler;
pub use string::{STRING_COMPARATORS, StringHandler, apply_pattern};
