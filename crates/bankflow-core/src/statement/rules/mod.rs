//! Rule-based cell parsers for statement rows.

pub mod amounts;
pub mod dates;
pub mod patterns;

pub use amounts::parse_amount;
pub use dates::{parse_date_or, parse_day_first};
