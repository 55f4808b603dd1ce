//! Statement interpretation: header detection, column roles, row normalization.

pub mod classify;
pub mod header;
pub mod normalize;
pub mod rules;

pub use classify::{ColumnRole, FieldClassifier, SchemaMapping, ROLE_RULES};
pub use header::{unique_column_names, HeaderResolver, ResolvedHeader};
pub use normalize::RowNormalizer;
