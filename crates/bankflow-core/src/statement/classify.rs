//! Column role inference from header names.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Semantic role of a statement column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Date,
    Narration,
    Party,
    Debit,
    Credit,
    Amount,
    Unknown,
}

impl ColumnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnRole::Date => "date",
            ColumnRole::Narration => "narration",
            ColumnRole::Party => "party",
            ColumnRole::Debit => "debit",
            ColumnRole::Credit => "credit",
            ColumnRole::Amount => "amount",
            ColumnRole::Unknown => "unknown",
        }
    }
}

/// Role keyword groups in precedence order. The first group with a keyword
/// contained in the lower-cased column name decides the role.
///
/// Narration sits above Credit because "description" contains "cr".
/// Debit and Credit sit above Amount so "Debit Amount" is a debit column.
pub const ROLE_RULES: &[(ColumnRole, &[&str])] = &[
    (ColumnRole::Date, &["date"]),
    (ColumnRole::Narration, &["particular", "narration", "description"]),
    (ColumnRole::Party, &["party", "name"]),
    (ColumnRole::Debit, &["debit", "dr", "withdrawal"]),
    (ColumnRole::Credit, &["credit", "cr", "deposit"]),
    (ColumnRole::Amount, &["amount"]),
];

/// Column index to role mapping, derived once per table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaMapping {
    columns: Vec<String>,
    roles: Vec<ColumnRole>,
}

impl SchemaMapping {
    /// Column names the mapping was derived from.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Roles by column index.
    pub fn roles(&self) -> &[ColumnRole] {
        &self.roles
    }

    /// Role of a column; out-of-range columns are unknown.
    pub fn role(&self, index: usize) -> ColumnRole {
        self.roles.get(index).copied().unwrap_or(ColumnRole::Unknown)
    }

    /// Indices of all columns with the given role, in column order.
    pub fn columns_with(&self, role: ColumnRole) -> Vec<usize> {
        self.roles
            .iter()
            .enumerate()
            .filter(|(_, r)| **r == role)
            .map(|(i, _)| i)
            .collect()
    }

    /// Check if any column has the given role.
    pub fn has_role(&self, role: ColumnRole) -> bool {
        self.roles.contains(&role)
    }

    /// Check if at least one column can carry an amount.
    pub fn has_amount_columns(&self) -> bool {
        self.roles
            .iter()
            .any(|r| matches!(r, ColumnRole::Debit | ColumnRole::Credit | ColumnRole::Amount))
    }
}

/// Substring-based column classifier.
pub struct FieldClassifier;

impl FieldClassifier {
    /// Classify a single column name.
    pub fn classify_column(name: &str) -> ColumnRole {
        let name = name.to_lowercase();
        ROLE_RULES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|kw| name.contains(kw)))
            .map(|(role, _)| *role)
            .unwrap_or(ColumnRole::Unknown)
    }

    /// Classify every column of a header.
    pub fn classify<S: AsRef<str>>(column_names: &[S]) -> SchemaMapping {
        let columns: Vec<String> = column_names.iter().map(|c| c.as_ref().to_string()).collect();
        let roles: Vec<ColumnRole> = columns.iter().map(|c| Self::classify_column(c)).collect();

        debug!(
            "Column roles: {}",
            columns
                .iter()
                .zip(&roles)
                .map(|(c, r)| format!("{}={}", c, r.as_str()))
                .collect::<Vec<_>>()
                .join(", ")
        );

        SchemaMapping { columns, roles }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_basic_roles() {
        assert_eq!(FieldClassifier::classify_column("Txn Date"), ColumnRole::Date);
        assert_eq!(FieldClassifier::classify_column("Particulars"), ColumnRole::Narration);
        assert_eq!(FieldClassifier::classify_column("NARRATION"), ColumnRole::Narration);
        assert_eq!(FieldClassifier::classify_column("Party Name"), ColumnRole::Party);
        assert_eq!(FieldClassifier::classify_column("Withdrawal Amt."), ColumnRole::Debit);
        assert_eq!(FieldClassifier::classify_column("Deposit Amt."), ColumnRole::Credit);
        assert_eq!(FieldClassifier::classify_column("Amount"), ColumnRole::Amount);
        assert_eq!(FieldClassifier::classify_column("Balance"), ColumnRole::Unknown);
        assert_eq!(FieldClassifier::classify_column("Chq./Ref.No."), ColumnRole::Unknown);
    }

    #[test]
    fn test_debit_credit_beat_amount() {
        assert_eq!(FieldClassifier::classify_column("Debit Amount"), ColumnRole::Debit);
        assert_eq!(FieldClassifier::classify_column("Credit Amount"), ColumnRole::Credit);
        assert_eq!(FieldClassifier::classify_column("Amount (Dr)"), ColumnRole::Debit);
    }

    #[test]
    fn test_description_is_not_credit() {
        assert_eq!(FieldClassifier::classify_column("Description"), ColumnRole::Narration);
    }

    #[test]
    fn test_suffixed_duplicates_keep_role() {
        assert_eq!(FieldClassifier::classify_column("Debit_2"), ColumnRole::Debit);
    }

    #[test]
    fn test_schema_mapping() {
        let mapping = FieldClassifier::classify(&["Date", "Narration", "Debit", "Credit", "Balance"]);
        assert_eq!(
            mapping.roles(),
            &[
                ColumnRole::Date,
                ColumnRole::Narration,
                ColumnRole::Debit,
                ColumnRole::Credit,
                ColumnRole::Unknown,
            ]
        );
        assert_eq!(mapping.role(10), ColumnRole::Unknown);
        assert_eq!(mapping.columns_with(ColumnRole::Debit), vec![2]);
        assert!(mapping.has_amount_columns());
        assert!(!mapping.has_role(ColumnRole::Party));
    }
}
