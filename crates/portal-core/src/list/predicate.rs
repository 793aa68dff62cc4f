use std::cmp::Ordering;

use portal_domain::{ColumnType, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coerce::sort_key;

/// A single row test. Text comparisons ignore case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RowPredicate {
    Equals {
        field: String,
        value: String,
    },
    Contains {
        field: String,
        needle: String,
    },
    OneOf {
        field: String,
        values: Vec<String>,
    },
    /// Inclusive bounds compared under the column's coercion.
    Range {
        field: String,
        column_type: ColumnType,
        #[serde(default)]
        min: Option<String>,
        #[serde(default)]
        max: Option<String>,
    },
}

impl RowPredicate {
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        RowPredicate::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        RowPredicate::Contains {
            field: field.into(),
            needle: needle.into(),
        }
    }

    pub fn one_of<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RowPredicate::OneOf {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn range(
        field: impl Into<String>,
        column_type: ColumnType,
        min: Option<String>,
        max: Option<String>,
    ) -> Self {
        RowPredicate::Range {
            field: field.into(),
            column_type,
            min,
            max,
        }
    }

    pub fn field(&self) -> &str {
        match self {
            RowPredicate::Equals { field, .. }
            | RowPredicate::Contains { field, .. }
            | RowPredicate::OneOf { field, .. }
            | RowPredicate::Range { field, .. } => field,
        }
    }

    pub fn matches(&self, row: &Row) -> bool {
        match self {
            RowPredicate::Equals { field, value } => {
                lowered(row, field) == value.to_lowercase()
            }
            RowPredicate::Contains { field, needle } => {
                lowered(row, field).contains(&needle.to_lowercase())
            }
            RowPredicate::OneOf { field, values } => {
                let actual = lowered(row, field);
                values.iter().any(|value| value.to_lowercase() == actual)
            }
            RowPredicate::Range {
                field,
                column_type,
                min,
                max,
            } => {
                let key = sort_key(row.get(field), *column_type);
                let bound = |raw: &String| sort_key(Some(&Value::String(raw.clone())), *column_type);
                let above_min = min
                    .as_ref()
                    .map_or(true, |raw| key.compare(&bound(raw)) != Ordering::Less);
                let below_max = max
                    .as_ref()
                    .map_or(true, |raw| key.compare(&bound(raw)) != Ordering::Greater);
                above_min && below_max
            }
        }
    }
}

fn lowered(row: &Row, field: &str) -> String {
    row.text(field).unwrap_or_default().to_lowercase()
}

/// Conjunction of predicates; an empty set matches every row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    predicates: Vec<RowPredicate>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, predicate: RowPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn push(&mut self, predicate: RowPredicate) {
        self.predicates.push(predicate);
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn predicates(&self) -> &[RowPredicate] {
        &self.predicates
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.predicates.iter().all(|predicate| predicate.matches(row))
    }
}

impl FromIterator<RowPredicate> for FilterSet {
    fn from_iter<I: IntoIterator<Item = RowPredicate>>(iter: I) -> Self {
        Self {
            predicates: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gift(name: &str, amount: &str, stage: &str) -> Row {
        Row::new()
            .with("Name", name)
            .with("Amount", amount)
            .with("Stage", stage)
    }

    #[test]
    fn text_predicates_ignore_case() {
        let row = gift("Spring Gala", "100", "Closed Won");
        assert!(RowPredicate::equals("Stage", "closed won").matches(&row));
        assert!(RowPredicate::contains("Name", "GALA").matches(&row));
        assert!(RowPredicate::one_of("Stage", ["Pledged", "CLOSED WON"]).matches(&row));
        assert!(!RowPredicate::equals("Missing", "x").matches(&row));
    }

    #[test]
    fn range_uses_column_coercion() {
        let predicate = RowPredicate::range(
            "Amount",
            ColumnType::Currency,
            Some("50".into()),
            Some("150".into()),
        );
        assert!(predicate.matches(&gift("a", "100", "")));
        assert!(predicate.matches(&gift("a", "150", "")));
        assert!(!predicate.matches(&gift("a", "1000", "")));
        // "abc" coerces to zero, below the minimum
        assert!(!predicate.matches(&gift("a", "abc", "")));

        let open_ended = RowPredicate::range("Close", ColumnType::Date, Some("2024-01-01".into()), None);
        assert!(open_ended.matches(&Row::new().with("Close", "2024-06-30")));
        assert!(!open_ended.matches(&Row::new().with("Close", "2023-12-31")));
    }

    #[test]
    fn filter_set_is_a_conjunction() {
        let set = FilterSet::new()
            .with(RowPredicate::contains("Name", "gala"))
            .with(RowPredicate::equals("Stage", "Pledged"));
        assert!(set.matches(&gift("Gala", "1", "Pledged")));
        assert!(!set.matches(&gift("Gala", "1", "Closed")));
        assert!(FilterSet::new().matches(&gift("x", "1", "y")));
    }
}
