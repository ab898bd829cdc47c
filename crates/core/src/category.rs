use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub i64);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Expense,
    Income,
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKind::Expense => write!(f, "expense"),
            CategoryKind::Income => write!(f, "income"),
        }
    }
}

impl FromStr for CategoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "expense" => Ok(CategoryKind::Expense),
            "income" => Ok(CategoryKind::Income),
            other => Err(format!("Unknown category kind: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub kind: CategoryKind,
}

/// User-defined mapping from a lower-cased substring to a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub id: Option<i64>,
    pub pattern: String,
    pub category_id: CategoryId,
    /// Higher runs first.
    pub priority: i32,
    pub is_active: bool,
}

impl CategoryRule {
    pub fn new(pattern: &str, category_id: CategoryId, priority: i32) -> Self {
        CategoryRule {
            id: None,
            pattern: pattern.to_string(),
            category_id,
            priority,
            is_active: true,
        }
    }
}

/// Categories seeded into a fresh ledger.
pub const DEFAULT_CATEGORIES: &[(&str, CategoryKind)] = &[
    ("Food & Dining", CategoryKind::Expense),
    ("Groceries", CategoryKind::Expense),
    ("Transport", CategoryKind::Expense),
    ("Fuel", CategoryKind::Expense),
    ("Shopping", CategoryKind::Expense),
    ("Entertainment", CategoryKind::Expense),
    ("Bills & Utilities", CategoryKind::Expense),
    ("Healthcare", CategoryKind::Expense),
    ("Education", CategoryKind::Expense),
    ("Personal Care", CategoryKind::Expense),
    ("Home", CategoryKind::Expense),
    ("Travel", CategoryKind::Expense),
    ("Subscriptions", CategoryKind::Expense),
    ("Gifts", CategoryKind::Expense),
    ("Other Expense", CategoryKind::Expense),
    ("Salary", CategoryKind::Income),
    ("Business", CategoryKind::Income),
    ("Investment", CategoryKind::Income),
    ("Freelance", CategoryKind::Income),
    ("Refund", CategoryKind::Income),
    ("Other Income", CategoryKind::Income),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_category_names_are_unique() {
        let mut names: Vec<&str> = DEFAULT_CATEGORIES.iter().map(|(n, _)| *n).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), DEFAULT_CATEGORIES.len());
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("Income".parse::<CategoryKind>().unwrap(), CategoryKind::Income);
        assert!("asset".parse::<CategoryKind>().is_err());
    }
}
