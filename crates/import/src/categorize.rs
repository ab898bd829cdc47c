use regex::Regex;
use smsledger_core::{Category, CategoryId, CategoryRule};

/// Merchant keywords that imply a category, resolved against the live
/// category list by name. Checked in order; the first hit wins.
const BUILTIN_KEYWORDS: &[(&str, &str)] = &[
    ("swiggy", "Food & Dining"),
    ("zomato", "Food & Dining"),
    ("dominos", "Food & Dining"),
    ("domino's", "Food & Dining"),
    ("mcdonalds", "Food & Dining"),
    ("mcdonald's", "Food & Dining"),
    ("starbucks", "Food & Dining"),
    ("cafe", "Food & Dining"),
    ("restaurant", "Food & Dining"),
    ("food", "Food & Dining"),
    ("bigbasket", "Groceries"),
    ("blinkit", "Groceries"),
    ("zepto", "Groceries"),
    ("dmart", "Groceries"),
    ("reliance fresh", "Groceries"),
    ("uber", "Transport"),
    ("ola", "Transport"),
    ("rapido", "Transport"),
    ("metro", "Transport"),
    ("petrol", "Fuel"),
    ("iocl", "Fuel"),
    ("bpcl", "Fuel"),
    ("hpcl", "Fuel"),
    ("indian oil", "Fuel"),
    ("bharat petroleum", "Fuel"),
    ("amazon", "Shopping"),
    ("flipkart", "Shopping"),
    ("myntra", "Shopping"),
    ("ajio", "Shopping"),
    ("nykaa", "Shopping"),
    ("netflix", "Subscriptions"),
    ("hotstar", "Subscriptions"),
    ("prime", "Subscriptions"),
    ("spotify", "Subscriptions"),
    ("youtube", "Subscriptions"),
    ("bookmyshow", "Entertainment"),
    ("pvr", "Entertainment"),
    ("inox", "Entertainment"),
    ("electricity", "Bills & Utilities"),
    ("water", "Bills & Utilities"),
    ("gas", "Bills & Utilities"),
    ("airtel", "Bills & Utilities"),
    ("jio", "Bills & Utilities"),
    ("vodafone", "Bills & Utilities"),
    ("pharmacy", "Healthcare"),
    ("apollo", "Healthcare"),
    ("pharmeasy", "Healthcare"),
    ("netmeds", "Healthcare"),
    ("1mg", "Healthcare"),
    ("hospital", "Healthcare"),
    ("clinic", "Healthcare"),
    ("udemy", "Education"),
    ("coursera", "Education"),
    ("school", "Education"),
    ("college", "Education"),
    ("university", "Education"),
];

/// A built-in keyword whose category exists in the live list.
struct BuiltinRule {
    matcher: Regex,
    category_id: CategoryId,
}

/// Assigns categories from user rules first, then the built-in keyword map.
///
/// User rule patterns are lower-cased substrings; built-in keywords match
/// whole words so `ola` does not claim `Coca-Cola`.
pub struct AutoCategorizer {
    rules: Vec<CategoryRule>,
    builtin: Vec<BuiltinRule>,
}

impl AutoCategorizer {
    pub fn new(rules: Vec<CategoryRule>, categories: &[Category]) -> Self {
        let mut rules: Vec<CategoryRule> = rules
            .into_iter()
            .filter(|r| r.is_active && !r.pattern.trim().is_empty())
            .map(|mut r| {
                r.pattern = r.pattern.to_lowercase();
                r
            })
            .collect();
        // Highest priority first; equal priorities keep load order.
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));

        let builtin = BUILTIN_KEYWORDS
            .iter()
            .filter_map(|(keyword, name)| {
                let category = categories
                    .iter()
                    .find(|c| c.name.eq_ignore_ascii_case(name))?;
                let matcher =
                    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(keyword))).ok()?;
                Some(BuiltinRule {
                    matcher,
                    category_id: category.id,
                })
            })
            .collect();

        Self { rules, builtin }
    }

    /// Rules only, no built-in map.
    pub fn without_builtin(rules: Vec<CategoryRule>) -> Self {
        let mut categorizer = Self::new(rules, &[]);
        categorizer.builtin.clear();
        categorizer
    }

    pub fn find_matching_rule(&self, search_text: &str) -> Option<&CategoryRule> {
        let text = search_text.to_lowercase();
        self.rules.iter().find(|r| text.contains(&r.pattern))
    }

    /// Category for a parsed transaction, or `None` to leave it uncategorized.
    pub fn categorize(&self, merchant: Option<&str>, raw_body: &str) -> Option<CategoryId> {
        if merchant.is_none() && raw_body.is_empty() {
            return None;
        }
        let search_text = format!("{} {}", merchant.unwrap_or_default(), raw_body);

        if let Some(rule) = self.find_matching_rule(&search_text) {
            return Some(rule.category_id);
        }
        self.builtin
            .iter()
            .find(|b| b.matcher.is_match(&search_text))
            .map(|b| b.category_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smsledger_core::{CategoryKind, DEFAULT_CATEGORIES};

    fn categories() -> Vec<Category> {
        DEFAULT_CATEGORIES
            .iter()
            .enumerate()
            .map(|(i, (name, kind))| Category {
                id: CategoryId(i as i64 + 1),
                name: name.to_string(),
                kind: *kind,
            })
            .collect()
    }

    fn id_of(name: &str) -> CategoryId {
        categories().into_iter().find(|c| c.name == name).unwrap().id
    }

    #[test]
    fn user_rule_beats_builtin() {
        let rules = vec![CategoryRule::new("swiggy", id_of("Other Expense"), 1)];
        let categorizer = AutoCategorizer::new(rules, &categories());
        assert_eq!(
            categorizer.categorize(Some("Swiggy"), "Rs 250 debited"),
            Some(id_of("Other Expense"))
        );
    }

    #[test]
    fn priority_ordering_highest_wins() {
        let rules = vec![
            CategoryRule::new("amazon", id_of("Shopping"), 1),
            CategoryRule::new("amazon", id_of("Gifts"), 10),
        ];
        let categorizer = AutoCategorizer::new(rules, &categories());
        assert_eq!(categorizer.categorize(Some("Amazon"), ""), Some(id_of("Gifts")));
    }

    #[test]
    fn user_rules_match_substrings_case_insensitively() {
        let rules = vec![CategoryRule::new("Tea Stall", id_of("Food & Dining"), 0)];
        let categorizer = AutoCategorizer::without_builtin(rules);
        assert_eq!(
            categorizer.categorize(None, "Rs 20 paid at MY TEA STALLS"),
            Some(id_of("Food & Dining"))
        );
    }

    #[test]
    fn inactive_rules_are_ignored() {
        let mut rule = CategoryRule::new("uber", id_of("Travel"), 5);
        rule.is_active = false;
        let categorizer = AutoCategorizer::new(vec![rule], &categories());
        assert_eq!(categorizer.categorize(Some("Uber"), ""), Some(id_of("Transport")));
    }

    #[test]
    fn builtin_map_resolves_by_name() {
        let categorizer = AutoCategorizer::new(vec![], &categories());
        assert_eq!(categorizer.categorize(Some("Netflix"), ""), Some(id_of("Subscriptions")));
        assert_eq!(
            categorizer.categorize(None, "Rs 300 spent at APOLLO PHARMACY"),
            Some(id_of("Healthcare"))
        );
    }

    #[test]
    fn builtin_keywords_need_word_boundaries() {
        let categorizer = AutoCategorizer::new(vec![], &categories());
        assert_eq!(categorizer.categorize(Some("Coca-Cola Store"), "Rs 40 debited"), None);
    }

    #[test]
    fn builtin_skips_missing_categories() {
        let only_shopping = vec![Category {
            id: CategoryId(7),
            name: "shopping".to_string(),
            kind: CategoryKind::Expense,
        }];
        let categorizer = AutoCategorizer::new(vec![], &only_shopping);
        assert_eq!(categorizer.categorize(Some("Swiggy"), ""), None);
        assert_eq!(categorizer.categorize(Some("Flipkart"), ""), Some(CategoryId(7)));
    }

    #[test]
    fn nothing_matches_is_uncategorized() {
        let categorizer = AutoCategorizer::new(vec![], &categories());
        assert_eq!(categorizer.categorize(Some("Sharma Traders"), "Rs 900 debited"), None);
        assert_eq!(categorizer.categorize(None, ""), None);
    }
}
