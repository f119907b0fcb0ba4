//! Category→genre mapping.
//!
//! Google Books reports categories like `"Fiction / Science Fiction"`;
//! the collection uses its own (German) genre labels. Mapping is a
//! prioritized chain of pure strategies, tried in order until one yields a
//! genre:
//!
//! 1. user overrides — exact category match, from configuration;
//! 2. the declared mapping table — pattern-substring match;
//! 3. broad keyword fallback on the first category.
//!
//! The chain order is the contract: overrides always beat the table, the
//! table always beats the heuristics.

use serde::{Deserialize, Serialize};

/// One mapping entry: a category pattern and the genre it lands in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub pattern: String,
    pub genre: String,
}

impl CategoryRule {
    fn new(pattern: &str, genre: &str) -> Self {
        Self { pattern: pattern.to_string(), genre: genre.to_string() }
    }
}

/// Maps service-reported category lists onto collection genre labels.
#[derive(Debug, Clone, Default)]
pub struct CategoryMapper {
    overrides: Vec<CategoryRule>,
    table: Vec<CategoryRule>,
}

impl CategoryMapper {
    pub fn new(overrides: Vec<CategoryRule>, table: Vec<CategoryRule>) -> Self {
        Self { overrides, table }
    }

    /// The built-in table plus user overrides.
    pub fn with_default_table(overrides: Vec<CategoryRule>) -> Self {
        Self::new(overrides, default_table())
    }

    /// Resolves a category list to a genre, or `None` when every strategy
    /// comes up empty (callers substitute their sentinel label).
    pub fn map(&self, categories: &[String]) -> Option<String> {
        self.exact_override(categories)
            .or_else(|| self.table_match(categories))
            .or_else(|| categories.first().and_then(|category| broad_fallback(category)))
    }

    fn exact_override(&self, categories: &[String]) -> Option<String> {
        for category in categories {
            for rule in &self.overrides {
                if category.eq_ignore_ascii_case(&rule.pattern) {
                    return Some(rule.genre.clone());
                }
            }
        }
        None
    }

    fn table_match(&self, categories: &[String]) -> Option<String> {
        for category in categories {
            let category = category.to_lowercase();
            for rule in &self.table {
                if category.contains(&rule.pattern.to_lowercase()) {
                    return Some(rule.genre.clone());
                }
            }
        }
        None
    }
}

/// Last-resort keyword heuristics over a single category string.
fn broad_fallback(category: &str) -> Option<String> {
    let category = category.to_lowercase();
    if category.contains("fiction") {
        let genre = if category.contains("science") {
            "Science Fiction"
        } else if category.contains("fantasy") {
            "Fantasy"
        } else if category.contains("mystery") || category.contains("thriller") {
            "Krimi/Thriller"
        } else {
            "Belletristik"
        };
        return Some(genre.to_string());
    }
    if category.contains("biography") {
        return Some("Biografien/Memoiren".to_string());
    }
    if ["history", "science", "philosophy", "psychology"].iter().any(|word| category.contains(word)) {
        return Some("Sachbücher".to_string());
    }
    if category.contains("self-help") || category.contains("health") {
        return Some("Ratgeber".to_string());
    }
    None
}

/// The built-in category mapping, ordered most-specific first.
pub fn default_table() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new("Fiction / Science Fiction", "Science Fiction"),
        CategoryRule::new("Fiction / Fantasy", "Fantasy"),
        CategoryRule::new("Fiction / Mystery & Detective", "Krimi/Thriller"),
        CategoryRule::new("Fiction / Thriller", "Krimi/Thriller"),
        CategoryRule::new("Fiction / Literary", "Belletristik"),
        CategoryRule::new("Fiction / General", "Belletristik"),
        CategoryRule::new("Fiction / Contemporary", "Belletristik"),
        CategoryRule::new("Fiction / Historical", "Historische Romane"),
        CategoryRule::new("Fiction / Romance", "Liebesromane"),
        CategoryRule::new("Biography & Autobiography", "Biografien/Memoiren"),
        CategoryRule::new("History", "Sachbücher"),
        CategoryRule::new("Science", "Sachbücher"),
        CategoryRule::new("Philosophy", "Sachbücher"),
        CategoryRule::new("Psychology", "Sachbücher"),
        CategoryRule::new("Self-Help", "Ratgeber"),
        CategoryRule::new("Business & Economics", "Wirtschaft"),
        CategoryRule::new("Technology", "Sachbücher"),
        CategoryRule::new("Computers", "Sachbücher"),
        CategoryRule::new("Cooking", "Ratgeber"),
        CategoryRule::new("Health & Fitness", "Ratgeber"),
        CategoryRule::new("True Crime", "Krimi/Thriller"),
        CategoryRule::new("Young Adult Fiction", "Jugendbuch"),
        CategoryRule::new("Juvenile Fiction", "Kinderbuch"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn categories(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case(&["Fiction / Science Fiction"], Some("Science Fiction"))]
    #[case(&["Fiction / Thrillers"], Some("Krimi/Thriller"))]
    #[case(&["Juvenile Fiction / Animals"], Some("Kinderbuch"))]
    #[case(&["Gardening"], None)]
    #[case(&[], None)]
    fn test_table_mapping(#[case] input: &[&str], #[case] expected: Option<&str>) {
        let mapper = CategoryMapper::with_default_table(vec![]);
        assert_eq!(mapper.map(&categories(input)).as_deref(), expected);
    }

    #[test]
    fn test_overrides_beat_the_table() {
        let mapper = CategoryMapper::with_default_table(vec![CategoryRule::new(
            "Fiction / Science Fiction",
            "Lieblingsbücher",
        )]);
        let mapped = mapper.map(&categories(&["Fiction / Science Fiction"]));
        assert_eq!(mapped.as_deref(), Some("Lieblingsbücher"));
    }

    #[rstest]
    #[case("Mystery Fiction", "Krimi/Thriller")]
    #[case("Fantasy fiction, German", "Fantasy")]
    #[case("Literary fiction of all sorts", "Belletristik")]
    #[case("Biography", "Biografien/Memoiren")]
    #[case("Natural science", "Sachbücher")]
    #[case("Health and wellbeing", "Ratgeber")]
    fn test_broad_fallback(#[case] category: &str, #[case] expected: &str) {
        // No table entry matches these shapes; the keyword heuristic does.
        let mapper = CategoryMapper::new(vec![], vec![]);
        assert_eq!(mapper.map(&categories(&[category])).as_deref(), Some(expected));
    }

    #[test]
    fn test_only_first_category_feeds_the_fallback() {
        let mapper = CategoryMapper::new(vec![], vec![]);
        let mapped = mapper.map(&categories(&["Gardening", "Science"]));
        assert_eq!(mapped, None);
    }
}
