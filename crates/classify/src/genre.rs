use serde::{Deserialize, Serialize};
use tracing::trace;

/// One genre and the keywords that vote for it.
///
/// Rules live in an ordered list, not a map: declaration order is the
/// documented tie-break (earlier rule wins on equal scores), so it has to be
/// an explicit sequence rather than incidental map iteration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreRule {
    pub name: String,
    pub keywords: Vec<String>,
}

/// Labels used when no keyword rule matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackLabels {
    /// Generic narrative words ("roman", "erzählung", …) that mark a text as
    /// fiction even when no genre keyword hits.
    pub narrative_words: Vec<String>,
    /// Genre assigned when a narrative word matches.
    pub general_fiction: String,
    /// Sentinel assigned when nothing matches at all. Never empty.
    pub unclassified: String,
}

/// Heuristic keyword classifier over an (author, title) pair.
///
/// The classifier is a prioritized chain of pure strategies, each tried in
/// order until one yields a genre:
///
/// 1. keyword-table scoring — count keyword substring hits per rule, return
///    the strictly-highest scorer (first-declared rule wins ties);
/// 2. narrative-word fallback — any generic fiction word maps to the
///    general-fiction label;
/// 3. the unclassified sentinel.
///
/// Not a trained model; given the same tables it is fully deterministic, so
/// tests can assert exact labels.
#[derive(Debug, Clone)]
pub struct GenreClassifier {
    rules: Vec<GenreRule>,
    labels: FallbackLabels,
}

impl GenreClassifier {
    pub fn new(rules: Vec<GenreRule>, labels: FallbackLabels) -> Self {
        Self { rules, labels }
    }

    /// The sentinel label for unmatched records.
    pub fn unclassified(&self) -> &str {
        &self.labels.unclassified
    }

    /// Classifies an (author, title) pair into a genre label.
    ///
    /// Always returns a non-empty label; the worst case is the configured
    /// unclassified sentinel.
    pub fn classify(&self, author: &str, title: &str) -> String {
        let search_text = format!("{} {}", author, title).to_lowercase();
        self.keyword_match(&search_text)
            .or_else(|| self.narrative_fallback(&search_text))
            .unwrap_or_else(|| self.labels.unclassified.clone())
    }

    /// Scores every rule by keyword substring hits and returns the highest
    /// scorer, or `None` when no keyword matched at all.
    ///
    /// A later rule must score *strictly* higher to displace an earlier one.
    fn keyword_match(&self, search_text: &str) -> Option<String> {
        let mut best: Option<(&str, usize)> = None;
        for rule in &self.rules {
            let score = rule.keywords.iter().filter(|keyword| search_text.contains(keyword.as_str())).count();
            if score > 0 && best.is_none_or(|(_, high)| score > high) {
                best = Some((&rule.name, score));
            }
        }
        if let Some((name, score)) = best {
            trace!(genre = name, score, "keyword match");
        }
        best.map(|(name, _)| name.to_string())
    }

    fn narrative_fallback(&self, search_text: &str) -> Option<String> {
        self.labels
            .narrative_words
            .iter()
            .any(|word| search_text.contains(word.as_str()))
            .then(|| self.labels.general_fiction.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn rule(name: &str, keywords: &[&str]) -> GenreRule {
        GenreRule { name: name.to_string(), keywords: keywords.iter().map(|k| k.to_string()).collect() }
    }

    fn fixture() -> GenreClassifier {
        GenreClassifier::new(
            vec![
                rule("Science Fiction", &["asimov", "foundation", "dune", "space"]),
                rule("Fantasy", &["tolkien", "pratchett", "disc"]),
                rule("Krimi/Thriller", &["fitzek", "sebastian", "reacher"]),
            ],
            FallbackLabels {
                narrative_words: vec!["roman".into(), "erzählung".into(), "geschichte".into()],
                general_fiction: "Belletristik".into(),
                unclassified: "Sonstiges".into(),
            },
        )
    }

    #[rstest]
    #[case("Isaac Asimov", "Foundation", "Science Fiction")]
    #[case("", "Ein ganz normaler Roman", "Belletristik")]
    #[case("Jane Doe", "Quantum Tables", "Sonstiges")]
    #[case("Fitzek, Sebastian", "Der Joker", "Krimi/Thriller")]
    fn test_classify_table(#[case] author: &str, #[case] title: &str, #[case] expected: &str) {
        assert_eq!(fixture().classify(author, title), expected);
    }

    #[test]
    fn test_highest_score_wins() {
        // One Fantasy hit ("tolkien") against two Science Fiction hits.
        let genre = fixture().classify("Tolkien", "Foundation in Space");
        assert_eq!(genre, "Science Fiction");
    }

    #[test]
    fn test_ties_break_to_first_declared_rule() {
        // "dune" and "disc" score one each; Science Fiction is declared first.
        let genre = fixture().classify("", "Dune on Disc");
        assert_eq!(genre, "Science Fiction");
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(fixture().classify("ISAAC ASIMOV", "FOUNDATION"), "Science Fiction");
    }

    #[test]
    fn test_empty_input_falls_through_to_sentinel() {
        assert_eq!(fixture().classify("", ""), "Sonstiges");
    }
}
