//! Layered configuration.
//!
//! Classification tables, fallback labels and layout names are data, not
//! code: the built-in defaults (an embedded TOML document) are merged with
//! an optional `buchfink.toml` and `BUCHFINK__`-prefixed environment
//! variables, so the keyword tables can grow without touching the engine.

use buchfink_classify::{FallbackLabels, GenreClassifier, GenreRule};
use buchfink_enrich::CategoryRule;
use buchfink_library::plan::TargetLayout;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The built-in defaults, always merged first.
const DEFAULTS: &str = include_str!("defaults.toml");

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Labels {
    pub unknown_author: String,
    pub unclassified: String,
    pub general_fiction: String,
    pub narrative_words: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LayoutNames {
    /// Library directory name, created beside the scanned root.
    pub library_dir: String,
    /// Quarantine directory name, created beside the scanned root.
    pub quarantine_dir: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub labels: Labels,
    pub layout: LayoutNames,
    /// Ordered genre keyword tables; earlier entries win score ties.
    pub genres: Vec<GenreRule>,
    /// Exact-match category overrides for enrichment.
    #[serde(default)]
    pub overrides: Vec<CategoryRule>,
}

impl Config {
    /// Loads defaults ← config file ← environment, in that precedence.
    ///
    /// With an explicit `--config` path the file must exist; the implicit
    /// `buchfink.toml` lookup is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        let figment = Figment::from(Toml::string(DEFAULTS));
        let figment = match path {
            Some(path) => figment.merge(Toml::file_exact(path)),
            None => figment.merge(Toml::file("buchfink.toml")),
        };
        figment.merge(Env::prefixed("BUCHFINK__").split("__")).extract()
    }

    /// Builds the keyword classifier from the configured tables.
    pub fn classifier(&self) -> GenreClassifier {
        GenreClassifier::new(
            self.genres.clone(),
            FallbackLabels {
                narrative_words: self.labels.narrative_words.clone(),
                general_fiction: self.labels.general_fiction.clone(),
                unclassified: self.labels.unclassified.clone(),
            },
        )
    }

    /// Resolves the target roots for a scan of `scan_root`.
    ///
    /// Explicit roots win; otherwise the configured directory names are
    /// created beside the scanned directory, so the reorganized tree never
    /// nests inside the tree being reorganized.
    pub fn target_layout(
        &self,
        scan_root: &Path,
        library_root: Option<PathBuf>,
        quarantine_root: Option<PathBuf>,
    ) -> TargetLayout {
        let base = scan_root.parent().unwrap_or(scan_root);
        TargetLayout {
            library_root: library_root.unwrap_or_else(|| base.join(&self.layout.library_dir)),
            quarantine_root: quarantine_root.unwrap_or_else(|| base.join(&self.layout.quarantine_dir)),
            unknown_author: self.labels.unknown_author.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Config {
        Config::load(None).unwrap()
    }

    #[test]
    fn test_builtin_defaults_parse() {
        let config = defaults();
        assert_eq!(config.labels.unclassified, "Sonstiges");
        let names: Vec<&str> = config.genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names[0], "Science Fiction");
        assert!(names.contains(&"Krimi/Thriller"));
        assert!(config.overrides.is_empty());
    }

    #[test]
    fn test_classifier_from_defaults() {
        let classifier = defaults().classifier();
        assert_eq!(classifier.classify("Isaac Asimov", "Foundation"), "Science Fiction");
        assert_eq!(classifier.classify("", "Ein ganz normaler Roman"), "Belletristik");
        assert_eq!(classifier.classify("Jane Doe", "Quantum Tables"), "Sonstiges");
    }

    #[test]
    fn test_layout_defaults_sit_beside_scan_root() {
        let layout = defaults().target_layout(Path::new("/home/arne/eBooks"), None, None);
        assert_eq!(layout.library_root, Path::new("/home/arne/eBooks_neu"));
        assert_eq!(layout.quarantine_root, Path::new("/home/arne/eBooks_Papierkorb"));
        assert_eq!(layout.unknown_author, "Unbekannter_Autor");
    }

    #[test]
    fn test_explicit_roots_win() {
        let layout = defaults().target_layout(
            Path::new("/data/books"),
            Some(PathBuf::from("/library")),
            None,
        );
        assert_eq!(layout.library_root, Path::new("/library"));
        assert_eq!(layout.quarantine_root, Path::new("/data/eBooks_Papierkorb"));
    }
}
