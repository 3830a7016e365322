use std::sync::Arc;

use crate::models::{SteamTagSet, TagSet};
use crate::taxonomy::{Category, KeywordRule, SteamSubject, Taxonomy};

/// Deterministic keyword matcher. A leaf tag is assigned when any of its
/// keywords occurs as a substring of the case-folded document text.
///
/// Known precision limit: a short keyword can match inside an unrelated
/// longer word. That is accepted behavior, not special-cased.
pub struct Classifier {
    taxonomy: Arc<Taxonomy>,
}

impl Classifier {
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self { taxonomy }
    }

    /// Classify extracted plain text into the full taxonomy shape. Every
    /// category is present in the result even with zero matches; tag
    /// order within a category is taxonomy declaration order.
    pub fn analyze(&self, text: &str) -> TagSet {
        let folded = text.to_lowercase();

        TagSet {
            difficulty_level: self.match_category(Category::DifficultyLevel, &folded),
            age_group: self.match_category(Category::AgeGroup, &folded),
            ai_topic: self.match_category(Category::AiTopic, &folded),
            steam_topic: SteamTagSet {
                science: self.match_steam(SteamSubject::Science, &folded),
                technology: self.match_steam(SteamSubject::Technology, &folded),
                engineering: self.match_steam(SteamSubject::Engineering, &folded),
                arts: self.match_steam(SteamSubject::Arts, &folded),
                mathematics: self.match_steam(SteamSubject::Mathematics, &folded),
            },
            skill_focus: self.match_category(Category::SkillFocus, &folded),
            interaction_type: self.match_category(Category::InteractionType, &folded),
            duration: self.match_category(Category::Duration, &folded),
        }
    }

    fn match_category(&self, category: Category, folded: &str) -> Vec<String> {
        // Flat categories only; steam_topic goes through match_steam.
        let rules = self.taxonomy.rules(category).unwrap_or(&[]);
        match_rules(rules, folded)
    }

    fn match_steam(&self, subject: SteamSubject, folded: &str) -> Vec<String> {
        match_rules(self.taxonomy.steam_rules(subject), folded)
    }
}

fn match_rules(rules: &[KeywordRule], folded: &str) -> Vec<String> {
    rules
        .iter()
        .filter(|rule| rule.keywords.iter().any(|kw| folded.contains(kw.as_str())))
        .map(|rule| rule.tag.clone())
        .collect()
}
