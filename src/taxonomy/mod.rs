use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Default rule set shipped with the binary; overridable with `--taxonomy`.
const BUNDLED_TAXONOMY: &str = include_str!("../../taxonomy.json");

/// The seven classification axes, in declaration order. The order here
/// drives marker emission and sidecar key ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    DifficultyLevel,
    AgeGroup,
    AiTopic,
    SteamTopic,
    SkillFocus,
    InteractionType,
    Duration,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::DifficultyLevel,
        Category::AgeGroup,
        Category::AiTopic,
        Category::SteamTopic,
        Category::SkillFocus,
        Category::InteractionType,
        Category::Duration,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::DifficultyLevel => "difficulty_level",
            Category::AgeGroup => "age_group",
            Category::AiTopic => "ai_topic",
            Category::SteamTopic => "steam_topic",
            Category::SkillFocus => "skill_focus",
            Category::InteractionType => "interaction_type",
            Category::Duration => "duration",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The five STEAM subjects under `steam_topic`, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SteamSubject {
    Science,
    Technology,
    Engineering,
    Arts,
    Mathematics,
}

impl SteamSubject {
    pub const ALL: [SteamSubject; 5] = [
        SteamSubject::Science,
        SteamSubject::Technology,
        SteamSubject::Engineering,
        SteamSubject::Arts,
        SteamSubject::Mathematics,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SteamSubject::Science => "science",
            SteamSubject::Technology => "technology",
            SteamSubject::Engineering => "engineering",
            SteamSubject::Arts => "arts",
            SteamSubject::Mathematics => "mathematics",
        }
    }
}

impl std::fmt::Display for SteamSubject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One leaf tag and the keywords that trigger it. A tag matches when any
/// keyword is a substring of the case-folded document text.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordRule {
    pub tag: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSteamTaxonomy {
    science: Vec<KeywordRule>,
    technology: Vec<KeywordRule>,
    engineering: Vec<KeywordRule>,
    arts: Vec<KeywordRule>,
    mathematics: Vec<KeywordRule>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTaxonomy {
    difficulty_level: Vec<KeywordRule>,
    age_group: Vec<KeywordRule>,
    ai_topic: Vec<KeywordRule>,
    steam_topic: RawSteamTaxonomy,
    skill_focus: Vec<KeywordRule>,
    interaction_type: Vec<KeywordRule>,
    duration: Vec<KeywordRule>,
}

/// Validated, immutable rule set. Loaded once at startup and shared as
/// `Arc<Taxonomy>` for the rest of the run.
#[derive(Debug)]
pub struct Taxonomy {
    difficulty_level: Vec<KeywordRule>,
    age_group: Vec<KeywordRule>,
    ai_topic: Vec<KeywordRule>,
    steam: [Vec<KeywordRule>; 5],
    skill_focus: Vec<KeywordRule>,
    interaction_type: Vec<KeywordRule>,
    duration: Vec<KeywordRule>,
}

impl Taxonomy {
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawTaxonomy = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("invalid taxonomy: {}", e)))?;

        let taxonomy = Self {
            difficulty_level: raw.difficulty_level,
            age_group: raw.age_group,
            ai_topic: raw.ai_topic,
            steam: [
                raw.steam_topic.science,
                raw.steam_topic.technology,
                raw.steam_topic.engineering,
                raw.steam_topic.arts,
                raw.steam_topic.mathematics,
            ],
            skill_focus: raw.skill_focus,
            interaction_type: raw.interaction_type,
            duration: raw.duration,
        };

        taxonomy.validate()?;
        Ok(taxonomy.normalized())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read taxonomy {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// The rule set compiled into the binary.
    pub fn bundled() -> Result<Arc<Self>> {
        Ok(Arc::new(Self::from_json(BUNDLED_TAXONOMY)?))
    }

    /// Rules for a flat category; `None` for the two-level `steam_topic`.
    pub fn rules(&self, category: Category) -> Option<&[KeywordRule]> {
        match category {
            Category::DifficultyLevel => Some(&self.difficulty_level),
            Category::AgeGroup => Some(&self.age_group),
            Category::AiTopic => Some(&self.ai_topic),
            Category::SteamTopic => None,
            Category::SkillFocus => Some(&self.skill_focus),
            Category::InteractionType => Some(&self.interaction_type),
            Category::Duration => Some(&self.duration),
        }
    }

    pub fn steam_rules(&self, subject: SteamSubject) -> &[KeywordRule] {
        &self.steam[subject as usize]
    }

    fn validate(&self) -> Result<()> {
        for category in Category::ALL {
            match self.rules(category) {
                Some(rules) => validate_rules(category.name(), rules)?,
                None => {
                    for subject in SteamSubject::ALL {
                        let scope = format!("{}.{}", category.name(), subject.name());
                        validate_rules(&scope, self.steam_rules(subject))?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Keywords are compared against case-folded text, so fold them once
    /// here instead of on every match.
    fn normalized(mut self) -> Self {
        let fold = |rules: &mut Vec<KeywordRule>| {
            for rule in rules {
                for keyword in &mut rule.keywords {
                    *keyword = keyword.to_lowercase();
                }
            }
        };

        fold(&mut self.difficulty_level);
        fold(&mut self.age_group);
        fold(&mut self.ai_topic);
        for rules in &mut self.steam {
            fold(rules);
        }
        fold(&mut self.skill_focus);
        fold(&mut self.interaction_type);
        fold(&mut self.duration);
        self
    }
}

fn validate_rules(scope: &str, rules: &[KeywordRule]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();

    for rule in rules {
        if rule.tag.trim().is_empty() {
            return Err(Error::Config(format!("{}: blank tag id", scope)));
        }
        // Tag ids land verbatim in marker names and comma-joined marker
        // content, so restrict them to characters safe in both.
        if !rule.tag.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
            return Err(Error::Config(format!(
                "{}: tag id '{}' contains characters outside [a-z0-9_]",
                scope, rule.tag
            )));
        }
        if !seen.insert(rule.tag.as_str()) {
            return Err(Error::Config(format!(
                "{}: duplicate tag id '{}'",
                scope, rule.tag
            )));
        }
        if rule.keywords.is_empty() {
            return Err(Error::Config(format!(
                "{}: tag '{}' has no keywords",
                scope, rule.tag
            )));
        }
        if rule.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(Error::Config(format!(
                "{}: tag '{}' has a blank keyword",
                scope, rule.tag
            )));
        }
    }

    Ok(())
}
