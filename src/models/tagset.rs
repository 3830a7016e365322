use serde::{Deserialize, Serialize};

/// Classification result for one document. Mirrors the taxonomy shape:
/// every category is always present, even when nothing matched, so
/// consumers can tell "evaluated, no match" from "not evaluated".
///
/// Field order is the taxonomy declaration order and doubles as the
/// serialization order for the sidecar record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSet {
    pub difficulty_level: Vec<String>,
    pub age_group: Vec<String>,
    pub ai_topic: Vec<String>,
    pub steam_topic: SteamTagSet,
    pub skill_focus: Vec<String>,
    pub interaction_type: Vec<String>,
    pub duration: Vec<String>,
}

/// The two-level `steam_topic` axis: one tag list per STEAM subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SteamTagSet {
    pub science: Vec<String>,
    pub technology: Vec<String>,
    pub engineering: Vec<String>,
    pub arts: Vec<String>,
    pub mathematics: Vec<String>,
}

impl TagSet {
    pub fn is_empty(&self) -> bool {
        self.difficulty_level.is_empty()
            && self.age_group.is_empty()
            && self.ai_topic.is_empty()
            && self.steam_topic.is_empty()
            && self.skill_focus.is_empty()
            && self.interaction_type.is_empty()
            && self.duration.is_empty()
    }

    /// Document markers for this tag set, in declaration order. Only
    /// non-empty categories (and STEAM subjects) produce a marker; the
    /// sidecar keeps the full shape, the document only carries positive
    /// signals.
    pub fn markers(&self) -> Vec<(String, String)> {
        let mut markers = Vec::new();

        push_marker(&mut markers, "tags-difficulty_level".into(), &self.difficulty_level);
        push_marker(&mut markers, "tags-age_group".into(), &self.age_group);
        push_marker(&mut markers, "tags-ai_topic".into(), &self.ai_topic);
        for (subject, tags) in self.steam_topic.subjects() {
            push_marker(&mut markers, format!("tags-steam_topic-{}", subject), tags);
        }
        push_marker(&mut markers, "tags-skill_focus".into(), &self.skill_focus);
        push_marker(&mut markers, "tags-interaction_type".into(), &self.interaction_type);
        push_marker(&mut markers, "tags-duration".into(), &self.duration);

        markers
    }
}

fn push_marker(out: &mut Vec<(String, String)>, name: String, tags: &[String]) {
    if !tags.is_empty() {
        out.push((name, tags.join(",")));
    }
}

impl SteamTagSet {
    pub fn is_empty(&self) -> bool {
        self.science.is_empty()
            && self.technology.is_empty()
            && self.engineering.is_empty()
            && self.arts.is_empty()
            && self.mathematics.is_empty()
    }

    pub fn subjects(&self) -> [(&'static str, &Vec<String>); 5] {
        [
            ("science", &self.science),
            ("technology", &self.technology),
            ("engineering", &self.engineering),
            ("arts", &self.arts),
            ("mathematics", &self.mathematics),
        ]
    }
}
