use crate::models::TagSet;

use super::Document;

/// Upsert one discoverable marker per non-empty category (and STEAM
/// subject) into the document head. Empty categories leave no marker:
/// the sidecar is the system of record, the document only carries
/// positive signals.
pub fn apply_markers(doc: &mut dyn Document, tags: &TagSet) {
    for (name, content) in tags.markers() {
        doc.upsert_meta(&name, &content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::HtmlDocument;
    use crate::models::SteamTagSet;

    fn page() -> HtmlDocument {
        HtmlDocument::parse(
            "<html>\n<head>\n<title>t</title>\n</head>\n<body>x</body>\n</html>\n".into(),
        )
        .unwrap()
    }

    fn sample_tags() -> TagSet {
        TagSet {
            ai_topic: vec!["machine_learning".into()],
            steam_topic: SteamTagSet {
                technology: vec!["programming".into()],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn only_non_empty_categories_are_marked() {
        let mut doc = page();
        apply_markers(&mut doc, &sample_tags());

        let out = doc.serialize();
        assert!(out.contains("<meta name=\"tags-ai_topic\" content=\"machine_learning\">"));
        assert!(out.contains("<meta name=\"tags-steam_topic-technology\" content=\"programming\">"));
        assert!(!out.contains("tags-difficulty_level"));
        assert!(!out.contains("tags-steam_topic-science"));
    }

    #[test]
    fn merge_twice_equals_merge_once() {
        let tags = sample_tags();

        let mut doc = page();
        apply_markers(&mut doc, &tags);
        let once = doc.serialize();

        apply_markers(&mut doc, &tags);
        assert_eq!(doc.serialize(), once);
    }

    #[test]
    fn reclassification_replaces_stale_marker() {
        let mut doc = HtmlDocument::parse(
            "<html>\n<head>\n<meta name=\"tags-ai_topic\" content=\"robotics\">\n</head>\n<body>x</body>\n</html>\n".into(),
        )
        .unwrap();

        apply_markers(&mut doc, &sample_tags());

        let out = doc.serialize();
        assert_eq!(out.matches("tags-ai_topic").count(), 1);
        assert!(out.contains("content=\"machine_learning\""));
        assert!(!out.contains("robotics"));
    }
}
