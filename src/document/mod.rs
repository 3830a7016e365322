pub mod annotate;
pub mod html;

pub use annotate::apply_markers;
pub use html::HtmlDocument;

/// Narrow capability interface over a parsed content document. The
/// classifier and merger only need text extraction and head-marker
/// upserts; any conforming document library satisfies this.
pub trait Document {
    /// Contents of the document's `<title>`, if present.
    fn title(&self) -> Option<String>;

    /// Plain-text content of the document, markup stripped.
    fn query_text(&self) -> String;

    /// Insert-or-replace a `<meta>` marker in the document head, keyed
    /// by its `name` attribute. At most one marker per name survives.
    fn upsert_meta(&mut self, name: &str, content: &str);

    /// Serialize the (possibly mutated) document back to text.
    fn serialize(&self) -> String;
}
