use crate::error::{Error, Result};

use super::Document;

/// Minimal HTML document backed by the raw source text. Mutations are
/// surgical string edits, so unrelated markup survives byte-for-byte —
/// a full parse/re-serialize cycle would reformat documents we do not
/// own.
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    raw: String,
}

impl HtmlDocument {
    /// Requires a `</head>` so markers have an insertion point.
    pub fn parse(raw: String) -> Result<Self> {
        if find_ci(&raw, "</head>", 0).is_none() {
            return Err(Error::DocumentParse("document has no </head>".to_string()));
        }
        Ok(Self { raw })
    }

    fn remove_meta(&mut self, name: &str) {
        let mut from = 0;
        while let Some(start) = find_ci(&self.raw, "<meta", from) {
            let Some(gt) = self.raw[start..].find('>') else {
                break;
            };
            let end = start + gt + 1;

            let tag = &self.raw[start..end];
            if attr_value(tag, "name").is_some_and(|v| v.eq_ignore_ascii_case(name)) {
                let (line_start, line_end) = expand_to_line(&self.raw, start, end);
                self.raw.replace_range(line_start..line_end, "");
                from = line_start;
            } else {
                from = end;
            }
        }
    }
}

impl Document for HtmlDocument {
    fn title(&self) -> Option<String> {
        let open = find_ci(&self.raw, "<title", 0)?;
        let text_start = open + self.raw[open..].find('>')? + 1;
        let close = find_ci(&self.raw, "</title>", text_start)?;
        let title = decode_entities(self.raw[text_start..close].trim());
        (!title.is_empty()).then_some(title)
    }

    fn query_text(&self) -> String {
        let mut text = String::with_capacity(self.raw.len() / 2);
        let mut rest = self.raw.as_str();

        while let Some(lt) = rest.find('<') {
            text.push_str(&rest[..lt]);
            // Element boundaries separate words.
            text.push(' ');

            let tag = &rest[lt..];
            let skip_to = if starts_with_tag(tag, "<script") {
                find_ci(tag, "</script>", 0).map(|i| i + "</script>".len())
            } else if starts_with_tag(tag, "<style") {
                find_ci(tag, "</style>", 0).map(|i| i + "</style>".len())
            } else {
                tag.find('>').map(|i| i + 1)
            };

            match skip_to {
                Some(offset) => rest = &tag[offset..],
                None => return decode_entities(&text),
            }
        }

        text.push_str(rest);
        decode_entities(&text)
    }

    fn upsert_meta(&mut self, name: &str, content: &str) {
        self.remove_meta(name);

        // parse() guaranteed the insertion point exists.
        if let Some(head_end) = find_ci(&self.raw, "</head>", 0) {
            let marker = format!("<meta name=\"{}\" content=\"{}\">\n", name, content);
            self.raw.insert_str(head_end, &marker);
        }
    }

    fn serialize(&self) -> String {
        self.raw.clone()
    }
}

/// Case-insensitive substring search for ASCII needles. Byte indices are
/// valid in the original string because the needle is ASCII.
fn find_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || from + n.len() > h.len() {
        return None;
    }
    (from..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

fn starts_with_tag(s: &str, open: &str) -> bool {
    if s.len() < open.len() || !s.as_bytes()[..open.len()].eq_ignore_ascii_case(open.as_bytes()) {
        return false;
    }
    // "<script" must not match "<scripting-thing".
    matches!(
        s.as_bytes().get(open.len()).copied(),
        None | Some(b'>') | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') | Some(b'/')
    )
}

/// Value of a quoted HTML attribute inside a single tag's text.
fn attr_value<'a>(tag: &'a str, attr: &str) -> Option<&'a str> {
    let bytes = tag.as_bytes();
    let mut from = 0;

    while let Some(i) = find_ci(tag, attr, from) {
        from = i + 1;
        if i == 0 || !bytes[i - 1].is_ascii_whitespace() {
            continue;
        }
        let rest = tag[i + attr.len()..].trim_start();
        let Some(rest) = rest.strip_prefix('=') else {
            continue;
        };
        let rest = rest.trim_start();
        let mut chars = rest.chars();
        let quote = chars.next()?;
        if quote != '"' && quote != '\'' {
            continue;
        }
        let value = chars.as_str();
        return value.find(quote).map(|end| &value[..end]);
    }

    None
}

/// Widen a removed tag's range to swallow its whole line when the tag
/// sits alone on it, so removal leaves no blank lines behind.
fn expand_to_line(raw: &str, start: usize, end: usize) -> (usize, usize) {
    let bytes = raw.as_bytes();

    let line_start = raw[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let only_indent = bytes[line_start..start].iter().all(|b| *b == b' ' || *b == b'\t');

    if only_indent && bytes.get(end) == Some(&b'\n') {
        (line_start, end + 1)
    } else {
        (start, end)
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
