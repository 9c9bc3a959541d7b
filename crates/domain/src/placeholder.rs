/// One `{{name}}` marker found in a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderSpan<'a> {
    /// Byte offset of the opening `{{`.
    pub start: usize,
    /// Byte offset just past the closing `}}`.
    pub end: usize,
    /// Field name between the braces, trimmed.
    pub name: &'a str,
}

/// Iterator over placeholders in a script, left to right.
///
/// Only identifier-like names (`[A-Za-z0-9_.$-]`, optional surrounding spaces)
/// count as placeholders; any other `{{ ... }}` run is ordinary script text.
#[derive(Debug, Clone)]
pub struct Placeholders<'a> {
    script: &'a str,
    cursor: usize,
}

/// Scans a script for placeholders.
#[must_use]
pub fn placeholders(script: &str) -> Placeholders<'_> {
    Placeholders { script, cursor: 0 }
}

impl<'a> Iterator for Placeholders<'a> {
    type Item = PlaceholderSpan<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(offset) = self.script[self.cursor..].find("{{") {
            let start = self.cursor + offset;
            let inner_start = start + 2;
            let Some(close_offset) = self.script[inner_start..].find("}}") else {
                self.cursor = self.script.len();
                return None;
            };
            let inner_end = inner_start + close_offset;
            let name = self.script[inner_start..inner_end].trim();

            if is_placeholder_name(name) {
                self.cursor = inner_end + 2;
                return Some(PlaceholderSpan {
                    start,
                    end: inner_end + 2,
                    name,
                });
            }

            self.cursor = start + 1;
        }

        self.cursor = self.script.len();
        None
    }
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.' | '$'))
}

#[cfg(test)]
mod tests {
    use super::placeholders;

    #[test]
    fn finds_names_in_order() {
        let names: Vec<&str> = placeholders("gtag('config', '{{tracking_id}}', {debug: {{ debug }}});")
            .map(|span| span.name)
            .collect();
        assert_eq!(names, vec!["tracking_id", "debug"]);
    }

    #[test]
    fn spans_cover_the_braces() {
        let script = "id={{id}}";
        let span = placeholders(script).next().unwrap_or_else(|| unreachable!());
        assert_eq!(&script[span.start..span.end], "{{id}}");
    }

    #[test]
    fn object_literals_are_not_placeholders() {
        let script = "var config = {{a: 1}}; var list = [{{items}}];";
        let names: Vec<&str> = placeholders(script).map(|span| span.name).collect();
        assert_eq!(names, vec!["items"]);
    }

    #[test]
    fn unterminated_marker_ends_the_scan() {
        assert_eq!(placeholders("x = {{open").count(), 0);
    }

    #[test]
    fn triple_braces_resolve_to_the_inner_name() {
        let names: Vec<&str> = placeholders("{{{id}}}").map(|span| span.name).collect();
        assert_eq!(names, vec!["id"]);
    }
}
