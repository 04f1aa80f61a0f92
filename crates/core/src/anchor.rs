use std::collections::HashMap;

/// Generates unique HTML anchor ids from LaTeX labels.
#[derive(Default)]
pub struct AnchorSet {
    counts: HashMap<String, usize>,
}

impl AnchorSet {
    /// Creates an empty anchor set.
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }

    /// Generates the next anchor for the given label text.
    pub fn next_anchor(&mut self, label: &str) -> String {
        anchorize(label, &mut self.counts)
    }

    /// Reserves an anchor so future generated anchors won't collide with it.
    pub fn reserve(&mut self, anchor: &str) {
        let entry = self.counts.entry(anchor.to_string()).or_insert(0);
        *entry += 1;
    }
}

/// Turns a label into an anchor id, updating counts to ensure uniqueness.
///
/// 1. Lowercase
/// 2. LaTeX label separators (`:`, `.`, `/`) and spaces become hyphens
/// 3. Other punctuation is dropped
/// 4. Repeats get a `-N` suffix
pub fn anchorize(label: &str, counts: &mut HashMap<String, usize>) -> String {
    let mut anchor = String::new();

    for ch in label.trim().chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            anchor.push(ch.to_ascii_lowercase());
        } else if !ch.is_ascii() && ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                anchor.push(lower);
            }
        } else if matches!(ch, ':' | '.' | '/' | ' ') {
            anchor.push('-');
        }
    }

    if anchor.is_empty() {
        anchor.push_str("label");
    }

    let entry = counts.entry(anchor.clone()).or_insert(0);
    if *entry > 0 {
        anchor.push_str(&format!("-{}", *entry));
    }
    *entry += 1;

    anchor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators_become_hyphens() {
        let mut counts = HashMap::new();
        assert_eq!(anchorize("fig:Results.2", &mut counts), "fig-results-2");
        assert_eq!(anchorize("sec/intro", &mut counts), "sec-intro");
    }

    #[test]
    fn deduplication() {
        let mut anchors = AnchorSet::new();
        assert_eq!(anchors.next_anchor("eq:1"), "eq-1");
        assert_eq!(anchors.next_anchor("eq:1"), "eq-1-1");
    }

    #[test]
    fn reserved_anchor_is_skipped() {
        let mut anchors = AnchorSet::new();
        anchors.reserve("outline");
        assert_eq!(anchors.next_anchor("outline"), "outline-1");
    }

    #[test]
    fn punctuation_only_label_falls_back() {
        let mut counts = HashMap::new();
        assert_eq!(anchorize("$$", &mut counts), "label");
    }

    #[test]
    fn unicode_letters_are_kept() {
        let mut counts = HashMap::new();
        assert_eq!(anchorize("sec:Übersicht", &mut counts), "sec-übersicht");
    }
}
