//! String-scanning branch length lookup.
//!
//! This is the first-generation lookup that works on Newick text directly,
//! without building a node table. It only finds labels written verbatim in
//! the text: tip labels, internal node names, and synthetic labels in the
//! output of [`Tree::labeled_newick`](crate::model::Tree::labeled_newick)
//! when no decoration follows them.
//! For anything else use [`Tree::branch_length`](crate::model::Tree::branch_length).

/// Characters that end a branch length token.
const TOKEN_END: &[char] = &['(', ')', ',', ';'];

/// Returns the branch length text written after `label`.
///
/// Scans for `label:` where the label starts the string or follows `(`,
/// `)` or `,`, and returns the trimmed text between the colon and the next
/// `(`, `)`, `,` or `;`. Returns `None` if the label is not found with a
/// branch length or the text after the colon is empty.
///
/// # Example
/// ```
/// use cladekit::legacy::branch_length;
///
/// let newick = "((A:1.5,AB:2)95:0.25,C:1e-3);";
/// assert_eq!(branch_length(newick, "A"), Some("1.5"));
/// assert_eq!(branch_length(newick, "AB"), Some("2"));
/// assert_eq!(branch_length(newick, "C"), Some("1e-3"));
/// assert_eq!(branch_length(newick, "B"), None);
/// // Support values are indistinguishable from node names here
/// assert_eq!(branch_length(newick, "95"), Some("0.25"));
/// ```
pub fn branch_length<'a>(newick: &'a str, label: &str) -> Option<&'a str> {
    if label.is_empty() {
        return None;
    }

    let pattern = format!("{label}:");
    let mut start = 0;
    while let Some(offset) = newick[start..].find(&pattern) {
        let at = start + offset;
        let bounded = newick[..at]
            .chars()
            .next_back()
            .is_none_or(|c| matches!(c, '(' | ')' | ','));

        if bounded {
            let rest = &newick[at + pattern.len()..];
            let end = rest.find(TOKEN_END).unwrap_or(rest.len());
            let token = rest[..end].trim();
            return (!token.is_empty()).then_some(token);
        }
        start = at + pattern.len();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::newick::parse_str;

    #[test]
    fn test_requires_label_boundary() {
        let newick = "(XA:1,A:2);";
        assert_eq!(branch_length(newick, "A"), Some("2"));
        assert_eq!(branch_length(newick, "XA"), Some("1"));
    }

    #[test]
    fn test_label_at_start() {
        assert_eq!(branch_length("A:0.5;", "A"), Some("0.5"));
    }

    #[test]
    fn test_missing_or_empty_branch_length() {
        assert_eq!(branch_length("(A,B:1);", "A"), None);
        assert_eq!(branch_length("(A:,B:1);", "A"), None);
        assert_eq!(branch_length("(A:1,B:2);", ""), None);
    }

    #[test]
    fn test_synthetic_labels_in_labeled_newick() {
        let tree = parse_str("((A:1,B:2):3,C:4);").unwrap();
        let labeled = tree.labeled_newick();
        assert_eq!(branch_length(&labeled, "<1>"), Some("3"));
    }

    #[test]
    fn test_agrees_with_node_table_for_tips() {
        let newick = "((A:1.23e-5,B:2)0.9:3,(C:4,D:-0.5)0.8:6);";
        let tree = parse_str(newick).unwrap();
        for tip in tree.tip_labels() {
            let from_table = tree.branch_length(tip).unwrap().map(|bl| bl.as_str());
            assert_eq!(branch_length(newick, tip), from_table);
        }
    }
}
