//! Attaching comments to the nodes they document.
//!
//! Comments are collected by a separate scan of the file and attached by
//! position, the way the Go parser does it:
//!
//! - comments that start on the line where the previous token ended belong to
//!   that token and are never documentation;
//! - the remaining comments form groups of adjacent lines;
//! - the last group is the lead (doc) comment of the next node when it ends on
//!   the line immediately above that node.

use crate::syntax::{Comment, CommentGroup, LineIndex};

/// The doc comment of a node starting at `next_start`, considering only
/// comments after `prev_end` (the end of the previous token, if any).
pub fn lead_comment(
    comments: &[Comment],
    lines: &LineIndex,
    prev_end: Option<usize>,
    next_start: usize,
) -> Option<CommentGroup> {
    let lower = prev_end.unwrap_or(0);
    let mut between = comments
        .iter()
        .filter(|c| c.span.start >= lower && c.span.end <= next_start)
        .peekable();

    // Skip the line comment of the previous token.
    if let Some(end) = prev_end {
        let mut end_line = lines.line(end.saturating_sub(1));
        while let Some(comment) = between.peek() {
            if lines.line(comment.span.start) != end_line {
                break;
            }
            end_line = lines.line(comment.span.end.saturating_sub(1));
            between.next();
        }
    }

    let groups = group(between, lines);
    let last = groups.into_iter().last()?;
    let last_line = lines.line(last.span().end.saturating_sub(1));
    if last_line + 1 == lines.line(next_start) {
        Some(last)
    } else {
        None
    }
}

/// The first comment on the line where a node ends, placed after the node and
/// before `limit`.
pub fn line_comment(
    comments: &[Comment],
    lines: &LineIndex,
    node_end: usize,
    limit: usize,
) -> Option<Comment> {
    let end_line = lines.line(node_end.saturating_sub(1));
    comments
        .iter()
        .find(|c| {
            c.span.start >= node_end
                && c.span.start < limit
                && lines.line(c.span.start) == end_line
        })
        .cloned()
}

/// Splits comments into groups separated by at least one blank line.
pub fn group<'a>(
    comments: impl IntoIterator<Item = &'a Comment>,
    lines: &LineIndex,
) -> Vec<CommentGroup> {
    let mut groups: Vec<CommentGroup> = Vec::new();
    let mut last_line: Option<usize> = None;

    for comment in comments {
        let start_line = lines.line(comment.span.start);
        let adjacent = matches!(last_line, Some(line) if start_line <= line + 1);
        match groups.last_mut() {
            Some(current) if adjacent => current.list.push(comment.clone()),
            _ => groups.push(CommentGroup {
                list: vec![comment.clone()],
            }),
        }
        last_line = Some(lines.line(comment.span.end.saturating_sub(1)));
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Span;

    /// Builds comments for every `//` in `text`.
    fn comments_of(text: &str) -> Vec<Comment> {
        let mut comments = Vec::new();
        let mut offset = 0;
        for line in text.split_inclusive('\n') {
            if let Some(pos) = line.find("//") {
                let body = line[pos..].trim_end();
                let start = offset + pos;
                comments.push(Comment::new(body, Span::new(start, start + body.len())));
            }
            offset += line.len();
        }
        comments
    }

    #[test]
    fn doc_must_touch_the_node() {
        let text = "// a\n// b\ntype X int\n";
        let comments = comments_of(text);
        let lines = LineIndex::new(text);
        let start = text.find("type").unwrap();
        let doc = lead_comment(&comments, &lines, None, start).unwrap();
        assert_eq!(doc.list.len(), 2);
        assert_eq!(doc.list[1].text, "// b");

        let text = "// a\n\ntype X int\n";
        let comments = comments_of(text);
        let lines = LineIndex::new(text);
        let start = text.find("type").unwrap();
        assert!(lead_comment(&comments, &lines, None, start).is_none());
    }

    #[test]
    fn blank_line_splits_groups() {
        let text = "// a\n\n// b\ntype X int\n";
        let comments = comments_of(text);
        let lines = LineIndex::new(text);
        let start = text.find("type").unwrap();
        let doc = lead_comment(&comments, &lines, None, start).unwrap();
        assert_eq!(doc.list.len(), 1);
        assert_eq!(doc.list[0].text, "// b");
    }

    #[test]
    fn trailing_comment_of_previous_node_is_not_doc() {
        let text = "var a = 1 // trailing\ntype X int\n";
        let comments = comments_of(text);
        let lines = LineIndex::new(text);
        let prev_end = text.find(" //").unwrap();
        let start = text.find("type").unwrap();
        assert!(lead_comment(&comments, &lines, Some(prev_end), start).is_none());
    }

    #[test]
    fn finds_line_comment() {
        let text = "\tString() string // @method\n\tOther()\n";
        let comments = comments_of(text);
        let lines = LineIndex::new(text);
        let end = text.find(" //").unwrap();
        let comment = line_comment(&comments, &lines, end, text.len()).unwrap();
        assert_eq!(comment.text, "// @method");

        let other_end = text.rfind(')').unwrap() + 1;
        assert!(line_comment(&comments, &lines, other_end, text.len()).is_none());
    }
}
