use crate::host::ContentChange;

#[derive(Debug, PartialEq, Eq)]
pub struct EditDeltas {
    /// 1 per notification carrying at least one change. Models an edit
    /// event, not a character count.
    pub keystrokes: u64,
    pub lines_added: u64,
    pub lines_deleted: u64,
}

impl EditDeltas {
    pub fn is_empty(&self) -> bool {
        self.keystrokes == 0 && self.lines_added == 0 && self.lines_deleted == 0
    }
}

/// Aggregates the deltas of one content-change notification: newlines in the
/// replacement text count as added lines, lines spanned by the replaced
/// range count as deleted lines.
pub fn edit_deltas(changes: &[ContentChange]) -> EditDeltas {
    let mut lines_added = 0u64;
    let mut lines_deleted = 0u64;
    for change in changes {
        lines_added += change.text.matches('\n').count() as u64;
        lines_deleted += u64::from(change.end_line.saturating_sub(change.start_line));
    }
    EditDeltas {
        keystrokes: u64::from(!changes.is_empty()),
        lines_added,
        lines_deleted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(text: &str, start_line: u32, end_line: u32) -> ContentChange {
        ContentChange {
            text: text.into(),
            start_line,
            end_line,
        }
    }

    #[test]
    fn no_changes_means_no_deltas() {
        let deltas = edit_deltas(&[]);

        assert!(deltas.is_empty());
    }

    #[test]
    fn single_character_edit_is_one_keystroke() {
        let deltas = edit_deltas(&[change("x", 4, 4)]);

        assert_eq!(deltas.keystrokes, 1);
        assert_eq!(deltas.lines_added, 0);
        assert_eq!(deltas.lines_deleted, 0);
    }

    #[test]
    fn pasted_block_counts_newlines_once() {
        // One paste of three lines is still a single keystroke.
        let deltas = edit_deltas(&[change("fn a() {}\nfn b() {}\n", 0, 0)]);

        assert_eq!(deltas.keystrokes, 1);
        assert_eq!(deltas.lines_added, 2);
        assert_eq!(deltas.lines_deleted, 0);
    }

    #[test]
    fn deleted_range_counts_spanned_lines() {
        let deltas = edit_deltas(&[change("", 2, 5)]);

        assert_eq!(deltas.lines_deleted, 3);
        assert_eq!(deltas.lines_added, 0);
    }

    #[test]
    fn multiple_changes_sum_within_notification() {
        let deltas = edit_deltas(&[change("a\nb", 0, 0), change("", 3, 4)]);

        assert_eq!(deltas.keystrokes, 1);
        assert_eq!(deltas.lines_added, 1);
        assert_eq!(deltas.lines_deleted, 1);
    }
}
