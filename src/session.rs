//! Picker session state: the accumulating filter string, the bounded
//! candidate list and the keyboard/mouse selection index.
//!
//! Everything here is plain data so the popup's behavior can be tested
//! off-browser; the DOM side of the controller lives in `popup`.

use crate::stores::emoji_store::{self, Candidate, Emoji, EMOJIS, EMOTICONS};

/// Display cap for the candidate list.
pub const MAX_CANDIDATES: usize = 15;

/// Session phase while the popup is visible. The closed state is the
/// absence of a session in the controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    Browsing,
    Filtering,
}

/// Outcome of a backspace keystroke.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BackspaceOutcome {
    /// Filter shortened by one character; re-render.
    Shortened,
    /// Filter was already empty; the session should close.
    CloseSession,
}

#[derive(Clone, Debug, Default)]
pub struct PickerSession {
    filter: String,
    selected: usize,
    /// Hover selection is honored only while set; cleared on any keydown
    /// and re-armed by the next mouse movement, so reflow-generated hover
    /// events cannot hijack keyboard navigation.
    pub accept_mouse_input: bool,
}

impl PickerSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.filter.is_empty() {
            Phase::Browsing
        } else {
            Phase::Filtering
        }
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Number of UTF-16 units to delete on insert, excluding the trigger
    /// character itself.
    pub fn padding(&self) -> usize {
        self.filter.encode_utf16().count()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Append a typed character (lowercased) and reset the selection to
    /// the top of the refreshed list.
    pub fn append_char(&mut self, ch: char) {
        for lower in ch.to_lowercase() {
            self.filter.push(lower);
        }
        self.selected = 0;
    }

    pub fn backspace(&mut self) -> BackspaceOutcome {
        if self.filter.is_empty() {
            return BackspaceOutcome::CloseSession;
        }
        self.filter.pop();
        self.selected = 0;
        BackspaceOutcome::Shortened
    }

    /// Move the selection down. No wraparound: at the end of the list the
    /// state is unchanged and `false` is returned.
    pub fn select_next(&mut self, count: usize) -> bool {
        if count == 0 || self.selected + 1 >= count {
            return false;
        }
        self.selected += 1;
        true
    }

    /// Move the selection up. No wraparound at the top.
    pub fn select_previous(&mut self, count: usize) -> bool {
        if count == 0 || self.selected == 0 {
            return false;
        }
        self.selected -= 1;
        true
    }

    /// Jump the selection to `index` (hover / click).
    pub fn select(&mut self, index: usize, count: usize) -> bool {
        if index >= count {
            return false;
        }
        self.selected = index;
        true
    }

    /// Whether a commit (Enter or click) has a candidate to act on. With
    /// an empty list the commit is a no-op and the popup stays open, so
    /// the user can backspace and refine; a stale surface snapshot, by
    /// contrast, skips the insertion but still ends the session.
    pub fn can_commit(&self, count: usize) -> bool {
        self.selected < count
    }

    /// The candidate list for the current filter, capped at
    /// [`MAX_CANDIDATES`].
    pub fn candidates(&self, history: &[&'static Emoji]) -> Vec<Candidate> {
        current_candidates(&self.filter, history)
    }
}

/// Compute the candidate list for a filter string.
///
/// A leading `:` switches to the emoticon table with the remainder as the
/// sub-filter. An empty filter shows history (most-recent-first, deduped
/// against the defaults) followed by the top of the emoji table.
pub fn current_candidates(filter: &str, history: &[&'static Emoji]) -> Vec<Candidate> {
    if let Some(sub_filter) = filter.strip_prefix(':') {
        return emoticon_candidates(sub_filter);
    }

    if filter.is_empty() {
        let mut list: Vec<Candidate> = history
            .iter()
            .copied()
            .take(MAX_CANDIDATES)
            .map(Candidate::Emoji)
            .collect();

        list.extend(
            EMOJIS
                .iter()
                .filter(|e| !history.iter().any(|h| h.hex == e.hex))
                .take(MAX_CANDIDATES)
                .map(Candidate::Emoji),
        );

        list.truncate(MAX_CANDIDATES);
        return list;
    }

    EMOJIS
        .iter()
        .map(Candidate::Emoji)
        .filter(|c| emoji_store::matches_filter(c, filter))
        .take(MAX_CANDIDATES)
        .collect()
}

fn emoticon_candidates(sub_filter: &str) -> Vec<Candidate> {
    EMOTICONS
        .iter()
        .map(Candidate::Emoticon)
        .filter(|c| sub_filter.is_empty() || emoji_store::matches_filter(c, sub_filter))
        .take(MAX_CANDIDATES)
        .collect()
}

/// Scroll placement for the highlighted row, mirroring the three cases of
/// the list scroller: clamped to the top, clamped to the bottom, or
/// centered on the selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScrollCase {
    ClampTop,
    ClampBottom,
    Center,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollPlan {
    pub case: ScrollCase,
    pub scroll_top: f64,
    pub highlight_top: f64,
}

/// Decide where the list should scroll and where the highlight should sit
/// so the selected row stays visible.
///
/// All inputs are pixel measurements of the rendered list: the selected
/// row's offset and height, the visible list height and the full scroll
/// height.
pub fn plan_scroll(
    selected_top: f64,
    selected_height: f64,
    list_height: f64,
    scroll_height: f64,
) -> ScrollPlan {
    let max_scroll = (scroll_height - list_height).max(0.0);
    let center_offset = (list_height - selected_height) / 2.0;
    let scroll_amount = selected_top - center_offset;

    if scroll_amount < 0.0 {
        ScrollPlan {
            case: ScrollCase::ClampTop,
            scroll_top: 0.0,
            highlight_top: selected_top,
        }
    } else if scroll_amount > max_scroll {
        ScrollPlan {
            case: ScrollCase::ClampBottom,
            scroll_top: max_scroll,
            highlight_top: selected_top - max_scroll,
        }
    } else {
        ScrollPlan {
            case: ScrollCase::Center,
            scroll_top: scroll_amount,
            highlight_top: center_offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::emoji_store::find_by_hex;

    fn names(candidates: &[Candidate]) -> Vec<&'static str> {
        candidates.iter().map(|c| c.name()).collect()
    }

    #[test]
    fn empty_filter_shows_history_then_defaults() {
        let history = vec![find_by_hex("1f680").unwrap(), find_by_hex("1f525").unwrap()];
        let list = current_candidates("", &history);

        assert_eq!(list.len(), MAX_CANDIDATES);
        assert_eq!(list[0].name(), "rocket");
        assert_eq!(list[1].name(), "fire");
        // defaults follow in table order
        assert_eq!(list[2].name(), "grinning");
    }

    #[test]
    fn empty_filter_dedupes_history_against_defaults() {
        // "grinning" is both in history and at the top of the table
        let history = vec![find_by_hex("1f600").unwrap()];
        let list = current_candidates("", &history);

        let grinning_count = list.iter().filter(|c| c.name() == "grinning").count();
        assert_eq!(grinning_count, 1);
        assert_eq!(list[0].name(), "grinning");
        assert_eq!(list.len(), MAX_CANDIDATES);
    }

    #[test]
    fn filtered_results_all_contain_filter_and_respect_cap() {
        let list = current_candidates("a", &[]);
        assert!(list.len() <= MAX_CANDIDATES);
        assert!(!list.is_empty());
        for c in &list {
            match c {
                Candidate::Emoji(e) => {
                    assert!(e.name.contains('a') || e.keywords.contains('a'))
                }
                Candidate::Emoticon(_) => panic!("emoji filter produced an emoticon"),
            }
        }
    }

    #[test]
    fn filter_matches_keywords_not_just_names() {
        let list = current_candidates("caffeine", &[]);
        assert_eq!(names(&list), vec!["coffee"]);
    }

    #[test]
    fn unmatched_filter_yields_empty_list() {
        assert!(current_candidates("zzzzqqqq", &[]).is_empty());
    }

    #[test]
    fn leading_colon_switches_to_emoticons() {
        let list = current_candidates(":smi", &[]);
        assert!(!list.is_empty());
        for c in &list {
            assert!(matches!(c, Candidate::Emoticon(_)));
            assert!(c.name().contains("smi") || matches!(c, Candidate::Emoticon(e) if e.keywords.contains("smi")));
        }
    }

    #[test]
    fn bare_colon_shows_leading_emoticons() {
        let list = current_candidates(":", &[]);
        assert_eq!(list.len(), MAX_CANDIDATES.min(EMOTICONS.len()));
        assert_eq!(list[0].name(), "shrug");
    }

    #[test]
    fn append_char_lowercases_and_resets_selection() {
        let mut session = PickerSession::new();
        session.select(3, 10);
        session.append_char('G');
        session.append_char('R');
        assert_eq!(session.filter(), "gr");
        assert_eq!(session.selected(), 0);
        assert_eq!(session.phase(), Phase::Filtering);
    }

    #[test]
    fn backspace_shortens_by_exactly_one() {
        let mut session = PickerSession::new();
        session.append_char('a');
        session.append_char('b');
        assert_eq!(session.backspace(), BackspaceOutcome::Shortened);
        assert_eq!(session.filter(), "a");
        assert_eq!(session.backspace(), BackspaceOutcome::Shortened);
        assert_eq!(session.filter(), "");
        assert_eq!(session.phase(), Phase::Browsing);
    }

    #[test]
    fn backspace_on_empty_filter_closes_session() {
        let mut session = PickerSession::new();
        assert_eq!(session.backspace(), BackspaceOutcome::CloseSession);
        assert_eq!(session.filter(), "");
    }

    #[test]
    fn padding_counts_utf16_units() {
        let mut session = PickerSession::new();
        session.append_char('g');
        session.append_char('r');
        session.append_char('i');
        assert_eq!(session.padding(), 3);
    }

    #[test]
    fn navigation_stays_in_bounds_without_wraparound() {
        let mut session = PickerSession::new();

        assert!(!session.select_previous(5));
        assert_eq!(session.selected(), 0);

        assert!(session.select_next(3));
        assert!(session.select_next(3));
        assert_eq!(session.selected(), 2);

        // at the last row, next is a no-op
        assert!(!session.select_next(3));
        assert_eq!(session.selected(), 2);

        assert!(session.select_previous(3));
        assert_eq!(session.selected(), 1);
    }

    #[test]
    fn navigation_on_empty_list_is_noop() {
        let mut session = PickerSession::new();
        assert!(!session.select_next(0));
        assert!(!session.select_previous(0));
        assert!(!session.select(0, 0));
        assert_eq!(session.selected(), 0);
    }

    #[test]
    fn commit_on_empty_list_is_noop() {
        let mut session = PickerSession::new();
        // no matches: Enter must not end the session
        assert!(!session.can_commit(0));

        assert!(session.can_commit(3));
        session.select(2, 3);
        assert!(session.can_commit(3));
    }

    #[test]
    fn scroll_plan_clamps_to_top() {
        // selection near the top: unclamped center target would be negative
        let plan = plan_scroll(10.0, 20.0, 100.0, 300.0);
        assert_eq!(plan.case, ScrollCase::ClampTop);
        assert_eq!(plan.scroll_top, 0.0);
        assert_eq!(plan.highlight_top, 10.0);
    }

    #[test]
    fn scroll_plan_clamps_to_bottom() {
        // selection near the end: center target exceeds max scroll
        let plan = plan_scroll(290.0, 20.0, 100.0, 300.0);
        assert_eq!(plan.case, ScrollCase::ClampBottom);
        assert_eq!(plan.scroll_top, 200.0);
        assert_eq!(plan.highlight_top, 90.0);
    }

    #[test]
    fn scroll_plan_centers_in_between() {
        let plan = plan_scroll(150.0, 20.0, 100.0, 300.0);
        assert_eq!(plan.case, ScrollCase::Center);
        assert_eq!(plan.scroll_top, 110.0);
        assert_eq!(plan.highlight_top, 40.0);
    }
}
