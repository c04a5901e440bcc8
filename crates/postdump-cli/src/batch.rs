//! Resume and limit bookkeeping shared by the batch commands.

use std::ops::Range;

/// Input rows still to process when `done` rows already made it into the
/// output, capped at `limit` rows for this run.
pub(crate) fn pending_window(total: usize, done: usize, limit: Option<usize>) -> Range<usize> {
    let start = done.min(total);
    let end = limit.map_or(total, |n| start.saturating_add(n).min(total));
    start..end
}
