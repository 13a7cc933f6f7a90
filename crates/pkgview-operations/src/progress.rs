use std::sync::atomic::{AtomicU64, Ordering};

use pkgview_events::{progress_percent, EventSinkHandle, LoadEvent, OperationId};

/// Creates an `on_resolved(index, total)` callback that emits [`LoadEvent::Progress`].
pub fn create_progress_bridge(
    events: EventSinkHandle,
    op_id: OperationId,
) -> impl FnMut(usize, usize) + Send {
    move |index, total| {
        events.emit(LoadEvent::Progress {
            op_id,
            percent: progress_percent(index, total),
        });
    }
}

/// Generates a unique operation ID.
pub fn next_op_id() -> OperationId {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}
