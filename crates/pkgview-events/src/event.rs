use pkgview_core::models::PackageEntry;

use crate::OperationId;

/// Events emitted while applications are loaded in the background.
#[derive(Debug, Clone)]
pub enum LoadEvent {
    /// The listing is known and resolution is starting.
    Started { op_id: OperationId, total: usize },
    /// A package has been resolved.
    ///
    /// `percent` is `index * 100 / total` for the zero-based index of that
    /// package, so it never reaches 100.
    Progress { op_id: OperationId, percent: u8 },
    /// All packages are resolved. Sent exactly once per load.
    Complete {
        op_id: OperationId,
        entries: Vec<PackageEntry>,
    },
}

impl LoadEvent {
    pub fn op_id(&self) -> OperationId {
        match self {
            LoadEvent::Started { op_id, .. }
            | LoadEvent::Progress { op_id, .. }
            | LoadEvent::Complete { op_id, .. } => *op_id,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, LoadEvent::Complete { .. })
    }
}

/// Progress of the package at zero-based `index` out of `total`.
pub fn progress_percent(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = index.saturating_mul(100) / total;
    u8::try_from(percent.min(100)).unwrap_or(100)
}
