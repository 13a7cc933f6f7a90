use crate::models::{PackageEntry, SortOption};

/// Sorts `entries` in place. The sort is stable, so ties keep their order.
///
/// Strings compare by code point; no case folding or collation.
pub fn sort_entries(entries: &mut [PackageEntry], option: SortOption) {
    match option {
        SortOption::None => {}
        SortOption::ByName => entries.sort_by(|a, b| a.display_name().cmp(b.display_name())),
        SortOption::ByPackageId => entries.sort_by(|a, b| a.package_id().cmp(b.package_id())),
    }
}
