use std::{
    fmt,
    hash::{Hash, Hasher},
    ops::{BitOr, BitOrAssign},
    path::{Path, PathBuf},
    sync::{Arc, LazyLock},
};

use serde::{Serialize, Serializer};

static BUNDLED_ICON: LazyLock<Icon> = LazyLock::new(|| Icon(Arc::new(IconSource::Bundled)));

/// Where the image behind an [`Icon`] came from.
#[derive(Debug, PartialEq, Eq)]
pub enum IconSource {
    File(PathBuf),
    Bundled,
}

/// Shared image handle.
///
/// Cloning is cheap. Two handles are equal only when they share the same
/// allocation, so two icons loaded separately from the same file differ.
#[derive(Clone, Debug)]
pub struct Icon(Arc<IconSource>);

impl Icon {
    pub fn from_path<P: Into<PathBuf>>(path: P) -> Self {
        Self(Arc::new(IconSource::File(path.into())))
    }

    /// The process-wide default icon.
    pub fn bundled() -> Self {
        BUNDLED_ICON.clone()
    }

    pub fn source(&self) -> &IconSource {
        &self.0
    }

    pub fn path(&self) -> Option<&Path> {
        match self.source() {
            IconSource::File(path) => Some(path),
            IconSource::Bundled => None,
        }
    }

    pub fn is_bundled(&self) -> bool {
        matches!(self.source(), IconSource::Bundled)
    }
}

impl PartialEq for Icon {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Icon {}

impl Hash for Icon {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source() {
            IconSource::File(path) => write!(f, "{}", path.display()),
            IconSource::Bundled => f.write_str("(default)"),
        }
    }
}

impl Serialize for Icon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.source() {
            IconSource::File(path) => serializer.serialize_str(&path.to_string_lossy()),
            IconSource::Bundled => serializer.serialize_none(),
        }
    }
}

/// One displayable application.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct PackageEntry {
    display_name: String,
    package_id: String,
    icon: Icon,
    is_system: bool,
}

impl PackageEntry {
    pub fn new<N, I>(display_name: N, package_id: I, icon: Icon, is_system: bool) -> Self
    where
        N: Into<String>,
        I: Into<String>,
    {
        Self {
            display_name: display_name.into(),
            package_id: package_id.into(),
            icon,
            is_system,
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn package_id(&self) -> &str {
        &self.package_id
    }

    pub fn icon(&self) -> &Icon {
        &self.icon
    }

    pub fn is_system(&self) -> bool {
        self.is_system
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SortOption {
    #[default]
    None,
    ByName,
    ByPackageId,
}

impl From<pkgview_config::listing::SortKey> for SortOption {
    fn from(key: pkgview_config::listing::SortKey) -> Self {
        use pkgview_config::listing::SortKey;

        match key {
            SortKey::None => SortOption::None,
            SortKey::Name => SortOption::ByName,
            SortKey::Package => SortOption::ByPackageId,
        }
    }
}

/// A sort option paired with its user-visible description.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SortDescriptor {
    option: SortOption,
    description: String,
}

impl SortDescriptor {
    pub fn new(option: Option<SortOption>, description: Option<String>) -> Self {
        Self {
            option: option.unwrap_or_default(),
            description: description.unwrap_or_default(),
        }
    }

    pub fn option(&self) -> SortOption {
        self.option
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for SortDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Registry flags of an installed application.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ApplicationFlags(u32);

impl ApplicationFlags {
    pub const SYSTEM: Self = Self(1);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ApplicationFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ApplicationFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// A package exposing a launcher entry point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchableApp {
    pub package_id: String,
    pub flags: ApplicationFlags,
}

impl LaunchableApp {
    pub fn is_system(&self) -> bool {
        self.flags.contains(ApplicationFlags::SYSTEM)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_icon_identity() {
        let a = Icon::from_path("/usr/share/pixmaps/app.png");
        let b = Icon::from_path("/usr/share/pixmaps/app.png");

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(Icon::bundled(), Icon::bundled());
        assert!(Icon::bundled().is_bundled());
        assert_eq!(a.path(), Some(Path::new("/usr/share/pixmaps/app.png")));
    }

    #[test]
    fn test_entry_equality_uses_icon_identity() {
        let icon = Icon::from_path("/icon.png");
        let a = PackageEntry::new("App", "org.app", icon.clone(), false);
        let b = PackageEntry::new("App", "org.app", icon, false);
        let c = PackageEntry::new("App", "org.app", Icon::from_path("/icon.png"), false);
        let d = PackageEntry::new("App", "org.app", b.icon().clone(), true);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);

        let set: HashSet<_> = [a.clone(), b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_entry_equality_covers_every_field() {
        let icon = Icon::from_path("/icon.png");
        let base = PackageEntry::new("App", "org.app", icon.clone(), false);

        assert_ne!(base, PackageEntry::new("Other", "org.app", icon.clone(), false));
        assert_ne!(base, PackageEntry::new("App", "org.other", icon.clone(), false));
        assert_ne!(base, PackageEntry::new("app", "org.app", icon, false));
    }

    #[test]
    fn test_entry_collections_compare_elementwise_in_order() {
        let icon = Icon::bundled();
        let first = PackageEntry::new("A", "org.a", icon.clone(), false);
        let second = PackageEntry::new("B", "org.b", icon.clone(), true);

        let listing = vec![first.clone(), second.clone()];
        let same = vec![
            PackageEntry::new("A", "org.a", icon.clone(), false),
            PackageEntry::new("B", "org.b", icon, true),
        ];

        assert_eq!(listing, same);
        assert_ne!(listing, vec![second.clone(), first.clone()]);
        assert_ne!(listing, vec![first]);
        assert_ne!(listing, Vec::new());
    }

    #[test]
    fn test_sort_descriptor_defaults() {
        let descriptor = SortDescriptor::new(None, None);
        assert_eq!(descriptor.option(), SortOption::None);
        assert_eq!(descriptor.description(), "");

        let descriptor = SortDescriptor::new(Some(SortOption::ByName), Some("By name".into()));
        assert_eq!(descriptor.option(), SortOption::ByName);
        assert_eq!(descriptor.to_string(), "By name");
    }

    #[test]
    fn test_application_flags() {
        let mut flags = ApplicationFlags::empty();
        assert!(!flags.contains(ApplicationFlags::SYSTEM));

        flags |= ApplicationFlags::SYSTEM;
        assert!(flags.contains(ApplicationFlags::SYSTEM));
        assert_eq!(flags.bits(), 1);

        let app = LaunchableApp {
            package_id: "org.app".into(),
            flags,
        };
        assert!(app.is_system());
    }

    #[test]
    fn test_entry_serialize() {
        let entry = PackageEntry::new("Files", "org.gnome.Nautilus", Icon::bundled(), true);
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["display_name"], "Files");
        assert_eq!(json["package_id"], "org.gnome.Nautilus");
        assert!(json["icon"].is_null());
        assert_eq!(json["is_system"], true);
    }
}
