use std::{sync::Arc, thread, time::Duration};

use pkgview_config::config::Config;
use tracing::{debug, trace, warn};

use crate::{
    models::{ApplicationFlags, Icon, LaunchableApp, PackageEntry, SortDescriptor, SortOption},
    registry::{DesktopRegistry, PackageRegistry},
    PkgviewResult,
};

/// The selectable orderings, in display order.
pub fn sort_options() -> Vec<SortDescriptor> {
    vec![
        SortDescriptor::new(None, Some("No sorting".to_string())),
        SortDescriptor::new(
            Some(SortOption::ByName),
            Some("By application name".to_string()),
        ),
        SortDescriptor::new(
            Some(SortOption::ByPackageId),
            Some("By package name".to_string()),
        ),
    ]
}

/// Turns the registry's launcher listing into displayable entries.
///
/// Lookups never fail the batch: a missing label becomes an empty name and a
/// missing icon becomes the default icon.
#[derive(Clone)]
pub struct PackageEnumerator {
    registry: Arc<dyn PackageRegistry>,
    default_icon: Icon,
    lookup_delay: Duration,
}

impl PackageEnumerator {
    pub fn new(registry: Arc<dyn PackageRegistry>) -> Self {
        Self {
            registry,
            default_icon: Icon::bundled(),
            lookup_delay: Duration::ZERO,
        }
    }

    pub fn from_config(config: &Config) -> PkgviewResult<Self> {
        let registry = DesktopRegistry::from_config(config)?;
        let mut enumerator =
            Self::new(Arc::new(registry)).with_lookup_delay(config.lookup_delay());
        if let Some(path) = config.default_icon_path()? {
            enumerator = enumerator.with_default_icon(Icon::from_path(path));
        }
        Ok(enumerator)
    }

    pub fn with_default_icon(mut self, icon: Icon) -> Self {
        self.default_icon = icon;
        self
    }

    pub fn with_lookup_delay(mut self, delay: Duration) -> Self {
        self.lookup_delay = delay;
        self
    }

    pub fn default_icon(&self) -> &Icon {
        &self.default_icon
    }

    pub fn sort_options(&self) -> Vec<SortDescriptor> {
        sort_options()
    }

    /// Launchable packages, without system packages unless `include_system`.
    ///
    /// A failing listing is logged and yields no packages.
    pub fn launchable(&self, include_system: bool) -> Vec<LaunchableApp> {
        match self.registry.launchable_packages() {
            Ok(apps) => {
                apps.into_iter()
                    .filter(|app| include_system || !app.is_system())
                    .collect()
            }
            Err(err) => {
                warn!("Failed to list launchable applications: {err}");
                Vec::new()
            }
        }
    }

    /// Builds the entry for one package.
    pub fn resolve(&self, app: &LaunchableApp, include_system: bool) -> PackageEntry {
        let package_id = app.package_id.as_str();

        let display_name = self
            .registry
            .application_label(package_id)
            .unwrap_or_else(|err| {
                warn!("No name for {package_id}: {err}");
                String::new()
            });

        let icon = self
            .registry
            .application_icon(package_id)
            .unwrap_or_else(|err| {
                debug!("Using default icon for {package_id}: {err}");
                self.default_icon.clone()
            });

        let is_system = include_system
            && self
                .registry
                .application_flags(package_id)
                .map(|flags| flags.contains(ApplicationFlags::SYSTEM))
                .unwrap_or_else(|err| {
                    warn!("No flags for {package_id}: {err}");
                    false
                });

        if !self.lookup_delay.is_zero() {
            thread::sleep(self.lookup_delay);
        }

        trace!("resolved {package_id} as '{display_name}'");
        PackageEntry::new(display_name, package_id, icon, is_system)
    }

    /// Resolves `apps` in order, calling `on_resolved(index, total)` after each one.
    pub fn resolve_all<F>(
        &self,
        apps: &[LaunchableApp],
        include_system: bool,
        mut on_resolved: F,
    ) -> Vec<PackageEntry>
    where
        F: FnMut(usize, usize),
    {
        let total = apps.len();
        apps.iter()
            .enumerate()
            .map(|(index, app)| {
                let entry = self.resolve(app, include_system);
                on_resolved(index, total);
                entry
            })
            .collect()
    }

    pub fn enumerate_with<F>(&self, include_system: bool, on_resolved: F) -> Vec<PackageEntry>
    where
        F: FnMut(usize, usize),
    {
        let apps = self.launchable(include_system);
        self.resolve_all(&apps, include_system, on_resolved)
    }

    pub fn enumerate(&self, include_system: bool) -> Vec<PackageEntry> {
        self.enumerate_with(include_system, |_, _| {})
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
        time::Instant,
    };

    use super::*;
    use crate::{error::RegistryError, registry::RegistryResult};

    /// In-memory registry. Missing map entries make the lookup fail.
    #[derive(Default)]
    pub struct FakeRegistry {
        pub apps: Vec<LaunchableApp>,
        pub labels: HashMap<String, String>,
        pub icons: HashMap<String, Icon>,
        pub flags: HashMap<String, ApplicationFlags>,
        pub fail_listing: bool,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeRegistry {
        pub fn with_app(mut self, id: &str, label: &str, system: bool) -> Self {
            let flags = if system {
                ApplicationFlags::SYSTEM
            } else {
                ApplicationFlags::empty()
            };
            self.apps.push(LaunchableApp {
                package_id: id.to_string(),
                flags,
            });
            self.labels.insert(id.to_string(), label.to_string());
            self.flags.insert(id.to_string(), flags);
            self
        }
    }

    impl PackageRegistry for FakeRegistry {
        fn launchable_packages(&self) -> RegistryResult<Vec<LaunchableApp>> {
            if self.fail_listing {
                return Err(RegistryError::PackageNotFound("*".into()));
            }
            Ok(self.apps.clone())
        }

        fn application_flags(&self, package_id: &str) -> RegistryResult<ApplicationFlags> {
            self.calls.lock().unwrap().push(format!("flags:{package_id}"));
            self.flags
                .get(package_id)
                .copied()
                .ok_or_else(|| RegistryError::PackageNotFound(package_id.into()))
        }

        fn application_label(&self, package_id: &str) -> RegistryResult<String> {
            self.labels
                .get(package_id)
                .cloned()
                .ok_or_else(|| RegistryError::PackageNotFound(package_id.into()))
        }

        fn application_icon(&self, package_id: &str) -> RegistryResult<Icon> {
            self.icons
                .get(package_id)
                .cloned()
                .ok_or_else(|| RegistryError::IconNotFound(package_id.into()))
        }
    }

    fn enumerator(registry: FakeRegistry) -> PackageEnumerator {
        PackageEnumerator::new(Arc::new(registry))
    }

    #[test]
    fn test_excludes_system_packages() {
        let registry = FakeRegistry::default()
            .with_app("ru.sberbankmobile", "Sberbank", false)
            .with_app("com.android.settings", "Settings", true)
            .with_app("ru.package.app", "Application", false);

        let entries = enumerator(registry).enumerate(false);

        let ids: Vec<_> = entries.iter().map(PackageEntry::package_id).collect();
        assert_eq!(ids, vec!["ru.sberbankmobile", "ru.package.app"]);
        assert!(entries.iter().all(|entry| !entry.is_system()));
    }

    #[test]
    fn test_includes_and_marks_system_packages() {
        let registry = FakeRegistry::default()
            .with_app("ru.sberbankmobile", "Sberbank", false)
            .with_app("com.android.settings", "Settings", true);

        let entries = enumerator(registry).enumerate(true);

        assert_eq!(entries.len(), 2);
        assert!(!entries[0].is_system());
        assert!(entries[1].is_system());
        assert_eq!(entries[1].display_name(), "Settings");
    }

    #[test]
    fn test_flags_not_queried_when_system_excluded() {
        let registry = Arc::new(FakeRegistry::default().with_app("org.app", "App", false));
        let enumerator = PackageEnumerator::new(registry.clone());

        enumerator.enumerate(false);
        assert!(registry.calls.lock().unwrap().is_empty());

        enumerator.enumerate(true);
        assert_eq!(*registry.calls.lock().unwrap(), vec!["flags:org.app"]);
    }

    #[test]
    fn test_degraded_lookups() {
        let mut registry = FakeRegistry::default().with_app("org.broken", "Broken", true);
        registry.labels.clear();
        registry.flags.clear();

        let default_icon = Icon::from_path("/default.png");
        let entries = enumerator(registry)
            .with_default_icon(default_icon.clone())
            .enumerate(true);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].display_name(), "");
        assert_eq!(entries[0].icon(), &default_icon);
        assert!(!entries[0].is_system());
    }

    #[test]
    fn test_icon_lookup() {
        let icon = Icon::from_path("/icons/app.png");
        let mut registry = FakeRegistry::default().with_app("org.app", "App", false);
        registry.icons.insert("org.app".into(), icon.clone());

        let entries = enumerator(registry).enumerate(false);
        assert_eq!(entries[0].icon(), &icon);
    }

    #[test]
    fn test_failed_listing_is_empty() {
        let mut registry = FakeRegistry::default().with_app("org.app", "App", false);
        registry.fail_listing = true;

        assert!(enumerator(registry).enumerate(true).is_empty());
    }

    #[test]
    fn test_enumerate_with_reports_each_package() {
        let registry = FakeRegistry::default()
            .with_app("a", "A", false)
            .with_app("b", "B", false)
            .with_app("c", "C", false);

        let mut steps = Vec::new();
        let entries = enumerator(registry).enumerate_with(false, |index, total| {
            steps.push((index, total));
        });

        assert_eq!(entries.len(), 3);
        assert_eq!(steps, vec![(0, 3), (1, 3), (2, 3)]);
    }

    #[test]
    fn test_lookup_delay() {
        let registry = FakeRegistry::default()
            .with_app("a", "A", false)
            .with_app("b", "B", false);

        let start = Instant::now();
        enumerator(registry)
            .with_lookup_delay(Duration::from_millis(20))
            .enumerate(false);
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn test_sort_options() {
        let options = sort_options();

        let pairs: Vec<_> = options
            .iter()
            .map(|descriptor| (descriptor.option(), descriptor.description()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (SortOption::None, "No sorting"),
                (SortOption::ByName, "By application name"),
                (SortOption::ByPackageId, "By package name"),
            ]
        );
    }
}
