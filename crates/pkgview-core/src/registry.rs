use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError, RwLock},
};

use pkgview_config::config::{ApplicationDir, Config};
use pkgview_utils::fs::{collect_files_sorted, read_to_string};
use tracing::{debug, trace, warn};

use crate::{
    desktop_entry::DesktopEntry,
    error::RegistryError,
    models::{ApplicationFlags, Icon, LaunchableApp},
    PkgviewResult,
};

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

const DESKTOP_EXTENSION: &str = "desktop";
const ICON_EXTENSIONS: [&str; 3] = ["png", "svg", "xpm"];
const ICON_THEME: &str = "icons/hicolor";
const PIXMAPS_DIR: &str = "/usr/share/pixmaps";

/// Source of installed applications.
///
/// Per-package queries may fail independently of each other.
pub trait PackageRegistry: Send + Sync {
    /// All packages exposing a launcher entry point, in preference order.
    fn launchable_packages(&self) -> RegistryResult<Vec<LaunchableApp>>;

    fn application_flags(&self, package_id: &str) -> RegistryResult<ApplicationFlags>;

    fn application_label(&self, package_id: &str) -> RegistryResult<String>;

    fn application_icon(&self, package_id: &str) -> RegistryResult<Icon>;
}

struct InstalledApp {
    path: PathBuf,
    entry: DesktopEntry,
    flags: ApplicationFlags,
}

#[derive(Default)]
struct Snapshot {
    scanned: bool,
    order: Vec<String>,
    apps: HashMap<String, InstalledApp>,
}

/// Registry backed by XDG desktop entries.
pub struct DesktopRegistry {
    application_dirs: Vec<ApplicationDir>,
    icon_dirs: Vec<PathBuf>,
    locale: Option<String>,
    snapshot: RwLock<Snapshot>,
    icon_cache: Mutex<HashMap<PathBuf, Icon>>,
}

impl DesktopRegistry {
    pub fn new(
        application_dirs: Vec<ApplicationDir>,
        icon_dirs: Vec<PathBuf>,
        locale: Option<String>,
    ) -> Self {
        Self {
            application_dirs,
            icon_dirs,
            locale,
            snapshot: RwLock::new(Snapshot::default()),
            icon_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &Config) -> PkgviewResult<Self> {
        Ok(Self::new(
            config.get_application_dirs()?,
            config.get_icon_dirs()?,
            config.locale(),
        ))
    }

    pub fn application_dirs(&self) -> &[ApplicationDir] {
        &self.application_dirs
    }

    fn scan(&self) -> Snapshot {
        let mut snapshot = Snapshot {
            scanned: true,
            ..Default::default()
        };
        let mut seen = HashSet::new();

        for dir in &self.application_dirs {
            let files = match collect_files_sorted(&dir.path, DESKTOP_EXTENSION) {
                Ok(files) => files,
                Err(err) => {
                    warn!("{err}");
                    continue;
                }
            };

            let flags = if dir.system {
                ApplicationFlags::SYSTEM
            } else {
                ApplicationFlags::empty()
            };

            for path in files {
                let Some(id) = desktop_file_id(&dir.path, &path) else {
                    continue;
                };
                if seen.contains(&id) {
                    trace!("{} shadowed by an earlier entry", path.display());
                    continue;
                }

                let content = match read_to_string(&path) {
                    Ok(content) => content,
                    Err(err) => {
                        warn!("{err}");
                        continue;
                    }
                };
                seen.insert(id.clone());

                let entry = DesktopEntry::parse(&content);
                if !entry.is_launchable() {
                    trace!("{id} is not launchable");
                    continue;
                }

                snapshot.order.push(id.clone());
                snapshot.apps.insert(
                    id,
                    InstalledApp {
                        path,
                        entry,
                        flags,
                    },
                );
            }
        }

        debug!(
            "found {} launchable applications in {} directories",
            snapshot.order.len(),
            self.application_dirs.len()
        );
        snapshot
    }

    fn with_app<T, F>(&self, package_id: &str, f: F) -> RegistryResult<T>
    where
        F: FnOnce(&InstalledApp) -> RegistryResult<T>,
    {
        {
            let snapshot = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
            if snapshot.scanned {
                return snapshot
                    .apps
                    .get(package_id)
                    .ok_or_else(|| RegistryError::PackageNotFound(package_id.to_string()))
                    .and_then(f);
            }
        }

        let fresh = self.scan();
        let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        *snapshot = fresh;
        snapshot
            .apps
            .get(package_id)
            .ok_or_else(|| RegistryError::PackageNotFound(package_id.to_string()))
            .and_then(f)
    }

    fn cached_icon(&self, path: PathBuf) -> Icon {
        let mut cache = self.icon_cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache
            .entry(path)
            .or_insert_with_key(|path| Icon::from_path(path.clone()))
            .clone()
    }

    fn find_icon(&self, name: &str) -> Option<PathBuf> {
        let icon_path = Path::new(name);
        if icon_path.is_absolute() {
            return icon_path.is_file().then(|| icon_path.to_path_buf());
        }
        if name.contains('/') {
            return None;
        }

        let name = ICON_EXTENSIONS
            .iter()
            .find_map(|ext| name.strip_suffix(&format!(".{ext}")))
            .unwrap_or(name);

        for data_dir in &self.icon_dirs {
            let theme_dir = data_dir.join(ICON_THEME);
            for size_dir in theme_size_dirs(&theme_dir) {
                if let Some(found) = find_with_extensions(&size_dir.join("apps"), name) {
                    return Some(found);
                }
            }
        }

        self.icon_dirs
            .iter()
            .map(|dir| dir.join("pixmaps"))
            .chain(std::iter::once(PathBuf::from(PIXMAPS_DIR)))
            .find_map(|dir| find_with_extensions(&dir, name))
    }
}

impl PackageRegistry for DesktopRegistry {
    fn launchable_packages(&self) -> RegistryResult<Vec<LaunchableApp>> {
        let fresh = self.scan();
        let apps = fresh
            .order
            .iter()
            .filter_map(|id| {
                fresh.apps.get(id).map(|app| {
                    LaunchableApp {
                        package_id: id.clone(),
                        flags: app.flags,
                    }
                })
            })
            .collect();

        let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        *snapshot = fresh;
        Ok(apps)
    }

    fn application_flags(&self, package_id: &str) -> RegistryResult<ApplicationFlags> {
        self.with_app(package_id, |app| Ok(app.flags))
    }

    fn application_label(&self, package_id: &str) -> RegistryResult<String> {
        self.with_app(package_id, |app| {
            app.entry
                .localized("Name", self.locale.as_deref())
                .map(str::to_string)
                .ok_or_else(|| RegistryError::MissingLabel(package_id.to_string()))
        })
    }

    fn application_icon(&self, package_id: &str) -> RegistryResult<Icon> {
        let icon_name = self.with_app(package_id, |app| {
            app.entry
                .get("Icon")
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .ok_or_else(|| {
                    trace!("{} has no Icon key", app.path.display());
                    RegistryError::IconNotFound(package_id.to_string())
                })
        })?;

        self.find_icon(&icon_name)
            .map(|path| self.cached_icon(path))
            .ok_or_else(|| RegistryError::IconNotFound(package_id.to_string()))
    }
}

/// Desktop file ID of `path` relative to `base`: `a/b/c.desktop` → `a-b-c`.
fn desktop_file_id(base: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let relative = relative.to_str()?;
    let stem = relative.strip_suffix(".desktop")?;
    Some(stem.replace('/', "-"))
}

/// Size directories of an icon theme, largest first. `scalable` sorts first.
fn theme_size_dirs(theme_dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(theme_dir) else {
        return Vec::new();
    };

    let mut sized: Vec<(u32, PathBuf)> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?;
            let size = if name == "scalable" {
                u32::MAX
            } else {
                name.split('x').next()?.parse().ok()?
            };
            Some((size, path))
        })
        .collect();

    sized.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    sized.into_iter().map(|(_, path)| path).collect()
}

fn find_with_extensions(dir: &Path, name: &str) -> Option<PathBuf> {
    ICON_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{name}.{ext}")))
        .find(|candidate| candidate.is_file())
}
