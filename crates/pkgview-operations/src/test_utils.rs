use std::{
    cell::RefCell,
    collections::HashMap,
    rc::Rc,
    sync::Arc,
};

use pkgview_core::{
    enumerator::PackageEnumerator,
    error::RegistryError,
    models::{ApplicationFlags, Icon, LaunchableApp, PackageEntry, SortDescriptor, SortOption},
    registry::{PackageRegistry, RegistryResult},
};

use crate::presenter::PackagesView;

/// Thread stack larger than any user address space, so spawning always fails.
pub const UNSPAWNABLE_STACK: usize = 1 << 52;

/// In-memory registry. A label of `"!panic"` makes the lookup panic.
#[derive(Default)]
pub struct FakeRegistry {
    apps: Vec<LaunchableApp>,
    labels: HashMap<String, String>,
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
        self
    }

    pub fn sample() -> Self {
        Self::default()
            .with_app("ru.sberbankmobile", "Sberbank", false)
            .with_app("com.another.package.test", "Test", false)
            .with_app("ru.package.app", "Application", false)
    }

    pub fn into_enumerator(self) -> PackageEnumerator {
        PackageEnumerator::new(Arc::new(self))
    }
}

impl PackageRegistry for FakeRegistry {
    fn launchable_packages(&self) -> RegistryResult<Vec<LaunchableApp>> {
        Ok(self.apps.clone())
    }

    fn application_flags(&self, package_id: &str) -> RegistryResult<ApplicationFlags> {
        self.apps
            .iter()
            .find(|app| app.package_id == package_id)
            .map(|app| app.flags)
            .ok_or_else(|| RegistryError::PackageNotFound(package_id.into()))
    }

    fn application_label(&self, package_id: &str) -> RegistryResult<String> {
        match self.labels.get(package_id).map(String::as_str) {
            Some("!panic") => panic!("registry went away"),
            Some(label) => Ok(label.to_string()),
            None => Err(RegistryError::PackageNotFound(package_id.into())),
        }
    }

    fn application_icon(&self, package_id: &str) -> RegistryResult<Icon> {
        Err(RegistryError::IconNotFound(package_id.into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCall {
    ShowProgress,
    Percent(u8),
    HideProgress,
    Data(Vec<String>),
    SortOptions(Vec<SortOption>),
}

pub type CallLog = Rc<RefCell<Vec<ViewCall>>>;

/// View that records every notification into a log shared with the test.
pub struct RecordingView {
    log: CallLog,
}

impl RecordingView {
    pub fn new() -> (Rc<Self>, CallLog) {
        let log = CallLog::default();
        (
            Rc::new(Self {
                log: log.clone(),
            }),
            log,
        )
    }
}

impl PackagesView for RecordingView {
    fn show_progress(&self) {
        self.log.borrow_mut().push(ViewCall::ShowProgress);
    }

    fn show_percent_progress(&self, percent: u8) {
        self.log.borrow_mut().push(ViewCall::Percent(percent));
    }

    fn hide_progress(&self) {
        self.log.borrow_mut().push(ViewCall::HideProgress);
    }

    fn show_data(&self, entries: &[PackageEntry]) {
        self.log.borrow_mut().push(ViewCall::Data(
            entries
                .iter()
                .map(|entry| entry.package_id().to_string())
                .collect(),
        ));
    }

    fn show_sort_options(&self, options: &[SortDescriptor]) {
        self.log.borrow_mut().push(ViewCall::SortOptions(
            options.iter().map(SortDescriptor::option).collect(),
        ));
    }
}

pub fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}
