//! Presenter between the package loader and a display surface.
//!
//! The presenter keeps only a weak handle to its view and re-resolves it for
//! every notification, so a view that goes away simply stops receiving calls.
//! All view calls happen on the thread that owns the presenter; background
//! loads report back through [`PackagesPresenter::process_events`].

use std::{
    rc::{Rc, Weak},
    sync::Arc,
};

use pkgview_core::{
    enumerator::PackageEnumerator,
    models::{PackageEntry, SortDescriptor, SortOption},
    sort::sort_entries,
    PkgviewResult,
};
use pkgview_events::{EventSinkHandle, NullSink, OperationId};
use tracing::{debug, trace};

use crate::loader::{LoadListener, LoadStatus, LoadTask, PackageLoader};

/// Display surface driven by [`PackagesPresenter`].
pub trait PackagesView {
    fn show_progress(&self);

    fn show_percent_progress(&self, percent: u8);

    fn hide_progress(&self);

    fn show_data(&self, entries: &[PackageEntry]);

    fn show_sort_options(&self, options: &[SortDescriptor]);
}

struct PendingLoad {
    task: LoadTask,
    sort: SortOption,
}

struct ViewListener<'a> {
    view: &'a Option<Weak<dyn PackagesView>>,
    sort: SortOption,
}

impl ViewListener<'_> {
    fn view(&self) -> Option<Rc<dyn PackagesView>> {
        self.view.as_ref().and_then(Weak::upgrade)
    }
}

impl LoadListener for ViewListener<'_> {
    fn on_progress(&mut self, op_id: OperationId, percent: u8) {
        match self.view() {
            Some(view) => view.show_percent_progress(percent),
            None => trace!(op_id, percent, "progress dropped, no view"),
        }
    }

    fn on_finish(&mut self, op_id: OperationId, mut entries: Vec<PackageEntry>) {
        sort_entries(&mut entries, self.sort);

        let Some(view) = self.view() else {
            debug!(op_id, "load finished without a view");
            return;
        };
        view.hide_progress();
        view.show_data(&entries);
    }
}

pub struct PackagesPresenter {
    view: Option<Weak<dyn PackagesView>>,
    loader: PackageLoader,
    observer: EventSinkHandle,
    pending: Vec<PendingLoad>,
}

impl PackagesPresenter {
    pub fn new<V: PackagesView + 'static>(view: &Rc<V>, enumerator: PackageEnumerator) -> Self {
        let view = Rc::downgrade(view);
        let view: Weak<dyn PackagesView> = view;
        Self {
            view: Some(view),
            loader: PackageLoader::new(enumerator),
            observer: Arc::new(NullSink),
            pending: Vec::new(),
        }
    }

    /// Forwards the events of every background load to `observer` as well.
    pub fn with_observer(mut self, observer: EventSinkHandle) -> Self {
        self.observer = observer;
        self
    }

    fn view(&self) -> Option<Rc<dyn PackagesView>> {
        self.view.as_ref().and_then(Weak::upgrade)
    }

    pub fn is_attached(&self) -> bool {
        self.view().is_some()
    }

    /// Loads on the calling thread. Does nothing when `sort` is `None`.
    pub fn load_data_sync(&self, include_system: bool, sort: Option<&SortDescriptor>) {
        let Some(sort) = sort else {
            return;
        };
        let Some(view) = self.view() else {
            debug!("no view attached, skipping load");
            return;
        };

        view.show_progress();
        let mut entries = self.loader.load_sync(include_system);
        view.hide_progress();

        sort_entries(&mut entries, sort.option());
        view.show_data(&entries);
    }

    /// Starts a background load. Does nothing when `sort` is `None`.
    ///
    /// Results are delivered by [`process_events`](Self::process_events) or
    /// [`wait_for_loads`](Self::wait_for_loads).
    pub fn load_data_async(
        &mut self,
        include_system: bool,
        sort: Option<&SortDescriptor>,
    ) -> PkgviewResult<Option<OperationId>> {
        let Some(sort) = sort else {
            return Ok(None);
        };

        let view = self.view();
        if let Some(view) = &view {
            view.show_progress();
        }

        let task = match self.loader.load_async(include_system, self.observer.clone()) {
            Ok(task) => task,
            Err(err) => {
                if let Some(view) = &view {
                    view.hide_progress();
                }
                return Err(err);
            }
        };
        let op_id = task.op_id();
        self.pending.push(PendingLoad {
            task,
            sort: sort.option(),
        });
        Ok(Some(op_id))
    }

    /// Delivers the events of running loads without blocking.
    ///
    /// Loads are delivered in the order they were started: events of a later
    /// load wait until every earlier one has completed. Returns the number of
    /// loads still running.
    pub fn process_events(&mut self) -> usize {
        while let Some(load) = self.pending.first_mut() {
            let mut listener = ViewListener {
                view: &self.view,
                sort: load.sort,
            };
            if load.task.dispatch(&mut listener) == LoadStatus::Pending {
                break;
            }
            self.pending.remove(0);
        }
        self.pending.len()
    }

    /// Delivers events until every running load has finished.
    pub fn wait_for_loads(&mut self) {
        while !self.pending.is_empty() {
            let mut load = self.pending.remove(0);
            let mut listener = ViewListener {
                view: &self.view,
                sort: load.sort,
            };
            load.task.wait(&mut listener);
        }
    }

    pub fn pending_loads(&self) -> usize {
        self.pending.len()
    }

    pub fn load_sort_options(&self) {
        if let Some(view) = self.view() {
            view.show_sort_options(&self.loader.enumerator().sort_options());
        }
    }

    pub fn detach_view(&mut self) {
        self.view = None;
    }
}

#[cfg(test)]
mod tests {
    use pkgview_core::enumerator::sort_options;
    use pkgview_events::CollectorSink;

    use super::*;
    use crate::test_utils::{ids, FakeRegistry, RecordingView, ViewCall, UNSPAWNABLE_STACK};

    fn descriptor(option: SortOption) -> SortDescriptor {
        sort_options()
            .into_iter()
            .find(|descriptor| descriptor.option() == option)
            .unwrap()
    }

    fn presenter(view: &Rc<RecordingView>) -> PackagesPresenter {
        PackagesPresenter::new(view, FakeRegistry::sample().into_enumerator())
    }

    #[test]
    fn test_sync_load_call_order() {
        let (view, log) = RecordingView::new();
        let presenter = presenter(&view);

        presenter.load_data_sync(false, Some(&descriptor(SortOption::ByName)));

        assert_eq!(
            *log.borrow(),
            vec![
                ViewCall::ShowProgress,
                ViewCall::HideProgress,
                ViewCall::Data(ids(&[
                    "ru.package.app",
                    "ru.sberbankmobile",
                    "com.another.package.test"
                ])),
            ]
        );
    }

    #[test]
    fn test_sync_load_by_package_id() {
        let (view, log) = RecordingView::new();
        presenter(&view).load_data_sync(false, Some(&descriptor(SortOption::ByPackageId)));

        assert_eq!(
            log.borrow().last(),
            Some(&ViewCall::Data(ids(&[
                "com.another.package.test",
                "ru.package.app",
                "ru.sberbankmobile"
            ])))
        );
    }

    #[test]
    fn test_missing_sort_descriptor_is_silent() {
        let (view, log) = RecordingView::new();
        let mut presenter = presenter(&view);

        presenter.load_data_sync(false, None);
        assert_eq!(presenter.load_data_async(false, None).unwrap(), None);
        presenter.wait_for_loads();

        assert!(log.borrow().is_empty());
        assert_eq!(presenter.pending_loads(), 0);
    }

    #[test]
    fn test_async_load_call_order() {
        let (view, log) = RecordingView::new();
        let mut presenter = presenter(&view);

        let op_id = presenter
            .load_data_async(false, Some(&descriptor(SortOption::None)))
            .unwrap();
        assert!(op_id.is_some());
        assert_eq!(*log.borrow(), vec![ViewCall::ShowProgress]);

        presenter.wait_for_loads();

        assert_eq!(
            *log.borrow(),
            vec![
                ViewCall::ShowProgress,
                ViewCall::Percent(0),
                ViewCall::Percent(33),
                ViewCall::Percent(66),
                ViewCall::HideProgress,
                ViewCall::Data(ids(&[
                    "ru.sberbankmobile",
                    "com.another.package.test",
                    "ru.package.app"
                ])),
            ]
        );
        assert_eq!(presenter.pending_loads(), 0);
    }

    #[test]
    fn test_process_events_until_done() {
        let (view, log) = RecordingView::new();
        let mut presenter = presenter(&view);

        presenter
            .load_data_async(false, Some(&descriptor(SortOption::ByName)))
            .unwrap();
        while presenter.process_events() > 0 {
            std::thread::yield_now();
        }

        let log = log.borrow();
        assert_eq!(log.len(), 6);
        assert_eq!(log[4], ViewCall::HideProgress);
        assert!(matches!(log[5], ViewCall::Data(_)));
    }

    #[test]
    fn test_detach_suppresses_async_notifications() {
        let (view, log) = RecordingView::new();
        let mut presenter = presenter(&view);

        presenter
            .load_data_async(false, Some(&descriptor(SortOption::ByName)))
            .unwrap();
        presenter.detach_view();
        presenter.detach_view();
        presenter.wait_for_loads();

        assert_eq!(*log.borrow(), vec![ViewCall::ShowProgress]);
        assert!(!presenter.is_attached());
    }

    #[test]
    fn test_dropped_view_suppresses_notifications() {
        let (view, log) = RecordingView::new();
        let mut presenter = presenter(&view);

        presenter
            .load_data_async(false, Some(&descriptor(SortOption::ByName)))
            .unwrap();
        drop(view);
        presenter.wait_for_loads();
        presenter.load_sort_options();
        presenter.load_data_sync(false, Some(&descriptor(SortOption::ByName)));

        assert_eq!(*log.borrow(), vec![ViewCall::ShowProgress]);
    }

    #[test]
    fn test_detached_presenter_is_noop() {
        let (view, log) = RecordingView::new();
        let mut presenter = presenter(&view);
        presenter.detach_view();

        presenter.load_data_sync(true, Some(&descriptor(SortOption::ByName)));
        presenter.load_sort_options();
        presenter
            .load_data_async(true, Some(&descriptor(SortOption::ByName)))
            .unwrap();
        presenter.wait_for_loads();

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_load_sort_options() {
        let (view, log) = RecordingView::new();
        presenter(&view).load_sort_options();

        assert_eq!(
            *log.borrow(),
            vec![ViewCall::SortOptions(vec![
                SortOption::None,
                SortOption::ByName,
                SortOption::ByPackageId
            ])]
        );
    }

    #[test]
    fn test_overlapping_loads_last_wins() {
        let (view, log) = RecordingView::new();
        let mut presenter = presenter(&view);

        presenter
            .load_data_async(false, Some(&descriptor(SortOption::ByName)))
            .unwrap();
        presenter
            .load_data_async(false, Some(&descriptor(SortOption::ByPackageId)))
            .unwrap();
        presenter.wait_for_loads();

        let log = log.borrow();
        let data: Vec<_> = log
            .iter()
            .filter(|call| matches!(call, ViewCall::Data(_)))
            .collect();
        assert_eq!(data.len(), 2);
        assert_eq!(
            data[0],
            &ViewCall::Data(ids(&[
                "ru.package.app",
                "ru.sberbankmobile",
                "com.another.package.test"
            ]))
        );
        assert_eq!(
            log.last(),
            Some(&ViewCall::Data(ids(&[
                "com.another.package.test",
                "ru.package.app",
                "ru.sberbankmobile"
            ])))
        );
    }

    #[test]
    fn test_system_packages_marked_only_when_included() {
        let registry = FakeRegistry::default()
            .with_app("org.user", "User", false)
            .with_app("org.base", "Base", true);
        let (view, log) = RecordingView::new();
        let presenter = PackagesPresenter::new(&view, registry.into_enumerator());

        presenter.load_data_sync(false, Some(&descriptor(SortOption::None)));
        presenter.load_data_sync(true, Some(&descriptor(SortOption::None)));

        let log = log.borrow();
        assert_eq!(log[2], ViewCall::Data(ids(&["org.user"])));
        assert_eq!(log[5], ViewCall::Data(ids(&["org.user", "org.base"])));
    }

    #[test]
    fn test_spawn_failure_hides_progress() {
        let (view, log) = RecordingView::new();
        let mut presenter = presenter(&view);
        presenter.loader = PackageLoader::new(FakeRegistry::sample().into_enumerator())
            .with_stack_size(UNSPAWNABLE_STACK);

        let result = presenter.load_data_async(false, Some(&descriptor(SortOption::ByName)));

        assert!(result.is_err());
        assert_eq!(
            *log.borrow(),
            vec![ViewCall::ShowProgress, ViewCall::HideProgress]
        );
        assert_eq!(presenter.pending_loads(), 0);
    }

    #[test]
    fn test_observer_receives_events() {
        let (view, _log) = RecordingView::new();
        let collector = Arc::new(CollectorSink::default());
        let mut presenter = presenter(&view).with_observer(collector.clone());

        presenter
            .load_data_async(false, Some(&descriptor(SortOption::ByName)))
            .unwrap();
        presenter.wait_for_loads();

        assert_eq!(collector.len(), 5);
    }
}
