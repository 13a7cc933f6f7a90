use std::{
    sync::{
        mpsc::{Receiver, TryRecvError},
        Arc,
    },
    thread::{self, JoinHandle},
};

use pkgview_core::{
    enumerator::PackageEnumerator,
    error::ErrorContext,
    models::PackageEntry,
    PkgviewResult,
};
use pkgview_events::{
    ChannelSink, EventSink, EventSinkHandle, LoadEvent, NullSink, OperationId, TeeSink,
};
use tracing::{debug, warn};

use crate::progress::{create_progress_bridge, next_op_id};

/// Receives the results of a [`LoadTask`] on the thread that pumps it.
pub trait LoadListener {
    fn on_progress(&mut self, op_id: OperationId, percent: u8);

    fn on_finish(&mut self, op_id: OperationId, entries: Vec<PackageEntry>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Pending,
    Complete,
    /// The background thread ended without completing.
    Disconnected,
}

/// A background load started by [`PackageLoader::load_async`].
pub struct LoadTask {
    op_id: OperationId,
    receiver: Receiver<LoadEvent>,
    handle: Option<JoinHandle<()>>,
    total: Option<usize>,
    status: LoadStatus,
}

impl LoadTask {
    pub fn op_id(&self) -> OperationId {
        self.op_id
    }

    /// Number of packages being resolved, once the listing is known.
    pub fn total(&self) -> Option<usize> {
        self.total
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    /// Delivers all events received so far without blocking.
    pub fn dispatch<L: LoadListener + ?Sized>(&mut self, listener: &mut L) -> LoadStatus {
        while self.status == LoadStatus::Pending {
            match self.receiver.try_recv() {
                Ok(event) => self.handle_event(event, listener),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.disconnect(),
            }
        }
        self.status
    }

    /// Delivers events until the load completes or its thread dies.
    pub fn wait<L: LoadListener + ?Sized>(&mut self, listener: &mut L) -> LoadStatus {
        while self.status == LoadStatus::Pending {
            match self.receiver.recv() {
                Ok(event) => self.handle_event(event, listener),
                Err(_) => self.disconnect(),
            }
        }
        self.status
    }

    fn handle_event<L: LoadListener + ?Sized>(&mut self, event: LoadEvent, listener: &mut L) {
        match event {
            LoadEvent::Started {
                total, ..
            } => self.total = Some(total),
            LoadEvent::Progress {
                op_id,
                percent,
            } => listener.on_progress(op_id, percent),
            LoadEvent::Complete {
                op_id,
                entries,
            } => {
                self.status = LoadStatus::Complete;
                self.join();
                listener.on_finish(op_id, entries);
            }
        }
    }

    fn disconnect(&mut self) {
        warn!(op_id = self.op_id, "loader thread ended before completing");
        self.status = LoadStatus::Disconnected;
        self.join();
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!(op_id = self.op_id, "loader thread panicked");
            }
        }
    }
}

/// Runs enumerations, either inline or on a dedicated thread.
#[derive(Clone)]
pub struct PackageLoader {
    enumerator: PackageEnumerator,
    stack_size: Option<usize>,
}

impl PackageLoader {
    pub fn new(enumerator: PackageEnumerator) -> Self {
        Self {
            enumerator,
            stack_size: None,
        }
    }

    /// Stack size of the loader threads, in bytes. Platform default when unset.
    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = Some(stack_size);
        self
    }

    pub fn enumerator(&self) -> &PackageEnumerator {
        &self.enumerator
    }

    pub fn load_sync(&self, include_system: bool) -> Vec<PackageEntry> {
        debug!(include_system, "loading applications");
        self.enumerator.enumerate(include_system)
    }

    /// Starts a load on a new thread.
    ///
    /// Every event is also forwarded to `observer`, from the background thread.
    pub fn load_async(
        &self,
        include_system: bool,
        observer: EventSinkHandle,
    ) -> PkgviewResult<LoadTask> {
        let op_id = next_op_id();
        let (channel, receiver) = ChannelSink::new();
        let events: EventSinkHandle = Arc::new(TeeSink::new(channel, observer));
        let enumerator = self.enumerator.clone();

        debug!(op_id, include_system, "starting background load");
        let mut builder = thread::Builder::new().name(format!("pkgview-load-{op_id}"));
        if let Some(stack_size) = self.stack_size {
            builder = builder.stack_size(stack_size);
        }
        let handle = builder
            .spawn(move || {
                let apps = enumerator.launchable(include_system);
                events.emit(LoadEvent::Started {
                    op_id,
                    total: apps.len(),
                });

                let on_resolved = create_progress_bridge(events.clone(), op_id);
                let entries = enumerator.resolve_all(&apps, include_system, on_resolved);

                debug!(op_id, count = entries.len(), "background load complete");
                events.emit(LoadEvent::Complete {
                    op_id,
                    entries,
                });
            })
            .with_context(|| "spawning the loader thread".to_string())?;

        Ok(LoadTask {
            op_id,
            receiver,
            handle: Some(handle),
            total: None,
            status: LoadStatus::Pending,
        })
    }

    /// [`load_async`](Self::load_async) without an observer.
    pub fn spawn(&self, include_system: bool) -> PkgviewResult<LoadTask> {
        self.load_async(include_system, Arc::new(NullSink))
    }
}
