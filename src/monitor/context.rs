/*!
 * Monitor Context
 * Collaborators the request handlers operate on, and the builder that wires them
 */

use super::config::MonitorConfig;
use super::traits::{
    AddressSpaceRelease, ChildNotifier, FileCloser, Halt, PanicHalt, PerfmonRelease,
    ProgramLoader, ThreadControl,
};
use crate::fd::OpenFiles;
use crate::loader::ImageLoader;
use crate::memory::{AddressSpaces, PerfmonRegistry};
use crate::process::{ProcessTable, TaskTable};
use std::sync::Arc;

/// Everything a handler may touch
///
/// Only the monitor thread runs handlers, so nothing here needs locking
/// beyond what each collaborator does internally.
#[derive(Clone)]
pub struct MonitorContext {
    pub processes: ProcessTable,
    pub loader: Arc<dyn ProgramLoader>,
    pub threads: Arc<dyn ThreadControl>,
    pub files: Arc<dyn FileCloser>,
    pub address_spaces: Arc<dyn AddressSpaceRelease>,
    pub perfmon: Arc<dyn PerfmonRelease>,
    pub notifier: Arc<dyn ChildNotifier>,
    pub halt: Arc<dyn Halt>,
}

/// Builder for the request monitor
///
/// Collaborators left unset fall back to the in-crate implementations. Those
/// defaults share the caller's process table and address spaces, and the
/// remaining ones (image registry, task table, open files, perfmons) are
/// reachable through accessors so callers populate the same instances the
/// handlers release. The process table doubles as the child notifier.
pub struct MonitorBuilder {
    processes: ProcessTable,
    spaces: AddressSpaces,
    images: ImageLoader,
    tasks: TaskTable,
    open_files: OpenFiles,
    perfmons: PerfmonRegistry,
    loader: Option<Arc<dyn ProgramLoader>>,
    threads: Option<Arc<dyn ThreadControl>>,
    files: Option<Arc<dyn FileCloser>>,
    address_spaces: Option<Arc<dyn AddressSpaceRelease>>,
    perfmon: Option<Arc<dyn PerfmonRelease>>,
    notifier: Option<Arc<dyn ChildNotifier>>,
    halt: Option<Arc<dyn Halt>>,
    config: MonitorConfig,
}

impl MonitorBuilder {
    pub fn new(processes: ProcessTable, spaces: AddressSpaces) -> Self {
        let images = ImageLoader::new(processes.clone(), spaces.clone());
        Self {
            processes,
            spaces,
            images,
            tasks: TaskTable::new(),
            open_files: OpenFiles::new(),
            perfmons: PerfmonRegistry::new(),
            loader: None,
            threads: None,
            files: None,
            address_spaces: None,
            perfmon: None,
            notifier: None,
            halt: None,
            config: MonitorConfig::default(),
        }
    }

    /// Image registry behind the default loader
    pub fn images(&self) -> &ImageLoader {
        &self.images
    }

    /// Task table behind the default thread control
    pub fn tasks(&self) -> &TaskTable {
        &self.tasks
    }

    /// Open-file table behind the default file closer
    pub fn open_files(&self) -> &OpenFiles {
        &self.open_files
    }

    /// Registry behind the default perfmon release
    pub fn perfmons(&self) -> &PerfmonRegistry {
        &self.perfmons
    }

    pub fn with_loader(mut self, loader: Arc<dyn ProgramLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn with_threads(mut self, threads: Arc<dyn ThreadControl>) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_files(mut self, files: Arc<dyn FileCloser>) -> Self {
        self.files = Some(files);
        self
    }

    pub fn with_address_spaces(mut self, address_spaces: Arc<dyn AddressSpaceRelease>) -> Self {
        self.address_spaces = Some(address_spaces);
        self
    }

    pub fn with_perfmon(mut self, perfmon: Arc<dyn PerfmonRelease>) -> Self {
        self.perfmon = Some(perfmon);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ChildNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_halt(mut self, halt: Arc<dyn Halt>) -> Self {
        self.halt = Some(halt);
        self
    }

    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Assemble the handler context without starting a thread
    pub fn build_context(self) -> MonitorContext {
        self.split().0
    }

    pub(super) fn split(self) -> (MonitorContext, MonitorConfig) {
        let Self {
            processes,
            spaces,
            images,
            tasks,
            open_files,
            perfmons,
            loader,
            threads,
            files,
            address_spaces,
            perfmon,
            notifier,
            halt,
            config,
        } = self;

        let notifier = notifier.unwrap_or_else(|| Arc::new(processes.clone()));
        let context = MonitorContext {
            processes,
            loader: loader.unwrap_or_else(|| Arc::new(images)),
            threads: threads.unwrap_or_else(|| Arc::new(tasks)),
            files: files.unwrap_or_else(|| Arc::new(open_files)),
            address_spaces: address_spaces.unwrap_or_else(|| Arc::new(spaces)),
            perfmon: perfmon.unwrap_or_else(|| Arc::new(perfmons)),
            notifier,
            halt: halt.unwrap_or_else(|| Arc::new(PanicHalt)),
        };
        (context, config)
    }
}
