/*!
 * Shared fixtures for request monitor tests
 */

#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::mpsc;
use std::sync::Arc;
use urm_kernel::core::errors::{ExecError, ExecResult};
use urm_kernel::core::types::Pid;
use urm_kernel::monitor::{ChildNotifier, MonitorBuilder, MonitorHandle, ProgramLoader};
use urm_kernel::process::ChildEvent;
use urm_kernel::{
    AddressSpaces, OpenFiles, PerfmonRegistry, ProcessTable, ProgramImage,
    RequestMonitor, TaskTable,
};

/// Handler-visible event, in the order the monitor produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    Exec {
        pid: Pid,
        path: String,
        argv: Vec<String>,
        envp: Vec<String>,
    },
    Exit {
        ppid: Pid,
        event: ChildEvent,
    },
}

impl Observed {
    pub fn pid(&self) -> Pid {
        match self {
            Observed::Exec { pid, .. } => *pid,
            Observed::Exit { event, .. } => event.pid,
        }
    }
}

pub type Journal = Arc<Mutex<Vec<Observed>>>;

/// Loader that records every call
///
/// Paths ending in `!` fail. When a gate is armed, the first call blocks
/// until the gate is opened, holding the monitor busy.
pub struct RecordingLoader {
    journal: Journal,
    gate: Mutex<Option<mpsc::Receiver<()>>>,
}

impl RecordingLoader {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            gate: Mutex::new(None),
        }
    }

    /// Arm the gate; send on the returned sender to release the monitor
    pub fn arm_gate(&self) -> mpsc::Sender<()> {
        let (tx, rx) = mpsc::channel();
        *self.gate.lock() = Some(rx);
        tx
    }
}

impl ProgramLoader for RecordingLoader {
    fn exec(&self, pid: Pid, path: &str, argv: &[String], envp: &[String]) -> ExecResult<()> {
        let gate = self.gate.lock().take();
        if let Some(gate) = gate {
            let _ = gate.recv();
        }

        self.journal.lock().push(Observed::Exec {
            pid,
            path: path.to_string(),
            argv: argv.to_vec(),
            envp: envp.to_vec(),
        });
        if path.ends_with('!') {
            Err(ExecError::LoadFailed(path.to_string()))
        } else {
            Ok(())
        }
    }
}

/// Notifier that records events and forwards them to the process table
pub struct RecordingNotifier {
    journal: Journal,
    processes: ProcessTable,
}

impl ChildNotifier for RecordingNotifier {
    fn send_child_event(&self, ppid: Pid, event: ChildEvent) {
        self.journal.lock().push(Observed::Exit { ppid, event });
        self.processes.send_child_event(ppid, event);
    }
}

/// A booted set of subsystems with a running monitor
pub struct Kernel {
    pub processes: ProcessTable,
    pub spaces: AddressSpaces,
    pub tasks: TaskTable,
    pub files: OpenFiles,
    pub perfmons: PerfmonRegistry,
    pub monitor: Option<RequestMonitor>,
    pub urm: MonitorHandle,
}

impl Kernel {
    /// Boot with the default image loader; `/bin/sh` and `/bin/init` exist
    pub fn boot() -> Self {
        Self::boot_with(|builder, _, _| {
            builder
                .images()
                .register("/bin/sh", ProgramImage { entry: 0x1000, pages: 8 });
            builder
                .images()
                .register("/bin/init", ProgramImage { entry: 0x1000, pages: 4 });
            builder
        })
    }

    /// Boot with recording collaborators writing to `journal`
    pub fn boot_recording(journal: &Journal, loader: Arc<RecordingLoader>) -> Self {
        let journal = Arc::clone(journal);
        Self::boot_with(move |builder, processes, _| {
            builder.with_loader(loader).with_notifier(Arc::new(RecordingNotifier {
                journal,
                processes: processes.clone(),
            }))
        })
    }

    pub fn boot_with(
        customize: impl FnOnce(MonitorBuilder, &ProcessTable, &AddressSpaces) -> MonitorBuilder,
    ) -> Self {
        let processes = ProcessTable::new();
        let spaces = AddressSpaces::new();
        let tasks = TaskTable::new();
        let files = OpenFiles::new();
        let perfmons = PerfmonRegistry::new();

        let builder = RequestMonitor::builder(processes.clone(), spaces.clone())
            .with_threads(Arc::new(tasks.clone()))
            .with_files(Arc::new(files.clone()))
            .with_perfmon(Arc::new(perfmons.clone()));
        let monitor = customize(builder, &processes, &spaces)
            .spawn()
            .expect("monitor thread should start");
        let urm = monitor.handle();

        Self {
            processes,
            spaces,
            tasks,
            files,
            perfmons,
            monitor: Some(monitor),
            urm,
        }
    }

    /// Create the root supervisor
    pub fn init(&self) -> Pid {
        self.processes.create(0, self.spaces.create(1))
    }

    /// Create a child of `ppid` with a main thread
    pub fn spawn_child(&self, ppid: Pid, pages: usize) -> Pid {
        let pid = self.processes.create(ppid, self.spaces.create(pages));
        self.tasks.spawn_thread(pid, "main");
        pid
    }

    /// Open `path` and install it in the process's handle table
    pub fn open(&self, pid: Pid, path: &str) -> u32 {
        let fd = self.files.open(path);
        self.processes.with_process_mut(pid, |p| {
            p.file_handles
                .as_mut()
                .and_then(|t| t.install(fd))
                .expect("handle slot available")
        });
        fd
    }

    /// Drain everything queued and stop the monitor
    pub fn stop(&mut self) {
        if let Some(monitor) = self.monitor.take() {
            monitor.shutdown().expect("monitor should stop cleanly");
        }
    }
}

pub fn new_journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}
