/*!
 * Teardown Tests
 * Resource release and parent notification through the running monitor
 */

use crate::common::{new_journal, Kernel, Observed, RecordingLoader};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use urm_kernel::core::limits::{WEXITED, WSIGNALLED};
use urm_kernel::monitor::{FileCloser, ThreadControl};
use urm_kernel::process::ProcessState;
use urm_kernel::{
    AddressSpaces, ExecError, MonitorError, MonitorState, ProcessTable, ProgramImage,
    RequestMonitor,
};

#[test]
fn test_exit_delivers_single_child_event() {
    let mut kernel = Kernel::boot();
    let init = kernel.init();
    let child = kernel.spawn_child(init, 3);

    kernel.urm.submit_exit(child, 7, false).unwrap();
    kernel.stop();

    let event = kernel.processes.take_child_event(init).unwrap();
    assert_eq!(event.pid, child);
    assert_eq!(event.status & 0xff, 7);
    assert_ne!(event.status & WEXITED, 0);
    assert_eq!(event.status & WSIGNALLED, 0);
    assert_eq!(kernel.processes.take_child_event(init), None);
    assert_eq!(kernel.processes.state(child), Some(ProcessState::Zombie));
}

#[test]
fn test_signalled_exit_sets_both_bits() {
    let mut kernel = Kernel::boot();
    let init = kernel.init();
    let child = kernel.spawn_child(init, 1);

    kernel.urm.submit_exit(child, 9, true).unwrap();
    kernel.stop();

    let event = kernel.processes.take_child_event(init).unwrap();
    assert_eq!(event.exit_code(), 9);
    assert!(event.is_exited());
    assert!(event.is_signalled());
}

#[test]
fn test_teardown_releases_resources() {
    let mut kernel = Kernel::boot();
    let init = kernel.init();
    let baseline = kernel.spaces.frames_in_use();

    let child = kernel.spawn_child(init, 6);
    kernel.tasks.spawn_thread(child, "worker");
    kernel.tasks.spawn_thread(child, "io");
    let console = kernel.open(child, "/dev/console");
    let log = kernel.open(child, "/var/log/messages");
    kernel
        .processes
        .with_process_mut(child, |p| p.perfmon = Some(kernel.perfmons.create()));

    kernel.urm.submit_exit(child, 0, false).unwrap();
    kernel.stop();

    assert_eq!(kernel.spaces.frames_in_use(), baseline);
    assert_eq!(kernel.tasks.thread_count(child), 0);
    assert!(!kernel.files.is_open(console));
    assert!(!kernel.files.is_open(log));
    assert_eq!(kernel.perfmons.live(), 0);
    kernel.processes.with_process(child, |p| {
        assert!(p.file_handles.is_none());
        assert!(p.address_space.is_none());
        assert!(p.perfmon.is_none());
    });

    let stats = kernel.urm.stats();
    assert_eq!(stats.exits_completed, 1);
    assert_eq!(stats.exits_dropped, 0);
}

#[test]
fn test_shared_perfmon_survives_one_exit() {
    let mut kernel = Kernel::boot();
    let init = kernel.init();
    let first = kernel.spawn_child(init, 1);
    let second = kernel.spawn_child(init, 1);

    let shared = kernel.perfmons.create();
    for pid in [first, second] {
        let perfmon = Arc::clone(&shared);
        kernel
            .processes
            .with_process_mut(pid, |p| p.perfmon = Some(perfmon));
    }
    drop(shared);

    kernel.urm.submit_exit(first, 0, false).unwrap();
    kernel.stop();

    assert_eq!(kernel.perfmons.live(), 1);
    kernel.processes.with_process(second, |p| {
        assert_eq!(p.perfmon.as_ref().map(Arc::strong_count), Some(1));
    });
}

#[test]
fn test_already_released_resources_are_skipped() {
    let mut kernel = Kernel::boot();
    let init = kernel.init();
    let child = kernel.spawn_child(init, 2);
    let worker = kernel.tasks.spawn_thread(child, "worker").unwrap();

    let kept = kernel.open(child, "/tmp/kept");
    let cleared = kernel.open(child, "/tmp/cleared");
    let stale = kernel.open(child, "/tmp/stale");

    // A slot cleared by its owner, an fd released elsewhere, a thread gone
    kernel.processes.with_process_mut(child, |p| {
        if let Some(table) = p.file_handles.as_mut() {
            assert_eq!(table.remove(1), Some(cleared));
        }
    });
    assert!(kernel.files.close(cleared));
    assert!(kernel.files.close(stale));
    assert!(kernel.tasks.kill_thread(child, worker));

    kernel.urm.submit_exit(child, 1, false).unwrap();
    kernel.stop();

    assert!(!kernel.files.is_open(kept));
    assert!(!kernel.files.is_open(cleared));
    assert!(!kernel.files.is_open(stale));
    assert_eq!(kernel.tasks.thread_count(child), 0);
    assert_eq!(kernel.processes.pending_child_events(init), 1);
}

#[test]
fn test_unreaped_child_events_are_discarded() {
    let mut kernel = Kernel::boot();
    let init = kernel.init();
    let middle = kernel.spawn_child(init, 1);
    let leaf = kernel.spawn_child(middle, 1);

    kernel.urm.submit_exit(leaf, 2, false).unwrap();
    kernel.urm.submit_exit(middle, 3, false).unwrap();
    kernel.stop();

    // The leaf's event went to middle and was dropped with it
    assert_eq!(kernel.processes.pending_child_events(middle), 0);
    let event = kernel.processes.take_child_event(init).unwrap();
    assert_eq!(event.pid, middle);
    assert_eq!(event.exit_code(), 3);
}

#[test]
fn test_exit_for_unknown_or_exited_process_is_dropped() {
    let journal = new_journal();
    let loader = Arc::new(RecordingLoader::new(journal.clone()));
    let mut kernel = Kernel::boot_recording(&journal, loader);
    let init = kernel.init();
    let child = kernel.spawn_child(init, 1);

    kernel.urm.submit_exit(4242, 0, false).unwrap();
    kernel.urm.submit_exit(child, 5, false).unwrap();
    kernel.urm.submit_exit(child, 6, false).unwrap();
    kernel.stop();

    let exits: Vec<_> = journal
        .lock()
        .iter()
        .filter(|o| matches!(o, Observed::Exit { .. }))
        .cloned()
        .collect();
    assert_eq!(exits.len(), 1);
    assert_eq!(exits[0].pid(), child);

    let stats = kernel.urm.stats();
    assert_eq!(stats.exits_completed, 1);
    assert_eq!(stats.exits_dropped, 2);
}

#[test]
fn test_root_exit_halts_monitor() {
    let mut kernel = Kernel::boot();
    let init = kernel.init();

    kernel.urm.submit_exit(init, 0, false).unwrap();

    let monitor = kernel.monitor.take().unwrap();
    match monitor.join() {
        Err(MonitorError::MonitorPanicked(reason)) => {
            assert!(reason.contains("kernel halt"), "unexpected reason: {reason}");
            assert!(reason.contains("init"));
        }
        other => panic!("expected monitor to halt, got {other:?}"),
    }

    // Nothing was torn down, and the halted monitor takes no more work
    assert_eq!(kernel.processes.state(init), Some(ProcessState::Running));
    assert_eq!(kernel.urm.state(), MonitorState::Stopped);
    assert_eq!(
        kernel.urm.submit_exit(init, 0, false),
        Err(MonitorError::QueueClosed)
    );
}

#[test]
fn test_requests_behind_halt_are_abandoned() {
    let journal = new_journal();
    let loader = Arc::new(RecordingLoader::new(journal.clone()));
    let gate = loader.arm_gate();
    let mut kernel = Kernel::boot_recording(&journal, loader);
    let init = kernel.init();
    let child = kernel.spawn_child(init, 2);

    let held = kernel
        .urm
        .submit_exec(child, "/hold", &["hold"], &[] as &[&str])
        .unwrap();
    kernel.urm.submit_exit(init, 0, false).unwrap();
    let stranded = kernel
        .urm
        .submit_exec(child, "/bin/sh", &["sh"], &[] as &[&str])
        .unwrap();
    gate.send(()).unwrap();

    assert_eq!(held.wait(), Ok(()));
    assert_eq!(stranded.wait(), Err(ExecError::Abandoned));

    let monitor = kernel.monitor.take().unwrap();
    assert!(matches!(
        monitor.join(),
        Err(MonitorError::MonitorPanicked(_))
    ));
    assert!(kernel.urm.is_closed());
    assert_eq!(kernel.urm.pending(), 0);
    assert_eq!(kernel.urm.state(), MonitorState::Stopped);
    assert_eq!(
        kernel
            .urm
            .submit_exec(child, "/bin/sh", &["sh"], &[] as &[&str])
            .unwrap_err(),
        MonitorError::QueueClosed
    );
}

#[test]
fn test_default_collaborators_release_caller_resources() {
    let processes = ProcessTable::new();
    let spaces = AddressSpaces::new();
    let builder = RequestMonitor::builder(processes.clone(), spaces.clone());
    builder
        .images()
        .register("/bin/sh", ProgramImage { entry: 0x1000, pages: 6 });
    let tasks = builder.tasks().clone();
    let monitor = builder.spawn().unwrap();
    let urm = monitor.handle();

    let init = processes.create(0, spaces.create(1));
    let child = processes.create(init, spaces.create(2));
    tasks.spawn_thread(child, "main");

    let completion = urm
        .submit_exec(child, "/bin/sh", &["sh"], &[] as &[&str])
        .unwrap();
    assert_eq!(completion.wait(), Ok(()));
    assert_eq!(spaces.frames_in_use(), 1 + 6);

    urm.submit_exit(child, 0, false).unwrap();
    monitor.shutdown().unwrap();

    assert_eq!(spaces.frames_in_use(), 1);
    assert_eq!(tasks.thread_count(child), 0);
    assert_eq!(processes.take_child_event(init).map(|e| e.pid), Some(child));
}
