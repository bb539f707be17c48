/*!
 * URM Kernel - Main Entry Point
 *
 * Boots the process-control subsystems, starts the userspace request
 * monitor, and runs a short init/child lifecycle through it:
 * - exec a shell into a fresh child
 * - tear the child down and reap it from init
 */

use std::error::Error;
use tracing::info;

use urm_kernel::{
    init_tracing, AddressSpaces, MonitorConfig, ProcessTable, ProgramImage, RequestMonitor,
};

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    info!("URM kernel starting...");

    let processes = ProcessTable::new();
    let spaces = AddressSpaces::new();

    info!("Starting userspace request monitor...");
    let builder = RequestMonitor::builder(processes.clone(), spaces.clone())
        .with_config(MonitorConfig::from_env());
    let tasks = builder.tasks().clone();
    let files = builder.open_files().clone();
    let perfmons = builder.perfmons().clone();
    builder.images().register(
        "/bin/init",
        ProgramImage {
            entry: 0x40_0000,
            pages: 16,
        },
    );
    builder.images().register(
        "/bin/sh",
        ProgramImage {
            entry: 0x40_0000,
            pages: 32,
        },
    );
    let monitor = builder.spawn()?;
    let urm = monitor.handle();

    // Root supervisor
    let init = processes.create(0, spaces.create(4));
    tasks.spawn_thread(init, "init");
    urm.submit_exec(init, "/bin/init", &["init"], &["PATH=/bin"])?
        .wait()?;

    // A child with open handles, a couple of threads, and a perfmon
    let child = processes.create(init, spaces.create(4));
    tasks.spawn_thread(child, "main");
    tasks.spawn_thread(child, "worker");
    processes.with_process_mut(child, |p| {
        if let Some(table) = p.file_handles.as_mut() {
            table.install(files.open("/dev/console"));
            table.install(files.open("/etc/motd"));
        }
        p.perfmon = Some(perfmons.create());
    });

    let completion = urm.submit_exec(child, "/bin/sh", &["sh", "-l"], &["PATH=/bin", "HOME=/"])?;
    info!(pid = child, outcome = ?completion.wait(), "Child exec finished");

    let missing = urm.submit_exec(child, "/bin/missing", &["missing"], &[] as &[&str])?;
    info!(pid = child, outcome = ?missing.wait(), "Expected exec failure");

    urm.submit_exit(child, 7, false)?;

    info!("Shutting down request monitor...");
    monitor.shutdown()?;
    let stats = urm.stats();

    if let Some(event) = processes.take_child_event(init) {
        info!(
            child = event.pid,
            exit_code = event.exit_code(),
            signalled = event.is_signalled(),
            "init reaped child"
        );
        processes.reap(event.pid);
    }

    info!(
        frames_in_use = spaces.frames_in_use(),
        open_files = files.open_count(),
        perfmons = perfmons.live(),
        "Subsystem state after teardown"
    );
    info!("Monitor stats: {}", serde_json::to_string(&stats)?);

    Ok(())
}
