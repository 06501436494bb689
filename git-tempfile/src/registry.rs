use std::{
    path::PathBuf,
    sync::atomic::{AtomicU64, Ordering},
    thread,
};

use dashmap::DashMap;
use once_cell::sync::{Lazy, OnceCell};

/// The opaque id under which a [`Handle`][crate::Handle]'s path is tracked in the registry, used
/// to remove the entry again once the handle is persisted or dropped normally.
pub type Id = u64;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);
static REGISTRY: Lazy<DashMap<Id, PathBuf>> = Lazy::new(DashMap::new);
static SIGNAL_HANDLER: OnceCell<()> = OnceCell::new();

/// Register `path` for cleanup, returning the id it was registered under. Exposed beyond this
/// crate so other crash-safety guards (namely `git-lock`'s `<resource>.lock` files) can share this
/// same registry and signal handler instead of each installing their own.
pub fn register(path: PathBuf) -> Id {
    let id = NEXT_ID.fetch_add(1, Ordering::SeqCst);
    REGISTRY.insert(id, path);
    id
}

/// Stop tracking `id`, typically because the guarded file was persisted or closed normally.
pub fn deregister(id: Id) {
    REGISTRY.remove(&id);
}

/// Delete every currently registered tempfile from disk, best-effort, ignoring files that are
/// already gone. Used both by the signal handler and directly by tests.
pub fn cleanup_all() {
    for entry in REGISTRY.iter() {
        let _ = std::fs::remove_file(entry.value());
    }
}

/// Controls what [`setup()`] does when the process receives `SIGTERM`/`SIGINT`/`SIGHUP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalHandlerMode {
    /// Install no handler; tempfiles are only cleaned up via `Drop` and are leaked if the process
    /// is killed.
    None,
    /// Delete all registered tempfiles, then terminate the process with the killing signal's
    /// default disposition so shells and process supervisors see the expected exit status.
    DeleteTempfilesOnTermination,
    /// Like `DeleteTempfilesOnTermination`, restoring the platform's default handler for the
    /// signal after cleanup instead of calling `std::process::exit()` directly, so the signal can
    /// be delivered to the process again exactly once more should anything else need to observe it.
    DeleteTempfilesOnTerminationAndRestoreDefaultBehaviour,
}

/// Install the cleanup signal handler if it isn't installed already. Idempotent and safe to call
/// from multiple threads or more than once; only the first call's `mode` takes effect.
pub fn setup(mode: SignalHandlerMode) {
    if mode == SignalHandlerMode::None {
        return;
    }
    SIGNAL_HANDLER.get_or_init(|| {
        let restore_default = mode == SignalHandlerMode::DeleteTempfilesOnTerminationAndRestoreDefaultBehaviour;
        let signals = signal_hook::iterator::Signals::new(signal_hook::consts::TERM_SIGNALS)
            .expect("registering a handful of well-known signals cannot fail");
        thread::Builder::new()
            .name("git-tempfile cleanup".into())
            .spawn(move || {
                for signal in signals.forever() {
                    cleanup_all();
                    if restore_default {
                        signal_hook::low_level::emulate_default_handler(signal).ok();
                    } else {
                        std::process::exit(1 + signal);
                    }
                }
            })
            .expect("spawning the cleanup thread cannot fail under normal conditions");
    });
}
