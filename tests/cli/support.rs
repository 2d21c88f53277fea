use std::path::PathBuf;
use std::sync::Mutex;

use grove::tooling::cli::CliContext;
use tempfile::TempDir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

const ISOLATED_VARS: [&str; 6] = [
    "HOME",
    "XDG_CONFIG_HOME",
    "XDG_DATA_HOME",
    "XDG_STATE_HOME",
    "GROVE__DISPLAY__COLOR",
    "GROVE_LOG",
];

/// Run `f` with every user directory redirected into `temp_dir` and colors off.
pub fn with_xdg_env<F: FnOnce()>(temp_dir: &TempDir, f: F) {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let saved: Vec<(&str, Option<String>)> = ISOLATED_VARS
        .iter()
        .map(|key| (*key, std::env::var(key).ok()))
        .collect();

    let root = temp_dir.path();
    std::env::set_var("HOME", root.join("home"));
    std::env::set_var("XDG_CONFIG_HOME", root.join("config"));
    std::env::set_var("XDG_DATA_HOME", root.join("data"));
    std::env::set_var("XDG_STATE_HOME", root.join("state"));
    std::env::set_var("GROVE__DISPLAY__COLOR", "false");
    std::env::set_var("GROVE_LOG", "off");

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

    for (key, value) in saved {
        match value {
            Some(v) => std::env::set_var(key, v),
            None => std::env::remove_var(key),
        }
    }
    if let Err(panic) = result {
        std::panic::resume_unwind(panic);
    }
}

pub fn workspace(temp_dir: &TempDir) -> PathBuf {
    let root = temp_dir.path().join("workspace");
    std::fs::create_dir_all(&root).unwrap();
    root
}

/// Context that refuses to prompt.
pub fn context(temp_dir: &TempDir) -> CliContext {
    CliContext::new(workspace(temp_dir), None)
        .unwrap()
        .with_confirmation(|prompt| panic!("unexpected confirmation prompt: {prompt}"))
}
