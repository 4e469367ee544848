//! Helpers shared by the interposer integration tests.
#![allow(dead_code)]

use fu53_policy::config::LOG_ENV;
use fu53_policy::ConfigKey;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// `libfu53_preload.so` in the target directory next to this test binary.
pub fn preload_lib() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let lib = exe.parent()?.parent()?.join("libfu53_preload.so");
    lib.exists().then_some(lib)
}

macro_rules! require_preload {
    () => {
        match $crate::common::preload_lib() {
            Some(lib) => lib,
            None => {
                eprintln!("skipping: libfu53_preload.so has not been built");
                return;
            }
        }
    };
}

/// Drop inherited policy and log keys, then preload `lib`.
pub fn preloaded<'a>(cmd: &'a mut Command, lib: &Path) -> &'a mut Command {
    for key in ConfigKey::ALL {
        cmd.env_remove(key.env_name());
    }
    cmd.env_remove(LOG_ENV);
    cmd.env("LD_PRELOAD", lib)
}

pub fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

pub fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}
