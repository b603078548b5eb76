// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared black-box test harness: an isolated config/state root per test
//! plus a fluent wrapper around the `mngr` binary.

use std::path::PathBuf;

use assert_cmd::Command;

/// A throwaway `MNGR_ROOT_NAME`-equivalent directory tree so tests never
/// touch the invoking user's real `~/.config/mngr`.
pub struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self { dir: tempfile::tempdir().expect("tempdir") }
    }

    pub fn config_dir(&self) -> PathBuf {
        self.dir.path().join("config")
    }

    pub fn host_dir(&self) -> PathBuf {
        self.dir.path().join("hosts")
    }

    /// Writes `config.toml` under this workspace's config dir.
    pub fn write_config(&self, toml: &str) {
        std::fs::create_dir_all(self.config_dir()).expect("create config dir");
        std::fs::write(self.config_dir().join("config.toml"), toml).expect("write config.toml");
    }

    pub fn cli(&self) -> Mngr {
        Mngr::new().in_workspace(self)
    }
}

/// Fluent wrapper over `assert_cmd::Command` for the `mngr` binary.
pub struct Mngr {
    cmd: Command,
}

impl Mngr {
    pub fn new() -> Self {
        let mut cmd = Command::cargo_bin("mngr").expect("mngr binary built");
        // Isolate from whatever real config the host running the suite has.
        cmd.env("MNGR_ROOT_NAME", "mngr-test-unset");
        Self { cmd }
    }

    pub fn in_workspace(mut self, workspace: &Workspace) -> Self {
        self.cmd.env("XDG_CONFIG_HOME", workspace.dir.path());
        self.cmd.env("MNGR_ROOT_NAME", "config");
        self.cmd.env("MNGR_HOST_DIR", workspace.host_dir());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    /// Runs the command, asserting it exited with code `0`.
    pub fn passes(mut self) -> Assert {
        let output = self.cmd.output().expect("spawn mngr");
        assert!(output.status.success(), "expected success, got {:?}\nstderr: {}", output.status, String::from_utf8_lossy(&output.stderr));
        Assert::new(output)
    }

    /// Runs the command, asserting it exited with the given nonzero code.
    pub fn fails_with(mut self, code: i32) -> Assert {
        let output = self.cmd.output().expect("spawn mngr");
        assert_eq!(output.status.code(), Some(code), "stderr: {}", String::from_utf8_lossy(&output.stderr));
        Assert::new(output)
    }

    /// Runs the command and returns its outcome regardless of exit code.
    pub fn run(mut self) -> Assert {
        let output = self.cmd.output().expect("spawn mngr");
        Assert::new(output)
    }
}

pub struct Assert {
    pub output: std::process::Output,
}

impl Assert {
    fn new(output: std::process::Output) -> Self {
        Self { output }
    }

    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout().contains(needle), "stdout missing {needle:?}:\n{}", self.stdout());
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr().contains(needle), "stderr missing {needle:?}:\n{}", self.stderr());
        self
    }

    pub fn code(&self) -> Option<i32> {
        self.output.status.code()
    }
}

pub fn cli() -> Mngr {
    Mngr::new()
}
