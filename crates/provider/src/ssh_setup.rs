// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The SSH host-setup protocol (C9, §4.11): four pure shell-command builders
//! a provider executes through whatever channel it has into a freshly
//! created container or VM, plus the output-parsing rule for the warnings
//! they emit. Translated directly from the original Python implementation's
//! `ssh_host_setup.py`.

const WARNING_PREFIX: &str = "MNGR_WARN:";

/// The packages every host needs for the manager's own tooling to work.
const REQUIRED_PACKAGES: &[(&str, &str)] = &[
    ("sshd", "test -x /usr/sbin/sshd"),
    ("tmux", "command -v tmux"),
    ("curl", "command -v curl"),
    ("rsync", "command -v rsync"),
    ("git", "command -v git"),
    ("jq", "command -v jq"),
];

/// Step 1: test for each required package, warn on anything missing, install
/// the union in one `apt-get` call, then create the directories the rest of
/// setup needs.
pub fn build_check_and_install_packages_command(mngr_host_dir: &str) -> String {
    let mut lines = vec!["PKGS_TO_INSTALL=''".to_string()];
    for (package, probe) in REQUIRED_PACKAGES {
        lines.push(format!(
            "if ! ({probe} >/dev/null 2>&1); then echo '{WARNING_PREFIX}missing package: {package}'; PKGS_TO_INSTALL=\"$PKGS_TO_INSTALL {package}\"; fi"
        ));
    }
    lines.push(
        "if [ -n \"$PKGS_TO_INSTALL\" ]; then apt-get update -qq && apt-get install -y -qq $PKGS_TO_INSTALL; fi"
            .to_string(),
    );
    lines.push("mkdir -p /run/sshd".to_string());
    lines.push(format!("mkdir -p {}", shell_quote(mngr_host_dir)));
    lines.join("; ")
}

/// The ssh directory for `user` (root gets `/root/.ssh`, everyone else
/// `/home/<user>/.ssh`).
fn user_ssh_dir(user: &str) -> String {
    if user == "root" {
        "/root/.ssh".to_string()
    } else {
        format!("/home/{user}/.ssh")
    }
}

/// Escape a key's embedded single quotes the way a POSIX shell single-quoted
/// string requires: close the quote, emit an escaped quote, reopen.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\"'\"'"))
}

/// Step 2: install the client's public key, drop any preexisting host keys,
/// and install the provided host key pair.
pub fn build_configure_ssh_command(
    user: &str,
    client_public_key: &str,
    host_private_key: &str,
    host_public_key: &str,
) -> String {
    let ssh_dir = user_ssh_dir(user);
    let lines = vec![
        format!("mkdir -p {}", shell_quote(&ssh_dir)),
        format!("echo {} > {}/authorized_keys", shell_quote(client_public_key), ssh_dir),
        format!("chmod 600 {}/authorized_keys", ssh_dir),
        "rm -f /etc/ssh/ssh_host_*".to_string(),
        format!("echo {} > /etc/ssh/ssh_host_ed25519_key", shell_quote(host_private_key)),
        format!("echo {} > /etc/ssh/ssh_host_ed25519_key.pub", shell_quote(host_public_key)),
        "chmod 600 /etc/ssh/ssh_host_ed25519_key".to_string(),
        "chmod 644 /etc/ssh/ssh_host_ed25519_key.pub".to_string(),
    ];
    lines.join("; ")
}

/// Step 3 (optional): append each known_hosts entry, 600-moded. `None` when
/// there is nothing to add.
pub fn build_add_known_hosts_command(user: &str, known_hosts_entries: &[String]) -> Option<String> {
    if known_hosts_entries.is_empty() {
        return None;
    }
    let ssh_dir = user_ssh_dir(user);
    let known_hosts_path = format!("{ssh_dir}/known_hosts");
    let mut lines = vec![format!("mkdir -p {}", shell_quote(&ssh_dir))];
    for entry in known_hosts_entries {
        lines.push(format!("printf '%s\\n' {} >> {}", shell_quote(entry), shell_quote(&known_hosts_path)));
    }
    lines.push(format!("chmod 600 {}", shell_quote(&known_hosts_path)));
    Some(lines.join("; "))
}

const ACTIVITY_WATCHER_SCRIPT: &str = include_str!("../resources/activity_watcher.sh");

/// Step 4: write the embedded activity-watcher script under
/// `<mngr_host_dir>/commands/` and launch it detached, logging to
/// `<mngr_host_dir>/logs/activity_watcher.log`.
pub fn build_start_activity_watcher_command(mngr_host_dir: &str) -> String {
    let commands_dir = format!("{mngr_host_dir}/commands");
    let logs_dir = format!("{mngr_host_dir}/logs");
    let script_path = format!("{commands_dir}/activity_watcher.sh");
    let log_path = format!("{logs_dir}/activity_watcher.log");
    let lines = vec![
        format!("mkdir -p {}", shell_quote(&commands_dir)),
        format!("mkdir -p {}", shell_quote(&logs_dir)),
        format!("cat > {} <<'MNGR_ACTIVITY_WATCHER_EOF'\n{}\nMNGR_ACTIVITY_WATCHER_EOF", script_path, ACTIVITY_WATCHER_SCRIPT),
        format!("chmod +x {}", shell_quote(&script_path)),
        format!("nohup {} {} > {} 2>&1 &", shell_quote(&script_path), shell_quote(mngr_host_dir), shell_quote(&log_path)),
    ];
    lines.join("; ")
}

/// Collect every `MNGR_WARN:`-prefixed line from `output`, stripped of the
/// prefix and trimmed (§4.11's "non-matching output is informational").
pub fn parse_warnings_from_output(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.strip_prefix(WARNING_PREFIX))
        .map(|warning| warning.trim().to_string())
        .collect()
}

#[cfg(test)]
#[path = "ssh_setup_tests.rs"]
mod tests;
