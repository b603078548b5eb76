// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn check_and_install_command_probes_every_required_package() {
    let cmd = build_check_and_install_packages_command("/var/mngr/host");
    for package in ["sshd", "tmux", "curl", "rsync", "git", "jq"] {
        assert!(cmd.contains(package), "missing probe for {package}");
    }
    assert!(cmd.contains("mkdir -p /run/sshd"));
    assert!(cmd.contains("mkdir -p '/var/mngr/host'"));
    assert!(cmd.contains("apt-get install -y -qq $PKGS_TO_INSTALL"));
}

#[test]
fn configure_ssh_command_uses_root_ssh_dir_for_root_user() {
    let cmd = build_configure_ssh_command("root", "ssh-ed25519 AAAA client", "PRIVATE", "PUBLIC");
    assert!(cmd.contains("/root/.ssh/authorized_keys"));
    assert!(cmd.contains("rm -f /etc/ssh/ssh_host_*"));
    assert!(cmd.contains("chmod 600 /etc/ssh/ssh_host_ed25519_key"));
    assert!(cmd.contains("chmod 644 /etc/ssh/ssh_host_ed25519_key.pub"));
}

#[test]
fn configure_ssh_command_uses_home_dir_for_non_root_user() {
    let cmd = build_configure_ssh_command("ubuntu", "key", "priv", "pub");
    assert!(cmd.contains("/home/ubuntu/.ssh/authorized_keys"));
}

#[test]
fn configure_ssh_command_escapes_embedded_single_quotes_in_keys() {
    let cmd = build_configure_ssh_command("root", "ssh-rsa AAA o'brien", "priv", "pub");
    assert!(cmd.contains("o'\"'\"'brien"));
}

#[test]
fn add_known_hosts_command_is_none_when_entries_are_empty() {
    assert!(build_add_known_hosts_command("root", &[]).is_none());
}

#[test]
fn add_known_hosts_command_appends_every_entry() {
    let entries = vec!["host1 ssh-ed25519 AAA".to_string(), "host2 ssh-ed25519 BBB".to_string()];
    let cmd = build_add_known_hosts_command("root", &entries).expect("some");
    assert!(cmd.contains("host1 ssh-ed25519 AAA"));
    assert!(cmd.contains("host2 ssh-ed25519 BBB"));
    assert!(cmd.contains("chmod 600 '/root/.ssh/known_hosts'"));
}

#[test]
fn start_activity_watcher_command_embeds_the_script_and_launches_detached() {
    let cmd = build_start_activity_watcher_command("/var/mngr/host");
    assert!(cmd.contains("activity watcher"));
    assert!(cmd.contains("chmod +x '/var/mngr/host/commands/activity_watcher.sh'"));
    assert!(cmd.contains("nohup"));
    assert!(cmd.ends_with("&"));
}

#[test]
fn parse_warnings_extracts_only_prefixed_lines() {
    let output = "some info\nMNGR_WARN: missing package: jq\nmore info\nMNGR_WARN:missing package: git\n";
    let warnings = parse_warnings_from_output(output);
    assert_eq!(warnings, vec!["missing package: jq".to_string(), "missing package: git".to_string()]);
}

#[test]
fn parse_warnings_returns_empty_when_nothing_matches() {
    assert!(parse_warnings_from_output("all good\nnothing to see\n").is_empty());
}
