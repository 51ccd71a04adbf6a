// Copyright 2025 The Suzaku CLI Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Integration tests of the `suzaku` binary that need no running node.

use assert_cmd::Command;
use assert_fs::TempDir;
use predicates::str::contains;

// Well known anvil account #0.
const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const L1_MANAGER: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

fn suzaku() -> Command {
    let mut cmd = Command::cargo_bin("suzaku").unwrap();
    for var in ["PK", "SUZAKU_SECRET_NAME", "SUZAKU_NETWORK", "RPC_URL", "SUZAKU_HOME"] {
        cmd.env_remove(var);
    }
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_help_lists_command_groups() {
    suzaku()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("middleware"))
        .stdout(contains("vault-manager"))
        .stdout(contains("opt-in"))
        .stdout(contains("pchain"))
        .stdout(contains("keystore"));
}

#[test]
fn test_mainnet_rejects_private_key() {
    suzaku()
        .args(["--network", "mainnet", "--private-key", ANVIL_KEY, "pchain", "address"])
        .assert()
        .failure()
        .stdout(contains("not accepted on mainnet"));
}

#[test]
fn test_invalid_node_id_is_rejected() {
    suzaku()
        .args([
            "uptime",
            "get-validation-uptime-message",
            "http://127.0.0.1:9650/ext/bc/C/rpc",
            "NodeID-not-a-node",
            "11111111111111111111111111111111LpoYY",
        ])
        .assert()
        .failure()
        .stderr(contains("invalid value"));
}

#[test]
fn test_opt_in_calldata_needs_no_signer() {
    suzaku()
        .args(["--network", "anvil", "opt-in", "l1-in", L1_MANAGER, "--calldata"])
        .assert()
        .success()
        .stdout(contains("Opt In L1 Call"))
        .stdout(contains("Contract: 0x8A791620dd6260079BF849Dc5567aDC3F2FdC318"))
        .stdout(contains("Calldata: 0x"));
}

#[test]
fn test_keystore_requires_init() {
    let home = TempDir::new().unwrap();
    suzaku()
        .args(["keystore", "list", "--suzaku-home"])
        .arg(home.path())
        .assert()
        .failure()
        .stdout(contains("does not exist"));
}

#[test]
fn test_write_without_signer_fails() {
    let home = TempDir::new().unwrap();
    suzaku()
        .args(["--network", "anvil", "opt-in", "l1-in", L1_MANAGER, "--suzaku-home"])
        .arg(home.path())
        .assert()
        .failure()
        .stdout(contains("--private-key"));
}

#[test]
fn test_reads_survive_unreachable_rpc() {
    let operator = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
    let commands = [
        vec!["l1", "operators", L1_MANAGER],
        vec!["operator", "l1s", operator],
        vec!["operator", "stakes", operator, "--vault-manager", L1_MANAGER],
    ];
    for command in commands {
        suzaku()
            .args(["--network", "anvil", "--rpc-url", "http://127.0.0.1:1"])
            .args(&command)
            .assert()
            .success()
            .stdout(contains("Failed to read"));
    }
}

#[test]
fn test_completions() {
    suzaku().args(["completions", "bash"]).assert().success().stdout(contains("suzaku"));
}
