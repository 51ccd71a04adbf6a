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

//! Encrypted secret storage backed by the `pass` password manager.
//!
//! Secrets live as GPG-encrypted `*.gpg` files under `<suzaku home>/.password-store`. Every
//! operation shells out to `pass` with `PASSWORD_STORE_DIR` pointing at that directory.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs, io,
    ops::{Deref, DerefMut},
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
};

use tokio::{io::AsyncWriteExt, process::Command};

/// Name of the suzaku home directory under the user's home.
pub const SUZAKU_HOME_DIR: &str = ".suzaku-cli";
const STORE_DIR: &str = ".password-store";
const SECRET_EXTENSION: &str = "gpg";

/// Errors returned by keystore operations.
#[derive(Debug, thiserror::Error)]
pub enum KeystoreError {
    #[error(
        "`pass` CLI is not installed or not in PATH, see https://www.passwordstore.org/ to install it"
    )]
    PassNotInstalled,
    #[error("keystore {} does not exist, initialize it with `suzaku keystore init <gpg-id>`", .0.display())]
    NotInitialized(PathBuf),
    #[error("keystore path {} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("at least one GPG ID is required to initialize the keystore")]
    NoGpgIds,
    #[error("secret {0} not found in the keystore")]
    SecretNotFound(String),
    #[error("`pass {command}` failed ({status}): {stderr}")]
    Command { command: &'static str, status: ExitStatus, stderr: String },
    #[error("`pass {command}` failed ({status})")]
    SensitiveCommand { command: &'static str, status: ExitStatus },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// The default suzaku home, `$HOME/.suzaku-cli`.
pub fn default_home() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(SUZAKU_HOME_DIR))
}

/// A directory of the store: sub-directories map to `Some`, secrets to `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree(BTreeMap<String, Option<Tree>>);

impl Deref for Tree {
    type Target = BTreeMap<String, Option<Tree>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Tree {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// A `pass` store rooted in a suzaku home.
#[derive(Clone, Debug)]
pub struct Keystore {
    store_dir: PathBuf,
    pass_bin: PathBuf,
    tree: Tree,
}

impl Keystore {
    /// Open the existing store of the suzaku home `home`.
    pub async fn open(home: &Path) -> Result<Self, KeystoreError> {
        Self::open_with(home, "pass").await
    }

    /// Open the store of `home` using the `pass` executable at `pass_bin`.
    pub async fn open_with(home: &Path, pass_bin: impl Into<PathBuf>) -> Result<Self, KeystoreError> {
        let store_dir = home.join(STORE_DIR);
        if !store_dir.exists() {
            return Err(KeystoreError::NotInitialized(store_dir));
        }
        if !store_dir.is_dir() {
            return Err(KeystoreError::NotADirectory(store_dir));
        }
        let mut keystore = Self { store_dir, pass_bin: pass_bin.into(), tree: Tree::default() };
        let version = keystore.version().await?;
        tracing::debug!(%version, store = %keystore.store_dir.display(), "opened keystore");
        keystore.refresh()?;
        Ok(keystore)
    }

    /// Create the store of `home` encrypted to `gpg_ids`, or re-encrypt an existing one.
    pub async fn init(home: &Path, gpg_ids: &[String]) -> Result<Self, KeystoreError> {
        Self::init_with(home, gpg_ids, "pass").await
    }

    pub async fn init_with(
        home: &Path,
        gpg_ids: &[String],
        pass_bin: impl Into<PathBuf>,
    ) -> Result<Self, KeystoreError> {
        if gpg_ids.is_empty() {
            return Err(KeystoreError::NoGpgIds);
        }
        let mut keystore =
            Self { store_dir: home.join(STORE_DIR), pass_bin: pass_bin.into(), tree: Tree::default() };
        let mut args = vec!["init".to_string()];
        args.extend(gpg_ids.iter().cloned());
        keystore.run("init", &args, None).await?;
        keystore.refresh()?;
        Ok(keystore)
    }

    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    async fn run(
        &self,
        command: &'static str,
        args: &[String],
        stdin: Option<&str>,
    ) -> Result<String, KeystoreError> {
        let mut child = Command::new(&self.pass_bin)
            .args(args)
            .env("PASSWORD_STORE_DIR", &self.store_dir)
            .env("NO_COLOR", "1")
            .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| match err.kind() {
                io::ErrorKind::NotFound => KeystoreError::PassNotInstalled,
                _ => KeystoreError::Io(err),
            })?;

        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            pipe.write_all(input.as_bytes()).await?;
            pipe.write_all(b"\n").await?;
            drop(pipe);
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            // Output of commands handling secrets may echo them back.
            if matches!(command, "show" | "insert") {
                return Err(KeystoreError::SensitiveCommand { command, status: output.status });
            }
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(KeystoreError::Command { command, status: output.status, stderr });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn refresh(&mut self) -> Result<(), KeystoreError> {
        self.tree = read_tree(&self.store_dir)?;
        Ok(())
    }

    /// Version of the `pass` executable.
    pub async fn version(&self) -> Result<String, KeystoreError> {
        let out = self.run("version", &["version".to_string()], None).await?;
        Ok(parse_version(&out).unwrap_or_else(|| "unknown".to_string()))
    }

    /// Encrypt `secret` under `name`.
    pub async fn insert(&mut self, name: &str, secret: &str, force: bool) -> Result<(), KeystoreError> {
        let mut args = vec!["insert".to_string(), "-e".to_string()];
        if force {
            args.push("--force".to_string());
        }
        args.push(name.to_string());
        self.run("insert", &args, Some(secret)).await?;
        self.refresh()
    }

    /// Decrypt the secret `name`.
    pub async fn show(&self, name: &str) -> Result<String, KeystoreError> {
        if !self.contains(name) {
            return Err(KeystoreError::SecretNotFound(name.to_string()));
        }
        self.run("show", &["show".to_string(), name.to_string()], None).await
    }

    pub async fn rm(&mut self, name: &str, recursive: bool, force: bool) -> Result<(), KeystoreError> {
        let mut args = vec!["rm".to_string()];
        if recursive {
            args.push("--recursive".to_string());
        }
        if force {
            args.push("--force".to_string());
        }
        args.push(name.to_string());
        self.run("rm", &args, None).await?;
        self.refresh()
    }

    pub async fn mv(&mut self, from: &str, to: &str, force: bool) -> Result<(), KeystoreError> {
        self.run("mv", &move_args("mv", from, to, force), None).await?;
        self.refresh()
    }

    pub async fn cp(&mut self, from: &str, to: &str, force: bool) -> Result<(), KeystoreError> {
        self.run("cp", &move_args("cp", from, to, force), None).await?;
        self.refresh()
    }

    /// Whether a secret named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        let mut parts: Vec<&str> = name.split('/').filter(|p| !p.is_empty()).collect();
        let Some(leaf) = parts.pop() else {
            return false;
        };
        let mut node = &self.tree;
        for part in parts {
            match node.get(part) {
                Some(Some(child)) => node = child,
                _ => return false,
            }
        }
        matches!(node.get(leaf), Some(None))
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Render the store as a tree rooted at the store directory name.
    pub fn render(&self) -> String {
        let name = self
            .store_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| STORE_DIR.to_string());
        render_tree(&name, &self.tree)
    }

    /// Unique email addresses of the public keys in the local GPG keyring.
    pub async fn list_gpg_ids() -> Result<Vec<String>, KeystoreError> {
        let output = Command::new("gpg").arg("-k").stdin(Stdio::null()).output().await?;
        if !output.status.success() {
            return Err(KeystoreError::Command {
                command: "gpg -k",
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(parse_gpg_uids(&String::from_utf8_lossy(&output.stdout)))
    }
}

fn move_args(command: &str, from: &str, to: &str, force: bool) -> Vec<String> {
    let mut args = vec![command.to_string()];
    if force {
        args.push("--force".to_string());
    }
    args.push(from.to_string());
    args.push(to.to_string());
    args
}

/// Read the `*.gpg` entries under `dir`, names stripped of their extension.
pub fn read_tree(dir: &Path) -> io::Result<Tree> {
    let mut tree = Tree::default();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            tree.insert(name, Some(read_tree(&path)?));
        } else if path.extension().is_some_and(|ext| ext == SECRET_EXTENSION) {
            let stem = name.trim_end_matches(".gpg").to_string();
            tree.insert(stem, None);
        }
    }
    Ok(tree)
}

/// Render `tree` with box drawing connectors.
pub fn render_tree(root: &str, tree: &Tree) -> String {
    fn walk(node: &Tree, prefix: &str, lines: &mut Vec<String>) {
        let count = node.len();
        for (i, (name, child)) in node.iter().enumerate() {
            let last = i + 1 == count;
            let connector = if last { "└── " } else { "├── " };
            lines.push(format!("{prefix}{connector}{name}"));
            if let Some(child) = child {
                let prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
                walk(child, &prefix, lines);
            }
        }
    }

    let mut lines = vec![root.to_string()];
    walk(tree, "", &mut lines);
    lines.join("\n")
}

/// First `x.y.z` version number in `text`.
fn parse_version(text: &str) -> Option<String> {
    text.split(|c: char| !(c.is_ascii_digit() || c == '.'))
        .find(|token| {
            let parts: Vec<&str> = token.split('.').collect();
            parts.len() == 3 && parts.iter().all(|p| !p.is_empty())
        })
        .map(str::to_string)
}

/// Emails of the `uid` lines of `gpg -k` output, deduplicated in order.
fn parse_gpg_uids(output: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    output
        .lines()
        .filter(|line| line.starts_with("uid"))
        .filter_map(|line| {
            let start = line.find('<')?;
            let end = line[start..].find('>')? + start;
            Some(line[start + 1..end].trim().to_string())
        })
        .filter(|email| !email.is_empty() && seen.insert(email.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"encrypted").unwrap();
    }

    #[test]
    fn reads_secret_tree() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("operator.gpg"));
        touch(&dir.path().join("fuji/deployer.gpg"));
        touch(&dir.path().join("fuji/nested/relayer.gpg"));
        touch(&dir.path().join(".gpg-id"));
        touch(&dir.path().join("notes.txt"));

        let tree = read_tree(dir.path()).unwrap();
        let rendered = render_tree(".password-store", &tree);
        assert_eq!(
            rendered,
            [
                ".password-store",
                "├── fuji",
                "│   ├── deployer",
                "│   └── nested",
                "│       └── relayer",
                "└── operator",
            ]
            .join("\n")
        );
    }

    #[test]
    fn parses_pass_version() {
        let banner = "============================================\n\
                      = pass: the standard unix password manager =\n\
                      =                                          =\n\
                      =                  v1.7.4                  =\n";
        assert_eq!(parse_version(banner).as_deref(), Some("1.7.4"));
        assert_eq!(parse_version("no version here 1.2"), None);
    }

    #[test]
    fn parses_gpg_uids() {
        let output = "pub   ed25519 2024-01-01 [SC]\n\
                      uid           [ultimate] Alice <alice@example.com>\n\
                      sub   cv25519 2024-01-01 [E]\n\
                      uid           [ultimate] Alice (work) <alice@example.com>\n\
                      uid           [ unknown] Bob <bob@example.com>\n";
        assert_eq!(parse_gpg_uids(output), vec!["alice@example.com", "bob@example.com"]);
    }

    #[tokio::test]
    async fn missing_store_is_not_initialized() {
        let home = tempfile::tempdir().unwrap();
        let err = Keystore::open(home.path()).await.unwrap_err();
        assert!(matches!(err, KeystoreError::NotInitialized(_)), "{err}");
    }

    #[tokio::test]
    async fn init_requires_gpg_ids() {
        let home = tempfile::tempdir().unwrap();
        let err = Keystore::init(home.path(), &[]).await.unwrap_err();
        assert!(matches!(err, KeystoreError::NoGpgIds), "{err}");
    }

    #[tokio::test]
    async fn missing_pass_binary_is_reported() {
        let home = tempfile::tempdir().unwrap();
        fs::create_dir_all(home.path().join(STORE_DIR)).unwrap();
        let err = Keystore::open_with(home.path(), home.path().join("no-such-pass"))
            .await
            .unwrap_err();
        assert!(matches!(err, KeystoreError::PassNotInstalled), "{err}");
        assert!(err.to_string().contains("passwordstore.org"));
    }

    #[cfg(unix)]
    mod with_fake_pass {
        use std::os::unix::fs::PermissionsExt;

        use super::*;

        // Stores secrets in clear text with the layout of `pass`, bold unless NO_COLOR is set.
        const FAKE_PASS: &str = r#"#!/bin/sh
for last; do :; done
case "$1" in
  version) echo "= v1.7.4 =" ;;
  init) mkdir -p "$PASSWORD_STORE_DIR" && echo "$2" > "$PASSWORD_STORE_DIR/.gpg-id" ;;
  insert) mkdir -p "$(dirname "$PASSWORD_STORE_DIR/$last")" && cat > "$PASSWORD_STORE_DIR/$last.gpg" ;;
  show) [ -n "$NO_COLOR" ] || printf '\033[1m'; cat "$PASSWORD_STORE_DIR/$last.gpg" ;;
  rm) rm -rf "$PASSWORD_STORE_DIR/$last.gpg" "$PASSWORD_STORE_DIR/$last" ;;
  *) echo "unsupported command $1" >&2; exit 1 ;;
esac
"#;

        fn fake_pass(dir: &Path) -> PathBuf {
            let path = dir.join("pass");
            fs::write(&path, FAKE_PASS).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[tokio::test]
        async fn secrets_lifecycle() {
            let bin = tempfile::tempdir().unwrap();
            let home = tempfile::tempdir().unwrap();
            let pass = fake_pass(bin.path());

            let ids = vec!["alice@example.com".to_string()];
            let mut keystore = Keystore::init_with(home.path(), &ids, &pass).await.unwrap();
            assert!(keystore.tree().is_empty());

            keystore.insert("fuji/operator", "0xsecret", false).await.unwrap();
            assert!(keystore.contains("fuji/operator"));
            assert!(!keystore.contains("fuji"));
            assert_eq!(keystore.show("fuji/operator").await.unwrap(), "0xsecret");

            let reopened = Keystore::open_with(home.path(), &pass).await.unwrap();
            assert!(reopened.render().contains("└── operator"));

            keystore.rm("fuji/operator", false, true).await.unwrap();
            assert!(!keystore.contains("fuji/operator"));
            let err = keystore.show("fuji/operator").await.unwrap_err();
            assert!(matches!(err, KeystoreError::SecretNotFound(_)), "{err}");
        }

        #[tokio::test]
        async fn failures_include_stderr() {
            let bin = tempfile::tempdir().unwrap();
            let home = tempfile::tempdir().unwrap();
            let pass = fake_pass(bin.path());
            let ids = vec!["alice@example.com".to_string()];
            let mut keystore = Keystore::init_with(home.path(), &ids, &pass).await.unwrap();

            let err = keystore.mv("a", "b", false).await.unwrap_err();
            assert!(err.to_string().contains("unsupported command mv"), "{err}");
        }
    }
}
