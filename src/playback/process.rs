use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::error::PlaybackError;

/// OS process operations the playback controller relies on.
///
/// There is no PID bookkeeping: processes are found and stopped by executable
/// name, so a later invocation can stop what an earlier one started.
pub trait ProcessManager {
    /// Locate an executable on `PATH`, or check it directly if it contains a path separator.
    fn resolve_executable(&self, name: &str) -> Option<PathBuf>;

    /// Launch without waiting, detached from the caller's session.
    fn spawn_detached(&self, program: &Path, args: &[String]) -> Result<(), PlaybackError>;

    /// PIDs of running processes whose executable name is exactly `name`.
    fn list_by_executable_name(&self, name: &str) -> Result<Vec<u32>, PlaybackError>;

    fn terminate_by_executable_name(&self, name: &str) -> Result<(), PlaybackError>;

    /// Fail up front when lookup or termination could not run on this host.
    fn ensure_stop_supported(&self) -> Result<(), PlaybackError>;
}

/// Backend built on `pgrep`/`pkill` (or `killall`) and `setsid`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PosixProcessManager;

impl ProcessManager for PosixProcessManager {
    fn resolve_executable(&self, name: &str) -> Option<PathBuf> {
        find_executable(name)
    }

    fn spawn_detached(&self, program: &Path, args: &[String]) -> Result<(), PlaybackError> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // New session so the player outlives us and ignores our terminal's signals
            unsafe {
                command.pre_exec(|| {
                    if libc::setsid() == -1 {
                        return Err(std::io::Error::last_os_error());
                    }
                    Ok(())
                });
            }
        }

        let mut child = command.spawn().map_err(|source| PlaybackError::Spawn {
            binary: program.display().to_string(),
            source,
        })?;

        tracing::info!(pid = child.id(), program = %program.display(), "Started player");

        // Reap in the background so a long-running server doesn't collect zombies
        std::thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }

    fn ensure_stop_supported(&self) -> Result<(), PlaybackError> {
        let has_pgrep = find_executable("pgrep").is_some();
        let has_terminator =
            find_executable("pkill").is_some() || find_executable("killall").is_some();
        if has_pgrep && has_terminator {
            Ok(())
        } else {
            Err(PlaybackError::UnsupportedPlatform {
                tool: "pgrep/pkill tools".to_string(),
            })
        }
    }

    fn list_by_executable_name(&self, name: &str) -> Result<Vec<u32>, PlaybackError> {
        let pgrep = find_executable("pgrep").ok_or_else(|| PlaybackError::UnsupportedPlatform {
            tool: "pgrep".to_string(),
        })?;

        let output = Command::new(pgrep)
            .args(["-x", name])
            .stdin(Stdio::null())
            .output()
            .map_err(|_| PlaybackError::LookupFailed {
                player: name.to_string(),
            })?;

        // pgrep exits 1 when nothing matched
        match output.status.code() {
            Some(0) | Some(1) => Ok(parse_pids(&String::from_utf8_lossy(&output.stdout))),
            _ => Err(PlaybackError::LookupFailed {
                player: name.to_string(),
            }),
        }
    }

    fn terminate_by_executable_name(&self, name: &str) -> Result<(), PlaybackError> {
        let mut command = if let Some(pkill) = find_executable("pkill") {
            let mut c = Command::new(pkill);
            c.args(["-x", name]);
            c
        } else if let Some(killall) = find_executable("killall") {
            let mut c = Command::new(killall);
            c.arg(name);
            c
        } else {
            return Err(PlaybackError::UnsupportedPlatform {
                tool: "pkill/killall".to_string(),
            });
        };

        let status = command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|_| PlaybackError::StopFailed {
                player: name.to_string(),
            })?;

        if !status.success() {
            return Err(PlaybackError::StopFailed {
                player: name.to_string(),
            });
        }
        Ok(())
    }
}

/// Search `PATH` for an executable file named `name`.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }

    if name.contains(std::path::MAIN_SEPARATOR) || name.contains('/') {
        let path = PathBuf::from(name);
        return is_executable_file(&path).then_some(path);
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable_file(candidate))
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}

fn parse_pids(stdout: &str) -> Vec<u32> {
    stdout
        .lines()
        .filter_map(|line| line.trim().parse().ok())
        .collect()
}
