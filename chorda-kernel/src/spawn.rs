//! Command execution - fork/exec of `shell -c cmd` children.

use std::ffi::CString;

use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, execvp, fork, setsid};

use chorda_api::MenuStatus;

use crate::error::ChordError;

/// Exit code used by a child whose exec failed.
const EX_SOFTWARE: i32 = 70;

/// Spawn `shell -c cmd`.
///
/// Synchronous spawns block on `waitpid` until the command finishes.
/// Asynchronous spawns double-fork so the command is reparented to init and
/// the menu never has to reap it. `child_cleanup` runs inside the forked
/// child before exec, detaching display state inherited from the parent.
pub fn spawn(
    shell: &str,
    cmd: &str,
    sync: bool,
    child_cleanup: Option<&dyn Fn()>,
) -> Result<MenuStatus, ChordError> {
    let argv = shell_argv(shell, cmd)?;

    match unsafe { fork() }.map_err(|err| ChordError::Spawn(err.to_string()))? {
        ForkResult::Child => {
            if let Some(cleanup) = child_cleanup {
                cleanup();
            }

            if !sync {
                /* detach: the grandchild runs the command, this child exits */
                match unsafe { fork() } {
                    Ok(ForkResult::Parent { .. }) => std::process::exit(0),
                    Ok(ForkResult::Child) => {}
                    Err(_) => std::process::exit(EX_SOFTWARE),
                }
            }

            let _ = setsid();
            let _ = execvp(&argv[0], &argv);
            eprintln!("chorda: failed to exec '{} -c {}'", shell, cmd);
            std::process::exit(EX_SOFTWARE);
        }
        ForkResult::Parent { child } => {
            let status =
                waitpid(child, None).map_err(|err| ChordError::Spawn(err.to_string()))?;

            if sync {
                /* a signal death is a failure; any clean exit counts as ok */
                match status {
                    WaitStatus::Exited(_, _) => Ok(MenuStatus::ExitOk),
                    _ => Ok(MenuStatus::ExitSoftware),
                }
            } else {
                /* only the short-lived intermediate was reaped */
                Ok(MenuStatus::ExitOk)
            }
        }
    }
}

fn shell_argv(shell: &str, cmd: &str) -> Result<Vec<CString>, ChordError> {
    let argv = [shell, "-c", cmd]
        .into_iter()
        .map(CString::new)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ChordError::Spawn("command contains a NUL byte".to_string()))?;
    Ok(argv)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_spawn_waits_for_exit() {
        assert_eq!(
            spawn("/bin/sh", "true", true, None).unwrap(),
            MenuStatus::ExitOk
        );
        /* a failing command still exited cleanly */
        assert_eq!(
            spawn("/bin/sh", "false", true, None).unwrap(),
            MenuStatus::ExitOk
        );
    }

    #[test]
    fn test_async_spawn_returns_immediately() {
        assert_eq!(
            spawn("/bin/sh", "sleep 0.01", false, None).unwrap(),
            MenuStatus::ExitOk
        );
    }

    #[test]
    fn test_nul_byte_rejected() {
        assert!(spawn("/bin/sh", "echo \0oops", true, None).is_err());
    }
}
