use log::{debug, warn};
use std::future::Future;
use std::time::Duration;

/// How long a capture process gets to exit on its own after being asked to.
pub const GRACE_PERIOD: Duration = Duration::from_secs(5);

/// How a capture process ended up exiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The process exited within the grace period after the graceful request.
    Graceful,
    /// The grace period elapsed and the process had to be killed.
    Forced,
}

/// Two-phase termination: request a graceful exit, wait out the grace
/// period, then kill.
///
/// `exited` must resolve once the process has been reaped; the caller keeps
/// ownership of whatever performs the reaping (typically the session's
/// monitor) and this helper only drives the signalling and the bounded wait.
/// Exceeding the grace period is not an error, just the escalation trigger.
pub async fn terminate_with_grace<F>(pid: u32, grace: Duration, exited: F) -> Termination
where
    F: Future<Output = ()>,
{
    tokio::pin!(exited);

    request_graceful_exit(pid);

    match tokio::time::timeout(grace, &mut exited).await {
        Ok(()) => {
            debug!("Process {} exited within the grace period", pid);
            Termination::Graceful
        }
        Err(_) => {
            warn!(
                "Process {} did not exit within {:?}; escalating to kill",
                pid, grace
            );
            force_kill(pid);
            exited.await;
            Termination::Forced
        }
    }
}

#[cfg(unix)]
fn request_graceful_exit(pid: u32) {
    debug!("Requesting graceful exit of process {}", pid);
    unsafe {
        libc::kill(pid as i32, libc::SIGTERM);
    }
}

#[cfg(not(unix))]
fn request_graceful_exit(pid: u32) {
    debug!("Requesting graceful exit of process {}", pid);
    let _ = std::process::Command::new("taskkill")
        .args(["/PID", &pid.to_string()])
        .output();
}

#[cfg(unix)]
fn force_kill(pid: u32) {
    unsafe {
        libc::kill(pid as i32, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn force_kill(pid: u32) {
    let _ = std::process::Command::new("taskkill")
        .args(["/F", "/PID", &pid.to_string()])
        .output();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::process::Stdio;
    use tokio::process::Command;
    use tokio::time::timeout;

    // Both tests race a real process against a grace window, so they run
    // serially to keep scheduler noise out of the timing.
    #[tokio::test]
    #[serial]
    async fn cooperative_process_exits_gracefully() {
        let mut child = Command::new("sleep")
            .arg("30")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .unwrap();
        let pid = child.id().unwrap();
        let exited = async move {
            let _ = child.wait().await;
        };

        let termination = timeout(
            Duration::from_secs(10),
            terminate_with_grace(pid, Duration::from_secs(5), exited),
        )
        .await
        .unwrap();

        assert_eq!(termination, Termination::Graceful);
    }

    #[cfg(unix)]
    #[tokio::test]
    #[serial]
    async fn stubborn_process_gets_killed_after_grace() {
        // SIG_IGN installed before exec survives it, so the sleep is
        // already immune to the graceful request when spawn returns and
        // only dies to the kill.
        let mut cmd = Command::new("sleep");
        cmd.arg("5").stdin(Stdio::null()).kill_on_drop(true);
        unsafe {
            cmd.pre_exec(|| {
                libc::signal(libc::SIGTERM, libc::SIG_IGN);
                Ok(())
            });
        }
        let mut child = cmd.spawn().unwrap();
        let pid = child.id().unwrap();
        let exited = async move {
            let _ = child.wait().await;
        };

        let termination = timeout(
            Duration::from_secs(10),
            terminate_with_grace(pid, Duration::from_millis(400), exited),
        )
        .await
        .unwrap();

        assert_eq!(termination, Termination::Forced);
    }
}
