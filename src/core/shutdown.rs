//! # OS termination signals.
//!
//! **Unix:** `SIGINT`, `SIGTERM`, `SIGQUIT`. **Elsewhere:** Ctrl-C.

/// Completes on the first termination signal; `Err` if registration fails.
#[cfg(unix)]
pub(crate) async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Completes on Ctrl-C; `Err` if registration fails.
#[cfg(not(unix))]
pub(crate) async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
