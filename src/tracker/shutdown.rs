use tokio::{select, sync::watch};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::ticker::Visibility;

/// Detects signals sent to the process and cancels the token on Ctrl-C.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C");
            cancelation.cancel();
        },
        _ = cancelation.cancelled() => (),
    };
}

/// Terminals have no notion of a hidden page, so visibility is driven by signals instead:
/// `SIGUSR1` hides the view and `SIGUSR2` shows it again. Does nothing outside of unix.
pub async fn detect_visibility(
    visibility: watch::Sender<Visibility>,
    cancelation: CancellationToken,
) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut hide = signal(SignalKind::user_defined1())?;
        let mut show = signal(SignalKind::user_defined2())?;
        loop {
            let next = select! {
                _ = cancelation.cancelled() => return Ok(()),
                _ = hide.recv() => Visibility::Hidden,
                _ = show.recv() => Visibility::Visible,
            };
            info!("Visibility changed to {next:?}");
            visibility.send_replace(next);
        }
    }
    #[cfg(not(unix))]
    {
        let _visibility = visibility;
        cancelation.cancelled().await;
        Ok(())
    }
}
