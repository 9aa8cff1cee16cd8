use tokio::select;
use tokio_util::sync::CancellationToken;

/// Detects signals sent to the process. Also completes when the token is
/// cancelled elsewhere, e.g. when the host closes the event pipe.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            cancelation.cancel();
        },
        _ = cancelation.cancelled() => (),
    };
}
