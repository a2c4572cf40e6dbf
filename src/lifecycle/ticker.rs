//! Periodic background tasks bound to shutdown.

use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::lifecycle::Shutdown;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Run `tick` every `period` until shutdown.
///
/// The first run happens one period after the call. Cancellation is
/// registered as a shutdown hook named `"ticker <name>"`; if shutdown has
/// already been triggered the task exits immediately.
pub fn spawn<F, Fut>(shutdown: &Shutdown, name: impl Into<String>, period: Duration, mut tick: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let name = name.into();
    let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
    shutdown.add_hook(format!("ticker {name}"), move || {
        let _ = cancel_tx.send(());
        Ok(())
    });

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period.max(MIN_PERIOD));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await;

        loop {
            tokio::select! {
                _ = &mut cancel_rx => break,
                _ = interval.tick() => tick().await,
            }
        }
        tracing::debug!(ticker = %name, "Ticker stopped");
    })
}
