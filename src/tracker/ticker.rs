use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::storage::kv_store::KeyValueStore;

use super::{render::RenderState, session::Session};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);
/// Reload persisted state about once a second with the default interval.
pub const DEFAULT_RELOAD_EVERY: u32 = 10;

/// Whether anybody is looking at the view. Hidden views don't get ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Receives a frame on every tick.
#[cfg_attr(test, mockall::automock)]
pub trait TickView {
    fn render(&mut self, state: &RenderState) -> Result<()>;
}

/// Periodically turns the session into a [RenderState] and hands it to a [TickView].
pub struct Ticker<S: KeyValueStore, V: TickView> {
    session: Session<S>,
    view: V,
    visibility: Option<watch::Receiver<Visibility>>,
    shutdown: CancellationToken,
    tick_frequency: Duration,
    reload_every: u32,
}

impl<S: KeyValueStore, V: TickView> Ticker<S, V> {
    /// `reload_every` of zero never reloads the session.
    pub fn new(
        session: Session<S>,
        view: V,
        visibility: Option<watch::Receiver<Visibility>>,
        shutdown: CancellationToken,
        tick_frequency: Duration,
        reload_every: u32,
    ) -> Self {
        Self {
            session,
            view,
            visibility,
            shutdown,
            tick_frequency,
            reload_every,
        }
    }

    fn is_hidden(&self) -> bool {
        self.visibility
            .as_ref()
            .is_some_and(|v| *v.borrow() == Visibility::Hidden)
    }

    fn tick(&mut self) {
        let state = self.session.render_state(self.session.clock().local_time());
        if let Err(e) = self.view.render(&state) {
            error!("Failed to render a frame {e:?}");
        }
    }

    /// Executes the tick loop until shutdown, then retries writes the session couldn't make.
    pub async fn run(mut self) -> Result<()> {
        let mut tick_point = self.session.clock().instant();
        let mut ticks = 0u32;
        loop {
            if self.is_hidden() {
                info!("View hidden, pausing ticks");
                tokio::select! {
                    _ = self.shutdown.cancelled() => break,
                    _ = visibility_changed(&mut self.visibility) => {
                        // Restart the schedule instead of catching up on missed ticks.
                        tick_point = self.session.clock().instant();
                        continue;
                    }
                }
            }

            if self.reload_every > 0 && ticks > 0 && ticks % self.reload_every == 0 {
                debug!("Reloading session");
                self.session.reload().await;
            }
            ticks = ticks.wrapping_add(1);
            tick_point += self.tick_frequency;

            self.tick();

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = visibility_changed(&mut self.visibility) => (),
                _ = self.session.clock().sleep_until(tick_point) => ()
            }
        }

        info!("Stopping ticker after {ticks} ticks");
        self.session.flush().await
    }
}

/// Resolves when visibility changes. Once the sender is gone the view stays as it was last seen
/// and this never resolves again.
async fn visibility_changed(visibility: &mut Option<watch::Receiver<Visibility>>) {
    match visibility {
        Some(receiver) => {
            if receiver.changed().await.is_err() {
                debug!("Visibility sender dropped");
                *visibility = None;
                std::future::pending::<()>().await;
            }
        }
        None => std::future::pending::<()>().await,
    }
}
