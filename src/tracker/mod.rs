use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Result;
use session::Session;
use ticker::{TickView, Ticker, Visibility};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::{
    storage::kv_store::{FileStore, KeyValueStore},
    utils::clock::{Clock, DefaultClock},
};

pub mod export;
pub mod render;
pub mod session;
pub mod shutdown;
pub mod ticker;

/// Opens the session stored under `<dir>/store`.
pub async fn open_session(dir: &Path, clock: impl Clock) -> Result<Session<FileStore>> {
    let store = FileStore::new(dir.join("store"))?;
    Ok(Session::load(store, Box::new(clock)).await)
}

/// Represents the starting point for the live view. Runs until Ctrl-C.
pub async fn start_watch(
    dir: PathBuf,
    view: impl TickView,
    tick_frequency: Duration,
    reload_every: u32,
) -> Result<()> {
    let session = open_session(&dir, DefaultClock).await?;

    let shutdown_token = CancellationToken::new();
    let (visibility, receiver) = watch::channel(Visibility::Visible);

    let ticker = create_ticker(
        session,
        view,
        receiver,
        &shutdown_token,
        tick_frequency,
        reload_every,
    );

    let (_, visibility_result, ticker_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token.clone()),
        shutdown::detect_visibility(visibility, shutdown_token.clone()),
        async {
            let result = ticker.run().await;
            // The ticker only stops on shutdown or failure, either way everything else stops too.
            shutdown_token.cancel();
            result
        },
    );

    if let Err(visibility_result) = visibility_result {
        error!("Visibility detection got an error {:?}", visibility_result);
    }

    ticker_result
}

fn create_ticker<S: KeyValueStore, V: TickView>(
    session: Session<S>,
    view: V,
    visibility: watch::Receiver<Visibility>,
    shutdown_token: &CancellationToken,
    tick_frequency: Duration,
    reload_every: u32,
) -> Ticker<S, V> {
    Ticker::new(
        session,
        view,
        Some(visibility),
        shutdown_token.clone(),
        tick_frequency,
        reload_every,
    )
}

#[cfg(test)]
mod tracker_tests {
    use std::{
        fs,
        sync::{
            atomic::{AtomicU32, Ordering},
            Arc,
        },
        time::Duration,
    };

    use anyhow::Result;
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use tempfile::tempdir;
    use tokio::sync::watch;
    use tokio_util::sync::CancellationToken;

    use crate::{
        storage::entities::ClockStatus,
        tracker::{
            create_ticker, open_session,
            ticker::{MockTickView, Visibility},
        },
        utils::{clock::FixedClock, logging::TEST_LOGGING},
    };

    fn test_moment() -> NaiveDateTime {
        NaiveDateTime::new(
            NaiveDate::from_ymd_opt(2018, 7, 4).unwrap(),
            NaiveTime::from_hms_opt(12, 30, 0).unwrap(),
        )
    }

    /// Smoke test: actions from one invocation are visible to the next one through the files,
    /// and a live view over the same directory doesn't overwrite them on shutdown.
    #[tokio::test(start_paused = true)]
    async fn smoke_test_file_backed_session() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;

        let mut session = open_session(dir.path(), FixedClock::new(test_moment())).await?;
        assert_eq!(session.toggle_clock().await, ClockStatus::In);
        session.set_extra_income("30").await;
        drop(session);

        let files = fs::read_dir(dir.path().join("store"))?.count();
        assert_eq!(files, 2);

        let session = open_session(dir.path(), FixedClock::new(test_moment())).await?;
        assert!(session.state().clocked_in);
        assert_eq!(session.attendance().len(), 1);

        let renders = Arc::new(AtomicU32::new(0));
        let counter = renders.clone();
        let mut view = MockTickView::new();
        view.expect_render().returning(move |state| {
            assert_eq!(state.earned_with_extra, 280.);
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let shutdown_token = CancellationToken::new();
        let (_visibility, receiver) = watch::channel(Visibility::Visible);
        let ticker = create_ticker(
            session,
            view,
            receiver,
            &shutdown_token,
            Duration::from_millis(100),
            5,
        );

        let (_, result) = tokio::join!(
            async {
                tokio::time::sleep(Duration::from_millis(550)).await;
                shutdown_token.cancel()
            },
            ticker.run(),
        );
        result?;

        assert!(renders.load(Ordering::SeqCst) >= 5);
        let files = fs::read_dir(dir.path().join("store"))?.count();
        assert_eq!(files, 2);
        let session = open_session(dir.path(), FixedClock::new(test_moment())).await?;
        assert!(session.state().clocked_in);
        assert_eq!(session.state().extra_income_today, 30.);
        Ok(())
    }
}
