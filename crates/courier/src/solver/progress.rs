use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use fxhash::FxHashMap;
use tokio::{
    sync::mpsc::UnboundedSender,
    task::JoinHandle,
    time::{Instant, interval_at},
};
use tracing::debug;

use crate::session::session_event::SessionEvent;

const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickerHandle(u64);

impl std::fmt::Display for TickerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ticker#{}", self.0)
    }
}

struct Ticker {
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

/// Wall clock progress: one `SessionEvent::Tick` per second, whatever the
/// solver is doing.
pub struct ProgressReporter {
    events: UnboundedSender<SessionEvent>,
    next_id: u64,
    tickers: FxHashMap<TickerHandle, Ticker>,
}

impl ProgressReporter {
    pub fn new(events: UnboundedSender<SessionEvent>) -> Self {
        Self {
            events,
            next_id: 0,
            tickers: FxHashMap::default(),
        }
    }

    /// Ticks `1..=duration_secs`, then sends `TickerFinished`. Tickers that
    /// are already running keep going.
    pub fn start(&mut self, duration_secs: u64) -> TickerHandle {
        self.next_id += 1;
        let handle = TickerHandle(self.next_id);
        let cancelled = Arc::new(AtomicBool::new(false));
        let events = self.events.clone();
        let task_cancelled = Arc::clone(&cancelled);

        debug!(%handle, duration_secs, "starting ticker");

        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);

            for elapsed in 1..=duration_secs {
                interval.tick().await;
                if task_cancelled.load(Ordering::Relaxed) {
                    return;
                }
                if events.send(SessionEvent::Tick { handle, elapsed }).is_err() {
                    return;
                }
            }

            let _ = events.send(SessionEvent::TickerFinished { handle });
        });

        self.tickers.insert(handle, Ticker { cancelled, task });
        handle
    }

    /// Stops the ticker. Ticks it already queued are refused by `accept`.
    pub fn cancel(&mut self, handle: TickerHandle) {
        if let Some(ticker) = self.tickers.remove(&handle) {
            debug!(%handle, "cancelling ticker");
            ticker.cancelled.store(true, Ordering::Relaxed);
            ticker.task.abort();
        }
    }

    pub fn is_running(&self, handle: TickerHandle) -> bool {
        self.tickers
            .get(&handle)
            .is_some_and(|ticker| !ticker.task.is_finished())
    }

    /// Gate for events read off the channel: `false` for ticks of cancelled
    /// or unknown tickers. A ticker is forgotten once its `TickerFinished`
    /// passes.
    pub fn accept(&mut self, event: &SessionEvent) -> bool {
        match event {
            SessionEvent::Tick { handle, .. } => self.tickers.contains_key(handle),
            SessionEvent::TickerFinished { handle } => self.tickers.remove(handle).is_some(),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::{sync::mpsc, time::timeout};

    use super::*;

    async fn next_event(events: &mut mpsc::UnboundedReceiver<SessionEvent>) -> Option<SessionEvent> {
        timeout(Duration::from_secs(30), events.recv()).await.ok().flatten()
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_every_second_then_finishes() {
        let (sender, mut events) = mpsc::unbounded_channel();
        let mut reporter = ProgressReporter::new(sender);
        let started = Instant::now();

        let handle = reporter.start(5);
        assert!(reporter.is_running(handle));

        let mut ticks = Vec::new();
        loop {
            match next_event(&mut events).await {
                Some(SessionEvent::Tick { handle: tick_handle, elapsed }) => {
                    assert_eq!(tick_handle, handle);
                    ticks.push(elapsed);
                }
                Some(SessionEvent::TickerFinished { handle: finished }) => {
                    assert_eq!(finished, handle);
                    break;
                }
                other => panic!("unexpected event {other:?}"),
            }
        }

        assert_eq!(ticks, vec![1, 2, 3, 4, 5]);
        assert_eq!(started.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_first_tick() {
        let (sender, mut events) = mpsc::unbounded_channel();
        let mut reporter = ProgressReporter::new(sender);

        let handle = reporter.start(5);
        reporter.cancel(handle);

        assert!(!reporter.is_running(handle));
        assert!(next_event(&mut events).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_further_ticks() {
        let (sender, mut events) = mpsc::unbounded_channel();
        let mut reporter = ProgressReporter::new(sender);

        let handle = reporter.start(10);
        assert!(matches!(
            next_event(&mut events).await,
            Some(SessionEvent::Tick { elapsed: 1, .. })
        ));
        assert!(matches!(
            next_event(&mut events).await,
            Some(SessionEvent::Tick { elapsed: 2, .. })
        ));
        reporter.cancel(handle);

        assert!(next_event(&mut events).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_tick_is_refused_after_cancel() {
        let (sender, mut events) = mpsc::unbounded_channel();
        let mut reporter = ProgressReporter::new(sender);

        let handle = reporter.start(10);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        reporter.cancel(handle);

        let queued = events.try_recv().unwrap();
        assert!(matches!(
            queued,
            SessionEvent::Tick { handle: queued_handle, elapsed: 1 } if queued_handle == handle
        ));
        assert!(!reporter.accept(&queued));
        assert!(next_event(&mut events).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_accept_forgets_finished_ticker() {
        let (sender, mut events) = mpsc::unbounded_channel();
        let mut reporter = ProgressReporter::new(sender);

        let handle = reporter.start(1);
        let tick = next_event(&mut events).await.unwrap();
        assert!(reporter.accept(&tick));

        let finished = next_event(&mut events).await.unwrap();
        assert!(matches!(
            finished,
            SessionEvent::TickerFinished { handle: finished_handle } if finished_handle == handle
        ));
        assert!(reporter.accept(&finished));
        assert!(!reporter.accept(&finished));
        assert!(!reporter.is_running(handle));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_keeps_first_ticker() {
        let (sender, mut events) = mpsc::unbounded_channel();
        let mut reporter = ProgressReporter::new(sender);

        let first = reporter.start(2);
        let second = reporter.start(2);
        assert_ne!(first, second);

        let mut ticks: FxHashMap<TickerHandle, u64> = FxHashMap::default();
        let mut finished = 0;
        while finished < 2 {
            match next_event(&mut events).await {
                Some(SessionEvent::Tick { handle, .. }) => *ticks.entry(handle).or_default() += 1,
                Some(SessionEvent::TickerFinished { .. }) => finished += 1,
                other => panic!("unexpected event {other:?}"),
            }
        }

        assert_eq!(ticks.get(&first), Some(&2));
        assert_eq!(ticks.get(&second), Some(&2));
    }
}
