use std::sync::{Arc, Weak};

use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

use crate::models::Run;
use crate::projects::ProjectStore;

use super::{
    recorder, LaunchParams, Lap, TimerAction, TimerConfig, TimerError, TimerMode, TimerSession,
    TimerSnapshot,
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

type TaskSlot = Mutex<Option<JoinHandle<()>>>;

struct Shared {
    session: Mutex<TimerSession>,
    ticker: TaskSlot,
    blinker: TaskSlot,
    updates: watch::Sender<TimerSnapshot>,
    config: TimerConfig,
}

impl Shared {
    fn publish(&self, session: &TimerSession) {
        self.updates.send_replace(session.snapshot());
    }

    /// Brings the tick and blink tasks in line with `session`. Must be called
    /// with the session lock held so no task observes a half-applied change.
    async fn reconcile(self: &Arc<Self>, session: &TimerSession) {
        if session.is_ticking() {
            self.ensure_ticker().await;
        } else {
            cancel_task(&self.ticker).await;
        }

        if session.blink_active() {
            self.ensure_blinker().await;
        } else {
            cancel_task(&self.blinker).await;
        }
    }

    async fn ensure_ticker(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        ensure_task(&self.ticker, move || tokio::spawn(tick_loop(weak))).await;
    }

    /// Starting the blink while it is already running is a no-op.
    async fn ensure_blinker(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        ensure_task(&self.blinker, move || tokio::spawn(blink_loop(weak))).await;
    }
}

/// Drives one practice session: owns its state and the two periodic
/// processes that mutate it, and publishes a snapshot after every change.
///
/// Dropping the controller stops both processes.
pub struct TimerController {
    shared: Arc<Shared>,
    params: LaunchParams,
}

impl TimerController {
    pub fn new(params: LaunchParams, config: TimerConfig) -> Self {
        let session = params.new_session();
        let (updates, _) = watch::channel(session.snapshot());

        log_info!(
            "Timer launched: {}s {} ({})",
            params.total_duration_secs,
            params.mode.as_str(),
            params
                .project_id
                .as_deref()
                .map(|id| format!("project {id}"))
                .unwrap_or_else(|| "quick start".to_string())
        );

        Self {
            shared: Arc::new(Shared {
                session: Mutex::new(session),
                ticker: Mutex::new(None),
                blinker: Mutex::new(None),
                updates,
                config,
            }),
            params,
        }
    }

    pub fn params(&self) -> &LaunchParams {
        &self.params
    }

    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.shared.updates.subscribe()
    }

    pub async fn snapshot(&self) -> TimerSnapshot {
        self.shared.session.lock().await.snapshot()
    }

    pub async fn session(&self) -> TimerSession {
        self.shared.session.lock().await.clone()
    }

    pub async fn start(&self) -> Result<(), TimerError> {
        self.apply(TimerAction::Start, TimerSession::start).await
    }

    pub async fn pause(&self) -> Result<(), TimerError> {
        self.apply(TimerAction::Pause, TimerSession::pause).await
    }

    pub async fn resume(&self) -> Result<(), TimerError> {
        self.apply(TimerAction::Resume, TimerSession::resume).await
    }

    pub async fn primary_action(&self) -> Result<TimerAction, TimerError> {
        self.apply(TimerAction::Start, TimerSession::primary_action)
            .await
    }

    pub async fn reset(&self) -> Result<(), TimerError> {
        self.apply(TimerAction::Reset, TimerSession::reset).await
    }

    pub async fn lap(&self) -> Result<Lap, TimerError> {
        self.apply(TimerAction::Lap, |session| session.lap().cloned())
            .await
    }

    pub async fn toggle_mode(&self) -> Result<TimerMode, TimerError> {
        self.apply(TimerAction::ToggleMode, TimerSession::toggle_mode)
            .await
    }

    /// Stops the session and both processes, and returns the terminal state.
    pub async fn teardown(&self) -> TimerSession {
        let mut guard = self.shared.session.lock().await;
        guard.stop();
        self.shared.reconcile(&guard).await;
        self.shared.publish(&guard);
        guard.clone()
    }

    /// Leaves the timer immediately; recording the run happens in the
    /// background. Awaiting the handle is optional.
    pub async fn save_and_exit<S>(&self, store: Arc<S>) -> JoinHandle<Option<Run>>
    where
        S: ProjectStore + 'static,
    {
        let session = self.teardown().await;
        let params = self.params.clone();
        tokio::spawn(async move { recorder::finish_session(store.as_ref(), &params, &session).await })
    }

    async fn apply<T, F>(&self, action: TimerAction, change: F) -> Result<T, TimerError>
    where
        F: FnOnce(&mut TimerSession) -> Result<T, TimerError>,
    {
        let mut guard = self.shared.session.lock().await;
        let outcome = change(&mut *guard);
        match &outcome {
            Ok(_) => log_debug!("{action:?} -> {:?}", guard.status()),
            Err(err) => log_warn!("Ignored timer action: {err}"),
        }
        self.shared.reconcile(&guard).await;
        self.shared.publish(&guard);
        outcome
    }
}

impl Drop for TimerController {
    fn drop(&mut self) {
        for slot in [&self.shared.ticker, &self.shared.blinker] {
            if let Ok(mut guard) = slot.try_lock() {
                if let Some(handle) = guard.take() {
                    handle.abort();
                }
            }
        }
    }
}

async fn ensure_task<F>(slot: &TaskSlot, spawn: F)
where
    F: FnOnce() -> JoinHandle<()>,
{
    let mut guard = slot.lock().await;
    let alive = guard.as_ref().is_some_and(|handle| !handle.is_finished());
    if !alive {
        *guard = Some(spawn());
    }
}

/// Aborts the task in `slot` and waits until it is gone.
async fn cancel_task(slot: &TaskSlot) {
    let handle = slot.lock().await.take();
    if let Some(handle) = handle {
        handle.abort();
        let _ = handle.await;
    }
}

fn periodic(period: std::time::Duration) -> time::Interval {
    // First tick one full period from now, never immediately.
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn tick_loop(shared: Weak<Shared>) {
    let mut interval = match shared.upgrade() {
        Some(shared) => periodic(shared.config.tick_interval),
        None => return,
    };

    loop {
        interval.tick().await;
        let Some(shared) = shared.upgrade() else {
            break;
        };

        let mut guard = shared.session.lock().await;
        if !guard.is_ticking() {
            break;
        }
        guard.tick();
        if shared.config.trace_ticks {
            log_debug!("tick {} ({})", guard.display(), guard.mode().as_str());
        }
        if guard.blink_active() {
            shared.ensure_blinker().await;
        }
        shared.publish(&guard);
    }
}

async fn blink_loop(shared: Weak<Shared>) {
    let mut interval = match shared.upgrade() {
        Some(shared) => periodic(shared.config.blink_interval),
        None => return,
    };

    loop {
        interval.tick().await;
        let Some(shared) = shared.upgrade() else {
            break;
        };

        let mut guard = shared.session.lock().await;
        if !guard.blink_active() {
            break;
        }
        guard.blink_toggle();
        shared.publish(&guard);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::models::{Duration as TargetDuration, Project};
    use crate::projects::store::testing::MemoryStore;
    use crate::timer::{QuickStartChoice, TimerColor, TimerStatus};

    fn quick(secs: u32, mode: TimerMode) -> TimerController {
        let params = LaunchParams::quick_start(
            Some(QuickStartChoice::Custom(TargetDuration::from_total_seconds(secs))),
            mode,
        )
        .unwrap();
        TimerController::new(params, TimerConfig::default())
    }

    async fn has_task(slot: &TaskSlot) -> bool {
        slot.lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_ticks_before_start() {
        let timer = quick(10, TimerMode::Countdown);
        time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(timer.snapshot().await.elapsed_secs, 10);
        assert!(!has_task(&timer.shared.ticker).await);
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_ticks_once_per_second_into_overtime() {
        let timer = quick(10, TimerMode::Countdown);
        timer.start().await.unwrap();

        time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(timer.snapshot().await.elapsed_secs, 7);

        time::sleep(Duration::from_secs(9)).await;
        let snapshot = timer.snapshot().await;
        assert_eq!(snapshot.elapsed_secs, -2);
        assert_eq!(snapshot.display, "-00:02");
        assert_eq!(snapshot.color, TimerColor::Red);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_freezes_and_resume_continues() {
        let timer = quick(60, TimerMode::Stopwatch);
        timer.start().await.unwrap();
        time::sleep(Duration::from_millis(2_500)).await;

        timer.pause().await.unwrap();
        assert!(!has_task(&timer.shared.ticker).await);
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(timer.snapshot().await.elapsed_secs, 2);

        timer.resume().await.unwrap();
        time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(timer.snapshot().await.elapsed_secs, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stopwatch_overtime_starts_blink_and_reset_stops_it() {
        let timer = quick(5, TimerMode::Stopwatch);
        timer.start().await.unwrap();

        time::sleep(Duration::from_millis(5_500)).await;
        assert!(!has_task(&timer.shared.blinker).await);

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(timer.snapshot().await.elapsed_secs, 6);
        assert!(has_task(&timer.shared.blinker).await);

        // Blink keeps going while paused.
        timer.pause().await.unwrap();
        let mut updates = timer.subscribe();
        let _ = updates.borrow_and_update();
        time::sleep(Duration::from_millis(600)).await;
        assert!(updates.has_changed().unwrap());
        assert!(has_task(&timer.shared.blinker).await);

        timer.reset().await.unwrap();
        assert!(!has_task(&timer.shared.blinker).await);
        let snapshot = timer.snapshot().await;
        assert_eq!(snapshot.elapsed_secs, 0);
        assert_eq!(snapshot.status, TimerStatus::Ready);
        assert!(!snapshot.dimmed);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_cycles_keep_one_task_each() {
        let timer = quick(1, TimerMode::Stopwatch);
        for _ in 0..3 {
            timer.start().await.unwrap();
            time::sleep(Duration::from_millis(2_500)).await;
            assert!(has_task(&timer.shared.blinker).await);
            timer.reset().await.unwrap();
            assert!(!has_task(&timer.shared.ticker).await);
            assert!(!has_task(&timer.shared.blinker).await);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_keeps_ticking_in_new_mode() {
        let timer = quick(30, TimerMode::Countdown);
        timer.start().await.unwrap();
        time::sleep(Duration::from_millis(4_500)).await;

        assert_eq!(timer.toggle_mode().await, Ok(TimerMode::Stopwatch));
        assert_eq!(timer.snapshot().await.elapsed_secs, 4);

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(timer.snapshot().await.elapsed_secs, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn lap_only_while_running() {
        let timer = quick(30, TimerMode::Countdown);
        assert!(timer.lap().await.is_err());

        timer.start().await.unwrap();
        time::sleep(Duration::from_millis(3_500)).await;
        let lap = timer.lap().await.unwrap();
        assert_eq!(lap.index, 1);
        assert_eq!(lap.split_time, "00:03");

        timer.pause().await.unwrap();
        assert!(timer.lap().await.is_err());
        assert_eq!(timer.snapshot().await.lap_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_stops_everything() {
        let timer = quick(1, TimerMode::Stopwatch);
        timer.start().await.unwrap();
        time::sleep(Duration::from_millis(2_500)).await;

        let session = timer.teardown().await;
        assert_eq!(session.status(), TimerStatus::Stopped);
        assert!(!has_task(&timer.shared.ticker).await);
        assert!(!has_task(&timer.shared.blinker).await);

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(timer.snapshot().await.elapsed_secs, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn save_and_exit_records_project_run() {
        let project = Project {
            id: "p1".into(),
            name: "Conference talk".into(),
            duration: TargetDuration::normalize(1, 0),
            word_count: 150,
            script_name: None,
            runs: Vec::new(),
        };
        let store = Arc::new(MemoryStore::with(vec![project.clone()]));
        let timer = TimerController::new(
            LaunchParams::for_project(&project, TimerMode::Countdown),
            TimerConfig::default(),
        );

        timer.start().await.unwrap();
        time::sleep(Duration::from_millis(37_500)).await;

        let run = timer.save_and_exit(store.clone()).await.await.unwrap().unwrap();
        assert_eq!(run.duration, 37);
        assert_eq!(store.snapshot()[0].runs.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn quick_start_exit_discards() {
        let store = Arc::new(MemoryStore::default());
        let timer = quick(60, TimerMode::Stopwatch);
        timer.start().await.unwrap();
        time::sleep(Duration::from_millis(1_500)).await;

        assert!(timer.save_and_exit(store.clone()).await.await.unwrap().is_none());
        assert_eq!(store.save_count(), 0);
    }
}
