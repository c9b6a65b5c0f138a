//! Runner task: feeds an [`AutomationRunner`] from a single command queue.
//!
//! Commands, screen notifications and timer expiries are processed one at a
//! time by a single tokio task, so the runner itself needs no locking. The
//! cloneable [`RunnerHandle`] is the only way in.
//!
//! Aborts are also flagged out of band: the flag is checked before every
//! trigger, so an abort takes effect on the next trigger processed even when
//! notifications are already queued ahead of it. The flag only cuts a run in
//! progress short; an idle runner is aborted by the queued command itself.

use std::future::pending;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Sleep;

use forcestop_domain::error::ForceStopError;
use forcestop_domain::id::RunId;
use forcestop_domain::screen::ScreenEventKind;
use forcestop_domain::status::RunStatus;
use forcestop_domain::target::TargetId;

use crate::ports::{EventPublisher, LabelResolver, ScreenDriver};
use crate::runner::AutomationRunner;
use crate::timer::TimerToken;

type SnapshotOf<D> = <D as ScreenDriver>::Snapshot;

enum Command<S> {
    Start {
        targets: Vec<TargetId>,
        reply: oneshot::Sender<Result<RunId, ForceStopError>>,
    },
    Abort,
    ScreenChanged {
        kind: ScreenEventKind,
        snapshot: S,
    },
}

/// Cloneable entry point to a running [`RunnerTask`].
pub struct RunnerHandle<S> {
    commands: mpsc::UnboundedSender<Command<S>>,
    abort_requested: Arc<AtomicBool>,
    status: watch::Receiver<RunStatus>,
}

impl<S> Clone for RunnerHandle<S> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
            abort_requested: Arc::clone(&self.abort_requested),
            status: self.status.clone(),
        }
    }
}

impl<S> RunnerHandle<S> {
    /// Start a run and wait for the runner to accept or reject it.
    ///
    /// # Errors
    ///
    /// Returns [`ForceStopError::AlreadyRunning`] if a run is in progress, or
    /// [`ForceStopError::RunnerGone`] if the task has stopped.
    pub async fn start(&self, targets: Vec<TargetId>) -> Result<RunId, ForceStopError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Start { targets, reply })
            .map_err(|_| ForceStopError::RunnerGone)?;
        response.await.map_err(|_| ForceStopError::RunnerGone)?
    }

    /// Request an abort. Safe to call from any thread, never blocks.
    pub fn abort(&self) {
        self.abort_requested.store(true, Ordering::SeqCst);
        // Wakes the task if it is idle; the flag alone is enough otherwise.
        let _ = self.commands.send(Command::Abort);
    }

    /// Deliver a screen-state notification.
    ///
    /// # Errors
    ///
    /// Returns [`ForceStopError::RunnerGone`] if the task has stopped.
    pub fn screen_changed(&self, kind: ScreenEventKind, snapshot: S) -> Result<(), ForceStopError> {
        self.commands
            .send(Command::ScreenChanged { kind, snapshot })
            .map_err(|_| ForceStopError::RunnerGone)
    }

    /// Status after the last processed trigger.
    #[must_use]
    pub fn status(&self) -> RunStatus {
        self.status.borrow().clone()
    }

    /// Subscribe to status changes.
    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<RunStatus> {
        self.status.clone()
    }
}

/// Owns the runner and processes its triggers one at a time.
pub struct RunnerTask<D: ScreenDriver, R, P> {
    runner: AutomationRunner<D, R, P>,
    commands: mpsc::UnboundedReceiver<Command<SnapshotOf<D>>>,
    abort_requested: Arc<AtomicBool>,
    status: watch::Sender<RunStatus>,
}

impl<D, R, P> RunnerTask<D, R, P>
where
    D: ScreenDriver + Send + 'static,
    D::Snapshot: Send + 'static,
    R: LabelResolver + Send + 'static,
    P: EventPublisher + Send + 'static,
{
    /// Spawn the task on the current tokio runtime.
    ///
    /// The task stops once every handle has been dropped, aborting a run that
    /// is still in progress.
    pub fn spawn(runner: AutomationRunner<D, R, P>) -> (RunnerHandle<D::Snapshot>, JoinHandle<()>) {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(runner.status());
        let abort_requested = Arc::new(AtomicBool::new(false));

        let task = Self {
            runner,
            commands: commands_rx,
            abort_requested: Arc::clone(&abort_requested),
            status: status_tx,
        };
        let handle = RunnerHandle {
            commands: commands_tx,
            abort_requested,
            status: status_rx,
        };
        (handle, tokio::spawn(task.run()))
    }

    async fn run(mut self) {
        let mut sleep: Option<(TimerToken, Pin<Box<Sleep>>)> = None;

        loop {
            self.sync_timer(&mut sleep);

            let timer = async {
                match sleep.as_mut() {
                    Some((token, delay)) => {
                        delay.as_mut().await;
                        *token
                    }
                    None => pending().await,
                }
            };

            tokio::select! {
                command = self.commands.recv() => {
                    let Some(command) = command else { break };
                    self.apply_pending_abort();
                    self.handle(command);
                }
                token = timer => {
                    sleep = None;
                    self.apply_pending_abort();
                    self.runner.on_timer(token);
                }
            }

            self.status.send_replace(self.runner.status());
        }

        if self.runner.state().is_running() {
            tracing::info!("all runner handles dropped, aborting run in progress");
            self.runner.abort();
            self.status.send_replace(self.runner.status());
        }
        tracing::debug!("runner task stopped");
    }

    fn handle(&mut self, command: Command<SnapshotOf<D>>) {
        match command {
            Command::Start { targets, reply } => {
                let result = self.runner.start(targets);
                if reply.send(result).is_err() {
                    tracing::debug!("start requester went away before the reply");
                }
            }
            Command::Abort => self.runner.abort(),
            Command::ScreenChanged { kind, snapshot } => {
                self.runner.on_screen_changed(kind, snapshot);
            }
        }
    }

    fn apply_pending_abort(&mut self) {
        let requested = self.abort_requested.swap(false, Ordering::SeqCst);
        if requested && self.runner.state().is_running() {
            self.runner.abort();
        }
    }

    /// Point the sleep at the runner's armed timer, restarting it only when
    /// the runner armed a new one.
    fn sync_timer(&self, sleep: &mut Option<(TimerToken, Pin<Box<Sleep>>)>) {
        let armed = self.runner.armed_timer();
        let current = sleep.as_ref().map(|(token, _)| *token);
        if armed.map(|t| t.token) == current {
            return;
        }
        *sleep = armed.map(|t| (t.token, Box::pin(tokio::time::sleep(t.duration))));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::tests::{FakeNode, FakeScreen, ok_button, stop_button};
    use crate::settings::RunnerSettings;
    use forcestop_domain::event::RunEvent;
    use forcestop_domain::run::RunState;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default, Clone)]
    struct CountingDriver {
        navigations: Arc<Mutex<Vec<String>>>,
        clicks: Arc<Mutex<usize>>,
    }

    impl ScreenDriver for CountingDriver {
        type Snapshot = FakeScreen;

        fn navigate_to_target(&self, target: &TargetId) -> Result<(), ForceStopError> {
            self.navigations.lock().unwrap().push(target.to_string());
            Ok(())
        }

        fn activate(&self, _element: &&FakeNode) -> Result<(), ForceStopError> {
            *self.clicks.lock().unwrap() += 1;
            Ok(())
        }
    }

    struct NoLabels;

    impl LabelResolver for NoLabels {
        fn resolve_label(&self, target: &TargetId) -> Result<String, ForceStopError> {
            Err(ForceStopError::resolution(target.clone(), "no labels"))
        }
    }

    #[derive(Clone)]
    struct ChannelPublisher(mpsc::UnboundedSender<RunEvent>);

    impl EventPublisher for ChannelPublisher {
        fn publish(&self, event: RunEvent) {
            let _ = self.0.send(event);
        }
    }

    struct Fixture {
        handle: RunnerHandle<FakeScreen>,
        driver: CountingDriver,
        events: mpsc::UnboundedReceiver<RunEvent>,
        join: JoinHandle<()>,
    }

    fn spawn() -> Fixture {
        let driver = CountingDriver::default();
        let (events_tx, events) = mpsc::unbounded_channel();
        let runner = AutomationRunner::new(
            driver.clone(),
            NoLabels,
            ChannelPublisher(events_tx),
            RunnerSettings::default(),
        );
        let (handle, join) = RunnerTask::spawn(runner);
        Fixture {
            handle,
            driver,
            events,
            join,
        }
    }

    fn ids(values: &[&str]) -> Vec<TargetId> {
        values.iter().map(|v| TargetId::new(v).unwrap()).collect()
    }

    async fn settle_tasks() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn should_reply_with_run_id_on_start() {
        let fx = spawn();
        let run_id = fx.handle.start(ids(&["a"])).await.unwrap();
        settle_tasks().await;
        assert_eq!(fx.handle.status().run_id, Some(run_id));
        assert!(fx.handle.status().state.is_running());
    }

    #[tokio::test]
    async fn should_reject_second_start_through_handle() {
        let fx = spawn();
        fx.handle.start(ids(&["a"])).await.unwrap();
        let second = fx.handle.start(ids(&["b"])).await;
        assert!(matches!(second, Err(ForceStopError::AlreadyRunning)));
    }

    #[tokio::test]
    async fn should_complete_run_from_notifications() {
        let mut fx = spawn();
        fx.handle.start(ids(&["a", "b"])).await.unwrap();

        fx.handle
            .screen_changed(
                ScreenEventKind::WindowContentChanged,
                FakeScreen::with(vec![ok_button(true)]),
            )
            .unwrap();
        fx.handle
            .screen_changed(
                ScreenEventKind::WindowContentChanged,
                FakeScreen::with(vec![ok_button(true)]),
            )
            .unwrap();

        let mut seen = Vec::new();
        while let Some(event) = fx.events.recv().await {
            let terminal = event.is_terminal();
            seen.push(event);
            if terminal {
                break;
            }
        }
        assert_eq!(seen.len(), 3);
        assert!(matches!(seen[2], RunEvent::Finished(f) if !f.aborted));
        assert_eq!(*fx.driver.clicks.lock().unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn should_renavigate_then_give_up_when_screen_never_changes() {
        let mut fx = spawn();
        fx.handle.start(ids(&["a"])).await.unwrap();

        tokio::time::sleep(Duration::from_millis(5_100)).await;
        settle_tasks().await;
        assert_eq!(*fx.driver.navigations.lock().unwrap(), vec!["a", "a"]);
        assert!(fx.handle.status().state.is_running());

        tokio::time::sleep(Duration::from_millis(5_100)).await;
        settle_tasks().await;
        assert_eq!(
            fx.handle.status().state,
            RunState::Finished { aborted: false }
        );

        let _progress = fx.events.recv().await.unwrap();
        let finish = fx.events.recv().await.unwrap();
        assert!(matches!(finish, RunEvent::Finished(f) if !f.aborted));
    }

    #[tokio::test(start_paused = true)]
    async fn should_match_dialog_shown_during_settle_delay_once_settled() {
        let fx = spawn();
        fx.handle.start(ids(&["a"])).await.unwrap();

        fx.handle
            .screen_changed(
                ScreenEventKind::WindowContentChanged,
                FakeScreen::with(vec![stop_button(true)]),
            )
            .unwrap();
        settle_tasks().await;
        fx.handle
            .screen_changed(
                ScreenEventKind::WindowContentChanged,
                FakeScreen::with(vec![ok_button(true)]),
            )
            .unwrap();
        settle_tasks().await;
        assert_eq!(*fx.driver.clicks.lock().unwrap(), 1);

        tokio::time::sleep(Duration::from_millis(600)).await;
        settle_tasks().await;

        assert_eq!(*fx.driver.clicks.lock().unwrap(), 2);
        assert_eq!(
            fx.handle.status().state,
            RunState::Finished { aborted: false }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_give_up_when_stop_button_is_reported_forever() {
        let fx = spawn();
        fx.handle.start(ids(&["a"])).await.unwrap();

        for _ in 0..12 {
            fx.handle
                .screen_changed(
                    ScreenEventKind::WindowContentChanged,
                    FakeScreen::with(vec![stop_button(true)]),
                )
                .unwrap();
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        settle_tasks().await;

        let status = fx.handle.status();
        assert_eq!(status.state, RunState::Finished { aborted: false });
        assert_eq!(status.gave_up(), 1);
        assert_eq!(*fx.driver.clicks.lock().unwrap(), 2);
        assert_eq!(*fx.driver.navigations.lock().unwrap(), vec!["a", "a"]);
    }

    #[tokio::test]
    async fn should_abort_run_started_just_before_abort_request() {
        let mut fx = spawn();

        let (started, ()) = tokio::join!(fx.handle.start(ids(&["a"])), async {
            fx.handle.abort();
        });
        let run_id = started.unwrap();
        settle_tasks().await;

        let progress = fx.events.recv().await.unwrap();
        assert!(matches!(&progress, RunEvent::Progress(p) if p.run_id == run_id));
        let finish = fx.events.recv().await.unwrap();
        assert!(matches!(finish, RunEvent::Finished(f) if f.aborted && f.run_id == run_id));
        assert!(fx.events.try_recv().is_err());
        assert_eq!(
            fx.handle.status().state,
            RunState::Finished { aborted: true }
        );
    }

    #[tokio::test]
    async fn should_abort_ahead_of_queued_notifications() {
        let fx = spawn();
        fx.handle.start(ids(&["a", "b"])).await.unwrap();

        fx.handle
            .screen_changed(
                ScreenEventKind::WindowContentChanged,
                FakeScreen::with(vec![ok_button(true)]),
            )
            .unwrap();
        fx.handle.abort();
        settle_tasks().await;

        assert_eq!(
            fx.handle.status().state,
            RunState::Finished { aborted: true }
        );
        assert_eq!(*fx.driver.clicks.lock().unwrap(), 0);
        assert_eq!(*fx.driver.navigations.lock().unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn should_abort_from_another_thread() {
        let fx = spawn();
        fx.handle.start(ids(&["a"])).await.unwrap();

        let remote = fx.handle.clone();
        std::thread::spawn(move || remote.abort()).join().unwrap();

        let mut status = fx.handle.watch_status();
        status
            .wait_for(|s| matches!(s.state, RunState::Finished { .. }))
            .await
            .unwrap();
        assert_eq!(
            fx.handle.status().state,
            RunState::Finished { aborted: true }
        );
    }

    #[tokio::test]
    async fn should_abort_run_when_last_handle_is_dropped() {
        let mut fx = spawn();
        fx.handle.start(ids(&["a"])).await.unwrap();
        let _progress = fx.events.recv().await.unwrap();

        drop(fx.handle);
        fx.join.await.unwrap();

        let finish = fx.events.recv().await.unwrap();
        assert!(matches!(finish, RunEvent::Finished(f) if f.aborted));
    }

    #[tokio::test]
    async fn should_report_runner_gone_after_task_stops() {
        let fx = spawn();
        fx.join.abort();
        let _ = fx.join.await;
        let result = fx.handle.start(ids(&["a"])).await;
        assert!(matches!(result, Err(ForceStopError::RunnerGone)));
    }
}
