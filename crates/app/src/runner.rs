//! Automation runner: drives the force-stop sequence for a queue of targets.
//!
//! The runner is a synchronous state machine. It owns the queue, the
//! [`RunState`] and the retry counter, and reacts to exactly three kinds of
//! trigger: commands ([`start`](AutomationRunner::start) /
//! [`abort`](AutomationRunner::abort)), screen-state notifications and
//! expiries of the timer it armed. Side effects go out through the port
//! traits and are never awaited.
//!
//! Per target the sequence is:
//!
//! 1. navigate to the target's settings screen, arm the navigation deadline;
//! 2. "Force stop" found → press it (once per navigation), wait for the
//!    settle delay, then arm the confirmation deadline. The latest
//!    notification received while settling is evaluated when the delay ends;
//! 3. confirmation found → press it and move to the next target.
//!
//! A deadline expiry (or a failed side effect) re-navigates to the same
//! target while retries are left, and gives up on it otherwise. The queue
//! therefore always drains.

use std::collections::VecDeque;

use forcestop_domain::error::ForceStopError;
use forcestop_domain::event::{FinishEvent, ProgressEvent};
use forcestop_domain::id::RunId;
use forcestop_domain::run::{RunState, TargetOutcome};
use forcestop_domain::screen::ScreenEventKind;
use forcestop_domain::status::{RunStatus, TargetReport, Timestamp, now};
use forcestop_domain::target::{Target, TargetId};

use crate::matcher::{MatchResult, ScreenMatcher};
use crate::ports::{EventPublisher, LabelResolver, ScreenDriver, UiElement};
use crate::settings::RunnerSettings;
use crate::timer::{ArmedTimer, TimerKind, TimerSlot, TimerToken};

/// Where the current target is within its sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Navigated; waiting for "Force stop" (or a confirmation dialog).
    AwaitingScreen,
    /// "Force stop" pressed; the dialog is still rendering.
    Settling,
    /// Settle delay over; waiting for the confirmation dialog.
    AwaitingConfirmation,
}

/// Sequential force-stop state machine.
pub struct AutomationRunner<D: ScreenDriver, R, P> {
    driver: D,
    resolver: R,
    publisher: P,
    matcher: ScreenMatcher,
    settings: RunnerSettings,
    state: RunState,
    step: Step,
    deferred: Option<(ScreenEventKind, D::Snapshot)>,
    queue: VecDeque<Target>,
    timers: TimerSlot,
    run_id: Option<RunId>,
    total: usize,
    reports: Vec<TargetReport>,
    started_at: Option<Timestamp>,
    finished_at: Option<Timestamp>,
}

impl<D, R, P> AutomationRunner<D, R, P>
where
    D: ScreenDriver,
    R: LabelResolver,
    P: EventPublisher,
{
    /// Create an idle runner.
    pub fn new(driver: D, resolver: R, publisher: P, settings: RunnerSettings) -> Self {
        let matcher = ScreenMatcher::new(
            settings.confirm_button.clone(),
            settings.force_stop_button.clone(),
        );
        Self {
            driver,
            resolver,
            publisher,
            matcher,
            settings,
            state: RunState::Idle,
            step: Step::AwaitingScreen,
            deferred: None,
            queue: VecDeque::new(),
            timers: TimerSlot::default(),
            run_id: None,
            total: 0,
            reports: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// The timer the runner is waiting on, if any.
    #[must_use]
    pub fn armed_timer(&self) -> Option<ArmedTimer> {
        self.timers.armed()
    }

    /// Targets still queued, the current one included.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Snapshot for progress displays.
    #[must_use]
    pub fn status(&self) -> RunStatus {
        RunStatus {
            run_id: self.run_id,
            state: self.state.clone(),
            total: self.total,
            remaining: self.queue.len(),
            reports: self.reports.clone(),
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }

    /// Start a run over `targets`, in order.
    ///
    /// Protected targets are dropped and labels are resolved once, here.
    /// An empty queue finishes the run immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ForceStopError::AlreadyRunning`] while another run is in
    /// progress; that run is left untouched.
    #[tracing::instrument(skip(self, targets), fields(requested = targets.len()))]
    pub fn start(&mut self, targets: Vec<TargetId>) -> Result<RunId, ForceStopError> {
        if self.state.is_running() {
            tracing::warn!("start rejected, a run is already in progress");
            return Err(ForceStopError::AlreadyRunning);
        }

        let run_id = RunId::new();
        self.run_id = Some(run_id);
        self.queue = self.build_queue(targets);
        self.total = self.queue.len();
        self.reports.clear();
        self.started_at = Some(now());
        self.finished_at = None;
        self.timers.disarm();
        tracing::info!(
            %run_id,
            total = self.total,
            worst_case_per_target = ?self.settings.worst_case_per_target(),
            "automation run started"
        );

        if self.queue.is_empty() {
            self.finish(false);
            return Ok(run_id);
        }
        self.begin_current();
        self.navigate_current();
        Ok(run_id)
    }

    /// Abort the run: drop the queue, cancel timers, report `aborted`.
    ///
    /// Always accepted. Aborting an idle runner finishes an empty run;
    /// aborting a finished one does nothing.
    #[tracing::instrument(skip(self))]
    pub fn abort(&mut self) {
        if matches!(self.state, RunState::Finished { .. }) {
            tracing::debug!("abort ignored, run already finished");
            return;
        }
        tracing::info!(dropped = self.queue.len(), "automation run aborted");
        self.finish(true);
    }

    /// Handle a screen-state notification.
    ///
    /// Ignored unless a run is in progress. While the UI settles after
    /// "Force stop" was pressed, the latest notification is held and
    /// evaluated once the settle delay is over.
    pub fn on_screen_changed(&mut self, kind: ScreenEventKind, snapshot: D::Snapshot) {
        if !self.state.is_running() || !kind.triggers_matching() {
            return;
        }
        if self.step == Step::Settling {
            tracing::trace!(?kind, "notification held until settled");
            self.deferred = Some((kind, snapshot));
            return;
        }
        self.evaluate(kind, &snapshot);
    }

    /// Handle the expiry of a timer armed by this runner.
    ///
    /// Tokens of cancelled or replaced timers are ignored.
    pub fn on_timer(&mut self, token: TimerToken) {
        let Some(kind) = self.timers.fire(token) else {
            tracing::trace!(?token, "stale timer ignored");
            return;
        };
        if !self.state.is_running() {
            return;
        }
        if kind.is_deadline() {
            tracing::info!(target_id = %self.current_id(), %kind, "deadline expired");
            self.retry_or_give_up();
        } else {
            self.step = Step::AwaitingConfirmation;
            self.timers
                .arm(TimerKind::Confirmation, self.settings.confirm_timeout);
            if let Some((event, snapshot)) = self.deferred.take() {
                self.evaluate(event, &snapshot);
            }
        }
    }

    fn evaluate(&mut self, kind: ScreenEventKind, snapshot: &D::Snapshot) {
        match self.matcher.match_screen(kind, snapshot) {
            MatchResult::None => {}
            MatchResult::StopButton(_) if self.step != Step::AwaitingScreen => {
                tracing::trace!(step = ?self.step, "force stop already pressed for this attempt");
            }
            MatchResult::StopButton(element) => {
                self.timers.disarm();
                match self.driver.activate(&element) {
                    Ok(()) => {
                        tracing::debug!(element = %element.describe(), "force stop pressed");
                        self.step = Step::Settling;
                        self.timers
                            .arm(TimerKind::Settle, self.settings.settle_delay);
                    }
                    Err(err) => self.on_side_effect_failed(&err),
                }
            }
            MatchResult::ConfirmButton(element) => {
                self.timers.disarm();
                match self.driver.activate(&element) {
                    Ok(()) => {
                        tracing::debug!(element = %element.describe(), "confirmation pressed");
                        self.advance(TargetOutcome::Stopped);
                    }
                    Err(err) => self.on_side_effect_failed(&err),
                }
            }
        }
    }

    fn build_queue(&self, targets: Vec<TargetId>) -> VecDeque<Target> {
        targets
            .into_iter()
            .filter(|id| {
                let protected = self.settings.is_protected(id);
                if protected {
                    tracing::warn!(target_id = %id, "protected target dropped from queue");
                }
                !protected
            })
            .map(|id| self.resolver.resolve_target(id))
            .collect()
    }

    fn current_id(&self) -> String {
        self.queue
            .front()
            .map_or_else(String::new, |t| t.id.to_string())
    }

    /// Mark the queue head as current and announce it.
    fn begin_current(&mut self) {
        let Some(target) = self.queue.front() else {
            return;
        };
        let event = ProgressEvent {
            run_id: *self.run_id.get_or_insert_with(RunId::new),
            target: target.id.clone(),
            label: target.label.clone(),
            current: self.total - self.queue.len() + 1,
            total: self.total,
        };
        self.state = RunState::Running {
            current: target.clone(),
            retry_count: 0,
        };
        tracing::info!(
            target_id = %event.target,
            current = event.current,
            total = event.total,
            "processing target"
        );
        self.publisher.publish(event.into());
    }

    /// Navigate to the queue head and arm its deadline.
    ///
    /// A failed navigation spends the retry budget like a timeout would, so
    /// this loops until a navigation is issued or the queue is empty.
    fn navigate_current(&mut self) {
        loop {
            let Some(target) = self.queue.front() else {
                self.finish(false);
                return;
            };
            match self.driver.navigate_to_target(&target.id) {
                Ok(()) => {
                    self.step = Step::AwaitingScreen;
                    self.deferred = None;
                    self.timers
                        .arm(TimerKind::Navigation, self.settings.navigation_timeout);
                    return;
                }
                Err(err) => {
                    tracing::warn!(%err, "navigation failed, treating as timeout");
                    if !self.try_consume_retry() && !self.dequeue(TargetOutcome::GaveUp) {
                        self.finish(false);
                        return;
                    }
                }
            }
        }
    }

    fn on_side_effect_failed(&mut self, err: &ForceStopError) {
        tracing::warn!(%err, target_id = %self.current_id(), "activation failed, treating as timeout");
        self.retry_or_give_up();
    }

    fn retry_or_give_up(&mut self) {
        if self.try_consume_retry() {
            self.navigate_current();
        } else {
            self.advance(TargetOutcome::GaveUp);
        }
    }

    fn try_consume_retry(&mut self) -> bool {
        let RunState::Running {
            current,
            retry_count,
        } = &mut self.state
        else {
            return false;
        };
        if *retry_count >= self.settings.retry_limit {
            return false;
        }
        *retry_count += 1;
        tracing::info!(target_id = %current.id, retry = *retry_count, "retrying target");
        true
    }

    /// Pop the current target and move on, finishing when nothing is left.
    fn advance(&mut self, outcome: TargetOutcome) {
        self.timers.disarm();
        if self.dequeue(outcome) {
            self.navigate_current();
        } else {
            self.finish(false);
        }
    }

    /// Pop the current target, recording `outcome`. Returns whether another
    /// target became current.
    fn dequeue(&mut self, outcome: TargetOutcome) -> bool {
        if let Some(target) = self.queue.pop_front() {
            tracing::info!(target_id = %target.id, %outcome, "target done");
            self.reports.push(TargetReport { target, outcome });
        }
        if self.queue.is_empty() {
            return false;
        }
        self.begin_current();
        true
    }

    fn finish(&mut self, aborted: bool) {
        self.timers.disarm();
        self.queue.clear();
        self.step = Step::AwaitingScreen;
        self.deferred = None;
        self.state = RunState::Finished { aborted };
        self.finished_at = Some(now());
        let run_id = *self.run_id.get_or_insert_with(RunId::new);

        let status = self.status();
        tracing::info!(
            %run_id,
            aborted,
            stopped = status.stopped(),
            gave_up = status.gave_up(),
            "automation run finished"
        );
        self.publisher
            .publish(FinishEvent { run_id, aborted }.into());
    }
}
