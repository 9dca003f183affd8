//! The intro animation gate.
//!
//! A three-phase sequencer: `Idle` waits for the first qualifying scroll, wheel or key
//! signal; `Playing` swallows page motion while the clip runs for a fixed duration;
//! `Complete` releases input for good and runs a delayed fade of the image container.

use crate::config::GateConfig;
use crate::foundation::core::{Millis, Timestamp};
use crate::foundation::error::{IntroError, IntroResult};
use crate::input::{Disposition, InputSignal};
use crate::presentation::{Layer, PhaseVisuals, Presentation, Surface, fit_layers};
use crate::timeline::{GateTask, Task, TaskHandle, Timeline};

/// Gate phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for the first qualifying signal.
    #[default]
    Idle,
    /// Clip running, page motion suppressed.
    Playing,
    /// Clip finished; input is never intercepted again until reset.
    Complete,
}

/// Session state owned exclusively by [`IntroGate`].
#[derive(Clone, Debug, serde::Serialize)]
pub struct AnimationSession {
    phase: Phase,
    scroll_threshold_px: f64,
    wheel_sensitivity: f64,
    clip_duration: Millis,
    listeners_attached: bool,
    playing_since: Option<Timestamp>,
    completed_at: Option<Timestamp>,
}

impl AnimationSession {
    fn new(config: &GateConfig) -> Self {
        Self {
            phase: Phase::Idle,
            scroll_threshold_px: config.scroll_threshold_px,
            wheel_sensitivity: config.wheel_sensitivity,
            clip_duration: config.clip_duration,
            listeners_attached: true,
            playing_since: None,
            completed_at: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// `true` exactly while the clip is playing.
    pub fn input_suppressed(&self) -> bool {
        self.phase == Phase::Playing
    }

    /// `true` until the session completes; the host keeps its suppression listeners
    /// attached while this holds.
    pub fn listeners_attached(&self) -> bool {
        self.listeners_attached
    }

    /// Clip length used by the next `Playing` phase.
    pub fn clip_duration(&self) -> Millis {
        self.clip_duration
    }

    /// Scroll position that arms the intro.
    pub fn scroll_threshold_px(&self) -> f64 {
        self.scroll_threshold_px
    }

    /// When the current `Playing` phase began.
    pub fn playing_since(&self) -> Option<Timestamp> {
        self.playing_since
    }

    /// When the session completed.
    pub fn completed_at(&self) -> Option<Timestamp> {
        self.completed_at
    }
}

#[derive(Clone, Debug, Default)]
struct GateTimers {
    clip: Option<TaskHandle>,
    indicator: Option<TaskHandle>,
    container_fade: Option<TaskHandle>,
    container_remove: Option<TaskHandle>,
}

impl GateTimers {
    fn cancel_all(&mut self, timeline: &mut Timeline) {
        for handle in [
            self.clip.take(),
            self.indicator.take(),
            self.container_fade.take(),
            self.container_remove.take(),
        ]
        .into_iter()
        .flatten()
        {
            timeline.cancel(handle);
        }
    }
}

/// Scroll gate around the one-shot intro clip.
#[derive(Clone, Debug)]
pub struct IntroGate {
    session: AnimationSession,
    indicator_fade: Millis,
    final_hold: Millis,
    container_fade: Millis,
    timers: GateTimers,
}

impl IntroGate {
    /// Create an idle gate.
    pub fn new(config: &GateConfig) -> Self {
        Self {
            session: AnimationSession::new(config),
            indicator_fade: config.indicator_fade,
            final_hold: config.final_hold,
            container_fade: config.container_fade,
            timers: GateTimers::default(),
        }
    }

    /// Read-only view of the session.
    pub fn session(&self) -> &AnimationSession {
        &self.session
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    /// Override the clip length for the next `Playing` phase.
    ///
    /// A clip that is already running keeps its original deadline.
    pub fn set_clip_duration(&mut self, duration: Millis) -> IntroResult<()> {
        if duration.is_zero() {
            return Err(IntroError::config("clip duration must be > 0"));
        }
        self.session.clip_duration = duration;
        tracing::debug!(%duration, "clip duration set");
        Ok(())
    }

    /// Push the idle visuals and size the layers.
    pub fn render_initial(&self, p: &mut dyn Presentation) {
        PhaseVisuals::for_phase(Phase::Idle).apply(p);
        fit_layers(p);
    }

    /// Decide the fate of one page-motion signal.
    ///
    /// The signal that arms the intro keeps its default action; everything after it is
    /// suppressed until the clip completes.
    pub fn handle(
        &mut self,
        signal: &InputSignal,
        now: Timestamp,
        timeline: &mut Timeline,
        p: &mut dyn Presentation,
    ) -> Disposition {
        if !signal.is_page_motion() || !self.session.listeners_attached {
            return Disposition::Default;
        }

        match self.session.phase {
            Phase::Playing => Disposition::Suppressed,
            Phase::Complete => Disposition::Default,
            Phase::Idle => {
                if self.qualifies(signal) {
                    self.enter_playing(now, timeline, p);
                }
                Disposition::Default
            }
        }
    }

    /// Resize every layer to the current viewport.
    pub fn on_resize(&self, p: &mut dyn Presentation) {
        fit_layers(p);
    }

    /// Run a gate continuation. Stale handles (cancelled by a reset) are ignored.
    pub fn on_task(
        &mut self,
        handle: TaskHandle,
        task: GateTask,
        now: Timestamp,
        timeline: &mut Timeline,
        p: &mut dyn Presentation,
    ) {
        match task {
            GateTask::ClipComplete => {
                if self.timers.clip != Some(handle) {
                    return;
                }
                self.timers.clip = None;
                self.complete(now, timeline, p);
            }
            GateTask::RemoveIndicator => {
                if self.timers.indicator.take() == Some(handle) {
                    p.remove(Surface::Indicator);
                }
            }
            GateTask::BeginContainerFade => {
                if self.timers.container_fade.take() != Some(handle) {
                    return;
                }
                tracing::debug!(fade = %self.container_fade, "fading image container");
                p.fade_out(Surface::Container, self.container_fade);
                self.timers.container_remove = Some(timeline.schedule_after(
                    now,
                    self.container_fade,
                    Task::Gate(GateTask::RemoveContainer),
                ));
            }
            GateTask::RemoveContainer => {
                if self.timers.container_remove.take() != Some(handle) {
                    return;
                }
                p.remove(Surface::Container);
                p.set_scroll_lock(false);
                tracing::debug!("image container removed, page fully released");
            }
        }
    }

    /// Return to `Idle` from any phase, cancelling every gate timer.
    pub fn reset(&mut self, timeline: &mut Timeline, p: &mut dyn Presentation) {
        self.timers.cancel_all(timeline);
        self.session.phase = Phase::Idle;
        self.session.listeners_attached = true;
        self.session.playing_since = None;
        self.session.completed_at = None;

        p.restore(Surface::Container);
        p.restore(Surface::Indicator);
        p.show(Surface::Indicator);
        self.render_initial(p);
        p.scroll_to_top();
        tracing::debug!("gate reset to idle");
    }

    fn qualifies(&self, signal: &InputSignal) -> bool {
        match *signal {
            InputSignal::Scroll { y } => y > self.session.scroll_threshold_px,
            InputSignal::Wheel { delta_y } => delta_y.abs() > self.session.wheel_sensitivity,
            InputSignal::KeyDown { key } => key.arms_intro(),
            _ => false,
        }
    }

    fn enter_playing(&mut self, now: Timestamp, timeline: &mut Timeline, p: &mut dyn Presentation) {
        if self.session.phase != Phase::Idle || self.timers.clip.is_some() {
            return;
        }
        self.session.phase = Phase::Playing;
        self.session.playing_since = Some(now);
        tracing::debug!(clip = %self.session.clip_duration, "intro armed, playing clip");

        p.fade_out(Surface::Indicator, self.indicator_fade);
        self.timers.indicator = Some(timeline.schedule_after(
            now,
            self.indicator_fade,
            Task::Gate(GateTask::RemoveIndicator),
        ));

        PhaseVisuals::for_phase(Phase::Playing).apply(p);
        p.restart(Layer::Motion);
        p.scroll_to_top();

        self.timers.clip = Some(timeline.schedule_after(
            now,
            self.session.clip_duration,
            Task::Gate(GateTask::ClipComplete),
        ));
    }

    fn complete(&mut self, now: Timestamp, timeline: &mut Timeline, p: &mut dyn Presentation) {
        if self.session.phase != Phase::Playing {
            return;
        }
        self.session.phase = Phase::Complete;
        self.session.completed_at = Some(now);
        self.session.listeners_attached = false;
        tracing::debug!("clip complete, input released");

        PhaseVisuals::for_phase(Phase::Complete).apply(p);

        if self.timers.container_fade.is_none() {
            self.timers.container_fade = Some(timeline.schedule_after(
                now,
                self.final_hold,
                Task::Gate(GateTask::BeginContainerFade),
            ));
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/gate.rs"]
mod tests;
