use crate::audio::{AudioController, AudioTrack};
use crate::config::GateConfig;
use crate::foundation::core::{Millis, Timestamp};
use crate::foundation::error::IntroResult;
use crate::gate::{IntroGate, Phase};
use crate::icon::{IconClick, IconInteraction};
use crate::input::{ClickTarget, Disposition, InputSignal};
use crate::presentation::Presentation;
use crate::timeline::{Task, Timeline};

/// A task that fired during [`IntroController::advance_to`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct FiredTask {
    /// Deadline the task was scheduled for.
    pub at: Timestamp,
    /// The task.
    pub task: Task,
}

/// Serializable view of the whole session.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SessionSnapshot {
    /// Gate phase.
    pub phase: Phase,
    /// Page motion is being suppressed.
    pub input_suppressed: bool,
    /// Suppression listeners are attached.
    pub listeners_attached: bool,
    /// Clip length for the next run.
    pub clip_duration: Millis,
    /// Icon clicks counted.
    pub icon_clicks: u32,
    /// Icon has fallen.
    pub icon_fallen: bool,
    /// Background music is playing.
    pub audio_playing: bool,
    /// A denied music start waits for a gesture.
    pub audio_retry_armed: bool,
    /// Outstanding timers.
    pub pending_tasks: usize,
    /// Controller clock.
    pub now: Timestamp,
}

/// Owns the intro session and wires gate, audio and icon to the host.
///
/// The controller is the only entry point a host needs: forward every input signal to
/// [`IntroController::handle`], honour the returned [`Disposition`], and call
/// [`IntroController::advance_to`] whenever [`IntroController::next_deadline`] passes.
pub struct IntroController<P, A> {
    gate: IntroGate,
    audio: AudioController,
    icon: IconInteraction,
    timeline: Timeline,
    presentation: P,
    track: A,
    now: Timestamp,
}

impl<P, A> IntroController<P, A>
where
    P: Presentation,
    A: AudioTrack,
{
    /// Validate `config` and build an idle controller.
    pub fn new(config: GateConfig, presentation: P, track: A) -> IntroResult<Self> {
        config.validate()?;
        Ok(Self {
            gate: IntroGate::new(&config),
            audio: AudioController::new(&config.audio),
            icon: IconInteraction::new(&config.icon),
            timeline: Timeline::new(),
            presentation,
            track,
            now: Timestamp::ZERO,
        })
    }

    /// Render the idle state and start the background music.
    pub fn init(&mut self, now: Timestamp) {
        self.now = self.now.max(now);
        self.gate.render_initial(&mut self.presentation);
        self.audio.start(&mut self.track);
        tracing::debug!("intro controller initialized");
    }

    /// Process one input signal.
    pub fn handle(&mut self, signal: InputSignal, now: Timestamp) -> Disposition {
        self.now = self.now.max(now);

        if signal.is_user_gesture() {
            if self.icon.is_fallen() {
                self.audio.disarm_retry();
            } else {
                self.audio.retry_after_gesture(&mut self.track);
            }
        }

        match signal {
            InputSignal::Resize => {
                self.gate.on_resize(&mut self.presentation);
                Disposition::Default
            }
            InputSignal::VisibilityChange { visible } => {
                tracing::debug!(visible, "page visibility changed");
                Disposition::Default
            }
            InputSignal::HistoryNavigate => {
                self.reset(now);
                Disposition::Default
            }
            InputSignal::Click { target } => {
                if target == ClickTarget::Icon {
                    self.click_icon();
                }
                Disposition::Default
            }
            other => self.gate.handle(
                &other,
                self.now,
                &mut self.timeline,
                &mut self.presentation,
            ),
        }
    }

    /// Fire every task due at or before `now`, in deadline order.
    pub fn advance_to(&mut self, now: Timestamp) -> Vec<FiredTask> {
        let mut fired = Vec::new();
        while let Some((at, handle, task)) = self.timeline.pop_due(now) {
            self.now = self.now.max(at);
            match task {
                Task::Gate(t) => {
                    self.gate
                        .on_task(handle, t, at, &mut self.timeline, &mut self.presentation)
                }
                Task::Audio(t) => {
                    self.audio
                        .on_task(handle, t, at, &mut self.timeline, &mut self.track)
                }
                Task::Icon(t) => self.icon.on_task(handle, t, &mut self.presentation),
            }
            fired.push(FiredTask { at, task });
        }
        self.now = self.now.max(now);
        fired
    }

    /// Earliest pending deadline, for hosts that arm one real timer at a time.
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.timeline.next_deadline()
    }

    /// Report the outcome of a [`crate::PlayAttempt::Pending`] start.
    pub fn on_play_settled(&mut self, ok: bool) {
        self.audio.on_play_settled(ok, &mut self.track);
    }

    /// Re-arm the whole session: gate idle, icon upright, music stopped, no timers.
    pub fn reset(&mut self, now: Timestamp) {
        self.now = self.now.max(now);
        self.audio.stop(&mut self.timeline, &mut self.track);
        self.icon.reset(&mut self.timeline, &mut self.presentation);
        self.gate.reset(&mut self.timeline, &mut self.presentation);
        self.timeline.clear();
        tracing::debug!("intro session reset");
    }

    /// Override the clip length for the next run.
    pub fn set_clip_duration(&mut self, duration: Millis) -> IntroResult<()> {
        self.gate.set_clip_duration(duration)
    }

    /// Current gate phase.
    pub fn phase(&self) -> Phase {
        self.gate.phase()
    }

    /// The gate.
    pub fn gate(&self) -> &IntroGate {
        &self.gate
    }

    /// The audio controller.
    pub fn audio(&self) -> &AudioController {
        &self.audio
    }

    /// The icon micro-interaction.
    pub fn icon(&self) -> &IconInteraction {
        &self.icon
    }

    /// The host presentation.
    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    /// Mutable access to the host presentation.
    pub fn presentation_mut(&mut self) -> &mut P {
        &mut self.presentation
    }

    /// The host audio track.
    pub fn track(&self) -> &A {
        &self.track
    }

    /// Mutable access to the host audio track.
    pub fn track_mut(&mut self) -> &mut A {
        &mut self.track
    }

    /// Controller clock: the latest time seen from the host.
    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// Serializable summary.
    pub fn snapshot(&self) -> SessionSnapshot {
        let session = self.gate.session();
        SessionSnapshot {
            phase: session.phase(),
            input_suppressed: session.input_suppressed(),
            listeners_attached: session.listeners_attached(),
            clip_duration: session.clip_duration(),
            icon_clicks: self.icon.count(),
            icon_fallen: self.icon.is_fallen(),
            audio_playing: self.audio.is_playing(),
            audio_retry_armed: self.audio.retry_armed(),
            pending_tasks: self.timeline.len(),
            now: self.now,
        }
    }

    fn click_icon(&mut self) {
        let outcome = self
            .icon
            .click(self.now, &mut self.timeline, &mut self.presentation);
        if outcome == IconClick::Fell {
            self.audio.fade_and_stop(self.now, &mut self.timeline);
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/controller.rs"]
mod tests;
