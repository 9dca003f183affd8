//! Background track control.

use crate::config::AudioConfig;
use crate::foundation::core::Timestamp;
use crate::timeline::{AudioTask, Task, TaskHandle, Timeline};

/// Outcome of asking the host to start playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayAttempt {
    /// Playback started synchronously.
    Started,
    /// The host will report the outcome later through
    /// [`AudioController::on_play_settled`].
    Pending,
    /// The host refused to play, usually because no user gesture has happened yet.
    Denied,
}

/// Host audio element.
pub trait AudioTrack {
    /// Ask the host to start playback.
    fn play(&mut self) -> PlayAttempt;
    /// Pause playback.
    fn pause(&mut self);
    /// Seek back to the start.
    fn rewind(&mut self);
    /// Current volume in `[0, 1]`.
    fn volume(&self) -> f64;
    /// Set volume in `[0, 1]`.
    fn set_volume(&mut self, volume: f64);
}

/// Drives one [`AudioTrack`].
#[derive(Clone, Debug)]
pub struct AudioController {
    config: AudioConfig,
    playing: bool,
    awaiting: bool,
    // Pending attempts that were stopped before they settled.
    abandoned: u32,
    retry_on_gesture: bool,
    fade_timer: Option<TaskHandle>,
    stop_timer: Option<TaskHandle>,
}

impl AudioController {
    /// Create a stopped controller.
    pub fn new(config: &AudioConfig) -> Self {
        Self {
            config: config.clone(),
            playing: false,
            awaiting: false,
            abandoned: 0,
            retry_on_gesture: false,
            fade_timer: None,
            stop_timer: None,
        }
    }

    /// Whether the track is playing.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether a denied start is waiting for the next user gesture.
    pub fn retry_armed(&self) -> bool {
        self.retry_on_gesture
    }

    /// Start playback at full volume. Repeated calls while playing or awaiting the host are
    /// no-ops.
    pub fn start(&mut self, track: &mut dyn AudioTrack) {
        if self.playing || self.awaiting {
            return;
        }
        track.set_volume(1.0);
        match track.play() {
            PlayAttempt::Started => self.on_started(),
            PlayAttempt::Pending => self.awaiting = true,
            PlayAttempt::Denied => self.on_denied(),
        }
    }

    /// Whether a [`PlayAttempt::Pending`] start has not settled yet.
    pub fn is_awaiting(&self) -> bool {
        self.awaiting
    }

    /// Complete a [`PlayAttempt::Pending`] start.
    ///
    /// An attempt that was stopped while pending is silenced again if it reports success.
    pub fn on_play_settled(&mut self, ok: bool, track: &mut dyn AudioTrack) {
        if self.abandoned > 0 {
            self.abandoned -= 1;
            if ok {
                tracing::debug!("stopped playback settled late, pausing track");
                track.pause();
                track.rewind();
            }
            return;
        }
        if !self.awaiting {
            return;
        }
        self.awaiting = false;
        if ok {
            self.on_started();
        } else {
            self.on_denied();
        }
    }

    /// Consume the armed retry, if any, and try again. Returns `true` if a retry was made.
    pub fn retry_after_gesture(&mut self, track: &mut dyn AudioTrack) -> bool {
        if !self.retry_on_gesture {
            return false;
        }
        self.retry_on_gesture = false;
        tracing::debug!("retrying background music after user gesture");
        self.start(track);
        true
    }

    /// Drop an armed retry without attempting playback.
    pub fn disarm_retry(&mut self) {
        self.retry_on_gesture = false;
    }

    /// Ramp the volume down, then halt and rewind.
    ///
    /// Does nothing unless the track is playing or a start is pending.
    pub fn fade_and_stop(&mut self, now: Timestamp, timeline: &mut Timeline) {
        if !(self.playing || self.awaiting) || self.stop_timer.is_some() {
            return;
        }
        tracing::debug!("fading out background music");
        self.fade_timer = Some(timeline.schedule_after(
            now,
            self.config.fade_interval,
            Task::Audio(AudioTask::FadeStep),
        ));
        self.stop_timer = Some(timeline.schedule_after(
            now,
            self.config.stop_after,
            Task::Audio(AudioTask::Stop),
        ));
    }

    /// Halt immediately, rewind and restore full volume for the next start.
    pub fn stop(&mut self, timeline: &mut Timeline, track: &mut dyn AudioTrack) {
        for handle in [self.fade_timer.take(), self.stop_timer.take()]
            .into_iter()
            .flatten()
        {
            timeline.cancel(handle);
        }
        self.retry_on_gesture = false;
        if self.awaiting {
            self.awaiting = false;
            self.abandoned += 1;
        } else if !self.playing {
            return;
        }
        track.pause();
        track.rewind();
        track.set_volume(1.0);
        self.playing = false;
        tracing::debug!("background music stopped");
    }

    /// Run an audio continuation.
    pub fn on_task(
        &mut self,
        handle: TaskHandle,
        task: AudioTask,
        now: Timestamp,
        timeline: &mut Timeline,
        track: &mut dyn AudioTrack,
    ) {
        match task {
            AudioTask::FadeStep => {
                if self.fade_timer.take() != Some(handle) {
                    return;
                }
                let volume = track.volume();
                if volume > self.config.fade_floor {
                    track.set_volume((volume - self.config.fade_step).max(0.0));
                    self.fade_timer = Some(timeline.schedule_after(
                        now,
                        self.config.fade_interval,
                        Task::Audio(AudioTask::FadeStep),
                    ));
                }
            }
            AudioTask::Stop => {
                if self.stop_timer.take() != Some(handle) {
                    return;
                }
                self.stop(timeline, track);
            }
        }
    }

    fn on_started(&mut self) {
        self.playing = true;
        tracing::debug!("background music started");
    }

    fn on_denied(&mut self) {
        self.retry_on_gesture = true;
        tracing::warn!("background music blocked, will retry on next user gesture");
    }
}

/// In-memory [`AudioTrack`] for simulation and tests.
///
/// Denies the first `deny_first` play requests, like a browser without user activation.
/// A pending track starts sounding on every request but reports [`PlayAttempt::Pending`],
/// like an `<audio>` element whose `play()` promise has not resolved yet.
#[derive(Clone, Debug, serde::Serialize)]
pub struct MemoryTrack {
    volume: f64,
    playing: bool,
    pending: bool,
    position_reset_count: u32,
    play_requests: u32,
    deny_first: u32,
    volume_history: Vec<f64>,
}

impl MemoryTrack {
    /// Create a track that accepts every play request.
    pub fn new() -> Self {
        Self::denying(0)
    }

    /// Create a track that refuses the first `n` play requests.
    pub fn denying(n: u32) -> Self {
        Self {
            volume: 1.0,
            playing: false,
            pending: false,
            position_reset_count: 0,
            play_requests: 0,
            deny_first: n,
            volume_history: Vec::new(),
        }
    }

    /// Create a track whose play requests settle asynchronously.
    pub fn pending() -> Self {
        Self {
            pending: true,
            ..Self::denying(0)
        }
    }

    /// Whether the track is audibly playing.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Number of play requests received.
    pub fn play_requests(&self) -> u32 {
        self.play_requests
    }

    /// Number of rewinds.
    pub fn rewinds(&self) -> u32 {
        self.position_reset_count
    }

    /// Every volume written, oldest first.
    pub fn volume_history(&self) -> &[f64] {
        &self.volume_history
    }
}

impl Default for MemoryTrack {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioTrack for MemoryTrack {
    fn play(&mut self) -> PlayAttempt {
        self.play_requests += 1;
        if self.play_requests <= self.deny_first {
            return PlayAttempt::Denied;
        }
        self.playing = true;
        if self.pending {
            PlayAttempt::Pending
        } else {
            PlayAttempt::Started
        }
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn rewind(&mut self) {
        self.position_reset_count += 1;
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
        self.volume_history.push(self.volume);
    }
}
