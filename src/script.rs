//! Deterministic replay of timed input against an in-memory host.
//!
//! A [`Script`] lists input signals with their arrival times. [`run_script`] drives an
//! [`IntroController`] over a [`RecordingPresentation`] and a [`MemoryTrack`] on a virtual
//! clock and returns a [`Trace`] of everything that happened.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::audio::MemoryTrack;
use crate::config::GateConfig;
use crate::controller::{FiredTask, IntroController, SessionSnapshot};
use crate::foundation::core::{Millis, Timestamp, Viewport};
use crate::foundation::error::{IntroError, IntroResult};
use crate::input::{Disposition, InputSignal};
use crate::presentation::recording::{PresentationState, RecordingPresentation};

/// One scripted action.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptAction {
    /// Deliver an input signal.
    Input {
        /// The signal.
        signal: InputSignal,
    },
    /// Change the host viewport (follow with a `resize` signal to apply it).
    SetViewport {
        /// New viewport.
        viewport: Viewport,
    },
    /// Re-arm the session.
    Reset,
    /// Override the clip length for the next run.
    SetClipDuration {
        /// New length.
        duration: Millis,
    },
    /// Settle a pending playback attempt.
    PlaySettled {
        /// Whether playback started.
        ok: bool,
    },
}

/// An action and when it happens.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScriptEvent {
    /// Host time of the action.
    pub at: Timestamp,
    /// What happens.
    #[serde(flatten)]
    pub action: ScriptAction,
}

/// A full simulation scenario.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Script {
    /// Gate configuration; defaults apply to omitted fields.
    pub config: GateConfig,
    /// Initial viewport; the recording default is used when absent.
    pub viewport: Option<Viewport>,
    /// Number of initial play requests the simulated browser denies.
    pub deny_autoplay: u32,
    /// Actions, in any order; they are replayed sorted by time.
    pub events: Vec<ScriptEvent>,
    /// Run the clock this far past the last event so trailing timers fire.
    pub settle: Option<Millis>,
}

impl Script {
    /// Parse a script from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> IntroResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| IntroError::script(format!("parse script JSON: {e}")))
    }

    /// Parse a script from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> IntroResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            IntroError::script(format!("open script JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }
}

/// One line of a [`Trace`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceEntry {
    /// A scripted action ran.
    Action {
        /// When.
        at: Timestamp,
        /// Which action.
        action: ScriptAction,
        /// Disposition, for input signals.
        #[serde(skip_serializing_if = "Option::is_none")]
        disposition: Option<Disposition>,
    },
    /// A timer fired.
    Timer(FiredTask),
}

/// Result of [`run_script`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Trace {
    /// Everything that happened, in order.
    pub entries: Vec<TraceEntry>,
    /// Session state at the end.
    pub session: SessionSnapshot,
    /// Presentation state at the end.
    pub presentation: PresentationState,
}

impl Trace {
    /// Dispositions of every input action, in order.
    pub fn dispositions(&self) -> Vec<Disposition> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                TraceEntry::Action { disposition, .. } => *disposition,
                TraceEntry::Timer(_) => None,
            })
            .collect()
    }
}

/// Replay `script` on a virtual clock.
#[tracing::instrument(skip(script), fields(events = script.events.len()))]
pub fn run_script(script: &Script) -> IntroResult<Trace> {
    let mut presentation = RecordingPresentation::new();
    if let Some(vp) = script.viewport {
        presentation.set_viewport(Some(vp));
    }
    let track = MemoryTrack::denying(script.deny_autoplay);
    let mut ctl = IntroController::new(script.config.clone(), presentation, track)?;
    ctl.init(Timestamp::ZERO);

    let mut events = script.events.clone();
    events.sort_by_key(|e| e.at);

    let mut entries = Vec::new();
    for event in &events {
        entries.extend(ctl.advance_to(event.at).into_iter().map(TraceEntry::Timer));

        let disposition = match &event.action {
            ScriptAction::Input { signal } => Some(ctl.handle(*signal, event.at)),
            ScriptAction::SetViewport { viewport } => {
                ctl.presentation_mut().set_viewport(Some(*viewport));
                None
            }
            ScriptAction::Reset => {
                ctl.reset(event.at);
                None
            }
            ScriptAction::SetClipDuration { duration } => {
                ctl.set_clip_duration(*duration)?;
                None
            }
            ScriptAction::PlaySettled { ok } => {
                ctl.on_play_settled(*ok);
                None
            }
        };
        entries.push(TraceEntry::Action {
            at: event.at,
            action: event.action.clone(),
            disposition,
        });
    }

    let last = events.last().map(|e| e.at).unwrap_or(Timestamp::ZERO);
    match script.settle {
        Some(settle) => {
            entries.extend(ctl.advance_to(last + settle).into_iter().map(TraceEntry::Timer));
        }
        None => {
            // Every chain terminates, so draining deadline by deadline ends.
            while let Some(next) = ctl.next_deadline() {
                entries.extend(ctl.advance_to(next).into_iter().map(TraceEntry::Timer));
            }
        }
    }

    tracing::debug!(entries = entries.len(), phase = ?ctl.phase(), "script finished");
    Ok(Trace {
        entries,
        session: ctl.snapshot(),
        presentation: ctl.presentation().state(),
    })
}
