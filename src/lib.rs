//! introgate gates page scrolling behind a one-shot intro clip.
//!
//! The page starts on a static image. The first real scroll, wheel or key press swaps in an
//! animated clip and swallows page motion until the clip has run; then the final image is
//! revealed, input is released for good, and the image layer fades away. A background track
//! and a click-to-topple icon run alongside.
//!
//! The state machine is host-agnostic and driven by explicit timestamps:
//!
//! - Implement [`Presentation`] and [`AudioTrack`] for the host (or use the in-memory
//!   [`RecordingPresentation`] and [`MemoryTrack`]).
//! - Build an [`IntroController`], forward every [`InputSignal`], honour the returned
//!   [`Disposition`], and call [`IntroController::advance_to`] as time passes.
//!
//! With the `web` feature the crate also ships a DOM binding for `wasm32` targets.
#![cfg_attr(not(feature = "web"), forbid(unsafe_code))]
#![deny(missing_docs)]

mod foundation;

/// Background track control.
pub mod audio;
/// Configuration.
pub mod config;
/// Session owner and public control surface.
pub mod controller;
/// The intro animation gate.
pub mod gate;
/// Icon micro-interaction.
pub mod icon;
pub mod input;
pub mod presentation;
pub mod probe;
pub mod script;
/// Single-threaded scheduled tasks.
pub mod timeline;
/// DOM binding.
#[cfg(feature = "web")]
pub mod web;

pub use crate::foundation::core::{Millis, Timestamp, Viewport};
pub use crate::foundation::error::{IntroError, IntroResult};

pub use crate::audio::{AudioController, AudioTrack, MemoryTrack, PlayAttempt};
pub use crate::config::{AudioConfig, GateConfig, IconConfig};
pub use crate::controller::{FiredTask, IntroController, SessionSnapshot};
pub use crate::gate::{AnimationSession, IntroGate, Phase};
pub use crate::icon::{IconClick, IconInteraction};
pub use crate::input::{ClickTarget, Disposition, InputSignal, Key};
pub use crate::presentation::recording::{PresentationCall, RecordingPresentation};
pub use crate::presentation::{IconEffect, Layer, PhaseVisuals, Presentation, Surface};
pub use crate::probe::{ClipInfo, clip_duration_or, probe_clip, probe_gif};
pub use crate::script::{Script, ScriptAction, ScriptEvent, Trace, TraceEntry, run_script};
pub use crate::timeline::{Task, TaskHandle, Timeline};
