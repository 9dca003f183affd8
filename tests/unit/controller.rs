use super::*;
use crate::audio::MemoryTrack;
use crate::input::Key;
use crate::presentation::recording::RecordingPresentation;
use crate::presentation::{IconEffect, Layer, Surface};
use crate::timeline::{GateTask, IconTask};

type Ctl = IntroController<RecordingPresentation, MemoryTrack>;

fn controller_with(track: MemoryTrack) -> Ctl {
    let mut ctl =
        IntroController::new(GateConfig::default(), RecordingPresentation::new(), track).unwrap();
    ctl.init(Timestamp::ZERO);
    ctl
}

fn controller() -> Ctl {
    controller_with(MemoryTrack::new())
}

fn icon_click() -> InputSignal {
    InputSignal::Click {
        target: ClickTarget::Icon,
    }
}

#[test]
fn init_renders_idle_and_starts_music() {
    let ctl = controller();
    assert_eq!(ctl.phase(), Phase::Idle);
    assert!(ctl.audio().is_playing());
    assert!(ctl.track().is_playing());
    assert!(ctl.presentation().is_visible(Layer::Static.into()));
    assert_eq!(
        ctl.presentation().dimensions(Layer::Final),
        Some(RecordingPresentation::DEFAULT_VIEWPORT)
    );
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = GateConfig {
        clip_duration: Millis::ZERO,
        ..GateConfig::default()
    };
    assert!(IntroController::new(cfg, RecordingPresentation::new(), MemoryTrack::new()).is_err());
}

#[test]
fn full_intro_timeline() {
    let mut ctl = controller();

    assert_eq!(
        ctl.handle(InputSignal::Scroll { y: 60.0 }, Timestamp(1000)),
        Disposition::Default
    );
    assert_eq!(ctl.phase(), Phase::Playing);
    assert_eq!(
        ctl.handle(InputSignal::Wheel { delta_y: 120.0 }, Timestamp(1500)),
        Disposition::Suppressed
    );

    let fired = ctl.advance_to(Timestamp(3999));
    assert_eq!(
        fired,
        vec![FiredTask {
            at: Timestamp(1300),
            task: Task::Gate(GateTask::RemoveIndicator)
        }]
    );
    assert_eq!(ctl.phase(), Phase::Playing);

    ctl.advance_to(Timestamp(4000));
    assert_eq!(ctl.phase(), Phase::Complete);
    let snap = ctl.snapshot();
    assert!(!snap.input_suppressed);
    assert!(!snap.listeners_attached);
    assert!(ctl.presentation().is_visible(Layer::Final.into()));
    assert!(!ctl.presentation().is_visible(Layer::Motion.into()));

    assert_eq!(
        ctl.handle(InputSignal::TouchMove, Timestamp(4100)),
        Disposition::Default
    );

    ctl.advance_to(Timestamp(8000));
    assert!(ctl.presentation().surface(Surface::Container).removed);
    assert!(!ctl.presentation().scroll_locked());
    assert_eq!(ctl.next_deadline(), None);
}

#[test]
fn late_advance_fires_chain_at_exact_deadlines() {
    let mut ctl = controller();
    ctl.handle(
        InputSignal::KeyDown { key: Key::Space },
        Timestamp(0),
    );
    let fired = ctl.advance_to(Timestamp(60_000));
    let deadlines: Vec<u64> = fired.iter().map(|f| f.at.0).collect();
    assert_eq!(deadlines, vec![300, 3000, 6000, 7000]);
}

#[test]
fn three_icon_clicks_fell_icon_and_fade_music() {
    let mut ctl = controller();
    ctl.handle(icon_click(), Timestamp(0));
    ctl.handle(icon_click(), Timestamp(100));
    assert!(!ctl.icon().is_fallen());
    ctl.handle(icon_click(), Timestamp(200));
    assert!(ctl.icon().is_fallen());
    assert!(ctl.presentation().effect_active(IconEffect::Fall));

    let calls = ctl.presentation().calls().len();
    ctl.handle(icon_click(), Timestamp(300));
    assert_eq!(ctl.icon().count(), 3);
    assert_eq!(ctl.presentation().calls().len(), calls);

    ctl.advance_to(Timestamp(1700));
    assert!(!ctl.audio().is_playing());
    assert!(!ctl.track().is_playing());

    let fired = ctl.advance_to(Timestamp(2200));
    assert!(fired.iter().any(|f| f.task == Task::Icon(IconTask::Hide)));
    assert!(ctl.icon().is_hidden());
    assert_eq!(ctl.phase(), Phase::Idle);
}

#[test]
fn icon_does_not_touch_the_gate() {
    let mut ctl = controller();
    ctl.handle(InputSignal::Scroll { y: 100.0 }, Timestamp(0));
    for t in 0..3 {
        ctl.handle(icon_click(), Timestamp(10 + t));
    }
    ctl.advance_to(Timestamp(3000));
    assert_eq!(ctl.phase(), Phase::Complete);
}

#[test]
fn denied_autoplay_retries_on_first_gesture() {
    let mut ctl = controller_with(MemoryTrack::denying(1));
    assert!(!ctl.audio().is_playing());
    assert!(ctl.audio().retry_armed());

    // Wheel is not a user gesture.
    ctl.handle(InputSignal::Wheel { delta_y: 1.0 }, Timestamp(10));
    assert!(ctl.audio().retry_armed());

    ctl.handle(
        InputSignal::Click {
            target: ClickTarget::Page,
        },
        Timestamp(20),
    );
    assert!(ctl.audio().is_playing());
    assert_eq!(ctl.track().play_requests(), 2);
}

#[test]
fn fallen_icon_blocks_music_retry() {
    let mut ctl = controller_with(MemoryTrack::denying(u32::MAX));
    for t in 0..3 {
        ctl.handle(icon_click(), Timestamp(t));
    }
    // Every click retried and was denied again, so a retry is still armed.
    assert!(ctl.icon().is_fallen());
    assert!(ctl.audio().retry_armed());
    assert_eq!(ctl.track().play_requests(), 4);

    ctl.handle(
        InputSignal::Click {
            target: ClickTarget::Page,
        },
        Timestamp(10),
    );
    assert!(!ctl.audio().retry_armed());
    assert!(!ctl.audio().is_playing());
    assert_eq!(ctl.track().play_requests(), 4);
}

#[test]
fn reset_from_every_phase_restores_initial_state() {
    for stop_at in [0u64, 1000, 3500, 6500, 9000] {
        let mut ctl = controller();
        ctl.handle(InputSignal::Scroll { y: 60.0 }, Timestamp(0));
        for t in 0..3 {
            ctl.handle(icon_click(), Timestamp(t));
        }
        ctl.advance_to(Timestamp(stop_at));
        ctl.reset(Timestamp(stop_at));

        let snap = ctl.snapshot();
        assert_eq!(snap.phase, Phase::Idle, "reset at {stop_at}");
        assert!(!snap.input_suppressed);
        assert!(snap.listeners_attached);
        assert_eq!(snap.icon_clicks, 0);
        assert!(!snap.icon_fallen);
        assert!(!snap.audio_playing);
        assert_eq!(snap.pending_tasks, 0);

        let p = ctl.presentation();
        assert!(p.is_visible(Layer::Static.into()));
        assert!(!p.is_visible(Layer::Motion.into()));
        assert!(!p.is_visible(Layer::Final.into()));
        assert!(p.is_visible(Surface::Container));
        assert!(p.is_visible(Surface::Icon));
        assert!(!p.scroll_locked());
    }
}

#[test]
fn history_navigation_resets() {
    let mut ctl = controller();
    ctl.handle(InputSignal::Scroll { y: 60.0 }, Timestamp(0));
    ctl.handle(InputSignal::HistoryNavigate, Timestamp(500));
    assert_eq!(ctl.phase(), Phase::Idle);
    ctl.advance_to(Timestamp(10_000));
    assert_eq!(ctl.phase(), Phase::Idle);
}

#[test]
fn visibility_changes_do_not_affect_the_session() {
    let mut ctl = controller();
    ctl.handle(InputSignal::Scroll { y: 60.0 }, Timestamp(0));
    ctl.handle(
        InputSignal::VisibilityChange { visible: false },
        Timestamp(100),
    );
    ctl.handle(InputSignal::VisibilityChange { visible: true }, Timestamp(200));
    assert_eq!(ctl.phase(), Phase::Playing);
    ctl.advance_to(Timestamp(3000));
    assert_eq!(ctl.phase(), Phase::Complete);
}

#[test]
fn resize_during_playback_keeps_phase() {
    let mut ctl = controller();
    ctl.handle(InputSignal::Scroll { y: 60.0 }, Timestamp(0));
    let vp = crate::foundation::core::Viewport {
        width: 640,
        height: 480,
    };
    ctl.presentation_mut().set_viewport(Some(vp));
    assert_eq!(
        ctl.handle(InputSignal::Resize, Timestamp(10)),
        Disposition::Default
    );
    assert_eq!(ctl.presentation().dimensions(Layer::Motion), Some(vp));
    assert_eq!(ctl.phase(), Phase::Playing);
}

#[test]
fn reset_before_playback_settles_keeps_music_stopped() {
    let mut ctl = controller_with(MemoryTrack::pending());
    assert!(ctl.audio().is_awaiting());
    assert!(ctl.track().is_playing());

    ctl.reset(Timestamp(10));
    assert!(!ctl.track().is_playing());

    ctl.on_play_settled(true);
    assert!(!ctl.audio().is_playing());
    assert!(!ctl.track().is_playing());
    assert!(!ctl.snapshot().audio_playing);
}

#[test]
fn icon_fall_halts_music_that_settles_late() {
    let mut ctl = controller_with(MemoryTrack::pending());
    for t in 0..3 {
        ctl.handle(icon_click(), Timestamp(t));
    }
    assert!(ctl.icon().is_fallen());

    ctl.on_play_settled(true);
    assert!(ctl.audio().is_playing());

    ctl.advance_to(Timestamp(10_000));
    assert!(!ctl.audio().is_playing());
    assert!(!ctl.track().is_playing());
    assert_eq!(ctl.track().volume(), 1.0);
}

#[test]
fn icon_fall_halts_music_that_never_settles() {
    let mut ctl = controller_with(MemoryTrack::pending());
    for t in 0..3 {
        ctl.handle(icon_click(), Timestamp(t));
    }
    ctl.advance_to(Timestamp(10_000));
    assert!(!ctl.track().is_playing());

    ctl.on_play_settled(true);
    assert!(!ctl.audio().is_playing());
    assert!(!ctl.track().is_playing());
}
