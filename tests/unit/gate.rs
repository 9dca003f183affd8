use super::*;
use crate::input::{ClickTarget, Key};
use crate::presentation::recording::{PresentationCall, RecordingPresentation};

struct Rig {
    gate: IntroGate,
    tl: Timeline,
    p: RecordingPresentation,
}

impl Rig {
    fn new() -> Self {
        let gate = IntroGate::new(&GateConfig::default());
        let mut p = RecordingPresentation::new();
        gate.render_initial(&mut p);
        Self {
            gate,
            tl: Timeline::new(),
            p,
        }
    }

    fn send(&mut self, signal: InputSignal, now: u64) -> Disposition {
        self.gate
            .handle(&signal, Timestamp(now), &mut self.tl, &mut self.p)
    }

    fn advance(&mut self, now: u64) {
        while let Some((at, handle, task)) = self.tl.pop_due(Timestamp(now)) {
            if let Task::Gate(task) = task {
                self.gate.on_task(handle, task, at, &mut self.tl, &mut self.p);
            }
        }
    }
}

fn scroll(y: f64) -> InputSignal {
    InputSignal::Scroll { y }
}

fn wheel(delta_y: f64) -> InputSignal {
    InputSignal::Wheel { delta_y }
}

fn key(key: Key) -> InputSignal {
    InputSignal::KeyDown { key }
}

#[test]
fn scroll_past_threshold_starts_clip() {
    let mut rig = Rig::new();
    assert_eq!(rig.send(scroll(60.0), 0), Disposition::Default);
    assert_eq!(rig.gate.phase(), Phase::Playing);
    assert!(rig.gate.session().input_suppressed());
    assert!(rig.p.is_visible(Layer::Motion.into()));
    assert!(rig.p.is_visible(Layer::Static.into()));
    assert!(rig.p.scroll_locked());
    assert!(rig.p.calls().contains(&PresentationCall::Restart(Layer::Motion)));
}

#[test]
fn scroll_at_threshold_does_not_arm() {
    let mut rig = Rig::new();
    rig.send(scroll(50.0), 0);
    assert_eq!(rig.gate.phase(), Phase::Idle);
    assert!(rig.tl.is_empty());
}

#[test]
fn small_wheel_delta_does_not_arm() {
    let mut rig = Rig::new();
    rig.send(wheel(5.0), 0);
    rig.send(wheel(-10.0), 0);
    assert_eq!(rig.gate.phase(), Phase::Idle);

    rig.send(wheel(-10.5), 0);
    assert_eq!(rig.gate.phase(), Phase::Playing);
}

#[test]
fn only_arming_keys_start_the_clip() {
    let mut rig = Rig::new();
    rig.send(key(Key::ArrowLeft), 0);
    rig.send(key(Key::Home), 0);
    rig.send(key(Key::Other(65)), 0);
    rig.send(InputSignal::TouchMove, 0);
    assert_eq!(rig.gate.phase(), Phase::Idle);

    rig.send(key(Key::Space), 0);
    assert_eq!(rig.gate.phase(), Phase::Playing);
}

#[test]
fn burst_of_qualifying_signals_arms_once() {
    let mut rig = Rig::new();
    assert_eq!(rig.send(scroll(80.0), 10), Disposition::Default);
    assert_eq!(rig.send(wheel(40.0), 10), Disposition::Suppressed);
    assert_eq!(rig.send(key(Key::ArrowDown), 10), Disposition::Suppressed);

    let clip_timers = rig
        .tl
        .pending()
        .filter(|(_, t)| *t == Task::Gate(GateTask::ClipComplete))
        .count();
    assert_eq!(clip_timers, 1);
    assert_eq!(
        rig.p
            .count(|c| *c == PresentationCall::Restart(Layer::Motion)),
        1
    );
}

#[test]
fn page_motion_is_suppressed_while_playing() {
    let mut rig = Rig::new();
    rig.send(scroll(60.0), 0);

    for signal in [
        scroll(500.0),
        wheel(1.0),
        wheel(300.0),
        InputSignal::TouchMove,
        key(Key::PageDown),
        key(Key::End),
        key(Key::ArrowLeft),
    ] {
        assert_eq!(rig.send(signal, 100), Disposition::Suppressed, "{signal:?}");
    }
    assert_eq!(rig.send(key(Key::Other(13)), 100), Disposition::Default);
    assert_eq!(
        rig.send(
            InputSignal::Click {
                target: ClickTarget::Page
            },
            100
        ),
        Disposition::Default
    );
    assert_eq!(rig.gate.phase(), Phase::Playing);
}

#[test]
fn clip_completes_on_timer_only() {
    let mut rig = Rig::new();
    rig.send(scroll(60.0), 0);

    rig.advance(2999);
    assert_eq!(rig.gate.phase(), Phase::Playing);

    rig.advance(3000);
    assert_eq!(rig.gate.phase(), Phase::Complete);
    assert_eq!(rig.gate.session().completed_at(), Some(Timestamp(3000)));
    assert!(!rig.gate.session().input_suppressed());
    assert!(!rig.gate.session().listeners_attached());
    assert!(rig.p.is_visible(Layer::Final.into()));
    assert!(!rig.p.is_visible(Layer::Motion.into()));
    assert!(!rig.p.is_visible(Layer::Static.into()));
    assert!(!rig.p.scroll_locked());
}

#[test]
fn input_is_never_intercepted_after_completion() {
    let mut rig = Rig::new();
    rig.send(wheel(20.0), 0);
    rig.advance(3000);

    for signal in [
        scroll(9000.0),
        wheel(500.0),
        InputSignal::TouchMove,
        key(Key::Space),
    ] {
        assert_eq!(rig.send(signal, 3500), Disposition::Default);
    }
    assert_eq!(rig.gate.phase(), Phase::Complete);
}

#[test]
fn indicator_fades_then_is_removed() {
    let mut rig = Rig::new();
    rig.send(scroll(60.0), 0);
    assert!(rig.p.surface(Surface::Indicator).faded);
    assert!(!rig.p.surface(Surface::Indicator).removed);

    rig.advance(300);
    assert!(rig.p.surface(Surface::Indicator).removed);
}

#[test]
fn container_fades_after_hold_and_is_removed() {
    let mut rig = Rig::new();
    rig.send(scroll(60.0), 0);
    rig.advance(3000);

    rig.advance(5999);
    assert!(rig.p.is_visible(Surface::Container));

    rig.advance(6000);
    assert!(rig.p.calls().contains(&PresentationCall::FadeOut(
        Surface::Container,
        Millis(1000)
    )));
    assert!(!rig.p.surface(Surface::Container).removed);

    // Input during the fade chain neither interrupts it nor changes the phase.
    rig.send(wheel(100.0), 6500);

    rig.advance(7000);
    assert!(rig.p.surface(Surface::Container).removed);
    assert_eq!(rig.gate.phase(), Phase::Complete);
    assert!(rig.tl.is_empty());
}

#[test]
fn resize_fits_every_layer() {
    let mut rig = Rig::new();
    let vp = crate::foundation::core::Viewport {
        width: 390,
        height: 844,
    };
    rig.p.set_viewport(Some(vp));
    rig.gate.on_resize(&mut rig.p);
    for layer in Layer::ALL {
        assert_eq!(rig.p.dimensions(layer), Some(vp));
    }
    assert_eq!(rig.gate.phase(), Phase::Idle);
}

#[test]
fn reset_mid_clip_cancels_the_pending_completion() {
    let mut rig = Rig::new();
    rig.send(scroll(60.0), 0);
    rig.gate.reset(&mut rig.tl, &mut rig.p);

    assert_eq!(rig.gate.phase(), Phase::Idle);
    assert!(rig.tl.is_empty());
    assert!(rig.p.is_visible(Layer::Static.into()));
    assert!(!rig.p.is_visible(Layer::Motion.into()));
    assert!(!rig.p.is_visible(Layer::Final.into()));
    assert!(rig.p.is_visible(Surface::Indicator));

    rig.advance(10_000);
    assert_eq!(rig.gate.phase(), Phase::Idle);
}

#[test]
fn reset_after_completion_rearms() {
    let mut rig = Rig::new();
    rig.send(scroll(60.0), 0);
    rig.advance(7000);
    rig.gate.reset(&mut rig.tl, &mut rig.p);

    assert!(rig.gate.session().listeners_attached());
    assert!(rig.p.is_visible(Surface::Container));

    rig.send(key(Key::ArrowDown), 8000);
    assert_eq!(rig.gate.phase(), Phase::Playing);
    rig.advance(11_000);
    assert_eq!(rig.gate.phase(), Phase::Complete);
}

#[test]
fn clip_duration_override_applies_to_next_run() {
    let mut rig = Rig::new();
    rig.send(scroll(60.0), 0);
    rig.gate.set_clip_duration(Millis(500)).unwrap();

    rig.advance(500);
    assert_eq!(rig.gate.phase(), Phase::Playing);
    rig.advance(3000);
    assert_eq!(rig.gate.phase(), Phase::Complete);

    rig.gate.reset(&mut rig.tl, &mut rig.p);
    rig.send(scroll(60.0), 10_000);
    rig.advance(10_500);
    assert_eq!(rig.gate.phase(), Phase::Complete);
}

#[test]
fn zero_clip_duration_is_rejected() {
    let mut rig = Rig::new();
    assert!(rig.gate.set_clip_duration(Millis::ZERO).is_err());
    assert_eq!(rig.gate.session().clip_duration(), Millis(3000));
}
