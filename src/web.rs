//! Browser host for the intro sequence.
//!
//! Elements are looked up by id once, at mount time; any that are missing turn the
//! corresponding presentation calls into no-ops. The controller lives in an
//! `Rc<RefCell<_>>` shared by the DOM listeners, and a single `setTimeout` is kept armed
//! for the controller's next deadline.
//!
//! Build with `wasm-pack build --target web --features web` and call `mountIntro()` once
//! the DOM is ready.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::Promise;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Document, Event, HtmlAudioElement, HtmlElement, HtmlImageElement,
    KeyboardEvent, Node, WheelEvent, Window,
};

use crate::audio::{AudioTrack, PlayAttempt};
use crate::config::GateConfig;
use crate::controller::IntroController;
use crate::foundation::core::{Millis, Timestamp, Viewport};
use crate::input::{ClickTarget, InputSignal, Key};
use crate::presentation::{IconEffect, Layer, Presentation, Surface};

/// Element ids the binding looks up.
#[derive(Clone, Debug)]
pub struct ElementIds {
    /// Still image shown first.
    pub static_image: &'static str,
    /// Animated clip.
    pub motion: &'static str,
    /// Still image revealed last.
    pub final_image: &'static str,
    /// Wrapper around the three images.
    pub container: &'static str,
    /// Full-page input overlay.
    pub overlay: &'static str,
    /// Scroll hint.
    pub indicator: &'static str,
    /// Decorative icon.
    pub icon: &'static str,
    /// `<audio>` element for the background track.
    pub audio: &'static str,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            static_image: "staticImage",
            motion: "animatedGif",
            final_image: "finalImage",
            container: "imageContainer",
            overlay: "scrollOverlay",
            indicator: "scrollIndicator",
            icon: "okapIcon",
            audio: "backgroundMusic",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ConsoleLevel {
    Error,
    Warn,
    Info,
    Debug,
    Log,
}

impl ConsoleLevel {
    fn for_level(level: &tracing::Level) -> Self {
        if *level == tracing::Level::ERROR {
            Self::Error
        } else if *level == tracing::Level::WARN {
            Self::Warn
        } else if *level == tracing::Level::INFO {
            Self::Info
        } else if *level == tracing::Level::DEBUG {
            Self::Debug
        } else {
            Self::Log
        }
    }
}

/// One formatted event, sent to the browser console when dropped.
struct ConsoleWriter {
    level: ConsoleLevel,
    buf: Vec<u8>,
}

impl std::io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        let text = text.trim_end();
        if text.is_empty() {
            return;
        }
        let line = JsValue::from_str(text);
        match self.level {
            ConsoleLevel::Error => web_sys::console::error_1(&line),
            ConsoleLevel::Warn => web_sys::console::warn_1(&line),
            ConsoleLevel::Info => web_sys::console::info_1(&line),
            ConsoleLevel::Debug => web_sys::console::debug_1(&line),
            ConsoleLevel::Log => web_sys::console::log_1(&line),
        }
    }
}

struct Console;

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for Console {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            level: ConsoleLevel::Log,
            buf: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            level: ConsoleLevel::for_level(meta.level()),
            buf: Vec::new(),
        }
    }
}

/// Route panics and `tracing` output to the browser console. Later calls are no-ops.
fn init_console_logging() {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    // wasm32 has no wall clock; the console timestamps lines itself.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(Console)
        .without_time()
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

const HIDDEN: &str = "hidden";
const NO_SCROLL: &str = "no-scroll";

fn find(document: &Document, id: &str) -> Option<HtmlElement> {
    let el = document
        .get_element_by_id(id)
        .and_then(|e| e.dyn_into::<HtmlElement>().ok());
    if el.is_none() {
        tracing::warn!(id, "element not found, its effects are disabled");
    }
    el
}

fn set_style(el: &HtmlElement, name: &str, value: &str) {
    let _ = el.style().set_property(name, value);
}

/// [`Presentation`] backed by real DOM elements.
pub struct DomPresentation {
    window: Window,
    document: Document,
    static_image: Option<HtmlElement>,
    motion: Option<HtmlElement>,
    final_image: Option<HtmlElement>,
    container: Option<HtmlElement>,
    overlay: Option<HtmlElement>,
    indicator: Option<HtmlElement>,
    icon: Option<HtmlElement>,
    motion_src: Option<String>,
}

impl DomPresentation {
    /// Look up every element in `ids`.
    pub fn new(window: Window, document: Document, ids: &ElementIds) -> Self {
        let motion = find(&document, ids.motion);
        let motion_src = motion
            .as_ref()
            .and_then(|m| m.dyn_ref::<HtmlImageElement>())
            .map(|img| img.src());
        Self {
            static_image: find(&document, ids.static_image),
            motion,
            final_image: find(&document, ids.final_image),
            container: find(&document, ids.container),
            overlay: find(&document, ids.overlay),
            indicator: find(&document, ids.indicator),
            icon: find(&document, ids.icon),
            motion_src,
            window,
            document,
        }
    }

    fn element(&self, surface: Surface) -> Option<&HtmlElement> {
        match surface {
            Surface::Layer(Layer::Static) => self.static_image.as_ref(),
            Surface::Layer(Layer::Motion) => self.motion.as_ref(),
            Surface::Layer(Layer::Final) => self.final_image.as_ref(),
            Surface::Container => self.container.as_ref(),
            Surface::Overlay => self.overlay.as_ref(),
            Surface::Indicator => self.indicator.as_ref(),
            Surface::Icon => self.icon.as_ref(),
        }
    }

    fn effect_class(effect: IconEffect) -> &'static str {
        match effect {
            IconEffect::Shake => "shake",
            IconEffect::Fall => "fall",
        }
    }

    fn is_icon_target(&self, event: &Event) -> bool {
        let Some(icon) = self.icon.as_ref() else {
            return false;
        };
        let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
        icon.contains(target.as_ref())
    }
}

impl Presentation for DomPresentation {
    fn show(&mut self, surface: Surface) {
        if let Some(el) = self.element(surface) {
            let _ = el.class_list().remove_1(HIDDEN);
        }
    }

    fn hide(&mut self, surface: Surface) {
        if let Some(el) = self.element(surface) {
            let _ = el.class_list().add_1(HIDDEN);
        }
    }

    fn set_dimensions(&mut self, layer: Layer, viewport: Viewport) {
        if let Some(el) = self.element(layer.into()) {
            set_style(el, "width", &format!("{}px", viewport.width));
            set_style(el, "height", &format!("{}px", viewport.height));
        }
    }

    fn fade_out(&mut self, surface: Surface, duration: Millis) {
        if let Some(el) = self.element(surface) {
            set_style(el, "transition", &format!("opacity {}ms ease-out", duration.0));
            set_style(el, "opacity", "0");
        }
    }

    fn remove(&mut self, surface: Surface) {
        if let Some(el) = self.element(surface) {
            set_style(el, "display", "none");
        }
    }

    fn restore(&mut self, surface: Surface) {
        if let Some(el) = self.element(surface) {
            set_style(el, "transition", "none");
            set_style(el, "opacity", "1");
            set_style(el, "display", "block");
        }
    }

    fn restart(&mut self, layer: Layer) {
        let Some(img) = self
            .element(layer.into())
            .and_then(|el| el.dyn_ref::<HtmlImageElement>())
        else {
            return;
        };
        let src = match layer {
            Layer::Motion => self.motion_src.clone(),
            Layer::Static | Layer::Final => Some(img.src()),
        };
        if let Some(src) = src {
            // Clearing the source first makes the browser replay the animation.
            img.set_src("");
            img.set_src(&src);
        }
    }

    fn set_scroll_lock(&mut self, locked: bool) {
        let Some(body) = self.document.body() else {
            return;
        };
        if locked {
            let _ = body.class_list().add_1(NO_SCROLL);
            return;
        }
        let _ = body.class_list().remove_1(NO_SCROLL);
        let _ = body.style().remove_property("overflow");
        let _ = body.style().remove_property("height");
        if let Some(root) = self
            .document
            .document_element()
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
        {
            let _ = root.style().remove_property("overflow");
        }
    }

    fn scroll_to_top(&mut self) {
        self.window.scroll_to_with_x_and_y(0.0, 0.0);
    }

    fn play_effect(&mut self, effect: IconEffect) {
        let Some(icon) = self.icon.as_ref() else {
            return;
        };
        let class = Self::effect_class(effect);
        let _ = icon.class_list().remove_1(class);
        // Reading layout forces a reflow so a re-added class restarts its animation.
        let _ = icon.offset_width();
        let _ = icon.class_list().add_1(class);
    }

    fn clear_effect(&mut self, effect: IconEffect) {
        if let Some(icon) = self.icon.as_ref() {
            let _ = icon.class_list().remove_1(Self::effect_class(effect));
        }
    }

    fn viewport(&self) -> Option<Viewport> {
        let w = self.window.inner_width().ok()?.as_f64()?;
        let h = self.window.inner_height().ok()?.as_f64()?;
        Some(Viewport::from_f64(w, h))
    }
}

/// [`AudioTrack`] over an `<audio>` element.
///
/// `play()` resolves asynchronously, so every attempt reports [`PlayAttempt::Pending`] and
/// parks the returned promise for the host to watch.
pub struct HtmlAudioTrack {
    el: Option<HtmlAudioElement>,
    pending: Option<Promise>,
}

impl HtmlAudioTrack {
    /// Look up the audio element.
    pub fn new(document: &Document, id: &str) -> Self {
        let el = document
            .get_element_by_id(id)
            .and_then(|e| e.dyn_into::<HtmlAudioElement>().ok());
        if el.is_none() {
            tracing::warn!(id, "audio element not found, music disabled");
        }
        Self { el, pending: None }
    }

    fn take_pending(&mut self) -> Option<Promise> {
        self.pending.take()
    }
}

impl AudioTrack for HtmlAudioTrack {
    fn play(&mut self) -> PlayAttempt {
        let Some(el) = self.el.as_ref() else {
            // Never settles; the controller stays quiet instead of retrying forever.
            return PlayAttempt::Pending;
        };
        match el.play() {
            Ok(promise) => {
                self.pending = Some(promise);
                PlayAttempt::Pending
            }
            Err(_) => PlayAttempt::Denied,
        }
    }

    fn pause(&mut self) {
        if let Some(el) = self.el.as_ref() {
            let _ = el.pause();
        }
    }

    fn rewind(&mut self) {
        if let Some(el) = self.el.as_ref() {
            el.set_current_time(0.0);
        }
    }

    fn volume(&self) -> f64 {
        self.el.as_ref().map_or(1.0, |el| el.volume())
    }

    fn set_volume(&mut self, volume: f64) {
        if let Some(el) = self.el.as_ref() {
            el.set_volume(volume.clamp(0.0, 1.0));
        }
    }
}

type DomController = IntroController<DomPresentation, HtmlAudioTrack>;
type EventClosure = Closure<dyn FnMut(Event)>;

/// Page-motion events that are only listened to until the intro completes.
const SUPPRESSION_EVENTS: [&str; 4] = ["scroll", "wheel", "touchmove", "keydown"];

struct Host {
    ctl: DomController,
    window: Window,
    armed: Option<(i32, Timestamp)>,
    suppression_attached: bool,
}

impl Host {
    fn now(&self) -> Timestamp {
        let ms = self.window.performance().map_or(0.0, |p| p.now());
        Timestamp::from_f64_ms(ms)
    }
}

struct Shared {
    host: RefCell<Host>,
    suppression: RefCell<Vec<(&'static str, EventClosure)>>,
    tick: RefCell<Option<Closure<dyn FnMut()>>>,
    persistent: RefCell<Vec<EventClosure>>,
}

fn signal_for(name: &str, event: &Event, window: &Window) -> Option<InputSignal> {
    match name {
        "scroll" => Some(InputSignal::Scroll {
            y: window.scroll_y().unwrap_or(0.0),
        }),
        "wheel" => event
            .dyn_ref::<WheelEvent>()
            .map(|w| InputSignal::Wheel { delta_y: w.delta_y() }),
        "touchmove" => Some(InputSignal::TouchMove),
        "keydown" => event.dyn_ref::<KeyboardEvent>().map(|k| InputSignal::KeyDown {
            key: Key::from_key_code(k.key_code()),
        }),
        _ => None,
    }
}

fn dispatch(shared: &Rc<Shared>, signal: InputSignal, event: Option<&Event>) {
    let disposition = {
        let mut host = shared.host.borrow_mut();
        let now = host.now();
        // A timer that is already due fires before the event is evaluated.
        host.ctl.advance_to(now);
        host.ctl.handle(signal, now)
    };
    if disposition.is_suppressed()
        && let Some(event) = event
    {
        event.prevent_default();
    }
    sync(shared);
}

fn on_tick(shared: &Rc<Shared>) {
    {
        let mut host = shared.host.borrow_mut();
        host.armed = None;
        let now = host.now();
        host.ctl.advance_to(now);
    }
    sync(shared);
}

fn sync(shared: &Rc<Shared>) {
    let (want, have) = {
        let host = shared.host.borrow();
        (
            host.ctl.gate().session().listeners_attached(),
            host.suppression_attached,
        )
    };
    if want && !have {
        attach_suppression(shared);
    } else if !want && have {
        detach_suppression(shared);
    }
    arm_timer(shared);
    watch_playback(shared);
}

fn arm_timer(shared: &Rc<Shared>) {
    let mut host = shared.host.borrow_mut();
    let next = host.ctl.next_deadline();
    if host.armed.map(|(_, at)| at) == next {
        return;
    }
    if let Some((id, _)) = host.armed.take() {
        host.window.clear_timeout_with_handle(id);
    }
    let Some(next) = next else {
        return;
    };
    let tick = shared.tick.borrow();
    let Some(tick) = tick.as_ref() else {
        return;
    };
    let delay = i32::try_from(next.since(host.now()).0).unwrap_or(i32::MAX);
    let armed = host
        .window
        .set_timeout_with_callback_and_timeout_and_arguments_0(tick.as_ref().unchecked_ref(), delay);
    match armed {
        Ok(id) => host.armed = Some((id, next)),
        Err(_) => tracing::warn!("setTimeout failed, timers will fire on the next event"),
    }
}

fn watch_playback(shared: &Rc<Shared>) {
    let Some(promise) = shared.host.borrow_mut().ctl.track_mut().take_pending() else {
        return;
    };
    let settle = |ok: bool| {
        let weak = Rc::downgrade(shared);
        Closure::once(move |_: JsValue| {
            if let Some(shared) = weak.upgrade() {
                shared.host.borrow_mut().ctl.on_play_settled(ok);
                sync(&shared);
            }
        })
    };
    let resolve = settle(true);
    let reject = settle(false);
    let _ = promise.then2(&resolve, &reject);
    resolve.forget();
    reject.forget();
}

fn listener(weak: Weak<Shared>, handler: impl Fn(&Rc<Shared>, &Event) + 'static) -> EventClosure {
    Closure::wrap(Box::new(move |event: Event| {
        if let Some(shared) = weak.upgrade() {
            handler(&shared, &event);
        }
    }) as Box<dyn FnMut(Event)>)
}

fn build_suppression(shared: &Rc<Shared>) {
    let mut slots = shared.suppression.borrow_mut();
    for name in SUPPRESSION_EVENTS {
        let cb = listener(Rc::downgrade(shared), move |shared, event| {
            let window = shared.host.borrow().window.clone();
            if let Some(signal) = signal_for(name, event, &window) {
                dispatch(shared, signal, Some(event));
            }
        });
        slots.push((name, cb));
    }
}

// The closures outlive every attach/detach cycle: a keydown handler may detach itself.
fn attach_suppression(shared: &Rc<Shared>) {
    let window = shared.host.borrow().window.clone();
    let opts = AddEventListenerOptions::new();
    opts.set_passive(false);

    for (name, cb) in shared.suppression.borrow().iter() {
        if window
            .add_event_listener_with_callback_and_add_event_listener_options(
                name,
                cb.as_ref().unchecked_ref(),
                &opts,
            )
            .is_err()
        {
            tracing::warn!(event = *name, "failed to attach suppression listener");
        }
    }
    shared.host.borrow_mut().suppression_attached = true;
    tracing::debug!("suppression listeners attached");
}

fn detach_suppression(shared: &Rc<Shared>) {
    let window = shared.host.borrow().window.clone();
    for (name, cb) in shared.suppression.borrow().iter() {
        let _ = window.remove_event_listener_with_callback(name, cb.as_ref().unchecked_ref());
    }
    shared.host.borrow_mut().suppression_attached = false;
    tracing::debug!("suppression listeners detached");
}

fn attach_persistent(shared: &Rc<Shared>, document: &Document) -> Result<(), JsValue> {
    let window = shared.host.borrow().window.clone();
    let mut keep = shared.persistent.borrow_mut();

    let resize = listener(Rc::downgrade(shared), |shared, _| {
        dispatch(shared, InputSignal::Resize, None);
    });
    window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;
    keep.push(resize);

    let popstate = listener(Rc::downgrade(shared), |shared, _| {
        dispatch(shared, InputSignal::HistoryNavigate, None);
    });
    window.add_event_listener_with_callback("popstate", popstate.as_ref().unchecked_ref())?;
    keep.push(popstate);

    let doc = document.clone();
    let visibility = listener(Rc::downgrade(shared), move |shared, _| {
        let visible = !doc.hidden();
        dispatch(shared, InputSignal::VisibilityChange { visible }, None);
    });
    document
        .add_event_listener_with_callback("visibilitychange", visibility.as_ref().unchecked_ref())?;
    keep.push(visibility);

    let click = listener(Rc::downgrade(shared), |shared, event| {
        let target = if shared.host.borrow().ctl.presentation().is_icon_target(event) {
            ClickTarget::Icon
        } else {
            ClickTarget::Page
        };
        dispatch(shared, InputSignal::Click { target }, Some(event));
    });
    document.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;
    keep.push(click);

    Ok(())
}

/// Handle to a mounted intro, exposed to JavaScript.
#[wasm_bindgen]
pub struct WebIntro {
    shared: Rc<Shared>,
}

#[wasm_bindgen]
impl WebIntro {
    /// Mount on the current page. `config_json` optionally overrides [`GateConfig`] fields.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WebIntro, JsValue> {
        let config = match config_json {
            Some(json) => GateConfig::from_reader(json.as_bytes())
                .map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => GateConfig::default(),
        };
        mount(config, &ElementIds::default())
    }

    /// Re-arm the whole session.
    pub fn reset(&self) {
        {
            let mut host = self.shared.host.borrow_mut();
            let now = host.now();
            host.ctl.reset(now);
        }
        sync(&self.shared);
    }

    /// Override the clip length (ms) for the next run.
    #[wasm_bindgen(js_name = setClipDuration)]
    pub fn set_clip_duration(&self, ms: f64) -> Result<(), JsValue> {
        let ms = if ms.is_finite() && ms > 0.0 { ms.round() as u64 } else { 0 };
        self.shared
            .host
            .borrow_mut()
            .ctl
            .set_clip_duration(Millis(ms))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Current phase as `"idle"`, `"playing"` or `"complete"`.
    pub fn phase(&self) -> String {
        match self.shared.host.borrow().ctl.phase() {
            crate::gate::Phase::Idle => "idle",
            crate::gate::Phase::Playing => "playing",
            crate::gate::Phase::Complete => "complete",
        }
        .to_owned()
    }
}

/// Mount with default configuration and element ids.
#[wasm_bindgen(js_name = mountIntro)]
pub fn mount_intro() -> Result<WebIntro, JsValue> {
    mount(GateConfig::default(), &ElementIds::default())
}

/// Mount with explicit configuration and element ids.
pub fn mount(config: GateConfig, ids: &ElementIds) -> Result<WebIntro, JsValue> {
    init_console_logging();
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let presentation = DomPresentation::new(window.clone(), document.clone(), ids);
    let track = HtmlAudioTrack::new(&document, ids.audio);
    let ctl = IntroController::new(config, presentation, track)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let shared = Rc::new(Shared {
        host: RefCell::new(Host {
            ctl,
            window,
            armed: None,
            suppression_attached: false,
        }),
        suppression: RefCell::new(Vec::new()),
        tick: RefCell::new(None),
        persistent: RefCell::new(Vec::new()),
    });

    let weak = Rc::downgrade(&shared);
    *shared.tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        if let Some(shared) = weak.upgrade() {
            on_tick(&shared);
        }
    }) as Box<dyn FnMut()>));

    build_suppression(&shared);
    attach_persistent(&shared, &document)?;
    {
        let mut host = shared.host.borrow_mut();
        let now = host.now();
        host.ctl.init(now);
    }
    sync(&shared);
    tracing::debug!("intro mounted");

    Ok(WebIntro { shared })
}
