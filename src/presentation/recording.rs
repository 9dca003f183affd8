use std::collections::{BTreeMap, BTreeSet};

use super::{IconEffect, Layer, Presentation, Surface};
use crate::foundation::core::{Millis, Viewport};

/// One call made against a [`RecordingPresentation`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "op", content = "args", rename_all = "snake_case")]
pub enum PresentationCall {
    /// [`Presentation::show`]
    Show(Surface),
    /// [`Presentation::hide`]
    Hide(Surface),
    /// [`Presentation::set_dimensions`]
    SetDimensions(Layer, Viewport),
    /// [`Presentation::fade_out`]
    FadeOut(Surface, Millis),
    /// [`Presentation::remove`]
    Remove(Surface),
    /// [`Presentation::restore`]
    Restore(Surface),
    /// [`Presentation::restart`]
    Restart(Layer),
    /// [`Presentation::set_scroll_lock`]
    ScrollLock(bool),
    /// [`Presentation::scroll_to_top`]
    ScrollToTop,
    /// [`Presentation::play_effect`]
    PlayEffect(IconEffect),
    /// [`Presentation::clear_effect`]
    ClearEffect(IconEffect),
}

/// Resolved state of one surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct SurfaceState {
    /// Shown (as opposed to hidden).
    pub visible: bool,
    /// Fading or faded to transparent.
    pub faded: bool,
    /// Taken out of layout.
    pub removed: bool,
}

impl SurfaceState {
    fn shown() -> Self {
        Self {
            visible: true,
            faded: false,
            removed: false,
        }
    }

    fn hidden() -> Self {
        Self {
            visible: false,
            ..Self::shown()
        }
    }

    /// Visible on screen: shown, opaque, and in layout.
    pub fn on_screen(&self) -> bool {
        self.visible && !self.faded && !self.removed
    }
}

/// Serializable summary of a [`RecordingPresentation`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PresentationState {
    /// Per-surface state.
    pub surfaces: BTreeMap<Surface, SurfaceState>,
    /// Whether the page root is scroll-locked.
    pub scroll_locked: bool,
    /// Active icon effects.
    pub effects: BTreeSet<IconEffect>,
}

/// In-memory presentation that tracks resolved state and logs every call.
///
/// Starts out matching the page markup: static image, container, indicator and icon shown;
/// motion, final and overlay hidden.
#[derive(Clone, Debug)]
pub struct RecordingPresentation {
    surfaces: BTreeMap<Surface, SurfaceState>,
    dimensions: BTreeMap<Layer, Viewport>,
    effects: BTreeSet<IconEffect>,
    scroll_locked: bool,
    viewport: Option<Viewport>,
    calls: Vec<PresentationCall>,
}

impl Default for RecordingPresentation {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingPresentation {
    /// Default desktop viewport used until [`RecordingPresentation::set_viewport`] is called.
    pub const DEFAULT_VIEWPORT: Viewport = Viewport {
        width: 1280,
        height: 720,
    };

    /// Create a presentation in its markup state.
    pub fn new() -> Self {
        let mut surfaces = BTreeMap::new();
        surfaces.insert(Surface::Layer(Layer::Static), SurfaceState::shown());
        surfaces.insert(Surface::Layer(Layer::Motion), SurfaceState::hidden());
        surfaces.insert(Surface::Layer(Layer::Final), SurfaceState::hidden());
        surfaces.insert(Surface::Container, SurfaceState::shown());
        surfaces.insert(Surface::Overlay, SurfaceState::hidden());
        surfaces.insert(Surface::Indicator, SurfaceState::shown());
        surfaces.insert(Surface::Icon, SurfaceState::shown());

        Self {
            surfaces,
            dimensions: BTreeMap::new(),
            effects: BTreeSet::new(),
            scroll_locked: false,
            viewport: Some(Self::DEFAULT_VIEWPORT),
            calls: Vec::new(),
        }
    }

    /// Change what [`Presentation::viewport`] reports.
    pub fn set_viewport(&mut self, viewport: Option<Viewport>) {
        self.viewport = viewport;
    }

    /// Every call so far, oldest first.
    pub fn calls(&self) -> &[PresentationCall] {
        &self.calls
    }

    /// Forget logged calls, keeping resolved state.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Resolved state of a surface.
    pub fn surface(&self, surface: Surface) -> SurfaceState {
        self.surfaces
            .get(&surface)
            .copied()
            .unwrap_or_else(SurfaceState::hidden)
    }

    /// Shorthand for `surface(s).on_screen()`.
    pub fn is_visible(&self, surface: Surface) -> bool {
        self.surface(surface).on_screen()
    }

    /// Last size applied to a layer.
    pub fn dimensions(&self, layer: Layer) -> Option<Viewport> {
        self.dimensions.get(&layer).copied()
    }

    /// Whether the page root is scroll-locked.
    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    /// Whether an icon effect is running.
    pub fn effect_active(&self, effect: IconEffect) -> bool {
        self.effects.contains(&effect)
    }

    /// Number of times a call matching `pred` was made.
    pub fn count(&self, pred: impl Fn(&PresentationCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    /// Snapshot of resolved state.
    pub fn state(&self) -> PresentationState {
        PresentationState {
            surfaces: self.surfaces.clone(),
            scroll_locked: self.scroll_locked,
            effects: self.effects.clone(),
        }
    }

    fn entry(&mut self, surface: Surface) -> &mut SurfaceState {
        self.surfaces
            .entry(surface)
            .or_insert_with(SurfaceState::hidden)
    }
}

impl Presentation for RecordingPresentation {
    fn show(&mut self, surface: Surface) {
        self.calls.push(PresentationCall::Show(surface));
        self.entry(surface).visible = true;
    }

    fn hide(&mut self, surface: Surface) {
        self.calls.push(PresentationCall::Hide(surface));
        self.entry(surface).visible = false;
    }

    fn set_dimensions(&mut self, layer: Layer, viewport: Viewport) {
        self.calls.push(PresentationCall::SetDimensions(layer, viewport));
        self.dimensions.insert(layer, viewport);
    }

    fn fade_out(&mut self, surface: Surface, duration: Millis) {
        self.calls.push(PresentationCall::FadeOut(surface, duration));
        self.entry(surface).faded = true;
    }

    fn remove(&mut self, surface: Surface) {
        self.calls.push(PresentationCall::Remove(surface));
        self.entry(surface).removed = true;
    }

    fn restore(&mut self, surface: Surface) {
        self.calls.push(PresentationCall::Restore(surface));
        let s = self.entry(surface);
        s.faded = false;
        s.removed = false;
    }

    fn restart(&mut self, layer: Layer) {
        self.calls.push(PresentationCall::Restart(layer));
    }

    fn set_scroll_lock(&mut self, locked: bool) {
        self.calls.push(PresentationCall::ScrollLock(locked));
        self.scroll_locked = locked;
    }

    fn scroll_to_top(&mut self) {
        self.calls.push(PresentationCall::ScrollToTop);
    }

    fn play_effect(&mut self, effect: IconEffect) {
        self.calls.push(PresentationCall::PlayEffect(effect));
        self.effects.insert(effect);
    }

    fn clear_effect(&mut self, effect: IconEffect) {
        self.calls.push(PresentationCall::ClearEffect(effect));
        self.effects.remove(&effect);
    }

    fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_markup_state() {
        let rec = RecordingPresentation::new();
        assert!(rec.is_visible(Layer::Static.into()));
        assert!(!rec.is_visible(Layer::Motion.into()));
        assert!(!rec.is_visible(Layer::Final.into()));
        assert!(!rec.is_visible(Surface::Overlay));
        assert!(rec.is_visible(Surface::Indicator));
        assert!(rec.is_visible(Surface::Container));
        assert!(!rec.scroll_locked());
    }

    #[test]
    fn fade_and_remove_are_undone_by_restore() {
        let mut rec = RecordingPresentation::new();
        rec.fade_out(Surface::Container, Millis(1000));
        assert!(!rec.is_visible(Surface::Container));
        rec.remove(Surface::Container);
        assert!(rec.surface(Surface::Container).removed);

        rec.restore(Surface::Container);
        assert!(rec.is_visible(Surface::Container));
        assert_eq!(rec.calls().len(), 3);
    }

    #[test]
    fn effects_toggle() {
        let mut rec = RecordingPresentation::new();
        rec.play_effect(IconEffect::Shake);
        assert!(rec.effect_active(IconEffect::Shake));
        rec.clear_effect(IconEffect::Shake);
        assert!(!rec.effect_active(IconEffect::Shake));
        assert_eq!(
            rec.count(|c| matches!(c, PresentationCall::PlayEffect(_))),
            1
        );
    }
}
