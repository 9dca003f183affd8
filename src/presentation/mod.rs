//! The host-facing presentation seam.
//!
//! The gate never touches styling directly. It addresses named [`Surface`]s through the
//! [`Presentation`] trait and derives layer visibility declaratively from its phase via
//! [`PhaseVisuals`].

/// In-memory presentation for tests and simulation.
pub mod recording;

use crate::foundation::core::{Millis, Viewport};
use crate::gate::Phase;

/// One of the three stacked intro images.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// The still image shown before the intro runs.
    Static,
    /// The animated clip.
    Motion,
    /// The still image revealed once the clip ends.
    Final,
}

impl Layer {
    /// All layers, bottom to top.
    pub const ALL: [Layer; 3] = [Layer::Static, Layer::Motion, Layer::Final];
}

/// Anything the gate can address on the page.
///
/// Serializes as its [`Surface::name`], so it can key JSON maps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Surface {
    /// One of the intro images.
    Layer(Layer),
    /// The element holding all three layers.
    Container,
    /// Full-page overlay that swallows pointer input while the clip plays.
    Overlay,
    /// "Scroll to begin" hint.
    Indicator,
    /// The decorative icon.
    Icon,
}

impl Surface {
    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Layer(Layer::Static) => "static",
            Self::Layer(Layer::Motion) => "motion",
            Self::Layer(Layer::Final) => "final",
            Self::Container => "container",
            Self::Overlay => "overlay",
            Self::Indicator => "indicator",
            Self::Icon => "icon",
        }
    }
}

impl serde::Serialize for Surface {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl From<Layer> for Surface {
    fn from(layer: Layer) -> Self {
        Surface::Layer(layer)
    }
}

/// Cosmetic icon animations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IconEffect {
    /// Short wobble on every click.
    Shake,
    /// One-shot drop off the page.
    Fall,
}

/// Host presentation layer.
///
/// Implementations must treat a missing element as a no-op.
pub trait Presentation {
    /// Make a surface visible.
    fn show(&mut self, surface: Surface);
    /// Make a surface invisible while keeping it in layout.
    fn hide(&mut self, surface: Surface);
    /// Size a layer to exactly `viewport`.
    fn set_dimensions(&mut self, layer: Layer, viewport: Viewport);
    /// Start an opacity transition to transparent over `duration`.
    ///
    /// Completion is tracked by the caller's timeline, not by the host.
    fn fade_out(&mut self, surface: Surface, duration: Millis);
    /// Take a surface out of layout entirely.
    fn remove(&mut self, surface: Surface);
    /// Undo [`Presentation::fade_out`] and [`Presentation::remove`]: back in layout, opaque,
    /// no transition.
    fn restore(&mut self, surface: Surface);
    /// Replay a layer's media from its first frame.
    fn restart(&mut self, layer: Layer);
    /// Toggle the scroll lock on the page root.
    fn set_scroll_lock(&mut self, locked: bool);
    /// Scroll the page back to the top.
    fn scroll_to_top(&mut self);
    /// Start an icon effect.
    fn play_effect(&mut self, effect: IconEffect);
    /// Stop an icon effect.
    fn clear_effect(&mut self, effect: IconEffect);
    /// Current viewport size, if the host can report one.
    fn viewport(&self) -> Option<Viewport>;
}

/// Declarative visual state for one phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct PhaseVisuals {
    /// Static layer visible.
    pub static_layer: bool,
    /// Motion layer visible.
    pub motion_layer: bool,
    /// Final layer visible.
    pub final_layer: bool,
    /// Input overlay visible.
    pub overlay: bool,
    /// Page root scroll-locked.
    pub scroll_lock: bool,
}

impl PhaseVisuals {
    /// Map a phase to its visual state.
    ///
    /// While the clip plays the static image stays visible underneath it so the swap has no
    /// flash.
    pub fn for_phase(phase: Phase) -> Self {
        match phase {
            Phase::Idle => Self {
                static_layer: true,
                motion_layer: false,
                final_layer: false,
                overlay: false,
                scroll_lock: false,
            },
            Phase::Playing => Self {
                static_layer: true,
                motion_layer: true,
                final_layer: false,
                overlay: true,
                scroll_lock: true,
            },
            Phase::Complete => Self {
                static_layer: false,
                motion_layer: false,
                final_layer: true,
                overlay: false,
                scroll_lock: false,
            },
        }
    }

    /// Visibility of one layer.
    pub fn layer(&self, layer: Layer) -> bool {
        match layer {
            Layer::Static => self.static_layer,
            Layer::Motion => self.motion_layer,
            Layer::Final => self.final_layer,
        }
    }

    /// Push this state to the host.
    ///
    /// Layers being revealed are shown before layers being hidden, so the page never shows an
    /// empty frame between two images.
    pub fn apply(&self, p: &mut dyn Presentation) {
        for layer in Layer::ALL {
            if self.layer(layer) {
                p.show(layer.into());
            }
        }
        for layer in Layer::ALL {
            if !self.layer(layer) {
                p.hide(layer.into());
            }
        }
        if self.overlay {
            p.show(Surface::Overlay);
        } else {
            p.hide(Surface::Overlay);
        }
        p.set_scroll_lock(self.scroll_lock);
    }
}

/// Size every layer to the host's current viewport. Does nothing if the host reports none.
pub fn fit_layers(p: &mut dyn Presentation) {
    let Some(viewport) = p.viewport() else {
        tracing::debug!("viewport unavailable, skipping layer resize");
        return;
    };
    for layer in Layer::ALL {
        p.set_dimensions(layer, viewport);
    }
}
