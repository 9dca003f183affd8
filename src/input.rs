//! Host input signals and the disposition the gate hands back for each one.

/// Keys the gate cares about, decoded from legacy DOM key codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    /// Space bar (32).
    Space,
    /// Page Up (33).
    PageUp,
    /// Page Down (34).
    PageDown,
    /// End (35).
    End,
    /// Home (36).
    Home,
    /// Left arrow (37).
    ArrowLeft,
    /// Up arrow (38).
    ArrowUp,
    /// Right arrow (39).
    ArrowRight,
    /// Down arrow (40).
    ArrowDown,
    /// Any other key code.
    Other(u32),
}

impl Key {
    /// Decode a DOM `keyCode`.
    pub fn from_key_code(code: u32) -> Self {
        match code {
            32 => Self::Space,
            33 => Self::PageUp,
            34 => Self::PageDown,
            35 => Self::End,
            36 => Self::Home,
            37 => Self::ArrowLeft,
            38 => Self::ArrowUp,
            39 => Self::ArrowRight,
            40 => Self::ArrowDown,
            other => Self::Other(other),
        }
    }

    /// Keys whose default action moves the page.
    pub fn moves_page(self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Keys that arm the intro from idle.
    pub fn arms_intro(self) -> bool {
        matches!(
            self,
            Self::Space | Self::PageUp | Self::PageDown | Self::ArrowUp | Self::ArrowDown
        )
    }
}

/// What a click landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickTarget {
    /// The decorative icon.
    Icon,
    /// Anywhere else on the page.
    Page,
}

/// A discrete signal delivered by the host event loop.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputSignal {
    /// Page scrolled; `y` is the current vertical scroll position.
    Scroll {
        /// Vertical scroll offset in pixels.
        y: f64,
    },
    /// Mouse wheel or trackpad delta.
    Wheel {
        /// Vertical delta in pixels.
        delta_y: f64,
    },
    /// A touch moved on the page.
    TouchMove,
    /// A key was pressed.
    KeyDown {
        /// Decoded key.
        key: Key,
    },
    /// The viewport changed size.
    Resize,
    /// The page became visible or hidden.
    VisibilityChange {
        /// `true` when the page is now visible.
        visible: bool,
    },
    /// Browser back/forward navigation.
    HistoryNavigate,
    /// A click somewhere on the page.
    Click {
        /// What was clicked.
        target: ClickTarget,
    },
}

impl InputSignal {
    /// Signals whose default action can move the page.
    ///
    /// Keys only count when they are page-moving keys.
    pub fn is_page_motion(&self) -> bool {
        match self {
            Self::Scroll { .. } | Self::Wheel { .. } | Self::TouchMove => true,
            Self::KeyDown { key } => key.moves_page(),
            _ => false,
        }
    }

    /// Signals a browser treats as user activation, which unlocks audio playback.
    pub fn is_user_gesture(&self) -> bool {
        matches!(self, Self::Click { .. } | Self::KeyDown { .. })
    }

    /// Short label for logs and traces.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Scroll { .. } => "scroll",
            Self::Wheel { .. } => "wheel",
            Self::TouchMove => "touch_move",
            Self::KeyDown { .. } => "key_down",
            Self::Resize => "resize",
            Self::VisibilityChange { .. } => "visibility_change",
            Self::HistoryNavigate => "history_navigate",
            Self::Click { .. } => "click",
        }
    }
}

/// What the host must do with the event's default action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Let the browser proceed.
    Default,
    /// Call `preventDefault`; the page must not move.
    Suppressed,
}

impl Disposition {
    /// Return `true` when the default action must be prevented.
    pub fn is_suppressed(self) -> bool {
        self == Self::Suppressed
    }
}
