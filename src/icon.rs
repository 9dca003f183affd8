use crate::config::IconConfig;
use crate::foundation::core::Timestamp;
use crate::presentation::{IconEffect, Presentation, Surface};
use crate::timeline::{IconTask, Task, TaskHandle, Timeline};

/// Result of one icon click.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IconClick {
    /// Counted; the icon shook.
    Shook {
        /// Clicks so far.
        count: u32,
    },
    /// This click made the icon fall. The caller fades the music out.
    Fell,
    /// The icon already fell; nothing happened.
    Ignored,
}

/// Click-to-topple icon.
#[derive(Clone, Debug)]
pub struct IconInteraction {
    config: IconConfig,
    count: u32,
    fallen: bool,
    hidden: bool,
    shake_timer: Option<TaskHandle>,
    hide_timer: Option<TaskHandle>,
}

impl IconInteraction {
    /// Create an upright icon with no clicks.
    pub fn new(config: &IconConfig) -> Self {
        Self {
            config: config.clone(),
            count: 0,
            fallen: false,
            hidden: false,
            shake_timer: None,
            hide_timer: None,
        }
    }

    /// Clicks counted so far.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Whether the icon has fallen.
    pub fn is_fallen(&self) -> bool {
        self.fallen
    }

    /// Whether the fallen icon has been hidden.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Count a click, shake, and fall once the threshold is reached.
    pub fn click(
        &mut self,
        now: Timestamp,
        timeline: &mut Timeline,
        p: &mut dyn Presentation,
    ) -> IconClick {
        if self.fallen {
            return IconClick::Ignored;
        }
        self.count += 1;
        tracing::debug!(count = self.count, "icon clicked");

        // Restart the shake from its first frame.
        p.clear_effect(IconEffect::Shake);
        p.play_effect(IconEffect::Shake);
        if let Some(prev) = self.shake_timer.take() {
            timeline.cancel(prev);
        }
        self.shake_timer = Some(timeline.schedule_after(
            now,
            self.config.shake,
            Task::Icon(IconTask::EndShake),
        ));

        if self.count < self.config.fall_threshold {
            return IconClick::Shook { count: self.count };
        }

        self.fallen = true;
        tracing::debug!("icon falling");
        p.play_effect(IconEffect::Fall);
        self.hide_timer = Some(timeline.schedule_after(
            now,
            self.config.fall,
            Task::Icon(IconTask::Hide),
        ));
        IconClick::Fell
    }

    /// Run an icon continuation.
    pub fn on_task(&mut self, handle: TaskHandle, task: IconTask, p: &mut dyn Presentation) {
        match task {
            IconTask::EndShake => {
                if self.shake_timer.take() == Some(handle) {
                    p.clear_effect(IconEffect::Shake);
                }
            }
            IconTask::Hide => {
                if self.hide_timer.take() == Some(handle) {
                    self.hidden = true;
                    p.remove(Surface::Icon);
                }
            }
        }
    }

    /// Stand the icon back up with a zero count.
    pub fn reset(&mut self, timeline: &mut Timeline, p: &mut dyn Presentation) {
        for handle in [self.shake_timer.take(), self.hide_timer.take()]
            .into_iter()
            .flatten()
        {
            timeline.cancel(handle);
        }
        self.count = 0;
        self.fallen = false;
        self.hidden = false;
        p.clear_effect(IconEffect::Shake);
        p.clear_effect(IconEffect::Fall);
        p.restore(Surface::Icon);
        p.show(Surface::Icon);
    }
}
