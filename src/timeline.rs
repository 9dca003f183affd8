use std::collections::{BTreeMap, HashMap};

use crate::foundation::core::{Millis, Timestamp};

/// Opaque handle to a scheduled task, used for cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct TaskHandle(u64);

/// Deferred continuation owned by the gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateTask {
    /// The motion clip has run its course.
    ClipComplete,
    /// The scroll indicator fade finished.
    RemoveIndicator,
    /// The final hold elapsed; start fading the image container.
    BeginContainerFade,
    /// The container fade finished.
    RemoveContainer,
}

/// Deferred continuation owned by the audio controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioTask {
    /// Lower the volume by one ramp step.
    FadeStep,
    /// Halt and rewind the track.
    Stop,
}

/// Deferred continuation owned by the icon micro-interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IconTask {
    /// Clear the shake effect.
    EndShake,
    /// Hide the fallen icon for good.
    Hide,
}

/// Any scheduled continuation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "owner", content = "task", rename_all = "snake_case")]
pub enum Task {
    /// Gate continuation.
    Gate(GateTask),
    /// Audio continuation.
    Audio(AudioTask),
    /// Icon continuation.
    Icon(IconTask),
}

/// Single-threaded timer queue.
///
/// Tasks fire in deadline order; tasks sharing a deadline fire in scheduling order.
#[derive(Debug, Default)]
pub struct Timeline {
    queue: BTreeMap<(Timestamp, TaskHandle), Task>,
    deadlines: HashMap<TaskHandle, Timestamp>,
    next_id: u64,
}

impl Timeline {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to fire at `at`.
    pub fn schedule(&mut self, at: Timestamp, task: Task) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.queue.insert((at, handle), task);
        self.deadlines.insert(handle, at);
        handle
    }

    /// Schedule `task` to fire `delay` after `now`.
    pub fn schedule_after(&mut self, now: Timestamp, delay: Millis, task: Task) -> TaskHandle {
        self.schedule(now + delay, task)
    }

    /// Cancel a pending task. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let Some(at) = self.deadlines.remove(&handle) else {
            return false;
        };
        self.queue.remove(&(at, handle)).is_some()
    }

    /// Drop every pending task.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.deadlines.clear();
    }

    /// Return `true` while `handle` is still waiting to fire.
    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.deadlines.contains_key(&handle)
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.queue.keys().next().map(|(at, _)| *at)
    }

    /// Remove and return the earliest task due at or before `now`.
    pub fn pop_due(&mut self, now: Timestamp) -> Option<(Timestamp, TaskHandle, Task)> {
        let (&(at, handle), _) = self.queue.iter().next()?;
        if at > now {
            return None;
        }
        let task = self.queue.remove(&(at, handle))?;
        self.deadlines.remove(&handle);
        Some((at, handle, task))
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Return `true` when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pending tasks in firing order.
    pub fn pending(&self) -> impl Iterator<Item = (Timestamp, Task)> + '_ {
        self.queue.iter().map(|((at, _), task)| (*at, *task))
    }
}
