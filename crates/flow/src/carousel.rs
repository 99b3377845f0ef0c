//! Drag/snap carousel shared by the timeline and the orbital selector.
//!
//! Offsets are percentages of one item's width: item `i` is centred at
//! `-i * 100`. While idle the offset always equals `-active_index * 100`;
//! only a drag moves it in between.

use std::time::Duration;

use serde::Serialize;

pub const DEFAULT_SNAP_DURATION: Duration = Duration::from_millis(300);

/// Snapshot of the carousel for presenters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselState {
    pub active_index: usize,
    pub item_count: usize,
    pub drag_offset_percent: f64,
    pub is_dragging: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    start_x: f64,
    start_offset: f64,
    track_width: f64,
}

/// Eased move between two offsets, started by a click or snap.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Transition {
    from: f64,
    to: f64,
}

#[derive(Debug, Clone)]
pub struct GestureCarousel {
    item_count: usize,
    active_index: usize,
    offset: f64,
    drag: Option<Drag>,
    transition: Option<Transition>,
    snap_duration: Duration,
}

impl GestureCarousel {
    pub fn new(item_count: usize) -> Self {
        Self {
            item_count,
            active_index: 0,
            offset: 0.0,
            drag: None,
            transition: None,
            snap_duration: DEFAULT_SNAP_DURATION,
        }
    }

    pub fn with_snap_duration(mut self, duration: Duration) -> Self {
        self.snap_duration = duration;
        self
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    /// Current offset in percent. During a drag this follows the pointer.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn snap_duration(&self) -> Duration {
        self.snap_duration
    }

    pub fn state(&self) -> CarouselState {
        CarouselState {
            active_index: self.active_index,
            item_count: self.item_count,
            drag_offset_percent: self.offset,
            is_dragging: self.is_dragging(),
        }
    }

    fn min_offset(&self) -> f64 {
        -(self.item_count.saturating_sub(1) as f64) * 100.0
    }

    fn last_index(&self) -> usize {
        self.item_count.saturating_sub(1)
    }

    /// Node click. Sets the active index immediately and starts an eased
    /// transition. Ignored while dragging or when `index` is out of range.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if self.is_dragging() || index >= self.item_count {
            return false;
        }
        self.settle_at(index);
        true
    }

    pub fn next(&mut self) -> bool {
        self.jump_to(self.active_index + 1)
    }

    pub fn prev(&mut self) -> bool {
        match self.active_index.checked_sub(1) {
            Some(index) => self.jump_to(index),
            None => false,
        }
    }

    /// Start dragging at pointer `x` over a track `track_width` pixels wide.
    /// The drag picks up from the settled offset; use
    /// [`GestureCarousel::pointer_down_after`] to grab an in-flight snap.
    pub fn pointer_down(&mut self, x: f64, track_width: f64) {
        self.begin_drag(x, track_width, self.offset);
    }

    /// Like [`GestureCarousel::pointer_down`], but the drag starts from where
    /// the current transition is rendered `elapsed` after it began.
    pub fn pointer_down_after(&mut self, x: f64, track_width: f64, elapsed: Duration) {
        let rendered = self.offset_at(elapsed);
        self.begin_drag(x, track_width, rendered);
    }

    fn begin_drag(&mut self, x: f64, track_width: f64, start_offset: f64) {
        if self.item_count == 0 || track_width.is_nan() || track_width <= 0.0 {
            return;
        }
        self.transition = None;
        self.offset = start_offset;
        self.drag = Some(Drag {
            start_x: x,
            start_offset,
            track_width,
        });
    }

    pub fn pointer_move(&mut self, x: f64) {
        let Some(drag) = self.drag else {
            return;
        };
        let delta = (x - drag.start_x) / drag.track_width * 100.0;
        self.offset = (drag.start_offset + delta).clamp(self.min_offset(), 0.0);
    }

    /// Release: snap to the nearest item. Returns the new active index.
    pub fn pointer_up(&mut self) -> usize {
        if self.drag.take().is_some() {
            let nearest = (-self.offset / 100.0).round().max(0.0) as usize;
            self.settle_at(nearest.min(self.last_index()));
        }
        self.active_index
    }

    pub fn pointer_cancel(&mut self) -> usize {
        self.pointer_up()
    }

    fn settle_at(&mut self, index: usize) {
        let target = -(index as f64) * 100.0;
        self.transition = Some(Transition {
            from: self.offset,
            to: target,
        });
        self.active_index = index;
        self.offset = target;
    }

    /// Rendered offset `elapsed` into the most recent transition
    /// (ease-out cubic over the snap duration).
    pub fn offset_at(&self, elapsed: Duration) -> f64 {
        match self.transition {
            Some(Transition { from, to }) if !self.is_dragging() => {
                let total = self.snap_duration.as_secs_f64();
                let t = if total > 0.0 {
                    (elapsed.as_secs_f64() / total).min(1.0)
                } else {
                    1.0
                };
                from + (to - from) * ease_out_cubic(t)
            }
            _ => self.offset,
        }
    }

    /// How far along the track the carousel sits, 0 at the first item and
    /// 100 at the last.
    pub fn progress_percent(&self) -> f64 {
        let span = -self.min_offset();
        if span == 0.0 {
            return 100.0;
        }
        (-self.offset / span * 100.0).clamp(0.0, 100.0)
    }

    /// One flag per item, true for the active one.
    pub fn indicator_dots(&self) -> Vec<bool> {
        (0..self.item_count).map(|i| i == self.active_index).collect()
    }
}

pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}
