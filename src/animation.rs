use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::layout::{Extent, Limits};
use crate::walk::{Frame, Walk};

/// Static figure or animated path growth.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Static,
    Animate,
}

/// Frame counter over a walk of `steps` steps.
///
/// Frame `k` shows every track point up to and including time `k`, so there
/// are `steps + 1` frames and the last one is the complete walk.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    frame: usize,
    frames: usize,
    stride: usize,
    paused: bool,
    pub limits: Limits,
    pub interval: Duration,
}

impl Animation {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(30);

    pub fn new(walk: &Walk, limits: Limits) -> Self {
        Self {
            frame: 0,
            frames: walk.steps() + 1,
            stride: 1,
            paused: false,
            limits,
            interval: Self::DEFAULT_INTERVAL,
        }
    }

    /// Advance by `stride` frames per tick, always ending on the last frame.
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride.max(1);
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn is_finished(&self) -> bool {
        self.frame + 1 >= self.frames
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn restart(&mut self) {
        self.frame = 0;
        self.paused = false;
    }

    /// Moves to the next frame, returning it, or `None` once the last frame
    /// has been shown or while paused.
    pub fn advance(&mut self) -> Option<usize> {
        if self.paused || self.is_finished() {
            return None;
        }
        self.frame = (self.frame + self.stride).min(self.frames - 1);
        Some(self.frame)
    }

    pub fn extent(&self, walk: &Walk) -> Extent {
        self.limits.extent(walk, self.frame)
    }

    pub fn snapshot(&self, walk: &Walk) -> Option<Frame> {
        walk.frame(self.frame)
    }

    /// Every frame index the animation visits, starting at 0.
    pub fn schedule(&self) -> impl Iterator<Item = usize> {
        let mut animation = self.clone();
        animation.restart();
        std::iter::once(0).chain(std::iter::from_fn(move || animation.advance()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walk::{Dimension, WalkParams};

    fn walk(steps: usize) -> Walk {
        Walk::generate(&WalkParams::new(Dimension::Two).with_steps(steps)).unwrap()
    }

    #[test]
    fn advances_one_frame_at_a_time() {
        let walk = walk(3);
        let mut animation = Animation::new(&walk, Limits::Stable);
        assert_eq!(animation.frames(), 4);
        assert_eq!(animation.advance(), Some(1));
        assert_eq!(animation.advance(), Some(2));
        assert_eq!(animation.advance(), Some(3));
        assert!(animation.is_finished());
        assert_eq!(animation.advance(), None);
    }

    #[test]
    fn stride_ends_on_last_frame() {
        let walk = walk(10);
        let animation = Animation::new(&walk, Limits::Growing).with_stride(4);
        assert_eq!(animation.schedule().collect::<Vec<_>>(), vec![0, 4, 8, 10]);
    }

    #[test]
    fn pause_and_restart() {
        let walk = walk(5);
        let mut animation = Animation::new(&walk, Limits::Stable);
        animation.advance();
        animation.toggle_pause();
        assert_eq!(animation.advance(), None);
        assert_eq!(animation.frame(), 1);
        animation.restart();
        assert!(!animation.is_paused());
        assert_eq!(animation.frame(), 0);
        assert_eq!(animation.snapshot(&walk).unwrap().step, 0);
    }
}
