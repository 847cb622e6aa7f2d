//! Timeline driver
//!
//! A [`Timeline`] owns the root of an animation tree together with the
//! engine configuration and curve cache, and exposes the public playback
//! contract: play, pause, stop, seek and per-frame ticking.

use crate::config::EngineConfig;
use crate::context::TimingContext;
use crate::duration::Duration;
use crate::node::Animation;
use crate::options::AnimationOptions;
use crate::phase::Phase;
use crate::playback::Step;
use crate::position::Position;

/// Drives an animation tree
pub struct Timeline {
    root: Animation,
    options: AnimationOptions,
    cx: TimingContext,
}

impl Timeline {
    pub fn new(root: Animation) -> Self {
        Self::with_config(root, EngineConfig::default())
    }

    /// Create a timeline and resolve its schedule
    pub fn with_config(root: Animation, config: EngineConfig) -> Self {
        let mut timeline = Self {
            root,
            options: AnimationOptions::default(),
            cx: TimingContext::new(config),
        };
        timeline.resolve();
        timeline
    }

    fn resolve(&mut self) {
        self.root.playback_mut().overrides = self.options;
        let duration = self.root_duration();
        self.root.resolve(duration, None, None, &mut self.cx);
        tracing::debug!(
            duration,
            options = ?self.options,
            "resolved timeline schedule"
        );
    }

    /// Explicit absolute duration, then the tree's natural one, then the default
    fn root_duration(&self) -> f64 {
        match self.root.declared_duration() {
            Some(Duration::Absolute(seconds)) => seconds,
            declared => {
                if declared.is_some() {
                    tracing::debug!("relative duration at the root has no parent, ignoring");
                }
                self.root
                    .natural_duration()
                    .unwrap_or(self.cx.config().default_duration)
            }
        }
    }

    /// Play from the current position.
    ///
    /// `options` are merged into the stored ones and the schedule is
    /// recomputed when that changes anything. A timeline that completed at
    /// the end of the requested direction restarts from its beginning.
    pub fn play(&mut self, options: AnimationOptions) {
        let merged = options.or(self.options);
        if merged != self.options {
            self.options = merged;
            self.resolve();
        }

        let reversed = self.options.reversed();
        if self.root.phase().is_finished() {
            let at_end = if reversed {
                self.root.progress() <= 0.0
            } else {
                self.root.progress() >= 1.0
            };
            if at_end {
                let restart = if reversed { 1.0 } else { 0.0 };
                self.root.seek(restart, &mut self.cx);
            }
        }

        self.root.start(reversed);
        tracing::debug!(reversed, progress = self.root.progress(), "play");
        // Zero-length subtrees complete right away
        self.flush();
    }

    /// Freeze in place, a later [`play`](Self::play) resumes
    pub fn pause(&mut self) {
        self.root.pause();
    }

    /// Resolve to a final frame and report completion.
    ///
    /// The tree settles at `at` when given, otherwise where it currently is.
    /// Completion fires once; stopping an already stopped or completed
    /// timeline does nothing.
    pub fn stop(&mut self, at: Option<Position>) {
        tracing::debug!(?at, "stop");
        self.root.halt(at.map(|position| position.progress()), &mut self.cx);
    }

    pub fn position(&self) -> Position {
        self.root.position()
    }

    /// Jump without animating. A paused or idle timeline stays put, a
    /// playing one carries on from the new position.
    pub fn set_position(&mut self, position: Position) {
        let was_playing = self.root.phase().is_playing();
        self.root.seek(position.progress(), &mut self.cx);
        if was_playing {
            self.root.start(self.options.reversed());
            self.flush();
        }
    }

    /// Advance by `dt` seconds, returns the phase afterwards
    pub fn tick(&mut self, dt: f64) -> Phase {
        if self.root.phase().is_playing() {
            let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
            if let Step::Finished { completed, leftover } = self.root.advance(dt, &mut self.cx) {
                tracing::debug!(completed, leftover, "timeline finished");
            }
        }
        self.root.phase()
    }

    fn flush(&mut self) {
        if let Step::Finished { completed, .. } = self.root.advance(0.0, &mut self.cx) {
            tracing::debug!(completed, "timeline finished on start");
        }
    }

    /// Register a callback fired when the root completes
    pub fn on_complete(&mut self, callback: impl FnMut(bool) + 'static) {
        self.root.add_completion(callback);
    }

    pub fn phase(&self) -> Phase {
        self.root.phase()
    }

    pub fn is_reversed(&self) -> bool {
        self.options.reversed()
    }

    /// Resolved duration of the root in seconds
    pub fn duration(&self) -> f64 {
        self.root.resolved_duration()
    }

    /// Options merged from every play request so far
    pub fn options(&self) -> AnimationOptions {
        self.options
    }

    pub fn root(&self) -> &Animation {
        &self.root
    }

    pub fn context(&self) -> &TimingContext {
        &self.cx
    }

    /// Give the tree back, e.g. to nest it in another composite
    pub fn into_animation(self) -> Animation {
        let mut root = self.root;
        root.playback_mut().overrides = AnimationOptions::default();
        root.with_options(self.options)
    }
}
