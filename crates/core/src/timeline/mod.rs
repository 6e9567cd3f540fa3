//! Host-side timing: a playback clock, scripted playback events, and the
//! frame loop that pumps an [`AnimationScheduler`].

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::AnimationScheduler;

/// Stand-in for the media player's position and play state.
#[derive(Debug, Default, Clone)]
pub struct PlaybackClock {
    pub time_seconds: f32,
    pub playing: bool,
}

impl PlaybackClock {
    pub fn playing_from(time_seconds: f32) -> Self {
        Self {
            time_seconds,
            playing: true,
        }
    }

    /// Moves the clock forward while playing.
    pub fn advance(&mut self, delta: f32) {
        if self.playing {
            self.time_seconds = (self.time_seconds + delta).max(0.0);
        }
    }

    pub fn seek(&mut self, time_seconds: f32) {
        self.time_seconds = time_seconds.max(0.0);
    }

    pub fn apply(&mut self, action: PlaybackAction) {
        match action {
            PlaybackAction::Play => self.playing = true,
            PlaybackAction::Pause => self.playing = false,
            PlaybackAction::Seek { to } => self.seek(to),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum PlaybackAction {
    Play,
    Pause,
    Seek { to: f32 },
}

/// A playback action fired once `at_seconds` of loop time have elapsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub at_seconds: f32,
    #[serde(flatten)]
    pub action: PlaybackAction,
}

impl ScheduledEvent {
    pub fn new(at_seconds: f32, action: PlaybackAction) -> Self {
        Self { at_seconds, action }
    }
}

/// Ordered list of scripted playback events with a cursor.
#[derive(Debug, Default, Clone)]
pub struct PlaybackScript {
    events: Vec<ScheduledEvent>,
    next_event: usize,
}

impl PlaybackScript {
    pub fn new(events: Vec<ScheduledEvent>) -> Self {
        let mut script = Self::default();
        script.set_events(events);
        script
    }

    pub fn set_events(&mut self, events: Vec<ScheduledEvent>) {
        self.events = events;
        self.events
            .sort_by(|a, b| a.at_seconds.total_cmp(&b.at_seconds));
        self.next_event = 0;
    }

    /// Returns the actions that became due at `elapsed`, advancing the cursor.
    pub fn take_due(&mut self, elapsed: f32) -> Vec<PlaybackAction> {
        let due = self.events[self.next_event..]
            .iter()
            .take_while(|event| event.at_seconds <= elapsed)
            .map(|event| event.action)
            .collect::<Vec<_>>();
        self.next_event += due.len();
        due
    }

    pub fn is_finished(&self) -> bool {
        self.next_event >= self.events.len()
    }
}

/// Source of frame deltas, in seconds. `None` ends the loop.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<f32>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Option<f32> {
        (**self).next_frame()
    }
}

/// Fixed-step frames for tests and offline simulation.
#[derive(Debug, Clone)]
pub struct ManualFrames {
    dt: f32,
    remaining: usize,
}

impl ManualFrames {
    pub fn new(dt: f32, frames: usize) -> Self {
        Self {
            dt,
            remaining: frames,
        }
    }

    pub fn at_fps(fps: u32, seconds: f32) -> Self {
        let fps = fps.max(1);
        let frames = (seconds.max(0.0) * fps as f32).ceil() as usize;
        Self::new(1.0 / fps as f32, frames)
    }
}

impl FrameSource for ManualFrames {
    fn next_frame(&mut self) -> Option<f32> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.dt)
    }
}

/// Wall-clock frames paced by a fixed interval.
#[derive(Debug, Clone)]
pub struct RealtimeFrames {
    interval: Duration,
    deadline: Option<Instant>,
    last: Option<Instant>,
}

impl RealtimeFrames {
    pub fn new(fps: u32, seconds: f32) -> Self {
        let interval = Duration::from_secs_f32(1.0 / fps.max(1) as f32);
        let deadline = Duration::try_from_secs_f32(seconds.max(0.0))
            .ok()
            .and_then(|span| Instant::now().checked_add(span));
        Self {
            interval,
            deadline,
            last: None,
        }
    }
}

impl FrameSource for RealtimeFrames {
    fn next_frame(&mut self) -> Option<f32> {
        let last = *self.last.get_or_insert_with(Instant::now);
        let due = last + self.interval;
        let now = Instant::now();
        if due > now {
            std::thread::sleep(due - now);
        }

        let now = Instant::now();
        if self.deadline.is_some_and(|deadline| now >= deadline) {
            return None;
        }
        self.last = Some(now);
        Some(now.duration_since(last).as_secs_f32())
    }
}

/// Summary of one [`FrameLoop::drive`] run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LoopReport {
    /// Frames the scheduler actually ticked.
    pub ticks: usize,
    /// Loop time consumed, ticked or not.
    pub elapsed: f32,
    /// The scheduler went idle with no scripted events left.
    pub went_idle: bool,
}

/// Pumps a scheduler with frames until it goes idle or the source runs dry.
#[derive(Debug, Clone, Copy)]
pub struct FrameLoop {
    max_frames: usize,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self {
            max_frames: usize::MAX,
        }
    }
}

impl FrameLoop {
    pub fn with_max_frames(max_frames: usize) -> Self {
        Self { max_frames }
    }

    pub fn drive<S, F>(
        &self,
        scheduler: &mut AnimationScheduler,
        source: &mut S,
        clock: &mut PlaybackClock,
        script: &mut PlaybackScript,
        mut on_frame: F,
    ) -> LoopReport
    where
        S: FrameSource,
        F: FnMut(&AnimationScheduler),
    {
        let mut report = LoopReport::default();
        scheduler.sync_playback(clock.time_seconds, clock.playing);

        while report.ticks < self.max_frames {
            let pending = scheduler.pending_frame();
            if pending.is_none() && script.is_finished() {
                report.went_idle = true;
                break;
            }
            let Some(dt) = source.next_frame() else {
                break;
            };
            report.elapsed += dt;
            clock.advance(dt);

            for action in script.take_due(report.elapsed) {
                tracing::debug!(?action, elapsed = report.elapsed, "playback event");
                clock.apply(action);
                if let PlaybackAction::Seek { .. } = action {
                    scheduler.seek(clock.time_seconds);
                }
            }
            scheduler.sync_playback(clock.time_seconds, clock.playing);

            // Events may have woken an idle scheduler; otherwise keep waiting.
            if let Some(token) = pending.or_else(|| scheduler.pending_frame()) {
                scheduler.run_frame(token, dt);
                report.ticks += 1;
                on_frame(scheduler);
            }
        }

        tracing::debug!(
            ticks = report.ticks,
            elapsed = report.elapsed,
            went_idle = report.went_idle,
            "frame loop finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LyricLine, LyricsDocument};

    fn document() -> LyricsDocument {
        LyricsDocument::synced(
            vec![
                LyricLine::new(0.0, "a"),
                LyricLine::new(2.0, "b"),
                LyricLine::new(5.0, "c"),
            ],
            "test",
        )
    }

    #[test]
    fn clock_only_advances_while_playing() {
        let mut clock = PlaybackClock::default();
        clock.advance(1.0);
        assert_eq!(clock.time_seconds, 0.0);

        clock.apply(PlaybackAction::Play);
        clock.advance(1.0);
        clock.apply(PlaybackAction::Seek { to: -4.0 });
        assert_eq!(clock.time_seconds, 0.0);
    }

    #[test]
    fn script_releases_events_in_time_order() {
        let mut script = PlaybackScript::new(vec![
            ScheduledEvent::new(2.0, PlaybackAction::Pause),
            ScheduledEvent::new(1.0, PlaybackAction::Seek { to: 8.0 }),
        ]);

        assert!(script.take_due(0.5).is_empty());
        assert_eq!(script.take_due(1.5), vec![PlaybackAction::Seek { to: 8.0 }]);
        assert_eq!(script.take_due(9.0), vec![PlaybackAction::Pause]);
        assert!(script.is_finished());
    }

    #[test]
    fn scheduled_events_deserialize() {
        let events: Vec<ScheduledEvent> = serde_json::from_str(
            r#"[{ "at_seconds": 1.0, "action": "seek", "to": 3.5 }, { "at_seconds": 2.0, "action": "pause" }]"#,
        )
        .unwrap();

        assert_eq!(events[0].action, PlaybackAction::Seek { to: 3.5 });
        assert_eq!(events[1].action, PlaybackAction::Pause);
    }

    #[test]
    fn manual_frames_cover_requested_span() {
        let mut frames = ManualFrames::at_fps(60, 0.5);
        let mut count = 0;
        while frames.next_frame().is_some() {
            count += 1;
        }
        assert_eq!(count, 30);
    }

    #[test]
    fn playback_drives_until_the_source_ends() {
        let mut scheduler = AnimationScheduler::default();
        scheduler.set_document(Some(document()));
        let mut clock = PlaybackClock::playing_from(0.5);
        let mut frames = ManualFrames::at_fps(50, 3.0);
        let mut script = PlaybackScript::default();
        let mut seen = Vec::new();

        let report = FrameLoop::default().drive(
            &mut scheduler,
            &mut frames,
            &mut clock,
            &mut script,
            |s| seen.push(s.active_index()),
        );

        assert_eq!(report.ticks, 150);
        assert!(!report.went_idle);
        assert_eq!(seen.first(), Some(&Some(0)));
        assert_eq!(seen.last(), Some(&Some(1)));
    }

    #[test]
    fn frame_budget_caps_the_run() {
        let mut scheduler = AnimationScheduler::default();
        scheduler.set_document(Some(document()));
        let mut clock = PlaybackClock::playing_from(0.5);
        let mut frames = ManualFrames::at_fps(60, 10.0);

        let report = FrameLoop::with_max_frames(12).drive(
            &mut scheduler,
            &mut frames,
            &mut clock,
            &mut PlaybackScript::default(),
            |_| {},
        );

        assert_eq!(report.ticks, 12);
        assert!(!report.went_idle);
        assert!(scheduler.is_running());
    }

    #[test]
    fn paused_playback_goes_idle() {
        let mut scheduler = AnimationScheduler::default();
        scheduler.set_document(Some(document()));
        let mut clock = PlaybackClock {
            time_seconds: 1.0,
            playing: false,
        };
        let mut frames = ManualFrames::at_fps(60, 10.0);

        let report = FrameLoop::default().drive(
            &mut scheduler,
            &mut frames,
            &mut clock,
            &mut PlaybackScript::default(),
            |_| {},
        );

        assert!(report.went_idle);
        assert!(report.ticks < 600);
        assert!(!scheduler.is_running());
    }

    #[test]
    fn scripted_seek_wakes_an_idle_scheduler() {
        let mut scheduler = AnimationScheduler::default();
        scheduler.set_document(Some(document()));
        let mut clock = PlaybackClock::default();
        let mut frames = ManualFrames::at_fps(60, 10.0);
        let mut script =
            PlaybackScript::new(vec![ScheduledEvent::new(5.0, PlaybackAction::Seek { to: 6.0 })]);

        let report = FrameLoop::default().drive(
            &mut scheduler,
            &mut frames,
            &mut clock,
            &mut script,
            |_| {},
        );

        assert!(report.went_idle);
        assert_eq!(scheduler.active_index(), Some(2));
        assert!(report.elapsed >= 5.0);
    }
}
