use lyric_motion_core::{
    AnimationScheduler, EngineConfig, LineClassifier, LineState, LineStyle, LyricLine,
    LyricsDocument, Spring, SpringConfig, Transition,
};

const FRAME: f32 = 0.016;

fn abc() -> LyricsDocument {
    LyricsDocument::synced(
        vec![
            LyricLine::new(0.0, "a"),
            LyricLine::new(2.0, "b"),
            LyricLine::new(5.0, "c"),
        ],
        "scenarios",
    )
}

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn mid_first_line() {
    let doc = abc();
    let classifier = LineClassifier::new(-0.3);

    let first = classifier.classify(doc.lines(), 0, 1.5);
    assert_eq!(first.state, LineState::Active);
    assert_close(first.duration, 2.0);
    assert_close(first.progress, 0.6);

    assert_eq!(classifier.classify(doc.lines(), 1, 1.5).state, LineState::Future);
    assert_eq!(classifier.classify(doc.lines(), 2, 1.5).state, LineState::Future);
}

#[test]
fn past_the_last_timestamp() {
    let doc = abc();
    let classifier = LineClassifier::new(-0.3);

    let last = classifier.classify(doc.lines(), 2, 6.5);
    assert_eq!(last.state, LineState::Active);
    assert_close(last.duration, 3.0);
    assert_close(last.progress, 0.4);
}

#[test]
fn backward_seek_is_recomputed_from_time_alone() {
    let doc = abc();
    let classifier = LineClassifier::new(-0.3);

    let before = classifier.classify(doc.lines(), 0, 1.5);
    let after = classifier.classify(doc.lines(), 0, 0.1);
    assert_eq!(before.state, LineState::Active);
    assert_eq!(after.state, LineState::Future);

    // 0.1 sits inside the timing offset; one step later the first line is back.
    let replay = classifier.classify(doc.lines(), 0, 0.5);
    assert_eq!(replay.state, LineState::Active);
    assert_close(replay.progress, 0.1);

    let mut scheduler = AnimationScheduler::default();
    scheduler.set_document(Some(doc));
    scheduler.set_current_time(1.5);
    scheduler.tick(FRAME);
    scheduler.seek(0.5);
    scheduler.tick(FRAME);

    assert_eq!(scheduler.active_index(), Some(0));
    assert_eq!(scheduler.line_state(0), Some(LineState::Active));
}

#[test]
fn backward_seek_out_of_the_past_snaps() {
    let mut scheduler = AnimationScheduler::default();
    scheduler.set_document(Some(abc()));
    scheduler.set_current_time(4.0);
    while scheduler.tick(FRAME) {}
    assert_eq!(scheduler.line_style(0), Some(LineStyle::PAST));

    scheduler.seek(1.5);
    scheduler.tick(FRAME);

    let style = scheduler.line_style(0).unwrap();
    let expected = lyric_motion_core::EasingCurves::standard().sample(0.6);
    assert_close(style.scale, expected.scale);
    assert_close(style.opacity, expected.opacity);
    assert!(scheduler.line(0).unwrap().is_at_rest());
}

#[test]
fn spring_settles_within_two_seconds() {
    let config = SpringConfig::new(150.0, 28.0, 1.0, 0.01).unwrap();
    let mut spring = Spring::new(0.95, config);
    spring.set_goal(1.0, Transition::Continuous);

    let mut previous = spring.value();
    let mut elapsed = 0.0;
    while !spring.is_at_rest() {
        let value = spring.step(FRAME);
        assert!(value >= previous - 1e-6);
        assert!(value <= 1.005);
        previous = value;
        elapsed += FRAME;
        assert!(elapsed <= 2.0, "still moving after {elapsed}s");
    }
    assert!(elapsed >= 0.1);
}

#[test]
fn three_hundred_lines_step_eleven() {
    let lines = (0..300)
        .map(|i| LyricLine::new(i as f32 * 2.5, format!("line {i}")))
        .collect();
    let mut scheduler = AnimationScheduler::new(EngineConfig {
        animation_range: 5,
        ..EngineConfig::default()
    })
    .unwrap();
    scheduler.set_document(Some(LyricsDocument::synced(lines, "long")));
    scheduler.set_playing(true);

    let mut time = 0.4;
    while time < 300.0 * 2.5 {
        scheduler.set_current_time(time);
        scheduler.tick(FRAME);
        let stats = scheduler.stats();
        let active = stats.active_index.expect("some line is always active");
        let expected = active.min(5) + (299 - active).min(5) + 1;
        assert_eq!(stats.stepped_lines, expected, "active = {active}");
        assert_eq!(stats.stepped_lines + stats.assigned_lines, 300);
        time += 0.7;
    }
}
