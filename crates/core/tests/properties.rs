use lyric_motion_core::{
    AnimationScheduler, EngineConfig, LineClassifier, LineState, LyricLine, LyricsDocument,
    Spring, SpringConfig, Transition,
};
use proptest::prelude::*;

fn document_strategy() -> impl Strategy<Value = Vec<LyricLine>> {
    prop::collection::vec(0.0f32..6.0, 1..40).prop_map(|gaps| {
        let mut time = 0.0;
        gaps.into_iter()
            .enumerate()
            .map(|(i, gap)| {
                time += gap;
                LyricLine::new(time, format!("line {i}"))
            })
            .collect()
    })
}

fn rank(state: LineState) -> u8 {
    match state {
        LineState::Future => 0,
        LineState::Active => 1,
        LineState::Past => 2,
    }
}

proptest! {
    #[test]
    fn classification_is_deterministic(
        lines in document_strategy(),
        index in 0usize..40,
        time in -5.0f32..250.0,
    ) {
        let classifier = LineClassifier::default();
        let first = classifier.classify(&lines, index, time);
        let second = classifier.classify(&lines, index, time);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn states_only_move_forward_as_time_advances(lines in document_strategy()) {
        let classifier = LineClassifier::default();
        let end = lines.last().map_or(0.0, |line| line.time) + 5.0;

        for index in 0..lines.len() {
            let mut previous = 0;
            let mut time = -2.0f32;
            while time <= end {
                let current = rank(classifier.classify(&lines, index, time).state);
                prop_assert!(current >= previous, "line {} went backwards at t={}", index, time);
                previous = current;
                time += 0.1;
            }
        }
    }

    #[test]
    fn at_most_one_line_is_active(lines in document_strategy(), time in -5.0f32..250.0) {
        let classifier = LineClassifier::default();
        let active = (0..lines.len())
            .filter(|&i| classifier.classify(&lines, i, time).state == LineState::Active)
            .count();
        prop_assert!(active <= 1);
        prop_assert_eq!(active == 1, classifier.active_index(&lines, time).is_some());
    }

    #[test]
    fn active_progress_stays_in_unit_range(
        lines in document_strategy(),
        index in 0usize..40,
        time in -5.0f32..250.0,
    ) {
        let classifier = LineClassifier::default();
        let c = classifier.classify(&lines, index, time);
        if c.state == LineState::Active {
            prop_assert!((0.0..=1.0).contains(&c.progress));
            prop_assert!(c.duration > 0.0);
        }
    }

    #[test]
    fn springs_come_to_rest(
        stiffness in 1.0f32..1.0e5,
        damping_ratio in 0.3f32..3.0,
        mass in 0.01f32..10.0,
        start in -1.0f32..1.0,
        goal in -1.0f32..1.0,
        dt in prop_oneof![Just(0.016f32), Just(0.05f32)],
    ) {
        let damping = damping_ratio * 2.0 * (stiffness * mass).sqrt();
        let config = SpringConfig::new(stiffness, damping, mass, 0.001).unwrap();
        prop_assert!((config.damping_ratio() - damping_ratio).abs() < 1e-3);

        let mut spring = Spring::new(start, config);
        spring.set_goal(goal, Transition::Continuous);

        let steps = (0..20_000).take_while(|_| {
            spring.step(dt);
            !spring.is_at_rest()
        }).count();

        prop_assert!(steps < 20_000);
        prop_assert_eq!(spring.value(), goal);
    }

    #[test]
    fn springs_stay_finite_and_bounded(
        stiffness in 0.1f32..1.0e5,
        damping in 0.1f32..1.0e4,
        mass in 0.01f32..10.0,
        start in -1.0f32..1.0,
        goal in -1.0f32..1.0,
        dt in prop_oneof![Just(0.016f32), Just(0.05f32)],
    ) {
        let config = SpringConfig::new(stiffness, damping, mass, 0.001).unwrap();
        let mut spring = Spring::new(start, config);
        spring.set_goal(goal, Transition::Continuous);

        let reach = 1.5 * (start - goal).abs() + config.precision();
        for _ in 0..200 {
            let value = spring.step(dt);
            prop_assert!(value.is_finite());
            prop_assert!((value - goal).abs() <= reach, "value {} escaped goal {}", value, goal);
        }
    }

    #[test]
    fn snap_needs_no_steps(start in -10.0f32..10.0, goal in -10.0f32..10.0) {
        let mut spring = Spring::new(start, SpringConfig::SMOOTH);
        spring.set_goal(goal, Transition::Snap);
        prop_assert_eq!(spring.value(), goal);
        prop_assert!(spring.is_at_rest());
    }

    #[test]
    fn stepped_lines_are_bounded_by_range(
        count in 1usize..400,
        range in 0usize..8,
        time in -1.0f32..1_300.0,
    ) {
        let lines = (0..count)
            .map(|i| LyricLine::new(i as f32 * 3.0, format!("line {i}")))
            .collect();
        let mut scheduler = AnimationScheduler::new(EngineConfig {
            animation_range: range,
            ..EngineConfig::default()
        })
        .unwrap();
        scheduler.set_document(Some(LyricsDocument::synced(lines, "prop")));
        scheduler.set_current_time(time);
        scheduler.tick(0.016);

        let stats = scheduler.stats();
        prop_assert!(stats.stepped_lines <= 2 * range + 1);
        prop_assert_eq!(stats.stepped_lines + stats.assigned_lines, count);
        if stats.active_index.is_none() {
            prop_assert_eq!(stats.stepped_lines, 0);
        }
    }
}
