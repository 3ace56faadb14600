use std::time::Duration;

use dot_estimate_core::{
    DemotionChoice, DemotionPolicy, DifficultyPhase, DotRange, DriftSpeed, Event, GameConfig, Level,
    PromotionChoice, RoundPhase, Shape, ShapeMode, StreakTally, TimeLimit, NEXT_ROUND_DELAY,
};
use dot_estimate_system_session::GameController;
use dot_estimate_world::query;

fn started(config: GameConfig) -> GameController {
    let mut controller = GameController::new(&config);
    controller.start_session();
    let _ = controller.drain_events();
    controller
}

fn at_level(level: u32) -> GameController {
    started(GameConfig {
        starting_level: Level::new(level),
        seed: 0x00c0_ffee,
        ..GameConfig::default()
    })
}

fn true_count(controller: &GameController) -> u32 {
    query::true_count(controller.world()).expect("live round")
}

fn answer(controller: &mut GameController, correct: bool) {
    let truth = true_count(controller);
    let guess = if correct {
        truth
    } else {
        controller
            .snapshot()
            .guess_candidates
            .into_iter()
            .find(|candidate| *candidate != truth)
            .expect("a wrong candidate exists")
    };
    controller.submit_guess(Some(guess));
}

fn seconds(value: u64) -> Duration {
    Duration::from_secs(value)
}

#[test]
fn level_one_offers_every_count_from_one_to_four() {
    let mut controller = at_level(1);

    for _ in 0..20 {
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.guess_candidates, vec![1, 2, 3, 4]);
        assert!(snapshot.guess_candidates.contains(&true_count(&controller)));
        controller.submit_guess(Some(2));
        controller.advance(NEXT_ROUND_DELAY);
        if controller.snapshot().phase != DifficultyPhase::Active {
            controller.dismiss_choice();
        }
    }
}

#[test]
fn level_five_offers_five_through_ten() {
    let mut controller = at_level(5);

    let snapshot = controller.snapshot();
    assert_eq!(
        snapshot.progress.dot_range(),
        DotRange::new(5, 10).expect("valid range")
    );
    assert_eq!(snapshot.guess_candidates, vec![5, 6, 7, 8, 9, 10]);
    assert_eq!(snapshot.entities.len() as u32, true_count(&controller));
}

#[test]
fn five_correct_answers_offer_promotion() {
    let mut controller = at_level(3);

    for round in 0..5 {
        answer(&mut controller, true);
        if round < 4 {
            controller.advance(NEXT_ROUND_DELAY);
        }
    }

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.phase, DifficultyPhase::AwaitingPromotionChoice);
    assert_eq!(snapshot.progress.streak(), StreakTally::default());
    assert_eq!(snapshot.progress.session_score(), 5);
    assert!(snapshot.paused);
    assert!(snapshot.promotion_options.is_some());

    let waiting_round = controller.current_round();
    controller.advance(seconds(3));
    assert_eq!(controller.current_round(), waiting_round);

    controller.choose_promotion(PromotionChoice::MoreDots);

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.progress.level(), Level::new(4));
    assert_eq!(snapshot.phase, DifficultyPhase::Active);
    assert!(!snapshot.paused);
    assert_ne!(controller.current_round(), waiting_round);
    assert_eq!(snapshot.round_phase, Some(RoundPhase::Running));
}

#[test]
fn weak_window_demotes_and_offers_dialog() {
    let mut controller = at_level(3);

    answer(&mut controller, true);
    for _ in 0..4 {
        controller.advance(NEXT_ROUND_DELAY);
        answer(&mut controller, false);
    }

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.progress.level(), Level::new(2));
    assert_eq!(
        snapshot.progress.dot_range(),
        DotRange::new(2, 6).expect("valid range")
    );
    assert_eq!(snapshot.phase, DifficultyPhase::AwaitingDemotionChoice);
    let options = snapshot.demotion_options.expect("dialog offered");
    assert!(options.down_level && options.more_time && !options.slower_drift);

    controller.choose_demotion(DemotionChoice::MoreTime);
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.progress.time_limit(), TimeLimit::from_secs(8));
    assert_eq!(snapshot.remaining_seconds, 8);
}

#[test]
fn immediate_policy_demotes_and_keeps_playing() {
    let mut controller = started(GameConfig {
        starting_level: Level::new(3),
        demotion_policy: DemotionPolicy::Immediate,
        seed: 0x00c0_ffee,
        ..GameConfig::default()
    });

    for round in 0..5 {
        answer(&mut controller, false);
        if round < 4 {
            controller.advance(NEXT_ROUND_DELAY);
        }
    }
    let demoted_round = controller.current_round();

    let events = controller.drain_events();
    let demoted_at = events
        .iter()
        .position(|event| {
            matches!(
                event,
                Event::Demoted { from, to } if *from == Level::new(3) && *to == Level::new(2)
            )
        })
        .expect("demotion recorded");
    assert!(events[demoted_at..]
        .iter()
        .any(|event| matches!(event, Event::NextRoundScheduled { .. })));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::DemotionOffered { .. })));

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.phase, DifficultyPhase::Active);
    assert_eq!(snapshot.demotion_options, None);
    assert!(!snapshot.paused);
    assert_eq!(snapshot.progress.level(), Level::new(2));

    controller.advance(NEXT_ROUND_DELAY);

    assert_ne!(controller.current_round(), demoted_round);
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.round_phase, Some(RoundPhase::Running));
    assert!(DotRange::new(2, 6)
        .expect("valid range")
        .contains(true_count(&controller)));
}

#[test]
fn countdown_expiry_records_no_answer_and_moves_on() {
    let mut controller = at_level(3);
    let first = controller.current_round();

    controller.advance(seconds(7));
    let events = controller.drain_events();

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::RoundTimedOut { .. })));
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.progress.session_total(), 0);
    assert_eq!(snapshot.progress.streak().incorrect(), 1);
    assert_eq!(snapshot.message, None);
    assert_eq!(controller.current_round(), first);

    controller.advance(NEXT_ROUND_DELAY);
    assert_ne!(controller.current_round(), first);
    assert_eq!(controller.snapshot().remaining_seconds, 7);
}

#[test]
fn explicit_timeout_behaves_like_expiry() {
    let mut controller = at_level(3);

    controller.timeout();

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.round_phase, Some(RoundPhase::TimedOut));
    assert_eq!(snapshot.remaining_seconds, 0);
    assert_eq!(snapshot.progress.streak().incorrect(), 1);
}

#[test]
fn restarting_a_round_twice_leaves_one_countdown() {
    let mut controller = at_level(3);

    controller.start_round();
    controller.start_round();
    let _ = controller.drain_events();
    controller.advance(seconds(1));

    let events = controller.drain_events();
    let ticks: Vec<_> = events
        .iter()
        .filter(|event| matches!(event, Event::CountdownAdvanced { .. }))
        .collect();
    assert_eq!(ticks.len(), 1);
    assert_eq!(controller.snapshot().remaining_seconds, 6);
}

#[test]
fn pause_freezes_and_resume_continues() {
    let mut controller = at_level(3);

    controller.advance(seconds(2));
    controller.pause();
    controller.advance(seconds(10));
    assert_eq!(controller.snapshot().remaining_seconds, 5);
    assert!(!controller.snapshot().guesses_enabled);

    controller.resume();
    controller.advance(Duration::from_millis(999));
    assert_eq!(controller.snapshot().remaining_seconds, 5);
    controller.advance(Duration::from_millis(1));
    assert_eq!(controller.snapshot().remaining_seconds, 4);
}

#[test]
fn accepted_guess_freezes_countdown() {
    let mut controller = at_level(3);
    controller.advance(seconds(1));

    answer(&mut controller, true);
    controller.advance(Duration::from_millis(200));

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.remaining_seconds, 6);
    assert!(!snapshot.guesses_enabled);
}

#[test]
fn drifting_rounds_move_until_paused() {
    let mut controller = started(GameConfig {
        drift_speed: DriftSpeed::new(2.0),
        ..GameConfig::default()
    });
    assert!(controller
        .snapshot()
        .entities
        .iter()
        .all(|entity| entity.drift.is_some()));

    controller.advance(Duration::from_millis(50));
    let events = controller.drain_events();
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::EntitiesDrifted { .. })));

    controller.pause();
    let frozen = controller.snapshot().entities;
    controller.advance(Duration::from_millis(500));
    assert_eq!(controller.snapshot().entities, frozen);
    assert!(!controller
        .drain_events()
        .iter()
        .any(|event| matches!(event, Event::EntitiesDrifted { .. })));
}

#[test]
fn raising_drift_speed_moves_the_live_round() {
    let mut controller = at_level(4);
    let round = controller.current_round();
    let before = controller.snapshot().entities;
    assert!(before.iter().all(|entity| entity.drift.is_some()));

    controller.set_drift_speed(DriftSpeed::new(2.0));
    controller.advance(Duration::from_millis(500));

    assert_eq!(controller.current_round(), round);
    let after = controller.snapshot().entities;
    assert_eq!(after.len(), before.len());
    assert!(after
        .iter()
        .zip(&before)
        .any(|(moved, still)| moved.position != still.position));
    assert!(controller
        .drain_events()
        .iter()
        .any(|event| matches!(event, Event::EntitiesDrifted { .. })));
}

#[test]
fn disabled_drift_keeps_entities_still() {
    let mut controller = at_level(3);
    let before = controller.snapshot().entities;

    controller.advance(Duration::from_millis(900));

    assert_eq!(controller.snapshot().entities, before);
}

#[test]
fn shape_change_restyles_live_round() {
    let mut controller = at_level(4);

    controller.set_shape_mode(ShapeMode::Squares);

    let snapshot = controller.snapshot();
    assert!(snapshot
        .entities
        .iter()
        .all(|entity| entity.shape == Shape::Square));
    assert!(controller
        .drain_events()
        .iter()
        .any(|event| matches!(event, Event::EntitiesRestyled { .. })));
}

#[test]
fn restart_clears_session_counters() {
    let mut controller = at_level(3);
    answer(&mut controller, true);
    controller.advance(NEXT_ROUND_DELAY);
    answer(&mut controller, false);

    controller.restart();

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.progress.session_score(), 0);
    assert_eq!(snapshot.progress.session_total(), 0);
    assert_eq!(snapshot.progress.streak(), StreakTally::default());
    assert_eq!(snapshot.round_phase, Some(RoundPhase::Running));
    assert_eq!(snapshot.message, None);
}

#[test]
fn manual_level_adjustment_floors_at_one() {
    let mut controller = at_level(1);

    controller.lower_level();
    assert_eq!(controller.snapshot().progress.level(), Level::MIN);

    controller.raise_level();
    controller.raise_level();
    let progress = controller.snapshot().progress;
    assert_eq!(progress.level(), Level::new(3));
    assert_eq!(progress.dot_range(), DotRange::new(3, 7).expect("valid range"));
}

#[test]
fn inverted_range_override_keeps_previous_range() {
    let mut controller = at_level(3);

    controller.set_dot_range(8, 2);

    assert_eq!(
        controller.snapshot().progress.dot_range(),
        Level::new(3).dot_range()
    );
    assert!(controller
        .drain_events()
        .iter()
        .any(|event| matches!(event, Event::ConfigurationRejected { .. })));
}
