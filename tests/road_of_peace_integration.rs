//! Integration tests for the Road of Peace dialogue
//!
//! Turn alternation, step cap, rewards and the cancelable auto-restart

use std::sync::Arc;

use chrono::Duration;
use peacetalk::core::{CoreConfig, CoupleApp, ManualClock, MemoryStore};
use peacetalk::types::{DialoguePhase, ProfileId, ProfileInput, ReasonCode};
use pretty_assertions::assert_eq;

fn setup() -> (CoupleApp, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let mut app = CoupleApp::new(MemoryStore::new(), clock.clone(), CoreConfig::default());
    app.register(
        "love123",
        "love123",
        &[ProfileInput::new("Alex", "🧑"), ProfileInput::new("Jordan", "👩")],
    )
    .unwrap();
    (app, clock)
}

fn p1() -> ProfileId {
    "profile1".into()
}

fn p2() -> ProfileId {
    "profile2".into()
}

fn like(app: &CoupleApp, id: &ProfileId) -> i64 {
    app.account().unwrap().profile(id).unwrap().like_points
}

/// P2 raised the alarm, so P2 opens the dialogue
fn alarm_and_start(app: &mut CoupleApp, steps: i32) {
    app.select_profile(&p2());
    app.trigger_alarm();
    assert!(app.start_dialogue(steps).is_accepted());
}

/// The documented scenario: max_steps=3, apology on the last step, restart
#[test]
fn test_auto_restart_scenario() {
    let (mut app, clock) = setup();
    alarm_and_start(&mut app, 3);

    assert!(app.post_message("I needed you earlier", false, None).is_accepted());
    assert_eq!(app.dialogue().turn_holder, Some(p1()));

    app.select_profile(&p1());
    assert!(app.post_message("I was stuck at work", false, None).is_accepted());
    assert_eq!(app.dialogue().turn_holder, Some(p2()));

    app.select_profile(&p2());
    let outcome = app.post_message("Sorry for snapping", true, Some("snapping"));
    assert_eq!(outcome.rewards().len(), 1);
    assert_eq!(like(&app, &p2()), 2500);
    assert_eq!(app.dialogue().step_count, 3);
    assert_eq!(app.transcript().len(), 3);
    assert!(app.pending_restart().is_some());

    clock.advance(Duration::milliseconds(1000));
    assert!(app.poll().is_some());

    let dialogue = app.dialogue();
    assert_eq!(dialogue.phase, DialoguePhase::Active);
    assert!(dialogue.transcript.is_empty());
    assert_eq!(dialogue.step_count, 0);
    assert_eq!(dialogue.turn_holder, Some(p2()));
    assert!(app.pending_restart().is_none());
}

/// Commands run a due restart before doing their own work
#[test]
fn test_command_runs_due_restart_first() {
    let (mut app, clock) = setup();
    alarm_and_start(&mut app, 1);
    app.post_message("One", false, None);

    clock.advance(Duration::seconds(2));
    // P2 holds the turn again after the restart
    assert!(app.post_message("Again", false, None).is_accepted());
    assert_eq!(app.dialogue().round, 1);
    assert_eq!(app.transcript().len(), 1);
}

/// Out-of-turn posts are rejected and change nothing
#[test]
fn test_strict_alternation() {
    let (mut app, _) = setup();
    alarm_and_start(&mut app, 10);

    app.select_profile(&p1());
    let outcome = app.post_message("Let me go first", false, None);
    assert_eq!(outcome.reason(), Some(ReasonCode::R303_NOT_YOUR_TURN));
    assert!(app.transcript().is_empty());

    app.select_profile(&p2());
    app.post_message("First", false, None);
    assert_eq!(
        app.post_message("Second in a row", false, None).reason(),
        Some(ReasonCode::R303_NOT_YOUR_TURN)
    );
    assert_eq!(app.dialogue().step_count, 1);
}

/// max_steps is min(requested, 20) for every requested value
#[test]
fn test_max_steps_cap() {
    for (requested, expected) in [(0, 0), (-5, -5), (3, 3), (20, 20), (25, 20), (i32::MAX, 20)] {
        let (mut app, _) = setup();
        app.select_profile(&p1());
        app.start_dialogue(requested);
        assert_eq!(app.dialogue().max_steps, expected, "requested {}", requested);
    }
}

/// Only the first apology of each partner pays, even across restarts
#[test]
fn test_apology_bonus_once_per_partner() {
    let (mut app, clock) = setup();
    alarm_and_start(&mut app, 2);

    app.post_message("Sorry", true, None);
    app.select_profile(&p1());
    app.post_message("Me too, sorry", true, Some("not calling"));
    assert_eq!(like(&app, &p1()), 2500);
    assert_eq!(like(&app, &p2()), 2500);

    clock.advance(Duration::seconds(1));
    app.poll();

    app.select_profile(&p2());
    assert!(app.post_message("Sorry once more", true, None).rewards().is_empty());
    app.select_profile(&p1());
    assert!(app.post_message("Plain message", false, None).rewards().is_empty());
    assert_eq!(like(&app, &p1()), 2500);
    assert_eq!(like(&app, &p2()), 2500);
}

/// A new dialogue forgets earlier apologies
#[test]
fn test_apology_bonus_resets_with_new_dialogue() {
    let (mut app, _) = setup();
    app.select_profile(&p1());
    app.start_dialogue(5);
    app.post_message("Sorry", true, None);
    app.conclude(false);

    app.start_dialogue(5);
    app.post_message("Sorry again", true, None);
    assert_eq!(like(&app, &p1()), 3500);
}

/// Resolving within 30 minutes of the first message pays both partners
#[test]
fn test_resolution_bonus_in_window() {
    let (mut app, clock) = setup();
    alarm_and_start(&mut app, 10);
    app.post_message("Can we talk?", false, None);

    clock.advance(Duration::minutes(30));
    let outcome = app.conclude(true);
    assert_eq!(outcome.rewards().len(), 2);
    assert_eq!(like(&app, &p1()), 2000);
    assert_eq!(like(&app, &p2()), 2000);
    assert_eq!(app.dialogue().phase, DialoguePhase::Concluded { resolved: true });
    assert!(!app.alarm().active);
}

#[test]
fn test_resolution_bonus_too_late() {
    let (mut app, clock) = setup();
    alarm_and_start(&mut app, 10);
    app.post_message("Can we talk?", false, None);

    clock.advance(Duration::minutes(31));
    assert!(app.conclude(true).rewards().is_empty());
    assert_eq!(like(&app, &p1()), 1500);
}

/// An empty transcript counts as zero elapsed time
#[test]
fn test_resolution_with_empty_transcript() {
    let (mut app, clock) = setup();
    alarm_and_start(&mut app, 10);
    clock.advance(Duration::hours(6));
    assert_eq!(app.conclude(true).rewards().len(), 2);
}

/// Unresolved endings pay nothing
#[test]
fn test_unresolved_pays_nothing() {
    let (mut app, _) = setup();
    alarm_and_start(&mut app, 10);
    app.post_message("Whatever", false, None);
    assert!(app.conclude(false).rewards().is_empty());
    assert_eq!(app.dialogue().phase, DialoguePhase::Concluded { resolved: false });
}

/// Concluding before the delay elapses means the restart never runs
#[test]
fn test_conclude_cancels_pending_restart() {
    let (mut app, clock) = setup();
    alarm_and_start(&mut app, 1);
    app.post_message("One", false, None);
    let ticket = app.pending_restart().unwrap().ticket;

    app.conclude(true);
    clock.advance(Duration::seconds(5));
    assert!(app.poll().is_none());
    assert_eq!(app.fire_restart(ticket).reason(), Some(ReasonCode::R306_STALE_RESTART));
    assert_eq!(app.transcript().len(), 1);
}

/// A ticket from an earlier round does not restart the current one
#[test]
fn test_stale_ticket_from_earlier_round() {
    let (mut app, _) = setup();
    alarm_and_start(&mut app, 1);
    app.post_message("One", false, None);
    let first = app.pending_restart().unwrap().ticket;
    assert!(app.fire_restart(first).is_accepted());

    app.post_message("Two", false, None);
    let second = app.pending_restart().unwrap().ticket;
    assert_ne!(first, second);

    assert_eq!(app.fire_restart(first).reason(), Some(ReasonCode::R306_STALE_RESTART));
    assert!(app.pending_restart().is_some());
    assert!(app.fire_restart(second).is_accepted());
}

/// Posting into a full round is refused until the restart runs
#[test]
fn test_posts_refused_while_restart_pending() {
    let (mut app, _) = setup();
    alarm_and_start(&mut app, 1);
    app.post_message("One", false, None);

    app.select_profile(&p1());
    assert_eq!(
        app.post_message("Too late", false, None).reason(),
        Some(ReasonCode::R304_RESTART_PENDING)
    );
}

/// Logout cancels the restart and clears the dialogue; twice equals once
#[test]
fn test_logout_cancels_and_is_idempotent() {
    let (mut app, clock) = setup();
    alarm_and_start(&mut app, 1);
    app.post_message("One", false, None);

    app.logout();
    let once = app.view();
    app.logout();
    let twice = app.view();

    assert_eq!(
        serde_json::to_value(&once).unwrap(),
        serde_json::to_value(&twice).unwrap()
    );
    assert!(!app.session().logged_in);
    assert!(app.pending_restart().is_none());
    assert_eq!(app.dialogue().phase, DialoguePhase::Idle);

    clock.advance(Duration::seconds(5));
    assert!(app.poll().is_none());
}

/// A second start while active is rejected
#[test]
fn test_single_active_dialogue() {
    let (mut app, _) = setup();
    alarm_and_start(&mut app, 5);
    assert_eq!(
        app.start_dialogue(5).reason(),
        Some(ReasonCode::R301_DIALOGUE_ALREADY_ACTIVE)
    );
}

/// Progress tracks the current round
#[test]
fn test_progress() {
    let (mut app, _) = setup();
    alarm_and_start(&mut app, 4);
    assert_eq!(app.progress(), 0.0);
    app.post_message("One", false, None);
    assert_eq!(app.progress(), 0.25);
}
