#![allow(non_snake_case)]
use spin_wheel::{
    WheelEvent,
    test_helpers::*,
};

const OPTIONS: [&str; 4] = ["Pizza", "Burger", "Sushi", "Tacos"];

fn removing_context(options: &[&str]) -> TestContext {
    let mut ctx = TestContext::new(options);
    ctx.service_mut().toggle_remove_winner();
    ctx.drain_events();
    ctx
}

#[test]
fn removal__starts_after_delay_when_enabled() {
    // given
    let mut ctx = removing_context(&OPTIONS);
    ctx.spin_to_completion();
    let index = ctx.service().winner_index().unwrap();

    // when
    ctx.advance_ms(3999);

    // then
    assert!(!ctx.service().is_removing());

    // when
    ctx.drain_events();
    ctx.advance_ms(1);

    // then
    assert!(ctx.service().is_removing());
    assert_eq!(
        ctx.drain_events(),
        vec![WheelEvent::RemovalStarted { index }]
    );
}

#[test]
fn removal__never_starts_when_disabled() {
    // given
    let mut ctx = TestContext::new(&OPTIONS);
    ctx.spin_to_completion();

    // when
    ctx.advance_ms(10_000);

    // then
    assert!(!ctx.service().is_removing());
    assert_eq!(ctx.service().options().len(), OPTIONS.len());
    assert!(ctx.service().winner().is_some());
}

#[test]
fn removal__toggling_off_during_delay_cancels_it() {
    // given
    let mut ctx = removing_context(&OPTIONS);
    ctx.spin_to_completion();
    ctx.advance_ms(1000);

    // when
    ctx.service_mut().toggle_remove_winner();
    ctx.advance_ms(5000);

    // then
    assert!(!ctx.service().is_removing());
    assert_eq!(ctx.service().options().len(), OPTIONS.len());
}

#[test]
fn complete_removal__strikes_winner_once() {
    // given
    let mut ctx = removing_context(&OPTIONS);
    let winner = ctx.spin_to_completion();
    ctx.advance_ms(4000);

    // when
    let first = ctx.service_mut().complete_removal();
    let second = ctx.service_mut().complete_removal();

    // then
    assert_eq!(first.as_deref(), Some(winner.as_str()));
    assert_eq!(second, None);
    let remaining = ctx.service().options();
    assert_eq!(remaining.len(), OPTIONS.len() - 1);
    assert!(!remaining.contains(&winner));
    assert!(!ctx.service().is_removing());
    assert_eq!(ctx.service().winner(), None);
    assert_eq!(ctx.service().winner_index(), None);
}

#[test]
fn complete_removal__without_winner_does_nothing() {
    // given
    let mut ctx = TestContext::new(&OPTIONS);

    // when
    let removed = ctx.service_mut().complete_removal();

    // then
    assert_eq!(removed, None);
    assert_eq!(ctx.service().options().len(), OPTIONS.len());
    assert!(ctx.drain_events().is_empty());
}

#[test]
fn complete_removal__keeps_remaining_order() {
    // given
    let mut ctx = removing_context(&OPTIONS);
    let winner = ctx.spin_to_completion();
    ctx.advance_ms(4000);

    // when
    ctx.service_mut().complete_removal();

    // then
    let expected: Vec<&str> = OPTIONS.iter().copied().filter(|o| *o != winner).collect();
    assert_eq!(ctx.service().options(), expected.as_slice());
}

#[test]
fn set_options__during_removal_cancels_it() {
    // given
    let mut ctx = removing_context(&OPTIONS);
    ctx.spin_to_completion();
    ctx.advance_ms(4000);
    assert!(ctx.service().is_removing());
    ctx.drain_events();

    // when
    ctx.service_mut().set_options(["X", "Y"]);

    // then
    assert!(!ctx.service().is_removing());
    assert_eq!(ctx.service().winner(), None);
    assert_eq!(
        ctx.drain_events(),
        vec![WheelEvent::RemovalCancelled, WheelEvent::OptionsChanged]
    );
    assert_eq!(ctx.service_mut().complete_removal(), None);
    assert_eq!(ctx.service().options(), ["X", "Y"]);
}

#[test]
fn set_options__during_delay_drops_pending_removal() {
    // given
    let mut ctx = removing_context(&OPTIONS);
    ctx.spin_to_completion();
    ctx.advance_ms(2000);

    // when
    ctx.service_mut().set_options(OPTIONS);
    ctx.advance_ms(5000);

    // then
    assert!(!ctx.service().is_removing());
    assert_eq!(ctx.service().options().len(), OPTIONS.len());
}

#[test]
fn spin__again_before_removal_drops_the_stale_timer() {
    // given
    let mut ctx = removing_context(&OPTIONS);
    ctx.spin_to_completion();
    ctx.advance_ms(1000);

    // when
    let _rx = ctx.spin();
    ctx.advance_ms(3500);

    // then
    assert!(!ctx.service().is_removing());
    assert!(ctx.service().is_spinning());
    assert_eq!(ctx.service().generation(), 2);
}

#[test]
fn removal__of_last_option_leaves_an_empty_wheel() {
    // given
    let mut ctx = removing_context(&["Solo"]);
    let winner = ctx.spin_to_completion();
    ctx.advance_ms(4000);

    // when
    ctx.service_mut().complete_removal();
    let mut rx = ctx.spin();

    // then
    assert_eq!(winner, "Solo");
    assert!(ctx.service().options().is_empty());
    assert_eq!(rx.try_recv(), Ok(String::new()));
}

#[test]
fn advance__one_long_step_fires_reveal_and_every_follow_up() {
    // given
    let mut ctx = removing_context(&OPTIONS);
    let _rx = ctx.spin();
    ctx.drain_events();

    // when
    ctx.advance_ms(11_000);

    // then
    assert!(!ctx.service().is_spinning());
    let index = ctx.service().winner_index().unwrap();
    assert!(ctx.service().is_removing());
    assert!(!ctx.service().show_confetti());
    let events = ctx.drain_events();
    let revealed = events
        .iter()
        .position(|e| matches!(e, WheelEvent::WinnerRevealed { .. }))
        .unwrap();
    let removal = events
        .iter()
        .position(|e| *e == WheelEvent::RemovalStarted { index })
        .unwrap();
    let cleared = events
        .iter()
        .position(|e| *e == WheelEvent::ConfettiChanged(false))
        .unwrap();
    assert!(revealed < removal && removal < cleared);
}
