#![allow(non_snake_case)]
use spin_wheel::{
    WheelEvent,
    pointer_index,
    test_helpers::*,
};
use tokio::sync::oneshot::error::TryRecvError;

const OPTIONS: [&str; 3] = ["Red", "Green", "Blue"];

#[test]
fn spin__empty_wheel_resolves_empty_and_stays_idle() {
    // given
    let mut ctx = TestContext::new(&[]);

    // when
    let mut rx = ctx.spin();

    // then
    assert_eq!(rx.try_recv(), Ok(String::new()));
    assert!(!ctx.service().is_spinning());
    assert_eq!(ctx.service().rotation(), 0.0);
    assert_eq!(ctx.service().generation(), 0);
    assert!(ctx.drain_events().is_empty());
}

#[test]
fn spin__while_spinning_is_ignored() {
    // given
    let mut ctx = TestContext::new(&OPTIONS);
    let _first = ctx.spin();
    let rotation = ctx.service().rotation();
    ctx.advance_ms(1000);

    // when
    let mut second = ctx.spin();

    // then
    assert_eq!(second.try_recv(), Ok(String::new()));
    assert_eq!(ctx.service().rotation(), rotation);
    assert_eq!(ctx.service().generation(), 1);
    assert!(ctx.service().is_spinning());
}

#[test]
fn spin__winner_is_revealed_only_after_spin_duration() {
    // given
    let mut ctx = TestContext::new(&OPTIONS);
    let mut rx = ctx.spin();

    // when
    ctx.advance_ms(4999);

    // then
    assert!(ctx.service().is_spinning());
    assert_eq!(ctx.service().winner(), None);
    assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

    // when
    ctx.advance_ms(1);

    // then
    let winner = rx.try_recv().unwrap();
    assert!(!ctx.service().is_spinning());
    assert_eq!(ctx.service().winner(), Some(winner.as_str()));
}

#[test]
fn spin__winner_is_the_segment_under_the_pointer() {
    for seed in 0..20 {
        // given
        let mut ctx = TestContext::with_seed(&OPTIONS, seed);

        // when
        let winner = ctx.spin_to_completion();

        // then
        let expected = pointer_index(ctx.service().rotation(), OPTIONS.len());
        assert_eq!(winner, OPTIONS[expected]);
        assert_eq!(ctx.service().winner_index(), Some(expected));
    }
}

#[test]
fn spin__rotation_grows_by_six_to_nine_turns_each_time() {
    // given
    let mut ctx = TestContext::new(&OPTIONS);
    let mut previous = ctx.service().rotation();

    for _ in 0..10 {
        // when
        ctx.spin_to_completion();

        // then
        let delta = ctx.service().rotation() - previous;
        assert!(delta >= 6.0 * 360.0, "delta {delta}");
        assert!(delta < 9.0 * 360.0, "delta {delta}");
        previous = ctx.service().rotation();
    }
}

#[test]
fn spin__emits_start_then_reveal_events() {
    // given
    let mut ctx = TestContext::new(&OPTIONS);

    // when
    ctx.spin_to_completion();

    // then
    let events = ctx.drain_events();
    assert!(matches!(
        events.first(),
        Some(WheelEvent::SpinStarted { generation: 1, from_rotation, .. }) if *from_rotation == 0.0
    ));
    assert!(
        events
            .iter()
            .any(|e| matches!(e, WheelEvent::WinnerRevealed { .. }))
    );
    assert!(events.contains(&WheelEvent::ConfettiChanged(true)));
}

#[test]
fn reset__during_spin_resolves_empty_and_drops_reveal() {
    // given
    let mut ctx = TestContext::new(&OPTIONS);
    let mut rx = ctx.spin();
    ctx.advance_ms(1000);
    ctx.drain_events();

    // when
    ctx.service_mut().reset();
    ctx.advance_ms(10_000);

    // then
    assert_eq!(rx.try_recv(), Ok(String::new()));
    assert!(!ctx.service().is_spinning());
    assert_eq!(ctx.service().winner(), None);
    assert_eq!(ctx.service().rotation(), 0.0);
    assert_eq!(ctx.drain_events(), vec![WheelEvent::Reset]);
}

#[test]
fn spin__options_replaced_mid_spin_pick_from_new_list() {
    // given
    let mut ctx = TestContext::new(&OPTIONS);
    let rx = ctx.spin();
    ctx.advance_ms(2000);

    // when
    ctx.service_mut().set_options(["Alpha", "Beta"]);
    ctx.advance_ms(3000);

    // then
    let mut rx = rx;
    let winner = rx.try_recv().unwrap();
    assert!(winner == "Alpha" || winner == "Beta");
    let expected = pointer_index(ctx.service().rotation(), 2);
    assert_eq!(ctx.service().winner_index(), Some(expected));
}

#[test]
fn spin__options_cleared_mid_spin_resolve_empty() {
    // given
    let mut ctx = TestContext::new(&OPTIONS);
    let mut rx = ctx.spin();

    // when
    ctx.service_mut().set_options(Vec::<String>::new());
    ctx.advance_ms(5000);

    // then
    assert_eq!(rx.try_recv(), Ok(String::new()));
    assert!(!ctx.service().is_spinning());
    assert!(!ctx.service().show_confetti());
}

#[tokio::test]
async fn spin__receiver_resolves_with_winner() {
    // given
    let mut ctx = TestContext::new(&OPTIONS);
    let rx = ctx.spin();

    // when
    ctx.advance_ms(5000);
    let winner = rx.await.unwrap();

    // then
    assert!(OPTIONS.contains(&winner.as_str()));
    assert_eq!(ctx.service().winner(), Some(winner.as_str()));
}
