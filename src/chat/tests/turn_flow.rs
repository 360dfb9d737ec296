use super::helpers::*;
use crate::chat::prompts::{FALLBACK_REPLY, GREETING, ITEM_FOOTPRINT_REPLY, ITEM_FOOTPRINT_SUGGESTION};
use crate::chat::{Sender, SubmitError, TurnOutcome};
use crate::directives::DEFAULT_CHART_TITLE;
use crate::notifications::NotificationPhase;
use std::sync::Arc;
use tokio::sync::Notify;

// ── Initial state ───────────────────────────────────────────

#[test]
fn test_new_session_shows_greeting_and_suggestions() {
    let (session, _) = session_with([]);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.messages.len(), 1);
    assert_eq!(snapshot.messages[0].text, GREETING);
    assert_eq!(snapshot.messages[0].sender, Sender::Ai);
    assert_eq!(snapshot.suggestions.len(), 3);
    assert_eq!(snapshot.points, 0);
    assert_eq!(snapshot.rank.name, "Eco Novice");
    assert!(!snapshot.is_sending);
}

// ── Rejections ──────────────────────────────────────────────

#[tokio::test]
async fn test_blank_text_without_image_is_rejected() {
    let (session, provider) = session_with([]);
    let err = tokio_test::assert_err!(session.submit_turn("   \n").await);
    assert_eq!(err, SubmitError::Empty);
    assert_eq!(session.snapshot().messages.len(), 1);
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_submit_while_sending_is_rejected() {
    let gate = Arc::new(Notify::new());
    let (session, provider) = session_with([Step::Gated(gate.clone(), "first reply")]);

    let first = {
        let session = session.clone();
        tokio::spawn(async move { session.submit_turn("first").await })
    };
    wait_for_calls(&provider, 1).await;
    assert!(session.is_sending());

    let log_len = session.snapshot().messages.len();
    let err = session.submit_turn("second").await.unwrap_err();
    assert_eq!(err, SubmitError::Busy);
    assert_eq!(session.snapshot().messages.len(), log_len);

    gate.notify_one();
    let outcome = first.await.unwrap().unwrap();
    assert_eq!(outcome.reply().text, "first reply");
    assert_eq!(provider.calls().len(), 1);
    assert!(!session.is_sending());

    // The guard is free again.
    tokio_test::assert_ok!(session.submit_turn("third").await);
    assert_eq!(provider.calls().len(), 2);
}

// ── Successful turns ────────────────────────────────────────

#[tokio::test]
async fn test_badge_reply_updates_progress_and_queues_notification() {
    let (session, _) = session_with([Step::Reply("[BADGE_AWARDED:TRANSPORT_TRACKER]\nGreat job!")]);

    let outcome = session.submit_turn("I drive 20 km a day").await.unwrap();
    let TurnOutcome::Replied {
        reply,
        notification_ids,
    } = outcome
    else {
        panic!("expected a reply");
    };

    assert_eq!(reply.text, "Great job!");
    assert_eq!(reply.badge.map(|b| b.id), Some("TRANSPORT_TRACKER"));
    assert_eq!(notification_ids.len(), 1);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.points, 50);
    assert_eq!(snapshot.unlocked_badges, vec!["TRANSPORT_TRACKER"]);
    assert_eq!(snapshot.messages.len(), 3);
    assert_eq!(snapshot.messages[1].sender, Sender::User);
    assert!(snapshot.suggestions.is_empty());

    let active = session.active_notifications().await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].notification.message, "Badge Unlocked: Transport Tracker!");
    assert_eq!(active[0].phase, NotificationPhase::Visible);
}

#[tokio::test]
async fn test_same_badge_twice_awards_once() {
    let (session, _) = session_with([
        Step::Reply("Nice!\n[BADGE_AWARDED:HOME_HERO]"),
        Step::Reply("Again!\n[BADGE_AWARDED:HOME_HERO]"),
    ]);
    session.submit_turn("kwh").await.unwrap();
    let outcome = session.submit_turn("more kwh").await.unwrap();

    assert!(outcome.reply().badge.is_none());
    assert_eq!(session.snapshot().points, 50);
    assert_eq!(session.active_notifications().await.len(), 1);
}

#[tokio::test]
async fn test_rank_up_is_announced_before_badge() {
    let (session, _) = session_with([
        Step::Reply("[BADGE_AWARDED:ECO_EATER]"),
        Step::Reply("[BADGE_AWARDED:HOME_HERO]"),
    ]);
    session.submit_turn("vegan").await.unwrap();
    session.submit_turn("200 kWh").await.unwrap();

    let messages: Vec<String> = session
        .active_notifications()
        .await
        .into_iter()
        .map(|a| a.notification.message)
        .collect();
    assert_eq!(
        messages,
        vec![
            "Badge Unlocked: Eco Eater!",
            "Rank Up: You are now a Green Learner!",
            "Badge Unlocked: Home Hero!",
        ]
    );
    assert_eq!(session.snapshot().rank.name, "Green Learner");
}

#[tokio::test]
async fn test_chart_reply_without_title_uses_default() {
    let (session, _) = session_with([Step::Reply(
        "About 1.7 t a year.\n[PIE_CHART_DATA:{\"diet\": 1700, \"snacks\": 0}]",
    )]);
    let outcome = session.submit_turn("I eat meat most days").await.unwrap();
    let reply = outcome.reply();

    assert_eq!(reply.text, "About 1.7 t a year.");
    assert_eq!(reply.chart_title.as_deref(), Some(DEFAULT_CHART_TITLE));
    let chart = reply.chart_data.as_ref().unwrap();
    assert_eq!(chart.len(), 1);
    assert_eq!(chart[0].label, "Diet");
}

#[tokio::test]
async fn test_receipt_reply_is_flagged() {
    let (session, _) = session_with([Step::Reply(
        "[CARBON_RECEIPT]\n   CARBON FOOTPRINT RECEIPT\nITEM: Banana\n[BADGE_AWARDED:ECO_EATER]",
    )]);
    session.stage_image(png_attachment());
    let outcome = session.submit_turn("show me the carbon receipt").await.unwrap();

    assert!(outcome.reply().is_receipt);
    assert!(outcome.reply().text.starts_with("CARBON FOOTPRINT RECEIPT"));
    assert_eq!(session.snapshot().points, 0);
}

// ── Images ──────────────────────────────────────────────────

#[tokio::test]
async fn test_image_only_turn_is_sent_and_slot_cleared() {
    let (session, provider) = session_with([Step::Reply("I see a bottle!")]);
    session.stage_image(png_attachment());

    session.submit_turn("").await.unwrap();

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].image_mime.as_deref(), Some("image/png"));
    assert!(!session.has_staged_image());

    let user = &session.snapshot().messages[1];
    assert_eq!(user.sender, Sender::User);
    assert!(user.image.is_some());
}

#[tokio::test]
async fn test_cleared_image_is_not_sent() {
    let (session, provider) = session_with([]);
    session.stage_image(png_attachment());
    assert!(session.clear_staged_image().is_some());

    assert_eq!(session.submit_turn("").await.unwrap_err(), SubmitError::Empty);
    session.submit_turn("hello").await.unwrap();
    assert_eq!(provider.calls()[0].image_mime, None);
}

#[tokio::test]
async fn test_image_staged_during_a_turn_waits_for_the_next_one() {
    let gate = Arc::new(Notify::new());
    let (session, provider) = session_with([
        Step::Gated(gate.clone(), "first reply"),
        Step::Reply("second reply"),
    ]);
    session.stage_image(png_attachment());

    let first = {
        let session = session.clone();
        tokio::spawn(async move { session.submit_turn("what is this?").await })
    };
    wait_for_calls(&provider, 1).await;
    assert!(!session.has_staged_image());

    session.stage_image(png_attachment());
    gate.notify_one();
    first.await.unwrap().unwrap();
    assert!(session.has_staged_image());

    session.submit_turn("and this?").await.unwrap();
    let mimes: Vec<Option<String>> = provider.calls().into_iter().map(|c| c.image_mime).collect();
    assert_eq!(
        mimes,
        vec![Some("image/png".to_string()), Some("image/png".to_string())]
    );
    assert!(!session.has_staged_image());
}

#[tokio::test]
async fn test_busy_rejection_keeps_the_staged_image() {
    let gate = Arc::new(Notify::new());
    let (session, provider) = session_with([Step::Gated(gate.clone(), "first reply")]);

    let first = {
        let session = session.clone();
        tokio::spawn(async move { session.submit_turn("first").await })
    };
    wait_for_calls(&provider, 1).await;

    session.stage_image(png_attachment());
    assert_eq!(session.submit_turn("").await.unwrap_err(), SubmitError::Busy);
    assert!(session.has_staged_image());

    gate.notify_one();
    first.await.unwrap().unwrap();
    assert!(session.has_staged_image());
}

// ── Item shortcut ───────────────────────────────────────────

#[tokio::test]
async fn test_item_suggestion_without_photo_answers_locally() {
    let (session, provider) = session_with([]);
    let outcome = session.submit_turn(ITEM_FOOTPRINT_SUGGESTION).await.unwrap();

    assert!(matches!(outcome, TurnOutcome::Shortcut { .. }));
    assert_eq!(outcome.reply().text, ITEM_FOOTPRINT_REPLY);
    assert!(provider.calls().is_empty());

    let snapshot = session.snapshot();
    assert_eq!(snapshot.messages.len(), 2);
    assert_eq!(snapshot.suggestions.len(), 3);
    assert!(!snapshot.is_sending);
}

#[tokio::test]
async fn test_item_suggestion_with_photo_goes_to_the_service() {
    let (session, provider) = session_with([Step::Reply("[CARBON_RECEIPT]\nITEM: Mug")]);
    session.stage_image(png_attachment());
    let outcome = session.submit_turn(ITEM_FOOTPRINT_SUGGESTION).await.unwrap();

    assert!(matches!(outcome, TurnOutcome::Replied { .. }));
    assert_eq!(provider.calls().len(), 1);
    assert_ne!(outcome.reply().text, FALLBACK_REPLY);
}
