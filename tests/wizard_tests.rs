//! Add-tip wizard end-to-end: one submission carrying all eight fields.

mod common;

use common::RecordingBackend;
use sportstips_bot::bot::wizard_manager::submit_tip;
use sportstips_bot::wizard::{AddTipStep, TipDraft, WizardError, DEFAULT_PURCHASE_LIMIT};

/// Walk the whole wizard with valid text input and submit. Exactly one
/// add-game call must be issued, carrying every collected field plus the
/// default purchase limit.
#[tokio::test]
async fn test_happy_path_submits_exactly_once() {
    let inputs = [
        "Derby special",
        "9.99",
        "2.5",
        "https://cdn.example.com/tip.jpg",
        "4",
        "90",
        "Bet9ja, 1xbet",
        "Over 2.5 goals",
    ];

    let mut draft = TipDraft::default();
    let mut step = Some(AddTipStep::FIRST);
    for input in inputs {
        let current = step.expect("ran out of steps before inputs");
        current.apply(input, &mut draft).unwrap();
        step = current.next();
    }
    assert_eq!(step, None, "eight inputs must exhaust the wizard");

    let backend = RecordingBackend::default();
    submit_tip(&backend, draft).await.unwrap();

    assert_eq!(backend.recorded_calls(), vec!["add_game"]);
    let added = backend.added_games.lock().unwrap();
    assert_eq!(added.len(), 1);
    let game = &added[0];
    assert_eq!(game.tip_title, "Derby special");
    assert_eq!(game.tip_price, 9.99);
    assert_eq!(game.odd_ratio, 2.5);
    assert_eq!(game.image.as_deref(), Some("https://cdn.example.com/tip.jpg"));
    assert_eq!(game.confidence_level, 4);
    assert_eq!(game.duration, 90);
    assert_eq!(game.betting_sites, vec!["Bet9ja", "1xbet"]);
    assert_eq!(game.content_after_purchase, "Over 2.5 goals");
    assert_eq!(game.purchase_limit, DEFAULT_PURCHASE_LIMIT);
}

/// Invalid input must not advance the step or touch the draft
#[tokio::test]
async fn test_invalid_numeric_input_does_not_advance() {
    let mut draft = TipDraft::default();
    AddTipStep::Title.apply("Derby", &mut draft).unwrap();

    let result = AddTipStep::Price.apply("a tenner", &mut draft);
    assert_eq!(result, Err(WizardError::NotANumber));
    assert_eq!(draft.price, None);

    // Recovery: the same step accepts a corrected value
    AddTipStep::Price.apply("10", &mut draft).unwrap();
    assert_eq!(draft.price, Some(10.0));
}

/// An incomplete draft never reaches the backend
#[tokio::test]
async fn test_incomplete_draft_is_rejected_before_submit() {
    let mut draft = TipDraft::default();
    AddTipStep::Title.apply("Derby", &mut draft).unwrap();

    let backend = RecordingBackend::default();
    assert!(submit_tip(&backend, draft).await.is_err());
    assert!(backend.recorded_calls().is_empty());
}

/// The button entry point (confidence stars) lands on the same draft field
/// as typed input, so both paths stay in lockstep.
#[test]
fn test_button_and_text_entry_points_agree() {
    let mut via_text = TipDraft::default();
    AddTipStep::Confidence.apply("5", &mut via_text).unwrap();

    // The callback handler renders a pressed star button as its digit
    let mut via_button = TipDraft::default();
    AddTipStep::Confidence
        .apply(&5u8.to_string(), &mut via_button)
        .unwrap();

    assert_eq!(via_text, via_button);
    assert_eq!(AddTipStep::Confidence.next(), Some(AddTipStep::Duration));
}
