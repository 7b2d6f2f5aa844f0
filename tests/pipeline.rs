//! Shortcut pipeline tests against in-memory platform and oracle impls.

mod common;

use std::sync::Arc;

use common::{lexical_analyzer, message, oracle_analyzer, InMemoryPlatform, ScriptedOracle};
use thread_sentiment::emoji::{EmojiSentimentTable, NO_REACTIONS_TEXT};
use thread_sentiment::error::SentimentError;
use thread_sentiment::models::{
    MoodLabel, Reaction, ShortcutChannel, ShortcutMessage, ShortcutPayload,
};
use thread_sentiment::shortcut::{analyze_thread, handle_sentiment_shortcut};

fn shortcut_payload(text: &str) -> ShortcutPayload {
    ShortcutPayload {
        trigger_id: Some("trigger-1".to_string()),
        channel: Some(ShortcutChannel {
            id: Some("C1".to_string()),
        }),
        message: Some(ShortcutMessage {
            ts: Some("100.0".to_string()),
            thread_ts: None,
            text: Some(text.to_string()),
            user: Some("U1".to_string()),
            channel: None,
        }),
    }
}

#[tokio::test]
async fn test_lexical_thread_with_reactions() {
    let platform = InMemoryPlatform::with_thread(
        vec![message("100.0", "I love this, great job!")],
        vec![Reaction::new("+1", 2)],
    );
    let oracle = ScriptedOracle::new(&[("m1", Ok("-3"))]);
    let analyzer = oracle_analyzer(oracle.clone(), &["m1"]);

    let report = analyze_thread(&platform, &analyzer, "C1", "100.0").await.unwrap();

    let thumbs = EmojiSentimentTable::bundled().unwrap().weight_of("👍").unwrap();
    assert_eq!(report.text_score, 6.0);
    assert!((report.reaction_score - 2.0 * thumbs).abs() < 1e-9);
    assert_eq!(report.combined_score, report.text_score + report.reaction_score);
    assert_eq!(report.mood.label, MoodLabel::Positive);
    assert_eq!(report.mood.emoji, "😄");
    assert_eq!(report.reaction_summary_text, ":+1: ×2");
    assert!(!report.message_analyses[0].used_oracle);
    assert!(report.message_analyses[0].is_root);
    assert!(oracle.models_called().is_empty());
}

#[tokio::test]
async fn test_empty_thread_is_no_analyzable_content() {
    let platform = InMemoryPlatform::with_thread(Vec::new(), Vec::new());
    let err = analyze_thread(&platform, &lexical_analyzer(), "C1", "100.0")
        .await
        .unwrap_err();
    assert!(matches!(err, SentimentError::NoAnalyzableContent));
}

#[tokio::test]
async fn test_thread_fetch_failure_is_propagated() {
    let platform = InMemoryPlatform {
        fail_messages: true,
        ..InMemoryPlatform::with_thread(Vec::new(), Vec::new())
    };
    let err = analyze_thread(&platform, &lexical_analyzer(), "C1", "100.0")
        .await
        .unwrap_err();
    assert!(matches!(err, SentimentError::Platform(_)));
}

#[tokio::test]
async fn test_reaction_failure_degrades_to_none() {
    let platform = InMemoryPlatform {
        fail_reactions: true,
        ..InMemoryPlatform::with_thread(
            vec![message("100.0", "great work")],
            vec![Reaction::new("+1", 5)],
        )
    };

    let report = analyze_thread(&platform, &lexical_analyzer(), "C1", "100.0")
        .await
        .unwrap();

    assert_eq!(report.reaction_score, 0.0);
    assert_eq!(report.reaction_summary_text, NO_REACTIONS_TEXT);
    assert_eq!(report.text_score, 3.0);
}

#[tokio::test]
async fn test_zero_lexical_escalates_with_thread_context() {
    let platform = InMemoryPlatform::with_thread(
        vec![
            message("100.0", "the deploy went out on tuesday"),
            message("100.1", "release notes are in the channel"),
        ],
        Vec::new(),
    );
    let oracle = ScriptedOracle::new(&[("m1", Err("quota")), ("m2", Ok("2"))]);
    let analyzer = oracle_analyzer(oracle.clone(), &["m1", "m2"]);

    let report = analyze_thread(&platform, &analyzer, "C1", "100.0").await.unwrap();

    assert_eq!(report.analyzed_message_count, 2);
    assert!(report.message_analyses.iter().all(|a| a.used_oracle));
    assert_eq!(report.text_score, 4.0);
    assert_eq!(oracle.models_called(), vec!["m1", "m2", "m1", "m2"]);

    // The first message's prompt carries the later reply as context.
    let first_prompt = &oracle.prompts()[0];
    assert!(first_prompt.contains("Context:\n"));
    assert!(first_prompt.contains("release notes are in the channel"));
    assert!(first_prompt.contains("Message: \"the deploy went out on tuesday\""));
}

#[tokio::test]
async fn test_oracle_exhaustion_keeps_zero() {
    let platform =
        InMemoryPlatform::with_thread(vec![message("100.0", "meeting moved to thursday")], Vec::new());
    let oracle = ScriptedOracle::new(&[("m1", Err("down")), ("m2", Err("down"))]);
    let analyzer = oracle_analyzer(oracle.clone(), &["m1", "m2"]);

    let report = analyze_thread(&platform, &analyzer, "C1", "100.0").await.unwrap();

    assert_eq!(report.text_score, 0.0);
    assert!(!report.message_analyses[0].used_oracle);
    assert_eq!(report.mood.label, MoodLabel::Neutral);
    assert_eq!(oracle.models_called().len(), 2);
}

#[tokio::test]
async fn test_no_oracle_configured_stays_lexical() {
    let platform = InMemoryPlatform::with_thread(
        vec![message("100.0", "meeting moved to thursday"), message("100.1", "noted")],
        Vec::new(),
    );

    let report = analyze_thread(&platform, &lexical_analyzer(), "C1", "100.0")
        .await
        .unwrap();

    assert!(report.message_analyses.iter().all(|a| !a.used_oracle));
    assert_eq!(report.text_score, 0.0);
}

#[tokio::test]
async fn test_shortcut_opens_loading_then_result() {
    let platform = InMemoryPlatform::with_thread(
        vec![message("100.0", "terrible outage"), message("100.1", "so bad")],
        vec![Reaction::new("sob", 1)],
    );

    handle_sentiment_shortcut(&platform, &lexical_analyzer(), &shortcut_payload("terrible outage"))
        .await
        .unwrap();

    assert_eq!(platform.opened_callback_ids(), vec!["sentiment_score_loading"]);
    assert_eq!(platform.updated_callback_ids(), vec!["sentiment_score_result"]);

    let updated = platform.updated.lock().unwrap();
    let (view_id, hash, _) = &updated[0];
    assert_eq!(view_id, "V1");
    assert_eq!(hash.as_deref(), Some("H1"));
}

#[tokio::test]
async fn test_shortcut_shows_error_view_for_empty_thread() {
    let platform = InMemoryPlatform::with_thread(Vec::new(), Vec::new());

    handle_sentiment_shortcut(&platform, &lexical_analyzer(), &shortcut_payload("hello"))
        .await
        .unwrap();

    assert_eq!(platform.updated_callback_ids(), vec!["sentiment_score_error"]);
    let updated = platform.updated.lock().unwrap();
    let rendered = updated[0].2.to_string();
    assert!(rendered.contains("is the bot in the channel?"));
}

#[tokio::test]
async fn test_shortcut_without_view_id_opens_again() {
    let platform = InMemoryPlatform {
        view_id: None,
        ..InMemoryPlatform::with_thread(vec![message("100.0", "great")], Vec::new())
    };

    handle_sentiment_shortcut(&platform, &lexical_analyzer(), &shortcut_payload("great"))
        .await
        .unwrap();

    assert_eq!(
        platform.opened_callback_ids(),
        vec!["sentiment_score_loading", "sentiment_score_result"]
    );
    assert!(platform.updated.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_shortcut_rejects_payload_without_channel() {
    let platform = Arc::new(InMemoryPlatform::with_thread(Vec::new(), Vec::new()));
    let mut payload = shortcut_payload("hello");
    payload.channel = None;

    let err = handle_sentiment_shortcut(platform.as_ref(), &lexical_analyzer(), &payload)
        .await
        .unwrap_err();

    assert!(matches!(err, SentimentError::InvalidPayload));
    assert!(platform.opened.lock().unwrap().is_empty());
}
