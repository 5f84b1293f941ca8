//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use crate::api::StoredEvent;
use crate::protocol::{Envelope, InboundEvent, SearchMode};
use crate::runtime::testing::{stored_event, FixedClock, MockSessionApi, MockTransport};
use crate::runtime::{replay_batch, Input, ReplayController, SessionRuntime, SessionStore};
use crate::tools::ToolKind;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::time::Duration;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> SessionContext {
    SessionContext::new("claude-test", "claude-replay")
}

fn fold(events: &[InboundEvent]) -> AppState {
    let ctx = test_context();
    let mut state = AppState::new(&ctx);
    for (i, event) in events.iter().enumerate() {
        state = reduce(
            &state,
            &ctx,
            Action::Inbound {
                id: format!("e{i}"),
                event: event.clone(),
                at: i64::try_from(i).unwrap_or_default(),
            },
        )
        .state;
    }
    state
}

fn test_store() -> SessionStore {
    SessionStore::with_clock(test_context(), FixedClock::new(1_000))
}

/// The `{type, content}` message the backend would have sent for an event
fn wire_payload(event: &InboundEvent) -> Value {
    let content = match event {
        InboundEvent::ToolCall { tool, input, call_id } => {
            json!({"tool_name": tool.as_str(), "tool_input": input, "tool_call_id": call_id})
        }
        InboundEvent::ToolResult { tool, result, call_id } => {
            json!({"tool_name": tool.as_str(), "result": result, "tool_call_id": call_id})
        }
        InboundEvent::UserMessage { text }
        | InboundEvent::AgentThinking { text }
        | InboundEvent::AgentResponse { text } => json!({"text": text}),
        InboundEvent::Error { message } | InboundEvent::System { message } => json!({"message": message}),
        _ => json!({}),
    };
    json!({"type": event.kind(), "content": content})
}

fn session_log(events: &[InboundEvent]) -> Vec<StoredEvent> {
    events
        .iter()
        .enumerate()
        .map(|(i, event)| stored_event(&format!("e{i}"), "s1", wire_payload(event)))
        .collect()
}

fn submit(text: &str, id: &str) -> Action {
    Action::SubmitQuery {
        message_id: id.to_string(),
        text: text.to_string(),
        search_mode: SearchMode::All,
        file_type_filter: None,
        path_filter: None,
        at: 0,
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_tool() -> impl Strategy<Value = ToolKind> {
    prop_oneof![
        Just(ToolKind::Bash),
        Just(ToolKind::StrReplaceEditor),
        Just(ToolKind::WebSearch),
        Just(ToolKind::BrowserClick),
        Just(ToolKind::BrowserUse),
        Just(ToolKind::SequentialThinking),
        Just(ToolKind::Presentation),
        Just(ToolKind::ImageGenerate),
        "[a-z_]{3,10}".prop_map(ToolKind::from),
    ]
}

fn arb_payload() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-zA-Z0-9 \n]{0,30}".prop_map(Value::String),
        "[a-z]{1,8}".prop_map(|d| json!([{"type": "image", "source": {"data": d}}])),
        Just(Value::Null),
    ]
}

fn arb_call_id() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        3 => Just(None),
        1 => "k[0-2]".prop_map(Some),
    ]
}

fn arb_tool_call() -> impl Strategy<Value = InboundEvent> {
    (arb_tool(), "[a-z ]{0,12}", arb_call_id()).prop_map(|(tool, arg, call_id)| InboundEvent::ToolCall {
        tool,
        input: json!({"command": arg, "thought": arg, "path": "a.py"}),
        call_id,
    })
}

fn arb_tool_result() -> impl Strategy<Value = InboundEvent> {
    (arb_tool(), arb_payload(), arb_call_id()).prop_map(|(tool, result, call_id)| InboundEvent::ToolResult {
        tool,
        result,
        call_id,
    })
}

fn arb_event() -> impl Strategy<Value = InboundEvent> {
    prop_oneof![
        3 => arb_tool_call(),
        3 => arb_tool_result(),
        1 => "[a-z ]{1,20}".prop_map(|text| InboundEvent::UserMessage { text }),
        1 => "[a-z ]{1,20}".prop_map(|text| InboundEvent::AgentThinking { text }),
        1 => "[a-z ]{1,20}".prop_map(|text| InboundEvent::AgentResponse { text }),
        1 => Just(InboundEvent::Processing),
        1 => Just(InboundEvent::StreamComplete),
        1 => "[a-z]{1,10}".prop_map(|message| InboundEvent::Error { message }),
    ]
}

// ============================================================================
// State Validity Checkers
// ============================================================================

fn open_steps(state: &AppState) -> usize {
    state
        .messages
        .iter()
        .filter_map(|m| m.action.as_ref())
        .filter(|a| a.is_open())
        .count()
}

fn current_action_is_valid(state: &AppState) -> bool {
    match &state.current_action {
        Some(id) => state.message(id).is_some_and(|m| m.action.is_some()),
        None => true,
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Every open step is tracked by exactly one correlator entry
    #[test]
    fn prop_open_calls_match_open_steps(events in proptest::collection::vec(arb_event(), 0..40)) {
        let state = fold(&events);
        prop_assert_eq!(state.open_calls(), open_steps(&state));
        prop_assert!(current_action_is_valid(&state));
    }

    // Inbound events only ever append or amend in place
    #[test]
    fn prop_inbound_never_shrinks_transcript(events in proptest::collection::vec(arb_event(), 1..30)) {
        let ctx = test_context();
        let mut state = AppState::new(&ctx);
        for (i, event) in events.into_iter().enumerate() {
            let before = state.messages.len();
            state = reduce(&state, &ctx, Action::Inbound { id: format!("e{i}"), event, at: 0 }).state;
            prop_assert!(state.messages.len() >= before);
            prop_assert!(state.messages.len() <= before + 1);
        }
    }

    // A result directly after its call amends the call instead of appending
    #[test]
    fn prop_paired_call_and_result_yield_one_step(
        prefix in proptest::collection::vec(arb_event(), 0..10),
        arg in "[a-z]{1,8}",
        output in "[a-z\n]{0,20}",
    ) {
        let mut events = prefix;
        let base = fold(&events).messages.len();
        events.push(InboundEvent::ToolCall { tool: ToolKind::Bash, input: json!({"command": arg}), call_id: None });
        events.push(InboundEvent::ToolResult { tool: ToolKind::Bash, result: json!(output), call_id: None });

        let state = fold(&events);
        prop_assert_eq!(state.messages.len(), base + 1);
        let step = state.messages.last().and_then(|m| m.action.as_ref());
        prop_assert!(step.is_some_and(|s| s.data.is_result && s.tool == ToolKind::Bash));
    }

    // Reduction is a pure function of its inputs
    #[test]
    fn prop_reduce_is_deterministic(events in proptest::collection::vec(arb_event(), 0..30)) {
        prop_assert_eq!(fold(&events), fold(&events));
    }

    // Edit at index k leaves exactly k + 1 messages
    #[test]
    fn prop_edit_truncates_after_edited_message(count in 1usize..12, pick in any::<prop::sample::Index>(), text in "[a-z]{1,10}") {
        let ctx = test_context();
        let mut state = AppState::new(&ctx);
        for i in 0..count {
            state.messages.push(Message::text(format!("m{i}"), Role::User, "q", 0));
        }
        let k = pick.index(count);
        state = reduce(&state, &ctx, Action::StartEditing { message_id: format!("m{k}") }).state;
        let t = reduce(&state, &ctx, Action::EditQuery { text: text.clone() });

        prop_assert_eq!(t.state.messages.len(), k + 1);
        prop_assert_eq!(t.state.messages[k].content.as_deref(), Some(text.as_str()));
    }

    // Cancel stops the turn; the next submission clears the stop
    #[test]
    fn prop_cancel_then_submit(events in proptest::collection::vec(arb_event(), 0..15), text in "[a-z]{1,10}") {
        let ctx = test_context();
        let state = fold(&events);
        let cancelled = reduce(&state, &ctx, Action::Cancel).state;
        prop_assert!(cancelled.is_stopped);
        prop_assert!(!cancelled.is_loading);

        let resumed = reduce(&cancelled, &ctx, submit(&text, "next")).state;
        prop_assert!(!resumed.is_stopped);
        prop_assert!(resumed.is_loading);
    }

    // Lifecycle-only events never touch the transcript
    #[test]
    fn prop_lifecycle_events_are_inert(events in proptest::collection::vec(arb_event(), 0..15)) {
        let ctx = test_context();
        let state = fold(&events);
        for event in [InboundEvent::StreamComplete, InboundEvent::Pong, InboundEvent::AgentInitialized] {
            let t = reduce(&state, &ctx, Action::Inbound { id: "x".to_string(), event, at: 0 });
            prop_assert_eq!(&t.state, &state);
            prop_assert!(t.effects.is_empty());
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Replaying a stored log leaves the same transcript as receiving it live
    #[test]
    fn prop_replay_matches_live(events in proptest::collection::vec(arb_event(), 0..40)) {
        let replay = ReplayController::new("s1", session_log(&events));
        let mut replayed = test_store();
        replay_batch(&mut replayed, &replay);

        let mut live = test_store();
        live.apply(Input::Event(Envelope::new(
            "conn",
            "connection_established",
            json!({"workspace_path": "/ws/s1"}),
        )));
        for envelope in replay.envelopes() {
            live.apply(Input::Event(envelope));
        }

        // Replay always ends as a completed, idle session bound to its id
        let mut expected = live.state().clone();
        expected.session_id = Some("s1".to_string());
        expected.is_loading = false;
        expected.is_completed = true;

        prop_assert_eq!(replayed.state(), &expected);
        prop_assert_eq!(replayed.state().open_calls(), live.state().open_calls());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // The paced runtime replay ends where the unpaced batch does
    #[test]
    fn prop_runtime_replay_matches_batch(events in proptest::collection::vec(arb_event(), 0..25)) {
        let log = session_log(&events);
        let mut batch = test_store();
        replay_batch(&mut batch, &ReplayController::new("s1", log.clone()));

        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let paced = rt.block_on(async {
            let api = MockSessionApi::new().with_log("s1", log);
            let (runtime, handle) = SessionRuntime::new(test_store(), MockTransport::new(), api, Duration::ZERO);
            let task = tokio::spawn(runtime.run());
            handle.replay("s1").await.unwrap();
            drop(handle);
            task.await.unwrap()
        });

        prop_assert_eq!(&paced, batch.state());
    }
}
