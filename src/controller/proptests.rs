//! Property-based tests for the controller
//!
//! Random event sequences against the mock generation service, checking the
//! invariants that must hold after every pass.

use super::testing::setup;
use super::*;
use crate::llm::GenerationError;
use proptest::prelude::*;

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        1 => prop_oneof![Just("key"), Just(""), Just("bad")]
            .prop_map(|k| Event::Credential { api_key: k.to_string() }),
        4 => prop_oneof!["[a-z ]{1,20}", Just("   ".to_string())]
            .prop_map(|text| Event::Question { text }),
        2 => (0usize..4).prop_map(|index| Event::Replay { index }),
        1 => Just(Event::ClearHistory),
        1 => Just(Event::Refresh),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn prop_greeting_at_most_once_between_resets(
        events in proptest::collection::vec(arb_event(), 1..30),
    ) {
        let rt = runtime();
        let (controller, factory) = setup();
        factory.reject_key("bad");
        for _ in 0..100 {
            factory.client().queue_response("ok");
        }

        let mut conv = Conversation::new();
        let mut greetings_since_reset = 0;
        for event in events {
            let cleared = event == Event::ClearHistory;
            let before = factory.client().recorded_prompts().len();
            rt.block_on(controller.handle(&mut conv, event));
            let prompts = factory.client().recorded_prompts();

            if cleared {
                greetings_since_reset = 0;
            }
            greetings_since_reset += prompts[before..]
                .iter()
                .filter(|p| p.as_str() == prompt::greeting())
                .count();
            prop_assert!(greetings_since_reset <= 1);
        }
    }

    #[test]
    fn prop_pass_invariants_hold_with_failures(
        events in proptest::collection::vec((arb_event(), any::<bool>()), 1..30),
    ) {
        let rt = runtime();
        let (controller, factory) = setup();
        factory.reject_key("bad");

        let mut conv = Conversation::new();
        for (event, succeed) in events {
            // Enough canned results for one pass; leftovers are dropped after it
            for _ in 0..2 {
                if succeed {
                    factory.client().queue_response("SELECT 1;");
                } else {
                    factory.client().queue_error(GenerationError::network("down"));
                }
            }

            let was_configured = conv.phase() != Phase::Unconfigured;
            let questions_before = conv.session().asked_questions().len();
            let prompts_before = factory.client().recorded_prompts().len();
            let is_clear = event == Event::ClearHistory;

            let outcome = rt.block_on(controller.handle(&mut conv, event));

            // Refresh requests never outlive the pass that raised them
            prop_assert!(!conv.session().refresh_pending());
            // Configuration is never lost
            if was_configured {
                prop_assert_ne!(conv.phase(), Phase::Unconfigured);
            }
            // Nothing is generated before a key is configured
            if conv.phase() == Phase::Unconfigured {
                prop_assert_eq!(factory.client().recorded_prompts().len(), prompts_before);
            }
            // The question log only shrinks on clear
            if !is_clear {
                prop_assert!(conv.session().asked_questions().len() >= questions_before);
            }
            if outcome.render.is_rebuild() {
                prop_assert!(outcome
                    .notices
                    .iter()
                    .all(|n| n.kind != NoticeKind::InvalidSelection));
            }

            factory.client().clear_queued();
        }
    }
}
