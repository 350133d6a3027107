//! Property-based tests for the session store

use super::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Append(Role, String),
    AppendNamed(String, String),
    Replace(String),
    Reset,
}

fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::User), Just(Role::Assistant)]
}

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ?]{0,30}"
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (arb_role(), arb_text()).prop_map(|(r, t)| Op::Append(r, t)),
        2 => ("[a-z]{1,10}", arb_text()).prop_map(|(r, t)| Op::AppendNamed(r, t)),
        1 => arb_text().prop_map(Op::Replace),
        1 => Just(Op::Reset),
    ]
}

fn apply(session: &mut Session, op: &Op) {
    match op {
        Op::Append(role, text) => {
            session.append_turn(*role, text.clone());
        }
        Op::AppendNamed(role, text) => {
            let _ = session.append_named_turn(role, text.clone());
        }
        Op::Replace(text) => session.replace_transcript_with_single_user_turn(text.clone()),
        Op::Reset => session.reset(),
    }
}

proptest! {
    #[test]
    fn prop_append_preserves_order(
        turns in proptest::collection::vec((arb_role(), arb_text()), 0..40),
    ) {
        let mut session = Session::default();
        for (role, text) in &turns {
            session.append_turn(*role, text.clone());
        }

        prop_assert_eq!(session.transcript().len(), turns.len());
        for (turn, (role, text)) in session.transcript().iter().zip(&turns) {
            prop_assert_eq!(turn.role, *role);
            prop_assert_eq!(&turn.text, text);
        }

        let expected_questions: Vec<&String> = turns
            .iter()
            .filter(|(role, _)| *role == Role::User)
            .map(|(_, text)| text)
            .collect();
        let actual: Vec<&String> = session.asked_questions().iter().collect();
        prop_assert_eq!(actual, expected_questions);
    }

    #[test]
    fn prop_reset_always_empties(ops in proptest::collection::vec(arb_op(), 0..30)) {
        let mut session = Session::default();
        for op in &ops {
            apply(&mut session, op);
        }

        session.reset();

        prop_assert!(!session.greeted());
        prop_assert!(session.transcript().is_empty());
        prop_assert!(session.asked_questions().is_empty());
        prop_assert!(session.refresh_pending());
    }

    #[test]
    fn prop_replace_leaves_questions_untouched(
        ops in proptest::collection::vec(arb_op(), 0..30),
        text in arb_text(),
    ) {
        let mut session = Session::default();
        for op in &ops {
            apply(&mut session, op);
        }
        let before = session.asked_questions().to_vec();

        session.replace_transcript_with_single_user_turn(text.clone());

        prop_assert_eq!(session.transcript().len(), 1);
        prop_assert_eq!(session.transcript()[0].role, Role::User);
        prop_assert_eq!(&session.transcript()[0].text, &text);
        prop_assert_eq!(session.asked_questions(), before.as_slice());
        prop_assert!(session.refresh_pending());
    }

    #[test]
    fn prop_invalid_role_leaves_transcript_unchanged(
        ops in proptest::collection::vec(arb_op(), 0..20),
        role in "[a-z]{1,10}"
            .prop_filter("must not be a valid role", |r| r != "user" && r != "assistant"),
        text in arb_text(),
    ) {
        let mut session = Session::default();
        for op in &ops {
            apply(&mut session, op);
        }
        let transcript = session.transcript().to_vec();
        let questions = session.asked_questions().to_vec();

        let result = session.append_named_turn(&role, text);

        prop_assert!(matches!(result, Err(SessionError::InvalidRole(_))));
        prop_assert_eq!(session.transcript(), transcript.as_slice());
        prop_assert_eq!(session.asked_questions(), questions.as_slice());
    }
}
