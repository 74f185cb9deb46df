//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use crate::menu::MenuAction;
use crate::pairing::RosterEntry;
use crate::store::{ParticipantId, RegisterOutcome};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> ConvContext {
    ConvContext::new(ParticipantId(1))
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_state() -> impl Strategy<Value = ConvState> {
    prop_oneof![
        Just(ConvState::SelectingAction),
        Just(ConvState::TypingNickname),
        Just(ConvState::TypingCredential),
    ]
}

fn arb_action() -> impl Strategy<Value = MenuAction> {
    proptest::sample::select(MenuAction::ALL.to_vec())
}

fn arb_roster() -> impl Strategy<Value = Vec<RosterEntry>> {
    proptest::collection::vec(
        (any::<i64>(), "[a-zA-Z]{1,8}").prop_map(|(id, name)| RosterEntry {
            participant: ParticipantId(id),
            name,
        }),
        1..6,
    )
}

fn arb_outcome() -> impl Strategy<Value = RegisterOutcome> {
    prop_oneof![
        Just(RegisterOutcome::AlreadyRegistered),
        Just(RegisterOutcome::MissingData),
        (1usize..10).prop_map(|capacity| RegisterOutcome::CapacityFull { capacity }),
        (1usize..10, proptest::option::of(arb_roster())).prop_map(|(count, roster)| {
            RegisterOutcome::Registered {
                count,
                capacity: count,
                roster,
            }
        }),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        proptest::option::of("[a-zA-Z]{0,10}")
            .prop_map(|given_name| Event::Start { given_name }),
        arb_action().prop_map(|action| Event::Action { action }),
        ".{0,20}".prop_map(|text| Event::Text { text }),
        any::<bool>().prop_map(|verified| Event::CredentialChecked { verified }),
        arb_outcome().prop_map(|outcome| Event::RegistrationFinished { outcome }),
    ]
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Start is a valid fallback from every state and always lands on the menu
    #[test]
    fn prop_start_always_returns_to_menu(state in arb_state(), name in proptest::option::of("[a-z]{1,5}")) {
        let result = transition(&state, &test_context(), Event::Start { given_name: name }).unwrap();
        prop_assert_eq!(result.new_state, ConvState::SelectingAction);
        let opens_session = matches!(result.effects[0], Effect::OpenSession { .. });
        prop_assert!(opens_session);
    }

    /// Non-empty text in a typing state is always consumed and returns to the menu
    #[test]
    fn prop_text_consumed_in_typing_states(
        state in prop_oneof![Just(ConvState::TypingNickname), Just(ConvState::TypingCredential)],
        text in ".{1,20}",
    ) {
        let result = transition(&state, &test_context(), Event::Text { text }).unwrap();
        prop_assert_eq!(result.new_state, ConvState::SelectingAction);
    }

    /// Only the nickname state stores a nickname, and only the credential
    /// state checks a credential
    #[test]
    fn prop_input_routed_by_state(state in arb_state(), event in arb_event()) {
        if let Ok(result) = transition(&state, &test_context(), event) {
            let saves = result.effects.iter().any(|e| matches!(e, Effect::SaveNickname { .. }));
            let checks = result.effects.iter().any(|e| matches!(e, Effect::CheckCredential { .. }));
            if saves {
                prop_assert_eq!(state, ConvState::TypingNickname);
            }
            if checks {
                prop_assert_eq!(state, ConvState::TypingCredential);
            }
        }
    }

    /// The raffle only starts from a registration that carried a roster
    #[test]
    fn prop_raffle_only_from_filling_registration(state in arb_state(), event in arb_event()) {
        let carried_roster = matches!(
            &event,
            Event::RegistrationFinished { outcome: RegisterOutcome::Registered { roster: Some(_), .. } }
        );
        if let Ok(result) = transition(&state, &test_context(), event) {
            let raffles = result.effects.iter().filter(|e| matches!(e, Effect::RunRaffle { .. })).count();
            prop_assert!(raffles <= 1);
            prop_assert_eq!(raffles == 1, carried_roster);
        }
    }

    /// Only the join action asks the store to register
    #[test]
    fn prop_register_only_from_join(state in arb_state(), event in arb_event()) {
        let is_join = matches!(event, Event::Action { action: MenuAction::Join });
        if let Ok(result) = transition(&state, &test_context(), event) {
            let registers = result.effects.contains(&Effect::TryRegister);
            prop_assert_eq!(registers, is_join);
            if registers {
                prop_assert_eq!(result.new_state, ConvState::SelectingAction);
            }
        }
    }

    /// Rejected events are exactly the ones the current state cannot consume
    #[test]
    fn prop_rejections_match_state(state in arb_state(), event in arb_event()) {
        let expect_reject = match (&state, &event) {
            (_, Event::Start { .. }) => false,
            (ConvState::SelectingAction, Event::Text { .. }) => true,
            (ConvState::SelectingAction, _) => false,
            (_, Event::Text { .. }) => false,
            _ => true,
        };
        let result = transition(&state, &test_context(), event);
        prop_assert_eq!(result.is_err(), expect_reject);
    }

    /// Any event sequence keeps the machine in a known state
    #[test]
    fn prop_sequences_never_panic(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut state = ConvState::default();
        for event in events {
            if let Ok(result) = transition(&state, &test_context(), event) {
                state = result.new_state;
            }
        }
        prop_assert!(matches!(
            state,
            ConvState::SelectingAction | ConvState::TypingNickname | ConvState::TypingCredential
        ));
    }
}
