use bundle_api::models::{Bundle, BundleType, PreviewTeam, State};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

fn state_strategy() -> impl Strategy<Value = State> {
    prop::sample::select(State::ALL.to_vec())
}

fn bundle_type_strategy() -> impl Strategy<Value = BundleType> {
    prop_oneof![Just(BundleType::Manual), Just(BundleType::Scheduled)]
}

prop_compose! {
    fn bundle_strategy()(
        id in "[a-f0-9]{8}",
        title in "[A-Za-z0-9 ,.'-]{1,60}",
        bundle_type in bundle_type_strategy(),
        state in state_strategy(),
        teams in prop::collection::vec("[a-z0-9-]{1,16}", 0..6),
        scheduled_secs in 1_700_000_000i64..1_900_000_000i64,
    ) -> Bundle {
        let scheduled_at = match bundle_type {
            BundleType::Scheduled => Utc.timestamp_opt(scheduled_secs, 0).single(),
            BundleType::Manual => None,
        };
        Bundle {
            id,
            bundle_type,
            created_by: None,
            created_at: None,
            last_updated_by: None,
            preview_teams: teams.into_iter().map(|id| PreviewTeam { id }).collect(),
            scheduled_at,
            state,
            title,
            updated_at: None,
            e_tag: String::new(),
        }
    }
}

proptest! {
    #[test]
    fn prop_bundle_survives_external_representation(bundle in bundle_strategy()) {
        let json = serde_json::to_string(&bundle).unwrap();
        let parsed: Bundle = serde_json::from_str(&json).unwrap();

        prop_assert_eq!(parsed.bundle_type, bundle.bundle_type);
        prop_assert_eq!(parsed.state, bundle.state);
        prop_assert_eq!(&parsed.title, &bundle.title);
        prop_assert_eq!(parsed.preview_team_ids(), bundle.preview_team_ids());
        prop_assert_eq!(parsed.scheduled_at, bundle.scheduled_at);
    }

    #[test]
    fn prop_state_wire_name_parses_back(state in state_strategy()) {
        let wire = serde_json::to_value(state).unwrap();
        prop_assert_eq!(wire.as_str(), Some(state.as_str()));
        prop_assert_eq!(state.as_str().parse::<State>().unwrap(), state);
    }
}
