// ═══════════════════════════════════════════════════════════════════
// Service Tests: TransitionService, ViewService, StoreService
// ═══════════════════════════════════════════════════════════════════

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use token_pulse_core::models::intent::Intent;
use token_pulse_core::models::state::{AppState, DisplayMode, SortKey};
use token_pulse_core::models::store::RecordStore;
use token_pulse_core::models::token::{Category, Token, TokenId};
use token_pulse_core::models::views::CategorizedViews;
use token_pulse_core::services::store_service::StoreService;
use token_pulse_core::services::transition_service::TransitionService;
use token_pulse_core::services::view_service::ViewService;

// ═══════════════════════════════════════════════════════════════════
// Fixtures
// ═══════════════════════════════════════════════════════════════════

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
}

/// Token created `age_secs` seconds before the base time.
fn token(id: &str, ticker: &str, category: Category, market_cap: f64, age_secs: i64) -> Token {
    Token::new(
        id,
        ticker,
        format!("{ticker} Token"),
        category,
        0.001,
        market_cap,
        base_time() - Duration::seconds(age_secs),
    )
}

fn fixture_tokens() -> Vec<Token> {
    vec![
        token("t0", "PEPE", Category::NewPairs, 10_000.0, 50),
        token("t1", "WOJAK", Category::FinalStretch, 30_000.0, 10),
        token("t2", "CHAD", Category::Migrated, 20_000.0, 30),
        token("t3", "DOGE", Category::NewPairs, 40_000.0, 20),
        token("t4", "PEPECOIN", Category::Migrated, 5_000.0, 40),
    ]
}

fn loaded_state() -> Arc<AppState> {
    TransitionService::new().apply(&AppState::initial(), Intent::BulkLoad(fixture_tokens()))
}

fn ids(tokens: &[Arc<Token>]) -> Vec<&str> {
    tokens.iter().map(|t| t.id.as_str()).collect()
}

fn update(id: &str, price: f64, market_cap: f64) -> Intent {
    Intent::UpdatePrice {
        id: TokenId::from(id),
        price,
        market_cap,
    }
}

fn assert_store_consistent(records: &RecordStore) {
    let mut seen = HashSet::new();
    for record in records.iter() {
        assert!(seen.insert(record.id.clone()), "duplicate id {}", record.id);
        let looked_up = records.get(&record.id).expect("lookup missing record");
        assert!(Arc::ptr_eq(looked_up, record));
    }
    assert_eq!(seen.len(), records.len());
}

// ═══════════════════════════════════════════════════════════════════
// TransitionService
// ═══════════════════════════════════════════════════════════════════

mod transition {
    use super::*;

    #[test]
    fn bulk_load_replaces_records_and_clears_loading() {
        let state = loaded_state();
        assert!(!state.is_loading);
        assert_eq!(state.records.len(), 5);
        assert_store_consistent(&state.records);
    }

    #[test]
    fn bulk_load_when_already_loaded_overwrites() {
        let svc = TransitionService::new();
        let state = loaded_state();
        let reloaded = svc.apply(
            &state,
            Intent::BulkLoad(vec![token("x", "ELON", Category::Migrated, 1.0, 0)]),
        );
        assert!(!reloaded.is_loading);
        assert_eq!(reloaded.records.len(), 1);
        assert!(reloaded.records.contains(&TokenId::from("x")));
        assert!(!reloaded.records.contains(&TokenId::from("t0")));
    }

    #[test]
    fn bulk_load_keeps_other_fields() {
        let svc = TransitionService::new();
        let state = svc.apply_all(
            &AppState::initial(),
            [
                Intent::SetFilter("pe".into()),
                Intent::SetSort(SortKey::MarketCap),
                Intent::BulkLoad(fixture_tokens()),
            ],
        );
        assert_eq!(state.filter, "pe");
        assert_eq!(state.sort_by, SortKey::MarketCap);
    }

    #[test]
    fn price_update_sets_previous_price_to_old_price() {
        let svc = TransitionService::new();
        let state = loaded_state();
        let id = TokenId::from("t1");
        let old_price = state.records.get(&id).unwrap().price;

        let next = svc.apply(&state, update("t1", 0.002, 31_000.0));
        let record = next.records.get(&id).unwrap();
        assert_eq!(record.previous_price, old_price);
        assert_eq!(record.price, 0.002);
        assert_eq!(record.market_cap, 31_000.0);
    }

    #[test]
    fn previous_price_lags_by_exactly_one_update() {
        let svc = TransitionService::new();
        let state = svc.apply_all(
            &loaded_state(),
            [
                update("t0", 0.002, 1.0),
                update("t0", 0.003, 1.0),
                update("t0", 0.004, 1.0),
            ],
        );
        let record = state.records.get(&TokenId::from("t0")).unwrap();
        assert_eq!(record.price, 0.004);
        assert_eq!(record.previous_price, 0.003);
    }

    #[test]
    fn price_update_for_unknown_id_returns_same_state() {
        let svc = TransitionService::new();
        let state = loaded_state();
        let next = svc.apply(&state, update("missing", 1.0, 1.0));
        assert!(Arc::ptr_eq(&state, &next));
    }

    #[test]
    fn price_update_before_load_is_ignored() {
        let svc = TransitionService::new();
        let state = AppState::initial();
        let next = svc.apply(&state, update("t0", 1.0, 1.0));
        assert!(Arc::ptr_eq(&state, &next));
    }

    #[test]
    fn price_update_with_invalid_amounts_is_ignored() {
        let svc = TransitionService::new();
        let state = loaded_state();
        for (price, cap) in [(f64::NAN, 1.0), (1.0, f64::INFINITY), (-1.0, 1.0), (1.0, -5.0)] {
            let next = svc.apply(&state, update("t0", price, cap));
            assert!(Arc::ptr_eq(&state, &next), "accepted ({price}, {cap})");
        }
    }

    #[test]
    fn lookup_and_collection_agree_after_many_updates() {
        let svc = TransitionService::new();
        let mut state = loaded_state();
        let ids = ["t0", "t1", "t2", "t3", "t4", "nope"];
        for step in 0..200 {
            let id = ids[step % ids.len()];
            let price = 0.001 + step as f64 * 0.0001;
            state = svc.apply(&state, update(id, price, price * 1e7));
            assert_store_consistent(&state.records);
        }
        assert_eq!(state.records.len(), 5);
    }

    #[test]
    fn price_update_never_changes_category_or_order() {
        let svc = TransitionService::new();
        let state = loaded_state();
        let next = svc.apply(&state, update("t2", 0.5, 99_999.0));
        let before: Vec<(&str, Category)> = state.records.iter().map(|t| (t.id.as_str(), t.category)).collect();
        let after: Vec<(&str, Category)> = next.records.iter().map(|t| (t.id.as_str(), t.category)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn set_filter_replaces_only_filter() {
        let svc = TransitionService::new();
        let state = loaded_state();
        let next = svc.apply(&state, Intent::SetFilter("doge".into()));
        assert_eq!(next.filter, "doge");
        assert!(next.records.same_records(&state.records));
        assert_eq!(next.sort_by, state.sort_by);
        assert_eq!(next.is_loading, state.is_loading);
    }

    #[test]
    fn set_sort() {
        let next = TransitionService::new().apply(&loaded_state(), Intent::SetSort(SortKey::MarketCap));
        assert_eq!(next.sort_by, SortKey::MarketCap);
    }

    #[test]
    fn select_then_deselect_is_idempotent() {
        let svc = TransitionService::new();
        let selected = svc.apply(&loaded_state(), Intent::Select(Some(TokenId::from("t3"))));
        assert_eq!(selected.selected_id, Some(TokenId::from("t3")));
        assert_eq!(selected.selected_token().unwrap().ticker, "DOGE");

        let cleared = svc.apply(&selected, Intent::Select(None));
        assert!(cleared.selected_id.is_none());
        let cleared_again = svc.apply(&cleared, Intent::Select(None));
        assert!(cleared_again.selected_id.is_none());
        assert!(cleared_again.records.same_records(&cleared.records));
    }

    #[test]
    fn display_modes_are_independent_per_category() {
        let svc = TransitionService::new();
        let state = svc.apply_all(
            &loaded_state(),
            [
                Intent::SetDisplayMode {
                    category: Category::NewPairs,
                    mode: DisplayMode::P2,
                },
                Intent::SetDisplayMode {
                    category: Category::Migrated,
                    mode: DisplayMode::P3,
                },
            ],
        );
        assert_eq!(state.display_mode(Category::NewPairs), DisplayMode::P2);
        assert_eq!(state.display_mode(Category::FinalStretch), DisplayMode::P1);
        assert_eq!(state.display_mode(Category::Migrated), DisplayMode::P3);
    }

    #[test]
    fn filter_panel_open_and_close() {
        let svc = TransitionService::new();
        let open = svc.apply(&loaded_state(), Intent::OpenFilterPanel(Some(Category::FinalStretch)));
        assert_eq!(open.active_filter_panel, Some(Category::FinalStretch));
        let closed = svc.apply(&open, Intent::OpenFilterPanel(None));
        assert!(closed.active_filter_panel.is_none());
    }

    #[test]
    fn settings_panel_open_and_close() {
        let svc = TransitionService::new();
        let open = svc.apply(&loaded_state(), Intent::SetSettingsOpen(true));
        assert!(open.settings_open);
        let closed = svc.apply(&open, Intent::SetSettingsOpen(false));
        assert!(!closed.settings_open);
    }

    #[test]
    fn input_state_is_never_mutated() {
        let svc = TransitionService::new();
        let state = loaded_state();
        let _ = svc.apply(&state, Intent::SetFilter("x".into()));
        let _ = svc.apply(&state, update("t0", 9.0, 9.0));
        assert_eq!(state.filter, "");
        assert_eq!(state.records.get(&TokenId::from("t0")).unwrap().price, 0.001);
    }

    #[test]
    fn intent_kinds() {
        assert_eq!(Intent::BulkLoad(vec![]).kind(), "bulk_load");
        assert_eq!(update("a", 1.0, 1.0).kind(), "update_price");
        assert_eq!(Intent::Select(None).kind(), "select");
        assert_eq!(Intent::SetSettingsOpen(true).kind(), "set_settings_open");
    }
}

// ═══════════════════════════════════════════════════════════════════
// ViewService
// ═══════════════════════════════════════════════════════════════════

mod views {
    use super::*;

    fn all_ids(views: &CategorizedViews) -> Vec<String> {
        views
            .iter()
            .flat_map(|(_, tokens)| tokens.iter().map(|t| t.id.to_string()))
            .collect()
    }

    #[test]
    fn sorts_by_creation_time_newest_first() {
        let state = loaded_state();
        let views = ViewService::compute(&state.records, "", SortKey::CreatedAt);
        assert_eq!(ids(&views.new_pairs), vec!["t3", "t0"]);
        assert_eq!(ids(&views.final_stretch), vec!["t1"]);
        assert_eq!(ids(&views.migrated), vec!["t2", "t4"]);
    }

    #[test]
    fn sorts_by_market_cap_largest_first() {
        let state = loaded_state();
        let views = ViewService::compute(&state.records, "", SortKey::MarketCap);
        assert_eq!(ids(&views.new_pairs), vec!["t3", "t0"]);
        assert_eq!(ids(&views.migrated), vec!["t2", "t4"]);
    }

    #[test]
    fn market_cap_sort_is_stable_for_ties() {
        let records = RecordStore::from_records(vec![
            token("first", "AAA", Category::NewPairs, 100.0, 0),
            token("big", "BBB", Category::NewPairs, 500.0, 0),
            token("second", "CCC", Category::NewPairs, 100.0, 0),
        ]);
        let views = ViewService::compute(&records, "", SortKey::MarketCap);
        assert_eq!(ids(&views.new_pairs), vec!["big", "first", "second"]);
    }

    #[test]
    fn creation_time_sort_is_stable_for_ties() {
        let records = RecordStore::from_records(vec![
            token("a", "AAA", Category::Migrated, 1.0, 5),
            token("b", "BBB", Category::Migrated, 2.0, 5),
            token("c", "CCC", Category::Migrated, 3.0, 5),
        ]);
        let views = ViewService::compute(&records, "", SortKey::CreatedAt);
        assert_eq!(ids(&views.migrated), vec!["a", "b", "c"]);
    }

    #[test]
    fn filter_matches_ticker_case_insensitively() {
        let records = RecordStore::from_records(vec![
            token("p", "PEPE", Category::NewPairs, 1.0, 0),
            token("w", "WOJAK", Category::NewPairs, 1.0, 0),
        ]);
        for query in ["PEP", "pep", "Pep"] {
            let views = ViewService::compute(&records, query, SortKey::CreatedAt);
            assert_eq!(ids(&views.new_pairs), vec!["p"], "query {query}");
            assert_eq!(views.total_len(), 1);
        }
    }

    #[test]
    fn filter_matches_name() {
        let records = RecordStore::from_records(vec![
            Token::new("x", "XYZ", "HyperDoge", Category::FinalStretch, 1.0, 1.0, base_time()),
            Token::new("y", "ABC", "AlphaMeme", Category::FinalStretch, 1.0, 1.0, base_time()),
        ]);
        let views = ViewService::compute(&records, "hyper", SortKey::CreatedAt);
        assert_eq!(ids(&views.final_stretch), vec!["x"]);
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let state = loaded_state();
        let views = ViewService::compute(&state.records, "", SortKey::CreatedAt);
        assert_eq!(views.total_len(), state.records.len());
    }

    #[test]
    fn filter_without_matches_yields_empty_views() {
        let state = loaded_state();
        let views = ViewService::compute(&state.records, "zzz", SortKey::CreatedAt);
        assert!(views.is_empty());
    }

    #[test]
    fn one_record_per_category_lands_in_its_own_view() {
        let state = TransitionService::new().apply(
            &AppState::initial(),
            Intent::BulkLoad(vec![
                token("n", "NEW", Category::NewPairs, 1.0, 0),
                token("f", "FIN", Category::FinalStretch, 1.0, 0),
                token("m", "MIG", Category::Migrated, 1.0, 0),
            ]),
        );
        let views = ViewService::new().derive_for(&state);
        assert_eq!(ids(&views.new_pairs), vec!["n"]);
        assert_eq!(ids(&views.final_stretch), vec!["f"]);
        assert_eq!(ids(&views.migrated), vec!["m"]);
    }

    #[test]
    fn partition_covers_working_set_exactly_once() {
        let state = loaded_state();
        for (filter, sort) in [
            ("", SortKey::CreatedAt),
            ("pe", SortKey::MarketCap),
            ("o", SortKey::CreatedAt),
        ] {
            let views = ViewService::compute(&state.records, filter, sort);
            let mut seen = all_ids(&views);
            let expected: HashSet<String> = state
                .records
                .iter()
                .filter(|t| t.matches(filter))
                .map(|t| t.id.to_string())
                .collect();
            assert_eq!(seen.len(), expected.len(), "duplicate or dropped record for {filter:?}");
            seen.sort();
            let mut expected: Vec<String> = expected.into_iter().collect();
            expected.sort();
            assert_eq!(seen, expected);

            for (category, tokens) in views.iter() {
                assert!(tokens.iter().all(|t| t.category == category));
            }
        }
    }

    #[test]
    fn unchanged_inputs_return_same_views() {
        let state = loaded_state();
        let mut svc = ViewService::new();
        let first = svc.derive_for(&state);
        let second = svc.derive_for(&state);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(svc.recomputations(), 1);
    }

    #[test]
    fn unrelated_state_changes_keep_cached_views() {
        let transitions = TransitionService::new();
        let mut svc = ViewService::new();
        let state = loaded_state();
        let first = svc.derive_for(&state);

        let selected = transitions.apply(&state, Intent::Select(Some(TokenId::from("t0"))));
        let panel = transitions.apply(&selected, Intent::OpenFilterPanel(Some(Category::Migrated)));
        let second = svc.derive_for(&panel);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(svc.recomputations(), 1);
    }

    #[test]
    fn filter_change_recomputes_exactly_once() {
        let transitions = TransitionService::new();
        let mut svc = ViewService::new();
        let state = loaded_state();
        let before = svc.derive_for(&state);

        let filtered = transitions.apply(&state, Intent::SetFilter("doge".into()));
        let after = svc.derive_for(&filtered);
        let again = svc.derive_for(&filtered);

        assert!(!Arc::ptr_eq(&before, &after));
        assert!(Arc::ptr_eq(&after, &again));
        assert_eq!(svc.recomputations(), 2);
        assert_eq!(ids(&after.new_pairs), vec!["t3"]);
        assert_eq!(after.total_len(), 1);
    }

    #[test]
    fn setting_the_same_filter_text_is_a_cache_hit() {
        let transitions = TransitionService::new();
        let mut svc = ViewService::new();
        let state = transitions.apply(&loaded_state(), Intent::SetFilter("pe".into()));
        let first = svc.derive_for(&state);
        let same_text = transitions.apply(&state, Intent::SetFilter("pe".into()));
        assert!(Arc::ptr_eq(&first, &svc.derive_for(&same_text)));
    }

    #[test]
    fn sort_change_recomputes() {
        let transitions = TransitionService::new();
        let mut svc = ViewService::new();
        let state = loaded_state();
        svc.derive_for(&state);
        svc.derive_for(&transitions.apply(&state, Intent::SetSort(SortKey::MarketCap)));
        assert_eq!(svc.recomputations(), 2);
    }

    #[test]
    fn price_update_recomputes_and_reorders() {
        let transitions = TransitionService::new();
        let mut svc = ViewService::new();
        let state = transitions.apply(&loaded_state(), Intent::SetSort(SortKey::MarketCap));
        let before = svc.derive_for(&state);
        assert_eq!(ids(&before.new_pairs), vec!["t3", "t0"]);

        let bumped = transitions.apply(&state, update("t0", 0.01, 90_000.0));
        let after = svc.derive_for(&bumped);
        assert_eq!(ids(&after.new_pairs), vec!["t0", "t3"]);
        assert_eq!(svc.recomputations(), 2);
    }

    #[test]
    fn ignored_update_keeps_cached_views() {
        let transitions = TransitionService::new();
        let mut svc = ViewService::new();
        let state = loaded_state();
        let before = svc.derive_for(&state);
        let same = transitions.apply(&state, update("unknown", 1.0, 1.0));
        assert!(Arc::ptr_eq(&before, &svc.derive_for(&same)));
    }

    #[test]
    fn invalidate_forces_recompute() {
        let state = loaded_state();
        let mut svc = ViewService::new();
        let first = svc.derive_for(&state);
        svc.invalidate();
        let second = svc.derive_for(&state);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
    }
}

// ═══════════════════════════════════════════════════════════════════
// StoreService
// ═══════════════════════════════════════════════════════════════════

mod store {
    use super::*;

    #[test]
    fn starts_loading_and_empty() {
        let store = StoreService::new();
        let snap = store.snapshot();
        assert!(snap.is_loading());
        assert!(snap.state.records.is_empty());
        assert!(snap.views.is_empty());
    }

    #[test]
    fn dispatch_publishes_consistent_snapshot() {
        let mut store = StoreService::new();
        assert!(store.dispatch(Intent::BulkLoad(fixture_tokens())));
        assert!(store.dispatch(Intent::SetFilter("pepe".into())));

        let snap = store.snapshot();
        assert!(Arc::ptr_eq(&snap.state, store.state()));
        let expected = ViewService::compute(&snap.state.records, &snap.state.filter, snap.state.sort_by);
        assert_eq!(*snap.views, expected);
        assert_eq!(ids(&snap.views.new_pairs), vec!["t0"]);
        assert_eq!(ids(&snap.views.migrated), vec!["t4"]);
    }

    #[test]
    fn ignored_intent_publishes_nothing() {
        let mut store = StoreService::new();
        store.dispatch(Intent::BulkLoad(fixture_tokens()));
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        assert!(!store.dispatch(update("missing", 1.0, 1.0)));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn subscribers_see_latest_snapshot() {
        let mut store = StoreService::new();
        let mut rx = store.subscribe();
        store.dispatch(Intent::BulkLoad(fixture_tokens()));
        assert!(rx.has_changed().unwrap());
        let snap = rx.borrow_and_update().clone();
        assert!(!snap.is_loading());
        assert_eq!(snap.views.total_len(), 5);
    }

    #[test]
    fn views_are_reused_across_non_view_intents() {
        let mut store = StoreService::new();
        store.dispatch(Intent::BulkLoad(fixture_tokens()));
        let before = store.snapshot();
        store.dispatch(Intent::SetSettingsOpen(true));
        let after = store.snapshot();
        assert!(after.state.settings_open);
        assert!(Arc::ptr_eq(&before.views, &after.views));
        // Initial derive plus the bulk load.
        assert_eq!(store.view_recomputations(), 2);
    }

    #[test]
    fn snapshot_selected_token_and_json() {
        let mut store = StoreService::new();
        store.dispatch(Intent::BulkLoad(fixture_tokens()));
        store.dispatch(Intent::Select(Some(TokenId::from("t1"))));
        let snap = store.snapshot();
        assert_eq!(snap.selected_token().unwrap().ticker, "WOJAK");

        let json: serde_json::Value = serde_json::from_str(&snap.to_json().unwrap()).unwrap();
        assert_eq!(json["state"]["selected_id"], "t1");
        assert_eq!(json["state"]["is_loading"], false);
        assert_eq!(json["views"]["final_stretch"][0]["ticker"], "WOJAK");
    }

    #[tokio::test]
    async fn dispatcher_applies_queued_intents_in_order() {
        let store = StoreService::new();
        let rx_snapshots = store.subscribe();
        let (tx, rx) = mpsc::unbounded_channel();
        let active = Arc::new(AtomicBool::new(true));

        tx.send(Intent::BulkLoad(fixture_tokens())).unwrap();
        tx.send(Intent::SetFilter("first".into())).unwrap();
        tx.send(Intent::SetFilter("second".into())).unwrap();
        drop(tx);
        store.run(rx, active).await;

        let snap = rx_snapshots.borrow().clone();
        assert!(!snap.is_loading());
        assert_eq!(snap.state.filter, "second");
    }

    #[tokio::test]
    async fn dispatcher_drops_intents_queued_after_deactivation() {
        let store = StoreService::new();
        let rx_snapshots = store.subscribe();
        let (tx, rx) = mpsc::unbounded_channel();
        let active = Arc::new(AtomicBool::new(true));

        tx.send(Intent::BulkLoad(fixture_tokens())).unwrap();
        tx.send(Intent::SetFilter("x".into())).unwrap();
        active.store(false, Ordering::Release);
        drop(tx);
        store.run(rx, Arc::clone(&active)).await;

        let snap = rx_snapshots.borrow().clone();
        assert!(snap.is_loading());
        assert!(snap.state.records.is_empty());
        assert_eq!(snap.state.filter, "");
    }
}
