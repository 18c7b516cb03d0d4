use std::fs;

use playhub::types::PlanId;
use pretty_assertions::assert_eq;

use crate::preferences::{
    load_preferences, save_preferences, FileStorage, MemoryStorage, PreferenceStorage, Preferences,
    PREFERENCES_KEY,
};

#[test]
fn defaults_when_nothing_is_stored() {
    let storage = MemoryStorage::new();

    assert_eq!(
        load_preferences(&storage),
        Preferences {
            selected_plan: PlanId::Plan0,
            slippage_bps: 50,
        }
    );
}

#[test]
fn save_then_load() {
    let storage = MemoryStorage::new();
    let preferences = Preferences {
        selected_plan: PlanId::Plan1,
        slippage_bps: 300,
    };

    save_preferences(&storage, &preferences).unwrap();

    assert_eq!(
        storage.get(PREFERENCES_KEY).unwrap().unwrap(),
        r#"{"selectedPlan":1,"slippageBps":300}"#
    );
    assert_eq!(load_preferences(&storage), preferences);
}

#[test]
fn corrupt_record_falls_back_to_defaults() {
    let storage = MemoryStorage::new();
    storage.set(PREFERENCES_KEY, "{not json").unwrap();

    assert_eq!(load_preferences(&storage), Preferences::default());
}

#[test]
fn unknown_plan_falls_back_to_defaults() {
    let storage = MemoryStorage::new();
    storage
        .set(PREFERENCES_KEY, r#"{"selectedPlan":9,"slippageBps":10}"#)
        .unwrap();

    assert_eq!(load_preferences(&storage), Preferences::default());
}

#[test]
fn out_of_range_slippage_falls_back_to_defaults() {
    let storage = MemoryStorage::new();
    storage
        .set(PREFERENCES_KEY, r#"{"selectedPlan":2,"slippageBps":9000}"#)
        .unwrap();

    assert_eq!(load_preferences(&storage), Preferences::default());
}

#[test]
fn missing_fields_take_defaults() {
    let storage = MemoryStorage::new();
    storage.set(PREFERENCES_KEY, r#"{"selectedPlan":2}"#).unwrap();

    assert_eq!(
        load_preferences(&storage),
        Preferences {
            selected_plan: PlanId::Plan2,
            slippage_bps: 50,
        }
    );
}

#[test]
fn file_storage_round_trip() {
    let dir = std::env::temp_dir().join(format!("playhub-preferences-{}", std::process::id()));
    let storage = FileStorage::new(&dir);
    assert_eq!(storage.get(PREFERENCES_KEY).unwrap(), None);

    let preferences = Preferences {
        selected_plan: PlanId::Plan2,
        slippage_bps: 75,
    };
    save_preferences(&storage, &preferences).unwrap();

    assert!(dir.join("playhub.preferences.json").exists());
    assert_eq!(load_preferences(&storage), preferences);

    fs::remove_dir_all(&dir).unwrap();
}
