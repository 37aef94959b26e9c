use std::collections::HashSet;

use serde_json::Value;
use wheel_game::{
    RewardKind, SliceCatalog, ThemeTier, WheelConfig, WheelConfigError, ZoneFiller, ZoneKind,
    default_zones, generate_zones,
};

const SLICES_JSON: &str = include_str!("../data/slices.json");
const WHEEL_JSON: &str = include_str!("../data/wheel.json");

#[test]
fn bundled_catalog_has_expected_pools() {
    let catalog = SliceCatalog::from_json(SLICES_JSON).unwrap();
    assert_eq!(catalog, SliceCatalog::load_default());

    assert!(
        catalog
            .point_slices()
            .iter()
            .all(|slice| slice.reward_kind == RewardKind::Points && !slice.is_bomb)
    );
    assert!(
        catalog
            .chest_slices()
            .iter()
            .all(|slice| slice.reward_kind == RewardKind::Chest && !slice.is_bomb)
    );
    let bomb = catalog.bomb_slice().unwrap();
    assert!(bomb.is_bomb);
    assert_eq!(bomb.reward_value, 0);

    let special = catalog.special_chest().unwrap();
    assert_eq!(special.reward_kind, RewardKind::Chest);

    let ids: HashSet<&str> = catalog.iter().map(|slice| slice.id.as_str()).collect();
    assert_eq!(ids.len(), catalog.iter().count(), "slice ids are unique");
}

#[test]
fn bundled_catalog_fields_are_authored() {
    let raw: Value = serde_json::from_str(SLICES_JSON).unwrap();
    for pool in ["point_slices", "chest_slices"] {
        for slice in raw[pool].as_array().unwrap() {
            for field in ["id", "name", "icon", "reward_kind", "reward_value", "description"] {
                assert!(
                    slice.get(field).is_some(),
                    "{pool} entry {} missing {field}",
                    slice["id"]
                );
            }
        }
    }
}

#[test]
fn bundled_config_matches_defaults() {
    let parsed = WheelConfig::from_json(WHEEL_JSON).unwrap();
    assert_eq!(parsed, WheelConfig::default());
    assert_eq!(parsed.zone_count, 30);
    assert_eq!(parsed.slices_per_zone, 8);
    assert_eq!(parsed.score_key, "total_score");
    assert_eq!(parsed.continues.price_for(0), 100);
    assert_eq!(parsed.continues.price_for(2), 300);
}

#[test]
fn partial_config_takes_defaults() {
    let parsed = WheelConfig::from_json(r#"{ "continues": { "base_price": 40 } }"#).unwrap();
    assert_eq!(parsed.continues.base_price, 40);
    assert_eq!(parsed.zone_count, 30);
    assert_eq!(parsed.fill, WheelConfig::default().fill);
}

#[test]
fn overflowing_fill_config_is_rejected() {
    let err = WheelConfig::from_json(r#"{ "fill": { "safe_point_count": 7 } }"#).unwrap_err();
    let cfg_err = err.downcast_ref::<WheelConfigError>().unwrap();
    assert!(matches!(
        cfg_err,
        WheelConfigError::FillOverflow { zone: "safe", .. }
    ));
}

#[test]
fn zone_flags_follow_index_rule() {
    let zones = default_zones();
    assert_eq!(zones.len(), 30);
    for zone in &zones {
        let i = zone.index();
        assert_eq!(zone.is_safe_zone(), i % 5 == 0 && i != 30, "zone {i}");
        assert_eq!(zone.is_super_zone(), i == 30, "zone {i}");
    }
    let shorter = generate_zones(12, 4);
    assert_eq!(shorter.last().unwrap().kind(), ZoneKind::Super);
    assert_eq!(shorter[7].kind(), ZoneKind::Safe);
}

#[test]
fn theme_tiers_line_up_with_zone_kinds() {
    for zone in default_zones() {
        let position = (zone.index() - 1) as usize;
        let tier = ThemeTier::for_zone_index(position, 30, 5);
        let expected = match zone.kind() {
            ZoneKind::Normal => ThemeTier::Bronze,
            ZoneKind::Safe => ThemeTier::Silver,
            ZoneKind::Super => ThemeTier::Gold,
        };
        assert_eq!(tier, expected, "zone {}", zone.index());
    }
}

#[test]
fn filled_zones_match_kind_layout() {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    let catalog = SliceCatalog::load_default();
    let filler = ZoneFiller::default();
    let mut rng = SmallRng::seed_from_u64(0x00C0_FFEE);
    for mut zone in default_zones() {
        filler.fill_and_shuffle(&mut zone, &catalog, &mut rng).unwrap();
        let slices = zone.slices();
        assert_eq!(slices.len(), 8);
        match zone.kind() {
            ZoneKind::Normal => assert_eq!(zone.bomb_count(), 1),
            ZoneKind::Safe => {
                assert_eq!(zone.bomb_count(), 0);
                let chests = slices
                    .iter()
                    .filter(|s| s.reward_kind == RewardKind::Chest)
                    .count();
                assert_eq!(chests, 2);
            }
            ZoneKind::Super => {
                assert_eq!(zone.bomb_count(), 0);
                assert!(slices.iter().any(|s| s.is_special));
                assert!(
                    slices
                        .iter()
                        .filter(|s| s.reward_kind == RewardKind::Points)
                        .all(|s| s.reward_value >= 15)
                );
            }
        }
    }
}
