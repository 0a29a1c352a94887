//! Property tests for volleys driven through the encounter.

mod test_utils;

use choreo_encounter::prelude::*;
use choreo_graph::prelude::*;
use proptest::prelude::*;
use test_utils::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Every projectile of a volley is acquired once and recycled once, and
    /// the boss always gets control back.
    #[test]
    fn volley_projectiles_all_come_back(
        count in 1_u32..8,
        interval in 0_u64..120,
        dt in 10_u64..60,
        warm in 0_usize..8,
    ) {
        let events = EventRegistry::new();
        let mut graph = Graph::new("warden");
        graph.create_state("Idle", "").expect("fresh");
        timed_state(&mut graph, "Recover", ms(600_000));
        let volley = ProjectileArray::new("Volley", "orb")
            .entered_from("Idle", "fire")
            .then("Recover")
            .with_volley(count, ms(interval));
        let mut encounter = encounter(graph, &events, &[&volley], warm);
        let mut host = RecordingHost::new();
        encounter.boss_mut().raise(events.find_event("fire").expect("registered"));

        let reports = run(&mut encounter, &mut host, ms(dt), 200);

        let started: usize = reports.iter().map(|r| r.started.len()).sum();
        let recycled: usize = reports.iter().map(|r| r.recycled.len()).sum();
        prop_assert_eq!(started, 1);
        prop_assert_eq!(recycled, count as usize);
        prop_assert_eq!(encounter.boss().active_state_name(), "Recover");

        let stats = encounter.pool().stats();
        prop_assert_eq!(stats.acquired, u64::from(count));
        prop_assert_eq!(stats.released, u64::from(count));
        prop_assert!(stats.exhausted_fallbacks <= u64::from(count).saturating_sub(warm as u64));
        prop_assert_eq!(encounter.pool().in_use().count(), 0);
    }
}
