pub mod catalog;

use crate::logic::SimulationPlan;
use catalog::find_catalog_scenario;

// Logic test scenario
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let key = match name.to_lowercase().as_str() {
        "smoke" => "smoke",
        "continue-economy" | "continues" | "economy" => "continue-economy",
        "cash-out" | "cashout" | "bank" => "cash-out",
        "full-loop" | "loop" | "wrap" => "full-loop",
        "zone-layout" | "layout" | "zones" => "zone-layout",
        _ => return None,
    };
    find_catalog_scenario(key)
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    catalog::catalog_entries()
        .iter()
        .map(|entry| (entry.key, entry.title))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_catalog_entries() {
        let scenario = get_scenario("WRAP").unwrap();
        assert_eq!(scenario.name, "Full Loop");
        assert!(get_scenario("economy").is_some());
        assert!(get_scenario("vehicle-system").is_none());
    }

    #[test]
    fn every_listed_scenario_resolves() {
        let listed = list_scenarios();
        assert_eq!(listed.len(), 5);
        for (key, title) in listed {
            let scenario = get_scenario(key).unwrap();
            assert_eq!(scenario.name, title);
        }
    }
}
