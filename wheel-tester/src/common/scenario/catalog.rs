use anyhow::Result;

use crate::common::scenario::TestScenario;
use crate::logic::{GameplayStrategy, SimulationPlan, SimulationSummary};

pub struct CatalogEntry {
    pub key: &'static str,
    pub title: &'static str,
    build: fn() -> SimulationPlan,
}

static CATALOG: [CatalogEntry; 5] = [
    CatalogEntry {
        key: "smoke",
        title: "Smoke Test",
        build: smoke_plan,
    },
    CatalogEntry {
        key: "continue-economy",
        title: "Continue Economy",
        build: continue_economy_plan,
    },
    CatalogEntry {
        key: "cash-out",
        title: "Cash Out at Protected Zones",
        build: cash_out_plan,
    },
    CatalogEntry {
        key: "full-loop",
        title: "Full Loop",
        build: full_loop_plan,
    },
    CatalogEntry {
        key: "zone-layout",
        title: "Zone Layout Sweep",
        build: zone_layout_plan,
    },
];

pub fn catalog_entries() -> &'static [CatalogEntry] {
    &CATALOG
}

pub fn find_catalog_scenario(key: &str) -> Option<TestScenario> {
    CATALOG
        .iter()
        .find(|entry| entry.key == key)
        .map(|entry| TestScenario::simulation(entry.title, (entry.build)()))
}

fn smoke_plan() -> SimulationPlan {
    SimulationPlan::new(GameplayStrategy::Continuer)
        .with_max_steps(50)
        .with_expectation(smoke_expectation)
}

fn continue_economy_plan() -> SimulationPlan {
    SimulationPlan::new(GameplayStrategy::Continuer)
        .with_starting_score(10_000)
        .with_max_steps(300)
        .with_expectation(continue_economy_expectation)
}

fn cash_out_plan() -> SimulationPlan {
    SimulationPlan::new(GameplayStrategy::Cautious)
        .with_max_steps(300)
        .with_expectation(cash_out_expectation)
}

fn full_loop_plan() -> SimulationPlan {
    SimulationPlan::new(GameplayStrategy::Greedy)
        .with_starting_score(1_000_000)
        .with_max_steps(400)
        .with_expectation(full_loop_expectation)
}

fn zone_layout_plan() -> SimulationPlan {
    SimulationPlan::new(GameplayStrategy::Greedy)
        .with_starting_score(1_000_000)
        .with_max_steps(250)
        .with_expectation(zone_layout_expectation)
}

fn smoke_expectation(summary: &SimulationSummary) -> Result<()> {
    anyhow::ensure!(summary.spins > 0, "Smoke run never spun the wheel");
    anyhow::ensure!(summary.zone_loads > 0, "Smoke run never loaded a zone");
    anyhow::ensure!(
        summary.zones_visited.contains(&0),
        "Run should start at the first zone"
    );
    Ok(())
}

fn continue_economy_expectation(summary: &SimulationSummary) -> Result<()> {
    anyhow::ensure!(
        summary.continues_bought > 0,
        "No continue was bought in {} steps",
        summary.steps
    );
    anyhow::ensure!(
        summary.continue_spend >= u64::from(summary.continues_bought) * 100,
        "Continue spend {} too low for {} continues",
        summary.continue_spend,
        summary.continues_bought
    );
    anyhow::ensure!(
        u64::from(summary.final_score) == summary.expected_final_score(),
        "Final score {} does not match accounting {}",
        summary.final_score,
        summary.expected_final_score()
    );
    Ok(())
}

fn cash_out_expectation(summary: &SimulationSummary) -> Result<()> {
    anyhow::ensure!(summary.cash_outs > 0, "Cautious run never cashed out");
    anyhow::ensure!(
        summary.continues_bought == 0,
        "Cautious run bought {} continues",
        summary.continues_bought
    );
    anyhow::ensure!(
        u64::from(summary.final_score) == summary.total_banked,
        "Final score {} differs from banked {}",
        summary.final_score,
        summary.total_banked
    );
    Ok(())
}

fn full_loop_expectation(summary: &SimulationSummary) -> Result<()> {
    anyhow::ensure!(summary.wraps > 0, "Run never wrapped past the last zone");
    anyhow::ensure!(
        summary.max_level > 30,
        "Level stopped at {} after wrapping",
        summary.max_level
    );
    anyhow::ensure!(summary.cash_outs == 0, "Greedy run should never cash out");
    Ok(())
}

fn zone_layout_expectation(summary: &SimulationSummary) -> Result<()> {
    anyhow::ensure!(
        summary.zones_visited.len() == 30,
        "Visited {} of 30 zones",
        summary.zones_visited.len()
    );
    anyhow::ensure!(
        summary.bombs_ignored == 0,
        "Protected zones should hold no bomb, saw {} ignored",
        summary.bombs_ignored
    );
    Ok(())
}
