#![deny(warnings)]

//! Headless CLI: run forecast scenarios and print a KPI report or JSON export.

mod report;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use forecast_core::ForecastConfig;
use forecast_runtime::{
    run_scenarios_parallel, simulate_plan_churn, ChurnReport, ScenarioSummary,
};
use serde_json::{Map, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    scenario: Option<String>,
    months: Option<u32>,
    churn: Option<String>,
    json: bool,
    version: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Args {
    let mut parsed = Args::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => parsed.config = it.next().map(PathBuf::from),
            "--scenario" => parsed.scenario = it.next(),
            "--months" => parsed.months = it.next().and_then(|s| s.parse().ok()),
            "--churn" => parsed.churn = it.next(),
            "--json" => parsed.json = true,
            "--version" => parsed.version = true,
            _ => {}
        }
    }
    parsed
}

/// Narrow the configuration to what the arguments ask for.
fn select(mut config: ForecastConfig, args: &Args) -> Result<ForecastConfig> {
    if let Some(name) = &args.scenario {
        let scenario = config
            .scenario(name)
            .cloned()
            .with_context(|| format!("scenario not found: {name}"))?;
        config.scenarios = vec![scenario];
    }
    if let Some(months) = args.months {
        for s in &mut config.scenarios {
            s.months = months;
        }
    }
    Ok(config)
}

/// Churn cohort sized like the first selected scenario.
fn cohort_for(config: &ForecastConfig, plan: &str) -> Result<ChurnReport> {
    let (users, months) = config
        .scenarios
        .first()
        .map_or((1000, 12), |s| (s.initial_users, s.months));
    Ok(simulate_plan_churn(&config.plans, plan, users, months, None)?)
}

/// One JSON document: scenarios keyed by name, plus the cohort when requested.
fn export(
    results: &BTreeMap<String, ScenarioSummary>,
    cohort: Option<&ChurnReport>,
) -> Result<Value> {
    let mut doc = Map::new();
    doc.insert("scenarios".to_string(), serde_json::to_value(results)?);
    if let Some(cohort) = cohort {
        doc.insert("cohort".to_string(), serde_json::to_value(cohort)?);
    }
    Ok(Value::Object(doc))
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1));
    if args.version {
        println!("forecast-cli {} ({})", env!("CARGO_PKG_VERSION"), env!("GIT_SHA"));
        return Ok(());
    }
    info!(?args.config, ?args.scenario, ?args.months, "starting CLI");

    let config = match &args.config {
        Some(path) => ForecastConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ForecastConfig::reference(),
    };
    let config = select(config, &args)?;
    let results = run_scenarios_parallel(&config)?;
    let cohort = match &args.churn {
        Some(plan) => Some(cohort_for(&config, plan)?),
        None => None,
    };

    if args.json {
        let doc = export(&results, cohort.as_ref())?;
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        for (name, summary) in &results {
            println!("{}", report::scenario_line(name, summary));
        }
        if let Some(cohort) = &cohort {
            println!("{}", report::churn_line(cohort));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Args {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_known_flags_and_ignores_others() {
        let a = args(&["--scenario", "base", "--months", "36", "--json", "--bogus"]);
        assert_eq!(a.scenario.as_deref(), Some("base"));
        assert_eq!(a.months, Some(36));
        assert!(a.json);
        assert!(a.config.is_none());
        assert_eq!(args(&["--months", "x"]).months, None);
    }

    #[test]
    fn select_narrows_and_overrides_horizon() {
        let c = select(
            ForecastConfig::reference(),
            &args(&["--scenario", "optimistic", "--months", "6"]),
        )
        .unwrap();
        assert_eq!(c.scenarios.len(), 1);
        assert_eq!(c.scenarios[0].name, "optimistic");
        assert_eq!(c.scenarios[0].months, 6);
        assert!(select(ForecastConfig::reference(), &args(&["--scenario", "nope"])).is_err());
    }

    #[test]
    fn json_export_is_one_document() {
        let config = select(
            ForecastConfig::reference(),
            &args(&["--scenario", "base", "--months", "3"]),
        )
        .unwrap();
        let results = run_scenarios_parallel(&config).unwrap();

        let doc = export(&results, None).unwrap();
        assert!(doc["scenarios"]["base"].is_object());
        assert!(doc.get("cohort").is_none());

        let cohort = cohort_for(&config, "starter").unwrap();
        let text = serde_json::to_string_pretty(&export(&results, Some(&cohort)).unwrap()).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["cohort"]["plan"], "starter");
        assert_eq!(parsed["cohort"]["months"].as_array().unwrap().len(), 3);
        assert_eq!(parsed["scenarios"]["base"]["final_users"], results["base"].final_users);
    }
}
