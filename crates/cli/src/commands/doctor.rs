//! Readiness checks run in order: configuration, database connection, schema.
//! A failed stage marks every later stage as skipped, and the first failure's
//! class decides the exit code.

use customers_core::config::{AppConfig, LoadOptions};
use customers_db::{connect_with_config, migrations};
use serde::Serialize;
use serde_json::json;

use crate::commands::{block_on, CommandFailure, CommandResult, FailureClass};

const STAGES: [&str; 3] = ["config_validation", "database_connectivity", "schema_migrations"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct Check {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct Report {
    overall_status: CheckStatus,
    summary: &'static str,
    checks: Vec<Check>,
}

pub fn run(json_output: bool) -> CommandResult {
    let outcomes = run_stages();
    let exit_code = outcomes
        .iter()
        .find_map(|outcome| outcome.as_ref().err())
        .map_or(0, |failure| failure.class.exit_code());
    let report = Report::from_outcomes(outcomes);

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            json!({ "overall_status": "fail", "summary": "doctor report not serializable",
                    "error": error.to_string() })
            .to_string()
        })
    } else {
        report.render()
    };

    CommandResult { exit_code, output }
}

/// One entry per stage reached, in `STAGES` order; stops after the first failure.
fn run_stages() -> Vec<Result<String, CommandFailure>> {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return vec![Err(CommandFailure::new(FailureClass::ConfigValidation, error))],
    };
    let mut outcomes = vec![Ok("configuration loaded and validated".to_string())];

    match block_on(database_stages(&config)) {
        Ok(stages) => outcomes.extend(stages),
        Err(failure) => outcomes.push(Err(failure)),
    }
    outcomes
}

async fn database_stages(config: &AppConfig) -> Vec<Result<String, CommandFailure>> {
    let pool = match connect_with_config(&config.database).await {
        Ok(pool) => pool,
        Err(error) => {
            let message = format!("failed to connect to database: {error}");
            return vec![Err(CommandFailure::new(FailureClass::DbConnectivity, message))];
        }
    };

    let schema = match migrations::status(&pool).await {
        Ok(status) if status.is_current() => {
            Ok(format!("{}/{} migrations applied", status.applied, status.known))
        }
        Ok(status) => Err(CommandFailure::new(
            FailureClass::Migration,
            format!(
                "{}/{} migrations applied; run `customers migrate`",
                status.applied, status.known
            ),
        )),
        Err(error) => Err(CommandFailure::new(
            FailureClass::DbConnectivity,
            format!("failed to read migration state: {error}"),
        )),
    };
    pool.close().await;

    vec![Ok(format!("connected using `{}`", config.database.url)), schema]
}

impl Report {
    fn from_outcomes(outcomes: Vec<Result<String, CommandFailure>>) -> Self {
        let mut outcomes = outcomes.into_iter();
        let checks: Vec<Check> = STAGES
            .iter()
            .map(|&name| match outcomes.next() {
                Some(Ok(details)) => Check { name, status: CheckStatus::Pass, details },
                Some(Err(failure)) => {
                    Check { name, status: CheckStatus::Fail, details: failure.message }
                }
                None => Check {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped after an earlier failure".to_string(),
                },
            })
            .collect();

        let passed = checks.iter().all(|check| check.status == CheckStatus::Pass);
        Self {
            overall_status: if passed { CheckStatus::Pass } else { CheckStatus::Fail },
            summary: if passed {
                "doctor: all readiness checks passed"
            } else {
                "doctor: one or more readiness checks failed"
            },
            checks,
        }
    }

    fn render(&self) -> String {
        let mut lines = vec![self.summary.to_string()];
        lines.extend(self.checks.iter().map(|check| {
            let marker = match check.status {
                CheckStatus::Pass => "ok",
                CheckStatus::Fail => "fail",
                CheckStatus::Skipped => "skip",
            };
            format!("- [{marker}] {}: {}", check.name, check.details)
        }));
        lines.join("\n")
    }
}
