//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use clap::Parser;
use tally_core::db::Database;
use tally_core::models::AlertType;

use crate::cli::{Cli, Commands};
use crate::commands::{self, parse_at};

fn setup_test_db() -> Database {
    Database::in_memory().unwrap()
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_cli_parses_expense_add() {
    let cli = Cli::parse_from([
        "tally", "expense", "add", "--user", "alice", "--amount", "12.50", "--category", "food",
        "--at", "2026-08-27T12:00:00",
    ]);
    assert!(matches!(cli.command, Commands::Expense { .. }));
    assert_eq!(cli.db.to_str().unwrap(), "tally.db");
}

#[test]
fn test_cli_rejects_unknown_command() {
    let result = Cli::try_parse_from(["tally", "frobnicate"]);
    assert!(result.is_err());
}

#[test]
fn test_parse_at() {
    let at = parse_at(Some("2026-08-27T12:30:00")).unwrap();
    assert_eq!(at.format("%Y-%m-%d %H:%M").to_string(), "2026-08-27 12:30");

    assert!(parse_at(Some("not-a-timestamp")).is_err());
    assert!(parse_at(Some("2026-08-27")).is_err());

    // No argument defaults to now without erroring
    assert!(parse_at(None).is_ok());
}

// ========== User Command Tests ==========

#[test]
fn test_cmd_user_add_and_list() {
    let db = setup_test_db();
    commands::cmd_user_add(&db, "alice").unwrap();
    commands::cmd_user_add(&db, "bob").unwrap();

    assert_eq!(db.list_users().unwrap().len(), 2);
    assert!(commands::cmd_user_list(&db).is_ok());
}

// ========== Recording Command Tests ==========

#[test]
fn test_cmd_expense_add_uppercases_category_and_detects() {
    let db = setup_test_db();
    commands::cmd_user_add(&db, "alice").unwrap();
    commands::cmd_budget_set(&db, "alice", "food", 100.0, "monthly").unwrap();

    let at = parse_at(Some("2026-08-27T12:00:00")).unwrap();
    commands::cmd_expense_add(&db, "alice", 150.0, "food", at).unwrap();

    let user = db.get_user_by_name("alice").unwrap();
    let expenses = db.list_expenses_in_window(user.id, at, at).unwrap();
    assert_eq!(expenses[0].category, "FOOD");

    // 150 of a 100 budget overspends; first week of spending is a spike
    let alerts = db.list_alerts(user.id, true).unwrap();
    let types: Vec<AlertType> = alerts.iter().map(|a| a.alert_type).collect();
    assert!(types.contains(&AlertType::Overspending));
    assert!(types.contains(&AlertType::Spike));
}

#[test]
fn test_cmd_expense_add_rejects_unknown_user() {
    let db = setup_test_db();
    let at = parse_at(Some("2026-08-27T12:00:00")).unwrap();
    assert!(commands::cmd_expense_add(&db, "nobody", 10.0, "FOOD", at).is_err());
}

#[test]
fn test_cmd_income_add() {
    let db = setup_test_db();
    commands::cmd_user_add(&db, "alice").unwrap();

    let at = parse_at(Some("2026-08-27T09:00:00")).unwrap();
    commands::cmd_income_add(&db, "alice", 3000.0, "Salary", at).unwrap();

    let user = db.get_user_by_name("alice").unwrap();
    let incomes = db.list_incomes_in_window(user.id, at, at).unwrap();
    assert_eq!(incomes.len(), 1);
    assert_eq!(incomes[0].source, "Salary");
}

#[test]
fn test_cmd_budget_set_rejects_bad_period() {
    let db = setup_test_db();
    commands::cmd_user_add(&db, "alice").unwrap();
    assert!(commands::cmd_budget_set(&db, "alice", "FOOD", 100.0, "fortnightly").is_err());
}

#[test]
fn test_cmd_budget_unset() {
    let db = setup_test_db();
    commands::cmd_user_add(&db, "alice").unwrap();
    commands::cmd_budget_set(&db, "alice", "FOOD", 100.0, "monthly").unwrap();

    commands::cmd_budget_unset(&db, "alice", "food", "monthly").unwrap();

    let user = db.get_user_by_name("alice").unwrap();
    assert!(db.list_budgets(user.id).unwrap().is_empty());

    // Removing a budget that is already gone is not an error
    assert!(commands::cmd_budget_unset(&db, "alice", "food", "monthly").is_ok());
}

#[test]
fn test_cmd_budget_list_empty_is_ok() {
    let db = setup_test_db();
    commands::cmd_user_add(&db, "alice").unwrap();
    assert!(commands::cmd_budget_list(&db, "alice").is_ok());
}

// ========== Insight Command Tests ==========

#[test]
fn test_cmd_alert_read_round_trip() {
    let db = setup_test_db();
    commands::cmd_user_add(&db, "alice").unwrap();
    let user = db.get_user_by_name("alice").unwrap();

    let at = parse_at(Some("2026-08-27T12:00:00")).unwrap();
    let alert = db
        .create_alert(user.id, AlertType::Spike, "test alert", at)
        .unwrap();

    commands::cmd_alert_read(&db, alert.id).unwrap();
    let alerts = db.list_alerts(user.id, true).unwrap();
    assert!(alerts[0].is_read);

    // Marking again (or a bogus id) still succeeds
    assert!(commands::cmd_alert_read(&db, alert.id).is_ok());
    assert!(commands::cmd_alert_read(&db, 9999).is_ok());
}

#[test]
fn test_cmd_forecast_persists_snapshot() {
    let db = setup_test_db();
    commands::cmd_user_add(&db, "alice").unwrap();
    let user = db.get_user_by_name("alice").unwrap();

    let now = parse_at(Some("2026-08-27T12:00:00")).unwrap();
    commands::cmd_forecast(&db, "alice", now, false).unwrap();
    commands::cmd_forecast(&db, "alice", now, true).unwrap();

    assert_eq!(db.list_snapshots(user.id, 10).unwrap().len(), 2);
}

#[test]
fn test_cmd_health_persists_nothing() {
    let db = setup_test_db();
    commands::cmd_user_add(&db, "alice").unwrap();
    let user = db.get_user_by_name("alice").unwrap();

    let now = parse_at(Some("2026-08-27T12:00:00")).unwrap();
    commands::cmd_health(&db, "alice", now, false).unwrap();
    assert!(db.list_snapshots(user.id, 10).unwrap().is_empty());
}

#[test]
fn test_cmd_digest_all_users() {
    let db = setup_test_db();
    commands::cmd_user_add(&db, "alice").unwrap();
    commands::cmd_user_add(&db, "bob").unwrap();

    let now = parse_at(Some("2026-08-27T18:00:00")).unwrap();
    commands::cmd_digest(&db, None, now).unwrap();

    let alice = db.get_user_by_name("alice").unwrap();
    let bob = db.get_user_by_name("bob").unwrap();
    assert_eq!(db.list_digests(alice.id, 10).unwrap().len(), 1);
    assert_eq!(db.list_digests(bob.id, 10).unwrap().len(), 1);
}

// ========== Init/Status Tests ==========

#[test]
fn test_cmd_init_and_status() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("tally.db");

    commands::cmd_init(&db_path).unwrap();
    assert!(db_path.exists());
    assert!(commands::cmd_status(&db_path).is_ok());
}
