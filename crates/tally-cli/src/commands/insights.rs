//! Insight commands: alerts, forecast, health, recommend, digest

use anyhow::Result;
use chrono::NaiveDateTime;
use tally_core::{BehaviorEngine, Database, RiskLevel};

use super::records::alert_icon;

pub fn cmd_alerts(db: &Database, user_name: &str, include_read: bool) -> Result<()> {
    let user = db.get_user_by_name(user_name)?;
    let alerts = db.list_alerts(user.id, include_read)?;

    if alerts.is_empty() {
        println!("✅ No alerts for {}. Spending looks good!", user.name);
        return Ok(());
    }

    println!();
    println!("⚠️  Alerts for {}", user.name);
    println!("   ─────────────────────────────────────────────");

    for alert in &alerts {
        let read_mark = if alert.is_read { " (read)" } else { "" };
        println!(
            "   {:>4}  {} {}{}",
            alert.id,
            alert_icon(alert.alert_type),
            alert.alert_type.label(),
            read_mark
        );
        println!("         {}", alert.message);
        println!("         {}", alert.triggered_at.format("%Y-%m-%d %H:%M"));
        println!();
    }

    Ok(())
}

pub fn cmd_alert_read(db: &Database, id: i64) -> Result<()> {
    if db.mark_alert_read(id)? {
        println!("✅ Alert {} marked as read", id);
    } else {
        println!("Alert {} was not found or already read", id);
    }
    Ok(())
}

pub fn cmd_forecast(db: &Database, user_name: &str, now: NaiveDateTime, json: bool) -> Result<()> {
    let user = db.get_user_by_name(user_name)?;
    let engine = BehaviorEngine::new(db);
    let snapshot = engine.generate_forecast(user.id, now)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!();
    println!("🔮 Forecast for {}", user.name);
    println!("   ─────────────────────────────");
    println!("   Balance this month: {:.2}", snapshot.balance);
    println!("   Burn rate: {:.2}/day", snapshot.burn_rate);
    if snapshot.is_infinite_runway() {
        println!("   Days left: unlimited (no recent spending)");
    } else {
        println!("   Days left: {}", snapshot.estimated_days_left);
    }
    println!("   Risk: {} {}", risk_icon(snapshot.risk_level), snapshot.risk_level);

    Ok(())
}

pub fn cmd_health(db: &Database, user_name: &str, now: NaiveDateTime, json: bool) -> Result<()> {
    let user = db.get_user_by_name(user_name)?;
    let engine = BehaviorEngine::new(db);
    let health = engine.financial_health(user.id, now)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&health)?);
        return Ok(());
    }

    println!();
    println!("🩺 Financial health for {}", user.name);
    println!("   ─────────────────────────────");
    println!("   Balance: {:.2}", health.balance);
    println!("   Burn rate: {:.2}/day", health.burn_rate);
    println!("   Projected weekly spend: {:.2}", health.weekly_projection);
    println!("   Projected monthly spend: {:.2}", health.monthly_projection);
    println!(
        "   Month-over-month change: {:+.1}%",
        health.month_over_month_change_percent
    );
    println!(
        "   Suggested daily budget: {:.2}",
        health.suggested_daily_budget
    );
    println!("   Risk: {} {}", risk_icon(health.risk_level), health.risk_level);

    Ok(())
}

pub fn cmd_recommend(db: &Database, user_name: &str, now: NaiveDateTime) -> Result<()> {
    let user = db.get_user_by_name(user_name)?;
    let engine = BehaviorEngine::new(db);
    let recommendations = engine.generate_recommendations(user.id, now)?;

    if recommendations.is_empty() {
        println!("✅ No recommendations for {}. Keep it up!", user.name);
        return Ok(());
    }

    println!();
    println!("💡 Recommendations for {}", user.name);
    println!("   ─────────────────────────────────────────────");
    for rec in &recommendations {
        match &rec.category {
            Some(category) => println!("   [{}] {}", category, rec.tip),
            None => println!("   {}", rec.tip),
        }
    }

    Ok(())
}

pub fn cmd_digest(db: &Database, user_name: Option<&str>, now: NaiveDateTime) -> Result<()> {
    let engine = BehaviorEngine::new(db);

    match user_name {
        Some(name) => {
            let user = db.get_user_by_name(name)?;
            let digest = engine.run_weekly_digest_for_user(user.id, now)?;

            println!();
            for line in digest.body.lines() {
                println!("   {}", line);
            }
            println!();
        }
        None => {
            let summary = engine.run_weekly_digest(now)?;
            println!(
                "📬 Digest run: {} users, {} delivered, {} failed",
                summary.users, summary.delivered, summary.failed
            );
        }
    }

    Ok(())
}

fn risk_icon(risk: RiskLevel) -> &'static str {
    match risk {
        RiskLevel::Safe => "🟢",
        RiskLevel::Warning => "🟡",
        RiskLevel::Danger => "🔴",
    }
}
