//! Text and JSON output for each command.

use anyhow::Result;
use serde::Serialize;
use waypoint_core::advisor::{EventMessage, ProgressOutcome};
use waypoint_core::companion::{
    GoalBreakdown, NavigationAdvice, PersonalAdvice, StatsSnapshot,
};
use waypoint_core::{CompanionEngine, Config};

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn motivation(message: &str, json: bool) -> Result<()> {
    if json {
        return print_json(&serde_json::json!({ "message": message }));
    }
    println!("{}", message);
    Ok(())
}

pub fn progress(outcome: &ProgressOutcome, json: bool) -> Result<()> {
    if json {
        return print_json(outcome);
    }
    let report = &outcome.report;
    let analysis = &outcome.analysis;

    print!("{}", report.summary());
    if let Some(start) = report.streaks.longest_streak_start {
        println!(
            "  - Longest streak: {} days (from {})",
            report.streaks.longest_streak_days, start
        );
    }
    println!();
    println!("Score: {}/100", analysis.score);
    println!("Strength: {}", analysis.strength);
    println!("To improve: {}", analysis.weaknesses);
    if !analysis.recommendations.is_empty() {
        println!("Recommendations:");
        for rec in &analysis.recommendations {
            println!("  - {}", rec);
        }
    }
    Ok(())
}

pub fn triggers(messages: &[EventMessage], json: bool) -> Result<()> {
    if json {
        return print_json(messages);
    }
    if messages.is_empty() {
        println!("No events fired.");
        return Ok(());
    }
    for m in messages {
        println!("[{}] {}", m.event, m.message);
    }
    Ok(())
}

pub fn breakdown(doc: &GoalBreakdown, json: bool) -> Result<()> {
    if json {
        return print_json(doc);
    }
    for (i, step) in doc.steps.iter().enumerate() {
        let mut meta = Vec::new();
        if let Some(days) = step.estimated_days {
            meta.push(format!("~{} days", days));
        }
        if let Some(priority) = step.priority {
            meta.push(format!("priority {}", priority));
        }
        if meta.is_empty() {
            println!("{}. {}", i + 1, step.title);
        } else {
            println!("{}. {} ({})", i + 1, step.title, meta.join(", "));
        }
        if !step.description.is_empty() {
            println!("   {}", step.description);
        }
    }
    let total = doc.total_days();
    if total > 0 {
        println!();
        println!("Estimated total: {} days", total);
    }
    if !doc.advice.is_empty() {
        println!();
        println!("{}", doc.advice);
    }
    Ok(())
}

pub fn navigation(advice: &NavigationAdvice, json: bool) -> Result<()> {
    if json {
        return print_json(advice);
    }
    if !advice.focus.is_empty() {
        println!("Focus: {}", advice.focus);
    }
    for action in &advice.next_actions {
        match action.priority {
            Some(p) => println!("  [{}] {}", p, action.title),
            None => println!("  - {}", action.title),
        }
        if !action.description.is_empty() {
            println!("      {}", action.description);
        }
    }
    for warning in &advice.warnings {
        println!("! {}", warning);
    }
    Ok(())
}

pub fn advice(advice: &PersonalAdvice, json: bool) -> Result<()> {
    if json {
        return print_json(advice);
    }
    println!("{}", advice.advice);
    for (i, step) in advice.steps.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }
    if !advice.motivation.is_empty() {
        println!();
        println!("{}", advice.motivation);
    }
    Ok(())
}

#[derive(Serialize)]
struct ProviderRow {
    name: String,
    model: String,
    endpoint: String,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct ProvidersView<'a> {
    policy: &'a str,
    order: Vec<&'a str>,
    providers: Vec<ProviderRow>,
}

pub fn providers(config: &Config, companion: &CompanionEngine, json: bool) -> Result<()> {
    let rows: Vec<ProviderRow> = config
        .resolve_providers(|name| std::env::var(name).ok())
        .into_iter()
        .map(|p| ProviderRow {
            name: p.kind.to_string(),
            model: p.model,
            endpoint: p.endpoint,
            timeout_secs: p.timeout_secs,
        })
        .collect();

    let view = ProvidersView {
        policy: companion.policy().as_str(),
        order: companion.candidate_order(),
        providers: rows,
    };

    if json {
        return print_json(&view);
    }
    if view.providers.is_empty() {
        println!("No providers configured; answers come from static content.");
        return Ok(());
    }
    println!("Policy: {}", view.policy);
    for row in &view.providers {
        println!(
            "  {:<12} {:<24} {} ({}s)",
            row.name, row.model, row.endpoint, row.timeout_secs
        );
    }
    println!("Attempt order: {}", view.order.join(" -> "));
    Ok(())
}

pub fn stats(stats: &StatsSnapshot) -> Result<()> {
    eprintln!("requests: {}", stats.total_requests);
    eprintln!("fallback_used: {}", stats.fallback_used);
    for p in &stats.providers {
        eprintln!(
            "{}: success={} failure={} rate={:.2}",
            p.name, p.success, p.failure, p.success_rate
        );
    }
    Ok(())
}
