//! Human-readable and JSON output formatting for CLI commands.

use anyhow::Result;
use comfy_table::{presets, Attribute, Cell, ContentArrangement, Table};
use serde::Serialize;

use crate::domain::models::{
    AgentMetadata, ChainInfo, ChainRunResult, MonitorReport, PerformanceEntry, RequestRecord,
    RouteOutcome, ToolSpec,
};

/// Print any serializable value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header(cells: &[&str]) -> Vec<Cell> {
    cells
        .iter()
        .map(|c| Cell::new(c).add_attribute(Attribute::Bold))
        .collect()
}

pub fn agents_table(agents: &[AgentMetadata]) -> String {
    let mut table = base_table();
    table.set_header(header(&["Name", "Priority", "Enabled", "Description"]));
    for agent in agents {
        table.add_row(vec![
            Cell::new(&agent.name),
            Cell::new(agent.priority),
            Cell::new(if agent.enabled { "yes" } else { "no" }),
            Cell::new(&agent.description),
        ]);
    }
    table.to_string()
}

pub fn chains_table(chains: &[ChainInfo]) -> String {
    let mut table = base_table();
    table.set_header(header(&["Chain", "Steps", "Agents"]));
    for chain in chains {
        table.add_row(vec![
            Cell::new(&chain.name),
            Cell::new(chain.length),
            Cell::new(chain.agents.join(" -> ")),
        ]);
    }
    table.to_string()
}

pub fn tools_table(tools: &[(String, Vec<ToolSpec>)]) -> String {
    let mut table = base_table();
    table.set_header(header(&["Agent", "Tool", "Shared", "Description"]));
    for (agent, specs) in tools {
        for spec in specs {
            table.add_row(vec![
                Cell::new(agent),
                Cell::new(&spec.name),
                Cell::new(if spec.shared { "yes" } else { "no" }),
                Cell::new(&spec.description),
            ]);
        }
    }
    table.to_string()
}

pub fn ranking_table(ranking: &[PerformanceEntry]) -> String {
    let mut table = base_table();
    table.set_header(header(&[
        "Agent",
        "Requests",
        "Success rate",
        "Avg time (s)",
        "Efficiency",
    ]));
    for entry in ranking {
        table.add_row(vec![
            Cell::new(&entry.agent),
            Cell::new(entry.total_requests),
            Cell::new(format!("{:.1}%", entry.success_rate * 100.0)),
            Cell::new(format!("{:.3}", entry.average_processing_time)),
            Cell::new(format!("{:.2}", entry.efficiency_score)),
        ]);
    }
    table.to_string()
}

pub fn print_route_outcome(outcome: &RouteOutcome) {
    println!("agent:      {}", outcome.agent_used);
    println!("processed:  {}", outcome.processed);
    println!(
        "confidence: {:.2}",
        outcome.analysis.confidence
    );
    if let Some(error) = &outcome.error {
        println!("error:      {error}");
    }
    println!("result:\n{}", outcome.result);
}

pub fn print_chain_run(run: &ChainRunResult) {
    println!(
        "chain {} finished: success={} ({} steps, {} processed, {} successful)",
        run.chain_name, run.success, run.total_agents, run.processed_agents, run.successful_agents
    );
    if let Some(error) = &run.error {
        println!("error: {error}");
    }
    for step in &run.chain_results {
        let state = if step.processed {
            if step.success { "processed" } else { "failed" }
        } else if step.success {
            "skipped"
        } else {
            "failed"
        };
        println!("  [{state}] {}: {}", step.agent, step.result);
    }
    if !run.result.is_empty() {
        println!("final result:\n{}", run.result);
    }
}

pub fn print_recent_errors(errors: &[RequestRecord]) {
    if errors.is_empty() {
        println!("no recent errors");
        return;
    }
    for record in errors {
        println!(
            "{} agent={} time={:.3}s error={}",
            record.timestamp.to_rfc3339(),
            record.agent,
            record.processing_time,
            record.error_kind.as_deref().unwrap_or("-"),
        );
    }
}

pub fn print_monitor_report(report: &MonitorReport) {
    let overview = &report.system_overview;
    println!("uptime:          {:.0}s", overview.uptime_seconds);
    println!("agents seen:     {}", overview.total_agents);
    println!("total requests:  {}", overview.total_requests);
    println!("success rate:    {:.1}%", overview.success_rate * 100.0);
    println!(
        "avg time:        {:.3}s",
        overview.average_processing_time
    );
    println!("last hour:       {}", overview.recent_requests_1h);

    if !report.performance_ranking.is_empty() {
        println!("\nperformance ranking:");
        println!("{}", ranking_table(&report.performance_ranking));
    }

    if !report.recent_errors.is_empty() {
        println!("recent errors:");
        print_recent_errors(&report.recent_errors);
    }
}
