//! DeskOps CLI - Command-line client for the DeskOps daemon

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9531";

#[derive(Parser)]
#[command(name = "deskops")]
#[command(about = "DeskOps desktop automation CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "DESKOPS_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute an operation (open_application, create_file, get_system_status, ...)
    Exec {
        /// Operation name
        operation: String,

        /// Application name or path
        #[arg(default_value = "")]
        target: String,

        /// Destination for move_file / copy_file
        #[arg(short, long)]
        destination: Option<String>,

        /// Content for create_file
        #[arg(short, long)]
        content: Option<String>,

        /// Extra options as key=value
        #[arg(short = 'o', long = "option", value_parser = parse_option)]
        options: Vec<(String, String)>,
    },

    /// Take a health snapshot
    Health,

    /// Show detailed system stats (samples CPU, takes a couple of seconds)
    Stats,

    /// Show the current desktop context
    Context,

    /// Show recent health snapshots
    History {
        /// Number of snapshots
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
}

fn parse_option(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(key, _)| !key.trim().is_empty())
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize, Tabled)]
struct SnapshotRow {
    #[tabled(rename = "overall")]
    overall: String,
    #[tabled(rename = "mem %")]
    memory_pct: u32,
    #[tabled(rename = "cpu %")]
    cpu_pct: u32,
    #[tabled(rename = "disk %")]
    disk_pct: u32,
    #[tabled(rename = "disk free (GB)")]
    disk_free_gb: f64,
    #[tabled(rename = "uptime (h)")]
    uptime_hours: f64,
    timestamp: i64,
}

#[derive(Deserialize, Tabled)]
struct AppRow {
    name: String,
    start_time: i64,
    command: String,
}

async fn call_rpc(url: &str, method: &str, params: Value) -> Result<Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

fn build_exec_params(
    operation: String,
    target: String,
    destination: Option<String>,
    content: Option<String>,
    options: Vec<(String, String)>,
) -> Value {
    let mut opts: Map<String, Value> = options
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect();
    if let Some(destination) = destination {
        opts.insert("destination".to_string(), Value::String(destination));
    }
    if let Some(content) = content {
        opts.insert("content".to_string(), Value::String(content));
    }

    json!({
        "operation": operation,
        "target": target,
        "options": opts,
    })
}

fn rating(overall: &str) -> ColoredString {
    match overall {
        "Good" => overall.green().bold(),
        "Fair" => overall.yellow().bold(),
        "Poor" => overall.red().bold(),
        _ => overall.dimmed(),
    }
}

fn print_exec_result(result: &Value) {
    if result["success"].as_bool().unwrap_or(false) {
        let message = result["message"].as_str().unwrap_or("done");
        println!("{} {}", "✓".green().bold(), message);
        if let Some(data) = result.get("data") {
            println!(
                "{}",
                serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
            );
        }
    } else {
        let error = result["error"].as_str().unwrap_or("operation failed");
        println!("{} {}", "✗".red().bold(), error);
    }
}

fn print_stats(stats: &Value) {
    println!("{}", "System Stats".cyan().bold());
    println!();
    println!(
        "  {} {} ({}, {})",
        "Host:".bold(),
        stats["hostname"].as_str().unwrap_or("?"),
        stats["platform"].as_str().unwrap_or("?"),
        stats["architecture"].as_str().unwrap_or("?")
    );
    println!(
        "  {} {}",
        "Overall:".bold(),
        rating(stats["overall"].as_str().unwrap_or("Unknown"))
    );
    println!();
    println!(
        "  {} {}% ({} cores, {} samples) {}",
        "CPU:".bold(),
        stats["cpu"]["usage_pct"],
        stats["cpu"]["cores"],
        stats["cpu"]["samples_count"],
        stats["cpu"]["model"].as_str().unwrap_or_default()
    );
    println!(
        "  {} {}% ({} / {} GB)",
        "Memory:".bold(),
        stats["memory"]["usage_pct"],
        stats["memory"]["used_gb"],
        stats["memory"]["total_gb"]
    );
    println!(
        "  {} {}% ({} GB free of {} GB)",
        "Disk:".bold(),
        stats["disk"]["usage_pct"],
        stats["disk"]["free_gb"],
        stats["disk"]["total_gb"]
    );
    println!(
        "  {} {} days ({} hours)",
        "Uptime:".bold(),
        stats["uptime"]["days"],
        stats["uptime"]["hours"]
    );
}

fn print_context(context: &Value) -> Result<()> {
    println!("{}", "Current Context".cyan().bold());
    println!();
    println!(
        "  {} {}",
        "Platform:".bold(),
        context["platform"].as_str().unwrap_or("?")
    );
    println!("  {} {}", "Cwd:".bold(), context["cwd"].as_str().unwrap_or("?"));
    if let Some(title) = context["active_window_title"].as_str() {
        println!("  {} {}", "Window:".bold(), title);
    }
    println!();

    let apps: Vec<AppRow> = serde_json::from_value(context["active_applications"].clone())
        .context("Invalid active application list")?;
    if apps.is_empty() {
        println!("{}", "No applications launched by DeskOps".yellow());
    } else {
        println!("{}", Table::new(apps));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Exec {
            operation,
            target,
            destination,
            content,
            options,
        } => {
            let params = build_exec_params(operation, target, destination, content, options);
            let result = call_rpc(&cli.rpc_url, "ops.execute.v1", params).await?;
            print_exec_result(&result);
        }

        Commands::Health => {
            let snapshot = call_rpc(&cli.rpc_url, "system.health.v1", json!({})).await?;
            let row: SnapshotRow =
                serde_json::from_value(snapshot).context("Invalid health snapshot")?;

            println!("{} {}", "Health:".bold(), rating(&row.overall));
            println!();
            println!("{}", Table::new(vec![row]));
        }

        Commands::Stats => {
            println!("{}", "Sampling...".dimmed());
            let stats = call_rpc(&cli.rpc_url, "system.stats.v1", json!({})).await?;
            print_stats(&stats);
        }

        Commands::Context => {
            let context = call_rpc(&cli.rpc_url, "context.current.v1", json!({})).await?;
            print_context(&context)?;
        }

        Commands::History { limit } => {
            let params = json!({ "limit": limit });
            let history = call_rpc(&cli.rpc_url, "system.history.v1", params).await?;
            let rows: Vec<SnapshotRow> = serde_json::from_value(history["snapshots"].clone())
                .context("Invalid snapshot history")?;

            println!(
                "{} {} of {} kept",
                "History:".cyan().bold(),
                rows.len(),
                history["capacity"]
            );
            if rows.is_empty() {
                println!("{}", "No snapshots yet (run `deskops health`)".yellow());
            } else {
                println!("{}", Table::new(rows));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_option() {
        assert_eq!(
            parse_option("encoding=utf-8").unwrap(),
            ("encoding".to_string(), "utf-8".to_string())
        );
        assert_eq!(
            parse_option("query=a=b").unwrap(),
            ("query".to_string(), "a=b".to_string())
        );
        assert!(parse_option("novalue").is_err());
        assert!(parse_option("=x").is_err());
    }

    #[test]
    fn test_exec_params_merge_options() {
        let params = build_exec_params(
            "move_file".into(),
            "a.txt".into(),
            Some("b.txt".into()),
            None,
            vec![("mode".into(), "fast".into())],
        );

        assert_eq!(params["operation"], "move_file");
        assert_eq!(params["options"]["destination"], "b.txt");
        assert_eq!(params["options"]["mode"], "fast");
        assert!(params["options"].get("content").is_none());
    }

    #[test]
    fn test_snapshot_row_from_rpc_shape() {
        let row: SnapshotRow = serde_json::from_value(json!({
            "overall": "Fair",
            "memory_pct": 65,
            "cpu_pct": 10,
            "disk_pct": 10,
            "disk_free_gb": 100.5,
            "disk_total_gb": 500.0,
            "uptime_hours": 3.25,
            "timestamp": 1
        }))
        .unwrap();
        assert_eq!(row.overall, "Fair");
        assert_eq!(row.memory_pct, 65);
    }
}
