pub mod replay;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::scenario;
use crate::io::sidebar_store;
use crate::model::config::EngineConfig;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli, config: &EngineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    match cli.command {
        Commands::Replay(args) => cmd_replay(args, config, json),
        Commands::Sidebar(args) => cmd_sidebar(args, config, json),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_replay(
    args: ReplayArgs,
    config: &EngineConfig,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = scenario::read_scenario(&args.scenario)?;
    let report = replay::run_scenario(scenario, config);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for step in &report.steps {
        println!("{:>3}  {}", step.index, step.outcome);
    }
    if !report.calls.is_empty() {
        println!();
        println!("calls:");
        for call in &report.calls {
            println!("  {}", format_call_line(call));
        }
    }
    for failure in &report.failures {
        println!("failed: {}", failure);
    }
    println!();
    for line in format_snapshot(&report.final_state) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_sidebar(
    args: SidebarArgs,
    config: &EngineConfig,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut order = sidebar_store::read_sidebar(&args.state_file).unwrap_or_default();
    let changed = order.reconcile(&config.sidebar.system_targets, &args.folders);

    if args.write && changed {
        sidebar_store::write_sidebar(&args.state_file, &order)?;
    }

    if json {
        let out = SidebarJson {
            order: order.to_strings(),
            changed,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for item in order.to_strings() {
            println!("{}", item);
        }
    }
    Ok(())
}
