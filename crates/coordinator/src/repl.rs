//! Operator command shell (§6). Each stdin line is one command; errors are
//! printed as a single line and never take down the process (§7).

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use fleet_adapters::ConfigLoader;
use fleet_core::ContainerId;

use crate::commands;
use crate::state::CoordinatorState;

pub async fn run(state: Arc<CoordinatorState>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print_prompt();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "error reading operator command");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            print_prompt();
            continue;
        }
        if line == "quit" {
            println!("shutting down");
            break;
        }

        if let Err(message) = dispatch(&state, line).await {
            println!("Error: {message}");
        }
        print_prompt();
    }
}

fn print_prompt() {
    print!("fleet> ");
    let _ = std::io::Write::flush(&mut std::io::stdout());
}

async fn dispatch(state: &Arc<CoordinatorState>, line: &str) -> Result<(), String> {
    let mut parts = line.split_whitespace();
    let cmd = parts.next().unwrap_or_default();

    match cmd {
        "deploy" => {
            let path = parts.next().ok_or("usage: deploy <file>")?;
            let spec = ConfigLoader::load_file(std::path::Path::new(path)).map_err(|e| e.to_string())?;
            let id = commands::deploy(state, spec).await.map_err(|e| e.to_string())?;
            println!("deployed {id}");
            Ok(())
        }
        "start" => {
            let id = parse_id(&mut parts, "start")?;
            commands::start(state, &id).await.map_err(|e| e.to_string())?;
            println!("ok");
            Ok(())
        }
        "stop" => {
            let id = parse_id(&mut parts, "stop")?;
            commands::stop(state, &id).await.map_err(|e| e.to_string())?;
            println!("ok");
            Ok(())
        }
        "delete" => {
            let id = parse_id(&mut parts, "delete")?;
            commands::delete(state, &id).await.map_err(|e| e.to_string())?;
            println!("deleted {id}");
            Ok(())
        }
        "list" => {
            match parts.next() {
                Some("containers") => print_containers(state),
                Some("nodes") => print_nodes(state),
                _ => return Err("usage: list <containers|nodes>".to_string()),
            }
            Ok(())
        }
        other => Err(format!("unknown command: {other}")),
    }
}

fn parse_id(parts: &mut std::str::SplitWhitespace<'_>, cmd: &str) -> Result<ContainerId, String> {
    parts.next().map(ContainerId::from).ok_or_else(|| format!("usage: {cmd} <container_id>"))
}

fn print_containers(state: &CoordinatorState) {
    println!("{:<24}{:<12}{:<16}{:<10}", "ID", "NAME", "NODE", "STATE");
    for record in commands::list_containers(state) {
        println!("{:<24}{:<12}{:<16}{:<10}", record.id.to_string(), record.name, record.node_id.to_string(), record.state.to_string());
    }
}

fn print_nodes(state: &CoordinatorState) {
    println!("{:<24}{:<16}{:<16}{:<12}{:>6}{:>6}", "ID", "HOSTNAME", "IP", "STATE", "CPU%", "MEM%");
    for node in commands::list_nodes(state) {
        println!(
            "{:<24}{:<16}{:<16}{:<12}{:>6.1}{:>6.1}",
            node.id.to_string(),
            node.hostname,
            node.ip,
            node.state.to_string(),
            node.resources.cpu_used,
            node.resources.mem_used,
        );
    }
}
