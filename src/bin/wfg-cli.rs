use std::fs;
use std::io;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use wfg::{CycleResolver, TranIndex, Wfg};

#[derive(Parser)]
#[command(name = "wfg-cli", about = "Drive a wait-for graph from a script file")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a line-oriented graph script against a fresh WFG.
    Run {
        /// Path to the script file.
        script: String,
    },
}

/// The CLI never resolves a cycle on the caller's behalf; it just names the
/// victim on stdout, matching its role as an inspection tool rather than a
/// transaction manager.
struct PrintingResolver;

impl CycleResolver for PrintingResolver {
    fn resolve(&self, tran_index: TranIndex, arg: u64) {
        println!("  resolve callback invoked: tran={tran_index} arg={arg}");
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Run { script } => {
            if let Err(e) = run_script(&script) {
                eprintln!("wfg-cli: {e}");
                std::process::exit(1);
            }
        }
    }
}

fn run_script(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let wfg = Wfg::new();
    let resolver: Arc<dyn CycleResolver> = Arc::new(PrintingResolver);

    for (lineno, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        if let Err(e) = apply_directive(&wfg, &words, Arc::clone(&resolver)) {
            eprintln!("wfg-cli: line {}: {}: {e}", lineno + 1, line);
        }
    }

    Ok(())
}

fn apply_directive(
    wfg: &Wfg,
    words: &[&str],
    resolver: Arc<dyn CycleResolver>,
) -> Result<(), Box<dyn std::error::Error>> {
    match words {
        ["alloc", n] => {
            wfg.alloc_nodes(n.parse()?)?;
        }
        ["edge", waiter, holders @ ..] => {
            let waiter: TranIndex = waiter.parse()?;
            let holders: Vec<TranIndex> =
                holders.iter().map(|h| h.parse()).collect::<Result<_, _>>()?;
            wfg.insert_out_edges(waiter, &holders, resolver, 0)?;
        }
        ["group"] => {
            let idx = wfg.alloc_tran_group()?;
            println!("group {idx}");
        }
        ["holder", group, t] => {
            wfg.insert_holder_tran_group(group.parse()?, t.parse()?)?;
        }
        ["waiter", group, t] => {
            wfg.insert_waiter_tran_group(group.parse()?, t.parse()?, resolver, 0)?;
        }
        ["detect"] => {
            let outcome = wfg.detect_cycle()?;
            println!("detect: {:?}", outcome.case);
            for cycle in &outcome.cycles {
                let members: Vec<TranIndex> = cycle.iter().map(|w| w.tran_index).collect();
                println!("  cycle: {members:?}");
            }
        }
        ["dump"] => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            wfg.dump(&mut handle)?;
        }
        [] => {}
        other => {
            return Err(format!("unrecognized directive: {other:?}").into());
        }
    }
    Ok(())
}
