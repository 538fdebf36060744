use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use ctree_match::{run_schemes, CTree, Ea, RunOptions, RunReport, SchemeRegistry};

#[derive(Parser)]
#[command(name = "ctree-match")]
#[command(author, version, about = "Pattern matching and rewriting for decompiler ctrees", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run schemes over a ctree and print the rewritten tree
    Run {
        /// The ctree JSON file
        input: PathBuf,

        /// Scheme to run (repeatable, all built-in schemes by default)
        #[arg(short, long = "scheme")]
        schemes: Vec<String>,

        /// Print every matched node
        #[arg(long)]
        debug: bool,

        /// Print the failure tree for candidates at this address (hex)
        #[arg(long, value_parser = parse_ea)]
        trace_at: Option<Ea>,

        /// Print the rewritten tree as JSON instead of pseudo-C
        #[arg(long)]
        dump_json: bool,
    },

    /// List registered schemes
    Schemes,

    /// Print a ctree as pseudo-C
    Dump {
        /// The ctree JSON file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logger before parsing CLI args
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if cli.verbose {
        log::set_max_level(log::LevelFilter::Debug);
    }

    let result = match cli.command {
        Commands::Run {
            input,
            schemes,
            debug,
            trace_at,
            dump_json,
        } => run(input, schemes, debug, trace_at, dump_json),
        Commands::Schemes => list_schemes(),
        Commands::Dump { input } => dump(input),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

fn parse_ea(text: &str) -> Result<Ea, String> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    Ea::from_str_radix(digits, 16).map_err(|e| format!("invalid address '{}': {}", text, e))
}

fn load_tree(input: &PathBuf) -> Result<CTree> {
    CTree::from_path(input).with_context(|| format!("Failed to load ctree from {:?}", input))
}

fn run(
    input: PathBuf,
    schemes: Vec<String>,
    debug: bool,
    trace_at: Option<Ea>,
    dump_json: bool,
) -> Result<()> {
    let mut tree = load_tree(&input)?;
    let registry = SchemeRegistry::with_builtin();
    log::info!("Running schemes over {} ({} nodes)", tree.name(), tree.len());

    let options = RunOptions { schemes, trace_at };
    let report = run_schemes(&mut tree, &registry, &options)?;

    print_report(&tree, &report, debug);

    if dump_json {
        println!("{}", serde_json::to_string_pretty(&tree.to_spec()?)?);
    } else {
        println!("{}", tree.render());
    }
    Ok(())
}

fn print_report(tree: &CTree, report: &RunReport, debug: bool) {
    for scheme in &report.schemes {
        println!(
            "{}: {} matched {} node(s), applied {} patch(es)",
            "scheme".cyan().bold(),
            scheme.name,
            scheme.matches.len(),
            scheme.patches_applied
        );
        if debug {
            for id in &scheme.matches {
                println!("  {} {}", format!("{}", id).yellow(), tree.dstr(*id));
            }
        }
        for error in &scheme.errors {
            println!("  {}: {}", "warning".yellow().bold(), error);
        }
        for (id, lines) in &scheme.traces {
            println!("  {} {}", "trace".magenta().bold(), id);
            for line in lines {
                println!("    {}", line);
            }
        }
    }
    println!(
        "{}: {} match(es), {} patch(es)",
        "success".green().bold(),
        report.total_matches(),
        report.total_patches()
    );
}

fn list_schemes() -> Result<()> {
    let registry = SchemeRegistry::with_builtin();
    for (name, scheme) in registry.iter() {
        println!("{:<16} {}", name.blue().bold(), scheme.description());
    }
    Ok(())
}

fn dump(input: PathBuf) -> Result<()> {
    let tree = load_tree(&input)?;
    println!("{}", tree.render());
    Ok(())
}
