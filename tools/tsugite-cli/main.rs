use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tsugite::batch::{HttpSubmitter, collect_inputs, new_client_id};
use tsugite::groups::layout::{self, DEFAULT_SUBGRAPH};
use tsugite::prelude::*;

/// Per-item workflow graph rewriting and batch submission
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Remove every switch node, wiring consumers to the selected input
    StripSwitches {
        /// Input graph JSON path, '-' for stdin
        #[arg(short, long, default_value = "-")]
        input: String,
        /// Output JSON path, '-' for stdout
        #[arg(short, long, default_value = "-")]
        output: String,
    },
    /// Cut the groups an item does not trigger, then remove switches
    Bypass {
        /// Input graph JSON path, '-' for stdin
        #[arg(short, long, default_value = "-")]
        input: String,
        /// Output JSON path, '-' for stdout
        #[arg(short, long, default_value = "-")]
        output: String,
        /// Group list produced by `extract-groups`
        #[arg(short, long)]
        groups: PathBuf,
        /// Path of the item the graph is specialized for
        #[arg(short, long)]
        path: PathBuf,
    },
    /// Derive trigger groups from an editor layout document
    ExtractGroups {
        /// Layout JSON path
        layout: PathBuf,
        /// Where to write the group list
        #[arg(short, long, default_value = "out/model_loader_groups.json")]
        output: PathBuf,
        /// Name of the subgraph whose groups are extracted
        #[arg(long, default_value = DEFAULT_SUBGRAPH)]
        subgraph: String,
        /// Optional text file listing each group's triggers
        #[arg(long)]
        triggers_out: Option<PathBuf>,
    },
    /// Submit every input of a batch, one at a time
    Run {
        /// Batch configuration JSON path
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::StripSwitches { input, output } => strip(&input, &output),
        Command::Bypass {
            input,
            output,
            groups,
            path,
        } => bypass(&input, &output, &groups, &path),
        Command::ExtractGroups {
            layout,
            output,
            subgraph,
            triggers_out,
        } => extract(&layout, &output, &subgraph, triggers_out.as_deref()),
        Command::Run { config } => run(&config),
    }
}

fn strip(input: &str, output: &str) {
    let text = read_input(input);
    let out = strip_switches_json(&text)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to rewrite graph: {}", e)));
    write_output(output, &out);
}

fn bypass(input: &str, output: &str, groups_path: &Path, item: &Path) {
    let text = read_input(input);
    let mut graph = Graph::from_json_str(&text)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read graph: {}", e)));
    let groups = load_groups(groups_path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load groups: {}", e)));

    let skip = SkipSet::for_path(&groups, item);
    let cut = bypass_nodes(&mut graph, &skip);
    let switches = strip_switches(&mut graph);
    eprintln!(
        "Cut {} group nodes and {} switches for '{}'",
        cut.len(),
        switches.len(),
        item.display()
    );

    let out = graph
        .to_json_pretty()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize graph: {}", e)));
    write_output(output, &out);
}

fn extract(layout_path: &Path, output: &Path, subgraph: &str, triggers_out: Option<&Path>) {
    let document = load_layout(layout_path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load layout: {}", e)));
    let groups = extract_groups(&document, subgraph);

    layout::write_groups(output, &groups)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to write groups: {}", e)));
    if let Some(path) = triggers_out {
        fs::write(path, layout::trigger_summary(&groups)).unwrap_or_else(|e| {
            exit_with_error(&format!(
                "Failed to write triggers to '{}': {}",
                path.display(),
                e
            ))
        });
    }

    println!(
        "Extracted {} groups from subgraph '{}' into '{}'",
        groups.len(),
        subgraph,
        output.display()
    );
    for group in &groups {
        println!(
            "  - [{}] {} node(s)",
            group.triggers.join(", "),
            group.node_ids.len()
        );
    }
}

fn run(config_path: &Path) {
    let total_start = Instant::now();

    // --- 1. Configuration and Template ---
    let config = BatchConfig::from_file(config_path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e)));
    let template = Template::from_file(&config)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to prepare workflow: {}", e)));
    let groups = load_groups(&config.groups_path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load groups: {}", e)));

    // --- 2. Inputs ---
    let inputs = collect_inputs(&config.input_dir, &config.input_pattern)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to list inputs: {}", e)));
    println!(
        "Found {} inputs under '{}' ({} groups, loader node '{}')",
        inputs.len(),
        config.input_dir.display(),
        groups.len(),
        template.loader_id()
    );

    // --- 3. Submission Loop ---
    let submitter = HttpSubmitter::new(config.server.clone())
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    let runner = Runner::new(&template, &groups, submitter, new_client_id())
        .with_poll_interval(config.poll_interval());
    let submissions = runner
        .run(&inputs)
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));

    println!("\n--- Batch Summary ---");
    println!("Submitted:            {}", submissions.len());
    println!("Total Execution:      {:?}", total_start.elapsed());
}

fn read_input(input: &str) -> String {
    if input == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to read stdin: {}", e)));
        text
    } else {
        fs::read_to_string(input).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to read input file '{}': {}", input, e))
        })
    }
}

fn write_output(output: &str, text: &str) {
    let result = if output == "-" {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", text)
    } else {
        fs::write(output, text)
    };
    result.unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to write output '{}': {}", output, e))
    });
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
