use clap::Parser;
use is_terminal::IsTerminal;
use lockheap::cli::{Cli, Command, SortArgs, StressArgs};
use lockheap::config::LockheapConfig;
use lockheap::output::{JsonRenderer, TerminalRenderer};
use lockheap::progress::StressProgress;
use lockheap::stress::StressRunner;
use lockheap::types::{SortOrder, SortReport};
use lockheap::{heap_sort, heap_sort_by, Growth};
use std::io::Read;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = cli.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    let config = match LockheapConfig::load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    let use_color = !cli.no_color && std::io::stdout().is_terminal();

    let exit_code = match &cli.command {
        Command::Sort(args) => run_sort(args, use_color),
        Command::Stress(args) => run_stress(args, &config, use_color),
    };
    std::process::exit(exit_code);
}

fn run_sort(args: &SortArgs, use_color: bool) -> i32 {
    let mut values = if args.values.is_empty() {
        match read_stdin_values() {
            Ok(values) => values,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 2;
            }
        }
    } else {
        args.values.clone()
    };

    let (order, result) = if args.ascending {
        (SortOrder::Ascending, heap_sort_by(&mut values, |a: &i64, b: &i64| b.cmp(a)))
    } else {
        (SortOrder::Descending, heap_sort(&mut values))
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        return 1;
    }

    let report = SortReport {
        order,
        count: values.len(),
        sorted: values,
    };

    if args.should_output_json() {
        if let Err(e) = JsonRenderer::new().render(&report, args.output.as_deref()) {
            eprintln!("Error writing JSON output: {}", e);
            return 3;
        }
    } else {
        TerminalRenderer::new(use_color).render_sort(&report);
    }
    0
}

fn read_stdin_values() -> Result<Vec<i64>, String> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| format!("Failed to read stdin: {}", e))?;

    input
        .split_whitespace()
        .map(|token| {
            token
                .parse::<i64>()
                .map_err(|_| format!("Not an integer: {}", token))
        })
        .collect()
}

fn run_stress(args: &StressArgs, config: &LockheapConfig, use_color: bool) -> i32 {
    // Flags win over the config file
    let threads = args.threads.unwrap_or(config.stress.threads);
    let inserts = args.inserts.unwrap_or(config.stress.inserts_per_thread);
    let growth = match args.growth.as_deref() {
        Some("double") => Growth::Double,
        Some(_) => Growth::Fixed,
        None => config.heap.growth,
    };
    let capacity = args.capacity.or(match growth {
        Growth::Double => Some(config.heap.initial_capacity),
        Growth::Fixed => None,
    });

    let runner = match StressRunner::new(threads, inserts, capacity, growth) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 2;
        }
    };

    let show_progress = args.progress && !args.should_output_json();
    let progress = StressProgress::new(show_progress, runner.total_inserts() as u64);

    let report = match runner.run(&progress) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    if args.should_output_json() {
        if let Err(e) = JsonRenderer::new().render(&report, args.output.as_deref()) {
            eprintln!("Error writing JSON output: {}", e);
            return 3;
        }
    } else {
        TerminalRenderer::new(use_color).render_stress(&report);
    }

    if report.checks.all_passed() {
        0
    } else {
        log::error!("stress checks failed: {:?}", report.checks);
        1
    }
}
