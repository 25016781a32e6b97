use clap::Parser;

use grid_pathfinding::config::Config;
use grid_pathfinding::simulation::Simulation;

fn main() {
    env_logger::init();
    let config = Config::parse();

    println!("Starting pathfinding demo...");
    println!("Grid size: {}x{}", config.width, config.height);
    println!(
        "Walls: {}, Slow cells: {} (cost {})",
        config.num_walls, config.num_slow_cells, config.slow_cost
    );
    println!("Algorithm: {}", config.algorithm);
    if config.quiet {
        println!("Quiet mode enabled - minimal output");
    }
    println!();

    let mut simulation = match Simulation::new(config.clone()) {
        Ok(simulation) => simulation,
        Err(e) => {
            eprintln!("Failed to set up the demo: {}", e);
            std::process::exit(1);
        }
    };
    let scenario = simulation.scenario();
    println!("Environment seed: {} (for reproducibility)", scenario.seed);
    println!("Start: {}, Goal: {}", scenario.start, scenario.goal);
    println!();

    let kinds = match simulation.selected_algorithms() {
        Ok(kinds) => kinds,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Select 'bfs', 'greedy', 'dijkstra', 'a_star', 'lpa_star', or 'all' for algorithm");
            std::process::exit(1);
        }
    };

    if config.step {
        // Animate the first selected algorithm
        match simulation.animate(kinds[0]) {
            Ok(stats) => {
                if config.quiet {
                    println!("{}", stats);
                }
            }
            Err(e) => {
                eprintln!("Animation failed: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        let results = simulation.run_algorithms(&kinds);
        Simulation::print_comparison_results(&results);
    }

    if config.replan_edits > 0 {
        println!("\n=== INCREMENTAL REPLANNING ===");
        match simulation.replan() {
            Ok(stats) => println!("{}", stats),
            Err(e) => {
                eprintln!("Replanning demo failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}
