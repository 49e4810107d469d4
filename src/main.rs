use clap::Parser;
use log::LevelFilter;

use pml_kmeans::cli::Cli;
use pml_kmeans::load::{describe, load_csv, save_assignment};
use pml_kmeans::logger::init_logger;
use pml_kmeans::report::ClusteringReport;
use pml_kmeans::Result;

fn run(args: &Cli) -> Result<()> {
    let dataset = load_csv(&args.input, &args.csv_options())?;
    log::debug!("{}", describe(&dataset));

    let clustering = args.build_kmeans().fit(&dataset)?;
    log::info!(
        "cluster sizes: {:?}",
        clustering.assignment.cluster_sizes(args.k)
    );

    match &args.output {
        Some(path) => save_assignment(path, &clustering.assignment)?,
        None => {
            for (id, cluster) in clustering.assignment.iter() {
                println!("{}\t{}", id, cluster);
            }
        }
    }

    if let Some(path) = &args.report {
        ClusteringReport::new(&dataset, &clustering).write_json(path)?;
        log::info!("wrote report to {}", path.display());
    }

    Ok(())
}

fn main() {
    let args = Cli::parse();
    let level = if args.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    init_logger(level).expect("Failed to initialize logger");

    log::info!("starting");
    log::info!("params: {:#?}", args);
    if !args.validate() {
        log::error!("please fix arguments");
        std::process::exit(1);
    }

    if let Err(e) = run(&args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
    log::info!("finished");
}
