use std::{fs, path::PathBuf, process::ExitCode};

use cache_sim::{trace::Trace, Config, Error, Mapping, Organization, Simulator};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: cache_sim [cache size: 128-4096] [cache mapping: dm|fa] \
                     [cache organization: uc|sc] [-t trace] [--json path]";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            if err.is_usage() {
                eprintln!("{USAGE}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Error> {
    let mut args = pico_args::Arguments::from_env();
    let heartbeat_int: u64 = args.opt_value_from_str("-h")?.unwrap_or(0);
    let records_per_block: usize = args
        .opt_value_from_str("--buffer-size")?
        .unwrap_or(1024 * 16);
    let blocks_per_queue: usize = args.opt_value_from_str("--queue-size")?.unwrap_or(32);
    let trace_path: PathBuf = args
        .opt_value_from_str("-t")?
        .unwrap_or_else(|| PathBuf::from("mem_trace.txt"));
    let stats_path: Option<PathBuf> = args.opt_value_from_str("--json")?;

    let config_str: Option<String> =
        if let Some(config_str) = args.opt_value_from_str("--config")? {
            Some(config_str)
        } else if let Some(config_path) = args.opt_value_from_str::<_, PathBuf>("-p")? {
            Some(fs::read_to_string(&config_path).map_err(|source| Error::File {
                path: config_path,
                source,
            })?)
        } else {
            None
        };
    let config = match config_str {
        Some(config_str) => serde_json::from_str(&config_str)?,
        None => positional_config(&mut args)?,
    };
    let rest = args.finish();
    if !rest.is_empty() {
        return Err(Error::UnexpectedArgs(rest));
    }

    let mut sim = Simulator::new(&config)?;
    let trace = Trace::read(&trace_path, records_per_block, blocks_per_queue).map_err(
        |source| Error::File {
            path: trace_path.clone(),
            source,
        },
    )?;

    let mut next_heartbeat = heartbeat_int;
    for block in trace.rec.iter() {
        sim.run(block?);
        let accesses = sim.stats().accesses();
        if heartbeat_int != 0 && accesses >= next_heartbeat {
            tracing::info!(accesses, hits = sim.stats().hits(), "heartbeat");
            while next_heartbeat <= accesses {
                next_heartbeat += heartbeat_int;
            }
        }
        if sim.finished() {
            break;
        }
    }

    let report = sim.report();
    tracing::info!(
        accesses = report.accesses,
        hits = report.hits,
        trace = %trace_path.display(),
        "simulation finished"
    );
    print!("{report}");

    if let Some(stats_path) = stats_path {
        let stats_file = fs::File::create(&stats_path).map_err(|source| Error::File {
            path: stats_path.clone(),
            source,
        })?;
        serde_json::to_writer_pretty(stats_file, &sim.summary())?;
    }
    Ok(())
}

/// The original three positional arguments: size, mapping, organization.
fn positional_config(args: &mut pico_args::Arguments) -> Result<Config, Error> {
    let cache_size: u32 = args.free_from_str()?;
    let mapping: String = args.free_from_str()?;
    let organization: String = args.free_from_str()?;
    Ok(Config::new(
        cache_size,
        mapping.parse::<Mapping>()?,
        organization.parse::<Organization>()?,
    ))
}
