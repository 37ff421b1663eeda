use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use partysim::io::run_log::write_party_run_log;
use partysim::io::weights::{load_weight_matrix_csv, write_weight_matrix_csv};
use partysim::model::party::{DEFAULT_DENSITY, DEFAULT_POPULATION};
use partysim::{GraphGenerator, PartyConfig, PartyModel, ProbabilityPolicy, RandomGraph};

#[derive(Parser)]
#[command(name = "partysim")]
#[command(about = "Who gets invited to the party, and who shows up", long_about = None)]
struct Cli {
    /// Number of people in the generated graph
    #[arg(long, default_value_t = DEFAULT_POPULATION)]
    people: usize,

    /// Edge density of the generated graph
    #[arg(long, default_value_t = DEFAULT_DENSITY)]
    density: f64,

    /// Load the weight matrix from CSV instead of generating one
    #[arg(long, value_name = "CSV")]
    graph: Option<PathBuf>,

    /// Save the weight matrix used for the run as CSV
    #[arg(long, value_name = "CSV")]
    save_graph: Option<PathBuf>,

    /// JSON file with a party config (fields not given keep their defaults)
    #[arg(long, value_name = "JSON")]
    config: Option<PathBuf>,

    /// Random seed (falls back to PARTYSIM_SEED, then to OS entropy)
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    host: Option<usize>,

    #[arg(long)]
    threshold: Option<f64>,

    #[arg(long)]
    base: Option<f64>,

    /// Strengthening factor applied per meeting
    #[arg(long)]
    strengthen: Option<f64>,

    /// Clamp attendance probabilities into [0, 1]
    #[arg(long)]
    clamp: bool,

    /// Number of parties to host in a row
    #[arg(long)]
    rounds: Option<usize>,

    /// Directory to write a run log into
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Print every round as JSON instead of the text report
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = build_config(&cli)?;

    let seed = resolve_seed(cli.seed, std::env::var("PARTYSIM_SEED").ok().as_deref())?;
    let mut rng: Box<dyn RngCore> = match seed {
        Some(s) => Box::new(StdRng::seed_from_u64(s)),
        None => Box::new(rand::rng()),
    };

    let graph = match &cli.graph {
        Some(path) => load_weight_matrix_csv(path)?,
        None => RandomGraph::new(&mut rng).generate(cli.people, cli.density)?,
    };
    if let Some(path) = &cli.save_graph {
        write_weight_matrix_csv(path, &graph)?;
        eprintln!("[partysim] graph written to {}", path.display());
    }

    let people = graph.len();
    let mut model = PartyModel::new(cfg, graph)?;
    let rounds = model.simulate(&mut rng);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&rounds)?);
    } else if let Some(first) = rounds.first() {
        println!("{}", first.outcome);
    }

    for r in &rounds {
        if r.outcome.out_of_range > 0 {
            eprintln!(
                "[partysim] warning: round {}: {} attendance probabilities outside [0, 1] (policy={:?})",
                r.round, r.outcome.out_of_range, model.cfg.probability_policy
            );
        }
        if rounds.len() > 1 {
            eprintln!(
                "[partysim] round {}: invited={} attending={} meetings={} strengthened={} host_mean_weight={:.4}",
                r.round,
                r.outcome.invitees.len(),
                r.outcome.attendees.len(),
                r.meetings.len(),
                r.strengthened(),
                r.host_mean_weight
            );
        }
    }

    if let Some(dir) = &cli.log_dir {
        let run_id = match seed {
            Some(s) => format!("seed{}-{}", s, now_millis()),
            None => now_millis().to_string(),
        };
        let path = write_party_run_log(dir, &run_id, people, seed, &model.cfg, &rounds)?;
        eprintln!("[partysim] run log written to {}", path.display());
    }

    Ok(())
}

fn build_config(cli: &Cli) -> anyhow::Result<PartyConfig> {
    let mut cfg = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str::<PartyConfig>(&text)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?
        }
        None => PartyConfig::default(),
    };
    if let Some(h) = cli.host {
        cfg.host = h;
    }
    if let Some(t) = cli.threshold {
        cfg.invite_threshold = t;
    }
    if let Some(b) = cli.base {
        cfg.base = b;
    }
    if let Some(j) = cli.strengthen {
        cfg.strengthen = j;
    }
    if let Some(r) = cli.rounds {
        cfg.rounds = r;
    }
    if cli.clamp {
        cfg.probability_policy = ProbabilityPolicy::Clamped;
    }
    cfg.check()?;
    Ok(cfg)
}

/// `--seed` wins over `PARTYSIM_SEED`; neither means OS entropy.
fn resolve_seed(flag: Option<u64>, env: Option<&str>) -> anyhow::Result<Option<u64>> {
    match (flag, env) {
        (Some(s), _) => Ok(Some(s)),
        (None, Some(v)) => {
            let s = v
                .trim()
                .parse()
                .with_context(|| format!("PARTYSIM_SEED is not a u64: {v:?}"))?;
            Ok(Some(s))
        }
        (None, None) => Ok(None),
    }
}

fn now_millis() -> u128 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}
