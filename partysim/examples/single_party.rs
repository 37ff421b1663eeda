use rand::rngs::StdRng;
use rand::SeedableRng;

use partysim::model::party::{DEFAULT_DENSITY, DEFAULT_POPULATION};
use partysim::{GraphGenerator, PartyConfig, PartyModel, RandomGraph};

fn main() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(2215);

    let graph = RandomGraph::new(&mut rng).generate(DEFAULT_POPULATION, DEFAULT_DENSITY)?;

    // Ten parties in a row, everyone meets two people at each one.
    let cfg = PartyConfig {
        rounds: 10,
        meetings_per_guest: 2,
        ..PartyConfig::default()
    };
    let mut model = PartyModel::new(cfg, graph)?;
    let rounds = model.simulate(&mut rng);

    if let Some(first) = rounds.first() {
        println!("{}", first.outcome);
    }

    println!();
    println!("round,invited,attending,strengthened,host_mean_weight");
    for r in &rounds {
        println!(
            "{},{},{},{},{:.4}",
            r.round,
            r.outcome.invitees.len(),
            r.outcome.attendees.len(),
            r.strengthened(),
            r.host_mean_weight
        );
    }

    Ok(())
}
