use anyhow::Context;

use crate::model::party::{PartyConfig, PartyRound};

/// Write a plain-text log of a simulation run to `<out_dir>/party_<run_id>.txt`.
///
/// Layout: `key=value` header lines, a blank line, then one CSV row per round.
pub fn write_party_run_log(
    out_dir: impl AsRef<std::path::Path>,
    run_id: &str,
    people: usize,
    seed: Option<u64>,
    cfg: &PartyConfig,
    rounds: &[PartyRound],
) -> anyhow::Result<std::path::PathBuf> {
    use std::io::Write;

    std::fs::create_dir_all(out_dir.as_ref()).context("create logs dir failed")?;
    let path = out_dir.as_ref().join(format!("party_{}.txt", run_id));
    let mut f = std::fs::File::create(&path)
        .with_context(|| format!("create run log file failed (path={:?})", path))?;

    writeln!(f, "run_id={}", run_id)?;
    writeln!(f, "people={}", people)?;
    match seed {
        Some(s) => writeln!(f, "seed={}", s)?,
        None => writeln!(f, "seed=none")?,
    }
    writeln!(f, "host={}", cfg.host)?;
    writeln!(f, "invite_threshold={:.6}", cfg.invite_threshold)?;
    writeln!(f, "base={:.6}", cfg.base)?;
    writeln!(f, "strengthen={:.6}", cfg.strengthen)?;
    writeln!(f, "probability_policy={:?}", cfg.probability_policy)?;
    writeln!(f, "rounds={}", cfg.rounds)?;
    writeln!(f, "meetings_per_guest={}", cfg.meetings_per_guest)?;
    writeln!(f)?;
    writeln!(f, "round,invited,attending,meetings,strengthened,host_mean_weight")?;

    for (expected, r) in (1..).zip(rounds) {
        anyhow::ensure!(r.round == expected, "round numbering gap at {}", r.round);
        writeln!(
            f,
            "{},{},{},{},{},{:.6}",
            r.round,
            r.outcome.invitees.len(),
            r.outcome.attendees.len(),
            r.meetings.len(),
            r.strengthened(),
            r.host_mean_weight
        )?;
    }

    Ok(path)
}
