use std::collections::BTreeMap;
use std::fmt;

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::graph::matrix::WeightMatrix;

/// Default strengthening factor `j` for `update_weight`.
pub const DEFAULT_STRENGTHEN: f64 = 0.1;
/// Default invitation threshold (~0.9029).
pub const DEFAULT_INVITE_THRESHOLD: f64 = 2000.0 / 2215.0;
/// Default base attendance probability.
pub const DEFAULT_BASE: f64 = 0.5;
/// Friendship level at which attendance probability equals `base`.
pub const ATTENDANCE_PIVOT: f64 = 1500.0 / 2215.0;
pub const DEFAULT_POPULATION: usize = 100;
pub const DEFAULT_DENSITY: f64 = 1.0 - 2215.0 / 4000.0;
/// Upper bound on parties per simulation.
pub const MAX_ROUNDS: usize = 100_000;
/// Upper bound on partners each person picks while mingling.
pub const MAX_MEETINGS_PER_GUEST: usize = 1_000;

/// Probability that `person` is met at a party: their share of the total edge
/// weight in the graph.
///
/// Returns NaN when the whole matrix sums to zero. Panics if `person` is out of range.
pub fn prob_meeting(graph: &WeightMatrix, person: usize) -> f64 {
    let total = graph.total();
    let person_weights = graph.row_sum(person);
    person_weights / total
}

/// Strengthen the existing friendship between `a` and `b` by factor `j`:
/// w <- w + j * (1 - w), mirrored into (b, a).
///
/// Relationships are never created here: a zero weight is left alone and the
/// function returns `false`.
pub fn update_weight(graph: &mut WeightMatrix, a: usize, b: usize, j: f64) -> bool {
    let w = graph.get(a, b);
    if w > 0.0 {
        graph.set_symmetric(a, b, w + j * (1.0 - w));
        true
    } else {
        false
    }
}

/// Everyone whose weight to `host` is strictly above `threshold`, ascending.
/// The host's own diagonal entry is compared like any other.
pub fn invite(graph: &WeightMatrix, host: usize, threshold: f64) -> Vec<usize> {
    graph
        .row(host)
        .iter()
        .enumerate()
        .filter(|(_, w)| **w > threshold)
        .map(|(i, _)| i)
        .collect()
}

/// Unclamped attendance probability for a friendship level.
pub fn attendance_probability(friendship_level: f64, base: f64) -> f64 {
    base + 0.5 * (friendship_level - ATTENDANCE_PIVOT)
}

/// Sample which invitees actually come. Each invitee is kept iff a uniform
/// draw from `rng` falls below its (unclamped) attendance probability.
/// Order of `invitees` is preserved.
pub fn attending<R: Rng + ?Sized>(
    invitees: &[usize],
    graph: &WeightMatrix,
    host: usize,
    base: f64,
    rng: &mut R,
) -> Vec<usize> {
    sample_attendees(invitees, graph, host, base, ProbabilityPolicy::Raw, rng)
}

/// Attendance probability per invitee with the base fixed at 0.5 (unclamped).
pub fn prob_attending(graph: &WeightMatrix, host: usize, invitees: &[usize]) -> BTreeMap<usize, f64> {
    invitees
        .iter()
        .map(|&i| (i, attendance_probability(graph.get(host, i), DEFAULT_BASE)))
        .collect()
}

fn sample_attendees<R: Rng + ?Sized>(
    invitees: &[usize],
    graph: &WeightMatrix,
    host: usize,
    base: f64,
    policy: ProbabilityPolicy,
    rng: &mut R,
) -> Vec<usize> {
    let mut attendees = Vec::new();
    for &invitee in invitees {
        let p_attend = policy.apply(attendance_probability(graph.get(host, invitee), base));
        if rng.random::<f64>() < p_attend {
            attendees.push(invitee);
        }
    }
    attendees
}

/// What to do with attendance probabilities outside [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbabilityPolicy {
    /// Use the formula as-is; p < 0 never attends, p >= 1 always attends.
    #[default]
    Raw,
    /// Clamp into [0, 1] before sampling and reporting.
    Clamped,
}

impl ProbabilityPolicy {
    pub fn apply(self, p: f64) -> f64 {
        match self {
            ProbabilityPolicy::Raw => p,
            ProbabilityPolicy::Clamped => p.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartyConfig {
    pub host: usize,
    pub invite_threshold: f64,
    pub base: f64,
    /// Strengthening factor `j` applied per meeting.
    pub strengthen: f64,
    pub probability_policy: ProbabilityPolicy,
    pub rounds: usize,
    /// Partners each person present picks while mingling.
    pub meetings_per_guest: usize,
}

impl Default for PartyConfig {
    fn default() -> Self {
        Self {
            host: 0,
            invite_threshold: DEFAULT_INVITE_THRESHOLD,
            base: DEFAULT_BASE,
            strengthen: DEFAULT_STRENGTHEN,
            probability_policy: ProbabilityPolicy::Raw,
            rounds: 1,
            meetings_per_guest: 1,
        }
    }
}

impl PartyConfig {
    pub fn check(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.invite_threshold.is_finite(), "invite_threshold must be finite");
        anyhow::ensure!(self.base.is_finite(), "base must be finite");
        anyhow::ensure!(
            self.strengthen > 0.0 && self.strengthen <= 1.0,
            "strengthen must be in (0, 1], got {}",
            self.strengthen
        );
        anyhow::ensure!(
            (1..=MAX_ROUNDS).contains(&self.rounds),
            "rounds must be in 1..={}, got {}",
            MAX_ROUNDS,
            self.rounds
        );
        anyhow::ensure!(
            self.meetings_per_guest <= MAX_MEETINGS_PER_GUEST,
            "meetings_per_guest must be <= {}, got {}",
            MAX_MEETINGS_PER_GUEST,
            self.meetings_per_guest
        );
        Ok(())
    }

    pub fn check_against(&self, graph: &WeightMatrix) -> anyhow::Result<()> {
        self.check()?;
        anyhow::ensure!(
            self.host < graph.len(),
            "host {} out of range for {} people",
            self.host,
            graph.len()
        );
        anyhow::ensure!(graph.total() > 0.0, "graph has no relationships (total weight is zero)");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartyOutcome {
    pub host: usize,
    pub invitees: Vec<usize>,
    pub attendees: Vec<usize>,
    pub probabilities: BTreeMap<usize, f64>,
    /// Raw probabilities that fell outside [0, 1].
    pub out_of_range: usize,
}

impl fmt::Display for PartyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Invited guests: {:?}", self.invitees)?;
        writeln!(f, "Actual attendees: {:?}", self.attendees)?;
        write!(f, "Attendance probabilities: {:?}", self.probabilities)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Meeting {
    pub a: usize,
    pub b: usize,
    pub strengthened: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartyRound {
    pub round: usize,
    pub outcome: PartyOutcome,
    pub meetings: Vec<Meeting>,
    /// Mean of the host's row after mingling.
    pub host_mean_weight: f64,
}

impl PartyRound {
    pub fn strengthened(&self) -> usize {
        self.meetings.iter().filter(|m| m.strengthened).count()
    }
}

pub struct PartyModel {
    pub cfg: PartyConfig,
    graph: WeightMatrix,
}

impl PartyModel {
    pub fn new(cfg: PartyConfig, graph: WeightMatrix) -> anyhow::Result<Self> {
        cfg.check_against(&graph)?;
        Ok(Self { cfg, graph })
    }

    pub fn graph(&self) -> &WeightMatrix {
        &self.graph
    }

    pub fn into_graph(self) -> WeightMatrix {
        self.graph
    }

    pub fn invitees(&self) -> Vec<usize> {
        invite(&self.graph, self.cfg.host, self.cfg.invite_threshold)
    }

    /// Attendance probabilities under the configured base and policy.
    pub fn attendance_probabilities(&self, invitees: &[usize]) -> BTreeMap<usize, f64> {
        invitees
            .iter()
            .map(|&i| {
                let p = attendance_probability(self.graph.get(self.cfg.host, i), self.cfg.base);
                (i, self.cfg.probability_policy.apply(p))
            })
            .collect()
    }

    pub fn attendees<R: Rng + ?Sized>(&self, invitees: &[usize], rng: &mut R) -> Vec<usize> {
        sample_attendees(
            invitees,
            &self.graph,
            self.cfg.host,
            self.cfg.base,
            self.cfg.probability_policy,
            rng,
        )
    }

    pub fn host_party<R: Rng + ?Sized>(&self, rng: &mut R) -> PartyOutcome {
        let invitees = self.invitees();
        let attendees = self.attendees(&invitees, rng);
        let out_of_range = invitees
            .iter()
            .map(|&i| attendance_probability(self.graph.get(self.cfg.host, i), self.cfg.base))
            .filter(|p| !(0.0..=1.0).contains(p))
            .count();
        let probabilities = self.attendance_probabilities(&invitees);
        PartyOutcome {
            host: self.cfg.host,
            invitees,
            attendees,
            probabilities,
            out_of_range,
        }
    }

    /// Everyone present (host plus attendees) meets `meetings_per_guest` other
    /// present people. Partners are picked in proportion to their
    /// `prob_meeting`, and every meeting strengthens the edge it crosses.
    pub fn mingle<R: Rng + ?Sized>(&mut self, attendees: &[usize], rng: &mut R) -> Vec<Meeting> {
        let mut present = vec![self.cfg.host];
        for &a in attendees {
            if !present.contains(&a) {
                present.push(a);
            }
        }

        let mut meetings = Vec::new();
        for &a in &present {
            let candidates: Vec<usize> = present.iter().copied().filter(|&b| b != a).collect();
            for _ in 0..self.cfg.meetings_per_guest {
                let weights: Vec<f64> = candidates.iter().map(|&b| prob_meeting(&self.graph, b)).collect();
                // empty or all-zero: nobody to meet
                let Ok(dist) = WeightedIndex::new(&weights) else { break };
                let b = candidates[dist.sample(rng)];
                let strengthened = update_weight(&mut self.graph, a, b, self.cfg.strengthen);
                meetings.push(Meeting { a, b, strengthened });
            }
        }
        meetings
    }

    /// Host `cfg.rounds` parties in a row, mingling after each one.
    pub fn simulate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<PartyRound> {
        let mut out = Vec::new();
        for round in 1..=self.cfg.rounds {
            let outcome = self.host_party(rng);
            let meetings = self.mingle(&outcome.attendees, rng);
            let host_mean_weight = self.graph.row_sum(self.cfg.host) / self.graph.len() as f64;
            out.push(PartyRound {
                round,
                outcome,
                meetings,
                host_mean_weight,
            });
        }
        out
    }
}
