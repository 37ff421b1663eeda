pub mod graph;
pub mod model;
pub mod io;

pub use graph::generate::{GraphGenerator, RandomGraph, SyntheticGraph};
pub use graph::matrix::WeightMatrix;
pub use model::party::{
    attending, invite, prob_attending, prob_meeting, update_weight, PartyConfig, PartyModel, PartyOutcome,
    PartyRound, ProbabilityPolicy,
};
