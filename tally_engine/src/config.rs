// ********* Input data structures ***********

use snafu::Snafu;

/// The voting rules supported by the engine.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum VotingMethod {
    /// Plurality: each ballot names a single candidate.
    FirstPastThePost,
    /// Each ballot approves a set of candidates.
    Approval,
    /// Instant-runoff voting over ranked ballots.
    Preferential,
    /// Pairwise comparisons over ranked ballots.
    Condorcet,
    /// Positional scoring over ranked ballots.
    Borda,
}

impl VotingMethod {
    pub fn name(&self) -> &'static str {
        match self {
            VotingMethod::FirstPastThePost => "firstPastThePost",
            VotingMethod::Approval => "approval",
            VotingMethod::Preferential => "preferential",
            VotingMethod::Condorcet => "condorcet",
            VotingMethod::Borda => "borda",
        }
    }
}

/// A ballot with a weight, as accumulated by the builder.
///
/// The choices are kept in the order given by the voter. Their interpretation
/// depends on the voting method (first choice, set of approvals or ranking).
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Vote {
    pub candidates: Vec<String>,
    pub count: u64,
}

// ******** Output data structures *********

/// The outcome of an election.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Outcome {
    SingleWinner(String),
    /// All the candidates tied for the first place, in candidate order.
    MultiWinner(Vec<String>),
    /// No candidate could be declared a winner. For the Condorcet method, this
    /// means that no candidate beats all the others.
    NoWinner,
}

impl Outcome {
    /// The winners, in candidate order. Empty if there is no winner.
    pub fn winners(&self) -> Vec<String> {
        match self {
            Outcome::SingleWinner(name) => vec![name.clone()],
            Outcome::MultiWinner(names) => names.clone(),
            Outcome::NoWinner => Vec::new(),
        }
    }

    pub(crate) fn from_winners(mut names: Vec<String>) -> Outcome {
        match names.len() {
            0 => Outcome::NoWinner,
            1 => Outcome::SingleWinner(names.remove(0)),
            _ => Outcome::MultiWinner(names),
        }
    }
}

/// The result of a single pass tally (plurality, approval, Borda count).
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TallyResult {
    pub outcome: Outcome,
    /// The count (or score) of every candidate, in candidate order.
    pub tally: Vec<(String, u64)>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct EliminationStats {
    pub name: String,
    pub transfers: Vec<(String, u64)>,
    pub exhausted: u64,
}

/// Statistics for one round
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: u32,
    pub tally: Vec<(String, u64)>,
    pub tally_results_elected: Vec<String>,
    pub tally_result_eliminated: Vec<EliminationStats>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PreferentialResult {
    pub outcome: Outcome,
    /// The tally of the last round, which decided the election.
    pub tally: Vec<(String, u64)>,
    pub round_stats: Vec<RoundStats>,
}

/// Number of ballots that rank `candidate` above `opponent`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PairwiseCount {
    pub candidate: String,
    pub opponent: String,
    pub count: u64,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CondorcetResult {
    pub outcome: Outcome,
    pub pairwise: Vec<PairwiseCount>,
}

impl CondorcetResult {
    /// The number of ballots preferring `candidate` over `opponent`.
    pub fn preference(&self, candidate: &str, opponent: &str) -> Option<u64> {
        self.pairwise
            .iter()
            .find(|pc| pc.candidate == candidate && pc.opponent == opponent)
            .map(|pc| pc.count)
    }
}

/// The result of running an election with the builder.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ElectionResult {
    FirstPastThePost(TallyResult),
    Approval(TallyResult),
    Preferential(PreferentialResult),
    Condorcet(CondorcetResult),
    Borda(TallyResult),
}

impl ElectionResult {
    pub fn outcome(&self) -> &Outcome {
        match self {
            ElectionResult::FirstPastThePost(r)
            | ElectionResult::Approval(r)
            | ElectionResult::Borda(r) => &r.outcome,
            ElectionResult::Preferential(r) => &r.outcome,
            ElectionResult::Condorcet(r) => &r.outcome,
        }
    }
}

/// Errors that prevent the algorithm from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum VotingErrors {
    /// A ballot references a name that is not a registered candidate.
    #[snafu(display("Invalid vote in ballot {ballot}: {name} is not a valid candidate."))]
    InvalidVote { ballot: usize, name: String },
    #[snafu(display("The election has no candidates"))]
    EmptyElection {},
    #[snafu(display("The instant-runoff tabulation did not converge"))]
    NoConvergence {},
}

// ********* Configuration **********

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TieBreakMode {
    /// Among the candidates with the fewest votes, eliminate the one listed
    /// first in the candidate set.
    UseCandidateOrder,
    /// Eliminate following a permutation derived from a cryptographic hash of
    /// the seed, the round number and the candidate names. Hard to guess in
    /// advance, but reproducible.
    Random(u32),
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum DuplicateCandidateMode {
    /// The ranking stops right before the first repeated candidate.
    Exhaust,
    /// Repeated candidates are ignored.
    SkipDuplicate,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteRules {
    pub tiebreak_mode: TieBreakMode,
    pub duplicate_candidate_mode: DuplicateCandidateMode,
}

impl VoteRules {
    pub const DEFAULT_RULES: VoteRules = VoteRules {
        tiebreak_mode: TieBreakMode::UseCandidateOrder,
        duplicate_candidate_mode: DuplicateCandidateMode::SkipDuplicate,
    };
}

impl Default for VoteRules {
    fn default() -> Self {
        VoteRules::DEFAULT_RULES
    }
}
