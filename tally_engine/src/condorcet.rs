use log::{debug, info};

use crate::*;

/// Runs a Condorcet election.
///
/// For every ballot and every pair of candidates ranked on it, the candidate
/// ranked earlier gets one point against the candidate ranked later. A
/// candidate that is not ranked on a ballot is not compared on this ballot.
///
/// The winner is the candidate that strictly beats every other candidate
/// head to head. When there is no such candidate (for example in a cycle),
/// the outcome is [Outcome::NoWinner].
pub fn condorcet_method(
    candidates: &[String],
    ballots: &[Vec<String>],
    rules: &VoteRules,
) -> Result<CondorcetResult, VotingErrors> {
    info!(
        "condorcet_method: processing {:?} votes, candidates: {:?}",
        ballots.len(),
        candidates
    );
    let registry = Registry::new(candidates)?;
    let ballots = registry.checked_rankings(ballots, rules.duplicate_candidate_mode)?;
    Ok(condorcet_tally(&registry, &ballots))
}

pub(crate) fn condorcet_tally(registry: &Registry, ballots: &[Ballot]) -> CondorcetResult {
    let matrix = pairwise_matrix(ballots, registry.len());
    debug!("condorcet_tally: pairwise matrix: {:?}", matrix);

    let all_ids = registry.all_ids();
    let winner: Option<CandidateId> = all_ids.iter().cloned().find(|cid| {
        all_ids
            .iter()
            .filter(|opp| *opp != cid)
            .all(|opp| matrix[cid.idx()][opp.idx()] > matrix[opp.idx()][cid.idx()])
    });
    let outcome = match winner {
        Some(cid) => Outcome::SingleWinner(registry.name(cid).to_string()),
        None => Outcome::NoWinner,
    };
    info!("condorcet_tally: outcome: {:?}", outcome);

    let mut pairwise: Vec<PairwiseCount> = Vec::new();
    for cid in all_ids.iter() {
        for opp in all_ids.iter().filter(|opp| *opp != cid) {
            pairwise.push(PairwiseCount {
                candidate: registry.name(*cid).to_string(),
                opponent: registry.name(*opp).to_string(),
                count: matrix[cid.idx()][opp.idx()].0,
            });
        }
    }
    CondorcetResult { outcome, pairwise }
}

// matrix[a][b] is the number of voters ranking a above b.
fn pairwise_matrix(ballots: &[Ballot], num_candidates: usize) -> Vec<Vec<VoteCount>> {
    let mut matrix = vec![vec![VoteCount::EMPTY; num_candidates]; num_candidates];
    for ballot in ballots.iter() {
        let ranks = &ballot.ranks;
        for (pos, cid) in ranks.iter().enumerate() {
            for opp in ranks[pos + 1..].iter() {
                matrix[cid.idx()][opp.idx()] += ballot.count;
            }
        }
    }
    matrix
}
