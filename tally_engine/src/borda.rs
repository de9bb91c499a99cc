use log::{debug, info};

use crate::*;

/// Runs a Borda count election.
///
/// With `n` registered candidates, the candidate ranked at position `r`
/// (starting at 0) on a ballot receives `n - r - 1` points. Candidates left
/// out of a ballot receive nothing from it. All the candidates with the
/// highest score are reported as winners.
pub fn borda_count(
    candidates: &[String],
    ballots: &[Vec<String>],
    rules: &VoteRules,
) -> Result<TallyResult, VotingErrors> {
    info!(
        "borda_count: processing {:?} votes, candidates: {:?}",
        ballots.len(),
        candidates
    );
    let registry = Registry::new(candidates)?;
    let ballots = registry.checked_rankings(ballots, rules.duplicate_candidate_mode)?;
    Ok(borda_tally(&registry, &ballots))
}

pub(crate) fn borda_tally(registry: &Registry, ballots: &[Ballot]) -> TallyResult {
    let num_candidates = registry.len() as u64;
    let mut scores: Vec<VoteCount> = vec![VoteCount::EMPTY; registry.len()];
    for ballot in ballots.iter() {
        for (rank, cid) in ballot.ranks.iter().enumerate() {
            let points = num_candidates.saturating_sub(rank as u64 + 1);
            scores[cid.idx()] += VoteCount(points.saturating_mul(ballot.count.0));
        }
    }
    debug!("borda_tally: scores: {:?}", scores);

    let outcome = max_tally_outcome(registry, &scores);
    info!("borda_tally: outcome: {:?}", outcome);
    TallyResult {
        outcome,
        tally: registry.named_tally(&registry.all_ids(), &scores),
    }
}
