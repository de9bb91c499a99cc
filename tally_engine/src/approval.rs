use log::{debug, info};

use crate::*;

/// Runs an approval election.
///
/// Each ballot is the set of candidates approved by the voter. A candidate
/// listed twice in the same ballot is only approved once. All the candidates
/// with the most approvals are reported as winners.
pub fn approval_voting(
    candidates: &[String],
    ballots: &[Vec<String>],
) -> Result<TallyResult, VotingErrors> {
    info!(
        "approval_voting: processing {:?} votes, candidates: {:?}",
        ballots.len(),
        candidates
    );
    let registry = Registry::new(candidates)?;
    let ballots = registry.checked_rankings(ballots, DuplicateCandidateMode::SkipDuplicate)?;
    Ok(approval_tally(&registry, &ballots))
}

/// Every approved candidate receives the weight of the ballot.
/// The ballots must not repeat a candidate.
pub(crate) fn approval_tally(registry: &Registry, ballots: &[Ballot]) -> TallyResult {
    let mut tally: Vec<VoteCount> = vec![VoteCount::EMPTY; registry.len()];
    for ballot in ballots.iter() {
        for cid in ballot.ranks.iter() {
            tally[cid.idx()] += ballot.count;
        }
    }
    debug!("approval_tally: tally: {:?}", tally);

    let outcome = max_tally_outcome(registry, &tally);
    info!("approval_tally: outcome: {:?}", outcome);
    TallyResult {
        outcome,
        tally: registry.named_tally(&registry.all_ids(), &tally),
    }
}
