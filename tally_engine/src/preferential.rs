use log::{debug, info};
use snafu::OptionExt;

use crate::*;

type RoundId = u32;

/// The state at the start of a round: the candidates still running, in
/// candidate order, and the ballots that still rank one of them.
///
/// Invariant: every ballot is non-empty, has a positive weight and only
/// contains running candidates.
#[derive(Eq, PartialEq, Debug, Clone)]
struct RoundSnapshot {
    candidates: Vec<CandidateId>,
    ballots: Vec<Ballot>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
struct EliminationInternal {
    transfers: Vec<(CandidateId, VoteCount)>,
    exhausted: VoteCount,
}

#[derive(Eq, PartialEq, Debug, Clone)]
enum RoundDecision {
    Elected(Vec<CandidateId>),
    Eliminated(CandidateId),
    NoWinner,
}

impl RoundSnapshot {
    fn initial(registry: &Registry, ballots: Vec<Ballot>) -> RoundSnapshot {
        RoundSnapshot {
            candidates: registry.all_ids(),
            ballots: ballots
                .into_iter()
                .filter(|b| !b.ranks.is_empty() && b.count > VoteCount::EMPTY)
                .collect(),
        }
    }

    /// First preferences of the active ballots, for every running candidate.
    fn tally(&self, num_registered: usize) -> Vec<(CandidateId, VoteCount)> {
        let mut counts: Vec<VoteCount> = vec![VoteCount::EMPTY; num_registered];
        for ballot in self.ballots.iter() {
            if let Some(first) = ballot.ranks.first() {
                counts[first.idx()] += ballot.count;
            }
        }
        self.candidates
            .iter()
            .map(|cid| (*cid, counts[cid.idx()]))
            .collect()
    }

    /// The snapshot of the next round, without the eliminated candidate.
    /// Also returns where the ballots of the eliminated candidate went.
    fn without(
        &self,
        eliminated: CandidateId,
        num_registered: usize,
    ) -> (RoundSnapshot, EliminationInternal) {
        let mut transfers: Vec<VoteCount> = vec![VoteCount::EMPTY; num_registered];
        let mut exhausted = VoteCount::EMPTY;
        let mut ballots: Vec<Ballot> = Vec::with_capacity(self.ballots.len());
        for ballot in self.ballots.iter() {
            let was_first = ballot.ranks.first() == Some(&eliminated);
            let rest: Vec<CandidateId> = ballot
                .ranks
                .iter()
                .filter(|cid| **cid != eliminated)
                .cloned()
                .collect();
            match (was_first, rest.first()) {
                (true, Some(next)) => transfers[next.idx()] += ballot.count,
                (true, None) => exhausted += ballot.count,
                _ => {}
            }
            if !rest.is_empty() {
                ballots.push(Ballot {
                    ranks: rest,
                    count: ballot.count,
                });
            }
        }
        let candidates: Vec<CandidateId> = self
            .candidates
            .iter()
            .filter(|cid| **cid != eliminated)
            .cloned()
            .collect();
        let transfers = candidates
            .iter()
            .filter(|cid| transfers[cid.idx()] > VoteCount::EMPTY)
            .map(|cid| (*cid, transfers[cid.idx()]))
            .collect();
        (
            RoundSnapshot {
                candidates,
                ballots,
            },
            EliminationInternal {
                transfers,
                exhausted,
            },
        )
    }
}

/// Runs an instant-runoff election.
///
/// Every round counts the first remaining preference of each ballot. A
/// candidate with more than half of these votes wins. Otherwise one of the
/// candidates with the fewest votes is eliminated (see [TieBreakMode]) and
/// the ballots are counted again without this candidate.
///
/// The count always terminates:
/// - a lone remaining candidate is elected,
/// - when no ballot ranks any remaining candidate, there is no winner,
/// - when the two last candidates are tied, both are reported as winners.
pub fn preferential_voting(
    candidates: &[String],
    ballots: &[Vec<String>],
    rules: &VoteRules,
) -> Result<PreferentialResult, VotingErrors> {
    info!(
        "preferential_voting: processing {:?} votes, candidates: {:?}, rules: {:?}",
        ballots.len(),
        candidates,
        rules
    );
    let registry = Registry::new(candidates)?;
    let ballots = registry.checked_rankings(ballots, rules.duplicate_candidate_mode)?;
    preferential_tally(&registry, ballots, rules)
}

pub(crate) fn preferential_tally(
    registry: &Registry,
    ballots: Vec<Ballot>,
    rules: &VoteRules,
) -> Result<PreferentialResult, VotingErrors> {
    let num_registered = registry.len();

    let mut snapshot = RoundSnapshot::initial(registry, ballots);
    let mut round_stats: Vec<RoundStats> = Vec::new();

    // At least one candidate disappears in every round.
    for round_id in 1..=(num_registered as RoundId) {
        let tally = snapshot.tally(num_registered);
        debug!("Round id: {:?} tally: {:?}", round_id, tally);
        let decision = decide_round(&snapshot, &tally, rules, registry, round_id)?;
        info!("Round id: {:?} decision: {:?}", round_id, decision);

        let named_tally: Vec<(String, u64)> = tally
            .iter()
            .map(|(cid, vc)| (registry.name(*cid).to_string(), vc.0))
            .collect();
        match decision {
            RoundDecision::Eliminated(cid) => {
                let (next, elimination) = snapshot.without(cid, num_registered);
                round_stats.push(RoundStats {
                    round: round_id,
                    tally: named_tally,
                    tally_results_elected: Vec::new(),
                    tally_result_eliminated: vec![elimination_stats(registry, cid, &elimination)],
                });
                snapshot = next;
            }
            RoundDecision::Elected(winners) => {
                let winner_names: Vec<String> = winners
                    .iter()
                    .map(|cid| registry.name(*cid).to_string())
                    .collect();
                round_stats.push(RoundStats {
                    round: round_id,
                    tally: named_tally.clone(),
                    tally_results_elected: winner_names.clone(),
                    tally_result_eliminated: Vec::new(),
                });
                return Ok(PreferentialResult {
                    outcome: Outcome::from_winners(winner_names),
                    tally: named_tally,
                    round_stats,
                });
            }
            RoundDecision::NoWinner => {
                round_stats.push(RoundStats {
                    round: round_id,
                    tally: named_tally.clone(),
                    tally_results_elected: Vec::new(),
                    tally_result_eliminated: Vec::new(),
                });
                return Ok(PreferentialResult {
                    outcome: Outcome::NoWinner,
                    tally: named_tally,
                    round_stats,
                });
            }
        }
    }
    NoConvergenceSnafu {}.fail()
}

fn get_threshold(total_count: VoteCount) -> VoteCount {
    VoteCount((total_count.0 / 2) + 1)
}

fn decide_round(
    snapshot: &RoundSnapshot,
    tally: &[(CandidateId, VoteCount)],
    rules: &VoteRules,
    registry: &Registry,
    round_id: RoundId,
) -> Result<RoundDecision, VotingErrors> {
    // Only one candidate. It is the winner by any standard.
    if let [only] = snapshot.candidates.as_slice() {
        return Ok(RoundDecision::Elected(vec![*only]));
    }

    let total_count: VoteCount = tally.iter().map(|(_, vc)| *vc).sum();
    if total_count == VoteCount::EMPTY {
        debug!("decide_round: all the ballots are exhausted");
        return Ok(RoundDecision::NoWinner);
    }

    let threshold = get_threshold(total_count);
    debug!("decide_round: vote threshold: {:?}", threshold);
    if let Some((cid, _)) = tally.iter().find(|(_, vc)| *vc >= threshold) {
        return Ok(RoundDecision::Elected(vec![*cid]));
    }

    // Two candidates left and no majority: plurality between the finalists.
    if snapshot.candidates.len() == 2 {
        let max_count = tally
            .iter()
            .map(|(_, vc)| *vc)
            .max()
            .context(NoConvergenceSnafu {})?;
        let finalists: Vec<CandidateId> = tally
            .iter()
            .filter(|(_, vc)| *vc == max_count)
            .map(|(cid, _)| *cid)
            .collect();
        return Ok(RoundDecision::Elected(finalists));
    }

    let eliminated = find_eliminated_candidate(tally, rules.tiebreak_mode, registry, round_id)
        .context(NoConvergenceSnafu {})?;
    Ok(RoundDecision::Eliminated(eliminated))
}

fn find_eliminated_candidate(
    tally: &[(CandidateId, VoteCount)],
    tiebreak: TieBreakMode,
    registry: &Registry,
    round_id: RoundId,
) -> Option<CandidateId> {
    let min_count: VoteCount = tally.iter().map(|(_, vc)| *vc).min()?;
    // In candidate order, since the tally is.
    let all_smallest: Vec<CandidateId> = tally
        .iter()
        .filter(|(_, vc)| *vc == min_count)
        .map(|(cid, _)| *cid)
        .collect();
    debug!(
        "find_eliminated_candidate: all_smallest: {:?}",
        all_smallest
    );

    if all_smallest.len() == 1 {
        return all_smallest.first().cloned();
    }

    match tiebreak {
        TieBreakMode::UseCandidateOrder => all_smallest.first().cloned(),
        TieBreakMode::Random(seed) => {
            let cand_with_names: Vec<(CandidateId, &str)> = all_smallest
                .iter()
                .map(|cid| (*cid, registry.name(*cid)))
                .collect();
            let res = candidate_permutation_crypto(&cand_with_names, seed, round_id);
            debug!(
                "find_eliminated_candidate: elimination queue using tiebreak mode random: {:?}",
                res
            );
            res.first().cloned()
        }
    }
}

/// Generates a "random" permutation of the candidates. Random in this context
/// means hard to guess in advance. The order is given by the SHA-256 digests of
/// the seed, the round and the name of each candidate.
fn candidate_permutation_crypto(
    candidates: &[(CandidateId, &str)],
    seed: u32,
    num_round: RoundId,
) -> Vec<CandidateId> {
    let mut data: Vec<(CandidateId, String)> = candidates
        .iter()
        .map(|(cid, name)| {
            (
                *cid,
                sha256::digest(format!("{:08}{:08}{}", seed, num_round, name)),
            )
        })
        .collect();
    data.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
    data.iter().map(|p| p.0).collect()
}

fn elimination_stats(
    registry: &Registry,
    eliminated: CandidateId,
    elimination: &EliminationInternal,
) -> EliminationStats {
    EliminationStats {
        name: registry.name(eliminated).to_string(),
        transfers: elimination
            .transfers
            .iter()
            .map(|(cid, vc)| (registry.name(*cid).to_string(), vc.0))
            .collect(),
        exhausted: elimination.exhausted.0,
    }
}
