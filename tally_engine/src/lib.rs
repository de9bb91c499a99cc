/*!
Election tallying under five voting rules.

Every rule is a pure function that takes the registered candidates and the
ballots, and returns the outcome together with the detailed tally:

| Rule | Function | Ballot |
|------|----------|--------|
| Plurality | [first_past_the_post] | one name |
| Approval | [approval_voting] | a set of names |
| Instant-runoff | [preferential_voting] | a ranking |
| Condorcet | [condorcet_method] | a ranking |
| Borda count | [borda_count] | a ranking |

```
use tally_engine::*;

let candidates = vec!["Alice".to_string(), "Bob".to_string(), "Clara".to_string()];
let ballots = vec!["Alice".to_string(), "Alice".to_string(), "Bob".to_string()];
let res = first_past_the_post(&candidates, &ballots)?;
assert_eq!(res.outcome, Outcome::SingleWinner("Alice".to_string()));
# Ok::<(), VotingErrors>(())
```

A ballot that mentions a name outside of the candidates makes the whole call
fail with [VotingErrors::InvalidVote]. See the [manual] for the exact rules.
*/
mod approval;
mod borda;
pub mod builder;
mod condorcet;
mod config;
pub mod manual;
mod plurality;
mod preferential;

use log::debug;
use snafu::{ensure, OptionExt};

use std::{
    collections::{HashMap, HashSet},
    ops::AddAssign,
};

pub use crate::approval::approval_voting;
pub use crate::borda::borda_count;
pub use crate::condorcet::condorcet_method;
pub use crate::config::*;
pub use crate::plurality::first_past_the_post;
pub use crate::preferential::preferential_voting;

// **** Private structures ****

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct CandidateId(u32);

impl CandidateId {
    fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct VoteCount(u64);

impl VoteCount {
    const EMPTY: VoteCount = VoteCount(0);
}

impl std::iter::Sum for VoteCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        VoteCount(iter.map(|vc| vc.0).sum())
    }
}

impl AddAssign for VoteCount {
    fn add_assign(&mut self, rhs: VoteCount) {
        self.0 += rhs.0;
    }
}

/// A validated ballot, with the number of voters who cast it.
#[derive(Eq, PartialEq, Debug, Clone)]
struct Ballot {
    ranks: Vec<CandidateId>,
    count: VoteCount,
}

/// The registered candidates of one election.
///
/// Candidate ids are the positions in the candidate list. If a name is
/// registered twice, the first position owns it.
#[derive(Debug, Clone)]
struct Registry {
    names: Vec<String>,
    ids: HashMap<String, CandidateId>,
}

impl Registry {
    fn new(candidates: &[String]) -> Result<Registry, VotingErrors> {
        ensure!(!candidates.is_empty(), EmptyElectionSnafu {});
        let mut ids: HashMap<String, CandidateId> = HashMap::new();
        for (idx, name) in candidates.iter().enumerate() {
            ids.entry(name.clone()).or_insert(CandidateId(idx as u32));
        }
        Ok(Registry {
            names: candidates.to_vec(),
            ids,
        })
    }

    fn len(&self) -> usize {
        self.names.len()
    }

    fn all_ids(&self) -> Vec<CandidateId> {
        (0..self.names.len())
            .map(|idx| CandidateId(idx as u32))
            .collect()
    }

    fn name(&self, cid: CandidateId) -> &str {
        &self.names[cid.idx()]
    }

    fn check_name(&self, ballot: usize, name: &str) -> Result<CandidateId, VotingErrors> {
        self.ids
            .get(name)
            .cloned()
            .context(InvalidVoteSnafu { ballot, name })
    }

    /// Validates a ranked ballot and applies the duplicate policy.
    fn check_ranking(
        &self,
        ballot: usize,
        names: &[String],
        duplicate_policy: DuplicateCandidateMode,
    ) -> Result<Vec<CandidateId>, VotingErrors> {
        let mut ranks: Vec<CandidateId> = Vec::with_capacity(names.len());
        let mut seen: HashSet<CandidateId> = HashSet::new();
        let mut exhausted = false;
        for name in names.iter() {
            // All the names are checked, even the ones after an exhausting duplicate.
            let cid = self.check_name(ballot, name)?;
            if exhausted {
                continue;
            }
            if seen.insert(cid) {
                ranks.push(cid);
            } else if duplicate_policy == DuplicateCandidateMode::Exhaust {
                debug!(
                    "check_ranking: ballot {}: {} is repeated, exhausting the ranking",
                    ballot, name
                );
                exhausted = true;
            }
        }
        Ok(ranks)
    }

    /// Validates weighted ballots, given as (names, count) in ballot order.
    fn checked_ballots<'a>(
        &self,
        ballots: impl IntoIterator<Item = (&'a [String], u64)>,
        duplicate_policy: DuplicateCandidateMode,
    ) -> Result<Vec<Ballot>, VotingErrors> {
        ballots
            .into_iter()
            .enumerate()
            .map(|(idx, (names, count))| {
                Ok(Ballot {
                    ranks: self.check_ranking(idx, names, duplicate_policy)?,
                    count: VoteCount(count),
                })
            })
            .collect()
    }

    /// Validates unweighted ballots: every ballot counts once.
    fn checked_rankings(
        &self,
        ballots: &[Vec<String>],
        duplicate_policy: DuplicateCandidateMode,
    ) -> Result<Vec<Ballot>, VotingErrors> {
        self.checked_ballots(ballots.iter().map(|b| (b.as_slice(), 1)), duplicate_policy)
    }

    fn named_tally(&self, cids: &[CandidateId], tally: &[VoteCount]) -> Vec<(String, u64)> {
        cids.iter()
            .map(|cid| (self.name(*cid).to_string(), tally[cid.idx()].0))
            .collect()
    }
}

/// All the candidates that reach the maximum of the tally, in candidate order.
fn max_tally_outcome(registry: &Registry, tally: &[VoteCount]) -> Outcome {
    let max_count = tally.iter().cloned().max().unwrap_or(VoteCount::EMPTY);
    let winners: Vec<String> = registry
        .all_ids()
        .into_iter()
        .filter(|cid| tally[cid.idx()] == max_count)
        .map(|cid| registry.name(cid).to_string())
        .collect();
    Outcome::from_winners(winners)
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn names(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn registry_rejects_empty_candidates() {
        let res = Registry::new(&[]);
        assert_eq!(res.err(), Some(VotingErrors::EmptyElection {}));
    }

    #[test]
    fn registry_first_registration_owns_a_name() {
        let reg = Registry::new(&names(&["A", "B", "A"])).unwrap();
        assert_eq!(reg.check_name(0, "A"), Ok(CandidateId(0)));
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn unknown_names_are_reported_with_their_ballot() {
        let reg = Registry::new(&names(&["A", "B"])).unwrap();
        let err = reg.check_ranking(3, &names(&["A", "Z"]), DuplicateCandidateMode::SkipDuplicate);
        assert_eq!(
            err,
            Err(VotingErrors::InvalidVote {
                ballot: 3,
                name: "Z".to_string()
            })
        );
        assert_eq!(
            err.unwrap_err().to_string(),
            "Invalid vote in ballot 3: Z is not a valid candidate."
        );
    }

    #[test]
    fn duplicates_are_skipped() {
        let reg = Registry::new(&names(&["A", "B", "C"])).unwrap();
        let ranks = reg
            .check_ranking(0, &names(&["B", "B", "A"]), DuplicateCandidateMode::SkipDuplicate)
            .unwrap();
        assert_eq!(ranks, vec![CandidateId(1), CandidateId(0)]);
    }

    #[test]
    fn duplicates_exhaust_the_ranking() {
        let reg = Registry::new(&names(&["A", "B", "C"])).unwrap();
        let ranks = reg
            .check_ranking(0, &names(&["B", "B", "A"]), DuplicateCandidateMode::Exhaust)
            .unwrap();
        assert_eq!(ranks, vec![CandidateId(1)]);
        // Names after the duplicate are still validated.
        let err = reg.check_ranking(0, &names(&["B", "B", "Z"]), DuplicateCandidateMode::Exhaust);
        assert!(matches!(err, Err(VotingErrors::InvalidVote { .. })));
    }

    #[test]
    fn ballots_keep_their_weight() {
        let reg = Registry::new(&names(&["A", "B"])).unwrap();
        let votes = vec![names(&["B", "A"]), names(&["A"])];
        let ballots = reg
            .checked_ballots(
                votes.iter().zip([5_000_000_000, 1]).map(|(v, c)| (v.as_slice(), c)),
                DuplicateCandidateMode::SkipDuplicate,
            )
            .unwrap();
        assert_eq!(
            ballots,
            vec![
                Ballot {
                    ranks: vec![CandidateId(1), CandidateId(0)],
                    count: VoteCount(5_000_000_000)
                },
                Ballot {
                    ranks: vec![CandidateId(0)],
                    count: VoteCount(1)
                },
            ]
        );
        let err = reg.checked_ballots(
            votes.iter().chain([names(&["C"])].iter()).map(|v| (v.as_slice(), 2)),
            DuplicateCandidateMode::SkipDuplicate,
        );
        assert_eq!(
            err,
            Err(VotingErrors::InvalidVote {
                ballot: 2,
                name: "C".to_string()
            })
        );
    }

    #[test]
    fn max_tally_reports_all_ties() {
        let reg = Registry::new(&names(&["A", "B", "C"])).unwrap();
        let outcome = max_tally_outcome(&reg, &[VoteCount(2), VoteCount(1), VoteCount(2)]);
        assert_eq!(outcome, Outcome::MultiWinner(names(&["A", "C"])));
    }
}
