use log::{debug, info, warn};
use snafu::ensure;

use std::collections::HashSet;

use crate::approval::approval_tally;
use crate::borda::borda_tally;
use crate::condorcet::condorcet_tally;
use crate::plurality::plurality_tally;
use crate::preferential::preferential_tally;
use crate::*;

/// A builder for adding votes and running an election.
///
/// Votes may carry a weight: a vote with a count of `n` stands for `n`
/// identical ballots, without repeating them.
///
/// ```
/// pub use tally_engine::builder::Builder;
/// pub use tally_engine::{VoteRules, VotingMethod, Outcome};
/// # use tally_engine::VotingErrors;
///
/// let mut builder = Builder::new(VotingMethod::Borda, &VoteRules::DEFAULT_RULES)?
///     .candidates(&["Anna".to_string(), "Bob".to_string()])?;
///
/// builder.add_vote_simple(&["Anna".to_string(), "Bob".to_string()])?;
/// builder.add_vote(&["Bob".to_string()], 2)?;
///
/// let res = builder.run()?;
/// assert_eq!(res.outcome(), &Outcome::SingleWinner("Bob".to_string()));
/// # Ok::<(), VotingErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: VoteRules,
    pub(crate) _method: VotingMethod,
    pub(crate) _candidates: Option<Vec<String>>,
    pub(crate) _votes: Vec<Vote>,
}

impl Builder {
    pub fn new(method: VotingMethod, rules: &VoteRules) -> Result<Builder, VotingErrors> {
        Ok(Builder {
            _rules: rules.clone(),
            _method: method,
            _candidates: None,
            _votes: Vec::new(),
        })
    }

    /// Registers the candidates. If this is never called, the candidates are
    /// inferred from the votes, in order of first appearance.
    pub fn candidates(self, cands: &[String]) -> Result<Builder, VotingErrors> {
        ensure!(!cands.is_empty(), EmptyElectionSnafu {});
        Ok(Builder {
            _candidates: Some(cands.to_vec()),
            ..self
        })
    }

    /// Adds a vote to the builder.
    ///
    /// It is the simplest use case for most cases.
    pub fn add_vote_simple(&mut self, candidates: &[String]) -> Result<(), VotingErrors> {
        self.add_vote(candidates, 1)
    }

    /// Adds a vote, with a potential weight attached to it.
    ///
    /// candidates: the choices made by the voter, in order. For plurality,
    /// only the first choice is used. For approval, the order does not matter.
    pub fn add_vote(&mut self, candidates: &[String], count: u64) -> Result<(), VotingErrors> {
        self.add_vote_2(&Vote {
            candidates: candidates.to_vec(),
            count,
        })
    }

    pub fn add_vote_2(&mut self, vote: &Vote) -> Result<(), VotingErrors> {
        self._votes.push(vote.clone());
        Ok(())
    }

    pub fn method(&self) -> VotingMethod {
        self._method
    }

    /// The candidates of the election: the registered ones, or the ones
    /// inferred from the votes.
    pub fn candidate_names(&self) -> Vec<String> {
        if let Some(cands) = self._candidates.as_ref() {
            return cands.clone();
        }
        let mut seen: HashSet<&String> = HashSet::new();
        let mut res: Vec<String> = Vec::new();
        for name in self._votes.iter().flat_map(|v| v.candidates.iter()) {
            if seen.insert(name) {
                res.push(name.clone());
            }
        }
        res
    }

    /// Runs the election with the configured voting method.
    ///
    /// An invalid vote is reported with its position in the order of addition.
    pub fn run(&self) -> Result<ElectionResult, VotingErrors> {
        let candidates = self.candidate_names();
        info!(
            "Builder::run: method {}, {} votes, candidates: {:?}",
            self._method.name(),
            self._votes.len(),
            candidates
        );
        let registry = Registry::new(&candidates)?;
        let duplicate_policy = match self._method {
            VotingMethod::FirstPastThePost | VotingMethod::Approval => {
                DuplicateCandidateMode::SkipDuplicate
            }
            _ => self._rules.duplicate_candidate_mode,
        };
        let ballots = registry.checked_ballots(
            self._votes
                .iter()
                .map(|v| (v.candidates.as_slice(), v.count)),
            duplicate_policy,
        )?;
        debug!("Builder::run: {} weighted ballots", ballots.len());

        let res = match self._method {
            VotingMethod::FirstPastThePost => {
                self.warn_extra_choices();
                ElectionResult::FirstPastThePost(plurality_tally(&registry, &ballots))
            }
            VotingMethod::Approval => ElectionResult::Approval(approval_tally(&registry, &ballots)),
            VotingMethod::Preferential => ElectionResult::Preferential(preferential_tally(
                &registry,
                ballots,
                &self._rules,
            )?),
            VotingMethod::Condorcet => {
                ElectionResult::Condorcet(condorcet_tally(&registry, &ballots))
            }
            VotingMethod::Borda => ElectionResult::Borda(borda_tally(&registry, &ballots)),
        };
        Ok(res)
    }

    // Plurality only counts the first choice of a vote.
    fn warn_extra_choices(&self) {
        for (idx, v) in self._votes.iter().enumerate() {
            if let [first, rest @ ..] = v.candidates.as_slice() {
                if !rest.is_empty() {
                    warn!(
                        "Builder::run: vote {}: counting {}, ignoring {:?}",
                        idx, first, rest
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::Builder;
    use crate::tests::names;
    use crate::*;

    #[test]
    fn weighted_plurality() {
        let mut b = Builder::new(VotingMethod::FirstPastThePost, &VoteRules::DEFAULT_RULES)
            .unwrap()
            .candidates(&names(&["A", "B"]))
            .unwrap();
        b.add_vote(&names(&["A"]), 2).unwrap();
        b.add_vote(&names(&["B", "A"]), 3).unwrap();
        b.add_vote(&names(&[]), 4).unwrap();
        let res = b.run().unwrap();
        match res {
            ElectionResult::FirstPastThePost(r) => {
                assert_eq!(r.outcome, Outcome::SingleWinner("B".to_string()));
                assert_eq!(r.tally, vec![("A".to_string(), 2), ("B".to_string(), 3)]);
            }
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn inferred_candidates() {
        let mut b = Builder::new(VotingMethod::Approval, &VoteRules::DEFAULT_RULES).unwrap();
        b.add_vote_simple(&names(&["B", "C"])).unwrap();
        b.add_vote_simple(&names(&["A", "B"])).unwrap();
        assert_eq!(b.candidate_names(), names(&["B", "C", "A"]));
        assert_eq!(
            b.run().unwrap().outcome(),
            &Outcome::SingleWinner("B".to_string())
        );
    }

    #[test]
    fn invalid_vote_reports_the_added_vote() {
        let mut b = Builder::new(VotingMethod::Condorcet, &VoteRules::DEFAULT_RULES)
            .unwrap()
            .candidates(&names(&["A", "B"]))
            .unwrap();
        b.add_vote(&names(&["A", "B"]), 10).unwrap();
        b.add_vote(&names(&["B", "E"]), 1).unwrap();
        assert_eq!(
            b.run(),
            Err(VotingErrors::InvalidVote {
                ballot: 1,
                name: "E".to_string()
            })
        );
    }

    #[test]
    fn empty_candidates_are_rejected() {
        let b = Builder::new(VotingMethod::Borda, &VoteRules::DEFAULT_RULES)
            .unwrap()
            .candidates(&[]);
        assert!(matches!(b, Err(VotingErrors::EmptyElection {})));
    }

    #[test]
    fn preferential_through_builder() {
        let mut b = Builder::new(VotingMethod::Preferential, &VoteRules::DEFAULT_RULES)
            .unwrap()
            .candidates(&names(&["A", "B", "C"]))
            .unwrap();
        b.add_vote(&names(&["A", "B"]), 2).unwrap();
        b.add_vote(&names(&["B", "C"]), 2).unwrap();
        b.add_vote(&names(&["C", "B"]), 1).unwrap();
        match b.run().unwrap() {
            ElectionResult::Preferential(r) => {
                assert_eq!(r.outcome, Outcome::SingleWinner("B".to_string()));
                assert_eq!(r.round_stats.len(), 2);
            }
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn large_weights_are_not_expanded() {
        let mut b = Builder::new(VotingMethod::Borda, &VoteRules::DEFAULT_RULES)
            .unwrap()
            .candidates(&names(&["A", "B"]))
            .unwrap();
        b.add_vote(&names(&["A", "B"]), 4_000_000_000).unwrap();
        b.add_vote(&names(&["B", "A"]), 3_000_000_000).unwrap();
        match b.run().unwrap() {
            ElectionResult::Borda(r) => {
                assert_eq!(r.outcome, Outcome::SingleWinner("A".to_string()));
                assert_eq!(
                    r.tally,
                    vec![("A".to_string(), 4_000_000_000), ("B".to_string(), 3_000_000_000)]
                );
            }
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn weighted_condorcet_and_approval() {
        let mut b = Builder::new(VotingMethod::Condorcet, &VoteRules::DEFAULT_RULES)
            .unwrap()
            .candidates(&names(&["A", "B", "C"]))
            .unwrap();
        b.add_vote(&names(&["B", "A", "C"]), 1_000_000_000_000).unwrap();
        b.add_vote(&names(&["A", "C"]), 999_999_999_999).unwrap();
        match b.run().unwrap() {
            ElectionResult::Condorcet(r) => {
                assert_eq!(r.outcome, Outcome::SingleWinner("B".to_string()));
                assert_eq!(r.preference("A", "C"), Some(1_999_999_999_999));
                assert_eq!(r.preference("B", "A"), Some(1_000_000_000_000));
            }
            x => panic!("unexpected result {:?}", x),
        }

        let mut b = Builder::new(VotingMethod::Approval, &VoteRules::DEFAULT_RULES).unwrap();
        b.add_vote(&names(&["A", "A", "B"]), 10_000_000_000).unwrap();
        match b.run().unwrap() {
            ElectionResult::Approval(r) => {
                assert_eq!(
                    r.tally,
                    vec![("A".to_string(), 10_000_000_000), ("B".to_string(), 10_000_000_000)]
                );
            }
            x => panic!("unexpected result {:?}", x),
        }
    }
}
