use log::{debug, info};

use crate::*;

/// Runs a plurality (first past the post) election.
///
/// Each ballot is the name of a single candidate. All the candidates that
/// receive the largest number of votes are reported as winners.
pub fn first_past_the_post(
    candidates: &[String],
    ballots: &[String],
) -> Result<TallyResult, VotingErrors> {
    info!(
        "first_past_the_post: processing {:?} votes, candidates: {:?}",
        ballots.len(),
        candidates
    );
    let registry = Registry::new(candidates)?;
    let ballots = registry.checked_ballots(
        ballots.iter().map(|name| (std::slice::from_ref(name), 1)),
        DuplicateCandidateMode::SkipDuplicate,
    )?;
    Ok(plurality_tally(&registry, &ballots))
}

/// Counts the first choice of every ballot, with its weight.
pub(crate) fn plurality_tally(registry: &Registry, ballots: &[Ballot]) -> TallyResult {
    let mut tally: Vec<VoteCount> = vec![VoteCount::EMPTY; registry.len()];
    for ballot in ballots.iter() {
        if let Some(cid) = ballot.ranks.first() {
            tally[cid.idx()] += ballot.count;
        }
    }
    debug!("plurality_tally: tally: {:?}", tally);

    let outcome = max_tally_outcome(registry, &tally);
    info!("plurality_tally: outcome: {:?}", outcome);
    TallyResult {
        outcome,
        tally: registry.named_tally(&registry.all_ids(), &tally),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests::names;
    use crate::*;

    #[test]
    fn majority_of_ballots() {
        let res = first_past_the_post(&names(&["A", "B", "C"]), &names(&["A", "A", "B"])).unwrap();
        assert_eq!(res.outcome, Outcome::SingleWinner("A".to_string()));
        assert_eq!(
            res.tally,
            vec![
                ("A".to_string(), 2),
                ("B".to_string(), 1),
                ("C".to_string(), 0)
            ]
        );
    }

    #[test]
    fn ties_are_all_reported() {
        let res = first_past_the_post(&names(&["A", "B", "C"]), &names(&["C", "A"])).unwrap();
        assert_eq!(res.outcome, Outcome::MultiWinner(names(&["A", "C"])));
    }

    #[test]
    fn no_ballots_ties_everyone() {
        let res = first_past_the_post(&names(&["A", "B"]), &[]).unwrap();
        assert_eq!(res.outcome, Outcome::MultiWinner(names(&["A", "B"])));
        let res = first_past_the_post(&names(&["A"]), &[]).unwrap();
        assert_eq!(res.outcome, Outcome::SingleWinner("A".to_string()));
    }

    #[test]
    fn unknown_candidate() {
        let res = first_past_the_post(&names(&["A", "B"]), &names(&["A", "D"]));
        assert_eq!(
            res,
            Err(VotingErrors::InvalidVote {
                ballot: 1,
                name: "D".to_string()
            })
        );
    }

    #[test]
    fn repeated_calls_agree() {
        let candidates = names(&["A", "B", "C"]);
        let ballots = names(&["B", "C", "B"]);
        let first = first_past_the_post(&candidates, &ballots);
        assert_eq!(first, first_past_the_post(&candidates, &ballots));
    }
}
