/*!

This is the long-form manual for `tally_engine` and `votetally`.

## Voting rules

All the rules take the list of registered candidates, in a fixed order. This
order is the order of every reported tally, of the tied winners, and the
tie-break order of the instant-runoff eliminations.

A ballot naming someone outside of the registered candidates is an error
(`InvalidVote`): the whole tally is aborted and no partial result is returned.

### Plurality (`firstPastThePost`)

Each ballot names one candidate. The candidates with the most votes win. All
the tied candidates are reported.

### Approval (`approval`)

Each ballot is the set of candidates the voter approves of. The candidates with
the most approvals win. All the tied candidates are reported, like for
plurality and Borda count.

### Instant-runoff (`preferential`)

Each ballot ranks some of the candidates, most preferred first. In each round,
the first remaining preference of every ballot is counted. A candidate with
strictly more than half of these votes is elected. Otherwise one candidate
with the fewest votes is eliminated and its ballots go to their next choice,
or are exhausted if there is none.

- Ties for the last place are broken with the `tiebreakMode` rule:
  `useCandidateOrder` eliminates the candidate registered first, `random`
  uses a hash of `randomSeed`, the round number and the names.
- When only two candidates remain and they are tied, both are reported as
  winners.
- When all the ballots are exhausted, there is no winner.

### Condorcet (`condorcet`)

Each ballot ranks some of the candidates. For every pair of ranked candidates,
the one ranked earlier gets a point against the other. Unranked candidates are
not compared. The winner beats every other candidate head to head; when no
candidate does, there is no winner.

### Borda count (`borda`)

Each ballot ranks some of the candidates. With `n` registered candidates, the
first choice gets `n - 1` points, the second `n - 2`, and so on. Unranked
candidates get nothing. The candidates with the highest score win.

### Repeated candidates

A ranking may repeat a candidate. By default the repeated entries are ignored.
With `exhaustOnDuplicateCandidate`, the ranking stops right before the first
repeated entry.

## Input formats

### csv

Simple CSV reader. Each row is a ballot, and each column (in order) is a
choice. Blank cells are skipped.

```text
id,count,choice 1,choice 2,choice 3
id1,20,A,B,C
id2,20,A,C,
```

The `id` and `count` columns are optional. Headers in the first row are
optional. See the [Configuration section](#configuration) on controlling the
optional rows and columns.

For plurality, only the first choice of each row is counted.

## Configuration

`votetally` reads an election description in JSON:

```text
{
  "outputSettings": { "contestName": "Board election", "outputFile": "summary.json" },
  "cvrFileSources": [
    { "provider": "csv", "filePath": "ballots.csv",
      "firstVoteColumnIndex": 3, "firstVoteRowIndex": 2,
      "idColumnIndex": 1, "countColumnIndex": 2 }
  ],
  "candidates": [ { "name": "A" }, { "name": "B" }, { "name": "C" } ],
  "rules": { "votingMethod": "preferential", "tiebreakMode": "useCandidateOrder" }
}
```

FileSource:
 - `filePath`: relative to the directory of the configuration file.
 - `firstVoteColumnIndex`, `firstVoteRowIndex`, `idColumnIndex`,
   `countColumnIndex` (number or string, optional): 1-based positions. If no
   count column is provided, every ballot has a count of 1.

Rules:
 - `votingMethod`: `firstPastThePost` (or `plurality`), `approval`,
   `preferential` (or `irv`, `instantRunoff`), `condorcet`, `borda`.
 - `tiebreakMode` (optional): `useCandidateOrder` (default) or `random`,
   which requires `randomSeed`.
 - `exhaustOnDuplicateCandidate` (optional, default false).

Without a configuration file, `--input` and `--method` describe the election,
and the candidates are either given with `--candidates` or inferred from the
ballots.

 */
