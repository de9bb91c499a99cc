use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use tally_engine::builder::Builder;
use tally_engine::*;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::tally::config_reader::*;

mod config_reader;
mod io_common;
mod io_csv;

#[derive(Debug, Snafu)]
pub enum CliError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON content"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a positive index, found {value}"))]
    ParsingJsonNumber { value: String },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing CSV line"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("CSV line {lineno} is too short"))]
    CsvLineTooShort { lineno: usize },
    #[snafu(display("CSV line {lineno}: {content:?} is not a valid count"))]
    CsvCount { lineno: usize, content: String },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("{source}"))]
    Voting { source: VotingErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type CliResult<T> = Result<T, CliError>;

/// A ballot, as parsed by the readers.
/// Blank choices are already removed.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedBallot {
    pub id: Option<String>,
    pub count: Option<u64>,
    pub choices: Vec<String>,
}

fn outcome_name(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::SingleWinner(_) => "singleWinner",
        Outcome::MultiWinner(_) => "multiWinner",
        Outcome::NoWinner => "noWinner",
    }
}

fn tally_to_json(tally: &[(String, u64)]) -> JSValue {
    let mut js: JSMap<String, JSValue> = JSMap::new();
    for (name, count) in tally.iter() {
        js.insert(name.clone(), json!(count.to_string()));
    }
    JSValue::Object(js)
}

fn result_stats_to_json(round_stats: &[RoundStats]) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for round_stat in round_stats.iter() {
        let mut tally_results: Vec<JSValue> = Vec::new();
        for elim_stats in round_stat.tally_result_eliminated.iter() {
            let mut transfers: JSMap<String, JSValue> = JSMap::new();
            for (name, count) in elim_stats.transfers.iter() {
                transfers.insert(name.clone(), json!(count.to_string()));
            }
            if elim_stats.exhausted > 0 {
                transfers.insert(
                    "exhausted".to_string(),
                    json!(elim_stats.exhausted.to_string()),
                );
            }
            tally_results.push(json!({
                "eliminated": elim_stats.name,
                "transfers": transfers
            }));
        }
        for winner_name in round_stat.tally_results_elected.iter() {
            tally_results.push(json!({
                "elected": winner_name,
                "transfers": {}
            }));
        }

        let js = json!({
            "round": round_stat.round,
            "tally": tally_to_json(&round_stat.tally),
            "tallyResults": tally_results
        });
        l.push(js);
    }
    l
}

fn pairwise_to_json(pairwise: &[PairwiseCount]) -> JSValue {
    let mut js: JSMap<String, JSValue> = JSMap::new();
    for pc in pairwise.iter() {
        let row = js
            .entry(pc.candidate.clone())
            .or_insert_with(|| JSValue::Object(JSMap::new()));
        row[pc.opponent.as_str()] = json!(pc.count.to_string());
    }
    JSValue::Object(js)
}

fn results_to_json(result: &ElectionResult) -> JSValue {
    let mut js = match result {
        ElectionResult::FirstPastThePost(r)
        | ElectionResult::Approval(r)
        | ElectionResult::Borda(r) => json!({ "tally": tally_to_json(&r.tally) }),
        ElectionResult::Preferential(r) => {
            json!({ "rounds": result_stats_to_json(&r.round_stats) })
        }
        ElectionResult::Condorcet(r) => json!({ "pairwise": pairwise_to_json(&r.pairwise) }),
    };
    let outcome = result.outcome();
    js["outcome"] = json!(outcome_name(outcome));
    js["winners"] = json!(outcome.winners());
    js
}

fn build_summary_js(config: &ElectionConfig, method: VotingMethod, rv: &ElectionResult) -> JSValue {
    let c = OutputConfig {
        contest: config.output_settings.contest_name.clone(),
        date: config.output_settings.contest_date.clone(),
        jurisdiction: config.output_settings.contest_jurisdiction.clone(),
        office: config.output_settings.contest_office.clone(),
        method: method.name().to_string(),
    };
    json!({
        "config": c,
        "results": results_to_json(rv) })
}

fn parse_voting_method(name: &str) -> CliResult<VotingMethod> {
    let method = match name {
        "firstPastThePost" | "plurality" => VotingMethod::FirstPastThePost,
        "approval" => VotingMethod::Approval,
        "preferential" | "irv" | "instantRunoff" => VotingMethod::Preferential,
        "condorcet" => VotingMethod::Condorcet,
        "borda" => VotingMethod::Borda,
        x => {
            whatever!("Unknown voting method {:?}", x)
        }
    };
    Ok(method)
}

fn validate_rules(rules: &ElectionRules) -> CliResult<(VotingMethod, VoteRules)> {
    let method = parse_voting_method(rules.voting_method.as_str())?;
    let res = VoteRules {
        tiebreak_mode: match rules.tiebreak_mode.as_deref() {
            None | Some("useCandidateOrder") => TieBreakMode::UseCandidateOrder,
            Some("random") => {
                let seed = match rules.random_seed.clone().map(|s| s.parse::<u32>()) {
                    Some(Result::Ok(x)) => x,
                    x => {
                        whatever!("Cannot use tiebreak mode random with seed {:?}", x)
                    }
                };
                TieBreakMode::Random(seed)
            }
            Some(x) => {
                whatever!("Cannot use tiebreak mode {:?} (currently not implemented)", x)
            }
        },
        duplicate_candidate_mode: match rules.exhaust_on_duplicate_candidate {
            Some(true) => DuplicateCandidateMode::Exhaust,
            _ => DuplicateCandidateMode::SkipDuplicate,
        },
    };
    Ok((method, res))
}

fn read_ranking_data(path: &Path, cfs: &FileSource) -> CliResult<Vec<ParsedBallot>> {
    let p = path.display().to_string();
    info!("Attempting to read rank file {:?}", p);
    match cfs.provider.as_str() {
        "csv" => io_csv::read_csv_ranking(&p, cfs),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

fn ballots_to_votes(parsed_ballots: &[ParsedBallot]) -> Vec<Vote> {
    let mut res: Vec<Vote> = Vec::new();
    for pb in parsed_ballots.iter() {
        // Default of 1 if not specified
        let count = pb.count.unwrap_or(1);
        if count > 0 && !pb.choices.is_empty() {
            res.push(Vote {
                candidates: pb.choices.clone(),
                count,
            });
        } else {
            debug!("ballots_to_votes: skipping empty ballot {:?}", pb.id);
        }
    }
    res
}

/// Reads the election description: from the configuration file if there is
/// one, then from the command line options.
///
/// Returns the configuration and the resolved paths of the ballot files.
fn load_election(args: &Args) -> CliResult<(ElectionConfig, Vec<(PathBuf, FileSource)>)> {
    let mut config = if let Some(config_path) = args.config.as_ref() {
        read_config(config_path)?
    } else {
        let input = match args.input.as_ref() {
            Some(x) => x,
            None => whatever!("Either --config or --input must be provided"),
        };
        let method = match args.method.as_ref() {
            Some(x) => x.clone(),
            None => whatever!("--method must be provided when there is no configuration file"),
        };
        ElectionConfig {
            output_settings: OutputSettings {
                contest_name: io_common::simplify_file_name(input),
                contest_date: None,
                contest_jurisdiction: None,
                contest_office: None,
                output_file: None,
            },
            cvr_file_sources: vec![],
            candidates: vec![],
            rules: ElectionRules {
                voting_method: method,
                tiebreak_mode: None,
                random_seed: None,
                exhaust_on_duplicate_candidate: None,
            },
        }
    };

    if let Some(method) = args.method.as_ref() {
        config.rules.voting_method = method.clone();
    }
    if let Some(cands) = args.candidates.as_ref() {
        config.candidates = cands
            .iter()
            .map(|name| ElectionCandidate { name: name.clone() })
            .collect();
    }

    let sources: Vec<(PathBuf, FileSource)> = if let Some(input) = args.input.as_ref() {
        vec![(PathBuf::from(input), FileSource::plain_csv(input))]
    } else {
        let config_path = args.config.clone().unwrap_or_default();
        let root_p = Path::new(config_path.as_str())
            .parent()
            .context(MissingParentDirSnafu {})?;
        config
            .cvr_file_sources
            .iter()
            .map(|cfs| (root_p.join(&cfs.file_path), cfs.clone()))
            .collect()
    };
    if sources.is_empty() {
        whatever!("No ballot file sources detected");
    }
    Ok((config, sources))
}

/// Runs the election and returns the summary in JSON.
fn tabulate(config: &ElectionConfig, sources: &[(PathBuf, FileSource)]) -> CliResult<JSValue> {
    let (method, rules) = validate_rules(&config.rules)?;
    info!("method: {:?} rules: {:?}", method, rules);

    let mut builder = Builder::new(method, &rules).context(VotingSnafu {})?;
    if !config.candidates.is_empty() {
        let names: Vec<String> = config.candidates.iter().map(|c| c.name.clone()).collect();
        builder = builder.candidates(&names).context(VotingSnafu {})?;
    } else {
        warn!("No candidates declared, they will be inferred from the ballots");
    }

    for (path, cfs) in sources.iter() {
        let parsed_ballots = read_ranking_data(path, cfs)?;
        for vote in ballots_to_votes(&parsed_ballots) {
            builder.add_vote_2(&vote).context(VotingSnafu {})?;
        }
    }

    let result = builder.run().context(VotingSnafu {})?;
    info!("outcome: {:?}", result.outcome());
    debug!("result: {:?}", result);

    Ok(build_summary_js(config, builder.method(), &result))
}

fn write_summary(summary: &str, out: Option<&str>) -> CliResult<()> {
    match out {
        None | Some("stdout") => {
            println!("{}", summary);
        }
        Some("") => {
            debug!("write_summary: empty output path, not writing the summary");
        }
        Some(path) => {
            info!("Writing summary to {:?}", path);
            fs::write(path, summary).context(WritingSummarySnafu { path })?;
        }
    }
    Ok(())
}

fn check_reference(pretty_js_stats: &str, summary_p: &str) -> CliResult<()> {
    let summary_ref = read_summary(summary_p)?;
    debug!("summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

pub fn run_election(args: &Args) -> CliResult<()> {
    let (config, sources) = load_election(args)?;
    info!("config: {:?}", config);

    let result_js = tabulate(&config, &sources)?;
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    let out = args
        .out
        .clone()
        .or_else(|| config.output_settings.output_file.clone());
    write_summary(&pretty_js_stats, out.as_deref())?;

    // The reference summary, if provided for comparison
    if let Some(summary_p) = args.reference.as_ref() {
        check_reference(&pretty_js_stats, summary_p)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_dir() -> String {
        option_env!("VOTETALLY_TEST_DIR")
            .unwrap_or(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data"))
            .to_string()
    }

    fn test_args(test_name: &str) -> Args {
        let dir = format!("{}/{}", test_dir(), test_name);
        Args {
            config: Some(format!("{}/{}_config.json", dir, test_name)),
            reference: Some(format!("{}/{}_expected_summary.json", dir, test_name)),
            out: Some("".to_string()),
            input: None,
            method: None,
            candidates: None,
            verbose: false,
        }
    }

    fn test_wrapper(test_name: &str) {
        let _ = env_logger::builder().is_test(true).try_init();
        info!("Running test {}", test_name);
        let res = run_election(&test_args(test_name));
        if let Err(e) = res.as_ref() {
            eprintln!("An error occured {}", e);
        }
        assert!(res.is_ok(), "test {} failed: {:?}", test_name, res);
    }

    #[test]
    fn borda_board() {
        test_wrapper("borda_board");
    }

    #[test]
    fn irv_transfers() {
        test_wrapper("irv_transfers");
    }

    #[test]
    fn condorcet_cycle() {
        test_wrapper("condorcet_cycle");
    }

    #[test]
    fn plurality_tie() {
        test_wrapper("plurality_tie");
    }

    #[test]
    fn approval_board() {
        test_wrapper("approval_board");
    }

    #[test]
    fn invalid_vote() {
        let mut args = test_args("invalid_vote");
        args.reference = None;
        let res = run_election(&args);
        match res {
            Err(CliError::Voting {
                source: VotingErrors::InvalidVote { ballot, name },
            }) => {
                assert_eq!(ballot, 2);
                assert_eq!(name, "Dan");
            }
            x => panic!("expected an invalid vote, got {:?}", x),
        }
    }

    #[test]
    fn reference_mismatch_is_an_error() {
        let mut args = test_args("borda_board");
        args.method = Some("plurality".to_string());
        assert!(run_election(&args).is_err());
    }

    #[test]
    fn command_line_only() {
        let dir = format!("{}/irv_transfers", test_dir());
        let args = Args {
            config: None,
            reference: None,
            out: Some("".to_string()),
            input: Some(format!("{}/irv_transfers_cvr.csv", dir)),
            method: Some("irv".to_string()),
            candidates: None,
            verbose: false,
        };
        let (config, sources) = load_election(&args).unwrap();
        assert_eq!(config.output_settings.contest_name, "irv_transfers_cvr.csv");
        let summary = tabulate(&config, &sources).unwrap();
        let expected =
            read_summary(&format!("{}/irv_transfers_expected_summary.json", dir)).unwrap();
        assert_eq!(summary["results"], expected["results"]);
        assert_eq!(summary["config"]["method"], json!("preferential"));
    }

    #[test]
    fn unknown_method() {
        let rules = ElectionRules {
            voting_method: "range".to_string(),
            tiebreak_mode: None,
            random_seed: None,
            exhaust_on_duplicate_candidate: None,
        };
        assert!(validate_rules(&rules).is_err());
    }

    #[test]
    fn random_tiebreak_needs_a_seed() {
        let mut rules = ElectionRules {
            voting_method: "preferential".to_string(),
            tiebreak_mode: Some("random".to_string()),
            random_seed: None,
            exhaust_on_duplicate_candidate: Some(true),
        };
        assert!(validate_rules(&rules).is_err());
        rules.random_seed = Some("12".to_string());
        let (method, vr) = validate_rules(&rules).unwrap();
        assert_eq!(method, VotingMethod::Preferential);
        assert_eq!(vr.tiebreak_mode, TieBreakMode::Random(12));
        assert_eq!(vr.duplicate_candidate_mode, DuplicateCandidateMode::Exhaust);
    }

    #[test]
    fn condorcet_summary_layout() {
        let res = ElectionResult::Condorcet(CondorcetResult {
            outcome: Outcome::SingleWinner("A".to_string()),
            pairwise: vec![
                PairwiseCount {
                    candidate: "A".to_string(),
                    opponent: "B".to_string(),
                    count: 2,
                },
                PairwiseCount {
                    candidate: "B".to_string(),
                    opponent: "A".to_string(),
                    count: 1,
                },
            ],
        });
        assert_eq!(
            results_to_json(&res),
            json!({
                "outcome": "singleWinner",
                "winners": ["A"],
                "pairwise": { "A": { "B": "2" }, "B": { "A": "1" } }
            })
        );
    }
}
