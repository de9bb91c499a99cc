use crate::tally::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    #[serde(rename = "contestDate")]
    pub contest_date: Option<String>,
    #[serde(rename = "contestJurisdiction")]
    pub contest_jurisdiction: Option<String>,
    #[serde(rename = "contestOffice")]
    pub contest_office: Option<String>,
    /// Where to write the summary: a path or 'stdout'.
    #[serde(rename = "outputFile")]
    pub output_file: Option<String>,
}

/// The description of the election, as written in the summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office: Option<String>,
    pub method: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "firstVoteColumnIndex")]
    _first_vote_column_index: Option<JSValue>,
    #[serde(rename = "firstVoteRowIndex")]
    _first_vote_row_index: Option<JSValue>,
    #[serde(rename = "idColumnIndex")]
    pub id_column_index: Option<JSValue>,
    #[serde(rename = "countColumnIndex")]
    pub count_column_index: Option<JSValue>,
}

impl FileSource {
    /// A CSV source with one ballot per row and only choices in the columns.
    pub fn plain_csv(file_path: &str) -> FileSource {
        FileSource {
            provider: "csv".to_string(),
            file_path: file_path.to_string(),
            _first_vote_column_index: None,
            _first_vote_row_index: None,
            id_column_index: None,
            count_column_index: None,
        }
    }

    // All the indices are 1-based in the configuration, and 0-based in the readers.

    pub fn first_vote_column_index(&self) -> CliResult<usize> {
        read_js_index(&self._first_vote_column_index, 1)
    }

    pub fn first_vote_row_index(&self) -> CliResult<usize> {
        read_js_index(&self._first_vote_row_index, 1)
    }

    pub fn id_column_index_int(&self) -> CliResult<Option<usize>> {
        read_js_optional_index(&self.id_column_index)
    }

    pub fn count_column_index_int(&self) -> CliResult<Option<usize>> {
        read_js_optional_index(&self.count_column_index)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionCandidate {
    pub name: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionRules {
    #[serde(rename = "votingMethod")]
    pub voting_method: String,
    #[serde(rename = "tiebreakMode")]
    pub tiebreak_mode: Option<String>,
    #[serde(rename = "randomSeed")]
    pub random_seed: Option<String>,
    #[serde(rename = "exhaustOnDuplicateCandidate")]
    pub exhaust_on_duplicate_candidate: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "cvrFileSources", default)]
    pub cvr_file_sources: Vec<FileSource>,
    #[serde(default)]
    pub candidates: Vec<ElectionCandidate>,
    pub rules: ElectionRules,
}

pub fn read_config(path: &str) -> CliResult<ElectionConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: ElectionConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> CliResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_summary: {:?}", js);
    Ok(js)
}

fn read_js_optional_index(x: &Option<JSValue>) -> CliResult<Option<usize>> {
    match x {
        None | Some(JSValue::Null) => Ok(None),
        Some(_) => read_js_int(x).map(|idx| Some(idx - 1)),
    }
}

fn read_js_index(x: &Option<JSValue>, default: usize) -> CliResult<usize> {
    match read_js_optional_index(x)? {
        Some(idx) => Ok(idx),
        None => Ok(default - 1),
    }
}

// A positive 1-based index, as a number, a string or an Excel-style column name.
fn read_js_int(x: &Option<JSValue>) -> CliResult<usize> {
    let value = format!("{:?}", x);
    let res = match x {
        Some(JSValue::Number(n)) => n.as_u64().map(|x| x as usize),
        Some(JSValue::String(s)) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            s.to_ascii_lowercase().chars().try_fold(0usize, |acc, c| {
                acc.checked_mul(26)?
                    .checked_add((c as usize) - ('a' as usize) + 1)
            })
        }
        Some(JSValue::String(s)) => s.parse::<usize>().ok(),
        _ => None,
    };
    res.filter(|idx| *idx >= 1)
        .context(ParsingJsonNumberSnafu { value })
}
