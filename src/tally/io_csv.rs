// Primitives for reading CSV files.

use std::fs::File;

use crate::tally::{
    io_common::{assemble_choices, make_default_id},
    *,
};

pub fn read_csv_ranking(path: &str, cfs: &FileSource) -> CliResult<Vec<ParsedBallot>> {
    let default_id = make_default_id(path);

    let id_idx_o = cfs.id_column_index_int()?;
    let choices_start_col = cfs.first_vote_column_index()?;
    let count_idx_o = cfs.count_column_index_int()?;

    let mut res: Vec<ParsedBallot> = Vec::new();
    let (records, row_offset) = get_records(path, cfs)?;

    for (idx, line_r) in records.enumerate() {
        // Line numbers start at 1, like in a spreadsheet.
        let lineno = idx + row_offset + 1;
        let line = line_r.context(CsvLineParseSnafu {})?;
        debug!("read_csv_ranking: lineno: {:?} line: {:?}", lineno, line);
        let id = if let Some(id_idx) = id_idx_o {
            line.get(id_idx)
                .context(CsvLineTooShortSnafu { lineno })?
                .to_string()
        } else {
            default_id(lineno)
        };

        let count: Option<u64> = if let Some(count_idx) = count_idx_o {
            let content = line
                .get(count_idx)
                .context(CsvLineTooShortSnafu { lineno })?
                .trim();
            let c = content
                .parse::<u64>()
                .ok()
                .context(CsvCountSnafu { lineno, content })?;
            Some(c)
        } else {
            None
        };

        let cells: Vec<String> = line
            .iter()
            .skip(choices_start_col)
            .map(|s| s.to_string())
            .collect();
        let pb = ParsedBallot {
            id: Some(id),
            count,
            choices: assemble_choices(&cells),
        };
        res.push(pb);
    }
    Ok(res)
}

fn get_records(
    path: &str,
    cfs: &FileSource,
) -> CliResult<(csv::StringRecordsIntoIter<File>, usize)> {
    let first_row = cfs.first_vote_row_index()?;
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.into_records();
    // Skip the header rows.
    for _ in 0..first_row {
        _ = records.next();
    }
    Ok((records, first_row))
}
