use std::path::Path;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// The choices of a ballot, without the blank cells.
pub fn assemble_choices(cells: &[String]) -> Vec<String> {
    cells
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

pub fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names() {
        assert_eq!(simplify_file_name("/tmp/votes/ballots.csv"), "ballots.csv");
        assert_eq!(make_default_id("data/ballots.csv")(12), "ballots.csv-00000012");
    }

    #[test]
    fn blank_cells_are_dropped() {
        let cells: Vec<String> = vec!["A".to_string(), " ".to_string(), " B ".to_string()];
        assert_eq!(assemble_choices(&cells), vec!["A".to_string(), "B".to_string()]);
    }
}
