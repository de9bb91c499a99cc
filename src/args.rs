use clap::Parser;

/// This is an election tabulation program (plurality, approval, instant-runoff, Condorcet, Borda count).
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file containing the election description in JSON format.
    /// For more information about the file format, read the manual of the tally_engine crate.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the outcome of an election in JSON format. If provided, votetally will
    /// check that the tabulated output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the election will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The CSV file containing the ballots. Setting this option overrides the
    /// files that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (firstPastThePost, approval, preferential, condorcet, borda) The voting method. Setting this
    /// option overrides the method that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub method: Option<String>,

    /// (list of names or not specified) The registered candidates, in order. If not specified and
    /// no configuration is provided, the candidates are inferred from the ballots.
    #[clap(long, value_parser, multiple_values = true)]
    pub candidates: Option<Vec<String>>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
