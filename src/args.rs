use clap::Parser;

/// Renders per-contact FEC contribution summaries from a search response.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The search response returned by the matching backend for an
    /// uploaded contact list, in JSON format.
    #[clap(short, long, value_parser)]
    pub input: String,

    /// (file path) A reference rendering in JSON format. If provided, contriblookup will
    /// check that the rendered output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the rendered summary will be written
    /// in JSON format to the given location instead of the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
