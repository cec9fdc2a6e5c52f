use clap::Parser;

const CMD_NAME: &str = "pf";
const DEFAULT_WORKFLOW: &str = "workflow.pf";

/// Stores our command-line args format.
#[derive(Parser)]
#[command(name = CMD_NAME, version, about = None, long_about = None)]
pub struct Args {
    /// Workflow document
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_WORKFLOW)]
    #[arg(env = "PHYLOFLOW_WORKFLOW")]
    pub workflow: String,

    /// Number of worker threads [default: number of cores]
    #[arg(short = 'j', long, value_name = "N")]
    #[arg(env = "PHYLOFLOW_THREADS")]
    pub threads: Option<usize>,

    /// Print additional info (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print the data block of a node
    #[arg(short, long, value_name = "NODE")]
    pub show: Vec<String>,

    /// Override an option of the step producing a node
    #[arg(short = 'O', long = "set", value_name = "NODE.OPTION=VALUE")]
    pub set: Vec<String>,

    /// Save the workflow, including overrides, to this file
    #[arg(short = 'o', long, value_name = "FILE")]
    pub save: Option<String>,
}
