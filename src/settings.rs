use std::path::PathBuf;

use crate::args::Args;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid option override '{0}' (should be formatted 'NODE.OPTION=VALUE')")]
    InvalidOverride(String),
    #[error("workflow file {0:?} does not exist")]
    WorkflowNotFound(PathBuf),
    #[error("number of threads must be at least 1")]
    ZeroThreads,
}

/// Representation of a '-O' arg value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionOverride {
    pub node: String,
    pub option: String,
    pub value: String,
}

impl std::str::FromStr for OptionOverride {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidOverride(s.to_owned());
        let (target, value) = s.split_once('=').ok_or_else(invalid)?;
        let (node, option) = target.split_once('.').ok_or_else(invalid)?;
        let (node, option) = (node.trim(), option.trim());
        if node.is_empty() || option.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            node: node.to_owned(),
            option: option.to_owned(),
            value: value.trim().to_owned(),
        })
    }
}

/// Settings are like Args, except all the logic has
/// been applied so e.g. overrides are split up.
#[derive(Debug)]
pub struct Settings {
    pub workflow: PathBuf,
    pub threads: Option<usize>,
    pub verbose: u8,
    pub show: Vec<String>,
    pub overrides: Vec<OptionOverride>,
    pub save: Option<PathBuf>,
}

impl TryFrom<Args> for Settings {
    type Error = anyhow::Error;
    fn try_from(args: Args) -> Result<Self, Self::Error> {
        if args.threads == Some(0) {
            return Err(Error::ZeroThreads.into());
        }

        let overrides = args
            .set
            .iter()
            .map(|arg| arg.parse())
            .collect::<Result<Vec<OptionOverride>, Error>>()?;

        let workflow = PathBuf::from(&args.workflow);
        if !workflow.exists() {
            return Err(Error::WorkflowNotFound(workflow).into());
        }

        Ok(Self {
            workflow,
            threads: args.threads,
            verbose: args.verbose,
            show: args.show,
            overrides,
            save: args.save.map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_override() {
        assert_eq!(
            OptionOverride {
                node: "splits".to_owned(),
                option: "which".to_owned(),
                value: "2".to_owned(),
            },
            "splits.which=2".parse().unwrap()
        );
        let o: OptionOverride = "input_taxa.exclude=A,B".parse().unwrap();
        assert_eq!(o.value, "A,B");
        assert!("splits=2".parse::<OptionOverride>().is_err());
        assert!("splits.which".parse::<OptionOverride>().is_err());
        assert!(".which=2".parse::<OptionOverride>().is_err());
    }
}
