use crate::Scenario;
use clap::Args;
use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write, stdin, stdout},
    path::PathBuf,
    str::FromStr,
};

/// Where a subcommand reads its scenario from and writes its artifact to
#[derive(Args, Debug)]
pub struct IOArgs {
    /// The scenario JSON file ("-" implies stdin)
    #[arg(value_parser = clap::value_parser!(PathOrStd))]
    input: PathOrStd,

    /// The output file ("-" implies stdout)
    #[arg(short, long, default_value = "-", value_parser = clap::value_parser!(PathOrStd))]
    output: PathOrStd,
}

impl IOArgs {
    /// Parse the scenario from the input
    pub fn scenario(&self) -> anyhow::Result<Scenario> {
        let reader: Box<dyn Read> = match &self.input {
            PathOrStd::Path(path) => Box::new(BufReader::new(File::open(path)?)),
            PathOrStd::Std => Box::new(stdin().lock()),
        };
        Ok(serde_json::from_reader(reader)?)
    }

    /// Open the output for writing
    pub fn output(&self) -> anyhow::Result<Box<dyn Write>> {
        match &self.output {
            PathOrStd::Path(path) => Ok(Box::new(BufWriter::new(File::create(path)?))),
            PathOrStd::Std => Ok(Box::new(stdout().lock())),
        }
    }

    /// The output file's extension, if it has one
    pub fn extension(&self) -> Option<&str> {
        match &self.output {
            PathOrStd::Path(path) => path.extension().and_then(|ext| ext.to_str()),
            PathOrStd::Std => None,
        }
    }
}

/// A file path, or "-" for the matching standard stream
#[derive(Clone, Debug, PartialEq)]
pub enum PathOrStd {
    /// A file on disk
    Path(PathBuf),
    /// stdin or stdout
    Std,
}

impl FromStr for PathOrStd {
    type Err = <PathBuf as FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(Self::Std)
        } else {
            Ok(Self::Path(s.parse()?))
        }
    }
}
