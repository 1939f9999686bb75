use crate::Scenario;
use clap::ValueEnum;
use dre_solver::{ExchangeGraph, export::export_mps};
use std::{io::Write, str::FromStr};

/// The program formats the `export` subcommand can write
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ExportFormat {
    /// Fixed-column MPS, with integer markers for all-or-nothing arcs
    Mps,
}

impl ExportFormat {
    /// Build the scenario's exchange graph and write its program
    pub fn export<W: Write>(&self, scenario: Scenario, buffer: &mut W) -> anyhow::Result<()> {
        let (context, _rejections) = scenario.into_context();
        let graph = ExchangeGraph::build(&context);
        match self {
            Self::Mps => export_mps(&graph, buffer)?,
        };
        Ok(())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mps" | "MPS" => Ok(Self::Mps),
            _ => Err(Self::Err::ExportExtension(s.to_owned())),
        }
    }
}

/// An output name that does not imply a format
#[derive(thiserror::Error, Debug)]
pub enum ExportFormatError {
    /// The extension is not a known format
    #[error("Unknown export format: {0}")]
    ExportExtension(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_mps() {
        let scenario = serde_json::from_str(
            r#"{
                "requests": [{ "participant": 1, "commodity": "fuel",
                               "members": [{ "quantity": 4, "exclusive": true }] }],
                "bids": [{ "participant": 2, "commodity": "fuel",
                           "members": [{ "quantity": 10 }] }]
            }"#,
        )
        .unwrap();

        let mut buffer = Vec::new();
        ExportFormat::Mps.export(scenario, &mut buffer).unwrap();
        let mps = String::from_utf8(buffer).unwrap();

        assert!(mps.starts_with("NAME dre_exchange\n"));
        assert!(mps.contains("'INTORG'"));
        assert!(mps.contains(" BV BND    y_0"));
    }

    #[test]
    fn infers_from_extension() {
        assert!(matches!("mps".parse(), Ok(ExportFormat::Mps)));
        assert!("lp".parse::<ExportFormat>().is_err());
    }
}
