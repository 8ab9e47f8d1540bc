use std::path::PathBuf;

use clap::{Parser, Subcommand};
use study_core::Domain;

#[derive(Parser, Debug)]
#[command(name = "study")]
#[command(about = "Study assistant client: generate notes, problem analyses and English material")]
pub struct Cli {
    /// API root, overriding config and STUDY_BASE_URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate study material from text or a file
    Generate {
        /// notes, english or problem
        domain: Domain,
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
        /// Mark an extracted word as known (English only)
        #[arg(long = "know", value_name = "WORD")]
        known: Vec<String>,
        /// Mark an extracted word as not yet known (English only)
        #[arg(long = "dont-know", value_name = "WORD")]
        unknown: Vec<String>,
    },

    /// List saved outputs for a domain
    History { domain: Domain },

    /// Print one saved output
    Show { domain: Domain, id: u64 },

    /// Replace a saved output with the contents of a file
    Edit {
        domain: Domain,
        id: u64,
        file: PathBuf,
    },

    /// Delete a saved output
    Delete { domain: Domain, id: u64 },

    /// Download a saved output into a directory
    Download {
        domain: Domain,
        id: u64,
        out_dir: PathBuf,
    },

    /// List uploaded notes
    Notes,

    /// Print the text extracted from one uploaded note
    Note { id: u64 },

    /// Generate study notes from an uploaded note's extracted text
    EnhanceNote { id: u64 },

    /// Show learning statistics
    Progress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_requires_text_or_file() {
        assert!(Cli::try_parse_from(["study", "generate", "notes"]).is_err());
        assert!(Cli::try_parse_from([
            "study", "generate", "notes", "--text", "a", "--file", "b.txt"
        ])
        .is_err());

        let cli = Cli::try_parse_from([
            "study", "generate", "english", "--text", "essay", "--know", "diligently",
        ])
        .unwrap();
        match cli.command {
            Command::Generate {
                domain,
                text,
                known,
                ..
            } => {
                assert_eq!(domain, Domain::English);
                assert_eq!(text.as_deref(), Some("essay"));
                assert_eq!(known, vec!["diligently".to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn note_commands_take_an_id() {
        let cli = Cli::try_parse_from(["study", "enhance-note", "12"]).unwrap();
        assert!(matches!(cli.command, Command::EnhanceNote { id: 12 }));
        assert!(matches!(
            Cli::try_parse_from(["study", "notes"]).unwrap().command,
            Command::Notes
        ));
        assert!(Cli::try_parse_from(["study", "note"]).is_err());
        assert!(Cli::try_parse_from(["study", "enhance-note", "latest"]).is_err());
    }

    #[test]
    fn unknown_domain_is_rejected() {
        assert!(Cli::try_parse_from(["study", "history", "math"]).is_err());
    }
}
