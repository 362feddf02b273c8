use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// YAML config file. Defaults apply when omitted.
    #[clap(short, long, global = true, env = "FONT_EXPOSURE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the HTTP service.
    Serve {
        /// Overrides `port` from config and `PORT`
        #[clap(short, long)]
        port: Option<u16>,
    },

    /// Analyze a font page and print the report as JSON.
    Analyze {
        /// Page url, https is assumed when the scheme is missing
        url: String,
    },

    /// Look up mentions and social reach of a font name.
    Search {
        /// Font name, e.g. "Heebo"
        font_name: String,
    },

    /// Analyze a local TTF or OTF file.
    InspectFont {
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let args = Args::parse_from(["font-exposure", "serve", "--port", "8080"]);
        assert!(matches!(args.command, Command::Serve { port: Some(8080) }));

        let args = Args::parse_from([
            "font-exposure",
            "analyze",
            "fonts.google.com/specimen/Roboto",
            "--config",
            "config.yaml",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("config.yaml")));
        assert!(
            matches!(args.command, Command::Analyze { url } if url == "fonts.google.com/specimen/Roboto")
        );

        let args = Args::parse_from(["font-exposure", "inspect-font", "Heebo.ttf"]);
        assert!(matches!(args.command, Command::InspectFont { .. }));
    }
}
