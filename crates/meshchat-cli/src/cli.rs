//! Command-line interface definitions and parsing

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "meshchat", author, version, about = "Interactive custom-channel chat over a serial mesh radio", long_about = None)]
pub struct Cli {
    /// Serial port of the mesh device (e.g. /dev/ttyUSB0 or COM4)
    pub port: String,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_port_argument() {
        let cli = Cli::try_parse_from(["meshchat", "/dev/ttyUSB0"]).unwrap();
        assert_eq!(cli.port, "/dev/ttyUSB0");
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
    }

    #[test]
    fn missing_port_is_an_error() {
        assert!(Cli::try_parse_from(["meshchat"]).is_err());
    }

    #[test]
    fn parses_flags() {
        let cli =
            Cli::try_parse_from(["meshchat", "COM4", "--verbose", "--config", "chat.toml"])
                .unwrap();
        assert_eq!(cli.port, "COM4");
        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some("chat.toml"));
    }
}
