use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pulse", version, about = "Media indexing bridge and push notification client")]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON).
    #[arg(short, long, global = true, env = "PULSE_CONFIG")]
    pub config: Option<PathBuf>,
    /// Increase log verbosity (repeatable). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Ask the operating system to index a media file.
    Scan {
        path: String,
    },
    /// Send an arbitrary command through the bridge.
    Dispatch {
        name: String,
        /// Arguments as a JSON object.
        #[arg(long, default_value = "{}")]
        args: String,
    },
    /// Send a push notification (dry run: the request is logged, not sent).
    #[command(group(ArgGroup::new("recipient").required(true).args(["token", "topic"])))]
    Push {
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        topic: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
        /// Data payload entry, `key=value` (repeatable).
        #[arg(long = "data", value_parser = parse_key_val)]
        data: Vec<(String, String)>,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected `key=value`, got `{s}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case("post_id=42", Ok(("post_id".to_string(), "42".to_string())))]
    #[case("url=https://x.test/?a=b", Ok(("url".to_string(), "https://x.test/?a=b".to_string())))]
    #[case("empty=", Ok(("empty".to_string(), String::new())))]
    #[case("=value", Err("expected `key=value`, got `=value`".to_string()))]
    #[case("novalue", Err("expected `key=value`, got `novalue`".to_string()))]
    fn test_parse_key_val(#[case] input: &str, #[case] expected: Result<(String, String), String>) {
        assert_eq!(parse_key_val(input), expected);
    }

    #[test]
    fn test_push_requires_recipient() {
        assert!(Cli::try_parse_from(["pulse", "push", "--title", "t"]).is_err());
        assert!(Cli::try_parse_from(["pulse", "push", "--token", "a", "--topic", "b"]).is_err());
        let cli = Cli::try_parse_from(["pulse", "push", "--topic", "news", "--data", "k=v"]).unwrap();
        let Commands::Push { topic, data, .. } = cli.command else {
            panic!("expected push command");
        };
        assert_eq!(topic.as_deref(), Some("news"));
        assert_eq!(data, vec![("k".to_string(), "v".to_string())]);
    }
}
