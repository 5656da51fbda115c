use clap::{Parser, Subcommand};
use protocol::{split_quoted, CommandDecoder};
use relay::{OutputFormat, RelayConfig, WriterSink};
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "relay")]
#[command(about = "Decode time-series protocol lines into typed commands")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode protocol lines and print one command per line
    Decode {
        /// File to read lines from (defaults to stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output format, overriding the config file
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show how a line is split into tokens
    Tokenize {
        /// The line to split
        line: String,
        /// Keep quote characters in the tokens
        #[arg(long)]
        keep_quotes: bool,
        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Decode {
            input,
            format,
            config,
        } => {
            let mut config = RelayConfig::load_or_default(config.as_deref())?;
            if let Some(format) = format {
                config = config.with_format(format);
            }
            decode_lines(&config, input).await?;
        }
        Commands::Tokenize {
            line,
            keep_quotes,
            config,
        } => {
            let config = RelayConfig::load_or_default(config.as_deref())?;
            tokenize_line(&config, &line, keep_quotes);
        }
    }

    Ok(())
}

async fn decode_lines(
    config: &RelayConfig,
    input: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let decoder = CommandDecoder::new(config.decoder.clone())?;

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &input {
        Some(path) => {
            info!("Reading lines from {}", path.display());
            Box::new(BufReader::new(tokio::fs::File::open(path).await?))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let mut sink = WriterSink::new(tokio::io::stdout(), config.output.format);
    let stats = relay::run(&decoder, reader, &mut sink).await?;

    if stats.pass_through > 0 {
        info!(
            "{} of {} lines were passed through undecoded",
            stats.pass_through,
            stats.lines - stats.skipped
        );
    }

    Ok(())
}

fn tokenize_line(config: &RelayConfig, line: &str, keep_quotes: bool) {
    let tokens = split_quoted(
        line,
        config.decoder.delimiter,
        keep_quotes,
        config.decoder.preserve_blank,
    );

    if tokens.is_empty() {
        println!("No tokens.");
        return;
    }

    for (index, token) in tokens.iter().enumerate() {
        println!("{:>3}: {}", index, token);
    }
}
