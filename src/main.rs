use anyhow::{bail, Context};
use clap::Parser;
use huffviz::dot::{write_dot, DotOptions};
use huffviz::{BitStream, Huffman};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

#[derive(Debug, Clone, clap::Args)]
#[group(required = true, multiple = false)]
struct InputArgs {
    /// Text to encode
    text: Option<String>,

    /// Read the text from a file instead
    #[arg(short, long)]
    input: Option<PathBuf>,
}

#[derive(Debug, Clone, clap::Args)]
struct RunArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Write the tree as a Graphviz file
    #[arg(long)]
    dot: Option<PathBuf>,

    #[arg(long)]
    caption: Option<String>,

    /// Only report the round trip result
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, clap::Args)]
struct DecodeArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Bit string made of '0' and '1'
    #[arg(short, long)]
    bits: String,
}

#[derive(Debug, Clone, clap::Args)]
struct DotArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output file, stdout if omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long)]
    caption: Option<String>,
}

#[derive(Debug, Clone, clap::Subcommand)]
enum Operation {
    /// Count, build, encode, decode and print every step
    Run(RunArgs),
    Encode(InputArgs),
    Decode(DecodeArgs),
    Dot(DotArgs),
}

#[derive(Debug, clap::Parser)]
#[command(version, about = "Huffman coding with a Graphviz view of the tree")]
struct Args {
    /// Verbosity, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    debug: u8,

    #[command(subcommand)]
    op: Operation,
}

impl InputArgs {
    fn read(&self) -> anyhow::Result<String> {
        match (&self.text, &self.input) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display())),
            (None, None) => bail!("no input text given"),
        }
    }
}

fn dot_options(caption: Option<String>) -> DotOptions {
    let mut options = DotOptions::default();
    if let Some(caption) = caption {
        options.caption = caption;
    }
    options
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    let text = args.input.read()?;
    let huffman = Huffman::new(text)?;

    if !args.quiet {
        println!("=========== Frequencies ===========");
        for (symbol, count) in huffman.frequencies().iter() {
            println!("{symbol:?} occurs {count} times");
        }

        println!("=========== Codes ===========");
        for (symbol, code) in huffman.codes().iter() {
            println!("{symbol:?} has code {code}");
        }
    }

    if let Some(path) = args.dot {
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        write_dot(
            huffman.tree(),
            huffman.text(),
            &dot_options(args.caption),
            BufWriter::new(file),
        )
        .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote dot file");
    }

    let (bits, recovered) = huffman.round_trip()?;

    if !args.quiet {
        println!("=========== Original ===========");
        println!("{}", huffman.text());
        println!("=========== Encoded ===========");
        println!("{bits}");
        println!("=========== Recovered ===========");
        println!("{recovered}");
    }

    let stats = huffman.stats()?;
    println!(
        "{} bits -> {} bits ({:.1}%)",
        stats.input_bits,
        stats.encoded_bits,
        stats.ratio() * 100.0
    );

    if recovered != huffman.text() {
        bail!("round trip mismatch");
    }

    Ok(())
}

fn encode(args: InputArgs) -> anyhow::Result<()> {
    let huffman = Huffman::new(args.read()?)?;
    println!("{}", huffman.encode()?);
    Ok(())
}

fn decode(args: DecodeArgs) -> anyhow::Result<()> {
    let huffman = Huffman::new(args.input.read()?)?;
    let bits: BitStream = args.bits.trim().parse()?;
    println!("{}", huffman.decode(&bits)?);
    Ok(())
}

fn dot(args: DotArgs) -> anyhow::Result<()> {
    let huffman = Huffman::new(args.input.read()?)?;
    let options = dot_options(args.caption);

    match args.output {
        Some(path) => {
            let file =
                File::create(&path).with_context(|| format!("creating {}", path.display()))?;
            write_dot(huffman.tree(), huffman.text(), &options, BufWriter::new(file))
                .with_context(|| format!("writing {}", path.display()))?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            write_dot(huffman.tree(), huffman.text(), &options, &mut lock)?;
            lock.flush()?;
        }
    }

    Ok(())
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    // RUST_LOG wins over -d when it is set.
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(filter);

    tracing_subscriber::registry().with(fmt_layer).init();
    tracing::debug!(?level, "logging initialised");
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_logging(args.debug);

    match args.op {
        Operation::Run(args) => run(args),
        Operation::Encode(args) => encode(args),
        Operation::Decode(args) => decode(args),
        Operation::Dot(args) => dot(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_run_with_dot_file() {
        let args = Args::parse_from(["huffviz", "-dd", "run", "abracadabra", "--dot", "t.dot"]);

        assert_eq!(args.debug, 2);
        match args.op {
            Operation::Run(run) => {
                assert_eq!(run.input.text.as_deref(), Some("abracadabra"));
                assert_eq!(run.dot, Some(PathBuf::from("t.dot")));
            }
            other => panic!("unexpected operation {other:?}"),
        }
    }

    #[test]
    fn text_and_file_input_conflict() {
        let result = Args::try_parse_from(["huffviz", "encode", "abc", "-i", "in.txt"]);
        assert!(result.is_err());
    }
}
