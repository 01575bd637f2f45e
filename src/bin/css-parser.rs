use anyhow::{anyhow, bail, Result};
use cascara_css::tokenizer::{TokenType, Tokenizer};
use cascara_css::{CollectErrors, CssParser, EventRecorder, Flags, ParseError, ParserConfig};
use cascara_shared::byte_stream::{ByteStream, Location, Stream};
use simple_logger::SimpleLogger;
use std::fs;

fn main() -> Result<()> {
    let matches = clap::Command::new("Cascara CSS parser")
        .version("0.1.0")
        .arg(
            clap::Arg::new("file")
                .help("The style sheet to parse")
                .required(true)
                .index(1),
        )
        .arg(
            clap::Arg::new("debug")
                .help("Enable debug logging")
                .short('d')
                .long("debug")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("tokens")
                .help("Just print the tokens")
                .long("tokens")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("json")
                .help("Print the events as json")
                .long("json")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("flags")
                .help("Compatibility flags: ievalues, ieprio, iepriochar, starhack")
                .long("flags")
                .value_delimiter(','),
        )
        .arg(
            clap::Arg::new("quiet")
                .help("Don't display the events and only log errors")
                .long("quiet")
                .short('q')
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let debug = matches.get_flag("debug");
    let quiet = matches.get_flag("quiet");
    let json = matches.get_flag("json");
    let tokens = matches.get_flag("tokens");
    let Some(file) = matches.get_one::<String>("file") else {
        bail!("no file given");
    };

    let mut flags = Flags::empty();
    for name in matches.get_many::<String>("flags").into_iter().flatten() {
        let Some(flag) = Flags::from_flag_name(name.trim()) else {
            bail!("unknown flag '{name}'");
        };
        flags |= flag;
    }

    let level = match (debug, quiet) {
        (true, _) => log::LevelFilter::Debug,
        (false, true) => log::LevelFilter::Error,
        (false, false) => log::LevelFilter::Warn,
    };
    SimpleLogger::new().with_level(level).init()?;
    log::debug!("parsing {file} with flags {flags:?}");

    let bytes = fs::read(file)?;
    let mut stream = ByteStream::new(None);
    stream.read_from_bytes(&bytes, None);
    stream.close();

    if tokens {
        print_tokens(&mut stream);
        return Ok(());
    }

    let css = stream.get_slice(0, stream.len());

    let parser = CssParser::with_config(ParserConfig {
        flags,
        source: Some(file.clone()),
        ..Default::default()
    });

    let mut events = EventRecorder::new();
    let mut errors = CollectErrors::new();
    parser.parse_style_sheet(&mut stream, &mut events, &mut errors)?;
    log::debug!(
        "{} events, {} errors, {} warnings",
        events.events().len(),
        errors.errors.len(),
        errors.warnings.len()
    );

    if !quiet {
        if json {
            println!("{}", serde_json::to_string_pretty(&events.to_json())?);
        } else {
            events.walk_stdout();
        }
    }

    for warning in &errors.warnings {
        eprintln!("{file}:{}:{}: warning: {}", warning.line, warning.column, warning.message);
    }
    for error in &errors.errors {
        eprintln!("{file}:{}:{}: error: {}", error.line, error.column, error.message);
        display_snippet(&css, error);
    }

    if errors.has_errors() {
        return Err(anyhow!("{} error(s) in {file}", errors.errors.len()));
    }

    Ok(())
}

/// Prints the lines around an error with a marker under its column
fn display_snippet(css: &str, err: &ParseError) {
    let lines: Vec<&str> = css.split('\n').collect();
    let Some(line_nr) = err.line.checked_sub(1).filter(|n| *n < lines.len()) else {
        return;
    };
    let col_nr = err.column.saturating_sub(1);

    if col_nr > 1000 {
        eprintln!("Error is too far to the right to display.");
        return;
    }

    eprintln!();
    for n in line_nr.saturating_sub(2)..line_nr {
        eprintln!("{:<5}|{}", n + 1, lines[n]);
    }

    eprintln!("{:<5}|{}", line_nr + 1, lines[line_nr]);
    eprintln!("      {}^", " ".repeat(col_nr));

    for n in (line_nr + 1..line_nr + 3).filter(|n| *n < lines.len()) {
        eprintln!("{:<5}|{}", n + 1, lines[n]);
    }
    eprintln!();
}

fn print_tokens(stream: &mut ByteStream) {
    let mut tokenizer = Tokenizer::new(stream, Location::default());
    loop {
        let token = tokenizer.consume();
        println!("{token:?}");

        if token.token_type == TokenType::Eof {
            break;
        }
    }
}
