use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use dialoguer::Confirm;
use indoc::indoc;
use log::{Level, info};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::exit;

use xml_to_json::{ConverterSettings, XmlToJson};

struct Xml2Json {
    settings: ConverterSettings,
    /// `None` reads from stdin.
    input: Option<PathBuf>,
    output_path: Option<PathBuf>,
    confirm_overwrite: bool,
    debug_tree: bool,
    verbosity_level: Option<Level>,
}

impl Xml2Json {
    pub fn from_cli_matches(matches: &ArgMatches) -> Self {
        let input = matches
            .get_one::<String>("INPUT")
            .filter(|s| s.as_str() != "-")
            .map(PathBuf::from);

        let indent = *matches
            .get_one::<i32>("indent")
            .expect("has a default value");

        let verbosity_level = match matches.get_count("verbose") {
            0 => None,
            1 => Some(Level::Info),
            2 => Some(Level::Debug),
            3 => Some(Level::Trace),
            _ => {
                eprintln!("using more than  -vvv does not affect verbosity level");
                Some(Level::Trace)
            }
        };

        Xml2Json {
            settings: ConverterSettings::from_indent(indent),
            input,
            output_path: matches.get_one::<String>("output-target").map(PathBuf::from),
            confirm_overwrite: !matches.get_flag("no-confirm-overwrite"),
            debug_tree: matches.get_flag("debug-tree"),
            verbosity_level,
        }
    }

    /// Main entry point for `Xml2Json`
    pub fn run(&self) -> Result<()> {
        self.try_to_initialize_logging();

        let bytes = self.read_input()?;
        let xml = std::str::from_utf8(&bytes).context("Input is not valid UTF-8")?;

        let converter = XmlToJson::new().with_configuration(self.settings);
        let doc = converter.parse(xml).context("Failed to analyze document")?;

        if self.debug_tree {
            let stderr = io::stderr();
            doc.write_debug_tree(&mut stderr.lock())
                .context("Failed to write tree dump")?;
        }

        let json = converter.render(&doc).context("Failed to render JSON")?;

        let mut output: Box<dyn Write> = match &self.output_path {
            Some(path) => {
                let file = Self::create_output_file(path, self.confirm_overwrite).with_context(
                    || format!("An error occurred while creating output file at `{}`", path.display()),
                )?;
                Box::new(io::BufWriter::new(file))
            }
            None => Box::new(io::stdout().lock()),
        };

        writeln!(output, "{}", json).context("Failed to write output")?;
        output.flush().context("Failed to flush output")?;

        info!("wrote {} bytes of JSON", json.len());
        Ok(())
    }

    fn read_input(&self) -> Result<Vec<u8>> {
        match &self.input {
            Some(path) => fs::read(path)
                .with_context(|| format!("Failed to open file {}", path.display())),
            None => {
                let mut buf = Vec::new();
                io::stdin()
                    .lock()
                    .read_to_end(&mut buf)
                    .context("Failed to read from stdin")?;
                Ok(buf)
            }
        }
    }

    /// If `prompt` is passed, will display a confirmation prompt before overwriting files.
    fn create_output_file(path: impl AsRef<Path>, prompt: bool) -> Result<File> {
        let p = path.as_ref();

        if p.is_dir() {
            bail!(
                "There is a directory at {}, refusing to overwrite",
                p.display()
            );
        }

        if p.exists() {
            if prompt {
                let confirmed = Confirm::new()
                    .with_prompt(format!(
                        "Are you sure you want to override output file at {}",
                        p.display()
                    ))
                    .default(false)
                    .interact()
                    .context("Failed to write confirmation prompt to term")?;

                if !confirmed {
                    bail!("Cancelled");
                }
            }
            return Ok(File::create(p)?);
        }

        // Ok to assume p is not an existing directory
        match p.parent() {
            Some(parent) => {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    fs::create_dir_all(parent)?;
                }
                Ok(File::create(p)?)
            }
            None => bail!("Output file cannot be root."),
        }
    }

    fn try_to_initialize_logging(&self) {
        if let Some(level) = self.verbosity_level {
            if let Err(e) = TermLogger::init(
                level.to_level_filter(),
                Config::default(),
                TerminalMode::Stderr,
                ColorChoice::Auto,
            ) {
                eprintln!("Failed to initialize logging: {}", e);
            }
        }
    }
}

fn command() -> Command {
    Command::new("xml2json")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Utility to convert XML documents to JSON")
        .long_about(indoc!(r#"
            Utility to convert XML documents to JSON.

            Elements become object members, attributes become `@name` members and text becomes
            a string, or a `#text` member when the element also has attributes or children.
            Repeated sibling elements are grouped into arrays.
        "#))
        .arg(
            Arg::new("INPUT")
                .help("XML file to convert, `-` or omitted to read from stdin."),
        )
        .arg(
            Arg::new("indent")
                .short('i')
                .long("indent")
                .value_name("N")
                .value_parser(clap::value_parser!(i32))
                .allow_negative_numbers(true)
                .default_value("-1")
                .help("Spaces per nesting level, negative for compact output."),
        )
        .arg(
            Arg::new("output-target")
                .short('f')
                .long("output")
                .value_name("PATH")
                .help("Writes output to the file specified instead of stdout, errors will still be printed to stderr.")
                .long_help(indoc!("
                    Writes output to the file specified instead of stdout, errors will still be printed to stderr.
                    Will ask for confirmation before overwriting files, to allow overwriting, pass `--no-confirm-overwrite`.
                    Will create parent directories if needed.
                ")),
        )
        .arg(
            Arg::new("no-confirm-overwrite")
                .long("no-confirm-overwrite")
                .action(ArgAction::SetTrue)
                .help("When set, will not ask for confirmation before overwriting files, useful for automation"),
        )
        .arg(
            Arg::new("debug-tree")
                .long("debug-tree")
                .action(ArgAction::SetTrue)
                .help("Prints the analyzed element tree to stderr."),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help(indoc!("
                    -v - info, -vv - debug, -vvv - trace.
                    trace output is only available in debug builds, as it is extremely verbose
                ")),
        )
}

fn main() {
    let matches = command().get_matches();

    let app = Xml2Json::from_cli_matches(&matches);
    if let Err(e) = app.run() {
        eprintln!("{:?}", e);
        exit(1);
    }
}
