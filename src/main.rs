use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "caption-frame",
    version,
    about = "Write text on an image at the largest size that fits"
)]
struct Cli {
    /// Image to write on
    #[arg(short = 'i', long = "image")]
    image: Option<PathBuf>,

    /// Text to write (read from stdin when omitted)
    #[arg(short = 't', long = "text")]
    text: Option<String>,

    /// Font file to use; repeat to give fallbacks, tried in order
    #[arg(short = 'f', long = "font")]
    fonts: Vec<PathBuf>,

    /// System font family to try after the font files
    #[arg(short = 'F', long = "font-family")]
    font_family: Option<String>,

    /// Output path (default: <input>-framed.<ext>)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Minimum padding: pixels (12, 12px) or percent (10.0, 10%)
    #[arg(short = 'p', long = "padding")]
    padding: Option<String>,

    /// Wrap lines longer than this many characters
    #[arg(long = "max-line-length")]
    max_line_length: Option<usize>,

    /// Downscale images whose shortest side exceeds this
    #[arg(long = "max-shortest-side")]
    max_shortest_side: Option<u32>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Print a JSON report instead of the output path
    #[arg(long = "report")]
    report: bool,

    /// Print the effective settings and exit
    #[arg(long = "show-settings")]
    show_settings: bool,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    caption_frame::logging::init(cli.verbose)?;

    let input = if cli.show_settings {
        None
    } else if let Some(text) = cli.text {
        Some(text)
    } else if io::stdin().is_terminal() {
        return Err(anyhow!("no text given; pass --text or pipe it on stdin"));
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|err| anyhow!("stdin must be UTF-8 text ({})", err))?;
        Some(buffer)
    };

    let output = caption_frame::run(
        caption_frame::Config {
            image: cli.image,
            output: cli.output,
            fonts: cli.fonts,
            font_family: cli.font_family,
            padding: cli.padding,
            max_line_length: cli.max_line_length,
            max_shortest_side: cli.max_shortest_side,
            settings_path: cli.read_settings,
            report: cli.report,
            show_settings: cli.show_settings,
        },
        input,
    )?;

    println!("{}", output);
    Ok(())
}
