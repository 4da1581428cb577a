use anyhow::{bail, Result};
use clap::{App, Arg};
use load_indicator::{output_path, parse_ratio, render_file, OutputFormat, RenderOptions};
use log::*;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");
const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");

const EXTS: [&str; 2] = [".csv", ".csv.gz"];

fn main() -> Result<()> {
    let matches = App::new(NAME)
        .version(VERSION)
        .author(AUTHOR)
        .about("Render load ratios as threshold-colored indicator circles")
        .arg(
            Arg::with_name("INPUT")
                .help("A ratio such as 1.2, or a .csv/.csv.gz file of ratios")
                .required(true)
                .allow_hyphen_values(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .help("Destination for a single value [default: indicator.<format>]"),
        )
        .arg(
            Arg::with_name("format")
                .short("f")
                .long("format")
                .takes_value(true)
                .possible_values(&["png", "webp", "svg"])
                .help("Output format, taken from the output extension if omitted"),
        )
        .arg(
            Arg::with_name("size")
                .short("s")
                .long("size")
                .takes_value(true)
                .default_value("64")
                .help("Edge length in pixels of one indicator"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .help("Silence all output"),
        )
        .arg(
            Arg::with_name("recursive")
                .short("r")
                .help("Finds .csv files in the specified folder and renders all of them"),
        )
        .get_matches();

    let verbose = matches.occurrences_of("verbose") as usize;
    let quiet = matches.is_present("quiet");
    stderrlog::new()
        .module(module_path!())
        .quiet(quiet)
        .verbosity(verbose)
        .init()?;

    let size: u32 = matches.value_of("size").unwrap_or("64").parse()?;
    if size == 0 {
        bail!("--size must be positive");
    }
    let output = matches.value_of("output").map(PathBuf::from);
    let format = match matches.value_of("format") {
        Some(f) => f.parse()?,
        None => output
            .as_ref()
            .and_then(OutputFormat::from_path)
            .unwrap_or(OutputFormat::Png),
    };
    let options = RenderOptions { size, format };
    let input = matches.value_of("INPUT").unwrap_or_default();

    if matches.is_present("recursive") {
        let paths: Vec<PathBuf> = WalkDir::new(input)
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .filter(|entry| {
                let name = entry.file_name().to_string_lossy();
                EXTS.iter().any(|ext| name.ends_with(ext))
            })
            .map(|entry| entry.into_path())
            .collect();
        info!("Found {} files", paths.len());
        paths
            .par_iter()
            .map(|path| render_file(path, &options))
            .collect::<Result<Vec<_>>>()?;
    } else if Path::new(input).is_file() {
        render_file(input, &options)?;
    } else {
        let value = parse_ratio(input)?;
        let dest = output.unwrap_or_else(|| output_path("indicator", format));
        let color = load_indicator::render_value_to(value, &options, &dest)?;
        println!("{}", color);
    }
    Ok(())
}
