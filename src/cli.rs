// isopack/src/cli.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use dialoguer::{Input, theme::ColorfulTheme};
use indicatif::{ProgressBar, ProgressStyle};

use isopack::{
    InterchangeLevel, NameCasing, PackOptions, Progress, default_image_name,
    ensure_iso_extension, pack_directory,
};

/// Pack a directory tree into a plain ISO 9660 disc image.
///
/// Every parameter can be given as a flag; whatever is missing is asked
/// for interactively.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// Directory to pack.
    pub source: Option<PathBuf>,

    /// Name of the image; `.iso` is appended when missing.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Directory the image is written into, created if needed.
    #[arg(short = 'd', long)]
    pub output_dir: Option<PathBuf>,

    /// Volume label, stored upper-cased and truncated to 32 characters.
    /// Pass an empty string to skip the prompt and leave the volume
    /// unlabeled.
    #[arg(short, long)]
    pub label: Option<String>,

    /// ISO 9660 interchange level. Levels 1 through 3 enforce the strict
    /// character set and nesting limits; level 4 relaxes them.
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(1..=4))]
    pub level: u8,

    /// Keep source names as they are instead of upper-casing them.
    #[arg(long)]
    pub preserve_case: bool,
}

pub fn run(args: Args) -> Result<()> {
    let theme = ColorfulTheme::default();

    let source = match args.source {
        Some(path) if path.is_dir() => path,
        Some(path) => bail!("'{}' is not a directory", path.display()),
        None => prompt_source(&theme)?,
    };

    let name = match args.output {
        Some(name) => name,
        None => prompt_output_name(&theme, &source)?,
    };
    let name = name.trim();
    let name = if name.is_empty() {
        default_image_name(&source)
    } else {
        ensure_iso_extension(name)
    };

    let dir = match args.output_dir {
        Some(dir) => dir,
        None => prompt_output_dir(&theme)?,
    };
    if !dir.is_dir() {
        println!("Directory '{}' does not exist. Creating it.", dir.display());
        fs::create_dir_all(&dir)
            .with_context(|| format!("cannot create directory '{}'", dir.display()))?;
    }

    let label = match args.label {
        Some(label) => label,
        None => prompt_label(&theme)?,
    };
    let label = label.trim().to_string();

    let options = PackOptions {
        volume_label: (!label.is_empty()).then_some(label),
        level: InterchangeLevel::from_number(args.level).unwrap_or_default(),
        casing: if args.preserve_case {
            NameCasing::Preserve
        } else {
            NameCasing::Uppercase
        },
    };

    let output = dir.join(&name);
    let mut progress = ConsoleProgress::default();
    let summary = pack_directory(&source, &output, &options, &mut progress)?;

    if summary.volume_id.is_empty() {
        println!(
            "ISO image created successfully at '{}'",
            summary.output.display()
        );
    } else {
        println!(
            "ISO image created successfully at '{}' with label '{}'",
            summary.output.display(),
            summary.volume_id
        );
    }
    Ok(())
}

/// Asks for the source folder until an existing directory is given.
fn prompt_source(theme: &ColorfulTheme) -> Result<PathBuf> {
    let path: String = Input::with_theme(theme)
        .with_prompt("Folder to pack")
        .validate_with(|input: &String| -> Result<(), String> {
            let trimmed = input.trim();
            if Path::new(trimmed).is_dir() {
                Ok(())
            } else {
                Err(format!("'{trimmed}' is not a directory"))
            }
        })
        .interact_text()?;
    Ok(PathBuf::from(path.trim()))
}

fn prompt_output_name(theme: &ColorfulTheme, source: &Path) -> Result<String> {
    let name: String = Input::with_theme(theme)
        .with_prompt("Image name")
        .default(default_image_name(source))
        .interact_text()?;
    Ok(name)
}

fn prompt_output_dir(theme: &ColorfulTheme) -> Result<PathBuf> {
    let dir: String = Input::with_theme(theme)
        .with_prompt("Save the image in")
        .default(".".to_string())
        .interact_text()?;
    Ok(PathBuf::from(dir.trim()))
}

fn prompt_label(theme: &ColorfulTheme) -> Result<String> {
    let label: String = Input::with_theme(theme)
        .with_prompt("Volume label (optional)")
        .allow_empty(true)
        .interact_text()?;
    Ok(label)
}

/// Renders pack progress on the terminal: a determinate bar while entries
/// are added, then a spinner for the write phase.
#[derive(Default)]
struct ConsoleProgress {
    bar: Option<ProgressBar>,
    spinner: Option<ProgressBar>,
}

impl Progress for ConsoleProgress {
    fn begin_populate(&mut self, total_files: u64) {
        println!("Total files to add: {total_files}");
        let bar = ProgressBar::new(total_files);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} files")
                .expect("static progress template")
                .progress_chars("#>-"),
        );
        self.bar = Some(bar);
    }

    fn file_added(&mut self, _destination: &str) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn begin_write(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{msg}{spinner}")
                .expect("static spinner template")
                .tick_strings(&["|", "/", "-", "\\", ""]),
        );
        spinner.set_message("Writing ISO file... ");
        spinner.enable_steady_tick(Duration::from_millis(500));
        self.spinner = Some(spinner);
    }

    fn finish_write(&mut self) {
        // Stops the tick thread; the outcome line is printed by the
        // caller once the image is renamed into place.
        if let Some(spinner) = self.spinner.take() {
            spinner.finish();
        }
    }
}
