use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use render_lessons::{run, Lesson, LessonAssets, LessonConfig, WindowInitError};

const USAGE: &str = "Usage: render-lessons <lesson> [--assets DIR] [--mesh FILE] [--texture FILE] \
[--config FILE] [--width N] [--height N] [--summary-only]\n       render-lessons --list";

fn main() {
    env_logger::init();
    if let Err(err) = run_cli() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let options = match CliOptions::parse(env::args().skip(1))? {
        Command::List => {
            print_lessons();
            return Ok(());
        }
        Command::Run(options) => options,
    };
    let config = options.config()?;

    if options.summary_only {
        return run_headless(&config);
    }
    match run(config.clone()) {
        Ok(()) => Ok(()),
        Err(err) => {
            if err.downcast_ref::<WindowInitError>().is_some() {
                eprintln!(
                    "{err}. Falling back to --summary-only mode (set DISPLAY or install X11/Wayland libs to enable rendering)."
                );
                run_headless(&config)
            } else {
                Err(err)
            }
        }
    }
}

fn print_lessons() {
    for lesson in Lesson::ALL {
        println!("{}. {:<9} {}", lesson.number(), lesson.name(), lesson.title());
    }
}

/// Loads everything the lesson needs without opening a window and reports it.
fn run_headless(config: &LessonConfig) -> Result<()> {
    let assets = LessonAssets::load(config)?;
    for line in assets.summary() {
        println!("{line}");
    }
    Ok(())
}

enum Command {
    List,
    Run(CliOptions),
}

#[derive(Default)]
struct CliOptions {
    lesson: Option<Lesson>,
    config: Option<PathBuf>,
    assets: Option<PathBuf>,
    mesh: Option<PathBuf>,
    texture: Option<PathBuf>,
    width: Option<u32>,
    height: Option<u32>,
    summary_only: bool,
}

impl CliOptions {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Command> {
        let mut options = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .ok_or_else(|| anyhow!("{flag} expects a value\n{USAGE}"))
            };
            match arg.as_str() {
                "--list" => return Ok(Command::List),
                "--summary-only" => options.summary_only = true,
                "--config" => options.config = Some(value("--config")?.into()),
                "--assets" => options.assets = Some(value("--assets")?.into()),
                "--mesh" => options.mesh = Some(value("--mesh")?.into()),
                "--texture" => options.texture = Some(value("--texture")?.into()),
                "--width" => options.width = Some(parse_size("--width", &value("--width")?)?),
                "--height" => options.height = Some(parse_size("--height", &value("--height")?)?),
                other if other.starts_with("--") => {
                    return Err(anyhow!("Unknown argument: {other}\n{USAGE}"));
                }
                name => {
                    if options.lesson.is_some() {
                        return Err(anyhow!("Only one lesson can be run at a time\n{USAGE}"));
                    }
                    let lesson = Lesson::from_name(name).ok_or_else(|| {
                        anyhow!("Unknown lesson: {name}. Run with --list to see all lessons")
                    })?;
                    options.lesson = Some(lesson);
                }
            }
        }
        if options.lesson.is_none() {
            return Err(anyhow!(USAGE));
        }
        Ok(Command::Run(options))
    }

    /// Defaults, then the config file, then command line flags.
    fn config(&self) -> Result<LessonConfig> {
        let lesson = self.lesson.unwrap_or(Lesson::Clear);
        let mut config = match &self.config {
            Some(path) => LessonConfig::load(path, lesson)?,
            None => LessonConfig::for_lesson(lesson),
        };
        if let Some(assets) = &self.assets {
            config.assets = assets.clone();
        }
        if let Some(mesh) = &self.mesh {
            config.mesh = Some(mesh.clone());
        }
        if let Some(texture) = &self.texture {
            config.texture = Some(texture.clone());
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        Ok(config)
    }
}

fn parse_size(flag: &str, value: &str) -> Result<u32> {
    let size = value
        .parse::<u32>()
        .with_context(|| format!("{flag} expects a positive integer, got `{value}`"))?;
    if size == 0 {
        return Err(anyhow!("{flag} must be greater than zero"));
    }
    Ok(size)
}
