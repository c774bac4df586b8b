use anyhow::{Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use std::path::PathBuf;
use std::process;
use symlink_creator::config::Config;
use symlink_creator::link::runner::{DirectRunner, ElevatedRunner, ScriptRunner};
use symlink_creator::link::{LinkRequest, create_symlinks, preview_script};
use symlink_creator::selection::{collect_sources, resolve_destination};

fn cli() -> Command {
    Command::new("symlink-creator")
        .about("Create symbolic links to files through an elevated script")
        .arg(
            Arg::new("target-directory")
                .short('t')
                .long("target-directory")
                .help("specify the DIRECTORY in which to create the links")
                .value_name("DIRECTORY")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("relative")
                .short('r')
                .long("relative")
                .help("point links at paths relative to the link location")
                .action(ArgAction::SetTrue)
                .conflicts_with("absolute"),
        )
        .arg(
            Arg::new("absolute")
                .short('a')
                .long("absolute")
                .help("point links at the absolute source paths")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("keep-script")
                .short('k')
                .long("keep-script")
                .help("keep the generated script after it ran")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("keep-script-on-failure")
                .long("keep-script-on-failure")
                .help("keep the generated script only when it fails")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-elevate")
                .long("no-elevate")
                .help("run the script without administrative rights")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("recursive")
                .short('R')
                .long("recursive")
                .help("link every file below source directories")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .short('n')
                .long("dry-run")
                .help("print the script instead of running it")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("print name of each linked file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("read settings from FILE instead of the user config")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("sources")
                .required(true)
                .num_args(1..)
                .value_name("SOURCE")
                .value_parser(value_parser!(PathBuf)),
        )
}

fn main() {
    let matches = cli().get_matches();
    symlink_creator::init(matches.get_flag("verbose"));

    if let Err(err) = run(&matches) {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let config = Config::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;

    let mut inputs: Vec<PathBuf> = matches
        .get_many::<PathBuf>("sources")
        .map(|v| v.cloned().collect())
        .unwrap_or_default();

    // Without -t the last operand names the directory, as with ln.
    let destination = match matches.get_one::<PathBuf>("target-directory") {
        Some(dir) => dir.clone(),
        None => match inputs.pop() {
            Some(dir) if !inputs.is_empty() => dir,
            _ => bail!("missing destination directory after source files"),
        },
    };
    let destination = resolve_destination(&destination)?;

    let sources = collect_sources(&inputs, matches.get_flag("recursive"))?;
    if sources.is_empty() {
        bail!("no source files to link");
    }

    let use_relative_path = if matches.get_flag("relative") {
        true
    } else if matches.get_flag("absolute") {
        false
    } else {
        config.defaults.use_relative_path()
    };
    let retain_script_file =
        matches.get_flag("keep-script") || config.defaults.retain_script_file();

    let request = LinkRequest::new(sources, destination)
        .relative(use_relative_path)
        .retain_script(retain_script_file);

    let mut opts = config.link_options();
    if matches.get_flag("keep-script-on-failure") {
        opts.retain_on_failure = true;
    }

    if matches.get_flag("dry-run") {
        print!("{}", preview_script(&request, &opts)?.render());
        return Ok(());
    }

    let elevate = config.script.elevate() && !matches.get_flag("no-elevate");
    let runner: Box<dyn ScriptRunner> = if elevate {
        Box::new(ElevatedRunner::new(config.script.elevation_command()))
    } else {
        Box::new(DirectRunner)
    };

    let report = create_symlinks(&request, &opts, runner.as_ref())?;

    if matches.get_flag("verbose") {
        for link in &report.links {
            println!("Created link: {} -> {}", link.name, link.target.as_str());
        }
    }
    if let Some(script) = &report.script {
        println!("Script kept at {}", script.display());
    }
    Ok(())
}
