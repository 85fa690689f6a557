// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use permia_app::{AppState, TableSet};
use runtime::{ConsoleRuntime, DataSource};
use std::env;
use std::path::PathBuf;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `permia --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let source = DataSource::resolve(&config, options.data_path.as_deref(), options.demo_rows);
    let dataset = source.load()?;
    if options.check_only {
        println!(
            "ok: {} rows from {}",
            runtime::total_rows(&dataset),
            source.describe()
        );
        return Ok(());
    }

    let log_path = logging::init_logging(&config)?;
    info!(
        source = %source.describe(),
        rows = runtime::total_rows(&dataset),
        log = ?log_path,
        "starting console"
    );

    let mut tables = TableSet::new(dataset, config.table_options());
    let mut state = AppState {
        active_tab: config.start_tab(),
        ..AppState::default()
    };
    let mut runtime = ConsoleRuntime::new(source);
    permia_tui::run_app(&mut state, &mut tables, &mut runtime)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    data_path: Option<PathBuf>,
    demo_rows: Option<usize>,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        data_path: None,
        demo_rows: None,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--data" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--data requires a JSON file path"))?;
                options.data_path = Some(PathBuf::from(value.as_ref()));
            }
            "--demo-rows" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--demo-rows requires a row count"))?;
                let rows = value.as_ref().parse::<usize>().with_context(|| {
                    format!("--demo-rows expects a positive integer, got {:?}", value.as_ref())
                })?;
                if rows == 0 {
                    return Err(anyhow!("--demo-rows expects a positive integer, got 0"));
                }
                options.demo_rows = Some(rows);
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    if options.data_path.is_some() && options.demo_rows.is_some() {
        return Err(anyhow!(
            "--data and --demo-rows pick different sources; pass only one"
        ));
    }

    Ok(options)
}

fn print_help() {
    println!("permia admin console");
    println!("  --config <path>          Use a specific config path");
    println!("  --data <path>            Load tables from a JSON dataset");
    println!("  --demo-rows <n>          Generate n rows per table");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config and data, then exit");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args};
    use anyhow::Result;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/permia-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                data_path: None,
                demo_rows: None,
                print_config_path: false,
                print_example: false,
                check_only: false,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_and_data_paths() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml", "--data", "/srv/rows.json"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        assert_eq!(options.data_path, Some(PathBuf::from("/srv/rows.json")));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));

        let error = parse_cli_args(vec!["--data"], default_options_path())
            .expect_err("missing data value should fail");
        assert!(error.to_string().contains("--data requires"));
    }

    #[test]
    fn parse_cli_args_validates_demo_rows() -> Result<()> {
        let options = parse_cli_args(vec!["--demo-rows", "2000"], default_options_path())?;
        assert_eq!(options.demo_rows, Some(2000));

        for bad in ["0", "lots", "-3"] {
            let error = parse_cli_args(vec!["--demo-rows", bad], default_options_path())
                .expect_err("bad row count should fail");
            assert!(
                error.to_string().contains("positive integer"),
                "{bad}: {error}"
            );
        }
        Ok(())
    }

    #[test]
    fn parse_cli_args_rejects_two_sources() {
        let error = parse_cli_args(
            vec!["--data", "/srv/rows.json", "--demo-rows", "5"],
            default_options_path(),
        )
        .expect_err("two sources should fail");
        assert!(error.to_string().contains("pass only one"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }
}
