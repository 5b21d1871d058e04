//! Batch training run: fit on a stratified train split and report MAE/R².

use std::path::PathBuf;

use homeval::config::{self, AppConfig};
use homeval::logging;
use homeval::pipeline::{BatchReport, run_batch};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let Some(options) = parse_args(std::env::args().skip(1).collect())? else {
        println!("{}", help_text());
        return Ok(());
    };
    let config = options.resolve_config()?;
    if let Err(err) = logging::init(&config.logging) {
        eprintln!("Logging disabled: {err}");
    }

    let report = run_batch(&config, options.data.as_deref()).map_err(|err| err.to_string())?;
    if let Some(path) = &options.report {
        write_report(path, &report)?;
        println!("\nReport written to {}", path.display());
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq)]
struct CliOptions {
    config: Option<PathBuf>,
    data: Option<PathBuf>,
    target: Option<String>,
    stratify: Option<String>,
    test_fraction: Option<f64>,
    seed: Option<u64>,
    report: Option<PathBuf>,
}

impl CliOptions {
    /// Config file (explicit or app root) with command-line overrides applied.
    fn resolve_config(&self) -> Result<AppConfig, String> {
        let mut config = match &self.config {
            Some(path) => config::load_from(path),
            None => config::load_or_default(),
        }
        .map_err(|err| err.to_string())?;
        self.apply(&mut config)?;
        Ok(config)
    }

    fn apply(&self, config: &mut AppConfig) -> Result<(), String> {
        if let Some(target) = &self.target {
            config.data.target_column = target.clone();
        }
        if let Some(column) = &self.stratify {
            config.split.stratify_column = column.clone();
        }
        if let Some(fraction) = self.test_fraction {
            if !(fraction > 0.0 && fraction < 1.0) {
                return Err(format!("--test-fraction must be between 0 and 1, got {fraction}"));
            }
            config.split.test_fraction = fraction;
        }
        if let Some(seed) = self.seed {
            config.split.seed = seed;
        }
        Ok(())
    }
}

fn parse_args(args: Vec<String>) -> Result<Option<CliOptions>, String> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        let flag = args[idx].as_str();
        match flag {
            "-h" | "--help" => return Ok(None),
            "--config" | "--data" | "--target" | "--stratify" | "--test-fraction" | "--seed"
            | "--report" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| format!("{flag} requires a value"))?;
                match flag {
                    "--config" => options.config = Some(PathBuf::from(value)),
                    "--data" => options.data = Some(PathBuf::from(value)),
                    "--target" => options.target = Some(value.clone()),
                    "--stratify" => options.stratify = Some(value.clone()),
                    "--report" => options.report = Some(PathBuf::from(value)),
                    "--test-fraction" => {
                        options.test_fraction = Some(
                            value
                                .parse::<f64>()
                                .map_err(|_| format!("Invalid --test-fraction value: {value}"))?,
                        );
                    }
                    _ => {
                        options.seed = Some(
                            value
                                .parse::<u64>()
                                .map_err(|_| format!("Invalid --seed value: {value}"))?,
                        );
                    }
                }
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(Some(options))
}

fn write_report(path: &PathBuf, report: &BatchReport) -> Result<(), String> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|err| format!("Failed to serialize report: {err}"))?;
    std::fs::write(path, json).map_err(|err| format!("Failed to write {}: {err}", path.display()))
}

fn help_text() -> String {
    [
        "homeval-train",
        "",
        "Fit the price model on a stratified train split and print MAE/R² for both splits.",
        "",
        "Usage:",
        "  homeval-train [--data <csv>] [--config <toml>] [--target <col>]",
        "                [--stratify <col>] [--test-fraction <f>] [--seed <n>]",
        "                [--report <json>]",
        "",
        "Defaults come from config.toml in the app folder, then built-ins:",
        "  data/raw/final.csv, target 'price', stratify 'property_type_Bunglow',",
        "  test fraction 0.2, seed 42.",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_all_flags() {
        let options = parse_args(args(&[
            "--data",
            "x.csv",
            "--target",
            "rent",
            "--stratify",
            "city",
            "--test-fraction",
            "0.3",
            "--seed",
            "7",
            "--report",
            "out.json",
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(options.data, Some(PathBuf::from("x.csv")));
        assert_eq!(options.target.as_deref(), Some("rent"));
        assert_eq!(options.stratify.as_deref(), Some("city"));
        assert_eq!(options.test_fraction, Some(0.3));
        assert_eq!(options.seed, Some(7));
        assert_eq!(options.report, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn overrides_apply_on_top_of_config() {
        let options = parse_args(args(&["--stratify", "city", "--seed", "9"]))
            .unwrap()
            .unwrap();
        let mut config = AppConfig::default();
        options.apply(&mut config).unwrap();
        assert_eq!(config.split.stratify_column, "city");
        assert_eq!(config.split.seed, 9);
        assert_eq!(config.split.test_fraction, 0.2);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse_args(args(&["--seed", "abc"])).is_err());
        assert!(parse_args(args(&["--data"])).is_err());
        let options = parse_args(args(&["--test-fraction", "1.0"])).unwrap().unwrap();
        assert!(options.apply(&mut AppConfig::default()).is_err());
    }

    #[test]
    fn help_is_not_an_error() {
        assert_eq!(parse_args(args(&["--help"])), Ok(None));
        assert_eq!(parse_args(args(&["--seed", "3", "-h"])), Ok(None));
    }
}
