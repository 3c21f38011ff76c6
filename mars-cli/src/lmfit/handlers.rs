use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;
use serde::Deserialize;

use mars_lm::models::{ExponentialDecayModel, GaussianPeakModel, LinearModel};
use mars_lm::{FitResult, LevenbergMarquardt, LmOptions, ModelFunction};

/// Points to fit, as read from `--data`.
#[derive(Debug, Deserialize)]
pub struct FitData {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    #[serde(default)]
    pub sigma: Option<Vec<f64>>,
}

impl FitData {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let data: Self = serde_json::from_str(&content)
            .with_context(|| format!("{} is not a valid data file", path.display()))?;
        Ok(data)
    }
}

pub fn model_by_name(name: &str) -> Result<Box<dyn ModelFunction>> {
    match name {
        "linear" => Ok(Box::new(LinearModel)),
        "gaussian-peak" => Ok(Box::new(GaussianPeakModel)),
        "exponential" => Ok(Box::new(ExponentialDecayModel)),
        _ => Err(anyhow::anyhow!(
            "Invalid model: {}. Valid options are 'linear', 'gaussian-peak' or 'exponential'",
            name
        )),
    }
}

///
/// Fit `model` to `data` starting from `p0`, with every parameter free.
///
pub fn fit(
    model: &dyn ModelFunction,
    data: &FitData,
    p0: &[f64],
    options: LmOptions,
) -> Result<FitResult> {
    let inputs: Vec<Vec<f64>> = data.x.iter().map(|x| vec![*x]).collect();
    let mut p = p0.to_vec();
    let vary = vec![true; p.len()];
    let result = LevenbergMarquardt::new(options).solve(
        model,
        &inputs,
        &data.y,
        data.sigma.as_deref(),
        &mut p,
        &vary,
    )?;
    Ok(result)
}

pub fn run_lmfit(matches: &ArgMatches) -> Result<()> {
    let data_path = matches
        .get_one::<String>("data")
        .context("A path to a data file is required.")?;
    let model_name = matches
        .get_one::<String>("model")
        .context("A model name is required.")?;
    let p0: Vec<f64> = matches
        .get_many::<f64>("p0")
        .context("Initial parameters are required.")?
        .copied()
        .collect();

    let mut options = LmOptions::default();
    if let Some(precision) = matches.get_one::<f64>("precision") {
        options.precision = *precision;
    }
    if let Some(max_iterations) = matches.get_one::<usize>("max-iterations") {
        options.max_iterations = *max_iterations;
    }

    let model = model_by_name(model_name)?;
    let data = FitData::from_file(Path::new(data_path))?;

    let result = fit(model.as_ref(), &data, &p0, options)?;
    info!(
        "{} fit to {} points: chi2 = {} after {} iterations",
        model_name,
        data.y.len(),
        result.chi_squared,
        result.iterations
    );

    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
