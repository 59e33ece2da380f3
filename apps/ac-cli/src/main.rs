use ac_chem::{
    CITATION, ChemResult, ChemistryConfig, DEFAULT_CANONICAL_SPECIES, EquilibriumChemistry,
    EquilibriumSession, FrozenSpeciationBackend, FrozenSpeciationSession, ParamScale, load_config,
};
use ac_core::constants::AVOGADRO;
use ac_core::{pa, to_bar};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "ac-cli")]
#[command(about = "AtmoChem CLI - equilibrium chemistry profiles for atmospheric retrievals", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that builds a chemistry instance.
#[derive(clap::Args)]
struct ChemArgs {
    /// Chemistry configuration YAML file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Directory holding the logK datasets (overrides the config)
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Comma-separated element selection (overrides the config)
    #[arg(long, value_delimiter = ',')]
    elements: Option<Vec<String>>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute mixing-ratio and mean-molecular-weight profiles
    Profile {
        #[command(flatten)]
        chem: ChemArgs,
        /// Number of layers
        #[arg(long, default_value_t = 100)]
        layers: usize,
        /// Temperature at the bottom of the atmosphere [K]
        #[arg(long, default_value_t = 3000.0)]
        t_bottom: f64,
        /// Temperature at the top of the atmosphere [K]
        #[arg(long, default_value_t = 1000.0)]
        t_top: f64,
        /// Metallicity (overrides the config)
        #[arg(long)]
        metallicity: Option<f64>,
        /// Comma-separated species to report
        #[arg(long, value_delimiter = ',', default_value = "H2,H2O,CH4,NH3,C2H2,CO,CO2")]
        species: Vec<String>,
        /// Output CSV file path (optional, defaults to a summary on stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List fitting parameters with their bounds and current values
    Params {
        #[command(flatten)]
        chem: ChemArgs,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show backend species labels and their reconciled names
    Species {
        #[command(flatten)]
        chem: ChemArgs,
    },
    /// Print the citation for the equilibrium code
    Citation,
}

fn main() -> ChemResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Profile {
            chem,
            layers,
            t_bottom,
            t_top,
            metallicity,
            species,
            output,
        } => cmd_profile(
            &chem,
            layers,
            (t_bottom, t_top),
            metallicity,
            &species,
            output.as_deref(),
        ),
        Commands::Params { chem, json } => cmd_params(&chem, json),
        Commands::Species { chem } => cmd_species(&chem),
        Commands::Citation => {
            println!("{CITATION}");
            Ok(())
        }
    }
}

fn build_chemistry(args: &ChemArgs) -> ChemResult<EquilibriumChemistry<FrozenSpeciationSession>> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ChemistryConfig::default(),
    };
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(elements) = &args.elements {
        config = config.with_selected_elements(elements.as_slice());
    }
    info!(datafile = %config.resolve_species_datafile().display(), "building chemistry");
    EquilibriumChemistry::new(&FrozenSpeciationBackend, &config, &DEFAULT_CANONICAL_SPECIES)
}

/// `n` points from 10^start to 10^stop, evenly spaced in log.
fn logspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    linspace(start, stop, n).into_iter().map(|x| 10f64.powf(x)).collect()
}

fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

fn cmd_profile(
    args: &ChemArgs,
    layers: usize,
    (t_bottom, t_top): (f64, f64),
    metallicity: Option<f64>,
    species: &[String],
    output: Option<&Path>,
) -> ChemResult<()> {
    let mut chem = build_chemistry(args)?;
    if let Some(z) = metallicity {
        chem.set_metallicity(z)?;
    }

    let temperature = linspace(t_bottom, t_top, layers);
    // 1e6 bar at the bottom to 1e-2 bar at the top, in Pa.
    let pressure: Vec<f64> = logspace(6.0, -2.0, layers).iter().map(|p| p * 1e5).collect();
    chem.initialize_chemistry(&temperature, &pressure)?;

    let (Some(mix), Some(mu)) = (chem.mix_profile(), chem.mu_profile()) else {
        return Ok(());
    };

    let shown: Vec<(usize, &String)> = species
        .iter()
        .filter_map(|name| chem.gases().iter().position(|g| g == name).map(|i| (i, name)))
        .collect();
    for name in species {
        if !chem.gases().contains(name) {
            println!("  (species {name} not produced by this element selection)");
        }
    }

    let mut csv = String::from("pressure_bar,temperature_k,mu_amu");
    for (_, name) in &shown {
        csv.push(',');
        csv.push_str(name);
    }
    csv.push('\n');
    for layer in 0..temperature.len() {
        csv.push_str(&format!(
            "{:.6e},{:.2},{:.6}",
            to_bar(pa(pressure[layer])),
            temperature[layer],
            mu[layer] * AVOGADRO * 1e3
        ));
        for (index, _) in &shown {
            csv.push_str(&format!(",{:.6e}", mix[(*index, layer)]));
        }
        csv.push('\n');
    }

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!("✓ Exported {} layers to {}", temperature.len(), path.display());
    } else {
        println!("Profile over {} layers ({} species)", temperature.len(), chem.gases().len());
        println!("  Metallicity: {:.3}", chem.metallicity());
        println!(
            "  Mean molecular weight: {:.4} - {:.4} amu",
            mu.min() * AVOGADRO * 1e3,
            mu.max() * AVOGADRO * 1e3
        );
        println!("\nMixing ratio at bottom / top:");
        let last = temperature.len() - 1;
        for (index, name) in &shown {
            println!(
                "  {:<8} {:.4e} / {:.4e}",
                name,
                mix[(*index, 0)],
                mix[(*index, last)]
            );
        }
    }

    if let Some(status) = chem.last_status() {
        if !status.is_success() {
            println!("\nWarning: backend reported {status}");
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct ParamSummary<'a> {
    name: &'a str,
    latex: &'a str,
    description: &'a str,
    value: f64,
    bounds: (f64, f64),
    scale: ParamScale,
    default_fit: bool,
}

fn cmd_params(args: &ChemArgs, json: bool) -> ChemResult<()> {
    let chem = build_chemistry(args)?;
    let summaries: Vec<ParamSummary<'_>> = chem
        .fit_params()
        .iter()
        .map(|p| ParamSummary {
            name: p.name(),
            latex: p.latex(),
            description: p.description(),
            value: p.get(chem.state()),
            bounds: p.bounds(),
            scale: p.scale(),
            default_fit: p.default_fit(),
        })
        .collect();

    if json {
        let text = serde_json::to_string_pretty(&summaries).map_err(std::io::Error::other)?;
        println!("{text}");
        return Ok(());
    }

    println!("Fitting parameters:");
    for p in &summaries {
        println!(
            "  {:<14} {:<8} value={:<12.4e} bounds=[{:.1e}, {:.1e}] scale={}{}",
            p.name,
            p.latex,
            p.value,
            p.bounds.0,
            p.bounds.1,
            p.scale,
            if p.default_fit { " (fit)" } else { "" }
        );
    }
    Ok(())
}

fn cmd_species(args: &ChemArgs) -> ChemResult<()> {
    let chem = build_chemistry(args)?;
    let native = chem.session().handle().gas_species();

    println!("Species ({}):", native.len());
    for (label, name) in native.iter().zip(chem.gases()) {
        if label == name {
            println!("  {label}");
        } else {
            println!("  {label:<10} -> {name}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spacing_helpers() {
        assert_eq!(linspace(3000.0, 1000.0, 3), [3000.0, 2000.0, 1000.0]);
        assert_eq!(linspace(1.0, 2.0, 1), [1.0]);
        assert!(linspace(1.0, 2.0, 0).is_empty());

        let p = logspace(6.0, -2.0, 9);
        assert!((p[0] - 1e6).abs() < 1e-6);
        assert!((p[8] - 1e-2).abs() < 1e-12);
    }
}
