mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use serde::Serialize;

use linprog_core::{branch_bound, canonical, cutting_plane, knapsack, revised_simplex, sensitivity, simplex, SolverConfig, SolverError};
use linprog_parser::{Parser as LpParser, SignRestriction};

#[derive(ClapParser)]
#[command(name = "linprog")]
#[command(about = "A linear/integer programming solver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse, canonicalise, and solve a model.
    Solve {
        file: PathBuf,
        /// Route to an integer-programming driver when the model has int/bin signs.
        #[arg(long, value_enum)]
        integer: Option<IntegerDriver>,
        /// Use the revised simplex instead of the tableau form.
        #[arg(long)]
        revised: bool,
        /// Also run the sensitivity analyzer on the final basis.
        #[arg(long)]
        sensitivity: bool,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Solve a 0/1-knapsack model directly.
    Knapsack { file: PathBuf },
    /// Parse only, report dimension counts.
    Check { file: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum IntegerDriver {
    Bnb,
    Cut,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct SolveOutput {
    status: String,
    objective: Option<f64>,
    values: Option<Vec<f64>>,
    variable_names: Vec<String>,
    iterations: usize,
    shadow_prices: Option<Vec<f64>>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Solve { file, integer, revised, sensitivity, format } => run_solve(&file, integer, revised, sensitivity, format),
        Commands::Knapsack { file } => run_knapsack(&file),
        Commands::Check { file } => run_check(&file),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn read_model(file: &PathBuf) -> Result<linprog_parser::ParsedModel, String> {
    let source = std::fs::read_to_string(file).map_err(|e| format!("error reading {}: {e}", file.display()))?;
    LpParser::parse(&source).map_err(|e| format!("parse error: {e}"))
}

fn run_solve(file: &PathBuf, integer: Option<IntegerDriver>, revised: bool, run_sensitivity: bool, format: OutputFormat) -> Result<(), String> {
    let parsed = read_model(file)?;
    let config = SolverConfig::default();

    let has_integer = parsed.signs.iter().any(|s| matches!(s, SignRestriction::Integer | SignRestriction::Binary));

    if has_integer {
        return run_integer_solve(&parsed, integer.unwrap_or(IntegerDriver::Bnb), &config, format);
    }

    let cm = canonical::build(&parsed, &config).map_err(|e| e.to_string())?;
    let solve_result = if revised { revised_simplex::solve(&cm, &config) } else { simplex::solve(&cm, &config) };

    match solve_result {
        Ok(log) => {
            let sensitivity_report =
                if run_sensitivity { Some(sensitivity::analyze(&cm, log.final_basis()).map_err(|e| e.to_string())?) } else { None };

            match format {
                OutputFormat::Text => {
                    print!("{}", render::canonical_preamble(&cm));
                    if revised {
                        print!("{}", render::revised_trail(&log));
                    } else {
                        print!("{}", render::tableau_trail(&log));
                    }
                    print!("{}", render::final_report(&cm, &log, &parsed.variable_names));
                    if let Some(report) = &sensitivity_report {
                        print!("{}", render_sensitivity_text(report));
                    }
                    print!("{}", render::footer("OPTIMAL"));
                }
                OutputFormat::Json => {
                    let output = SolveOutput {
                        status: "OPTIMAL".to_string(),
                        objective: Some(cm.report_objective(log.final_tableau(), log.final_basis())),
                        values: Some(cm.decision_values(log.final_tableau(), log.final_basis())),
                        variable_names: parsed.variable_names.clone(),
                        iterations: log.iterations(),
                        shadow_prices: sensitivity_report.map(|r| r.shadow_prices),
                    };
                    println!("{}", serde_json::to_string_pretty(&output).map_err(|e| e.to_string())?);
                }
            }
            Ok(())
        }
        Err(SolverError::Unbounded(_)) => {
            match format {
                OutputFormat::Text => print!("{}", render::footer("UNBOUNDED")),
                OutputFormat::Json => println!("{{\"status\":\"UNBOUNDED\"}}"),
            }
            Err("problem is unbounded".to_string())
        }
        Err(SolverError::Infeasible(_)) => {
            match format {
                OutputFormat::Text => print!("{}", render::footer("INFEASIBLE")),
                OutputFormat::Json => println!("{{\"status\":\"INFEASIBLE\"}}"),
            }
            Err("problem is infeasible".to_string())
        }
        Err(other) => Err(other.to_string()),
    }
}

fn run_integer_solve(parsed: &linprog_parser::ParsedModel, driver: IntegerDriver, config: &SolverConfig, format: OutputFormat) -> Result<(), String> {
    match driver {
        IntegerDriver::Bnb => {
            let result = branch_bound::solve(parsed, config).map_err(|e| e.to_string())?;
            match result.best_objective {
                Some(objective) => {
                    let values = result.best_values.unwrap_or_default();
                    match format {
                        OutputFormat::Text => {
                            println!("Objective z = {objective:.3}");
                            for (name, value) in parsed.variable_names.iter().zip(values.iter()) {
                                println!("{name} = {value:.3}");
                            }
                            println!("branch-and-bound explored {} node(s)", result.nodes.len());
                            println!("OPTIMAL");
                        }
                        OutputFormat::Json => {
                            let output = SolveOutput {
                                status: "OPTIMAL".to_string(),
                                objective: Some(objective),
                                values: Some(values),
                                variable_names: parsed.variable_names.clone(),
                                iterations: result.nodes.len(),
                                shadow_prices: None,
                            };
                            println!("{}", serde_json::to_string_pretty(&output).map_err(|e| e.to_string())?);
                        }
                    }
                    Ok(())
                }
                None => Err("no integer-feasible solution found".to_string()),
            }
        }
        IntegerDriver::Cut => {
            let result = cutting_plane::solve(parsed, config).map_err(|e| e.to_string())?;
            match format {
                OutputFormat::Text => {
                    println!("Objective z = {:.3}", result.objective);
                    for (name, value) in parsed.variable_names.iter().zip(result.values.iter()) {
                        println!("{name} = {value:.3}");
                    }
                    println!("cutting plane used {} round(s)", result.iterations.len());
                    println!("OPTIMAL");
                }
                OutputFormat::Json => {
                    let output = SolveOutput {
                        status: "OPTIMAL".to_string(),
                        objective: Some(result.objective),
                        values: Some(result.values.clone()),
                        variable_names: parsed.variable_names.clone(),
                        iterations: result.iterations.len(),
                        shadow_prices: None,
                    };
                    println!("{}", serde_json::to_string_pretty(&output).map_err(|e| e.to_string())?);
                }
            }
            Ok(())
        }
    }
}

fn run_knapsack(file: &PathBuf) -> Result<(), String> {
    let parsed = read_model(file)?;
    let config = SolverConfig::default();
    let result = knapsack::solve(&parsed, &config).map_err(|e| e.to_string())?;

    println!("Best profit = {:.3}", result.best_profit);
    println!("Items taken: {:?}", result.best_items);
    println!("explored {} node(s)", result.nodes.len());
    Ok(())
}

fn run_check(file: &PathBuf) -> Result<(), String> {
    let parsed = read_model(file)?;
    println!("{} is valid", file.display());
    println!("  {} variable(s)", parsed.n_decision());
    println!("  {} constraint(s)", parsed.constraints.len());
    println!("  {} sign token(s)", parsed.signs.len());
    Ok(())
}

fn render_sensitivity_text(report: &linprog_core::SensitivityReport) -> String {
    let mut out = String::new();
    out.push_str("Shadow prices:\n");
    for (i, y) in report.shadow_prices.iter().enumerate() {
        out.push_str(&format!("  row {} = {:.3}\n", i + 1, y));
    }
    out.push_str("Objective coefficient ranges:\n");
    for (j, range) in report.objective_ranges.iter().enumerate() {
        out.push_str(&format!("  column {} in [{:.3}, {:.3}]\n", j, range.lower, range.upper));
    }
    out.push_str("RHS ranges:\n");
    for (i, range) in report.rhs_ranges.iter().enumerate() {
        out.push_str(&format!("  row {} delta in [{:.3}, {:.3}]\n", i + 1, range.lower, range.upper));
    }
    out
}
