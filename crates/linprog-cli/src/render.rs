use linprog_core::{CanonicalModel, PriceOutEntry, ProductFormEntry, SimplexLog};

const WIDTH: usize = 10;

fn cell(v: f64) -> String {
    format!("{v:>WIDTH$.3}")
}

fn header_row(variable_names: &[String]) -> String {
    let mut s = format!("{:>WIDTH$}", "");
    for name in variable_names {
        s.push_str(&format!("{name:>WIDTH$}"));
    }
    s.push_str(&format!("{:>WIDTH$}", "RHS"));
    s
}

fn body_row(label: &str, row: &[f64]) -> String {
    let mut s = format!("{label:>WIDTH$}");
    for v in row {
        s.push_str(&cell(*v));
    }
    s
}

pub fn canonical_preamble(cm: &CanonicalModel) -> String {
    format!(
        "Canonical form: {} decision column(s), {} slack, {} artificial, {} row(s), Big-M = {:.3}\n",
        cm.n_decision, cm.n_slack, cm.n_artificial, cm.m, cm.big_m
    )
}

pub fn tableau_block(tableau: &[Vec<f64>], variable_names: &[String], index: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("-- Iteration {index} --\n"));
    out.push_str(&header_row(variable_names));
    out.push('\n');
    out.push_str(&"-".repeat(WIDTH * (variable_names.len() + 2)));
    out.push('\n');
    let m = tableau.len() - 1;
    for row in tableau.iter().take(m) {
        out.push_str(&body_row("xB", row));
        out.push('\n');
    }
    out.push_str(&body_row("z", &tableau[m]));
    out.push('\n');
    out
}

pub fn entering_leaving_annotation(
    variable_names: &[String],
    entering: usize,
    leaving_variable: usize,
) -> String {
    format!("entering: {}, leaving: {}\n", variable_names[entering], variable_names[leaving_variable])
}

/// Renders every tableau snapshot in `log`, with an entering/leaving
/// annotation between consecutive iterations.
pub fn tableau_trail(log: &SimplexLog) -> String {
    let mut out = String::new();
    for (i, tableau) in log.tableaus.iter().enumerate() {
        out.push_str(&tableau_block(tableau, &log.variable_names, i));
        if let (Some(entering), Some(leaving_row)) = (log.entering[i], log.leaving[i]) {
            let leaving_variable = log.bases[i - 1][leaving_row];
            out.push_str(&entering_leaving_annotation(&log.variable_names, entering, leaving_variable));
        }
    }
    out
}

pub fn price_out_block(entry: &PriceOutEntry, variable_names: &[String]) -> String {
    let entering = entry.entering.map(|j| variable_names[j].as_str()).unwrap_or("none (optimal)");
    format!(
        "[Price-Out] y = {:?}, reduced costs = {:?}, entering = {}, z = {:.3}\n",
        round3(&entry.y),
        round3(&entry.reduced_costs),
        entering,
        entry.z
    )
}

pub fn product_form_block(entry: &ProductFormEntry) -> String {
    format!(
        "[Product-Form] direction = {:?}, x_B before = {:?}, theta = {:.3}, x_B after = {:?}, leaving_row = {}\n",
        round3(&entry.direction),
        round3(&entry.x_b_before),
        entry.theta,
        round3(&entry.x_b_after),
        entry.leaving_row
    )
}

/// Renders the revised solver's interleaved Price-Out / Product-Form trail.
pub fn revised_trail(log: &SimplexLog) -> String {
    let mut out = String::new();
    for (i, tableau) in log.tableaus.iter().enumerate() {
        out.push_str(&tableau_block(tableau, &log.variable_names, i));
        if let Some(entry) = log.price_out.get(i) {
            out.push_str(&price_out_block(entry, &log.variable_names));
        }
        if let Some(entry) = log.product_form.get(i) {
            out.push_str(&product_form_block(entry));
        }
    }
    out
}

pub fn final_report(cm: &CanonicalModel, log: &SimplexLog, original_names: &[String]) -> String {
    let objective = cm.report_objective(log.final_tableau(), log.final_basis());
    let values = cm.decision_values(log.final_tableau(), log.final_basis());

    let mut out = String::new();
    out.push_str(&format!("Objective z = {objective:.3}\n"));
    for (name, value) in original_names.iter().zip(values.iter()) {
        out.push_str(&format!("{name} = {value:.3}\n"));
    }
    out
}

fn round3(values: &[f64]) -> Vec<f64> {
    values.iter().map(|v| (v * 1000.0).round() / 1000.0).collect()
}

pub fn footer(status: &str) -> String {
    format!("{status}\n")
}
