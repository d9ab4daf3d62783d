use linprog_parser::Sense;

/// Append-only record of a simplex solve. Created at solve start, mutated
/// only by the solver, read afterwards by exporters (the CLI's tableau
/// formatter) and by the sensitivity analyzer (which needs the final
/// basis). Every snapshot is a copy — the log never aliases into the
/// solver's working buffers, so it outlives the solver that produced it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct SimplexLog {
    pub tableaus: Vec<Vec<Vec<f64>>>,
    pub entering: Vec<Option<usize>>,
    pub leaving: Vec<Option<usize>>,
    pub bases: Vec<Vec<usize>>,
    pub variable_names: Vec<String>,
    pub c_full: Vec<f64>,
    pub m: usize,
    pub total_columns: usize,
    pub original_sense: Option<Sense>,
    pub price_out: Vec<PriceOutEntry>,
    pub product_form: Vec<ProductFormEntry>,
}

/// One iteration of the revised simplex's pricing step (§4.3 step 1).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct PriceOutEntry {
    pub y: Vec<f64>,
    pub reduced_costs: Vec<f64>,
    pub entering: Option<usize>,
    pub z: f64,
}

/// One iteration of the revised simplex's ratio test (§4.3 steps 3-4).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct ProductFormEntry {
    pub direction: Vec<f64>,
    pub x_b_before: Vec<f64>,
    pub theta: f64,
    pub x_b_after: Vec<f64>,
    pub leaving_row: usize,
}

impl SimplexLog {
    pub fn new(variable_names: Vec<String>, c_full: Vec<f64>, m: usize, total_columns: usize, original_sense: Sense) -> Self {
        Self {
            tableaus: Vec::new(),
            entering: Vec::new(),
            leaving: Vec::new(),
            bases: Vec::new(),
            variable_names,
            c_full,
            m,
            total_columns,
            original_sense: Some(original_sense),
            price_out: Vec::new(),
            product_form: Vec::new(),
        }
    }

    pub fn record_iteration(&mut self, tableau: &[Vec<f64>], basis: &[usize], entering: Option<usize>, leaving: Option<usize>) {
        self.tableaus.push(tableau.to_vec());
        self.bases.push(basis.to_vec());
        self.entering.push(entering);
        self.leaving.push(leaving);
    }

    pub fn final_tableau(&self) -> &[Vec<f64>] {
        self.tableaus.last().expect("solve log always has at least one snapshot")
    }

    pub fn final_basis(&self) -> &[usize] {
        self.bases.last().expect("solve log always has at least one snapshot")
    }

    pub fn iterations(&self) -> usize {
        self.tableaus.len()
    }
}
