/// Centralised tolerances, referenced throughout §4 instead of ad-hoc
/// literal epsilons scattered across the solvers.
pub const EPS_REDCOST: f64 = 1e-9;
pub const EPS_PIVOT: f64 = 1e-12;
pub const EPS_FEAS: f64 = 1e-6;

/// Iteration / search caps and tolerances for a single solve call.
///
/// Mirrors the teacher's `Solver::with_max_iterations`/`with_tolerance`
/// builder: every cap and tolerance the core numerical subsystems consult
/// lives here so a caller can tune them without reaching into solver
/// internals.
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    pub simplex_max_iterations: usize,
    pub bnb_node_cap: usize,
    pub cutting_plane_cap: usize,
    pub eps_redcost: f64,
    pub eps_pivot: f64,
    pub eps_feas: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            simplex_max_iterations: 10_000,
            bnb_node_cap: 1_000,
            cutting_plane_cap: 30,
            eps_redcost: EPS_REDCOST,
            eps_pivot: EPS_PIVOT,
            eps_feas: EPS_FEAS,
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_simplex_max_iterations(mut self, max: usize) -> Self {
        self.simplex_max_iterations = max;
        self
    }

    pub fn with_bnb_node_cap(mut self, cap: usize) -> Self {
        self.bnb_node_cap = cap;
        self
    }

    pub fn with_cutting_plane_cap(mut self, cap: usize) -> Self {
        self.cutting_plane_cap = cap;
        self
    }
}
