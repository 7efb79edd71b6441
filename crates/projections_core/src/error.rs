use std::fmt;

/// Errors from the iterative net-to-gross solver
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolveError {
    /// Derivative vanished at `x`; no direction to step in
    ZeroDerivative { x: f64 },
    /// Iteration budget exhausted without reaching tolerance
    MaxIterations { iterations: u32, last: f64 },
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::ZeroDerivative { x } => {
                write!(f, "derivative is zero at x = {x}; cannot continue iteration")
            }
            SolveError::MaxIterations { iterations, last } => {
                write!(f, "no convergence after {iterations} iterations (last x = {last})")
            }
        }
    }
}

impl std::error::Error for SolveError {}

/// Errors in the household input that make a projection impossible
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// An income's 401k deduction names an employer plan account that
    /// does not exist on the same person
    UnknownEmployerPlan { income: String, account_key: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownEmployerPlan { income, account_key } => {
                write!(
                    f,
                    "income '{income}' deducts into employer plan '{account_key}' but no such account exists"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level error for a projection run
#[derive(Debug, Clone)]
pub enum ProjectionError {
    Config(ConfigError),
    /// Net take-home pay could not be grossed up
    Withholding { income: String, source: SolveError },
}

impl fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionError::Config(e) => write!(f, "invalid household input: {e}"),
            ProjectionError::Withholding { income, source } => {
                write!(f, "could not gross up take-home income '{income}': {source}")
            }
        }
    }
}

impl std::error::Error for ProjectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProjectionError::Config(e) => Some(e),
            ProjectionError::Withholding { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for ProjectionError {
    fn from(e: ConfigError) -> Self {
        ProjectionError::Config(e)
    }
}
