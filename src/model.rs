use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// An enum indicating whether to minimize or maximize the objective function.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveSense {
    /// Minimize the objective function.
    Minimize,
    /// Maximize the objective function.
    Maximize,
}

/// The sign/domain restriction of a decision variable.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableType {
    /// A continuous variable with explicit bounds.
    Continuous,
    /// A continuous variable restricted to x >= 0.
    Positive,
    /// A continuous variable restricted to x <= 0.
    Negative,
    /// A free continuous variable.
    Unrestricted,
    /// An integer variable. The engine solves its continuous relaxation;
    /// integrality is enforced by out-of-scope search drivers.
    Integer,
    /// A 0-1 variable. Bounds are fixed to [0, 1].
    Binary,
}

/// An operator specifying the relation between the left-hand and right-hand
/// sides of a constraint.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    /// The <= operator (less than or equal to).
    LessEqual,
    /// The == operator (equal to).
    Equal,
    /// The >= operator (greater than or equal to).
    GreaterEqual,
}

/// A decision variable: a name, an objective coefficient, a type and bounds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub objective_coefficient: f64,
    pub variable_type: VariableType,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl Variable {
    /// Create a variable with an explicit type and the default bounds of
    /// that type.
    pub fn new(
        name: impl Into<String>,
        objective_coefficient: f64,
        variable_type: VariableType,
    ) -> Self {
        let (lower_bound, upper_bound) = match variable_type {
            VariableType::Positive | VariableType::Continuous | VariableType::Integer => {
                (0.0, f64::INFINITY)
            }
            VariableType::Negative => (f64::NEG_INFINITY, 0.0),
            VariableType::Unrestricted => (f64::NEG_INFINITY, f64::INFINITY),
            VariableType::Binary => (0.0, 1.0),
        };
        Self {
            name: name.into(),
            objective_coefficient,
            variable_type,
            lower_bound,
            upper_bound,
        }
    }

    /// A continuous variable restricted to x >= 0.
    pub fn positive(name: impl Into<String>, objective_coefficient: f64) -> Self {
        Self::new(name, objective_coefficient, VariableType::Positive)
    }

    /// A continuous variable restricted to x <= 0.
    pub fn negative(name: impl Into<String>, objective_coefficient: f64) -> Self {
        Self::new(name, objective_coefficient, VariableType::Negative)
    }

    /// A free continuous variable.
    pub fn unrestricted(name: impl Into<String>, objective_coefficient: f64) -> Self {
        Self::new(name, objective_coefficient, VariableType::Unrestricted)
    }

    /// An integer variable with inclusive bounds.
    pub fn integer(name: impl Into<String>, objective_coefficient: f64, min: f64, max: f64) -> Self {
        let mut var = Self::new(name, objective_coefficient, VariableType::Integer);
        var.lower_bound = min;
        var.upper_bound = max;
        var
    }

    /// A 0-1 variable.
    pub fn binary(name: impl Into<String>, objective_coefficient: f64) -> Self {
        Self::new(name, objective_coefficient, VariableType::Binary)
    }

    /// Override the bounds of this variable.
    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }
}

/// A linear constraint: a coefficient row, a relation and a right-hand side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub coefficients: Vec<f64>,
    pub relation: Relation,
    pub rhs: f64,
}

impl Constraint {
    pub fn new(coefficients: Vec<f64>, relation: Relation, rhs: f64) -> Self {
        Self {
            coefficients,
            relation,
            rhs,
        }
    }
}

/// An error detected while validating a model, before any solving starts.
///
/// Solve-time outcomes (infeasibility, unboundedness, the iteration cap) are
/// *not* errors; they are reported as a status on the solution value.
#[derive(Clone, Debug, PartialEq)]
pub enum ModelError {
    /// The model declares no variables.
    NoVariables,
    /// A constraint row has a different length than the variable count.
    RowLengthMismatch {
        constraint: usize,
        expected: usize,
        found: usize,
    },
    /// Two variables share a name.
    DuplicateVariableName(String),
    /// A variable has lower bound > upper bound.
    InconsistentBounds { variable: usize },
    /// A binary variable has bounds other than [0, 1].
    BinaryBounds { variable: usize },
    /// An objective coefficient, constraint coefficient or right-hand side
    /// is NaN or infinite.
    NonFiniteData { place: String },
    /// The model is not in the standard Max/<=/x>=0 form required for
    /// explicit dual construction.
    NotInStandardForm,
    /// A canonical-form invariant was violated. Indicates a bug in the
    /// transformation rather than bad user input.
    Internal(String),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ModelError::NoVariables => write!(f, "model has no variables"),
            ModelError::RowLengthMismatch {
                constraint,
                expected,
                found,
            } => write!(
                f,
                "constraint {} has {} coefficients, expected {}",
                constraint, found, expected
            ),
            ModelError::DuplicateVariableName(name) => {
                write!(f, "duplicate variable name '{}'", name)
            }
            ModelError::InconsistentBounds { variable } => {
                write!(f, "variable {} has lower bound > upper bound", variable)
            }
            ModelError::BinaryBounds { variable } => {
                write!(f, "binary variable {} must have bounds [0, 1]", variable)
            }
            ModelError::NonFiniteData { place } => {
                write!(f, "non-finite value in {}", place)
            }
            ModelError::NotInStandardForm => {
                write!(f, "model is not in standard maximization form")
            }
            ModelError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for ModelError {}

/// A specification of a linear optimization problem: an objective sense, an
/// ordered list of variables and an ordered list of constraints.
#[derive(Clone, Serialize, Deserialize)]
pub struct Model {
    pub sense: ObjectiveSense,
    pub variables: Vec<Variable>,
    pub constraints: Vec<Constraint>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only printing lengths here because actual data is probably huge.
        f.debug_struct("Model")
            .field("sense", &self.sense)
            .field("num_variables", &self.variables.len())
            .field("num_constraints", &self.constraints.len())
            .finish()
    }
}

impl Model {
    /// Create an empty model with the given objective sense.
    pub fn new(sense: ObjectiveSense) -> Self {
        Self {
            sense,
            variables: vec![],
            constraints: vec![],
        }
    }

    /// Append a variable and return its index.
    pub fn add_variable(&mut self, variable: Variable) -> usize {
        self.variables.push(variable);
        self.variables.len() - 1
    }

    /// Append a constraint and return its index.
    pub fn add_constraint(&mut self, constraint: Constraint) -> usize {
        self.constraints.push(constraint);
        self.constraints.len() - 1
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Whether any variable is integer or binary.
    pub fn has_integer_variables(&self) -> bool {
        self.variables.iter().any(|v| {
            v.variable_type == VariableType::Integer || v.variable_type == VariableType::Binary
        })
    }

    /// Check the structural invariants of the model.
    ///
    /// This is the only place where malformed input surfaces as an error;
    /// everything past this point is reported as a solve status.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.variables.is_empty() {
            return Err(ModelError::NoVariables);
        }

        let n = self.variables.len();
        for (c, constraint) in self.constraints.iter().enumerate() {
            if constraint.coefficients.len() != n {
                return Err(ModelError::RowLengthMismatch {
                    constraint: c,
                    expected: n,
                    found: constraint.coefficients.len(),
                });
            }
            if constraint.coefficients.iter().any(|a| !a.is_finite()) {
                return Err(ModelError::NonFiniteData {
                    place: format!("constraint {} coefficients", c),
                });
            }
            if !constraint.rhs.is_finite() {
                return Err(ModelError::NonFiniteData {
                    place: format!("constraint {} right-hand side", c),
                });
            }
        }

        let mut seen = std::collections::HashSet::new();
        for (v, variable) in self.variables.iter().enumerate() {
            if !seen.insert(variable.name.as_str()) {
                return Err(ModelError::DuplicateVariableName(variable.name.clone()));
            }
            if !variable.objective_coefficient.is_finite() {
                return Err(ModelError::NonFiniteData {
                    place: format!("objective coefficient of variable {}", v),
                });
            }
            if variable.lower_bound > variable.upper_bound {
                return Err(ModelError::InconsistentBounds { variable: v });
            }
            if variable.variable_type == VariableType::Binary
                && (variable.lower_bound != 0.0 || variable.upper_bound != 1.0)
            {
                return Err(ModelError::BinaryBounds { variable: v });
            }
        }

        Ok(())
    }
}
