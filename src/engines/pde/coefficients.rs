//! Coefficient bundle for `df/dt + a f_xx + b f_x + c f = 0`.

use std::fmt;
use std::sync::Arc;

use crate::core::PdeError;

/// Shared scalar function of `(t, x)`.
pub type SurfaceFn = Arc<dyn Fn(f64, f64) -> f64 + Send + Sync>;
/// Shared scalar function of a single variable (space or time).
pub type CurveFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Variant tag selecting how the solver reads the bundle.
#[derive(Clone)]
pub enum CoefficientForm {
    /// Derivatives act on `f` directly.
    Standard,
    /// Fokker-Planck style: the second derivative acts on `alpha * f` and the
    /// first derivative on `beta * f`.
    Extended { alpha: SurfaceFn, beta: SurfaceFn },
    /// One half of a coupled pair; `lambda` multiplies the partner solution.
    Coupled { lambda: f64 },
}

impl fmt::Debug for CoefficientForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("Standard"),
            Self::Extended { .. } => f.write_str("Extended"),
            Self::Coupled { lambda } => f.debug_struct("Coupled").field("lambda", lambda).finish(),
        }
    }
}

/// Immutable PDE coefficients plus the initial condition `f(0, x)`.
#[derive(Clone)]
pub struct PdeCoefficients {
    a: SurfaceFn,
    b: SurfaceFn,
    c: SurfaceFn,
    initial_condition: CurveFn,
    form: CoefficientForm,
}

impl fmt::Debug for PdeCoefficients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdeCoefficients")
            .field("form", &self.form)
            .finish_non_exhaustive()
    }
}

impl PdeCoefficients {
    /// Standard bundle from the three coefficient surfaces and the initial condition.
    pub fn new<A, B, C, G>(a: A, b: B, c: C, initial_condition: G) -> Self
    where
        A: Fn(f64, f64) -> f64 + Send + Sync + 'static,
        B: Fn(f64, f64) -> f64 + Send + Sync + 'static,
        C: Fn(f64, f64) -> f64 + Send + Sync + 'static,
        G: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::from_shared(Arc::new(a), Arc::new(b), Arc::new(c), Arc::new(initial_condition))
    }

    pub fn from_shared(a: SurfaceFn, b: SurfaceFn, c: SurfaceFn, initial_condition: CurveFn) -> Self {
        Self {
            a,
            b,
            c,
            initial_condition,
            form: CoefficientForm::Standard,
        }
    }

    /// Constant `a`, `b`, `c`.
    pub fn constant<G>(a: f64, b: f64, c: f64, initial_condition: G) -> Result<Self, PdeError>
    where
        G: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        if !a.is_finite() || !b.is_finite() || !c.is_finite() {
            return Err(PdeError::InvalidInput(
                "constant coefficients must be finite".to_string(),
            ));
        }
        Ok(Self::new(
            move |_, _| a,
            move |_, _| b,
            move |_, _| c,
            initial_condition,
        ))
    }

    /// Switches to the extended form.
    pub fn with_extended<F, G>(mut self, alpha: F, beta: G) -> Self
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
        G: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        self.form = CoefficientForm::Extended {
            alpha: Arc::new(alpha),
            beta: Arc::new(beta),
        };
        self
    }

    /// Marks the bundle as one half of a coupled system.
    pub fn with_coupling(mut self, lambda: f64) -> Result<Self, PdeError> {
        if !lambda.is_finite() {
            return Err(PdeError::InvalidInput(
                "coupling constant must be finite".to_string(),
            ));
        }
        self.form = CoefficientForm::Coupled { lambda };
        Ok(self)
    }

    #[inline]
    pub fn a(&self, t: f64, x: f64) -> f64 {
        (self.a)(t, x)
    }

    #[inline]
    pub fn b(&self, t: f64, x: f64) -> f64 {
        (self.b)(t, x)
    }

    #[inline]
    pub fn c(&self, t: f64, x: f64) -> f64 {
        (self.c)(t, x)
    }

    /// `alpha(t, x)`, identically one outside the extended form.
    #[inline]
    pub fn alpha(&self, t: f64, x: f64) -> f64 {
        match &self.form {
            CoefficientForm::Extended { alpha, .. } => alpha(t, x),
            _ => 1.0,
        }
    }

    /// `beta(t, x)`, identically one outside the extended form.
    #[inline]
    pub fn beta(&self, t: f64, x: f64) -> f64 {
        match &self.form {
            CoefficientForm::Extended { beta, .. } => beta(t, x),
            _ => 1.0,
        }
    }

    #[inline]
    pub fn initial_condition(&self, x: f64) -> f64 {
        (self.initial_condition)(x)
    }

    pub fn form(&self) -> &CoefficientForm {
        &self.form
    }

    pub fn is_extended(&self) -> bool {
        matches!(self.form, CoefficientForm::Extended { .. })
    }

    pub fn coupling(&self) -> Option<f64> {
        match self.form {
            CoefficientForm::Coupled { lambda } => Some(lambda),
            _ => None,
        }
    }
}
