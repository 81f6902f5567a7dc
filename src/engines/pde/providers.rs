//! Ready-made coefficient bundles for option pricing PDEs.
//!
//! Time runs as time-to-expiry, so the initial condition is the payoff.

use std::sync::Arc;

use super::coefficients::{PdeCoefficients, SurfaceFn};
use crate::core::{OptionType, PdeError, intrinsic};

fn check_market(rate: f64, dividend_yield: f64, vol: f64, strike: f64) -> Result<(), PdeError> {
    if !rate.is_finite() || !dividend_yield.is_finite() {
        return Err(PdeError::InvalidInput(
            "rate and dividend yield must be finite".to_string(),
        ));
    }
    if !vol.is_finite() || vol < 0.0 {
        return Err(PdeError::InvalidInput(
            "volatility must be finite and >= 0".to_string(),
        ));
    }
    if !strike.is_finite() || strike <= 0.0 {
        return Err(PdeError::InvalidInput(
            "strike must be finite and > 0".to_string(),
        ));
    }
    Ok(())
}

/// Black-Scholes in spot: `a = -vol^2 x^2 / 2`, `b = -(r - q) x`, `c = r`.
pub fn black_scholes(
    rate: f64,
    dividend_yield: f64,
    vol: f64,
    strike: f64,
    option_type: OptionType,
) -> Result<PdeCoefficients, PdeError> {
    check_market(rate, dividend_yield, vol, strike)?;
    let drift = rate - dividend_yield;
    Ok(PdeCoefficients::new(
        move |_, x| -0.5 * vol * vol * x * x,
        move |_, x| -drift * x,
        move |_, _| rate,
        move |x| intrinsic(option_type, x, strike),
    ))
}

/// Black-Scholes in `x = ln(spot)`, constant coefficients.
pub fn log_black_scholes(
    rate: f64,
    dividend_yield: f64,
    vol: f64,
    strike: f64,
    option_type: OptionType,
) -> Result<PdeCoefficients, PdeError> {
    check_market(rate, dividend_yield, vol, strike)?;
    let variance = vol * vol;
    PdeCoefficients::constant(
        -0.5 * variance,
        0.5 * variance - (rate - dividend_yield),
        rate,
        move |x: f64| intrinsic(option_type, x.exp(), strike),
    )
}

/// Constant elasticity of variance in forward space:
/// `a = -vol^2 x^(2 beta) / 2`, no drift term, discounting at `rate`.
pub fn cev(
    rate: f64,
    beta: f64,
    vol: f64,
    strike: f64,
    option_type: OptionType,
) -> Result<PdeCoefficients, PdeError> {
    check_market(rate, 0.0, vol, strike)?;
    if !beta.is_finite() || beta < 0.0 {
        return Err(PdeError::InvalidInput(
            "cev beta must be finite and >= 0".to_string(),
        ));
    }
    Ok(PdeCoefficients::new(
        move |_, x: f64| -0.5 * vol * vol * x.abs().powf(2.0 * beta),
        |_, _| 0.0,
        move |_, _| rate,
        move |x| intrinsic(option_type, x, strike),
    ))
}

/// Early-exercise floor `g(t, x) = payoff(x)` for an American option in spot.
pub fn american_free_boundary(strike: f64, option_type: OptionType) -> SurfaceFn {
    Arc::new(move |_, x| intrinsic(option_type, x, strike))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn black_scholes_coefficients_at_spot() {
        let coeff = black_scholes(0.05, 0.02, 0.2, 100.0, OptionType::Call).unwrap();
        assert_relative_eq!(coeff.a(0.0, 100.0), -200.0, epsilon = 1e-10);
        assert_relative_eq!(coeff.b(0.0, 100.0), -3.0, epsilon = 1e-10);
        assert_relative_eq!(coeff.c(0.0, 100.0), 0.05);
        assert_eq!(coeff.initial_condition(120.0), 20.0);
        assert_eq!(coeff.initial_condition(80.0), 0.0);
    }

    #[test]
    fn log_black_scholes_uses_exponentiated_payoff() {
        let coeff = log_black_scholes(0.05, 0.0, 0.2, 100.0, OptionType::Put).unwrap();
        assert_relative_eq!(coeff.a(0.3, 1.0), -0.02, epsilon = 1e-12);
        assert_relative_eq!(coeff.b(0.3, 1.0), 0.02 - 0.05, epsilon = 1e-12);
        assert_relative_eq!(coeff.initial_condition(90.0_f64.ln()), 10.0, epsilon = 1e-10);
    }

    #[test]
    fn cev_reduces_to_normal_model_at_zero_beta() {
        let coeff = cev(0.0, 0.0, 10.0, 100.0, OptionType::Call).unwrap();
        assert_relative_eq!(coeff.a(0.0, 50.0), -50.0);
        assert_relative_eq!(coeff.a(0.0, 150.0), -50.0);
        assert!(cev(0.0, -0.5, 0.2, 100.0, OptionType::Call).is_err());
    }

    #[test]
    fn bad_market_inputs_are_rejected() {
        assert!(black_scholes(0.05, 0.0, -0.2, 100.0, OptionType::Call).is_err());
        assert!(black_scholes(f64::NAN, 0.0, 0.2, 100.0, OptionType::Call).is_err());
        assert!(log_black_scholes(0.05, 0.0, 0.2, 0.0, OptionType::Put).is_err());
    }

    #[test]
    fn american_floor_is_the_payoff() {
        let g = american_free_boundary(100.0, OptionType::Put);
        assert_eq!(g(0.5, 80.0), 20.0);
        assert_eq!(g(0.5, 120.0), 0.0);
    }
}
