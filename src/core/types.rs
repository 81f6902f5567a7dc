/// Plain-vanilla option side, used by the payoff-driven coefficient providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    /// Call option payoff profile.
    Call,
    /// Put option payoff profile.
    Put,
}

impl OptionType {
    /// Returns +1.0 for calls and -1.0 for puts.
    pub fn sign(self) -> f64 {
        match self {
            Self::Call => 1.0,
            Self::Put => -1.0,
        }
    }
}

/// Exercise value `max(sign * (spot - strike), 0)`.
#[inline]
pub fn intrinsic(option_type: OptionType, spot: f64, strike: f64) -> f64 {
    (option_type.sign() * (spot - strike)).max(0.0)
}
