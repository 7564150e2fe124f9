#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("equipment must provide at least one increment")]
    NoIncrements,
    #[error("increments must be positive ({0} kg)")]
    NonPositiveIncrement(f64),
    #[error("dual load equipment requires a bar weight")]
    MissingBarWeight,
    #[error("bar weight must not be negative ({0} kg)")]
    NegativeBarWeight(f64),
    #[error("micro increment must be positive ({0} kg)")]
    NonPositiveMicroIncrement(f64),
    #[error("maximum load must not be below the minimum load ({max} kg < {min} kg)")]
    MaxBelowMinimum { max: f64, min: f64 },
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(
        ConfigurationError::NoIncrements,
        "equipment must provide at least one increment"
    )]
    #[case(
        ConfigurationError::NonPositiveIncrement(-2.5),
        "increments must be positive (-2.5 kg)"
    )]
    #[case(
        ConfigurationError::MaxBelowMinimum { max: 15.0, min: 20.0 },
        "maximum load must not be below the minimum load (15 kg < 20 kg)"
    )]
    fn test_configuration_error_display(
        #[case] error: ConfigurationError,
        #[case] expected: &str,
    ) {
        assert_eq!(error.to_string(), expected);
    }
}
