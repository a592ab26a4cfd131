//! Configuration for the segmentation engine

use serde::{Deserialize, Serialize};

/// Configuration surface consumed by the planner and processor.
///
/// Token budgets are planning inputs, not measurements: costs are estimated
/// from character counts and the output estimate is a fixed fraction of the
/// input. Both knobs are deliberately tunable rather than calibrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Input-token budget per planned chunk
    pub max_input_tokens: usize,

    /// Output-token budget per planned chunk
    pub max_output_tokens: usize,

    /// Hard ceiling on a single prompt's estimated tokens. A prompt over this
    /// limit is never sent; the chunk is shrunk first.
    pub max_prompt_tokens: usize,

    /// Maximum shrink-and-retry attempts per chunk
    pub max_retries: u32,

    /// Characters-per-token divisor for the estimation heuristic
    pub chars_per_token: usize,

    /// Output cost estimated as this fraction of a section's input cost
    pub output_fraction: f64,

    /// A section over this fraction of the available input budget is isolated
    /// into its own dedicated chunk
    pub oversize_fraction: f64,

    /// Tokens reserved for prompt scaffolding (instructions, section list,
    /// prior-context block) when computing the available budget
    pub prompt_reserve_tokens: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_input_tokens: 750_000,
            max_output_tokens: 8_000,
            max_prompt_tokens: 800_000,
            max_retries: 3,
            chars_per_token: 4,
            output_fraction: 0.10,
            oversize_fraction: 0.8,
            prompt_reserve_tokens: 3_000,
        }
    }
}

impl EngineConfig {
    /// Input tokens actually available for document content per chunk.
    pub fn available_input_tokens(&self) -> usize {
        self.max_input_tokens
            .saturating_sub(self.prompt_reserve_tokens)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_input_tokens == 0 {
            return Err("max_input_tokens must be greater than 0".to_string());
        }
        if self.max_output_tokens == 0 {
            return Err("max_output_tokens must be greater than 0".to_string());
        }
        if self.max_retries == 0 {
            return Err("max_retries must be greater than 0".to_string());
        }
        if self.chars_per_token == 0 {
            return Err("chars_per_token must be greater than 0".to_string());
        }
        if self.prompt_reserve_tokens >= self.max_input_tokens {
            return Err("prompt_reserve_tokens cannot exceed max_input_tokens".to_string());
        }
        if !(0.0..=1.0).contains(&self.output_fraction) {
            return Err(format!(
                "output_fraction {} out of range [0.0, 1.0]",
                self.output_fraction
            ));
        }
        if !(0.0..=1.0).contains(&self.oversize_fraction) {
            return Err(format!(
                "oversize_fraction {} out of range [0.0, 1.0]",
                self.oversize_fraction
            ));
        }
        Ok(())
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_budget() {
        let config = EngineConfig {
            max_input_tokens: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_reserve() {
        let config = EngineConfig {
            max_input_tokens: 1000,
            prompt_reserve_tokens: 1000,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_fraction() {
        let config = EngineConfig {
            output_fraction: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_available_input_tokens() {
        let config = EngineConfig {
            max_input_tokens: 10_000,
            prompt_reserve_tokens: 3_000,
            ..Default::default()
        };
        assert_eq!(config.available_input_tokens(), 7_000);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = EngineConfig::default();
        let toml_str = config.to_toml().unwrap();
        let parsed = EngineConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }
}
