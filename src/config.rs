//! Konfigurasi pipe

use crate::error::{PipeError, Result};

/// Kapasitas minimum: satu slot selalu kosong untuk membedakan empty vs full
pub const MIN_CAPACITY: usize = 2;
/// Kapasitas awal device
pub const DEFAULT_CAPACITY: usize = 256;
/// Batas administratif untuk resize
pub const DEFAULT_MAX_CAPACITY: usize = 1024;

/// Pipe configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipeConfig {
    /// Ukuran storage saat device dibuat
    pub initial_capacity: usize,
    /// Ukuran terbesar yang diterima `resize`
    pub max_capacity: usize,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            max_capacity: DEFAULT_MAX_CAPACITY,
        }
    }
}

impl PipeConfig {
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_max_capacity(mut self, max: usize) -> Self {
        self.max_capacity = max;
        self
    }

    /// Cek `MIN_CAPACITY <= initial_capacity <= max_capacity`
    pub fn validate(&self) -> Result<()> {
        if self.max_capacity < MIN_CAPACITY {
            return Err(PipeError::invalid(
                "max_capacity",
                format!("must be at least {}", MIN_CAPACITY),
            ));
        }
        self.check_capacity(self.initial_capacity)
            .map_err(|_| {
                PipeError::invalid(
                    "initial_capacity",
                    format!(
                        "{} outside {}..={}",
                        self.initial_capacity, MIN_CAPACITY, self.max_capacity
                    ),
                )
            })
    }

    /// Bound check yang dipakai resize, ioctl dan admin file
    pub fn check_capacity(&self, capacity: usize) -> Result<()> {
        if capacity < MIN_CAPACITY || capacity > self.max_capacity {
            return Err(PipeError::invalid(
                "capacity",
                format!(
                    "{} outside {}..={}",
                    capacity, MIN_CAPACITY, self.max_capacity
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipeConfig::default();
        assert_eq!(config.initial_capacity, 256);
        assert_eq!(config.max_capacity, 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_capacity_bounds() {
        let config = PipeConfig::default();
        assert!(config.check_capacity(0).is_err());
        assert!(config.check_capacity(1).is_err());
        assert!(config.check_capacity(2).is_ok());
        assert!(config.check_capacity(1024).is_ok());
        assert!(config.check_capacity(1025).is_err());
    }

    #[test]
    fn test_initial_above_max_rejected() {
        let config = PipeConfig::default()
            .with_initial_capacity(2048)
            .with_max_capacity(1024);
        assert!(matches!(
            config.validate(),
            Err(PipeError::InvalidArgument {
                parameter: "initial_capacity",
                ..
            })
        ));
    }
}
