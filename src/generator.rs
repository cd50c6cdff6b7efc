//! End-to-end generation pipeline.
//!
//! configuration → Gloria model → slot timing table → protocol constants →
//! artifact set → rendered pair. Every stage is fallible and nothing is
//! rendered unless all earlier stages succeeded.

use crate::config::{ConfigError, LwbConfig};
use crate::emit::{self, ArtifactPair, ArtifactSet, ConsistencyError, WrittenPair};
use crate::gloria::GloriaModel;
use crate::lwb::{ProtocolConstants, RangeError, SlotTimingTable};
use crate::radio::TimingModel;
use log::{debug, info};
use std::fmt;
use std::io;
use std::path::Path;

/// Everything one generation run produced.
#[derive(Debug, Clone)]
pub struct Generated {
    pub fingerprint: String,
    pub model: GloriaModel,
    pub table: SlotTimingTable,
    pub constants: ProtocolConstants,
    pub artifacts: ArtifactSet,
    pub pair: ArtifactPair,
}

/// Compute and render the artifact pair for `config`.
pub fn generate<T: TimingModel + ?Sized>(
    config: &LwbConfig,
    timing: &T,
) -> Result<Generated, GenerateError> {
    let fingerprint = config.fingerprint()?;
    debug!("Configuration fingerprint {}", fingerprint);

    let model = GloriaModel::new(config)?;
    let table = SlotTimingTable::build(config, &model, timing)?;
    let constants = ProtocolConstants::derive(config, &model, &table)?;
    info!(
        "Derived constants for {} modulations, max data payload {} bytes",
        constants.mod_count, constants.max_data_payload
    );

    let artifacts = emit::collect(&constants, &model, &table);
    artifacts.verify()?;
    let pair = emit::render(&artifacts, &fingerprint);

    Ok(Generated {
        fingerprint,
        model,
        table,
        constants,
        artifacts,
        pair,
    })
}

/// Generate and write the pair into `dir`.
pub fn generate_to<T: TimingModel + ?Sized>(
    config: &LwbConfig,
    timing: &T,
    dir: &Path,
) -> Result<WrittenPair, GenerateError> {
    let generated = generate(config, timing)?;
    Ok(emit::write_pair(&generated.pair, dir)?)
}

/// Any failure of a generation run.
#[derive(Debug)]
pub enum GenerateError {
    Config(ConfigError),
    Range(RangeError),
    Consistency(ConsistencyError),
    Io(io::Error),
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid configuration: {}", e),
            Self::Range(e) => write!(f, "value out of range: {}", e),
            Self::Consistency(e) => write!(f, "inconsistent artifacts: {}", e),
            Self::Io(e) => write!(f, "output failed: {}", e),
        }
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Range(e) => Some(e),
            Self::Consistency(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<ConfigError> for GenerateError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<RangeError> for GenerateError {
    fn from(e: RangeError) -> Self {
        Self::Range(e)
    }
}

impl From<ConsistencyError> for GenerateError {
    fn from(e: ConsistencyError) -> Self {
        Self::Consistency(e)
    }
}

impl From<io::Error> for GenerateError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RadioLatencies;
    use crate::emit::ElementType;
    use crate::radio::Sx1262Timing;
    use std::env;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

    fn unique_dir() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let pid = std::process::id();
        env::temp_dir().join(format!("lwb-constgen-generate-{}-{}", pid, id))
    }

    /// Count the values of `name` in the rendered source.
    fn emitted_count(source: &str, name: &str) -> usize {
        let start = source
            .find(&format!(" {}[", name))
            .unwrap_or_else(|| panic!("{} not defined", name));
        let body_start = start + source[start..].find('{').unwrap();
        let body_end = body_start + source[body_start..].find("};").unwrap();
        source[body_start..body_end]
            .lines()
            .map(|line| match line.find("/*") {
                Some(i) => &line[..i],
                None => line,
            })
            .flat_map(|line| line.split([',', '{', '}']))
            .filter(|token| !token.trim().is_empty())
            .count()
    }

    // ==================== Pipeline Tests ====================

    #[test]
    fn test_default_generation() {
        let generated = generate(&LwbConfig::default(), &Sx1262Timing).unwrap();
        assert_eq!(generated.constants.mod_count, 4);
        assert!(generated.pair.header.contains("#define LWB_MOD_COUNT 4\n"));
        assert!(generated.pair.header.contains(&generated.fingerprint));
        assert!(generated.pair.source.contains(&generated.fingerprint));
    }

    #[test]
    fn test_generation_is_reproducible() {
        let first = generate(&LwbConfig::default(), &Sx1262Timing).unwrap();
        let second = generate(&LwbConfig::default(), &Sx1262Timing).unwrap();
        assert_eq!(first.pair, second.pair);
    }

    #[test]
    fn test_different_config_different_fingerprint() {
        let other = LwbConfig {
            gloria_hop_counts: vec![1, 2, 3, 4],
            ..Default::default()
        };
        let a = generate(&LwbConfig::default(), &Sx1262Timing).unwrap();
        let b = generate(&other, &Sx1262Timing).unwrap();
        assert_ne!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn test_emitted_counts_match_declarations() {
        let generated = generate(&LwbConfig::default(), &Sx1262Timing).unwrap();
        let source = &generated.pair.source;

        assert_eq!(emitted_count(source, "lwb_modulations"), 4);
        assert_eq!(emitted_count(source, "lwb_powers"), 2);
        assert_eq!(emitted_count(source, "lwb_sync_slot_times"), 4);
        assert_eq!(emitted_count(source, "lwb_slot_times"), 4 * 256);
        assert_eq!(emitted_count(source, "lwb_slot_acked_times"), 4 * 256);
    }

    #[test]
    fn test_every_declaration_defined() {
        let generated = generate(&LwbConfig::default(), &Sx1262Timing).unwrap();
        for declaration in generated.artifacts.declarations() {
            let declared = format!(
                "extern const {} {}[",
                declaration.element_type.c_name(),
                declaration.name
            );
            let defined = format!(
                "\nconst {} {}[",
                declaration.element_type.c_name(),
                declaration.name
            );
            assert!(generated.pair.header.contains(&declared), "{}", declaration.name);
            assert!(generated.pair.source.contains(&defined), "{}", declaration.name);
        }
    }

    // ==================== Error Tests ====================

    #[test]
    fn test_misaligned_power_levels() {
        let config = LwbConfig {
            modulations: vec![3, 5, 9],
            gloria_default_power_levels: vec![0, 1],
            gloria_retransmission_counts: vec![1, 2, 2],
            gloria_hop_counts: vec![1, 2, 3],
            slot_counts: vec![4, 6, 32],
            ..Default::default()
        };
        assert!(matches!(
            generate(&config, &Sx1262Timing),
            Err(GenerateError::Config(ConfigError::LengthMismatch { .. }))
        ));
    }

    #[test]
    fn test_tiny_slot_type() {
        let config = LwbConfig {
            slot_time_type: ElementType::U8,
            ..Default::default()
        };
        assert!(matches!(
            generate(&config, &Sx1262Timing),
            Err(GenerateError::Range(RangeError::SlotTooLarge { .. }))
        ));
    }

    #[test]
    fn test_oversized_latency_is_range_error() {
        let config = LwbConfig {
            latencies: RadioLatencies {
                wakeup_ns: u64::MAX,
                sleep_ns: 1,
                ..RadioLatencies::zero()
            },
            ..Default::default()
        };
        assert!(matches!(
            generate(&config, &Sx1262Timing),
            Err(GenerateError::Range(RangeError::SlotOverflow { .. }))
        ));
    }

    // ==================== Output Tests ====================

    #[test]
    fn test_generate_to_writes_pair() {
        let dir = unique_dir();
        let written = generate_to(&LwbConfig::default(), &Sx1262Timing, &dir).unwrap();

        let header = fs::read_to_string(&written.header).unwrap();
        let source = fs::read_to_string(&written.source).unwrap();
        assert!(header.contains("#ifndef LWB_CONSTANTS_H"));
        assert!(source.contains("#include \"lwb_constants.h\""));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_failed_generation_writes_nothing() {
        let dir = unique_dir();
        let config = LwbConfig {
            modulations: Vec::new(),
            ..Default::default()
        };
        assert!(generate_to(&config, &Sx1262Timing, &dir).is_err());
        assert!(!dir.exists());
    }

    #[test]
    fn test_error_display() {
        let error = GenerateError::from(ConfigError::ZeroGranularity);
        assert!(error.to_string().starts_with("invalid configuration"));
    }
}
