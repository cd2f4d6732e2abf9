//! Flash context - configuration and runtime state for flash operations

use crate::regs::HOST_SHARE_MEM_BASE;

/// Driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DriverConfig {
    /// Upper bound on completion and busy polls
    ///
    /// `None` polls until the module answers, which hangs the caller if the
    /// module never does. The ID probe is bounded regardless.
    pub poll_limit: Option<u32>,
    /// Add the legacy +10 byte offset to sector erase addresses
    pub legacy_erase_offset: bool,
    /// Module address of the shared memory used as DMA bounce buffer
    pub shared_mem_base: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            poll_limit: None,
            legacy_erase_offset: false,
            shared_mem_base: HOST_SHARE_MEM_BASE,
        }
    }
}

impl DriverConfig {
    /// Bound every poll to `polls` reads
    pub fn with_poll_limit(mut self, polls: u32) -> Self {
        self.poll_limit = Some(polls);
        self
    }

    /// Enable or disable the +10 byte sector erase offset
    pub fn with_legacy_erase_offset(mut self, enabled: bool) -> Self {
        self.legacy_erase_offset = enabled;
        self
    }

    /// Use a different shared memory window
    pub fn with_shared_mem_base(mut self, base: u32) -> Self {
        self.shared_mem_base = base;
        self
    }
}

/// Runtime context for flash operations
///
/// Holds the configuration and the one piece of state that survives
/// between calls: the flash size, once a probe succeeded.
#[derive(Debug, Clone, Default)]
pub struct FlashContext {
    /// Driver configuration
    pub config: DriverConfig,
    /// Cached size in Mbit, 0 until a probe succeeds
    size_mbit: u32,
}

impl FlashContext {
    /// Create a new context with the given configuration
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config,
            size_mbit: 0,
        }
    }

    /// Poll limit to pass to the protocol layer
    pub fn poll_limit(&self) -> Option<u32> {
        self.config.poll_limit
    }

    /// Cached flash size in Mbit, if a probe already succeeded
    pub fn cached_size(&self) -> Option<u32> {
        (self.size_mbit != 0).then_some(self.size_mbit)
    }

    /// Remember a successfully probed size
    pub fn set_size(&mut self, size_mbit: u32) {
        self.size_mbit = size_mbit;
    }
}
