use core_affinity::CoreId;
use pin_selector::CpuId;
use pin_selector::CpuPin;
use pin_selector::PinFactory;
use tracing::debug;
use tracing::warn;

use crate::errors::AffinityError;

/// Materializes CPU ids into `core_affinity` core handles
///
/// Only ids present in the core list captured at creation are accepted.
pub struct CoreAffinityFactory {
    cores: Vec<CoreId>,
}

impl Default for CoreAffinityFactory {
    fn default() -> Self {
        Self::detect()
    }
}

impl CoreAffinityFactory {
    /// Capture the cores this process may run on
    pub fn detect() -> Self {
        let cores = core_affinity::get_core_ids().unwrap_or_default();
        if cores.is_empty() {
            warn!("Could not get CPU core IDs, every configured CPU will be rejected");
        } else {
            debug!("Detected {} CPU cores", cores.len());
        }
        Self { cores }
    }

    pub fn with_cores(cores: Vec<CoreId>) -> Self {
        Self { cores }
    }
}

impl PinFactory for CoreAffinityFactory {
    type Handle = CoreId;
    type Error = AffinityError;

    fn materialize(&self, cpu_id: CpuId) -> Result<CoreId, AffinityError> {
        let id = usize::try_from(cpu_id).map_err(|_| AffinityError::NegativeCpu(cpu_id))?;

        self.cores
            .iter()
            .find(|core| core.id == id)
            .copied()
            .ok_or(AffinityError::UnknownCpu { cpu_id, available: self.cores.len() })
    }
}

/// Bind the calling thread to the pinned core; a no-op pin binds nothing
pub fn apply_pin(pin: CpuPin<&CoreId>) -> bool {
    match pin {
        CpuPin::Noop => false,
        CpuPin::Cpu(core_id) => {
            if core_affinity::set_for_current(*core_id) {
                debug!("Pinned thread to core {}", core_id.id);
                true
            } else {
                warn!("Failed to pin thread to core {}", core_id.id);
                false
            }
        }
    }
}

/// Ids of every core this process may run on, as reported by `core_affinity`
///
/// Under a restricted CPU set (e.g. `taskset -c 2-3`) this is `[2, 3]`, not `[0, 1]`.
pub fn default_cpu_ids() -> Vec<CpuId> {
    core_affinity::get_core_ids()
        .unwrap_or_default()
        .into_iter()
        .filter_map(|core| CpuId::try_from(core.id).ok())
        .collect()
}
