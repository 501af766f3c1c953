use crate::CpuId;

/// Turns a raw CPU identifier into a pin handle
///
/// Called once per identifier, in order, while a selector is being built.
/// Any error aborts construction of that selector.
pub trait PinFactory {
    type Handle;
    type Error: std::error::Error + Send + Sync + 'static;

    fn materialize(&self, cpu_id: CpuId) -> Result<Self::Handle, Self::Error>;
}

impl<H, E, F> PinFactory for F
where
    F: Fn(CpuId) -> Result<H, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Handle = H;
    type Error = E;

    #[inline]
    fn materialize(&self, cpu_id: CpuId) -> Result<H, E> {
        self(cpu_id)
    }
}
