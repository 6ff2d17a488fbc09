use core::future::Future;

/// One-shot delays, as provided by the system timer.
///
/// The driver uses these for the per-transfer timeout and for the two
/// bring-up sleeps. Any `Fn(usize) -> Future<Output = ()>` qualifies,
/// so a plain function works:
///
/// ```
/// use ds34_usb_host::delay::DelayMs;
/// use futures::future;
///
/// fn no_delay(_ms: usize) -> impl core::future::Future<Output = ()> {
///     future::ready(())
/// }
///
/// fn takes_delay(_d: impl DelayMs) {}
/// takes_delay(no_delay);
/// ```
pub trait DelayMs {
    fn delay_ms(&self, ms: usize) -> impl Future<Output = ()>;
}

impl<F, Fut> DelayMs for F
where
    F: Fn(usize) -> Fut,
    Fut: Future<Output = ()>,
{
    fn delay_ms(&self, ms: usize) -> impl Future<Output = ()> {
        self(ms)
    }
}
