/// Uses an associated type so each implementation can define its own
/// instant representation (`std::time::Instant` for production,
/// a `Duration` offset for testing).
///
/// Instants are `Send + Sync` so they can be stored in caches shared
/// between tasks.
pub trait GetNow {
    type Instant: Copy + Send + Sync + 'static;

    fn now(&self) -> Self::Instant;
}
