use std::time::Duration;

use super::GetNow;

pub trait GetElapsed: GetNow {
    /// Never negative: implementations saturate at [`Duration::ZERO`].
    fn elapsed(&self, since: Self::Instant) -> Duration;
}
