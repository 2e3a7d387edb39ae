use crate::mutation::Method;
use std::cell::Cell;

thread_local! {
    static CAMPAIGN: Cell<Option<Method>> = Cell::new(None);
}

#[inline]
pub fn set_campaign(method: Option<Method>) {
    CAMPAIGN.with(|r| r.set(method));
}

#[inline]
pub fn campaign_name() -> &'static str {
    CAMPAIGN.with(|r| r.get().map_or("main", |m| m.name()))
}

#[macro_export]
macro_rules! campaign_trace {
    ($t: tt) => (
        log::trace!(std::concat!("{}: ", $t), $crate::campaign_log::campaign_name())
    );
    ($t: tt, $($arg:tt)*) => (
        log::trace!(std::concat!("{}: ", $t), $crate::campaign_log::campaign_name(), $($arg)*)
    )
}

#[macro_export]
macro_rules! campaign_debug {
    ($t: tt) => (
        log::debug!(std::concat!("{}: ", $t), $crate::campaign_log::campaign_name())
    );
    ($t: tt, $($arg:tt)*) => (
        log::debug!(std::concat!("{}: ", $t), $crate::campaign_log::campaign_name(), $($arg)*)
    )
}

#[macro_export]
macro_rules! campaign_info {
    ($t: tt) => (
        log::info!(std::concat!("{}: ", $t), $crate::campaign_log::campaign_name())
    );
    ($t: tt, $($arg:tt)*) => (
        log::info!(std::concat!("{}: ", $t), $crate::campaign_log::campaign_name(), $($arg)*)
    )
}

#[macro_export]
macro_rules! campaign_warn {
    ($t: tt) => (
        log::warn!(std::concat!("{}: ", $t), $crate::campaign_log::campaign_name())
    );
    ($t: tt, $($arg:tt)*) => (
        log::warn!(std::concat!("{}: ", $t), $crate::campaign_log::campaign_name(), $($arg)*)
    )
}
