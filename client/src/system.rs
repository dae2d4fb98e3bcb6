//! Host facilities the query logic depends on: wall-clock time and the
//! process environment. Both sit behind small traits so tests can age the
//! cache and plant job ids without touching the real process state.

pub trait Clock: Send + Sync {
    /// Current time, unix seconds.
    fn now(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

pub trait Environ: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
}

pub struct SystemEnv;

impl Environ for SystemEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}
