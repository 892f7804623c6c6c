//! Fault reporting for invariant violations.
//!
//! Every bounds or capacity check in the crate goes through [`raise`]. What
//! happens next is configuration, not a build flag:
//!
//! ```text
//!   check!(cond) fails
//!          │
//!          ▼
//!   scoped sink (this thread)? ──yes──► sink(&fault), caller bails out
//!          │ no
//!          ▼
//!   process-wide sink?         ──yes──► sink(&fault), caller bails out
//!          │ no
//!          ▼
//!   FaultPolicy: Panic (default) │ Abort │ Log
//! ```
//!
//! The initial policy is read once from `RMEMKIT_FAULT_POLICY`.

use std::{
  cell::Cell,
  fmt,
  panic::Location,
  sync::{
    PoisonError, RwLock,
    atomic::{AtomicU8, Ordering},
  },
};

/// Environment variable holding the initial [`FaultPolicy`].
pub const POLICY_ENV: &str = "RMEMKIT_FAULT_POLICY";

/// Everything known about a failed check.
#[derive(Debug, Clone, Copy)]
pub struct Fault<'a> {
  pub expression: &'a str,
  pub message: Option<&'a str>,
  /// Where the check lives, usually a module path.
  pub name: Option<&'a str>,
  pub location: Option<&'static Location<'static>>,
}

impl fmt::Display for Fault<'_> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "Assertion failed: {}", self.expression)?;
    if let Some(message) = self.message {
      write!(f, "\nMessage: {message}")?;
    }
    if let Some(name) = self.name {
      write!(f, "\nName: {name}")?;
    }
    if let Some(location) = self.location {
      write!(
        f,
        "\nLocation: {}:{}:{}",
        location.file(),
        location.line(),
        location.column()
      )?;
    }
    Ok(())
  }
}

/// A fault handler. Returning from it lets the failing operation bail out.
pub type FaultSink = fn(&Fault<'_>);

/// What to do with a fault when no sink is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPolicy {
  /// Log at error level, then panic with the fault text.
  Panic,
  /// Log at error level, then abort the process.
  Abort,
  /// Log at error level and let the operation bail out.
  Log,
}

impl FaultPolicy {
  pub fn parse(value: &str) -> Option<Self> {
    match value.trim().to_ascii_lowercase().as_str() {
      "panic" => Some(Self::Panic),
      "abort" => Some(Self::Abort),
      "log" => Some(Self::Log),
      _ => None,
    }
  }

  fn to_u8(self) -> u8 {
    match self {
      Self::Panic => 1,
      Self::Abort => 2,
      Self::Log => 3,
    }
  }

  fn from_u8(value: u8) -> Option<Self> {
    match value {
      1 => Some(Self::Panic),
      2 => Some(Self::Abort),
      3 => Some(Self::Log),
      _ => None,
    }
  }
}

static POLICY: AtomicU8 = AtomicU8::new(0);
static SINK: RwLock<Option<FaultSink>> = RwLock::new(None);

thread_local! {
  static SCOPED_SINK: Cell<Option<FaultSink>> = const { Cell::new(None) };
}

/// Current policy; the first call reads [`POLICY_ENV`].
pub fn fault_policy() -> FaultPolicy {
  if let Some(policy) = FaultPolicy::from_u8(POLICY.load(Ordering::Relaxed)) {
    return policy;
  }
  let policy = policy_from_env(std::env::var(POLICY_ENV).ok().as_deref());
  let _ = POLICY.compare_exchange(0, policy.to_u8(), Ordering::Relaxed, Ordering::Relaxed);
  FaultPolicy::from_u8(POLICY.load(Ordering::Relaxed)).unwrap_or(policy)
}

/// Policy for a raw [`POLICY_ENV`] value; unset or unknown means `Panic`.
fn policy_from_env(value: Option<&str>) -> FaultPolicy {
  let Some(value) = value else {
    return FaultPolicy::Panic;
  };
  FaultPolicy::parse(value).unwrap_or_else(|| {
    log::warn!("ignoring unknown {POLICY_ENV}={value:?}");
    FaultPolicy::Panic
  })
}

pub fn set_fault_policy(policy: FaultPolicy) {
  POLICY.store(policy.to_u8(), Ordering::Relaxed);
}

/// Installs (or with `None`, removes) the process-wide sink. Returns the previous one.
pub fn set_fault_sink(sink: Option<FaultSink>) -> Option<FaultSink> {
  let mut slot = SINK.write().unwrap_or_else(PoisonError::into_inner);
  std::mem::replace(&mut *slot, sink)
}

/// Runs `f` with `sink` handling every fault raised on this thread.
pub fn with_fault_sink<R>(
  sink: FaultSink,
  f: impl FnOnce() -> R,
) -> R {
  struct Restore(Option<FaultSink>);

  impl Drop for Restore {
    fn drop(&mut self) {
      SCOPED_SINK.with(|scoped| scoped.set(self.0));
    }
  }

  let _restore = Restore(SCOPED_SINK.with(|scoped| scoped.replace(Some(sink))));
  f()
}

/// Routes `fault` to the active sink or policy.
pub fn raise(fault: &Fault<'_>) {
  if let Some(sink) = SCOPED_SINK.with(Cell::get) {
    sink(fault);
    return;
  }

  let global = *SINK.read().unwrap_or_else(PoisonError::into_inner);
  if let Some(sink) = global {
    sink(fault);
    return;
  }

  log::error!("{fault}");
  match fault_policy() {
    FaultPolicy::Panic => panic!("{fault}"),
    FaultPolicy::Abort => std::process::abort(),
    FaultPolicy::Log => {}
  }
}

/// Raises a fault located at the caller.
#[track_caller]
pub fn fail(
  expression: &str,
  message: Option<&str>,
  name: Option<&str>,
) {
  raise(&Fault {
    expression,
    message,
    name,
    location: Some(Location::caller()),
  });
}

/// Raises a fault for a violation the caller cannot recover from.
///
/// If the sink or policy returns, this panics anyway.
#[track_caller]
pub fn fatal(
  expression: &str,
  message: &str,
) -> ! {
  fail(expression, Some(message), None);
  panic!("{expression}: {message}");
}

/// Evaluates a condition, raising a fault when it is false.
///
/// The macro yields the condition so the caller can bail out:
///
/// ```rust
/// use rmemkit::check;
///
/// fn halve(n: usize) -> usize {
///   if !check!(n % 2 == 0, "odd input") {
///     return 0;
///   }
///   n / 2
/// }
///
/// assert_eq!(halve(8), 4);
/// ```
#[macro_export]
macro_rules! check {
  ($cond:expr $(,)?) => {{
    let ok: bool = $cond;
    if !ok {
      $crate::diag::fail(stringify!($cond), None, Some(module_path!()));
    }
    ok
  }};
  ($cond:expr, $message:expr $(,)?) => {{
    let ok: bool = $cond;
    if !ok {
      $crate::diag::fail(stringify!($cond), Some($message), Some(module_path!()));
    }
    ok
  }};
}
