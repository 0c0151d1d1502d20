//! Peak-memory reporting via a `/proc/self/status` read on Linux.
//! `getrusage`-style peak-RSS units differ across platforms (KiB on
//! Linux, bytes on macOS) and Rust has no portable equivalent in `std`,
//! so this reports `None` anywhere other than Linux rather than guessing.

/// Peak resident set size in MiB, or `None` on platforms where this isn't
/// implemented.
#[cfg(target_os = "linux")]
pub fn peak_rss_mib() -> Option<f64> {
  let status = std::fs::read_to_string("/proc/self/status").ok()?;
  for line in status.lines() {
    if let Some(rest) = line.strip_prefix("VmHWM:") {
      let kib: f64 = rest.trim().trim_end_matches("kB").trim().parse().ok()?;
      return Some(kib / 1024.0);
    }
  }
  None
}

#[cfg(not(target_os = "linux"))]
pub fn peak_rss_mib() -> Option<f64> {
  None
}
