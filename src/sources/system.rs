/*
 *  sources/system.rs
 *
 *  MirrorS - on the wall
 *	(c) 2020-26 Stuart Hunter
 *
 *	TODO:
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
//! Host health figures from /proc and /sys. Every reader degrades to 0 on a
//! missing file or bad value, so the widget still renders on non-Linux hosts.

use std::fs;
use std::io;

use super::{Content, DataSource, FetchFuture, Settings};

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SystemSnapshot {
    pub cpu_load_pct: f64,
    pub cpu_temp_c: f64,
    pub mem_used_pct: f64,
    pub uptime_hours: f64,
}

/// Reads the first whitespace-delimited float from a file.
fn read_first_float(path: &str) -> io::Result<f64> {
    let content = fs::read_to_string(path)?;
    let first_word = content.split_whitespace().next().unwrap_or("0.0");
    first_word
        .parse::<f64>()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// 1-minute load average as a percentage. 0.0 on error.
fn cpu_load() -> f64 {
    match read_first_float("/proc/loadavg") {
        Ok(loadavg) => 100.0 * loadavg,
        Err(_) => 0.0,
    }
}

/// First thermal zone, millidegrees to Celsius. 0.0 on error.
fn cpu_temp() -> f64 {
    match read_first_float("/sys/class/thermal/thermal_zone0/temp") {
        Ok(millideg) => millideg / 1000.0,
        Err(_) => 0.0,
    }
}

/// Uptime in hours. 0.0 on error.
fn uptime_hours() -> f64 {
    match read_first_float("/proc/uptime") {
        Ok(uptime_seconds) => uptime_seconds / 3600.0,
        Err(_) => 0.0,
    }
}

pub(crate) fn mem_used_pct_from(meminfo: &str) -> f64 {
    let mut total = 0u64;
    let mut avail = 0u64;
    for line in meminfo.lines() {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("MemTotal:") => total = parts.next().and_then(|v| v.parse().ok()).unwrap_or(0),
            Some("MemAvailable:") => avail = parts.next().and_then(|v| v.parse().ok()).unwrap_or(0),
            _ => {}
        }
    }
    if total == 0 {
        return 0.0;
    }
    (total.saturating_sub(avail) as f64 / total as f64) * 100.0
}

fn mem_used_pct() -> f64 {
    match fs::read_to_string("/proc/meminfo") {
        Ok(content) => mem_used_pct_from(&content),
        Err(_) => 0.0,
    }
}

pub(crate) fn snapshot() -> SystemSnapshot {
    SystemSnapshot {
        cpu_load_pct: cpu_load(),
        cpu_temp_c: cpu_temp(),
        mem_used_pct: mem_used_pct(),
        uptime_hours: uptime_hours(),
    }
}

pub(crate) fn snapshot_lines(s: &SystemSnapshot) -> Vec<String> {
    vec![
        format!("CPU: {:.0}%", s.cpu_load_pct),
        format!("Temp: {:.0}\u{00b0}C", s.cpu_temp_c),
        format!("Mem: {:.0}%", s.mem_used_pct),
        format!("Up: {:.1}h", s.uptime_hours),
    ]
}

pub struct SystemSource;

impl DataSource for SystemSource {
    fn fetch<'a>(&'a self, _settings: &'a Settings) -> FetchFuture<'a> {
        Box::pin(async move { Ok(Content::new(snapshot_lines(&snapshot()))) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mem_percentage_from_meminfo() {
        let meminfo = "MemTotal:       16384000 kB\nMemFree:         1024000 kB\nMemAvailable:    8192000 kB\nBuffers:          512000 kB\n";
        let pct = mem_used_pct_from(meminfo);
        assert!((pct - 50.0).abs() < 0.01, "got {pct}");
    }

    #[test]
    fn missing_fields_read_as_zero() {
        assert_eq!(mem_used_pct_from("SwapTotal: 0 kB\n"), 0.0);
        assert_eq!(mem_used_pct_from(""), 0.0);
    }

    #[test]
    fn snapshot_formats_four_lines() {
        let s = SystemSnapshot {
            cpu_load_pct: 42.4,
            cpu_temp_c: 51.7,
            mem_used_pct: 63.2,
            uptime_hours: 12.34,
        };
        assert_eq!(
            snapshot_lines(&s),
            vec!["CPU: 42%", "Temp: 52\u{00b0}C", "Mem: 63%", "Up: 12.3h"]
        );
    }
}
