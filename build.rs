//! Stamps the build date and time shown in the CLI banner.

use time::format_description;
use time::OffsetDateTime;

/// `SOURCE_DATE_EPOCH` pins the clock for reproducible builds.
fn build_instant() -> OffsetDateTime {
    std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
        .unwrap_or_else(OffsetDateTime::now_utc)
}

/// Export `var` to the crate, formatted from `when` unless already set.
fn stamp(var: &str, when: OffsetDateTime, pattern: &str) {
    println!("cargo:rerun-if-env-changed={var}");
    let value = std::env::var(var).unwrap_or_else(|_| {
        format_description::parse(pattern)
            .ok()
            .and_then(|fmt| when.format(&fmt).ok())
            .unwrap_or_else(|| "unknown".to_string())
    });
    println!("cargo:rustc-env={var}={value}");
}

fn main() {
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
    let when = build_instant();
    stamp("TRITRACE_BUILD_DATE", when, "[year]-[month]-[day]");
    stamp("TRITRACE_BUILD_TIME", when, "[hour]:[minute]:[second] UTC");
}
