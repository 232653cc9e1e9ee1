//! One module per subcommand. Every handler takes its parsed args, the
//! resolved output mode, and the project root; loads the session, acts,
//! and saves.

pub mod cdu;
pub mod comment;
pub mod commit;
pub mod discard;
pub mod export;
pub mod import;
pub mod init;
pub mod list;
pub mod pending;
pub mod stats;
pub mod version;

/// Current wall-clock time in microseconds, the timestamp unit used by
/// audit history and pending-change records.
pub fn now_us() -> i64 {
    chrono::Utc::now().timestamp_micros()
}
