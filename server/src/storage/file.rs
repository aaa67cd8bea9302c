//! File-backed `UserStore`.
//!
//! Records live in an append-only log, `users.log`, inside the data directory.
//!
//! # Log Record Format
//!
//! One record per line:
//! ```text
//! <crc32 of json, 8 lowercase hex digits>\t<UserRecord as JSON>\n
//! ```
//!
//! # Recovery
//!
//! On open every line is replayed into an in-memory index. A final line that
//! is unterminated or fails its checksum is a torn write from a crash and is
//! truncated away. Any earlier bad line, or a repeated username, is
//! `StoreError::Corrupt`.
//!
//! # Ownership
//!
//! `open` takes an exclusive advisory lock on the log and holds it until the
//! store is dropped. Only one `FileUserStore`, in any process, can own a data
//! directory; every other `open` fails with `StoreError::Locked`. The
//! in-memory index is therefore the only writer's view and the duplicate
//! check against it covers every insert.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use fs2::FileExt;

use super::{InsertOutcome, StoreError, UserRecord, UserStore};

/// File name of the log inside the data directory.
pub const LOG_FILE_NAME: &str = "users.log";

/// Width of the hex checksum prefix.
const CHECKSUM_HEX_LEN: usize = 8;

/// Append handle to the log.
struct LogWriter {
    file: File,
    /// Current length of the log in bytes; also the offset of the next record.
    len: u64,
}

struct Shared {
    writer: Mutex<LogWriter>,
    index: RwLock<HashMap<String, UserRecord>>,
}

/// Durable user store backed by an append-only log.
///
/// # Thread Safety
///
/// Inserts are serialised by the writer mutex, held across the duplicate
/// check, the append and the fsync. The index lock is only taken for a map
/// read or the final map insert, so lookups never wait on disk I/O.
pub struct FileUserStore {
    path: PathBuf,
    shared: Arc<Shared>,
}

impl FileUserStore {
    /// Open (or create) the log in `directory`, lock it, and replay it.
    ///
    /// # Pre-conditions
    /// - `directory` exists.
    ///
    /// # Errors
    /// - `StoreError::Locked` if another store already owns the log.
    /// - `StoreError::Io` on I/O failure.
    /// - `StoreError::Corrupt` if a non-final record is invalid.
    pub fn open(directory: &Path) -> Result<Self, StoreError> {
        let path = directory.join(LOG_FILE_NAME);
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)?;

        if let Err(e) = file.try_lock_exclusive() {
            if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() {
                return Err(StoreError::Locked { path });
            }
            return Err(e.into());
        }

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;

        let (index, valid_len) = replay(&contents)?;
        let valid_len = valid_len as u64;
        if valid_len < contents.len() as u64 {
            tracing::warn!(
                "Truncating torn tail of {}: {} bytes discarded",
                path.display(),
                contents.len() as u64 - valid_len
            );
            file.set_len(valid_len)?;
            file.sync_all()?;
        }

        tracing::info!(
            "Opened user log {}: {} records",
            path.display(),
            index.len()
        );

        Ok(Self {
            path,
            shared: Arc::new(Shared {
                writer: Mutex::new(LogWriter {
                    file,
                    len: valid_len,
                }),
                index: RwLock::new(index),
            }),
        })
    }

    /// Path of the underlying log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl UserStore for FileUserStore {
    #[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected
    async fn insert_if_absent(&self, record: UserRecord) -> Result<InsertOutcome, StoreError> {
        let shared = Arc::clone(&self.shared);
        tokio::task::spawn_blocking(move || append_if_absent(&shared, record))
            .await
            .map_err(|e| StoreError::Io(std::io::Error::other(e.to_string())))?
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let index = self
            .shared
            .index
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        Ok(index.get(username).cloned())
    }
}

fn append_if_absent(shared: &Shared, record: UserRecord) -> Result<InsertOutcome, StoreError> {
    let mut writer = shared.writer.lock().map_err(|_| StoreError::LockPoisoned)?;

    let taken = shared
        .index
        .read()
        .map_err(|_| StoreError::LockPoisoned)?
        .contains_key(&record.username);
    if taken {
        return Ok(InsertOutcome::Conflict);
    }

    let line = encode_line(&record)?;
    let previous_len = writer.len;
    if let Err(e) = write_durably(&mut writer.file, &line) {
        // Drop any partial line so the next append starts on a clean boundary.
        if let Err(truncate_err) = writer.file.set_len(previous_len) {
            tracing::error!("Failed to roll back partial user log write: {truncate_err}");
        }
        return Err(e.into());
    }
    writer.len = previous_len + line.len() as u64;

    // The record is durable; the index must reflect it even after a poisoning panic.
    shared
        .index
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(record.username.clone(), record);
    Ok(InsertOutcome::Created)
}

fn write_durably(file: &mut File, line: &[u8]) -> std::io::Result<()> {
    file.write_all(line)?;
    file.sync_data()
}

fn encode_line(record: &UserRecord) -> Result<Vec<u8>, StoreError> {
    let json = serde_json::to_vec(record)
        .map_err(|e| StoreError::Io(std::io::Error::other(e.to_string())))?;
    let checksum = crc32fast::hash(&json);

    let mut line = Vec::with_capacity(CHECKSUM_HEX_LEN + 1 + json.len() + 1);
    line.extend_from_slice(format!("{checksum:08x}\t").as_bytes());
    line.extend_from_slice(&json);
    line.push(b'\n');
    Ok(line)
}

fn decode_line(line: &[u8]) -> Result<UserRecord, String> {
    if line.len() <= CHECKSUM_HEX_LEN || line[CHECKSUM_HEX_LEN] != b'\t' {
        return Err("missing checksum prefix".to_string());
    }
    let (prefix, rest) = line.split_at(CHECKSUM_HEX_LEN);
    let json = &rest[1..];

    let stored = std::str::from_utf8(prefix)
        .ok()
        .and_then(|hex| u32::from_str_radix(hex, 16).ok())
        .ok_or_else(|| "checksum is not hex".to_string())?;
    let computed = crc32fast::hash(json);
    if stored != computed {
        return Err(format!(
            "checksum mismatch (stored {stored:08x}, computed {computed:08x})"
        ));
    }

    serde_json::from_slice(json).map_err(|e| format!("invalid record: {e}"))
}

/// Replay log contents into an index.
///
/// Returns the index and the byte length of the valid prefix.
fn replay(contents: &[u8]) -> Result<(HashMap<String, UserRecord>, usize), StoreError> {
    let mut index = HashMap::new();
    let mut offset = 0;
    let mut line_number = 0;

    while offset < contents.len() {
        line_number += 1;
        let remaining = &contents[offset..];
        let Some(newline) = remaining.iter().position(|b| *b == b'\n') else {
            // Unterminated final line: torn write.
            break;
        };
        let is_last = offset + newline + 1 == contents.len();

        match decode_line(&remaining[..newline]) {
            Ok(record) => {
                if index.contains_key(&record.username) {
                    return Err(StoreError::Corrupt {
                        line: line_number,
                        reason: format!("duplicate username '{}'", record.username),
                    });
                }
                index.insert(record.username.clone(), record);
            }
            Err(_) if is_last => break,
            Err(reason) => {
                return Err(StoreError::Corrupt {
                    line: line_number,
                    reason,
                });
            }
        }
        offset += newline + 1;
    }

    Ok((index, offset))
}
