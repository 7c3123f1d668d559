use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only JSONL log of authentication events.
///
/// Credentials are never written; only ids, emails and outcomes.
pub struct Journal {
    pub path: PathBuf,
    file: File,
}

#[derive(Serialize)]
struct Event<'a> {
    ts: DateTime<Utc>,
    #[serde(rename = "type")]
    event_type: &'a str,
    #[serde(flatten)]
    data: serde_json::Value,
}

impl Journal {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn log(&mut self, event_type: &str, data: serde_json::Value) -> Result<()> {
        let event = Event {
            ts: Utc::now(),
            event_type,
            data,
        };
        let line = serde_json::to_string(&event)?;
        writeln!(self.file, "{}", line)?;
        self.file.flush()?;
        Ok(())
    }

    pub fn sign_up(&mut self, user_id: &str, email: &str) -> Result<()> {
        self.log(
            "sign_up",
            serde_json::json!({ "user_id": user_id, "email": email }),
        )
    }

    pub fn sign_in(&mut self, user_id: &str, email: &str) -> Result<()> {
        self.log(
            "sign_in",
            serde_json::json!({ "user_id": user_id, "email": email }),
        )
    }

    /// Log a rejected sign-in. `reason` is an error code, never the password.
    pub fn sign_in_failed(&mut self, email: &str, reason: &str) -> Result<()> {
        self.log(
            "sign_in_failed",
            serde_json::json!({ "email": email, "reason": reason }),
        )
    }

    pub fn sign_out(&mut self, user_id: Option<&str>) -> Result<()> {
        self.log("sign_out", serde_json::json!({ "user_id": user_id }))
    }

    /// Log the outcome of a startup restore
    pub fn session_restored(&mut self, user_id: Option<&str>, verified: bool) -> Result<()> {
        self.log(
            "session_restored",
            serde_json::json!({
                "user_id": user_id,
                "verified": verified,
            }),
        )
    }

    pub fn demo_seeded(&mut self, user_id: &str) -> Result<()> {
        self.log("demo_seeded", serde_json::json!({ "user_id": user_id }))
    }
}
