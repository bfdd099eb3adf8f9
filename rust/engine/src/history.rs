//! Hand history (SPEC_FULL.md §3): JSONL persistence of completed hands,
//! modeled directly on the teacher's `logger::HandLogger` (`next_id`,
//! `write`, date-stamped hand ids) and extended from a fixed two-player
//! `ActionRecord`/`ShowdownInfo` to the arbitrary-seat-count shapes this
//! engine produces, with per-seat showdown rankings alongside the
//! `hand:ended` winners.

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::engine::Street;
use crate::events::WinnerPayload;
use crate::hand::HandRanking;
use crate::player::PlayerAction;

/// One recorded action, in the order it was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub seat: usize,
    pub street: Street,
    pub action: PlayerAction,
}

/// Every seat that reached showdown and the hand it revealed, kept
/// alongside the `hand:ended` winners so a replayed history can show why
/// a hand resolved the way it did (e.g. "flush over straight"), not just
/// who was paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowdownInfo {
    pub revealed: Vec<(usize, HandRanking)>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Complete record of one hand: actions, board, and outcome, serialized
/// to JSONL for replay and analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandRecord {
    pub hand_id: String,
    pub table_id: String,
    pub hand_number: u64,
    pub seed: Option<u64>,
    pub actions: Vec<ActionRecord>,
    pub board: Vec<Card>,
    pub winners: Vec<WinnerPayload>,
    pub pot_total: u32,
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub showdown: Option<ShowdownInfo>,
    #[serde(default)]
    pub aborted_reason: Option<String>,
}

pub fn format_hand_id(yyyymmdd: &str, seq: u64) -> String {
    format!("{yyyymmdd}-{seq:06}")
}

/// Append-only JSONL hand history writer, one record per line.
pub struct HandLogger {
    writer: Option<BufWriter<File>>,
    date: String,
    seq: u64,
}

impl HandLogger {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                let _ = create_dir_all(parent);
            }
        }
        let f = File::create(path)?;
        Ok(Self { writer: Some(BufWriter::new(f)), date: "19700101".to_string(), seq: 0 })
    }

    pub fn with_seq_for_test(date: &str) -> Self {
        Self { writer: None, date: date.to_string(), seq: 0 }
    }

    pub fn next_id(&mut self) -> String {
        self.seq += 1;
        format_hand_id(&self.date, self.seq)
    }

    pub fn write(&mut self, record: &HandRecord) -> std::io::Result<()> {
        let mut rec = record.clone();
        if rec.ts.is_none() {
            rec.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        if let Some(w) = &mut self.writer {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        Ok(())
    }
}
