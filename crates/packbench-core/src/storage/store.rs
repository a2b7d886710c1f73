use crate::model::{MachineContext, PhaseStats, RunResult, TestSpec};
use anyhow::Context;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Durable result table. One writer per invocation; external notebook reads
/// are isolated at SQLite's commit boundary. Each upsert autocommits, which
/// is what makes a crash lose at most the in-flight test.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

pub struct StoreStats {
    pub tests: Option<u64>,
    pub results: Option<u64>,
    pub machines: Option<u64>,
    pub last_invocation_at: Option<String>,
}

impl Store {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open sqlite db {}", path.display()))?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite db")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create the backing tables and views. Safe to call on an existing
    /// store; the DDL is `IF NOT EXISTS` throughout.
    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(crate::storage::schema::DDL)
            .context("failed to initialize schema")?;
        Ok(())
    }

    /// Record the catalog into `tests` for downstream consumers.
    /// `INSERT OR IGNORE`, so reseeding an existing store is a no-op.
    pub fn seed_catalog(&self, catalog: &[TestSpec]) -> anyhow::Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO tests(compressor, options, level) VALUES (?1, ?2, ?3)",
            )?;
            for spec in catalog {
                stmt.execute(params![spec.compressor, spec.options_key(), spec.level])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Skip check. Architecture is implied by the machine label within one
    /// store, so it is not part of the skip key.
    pub fn exists(&self, machine: &str, spec: &TestSpec) -> anyhow::Result<bool> {
        let conn = self.conn.lock().unwrap();
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM results
                 WHERE machine=?1 AND compressor=?2 AND options=?3 AND level=?4",
                params![machine, spec.compressor, spec.options_key(), spec.level],
                |r| r.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Insert-or-replace keyed by the full primary key. Idempotent: a re-run
    /// overwrites the existing row, never duplicates it.
    pub fn upsert(&self, row: &RunResult) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO results(machine, arch, compressor, options, level, succeeded,
                                 comp_duration, comp_max_mem, decomp_duration, decomp_max_mem,
                                 input_size, output_size, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
             ON CONFLICT(machine, arch, compressor, options, level) DO UPDATE SET
                succeeded=excluded.succeeded,
                comp_duration=excluded.comp_duration,
                comp_max_mem=excluded.comp_max_mem,
                decomp_duration=excluded.decomp_duration,
                decomp_max_mem=excluded.decomp_max_mem,
                input_size=excluded.input_size,
                output_size=excluded.output_size,
                recorded_at=excluded.recorded_at",
            params![
                row.machine,
                row.arch,
                row.compressor,
                row.options,
                row.level,
                row.succeeded,
                row.comp.duration_secs,
                row.comp.peak_rss as i64,
                row.decomp.duration_secs,
                row.decomp.peak_rss as i64,
                row.input_size as i64,
                row.output_size as i64,
                chrono::Utc::now().to_rfc3339(),
            ],
        )
        .context("failed to commit result row")?;
        Ok(())
    }

    pub fn insert_invocation(
        &self,
        machine: &MachineContext,
        config_json: &str,
    ) -> anyhow::Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO invocations(machine, arch, started_at, status, config_json)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                machine.label,
                machine.arch,
                chrono::Utc::now().to_rfc3339(),
                "running",
                config_json
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn finalize_invocation(&self, id: i64, status: &str) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE invocations SET status=?1 WHERE id=?2",
            params![status, id],
        )?;
        Ok(())
    }

    pub fn count_results(&self, machine: &str) -> anyhow::Result<u64> {
        let conn = self.conn.lock().unwrap();
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM results WHERE machine=?1",
            params![machine],
            |r| r.get(0),
        )?;
        Ok(n as u64)
    }

    pub fn fetch_result(&self, machine: &str, spec: &TestSpec) -> anyhow::Result<Option<RunResult>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT machine, arch, compressor, options, level, succeeded,
                    comp_duration, comp_max_mem, decomp_duration, decomp_max_mem,
                    input_size, output_size
             FROM results
             WHERE machine=?1 AND compressor=?2 AND options=?3 AND level=?4",
            params![machine, spec.compressor, spec.options_key(), spec.level],
            |row| {
                Ok(RunResult {
                    machine: row.get(0)?,
                    arch: row.get(1)?,
                    compressor: row.get(2)?,
                    options: row.get(3)?,
                    level: row.get(4)?,
                    succeeded: row.get(5)?,
                    comp: PhaseStats {
                        duration_secs: row.get(6)?,
                        peak_rss: row.get::<_, i64>(7)? as u64,
                    },
                    decomp: PhaseStats {
                        duration_secs: row.get(8)?,
                        peak_rss: row.get::<_, i64>(9)? as u64,
                    },
                    input_size: row.get::<_, i64>(10)? as u64,
                    output_size: row.get::<_, i64>(11)? as u64,
                })
            },
        )
        .optional()
        .context("failed to fetch result row")
    }

    pub fn stats_best_effort(&self) -> anyhow::Result<StoreStats> {
        let conn = self.conn.lock().unwrap();

        let count = |sql: &str| -> Option<u64> {
            conn.query_row(sql, [], |r| r.get::<_, i64>(0).map(|x| x as u64))
                .ok()
        };

        let tests = count("SELECT COUNT(*) FROM tests");
        let results = count("SELECT COUNT(*) FROM results");
        let machines = count("SELECT COUNT(DISTINCT machine) FROM results");

        let last_invocation_at: Option<String> = conn
            .query_row(
                "SELECT started_at FROM invocations ORDER BY id DESC LIMIT 1",
                [],
                |r| r.get(0),
            )
            .ok();

        Ok(StoreStats {
            tests,
            results,
            machines,
            last_invocation_at,
        })
    }
}
