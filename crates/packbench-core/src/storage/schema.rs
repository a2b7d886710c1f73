pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS tests (
  compressor TEXT NOT NULL,
  options    TEXT NOT NULL,
  level      TEXT NOT NULL,
  PRIMARY KEY (compressor, options, level)
);

CREATE TABLE IF NOT EXISTS invocations (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  machine     TEXT NOT NULL,
  arch        TEXT NOT NULL,
  started_at  TEXT NOT NULL,
  status      TEXT NOT NULL,
  config_json TEXT
);

CREATE TABLE IF NOT EXISTS results (
  machine         TEXT    NOT NULL,
  arch            TEXT    NOT NULL,
  compressor      TEXT    NOT NULL,
  options         TEXT    NOT NULL,
  level           TEXT    NOT NULL,
  succeeded       INTEGER NOT NULL DEFAULT 0,
  comp_duration   REAL    NOT NULL,
  comp_max_mem    INTEGER NOT NULL,
  decomp_duration REAL    NOT NULL,
  decomp_max_mem  INTEGER NOT NULL,
  input_size      INTEGER NOT NULL,
  output_size     INTEGER NOT NULL,
  recorded_at     TEXT    NOT NULL,

  PRIMARY KEY (machine, arch, compressor, options, level),
  CHECK (succeeded IN (0, 1)),
  CHECK (comp_duration >= 0.0),
  CHECK (comp_max_mem >= 0),
  CHECK (decomp_duration >= 0.0),
  CHECK (decomp_max_mem >= 0)
);

CREATE INDEX IF NOT EXISTS idx_results_test ON results(compressor, options, level);

CREATE VIEW IF NOT EXISTS compressors AS
  SELECT DISTINCT compressor FROM tests;

CREATE VIEW IF NOT EXISTS compressor_options AS
  SELECT DISTINCT compressor, options FROM tests;
"#;
