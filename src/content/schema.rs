/// Version of the SQLite catalog layout. Bumped on any table change.
pub const CONTENT_SCHEMA_VERSION: i64 = 1;

pub const CATALOG_DB_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS content_meta (
  id INTEGER PRIMARY KEY CHECK (id = 1),
  schema_version INTEGER NOT NULL,
  content_version TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS clusters (
  cluster_id INTEGER PRIMARY KEY,
  map_image TEXT,
  source TEXT
);

CREATE TABLE IF NOT EXISTS cluster_countries (
  cluster_id INTEGER NOT NULL,
  position INTEGER NOT NULL,
  country_name TEXT NOT NULL,
  flag_image TEXT,
  PRIMARY KEY (cluster_id, position)
);

CREATE TABLE IF NOT EXISTS cluster_slots (
  cluster_id INTEGER NOT NULL,
  position INTEGER NOT NULL,
  slot_ref TEXT NOT NULL,
  PRIMARY KEY (cluster_id, position)
);
"#;
