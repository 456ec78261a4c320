//! SQLite schema of the `pages` table.

/// Statements creating the schema, applied in order.
pub(crate) const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS pages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        parent_id INTEGER NOT NULL DEFAULT 0,
        alias TEXT NOT NULL,
        name TEXT NOT NULL,
        content TEXT NOT NULL DEFAULT '',
        image TEXT,
        images TEXT,
        data TEXT NOT NULL DEFAULT '{}',
        template TEXT NOT NULL,
        child_template TEXT,
        layout TEXT NOT NULL,
        child_layout TEXT,
        published INTEGER NOT NULL DEFAULT 0,
        publish_start TEXT,
        publish_end TEXT,
        meta_title TEXT,
        meta_keywords TEXT,
        meta_description TEXT,
        no_index INTEGER NOT NULL DEFAULT 0,
        no_follow INTEGER NOT NULL DEFAULT 0,
        canonical TEXT,
        site_map_enable INTEGER NOT NULL DEFAULT 1,
        site_map_update_frequency TEXT NOT NULL DEFAULT 'monthly',
        site_map_priority REAL NOT NULL DEFAULT 0.5,
        site_map_last_mod_enable INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        deleted_at TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_pages_id_alias ON pages(id, alias)",
    "CREATE INDEX IF NOT EXISTS idx_pages_parent_id ON pages(parent_id)",
];

/// Columns written from a `PageInput`, in bind order.
pub(crate) const EDITABLE_COLUMNS: &[&str] = &[
    "parent_id",
    "alias",
    "name",
    "content",
    "image",
    "images",
    "data",
    "template",
    "child_template",
    "layout",
    "child_layout",
    "published",
    "publish_start",
    "publish_end",
    "meta_title",
    "meta_keywords",
    "meta_description",
    "no_index",
    "no_follow",
    "canonical",
    "site_map_enable",
    "site_map_update_frequency",
    "site_map_priority",
    "site_map_last_mod_enable",
];

/// Page columns plus the count of non-deleted children.
pub(crate) const SUMMARY_SELECT: &str = "SELECT pages.*, \
    (SELECT COUNT(*) FROM pages AS children \
     WHERE children.parent_id = pages.id AND children.deleted_at IS NULL) AS children_count \
    FROM pages";

/// Query checking that the `pages` table exists.
pub(crate) const TABLE_EXISTS: &str =
    "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'pages')";
