/// SQLite persistence layer for workflow graphs
///
/// Workflows, nodes and edges live in three relational tables. Node payloads are
/// stored as JSON text with no schema at the storage layer; decoding back into
/// typed payloads happens on read.
///
/// Every write path runs inside a single transaction, so readers observe either
/// the complete previous graph or the complete new one.

use crate::workflow::{
    error::{StorageError, ValidationError},
    payload::NodeData,
    reconcile::{reconcile_edges, IdMap},
    submission::{GraphSubmission, NodeSubmission},
    types::{Edge, Node, NodeType, Workflow, WorkflowStats, WorkflowSummary},
};
use chrono::Utc;
use serde_json::Value;
use sqlx::{
    sqlite::{SqlitePool, SqliteRow},
    Row, SqliteConnection,
};
use uuid::Uuid;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS workflows (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        owner_id TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        last_run_at TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS nodes (
        id TEXT PRIMARY KEY,
        workflow_id TEXT NOT NULL REFERENCES workflows(id) ON DELETE CASCADE,
        client_ref TEXT NOT NULL,
        ordinal INTEGER NOT NULL,
        node_type TEXT NOT NULL,
        position_x REAL NOT NULL,
        position_y REAL NOT NULL,
        data TEXT NOT NULL,
        UNIQUE (workflow_id, client_ref)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS edges (
        id TEXT PRIMARY KEY,
        workflow_id TEXT NOT NULL REFERENCES workflows(id) ON DELETE CASCADE,
        ordinal INTEGER NOT NULL,
        source TEXT NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
        target TEXT NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
        label TEXT,
        source_handle TEXT,
        target_handle TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_workflows_owner ON workflows(owner_id)",
    "CREATE INDEX IF NOT EXISTS idx_nodes_workflow ON nodes(workflow_id)",
    "CREATE INDEX IF NOT EXISTS idx_edges_workflow ON edges(workflow_id)",
];

/// SQLite-backed persistence adapter
#[derive(Debug, Clone)]
pub struct WorkflowStorage {
    /// SQLite connection pool for the workflow database
    pool: SqlitePool,
}

impl WorkflowStorage {
    /// Create new storage instance with database connection
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the workflow storage schema
    ///
    /// Safe to call multiple times (uses IF NOT EXISTS).
    pub async fn init_schema(&self) -> Result<(), StorageError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Insert a workflow row together with its whole graph
    ///
    /// Nodes are written first; their durable ids are then used to rewrite the
    /// edges. A dangling edge aborts the transaction and nothing is committed.
    pub async fn create_workflow_with_graph(
        &self,
        owner_id: &str,
        submission: &GraphSubmission,
    ) -> Result<Workflow, StorageError> {
        let workflow_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO workflows (id, name, description, owner_id, is_active, created_at, updated_at, last_run_at)
            VALUES (?, ?, ?, ?, 0, ?, ?, NULL)
            "#,
        )
        .bind(&workflow_id)
        .bind(&submission.name)
        .bind(&submission.description)
        .bind(owner_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        insert_graph(&mut tx, &workflow_id, submission).await?;

        let workflow = load_workflow(&mut tx, &workflow_id)
            .await?
            .ok_or(StorageError::NotFound)?;

        tx.commit().await?;
        Ok(workflow)
    }

    /// Replace a workflow's entire node and edge set, then its scalar fields
    ///
    /// Destructive: anything not in the submission is gone afterwards. Returns
    /// `StorageError::NotFound` when no workflow with this id belongs to the owner.
    pub async fn replace_nodes_and_edges(
        &self,
        workflow_id: &str,
        owner_id: &str,
        submission: &GraphSubmission,
    ) -> Result<Workflow, StorageError> {
        let mut tx = self.pool.begin().await?;

        // Claim the row first so the transaction holds the write lock from the start.
        let claimed = sqlx::query("UPDATE workflows SET updated_at = ? WHERE id = ? AND owner_id = ?")
            .bind(Utc::now())
            .bind(workflow_id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;
        if claimed.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        let dropped_edges = sqlx::query("DELETE FROM edges WHERE workflow_id = ?")
            .bind(workflow_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let dropped_nodes = sqlx::query("DELETE FROM nodes WHERE workflow_id = ?")
            .bind(workflow_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tracing::debug!(
            "🧹 Dropped {} nodes and {} edges of workflow {}",
            dropped_nodes,
            dropped_edges,
            workflow_id
        );

        insert_graph(&mut tx, workflow_id, submission).await?;

        sqlx::query("UPDATE workflows SET name = ?, description = ? WHERE id = ?")
            .bind(&submission.name)
            .bind(&submission.description)
            .bind(workflow_id)
            .execute(&mut *tx)
            .await?;

        let workflow = load_workflow(&mut tx, workflow_id)
            .await?
            .ok_or(StorageError::NotFound)?;

        tx.commit().await?;
        Ok(workflow)
    }

    /// Retrieve a workflow with its full graph
    ///
    /// The three reads share one transaction so a concurrent replace is seen
    /// either entirely or not at all.
    pub async fn find_workflow_with_graph(&self, id: &str) -> Result<Option<Workflow>, StorageError> {
        let mut tx = self.pool.begin().await?;
        let workflow = load_workflow(&mut tx, id).await?;
        tx.commit().await?;
        Ok(workflow)
    }

    /// Owner of a workflow, if it exists
    pub async fn find_owner(&self, id: &str) -> Result<Option<String>, StorageError> {
        let owner = sqlx::query_scalar::<_, String>("SELECT owner_id FROM workflows WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(owner)
    }

    /// List a user's workflows, newest first
    ///
    /// `limit` caps the number of rows; `None` returns them all.
    pub async fn list_workflows_for_owner(
        &self,
        owner_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<WorkflowSummary>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT w.id, w.name, w.description, w.is_active, w.created_at, w.updated_at, w.last_run_at,
                   (SELECT COUNT(*) FROM nodes n WHERE n.workflow_id = w.id) AS node_count
            FROM workflows w
            WHERE w.owner_id = ?
            ORDER BY w.created_at DESC, w.rowid DESC
            LIMIT ?
            "#,
        )
        .bind(owner_id)
        // SQLite treats a negative LIMIT as no limit
        .bind(limit.map(i64::from).unwrap_or(-1))
        .fetch_all(&self.pool)
        .await?;

        let mut workflows = Vec::with_capacity(rows.len());
        for row in rows {
            workflows.push(WorkflowSummary {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                description: row.try_get("description")?,
                is_active: row.try_get("is_active")?,
                created_at: row.try_get("created_at")?,
                updated_at: row.try_get("updated_at")?,
                last_run_at: row.try_get("last_run_at")?,
                node_count: row.try_get("node_count")?,
            });
        }

        Ok(workflows)
    }

    /// Workflow, active workflow and node totals for one owner
    pub async fn workflow_stats_for_owner(&self, owner_id: &str) -> Result<WorkflowStats, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS workflow_count,
                   COALESCE(SUM(w.is_active), 0) AS active_workflows,
                   (SELECT COUNT(*)
                    FROM nodes n
                    JOIN workflows o ON o.id = n.workflow_id
                    WHERE o.owner_id = ?) AS total_nodes
            FROM workflows w
            WHERE w.owner_id = ?
            "#,
        )
        .bind(owner_id)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(WorkflowStats {
            workflow_count: row.try_get("workflow_count")?,
            active_workflows: row.try_get("active_workflows")?,
            total_nodes: row.try_get("total_nodes")?,
        })
    }
}

/// Write nodes, reconcile identifiers, then write edges
async fn insert_graph(
    conn: &mut SqliteConnection,
    workflow_id: &str,
    submission: &GraphSubmission,
) -> Result<(), StorageError> {
    let pairs = insert_nodes(conn, workflow_id, &submission.nodes).await?;
    let id_map = IdMap::from_pairs(pairs)?;
    let edges = reconcile_edges(&id_map, &submission.edges).map_err(ValidationError::from)?;

    tracing::debug!(
        "🔗 Reconciled {} edges against {} durable node ids for workflow {}",
        edges.len(),
        id_map.len(),
        workflow_id
    );

    for (ordinal, edge) in edges.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO edges (id, workflow_id, ordinal, source, target, label, source_handle, target_handle)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(workflow_id)
        .bind(ordinal as i64)
        .bind(&edge.source)
        .bind(&edge.target)
        .bind(&edge.label)
        .bind(&edge.source_handle)
        .bind(&edge.target_handle)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Insert nodes and return (local id, durable id) pairs as stored
async fn insert_nodes(
    conn: &mut SqliteConnection,
    workflow_id: &str,
    nodes: &[NodeSubmission],
) -> Result<Vec<(String, String)>, StorageError> {
    let mut pairs = Vec::with_capacity(nodes.len());

    for (ordinal, node) in nodes.iter().enumerate() {
        let data = serde_json::to_string(&node.data)?;
        let row = sqlx::query(
            r#"
            INSERT INTO nodes (id, workflow_id, client_ref, ordinal, node_type, position_x, position_y, data)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING client_ref, id
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(workflow_id)
        .bind(&node.local_id)
        .bind(ordinal as i64)
        .bind(node.node_type().as_str())
        .bind(node.position_x)
        .bind(node.position_y)
        .bind(data)
        .fetch_one(&mut *conn)
        .await?;

        pairs.push((row.try_get("client_ref")?, row.try_get("id")?));
    }

    Ok(pairs)
}

async fn load_workflow(conn: &mut SqliteConnection, id: &str) -> Result<Option<Workflow>, StorageError> {
    let row = sqlx::query(
        r#"
        SELECT id, name, description, owner_id, is_active, created_at, updated_at, last_run_at
        FROM workflows
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let nodes = sqlx::query(
        "SELECT id, node_type, position_x, position_y, data FROM nodes WHERE workflow_id = ? ORDER BY ordinal",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?
    .iter()
    .map(node_from_row)
    .collect::<Result<Vec<_>, _>>()?;

    let edges = sqlx::query(
        r#"
        SELECT id, source, target, label, source_handle, target_handle
        FROM edges
        WHERE workflow_id = ?
        ORDER BY ordinal
        "#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?
    .iter()
    .map(edge_from_row)
    .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(Workflow {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        owner_id: row.try_get("owner_id")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        last_run_at: row.try_get("last_run_at")?,
        nodes,
        edges,
    }))
}

fn node_from_row(row: &SqliteRow) -> Result<Node, StorageError> {
    let id: String = row.try_get("id")?;
    let corrupt = |reason: String| StorageError::CorruptNode {
        node_id: id.clone(),
        reason,
    };

    let tag: String = row.try_get("node_type")?;
    let node_type: NodeType = tag.parse().map_err(corrupt)?;
    let raw: String = row.try_get("data")?;
    let value: Value = serde_json::from_str(&raw).map_err(|e| corrupt(e.to_string()))?;
    let data = NodeData::decode(node_type, value).map_err(|e| corrupt(e.to_string()))?;

    Ok(Node::new(
        id,
        row.try_get("position_x")?,
        row.try_get("position_y")?,
        data,
    ))
}

fn edge_from_row(row: &SqliteRow) -> Result<Edge, StorageError> {
    Ok(Edge {
        id: row.try_get("id")?,
        source: row.try_get("source")?,
        target: row.try_get("target")?,
        label: row.try_get("label")?,
        source_handle: row.try_get("source_handle")?,
        target_handle: row.try_get("target_handle")?,
    })
}
