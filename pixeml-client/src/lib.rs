//! pixeml-client: HTTP access to the task server.
//!
//! Reads come back as a resolved [`Board`]. Every successful mutation is
//! followed by a full reload; there is no local patching of state.

pub mod error;

use std::time::Duration;

use chrono::{DateTime, Utc};
use pixeml_core::{
    Board, DeleteTaskRequest, ModifyTaskRequest, Mutation, NewTaskRequest, RenameTaskRequest,
    TaskType, UnresolvedTask,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

pub use error::{ClientError, Result};

/// A resolved board plus when it was fetched.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub board: Board,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TaskClient {
    http: reqwest::Client,
    base_url: String,
}

impl TaskClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/api/{}", self.base_url, endpoint)
    }

    /// `GET /api/task_types`
    pub async fn task_types(&self) -> Result<Vec<TaskType>> {
        self.get_json("task_types").await
    }

    /// `GET /api/tasks`
    pub async fn tasks(&self) -> Result<Vec<UnresolvedTask>> {
        self.get_json("tasks").await
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let resp = self.http.get(self.url(endpoint)).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(server_error(endpoint, status, resp).await);
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }

    /// Fetch types, then tasks, and resolve.
    ///
    /// The two requests are sequential but not atomic: a task may reference a
    /// type the first response did not include. Such tasks land in
    /// `board.failures`.
    pub async fn reload(&self) -> Result<Snapshot> {
        let types = self.task_types().await?;
        let tasks = self.tasks().await?;
        debug!(types = types.len(), tasks = tasks.len(), "fetched board");

        let board = Board::resolve(types, &tasks);
        Ok(Snapshot {
            board,
            fetched_at: Utc::now(),
        })
    }

    /// POST a mutation. Succeeds only if the server answers with `{}`.
    pub async fn send(&self, mutation: &Mutation) -> Result<()> {
        let endpoint = mutation.endpoint();
        let resp = self
            .http
            .post(self.url(endpoint))
            .json(mutation)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(server_error(endpoint, status, resp).await);
        }

        let bytes = resp.bytes().await?;
        let body: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

        match body.as_object() {
            Some(obj) if obj.is_empty() => {
                info!(endpoint, "mutation accepted");
                Ok(())
            }
            _ => Err(ClientError::Rejected {
                endpoint: endpoint.to_string(),
                body,
            }),
        }
    }

    /// Send a mutation and, once accepted, reload everything.
    pub async fn apply(&self, mutation: impl Into<Mutation>) -> Result<Snapshot> {
        let mutation = mutation.into();
        self.send(&mutation).await?;
        self.reload().await
    }

    pub async fn create_task(&self, req: NewTaskRequest) -> Result<Snapshot> {
        self.apply(req).await
    }

    pub async fn modify_task(&self, req: ModifyTaskRequest) -> Result<Snapshot> {
        self.apply(req).await
    }

    pub async fn rename_task(&self, req: RenameTaskRequest) -> Result<Snapshot> {
        self.apply(req).await
    }

    pub async fn delete_task(&self, task_id: i64) -> Result<Snapshot> {
        self.apply(DeleteTaskRequest { task_id }).await
    }
}

async fn server_error(endpoint: &str, status: StatusCode, resp: reqwest::Response) -> ClientError {
    let body = resp.text().await.unwrap_or_default();
    ClientError::Server {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        body,
    }
}
