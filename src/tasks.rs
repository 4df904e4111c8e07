//! Airdrop task claiming over the portal's GraphQL API.

use std::fmt;

use alloy::primitives::Address;
use eyre::{Result, WrapErr};
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, info, warn};

const TASKS_QUERY: &str = r#"
    query AirdropUser($filter: UserFilter!, $tasksFilter: QueryFilter) {
      userdrop {
        user(filter: $filter) {
          tasks(filter: $tasksFilter) {
            tasks {
              id
              description
              progress {
                isCompleted
              }
            }
          }
        }
      }
    }
"#;

const CLAIM_MUTATION: &str = r#"
    mutation UpdateAirdropTaskStatus($input: UpdateTaskStatusInputData!) {
      userdrop {
        updateTaskStatus(input: $input) {
          success
          progress {
            isCompleted
            completedAt
          }
        }
      }
    }
"#;

/// Task ids come back as numbers, but are echoed verbatim either way.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TaskId {
    Number(i64),
    Text(String),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Number(id) => write!(f, "{id}"),
            TaskId::Text(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub progress: TaskProgress,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskProgress {
    pub is_completed: bool,
}

#[derive(Debug, Deserialize)]
struct TasksResponse {
    data: Option<TasksData>,
}

#[derive(Debug, Deserialize)]
struct TasksData {
    userdrop: Option<Userdrop>,
}

#[derive(Debug, Deserialize)]
struct Userdrop {
    user: Option<UserTasks>,
}

#[derive(Debug, Deserialize)]
struct UserTasks {
    #[serde(default)]
    tasks: Vec<TaskGroup>,
}

#[derive(Debug, Deserialize)]
struct TaskGroup {
    #[serde(default)]
    tasks: Vec<Task>,
}

#[derive(Debug, Deserialize)]
struct ClaimResponse {
    data: Option<ClaimData>,
}

#[derive(Debug, Deserialize)]
struct ClaimData {
    userdrop: Option<ClaimUserdrop>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimUserdrop {
    update_task_status: Option<UpdateTaskStatus>,
}

#[derive(Debug, Deserialize)]
struct UpdateTaskStatus {
    #[serde(default)]
    success: bool,
}

/// Flatten task groups and keep the tasks that are not completed yet.
fn open_tasks(response: TasksResponse) -> Vec<Task> {
    response
        .data
        .and_then(|data| data.userdrop)
        .and_then(|userdrop| userdrop.user)
        .map(|user| user.tasks)
        .unwrap_or_default()
        .into_iter()
        .flat_map(|group| group.tasks)
        .filter(|task| !task.progress.is_completed)
        .collect()
}

fn claim_succeeded(response: ClaimResponse) -> bool {
    response
        .data
        .and_then(|data| data.userdrop)
        .and_then(|userdrop| userdrop.update_task_status)
        .is_some_and(|status| status.success)
}

pub struct TaskClient {
    http: Client,
    endpoint: String,
}

impl TaskClient {
    pub fn new(http: Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    async fn post<T: for<'de> Deserialize<'de>>(&self, body: Value) -> Result<T> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, "Mozilla/5.0")
            .json(&body)
            .send()
            .await
            .wrap_err("GraphQL request failed")?
            .error_for_status()
            .wrap_err("GraphQL endpoint returned an error status")?;
        response.json::<T>().await.wrap_err("invalid GraphQL response")
    }

    pub async fn fetch_open_tasks(&self, address: Address) -> Result<Vec<Task>> {
        let body = json!({
            "query": TASKS_QUERY,
            "variables": { "filter": { "address": address.to_checksum(None) } },
        });
        Ok(open_tasks(self.post(body).await?))
    }

    pub async fn claim_task(&self, address: Address, task_id: &TaskId) -> Result<bool> {
        let body = json!({
            "query": CLAIM_MUTATION,
            "variables": { "input": { "address": address.to_checksum(None), "taskID": task_id } },
        });
        Ok(claim_succeeded(self.post(body).await?))
    }

    /// Claim every open task for `address`, one after the other. Failures
    /// are logged per task; nothing is propagated.
    pub async fn process_tasks(&self, address: Address) -> ClaimSummary {
        let tasks = match self.fetch_open_tasks(address).await {
            Ok(tasks) => tasks,
            Err(e) => {
                error!(error = %format!("{e:#}"), "Error fetching tasks");
                Vec::new()
            }
        };

        let mut summary = ClaimSummary::default();
        if tasks.is_empty() {
            warn!("No tasks to claim for address: {}", address);
            return summary;
        }

        for task in &tasks {
            info!("Claiming task: {} ({})", task.description, task.id);
            match self.claim_task(address, &task.id).await {
                Ok(true) => {
                    info!("Task {} ({}) successfully claimed!", task.description, task.id);
                    summary.claimed += 1;
                }
                Ok(false) => {
                    warn!("Failed to claim task {} ({})", task.description, task.id);
                    summary.failed += 1;
                }
                Err(e) => {
                    error!(error = %format!("{e:#}"), "Error claiming task {} ({})", task.description, task.id);
                    summary.failed += 1;
                }
            }
        }
        info!("Finished processing tasks for address: {}", address);
        summary
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ClaimSummary {
    pub claimed: usize,
    pub failed: usize,
}
