//! Submits a rendered template to CloudFormation and waits for the stack
//! to settle. CloudFormation does the diffing and applying; this only
//! drives its API.

use std::collections::BTreeMap;

use aws_sdk_cloudformation::config::Region;
use aws_sdk_cloudformation::types::{Capability, OnFailure, Stack, StackStatus};
use aws_sdk_cloudformation::Client;
use thiserror::Error;
use tracing::{debug, info};

pub const POLL_INTERVAL_MS: u64 = 700;

pub type Result<T> = std::result::Result<T, DeployError>;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("CloudFormation request failed\n{0}")]
    Sdk(String),
    #[error("Stack {name} failed: {reason}")]
    StackFailed {
        name: String,
        reason: String,
    },
    #[error("Stack {0} not found")]
    NotFound(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackProgress {
    Complete,
    InProgress,
    Failed,
}

/// Where a stack status leaves a deployment. Rollbacks and deletes count as
/// failures since the submitted template did not end up applied. A failed
/// create is deleted (`OnFailure::Delete`), so `DeleteInProgress` is one too.
pub fn stack_progress(status: &StackStatus) -> StackProgress {
    match status {
        StackStatus::CreateComplete |
        StackStatus::UpdateComplete |
        StackStatus::ImportComplete => StackProgress::Complete,

        StackStatus::CreateInProgress |
        StackStatus::ImportInProgress |
        StackStatus::ImportRollbackInProgress |
        StackStatus::ReviewInProgress |
        StackStatus::RollbackInProgress |
        StackStatus::UpdateCompleteCleanupInProgress |
        StackStatus::UpdateInProgress |
        StackStatus::UpdateRollbackCompleteCleanupInProgress |
        StackStatus::UpdateRollbackInProgress => StackProgress::InProgress,

        _ => StackProgress::Failed,
    }
}

/// client for the ambient AWS credentials, pinned to `region` when given.
pub async fn client_for_region(region: Option<String>) -> Client {
    let mut loader = aws_config::from_env();
    if let Some(region) = region {
        loader = loader.region(Region::new(region));
    }
    let shared_config = loader.load().await;
    Client::new(&shared_config)
}

pub async fn does_stack_exist(client: &Client, name: &str) -> Result<bool> {
    match client.describe_stacks().stack_name(name).send().await {
        Ok(_) => Ok(true),
        Err(e) => {
            let e_str = format!("{:#?}", e);
            if e_str.contains("does not exist") {
                return Ok(false);
            }
            Err(DeployError::Sdk(e_str))
        }
    }
}

/// `Ok(None)` while the stack is still changing. A failed stack reports
/// its `StackStatusReason`, or the bare status when there is none.
pub fn settled_stack(name: &str, stack: &Stack) -> Result<Option<Stack>> {
    let status = stack
        .stack_status()
        .ok_or_else(|| DeployError::NotFound(name.to_string()))?;
    debug!(stack = name, status = status.as_str(), "stack status");
    match stack_progress(status) {
        StackProgress::Complete => Ok(Some(stack.clone())),
        StackProgress::InProgress => Ok(None),
        StackProgress::Failed => Err(DeployError::StackFailed {
            name: name.to_string(),
            reason: match stack.stack_status_reason() {
                Some(reason) => format!("{} ({reason})", status.as_str()),
                None => status.as_str().to_string(),
            },
        }),
    }
}

/// `name` may be a stack name or a stack id. Deleted stacks can only be
/// described by id.
pub async fn describe_stack(client: &Client, name: &str) -> Result<Option<Stack>> {
    let output = client
        .describe_stacks()
        .stack_name(name)
        .send()
        .await
        .map_err(|e| DeployError::Sdk(format!("{:#?}", e)))?;
    let first = output
        .stacks()
        .and_then(|stacks| stacks.first())
        .ok_or_else(|| DeployError::NotFound(name.to_string()))?;
    settled_stack(name, first)
}

pub fn stack_outputs(stack: &Stack) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for output in stack.outputs().unwrap_or_default() {
        if let (Some(key), Some(val)) = (output.output_key(), output.output_value()) {
            out.insert(key.to_string(), val.to_string());
        }
    }
    out
}

pub async fn wait_for_output(client: &Client, name: &str) -> Result<BTreeMap<String, String>> {
    loop {
        let dur = tokio::time::Duration::from_millis(POLL_INTERVAL_MS);
        tokio::time::sleep(dur).await;
        if let Some(stack) = describe_stack(client, name).await? {
            return Ok(stack_outputs(&stack));
        }
    }
}

/// What `create_or_update_stack` submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// a new stack. the id stays describable even after a failed create
    /// has deleted the stack.
    Created { stack_id: String },
    Updated,
    /// the stack already matched the template.
    Unchanged,
}

impl Submission {
    /// what to poll while waiting for the stack to settle, if anything.
    pub fn poll_target<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        match self {
            Submission::Created { stack_id } => Some(stack_id.as_str()),
            Submission::Updated => Some(name),
            Submission::Unchanged => None,
        }
    }
}

pub async fn create_or_update_stack(client: &Client, name: &str, body: &str) -> Result<Submission> {
    let exists = does_stack_exist(client, name).await?;
    if exists {
        info!(stack = name, "updating stack");
        match client
            .update_stack()
            .capabilities(Capability::CapabilityNamedIam)
            .capabilities(Capability::CapabilityIam)
            .stack_name(name)
            .template_body(body)
            .send()
            .await
        {
            Ok(_) => Ok(Submission::Updated),
            Err(e) => {
                let e_str = format!("{:#?}", e);
                if e_str.contains("No updates are to be performed") {
                    info!(stack = name, "no updates are to be performed");
                    return Ok(Submission::Unchanged);
                }
                Err(DeployError::Sdk(e_str))
            }
        }
    } else {
        info!(stack = name, "creating stack");
        let output = client
            .create_stack()
            .on_failure(OnFailure::Delete)
            .capabilities(Capability::CapabilityNamedIam)
            .capabilities(Capability::CapabilityIam)
            .stack_name(name)
            .template_body(body)
            .send()
            .await
            .map_err(|e| DeployError::Sdk(format!("{:#?}", e)))?;
        let stack_id = output.stack_id().unwrap_or(name).to_string();
        debug!(stack = name, stack_id = %stack_id, "create submitted");
        Ok(Submission::Created { stack_id })
    }
}

/// create or update `name` with `body` and wait until it settles,
/// returning the stack outputs.
pub async fn deploy_stack(client: &Client, name: &str, body: &str) -> Result<BTreeMap<String, String>> {
    let submission = create_or_update_stack(client, name, body).await?;
    let outputs = match submission.poll_target(name) {
        Some(target) => wait_for_output(client, target).await.map_err(|e| match e {
            DeployError::StackFailed { reason, .. } => DeployError::StackFailed {
                name: name.to_string(),
                reason,
            },
            e => e,
        })?,
        None => {
            let stack = describe_stack(client, name)
                .await?
                .ok_or_else(|| DeployError::NotFound(name.to_string()))?;
            stack_outputs(&stack)
        }
    };
    info!(stack = name, "stack deployed");
    Ok(outputs)
}
