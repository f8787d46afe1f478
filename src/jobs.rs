//! Background Jobs
//!
//! Handlers enqueue deliveries here and return immediately; a single worker
//! task performs them. Failures are logged and never reach the requester.

use crate::error::AuthError;
use crate::notifier::{self, Notifier};
use crate::service::AuthService;

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Deliveries performed out of band
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    SendEmailConfirmation { email: String },
    SendPhoneConfirmation { email: String },
    SendPasswordReset { email: String },
}

impl Job {
    pub fn name(&self) -> &'static str {
        match self {
            Job::SendEmailConfirmation { .. } => "send_email_confirmation",
            Job::SendPhoneConfirmation { .. } => "send_phone_confirmation",
            Job::SendPasswordReset { .. } => "send_password_reset",
        }
    }
}

/// Sending half of the job queue
#[derive(Debug, Clone)]
pub struct JobQueue {
    sender: mpsc::UnboundedSender<Job>,
}

impl JobQueue {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Job>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Queue a job; a stopped worker only costs a log line
    pub fn enqueue(&self, job: Job) {
        let name = job.name();
        if self.sender.send(job).is_err() {
            tracing::error!(job = name, "Job worker is not running, job dropped");
        } else {
            tracing::debug!(job = name, "Job enqueued");
        }
    }
}

/// Performs queued jobs one at a time
pub struct JobWorker {
    auth: Arc<AuthService>,
    notifier: Arc<dyn Notifier>,
}

impl JobWorker {
    pub fn new(auth: Arc<AuthService>, notifier: Arc<dyn Notifier>) -> Self {
        Self { auth, notifier }
    }

    /// Drain the queue until every sender is dropped
    pub async fn run(self, mut receiver: mpsc::UnboundedReceiver<Job>) {
        tracing::info!("Job worker started");

        while let Some(job) = receiver.recv().await {
            if let Err(e) = self.perform(&job).await {
                tracing::error!(job = job.name(), error = %e, "Job failed");
            }
        }

        tracing::info!("Job worker stopped");
    }

    pub fn spawn(self, receiver: mpsc::UnboundedReceiver<Job>) -> JoinHandle<()> {
        tokio::spawn(self.run(receiver))
    }

    pub async fn perform(&self, job: &Job) -> Result<(), AuthError> {
        let public_url = &self.auth.config().public_url;

        match job {
            Job::SendEmailConfirmation { email } => {
                match self.auth.issue_email_confirmation(email).await? {
                    Some((user, token)) => {
                        let link = notifier::email_confirmation_link(public_url, &token);
                        self.notifier.email_confirmation(&user, &link).await?;
                    }
                    None => tracing::debug!("No unconfirmed user for email confirmation"),
                }
            }
            Job::SendPhoneConfirmation { email } => {
                match self.auth.issue_phone_confirmation(email).await? {
                    Some((user, phone, code)) => {
                        self.notifier.phone_code(&user, &phone, &code).await?;
                    }
                    None => tracing::debug!("No user with a phone for phone confirmation"),
                }
            }
            Job::SendPasswordReset { email } => match self.auth.issue_password_reset(email).await? {
                Some((user, token)) => {
                    let link = notifier::password_reset_link(public_url, &token);
                    self.notifier.password_reset(&user, &link).await?;
                }
                None => tracing::debug!("No user for password reset"),
            },
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_enqueued_jobs_arrive_in_order() {
        let (queue, mut receiver) = JobQueue::new();

        queue.enqueue(Job::SendEmailConfirmation {
            email: "a@example.com".into(),
        });
        queue.enqueue(Job::SendPasswordReset {
            email: "b@example.com".into(),
        });

        assert_eq!(
            receiver.recv().await,
            Some(Job::SendEmailConfirmation {
                email: "a@example.com".into()
            })
        );
        assert_eq!(
            receiver.recv().await.map(|job| job.name()),
            Some("send_password_reset")
        );
    }

    #[tokio::test]
    async fn test_enqueue_without_worker_does_not_panic() {
        let (queue, receiver) = JobQueue::new();
        drop(receiver);

        queue.enqueue(Job::SendPhoneConfirmation {
            email: "c@example.com".into(),
        });
    }
}
