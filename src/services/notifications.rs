//! Best-effort email notifications.
//!
//! Every trigger composes its message and hands it to the mail transport on a
//! detached task. Nothing here can fail the request that triggered it.

use std::sync::Arc;

use tokio::task::JoinHandle;

use super::email::{MailTransport, OutgoingEmail};
use crate::{
    models::user::User,
    repository::{support::TicketContext, Repository},
};

/// Who submitted a ticket
#[derive(Debug, Clone)]
pub struct Recipient {
    pub first_name: String,
    pub email: String,
}

impl From<&User> for Recipient {
    fn from(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            email: user.email.clone(),
        }
    }
}

fn assignment_label(ctx: &TicketContext) -> String {
    match &ctx.institution_name {
        Some(name) => format!("Assignment #{} for {}", ctx.assignment_id, name),
        None => format!("Assignment #{}", ctx.assignment_id),
    }
}

pub fn welcome_email(user: &User, temporary_password: &str) -> OutgoingEmail {
    let role = user.role.map(|r| r.label()).unwrap_or("no role");
    OutgoingEmail {
        to: user.email.clone(),
        subject: "Welcome to ReConectaTec - Your credentials".to_string(),
        body: format!(
            r#"Hello {name},

Welcome to the ReConectaTec team.
Your account has been created with the role: {role}.

Your sign-in credentials are:
User (email): {email}
Temporary password: {password}

IMPORTANT: sign in and change this password from your profile right away.

Regards,
The ReConectaTec team
"#,
            name = user.first_name,
            role = role,
            email = user.email,
            password = temporary_password
        ),
    }
}

pub fn profile_updated_email(user: &User) -> OutgoingEmail {
    OutgoingEmail {
        to: user.email.clone(),
        subject: "Security: your account details were updated".to_string(),
        body: format!(
            r#"Hello {name},

The details of your ReConectaTec profile were recently changed.

If this was you, you can ignore this message.
If it was NOT you, contact an administrator immediately.

Regards,
The ReConectaTec security team
"#,
            name = user.first_name
        ),
    }
}

pub fn ticket_created_email(submitter: &Recipient, ctx: &TicketContext) -> OutgoingEmail {
    OutgoingEmail {
        to: submitter.email.clone(),
        subject: format!("Ticket #{} received - ReConectaTec", ctx.id),
        body: format!(
            r#"Hello {name},

We have received your support request.

Ticket: #{id}
Assignment: {assignment}
Problem: {description}

A technician will review your case soon.

Regards,
IT Support
"#,
            name = submitter.first_name,
            id = ctx.id,
            assignment = assignment_label(ctx),
            description = ctx.description.as_deref().unwrap_or("")
        ),
    }
}

/// Update notice for the receiving institution; None when it has no contact email
pub fn ticket_updated_email(ctx: &TicketContext) -> Option<OutgoingEmail> {
    let to = ctx.contact_email.as_deref().filter(|e| !e.trim().is_empty())?;
    let resolution = ctx.resolution.as_deref().filter(|r| !r.trim().is_empty());
    let state = if resolution.is_some() { "Resolved" } else { "Updated" };
    let technician = match (&ctx.technician_first_name, &ctx.technician_last_name) {
        (Some(first), Some(last)) => format!("{} {}", first, last),
        (Some(first), None) => first.clone(),
        _ => "To be assigned".to_string(),
    };

    Some(OutgoingEmail {
        to: to.to_string(),
        subject: format!("Ticket #{} update - {}", ctx.id, state),
        body: format!(
            r#"Dear {institution},

Support ticket #{id} has been updated by our technical team.

Assignment: {assignment}
Support kind: {kind}

--- NEWS / RESOLUTION ---
{news}
-------------------------

Technician in charge: {technician}

Regards,
ReConectaTec Support
"#,
            institution = ctx.institution_name.as_deref().unwrap_or("customer"),
            id = ctx.id,
            assignment = assignment_label(ctx),
            kind = ctx.kind.label(),
            news = resolution.unwrap_or("The technician has updated the details of the case."),
            technician = technician
        ),
    })
}

/// Send on a detached task, logging failures
pub fn dispatch(mailer: Arc<dyn MailTransport>, email: OutgoingEmail) -> JoinHandle<()> {
    tokio::spawn(async move {
        let to = email.to.clone();
        let subject = email.subject.clone();
        match mailer.send(email).await {
            Ok(()) => tracing::debug!(%to, %subject, "Notification sent"),
            Err(e) => tracing::warn!(%to, %subject, error = %e, "Failed to send notification"),
        }
    })
}

#[derive(Clone)]
pub struct NotificationService {
    repository: Repository,
    mailer: Arc<dyn MailTransport>,
}

impl NotificationService {
    pub fn new(repository: Repository, mailer: Arc<dyn MailTransport>) -> Self {
        Self { repository, mailer }
    }

    pub fn user_created(&self, user: &User, temporary_password: &str) {
        dispatch(self.mailer.clone(), welcome_email(user, temporary_password));
    }

    pub fn profile_updated(&self, user: &User) {
        dispatch(self.mailer.clone(), profile_updated_email(user));
    }

    /// Confirm a new ticket to the user who submitted it
    pub fn ticket_created(&self, submitter_id: i32, ticket_id: i32) {
        let repository = self.repository.clone();
        let mailer = self.mailer.clone();
        tokio::spawn(async move {
            let submitter = match repository.users.get_by_id(submitter_id).await {
                Ok(user) => Recipient::from(&user),
                Err(e) => {
                    tracing::warn!(submitter_id, error = %e, "Could not load ticket submitter");
                    return;
                }
            };
            match repository.support.context(ticket_id).await {
                Ok(Some(ctx)) => {
                    dispatch(mailer, ticket_created_email(&submitter, &ctx));
                }
                Ok(None) => tracing::warn!(ticket_id, "Ticket vanished before its confirmation was sent"),
                Err(e) => tracing::warn!(ticket_id, error = %e, "Could not load ticket for confirmation"),
            }
        });
    }

    /// Tell the receiving institution about a ticket change
    pub fn ticket_updated(&self, ticket_id: i32) {
        let repository = self.repository.clone();
        let mailer = self.mailer.clone();
        tokio::spawn(async move {
            let ctx = match repository.support.context(ticket_id).await {
                Ok(Some(ctx)) => ctx,
                Ok(None) => {
                    tracing::warn!(ticket_id, "Ticket vanished before its update notice was sent");
                    return;
                }
                Err(e) => {
                    tracing::warn!(ticket_id, error = %e, "Could not load ticket for update notice");
                    return;
                }
            };
            if ctx.institution_name.is_none() {
                tracing::warn!(ticket_id, "Ticket has no institution to notify");
                return;
            }
            match ticket_updated_email(&ctx) {
                Some(email) => {
                    dispatch(mailer, email);
                }
                None => tracing::warn!(ticket_id, "Institution has no contact email, update notice skipped"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::enums::{Role, SupportKind},
        services::email::MockMailTransport,
    };
    use chrono::Utc;

    fn user() -> User {
        User {
            id: 3,
            first_name: "Ana".into(),
            last_name: "Rojas".into(),
            email: "ana@example.cl".into(),
            password: String::new(),
            role: Some(Role::Technician),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn context() -> TicketContext {
        TicketContext {
            id: 12,
            assignment_id: 5,
            kind: SupportKind::Technical,
            description: Some("Screen flickers".into()),
            resolution: None,
            institution_name: Some("Escuela Los Andes".into()),
            contact_email: Some("contacto@losandes.cl".into()),
            technician_first_name: None,
            technician_last_name: None,
        }
    }

    #[test]
    fn welcome_mentions_role_and_password() {
        let email = welcome_email(&user(), "Tmp-12345");
        assert_eq!(email.to, "ana@example.cl");
        assert!(email.body.contains("Technician"));
        assert!(email.body.contains("Tmp-12345"));
    }

    #[test]
    fn ticket_confirmation_goes_to_submitter() {
        let email = ticket_created_email(&Recipient::from(&user()), &context());
        assert_eq!(email.to, "ana@example.cl");
        assert!(email.subject.contains("#12"));
        assert!(email.body.contains("Assignment #5 for Escuela Los Andes"));
        assert!(email.body.contains("Screen flickers"));
    }

    #[test]
    fn update_without_resolution_is_updated_and_unassigned() {
        let email = ticket_updated_email(&context()).unwrap();
        assert_eq!(email.to, "contacto@losandes.cl");
        assert!(email.subject.ends_with("Updated"));
        assert!(email.body.contains("To be assigned"));
    }

    #[test]
    fn update_with_resolution_names_technician() {
        let mut ctx = context();
        ctx.resolution = Some("Replaced the panel".into());
        ctx.technician_first_name = Some("Luis".into());
        ctx.technician_last_name = Some("Soto".into());
        let email = ticket_updated_email(&ctx).unwrap();
        assert!(email.subject.ends_with("Resolved"));
        assert!(email.body.contains("Replaced the panel"));
        assert!(email.body.contains("Luis Soto"));
    }

    #[test]
    fn update_without_contact_email_is_skipped() {
        let mut ctx = context();
        ctx.contact_email = None;
        assert!(ticket_updated_email(&ctx).is_none());
    }

    #[tokio::test]
    async fn delivery_failure_is_swallowed() {
        let mut mock = MockMailTransport::new();
        mock.expect_send()
            .times(1)
            .returning(|_| Err(AppError::Internal("relay down".into())));

        let handle = dispatch(Arc::new(mock), profile_updated_email(&user()));
        tokio_test::assert_ok!(handle.await);
    }

    #[tokio::test]
    async fn dispatch_hands_message_to_transport() {
        let mut mock = MockMailTransport::new();
        mock.expect_send()
            .withf(|email| email.to == "ana@example.cl")
            .times(1)
            .returning(|_| Ok(()));

        dispatch(Arc::new(mock), profile_updated_email(&user()))
            .await
            .unwrap();
    }
}
