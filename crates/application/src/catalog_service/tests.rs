use warden_core::AppError;
use warden_domain::{ApplicationId, AuditAction, RoleId};

use crate::test_support::Harness;
use crate::{CreateApplicationInput, CreateRoleInput};

fn crm_input() -> CreateApplicationInput {
    CreateApplicationInput {
        url: "https://crm.example.com".to_owned(),
        name: "CRM".to_owned(),
        description: Some("Customer relationship management".to_owned()),
    }
}

#[tokio::test]
async fn create_role_requires_existing_application() {
    let harness = Harness::new();

    let result = harness
        .catalog
        .create_role(CreateRoleInput {
            application_id: ApplicationId::new(),
            name: "Viewer".to_owned(),
            permissions: Vec::new(),
        })
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn role_names_are_unique_per_application() {
    let harness = Harness::new();
    let crm = harness
        .catalog
        .create_application(crm_input())
        .await
        .unwrap_or_else(|_| unreachable!());
    let billing = harness
        .catalog
        .create_application(CreateApplicationInput {
            url: "https://billing.example.com".to_owned(),
            name: "Billing".to_owned(),
            description: None,
        })
        .await
        .unwrap_or_else(|_| unreachable!());

    let role = |application_id, name: &str| CreateRoleInput {
        application_id,
        name: name.to_owned(),
        permissions: vec![("records.read".to_owned(), true)],
    };

    assert!(harness.catalog.create_role(role(crm.id(), "Viewer")).await.is_ok());
    assert!(matches!(
        harness.catalog.create_role(role(crm.id(), "viewer")).await,
        Err(AppError::Conflict(_))
    ));
    assert!(
        harness
            .catalog
            .create_role(role(billing.id(), "Viewer"))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn invalid_permission_key_is_rejected() {
    let harness = Harness::new();
    let crm = harness
        .catalog
        .create_application(crm_input())
        .await
        .unwrap_or_else(|_| unreachable!());

    let result = harness
        .catalog
        .create_role(CreateRoleInput {
            application_id: crm.id(),
            name: "Viewer".to_owned(),
            permissions: vec![("records read".to_owned(), true)],
        })
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn set_role_permissions_replaces_grants() {
    let harness = Harness::new();
    let roles = harness.seed_roles(&["Editor"]).await;

    let updated = harness
        .catalog
        .set_role_permissions(
            roles[0],
            vec![
                ("records.read".to_owned(), true),
                ("records.write".to_owned(), false),
            ],
        )
        .await;
    assert!(matches!(updated, Ok(true)));

    let role = harness
        .catalog
        .get_role(roles[0])
        .await
        .ok()
        .flatten()
        .unwrap_or_else(|| unreachable!());
    assert!(role.grants("records.read"));
    assert!(!role.grants("records.write"));
    assert!(!role.grants("editor.read"));

    assert!(matches!(
        harness
            .catalog
            .set_role_permissions(RoleId::new(), Vec::new())
            .await,
        Ok(false)
    ));
}

#[tokio::test]
async fn deleting_application_strips_roles_from_users() {
    let harness = Harness::new();
    let roles = harness.seed_roles(&["Viewer", "Editor"]).await;
    let user = harness
        .users
        .create_user("ada@example.com")
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(harness.users.assign_roles(user.id(), &roles).await.is_ok());

    let application_id = harness
        .catalog
        .get_role(roles[0])
        .await
        .ok()
        .flatten()
        .map(|role| role.application_id())
        .unwrap_or_else(|| unreachable!());

    assert!(matches!(
        harness.catalog.delete_application(application_id).await,
        Ok(true)
    ));
    assert!(matches!(harness.catalog.get_role(roles[0]).await, Ok(None)));

    let stored = harness.users.get_by_id(user.id()).await.ok().flatten();
    assert!(stored.is_some_and(|stored| stored.role_ids().is_empty()));
    assert!(
        harness
            .store
            .audit_actions()
            .await
            .contains(&AuditAction::ApplicationDeleted)
    );

    assert!(matches!(
        harness.catalog.delete_application(application_id).await,
        Ok(false)
    ));
}

#[tokio::test]
async fn application_activation_is_idempotent() {
    let harness = Harness::new();
    let crm = harness
        .catalog
        .create_application(crm_input())
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(matches!(
        harness.catalog.set_application_active(crm.id(), false).await,
        Ok(true)
    ));
    assert!(matches!(
        harness.catalog.set_application_active(crm.id(), false).await,
        Ok(true)
    ));

    let events = harness
        .store
        .audit_actions()
        .await
        .into_iter()
        .filter(|action| *action == AuditAction::ApplicationActivationChanged)
        .count();
    assert_eq!(events, 1);
}
