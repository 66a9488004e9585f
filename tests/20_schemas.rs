mod common;

use anyhow::Result;
use atrium_api::engine::{
    EngineError, FieldChange, FieldDescriptor, FieldKind, SchemaCategory, SchemaPatch,
};

#[tokio::test]
async fn create_and_fetch_schema() -> Result<()> {
    let engine = common::engine();
    let ctx = common::ctx();

    let created = engine
        .create_schema(
            &ctx,
            common::directory_schema(
                "clients",
                vec![
                    common::text_field("name", true),
                    common::text_field("inn", false),
                ],
            ),
        )
        .await?;
    assert_eq!(created.code, "clients");
    assert_eq!(created.category, SchemaCategory::Directory);

    let fetched = engine.get_schema("clients").await?;
    assert_eq!(fetched, created);

    let fields = engine.get_fields("clients").await?;
    assert_eq!(
        fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
        vec!["name", "inn"],
        "field order is preserved"
    );
    Ok(())
}

#[tokio::test]
async fn duplicate_code_is_a_conflict() -> Result<()> {
    let engine = common::engine();
    let ctx = common::ctx();

    engine
        .create_schema(&ctx, common::directory_schema("clients", vec![]))
        .await?;
    let err = engine
        .create_schema(&ctx, common::directory_schema("clients", vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::DuplicateCode(_)));
    Ok(())
}

#[tokio::test]
async fn invalid_code_rejected() {
    let engine = common::engine();
    let ctx = common::ctx();

    let err = engine
        .create_schema(&ctx, common::directory_schema("2 bad", vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidCode(_)));
}

#[tokio::test]
async fn self_reference_allowed_on_creation() -> Result<()> {
    let engine = common::engine();
    let ctx = common::ctx();

    // The code is reserved before field validation, so a tree-shaped
    // directory referencing itself is valid on first creation.
    let schema = engine
        .create_schema(
            &ctx,
            common::directory_schema(
                "departments",
                vec![
                    common::text_field("name", true),
                    common::reference_field("parent", "departments"),
                ],
            ),
        )
        .await?;
    assert_eq!(schema.fields.len(), 2);
    Ok(())
}

#[tokio::test]
async fn dangling_reference_rejected() {
    let engine = common::engine();
    let ctx = common::ctx();

    let err = engine
        .create_schema(
            &ctx,
            common::directory_schema(
                "orders",
                vec![common::reference_field("client", "clients")],
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidField { .. }));
}

#[tokio::test]
async fn system_schema_structure_is_frozen() -> Result<()> {
    let engine = common::engine();
    let ctx = common::ctx();

    engine
        .create_schema(
            &ctx,
            common::system_schema("audit_log", vec![common::text_field("message", true)]),
        )
        .await?;

    let err = engine
        .change_fields(
            &ctx,
            "audit_log",
            vec![FieldChange::Added {
                field: common::text_field("extra", false),
            }],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::SystemSchemaImmutable(_)));

    // Field list unchanged after the rejection.
    let fields = engine.get_fields("audit_log").await?;
    assert_eq!(fields.len(), 1);

    // Category edits are structural too.
    let err = engine
        .update_schema(
            &ctx,
            "audit_log",
            SchemaPatch {
                name: None,
                category: Some(SchemaCategory::Journal),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::SystemSchemaImmutable(_)));

    // Renames stay allowed on system schemas.
    let renamed = engine
        .update_schema(
            &ctx,
            "audit_log",
            SchemaPatch {
                name: Some("Audit trail".to_string()),
                category: None,
            },
        )
        .await?;
    assert_eq!(renamed.name, "Audit trail");

    let err = engine.delete_schema(&ctx, "audit_log").await.unwrap_err();
    assert!(matches!(err, EngineError::SystemSchemaImmutable(_)));
    Ok(())
}

#[tokio::test]
async fn field_changeset_applies_atomically() -> Result<()> {
    let engine = common::engine();
    let ctx = common::ctx();

    engine
        .create_schema(
            &ctx,
            common::directory_schema(
                "clients",
                vec![
                    common::text_field("name", true),
                    common::text_field("inn", false),
                ],
            ),
        )
        .await?;

    // Batch: one valid add, then a removal of a missing field. The
    // whole batch must be rejected and nothing applied.
    let err = engine
        .change_fields(
            &ctx,
            "clients",
            vec![
                FieldChange::Added {
                    field: common::text_field("phone", false),
                },
                FieldChange::Removed {
                    name: "nonexistent".to_string(),
                },
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::FieldNotFound { .. }));
    assert_eq!(engine.get_fields("clients").await?.len(), 2);

    // A relabel keeps field identity and position.
    let updated = engine
        .change_fields(
            &ctx,
            "clients",
            vec![FieldChange::Relabeled {
                name: "inn".to_string(),
                label: Some("Tax number".to_string()),
                required: Some(true),
                choices: None,
            }],
        )
        .await?;
    let inn = updated.field("inn").expect("inn survives relabel");
    assert_eq!(inn.label, "Tax number");
    assert!(inn.required);
    assert_eq!(updated.fields[1].name, "inn", "position preserved");
    Ok(())
}

#[tokio::test]
async fn duplicate_field_name_rejected() -> Result<()> {
    let engine = common::engine();
    let ctx = common::ctx();

    engine
        .create_schema(
            &ctx,
            common::directory_schema("clients", vec![common::text_field("name", true)]),
        )
        .await?;

    let err = engine
        .change_fields(
            &ctx,
            "clients",
            vec![FieldChange::Added {
                field: common::text_field("name", false),
            }],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidField { .. }));
    Ok(())
}

#[tokio::test]
async fn select_field_choices_validated_through_changeset() -> Result<()> {
    let engine = common::engine();
    let ctx = common::ctx();

    let select = FieldDescriptor {
        name: "status".to_string(),
        label: "Status".to_string(),
        kind: FieldKind::Select,
        required: false,
        system: false,
        reference_target: None,
        choices: Some(vec!["active".to_string(), "blocked".to_string()]),
    };
    engine
        .create_schema(&ctx, common::directory_schema("clients", vec![select]))
        .await?;

    // Relabeling with an empty choice list violates the Select invariant.
    let err = engine
        .change_fields(
            &ctx,
            "clients",
            vec![FieldChange::Relabeled {
                name: "status".to_string(),
                label: None,
                required: None,
                choices: Some(vec![]),
            }],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidField { .. }));
    Ok(())
}

#[tokio::test]
async fn delete_blocked_while_bound() -> Result<()> {
    let engine = common::engine();
    let ctx = common::ctx();

    engine
        .create_schema(&ctx, common::directory_schema("clients", vec![]))
        .await?;
    engine
        .create_template(&ctx, common::client_template("base", &["clients"]))
        .await?;

    let err = engine.delete_schema(&ctx, "clients").await.unwrap_err();
    assert!(matches!(err, EngineError::SchemaInUse(_)));
    Ok(())
}

#[tokio::test]
async fn delete_unbound_schema_succeeds() -> Result<()> {
    let engine = common::engine();
    let ctx = common::ctx();

    engine
        .create_schema(&ctx, common::directory_schema("scratch", vec![]))
        .await?;
    engine.delete_schema(&ctx, "scratch").await?;

    let err = engine.get_schema("scratch").await.unwrap_err();
    assert!(matches!(err, EngineError::SchemaNotFound(_)));
    Ok(())
}
