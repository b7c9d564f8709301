//! Smoke-tests `KiaraContext::build` against both archive backends it
//! supports, confirming the built-in data types and registries come up
//! wired and usable without a caller registering anything by hand.

use kiara_core::{ArchiveBackend, KiaraConfig, KiaraContext};
use kiara_domain::value_objects::ValueSchema;

#[tokio::test]
async fn memory_backed_context_has_the_built_in_data_types() {
    let context = KiaraContext::build(&KiaraConfig::default()).await.unwrap();
    for type_name in ["integer", "float", "string", "boolean", "list", "any"] {
        assert!(context.data_types.get(type_name).is_ok(), "missing built-in type {type_name}");
    }
}

#[tokio::test]
async fn sqlite_backed_context_persists_a_registered_value() {
    let config = KiaraConfig { archive: ArchiveBackend::Sqlite { path: "sqlite::memory:".into() }, ..Default::default() };
    let context = KiaraContext::build(&config).await.unwrap();

    let id = context
        .data
        .register_orphan("ctx", ValueSchema::new("integer"), &serde_json::Value::from(3), false)
        .await
        .unwrap();

    context.aliases.bind("answer", id, false).await.unwrap();
    assert_eq!(context.aliases.resolve("answer").await.unwrap(), id);
}
