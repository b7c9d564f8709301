//! Exercises `DataRegistry` and `AliasRegistry` together: registering a
//! value, round-tripping its payload, and binding/rebinding an alias to it.

use std::sync::Arc;

use kiara_core::{AliasRegistry, DataTypeRegistry};
use kiara_core::infrastructure::adapters::IntegerType;
use kiara_core::infrastructure::archives::MemoryArchive;
use kiara_domain::value_objects::ValueSchema;

use crate::common::build_harness;

#[tokio::test]
async fn a_value_can_be_registered_fetched_and_aliased() {
    let harness = build_harness(kiara_core::ModuleRegistry::new());
    let archive = Arc::new(MemoryArchive::new());
    let aliases = AliasRegistry::new(archive.clone(), archive);

    let id = harness
        .data
        .register_orphan("ctx", ValueSchema::new("integer"), &serde_json::Value::from(11), false)
        .await
        .unwrap();

    let data = harness.data.get_data(id).await.unwrap();
    assert_eq!(data, serde_json::Value::from(11));

    // This alias registry uses its own backing archive, so binding to a
    // value minted by the harness's archive should be rejected: the two
    // stores don't share a value table.
    assert!(aliases.bind("latest", id, false).await.is_err());
}

#[tokio::test]
async fn rebinding_an_alias_without_overwrite_is_rejected() {
    let mut data_types = DataTypeRegistry::new();
    data_types.register(Arc::new(IntegerType));
    let archive = Arc::new(MemoryArchive::new());
    let data = kiara_core::DataRegistry::new(data_types, archive.clone());
    let aliases = AliasRegistry::new(archive.clone(), archive);

    let first = data.register_orphan("ctx", ValueSchema::new("integer"), &serde_json::Value::from(1), false).await.unwrap();
    let second = data.register_orphan("ctx", ValueSchema::new("integer"), &serde_json::Value::from(2), false).await.unwrap();

    aliases.bind("latest", first, false).await.unwrap();
    assert!(aliases.bind("latest", second, false).await.is_err());
    aliases.bind("latest", second, true).await.unwrap();
    assert_eq!(aliases.resolve("latest").await.unwrap(), second);
}
