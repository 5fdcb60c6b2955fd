//! Facade Integration Tests
//!
//! Tests for packaging, downloading and loading models through the facade
//! on a file system backend.

mod common;

use common::{fixtures, ids, TestCatalog};
use model_catalog_service::{
    CatalogConfig, CatalogFacade, FileArtifact, FileLoader, ServiceError,
};
use model_catalog_storage::{BackendConfig, ObjectStore};
use serde_json::json;

#[tokio::test]
async fn test_download_latest_and_specific_model() {
    let t = TestCatalog::on_disk().await;
    t.upload_all("sales", &["m1", "m2"]).await;

    let latest = t.dir.path().join("latest");
    t.facade.download(&latest, "sales", None).await.unwrap();
    assert_eq!(
        std::fs::read_to_string(latest.join("weights.bin")).unwrap(),
        "weights of m2"
    );
    assert!(latest.join("config.json").is_file());

    let first = t.dir.path().join("first");
    t.facade.download(&first, "sales", Some("m1")).await.unwrap();
    assert_eq!(
        std::fs::read_to_string(first.join("weights.bin")).unwrap(),
        "weights of m1"
    );
}

#[tokio::test]
async fn test_download_of_missing_model() {
    let t = TestCatalog::on_disk().await;
    let out = t.dir.path().join("out");
    assert!(matches!(
        t.facade.download(&out, "sales", None).await,
        Err(ServiceError::DomainNotFound(_))
    ));

    t.upload("sales", "m1").await;
    assert!(matches!(
        t.facade.download(&out, "sales", Some("m9")).await,
        Err(ServiceError::ModelNotFound { .. })
    ));
}

#[tokio::test]
async fn test_missing_archive_is_a_pull_failure() {
    let t = TestCatalog::on_disk().await;
    let record = t.upload("sales", "m1").await;
    let archive_key = t.store.inner().key_for(&record.storage).unwrap();
    t.store.inner().remove(&archive_key).await.unwrap();

    let out = t.dir.path().join("out");
    assert!(matches!(
        t.facade.download(&out, "sales", Some("m1")).await,
        Err(ServiceError::FilePullFailed { .. })
    ));
}

#[tokio::test]
async fn test_load_with_matching_loader() {
    let t = TestCatalog::on_disk().await;
    let artifact = t.artifact("onnx", "m1").with_type_name("classifier");
    let record = t
        .facade
        .upload("fraud", Some("m1"), &artifact, Default::default())
        .await
        .unwrap();
    assert_eq!(record.library(), "onnx");
    assert_eq!(record.model.model_type.type_name.as_deref(), Some("classifier"));

    let files = t
        .facade
        .load(&FileLoader::new("onnx"), "fraud", None)
        .await
        .unwrap();
    let names: Vec<&str> = files.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["config.json", "weights.bin"]);
    assert_eq!(files["weights.bin"], b"weights of m1".to_vec());
}

#[tokio::test]
async fn test_load_with_wrong_loader() {
    let t = TestCatalog::on_disk().await;
    t.upload("fraud", "m1").await;

    let err = t
        .facade
        .load(&FileLoader::new("onnx"), "fraud", Some("m1"))
        .await
        .unwrap_err();
    match err {
        ServiceError::UnsupportedLibrary { library, loader } => {
            assert_eq!(library, "files");
            assert_eq!(loader, "onnx");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_generated_ids_are_unique() {
    let t = TestCatalog::on_disk().await;
    let artifact = t.artifact("files", "anon");
    let a = t
        .facade
        .upload("sales", None, &artifact, Default::default())
        .await
        .unwrap();
    let b = t
        .facade
        .upload("sales", None, &artifact, Default::default())
        .await
        .unwrap();

    assert_ne!(a.model_id(), b.model_id());
    assert_eq!(t.facade.list_models("sales", None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_upload_rejects_colliding_file_names() {
    let t = TestCatalog::on_disk().await;
    let mut files = fixtures::write_model_files(t.dir.path(), "a");
    files.extend(fixtures::write_model_files(t.dir.path(), "b"));

    let err = t
        .facade
        .upload("sales", Some("m1"), &FileArtifact::new("files", files), Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
    assert!(matches!(
        t.facade.get_domain("sales").await,
        Err(ServiceError::DomainNotFound(_))
    ));
}

#[tokio::test]
async fn test_invalid_names_are_refused() {
    let t = TestCatalog::on_disk().await;
    let artifact = t.artifact("files", "m1");
    for (domain, model_id) in [("a/b", "m1"), ("sales", ".."), ("", "m1"), ("sales", "with space")] {
        assert!(
            matches!(
                t.facade
                    .upload(domain, Some(model_id), &artifact, Default::default())
                    .await,
                Err(ServiceError::InvalidName(_))
            ),
            "{:?}/{:?} should be refused",
            domain,
            model_id
        );
    }
    assert!(t.facade.list_domains().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_set_model_info_updates_state_copies() {
    let t = TestCatalog::on_disk().await;
    t.upload_all("sales", &["m1", "m2"]).await;
    t.facade.create_model_state("prod").await.unwrap();
    t.facade.set_model_state("sales", "m1", "prod").await.unwrap();

    let record = t.facade.get_model_info("sales", "m1").await.unwrap();
    let updated = record.clone().with_extra(fixtures::training_extra(0.97));
    t.facade.set_model_info("sales", "m1", &updated).await.unwrap();

    assert_eq!(t.facade.get_model_info("sales", "m1").await.unwrap(), updated);
    // m2 stays the latest model
    assert_eq!(
        t.facade.get_domain("sales").await.unwrap().model_id().as_str(),
        "m2"
    );

    let bytes = std::fs::read(
        t.dir
            .path()
            .join("store")
            .join(t.model_key("sales", "m1", Some("prod"))),
    )
    .unwrap();
    let copy: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(copy["metrics"], json!({ "accuracy": 0.97 }));
}

#[tokio::test]
async fn test_set_model_info_rejects_mismatched_record() {
    let t = TestCatalog::on_disk().await;
    t.upload_all("sales", &["m1", "m2"]).await;
    let record = t.facade.get_model_info("sales", "m1").await.unwrap();

    assert!(matches!(
        t.facade.set_model_info("sales", "m2", &record).await,
        Err(ServiceError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_facade_from_config_reopens_catalog() {
    let t = TestCatalog::on_disk().await;
    t.upload("sales", "m1").await;

    let config = CatalogConfig::new(BackendConfig::FileSystem {
        root: t.dir.path().join("store"),
    });
    let reopened = CatalogFacade::from_config(&config).await.unwrap();
    assert_eq!(ids(&reopened.list_models("sales", None).await.unwrap()), vec!["m1"]);

    let prefixed = CatalogFacade::from_config(&config.clone().with_root_prefix("other"))
        .await
        .unwrap();
    assert!(prefixed.list_domains().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unusable_root_fails_validation() {
    let t = TestCatalog::on_disk().await;
    let file = t.dir.path().join("not-a-dir");
    std::fs::write(&file, b"x").unwrap();

    let config = CatalogConfig::new(BackendConfig::FileSystem { root: file });
    assert!(matches!(
        CatalogFacade::from_config(&config).await,
        Err(ServiceError::Configuration(_))
    ));
}
