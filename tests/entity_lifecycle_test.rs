//! Lifecycle guards and the update protocol of studies, users, centres,
//! participants and collection events

mod common;

use biobank::config::secret_string;
use biobank::domain::{
    AnnotatedEntity, AnnotationTypeId, AnnotationValue, ApiError, BiobankError, Centre,
    CollectionEvent, CollectionEventType, ConcurrencySafeEntity, ListOptions, LocationId,
    Participant, Study, StudyStatus, User, UserState,
};
use common::{study_json, user_json, FakeServer, Method};
use serde_json::json;

#[tokio::test]
async fn test_lock_registered_user_fails_without_request() {
    let server = FakeServer::new();
    let mut user = User::create(user_json("registered", 0)).unwrap();

    let err = user.lock(&server).await.unwrap_err();

    assert!(err.to_string().contains("not active"));
    assert_eq!(server.request_count(), 0);
    assert_eq!(user.state, UserState::Registered);
}

#[tokio::test]
async fn test_user_activate_lock_unlock() {
    let server = FakeServer::new();
    server.push_reply(user_json("active", 1));
    server.push_reply(user_json("locked", 2));
    server.push_reply(user_json("active", 3));
    let mut user = User::create(user_json("registered", 0)).unwrap();

    user.activate(&server).await.unwrap();
    assert!(user.is_active());
    user.lock(&server).await.unwrap();
    assert!(user.is_locked());
    user.unlock(&server).await.unwrap();
    assert!(user.is_active());
    assert_eq!(user.version(), 3);

    let requests = server.requests();
    assert_eq!(requests[0].path, "/users/activate/u1");
    assert_eq!(requests[0].body, json!({ "id": "u1", "expectedVersion": 0 }));
    assert_eq!(requests[1].path, "/users/lock/u1");
    assert_eq!(requests[2].path, "/users/unlock/u1");
}

#[tokio::test]
async fn test_unlock_active_user_is_refused() {
    let server = FakeServer::new();
    let mut user = User::create(user_json("active", 0)).unwrap();

    let err = user.unlock(&server).await.unwrap_err();

    assert_eq!(err.to_string(), "user state is not locked: active");
    assert_eq!(server.request_count(), 0);
}

#[tokio::test]
async fn test_register_sends_password() {
    let server = FakeServer::new();
    server.push_reply(user_json("registered", 0));
    let user = User::new("Jo Doe", "jo@example.com");

    let registered = user
        .register(&server, &secret_string("s3cret".to_string()))
        .await
        .unwrap();

    assert_eq!(registered.id().unwrap().as_str(), "u1");
    let request = server.last_request().unwrap();
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.path, "/users/");
    assert_eq!(request.body["password"], "s3cret");
    assert_eq!(request.body["email"], "jo@example.com");
}

#[tokio::test]
async fn test_failed_study_update_keeps_version() {
    let server = FakeServer::new();
    server.push_error(ApiError::Conflict("expected version doesn't match".to_string()));
    let mut study = Study::create(study_json("disabled", 2)).unwrap();

    let err = study.update_name(&server, "XYZ").await.unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(study.version(), 2);
    assert_eq!(study.name, "ABC");
    assert_eq!(server.last_request().unwrap().body["expectedVersion"], 2);
}

#[tokio::test]
async fn test_study_update_with_invalid_reply_keeps_study() {
    let server = FakeServer::new();
    server.push_reply(json!({ "id": "st1", "version": 3 }));
    let mut study = Study::create(study_json("disabled", 2)).unwrap();

    let err = study.update_name(&server, "XYZ").await.unwrap_err();

    assert!(matches!(err, BiobankError::InvalidServerObject(_)));
    assert_eq!(study.version(), 2);
}

#[tokio::test]
async fn test_study_status_changes() {
    let server = FakeServer::new();
    server.push_reply(study_json("enabled", 3));
    server.push_reply(study_json("retired", 4));
    let mut study = Study::create(study_json("disabled", 2)).unwrap();

    let err = study.disable(&server).await.unwrap_err();
    assert_eq!(err.to_string(), "already disabled");
    assert_eq!(server.request_count(), 0);

    study.enable(&server).await.unwrap();
    assert_eq!(study.status, StudyStatus::Enabled);
    study.retire(&server).await.unwrap();
    assert!(study.is_retired());
    assert_eq!(study.version(), 4);

    let requests = server.requests();
    assert_eq!(requests[0].path, "/studies/enable/st1");
    assert_eq!(requests[0].body, json!({ "expectedVersion": 2 }));
    assert_eq!(requests[1].path, "/studies/retire/st1");
}

#[tokio::test]
async fn test_remove_missing_study_annotation_type() {
    let server = FakeServer::new();
    let mut study = Study::create(study_json("disabled", 2)).unwrap();

    let err = study
        .remove_annotation_type(&server, &AnnotationTypeId::new("nope").unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, BiobankError::Domain(_)));
    assert_eq!(server.request_count(), 0);
}

#[tokio::test]
async fn test_study_list_rejects_bad_item() {
    let server = FakeServer::new();
    server.push_reply(json!({
        "items": [study_json("enabled", 0), { "id": "st2" }],
        "total": 2,
        "page": 1,
        "limit": 10,
        "offset": 0,
        "maxPages": 1
    }));

    let err = Study::list(&server, &ListOptions::new().filter("name::ABC"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "invalid studies from server");
}

fn centre_json(state: &str, locations: serde_json::Value) -> serde_json::Value {
    json!({
        "id": "c1",
        "version": 1,
        "timeAdded": "2024-01-01T00:00:00Z",
        "name": "CBSR",
        "description": null,
        "studyIds": [],
        "locations": locations,
        "state": state
    })
}

#[tokio::test]
async fn test_centre_guards() {
    let server = FakeServer::new();
    let mut centre = Centre::create(centre_json("enabled", json!([]))).unwrap();

    let err = centre.enable(&server).await.unwrap_err();
    assert_eq!(err.to_string(), "already enabled");

    let err = centre
        .remove_location(&server, &LocationId::new("l9").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, BiobankError::Domain(_)));
    assert_eq!(server.request_count(), 0);
}

fn annotated_study() -> Study {
    let mut obj = study_json("enabled", 0);
    obj["annotationTypes"] = json!([
        { "uniqueId": "at1", "name": "Sex", "valueType": "Select",
          "maxValueCount": 1, "options": ["F", "M"], "required": true }
    ]);
    Study::create(obj).unwrap()
}

fn participant_json(version: u64, annotations: serde_json::Value) -> serde_json::Value {
    json!({
        "id": "p1",
        "version": version,
        "timeAdded": "2024-01-01T00:00:00Z",
        "studyId": "st1",
        "uniqueId": "P-001",
        "annotations": annotations
    })
}

#[tokio::test]
async fn test_participant_update_keeps_study_binding() {
    let server = FakeServer::new();
    server.push_reply(participant_json(
        1,
        json!([{ "annotationTypeId": "at1", "selectedValues": ["F"] }]),
    ));
    let mut participant = Participant::create(participant_json(0, json!([]))).unwrap();
    participant.set_study(&annotated_study()).unwrap();

    participant.update_unique_id(&server, "P-002").await.unwrap();

    assert_eq!(participant.version(), 1);
    assert!(participant.study().is_some());
    let typed = participant.typed_annotations();
    assert_eq!(typed.len(), 1);
    assert_eq!(typed[0].value(), &AnnotationValue::SingleSelect(Some("F".to_string())));
    assert_eq!(server.last_request().unwrap().path, "/participants/uniqueId/p1");
}

#[tokio::test]
async fn test_participant_remove_annotation() {
    let server = FakeServer::new();
    server.push_reply(json!({}));
    let mut participant = Participant::create(participant_json(
        4,
        json!([{ "annotationTypeId": "at1", "selectedValues": ["M"] }]),
    ))
    .unwrap();
    let at1 = AnnotationTypeId::new("at1").unwrap();

    participant.remove_annotation(&server, &at1).await.unwrap();

    assert!(participant.annotations.is_empty());
    assert_eq!(participant.version(), 5);
    let request = server.last_request().unwrap();
    assert_eq!(request.method, Method::Delete);
    assert_eq!(request.path, "/participants/annot/p1/4/at1");

    let err = participant.remove_annotation(&server, &at1).await.unwrap_err();
    assert!(err.to_string().contains("not present"));
    assert_eq!(server.request_count(), 1);
}

fn collection_event_type() -> CollectionEventType {
    CollectionEventType::create(json!({
        "id": "cet1",
        "version": 0,
        "timeAdded": "2024-01-01T00:00:00Z",
        "studyId": "st1",
        "name": "Baseline",
        "recurring": false,
        "annotationTypes": [
            { "uniqueId": "at1", "name": "Weight", "valueType": "Number", "required": true }
        ]
    }))
    .unwrap()
}

#[tokio::test]
async fn test_collection_event_add_requires_annotation_values() {
    let server = FakeServer::new();
    let event = CollectionEvent::new(
        "p1".parse().unwrap(),
        &collection_event_type(),
        1,
        "2024-02-01T00:00:00Z".parse().unwrap(),
    )
    .unwrap();

    let err = event.add(&server).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "required annotation has no value: annotationTypeId: at1"
    );
    assert_eq!(server.request_count(), 0);
}

#[tokio::test]
async fn test_collection_event_update_rebinds_type() {
    let server = FakeServer::new();
    server.push_reply(json!({
        "id": "ce1",
        "participantId": "p1",
        "collectionEventTypeId": "cet1",
        "version": 1,
        "timeAdded": "2024-01-01T00:00:00Z",
        "timeCompleted": "2024-02-01T00:00:00Z",
        "visitNumber": 2,
        "annotations": [{ "annotationTypeId": "at1", "numberValue": "70", "selectedValues": [] }]
    }));
    let mut event = CollectionEvent::create_with_type(
        json!({
            "id": "ce1",
            "participantId": "p1",
            "collectionEventTypeId": "cet1",
            "version": 0,
            "timeAdded": "2024-01-01T00:00:00Z",
            "timeCompleted": "2024-02-01T00:00:00Z",
            "visitNumber": 1,
            "annotations": []
        }),
        Some(&collection_event_type()),
    )
    .unwrap();

    event.update_visit_number(&server, 2).await.unwrap();

    assert_eq!(event.visit_number, 2);
    assert!(event.collection_event_type().is_some());
    assert!(event.valid_annotations());
    let request = server.last_request().unwrap();
    assert_eq!(request.path, "/participants/cevents/visitNumber/ce1");
    assert_eq!(request.body, json!({ "visitNumber": 2, "expectedVersion": 0 }));
}
