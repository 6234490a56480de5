//! Test support: stub collaborators and an in-process router, so gate
//! behavior and route relays are exercised without any network dependency.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::auth::AccessGate;
use crate::state::AppState;
use crate::supabase::{
    IdentityError, IdentityProvider, ObjectStore, TableStore, UpstreamError,
};

pub const TEST_SECRET: &str = "in-process-test-secret";

/// Recording table-store double. Every call is captured so tests can assert
/// both what was relayed and that gate-rejected requests relayed nothing.
#[derive(Default)]
pub struct StubStore {
    pub upserts: Mutex<Vec<(String, Value)>>,
    pub selects: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

#[async_trait]
impl TableStore for StubStore {
    async fn upsert(&self, table: &str, rows: Value) -> Result<Value, UpstreamError> {
        self.upserts
            .lock()
            .unwrap()
            .push((table.to_string(), rows.clone()));
        Ok(json!([rows]))
    }

    async fn select(
        &self,
        table: &str,
        eq_filters: &[(String, String)],
    ) -> Result<Value, UpstreamError> {
        self.selects
            .lock()
            .unwrap()
            .push((table.to_string(), eq_filters.to_vec()));
        Ok(json!([]))
    }

    async fn probe(&self) -> Result<(), UpstreamError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct StubIdentity;

#[async_trait]
impl IdentityProvider for StubIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Value, IdentityError> {
        if password == "wrong" {
            return Err(IdentityError::InvalidCredentials);
        }
        Ok(json!({
            "access_token": "stub-access-token",
            "user": { "email": email }
        }))
    }

    async fn sign_up(&self, email: &str, _password: &str) -> Result<Value, IdentityError> {
        Ok(json!({ "email": email, "confirmed": false }))
    }
}

#[derive(Default)]
pub struct StubStorage {
    pub uploads: Mutex<Vec<String>>,
}

#[async_trait]
impl ObjectStore for StubStorage {
    async fn upload(
        &self,
        name: &str,
        _content_type: Option<&str>,
        _bytes: Vec<u8>,
    ) -> Result<String, UpstreamError> {
        self.uploads.lock().unwrap().push(name.to_string());
        Ok(self.public_url(name))
    }

    fn public_url(&self, name: &str) -> String {
        format!("https://stub.storage.test/gradient-files/{}", name)
    }
}

pub struct TestHarness {
    pub state: AppState,
    pub store: Arc<StubStore>,
    pub storage: Arc<StubStorage>,
}

pub fn harness() -> TestHarness {
    let store = Arc::new(StubStore::default());
    let storage = Arc::new(StubStorage::default());
    let state = AppState {
        gate: AccessGate::new(TEST_SECRET, 0),
        store: store.clone(),
        identity: Arc::new(StubIdentity),
        storage: storage.clone(),
    };
    TestHarness {
        state,
        store,
        storage,
    }
}

/// Mint a token signed with the in-process test secret.
pub fn mint_token(role: &str, exp_offset_secs: i64) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let claims = json!({
        "sub": uuid::Uuid::new_v4(),
        "role": role,
        "exp": chrono::Utc::now().timestamp() + exp_offset_secs,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str, token: Option<String>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, token: Option<String>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn public_routes_need_no_token() {
        let h = harness();
        let app = crate::app(h.state);

        let res = app.clone().oneshot(get("/", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = app.oneshot(get("/health", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn gate_failures_share_one_opaque_401_body() {
        let h = harness();
        let app = crate::app(h.state);

        let missing = app.clone().oneshot(get("/exams", None)).await.unwrap();
        let garbage = app
            .clone()
            .oneshot(get("/exams", Some("not-a-jwt".to_string())))
            .await
            .unwrap();
        let expired = app
            .clone()
            .oneshot(get("/exams", Some(mint_token("admin", -30))))
            .await
            .unwrap();

        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(expired.status(), StatusCode::UNAUTHORIZED);

        // Identical bodies: the cause must not be recoverable from the wire.
        let missing_body = body_json(missing).await;
        let garbage_body = body_json(garbage).await;
        let expired_body = body_json(expired).await;
        assert_eq!(missing_body, garbage_body);
        assert_eq!(garbage_body, expired_body);
        assert_eq!(expired_body["message"], "unauthenticated");

        // Nothing reached the table store.
        assert!(h.store.selects.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn authenticated_student_can_list_exams() {
        let h = harness();
        let app = crate::app(h.state);

        let res = app
            .oneshot(get("/exams", Some(mint_token("student", 3600))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["success"], true);

        let selects = h.store.selects.lock().unwrap();
        assert_eq!(selects.as_slice(), &[("exams".to_string(), vec![])]);
    }

    #[tokio::test]
    async fn student_upsert_is_forbidden_and_never_reaches_the_store() {
        let h = harness();
        let app = crate::app(h.state);

        let res = app
            .oneshot(post_json(
                "/exams",
                Some(mint_token("student", 3600)),
                json!({ "name": "JEE Advanced" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body = body_json(res).await;
        assert_eq!(body["message"], "forbidden");
        assert_eq!(body["code"], "FORBIDDEN");

        assert!(h.store.upserts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn admin_upsert_relays_to_the_store() {
        let h = harness();
        let app = crate::app(h.state);

        let exam = json!({ "name": "JEE Advanced", "year": 2026 });
        let res = app
            .oneshot(post_json(
                "/exams",
                Some(mint_token("admin", 3600)),
                exam.clone(),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["success"], true);

        let upserts = h.store.upserts.lock().unwrap();
        assert_eq!(upserts.as_slice(), &[("exams".to_string(), exam)]);
    }

    #[tokio::test]
    async fn calendar_routes_mirror_the_exam_gate() {
        let h = harness();
        let app = crate::app(h.state);

        let res = app
            .clone()
            .oneshot(get("/calendar", Some(mint_token("student", 3600))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = app
            .oneshot(post_json(
                "/calendar",
                Some(mint_token("admin", 3600)),
                json!({ "title": "Mock test", "date": "2026-09-01" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(h.store.upserts.lock().unwrap()[0].0, "calendar");
    }

    #[tokio::test]
    async fn pyq_filters_are_relayed_as_equality_filters() {
        let h = harness();
        let app = crate::app(h.state);

        let res = app
            .oneshot(get(
                "/pyqs?subject=physics&year=2023",
                Some(mint_token("student", 3600)),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let selects = h.store.selects.lock().unwrap();
        assert_eq!(
            selects.as_slice(),
            &[(
                "pyqs".to_string(),
                vec![
                    ("subject".to_string(), "physics".to_string()),
                    ("year".to_string(), "2023".to_string()),
                ]
            )]
        );
    }

    #[tokio::test]
    async fn admin_can_upload_and_gets_a_url_back() {
        let h = harness();
        let app = crate::app(h.state);

        let boundary = "gradient-test-boundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"notes.pdf\"\r\nContent-Type: application/pdf\r\n\r\n%PDF-1.4 fake\r\n--{b}--\r\n",
            b = boundary
        );
        let req = Request::builder()
            .method("POST")
            .uri("/files/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", mint_token("admin", 3600)),
            )
            .body(Body::from(body))
            .unwrap();

        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(
            body["data"]["url"],
            "https://stub.storage.test/gradient-files/notes.pdf"
        );
        assert_eq!(h.storage.uploads.lock().unwrap().as_slice(), &["notes.pdf"]);
    }

    #[tokio::test]
    async fn student_upload_is_forbidden_before_storage_is_touched() {
        let h = harness();
        let app = crate::app(h.state);

        let boundary = "gradient-test-boundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"notes.pdf\"\r\n\r\nx\r\n--{b}--\r\n",
            b = boundary
        );
        let req = Request::builder()
            .method("POST")
            .uri("/files/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", mint_token("student", 3600)),
            )
            .body(Body::from(body))
            .unwrap();

        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert!(h.storage.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn any_authenticated_caller_can_resolve_a_download_url() {
        let h = harness();
        let app = crate::app(h.state);

        let res = app
            .clone()
            .oneshot(get(
                "/files/download/notes.pdf",
                Some(mint_token("student", 3600)),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(
            body["data"]["download_url"],
            "https://stub.storage.test/gradient-files/notes.pdf"
        );

        let res = app
            .oneshot(get("/files/download/notes.pdf", None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_relays_the_identity_session() {
        let h = harness();
        let app = crate::app(h.state);

        let res = app
            .clone()
            .oneshot(post_json(
                "/auth/login",
                None,
                json!({ "email": "s@gradient.app", "password": "pw" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["data"]["token"], "stub-access-token");
        assert_eq!(body["data"]["user"]["email"], "s@gradient.app");

        let res = app
            .oneshot(post_json(
                "/auth/login",
                None,
                json!({ "email": "s@gradient.app", "password": "wrong" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(res).await["message"], "invalid credentials");
    }

    #[tokio::test]
    async fn signup_relays_the_identity_response() {
        let h = harness();
        let app = crate::app(h.state);

        let res = app
            .oneshot(post_json(
                "/auth/signup",
                None,
                json!({ "email": "new@gradient.app", "password": "pw" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["data"]["email"], "new@gradient.app");
    }

    #[tokio::test]
    async fn unknown_role_is_authenticated_but_not_admin() {
        let h = harness();
        let app = crate::app(h.state);

        let token = mint_token("moderator", 3600);
        let res = app.clone().oneshot(get("/exams", Some(token.clone()))).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = app
            .oneshot(post_json("/exams", Some(token.clone()), json!({})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
